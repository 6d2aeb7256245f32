//! Centralized configuration (environment variables + defaults).

use anyhow::Context;
use std::collections::HashMap;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_LOG_FILTER: &str = "stockroom=info,tower_http=info";

/// Which store the service talks to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Backend {
    Postgres {
        database_url: String,
        max_connections: u32,
    },
    /// PostgREST-compatible REST endpoint (Supabase exposes one under `/rest/v1`).
    Postgrest {
        base_url: String,
        api_key: Option<String>,
    },
    Memory,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub backend: Backend,
    pub bind_addr: String,
}

impl Config {
    /// Reads the process environment (after `.env`, if present).
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();
        Self::from_vars(&std::env::vars().collect())
    }

    pub fn from_vars(vars: &HashMap<String, String>) -> anyhow::Result<Self> {
        let get = |key: &str| {
            vars.get(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let backend_name = get("INVENTORY_BACKEND")
            .unwrap_or_else(|| "postgres".to_string())
            .to_lowercase();

        let backend = match backend_name.as_str() {
            "postgres" | "postgresql" => {
                let database_url = get("DATABASE_URL")
                    .context("DATABASE_URL must be set for the postgres backend")?;
                let max_connections = match get("DATABASE_MAX_CONNECTIONS") {
                    Some(v) => v
                        .parse::<u32>()
                        .context("DATABASE_MAX_CONNECTIONS must be a valid u32")?
                        .max(1),
                    None => DEFAULT_MAX_CONNECTIONS,
                };
                Backend::Postgres {
                    database_url,
                    max_connections,
                }
            }
            "postgrest" | "supabase" => {
                let base_url = match (get("POSTGREST_URL"), get("SUPABASE_URL")) {
                    (Some(url), _) => url,
                    (None, Some(url)) => supabase_rest_url(&url),
                    (None, None) => anyhow::bail!(
                        "POSTGREST_URL or SUPABASE_URL must be set for the postgrest backend"
                    ),
                };
                Backend::Postgrest {
                    base_url,
                    api_key: get("POSTGREST_KEY").or_else(|| get("SUPABASE_KEY")),
                }
            }
            "memory" => Backend::Memory,
            other => anyhow::bail!(
                "Unknown INVENTORY_BACKEND '{}' (expected postgres, postgrest, supabase or memory)",
                other
            ),
        };

        Ok(Self {
            backend,
            bind_addr: get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
        })
    }
}

/// Supabase project URLs serve PostgREST under `/rest/v1`.
fn supabase_rest_url(url: &str) -> String {
    let url = url.trim_end_matches('/');
    if url.ends_with("/rest/v1") {
        url.to_string()
    } else {
        format!("{}/rest/v1", url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn postgres_is_the_default_and_needs_a_url() {
        assert!(Config::from_vars(&vars(&[])).is_err());

        let cfg =
            Config::from_vars(&vars(&[("DATABASE_URL", "postgres://localhost/inv")])).unwrap();
        assert_eq!(
            cfg.backend,
            Backend::Postgres {
                database_url: "postgres://localhost/inv".to_string(),
                max_connections: DEFAULT_MAX_CONNECTIONS,
            }
        );
        assert_eq!(cfg.bind_addr, DEFAULT_BIND_ADDR);
    }

    #[test]
    fn supabase_url_gets_rest_suffix() {
        let cfg = Config::from_vars(&vars(&[
            ("INVENTORY_BACKEND", "supabase"),
            ("SUPABASE_URL", "https://abc.supabase.co/"),
            ("SUPABASE_KEY", "anon"),
        ]))
        .unwrap();
        assert_eq!(
            cfg.backend,
            Backend::Postgrest {
                base_url: "https://abc.supabase.co/rest/v1".to_string(),
                api_key: Some("anon".to_string()),
            }
        );
    }

    #[test]
    fn explicit_postgrest_url_is_used_verbatim() {
        let cfg = Config::from_vars(&vars(&[
            ("INVENTORY_BACKEND", "postgrest"),
            ("POSTGREST_URL", "http://localhost:3001"),
            ("SUPABASE_URL", "https://ignored.supabase.co"),
        ]))
        .unwrap();
        assert_eq!(
            cfg.backend,
            Backend::Postgrest {
                base_url: "http://localhost:3001".to_string(),
                api_key: None,
            }
        );
    }

    #[test]
    fn rejects_unknown_backend_and_bad_pool_size() {
        assert!(Config::from_vars(&vars(&[("INVENTORY_BACKEND", "sqlite")])).is_err());
        assert!(Config::from_vars(&vars(&[
            ("DATABASE_URL", "postgres://x"),
            ("DATABASE_MAX_CONNECTIONS", "many"),
        ]))
        .is_err());
    }

    #[test]
    fn memory_backend_and_custom_bind() {
        let cfg = Config::from_vars(&vars(&[
            ("INVENTORY_BACKEND", "Memory"),
            ("BIND_ADDR", "127.0.0.1:8080"),
        ]))
        .unwrap();
        assert_eq!(cfg.backend, Backend::Memory);
        assert_eq!(cfg.bind_addr, "127.0.0.1:8080");
    }
}
