use stockroom::infra::config::{Backend, Config};
use stockroom::InventoryService;

fn usage_and_exit() -> ! {
    eprintln!(
        "Usage: cargo run --bin preflight\n\
         \n\
         Checks that the configured inventory backend is reachable and prints a short summary.\n\
         \n\
         Reads env vars (or .env):\n\
           INVENTORY_BACKEND   postgres | postgrest | supabase | memory (default: postgres)\n\
           DATABASE_URL        for postgres\n\
           POSTGREST_URL / SUPABASE_URL, POSTGREST_KEY / SUPABASE_KEY   for postgrest\n"
    );
    std::process::exit(2);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.iter().any(|a| a == "-h" || a == "--help") {
        usage_and_exit();
    }

    let config = Config::from_env()?;
    match &config.backend {
        Backend::Postgres { max_connections, .. } => {
            println!("> Backend: postgres (pool size {})", max_connections)
        }
        Backend::Postgrest { base_url, api_key } => println!(
            "> Backend: postgrest at {} ({})",
            base_url,
            if api_key.is_some() { "with API key" } else { "no API key" }
        ),
        Backend::Memory => println!("> Backend: memory (nothing to check)"),
    }

    let service = InventoryService::from_config(&config).await?;
    service.ping().await?;
    println!("> Store reachable.");

    let dashboard = service.dashboard().await?;
    println!(
        "> {} categories, {} products, {} units in stock.",
        dashboard.summary.category_count,
        dashboard.summary.product_count,
        dashboard.summary.total_units
    );
    if dashboard.alerts.is_empty() {
        println!("> No products below their minimum stock.");
    } else {
        println!("> {} products need restocking:", dashboard.alerts.len());
        for item in &dashboard.alerts {
            println!("    {} (have {}, order {})", item.name, item.quantity, item.to_order);
        }
    }

    Ok(())
}
