//! Hosted backend reached through a PostgREST endpoint (e.g. Supabase `/rest/v1`).
//!
//! PostgREST returns rows as loose JSON, so numeric columns are coerced here: numbers and
//! numeric strings are accepted, anything else counts as missing.

use super::{restocked_quantity, InventoryStore, CATEGORY_TABLE, PRODUCT_TABLE};
use crate::domain::model::{Category, NewCategory, Product, ProductInsert, DEFAULT_MIN_STOCK};
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder};
use rust_decimal::Decimal;
use serde_json::{json, Value as JsonValue};

const PRODUCT_SELECT: &str = "*,kategorie(nazwa)";

pub struct PostgrestStore {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

pub fn coerce_i64(v: Option<&JsonValue>) -> Option<i64> {
    match v? {
        JsonValue::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        JsonValue::String(s) => {
            let s = s.trim();
            s.parse::<i64>().ok().or_else(|| {
                s.parse::<f64>()
                    .ok()
                    .filter(|f| f.is_finite())
                    .map(|f| f.trunc() as i64)
            })
        }
        _ => None,
    }
}

pub fn coerce_decimal(v: Option<&JsonValue>) -> Option<Decimal> {
    let text = match v? {
        JsonValue::Number(n) => n.to_string(),
        JsonValue::String(s) => s.trim().replace(',', "."),
        _ => return None,
    };
    text.parse::<Decimal>()
        .ok()
        .or_else(|| Decimal::from_scientific(&text).ok())
}

fn text(v: Option<&JsonValue>) -> Option<String> {
    v.and_then(|v| v.as_str()).map(str::to_string)
}

pub fn category_from_json(row: &JsonValue) -> anyhow::Result<Category> {
    let id = coerce_i64(row.get("id"))
        .ok_or_else(|| anyhow::anyhow!("Category row without id: {}", row))?;
    Ok(Category {
        id,
        name: text(row.get("nazwa")).unwrap_or_default(),
        description: text(row.get("opis")),
    })
}

/// Maps a `produkty` row with the embedded `kategorie(nazwa)` join.
pub fn product_from_json(row: &JsonValue) -> anyhow::Result<Product> {
    let id = coerce_i64(row.get("id"))
        .ok_or_else(|| anyhow::anyhow!("Product row without id: {}", row))?;
    Ok(Product {
        id,
        name: text(row.get("nazwa")).unwrap_or_default(),
        quantity: coerce_i64(row.get("liczba")).unwrap_or(0),
        sale_price: coerce_decimal(row.get("cena")).unwrap_or(Decimal::ZERO),
        purchase_price: coerce_decimal(row.get("cena_zakupu")).unwrap_or(Decimal::ZERO),
        min_stock: coerce_i64(row.get("stan_minimalny")).unwrap_or(DEFAULT_MIN_STOCK),
        category_id: coerce_i64(row.get("kategoria_id")),
        category_name: text(row.get(CATEGORY_TABLE).and_then(|k| k.get("nazwa"))),
    })
}

impl PostgrestStore {
    pub fn new(base_url: &str, api_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    fn request(&self, method: Method, table: &str) -> RequestBuilder {
        let mut req = self
            .client
            .request(method, format!("{}/{}", self.base_url, table))
            .header("Accept", "application/json");
        if let Some(key) = &self.api_key {
            req = req.header("apikey", key).bearer_auth(key);
        }
        req
    }

    /// Sends the request and returns the JSON array PostgREST answers with.
    async fn rows(&self, req: RequestBuilder, what: &str) -> anyhow::Result<Vec<JsonValue>> {
        let resp = req.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("PostgREST {} failed ({}): {}", what, status, body));
        }
        let body: JsonValue = resp.json().await?;
        match body {
            JsonValue::Array(rows) => Ok(rows),
            JsonValue::Null => Ok(Vec::new()),
            other => Ok(vec![other]),
        }
    }

    async fn fetch_product(&self, id: i64) -> anyhow::Result<Option<Product>> {
        let req = self
            .request(Method::GET, PRODUCT_TABLE)
            .query(&[("select", PRODUCT_SELECT.to_string()), ("id", format!("eq.{}", id))]);
        let rows = self.rows(req, "read product").await?;
        rows.first().map(product_from_json).transpose()
    }

    async fn delete_where(&self, table: &str, column: &str, value: String) -> anyhow::Result<u64> {
        let req = self
            .request(Method::DELETE, table)
            .header("Prefer", "return=representation")
            .query(&[(column, format!("eq.{}", value))]);
        let rows = self.rows(req, &format!("delete from {}", table)).await?;
        Ok(rows.len() as u64)
    }

    async fn set_quantity(&self, id: i64, quantity: i64) -> anyhow::Result<()> {
        let req = self
            .request(Method::PATCH, PRODUCT_TABLE)
            .header("Prefer", "return=minimal")
            .query(&[("id", format!("eq.{}", id))])
            .json(&json!({ "liczba": quantity }));
        let resp = req.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("PostgREST update failed ({}): {}", status, body));
        }
        Ok(())
    }
}

#[async_trait]
impl InventoryStore for PostgrestStore {
    fn backend_name(&self) -> &'static str {
        "postgrest"
    }

    async fn ping(&self) -> anyhow::Result<()> {
        let req = self
            .request(Method::GET, CATEGORY_TABLE)
            .query(&[("select", "id"), ("limit", "1")]);
        self.rows(req, "ping").await.map(|_| ())
    }

    async fn list_categories(&self) -> anyhow::Result<Vec<Category>> {
        let req = self
            .request(Method::GET, CATEGORY_TABLE)
            .query(&[("select", "*"), ("order", "id.asc")]);
        self.rows(req, "list categories")
            .await?
            .iter()
            .map(category_from_json)
            .collect()
    }

    async fn list_products(&self) -> anyhow::Result<Vec<Product>> {
        let req = self
            .request(Method::GET, PRODUCT_TABLE)
            .query(&[("select", PRODUCT_SELECT), ("order", "id.asc")]);
        self.rows(req, "list products")
            .await?
            .iter()
            .map(product_from_json)
            .collect()
    }

    async fn get_category(&self, id: i64) -> anyhow::Result<Option<Category>> {
        let req = self
            .request(Method::GET, CATEGORY_TABLE)
            .query(&[("select", "*".to_string()), ("id", format!("eq.{}", id))]);
        let rows = self.rows(req, "read category").await?;
        rows.first().map(category_from_json).transpose()
    }

    async fn insert_category(&self, category: &NewCategory) -> anyhow::Result<Category> {
        let req = self
            .request(Method::POST, CATEGORY_TABLE)
            .header("Prefer", "return=representation")
            .json(&json!({ "nazwa": category.name, "opis": category.description }));
        let rows = self.rows(req, "insert category").await?;
        rows.first()
            .map(category_from_json)
            .transpose()?
            .ok_or_else(|| anyhow::anyhow!("PostgREST returned no row for inserted category"))
    }

    async fn delete_category(&self, id: i64) -> anyhow::Result<bool> {
        Ok(self.delete_where(CATEGORY_TABLE, "id", id.to_string()).await? > 0)
    }

    async fn delete_categories_by_name(&self, name: &str) -> anyhow::Result<u64> {
        self.delete_where(CATEGORY_TABLE, "nazwa", name.to_string()).await
    }

    async fn insert_product(&self, product: &ProductInsert) -> anyhow::Result<Product> {
        let req = self
            .request(Method::POST, PRODUCT_TABLE)
            .header("Prefer", "return=representation")
            .json(&json!({
                "nazwa": product.name,
                "liczba": product.quantity,
                "cena": product.sale_price,
                "cena_zakupu": product.purchase_price,
                "stan_minimalny": product.min_stock,
                "kategoria_id": product.category_id,
            }));
        let rows = self.rows(req, "insert product").await?;
        let id = rows
            .first()
            .and_then(|r| coerce_i64(r.get("id")))
            .ok_or_else(|| anyhow::anyhow!("PostgREST returned no id for inserted product"))?;
        self.fetch_product(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Inserted product {} vanished before read-back", id))
    }

    async fn add_quantity(&self, id: i64, amount: i64) -> anyhow::Result<Option<Product>> {
        let Some(current) = self.fetch_product(id).await? else {
            return Ok(None);
        };
        let quantity = restocked_quantity(format!("product {}", id), current.quantity, amount)?;
        self.set_quantity(id, quantity).await?;
        self.fetch_product(id).await
    }

    async fn add_quantity_by_name(&self, name: &str, amount: i64) -> anyhow::Result<u64> {
        let req = self
            .request(Method::GET, PRODUCT_TABLE)
            .query(&[("select", "id,liczba".to_string()), ("nazwa", format!("eq.{}", name))]);
        let rows = self.rows(req, "read products by name").await?;
        let mut updates = Vec::with_capacity(rows.len());
        for row in &rows {
            let Some(id) = coerce_i64(row.get("id")) else {
                continue;
            };
            let quantity = coerce_i64(row.get("liczba")).unwrap_or(0);
            updates.push((id, restocked_quantity(name, quantity, amount)?));
        }
        for (id, quantity) in &updates {
            self.set_quantity(*id, *quantity).await?;
        }
        Ok(updates.len() as u64)
    }

    async fn delete_product(&self, id: i64) -> anyhow::Result<bool> {
        Ok(self.delete_where(PRODUCT_TABLE, "id", id.to_string()).await? > 0)
    }

    async fn delete_products_by_name(&self, name: &str) -> anyhow::Result<u64> {
        self.delete_where(PRODUCT_TABLE, "nazwa", name.to_string()).await
    }
}
