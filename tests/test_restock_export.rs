mod common;

use async_trait::async_trait;
use common::TestServer;
use std::sync::Arc;
use stockroom::domain::model::{Category, NewCategory, Product, ProductInsert};
use stockroom::InventoryStore;

/// A store whose backend is down: every call fails.
struct UnreachableStore;

fn down<T>() -> anyhow::Result<T> {
    Err(anyhow::anyhow!("connection refused"))
}

#[async_trait]
impl InventoryStore for UnreachableStore {
    fn backend_name(&self) -> &'static str {
        "unreachable"
    }
    async fn ping(&self) -> anyhow::Result<()> {
        down()
    }
    async fn list_categories(&self) -> anyhow::Result<Vec<Category>> {
        down()
    }
    async fn list_products(&self) -> anyhow::Result<Vec<Product>> {
        down()
    }
    async fn get_category(&self, _id: i64) -> anyhow::Result<Option<Category>> {
        down()
    }
    async fn insert_category(&self, _category: &NewCategory) -> anyhow::Result<Category> {
        down()
    }
    async fn delete_category(&self, _id: i64) -> anyhow::Result<bool> {
        down()
    }
    async fn delete_categories_by_name(&self, _name: &str) -> anyhow::Result<u64> {
        down()
    }
    async fn insert_product(&self, _product: &ProductInsert) -> anyhow::Result<Product> {
        down()
    }
    async fn add_quantity(&self, _id: i64, _amount: i64) -> anyhow::Result<Option<Product>> {
        down()
    }
    async fn add_quantity_by_name(&self, _name: &str, _amount: i64) -> anyhow::Result<u64> {
        down()
    }
    async fn delete_product(&self, _id: i64) -> anyhow::Result<bool> {
        down()
    }
    async fn delete_products_by_name(&self, _name: &str) -> anyhow::Result<u64> {
        down()
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn csv_export_lists_products_to_order() -> anyhow::Result<()> {
    let server = TestServer::start().await?;
    let tools = server.category("Tools").await?;
    server.product("Hammer", 3, 5, tools).await?;
    server.product("Tape", 9, 5, tools).await?;

    let resp = server
        .client
        .get(server.url("/api/restock/export.csv"))
        .send()
        .await?;
    assert_eq!(resp.status().as_u16(), 200);
    let headers = resp.headers().clone();
    assert!(headers["content-type"].to_str()?.starts_with("text/csv"));
    let disposition = headers["content-disposition"].to_str()?;
    assert!(disposition.starts_with("attachment; filename=\"restock_"));
    assert!(disposition.ends_with(".csv\""));

    let body = resp.text().await?;
    let lines: Vec<&str> = body.lines().collect();
    assert_eq!(lines, vec!["name,quantity,min_stock,to_order", "Hammer,3,5,2"]);

    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn pdf_export_is_a_pdf_attachment() -> anyhow::Result<()> {
    let server = TestServer::start().await?;
    let tools = server.category("Tools").await?;
    server.product("Hammer", 3, 5, tools).await?;

    let resp = server
        .client
        .get(server.url("/api/restock/export.pdf"))
        .send()
        .await?;
    assert_eq!(resp.status().as_u16(), 200);
    assert_eq!(resp.headers()["content-type"], "application/pdf");
    assert!(resp.headers()["content-disposition"]
        .to_str()?
        .ends_with(".pdf\""));

    let body = resp.bytes().await?;
    assert!(body.starts_with(b"%PDF-1.4"));
    assert!(body.ends_with(b"%%EOF\n"));

    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn empty_restock_list_still_exports() -> anyhow::Result<()> {
    let server = TestServer::start().await?;

    let body = server
        .client
        .get(server.url("/api/restock/export.csv"))
        .send()
        .await?
        .text()
        .await?;
    assert_eq!(body.trim_end(), "name,quantity,min_stock,to_order");

    let resp = server
        .client
        .get(server.url("/api/restock/export.pdf"))
        .send()
        .await?;
    assert_eq!(resp.status().as_u16(), 200);
    assert!(resp.bytes().await?.starts_with(b"%PDF-1.4"));

    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn dashboard_survives_an_unreachable_backend() -> anyhow::Result<()> {
    let server = TestServer::start_with(Arc::new(UnreachableStore)).await?;

    let resp = server.client.get(server.url("/api/dashboard")).send().await?;
    assert_eq!(resp.status().as_u16(), 200);
    let body: serde_json::Value = resp.json().await?;
    assert_eq!(body["success"], false);
    assert!(body["error"]
        .as_str()
        .unwrap()
        .starts_with("Failed to fetch data:"));
    assert_eq!(body["data"]["summary"]["product_count"], 0);
    assert!(body["data"]["products"].as_array().unwrap().is_empty());

    let resp = server.client.get(server.url("/health")).send().await?;
    assert_eq!(resp.status().as_u16(), 503);

    let resp = server.client.get(server.url("/api/products")).send().await?;
    assert_eq!(resp.status().as_u16(), 500);

    Ok(())
}
