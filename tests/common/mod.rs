#![allow(dead_code)]

use std::sync::Arc;
use stockroom::transport;
use stockroom::{InventoryService, InventoryStore, MemoryStore};
use tokio::task::JoinHandle;

pub struct TestServer {
    pub base_url: String,
    pub client: reqwest::Client,
    handle: JoinHandle<()>,
}

impl TestServer {
    pub async fn start() -> anyhow::Result<Self> {
        Self::start_with(Arc::new(MemoryStore::new())).await
    }

    pub async fn start_with(store: Arc<dyn InventoryStore>) -> anyhow::Result<Self> {
        let app_state = transport::http::AppState {
            service: Arc::new(InventoryService::new(store)),
        };
        let router = transport::http::create_router(app_state);

        // Bind to an ephemeral port so tests can run in parallel.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let port = listener.local_addr()?.port();
        let handle = tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        Ok(Self {
            base_url: format!("http://127.0.0.1:{}", port),
            client: reqwest::Client::new(),
            handle,
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn get_json(&self, path: &str) -> anyhow::Result<serde_json::Value> {
        Ok(self.client.get(self.url(path)).send().await?.json().await?)
    }

    pub async fn post_json(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> anyhow::Result<(u16, serde_json::Value)> {
        let resp = self.client.post(self.url(path)).json(&body).send().await?;
        let status = resp.status().as_u16();
        Ok((status, resp.json().await?))
    }

    pub async fn delete_json(&self, path: &str) -> anyhow::Result<(u16, serde_json::Value)> {
        let resp = self.client.delete(self.url(path)).send().await?;
        let status = resp.status().as_u16();
        Ok((status, resp.json().await?))
    }

    /// Creates a category and returns its id.
    pub async fn category(&self, name: &str) -> anyhow::Result<i64> {
        let (status, body) = self
            .post_json("/api/categories", serde_json::json!({ "name": name }))
            .await?;
        assert_eq!(status, 201, "{}", body);
        Ok(body["data"]["id"].as_i64().unwrap())
    }

    /// Creates a product in an existing category and returns its id.
    pub async fn product(
        &self,
        name: &str,
        quantity: i64,
        min_stock: i64,
        category_id: i64,
    ) -> anyhow::Result<i64> {
        let (status, body) = self
            .post_json(
                "/api/products",
                serde_json::json!({
                    "name": name,
                    "quantity": quantity,
                    "sale_price": 10.0,
                    "purchase_price": 6.0,
                    "min_stock": min_stock,
                    "category": { "existing": category_id }
                }),
            )
            .await?;
        assert_eq!(status, 201, "{}", body);
        Ok(body["data"]["product"]["id"].as_i64().unwrap())
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
