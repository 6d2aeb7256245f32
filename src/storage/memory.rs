//! In-process backend. Behaves like the SQL schema: ids are assigned sequentially and deleting a
//! category detaches its products instead of removing them.

use super::{restocked_quantity, InventoryStore};
use crate::domain::model::{Category, NewCategory, Product, ProductInsert};
use async_trait::async_trait;
use rust_decimal::Decimal;
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
struct StoredProduct {
    id: i64,
    name: String,
    quantity: i64,
    sale_price: Decimal,
    purchase_price: Decimal,
    min_stock: i64,
    category_id: Option<i64>,
}

#[derive(Default)]
struct Tables {
    categories: Vec<Category>,
    products: Vec<StoredProduct>,
    next_category_id: i64,
    next_product_id: i64,
}

impl Tables {
    fn joined(&self, p: &StoredProduct) -> Product {
        let category_name = p.category_id.and_then(|cid| {
            self.categories
                .iter()
                .find(|c| c.id == cid)
                .map(|c| c.name.clone())
        });
        Product {
            id: p.id,
            name: p.name.clone(),
            quantity: p.quantity,
            sale_price: p.sale_price,
            purchase_price: p.purchase_price,
            min_stock: p.min_stock,
            category_id: p.category_id,
            category_name,
        }
    }

    fn detach_products(&mut self, removed: &[i64]) {
        for p in &mut self.products {
            if p.category_id.is_some_and(|cid| removed.contains(&cid)) {
                p.category_id = None;
            }
        }
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl InventoryStore for MemoryStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> anyhow::Result<()> {
        Ok(())
    }

    async fn list_categories(&self) -> anyhow::Result<Vec<Category>> {
        Ok(self.tables.read().await.categories.clone())
    }

    async fn list_products(&self) -> anyhow::Result<Vec<Product>> {
        let tables = self.tables.read().await;
        Ok(tables.products.iter().map(|p| tables.joined(p)).collect())
    }

    async fn get_category(&self, id: i64) -> anyhow::Result<Option<Category>> {
        let tables = self.tables.read().await;
        Ok(tables.categories.iter().find(|c| c.id == id).cloned())
    }

    async fn insert_category(&self, category: &NewCategory) -> anyhow::Result<Category> {
        let mut tables = self.tables.write().await;
        tables.next_category_id += 1;
        let row = Category {
            id: tables.next_category_id,
            name: category.name.clone(),
            description: category.description.clone(),
        };
        tables.categories.push(row.clone());
        Ok(row)
    }

    async fn delete_category(&self, id: i64) -> anyhow::Result<bool> {
        let mut tables = self.tables.write().await;
        let before = tables.categories.len();
        tables.categories.retain(|c| c.id != id);
        let removed = tables.categories.len() != before;
        if removed {
            tables.detach_products(&[id]);
        }
        Ok(removed)
    }

    async fn delete_categories_by_name(&self, name: &str) -> anyhow::Result<u64> {
        let mut tables = self.tables.write().await;
        let removed: Vec<i64> = tables
            .categories
            .iter()
            .filter(|c| c.name == name)
            .map(|c| c.id)
            .collect();
        tables.categories.retain(|c| c.name != name);
        tables.detach_products(&removed);
        Ok(removed.len() as u64)
    }

    async fn insert_product(&self, product: &ProductInsert) -> anyhow::Result<Product> {
        let mut tables = self.tables.write().await;
        tables.next_product_id += 1;
        let row = StoredProduct {
            id: tables.next_product_id,
            name: product.name.clone(),
            quantity: product.quantity,
            sale_price: product.sale_price,
            purchase_price: product.purchase_price,
            min_stock: product.min_stock,
            category_id: Some(product.category_id),
        };
        let joined = tables.joined(&row);
        tables.products.push(row);
        Ok(joined)
    }

    async fn add_quantity(&self, id: i64, amount: i64) -> anyhow::Result<Option<Product>> {
        let mut tables = self.tables.write().await;
        let Some(row) = tables.products.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        row.quantity = restocked_quantity(format!("product {}", id), row.quantity, amount)?;
        let row = row.clone();
        Ok(Some(tables.joined(&row)))
    }

    async fn add_quantity_by_name(&self, name: &str, amount: i64) -> anyhow::Result<u64> {
        let mut tables = self.tables.write().await;
        let updates = tables
            .products
            .iter()
            .enumerate()
            .filter(|(_, p)| p.name == name)
            .map(|(i, p)| -> anyhow::Result<(usize, i64)> {
                Ok((i, restocked_quantity(name, p.quantity, amount)?))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;
        for (i, quantity) in &updates {
            tables.products[*i].quantity = *quantity;
        }
        Ok(updates.len() as u64)
    }

    async fn delete_product(&self, id: i64) -> anyhow::Result<bool> {
        let mut tables = self.tables.write().await;
        let before = tables.products.len();
        tables.products.retain(|p| p.id != id);
        Ok(tables.products.len() != before)
    }

    async fn delete_products_by_name(&self, name: &str) -> anyhow::Result<u64> {
        let mut tables = self.tables.write().await;
        let before = tables.products.len();
        tables.products.retain(|p| p.name != name);
        Ok((before - tables.products.len()) as u64)
    }
}
