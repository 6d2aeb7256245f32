//! Persistence backends for the two inventory tables.
//!
//! Every backend talks to the same logical schema (`kategorie`, `produkty`); the service layer
//! only sees the [`InventoryStore`] trait.

use crate::domain::model::{Category, NewCategory, Product, ProductInsert, MAX_QUANTITY};
use async_trait::async_trait;
use std::fmt::Display;

pub mod memory;
pub mod postgres;
pub mod postgrest;

pub use memory::MemoryStore;
pub use postgres::PostgresStore;
pub use postgrest::PostgrestStore;

/// Table holding categories.
pub const CATEGORY_TABLE: &str = "kategorie";
/// Table holding products; `kategoria_id` references [`CATEGORY_TABLE`].
pub const PRODUCT_TABLE: &str = "produkty";

/// A restock that would push a stored quantity past [`MAX_QUANTITY`]. Nothing is written.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Restocking {product} by {amount} would exceed the maximum quantity of {max}")]
pub struct QuantityOverflow {
    pub product: String,
    pub amount: i64,
    pub max: i64,
}

impl QuantityOverflow {
    pub fn new(product: impl Display, amount: i64) -> Self {
        Self {
            product: product.to_string(),
            amount,
            max: MAX_QUANTITY,
        }
    }
}

/// `quantity + amount`, as long as the result stays within `0..=MAX_QUANTITY`.
pub fn restocked_quantity(
    product: impl Display,
    quantity: i64,
    amount: i64,
) -> Result<i64, QuantityOverflow> {
    quantity
        .checked_add(amount)
        .filter(|q| *q <= MAX_QUANTITY)
        .ok_or_else(|| QuantityOverflow::new(product, amount))
}

/// Row-level access to categories and products.
///
/// Reads return products already joined with their category name. Name-based operations match
/// names exactly and affect every matching row.
#[async_trait]
pub trait InventoryStore: Send + Sync {
    /// Short backend identifier used in logs and the health endpoint.
    fn backend_name(&self) -> &'static str;

    async fn ping(&self) -> anyhow::Result<()>;

    async fn list_categories(&self) -> anyhow::Result<Vec<Category>>;

    async fn list_products(&self) -> anyhow::Result<Vec<Product>>;

    async fn get_category(&self, id: i64) -> anyhow::Result<Option<Category>>;

    async fn insert_category(&self, category: &NewCategory) -> anyhow::Result<Category>;

    /// Returns `false` if no row had this id.
    async fn delete_category(&self, id: i64) -> anyhow::Result<bool>;

    async fn delete_categories_by_name(&self, name: &str) -> anyhow::Result<u64>;

    async fn insert_product(&self, product: &ProductInsert) -> anyhow::Result<Product>;

    /// Adds `amount` to the product's quantity. `None` if the id is unknown.
    ///
    /// Fails with [`QuantityOverflow`] instead of writing a quantity above [`MAX_QUANTITY`].
    async fn add_quantity(&self, id: i64, amount: i64) -> anyhow::Result<Option<Product>>;

    /// All or nothing: if any match would overflow, no row is changed.
    async fn add_quantity_by_name(&self, name: &str, amount: i64) -> anyhow::Result<u64>;

    /// Returns `false` if no row had this id.
    async fn delete_product(&self, id: i64) -> anyhow::Result<bool>;

    async fn delete_products_by_name(&self, name: &str) -> anyhow::Result<u64>;
}
