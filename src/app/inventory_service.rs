//! The inventory service.
//!
//! Sits between the HTTP layer and whichever [`InventoryStore`] is configured. It is responsible
//! for:
//! 1.  Validating form input before anything reaches the store.
//! 2.  Resolving the inline "new category" choice into an insert-then-reference.
//! 3.  Attaching derived figures (margins, values, alerts) to every read.
//! 4.  Rendering the restock list as CSV or PDF.

use crate::domain::analytics::{self, Dashboard, ProductMetrics, RestockItem};
use crate::domain::export;
use crate::domain::model::{Category, CategoryChoice, NewCategory, NewProduct, MAX_QUANTITY};
use crate::infra::config::{Backend, Config};
use crate::storage::{
    InventoryStore, MemoryStore, PostgresStore, PostgrestStore, QuantityOverflow,
};
use chrono::NaiveDate;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Debug, thiserror::Error)]
pub enum InventoryError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    #[error(transparent)]
    Backend(anyhow::Error),
}

/// Store errors are backend failures, except a refused restock, which is the caller's input.
impl From<anyhow::Error> for InventoryError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<QuantityOverflow>() {
            Ok(overflow) => InventoryError::Validation(overflow.to_string()),
            Err(err) => InventoryError::Backend(err),
        }
    }
}

pub type InventoryResult<T> = Result<T, InventoryError>;

/// Result of a product insert: the new row, plus the category row if one was created inline.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ProductCreated {
    pub product: ProductMetrics,
    pub created_category: Option<Category>,
}

/// Result of applying the whole restock list.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RestockApplied {
    pub restocked: Vec<RestockItem>,
    pub units_added: i64,
}

pub struct InventoryService {
    store: Arc<dyn InventoryStore>,
}

impl InventoryService {
    pub fn new(store: Arc<dyn InventoryStore>) -> Self {
        Self { store }
    }

    /// Connects the store selected by `config`.
    pub async fn from_config(config: &Config) -> anyhow::Result<Self> {
        let store: Arc<dyn InventoryStore> = match &config.backend {
            Backend::Postgres {
                database_url,
                max_connections,
            } => Arc::new(PostgresStore::connect(database_url, *max_connections).await?),
            Backend::Postgrest { base_url, api_key } => {
                Arc::new(PostgrestStore::new(base_url, api_key.clone()))
            }
            Backend::Memory => Arc::new(MemoryStore::new()),
        };
        tracing::info!(backend = store.backend_name(), "inventory store ready");
        Ok(Self::new(store))
    }

    pub fn backend_name(&self) -> &'static str {
        self.store.backend_name()
    }

    pub async fn ping(&self) -> anyhow::Result<()> {
        self.store.ping().await
    }

    pub async fn list_categories(&self) -> InventoryResult<Vec<Category>> {
        Ok(self.store.list_categories().await?)
    }

    pub async fn list_products(&self) -> InventoryResult<Vec<ProductMetrics>> {
        let products = self.store.list_products().await?;
        Ok(analytics::product_metrics(&products))
    }

    /// Reads both tables and derives every dashboard view from that single snapshot.
    pub async fn dashboard(&self) -> InventoryResult<Dashboard> {
        let categories = self.store.list_categories().await?;
        let products = self.store.list_products().await?;
        Ok(Dashboard::build(categories, products))
    }

    pub async fn restock_list(&self) -> InventoryResult<Vec<RestockItem>> {
        let products = self.store.list_products().await?;
        Ok(analytics::restock_list(&products))
    }

    pub async fn add_category(&self, category: NewCategory) -> InventoryResult<Category> {
        category.validate().map_err(InventoryError::Validation)?;
        let row = self.store.insert_category(&category.normalized()).await?;
        tracing::info!(id = row.id, name = %row.name, "category added");
        Ok(row)
    }

    pub async fn delete_category(&self, id: i64) -> InventoryResult<()> {
        if !self.store.delete_category(id).await? {
            return Err(InventoryError::NotFound(format!("Category {} not found", id)));
        }
        tracing::info!(id, "category deleted");
        Ok(())
    }

    /// Removes every category whose name matches exactly. Returns how many rows went away.
    pub async fn delete_categories_by_name(&self, name: &str) -> InventoryResult<u64> {
        let removed = self.store.delete_categories_by_name(name).await?;
        tracing::info!(name, removed, "categories deleted by name");
        Ok(removed)
    }

    pub async fn add_product(&self, product: NewProduct) -> InventoryResult<ProductCreated> {
        product.validate().map_err(InventoryError::Validation)?;

        let (category_id, created_category) = match &product.category {
            CategoryChoice::Existing(id) => {
                if self.store.get_category(*id).await?.is_none() {
                    return Err(InventoryError::NotFound(format!(
                        "Category {} not found",
                        id
                    )));
                }
                (*id, None)
            }
            CategoryChoice::New(new_category) => {
                let row = self.store.insert_category(&new_category.normalized()).await?;
                tracing::info!(id = row.id, name = %row.name, "category added inline");
                (row.id, Some(row))
            }
        };

        let inserted = self
            .store
            .insert_product(&product.into_insert(category_id))
            .await?;
        tracing::info!(id = inserted.id, name = %inserted.name, category_id, "product added");
        Ok(ProductCreated {
            product: ProductMetrics::from_product(inserted),
            created_category,
        })
    }

    /// Records a delivery: adds `amount` units to the product's quantity.
    pub async fn restock_product(&self, id: i64, amount: i64) -> InventoryResult<ProductMetrics> {
        validate_amount(amount)?;
        let updated = self
            .store
            .add_quantity(id, amount)
            .await?
            .ok_or_else(|| InventoryError::NotFound(format!("Product {} not found", id)))?;
        tracing::info!(id, amount, quantity = updated.quantity, "product restocked");
        Ok(ProductMetrics::from_product(updated))
    }

    /// Adds `amount` units to every product whose name matches exactly.
    pub async fn restock_products_by_name(&self, name: &str, amount: i64) -> InventoryResult<u64> {
        validate_amount(amount)?;
        let touched = self.store.add_quantity_by_name(name, amount).await?;
        tracing::info!(name, amount, touched, "products restocked by name");
        Ok(touched)
    }

    /// Tops every low-stock product up to its threshold.
    ///
    /// Each product is one independent update; a failure part-way leaves the earlier ones applied.
    pub async fn fulfil_restock_list(&self) -> InventoryResult<RestockApplied> {
        let list = self.restock_list().await?;
        let mut restocked = Vec::with_capacity(list.len());
        let mut units_added = 0;
        for item in list {
            if self.store.add_quantity(item.product_id, item.to_order).await?.is_none() {
                tracing::warn!(id = item.product_id, "product disappeared before restock");
                continue;
            }
            units_added = i64::saturating_add(units_added, item.to_order);
            restocked.push(item);
        }
        tracing::info!(products = restocked.len(), units_added, "restock list fulfilled");
        Ok(RestockApplied {
            restocked,
            units_added,
        })
    }

    pub async fn delete_product(&self, id: i64) -> InventoryResult<()> {
        if !self.store.delete_product(id).await? {
            return Err(InventoryError::NotFound(format!("Product {} not found", id)));
        }
        tracing::info!(id, "product deleted");
        Ok(())
    }

    /// Removes every product whose name matches exactly. Returns how many rows went away.
    pub async fn delete_products_by_name(&self, name: &str) -> InventoryResult<u64> {
        let removed = self.store.delete_products_by_name(name).await?;
        tracing::info!(name, removed, "products deleted by name");
        Ok(removed)
    }

    pub async fn export_restock_csv(&self) -> InventoryResult<Vec<u8>> {
        let list = self.restock_list().await?;
        Ok(export::restock_csv(&list)?)
    }

    pub async fn export_restock_pdf(&self, generated_on: NaiveDate) -> InventoryResult<Vec<u8>> {
        let list = self.restock_list().await?;
        Ok(export::restock_pdf(&list, generated_on))
    }
}

fn validate_amount(amount: i64) -> InventoryResult<()> {
    if !(1..=MAX_QUANTITY).contains(&amount) {
        return Err(InventoryError::Validation(format!(
            "Restock amount must be between 1 and {}, got {}",
            MAX_QUANTITY, amount
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn service() -> InventoryService {
        InventoryService::new(Arc::new(MemoryStore::new()))
    }

    fn category(name: &str) -> NewCategory {
        NewCategory {
            name: name.to_string(),
            description: None,
        }
    }

    fn new_product(name: &str, quantity: i64, category: CategoryChoice) -> NewProduct {
        NewProduct {
            name: name.to_string(),
            quantity,
            sale_price: "10.00".parse().unwrap(),
            purchase_price: Some("6.00".parse().unwrap()),
            min_stock: Some(5),
            category,
        }
    }

    #[tokio::test]
    async fn inline_category_is_created_once_and_referenced() {
        let svc = service();
        let created = svc
            .add_product(new_product(
                "Hammer",
                3,
                CategoryChoice::New(NewCategory {
                    name: " Tools ".to_string(),
                    description: Some(String::new()),
                }),
            ))
            .await
            .unwrap();

        let categories = svc.list_categories().await.unwrap();
        assert_eq!(categories.len(), 1);
        assert_eq!(categories[0].name, "Tools");
        assert_eq!(categories[0].description, None);
        let category = created.created_category.unwrap();
        assert_eq!(created.product.product.category_id, Some(category.id));
        assert_eq!(created.product.category, "Tools");
        assert_eq!(created.product.margin_percent, Decimal::from(40));
    }

    #[tokio::test]
    async fn unknown_existing_category_is_not_found() {
        let svc = service();
        let err = svc
            .add_product(new_product("Hammer", 1, CategoryChoice::Existing(99)))
            .await
            .unwrap_err();
        assert!(matches!(err, InventoryError::NotFound(_)));
        assert!(svc.list_products().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn restock_validates_amount_and_id() {
        let svc = service();
        let cat = svc.add_category(category("Tools")).await.unwrap();
        let p = svc
            .add_product(new_product("Saw", 2, CategoryChoice::Existing(cat.id)))
            .await
            .unwrap()
            .product;

        assert!(matches!(
            svc.restock_product(p.product.id, 0).await,
            Err(InventoryError::Validation(_))
        ));
        assert!(matches!(
            svc.restock_product(p.product.id + 100, 1).await,
            Err(InventoryError::NotFound(_))
        ));

        let updated = svc.restock_product(p.product.id, 3).await.unwrap();
        assert_eq!(updated.product.quantity, 5);
        assert!(!updated.low_stock);
    }

    #[tokio::test]
    async fn fulfilling_the_list_clears_all_alerts() {
        let svc = service();
        let cat = svc.add_category(category("Tools")).await.unwrap();
        for (name, qty) in [("A", 0), ("B", 4), ("C", 9)] {
            svc.add_product(new_product(name, qty, CategoryChoice::Existing(cat.id)))
                .await
                .unwrap();
        }

        let applied = svc.fulfil_restock_list().await.unwrap();
        assert_eq!(applied.restocked.len(), 2);
        assert_eq!(applied.units_added, 6);
        assert!(svc.restock_list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn oversized_input_is_refused_before_it_is_stored() {
        let svc = service();
        let cat = svc.add_category(category("Tools")).await.unwrap();

        let mut huge = new_product("Nails", i64::MAX, CategoryChoice::Existing(cat.id));
        huge.sale_price = "9999999999.00".parse().unwrap();
        assert!(matches!(svc.add_product(huge).await, Err(InventoryError::Validation(_))));
        assert!(svc.list_products().await.unwrap().is_empty());

        let full = svc
            .add_product(new_product("Nails", MAX_QUANTITY, CategoryChoice::Existing(cat.id)))
            .await
            .unwrap()
            .product;
        let id = full.product.id;
        assert!(matches!(
            svc.restock_product(id, i64::MAX).await,
            Err(InventoryError::Validation(_))
        ));
        assert!(matches!(svc.restock_product(id, 1).await, Err(InventoryError::Validation(_))));
        assert!(matches!(
            svc.restock_products_by_name("Nails", 1).await,
            Err(InventoryError::Validation(_))
        ));

        let dashboard = svc.dashboard().await.unwrap();
        assert_eq!(dashboard.summary.total_units, MAX_QUANTITY);
    }

    #[tokio::test]
    async fn empty_category_name_is_a_validation_error() {
        let svc = service();
        let err = svc.add_category(category("  ")).await.unwrap_err();
        assert!(matches!(err, InventoryError::Validation(_)));
    }
}
