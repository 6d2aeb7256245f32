//! Direct PostgreSQL backend (sqlx).

use super::{InventoryStore, QuantityOverflow, CATEGORY_TABLE, PRODUCT_TABLE};
use crate::domain::model::{
    Category, NewCategory, Product, ProductInsert, DEFAULT_MIN_STOCK, MAX_QUANTITY,
};
use async_trait::async_trait;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};

pub struct PostgresStore {
    pool: PgPool,
}

fn product_select() -> String {
    format!(
        "SELECT p.id::int8 AS id,
                COALESCE(p.nazwa, '') AS name,
                COALESCE(p.liczba, 0)::int8 AS quantity,
                COALESCE(p.cena, 0)::numeric AS sale_price,
                COALESCE(p.cena_zakupu, 0)::numeric AS purchase_price,
                COALESCE(p.stan_minimalny, {default_min})::int8 AS min_stock,
                p.kategoria_id::int8 AS category_id,
                k.nazwa AS category_name
         FROM {products} p
         LEFT JOIN {categories} k ON k.id = p.kategoria_id",
        default_min = DEFAULT_MIN_STOCK,
        products = PRODUCT_TABLE,
        categories = CATEGORY_TABLE,
    )
}

fn product_from_row(row: &PgRow) -> Result<Product, sqlx::Error> {
    Ok(Product {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        quantity: row.try_get("quantity")?,
        sale_price: row.try_get("sale_price")?,
        purchase_price: row.try_get("purchase_price")?,
        min_stock: row.try_get("min_stock")?,
        category_id: row.try_get("category_id")?,
        category_name: row.try_get("category_name")?,
    })
}

fn category_from_row(row: &PgRow) -> Result<Category, sqlx::Error> {
    Ok(Category {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
    })
}

impl PostgresStore {
    /// Connects and makes sure both tables (and the optional pricing/threshold columns) exist.
    pub async fn connect(database_url: &str, max_connections: u32) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        let store = Self { pool };
        store.ensure_schema().await?;
        Ok(store)
    }

    pub async fn ensure_schema(&self) -> anyhow::Result<()> {
        sqlx::query(&format!(
            "CREATE TABLE IF NOT EXISTS {} (
                id BIGSERIAL PRIMARY KEY,
                nazwa TEXT NOT NULL,
                opis TEXT
            )",
            CATEGORY_TABLE
        ))
        .execute(&self.pool)
        .await?;

        sqlx::query(&format!(
            "CREATE TABLE IF NOT EXISTS {} (
                id BIGSERIAL PRIMARY KEY,
                nazwa TEXT NOT NULL,
                liczba BIGINT NOT NULL DEFAULT 0,
                cena NUMERIC(12, 2) NOT NULL DEFAULT 0,
                kategoria_id BIGINT REFERENCES {}(id) ON DELETE SET NULL
            )",
            PRODUCT_TABLE, CATEGORY_TABLE
        ))
        .execute(&self.pool)
        .await?;

        // Older deployments predate purchase prices and thresholds.
        for column in [
            "cena_zakupu NUMERIC(12, 2)",
            "stan_minimalny BIGINT",
        ] {
            sqlx::query(&format!(
                "ALTER TABLE {} ADD COLUMN IF NOT EXISTS {}",
                PRODUCT_TABLE, column
            ))
            .execute(&self.pool)
            .await?;
        }
        Ok(())
    }

    async fn fetch_product(&self, id: i64) -> anyhow::Result<Option<Product>> {
        let sql = format!("{} WHERE p.id = $1", product_select());
        let row = sqlx::query(&sql).bind(id).fetch_optional(&self.pool).await?;
        Ok(row.as_ref().map(product_from_row).transpose()?)
    }
}

#[async_trait]
impl InventoryStore for PostgresStore {
    fn backend_name(&self) -> &'static str {
        "postgres"
    }

    async fn ping(&self) -> anyhow::Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn list_categories(&self) -> anyhow::Result<Vec<Category>> {
        let rows = sqlx::query(&format!(
            "SELECT id::int8 AS id, COALESCE(nazwa, '') AS name, opis AS description
             FROM {} ORDER BY id",
            CATEGORY_TABLE
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .iter()
            .map(category_from_row)
            .collect::<Result<Vec<_>, _>>()?)
    }

    async fn list_products(&self) -> anyhow::Result<Vec<Product>> {
        let sql = format!("{} ORDER BY p.id", product_select());
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        Ok(rows
            .iter()
            .map(product_from_row)
            .collect::<Result<Vec<_>, _>>()?)
    }

    async fn get_category(&self, id: i64) -> anyhow::Result<Option<Category>> {
        let row = sqlx::query(&format!(
            "SELECT id::int8 AS id, COALESCE(nazwa, '') AS name, opis AS description
             FROM {} WHERE id = $1",
            CATEGORY_TABLE
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.as_ref().map(category_from_row).transpose()?)
    }

    async fn insert_category(&self, category: &NewCategory) -> anyhow::Result<Category> {
        let row = sqlx::query(&format!(
            "INSERT INTO {} (nazwa, opis) VALUES ($1, $2)
             RETURNING id::int8 AS id, nazwa AS name, opis AS description",
            CATEGORY_TABLE
        ))
        .bind(&category.name)
        .bind(&category.description)
        .fetch_one(&self.pool)
        .await?;
        Ok(category_from_row(&row)?)
    }

    async fn delete_category(&self, id: i64) -> anyhow::Result<bool> {
        let result = sqlx::query(&format!("DELETE FROM {} WHERE id = $1", CATEGORY_TABLE))
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_categories_by_name(&self, name: &str) -> anyhow::Result<u64> {
        let result = sqlx::query(&format!("DELETE FROM {} WHERE nazwa = $1", CATEGORY_TABLE))
            .bind(name)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn insert_product(&self, product: &ProductInsert) -> anyhow::Result<Product> {
        let id: i64 = sqlx::query_scalar(&format!(
            "INSERT INTO {} (nazwa, liczba, cena, cena_zakupu, stan_minimalny, kategoria_id)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING id::int8",
            PRODUCT_TABLE
        ))
        .bind(&product.name)
        .bind(product.quantity)
        .bind(product.sale_price)
        .bind(product.purchase_price)
        .bind(product.min_stock)
        .bind(product.category_id)
        .fetch_one(&self.pool)
        .await?;

        self.fetch_product(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Inserted product {} vanished before read-back", id))
    }

    async fn add_quantity(&self, id: i64, amount: i64) -> anyhow::Result<Option<Product>> {
        let mut tx = self.pool.begin().await?;
        let quantity: Option<i64> = sqlx::query_scalar(&format!(
            "UPDATE {} SET liczba = COALESCE(liczba, 0) + $1 WHERE id = $2
             RETURNING liczba::int8",
            PRODUCT_TABLE
        ))
        .bind(amount)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
        match quantity {
            None => return Ok(None),
            Some(q) if q > MAX_QUANTITY => {
                tx.rollback().await?;
                return Err(QuantityOverflow::new(format!("product {}", id), amount).into());
            }
            Some(_) => tx.commit().await?,
        }
        self.fetch_product(id).await
    }

    async fn add_quantity_by_name(&self, name: &str, amount: i64) -> anyhow::Result<u64> {
        let mut tx = self.pool.begin().await?;
        let quantities: Vec<i64> = sqlx::query_scalar(&format!(
            "UPDATE {} SET liczba = COALESCE(liczba, 0) + $1 WHERE nazwa = $2
             RETURNING liczba::int8",
            PRODUCT_TABLE
        ))
        .bind(amount)
        .bind(name)
        .fetch_all(&mut *tx)
        .await?;
        if quantities.iter().any(|q| *q > MAX_QUANTITY) {
            tx.rollback().await?;
            return Err(QuantityOverflow::new(name, amount).into());
        }
        tx.commit().await?;
        Ok(quantities.len() as u64)
    }

    async fn delete_product(&self, id: i64) -> anyhow::Result<bool> {
        let result = sqlx::query(&format!("DELETE FROM {} WHERE id = $1", PRODUCT_TABLE))
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_products_by_name(&self, name: &str) -> anyhow::Result<u64> {
        let result = sqlx::query(&format!("DELETE FROM {} WHERE nazwa = $1", PRODUCT_TABLE))
            .bind(name)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
