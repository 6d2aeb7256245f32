//! Domain model for the two inventory tables: categories and products.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Minimum-stock threshold used when a product row has none.
pub const DEFAULT_MIN_STOCK: i64 = 5;

/// Display label for products without a (resolvable) category.
pub const CATEGORY_NONE_LABEL: &str = "none";

/// Largest quantity, threshold or restock amount accepted from a form.
pub const MAX_QUANTITY: i64 = i32::MAX as i64;

/// Largest price `NUMERIC(12, 2)` can hold: 9 999 999 999.99.
pub const MAX_PRICE: Decimal = Decimal::from_parts(0xD4A5_0FFF, 0xE8, 0, false, 2);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Category {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// A product row as read back from the store, already joined with its category name.
///
/// Numeric columns are coerced on read: missing quantity and prices become zero, a missing
/// threshold becomes [`DEFAULT_MIN_STOCK`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub quantity: i64,
    #[schema(value_type = f64)]
    pub sale_price: Decimal,
    #[schema(value_type = f64)]
    pub purchase_price: Decimal,
    pub min_stock: i64,
    pub category_id: Option<i64>,
    pub category_name: Option<String>,
}

impl Product {
    pub fn category_label(&self) -> &str {
        self.category_name.as_deref().unwrap_or(CATEGORY_NONE_LABEL)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NewCategory {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Category selection on the product form: either an existing row, or a name typed in to create
/// a fresh category as part of the insert.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CategoryChoice {
    Existing(i64),
    New(NewCategory),
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NewProduct {
    pub name: String,
    #[serde(default)]
    pub quantity: i64,
    #[schema(value_type = f64)]
    pub sale_price: Decimal,
    #[serde(default)]
    #[schema(value_type = Option<f64>)]
    pub purchase_price: Option<Decimal>,
    #[serde(default)]
    pub min_stock: Option<i64>,
    pub category: CategoryChoice,
}

/// A product insert with the category already resolved to an id. This is what reaches the store.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductInsert {
    pub name: String,
    pub quantity: i64,
    pub sale_price: Decimal,
    pub purchase_price: Decimal,
    pub min_stock: i64,
    pub category_id: i64,
}

impl NewCategory {
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Category name must not be empty".to_string());
        }
        Ok(())
    }

    /// Trimmed copy; an empty description is dropped.
    pub fn normalized(&self) -> NewCategory {
        NewCategory {
            name: self.name.trim().to_string(),
            description: self
                .description
                .as_deref()
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(str::to_string),
        }
    }
}

impl NewProduct {
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Product name must not be empty".to_string());
        }
        check_count("quantity", self.quantity)?;
        check_price("sale_price", self.sale_price)?;
        if let Some(p) = self.purchase_price {
            check_price("purchase_price", p)?;
        }
        if let Some(m) = self.min_stock {
            check_count("min_stock", m)?;
        }
        if let CategoryChoice::New(c) = &self.category {
            c.validate()?;
        }
        Ok(())
    }

    pub fn into_insert(self, category_id: i64) -> ProductInsert {
        ProductInsert {
            name: self.name.trim().to_string(),
            quantity: self.quantity,
            sale_price: self.sale_price,
            purchase_price: self.purchase_price.unwrap_or(Decimal::ZERO),
            min_stock: self.min_stock.unwrap_or(DEFAULT_MIN_STOCK),
            category_id,
        }
    }
}

fn check_count(field: &str, value: i64) -> Result<(), String> {
    if !(0..=MAX_QUANTITY).contains(&value) {
        return Err(format!(
            "{} must be between 0 and {}, got {}",
            field, MAX_QUANTITY, value
        ));
    }
    Ok(())
}

fn check_price(field: &str, value: Decimal) -> Result<(), String> {
    if value < Decimal::ZERO || value > MAX_PRICE {
        return Err(format!(
            "{} must be between 0 and {}, got {}",
            field, MAX_PRICE, value
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product_form(category: CategoryChoice) -> NewProduct {
        NewProduct {
            name: "Hammer".to_string(),
            quantity: 3,
            sale_price: Decimal::new(1000, 2),
            purchase_price: None,
            min_stock: None,
            category,
        }
    }

    #[test]
    fn insert_applies_defaults() {
        let insert = product_form(CategoryChoice::Existing(7)).into_insert(7);
        assert_eq!(insert.min_stock, DEFAULT_MIN_STOCK);
        assert_eq!(insert.purchase_price, Decimal::ZERO);
        assert_eq!(insert.category_id, 7);
    }

    #[test]
    fn inline_category_requires_a_name() {
        let form = product_form(CategoryChoice::New(NewCategory {
            name: "   ".to_string(),
            description: None,
        }));
        assert!(form.validate().is_err());
    }

    #[test]
    fn negative_values_are_rejected() {
        let mut form = product_form(CategoryChoice::Existing(1));
        form.quantity = -1;
        assert!(form.validate().is_err());

        let mut form = product_form(CategoryChoice::Existing(1));
        form.purchase_price = Some(Decimal::new(-1, 0));
        assert!(form.validate().is_err());
    }

    #[test]
    fn values_past_the_column_range_are_rejected() {
        assert_eq!(MAX_PRICE.to_string(), "9999999999.99");

        let mut form = product_form(CategoryChoice::Existing(1));
        form.quantity = MAX_QUANTITY;
        form.sale_price = MAX_PRICE;
        assert!(form.validate().is_ok());

        form.quantity = i64::MAX;
        assert!(form.validate().is_err());

        let mut form = product_form(CategoryChoice::Existing(1));
        form.sale_price = MAX_PRICE + Decimal::new(1, 2);
        assert!(form.validate().is_err());

        let mut form = product_form(CategoryChoice::Existing(1));
        form.min_stock = Some(MAX_QUANTITY + 1);
        assert!(form.validate().is_err());
    }

    #[test]
    fn missing_category_displays_as_none() {
        let p = Product {
            id: 1,
            name: "Saw".to_string(),
            quantity: 0,
            sale_price: Decimal::ZERO,
            purchase_price: Decimal::ZERO,
            min_stock: DEFAULT_MIN_STOCK,
            category_id: None,
            category_name: None,
        };
        assert_eq!(p.category_label(), CATEGORY_NONE_LABEL);
    }

    #[test]
    fn category_choice_wire_format() {
        let existing: CategoryChoice = serde_json::from_str(r#"{"existing": 4}"#).unwrap();
        assert!(matches!(existing, CategoryChoice::Existing(4)));
        let new: CategoryChoice =
            serde_json::from_str(r#"{"new": {"name": "Tools"}}"#).unwrap();
        assert!(matches!(new, CategoryChoice::New(ref c) if c.name == "Tools"));
    }
}
