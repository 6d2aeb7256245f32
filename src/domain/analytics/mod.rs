//! Derived inventory figures.
//!
//! Everything here is a pure function of the fetched rows and is recomputed on every read:
//! per-product margins and values, the low-stock alert list, restock suggestions, aggregate
//! totals, and the two chart series shown on the dashboard.
//!
//! Stored rows are not trusted to be in range, so every sum and product saturates instead of
//! overflowing.

use crate::domain::model::{Category, Product, CATEGORY_NONE_LABEL};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use utoipa::ToSchema;

const PERCENT_DP: u32 = 2;

/// A product is low on stock when its quantity is strictly below its threshold.
pub fn is_low_stock(product: &Product) -> bool {
    product.quantity < product.min_stock
}

/// Units to order to bring the product back to its threshold, if any.
pub fn restock_suggestion(product: &Product) -> Option<i64> {
    let missing = product.min_stock.saturating_sub(product.quantity);
    (missing > 0).then_some(missing)
}

pub fn unit_margin(product: &Product) -> Decimal {
    product.sale_price.saturating_sub(product.purchase_price)
}

/// Margin as a percentage of the sale price. A zero sale price yields zero.
pub fn margin_percent(product: &Product) -> Decimal {
    if product.sale_price.is_zero() {
        return Decimal::ZERO;
    }
    unit_margin(product)
        .checked_div(product.sale_price)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .map(|percent| percent.round_dp(PERCENT_DP))
        .unwrap_or(Decimal::ZERO)
}

/// Inventory value on the sale-price basis.
pub fn stock_value(product: &Product) -> Decimal {
    Decimal::from(product.quantity).saturating_mul(product.sale_price)
}

/// Inventory value on the purchase-price basis.
pub fn cost_value(product: &Product) -> Decimal {
    Decimal::from(product.quantity).saturating_mul(product.purchase_price)
}

pub fn potential_profit(product: &Product) -> Decimal {
    Decimal::from(product.quantity).saturating_mul(unit_margin(product))
}

/// A product row with every derived column attached.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ProductMetrics {
    #[serde(flatten)]
    pub product: Product,
    pub category: String,
    #[schema(value_type = f64)]
    pub unit_margin: Decimal,
    #[schema(value_type = f64)]
    pub margin_percent: Decimal,
    #[schema(value_type = f64)]
    pub stock_value: Decimal,
    #[schema(value_type = f64)]
    pub cost_value: Decimal,
    #[schema(value_type = f64)]
    pub potential_profit: Decimal,
    pub low_stock: bool,
    pub restock_suggestion: Option<i64>,
}

impl ProductMetrics {
    pub fn from_product(product: Product) -> Self {
        Self {
            category: product.category_label().to_string(),
            unit_margin: unit_margin(&product),
            margin_percent: margin_percent(&product),
            stock_value: stock_value(&product),
            cost_value: cost_value(&product),
            potential_profit: potential_profit(&product),
            low_stock: is_low_stock(&product),
            restock_suggestion: restock_suggestion(&product),
            product,
        }
    }
}

pub fn product_metrics(products: &[Product]) -> Vec<ProductMetrics> {
    products.iter().cloned().map(ProductMetrics::from_product).collect()
}

/// One line of the "needs restocking" list.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct RestockItem {
    pub product_id: i64,
    pub name: String,
    pub quantity: i64,
    pub min_stock: i64,
    pub to_order: i64,
}

/// Low-stock products with a positive suggestion, in listing order.
pub fn restock_list(products: &[Product]) -> Vec<RestockItem> {
    products
        .iter()
        .filter(|p| is_low_stock(p))
        .filter_map(|p| {
            restock_suggestion(p).map(|to_order| RestockItem {
                product_id: p.id,
                name: p.name.clone(),
                quantity: p.quantity,
                min_stock: p.min_stock,
                to_order,
            })
        })
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct InventorySummary {
    pub product_count: usize,
    pub category_count: usize,
    pub total_units: i64,
    #[schema(value_type = f64)]
    pub total_stock_value: Decimal,
    #[schema(value_type = f64)]
    pub total_cost_value: Decimal,
    #[schema(value_type = f64)]
    pub total_potential_profit: Decimal,
    pub low_stock_count: usize,
    /// Mean margin over products with a non-zero sale price (zero if there are none).
    #[schema(value_type = f64)]
    pub average_margin_percent: Decimal,
}

pub fn summarize(products: &[Product], category_count: usize) -> InventorySummary {
    let mut summary = InventorySummary {
        product_count: products.len(),
        category_count,
        ..InventorySummary::default()
    };

    let mut margin_sum = Decimal::ZERO;
    let mut priced = 0u32;
    for p in products {
        summary.total_units = summary.total_units.saturating_add(p.quantity);
        summary.total_stock_value = summary.total_stock_value.saturating_add(stock_value(p));
        summary.total_cost_value = summary.total_cost_value.saturating_add(cost_value(p));
        summary.total_potential_profit = summary
            .total_potential_profit
            .saturating_add(potential_profit(p));
        if is_low_stock(p) {
            summary.low_stock_count += 1;
        }
        if !p.sale_price.is_zero() {
            margin_sum = margin_sum.saturating_add(margin_percent(p));
            priced += 1;
        }
    }
    if priced > 0 {
        summary.average_margin_percent = (margin_sum / Decimal::from(priced)).round_dp(PERCENT_DP);
    }
    summary
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ChartPoint {
    pub label: String,
    #[schema(value_type = f64)]
    pub value: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct ChartSeries {
    /// Bar chart: units on hand per product.
    pub stock_by_product: Vec<ChartPoint>,
    /// Pie chart: stock value per category, `"none"` for uncategorized products.
    pub value_by_category: Vec<ChartPoint>,
}

pub fn chart_series(products: &[Product]) -> ChartSeries {
    let stock_by_product = products
        .iter()
        .map(|p| ChartPoint {
            label: p.name.clone(),
            value: Decimal::from(p.quantity),
        })
        .collect();

    let mut by_category: BTreeMap<&str, Decimal> = BTreeMap::new();
    for p in products {
        let total = by_category
            .entry(p.category_name.as_deref().unwrap_or(CATEGORY_NONE_LABEL))
            .or_insert(Decimal::ZERO);
        *total = total.saturating_add(stock_value(p));
    }
    let value_by_category = by_category
        .into_iter()
        .map(|(label, value)| ChartPoint {
            label: label.to_string(),
            value,
        })
        .collect();

    ChartSeries {
        stock_by_product,
        value_by_category,
    }
}

/// Everything the dashboard shows, computed from one read of both tables.
#[derive(Debug, Clone, Default, Serialize, ToSchema)]
pub struct Dashboard {
    pub summary: InventorySummary,
    pub alerts: Vec<RestockItem>,
    pub charts: ChartSeries,
    pub categories: Vec<Category>,
    pub products: Vec<ProductMetrics>,
}

impl Dashboard {
    pub fn build(categories: Vec<Category>, products: Vec<Product>) -> Self {
        Self {
            summary: summarize(&products, categories.len()),
            alerts: restock_list(&products),
            charts: chart_series(&products),
            products: product_metrics(&products),
            categories,
        }
    }
}
