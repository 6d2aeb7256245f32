use crate::app::inventory_service::{ProductCreated, RestockApplied};
use crate::domain::analytics::{
    ChartPoint, ChartSeries, Dashboard, InventorySummary, ProductMetrics, RestockItem,
};
use crate::domain::model::{Category, CategoryChoice, NewCategory, NewProduct, Product};
use crate::transport::http::handlers::{categories, dashboard, health, products, restock};
use crate::transport::http::types::{ApiResponse, RestockByNameRequest, RestockRequest};
use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        health::healthcheck_handler,
        dashboard::dashboard_handler,
        categories::list_categories_handler,
        categories::create_category_handler,
        categories::delete_category_handler,
        categories::delete_categories_by_name_handler,
        products::list_products_handler,
        products::create_product_handler,
        products::restock_product_handler,
        products::delete_product_handler,
        products::delete_products_by_name_handler,
        restock::restock_list_handler,
        restock::restock_by_name_handler,
        restock::fulfil_restock_handler,
        restock::export_csv_handler,
        restock::export_pdf_handler
    ),
    components(schemas(
        ApiResponse,
        Category,
        NewCategory,
        CategoryChoice,
        NewProduct,
        Product,
        ProductMetrics,
        ProductCreated,
        RestockItem,
        RestockApplied,
        RestockRequest,
        RestockByNameRequest,
        InventorySummary,
        ChartPoint,
        ChartSeries,
        Dashboard
    ))
)]
#[allow(dead_code)]
pub struct ApiDoc;

pub fn create_router(app_state: crate::transport::http::types::AppState) -> Router {
    Router::new()
        .route("/health", get(health::healthcheck_handler))
        .route("/api/dashboard", get(dashboard::dashboard_handler))
        .route(
            "/api/categories",
            get(categories::list_categories_handler)
                .post(categories::create_category_handler)
                .delete(categories::delete_categories_by_name_handler),
        )
        .route("/api/categories/:id", delete(categories::delete_category_handler))
        .route(
            "/api/products",
            get(products::list_products_handler)
                .post(products::create_product_handler)
                .delete(products::delete_products_by_name_handler),
        )
        .route("/api/products/:id", delete(products::delete_product_handler))
        .route("/api/products/:id/restock", post(products::restock_product_handler))
        .route("/api/restock", get(restock::restock_list_handler))
        .route("/api/restock/by-name", post(restock::restock_by_name_handler))
        .route("/api/restock/fulfil", post(restock::fulfil_restock_handler))
        .route("/api/restock/export.csv", get(restock::export_csv_handler))
        .route("/api/restock/export.pdf", get(restock::export_pdf_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
