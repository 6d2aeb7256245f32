use crate::domain::model::NewProduct;
use crate::transport::http::handlers::common::{bad_request, error_response, ok_response};
use crate::transport::http::types::{json_422, AppState, NameQuery, RestockRequest};
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

#[utoipa::path(
    get,
    path = "/api/products",
    responses(
        (status = 200, description = "All products with category name and derived figures", body = ApiResponse),
        (status = 500, description = "Backend error", body = ApiResponse)
    )
)]
pub async fn list_products_handler(State(state): State<AppState>) -> impl IntoResponse {
    match state.service.list_products().await {
        Ok(products) => ok_response(StatusCode::OK, &products),
        Err(e) => error_response(e),
    }
}

#[utoipa::path(
    post,
    path = "/api/products",
    request_body = NewProduct,
    responses(
        (status = 201, description = "Product created (and its category, if typed in)", body = ApiResponse),
        (status = 400, description = "Validation failed", body = ApiResponse),
        (status = 404, description = "Selected category does not exist", body = ApiResponse),
        (status = 422, description = "Unprocessable entity (invalid JSON body)", body = ApiResponse),
        (status = 500, description = "Backend error", body = ApiResponse)
    )
)]
pub async fn create_product_handler(
    State(state): State<AppState>,
    request: Result<Json<NewProduct>, JsonRejection>,
) -> impl IntoResponse {
    let Json(request) = match request {
        Ok(v) => v,
        Err(e) => {
            return json_422(
                e,
                "{\"name\": \"...\", \"quantity\": 0, \"sale_price\": 0.0, \"category\": {\"existing\": 1} | {\"new\": {\"name\": \"...\"}}}",
            )
            .into_response()
        }
    };

    match state.service.add_product(request).await {
        Ok(created) => ok_response(StatusCode::CREATED, &created),
        Err(e) => error_response(e),
    }
}

#[utoipa::path(
    post,
    path = "/api/products/{id}/restock",
    params(
        ("id" = i64, Path, description = "Product id")
    ),
    request_body = RestockRequest,
    responses(
        (status = 200, description = "Quantity increased", body = ApiResponse),
        (status = 400, description = "Amount not positive", body = ApiResponse),
        (status = 404, description = "No such product", body = ApiResponse),
        (status = 422, description = "Unprocessable entity (invalid JSON body)", body = ApiResponse),
        (status = 500, description = "Backend error", body = ApiResponse)
    )
)]
pub async fn restock_product_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    request: Result<Json<RestockRequest>, JsonRejection>,
) -> impl IntoResponse {
    let Json(request) = match request {
        Ok(v) => v,
        Err(e) => return json_422(e, "{\"amount\": 1}").into_response(),
    };

    match state.service.restock_product(id, request.amount).await {
        Ok(product) => ok_response(StatusCode::OK, &product),
        Err(e) => error_response(e),
    }
}

#[utoipa::path(
    delete,
    path = "/api/products/{id}",
    params(
        ("id" = i64, Path, description = "Product id")
    ),
    responses(
        (status = 200, description = "Product deleted", body = ApiResponse),
        (status = 404, description = "No such product", body = ApiResponse),
        (status = 500, description = "Backend error", body = ApiResponse)
    )
)]
pub async fn delete_product_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    match state.service.delete_product(id).await {
        Ok(()) => ok_response(StatusCode::OK, &serde_json::json!({ "deleted": 1, "id": id })),
        Err(e) => error_response(e),
    }
}

#[utoipa::path(
    delete,
    path = "/api/products",
    params(NameQuery),
    responses(
        (status = 200, description = "Every product with this exact name deleted", body = ApiResponse),
        (status = 400, description = "Missing name", body = ApiResponse),
        (status = 500, description = "Backend error", body = ApiResponse)
    )
)]
pub async fn delete_products_by_name_handler(
    State(state): State<AppState>,
    query: Result<Query<NameQuery>, QueryRejection>,
) -> impl IntoResponse {
    let Query(query) = match query {
        Ok(q) => q,
        Err(e) => return bad_request(format!("Invalid query: {} (expected: ?name=...)", e)),
    };

    match state.service.delete_products_by_name(&query.name).await {
        Ok(removed) => ok_response(
            StatusCode::OK,
            &serde_json::json!({ "deleted": removed, "name": query.name }),
        ),
        Err(e) => error_response(e),
    }
}
