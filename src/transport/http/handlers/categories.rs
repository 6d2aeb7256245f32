use crate::domain::model::NewCategory;
use crate::transport::http::handlers::common::{bad_request, error_response, ok_response};
use crate::transport::http::types::{json_422, AppState, NameQuery};
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

#[utoipa::path(
    get,
    path = "/api/categories",
    responses(
        (status = 200, description = "All categories", body = ApiResponse),
        (status = 500, description = "Backend error", body = ApiResponse)
    )
)]
pub async fn list_categories_handler(State(state): State<AppState>) -> impl IntoResponse {
    match state.service.list_categories().await {
        Ok(categories) => ok_response(StatusCode::OK, &categories),
        Err(e) => error_response(e),
    }
}

#[utoipa::path(
    post,
    path = "/api/categories",
    request_body = NewCategory,
    responses(
        (status = 201, description = "Category created", body = ApiResponse),
        (status = 400, description = "Empty name", body = ApiResponse),
        (status = 422, description = "Unprocessable entity (invalid JSON body)", body = ApiResponse),
        (status = 500, description = "Backend error", body = ApiResponse)
    )
)]
pub async fn create_category_handler(
    State(state): State<AppState>,
    request: Result<Json<NewCategory>, JsonRejection>,
) -> impl IntoResponse {
    let Json(request) = match request {
        Ok(v) => v,
        Err(e) => {
            return json_422(e, "{\"name\": \"...\", \"description\": \"...\"}").into_response()
        }
    };

    match state.service.add_category(request).await {
        Ok(category) => ok_response(StatusCode::CREATED, &category),
        Err(e) => error_response(e),
    }
}

#[utoipa::path(
    delete,
    path = "/api/categories/{id}",
    params(
        ("id" = i64, Path, description = "Category id")
    ),
    responses(
        (status = 200, description = "Category deleted; its products lose their category", body = ApiResponse),
        (status = 404, description = "No such category", body = ApiResponse),
        (status = 500, description = "Backend error", body = ApiResponse)
    )
)]
pub async fn delete_category_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    match state.service.delete_category(id).await {
        Ok(()) => ok_response(StatusCode::OK, &serde_json::json!({ "deleted": 1, "id": id })),
        Err(e) => error_response(e),
    }
}

#[utoipa::path(
    delete,
    path = "/api/categories",
    params(NameQuery),
    responses(
        (status = 200, description = "Every category with this exact name deleted", body = ApiResponse),
        (status = 400, description = "Missing name", body = ApiResponse),
        (status = 500, description = "Backend error", body = ApiResponse)
    )
)]
pub async fn delete_categories_by_name_handler(
    State(state): State<AppState>,
    query: Result<Query<NameQuery>, QueryRejection>,
) -> impl IntoResponse {
    let Query(query) = match query {
        Ok(q) => q,
        Err(e) => return bad_request(format!("Invalid query: {} (expected: ?name=...)", e)),
    };

    match state.service.delete_categories_by_name(&query.name).await {
        Ok(removed) => ok_response(
            StatusCode::OK,
            &serde_json::json!({ "deleted": removed, "name": query.name }),
        ),
        Err(e) => error_response(e),
    }
}
