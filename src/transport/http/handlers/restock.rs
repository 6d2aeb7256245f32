use crate::domain::export::export_filename;
use crate::transport::http::handlers::common::{error_response, ok_response};
use crate::transport::http::types::{json_422, AppState, RestockByNameRequest};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;

const CSV_CONTENT_TYPE: &str = "text/csv; charset=utf-8";
const PDF_CONTENT_TYPE: &str = "application/pdf";

fn attachment(content_type: &str, filename: String, body: Vec<u8>) -> axum::response::Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        body,
    )
        .into_response()
}

fn today() -> chrono::NaiveDate {
    chrono::Local::now().date_naive()
}

#[utoipa::path(
    get,
    path = "/api/restock",
    responses(
        (status = 200, description = "Products below their minimum with the quantity to order", body = ApiResponse),
        (status = 500, description = "Backend error", body = ApiResponse)
    )
)]
pub async fn restock_list_handler(State(state): State<AppState>) -> impl IntoResponse {
    match state.service.restock_list().await {
        Ok(list) => ok_response(StatusCode::OK, &list),
        Err(e) => error_response(e),
    }
}

#[utoipa::path(
    post,
    path = "/api/restock/by-name",
    request_body = RestockByNameRequest,
    responses(
        (status = 200, description = "Every product with this exact name restocked", body = ApiResponse),
        (status = 400, description = "Amount not positive", body = ApiResponse),
        (status = 422, description = "Unprocessable entity (invalid JSON body)", body = ApiResponse),
        (status = 500, description = "Backend error", body = ApiResponse)
    )
)]
pub async fn restock_by_name_handler(
    State(state): State<AppState>,
    request: Result<Json<RestockByNameRequest>, JsonRejection>,
) -> impl IntoResponse {
    let Json(request) = match request {
        Ok(v) => v,
        Err(e) => {
            return json_422(e, "{\"name\": \"...\", \"amount\": 1}").into_response();
        }
    };

    match state
        .service
        .restock_products_by_name(&request.name, request.amount)
        .await
    {
        Ok(touched) => ok_response(
            StatusCode::OK,
            &serde_json::json!({
                "restocked": touched,
                "name": request.name,
                "amount": request.amount
            }),
        ),
        Err(e) => error_response(e),
    }
}

#[utoipa::path(
    post,
    path = "/api/restock/fulfil",
    responses(
        (status = 200, description = "Every low-stock product topped up to its minimum", body = ApiResponse),
        (status = 500, description = "Backend error", body = ApiResponse)
    )
)]
pub async fn fulfil_restock_handler(State(state): State<AppState>) -> impl IntoResponse {
    match state.service.fulfil_restock_list().await {
        Ok(applied) => ok_response(StatusCode::OK, &applied),
        Err(e) => error_response(e),
    }
}

#[utoipa::path(
    get,
    path = "/api/restock/export.csv",
    responses(
        (status = 200, description = "Restock list as CSV", body = String, content_type = "text/csv"),
        (status = 500, description = "Backend error", body = ApiResponse)
    )
)]
pub async fn export_csv_handler(State(state): State<AppState>) -> impl IntoResponse {
    match state.service.export_restock_csv().await {
        Ok(body) => attachment(CSV_CONTENT_TYPE, export_filename(today(), "csv"), body),
        Err(e) => error_response(e),
    }
}

#[utoipa::path(
    get,
    path = "/api/restock/export.pdf",
    responses(
        (status = 200, description = "Restock list as a PDF table", body = String, content_type = "application/pdf"),
        (status = 500, description = "Backend error", body = ApiResponse)
    )
)]
pub async fn export_pdf_handler(State(state): State<AppState>) -> impl IntoResponse {
    let date = today();
    match state.service.export_restock_pdf(date).await {
        Ok(body) => attachment(PDF_CONTENT_TYPE, export_filename(date, "pdf"), body),
        Err(e) => error_response(e),
    }
}
