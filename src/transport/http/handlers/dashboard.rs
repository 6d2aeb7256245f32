use crate::domain::analytics::Dashboard;
use crate::transport::http::handlers::common::ok_response;
use crate::transport::http::types::{ApiResponse, AppState};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

/// A failed read still renders: the error is reported inline next to an empty dashboard.
#[utoipa::path(
    get,
    path = "/api/dashboard",
    responses(
        (status = 200, description = "Summary, alerts, chart series and the product table. \
            On a backend error `success` is false and `data` holds an empty dashboard.", body = ApiResponse)
    )
)]
pub async fn dashboard_handler(State(state): State<AppState>) -> impl IntoResponse {
    match state.service.dashboard().await {
        Ok(dashboard) => ok_response(StatusCode::OK, &dashboard),
        Err(e) => {
            tracing::warn!(error = %e, "dashboard read failed, serving empty lists");
            (
                StatusCode::OK,
                Json(ApiResponse {
                    success: false,
                    data: serde_json::to_value(Dashboard::default()).ok(),
                    error: Some(format!("Failed to fetch data: {}", e)),
                }),
            )
                .into_response()
        }
    }
}
