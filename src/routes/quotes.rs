use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};

use crate::{
    dto::quotes::{QuotationWithLines, SubmitQuotationRequest, VendorDashboard},
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    services::quote_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(submit_quotes))
        .route("/mine", get(list_my_quotes))
}

#[utoipa::path(
    post,
    path = "/api/quotes",
    request_body = SubmitQuotationRequest,
    responses(
        (status = 200, description = "Submit per-component quotes for an order (vendor only)", body = ApiResponse<QuotationWithLines>),
        (status = 400, description = "Invalid lines"),
        (status = 403, description = "Forbidden"),
        (status = 409, description = "Quotation already decided"),
    ),
    security(("bearer_auth" = [])),
    tag = "Quotes"
)]
pub async fn submit_quotes(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<SubmitQuotationRequest>,
) -> AppResult<Json<ApiResponse<QuotationWithLines>>> {
    let resp = quote_service::submit_quotes(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/quotes/mine",
    responses(
        (status = 200, description = "Own quotations and win/loss stats (vendor only)", body = ApiResponse<VendorDashboard>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Quotes"
)]
pub async fn list_my_quotes(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<VendorDashboard>>> {
    let resp = quote_service::list_my_quotes(&state, &user).await?;
    Ok(Json(resp))
}
