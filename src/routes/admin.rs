use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    dto::orders::{OrderDetail, OrderList, StatusChangeRequest},
    dto::quotes::QuotationList,
    error::AppResult,
    middleware::auth::AuthUser,
    models::{Order, VendorQuotation},
    response::ApiResponse,
    routes::params::OrderListQuery,
    services::{admin_service, quote_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/orders", get(list_all_orders))
        .route("/orders/{id}", get(get_order_admin))
        .route("/orders/{id}/advance", post(advance_order_status))
        .route("/orders/{id}/cancel", post(cancel_order))
        .route("/orders/{id}/quotes", get(list_order_quotes))
        .route("/orders/{id}/quotes/{vendor_id}/accept", post(accept_quote))
        .route("/orders/{id}/quotes/{vendor_id}/reject", post(reject_quote))
}

#[utoipa::path(
    get,
    path = "/api/admin/orders",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("status" = Option<String>, Query, description = "Filter by status"),
        ("sort_order" = Option<String>, Query, description = "Sort order: asc, desc")
    ),
    responses(
        (status = 200, description = "Get all orders (admin only)", body = ApiResponse<OrderList>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_all_orders(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<OrderListQuery>,
) -> AppResult<Json<ApiResponse<OrderList>>> {
    let resp = admin_service::list_all_orders(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/orders/{id}",
    params(
        ("id" = Uuid, Path, description = "Order ID")
    ),
    responses(
        (status = 200, description = "Get any order with items and history (admin only)", body = ApiResponse<OrderDetail>),
        (status = 404, description = "Not Found"),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn get_order_admin(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<OrderDetail>>> {
    let resp = admin_service::get_order_admin(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/admin/orders/{id}/advance",
    params(
        ("id" = Uuid, Path, description = "Order ID")
    ),
    request_body = StatusChangeRequest,
    responses(
        (status = 200, description = "Advance order to the next status", body = ApiResponse<Order>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found"),
        (status = 409, description = "Order is in a terminal status"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn advance_order_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<StatusChangeRequest>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let resp = admin_service::advance_status(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/admin/orders/{id}/cancel",
    params(
        ("id" = Uuid, Path, description = "Order ID")
    ),
    request_body = StatusChangeRequest,
    responses(
        (status = 200, description = "Cancel a non-terminal order", body = ApiResponse<Order>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found"),
        (status = 409, description = "Order is in a terminal status"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn cancel_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<StatusChangeRequest>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let resp = admin_service::cancel_order(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/orders/{id}/quotes",
    params(
        ("id" = Uuid, Path, description = "Order ID")
    ),
    responses(
        (status = 200, description = "Vendor quotations for an order (admin only)", body = ApiResponse<QuotationList>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_order_quotes(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<QuotationList>>> {
    let resp = quote_service::list_order_quotes(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/admin/orders/{id}/quotes/{vendor_id}/accept",
    params(
        ("id" = Uuid, Path, description = "Order ID"),
        ("vendor_id" = Uuid, Path, description = "Vendor ID")
    ),
    responses(
        (status = 200, description = "Accept the vendor's quotation", body = ApiResponse<VendorQuotation>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found"),
        (status = 409, description = "Quotation already decided"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn accept_quote(
    State(state): State<AppState>,
    user: AuthUser,
    Path((id, vendor_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<ApiResponse<VendorQuotation>>> {
    let resp = quote_service::accept_quote(&state, &user, id, vendor_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/admin/orders/{id}/quotes/{vendor_id}/reject",
    params(
        ("id" = Uuid, Path, description = "Order ID"),
        ("vendor_id" = Uuid, Path, description = "Vendor ID")
    ),
    responses(
        (status = 200, description = "Reject the vendor's quotation", body = ApiResponse<VendorQuotation>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found"),
        (status = 409, description = "Quotation already decided"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn reject_quote(
    State(state): State<AppState>,
    user: AuthUser,
    Path((id, vendor_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<ApiResponse<VendorQuotation>>> {
    let resp = quote_service::reject_quote(&state, &user, id, vendor_id).await?;
    Ok(Json(resp))
}
