use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{delete, get, post, put},
};
use uuid::Uuid;

use crate::{
    dto::components::{ComponentList, CreateComponentRequest, UpdateComponentRequest},
    error::AppResult,
    middleware::auth::AuthUser,
    models::Component,
    response::ApiResponse,
    routes::params::ComponentQuery,
    services::component_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_components))
        .route("/", post(create_component))
        .route("/{id}", get(get_component))
        .route("/{id}", put(update_component))
        .route("/{id}", delete(delete_component))
}

#[utoipa::path(
    get,
    path = "/api/components",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("q" = Option<String>, Query, description = "Search in name and description"),
        ("category" = Option<String>, Query, description = "Filter by category"),
        ("min_price" = Option<i64>, Query, description = "Minimum price"),
        ("max_price" = Option<i64>, Query, description = "Maximum price"),
        ("sort_by" = Option<String>, Query, description = "Sort by: created_at, price, name"),
        ("sort_order" = Option<String>, Query, description = "Sort order: asc, desc")
    ),
    responses(
        (status = 200, description = "List catalog components", body = ApiResponse<ComponentList>)
    ),
    tag = "Components"
)]
pub async fn list_components(
    State(state): State<AppState>,
    Query(query): Query<ComponentQuery>,
) -> AppResult<Json<ApiResponse<ComponentList>>> {
    let resp = component_service::list_components(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/components/{id}",
    params(
        ("id" = Uuid, Path, description = "Component ID")
    ),
    responses(
        (status = 200, description = "Get component", body = ApiResponse<Component>),
        (status = 404, description = "Component not found"),
    ),
    tag = "Components"
)]
pub async fn get_component(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Component>>> {
    let resp = component_service::get_component(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/components",
    request_body = CreateComponentRequest,
    responses(
        (status = 201, description = "Create component (admin only)", body = ApiResponse<Component>),
        (status = 400, description = "Invalid category or price"),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Components"
)]
pub async fn create_component(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateComponentRequest>,
) -> AppResult<Json<ApiResponse<Component>>> {
    let resp = component_service::create_component(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/components/{id}",
    params(
        ("id" = Uuid, Path, description = "Component ID")
    ),
    request_body = UpdateComponentRequest,
    responses(
        (status = 200, description = "Updated component (admin only)", body = ApiResponse<Component>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Components"
)]
pub async fn update_component(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateComponentRequest>,
) -> AppResult<Json<ApiResponse<Component>>> {
    let resp = component_service::update_component(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/components/{id}",
    params(
        ("id" = Uuid, Path, description = "Component ID")
    ),
    responses(
        (status = 200, description = "Deleted component (admin only)"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Components"
)]
pub async fn delete_component(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = component_service::delete_component(&state, &user, id).await?;
    Ok(Json(resp))
}
