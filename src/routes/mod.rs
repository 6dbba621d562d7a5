use axum::{Router, routing::get};

use crate::state::AppState;

pub mod admin;
pub mod auth;
pub mod components;
pub mod doc;
pub mod health;
pub mod orders;
pub mod params;
pub mod quotes;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/components", components::router())
        .nest("/auth", auth::router())
        .nest("/orders", orders::router())
        .nest("/quotes", quotes::router())
        .nest("/admin", admin::router())
        .route("/track/{code}", get(orders::track_order))
}
