use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::Component;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateComponentRequest {
    pub category: String,
    pub name: String,
    pub description: String,
    pub price: i64,
    pub stock: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateComponentRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<i64>,
    pub stock: Option<i32>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ComponentList {
    pub items: Vec<Component>,
}
