use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::status::{OrderStatus, QuoteStatus};

#[derive(Debug, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub role: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Component {
    pub id: Uuid,
    pub category: String,
    pub name: String,
    pub description: Option<String>,
    pub price: i64,
    pub stock: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    pub tracking_code: String,
    pub status: OrderStatus,
    pub component_cost: i64,
    pub build_charge: i64,
    pub delivery_charge: i64,
    pub gst: i64,
    pub total_amount: i64,
    pub payment_ref: Option<String>,
    pub invoice_url: Option<String>,
    pub estimated_delivery: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub component_id: Uuid,
    pub category: String,
    pub name: String,
    pub price: i64,
    pub quantity: i32,
    pub is_addon: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderUpdate {
    pub id: Uuid,
    pub order_id: Uuid,
    pub status: OrderStatus,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VendorQuotation {
    pub id: Uuid,
    pub vendor_id: Uuid,
    pub order_id: Uuid,
    pub price: i64,
    pub status: QuoteStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ComponentQuotation {
    pub id: Uuid,
    pub vendor_id: Uuid,
    pub order_id: Uuid,
    pub component_id: Uuid,
    pub unit_price: i64,
    pub quantity: i32,
    pub status: QuoteStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VendorStats {
    pub vendor_id: Uuid,
    pub orders_won: i64,
    pub orders_lost: i64,
}
