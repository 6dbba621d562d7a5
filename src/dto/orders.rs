use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{Order, OrderItem, OrderUpdate};
use crate::status::OrderStatus;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CheckoutRequest {
    /// Primary picks, exactly one component per category.
    pub selections: Vec<Uuid>,
    /// Additional storage-category add-ons.
    #[serde(default)]
    pub extra_storage: Vec<ExtraStorageItem>,
    pub address: ShippingAddress,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ExtraStorageItem {
    pub component_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ShippingAddress {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub line1: String,
    pub city: String,
    pub zip: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderList {
    pub items: Vec<Order>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderDetail {
    pub order: Order,
    pub items: Vec<OrderItem>,
    pub updates: Vec<OrderUpdate>,
}

/// Public view behind the tracking code; no account data, no amounts.
#[derive(Debug, Serialize, ToSchema)]
pub struct TrackingInfo {
    pub tracking_code: String,
    pub status: OrderStatus,
    pub estimated_delivery: DateTime<Utc>,
    pub updates: Vec<OrderUpdate>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct InvoiceData {
    pub invoice_url: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct StatusChangeRequest {
    /// Free-text note for the status history; the canonical default message
    /// for the new status is used when absent.
    pub message: Option<String>,
}
