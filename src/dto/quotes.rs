use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{ComponentQuotation, VendorQuotation, VendorStats};

#[derive(Debug, Deserialize, ToSchema)]
pub struct SubmitQuotationRequest {
    pub order_id: Uuid,
    pub lines: Vec<QuoteLine>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct QuoteLine {
    pub component_id: Uuid,
    pub unit_price: i64,
    pub quantity: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct QuotationWithLines {
    pub quotation: VendorQuotation,
    pub lines: Vec<ComponentQuotation>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct QuotationList {
    pub items: Vec<QuotationWithLines>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct VendorDashboard {
    pub quotations: Vec<VendorQuotation>,
    pub stats: VendorStats,
}
