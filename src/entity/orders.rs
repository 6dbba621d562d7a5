use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub tracking_code: String,
    pub status: String,
    pub component_cost: i64,
    pub build_charge: i64,
    pub delivery_charge: i64,
    pub gst: i64,
    pub total_amount: i64,
    pub payment_ref: Option<String>,
    pub invoice_url: Option<String>,
    pub ship_name: String,
    pub ship_phone: String,
    pub ship_email: String,
    pub ship_line1: String,
    pub ship_city: String,
    pub ship_zip: String,
    pub estimated_delivery: DateTimeWithTimeZone,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id"
    )]
    Users,
    #[sea_orm(has_many = "super::order_items::Entity")]
    OrderItems,
    #[sea_orm(has_many = "super::order_updates::Entity")]
    OrderUpdates,
    #[sea_orm(has_many = "super::vendor_quotations::Entity")]
    VendorQuotations,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl Related<super::order_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderItems.def()
    }
}

impl Related<super::order_updates::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderUpdates.def()
    }
}

impl Related<super::vendor_quotations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::VendorQuotations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
