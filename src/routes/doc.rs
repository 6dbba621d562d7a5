use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        auth as auth_dto,
        components::{ComponentList, CreateComponentRequest, UpdateComponentRequest},
        orders::{
            CheckoutRequest, ExtraStorageItem, InvoiceData, OrderDetail, OrderList,
            ShippingAddress, StatusChangeRequest, TrackingInfo,
        },
        quotes::{
            QuotationList, QuotationWithLines, QuoteLine, SubmitQuotationRequest, VendorDashboard,
        },
    },
    models::{
        Component, ComponentQuotation, Order, OrderItem, OrderUpdate, User, VendorQuotation,
        VendorStats,
    },
    response::{ApiResponse, Meta},
    routes::{admin, auth, components, health, orders, params, quotes},
    status::{OrderStatus, QuoteStatus},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::login,
        auth::register,
        components::list_components,
        components::create_component,
        components::get_component,
        components::update_component,
        components::delete_component,
        orders::list_orders,
        orders::checkout,
        orders::get_order,
        orders::get_invoice,
        orders::track_order,
        quotes::submit_quotes,
        quotes::list_my_quotes,
        admin::list_all_orders,
        admin::get_order_admin,
        admin::advance_order_status,
        admin::cancel_order,
        admin::list_order_quotes,
        admin::accept_quote,
        admin::reject_quote
    ),
    components(
        schemas(
            User,
            Component,
            Order,
            OrderItem,
            OrderUpdate,
            VendorQuotation,
            ComponentQuotation,
            VendorStats,
            OrderStatus,
            QuoteStatus,
            auth_dto::RegisterRequest,
            auth_dto::LoginRequest,
            auth_dto::LoginResponse,
            CreateComponentRequest,
            UpdateComponentRequest,
            ComponentList,
            CheckoutRequest,
            ExtraStorageItem,
            ShippingAddress,
            StatusChangeRequest,
            OrderList,
            OrderDetail,
            TrackingInfo,
            InvoiceData,
            SubmitQuotationRequest,
            QuoteLine,
            QuotationWithLines,
            QuotationList,
            VendorDashboard,
            params::Pagination,
            params::ComponentQuery,
            params::OrderListQuery,
            Meta,
            ApiResponse<Component>,
            ApiResponse<ComponentList>,
            ApiResponse<OrderDetail>,
            ApiResponse<OrderList>,
            ApiResponse<TrackingInfo>,
            ApiResponse<QuotationList>,
            ApiResponse<VendorDashboard>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Components", description = "PC component catalog endpoints"),
        (name = "Orders", description = "Build order and tracking endpoints"),
        (name = "Quotes", description = "Vendor quotation endpoints"),
        (name = "Admin", description = "Back-office endpoints"),
        (name = "Auth", description = "Authentication endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
