use chrono::{Duration, Utc};
use rand::Rng;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::LockType;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    clients::{EmailMessage, InvoiceRequest},
    dto::orders::{
        CheckoutRequest, InvoiceData, OrderDetail, OrderList, ShippingAddress, TrackingInfo,
    },
    entity::{
        components::{Column as CompCol, Entity as Components},
        order_items::{
            ActiveModel as OrderItemActive, Column as OrderItemCol, Entity as OrderItems,
            Model as OrderItemModel,
        },
        order_updates::{
            ActiveModel as OrderUpdateActive, Column as OrderUpdateCol, Entity as OrderUpdates,
            Model as OrderUpdateModel,
        },
        orders::{
            ActiveModel as OrderActive, Column as OrderCol, Entity as Orders, Model as OrderModel,
        },
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Order, OrderItem, OrderUpdate},
    pricing,
    response::{ApiResponse, Meta},
    routes::params::{OrderListQuery, SortOrder},
    services::component_service::CATEGORIES,
    state::AppState,
    status::OrderStatus,
};

const TRACKING_PREFIX: &str = "NXB";
const ESTIMATED_DELIVERY_DAYS: i64 = 7;

pub async fn checkout(
    state: &AppState,
    user: &AuthUser,
    payload: CheckoutRequest,
) -> AppResult<ApiResponse<OrderDetail>> {
    validate_address(&payload.address)?;

    if payload.selections.is_empty() {
        return Err(AppError::BadRequest("no components selected".into()));
    }
    for item in &payload.extra_storage {
        if item.quantity <= 0 {
            return Err(AppError::BadRequest(
                "extra storage quantity must be greater than 0".into(),
            ));
        }
    }

    let txn = state.orm.begin().await?;

    let mut wanted_ids: Vec<Uuid> = payload.selections.clone();
    wanted_ids.extend(payload.extra_storage.iter().map(|i| i.component_id));

    let components = Components::find()
        .filter(CompCol::Id.is_in(wanted_ids.clone()))
        .lock(LockType::Update)
        .all(&txn)
        .await?;
    let by_id: HashMap<Uuid, _> = components.into_iter().map(|c| (c.id, c)).collect();

    for id in &wanted_ids {
        if !by_id.contains_key(id) {
            return Err(AppError::BadRequest(format!("component {id} not found")));
        }
    }

    // Exactly one primary pick per category, all slots filled.
    let mut seen = HashSet::new();
    for id in &payload.selections {
        let category = by_id[id].category.as_str();
        if !seen.insert(category.to_string()) {
            return Err(AppError::BadRequest(format!(
                "duplicate selection for category '{category}'"
            )));
        }
    }
    for category in CATEGORIES {
        if !seen.contains(category) {
            return Err(AppError::BadRequest(format!(
                "missing selection for category '{category}'"
            )));
        }
    }

    // Add-ons must be storage parts.
    for item in &payload.extra_storage {
        let component = &by_id[&item.component_id];
        if component.category != "storage" {
            return Err(AppError::BadRequest(format!(
                "extra storage item {} is not a storage component",
                component.name
            )));
        }
    }

    // Stock check covers the combined demand per component.
    let mut demand: HashMap<Uuid, i32> = HashMap::new();
    for id in &payload.selections {
        *demand.entry(*id).or_default() += 1;
    }
    for item in &payload.extra_storage {
        *demand.entry(item.component_id).or_default() += item.quantity;
    }
    let mut component_cost: i64 = 0;
    for (id, qty) in &demand {
        let component = &by_id[id];
        if component.stock < *qty {
            return Err(AppError::BadRequest(format!(
                "insufficient stock for {}",
                component.name
            )));
        }
        component_cost += component.price * (*qty as i64);
    }

    let quote = pricing::quote(component_cost);
    let order_id = Uuid::new_v4();
    let tracking_code = fresh_tracking_code(&txn).await?;
    let now = Utc::now();
    let status = OrderStatus::OrderReceived;

    let address = &payload.address;
    let order = OrderActive {
        id: Set(order_id),
        user_id: Set(user.user_id),
        tracking_code: Set(tracking_code),
        status: Set(status.as_str().to_string()),
        component_cost: Set(quote.component_cost),
        build_charge: Set(quote.build_charge),
        delivery_charge: Set(quote.delivery_charge),
        gst: Set(quote.gst),
        total_amount: Set(quote.total),
        payment_ref: Set(None),
        invoice_url: Set(None),
        ship_name: Set(address.name.clone()),
        ship_phone: Set(address.phone.clone()),
        ship_email: Set(address.email.clone()),
        ship_line1: Set(address.line1.clone()),
        ship_city: Set(address.city.clone()),
        ship_zip: Set(address.zip.clone()),
        estimated_delivery: Set((now + Duration::days(ESTIMATED_DELIVERY_DAYS)).into()),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&txn)
    .await?;

    let mut items: Vec<OrderItem> = Vec::new();
    for id in &payload.selections {
        let component = &by_id[id];
        let item = OrderItemActive {
            id: Set(Uuid::new_v4()),
            order_id: Set(order.id),
            component_id: Set(component.id),
            category: Set(component.category.clone()),
            name: Set(component.name.clone()),
            price: Set(component.price),
            quantity: Set(1),
            is_addon: Set(false),
            created_at: NotSet,
        }
        .insert(&txn)
        .await?;
        items.push(order_item_from_entity(item));
    }
    for addon in &payload.extra_storage {
        let component = &by_id[&addon.component_id];
        let item = OrderItemActive {
            id: Set(Uuid::new_v4()),
            order_id: Set(order.id),
            component_id: Set(component.id),
            category: Set(component.category.clone()),
            name: Set(component.name.clone()),
            price: Set(component.price),
            quantity: Set(addon.quantity),
            is_addon: Set(true),
            created_at: NotSet,
        }
        .insert(&txn)
        .await?;
        items.push(order_item_from_entity(item));
    }

    for (id, qty) in &demand {
        Components::update_many()
            .col_expr(CompCol::Stock, Expr::col(CompCol::Stock).sub(*qty))
            .filter(CompCol::Id.eq(*id))
            .exec(&txn)
            .await?;
    }

    // Initial history row; status and history are born in the same transaction.
    let initial_update = OrderUpdateActive {
        id: Set(Uuid::new_v4()),
        order_id: Set(order.id),
        status: Set(status.as_str().to_string()),
        message: Set(status.default_message().to_string()),
        created_at: NotSet,
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "checkout",
        Some("orders"),
        Some(serde_json::json!({ "order_id": order.id, "total": order.total_amount })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    // Collaborator side effects are best-effort once the order is committed.
    let order = attach_payment_ref(state, order).await;
    send_order_confirmation(state, &order).await;

    let updates = vec![order_update_from_entity(initial_update)?];
    Ok(ApiResponse::success(
        "Order placed",
        OrderDetail {
            order: order_from_entity(order)?,
            items,
            updates,
        },
        Some(Meta::empty()),
    ))
}

pub async fn list_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    let (page, limit, offset) = query.pagination.normalize();
    let mut condition = Condition::all().add(OrderCol::UserId.eq(user.user_id));
    if let Some(status) = query.status.as_ref().filter(|s| !s.is_empty()) {
        let status: OrderStatus = status.parse()?;
        condition = condition.add(OrderCol::Status.eq(status.as_str()));
    }

    let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);

    let mut finder = Orders::find().filter(condition);
    finder = match sort_order {
        SortOrder::Asc => finder.order_by_asc(OrderCol::CreatedAt),
        SortOrder::Desc => finder.order_by_desc(OrderCol::CreatedAt),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let orders = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(order_from_entity)
        .collect::<AppResult<Vec<Order>>>()?;

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Ok",
        OrderList { items: orders },
        Some(meta),
    ))
}

pub async fn get_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<OrderDetail>> {
    let order = Orders::find()
        .filter(
            Condition::all()
                .add(OrderCol::UserId.eq(user.user_id))
                .add(OrderCol::Id.eq(id)),
        )
        .one(&state.orm)
        .await?;
    let order = match order {
        Some(o) => o,
        None => return Err(AppError::NotFound),
    };

    let detail = load_detail(state, order).await?;
    Ok(ApiResponse::success("OK", detail, Some(Meta::empty())))
}

/// Public status lookup; the tracking code is the only key and an unknown
/// code is a plain not-found result.
pub async fn track(state: &AppState, code: &str) -> AppResult<ApiResponse<TrackingInfo>> {
    let order = Orders::find()
        .filter(OrderCol::TrackingCode.eq(code))
        .one(&state.orm)
        .await?;
    let order = match order {
        Some(o) => o,
        None => return Err(AppError::NotFound),
    };

    let updates = OrderUpdates::find()
        .filter(OrderUpdateCol::OrderId.eq(order.id))
        .order_by_asc(OrderUpdateCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(order_update_from_entity)
        .collect::<AppResult<Vec<OrderUpdate>>>()?;

    let info = TrackingInfo {
        tracking_code: order.tracking_code.clone(),
        status: order.status.parse()?,
        estimated_delivery: order.estimated_delivery.with_timezone(&Utc),
        updates,
    };
    Ok(ApiResponse::success("OK", info, Some(Meta::empty())))
}

/// Fetch (rendering and caching on first request) the order's invoice URL.
pub async fn invoice(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<InvoiceData>> {
    let order = Orders::find()
        .filter(
            Condition::all()
                .add(OrderCol::UserId.eq(user.user_id))
                .add(OrderCol::Id.eq(id)),
        )
        .one(&state.orm)
        .await?;
    let order = match order {
        Some(o) => o,
        None => return Err(AppError::NotFound),
    };

    if let Some(url) = order.invoice_url.clone() {
        return Ok(ApiResponse::success(
            "Invoice",
            InvoiceData { invoice_url: url },
            Some(Meta::empty()),
        ));
    }

    let url = state
        .invoices
        .render(&InvoiceRequest {
            order_id: order.id,
            tracking_code: &order.tracking_code,
            total_amount: order.total_amount,
            customer_name: &order.ship_name,
        })
        .await?;

    let mut active: OrderActive = order.into();
    active.invoice_url = Set(Some(url.clone()));
    active.update(&state.orm).await?;

    Ok(ApiResponse::success(
        "Invoice",
        InvoiceData { invoice_url: url },
        Some(Meta::empty()),
    ))
}

pub async fn load_detail(state: &AppState, order: OrderModel) -> AppResult<OrderDetail> {
    let items = OrderItems::find()
        .filter(OrderItemCol::OrderId.eq(order.id))
        .all(&state.orm)
        .await?
        .into_iter()
        .map(order_item_from_entity)
        .collect();

    let updates = OrderUpdates::find()
        .filter(OrderUpdateCol::OrderId.eq(order.id))
        .order_by_asc(OrderUpdateCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(order_update_from_entity)
        .collect::<AppResult<Vec<OrderUpdate>>>()?;

    Ok(OrderDetail {
        order: order_from_entity(order)?,
        items,
        updates,
    })
}

async fn attach_payment_ref(state: &AppState, order: OrderModel) -> OrderModel {
    match state
        .payments
        .create_order(order.total_amount, &order.tracking_code)
        .await
    {
        Ok(Some(payment_ref)) => {
            let mut active: OrderActive = order.clone().into();
            active.payment_ref = Set(Some(payment_ref.clone()));
            match active.update(&state.orm).await {
                Ok(updated) => updated,
                Err(err) => {
                    tracing::warn!(error = %err, order_id = %order.id, "failed to store payment ref");
                    order
                }
            }
        }
        Ok(None) => order,
        Err(err) => {
            tracing::warn!(error = %err, order_id = %order.id, "payment order creation failed");
            order
        }
    }
}

async fn send_order_confirmation(state: &AppState, order: &OrderModel) {
    let message = EmailMessage {
        to: order.ship_email.clone(),
        subject: format!("Order confirmed - {}", order.tracking_code),
        html: format!(
            "<p>Thanks for your order, {}!</p>\
             <p>Track it any time with code <strong>{}</strong>. \
             Grand total: &#8377;{}.</p>",
            order.ship_name, order.tracking_code, order.total_amount
        ),
        attachment_url: None,
    };
    if let Err(err) = state.mailer.send(&message).await {
        tracing::warn!(error = %err, order_id = %order.id, "order confirmation email failed");
    }
}

/// Six random digits behind a fixed prefix; regenerated on the rare collision.
async fn fresh_tracking_code<C: ConnectionTrait>(conn: &C) -> AppResult<String> {
    for _ in 0..5 {
        let code = {
            let mut rng = rand::thread_rng();
            format!("{}-{:06}", TRACKING_PREFIX, rng.gen_range(0..1_000_000))
        };
        let taken = Orders::find()
            .filter(OrderCol::TrackingCode.eq(code.clone()))
            .one(conn)
            .await?
            .is_some();
        if !taken {
            return Ok(code);
        }
    }
    Err(AppError::Internal(anyhow::anyhow!(
        "could not allocate a unique tracking code"
    )))
}

fn validate_address(address: &ShippingAddress) -> Result<(), AppError> {
    if address.name.trim().is_empty() {
        return Err(AppError::BadRequest("name is required".into()));
    }
    if address.line1.trim().is_empty() || address.city.trim().is_empty() {
        return Err(AppError::BadRequest("shipping address is required".into()));
    }
    if address.phone.len() != 10 || !address.phone.chars().all(|c| c.is_ascii_digit()) {
        return Err(AppError::BadRequest("phone must be 10 digits".into()));
    }
    if address.zip.len() != 6 || !address.zip.chars().all(|c| c.is_ascii_digit()) {
        return Err(AppError::BadRequest("zip must be 6 digits".into()));
    }
    if !address.email.contains('@') {
        return Err(AppError::BadRequest("email is invalid".into()));
    }
    Ok(())
}

pub fn order_from_entity(model: OrderModel) -> AppResult<Order> {
    Ok(Order {
        id: model.id,
        user_id: model.user_id,
        tracking_code: model.tracking_code,
        status: model.status.parse()?,
        component_cost: model.component_cost,
        build_charge: model.build_charge,
        delivery_charge: model.delivery_charge,
        gst: model.gst,
        total_amount: model.total_amount,
        payment_ref: model.payment_ref,
        invoice_url: model.invoice_url,
        estimated_delivery: model.estimated_delivery.with_timezone(&Utc),
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    })
}

pub fn order_item_from_entity(model: OrderItemModel) -> OrderItem {
    OrderItem {
        id: model.id,
        order_id: model.order_id,
        component_id: model.component_id,
        category: model.category,
        name: model.name,
        price: model.price,
        quantity: model.quantity,
        is_addon: model.is_addon,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

pub fn order_update_from_entity(model: OrderUpdateModel) -> AppResult<OrderUpdate> {
    Ok(OrderUpdate {
        id: model.id,
        order_id: model.order_id,
        status: model.status.parse()?,
        message: model.message,
        created_at: model.created_at.with_timezone(&Utc),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn address() -> ShippingAddress {
        ShippingAddress {
            name: "Asha Rao".into(),
            phone: "9876543210".into(),
            email: "asha@example.com".into(),
            line1: "12 MG Road".into(),
            city: "Bengaluru".into(),
            zip: "560001".into(),
        }
    }

    #[test]
    fn accepts_a_well_formed_address() {
        assert!(validate_address(&address()).is_ok());
    }

    #[test]
    fn rejects_bad_phone_zip_and_email() {
        let mut bad = address();
        bad.phone = "12345".into();
        assert!(validate_address(&bad).is_err());

        let mut bad = address();
        bad.phone = "98765432a0".into();
        assert!(validate_address(&bad).is_err());

        let mut bad = address();
        bad.zip = "5600".into();
        assert!(validate_address(&bad).is_err());

        let mut bad = address();
        bad.email = "not-an-email".into();
        assert!(validate_address(&bad).is_err());

        let mut bad = address();
        bad.name = "  ".into();
        assert!(validate_address(&bad).is_err());
    }
}
