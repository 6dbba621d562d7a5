use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::LockType;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    clients::EmailMessage,
    dto::orders::{OrderDetail, OrderList, StatusChangeRequest},
    entity::{
        order_updates::ActiveModel as OrderUpdateActive,
        orders::{
            ActiveModel as OrderActive, Column as OrderCol, Entity as Orders, Model as OrderModel,
        },
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::Order,
    response::{ApiResponse, Meta},
    routes::params::{OrderListQuery, SortOrder},
    services::order_service::{load_detail, order_from_entity},
    state::AppState,
    status::OrderStatus,
};

pub async fn list_all_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    ensure_admin(user)?;
    let (page, limit, offset) = query.pagination.normalize();

    let mut condition = Condition::all();
    if let Some(status) = query.status.as_ref().filter(|s| !s.is_empty()) {
        let status: OrderStatus = status.parse()?;
        condition = condition.add(OrderCol::Status.eq(status.as_str()));
    }

    let mut finder = Orders::find().filter(condition);

    let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);
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

    let order_list = OrderList { items: orders };

    Ok(ApiResponse::success("Orders", order_list, Some(meta)))
}

pub async fn get_order_admin(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<OrderDetail>> {
    ensure_admin(user)?;
    let order = Orders::find_by_id(id).one(&state.orm).await?;
    let order = match order {
        Some(o) => o,
        None => return Err(AppError::NotFound),
    };

    let detail = load_detail(state, order).await?;
    Ok(ApiResponse::success("Order found", detail, Some(Meta::empty())))
}

/// Move the order one step along the fulfilment sequence.
pub async fn advance_status(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: StatusChangeRequest,
) -> AppResult<ApiResponse<Order>> {
    ensure_admin(user)?;
    let order = transition(state, id, payload.message, Transition::Advance).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "order_status_advance",
        Some("orders"),
        Some(serde_json::json!({ "order_id": order.id, "status": order.status })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    send_status_email(state, &order).await;

    Ok(ApiResponse::success(
        "Order updated",
        order_from_entity(order)?,
        Some(Meta::empty()),
    ))
}

/// Jump the order to `cancelled`; allowed from any non-terminal state.
pub async fn cancel_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: StatusChangeRequest,
) -> AppResult<ApiResponse<Order>> {
    ensure_admin(user)?;
    let order = transition(state, id, payload.message, Transition::Cancel).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "order_cancel",
        Some("orders"),
        Some(serde_json::json!({ "order_id": order.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    send_status_email(state, &order).await;

    Ok(ApiResponse::success(
        "Order cancelled",
        order_from_entity(order)?,
        Some(Meta::empty()),
    ))
}

enum Transition {
    Advance,
    Cancel,
}

// Status overwrite and history append share one transaction, with the order
// row locked so concurrent admin actions serialize.
async fn transition(
    state: &AppState,
    id: Uuid,
    message: Option<String>,
    kind: Transition,
) -> AppResult<OrderModel> {
    let txn = state.orm.begin().await?;

    let order = Orders::find_by_id(id)
        .lock(LockType::Update)
        .one(&txn)
        .await?;
    let order = match order {
        Some(o) => o,
        None => return Err(AppError::NotFound),
    };

    let current: OrderStatus = order.status.parse()?;
    let next = match kind {
        Transition::Advance => current.next()?,
        Transition::Cancel => current.cancel()?,
    };
    let message = message
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| next.default_message().to_string());

    let mut active: OrderActive = order.into();
    active.status = Set(next.as_str().to_string());
    active.updated_at = Set(Utc::now().into());
    let order = active.update(&txn).await?;

    OrderUpdateActive {
        id: Set(Uuid::new_v4()),
        order_id: Set(order.id),
        status: Set(next.as_str().to_string()),
        message: Set(message),
        created_at: NotSet,
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;
    Ok(order)
}

async fn send_status_email(state: &AppState, order: &OrderModel) {
    let status: OrderStatus = match order.status.parse() {
        Ok(s) => s,
        Err(_) => return,
    };
    let message = EmailMessage {
        to: order.ship_email.clone(),
        subject: format!("Order {} update: {}", order.tracking_code, status),
        html: format!("<p>{}</p>", status.default_message()),
        attachment_url: order.invoice_url.clone(),
    };
    if let Err(err) = state.mailer.send(&message).await {
        tracing::warn!(error = %err, order_id = %order.id, "status email failed");
    }
}
