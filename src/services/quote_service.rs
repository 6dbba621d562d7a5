use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::LockType;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
    Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    clients::EmailMessage,
    dto::quotes::{QuotationList, QuotationWithLines, QuoteLine, SubmitQuotationRequest, VendorDashboard},
    entity::{
        component_quotations::{
            ActiveModel as LineActive, Column as LineCol, Entity as ComponentQuotations,
            Model as LineModel,
        },
        components::{Column as CompCol, Entity as Components},
        orders::{Column as OrderCol, Entity as Orders},
        users::{Column as UserCol, Entity as Users},
        vendor_quotations::{
            ActiveModel as QuotationActive, Column as QuotationCol, Entity as VendorQuotations,
            Model as QuotationModel,
        },
        vendor_stats::{ActiveModel as StatsActive, Entity as VendorStatsEntity},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin, ensure_vendor},
    models::{ComponentQuotation, VendorQuotation, VendorStats},
    response::{ApiResponse, Meta},
    state::AppState,
    status::{OrderStatus, QuoteStatus},
};

/// Aggregate price of a quotation: Σ unit price × quantity.
pub fn aggregate_price(lines: &[(i64, i32)]) -> i64 {
    lines
        .iter()
        .map(|(unit_price, quantity)| unit_price * (*quantity as i64))
        .sum()
}

/// Record (or re-record, while still pending) a vendor's per-component
/// prices for an order, and roll them up into the vendor quotation.
pub async fn submit_quotes(
    state: &AppState,
    user: &AuthUser,
    payload: SubmitQuotationRequest,
) -> AppResult<ApiResponse<QuotationWithLines>> {
    ensure_vendor(user)?;
    if payload.lines.is_empty() {
        return Err(AppError::BadRequest("quotation has no lines".into()));
    }
    for line in &payload.lines {
        if line.quantity <= 0 {
            return Err(AppError::BadRequest(
                "quantity must be greater than 0".into(),
            ));
        }
        if line.unit_price < 0 {
            return Err(AppError::BadRequest(
                "unit price must not be negative".into(),
            ));
        }
    }

    let txn = state.orm.begin().await?;

    let order = Orders::find_by_id(payload.order_id).one(&txn).await?;
    let order = match order {
        Some(o) => o,
        None => return Err(AppError::NotFound),
    };
    let order_status: OrderStatus = order.status.parse()?;
    if order_status.is_terminal() {
        return Err(AppError::BadRequest(format!(
            "order is {} and no longer accepts quotations",
            order_status
        )));
    }

    let component_ids: Vec<Uuid> = payload.lines.iter().map(|l| l.component_id).collect();
    let known = Components::find()
        .filter(CompCol::Id.is_in(component_ids.clone()))
        .all(&txn)
        .await?;
    if known.len() != dedup_count(&component_ids) {
        return Err(AppError::BadRequest("unknown component in quotation".into()));
    }

    // One quotation per (vendor, order): look up before inserting.
    let existing = VendorQuotations::find()
        .filter(
            Condition::all()
                .add(QuotationCol::VendorId.eq(user.user_id))
                .add(QuotationCol::OrderId.eq(payload.order_id)),
        )
        .lock(LockType::Update)
        .one(&txn)
        .await?;

    if let Some(q) = &existing {
        let status: QuoteStatus = q.status.parse()?;
        if status != QuoteStatus::Pending {
            return Err(AppError::Conflict(
                "quotation has already been decided".into(),
            ));
        }
    }

    // Replace any previous pending lines wholesale.
    ComponentQuotations::delete_many()
        .filter(
            Condition::all()
                .add(LineCol::VendorId.eq(user.user_id))
                .add(LineCol::OrderId.eq(payload.order_id)),
        )
        .exec(&txn)
        .await?;

    let mut lines: Vec<ComponentQuotation> = Vec::new();
    for QuoteLine {
        component_id,
        unit_price,
        quantity,
    } in &payload.lines
    {
        let line = LineActive {
            id: Set(Uuid::new_v4()),
            vendor_id: Set(user.user_id),
            order_id: Set(payload.order_id),
            component_id: Set(*component_id),
            unit_price: Set(*unit_price),
            quantity: Set(*quantity),
            status: Set(QuoteStatus::Pending.as_str().to_string()),
            created_at: NotSet,
        }
        .insert(&txn)
        .await?;
        lines.push(line_from_entity(line)?);
    }

    let price = aggregate_price(
        &payload
            .lines
            .iter()
            .map(|l| (l.unit_price, l.quantity))
            .collect::<Vec<_>>(),
    );

    let quotation = match existing {
        Some(q) => {
            let mut active: QuotationActive = q.into();
            active.price = Set(price);
            active.updated_at = Set(Utc::now().into());
            active.update(&txn).await?
        }
        None => {
            QuotationActive {
                id: Set(Uuid::new_v4()),
                vendor_id: Set(user.user_id),
                order_id: Set(payload.order_id),
                price: Set(price),
                status: Set(QuoteStatus::Pending.as_str().to_string()),
                created_at: NotSet,
                updated_at: NotSet,
            }
            .insert(&txn)
            .await?
        }
    };

    txn.commit().await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "quote_submit",
        Some("vendor_quotations"),
        Some(serde_json::json!({ "order_id": payload.order_id, "price": price })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Quotation submitted",
        QuotationWithLines {
            quotation: quotation_from_entity(quotation)?,
            lines,
        },
        Some(Meta::empty()),
    ))
}

pub async fn list_my_quotes(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<VendorDashboard>> {
    ensure_vendor(user)?;

    let quotations = VendorQuotations::find()
        .filter(QuotationCol::VendorId.eq(user.user_id))
        .order_by_desc(QuotationCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(quotation_from_entity)
        .collect::<AppResult<Vec<VendorQuotation>>>()?;

    let stats = VendorStatsEntity::find_by_id(user.user_id)
        .one(&state.orm)
        .await?
        .map(|s| VendorStats {
            vendor_id: s.vendor_id,
            orders_won: s.orders_won,
            orders_lost: s.orders_lost,
        })
        .unwrap_or(VendorStats {
            vendor_id: user.user_id,
            orders_won: 0,
            orders_lost: 0,
        });

    Ok(ApiResponse::success(
        "Quotations",
        VendorDashboard { quotations, stats },
        Some(Meta::empty()),
    ))
}

pub async fn list_order_quotes(
    state: &AppState,
    user: &AuthUser,
    order_id: Uuid,
) -> AppResult<ApiResponse<QuotationList>> {
    ensure_admin(user)?;

    let order = Orders::find()
        .filter(OrderCol::Id.eq(order_id))
        .one(&state.orm)
        .await?;
    if order.is_none() {
        return Err(AppError::NotFound);
    }

    let quotations = VendorQuotations::find()
        .filter(QuotationCol::OrderId.eq(order_id))
        .order_by_asc(QuotationCol::Price)
        .all(&state.orm)
        .await?;

    let mut items = Vec::with_capacity(quotations.len());
    for quotation in quotations {
        let lines = ComponentQuotations::find()
            .filter(
                Condition::all()
                    .add(LineCol::VendorId.eq(quotation.vendor_id))
                    .add(LineCol::OrderId.eq(order_id)),
            )
            .all(&state.orm)
            .await?
            .into_iter()
            .map(line_from_entity)
            .collect::<AppResult<Vec<ComponentQuotation>>>()?;
        items.push(QuotationWithLines {
            quotation: quotation_from_entity(quotation)?,
            lines,
        });
    }

    Ok(ApiResponse::success(
        "Quotations",
        QuotationList { items },
        Some(Meta::empty()),
    ))
}

pub async fn accept_quote(
    state: &AppState,
    user: &AuthUser,
    order_id: Uuid,
    vendor_id: Uuid,
) -> AppResult<ApiResponse<VendorQuotation>> {
    decide(state, user, order_id, vendor_id, QuoteStatus::Accepted).await
}

pub async fn reject_quote(
    state: &AppState,
    user: &AuthUser,
    order_id: Uuid,
    vendor_id: Uuid,
) -> AppResult<ApiResponse<VendorQuotation>> {
    decide(state, user, order_id, vendor_id, QuoteStatus::Rejected).await
}

// Quotation status, line statuses and the win/loss counter all move in one
// transaction; the pending check makes a repeated decision a conflict rather
// than a second increment.
async fn decide(
    state: &AppState,
    user: &AuthUser,
    order_id: Uuid,
    vendor_id: Uuid,
    decision: QuoteStatus,
) -> AppResult<ApiResponse<VendorQuotation>> {
    ensure_admin(user)?;

    let txn = state.orm.begin().await?;

    let existing = VendorQuotations::find()
        .filter(
            Condition::all()
                .add(QuotationCol::VendorId.eq(vendor_id))
                .add(QuotationCol::OrderId.eq(order_id)),
        )
        .lock(LockType::Update)
        .one(&txn)
        .await?;

    // A decision can arrive before the roll-up row exists; synthesize it
    // from the summed component lines.
    let quotation: QuotationModel = match existing {
        Some(q) => q,
        None => {
            let lines = ComponentQuotations::find()
                .filter(
                    Condition::all()
                        .add(LineCol::VendorId.eq(vendor_id))
                        .add(LineCol::OrderId.eq(order_id)),
                )
                .all(&txn)
                .await?;
            if lines.is_empty() {
                return Err(AppError::NotFound);
            }
            let price = aggregate_price(
                &lines
                    .iter()
                    .map(|l| (l.unit_price, l.quantity))
                    .collect::<Vec<_>>(),
            );
            QuotationActive {
                id: Set(Uuid::new_v4()),
                vendor_id: Set(vendor_id),
                order_id: Set(order_id),
                price: Set(price),
                status: Set(QuoteStatus::Pending.as_str().to_string()),
                created_at: NotSet,
                updated_at: NotSet,
            }
            .insert(&txn)
            .await?
        }
    };

    let status: QuoteStatus = quotation.status.parse()?;
    if status != QuoteStatus::Pending {
        return Err(AppError::Conflict(
            "quotation has already been decided".into(),
        ));
    }

    let mut active: QuotationActive = quotation.into();
    active.status = Set(decision.as_str().to_string());
    active.updated_at = Set(Utc::now().into());
    let quotation = active.update(&txn).await?;

    ComponentQuotations::update_many()
        .col_expr(
            LineCol::Status,
            sea_orm::sea_query::Expr::value(decision.as_str()),
        )
        .filter(
            Condition::all()
                .add(LineCol::VendorId.eq(vendor_id))
                .add(LineCol::OrderId.eq(order_id)),
        )
        .exec(&txn)
        .await?;

    let stats = VendorStatsEntity::find_by_id(vendor_id)
        .lock(LockType::Update)
        .one(&txn)
        .await?;
    match stats {
        Some(s) => {
            let mut active: StatsActive = s.clone().into();
            match decision {
                QuoteStatus::Accepted => active.orders_won = Set(s.orders_won + 1),
                _ => active.orders_lost = Set(s.orders_lost + 1),
            }
            active.update(&txn).await?;
        }
        None => {
            let (won, lost) = match decision {
                QuoteStatus::Accepted => (1, 0),
                _ => (0, 1),
            };
            StatsActive {
                vendor_id: Set(vendor_id),
                orders_won: Set(won),
                orders_lost: Set(lost),
            }
            .insert(&txn)
            .await?;
        }
    }

    txn.commit().await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        match decision {
            QuoteStatus::Accepted => "quote_accept",
            _ => "quote_reject",
        },
        Some("vendor_quotations"),
        Some(serde_json::json!({ "order_id": order_id, "vendor_id": vendor_id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    send_decision_email(state, &quotation, decision).await;

    Ok(ApiResponse::success(
        match decision {
            QuoteStatus::Accepted => "Quotation accepted",
            _ => "Quotation rejected",
        },
        quotation_from_entity(quotation)?,
        Some(Meta::empty()),
    ))
}

async fn send_decision_email(state: &AppState, quotation: &QuotationModel, decision: QuoteStatus) {
    let vendor = match Users::find()
        .filter(UserCol::Id.eq(quotation.vendor_id))
        .one(&state.orm)
        .await
    {
        Ok(Some(v)) => v,
        Ok(None) => return,
        Err(err) => {
            tracing::warn!(error = %err, "vendor lookup for decision email failed");
            return;
        }
    };

    let message = EmailMessage {
        to: vendor.email,
        subject: format!("Your quotation was {}", decision),
        html: format!(
            "<p>Your quotation of &#8377;{} for order {} has been {}.</p>",
            quotation.price, quotation.order_id, decision
        ),
        attachment_url: None,
    };
    if let Err(err) = state.mailer.send(&message).await {
        tracing::warn!(error = %err, "quotation decision email failed");
    }
}

fn dedup_count(ids: &[Uuid]) -> usize {
    let mut unique: Vec<Uuid> = ids.to_vec();
    unique.sort();
    unique.dedup();
    unique.len()
}

pub fn quotation_from_entity(model: QuotationModel) -> AppResult<VendorQuotation> {
    Ok(VendorQuotation {
        id: model.id,
        vendor_id: model.vendor_id,
        order_id: model.order_id,
        price: model.price,
        status: model.status.parse()?,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    })
}

pub fn line_from_entity(model: LineModel) -> AppResult<ComponentQuotation> {
    Ok(ComponentQuotation {
        id: model.id,
        vendor_id: model.vendor_id,
        order_id: model.order_id,
        component_id: model.component_id,
        unit_price: model.unit_price,
        quantity: model.quantity,
        status: model.status.parse()?,
        created_at: model.created_at.with_timezone(&Utc),
    })
}

#[cfg(test)]
mod tests {
    use super::aggregate_price;

    #[test]
    fn sums_unit_price_times_quantity() {
        assert_eq!(aggregate_price(&[]), 0);
        assert_eq!(aggregate_price(&[(1_000, 2)]), 2_000);
        assert_eq!(aggregate_price(&[(1_000, 2), (500, 3), (24_999, 1)]), 28_499);
    }
}
