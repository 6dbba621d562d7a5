mod common;

use common::{create_user, seed_full_build, try_setup_state};
use nexbuild_api::{
    dto::orders::{CheckoutRequest, ShippingAddress},
    dto::quotes::{QuoteLine, SubmitQuotationRequest},
    entity::component_quotations::ActiveModel as LineActive,
    error::AppError,
    middleware::auth::AuthUser,
    services::{order_service, quote_service},
    state::AppState,
    status::QuoteStatus,
};
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, Set};
use uuid::Uuid;

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

async fn place_order(
    state: &AppState,
    customer: &AuthUser,
    selections: Vec<Uuid>,
) -> anyhow::Result<Uuid> {
    let resp = order_service::checkout(
        state,
        customer,
        CheckoutRequest {
            selections,
            extra_storage: vec![],
            address: address(),
        },
    )
    .await?;
    Ok(resp.data.unwrap().order.id)
}

// Integration flow: two vendors quote an order; the admin accepts one and
// rejects the other; stats move exactly once per decision. A second order
// exercises the synthesized-quotation edge case.
#[tokio::test]
async fn submit_decide_and_stats_flow() -> anyhow::Result<()> {
    let Some(state) = try_setup_state().await? else {
        return Ok(());
    };

    let customer_id = create_user(&state, "customer", "buyer@example.com").await?;
    let admin_id = create_user(&state, "admin", "admin@example.com").await?;
    let vendor_a = create_user(&state, "vendor", "vendor-a@example.com").await?;
    let vendor_b = create_user(&state, "vendor", "vendor-b@example.com").await?;

    let customer = AuthUser {
        user_id: customer_id,
        role: "customer".into(),
    };
    let admin = AuthUser {
        user_id: admin_id,
        role: "admin".into(),
    };
    let auth_vendor_a = AuthUser {
        user_id: vendor_a,
        role: "vendor".into(),
    };
    let auth_vendor_b = AuthUser {
        user_id: vendor_b,
        role: "vendor".into(),
    };

    let components = seed_full_build(&state).await?;
    let order_id = place_order(&state, &customer, components.clone()).await?;

    // Vendor A quotes two lines: 14,000 x 1 + 5,500 x 2 = 25,000.
    let resp = quote_service::submit_quotes(
        &state,
        &auth_vendor_a,
        SubmitQuotationRequest {
            order_id,
            lines: vec![
                QuoteLine {
                    component_id: components[0],
                    unit_price: 14_000,
                    quantity: 1,
                },
                QuoteLine {
                    component_id: components[3],
                    unit_price: 5_500,
                    quantity: 2,
                },
            ],
        },
    )
    .await?;
    let quoted = resp.data.unwrap();
    assert_eq!(quoted.quotation.price, 25_000);
    assert_eq!(quoted.quotation.status, QuoteStatus::Pending);
    assert_eq!(quoted.lines.len(), 2);

    // Re-submitting while pending replaces the lines, not adds to them.
    let resp = quote_service::submit_quotes(
        &state,
        &auth_vendor_a,
        SubmitQuotationRequest {
            order_id,
            lines: vec![QuoteLine {
                component_id: components[0],
                unit_price: 13_000,
                quantity: 1,
            }],
        },
    )
    .await?;
    let requoted = resp.data.unwrap();
    assert_eq!(requoted.quotation.id, quoted.quotation.id);
    assert_eq!(requoted.quotation.price, 13_000);
    assert_eq!(requoted.lines.len(), 1);

    quote_service::submit_quotes(
        &state,
        &auth_vendor_b,
        SubmitQuotationRequest {
            order_id,
            lines: vec![QuoteLine {
                component_id: components[0],
                unit_price: 15_500,
                quantity: 1,
            }],
        },
    )
    .await?;

    let listed = quote_service::list_order_quotes(&state, &admin, order_id)
        .await?
        .data
        .unwrap();
    assert_eq!(listed.items.len(), 2);

    // Accept vendor A: quotation and every line flip together.
    let accepted = quote_service::accept_quote(&state, &admin, order_id, vendor_a)
        .await?
        .data
        .unwrap();
    assert_eq!(accepted.status, QuoteStatus::Accepted);

    let listed = quote_service::list_order_quotes(&state, &admin, order_id)
        .await?
        .data
        .unwrap();
    let winner = listed
        .items
        .iter()
        .find(|q| q.quotation.vendor_id == vendor_a)
        .unwrap();
    assert!(
        winner
            .lines
            .iter()
            .all(|l| l.status == QuoteStatus::Accepted)
    );

    let dashboard = quote_service::list_my_quotes(&state, &auth_vendor_a)
        .await?
        .data
        .unwrap();
    assert_eq!(dashboard.stats.orders_won, 1);
    assert_eq!(dashboard.stats.orders_lost, 0);

    // The decision is one-way: accepting again conflicts and never
    // double-increments the counter.
    let err = quote_service::accept_quote(&state, &admin, order_id, vendor_a)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
    let dashboard = quote_service::list_my_quotes(&state, &auth_vendor_a)
        .await?
        .data
        .unwrap();
    assert_eq!(dashboard.stats.orders_won, 1);

    // A decided quotation cannot be re-submitted either.
    let err = quote_service::submit_quotes(
        &state,
        &auth_vendor_a,
        SubmitQuotationRequest {
            order_id,
            lines: vec![QuoteLine {
                component_id: components[0],
                unit_price: 1,
                quantity: 1,
            }],
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    // Reject vendor B; their loss counter moves once.
    let rejected = quote_service::reject_quote(&state, &admin, order_id, vendor_b)
        .await?
        .data
        .unwrap();
    assert_eq!(rejected.status, QuoteStatus::Rejected);
    let dashboard = quote_service::list_my_quotes(&state, &auth_vendor_b)
        .await?
        .data
        .unwrap();
    assert_eq!(dashboard.stats.orders_won, 0);
    assert_eq!(dashboard.stats.orders_lost, 1);

    // Second order: a decision that arrives before the roll-up row exists
    // synthesizes the vendor quotation from the summed component lines.
    let order_id = place_order(&state, &customer, components.clone()).await?;
    let vendor_c = create_user(&state, "vendor", "vendor-c@example.com").await?;
    for (component_id, unit_price, quantity) in
        [(components[0], 9_000_i64, 1_i32), (components[1], 3_000, 2)]
    {
        LineActive {
            id: Set(Uuid::new_v4()),
            vendor_id: Set(vendor_c),
            order_id: Set(order_id),
            component_id: Set(component_id),
            unit_price: Set(unit_price),
            quantity: Set(quantity),
            status: Set("pending".into()),
            created_at: NotSet,
        }
        .insert(&state.orm)
        .await?;
    }

    let accepted = quote_service::accept_quote(&state, &admin, order_id, vendor_c)
        .await?
        .data
        .unwrap();
    assert_eq!(accepted.price, 15_000);
    assert_eq!(accepted.status, QuoteStatus::Accepted);

    // Deciding for a vendor with no lines at all is a plain not-found.
    let ghost_vendor = create_user(&state, "vendor", "vendor-d@example.com").await?;
    let err = quote_service::accept_quote(&state, &admin, order_id, ghost_vendor)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound));

    Ok(())
}
