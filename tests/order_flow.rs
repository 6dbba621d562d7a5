mod common;

use common::{create_component, create_user, seed_full_build, try_setup_state};
use nexbuild_api::{
    dto::orders::{CheckoutRequest, ExtraStorageItem, ShippingAddress, StatusChangeRequest},
    error::AppError,
    middleware::auth::AuthUser,
    services::{admin_service, component_service, order_service},
    status::OrderStatus,
};

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

// Integration flow: customer checks out a full build; admin walks the order
// through the whole fulfilment sequence; tracking reflects every step.
// A second order exercises add-ons, checkout validation and cancellation.
#[tokio::test]
async fn checkout_advance_track_and_cancel_flow() -> anyhow::Result<()> {
    let Some(state) = try_setup_state().await? else {
        return Ok(());
    };

    let user_id = create_user(&state, "customer", "user@example.com").await?;
    let admin_id = create_user(&state, "admin", "admin@example.com").await?;
    let selections = seed_full_build(&state).await?;

    let auth_user = AuthUser {
        user_id,
        role: "customer".into(),
    };
    let auth_admin = AuthUser {
        user_id: admin_id,
        role: "admin".into(),
    };

    let resp = order_service::checkout(
        &state,
        &auth_user,
        CheckoutRequest {
            selections: selections.clone(),
            extra_storage: vec![],
            address: address(),
        },
    )
    .await?;
    let detail = resp.data.unwrap();
    let order = detail.order;

    // Component cost 45,000 puts the order in the 3,500 build-charge tier;
    // 5 kg default weight gives a 1,000 delivery charge and 8,910 GST.
    assert_eq!(order.component_cost, 45_000);
    assert_eq!(order.build_charge, 3_500);
    assert_eq!(order.delivery_charge, 1_000);
    assert_eq!(order.gst, 8_910);
    assert_eq!(order.total_amount, 58_410);
    assert_eq!(order.status, OrderStatus::OrderReceived);
    assert!(order.tracking_code.starts_with("NXB-"));
    assert_eq!(order.tracking_code.len(), 10);
    assert_eq!(detail.items.len(), 8);
    assert_eq!(detail.updates.len(), 1);
    assert_eq!(detail.updates[0].status, OrderStatus::OrderReceived);

    // Checkout reserves stock.
    let cpu = component_service::get_component(&state, selections[0])
        .await?
        .data
        .unwrap();
    assert_eq!(cpu.stock, 9);

    // Walk the order through the pipeline.
    let expected = [
        OrderStatus::ComponentsOrdered,
        OrderStatus::ComponentsReceived,
        OrderStatus::PcBuilding,
        OrderStatus::PcTesting,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
    ];
    for next in expected {
        let updated = admin_service::advance_status(
            &state,
            &auth_admin,
            order.id,
            StatusChangeRequest { message: None },
        )
        .await?;
        assert_eq!(updated.data.unwrap().status, next);
    }

    // Terminal orders refuse to advance; no phantom "processing" state.
    let err = admin_service::advance_status(
        &state,
        &auth_admin,
        order.id,
        StatusChangeRequest { message: None },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Status(_)), "got {err:?}");

    // History holds the initial entry plus one row per transition.
    let tracked = order_service::track(&state, &order.tracking_code)
        .await?
        .data
        .unwrap();
    assert_eq!(tracked.status, OrderStatus::Delivered);
    assert_eq!(tracked.updates.len(), 7);
    assert_eq!(tracked.updates.last().unwrap().status, OrderStatus::Delivered);

    // Unknown tracking codes are a not-found result, not a failure mode.
    let err = order_service::track(&state, "NXB-2311-12345")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound));

    // Second order: add-on storage counts into the component cost.
    let spare_ssd = create_component(&state, "storage", "Spare SSD", 6_000, 5).await?;
    let resp = order_service::checkout(
        &state,
        &auth_user,
        CheckoutRequest {
            selections: selections.clone(),
            extra_storage: vec![ExtraStorageItem {
                component_id: spare_ssd,
                quantity: 2,
            }],
            address: address(),
        },
    )
    .await?;
    let second = resp.data.unwrap();

    // 45,000 base build plus 2 x 6,000 of add-on storage.
    assert_eq!(second.order.component_cost, 57_000);
    assert_eq!(second.order.build_charge, 5_000);
    assert_eq!(second.items.len(), 9);
    assert!(second.items.iter().any(|i| i.is_addon && i.quantity == 2));

    // Add-ons must come from the storage category.
    let err = order_service::checkout(
        &state,
        &auth_user,
        CheckoutRequest {
            selections: selections.clone(),
            extra_storage: vec![ExtraStorageItem {
                component_id: selections[0],
                quantity: 1,
            }],
            address: address(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    // Incomplete build: missing the case slot.
    let err = order_service::checkout(
        &state,
        &auth_user,
        CheckoutRequest {
            selections: selections[..7].to_vec(),
            extra_storage: vec![],
            address: address(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    // Two picks in the same slot.
    let second_cpu = create_component(&state, "processor", "Second CPU", 20_000, 5).await?;
    let mut doubled = selections.clone();
    doubled.push(second_cpu);
    let err = order_service::checkout(
        &state,
        &auth_user,
        CheckoutRequest {
            selections: doubled,
            extra_storage: vec![],
            address: address(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    // Cancel jumps straight to the terminal state, once.
    let cancelled = admin_service::cancel_order(
        &state,
        &auth_admin,
        second.order.id,
        StatusChangeRequest {
            message: Some("Customer requested cancellation".into()),
        },
    )
    .await?;
    assert_eq!(cancelled.data.unwrap().status, OrderStatus::Cancelled);

    let err = admin_service::cancel_order(
        &state,
        &auth_admin,
        second.order.id,
        StatusChangeRequest { message: None },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Status(_)));

    Ok(())
}
