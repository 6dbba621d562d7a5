use nexbuild_api::{
    clients::{InvoiceRenderer, Mailer, PaymentGateway},
    db::{create_orm_conn, create_pool, run_migrations},
    entity::{components::ActiveModel as ComponentActive, users::ActiveModel as UserActive},
    state::AppState,
};
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ConnectionTrait, Set, Statement};
use uuid::Uuid;

/// Returns `None` (test should be skipped) when no database is configured.
pub async fn try_setup_state() -> anyhow::Result<Option<AppState>> {
    let database_url =
        match std::env::var("TEST_DATABASE_URL").or_else(|_| std::env::var("DATABASE_URL")) {
            Ok(url) => url,
            Err(_) => {
                eprintln!(
                    "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests."
                );
                return Ok(None);
            }
        };

    let pool = create_pool(&database_url).await?;
    let orm = create_orm_conn(&database_url).await?;
    run_migrations(&orm).await?;

    // Clean tables between runs
    let backend = orm.get_database_backend();
    orm.execute(Statement::from_string(
        backend,
        "TRUNCATE TABLE component_quotations, vendor_quotations, vendor_stats, order_updates, \
         order_items, orders, audit_logs, components, users RESTART IDENTITY CASCADE",
    ))
    .await?;

    Ok(Some(AppState {
        pool,
        orm,
        mailer: Mailer::disabled(),
        invoices: InvoiceRenderer::disabled(),
        payments: PaymentGateway::disabled(),
    }))
}

pub async fn create_user(state: &AppState, role: &str, email: &str) -> anyhow::Result<Uuid> {
    let user = UserActive {
        id: Set(Uuid::new_v4()),
        email: Set(email.to_string()),
        password_hash: Set("dummy".into()),
        role: Set(role.into()),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(user.id)
}

pub async fn create_component(
    state: &AppState,
    category: &str,
    name: &str,
    price: i64,
    stock: i32,
) -> anyhow::Result<Uuid> {
    let component = ComponentActive {
        id: Set(Uuid::new_v4()),
        category: Set(category.into()),
        name: Set(name.into()),
        description: Set(Some(format!("{name} for testing"))),
        price: Set(price),
        stock: Set(stock),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(component.id)
}

/// One component per build slot, priced to a 45,000 component cost total.
pub async fn seed_full_build(state: &AppState) -> anyhow::Result<Vec<Uuid>> {
    let parts = [
        ("processor", "Test CPU", 15_000),
        ("graphics", "Test GPU", 12_000),
        ("memory", "Test RAM", 4_000),
        ("storage", "Test SSD", 5_000),
        ("cooling", "Test Cooler", 2_000),
        ("power", "Test PSU", 2_500),
        ("motherboard", "Test Board", 3_000),
        ("case", "Test Case", 1_500),
    ];

    let mut ids = Vec::new();
    for (category, name, price) in parts {
        ids.push(create_component(state, category, name, price, 10).await?);
    }
    Ok(ids)
}
