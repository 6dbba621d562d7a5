use argon2::{
    Argon2, PasswordHasher,
    password_hash::{SaltString, rand_core::OsRng},
};
use nexbuild_api::{config::AppConfig, db::create_pool};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    // Ensure migrations are applied.
    sqlx::migrate!("./migrations").run(&pool).await?;

    let admin_id = ensure_user(&pool, "admin@nexbuild.example", "admin123", "admin").await?;
    let vendor_id = ensure_user(&pool, "vendor@nexbuild.example", "vendor123", "vendor").await?;
    let customer_id = ensure_user(&pool, "customer@nexbuild.example", "customer123", "customer").await?;
    seed_components(&pool).await?;

    println!("Seed completed. Admin: {admin_id}, Vendor: {vendor_id}, Customer: {customer_id}");
    Ok(())
}

async fn ensure_user(
    pool: &sqlx::PgPool,
    email: &str,
    password: &str,
    role: &str,
) -> anyhow::Result<Uuid> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!(e.to_string()))?
        .to_string();

    let row: Option<(Uuid,)> = sqlx::query_as(
        r#"
        INSERT INTO users (id, email, password_hash, role)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (email) DO UPDATE SET role = EXCLUDED.role
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(email)
    .bind(password_hash)
    .bind(role)
    .fetch_optional(pool)
    .await?;

    // If user already exists, fetch id
    let user_id = match row {
        Some((id,)) => id,
        None => {
            let existing: (Uuid,) = sqlx::query_as("SELECT id FROM users WHERE email = $1")
                .bind(email)
                .fetch_one(pool)
                .await?;
            existing.0
        }
    };

    println!("Ensured user {email} (role={role})");
    Ok(user_id)
}

async fn seed_components(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let components = vec![
        ("processor", "Ryzen 5 7600", "6-core AM5 processor", 18_500, 40),
        ("processor", "Core i7-14700K", "20-core LGA1700 processor", 36_000, 25),
        ("graphics", "GeForce RTX 4060", "8 GB GDDR6 graphics card", 29_500, 30),
        ("graphics", "Radeon RX 7800 XT", "16 GB GDDR6 graphics card", 46_000, 18),
        ("memory", "32 GB DDR5-6000 kit", "2x16 GB CL30", 9_800, 60),
        ("storage", "1 TB NVMe Gen4 SSD", "7000 MB/s reads", 7_200, 80),
        ("storage", "2 TB NVMe Gen4 SSD", "High-endurance TLC", 13_500, 50),
        ("cooling", "240 mm AIO liquid cooler", "Dual-fan radiator", 8_400, 35),
        ("power", "750 W 80+ Gold PSU", "Fully modular", 7_900, 45),
        ("motherboard", "B650 ATX board", "PCIe 5.0 M.2, WiFi 6E", 15_200, 30),
        ("case", "Mid-tower airflow case", "Mesh front, 3 fans included", 5_600, 55),
    ];

    for (category, name, desc, price, stock) in components {
        sqlx::query(
            r#"
            INSERT INTO components (id, category, name, description, price, stock)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (name) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(category)
        .bind(name)
        .bind(desc)
        .bind(price)
        .bind(stock)
        .execute(pool)
        .await?;
    }

    println!("Seeded components");
    Ok(())
}
