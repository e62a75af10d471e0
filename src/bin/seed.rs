use argon2::{
    Argon2, PasswordHasher,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum_petmarket_api::{
    config::AppConfig,
    db::{create_orm_conn, create_pool, run_migrations},
};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let orm = create_orm_conn(&config.database_url).await?;
    run_migrations(&orm).await?;

    let pool = create_pool(&config.database_url).await?;

    let admin_id = ensure_user(&pool, "admin@example.com", "admin123", "admin").await?;
    let seller_id = ensure_user(&pool, "seller@example.com", "seller123", "seller").await?;
    let user_id = ensure_user(&pool, "user@example.com", "user123", "user").await?;

    seed_categories_and_pets(&pool, seller_id).await?;
    seed_coupons(&pool).await?;

    println!("Seed completed. Admin: {admin_id}, Seller: {seller_id}, User: {user_id}");
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

    let name = email.split('@').next().unwrap_or(email);

    let row: (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO users (id, email, password_hash, name, role)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (email) DO UPDATE SET role = EXCLUDED.role
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(email)
    .bind(password_hash)
    .bind(name)
    .bind(role)
    .fetch_one(pool)
    .await?;

    println!("Ensured user {email} (role={role})");
    Ok(row.0)
}

async fn ensure_category(
    pool: &sqlx::PgPool,
    name: &str,
    slug: &str,
    parent_id: Option<Uuid>,
) -> anyhow::Result<Uuid> {
    let row: (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO categories (id, name, slug, parent_id)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (slug) DO UPDATE SET name = EXCLUDED.name
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(slug)
    .bind(parent_id)
    .fetch_one(pool)
    .await?;
    Ok(row.0)
}

async fn seed_categories_and_pets(pool: &sqlx::PgPool, seller_id: Uuid) -> anyhow::Result<()> {
    let pets_root = ensure_category(pool, "Pets", "pets", None).await?;
    let accessories_root = ensure_category(pool, "Accessories", "accessories", None).await?;

    let dogs = ensure_category(pool, "Dogs", "dogs", Some(pets_root)).await?;
    let cats = ensure_category(pool, "Cats", "cats", Some(pets_root)).await?;
    let corgi = ensure_category(pool, "Corgi", "corgi", Some(dogs)).await?;
    let poodle = ensure_category(pool, "Poodle", "poodle", Some(dogs)).await?;
    let british = ensure_category(pool, "British Shorthair", "british-shorthair", Some(cats)).await?;

    let food = ensure_category(pool, "Food", "food", Some(accessories_root)).await?;
    let toys = ensure_category(pool, "Toys", "toys", Some(accessories_root)).await?;

    let listings = vec![
        ("Corgi puppy", "Friendly tri-color corgi", 8_500_000_i64, 2, Some("male"), Some("Hanoi"), corgi),
        ("Toy poodle", "Apricot toy poodle", 6_000_000, 1, Some("female"), Some("Da Nang"), poodle),
        ("British shorthair kitten", "Blue british shorthair", 7_200_000, 3, Some("male"), Some("Ho Chi Minh"), british),
        ("Premium kibble 5kg", "Grain-free dry food", 450_000, 40, None, None, food),
        ("Rope tug toy", "Durable cotton rope", 90_000, 100, None, None, toys),
    ];

    for (name, desc, price, stock, gender, city, category_id) in listings {
        sqlx::query(
            r#"
            INSERT INTO pets (id, seller_id, category_id, name, description, price, stock, gender, city, images)
            SELECT $1, $2, $3, $4, $5, $6, $7, $8, $9, '[]'::JSONB
            WHERE NOT EXISTS (SELECT 1 FROM pets WHERE name = $4 AND seller_id = $2)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(seller_id)
        .bind(category_id)
        .bind(name)
        .bind(desc)
        .bind(price)
        .bind(stock)
        .bind(gender)
        .bind(city)
        .execute(pool)
        .await?;
    }

    println!("Seeded categories and listings");
    Ok(())
}

async fn seed_coupons(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO coupons (id, code, discount, min_order)
        VALUES ($1, 'PETLOVE10', 100000, 500000)
        ON CONFLICT (code) DO NOTHING
        "#,
    )
    .bind(Uuid::new_v4())
    .execute(pool)
    .await?;

    println!("Seeded coupons");
    Ok(())
}
