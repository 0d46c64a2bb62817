use argon2::{
    Argon2, PasswordHasher,
    password_hash::{SaltString, rand_core::OsRng},
};
use better_view_api::{config::AppConfig, db::create_pool};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    // Ensure migrations are applied.
    sqlx::migrate!("./migrations").run(&pool).await?;

    let admin_id = ensure_admin(&pool, "admin@betterview.local", "admin123").await?;
    seed_catalog(&pool).await?;
    seed_locations(&pool).await?;
    let customer_id = ensure_walk_in_customer(&pool).await?;

    println!("Seed completed. Admin ID: {admin_id}, walk-in customer ID: {customer_id}");
    Ok(())
}

async fn ensure_admin(pool: &sqlx::PgPool, email: &str, password: &str) -> anyhow::Result<Uuid> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!(e.to_string()))?
        .to_string();

    let row: Option<(Uuid,)> = sqlx::query_as(
        r#"
        INSERT INTO users (id, name, email, password_hash, role)
        VALUES ($1, $2, $3, $4, 'admin')
        ON CONFLICT (email) DO UPDATE SET role = EXCLUDED.role
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind("Administrator")
    .bind(email)
    .bind(password_hash)
    .fetch_optional(pool)
    .await?;

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

    println!("Ensured admin {email}");
    Ok(user_id)
}

async fn seed_catalog(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let categories = [
        ("Drinks", "Hot and cold beverages"),
        ("Food", "Kitchen dishes"),
        ("Snacks", "Small bites"),
    ];

    for (name, desc) in categories {
        let exists: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM categories WHERE name = $1")
            .bind(name)
            .fetch_optional(pool)
            .await?;
        let category_id = match exists {
            Some((id,)) => id,
            None => {
                let id = Uuid::new_v4();
                sqlx::query("INSERT INTO categories (id, name, description) VALUES ($1, $2, $3)")
                    .bind(id)
                    .bind(name)
                    .bind(desc)
                    .execute(pool)
                    .await?;
                id
            }
        };

        if name == "Drinks" {
            seed_products(pool, category_id).await?;
        }
    }

    println!("Seeded catalog");
    Ok(())
}

async fn seed_products(pool: &sqlx::PgPool, category_id: Uuid) -> anyhow::Result<()> {
    // Prices in satang.
    let products = [
        ("Hot Coffee", "Freshly brewed", 5000_i64, 100),
        ("Iced Tea", "Thai-style iced tea", 4500_i64, 100),
        ("Cocoa", "Iced or hot", 5500_i64, 50),
    ];

    for (name, desc, price, quantity) in products {
        let exists: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM products WHERE name = $1")
            .bind(name)
            .fetch_optional(pool)
            .await?;
        if exists.is_none() {
            sqlx::query(
                r#"
                INSERT INTO products (id, name, description, price, quantity, category_id)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(name)
            .bind(desc)
            .bind(price)
            .bind(quantity)
            .bind(category_id)
            .execute(pool)
            .await?;
        }
    }

    Ok(())
}

async fn seed_locations(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let locations = [
        ("Table 1", "Terrace, lake view"),
        ("Table 2", "Indoor, near the counter"),
    ];

    for (name, desc) in locations {
        let exists: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM locations WHERE name = $1")
            .bind(name)
            .fetch_optional(pool)
            .await?;
        if exists.is_none() {
            sqlx::query("INSERT INTO locations (id, name, description) VALUES ($1, $2, $3)")
                .bind(Uuid::new_v4())
                .bind(name)
                .bind(desc)
                .execute(pool)
                .await?;
        }
    }

    println!("Seeded locations");
    Ok(())
}

async fn ensure_walk_in_customer(pool: &sqlx::PgPool) -> anyhow::Result<Uuid> {
    let exists: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM customers WHERE name = $1")
        .bind("Walk-in")
        .fetch_optional(pool)
        .await?;

    let id = match exists {
        Some((id,)) => id,
        None => {
            let id = Uuid::new_v4();
            sqlx::query("INSERT INTO customers (id, name) VALUES ($1, $2)")
                .bind(id)
                .bind("Walk-in")
                .execute(pool)
                .await?;
            id
        }
    };

    Ok(id)
}
