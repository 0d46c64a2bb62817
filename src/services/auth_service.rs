use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use password_hash::rand_core::OsRng;
use uuid::Uuid;

use crate::{
    db::DbPool,
    dto::auth::{Claims, LoginRequest, LoginResponse, RegisterRequest},
    error::{AppError, AppResult},
    models::User,
    response::ApiResponse,
};

// Unknown email and wrong password answer identically.
const INVALID_CREDENTIALS: &str = "Invalid email or password";

const TOKEN_TTL_HOURS: i64 = 1;

#[derive(Debug, sqlx::FromRow)]
struct AuthRow {
    id: Uuid,
    name: String,
    email: String,
    role: String,
    created_at: DateTime<Utc>,
    password_hash: Option<String>,
}

pub async fn register_user(pool: &DbPool, payload: RegisterRequest) -> AppResult<ApiResponse<User>> {
    let RegisterRequest {
        name,
        email,
        password,
        role,
    } = payload;

    if name.trim().is_empty() || email.trim().is_empty() || password.is_empty() {
        return Err(AppError::BadRequest(
            "Name, email and password are required".into(),
        ));
    }

    let exist: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM users WHERE email = $1")
        .bind(email.as_str())
        .fetch_optional(pool)
        .await?;

    if exist.is_some() {
        return Err(AppError::BadRequest("Email already exists".to_string()));
    }

    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?
        .to_string();

    let user: User = sqlx::query_as(
        r#"
        INSERT INTO users (id, name, email, password_hash, role)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, name, email, role, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(name.trim())
    .bind(email.as_str())
    .bind(password_hash)
    .bind(role.unwrap_or_else(|| "user".to_string()))
    .fetch_one(pool)
    .await?;

    tracing::info!(user_id = %user.id, "user registered");
    Ok(ApiResponse::success("User created", user))
}

pub async fn login_user(pool: &DbPool, payload: LoginRequest) -> AppResult<ApiResponse<LoginResponse>> {
    let LoginRequest { email, password } = payload;
    let row: Option<AuthRow> = sqlx::query_as(
        "SELECT id, name, email, role, created_at, password_hash FROM users WHERE email = $1",
    )
    .bind(email.as_str())
    .fetch_optional(pool)
    .await?;

    let row = match row {
        Some(r) => r,
        None => return Err(AppError::Unauthorized(INVALID_CREDENTIALS.into())),
    };

    // Admin-created users carry no password and cannot log in.
    let stored_hash = row
        .password_hash
        .as_deref()
        .ok_or_else(|| AppError::Unauthorized(INVALID_CREDENTIALS.into()))?;

    let parsed_hash = PasswordHash::new(stored_hash)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Invalid password hash")))?;

    let argon2 = Argon2::default();
    if argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_err()
    {
        return Err(AppError::Unauthorized(INVALID_CREDENTIALS.into()));
    }

    let secret = std::env::var("JWT_SECRET")
        .map_err(|_| AppError::Internal(anyhow::anyhow!("JWT_SECRET is not set")))?;

    let expiration = Utc::now()
        .checked_add_signed(Duration::hours(TOKEN_TTL_HOURS))
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to set expiration")))?;

    let claims = Claims {
        sub: row.id.to_string(),
        email: row.email.clone(),
        exp: expiration.timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?;

    tracing::info!(user_id = %row.id, "user logged in");

    let resp = LoginResponse {
        token,
        user: User {
            id: row.id,
            name: row.name,
            email: row.email,
            role: row.role,
            created_at: row.created_at,
        },
    };

    Ok(ApiResponse::success("Login successful", resp))
}
