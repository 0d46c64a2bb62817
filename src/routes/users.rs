use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    dto::auth::{LoginRequest, LoginResponse, RegisterRequest},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::User,
    response::ApiResponse,
    services::auth_service,
    state::AppState,
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct UserPayload {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserList {
    pub items: Vec<User>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/register", post(register))
        .route("/", get(list_users).post(create_user))
        .route("/{id}", put(update_user).delete(delete_user))
}

#[utoipa::path(
    post,
    path = "/api/users/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login user", body = ApiResponse<LoginResponse>),
        (status = 401, description = "Invalid credentials"),
    ),
    tag = "Auth"
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<ApiResponse<LoginResponse>>> {
    let resp = auth_service::login_user(&state.pool, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/users/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Register user", body = ApiResponse<User>),
        (status = 400, description = "Email already exists"),
    ),
    tag = "Auth"
)]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<User>>)> {
    let resp = auth_service::register_user(&state.pool, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    get,
    path = "/api/users",
    responses(
        (status = 200, description = "List users (public fields)", body = ApiResponse<UserList>)
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn list_users(
    State(state): State<AppState>,
    _user: AuthUser,
) -> AppResult<Json<ApiResponse<UserList>>> {
    let items =
        sqlx::query_as::<_, User>("SELECT id, name, email, role, created_at FROM users")
            .fetch_all(&state.pool)
            .await?;

    Ok(Json(ApiResponse::data(UserList { items })))
}

#[utoipa::path(
    post,
    path = "/api/users",
    request_body = UserPayload,
    responses(
        (status = 201, description = "Create user without password (back-office account)", body = ApiResponse<User>),
        (status = 400, description = "Missing name or email"),
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn create_user(
    State(state): State<AppState>,
    _user: AuthUser,
    Json(payload): Json<UserPayload>,
) -> AppResult<(StatusCode, Json<ApiResponse<User>>)> {
    let (name, email) = match (payload.name, payload.email) {
        (Some(n), Some(e)) if !n.trim().is_empty() && !e.trim().is_empty() => (n, e),
        _ => return Err(AppError::BadRequest("Name and email are required".into())),
    };

    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (id, name, email, role)
        VALUES ($1, $2, $3, $4)
        RETURNING id, name, email, role, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(email)
    .bind(payload.role.unwrap_or_else(|| "user".to_string()))
    .fetch_one(&state.pool)
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success("User created", user)),
    ))
}

#[utoipa::path(
    put,
    path = "/api/users/{id}",
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = UserPayload,
    responses(
        (status = 200, description = "Updated user", body = ApiResponse<User>),
        (status = 404, description = "User not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn update_user(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UserPayload>,
) -> AppResult<Json<ApiResponse<User>>> {
    let existing = sqlx::query_as::<_, User>(
        "SELECT id, name, email, role, created_at FROM users WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(&state.pool)
    .await?;
    let existing = match existing {
        Some(u) => u,
        None => return Err(AppError::NotFound),
    };

    let name = payload.name.unwrap_or(existing.name);
    let email = payload.email.unwrap_or(existing.email);
    let role = payload.role.unwrap_or(existing.role);

    let user = sqlx::query_as::<_, User>(
        r#"
        UPDATE users SET name = $2, email = $3, role = $4
        WHERE id = $1
        RETURNING id, name, email, role, created_at
        "#,
    )
    .bind(id)
    .bind(name)
    .bind(email)
    .bind(role)
    .fetch_one(&state.pool)
    .await?;

    Ok(Json(ApiResponse::success("User updated", user)))
}

#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "Deleted user"),
        (status = 404, description = "User not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn delete_user(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(id)
        .execute(&state.pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }

    Ok(Json(ApiResponse::message("User deleted successfully")))
}
