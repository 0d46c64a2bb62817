use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::Category,
    response::ApiResponse,
    state::AppState,
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CategoryPayload {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CategoryList {
    pub items: Vec<Category>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_categories).post(create_category))
        .route("/{id}", put(update_category).delete(delete_category))
}

#[utoipa::path(
    get,
    path = "/categories",
    responses(
        (status = 200, description = "List categories", body = ApiResponse<CategoryList>)
    ),
    tag = "Categories"
)]
pub async fn list_categories(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<CategoryList>>> {
    let items = sqlx::query_as::<_, Category>("SELECT id, name, description FROM categories")
        .fetch_all(&state.pool)
        .await?;

    Ok(Json(ApiResponse::data(CategoryList { items })))
}

#[utoipa::path(
    post,
    path = "/categories",
    request_body = CategoryPayload,
    responses(
        (status = 201, description = "Create category", body = ApiResponse<Category>),
        (status = 400, description = "Missing name"),
    ),
    security(("bearer_auth" = [])),
    tag = "Categories"
)]
pub async fn create_category(
    State(state): State<AppState>,
    _user: AuthUser,
    Json(payload): Json<CategoryPayload>,
) -> AppResult<(StatusCode, Json<ApiResponse<Category>>)> {
    let name = required(payload.name, "name")?;

    let category = sqlx::query_as::<_, Category>(
        "INSERT INTO categories (id, name, description) VALUES ($1, $2, $3) RETURNING id, name, description",
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(payload.description)
    .fetch_one(&state.pool)
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success("Category created", category)),
    ))
}

#[utoipa::path(
    put,
    path = "/categories/{id}",
    params(("id" = Uuid, Path, description = "Category ID")),
    request_body = CategoryPayload,
    responses(
        (status = 200, description = "Updated category", body = ApiResponse<Category>),
        (status = 404, description = "Category not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Categories"
)]
pub async fn update_category(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<CategoryPayload>,
) -> AppResult<Json<ApiResponse<Category>>> {
    let name = required(payload.name, "name")?;

    let category = sqlx::query_as::<_, Category>(
        "UPDATE categories SET name = $2, description = $3 WHERE id = $1 RETURNING id, name, description",
    )
    .bind(id)
    .bind(name)
    .bind(payload.description)
    .fetch_optional(&state.pool)
    .await?;

    match category {
        Some(c) => Ok(Json(ApiResponse::success("Category updated", c))),
        None => Err(AppError::NotFound),
    }
}

#[utoipa::path(
    delete,
    path = "/categories/{id}",
    params(("id" = Uuid, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Deleted category"),
        (status = 404, description = "Category not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Categories"
)]
pub async fn delete_category(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let result = sqlx::query("DELETE FROM categories WHERE id = $1")
        .bind(id)
        .execute(&state.pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }

    Ok(Json(ApiResponse::message("Category deleted successfully")))
}

fn required(value: Option<String>, field: &str) -> AppResult<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(AppError::BadRequest(format!("{field} is required"))),
    }
}
