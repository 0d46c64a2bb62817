use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::Location,
    response::ApiResponse,
    state::AppState,
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct LocationPayload {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LocationList {
    pub items: Vec<Location>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_locations).post(create_location))
        .route(
            "/{id}",
            get(get_location).put(update_location).delete(delete_location),
        )
}

#[utoipa::path(
    get,
    path = "/location",
    responses(
        (status = 200, description = "List locations, newest first", body = ApiResponse<LocationList>)
    ),
    tag = "Locations"
)]
pub async fn list_locations(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<LocationList>>> {
    let items = sqlx::query_as::<_, Location>(
        "SELECT id, name, description, created_at FROM locations ORDER BY created_at DESC",
    )
    .fetch_all(&state.pool)
    .await?;

    Ok(Json(ApiResponse::data(LocationList { items })))
}

#[utoipa::path(
    get,
    path = "/location/{id}",
    params(("id" = Uuid, Path, description = "Location ID")),
    responses(
        (status = 200, description = "Get location", body = ApiResponse<Location>),
        (status = 404, description = "Location not found"),
    ),
    tag = "Locations"
)]
pub async fn get_location(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Location>>> {
    let location = sqlx::query_as::<_, Location>(
        "SELECT id, name, description, created_at FROM locations WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(&state.pool)
    .await?;

    match location {
        Some(l) => Ok(Json(ApiResponse::data(l))),
        None => Err(AppError::NotFound),
    }
}

#[utoipa::path(
    post,
    path = "/location",
    request_body = LocationPayload,
    responses(
        (status = 201, description = "Create location", body = ApiResponse<Location>),
        (status = 400, description = "Missing name or description"),
    ),
    security(("bearer_auth" = [])),
    tag = "Locations"
)]
pub async fn create_location(
    State(state): State<AppState>,
    _user: AuthUser,
    Json(payload): Json<LocationPayload>,
) -> AppResult<(StatusCode, Json<ApiResponse<Location>>)> {
    let (name, description) = required_fields(payload)?;

    let location = sqlx::query_as::<_, Location>(
        r#"
        INSERT INTO locations (id, name, description)
        VALUES ($1, $2, $3)
        RETURNING id, name, description, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(description)
    .fetch_one(&state.pool)
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success("Location created successfully", location)),
    ))
}

#[utoipa::path(
    put,
    path = "/location/{id}",
    params(("id" = Uuid, Path, description = "Location ID")),
    request_body = LocationPayload,
    responses(
        (status = 200, description = "Updated location", body = ApiResponse<Location>),
        (status = 400, description = "Missing name or description"),
        (status = 404, description = "Location not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Locations"
)]
pub async fn update_location(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<LocationPayload>,
) -> AppResult<Json<ApiResponse<Location>>> {
    let (name, description) = required_fields(payload)?;

    let location = sqlx::query_as::<_, Location>(
        r#"
        UPDATE locations SET name = $2, description = $3
        WHERE id = $1
        RETURNING id, name, description, created_at
        "#,
    )
    .bind(id)
    .bind(name)
    .bind(description)
    .fetch_optional(&state.pool)
    .await?;

    match location {
        Some(l) => Ok(Json(ApiResponse::success("Location updated successfully", l))),
        None => Err(AppError::NotFound),
    }
}

#[utoipa::path(
    delete,
    path = "/location/{id}",
    params(("id" = Uuid, Path, description = "Location ID")),
    responses(
        (status = 200, description = "Deleted location"),
        (status = 404, description = "Location not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Locations"
)]
pub async fn delete_location(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let result = sqlx::query("DELETE FROM locations WHERE id = $1")
        .bind(id)
        .execute(&state.pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }

    Ok(Json(ApiResponse::message("Location deleted successfully")))
}

fn required_fields(payload: LocationPayload) -> AppResult<(String, String)> {
    match (payload.name, payload.description) {
        (Some(n), Some(d)) if !n.trim().is_empty() && !d.trim().is_empty() => Ok((n, d)),
        _ => Err(AppError::BadRequest(
            "Name and description are required".into(),
        )),
    }
}
