use axum::{
    Json, Router,
    extract::{Path, State},
    http::{StatusCode, header},
    response::IntoResponse,
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::orders::{CreateOrderRequest, OrderItemList, OrderList, UpdateOrderStatusRequest},
    error::AppResult,
    middleware::auth::AuthUser,
    models::Order,
    response::ApiResponse,
    services::order_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_orders).post(create_order))
        .route(
            "/{id}",
            get(get_order).put(update_order_status).delete(delete_order),
        )
        .route("/{id}/items", get(list_order_items))
        .route("/{id}/generate-pdf", get(generate_pdf))
}

#[utoipa::path(
    get,
    path = "/orders",
    responses(
        (status = 200, description = "All orders with customer, newest first", body = ApiResponse<OrderList>)
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn list_orders(
    State(state): State<AppState>,
    _user: AuthUser,
) -> AppResult<Json<ApiResponse<OrderList>>> {
    let resp = order_service::list_orders(&state).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/orders/{id}",
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Get order", body = ApiResponse<Order>),
        (status = 404, description = "Order not found"),
    ),
    tag = "Orders"
)]
pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let resp = order_service::get_order(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/orders/{id}/items",
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Line items joined with product name and image", body = ApiResponse<OrderItemList>)
    ),
    tag = "Orders"
)]
pub async fn list_order_items(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<OrderItemList>>> {
    let resp = order_service::list_order_items(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/orders/{id}/generate-pdf",
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Invoice PDF attachment", content_type = "application/pdf"),
        (status = 404, description = "Order not found"),
    ),
    tag = "Orders"
)]
pub async fn generate_pdf(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let (filename, bytes) = order_service::generate_invoice(&state, id).await?;

    let headers = [
        (header::CONTENT_TYPE, "application/pdf".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename={filename}"),
        ),
    ];
    Ok((headers, bytes))
}

#[utoipa::path(
    post,
    path = "/orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Create order with optional line items", body = ApiResponse<Order>),
        (status = 400, description = "Missing customer or invalid item"),
    ),
    tag = "Orders"
)]
pub async fn create_order(
    State(state): State<AppState>,
    Json(payload): Json<CreateOrderRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Order>>)> {
    let resp = order_service::create_order(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    put,
    path = "/orders/{id}",
    params(("id" = Uuid, Path, description = "Order ID")),
    request_body = UpdateOrderStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = ApiResponse<Order>),
        (status = 400, description = "Invalid status transition"),
        (status = 404, description = "Order not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn update_order_status(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateOrderStatusRequest>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let resp = order_service::update_order_status(&state, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/orders/{id}",
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order and its items deleted"),
        (status = 404, description = "Order not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn delete_order(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = order_service::delete_order(&state, id).await?;
    Ok(Json(resp))
}
