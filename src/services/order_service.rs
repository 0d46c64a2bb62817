use std::str::FromStr;

use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::LockType;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    db::DbPool,
    dto::orders::{CreateOrderRequest, OrderItemList, OrderList, UpdateOrderStatusRequest},
    entity::{
        customers::ActiveModel as CustomerActive,
        order_items::{ActiveModel as OrderItemActive, Column as OrderItemCol, Entity as OrderItems},
        orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders},
        products::Entity as Products,
    },
    error::{AppError, AppResult},
    invoice::render_invoice,
    models::{Order, OrderItem, OrderStatus},
    response::ApiResponse,
    state::AppState,
};

const ORDER_SELECT: &str = r#"
    SELECT
        o.id,
        o.customer_id,
        c.name AS customer_name,
        c.phone AS customer_phone,
        o.total_price,
        o.status,
        o.payment_method,
        o.created_at
    FROM orders o
    JOIN customers c ON o.customer_id = c.id
"#;

const ITEM_SELECT: &str = r#"
    SELECT
        oi.id,
        oi.order_id,
        oi.product_id,
        p.name AS product_name,
        p.image_url,
        oi.quantity,
        oi.price
    FROM order_items oi
    JOIN products p ON oi.product_id = p.id
    WHERE oi.order_id = $1
"#;

/// All orders with their customer, newest first. Deliberately unpaginated;
/// the back-office list view consumes the whole set.
pub async fn list_orders(state: &AppState) -> AppResult<ApiResponse<OrderList>> {
    let orders = sqlx::query_as::<_, Order>(&format!("{ORDER_SELECT} ORDER BY o.created_at DESC"))
        .fetch_all(&state.pool)
        .await?;

    Ok(ApiResponse::data(OrderList { items: orders }))
}

pub async fn get_order(state: &AppState, id: Uuid) -> AppResult<ApiResponse<Order>> {
    let order = fetch_order(&state.pool, id).await?;
    Ok(ApiResponse::data(order))
}

pub async fn list_order_items(state: &AppState, id: Uuid) -> AppResult<ApiResponse<OrderItemList>> {
    let items = fetch_items(&state.pool, id).await?;
    Ok(ApiResponse::data(OrderItemList { items }))
}

/// Create an order, its walk-in customer when supplied inline, and its line
/// items in one transaction. Line-item prices are snapshotted from the
/// products table; the stored total is taken from the request as-is.
pub async fn create_order(
    state: &AppState,
    payload: CreateOrderRequest,
) -> AppResult<ApiResponse<Order>> {
    let status = payload.status.unwrap_or(OrderStatus::Pending);
    let payment_method = payload
        .payment_method
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| "cash".to_string());

    let txn = state.orm.begin().await?;

    let customer_id = match (payload.customer_id, payload.customer) {
        (Some(id), _) => id,
        (None, Some(customer)) => {
            if customer.name.trim().is_empty() {
                return Err(AppError::BadRequest("Customer name is required".into()));
            }
            let created = CustomerActive {
                id: Set(Uuid::new_v4()),
                name: Set(customer.name.trim().to_string()),
                phone: Set(customer.phone),
                created_at: NotSet,
            }
            .insert(&txn)
            .await?;
            created.id
        }
        (None, None) => {
            return Err(AppError::BadRequest(
                "Either customer_id or customer is required".into(),
            ));
        }
    };

    let order = OrderActive {
        id: Set(Uuid::new_v4()),
        customer_id: Set(customer_id),
        total_price: Set(payload.total_price),
        status: Set(status.as_str().to_string()),
        payment_method: Set(payment_method),
        created_at: NotSet,
    }
    .insert(&txn)
    .await?;

    for item in &payload.items {
        if item.quantity <= 0 {
            return Err(AppError::BadRequest("Item quantity must be positive".into()));
        }
        let product = Products::find_by_id(item.product_id)
            .one(&txn)
            .await?
            .ok_or_else(|| {
                AppError::BadRequest(format!("Unknown product {}", item.product_id))
            })?;

        OrderItemActive {
            id: Set(Uuid::new_v4()),
            order_id: Set(order.id),
            product_id: Set(item.product_id),
            quantity: Set(item.quantity),
            price: Set(product.price),
        }
        .insert(&txn)
        .await?;
    }

    txn.commit().await?;

    tracing::info!(order_id = %order.id, items = payload.items.len(), "order created");

    let order = fetch_order(&state.pool, order.id).await?;
    Ok(ApiResponse::success("Order created", order))
}

/// Overwrite the order status, subject to the transition table. The row is
/// locked for the duration so two racing updates serialize.
pub async fn update_order_status(
    state: &AppState,
    id: Uuid,
    payload: UpdateOrderStatusRequest,
) -> AppResult<ApiResponse<Order>> {
    let txn = state.orm.begin().await?;

    let order = Orders::find()
        .filter(OrderCol::Id.eq(id))
        .lock(LockType::Update)
        .one(&txn)
        .await?;
    let order = match order {
        Some(o) => o,
        None => return Err(AppError::NotFound),
    };

    let current = OrderStatus::from_str(&order.status)
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e)))?;
    let next = payload.status;

    if !current.can_transition_to(next) {
        return Err(AppError::BadRequest(format!(
            "Cannot change order status from {current} to {next}"
        )));
    }

    let mut active: OrderActive = order.into();
    active.status = Set(next.as_str().to_string());
    active.update(&txn).await?;

    txn.commit().await?;

    tracing::info!(order_id = %id, status = %next, "order status updated");

    let order = fetch_order(&state.pool, id).await?;
    Ok(ApiResponse::success("Status updated", order))
}

/// Delete an order and its line items atomically: both rows sets go or
/// neither does, also under a concurrent delete of the same order.
pub async fn delete_order(state: &AppState, id: Uuid) -> AppResult<ApiResponse<serde_json::Value>> {
    let txn = state.orm.begin().await?;

    OrderItems::delete_many()
        .filter(OrderItemCol::OrderId.eq(id))
        .exec(&txn)
        .await?;

    let result = Orders::delete_by_id(id).exec(&txn).await?;
    if result.rows_affected == 0 {
        txn.rollback().await?;
        return Err(AppError::NotFound);
    }

    txn.commit().await?;

    tracing::info!(order_id = %id, "order deleted");
    Ok(ApiResponse::message("Order and related items deleted successfully"))
}

/// Render the order's invoice; returns the attachment filename and the PDF bytes.
pub async fn generate_invoice(state: &AppState, id: Uuid) -> AppResult<(String, Vec<u8>)> {
    let order = fetch_order(&state.pool, id).await?;
    let items = fetch_items(&state.pool, id).await?;

    let bytes = render_invoice(&order, &items)?;
    let filename = format!("Invoice_Order_{}.pdf", order.id);
    Ok((filename, bytes))
}

async fn fetch_order(pool: &DbPool, id: Uuid) -> AppResult<Order> {
    let order = sqlx::query_as::<_, Order>(&format!("{ORDER_SELECT} WHERE o.id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await?;

    match order {
        Some(o) => Ok(o),
        None => Err(AppError::NotFound),
    }
}

async fn fetch_items(pool: &DbPool, order_id: Uuid) -> AppResult<Vec<OrderItem>> {
    let items = sqlx::query_as::<_, OrderItem>(ITEM_SELECT)
        .bind(order_id)
        .fetch_all(pool)
        .await?;
    Ok(items)
}
