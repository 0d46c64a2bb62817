use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{Order, OrderItem, OrderStatus};

/// Walk-in customer supplied inline at checkout when no `customer_id` exists yet.
#[derive(Debug, Deserialize, ToSchema)]
pub struct NewCustomer {
    pub name: String,
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct NewOrderItem {
    pub product_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
    pub customer_id: Option<Uuid>,
    pub customer: Option<NewCustomer>,
    /// Stored verbatim; not recomputed from the line items.
    pub total_price: i64,
    pub status: Option<OrderStatus>,
    pub payment_method: Option<String>,
    #[serde(default)]
    pub items: Vec<NewOrderItem>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateOrderStatusRequest {
    pub status: OrderStatus,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderList {
    pub items: Vec<Order>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderItemList {
    pub items: Vec<OrderItem>,
}
