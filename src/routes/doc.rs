use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        auth::{LoginRequest, LoginResponse, RegisterRequest},
        orders::{
            CreateOrderRequest, NewCustomer, NewOrderItem, OrderItemList, OrderList,
            UpdateOrderStatusRequest,
        },
    },
    models::{Category, Location, Order, OrderItem, OrderStatus, Product, User},
    response::ApiResponse,
    routes::{categories, health, health::HealthData, locations, orders, products, users},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        categories::list_categories,
        categories::create_category,
        categories::update_category,
        categories::delete_category,
        products::list_products,
        products::get_product,
        products::create_product,
        products::update_product,
        products::delete_product,
        locations::list_locations,
        locations::get_location,
        locations::create_location,
        locations::update_location,
        locations::delete_location,
        orders::list_orders,
        orders::get_order,
        orders::list_order_items,
        orders::generate_pdf,
        orders::create_order,
        orders::update_order_status,
        orders::delete_order,
        users::login,
        users::register,
        users::list_users,
        users::create_user,
        users::update_user,
        users::delete_user
    ),
    components(
        schemas(
            User,
            Category,
            Product,
            Location,
            Order,
            OrderItem,
            OrderStatus,
            LoginRequest,
            LoginResponse,
            RegisterRequest,
            CreateOrderRequest,
            NewCustomer,
            NewOrderItem,
            UpdateOrderStatusRequest,
            OrderList,
            OrderItemList,
            categories::CategoryPayload,
            categories::CategoryList,
            products::ProductListQuery,
            products::ProductList,
            locations::LocationPayload,
            locations::LocationList,
            users::UserPayload,
            users::UserList,
            HealthData,
            ApiResponse<Order>,
            ApiResponse<OrderList>,
            ApiResponse<OrderItemList>,
            ApiResponse<Product>,
            ApiResponse<products::ProductList>,
            ApiResponse<Category>,
            ApiResponse<categories::CategoryList>,
            ApiResponse<Location>,
            ApiResponse<locations::LocationList>,
            ApiResponse<User>,
            ApiResponse<users::UserList>,
            ApiResponse<LoginResponse>,
            ApiResponse<HealthData>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Categories", description = "Category endpoints"),
        (name = "Products", description = "Product endpoints"),
        (name = "Locations", description = "Location endpoints"),
        (name = "Orders", description = "Order endpoints"),
        (name = "Users", description = "User management endpoints"),
        (name = "Auth", description = "Authentication endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
