use axum::{
    Json, Router,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    routing::get,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    db::DbPool,
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::Product,
    response::ApiResponse,
    state::AppState,
    uploads::store_image,
};

const PRODUCT_SELECT: &str = r#"
    SELECT
        p.id,
        p.name,
        p.description,
        p.price,
        p.quantity,
        p.category_id,
        c.name AS category_name,
        p.image_url,
        p.created_at
    FROM products p
    LEFT JOIN categories c ON p.category_id = c.id
"#;

#[derive(Debug, Deserialize, ToSchema)]
pub struct ProductListQuery {
    /// Category id to filter on; `all` or empty means unfiltered.
    pub category_id: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductList {
    pub items: Vec<Product>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route(
            "/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
}

#[utoipa::path(
    get,
    path = "/products",
    params(
        ("category_id" = Option<String>, Query, description = "Filter by category id; `all` for no filter")
    ),
    responses(
        (status = 200, description = "List products with their category", body = ApiResponse<ProductList>)
    ),
    tag = "Products"
)]
pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ProductListQuery>,
) -> AppResult<Json<ApiResponse<ProductList>>> {
    let filter = match query.category_id.as_deref() {
        None | Some("") | Some("all") => None,
        Some(raw) => Some(
            Uuid::parse_str(raw)
                .map_err(|_| AppError::BadRequest("Invalid category_id".into()))?,
        ),
    };

    let items = match filter {
        Some(category_id) => {
            sqlx::query_as::<_, Product>(&format!("{PRODUCT_SELECT} WHERE p.category_id = $1"))
                .bind(category_id)
                .fetch_all(&state.pool)
                .await?
        }
        None => {
            sqlx::query_as::<_, Product>(PRODUCT_SELECT)
                .fetch_all(&state.pool)
                .await?
        }
    };

    Ok(Json(ApiResponse::data(ProductList { items })))
}

#[utoipa::path(
    get,
    path = "/products/{id}",
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Get product", body = ApiResponse<Product>),
        (status = 404, description = "Product not found"),
    ),
    tag = "Products"
)]
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Product>>> {
    let product = fetch_product(&state.pool, id).await?;
    Ok(Json(ApiResponse::data(product)))
}

#[utoipa::path(
    post,
    path = "/products",
    request_body(content_type = "multipart/form-data", description = "Fields: name, description, price, quantity, category_id, image (file)"),
    responses(
        (status = 201, description = "Create product", body = ApiResponse<Product>),
        (status = 400, description = "Missing or invalid field"),
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn create_product(
    State(state): State<AppState>,
    _user: AuthUser,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<ApiResponse<Product>>)> {
    let form = ProductForm::parse(&state, multipart).await?;

    let name = form
        .name
        .filter(|n| !n.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("name is required".into()))?;
    let price = form
        .price
        .ok_or_else(|| AppError::BadRequest("price is required".into()))?;

    let id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO products (id, name, description, price, quantity, category_id, image_url)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#,
    )
    .bind(id)
    .bind(name)
    .bind(form.description)
    .bind(price)
    .bind(form.quantity.unwrap_or(0))
    .bind(form.category_id)
    .bind(form.image_url)
    .execute(&state.pool)
    .await?;

    let product = fetch_product(&state.pool, id).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success("Product created", product)),
    ))
}

#[utoipa::path(
    put,
    path = "/products/{id}",
    params(("id" = Uuid, Path, description = "Product ID")),
    request_body(content_type = "multipart/form-data", description = "Fields: name, description, price, quantity, category_id, image (file); omitted image keeps the stored one"),
    responses(
        (status = 200, description = "Updated product", body = ApiResponse<Product>),
        (status = 404, description = "Product not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn update_product(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> AppResult<Json<ApiResponse<Product>>> {
    let existing = fetch_product(&state.pool, id).await?;
    let form = ProductForm::parse(&state, multipart).await?;

    let name = form.name.filter(|n| !n.trim().is_empty()).unwrap_or(existing.name);
    let description = form.description.or(existing.description);
    let price = form.price.unwrap_or(existing.price);
    let quantity = form.quantity.unwrap_or(existing.quantity);
    let category_id = match form.category_id_set {
        true => form.category_id,
        false => existing.category_id,
    };
    // A new upload replaces the stored path; otherwise it is kept.
    let image_url = form.image_url.or(existing.image_url);

    sqlx::query(
        r#"
        UPDATE products
        SET name = $2, description = $3, price = $4, quantity = $5, category_id = $6, image_url = $7
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(name)
    .bind(description)
    .bind(price)
    .bind(quantity)
    .bind(category_id)
    .bind(image_url)
    .execute(&state.pool)
    .await?;

    let product = fetch_product(&state.pool, id).await?;
    Ok(Json(ApiResponse::success("Product updated", product)))
}

#[utoipa::path(
    delete,
    path = "/products/{id}",
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Deleted product"),
        (status = 404, description = "Product not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn delete_product(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let result = sqlx::query("DELETE FROM products WHERE id = $1")
        .bind(id)
        .execute(&state.pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }

    Ok(Json(ApiResponse::message("Product deleted successfully")))
}

async fn fetch_product(pool: &DbPool, id: Uuid) -> AppResult<Product> {
    let product = sqlx::query_as::<_, Product>(&format!("{PRODUCT_SELECT} WHERE p.id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await?;

    match product {
        Some(p) => Ok(p),
        None => Err(AppError::NotFound),
    }
}

#[derive(Debug, Default)]
struct ProductForm {
    name: Option<String>,
    description: Option<String>,
    price: Option<i64>,
    quantity: Option<i32>,
    category_id: Option<Uuid>,
    // Distinguishes "category_id omitted" from "category_id explicitly cleared".
    category_id_set: bool,
    image_url: Option<String>,
}

impl ProductForm {
    async fn parse(state: &AppState, mut multipart: Multipart) -> AppResult<Self> {
        let mut form = ProductForm::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?
        {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "name" => form.name = Some(text(field).await?),
                "description" => form.description = Some(text(field).await?),
                "price" => {
                    let raw = text(field).await?;
                    form.price = Some(
                        raw.parse::<i64>()
                            .map_err(|_| AppError::BadRequest("Invalid price".into()))?,
                    );
                }
                "quantity" => {
                    let raw = text(field).await?;
                    form.quantity = Some(
                        raw.parse::<i32>()
                            .map_err(|_| AppError::BadRequest("Invalid quantity".into()))?,
                    );
                }
                "category_id" => {
                    form.category_id_set = true;
                    let raw = text(field).await?;
                    form.category_id = match raw.trim() {
                        "" | "null" | "all" => None,
                        value => Some(
                            Uuid::parse_str(value)
                                .map_err(|_| AppError::BadRequest("Invalid category_id".into()))?,
                        ),
                    };
                }
                "image" => {
                    let filename = field.file_name().unwrap_or("upload").to_string();
                    let data = field
                        .bytes()
                        .await
                        .map_err(|e| AppError::BadRequest(e.to_string()))?;
                    if !data.is_empty() {
                        form.image_url =
                            Some(store_image(&state.config.upload_dir, &filename, data).await?);
                    }
                }
                _ => {}
            }
        }

        Ok(form)
    }
}

async fn text(field: axum::extract::multipart::Field<'_>) -> AppResult<String> {
    field
        .text()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))
}
