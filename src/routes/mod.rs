use axum::Router;

use crate::state::AppState;

pub mod categories;
pub mod doc;
pub mod health;
pub mod locations;
pub mod orders;
pub mod products;
pub mod users;

// Build the resource routers without binding state; it is provided at the top level.
pub fn create_router() -> Router<AppState> {
    Router::new()
        .nest("/categories", categories::router())
        .nest("/products", products::router())
        .nest("/orders", orders::router())
        .nest("/location", locations::router())
        .nest("/api/users", users::router())
}
