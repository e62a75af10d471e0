use axum::Router;

use crate::state::AppState;

pub mod admin;
pub mod auth;
pub mod cart;
pub mod categories;
pub mod chat;
pub mod coupons;
pub mod doc;
pub mod favorites;
pub mod health;
pub mod orders;
pub mod params;
pub mod pets;
pub mod seller;
pub mod users;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/users", users::router())
        .nest("/categories", categories::router())
        .nest("/pets", pets::router())
        .nest("/cart", cart::router())
        .nest("/coupons", coupons::router())
        .nest("/favorites", favorites::router())
        .nest("/orders", orders::router())
        .nest("/seller", seller::router())
        .nest("/admin", admin::router())
        .nest("/chat", chat::router())
}
