pub mod auth;
pub mod cart;
pub mod categories;
pub mod chat;
pub mod coupons;
pub mod favorites;
pub mod orders;
pub mod pets;
pub mod users;
