pub mod admin_service;
pub mod auth_service;
pub mod cart_service;
pub mod category_service;
pub mod chat_service;
pub mod coupon_service;
pub mod favorite_service;
pub mod order_service;
pub mod pet_service;
pub mod seller_service;
pub mod user_service;
