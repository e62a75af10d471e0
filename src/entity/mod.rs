pub mod audit_logs;
pub mod cart_items;
pub mod categories;
pub mod chat_conversations;
pub mod chat_messages;
pub mod coupons;
pub mod favorites;
pub mod order_items;
pub mod orders;
pub mod pets;
pub mod users;

pub use audit_logs::Entity as AuditLogs;
pub use cart_items::Entity as CartItems;
pub use categories::Entity as Categories;
pub use chat_conversations::Entity as ChatConversations;
pub use chat_messages::Entity as ChatMessages;
pub use coupons::Entity as Coupons;
pub use favorites::Entity as Favorites;
pub use order_items::Entity as OrderItems;
pub use orders::Entity as Orders;
pub use pets::Entity as Pets;
pub use users::Entity as Users;
