use crate::chat::ChatHub;
use crate::db::{DbPool, OrmConn};
use crate::pricing::PricingConfig;

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub orm: OrmConn,
    pub chat: ChatHub,
    pub pricing: PricingConfig,
}
