use std::env;

use crate::pricing::PricingConfig;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub pricing: PricingConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL")?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);
        let shipping_fee = env::var("SHIPPING_FEE")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or(30_000);
        let free_shipping_threshold = env::var("FREE_SHIPPING_THRESHOLD")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or(500_000);
        Ok(Self {
            port,
            database_url,
            host,
            pricing: PricingConfig {
                shipping_fee,
                free_shipping_threshold,
            },
        })
    }
}
