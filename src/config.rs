use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    /// Mail-sending webhook. Unset disables outbound email.
    pub mail_webhook_url: Option<String>,
    /// PDF invoice renderer. Unset disables invoice generation.
    pub invoice_renderer_url: Option<String>,
    /// Payment gateway order-creation endpoint. Unset disables payment refs.
    pub payment_gateway_url: Option<String>,
    pub payment_gateway_key: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL")?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);
        Ok(Self {
            port,
            database_url,
            host,
            mail_webhook_url: env::var("MAIL_WEBHOOK_URL").ok(),
            invoice_renderer_url: env::var("INVOICE_RENDERER_URL").ok(),
            payment_gateway_url: env::var("PAYMENT_GATEWAY_URL").ok(),
            payment_gateway_key: env::var("PAYMENT_GATEWAY_KEY").ok(),
        })
    }
}
