//! Outbound HTTP collaborators: mail delivery, PDF invoice rendering and
//! payment order creation. Each is a thin call/response contract; an
//! unconfigured endpoint disables the collaborator rather than failing.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::AppConfig;
use crate::error::{AppError, AppResult};

const COLLABORATOR_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Serialize)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub html: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachment_url: Option<String>,
}

#[derive(Clone)]
pub struct Mailer {
    client: reqwest::Client,
    endpoint: Option<String>,
}

impl Mailer {
    pub fn new(endpoint: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint,
        }
    }

    pub fn disabled() -> Self {
        Self::new(None)
    }

    /// Delivery is best-effort; callers log the error and move on.
    pub async fn send(&self, message: &EmailMessage) -> anyhow::Result<()> {
        let Some(endpoint) = &self.endpoint else {
            tracing::debug!(to = %message.to, subject = %message.subject, "mail disabled, skipping");
            return Ok(());
        };

        let resp = self
            .client
            .post(endpoint)
            .timeout(COLLABORATOR_TIMEOUT)
            .json(message)
            .send()
            .await?;
        resp.error_for_status()?;
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct InvoiceRequest<'a> {
    pub order_id: uuid::Uuid,
    pub tracking_code: &'a str,
    pub total_amount: i64,
    pub customer_name: &'a str,
}

#[derive(Debug, Deserialize)]
struct InvoiceResponse {
    url: String,
}

#[derive(Clone)]
pub struct InvoiceRenderer {
    client: reqwest::Client,
    endpoint: Option<String>,
}

impl InvoiceRenderer {
    pub fn new(endpoint: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint,
        }
    }

    pub fn disabled() -> Self {
        Self::new(None)
    }

    /// Render the invoice PDF and return the public URL it was stored at.
    pub async fn render(&self, request: &InvoiceRequest<'_>) -> AppResult<String> {
        let Some(endpoint) = &self.endpoint else {
            return Err(AppError::BadRequest(
                "invoice renderer is not configured".into(),
            ));
        };

        let resp = self
            .client
            .post(endpoint)
            .timeout(COLLABORATOR_TIMEOUT)
            .json(request)
            .send()
            .await
            .map_err(|e| AppError::Internal(e.into()))?
            .error_for_status()
            .map_err(|e| AppError::Internal(e.into()))?;

        let body: InvoiceResponse = resp
            .json()
            .await
            .map_err(|e| AppError::Internal(e.into()))?;
        Ok(body.url)
    }
}

#[derive(Debug, Serialize)]
struct GatewayOrderRequest<'a> {
    amount: i64,
    currency: &'static str,
    receipt: &'a str,
}

#[derive(Debug, Deserialize)]
struct GatewayOrderResponse {
    id: String,
}

#[derive(Clone)]
pub struct PaymentGateway {
    client: reqwest::Client,
    endpoint: Option<String>,
    api_key: Option<String>,
}

impl PaymentGateway {
    pub fn new(endpoint: Option<String>, api_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint,
            api_key,
        }
    }

    pub fn disabled() -> Self {
        Self::new(None, None)
    }

    /// Create a gateway order for the given amount and return its id.
    /// Returns `None` when the gateway is not configured.
    pub async fn create_order(&self, amount: i64, receipt: &str) -> anyhow::Result<Option<String>> {
        let Some(endpoint) = &self.endpoint else {
            tracing::debug!(%receipt, "payment gateway disabled, skipping");
            return Ok(None);
        };

        let mut req = self
            .client
            .post(endpoint)
            .timeout(COLLABORATOR_TIMEOUT)
            .json(&GatewayOrderRequest {
                amount,
                currency: "INR",
                receipt,
            });
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }

        let resp = req.send().await?.error_for_status()?;
        let body: GatewayOrderResponse = resp.json().await?;
        Ok(Some(body.id))
    }
}

impl From<&AppConfig> for Mailer {
    fn from(config: &AppConfig) -> Self {
        Mailer::new(config.mail_webhook_url.clone())
    }
}

impl From<&AppConfig> for InvoiceRenderer {
    fn from(config: &AppConfig) -> Self {
        InvoiceRenderer::new(config.invoice_renderer_url.clone())
    }
}

impl From<&AppConfig> for PaymentGateway {
    fn from(config: &AppConfig) -> Self {
        PaymentGateway::new(
            config.payment_gateway_url.clone(),
            config.payment_gateway_key.clone(),
        )
    }
}
