use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

const RESEND_ENDPOINT: &str = "https://api.resend.com/emails";

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("delivery api rejected the send: {status} {message}")]
    Api { status: u16, message: String },
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Outbound email collaborator. One attempt per call, no implicit retry.
#[async_trait]
pub trait EmailDelivery: Send + Sync {
    async fn send(
        &self,
        from: &str,
        to: &str,
        subject: &str,
        html: &str,
    ) -> Result<(), DeliveryError>;
}

#[derive(Serialize)]
struct SendRequest<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    html: &'a str,
}

/// Delivery through the Resend HTTP API.
pub struct ResendDelivery {
    http: reqwest::Client,
    api_key: String,
    endpoint: String,
}

impl ResendDelivery {
    pub fn new(api_key: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
            endpoint: RESEND_ENDPOINT.to_string(),
        }
    }
}

#[async_trait]
impl EmailDelivery for ResendDelivery {
    async fn send(
        &self,
        from: &str,
        to: &str,
        subject: &str,
        html: &str,
    ) -> Result<(), DeliveryError> {
        let res = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&SendRequest {
                from,
                to,
                subject,
                html,
            })
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            let message = res.text().await.unwrap_or_default();
            return Err(DeliveryError::Api {
                status: status.as_u16(),
                message,
            });
        }
        debug!(%to, "delivery accepted");
        Ok(())
    }
}

/// Logs the send instead of performing it. Used for dry runs
/// (`EMAIL_BACKEND=noop`) when no verified sender is available.
pub struct NoopDelivery;

#[async_trait]
impl EmailDelivery for NoopDelivery {
    async fn send(
        &self,
        _from: &str,
        to: &str,
        subject: &str,
        html: &str,
    ) -> Result<(), DeliveryError> {
        info!(%to, %subject, bytes = html.len(), "noop delivery, email not sent");
        Ok(())
    }
}
