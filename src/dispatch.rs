use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::delivery::EmailDelivery;

/// One rendered email waiting to be sent.
#[derive(Debug, Clone)]
pub struct Outbound {
    pub user_email: String,
    pub html: String,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DispatchSummary {
    pub attempted: usize,
    pub sent: usize,
    pub failed: usize,
}

/// Sends rendered emails one at a time, pacing calls to stay under the
/// provider's rate limit and isolating failures per user.
pub struct Dispatcher {
    delivery: Arc<dyn EmailDelivery>,
    from: String,
    recipient_override: Option<String>,
    interval: Duration,
}

impl Dispatcher {
    pub fn new(
        delivery: Arc<dyn EmailDelivery>,
        from: String,
        recipient_override: Option<String>,
        interval: Duration,
    ) -> Self {
        Self {
            delivery,
            from,
            recipient_override,
            interval,
        }
    }

    /// Attempts exactly one send per entry. A failed send is logged and
    /// the batch continues; the pause runs after every attempt because
    /// the limiting resource is the provider's rate, not local success.
    pub async fn dispatch(&self, batch: Vec<Outbound>) -> DispatchSummary {
        let mut summary = DispatchSummary::default();
        for out in batch {
            summary.attempted += 1;
            let to = self
                .recipient_override
                .as_deref()
                .unwrap_or(&out.user_email);
            let subject = format!("Weekly Deals for {}", out.user_email);
            match self
                .delivery
                .send(&self.from, to, &subject, &out.html)
                .await
            {
                Ok(()) => {
                    summary.sent += 1;
                    info!(user = %out.user_email, %to, "email sent");
                }
                Err(e) => {
                    summary.failed += 1;
                    warn!(user = %out.user_email, error = %e, "email send failed");
                }
            }
            tokio::time::sleep(self.interval).await;
        }
        summary
    }
}
