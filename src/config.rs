use std::time::Duration;

use anyhow::Context;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailBackend {
    Resend,
    Noop,
}

#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub backend: EmailBackend,
    pub api_key: String,
    pub from: String,
    /// When set, every email is delivered to this address instead of the
    /// user's own (sandbox accounts only accept the verified address).
    pub recipient_override: Option<String>,
    pub send_interval: Duration,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub email: EmailConfig,
    /// Maximum deals per rendered email; `None` sends every matching deal.
    pub deal_cap: Option<usize>,
    pub deal_data_path: String,
    pub user_data_path: String,
    pub template_path: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL is required")?;

        let backend = parse_backend(std::env::var("EMAIL_BACKEND").ok().as_deref())?;
        let api_key = match backend {
            EmailBackend::Resend => std::env::var("RESEND_API_KEY")
                .context("RESEND_API_KEY is required unless EMAIL_BACKEND=noop")?,
            EmailBackend::Noop => std::env::var("RESEND_API_KEY").unwrap_or_default(),
        };
        let email = EmailConfig {
            backend,
            api_key,
            from: std::env::var("EMAIL_FROM")
                .unwrap_or_else(|_| "Prox Weekly Deals <onboarding@resend.dev>".into()),
            recipient_override: std::env::var("VERIFIED_EMAIL").ok(),
            send_interval: Duration::from_millis(
                std::env::var("SEND_INTERVAL_MS")
                    .ok()
                    .and_then(|v| v.parse::<u64>().ok())
                    .unwrap_or(1000),
            ),
        };

        Ok(Self {
            database_url,
            email,
            deal_cap: std::env::var("DEAL_CAP")
                .ok()
                .and_then(|v| v.parse::<usize>().ok()),
            deal_data_path: std::env::var("DEAL_DATA_PATH")
                .unwrap_or_else(|_| "data/deal_data.json".into()),
            user_data_path: std::env::var("USER_DATA_PATH")
                .unwrap_or_else(|_| "data/user_data.json".into()),
            template_path: std::env::var("EMAIL_TEMPLATE_PATH")
                .unwrap_or_else(|_| "templates/weekly_deals.html".into()),
        })
    }
}

/// A typo here must not silently fall back to the live API.
fn parse_backend(value: Option<&str>) -> anyhow::Result<EmailBackend> {
    match value {
        None | Some("resend") => Ok(EmailBackend::Resend),
        Some("noop") => Ok(EmailBackend::Noop),
        Some(other) => anyhow::bail!("unknown EMAIL_BACKEND {other:?}, expected resend or noop"),
    }
}
