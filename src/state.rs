use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::config::{AppConfig, EmailBackend};
use crate::delivery::{EmailDelivery, NoopDelivery, ResendDelivery};
use crate::render::{DealTemplate, EmailRenderer};
use crate::store::postgres::PgStore;
use crate::store::{CatalogStore, UserStore};

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Arc<AppConfig>,
    pub catalog: Arc<dyn CatalogStore>,
    pub users: Arc<dyn UserStore>,
    pub renderer: Arc<dyn EmailRenderer>,
    pub delivery: Arc<dyn EmailDelivery>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let db = PgPoolOptions::new()
            .max_connections(10)
            .connect(&config.database_url)
            .await
            .context("connect to database")?;
        let store = Arc::new(PgStore::new(db.clone()));

        let template = std::fs::read_to_string(&config.template_path)
            .with_context(|| format!("read email template {}", config.template_path))?;
        let renderer = Arc::new(DealTemplate::new(template)?);

        let delivery: Arc<dyn EmailDelivery> = match config.email.backend {
            EmailBackend::Resend => Arc::new(ResendDelivery::new(config.email.api_key.clone())),
            EmailBackend::Noop => Arc::new(NoopDelivery),
        };

        Ok(Self {
            db,
            config,
            catalog: store.clone(),
            users: store,
            renderer,
            delivery,
        })
    }

    pub fn from_parts(
        db: PgPool,
        config: Arc<AppConfig>,
        catalog: Arc<dyn CatalogStore>,
        users: Arc<dyn UserStore>,
        renderer: Arc<dyn EmailRenderer>,
        delivery: Arc<dyn EmailDelivery>,
    ) -> Self {
        Self {
            db,
            config,
            catalog,
            users,
            renderer,
            delivery,
        }
    }
}
