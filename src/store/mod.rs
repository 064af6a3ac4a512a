#[cfg(test)]
pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use crate::model::{EnrichedDeal, NewDeal, NewProduct, NewUser, Product, Retailer, User};

/// Relational store for retailers, products and deals.
///
/// All writes are idempotent upserts keyed by the row's natural key
/// (retailer/product name, or the (retailer, product, start_date) triple
/// for deals). Implementations return the stored rows with their
/// assigned ids so callers can resolve names without a second query.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn upsert_retailers(&self, names: &[String]) -> anyhow::Result<Vec<Retailer>>;
    async fn upsert_products(&self, rows: &[NewProduct]) -> anyhow::Result<Vec<Product>>;
    /// Returns the number of rows actually stored; individual row
    /// failures are logged and skipped.
    async fn upsert_deals(&self, rows: &[NewDeal]) -> anyhow::Result<usize>;
    /// Full catalog joined with retailer and product names.
    async fn fetch_deals(&self) -> anyhow::Result<Vec<EnrichedDeal>>;
}

/// Relational store for users, keyed by email.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn upsert_users(&self, rows: &[NewUser]) -> anyhow::Result<Vec<User>>;
    async fn fetch_users(&self) -> anyhow::Result<Vec<User>>;
}
