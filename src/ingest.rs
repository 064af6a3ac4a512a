use std::collections::HashMap;

use anyhow::Context;
use tracing::{debug, info, warn};

use crate::model::{DealRecord, NewDeal, NewProduct, NewUser, User, UserRecord};
use crate::store::{CatalogStore, UserStore};

pub fn load_deal_records(path: &str) -> anyhow::Result<Vec<DealRecord>> {
    let raw = std::fs::read_to_string(path).with_context(|| format!("read deal data {path}"))?;
    serde_json::from_str(&raw).with_context(|| format!("parse deal data {path}"))
}

pub fn load_user_records(path: &str) -> anyhow::Result<Vec<UserRecord>> {
    let raw = std::fs::read_to_string(path).with_context(|| format!("read user data {path}"))?;
    serde_json::from_str(&raw).with_context(|| format!("parse user data {path}"))
}

/// Upserts retailers, products and deals from the input records.
///
/// Returns the retailer name → id map so user ingestion can resolve
/// preferences without refetching. Deal records whose retailer or
/// product failed to upsert are logged and skipped.
pub async fn ingest_catalog(
    store: &dyn CatalogStore,
    records: &[DealRecord],
) -> anyhow::Result<HashMap<String, i64>> {
    let mut retailer_names: Vec<String> = Vec::new();
    let mut products: Vec<NewProduct> = Vec::new();
    for rec in records {
        if !retailer_names.contains(&rec.retailer) {
            retailer_names.push(rec.retailer.clone());
        }
        if !products.iter().any(|p| p.name == rec.product) {
            products.push(NewProduct {
                name: rec.product.clone(),
                size: rec.size.clone(),
                category: rec.category.clone(),
            });
        }
    }

    let retailers = store.upsert_retailers(&retailer_names).await?;
    let retailer_ids: HashMap<String, i64> =
        retailers.into_iter().map(|r| (r.name, r.id)).collect();

    let stored_products = store.upsert_products(&products).await?;
    let product_ids: HashMap<String, i64> = stored_products
        .into_iter()
        .map(|p| (p.name, p.id))
        .collect();

    let mut deals = Vec::with_capacity(records.len());
    for rec in records {
        match (
            retailer_ids.get(&rec.retailer),
            product_ids.get(&rec.product),
        ) {
            (Some(&retailer_id), Some(&product_id)) => deals.push(NewDeal {
                retailer_id,
                product_id,
                price: rec.price,
                start_date: rec.start,
                end_date: rec.end,
            }),
            _ => warn!(
                retailer = %rec.retailer,
                product = %rec.product,
                "skipping deal with unresolved retailer or product"
            ),
        }
    }
    let stored_deals = store.upsert_deals(&deals).await?;

    info!(
        retailers = retailer_ids.len(),
        products = product_ids.len(),
        deals = stored_deals,
        "catalog ingestion complete"
    );
    Ok(retailer_ids)
}

/// Upserts users, resolving preferred retailer names to ids.
/// Names missing from the retailer map are dropped, never stored as
/// placeholders.
pub async fn ingest_users(
    store: &dyn UserStore,
    records: &[UserRecord],
    retailer_ids: &HashMap<String, i64>,
) -> anyhow::Result<Vec<User>> {
    let rows: Vec<NewUser> = records
        .iter()
        .map(|rec| {
            let preferred_retailer_ids = rec
                .preferred_retailers
                .iter()
                .filter_map(|name| match retailer_ids.get(name) {
                    Some(&id) => Some(id),
                    None => {
                        debug!(user = %rec.email, retailer = %name, "dropping unknown preferred retailer");
                        None
                    }
                })
                .collect();
            NewUser {
                email: rec.email.clone(),
                preferred_retailer_ids,
            }
        })
        .collect();

    let stored = store.upsert_users(&rows).await?;
    info!(users = stored.len(), "user ingestion complete");
    Ok(stored)
}
