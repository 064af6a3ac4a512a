use std::sync::Mutex;

use async_trait::async_trait;

use crate::model::{Deal, EnrichedDeal, NewDeal, NewProduct, NewUser, Product, Retailer, User};
use crate::store::{CatalogStore, UserStore};

#[derive(Default)]
struct Inner {
    next_id: i64,
    retailers: Vec<Retailer>,
    products: Vec<Product>,
    deals: Vec<Deal>,
    users: Vec<User>,
}

impl Inner {
    fn assign_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// In-memory double for both stores with the same upsert-by-natural-key
/// semantics as the Postgres implementation.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
    /// When set, `fetch_deals` fails, simulating an unreachable store.
    pub fail_deal_fetch: bool,
    /// When set, every upsert fails, simulating a store that is down
    /// during ingestion.
    pub fail_upserts: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_failing_deal_fetch() -> Self {
        Self {
            fail_deal_fetch: true,
            ..Self::default()
        }
    }

    pub fn with_failing_upserts() -> Self {
        Self {
            fail_upserts: true,
            ..Self::default()
        }
    }

    pub fn retailer_count(&self) -> usize {
        self.inner.lock().unwrap().retailers.len()
    }

    pub fn deal_count(&self) -> usize {
        self.inner.lock().unwrap().deals.len()
    }
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn upsert_retailers(&self, names: &[String]) -> anyhow::Result<Vec<Retailer>> {
        if self.fail_upserts {
            anyhow::bail!("store unreachable");
        }
        let mut inner = self.inner.lock().unwrap();
        let mut stored = Vec::with_capacity(names.len());
        for name in names {
            let row = match inner.retailers.iter().position(|r| &r.name == name) {
                Some(i) => inner.retailers[i].clone(),
                None => {
                    let id = inner.assign_id();
                    let row = Retailer {
                        id,
                        name: name.clone(),
                    };
                    inner.retailers.push(row.clone());
                    row
                }
            };
            stored.push(row);
        }
        Ok(stored)
    }

    async fn upsert_products(&self, rows: &[NewProduct]) -> anyhow::Result<Vec<Product>> {
        if self.fail_upserts {
            anyhow::bail!("store unreachable");
        }
        let mut inner = self.inner.lock().unwrap();
        let mut stored = Vec::with_capacity(rows.len());
        for p in rows {
            let row = match inner.products.iter().position(|r| r.name == p.name) {
                Some(i) => {
                    inner.products[i].size = p.size.clone();
                    inner.products[i].category = p.category.clone();
                    inner.products[i].clone()
                }
                None => {
                    let id = inner.assign_id();
                    let row = Product {
                        id,
                        name: p.name.clone(),
                        size: p.size.clone(),
                        category: p.category.clone(),
                    };
                    inner.products.push(row.clone());
                    row
                }
            };
            stored.push(row);
        }
        Ok(stored)
    }

    async fn upsert_deals(&self, rows: &[NewDeal]) -> anyhow::Result<usize> {
        if self.fail_upserts {
            anyhow::bail!("store unreachable");
        }
        let mut inner = self.inner.lock().unwrap();
        for d in rows {
            match inner.deals.iter().position(|row| {
                row.retailer_id == d.retailer_id
                    && row.product_id == d.product_id
                    && row.start_date == d.start_date
            }) {
                Some(i) => {
                    inner.deals[i].price = d.price;
                    inner.deals[i].end_date = d.end_date;
                }
                None => {
                    let id = inner.assign_id();
                    inner.deals.push(Deal {
                        id,
                        retailer_id: d.retailer_id,
                        product_id: d.product_id,
                        price: d.price,
                        start_date: d.start_date,
                        end_date: d.end_date,
                    });
                }
            }
        }
        Ok(rows.len())
    }

    async fn fetch_deals(&self) -> anyhow::Result<Vec<EnrichedDeal>> {
        if self.fail_deal_fetch {
            anyhow::bail!("store unreachable");
        }
        let inner = self.inner.lock().unwrap();
        let mut out = Vec::with_capacity(inner.deals.len());
        for d in &inner.deals {
            let retailer = inner
                .retailers
                .iter()
                .find(|r| r.id == d.retailer_id)
                .ok_or_else(|| anyhow::anyhow!("dangling retailer_id {}", d.retailer_id))?;
            let product = inner
                .products
                .iter()
                .find(|p| p.id == d.product_id)
                .ok_or_else(|| anyhow::anyhow!("dangling product_id {}", d.product_id))?;
            out.push(EnrichedDeal {
                id: d.id,
                retailer_id: d.retailer_id,
                product_id: d.product_id,
                price: d.price,
                start_date: d.start_date,
                end_date: d.end_date,
                retailer_name: retailer.name.clone(),
                product_name: product.name.clone(),
                product_size: product.size.clone(),
            });
        }
        Ok(out)
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn upsert_users(&self, rows: &[NewUser]) -> anyhow::Result<Vec<User>> {
        if self.fail_upserts {
            anyhow::bail!("store unreachable");
        }
        let mut inner = self.inner.lock().unwrap();
        let mut stored = Vec::with_capacity(rows.len());
        for u in rows {
            let row = match inner.users.iter().position(|r| r.email == u.email) {
                Some(i) => {
                    inner.users[i].preferred_retailer_ids = u.preferred_retailer_ids.clone();
                    inner.users[i].clone()
                }
                None => {
                    let row = User {
                        email: u.email.clone(),
                        preferred_retailer_ids: u.preferred_retailer_ids.clone(),
                    };
                    inner.users.push(row.clone());
                    row
                }
            };
            stored.push(row);
        }
        Ok(stored)
    }

    async fn fetch_users(&self) -> anyhow::Result<Vec<User>> {
        Ok(self.inner.lock().unwrap().users.clone())
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use time::macros::date;

    use super::*;

    #[tokio::test]
    async fn retailer_upsert_is_idempotent() {
        let store = MemoryStore::new();
        let names = vec!["Walmart".to_string(), "Target".to_string()];
        let first = store.upsert_retailers(&names).await.expect("first upsert");
        let second = store.upsert_retailers(&names).await.expect("second upsert");
        assert_eq!(store.retailer_count(), 2);
        assert_eq!(first[0].id, second[0].id);
        assert_eq!(first[1].id, second[1].id);
    }

    #[tokio::test]
    async fn deal_upsert_updates_price_without_duplicating() {
        let store = MemoryStore::new();
        let deal = NewDeal {
            retailer_id: 1,
            product_id: 2,
            price: Decimal::new(499, 2),
            start_date: date!(2026 - 08 - 24),
            end_date: date!(2026 - 08 - 30),
        };
        store.upsert_deals(&[deal.clone()]).await.expect("insert");
        let cheaper = NewDeal {
            price: Decimal::new(399, 2),
            ..deal
        };
        store.upsert_deals(&[cheaper]).await.expect("update");
        assert_eq!(store.deal_count(), 1);
    }
}
