use async_trait::async_trait;
use sqlx::PgPool;
use tracing::warn;

use crate::model::{EnrichedDeal, NewDeal, NewProduct, NewUser, Product, Retailer, User};
use crate::store::{CatalogStore, UserStore};

/// Postgres-backed implementation of both stores.
///
/// Rows are upserted one at a time so that a single bad record is
/// logged and skipped instead of failing the whole batch.
#[derive(Clone)]
pub struct PgStore {
    db: PgPool,
}

impl PgStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

/// Row-level errors (constraint violations and the like) are tolerable:
/// the row is logged and skipped. Anything else, such as a pool timeout
/// or a lost connection, means the store itself is failing and the
/// whole phase must abort.
fn is_row_error(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(_))
}

#[async_trait]
impl CatalogStore for PgStore {
    async fn upsert_retailers(&self, names: &[String]) -> anyhow::Result<Vec<Retailer>> {
        let mut stored = Vec::with_capacity(names.len());
        for name in names {
            let row = sqlx::query_as::<_, Retailer>(
                r#"
                INSERT INTO retailers (name)
                VALUES ($1)
                ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
                RETURNING id, name
                "#,
            )
            .bind(name)
            .fetch_one(&self.db)
            .await;
            match row {
                Ok(r) => stored.push(r),
                Err(e) if is_row_error(&e) => {
                    warn!(retailer = %name, error = %e, "retailer upsert failed, skipping")
                }
                Err(e) => return Err(e.into()),
            }
        }
        Ok(stored)
    }

    async fn upsert_products(&self, rows: &[NewProduct]) -> anyhow::Result<Vec<Product>> {
        let mut stored = Vec::with_capacity(rows.len());
        for p in rows {
            let row = sqlx::query_as::<_, Product>(
                r#"
                INSERT INTO products (name, size, category)
                VALUES ($1, $2, $3)
                ON CONFLICT (name) DO UPDATE
                SET size = EXCLUDED.size, category = EXCLUDED.category
                RETURNING id, name, size, category
                "#,
            )
            .bind(&p.name)
            .bind(&p.size)
            .bind(&p.category)
            .fetch_one(&self.db)
            .await;
            match row {
                Ok(r) => stored.push(r),
                Err(e) if is_row_error(&e) => {
                    warn!(product = %p.name, error = %e, "product upsert failed, skipping")
                }
                Err(e) => return Err(e.into()),
            }
        }
        Ok(stored)
    }

    async fn upsert_deals(&self, rows: &[NewDeal]) -> anyhow::Result<usize> {
        let mut stored = 0;
        for d in rows {
            let res = sqlx::query(
                r#"
                INSERT INTO deals (retailer_id, product_id, price, start_date, end_date)
                VALUES ($1, $2, $3, $4, $5)
                ON CONFLICT (retailer_id, product_id, start_date) DO UPDATE
                SET price = EXCLUDED.price, end_date = EXCLUDED.end_date
                "#,
            )
            .bind(d.retailer_id)
            .bind(d.product_id)
            .bind(d.price)
            .bind(d.start_date)
            .bind(d.end_date)
            .execute(&self.db)
            .await;
            match res {
                Ok(_) => stored += 1,
                Err(e) if is_row_error(&e) => warn!(
                    retailer_id = d.retailer_id,
                    product_id = d.product_id,
                    start_date = %d.start_date,
                    error = %e,
                    "deal upsert failed, skipping"
                ),
                Err(e) => return Err(e.into()),
            }
        }
        Ok(stored)
    }

    async fn fetch_deals(&self) -> anyhow::Result<Vec<EnrichedDeal>> {
        let rows = sqlx::query_as::<_, EnrichedDeal>(
            r#"
            SELECT d.id, d.retailer_id, d.product_id, d.price, d.start_date, d.end_date,
                   r.name AS retailer_name, p.name AS product_name, p.size AS product_size
            FROM deals d
            JOIN retailers r ON r.id = d.retailer_id
            JOIN products p ON p.id = d.product_id
            "#,
        )
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn upsert_users(&self, rows: &[NewUser]) -> anyhow::Result<Vec<User>> {
        let mut stored = Vec::with_capacity(rows.len());
        for u in rows {
            let row = sqlx::query_as::<_, User>(
                r#"
                INSERT INTO users (email, preferred_retailer_ids)
                VALUES ($1, $2)
                ON CONFLICT (email) DO UPDATE
                SET preferred_retailer_ids = EXCLUDED.preferred_retailer_ids
                RETURNING email, preferred_retailer_ids
                "#,
            )
            .bind(&u.email)
            .bind(&u.preferred_retailer_ids)
            .fetch_one(&self.db)
            .await;
            match row {
                Ok(r) => stored.push(r),
                Err(e) if is_row_error(&e) => {
                    warn!(user = %u.email, error = %e, "user upsert failed, skipping")
                }
                Err(e) => return Err(e.into()),
            }
        }
        Ok(stored)
    }

    async fn fetch_users(&self) -> anyhow::Result<Vec<User>> {
        let rows = sqlx::query_as::<_, User>(
            r#"
            SELECT email, preferred_retailer_ids
            FROM users
            "#,
        )
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }
}
