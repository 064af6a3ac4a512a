use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::Date;

time::serde::format_description!(day_format, Date, "[year]-[month]-[day]");

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Retailer {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub size: String,
    pub category: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Deal {
    pub id: i64,
    pub retailer_id: i64,
    pub product_id: i64,
    pub price: Decimal,
    #[serde(with = "day_format")]
    pub start_date: Date,
    #[serde(with = "day_format")]
    pub end_date: Date,
}

/// A deal joined with its retailer and product names for rendering.
/// Built fresh on every run, never written back to the store.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EnrichedDeal {
    pub id: i64,
    pub retailer_id: i64,
    pub product_id: i64,
    pub price: Decimal,
    #[serde(with = "day_format")]
    pub start_date: Date,
    #[serde(with = "day_format")]
    pub end_date: Date,
    pub retailer_name: String,
    pub product_name: String,
    pub product_size: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub email: String,
    pub preferred_retailer_ids: Vec<i64>,
}

#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub size: String,
    pub category: String,
}

#[derive(Debug, Clone)]
pub struct NewDeal {
    pub retailer_id: i64,
    pub product_id: i64,
    pub price: Decimal,
    pub start_date: Date,
    pub end_date: Date,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub preferred_retailer_ids: Vec<i64>,
}

/// One record of the deal input file.
#[derive(Debug, Clone, Deserialize)]
pub struct DealRecord {
    pub retailer: String,
    pub product: String,
    pub size: String,
    pub category: String,
    pub price: Decimal,
    #[serde(with = "day_format")]
    pub start: Date,
    #[serde(with = "day_format")]
    pub end: Date,
}

/// One record of the user input file. Preferences arrive as retailer
/// names and are resolved to ids during ingestion.
#[derive(Debug, Clone, Deserialize)]
pub struct UserRecord {
    pub email: String,
    pub preferred_retailers: Vec<String>,
}
