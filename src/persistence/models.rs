use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::parse::ParsedEntry;

/// A persisted transaction row
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Transaction {
    pub id: String,
    pub tx_datetime: String,
    pub yyyy_mm_dd: String,
    pub merchant: String,
    /// KRW, negative for cancellations
    pub amount: i64,
    pub currency: String,
    pub card_or_account: String,
    pub method: String,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub tx_type: String,
    pub category: String,
    pub raw_text: String,
    pub created_at: String,
}

impl Transaction {
    /// Build a row from a parsed SMS entry
    pub fn from_entry(entry: &ParsedEntry) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            tx_datetime: entry.tx_datetime.clone(),
            yyyy_mm_dd: entry.yyyy_mm_dd.clone(),
            merchant: entry.merchant.clone(),
            amount: entry.amount,
            currency: entry.currency.clone(),
            card_or_account: entry.card_or_account.clone(),
            method: entry.method.clone(),
            tx_type: entry.tx_type.clone(),
            category: entry.category.clone(),
            raw_text: entry.raw_text.clone(),
            created_at: Utc::now().to_rfc3339(),
        }
    }
}

/// Per-category sum for one day
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CategoryTotal {
    pub category: String,
    pub total: i64,
    pub count: i64,
}
