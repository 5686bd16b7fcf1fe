use anyhow::{Context, Result};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::path::{Path, PathBuf};

use super::models::{CategoryTotal, Transaction};

/// SQLite store for transactions
#[derive(Clone)]
pub struct TransactionStore {
    pool: SqlitePool,
}

impl TransactionStore {
    /// Open the store at the default location under the user config dir
    pub async fn new() -> Result<Self> {
        Self::open(Self::default_path()?).await
    }

    /// Open (or create) the store at an explicit path
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        // ?mode=rwc creates the database file if it doesn't exist
        let database_url = format!("sqlite:{}?mode=rwc", path.display());
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&database_url)
            .await
            .context("Failed to connect to database")?;

        Self::migrate(&pool).await?;

        Ok(Self { pool })
    }

    fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().context("Failed to get config directory")?;
        Ok(config_dir.join("expense-tracker").join("expense.db"))
    }

    async fn migrate(pool: &SqlitePool) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS transactions (
                id TEXT PRIMARY KEY,
                tx_datetime TEXT NOT NULL,
                yyyy_mm_dd TEXT NOT NULL,
                merchant TEXT NOT NULL,
                amount INTEGER NOT NULL,
                currency TEXT NOT NULL,
                card_or_account TEXT NOT NULL,
                method TEXT NOT NULL,
                type TEXT NOT NULL,
                category TEXT NOT NULL,
                raw_text TEXT NOT NULL,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_transactions_day
            ON transactions(yyyy_mm_dd)
            "#,
        )
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Insert one transaction
    pub async fn insert(&self, tx: &Transaction) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO transactions
                (id, tx_datetime, yyyy_mm_dd, merchant, amount, currency,
                 card_or_account, method, type, category, raw_text, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&tx.id)
        .bind(&tx.tx_datetime)
        .bind(&tx.yyyy_mm_dd)
        .bind(&tx.merchant)
        .bind(tx.amount)
        .bind(&tx.currency)
        .bind(&tx.card_or_account)
        .bind(&tx.method)
        .bind(&tx.tx_type)
        .bind(&tx.category)
        .bind(&tx.raw_text)
        .bind(&tx.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Transactions for one day, newest first
    pub async fn list_for_day(&self, day: &str) -> Result<Vec<Transaction>> {
        let rows = sqlx::query_as::<_, Transaction>(
            r#"
            SELECT * FROM transactions
            WHERE yyyy_mm_dd = ?
            ORDER BY tx_datetime DESC
            "#,
        )
        .bind(day)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Sum of amounts for one day (0 when there are none)
    pub async fn total_for_day(&self, day: &str) -> Result<i64> {
        let (total,): (i64,) = sqlx::query_as(
            r#"
            SELECT COALESCE(SUM(amount), 0) FROM transactions
            WHERE yyyy_mm_dd = ?
            "#,
        )
        .bind(day)
        .fetch_one(&self.pool)
        .await?;

        Ok(total)
    }

    /// Per-category sums for one day, largest first
    pub async fn category_totals_for_day(&self, day: &str) -> Result<Vec<CategoryTotal>> {
        let rows = sqlx::query_as::<_, CategoryTotal>(
            r#"
            SELECT category, COALESCE(SUM(amount), 0) AS total, COUNT(*) AS count
            FROM transactions
            WHERE yyyy_mm_dd = ?
            GROUP BY category
            ORDER BY total DESC
            "#,
        )
        .bind(day)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
