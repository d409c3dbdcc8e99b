use std::str::FromStr;

use chrono::NaiveDate;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use thiserror::Error;

use crate::exchange_rate::ExchangeRate;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Rate for {currency} on {date} already exists")]
    Duplicate { currency: String, date: NaiveDate },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Handle to the `rate` table. Cloning shares the underlying pool.
#[derive(Debug, Clone)]
pub struct RateStore {
    pool: SqlitePool,
}

impl RateStore {
    /// Opens (creating if missing) the database at `url` and applies pending migrations.
    pub async fn connect(url: &str, max_connections: u32) -> StoreResult<Self> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        Self::from_pool(pool).await
    }

    /// Private in-memory database. Pinned to a single connection that is
    /// never recycled, otherwise the data would vanish with it.
    pub async fn in_memory() -> StoreResult<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        Self::from_pool(pool).await
    }

    async fn from_pool(pool: SqlitePool) -> StoreResult<Self> {
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }

    pub async fn find_by_date(&self, date: NaiveDate) -> StoreResult<Vec<ExchangeRate>> {
        let rates = sqlx::query_as::<_, ExchangeRate>(
            "SELECT id, currency, date, rate FROM rate WHERE date = ? ORDER BY currency",
        )
        .bind(date)
        .fetch_all(&self.pool)
        .await?;

        Ok(rates)
    }

    pub async fn exists(&self, currency: &str, date: NaiveDate) -> StoreResult<bool> {
        let found: Option<i64> =
            sqlx::query_scalar("SELECT 1 FROM rate WHERE currency = ? AND date = ? LIMIT 1")
                .bind(currency)
                .bind(date)
                .fetch_optional(&self.pool)
                .await?;

        Ok(found.is_some())
    }

    /// Strict insert: a second rate for the same currency and date is rejected
    /// by the `uq_currency_date` constraint and reported as [`StoreError::Duplicate`].
    pub async fn insert(&self, rate: &ExchangeRate) -> StoreResult<()> {
        let result = sqlx::query("INSERT INTO rate (id, currency, date, rate) VALUES (?, ?, ?, ?)")
            .bind(rate.id)
            .bind(&rate.currency)
            .bind(rate.date)
            .bind(rate.rate)
            .execute(&self.pool)
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Err(StoreError::Duplicate {
                currency: rate.currency.clone(),
                date: rate.date,
            }),
            Err(e) => Err(e.into()),
        }
    }

    /// Returns `true` when the row was written, `false` when the pair was already stored.
    pub async fn insert_if_absent(&self, rate: &ExchangeRate) -> StoreResult<bool> {
        let mut conn = self.pool.acquire().await?;
        let written = insert_ignoring_conflict(&mut conn, rate).await?;
        Ok(written)
    }

    /// Writes all rates in one transaction, skipping pairs that already exist.
    /// Returns the number of rows written.
    pub async fn insert_batch(&self, rates: &[ExchangeRate]) -> StoreResult<u64> {
        if rates.is_empty() {
            return Ok(0);
        }

        let mut tx = self.pool.begin().await?;
        let mut written = 0;
        for rate in rates {
            if insert_ignoring_conflict(&mut tx, rate).await? {
                written += 1;
            }
        }
        tx.commit().await?;

        Ok(written)
    }

    pub async fn count(&self) -> StoreResult<i64> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM rate")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

async fn insert_ignoring_conflict(
    conn: &mut sqlx::SqliteConnection,
    rate: &ExchangeRate,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "INSERT INTO rate (id, currency, date, rate) VALUES (?, ?, ?, ?)
         ON CONFLICT (currency, date) DO NOTHING",
    )
    .bind(rate.id)
    .bind(&rate.currency)
    .bind(rate.date)
    .bind(rate.rate)
    .execute(conn)
    .await?;

    Ok(result.rows_affected() == 1)
}
