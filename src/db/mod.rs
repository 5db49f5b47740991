pub mod filter;
pub mod models;

use std::str::FromStr;

use anyhow::Result;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    QueryBuilder, Sqlite, SqlitePool,
};
use tracing::debug;

use self::{
    filter::ReadingFilter,
    models::{NewReading, Reading},
};

pub async fn create_pool(database_url: &str) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;
    Ok(pool)
}

pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

const SELECT_READINGS: &str = "SELECT id, device_uuid, \"type\", value, date_created FROM readings";

/// Handle to the `readings` table. Cloning shares the underlying pool.
#[derive(Debug, Clone)]
pub struct ReadingStore {
    pool: SqlitePool,
}

impl ReadingStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Closes the pool; pending queries finish first.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Inserts `reading` and returns the id assigned by SQLite.
    pub async fn insert(&self, reading: &NewReading) -> Result<i64, sqlx::Error> {
        let id = sqlx::query(
            "INSERT INTO readings (device_uuid, \"type\", value, date_created) \
             VALUES (?, ?, ?, ?)",
        )
        .bind(&reading.device_uuid)
        .bind(&reading.sensor_type)
        .bind(reading.value)
        .bind(reading.date_created)
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        Ok(id)
    }

    /// All readings matching `filter`, in insertion order.
    pub async fn query(&self, filter: &ReadingFilter) -> Result<Vec<Reading>, sqlx::Error> {
        let mut qb = QueryBuilder::<Sqlite>::new(SELECT_READINGS);
        filter.push_where(&mut qb);
        qb.push(" ORDER BY id ASC");
        debug!(sql = qb.sql(), "Querying readings");

        qb.build_query_as::<Reading>().fetch_all(&self.pool).await
    }

    pub async fn max_value(&self, filter: &ReadingFilter) -> Result<Option<i64>, sqlx::Error> {
        self.aggregate("MAX(value)", filter).await
    }

    pub async fn min_value(&self, filter: &ReadingFilter) -> Result<Option<i64>, sqlx::Error> {
        self.aggregate("MIN(value)", filter).await
    }

    pub async fn avg_value(&self, filter: &ReadingFilter) -> Result<Option<f64>, sqlx::Error> {
        self.aggregate("AVG(value)", filter).await
    }

    /// Runs `SELECT <expr> FROM readings WHERE ...`. Aggregates over zero
    /// rows yield a single NULL, hence the `Option`.
    async fn aggregate<T>(&self, expr: &str, filter: &ReadingFilter) -> Result<Option<T>, sqlx::Error>
    where
        T: Send + Unpin + 'static + for<'r> sqlx::Decode<'r, Sqlite> + sqlx::Type<Sqlite>,
    {
        let mut qb = QueryBuilder::<Sqlite>::new("SELECT ");
        qb.push(expr).push(" FROM readings");
        filter.push_where(&mut qb);
        debug!(sql = qb.sql(), "Aggregating readings");

        qb.build_query_scalar::<Option<T>>()
            .fetch_one(&self.pool)
            .await
    }
}
