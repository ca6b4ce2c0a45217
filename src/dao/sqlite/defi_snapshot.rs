use chrono::{DateTime, Utc};
use sqlx::Error;

use crate::model::{BalanceReading, Defi_Snapshot, Net_Stats, Table};

/// ISO-8601 without offset, microsecond precision. Always UTC.
pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
}

impl Table<Defi_Snapshot> {
    pub async fn append(
        &self,
        address: &str,
        reading: &BalanceReading,
    ) -> Result<Defi_Snapshot, Error> {
        self.insert(address, reading, &Utc::now()).await
    }

    pub async fn insert(
        &self,
        address: &str,
        reading: &BalanceReading,
        timestamp: &DateTime<Utc>,
    ) -> Result<Defi_Snapshot, Error> {
        const SQL: &str = r#"
        INSERT INTO "defi_snapshots" (
            "timestamp",
            "address",
            "morpho",
            "aave",
            "euler",
            "debt",
            "net"
        )
        VALUES (?, ?, ?, ?, ?, ?, ?)
        RETURNING *
        "#;

        let mut tx = self.pool.begin().await?;
        let snapshot = sqlx::query_as(SQL)
            .bind(format_timestamp(timestamp))
            .bind(address)
            .bind(reading.morpho)
            .bind(reading.aave)
            .bind(reading.euler)
            .bind(reading.debt)
            .bind(reading.net)
            .fetch_one(&mut *tx)
            .await?;
        tx.commit().await?;

        Ok(snapshot)
    }

    pub async fn get_latest(&self) -> Result<Option<Defi_Snapshot>, Error> {
        const SQL: &str = r#"
        SELECT *
        FROM "defi_snapshots"
        ORDER BY "id" DESC
        LIMIT 1
        "#;

        sqlx::query_as(SQL).fetch_optional(&self.pool).await
    }

    pub async fn get_recent(
        &self,
        limit: u32,
    ) -> Result<Vec<Defi_Snapshot>, Error> {
        const SQL: &str = r#"
        SELECT *
        FROM "defi_snapshots"
        ORDER BY "id" DESC
        LIMIT ?
        "#;

        sqlx::query_as(SQL)
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await
    }

    /// Net statistics over the `window` most recent rows, `None` when the
    /// table is empty.
    pub async fn get_stats(
        &self,
        window: u32,
    ) -> Result<Option<Net_Stats>, Error> {
        const SQL: &str = r#"
        SELECT
            COUNT("net"),
            AVG("net"),
            MIN("net"),
            MAX("net")
        FROM (
            SELECT "net"
            FROM "defi_snapshots"
            ORDER BY "id" DESC
            LIMIT ?
        )
        "#;

        let (count, average, min, max): (
            i64,
            Option<f64>,
            Option<f64>,
            Option<f64>,
        ) = sqlx::query_as(SQL)
            .bind(i64::from(window))
            .fetch_one(&self.pool)
            .await?;

        if count == 0 {
            return Ok(None);
        }

        match (average, min, max) {
            (Some(average), Some(min), Some(max)) => {
                Ok(Some(Net_Stats::new(average, min, max)))
            },
            _ => Ok(None),
        }
    }

    pub async fn count(&self) -> Result<i64, Error> {
        const SQL: &str = r#"
        SELECT
            COUNT(*)
        FROM "defi_snapshots"
        "#;

        let (count,) = sqlx::query_as(SQL).fetch_one(&self.pool).await?;
        Ok(count)
    }

    /// Keeps the `limit` highest ids and deletes everything older. Returns
    /// the number of evicted rows.
    pub async fn enforce_retention(&self, limit: u32) -> Result<u64, Error> {
        const COUNT_SQL: &str = r#"
        SELECT
            COUNT(*)
        FROM "defi_snapshots"
        "#;

        const DELETE_SQL: &str = r#"
        DELETE FROM "defi_snapshots"
        WHERE "id" NOT IN (
            SELECT "id"
            FROM "defi_snapshots"
            ORDER BY "id" DESC
            LIMIT ?
        )
        "#;

        let limit = i64::from(limit);
        let mut tx = self.pool.begin().await?;
        let (count,): (i64,) =
            sqlx::query_as(COUNT_SQL).fetch_one(&mut *tx).await?;

        if count <= limit {
            tx.commit().await?;
            return Ok(0);
        }

        let result = sqlx::query(DELETE_SQL)
            .bind(limit)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        Ok(result.rows_affected())
    }
}
