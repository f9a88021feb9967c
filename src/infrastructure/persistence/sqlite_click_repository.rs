//! SQLite implementation of the click repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::sync::Arc;

use crate::domain::entities::{Click, NewClick};
use crate::domain::repositories::{ClickRepository, CountryClicks, DailyClicks};
use crate::error::AppError;

/// SQLite repository for the click log and its analytics queries.
pub struct SqliteClickRepository {
    pool: Arc<SqlitePool>,
}

impl SqliteClickRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<SqlitePool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ClickRepository for SqliteClickRepository {
    async fn record_click(&self, click: NewClick) -> Result<Click, AppError> {
        let id = sqlx::query(
            r#"
            INSERT INTO clicks (link_code, client_address, user_agent, referrer, country, city, observed_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&click.link_code)
        .bind(&click.client_address)
        .bind(&click.user_agent)
        .bind(&click.referrer)
        .bind(&click.country)
        .bind(&click.city)
        .bind(click.observed_at)
        .execute(self.pool.as_ref())
        .await?
        .last_insert_rowid();

        Ok(Click {
            id,
            link_code: click.link_code,
            client_address: click.client_address,
            user_agent: click.user_agent,
            referrer: click.referrer,
            country: click.country,
            city: click.city,
            observed_at: click.observed_at,
        })
    }

    async fn count_clicks(&self, code: &str) -> Result<i64, AppError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM clicks WHERE link_code = ?1")
            .bind(code)
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(total)
    }

    async fn count_unique_visitors(&self, code: &str) -> Result<i64, AppError> {
        let unique: i64 = sqlx::query_scalar(
            "SELECT COUNT(DISTINCT client_address) FROM clicks WHERE link_code = ?1",
        )
        .bind(code)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(unique)
    }

    async fn clicks_by_country(
        &self,
        code: &str,
        limit: i64,
    ) -> Result<Vec<CountryClicks>, AppError> {
        let rows = sqlx::query_as::<_, CountryClicks>(
            r#"
            SELECT country, COUNT(*) AS clicks
            FROM clicks
            WHERE link_code = ?1 AND country IS NOT NULL AND country != ''
            GROUP BY country
            ORDER BY clicks DESC, country ASC
            LIMIT ?2
            "#,
        )
        .bind(code)
        .bind(limit)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows)
    }

    async fn clicks_by_day(
        &self,
        code: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<DailyClicks>, AppError> {
        let rows = sqlx::query_as::<_, DailyClicks>(
            r#"
            SELECT date(observed_at) AS date, COUNT(*) AS clicks
            FROM clicks
            WHERE link_code = ?1 AND observed_at >= ?2
            GROUP BY date(observed_at)
            ORDER BY date DESC
            "#,
        )
        .bind(code)
        .bind(since)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows)
    }

    async fn recent_clicks(&self, code: &str, limit: i64) -> Result<Vec<Click>, AppError> {
        let clicks = sqlx::query_as::<_, Click>(
            r#"
            SELECT id, link_code, client_address, user_agent, referrer, country, city, observed_at
            FROM clicks
            WHERE link_code = ?1
            ORDER BY observed_at DESC, id DESC
            LIMIT ?2
            "#,
        )
        .bind(code)
        .bind(limit)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(clicks)
    }
}
