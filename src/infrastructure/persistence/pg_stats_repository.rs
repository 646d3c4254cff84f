//! PostgreSQL implementation of click analytics.

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{FromRow, PgPool};
use std::sync::Arc;

use crate::domain::repositories::{
    ClickFilter, CountryCount, DailyCount, LinkClicks, OwnerFilter, StatsRepository, Totals,
};
use crate::error::AppError;

/// Shared window predicate; `$1` is the slug.
const WINDOW: &str = "slug = $1 AND occurred_at >= $2 AND ($3::timestamptz IS NULL OR occurred_at <= $3)";

/// Clicks on an owner's live links, each bounded by its own link's creation; `$1` is the owner.
const OWNER_WINDOW: &str = r#"
    FROM link_clicks c
    JOIN links l ON l.slug = c.slug
    WHERE l.owner = $1
      AND c.occurred_at >= l.created_at
      AND ($2::timestamptz IS NULL OR c.occurred_at >= $2)
      AND ($3::timestamptz IS NULL OR c.occurred_at <= $3)
"#;

#[derive(Debug, FromRow)]
struct CountryRow {
    country: String,
    total: i64,
}

#[derive(Debug, FromRow)]
struct DailyRow {
    day: NaiveDate,
    clicks: i64,
}

#[derive(Debug, FromRow)]
struct TotalsRow {
    links: i64,
    clicks: i64,
}

#[derive(Debug, FromRow)]
struct TopLinkRow {
    slug: String,
    destination: String,
    click_count: i64,
}

fn countries(rows: Vec<CountryRow>) -> Vec<CountryCount> {
    rows.into_iter()
        .map(|r| CountryCount {
            country: r.country,
            total: r.total,
        })
        .collect()
}

fn days(rows: Vec<DailyRow>) -> Vec<DailyCount> {
    rows.into_iter()
        .map(|r| DailyCount {
            date: r.day,
            clicks: r.clicks,
        })
        .collect()
}

/// PostgreSQL repository for analytics over `link_clicks`.
pub struct PgStatsRepository {
    pool: Arc<PgPool>,
}

impl PgStatsRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StatsRepository for PgStatsRepository {
    async fn count_clicks(&self, slug: &str, filter: ClickFilter) -> Result<i64, AppError> {
        let count: i64 =
            sqlx::query_scalar(&format!("SELECT COUNT(*) FROM link_clicks WHERE {WINDOW}"))
                .bind(slug)
                .bind(filter.lower_bound())
                .bind(filter.to_date)
                .fetch_one(self.pool.as_ref())
                .await?;

        Ok(count)
    }

    async fn country_breakdown(
        &self,
        slug: &str,
        filter: ClickFilter,
    ) -> Result<Vec<CountryCount>, AppError> {
        let rows = sqlx::query_as::<_, CountryRow>(&format!(
            r#"
            SELECT country, COUNT(*) AS total
            FROM link_clicks
            WHERE {WINDOW}
            GROUP BY country
            ORDER BY total DESC, country ASC
            "#
        ))
        .bind(slug)
        .bind(filter.lower_bound())
        .bind(filter.to_date)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(countries(rows))
    }

    async fn daily_clicks(
        &self,
        slug: &str,
        filter: ClickFilter,
    ) -> Result<Vec<DailyCount>, AppError> {
        let rows = sqlx::query_as::<_, DailyRow>(&format!(
            r#"
            SELECT (occurred_at AT TIME ZONE 'UTC')::date AS day, COUNT(*) AS clicks
            FROM link_clicks
            WHERE {WINDOW}
            GROUP BY day
            ORDER BY day ASC
            "#
        ))
        .bind(slug)
        .bind(filter.lower_bound())
        .bind(filter.to_date)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(days(rows))
    }

    async fn totals(&self) -> Result<Totals, AppError> {
        let row = sqlx::query_as::<_, TotalsRow>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM links) AS links,
                (SELECT COALESCE(SUM(click_count), 0)::bigint FROM links) AS clicks
            "#,
        )
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(Totals {
            links: row.links,
            clicks: row.clicks,
        })
    }

    async fn owner_totals(&self, owner: &str) -> Result<Totals, AppError> {
        let row = sqlx::query_as::<_, TotalsRow>(
            r#"
            SELECT COUNT(*) AS links, COALESCE(SUM(click_count), 0)::bigint AS clicks
            FROM links
            WHERE owner = $1
            "#,
        )
        .bind(owner)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(Totals {
            links: row.links,
            clicks: row.clicks,
        })
    }

    async fn owner_country_breakdown(
        &self,
        filter: OwnerFilter,
    ) -> Result<Vec<CountryCount>, AppError> {
        let rows = sqlx::query_as::<_, CountryRow>(&format!(
            r#"
            SELECT c.country, COUNT(*) AS total
            {OWNER_WINDOW}
            GROUP BY c.country
            ORDER BY total DESC, c.country ASC
            "#
        ))
        .bind(&filter.owner)
        .bind(filter.from_date)
        .bind(filter.to_date)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(countries(rows))
    }

    async fn owner_daily_clicks(&self, filter: OwnerFilter) -> Result<Vec<DailyCount>, AppError> {
        let rows = sqlx::query_as::<_, DailyRow>(&format!(
            r#"
            SELECT (c.occurred_at AT TIME ZONE 'UTC')::date AS day, COUNT(*) AS clicks
            {OWNER_WINDOW}
            GROUP BY day
            ORDER BY day ASC
            "#
        ))
        .bind(&filter.owner)
        .bind(filter.from_date)
        .bind(filter.to_date)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(days(rows))
    }

    async fn top_links(&self, owner: &str, limit: i64) -> Result<Vec<LinkClicks>, AppError> {
        let rows = sqlx::query_as::<_, TopLinkRow>(
            r#"
            SELECT slug, destination, click_count
            FROM links
            WHERE owner = $1
            ORDER BY click_count DESC, created_at DESC, id DESC
            LIMIT $2
            "#,
        )
        .bind(owner)
        .bind(limit)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| LinkClicks {
                slug: r.slug,
                destination: r.destination,
                click_count: r.click_count,
            })
            .collect())
    }
}
