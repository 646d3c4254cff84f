//! PostgreSQL implementation of the link store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use std::sync::Arc;

use crate::domain::click_event::ClickEvent;
use crate::domain::entities::{Link, NewLink};
use crate::domain::repositories::{Insertion, LinkRepository};
use crate::error::AppError;

const LINK_COLUMNS: &str = "id, slug, destination, owner, created_at, click_count";

#[derive(Debug, FromRow)]
struct LinkRow {
    id: i64,
    slug: String,
    destination: String,
    owner: Option<String>,
    created_at: DateTime<Utc>,
    click_count: i64,
}

impl From<LinkRow> for Link {
    fn from(r: LinkRow) -> Self {
        Link::new(r.id, r.slug, r.destination, r.owner, r.created_at, r.click_count)
    }
}

/// PostgreSQL link store.
///
/// Slug uniqueness is enforced by the `UNIQUE` constraint on `links.slug`; inserts use
/// `ON CONFLICT DO NOTHING` so a taken slug comes back as zero rows instead of an error.
///
/// `created_at` and click `occurred_at` both come from the application clock, since click
/// windows start at the link's creation.
pub struct PgLinkRepository {
    pool: Arc<PgPool>,
}

impl PgLinkRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LinkRepository for PgLinkRepository {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Link>, AppError> {
        let row = sqlx::query_as::<_, LinkRow>(&format!(
            "SELECT {LINK_COLUMNS} FROM links WHERE slug = $1"
        ))
        .bind(slug)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(Link::from))
    }

    async fn insert_if_absent(&self, new_link: NewLink) -> Result<Insertion, AppError> {
        let row = sqlx::query_as::<_, LinkRow>(&format!(
            r#"
            INSERT INTO links (slug, destination, owner, created_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (slug) DO NOTHING
            RETURNING {LINK_COLUMNS}
            "#
        ))
        .bind(&new_link.slug)
        .bind(&new_link.destination)
        .bind(&new_link.owner)
        .bind(Utc::now())
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(match row {
            Some(row) => Insertion::Created(row.into()),
            None => Insertion::Conflict,
        })
    }

    async fn increment_clicks(&self, slug: &str) -> Result<bool, AppError> {
        let result = sqlx::query("UPDATE links SET click_count = click_count + 1 WHERE slug = $1")
            .bind(slug)
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn append_click_event(&self, event: ClickEvent) -> Result<(), AppError> {
        sqlx::query("INSERT INTO link_clicks (slug, country, occurred_at) VALUES ($1, $2, $3)")
            .bind(&event.slug)
            .bind(&event.country)
            .bind(event.occurred_at)
            .execute(self.pool.as_ref())
            .await?;

        Ok(())
    }

    async fn delete(&self, slug: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM links WHERE slug = $1")
            .bind(slug)
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_by_owner(
        &self,
        owner: &str,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Link>, AppError> {
        let rows = sqlx::query_as::<_, LinkRow>(&format!(
            r#"
            SELECT {LINK_COLUMNS}
            FROM links
            WHERE owner = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(owner)
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.into_iter().map(Link::from).collect())
    }

    async fn count_by_owner(&self, owner: &str) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM links WHERE owner = $1")
            .bind(owner)
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(count)
    }

    async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1")
            .execute(self.pool.as_ref())
            .await
            .is_ok()
    }
}
