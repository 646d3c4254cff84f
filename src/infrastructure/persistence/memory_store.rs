//! Process-local link store.
//!
//! Used when no database is configured and by the HTTP tests. Data lives only as long as the
//! process.

use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::domain::click_event::ClickEvent;
use crate::domain::entities::{Link, NewLink};
use crate::domain::repositories::{
    ClickFilter, CountryCount, DailyCount, Insertion, LinkClicks, LinkRepository, OwnerFilter,
    StatsRepository, Totals,
};
use crate::error::AppError;

#[derive(Default)]
struct Tables {
    links: HashMap<String, Link>,
    clicks: Vec<ClickEvent>,
}

/// In-memory implementation of [`LinkRepository`] and [`StatsRepository`].
///
/// Insert-if-absent runs under a single write lock, which gives the same guarantee as a unique
/// index.
#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
    next_id: AtomicI64,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored click rows, deleted links included.
    pub async fn click_rows(&self) -> usize {
        self.tables.read().await.clicks.len()
    }

    fn matching<'a>(
        clicks: &'a [ClickEvent],
        slug: &'a str,
        filter: &'a ClickFilter,
    ) -> impl Iterator<Item = &'a ClickEvent> + 'a {
        clicks
            .iter()
            .filter(move |c| c.slug == slug && filter.contains(c.occurred_at))
    }

    /// Clicks on live links of `filter.owner`, each inside its own link's window.
    fn owned<'a>(
        tables: &'a Tables,
        filter: &'a OwnerFilter,
    ) -> impl Iterator<Item = &'a ClickEvent> + 'a {
        tables.clicks.iter().filter(move |c| {
            tables.links.get(&c.slug).is_some_and(|link| {
                link.is_owned_by(&filter.owner)
                    && filter.for_link(link.created_at).contains(c.occurred_at)
            })
        })
    }
}

fn by_country<'a>(clicks: impl Iterator<Item = &'a ClickEvent>) -> Vec<CountryCount> {
    let mut totals: HashMap<&str, i64> = HashMap::new();
    for click in clicks {
        *totals.entry(click.country.as_str()).or_default() += 1;
    }

    let mut breakdown: Vec<CountryCount> = totals
        .into_iter()
        .map(|(country, total)| CountryCount {
            country: country.to_string(),
            total,
        })
        .collect();
    breakdown.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.country.cmp(&b.country)));
    breakdown
}

fn by_day<'a>(clicks: impl Iterator<Item = &'a ClickEvent>) -> Vec<DailyCount> {
    let mut days = BTreeMap::new();
    for click in clicks {
        *days.entry(click.occurred_at.date_naive()).or_insert(0i64) += 1;
    }

    days.into_iter()
        .map(|(date, clicks)| DailyCount { date, clicks })
        .collect()
}

#[async_trait]
impl LinkRepository for InMemoryStore {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Link>, AppError> {
        Ok(self.tables.read().await.links.get(slug).cloned())
    }

    async fn insert_if_absent(&self, new_link: NewLink) -> Result<Insertion, AppError> {
        let mut tables = self.tables.write().await;

        match tables.links.entry(new_link.slug) {
            Entry::Occupied(_) => Ok(Insertion::Conflict),
            Entry::Vacant(entry) => {
                let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
                let link = Link::new(
                    id,
                    entry.key().clone(),
                    new_link.destination,
                    new_link.owner,
                    Utc::now(),
                    0,
                );
                entry.insert(link.clone());
                Ok(Insertion::Created(link))
            }
        }
    }

    async fn increment_clicks(&self, slug: &str) -> Result<bool, AppError> {
        let mut tables = self.tables.write().await;

        match tables.links.get_mut(slug) {
            Some(link) => {
                link.click_count += 1;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn append_click_event(&self, event: ClickEvent) -> Result<(), AppError> {
        self.tables.write().await.clicks.push(event);
        Ok(())
    }

    async fn delete(&self, slug: &str) -> Result<bool, AppError> {
        Ok(self.tables.write().await.links.remove(slug).is_some())
    }

    async fn list_by_owner(
        &self,
        owner: &str,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Link>, AppError> {
        let tables = self.tables.read().await;

        let mut owned: Vec<Link> = tables
            .links
            .values()
            .filter(|l| l.is_owned_by(owner))
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        Ok(owned
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn count_by_owner(&self, owner: &str) -> Result<i64, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.links.values().filter(|l| l.is_owned_by(owner)).count() as i64)
    }

    async fn health_check(&self) -> bool {
        true
    }
}

#[async_trait]
impl StatsRepository for InMemoryStore {
    async fn count_clicks(&self, slug: &str, filter: ClickFilter) -> Result<i64, AppError> {
        let tables = self.tables.read().await;
        Ok(Self::matching(&tables.clicks, slug, &filter).count() as i64)
    }

    async fn country_breakdown(
        &self,
        slug: &str,
        filter: ClickFilter,
    ) -> Result<Vec<CountryCount>, AppError> {
        let tables = self.tables.read().await;
        Ok(by_country(Self::matching(&tables.clicks, slug, &filter)))
    }

    async fn daily_clicks(
        &self,
        slug: &str,
        filter: ClickFilter,
    ) -> Result<Vec<DailyCount>, AppError> {
        let tables = self.tables.read().await;
        Ok(by_day(Self::matching(&tables.clicks, slug, &filter)))
    }

    async fn totals(&self) -> Result<Totals, AppError> {
        let tables = self.tables.read().await;

        Ok(Totals {
            links: tables.links.len() as i64,
            clicks: tables.links.values().map(|l| l.click_count).sum(),
        })
    }

    async fn owner_totals(&self, owner: &str) -> Result<Totals, AppError> {
        let tables = self.tables.read().await;

        let owned = tables.links.values().filter(|l| l.is_owned_by(owner));
        Ok(owned.fold(Totals::default(), |acc, l| Totals {
            links: acc.links + 1,
            clicks: acc.clicks + l.click_count,
        }))
    }

    async fn owner_country_breakdown(
        &self,
        filter: OwnerFilter,
    ) -> Result<Vec<CountryCount>, AppError> {
        let tables = self.tables.read().await;
        Ok(by_country(Self::owned(&tables, &filter)))
    }

    async fn owner_daily_clicks(&self, filter: OwnerFilter) -> Result<Vec<DailyCount>, AppError> {
        let tables = self.tables.read().await;
        Ok(by_day(Self::owned(&tables, &filter)))
    }

    async fn top_links(&self, owner: &str, limit: i64) -> Result<Vec<LinkClicks>, AppError> {
        let tables = self.tables.read().await;

        let mut owned: Vec<&Link> = tables
            .links
            .values()
            .filter(|l| l.is_owned_by(owner))
            .collect();
        owned.sort_by(|a, b| {
            b.click_count
                .cmp(&a.click_count)
                .then(b.created_at.cmp(&a.created_at))
                .then(b.id.cmp(&a.id))
        });

        Ok(owned
            .into_iter()
            .take(limit.max(0) as usize)
            .map(|l| LinkClicks {
                slug: l.slug.clone(),
                destination: l.destination.clone(),
                click_count: l.click_count,
            })
            .collect())
    }
}
