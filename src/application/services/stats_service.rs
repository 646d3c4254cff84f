//! Per-link click statistics and the owner overview.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::json;

use crate::domain::entities::Link;
use crate::domain::repositories::{
    ClickFilter, CountryCount, DailyCount, LinkClicks, LinkRepository, OwnerFilter,
    StatsRepository, Totals,
};
use crate::error::AppError;
use crate::utils::slug::canonical_slug;

/// One country's share of a link's recorded clicks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountryShare {
    pub country: String,
    pub total: i64,
    /// Rounded to the nearest whole percent.
    pub percent: i64,
}

/// Statistics for a single link.
///
/// `link.click_count` is the authoritative total. `recorded_clicks`, `countries` and `daily`
/// are derived from appended click rows and honour the requested date range.
#[derive(Debug, Clone)]
pub struct LinkStats {
    pub link: Link,
    pub recorded_clicks: i64,
    pub countries: Vec<CountryShare>,
    pub daily: Vec<DailyCount>,
}

/// Number of links in [`OwnerOverview::top_links`].
pub const TOP_LINKS: i64 = 5;

/// Statistics across all links of one owner.
///
/// `totals.clicks` sums the links' counters. `recorded_clicks`, `countries` and `daily` come
/// from click rows, each bounded by its own link's creation, and honour the date range.
#[derive(Debug, Clone)]
pub struct OwnerOverview {
    pub owner: String,
    pub totals: Totals,
    pub recorded_clicks: i64,
    pub countries: Vec<CountryShare>,
    pub daily: Vec<DailyCount>,
    pub top_links: Vec<LinkClicks>,
}

/// Read-only analytics over links and their click rows.
pub struct StatsService<L: LinkRepository + ?Sized, S: StatsRepository + ?Sized> {
    link_repository: Arc<L>,
    stats_repository: Arc<S>,
}

impl<L: LinkRepository + ?Sized, S: StatsRepository + ?Sized> StatsService<L, S> {
    pub fn new(link_repository: Arc<L>, stats_repository: Arc<S>) -> Self {
        Self {
            link_repository,
            stats_repository,
        }
    }

    /// Builds statistics for `slug`, optionally restricted to `[from, to]`.
    ///
    /// Only clicks recorded at or after the link's creation are counted.
    ///
    /// # Errors
    ///
    /// - [`AppError::Validation`] if `from` is after `to`
    /// - [`AppError::NotFound`] if no link matches
    pub async fn link_stats(
        &self,
        slug: &str,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<LinkStats, AppError> {
        check_range(from, to)?;

        let not_found = || AppError::not_found("Short link not found", json!({ "slug": slug }));
        let key = canonical_slug(slug).ok_or_else(not_found)?;
        let link = self
            .link_repository
            .find_by_slug(&key)
            .await?
            .ok_or_else(not_found)?;

        let filter = ClickFilter::new(link.created_at).with_date_range(from, to);

        let recorded_clicks = self
            .stats_repository
            .count_clicks(&link.slug, filter.clone())
            .await?;
        let breakdown = self
            .stats_repository
            .country_breakdown(&link.slug, filter.clone())
            .await?;
        let mut daily = self.stats_repository.daily_clicks(&link.slug, filter).await?;
        daily.sort_by_key(|d| d.date);

        Ok(LinkStats {
            link,
            recorded_clicks,
            countries: shares(breakdown, recorded_clicks),
            daily,
        })
    }

    /// Builds the overview of `owner`'s links, optionally restricted to `[from, to]`.
    ///
    /// An owner without links gets an empty overview.
    ///
    /// # Errors
    ///
    /// - [`AppError::Validation`] if `from` is after `to`
    pub async fn owner_overview(
        &self,
        owner: &str,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<OwnerOverview, AppError> {
        check_range(from, to)?;

        let filter = OwnerFilter::new(owner).with_date_range(from, to);

        let totals = self.stats_repository.owner_totals(owner).await?;
        let breakdown = self
            .stats_repository
            .owner_country_breakdown(filter.clone())
            .await?;
        let mut daily = self.stats_repository.owner_daily_clicks(filter).await?;
        daily.sort_by_key(|d| d.date);
        let top_links = self.stats_repository.top_links(owner, TOP_LINKS).await?;

        let recorded_clicks = breakdown.iter().map(|c| c.total).sum();

        Ok(OwnerOverview {
            owner: owner.to_string(),
            totals,
            recorded_clicks,
            countries: shares(breakdown, recorded_clicks),
            daily,
            top_links,
        })
    }

    /// Store-wide link and click counts.
    pub async fn totals(&self) -> Result<Totals, AppError> {
        self.stats_repository.totals().await
    }
}

fn check_range(from: Option<DateTime<Utc>>, to: Option<DateTime<Utc>>) -> Result<(), AppError> {
    if let (Some(from), Some(to)) = (from, to)
        && from > to
    {
        return Err(AppError::bad_request(
            "'from' must not be after 'to'",
            json!({ "from": from, "to": to }),
        ));
    }
    Ok(())
}

/// Country shares sorted by total, then name.
fn shares(breakdown: Vec<CountryCount>, recorded_clicks: i64) -> Vec<CountryShare> {
    let mut countries: Vec<CountryShare> = breakdown
        .into_iter()
        .map(|c| CountryShare {
            percent: percent(c.total, recorded_clicks),
            country: c.country,
            total: c.total,
        })
        .collect();
    countries.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.country.cmp(&b.country)));
    countries
}

fn percent(part: i64, whole: i64) -> i64 {
    if whole <= 0 {
        return 0;
    }
    (part as f64 / whole as f64 * 100.0).round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::{MockLinkRepository, MockStatsRepository};
    use chrono::{NaiveDate, TimeZone};

    fn created_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 10, 8, 0, 0).unwrap()
    }

    fn link_repo() -> MockLinkRepository {
        let mut mock = MockLinkRepository::new();
        mock.expect_find_by_slug()
            .withf(|slug| slug == "promo")
            .returning(|slug| {
                Ok(Some(Link::new(
                    7,
                    slug.to_string(),
                    "https://example.com/".to_string(),
                    None,
                    created_at(),
                    3,
                )))
            });
        mock.expect_find_by_slug().returning(|_| Ok(None));
        mock
    }

    #[test]
    fn test_percent_rounding() {
        assert_eq!(percent(1, 3), 33);
        assert_eq!(percent(2, 3), 67);
        assert_eq!(percent(1, 2), 50);
        assert_eq!(percent(5, 0), 0);
    }

    #[tokio::test]
    async fn test_link_stats() {
        let mut stats = MockStatsRepository::new();
        stats
            .expect_count_clicks()
            .withf(|slug, filter| slug == "promo" && filter.since == created_at())
            .times(1)
            .returning(|_, _| Ok(3));
        stats.expect_country_breakdown().times(1).returning(|_, _| {
            Ok(vec![
                CountryCount {
                    country: "Unknown".to_string(),
                    total: 1,
                },
                CountryCount {
                    country: "DE".to_string(),
                    total: 2,
                },
            ])
        });
        stats.expect_daily_clicks().times(1).returning(|_, _| {
            Ok(vec![
                DailyCount {
                    date: NaiveDate::from_ymd_opt(2026, 1, 12).unwrap(),
                    clicks: 1,
                },
                DailyCount {
                    date: NaiveDate::from_ymd_opt(2026, 1, 11).unwrap(),
                    clicks: 2,
                },
            ])
        });

        let service = StatsService::new(Arc::new(link_repo()), Arc::new(stats));
        let result = service.link_stats("promo", None, None).await.unwrap();

        assert_eq!(result.link.click_count, 3);
        assert_eq!(result.recorded_clicks, 3);
        assert_eq!(result.countries[0].country, "DE");
        assert_eq!(result.countries[0].percent, 67);
        assert_eq!(result.countries[1].percent, 33);
        assert!(result.daily[0].date < result.daily[1].date);
    }

    #[tokio::test]
    async fn test_link_stats_not_found() {
        let stats = MockStatsRepository::new();
        let service = StatsService::new(Arc::new(link_repo()), Arc::new(stats));

        let result = service.link_stats("missing", None, None).await;

        assert!(matches!(result, Err(AppError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_link_stats_rejects_inverted_range() {
        let service = StatsService::new(
            Arc::new(MockLinkRepository::new()),
            Arc::new(MockStatsRepository::new()),
        );

        let from = created_at();
        let to = from - chrono::Duration::days(1);
        let result = service.link_stats("promo", Some(from), Some(to)).await;

        assert!(matches!(result, Err(AppError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_owner_overview() {
        let mut stats = MockStatsRepository::new();
        stats
            .expect_owner_totals()
            .withf(|owner| owner == "alice")
            .times(1)
            .returning(|_| Ok(Totals { links: 2, clicks: 5 }));
        stats
            .expect_owner_country_breakdown()
            .withf(|filter| filter.owner == "alice" && filter.from_date.is_none())
            .times(1)
            .returning(|_| {
                Ok(vec![
                    CountryCount {
                        country: "US".to_string(),
                        total: 1,
                    },
                    CountryCount {
                        country: "DE".to_string(),
                        total: 3,
                    },
                ])
            });
        stats
            .expect_owner_daily_clicks()
            .times(1)
            .returning(|_| Ok(Vec::new()));
        stats
            .expect_top_links()
            .withf(|owner, limit| owner == "alice" && *limit == TOP_LINKS)
            .times(1)
            .returning(|_, _| {
                Ok(vec![LinkClicks {
                    slug: "promo".to_string(),
                    destination: "https://example.com/".to_string(),
                    click_count: 4,
                }])
            });

        let service = StatsService::new(Arc::new(MockLinkRepository::new()), Arc::new(stats));
        let overview = service.owner_overview("alice", None, None).await.unwrap();

        assert_eq!(overview.totals.clicks, 5);
        assert_eq!(overview.recorded_clicks, 4);
        assert_eq!(overview.countries[0].country, "DE");
        assert_eq!(overview.countries[0].percent, 75);
        assert_eq!(overview.countries[1].percent, 25);
        assert_eq!(overview.top_links[0].slug, "promo");
    }

    #[tokio::test]
    async fn test_owner_overview_rejects_inverted_range() {
        let service = StatsService::new(
            Arc::new(MockLinkRepository::new()),
            Arc::new(MockStatsRepository::new()),
        );

        let from = created_at();
        let to = from - chrono::Duration::days(1);
        let result = service.owner_overview("alice", Some(from), Some(to)).await;

        assert!(matches!(result, Err(AppError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_totals() {
        let mut stats = MockStatsRepository::new();
        stats
            .expect_totals()
            .returning(|| Ok(Totals { links: 4, clicks: 20 }));

        let service = StatsService::new(Arc::new(MockLinkRepository::new()), Arc::new(stats));

        assert_eq!(
            service.totals().await.unwrap(),
            Totals { links: 4, clicks: 20 }
        );
    }
}
