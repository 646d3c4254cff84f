//! DTOs for link statistics.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::application::services::{CountryShare, LinkStats, OwnerOverview};
use crate::domain::repositories::{DailyCount, LinkClicks};

#[derive(Debug, Serialize)]
pub struct CountryStat {
    pub country: String,
    pub total: i64,
    pub percent: i64,
}

#[derive(Debug, Serialize)]
pub struct DailyStat {
    pub date: NaiveDate,
    pub clicks: i64,
}

/// Statistics for a single link.
///
/// `click_count` is the link's counter; `recorded_clicks`, `countries` and `daily` come from
/// recorded click rows and honour the `from`/`to` filter.
#[derive(Debug, Serialize)]
pub struct LinkStatsResponse {
    pub slug: String,
    pub destination: String,
    pub created_at: DateTime<Utc>,
    pub click_count: i64,
    pub recorded_clicks: i64,
    pub countries: Vec<CountryStat>,
    pub daily: Vec<DailyStat>,
}

impl From<LinkStats> for LinkStatsResponse {
    fn from(stats: LinkStats) -> Self {
        Self {
            slug: stats.link.slug,
            destination: stats.link.destination,
            created_at: stats.link.created_at,
            click_count: stats.link.click_count,
            recorded_clicks: stats.recorded_clicks,
            countries: stats.countries.into_iter().map(Into::into).collect(),
            daily: stats.daily.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TopLinkStat {
    pub slug: String,
    pub destination: String,
    pub click_count: i64,
}

/// Statistics across all of the caller's links.
///
/// `click_count` sums the links' counters; the remaining figures come from recorded click rows.
#[derive(Debug, Serialize)]
pub struct OwnerOverviewResponse {
    pub owner: String,
    pub link_count: i64,
    pub click_count: i64,
    pub recorded_clicks: i64,
    pub countries: Vec<CountryStat>,
    pub daily: Vec<DailyStat>,
    pub top_links: Vec<TopLinkStat>,
}

impl From<OwnerOverview> for OwnerOverviewResponse {
    fn from(overview: OwnerOverview) -> Self {
        Self {
            owner: overview.owner,
            link_count: overview.totals.links,
            click_count: overview.totals.clicks,
            recorded_clicks: overview.recorded_clicks,
            countries: overview.countries.into_iter().map(Into::into).collect(),
            daily: overview.daily.into_iter().map(Into::into).collect(),
            top_links: overview
                .top_links
                .into_iter()
                .map(|l: LinkClicks| TopLinkStat {
                    slug: l.slug,
                    destination: l.destination,
                    click_count: l.click_count,
                })
                .collect(),
        }
    }
}

impl From<CountryShare> for CountryStat {
    fn from(c: CountryShare) -> Self {
        Self {
            country: c.country,
            total: c.total,
            percent: c.percent,
        }
    }
}

impl From<DailyCount> for DailyStat {
    fn from(d: DailyCount) -> Self {
        Self {
            date: d.date,
            clicks: d.clicks,
        }
    }
}
