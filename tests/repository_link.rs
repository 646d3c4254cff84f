//! PostgreSQL repository tests. Need a database: `DATABASE_URL=... cargo test -- --ignored`.

use chrono::{Duration, Utc};
use sqlx::PgPool;
use std::sync::Arc;
use shortlink::domain::click_event::ClickEvent;
use shortlink::domain::entities::NewLink;
use shortlink::domain::repositories::{
    ClickFilter, Insertion, LinkRepository, OwnerFilter, StatsRepository, Totals,
};
use shortlink::infrastructure::persistence::{PgLinkRepository, PgStatsRepository};

fn new_link(slug: &str, owner: Option<&str>) -> NewLink {
    NewLink {
        slug: slug.to_string(),
        destination: "https://example.com/".to_string(),
        owner: owner.map(str::to_string),
    }
}

#[sqlx::test]
#[ignore]
async fn test_insert_if_absent(pool: PgPool) {
    let repo = PgLinkRepository::new(Arc::new(pool));

    let first = repo.insert_if_absent(new_link("test123", None)).await.unwrap();
    let Insertion::Created(link) = first else {
        panic!("expected the first insert to succeed");
    };
    assert_eq!(link.slug, "test123");
    assert_eq!(link.click_count, 0);

    let second = repo.insert_if_absent(new_link("test123", None)).await.unwrap();
    assert_eq!(second, Insertion::Conflict);
}

#[sqlx::test]
#[ignore]
async fn test_click_right_after_creation_is_counted(pool: PgPool) {
    let pool = Arc::new(pool);
    let links = PgLinkRepository::new(pool.clone());
    let stats = PgStatsRepository::new(pool);

    let before = Utc::now();
    let Insertion::Created(link) = links.insert_if_absent(new_link("fresh", None)).await.unwrap()
    else {
        panic!("expected the insert to succeed");
    };
    assert!(link.created_at >= before - Duration::milliseconds(1));

    links
        .append_click_event(ClickEvent::new("fresh", Some("DE")))
        .await
        .unwrap();

    let filter = ClickFilter::new(link.created_at);
    assert_eq!(stats.count_clicks("fresh", filter).await.unwrap(), 1);
}

#[sqlx::test]
#[ignore]
async fn test_concurrent_inserts_of_one_slug(pool: PgPool) {
    let repo = Arc::new(PgLinkRepository::new(Arc::new(pool)));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let repo = repo.clone();
            tokio::spawn(async move { repo.insert_if_absent(new_link("race", None)).await })
        })
        .collect();

    let mut created = 0;
    for handle in handles {
        if let Insertion::Created(_) = handle.await.unwrap().unwrap() {
            created += 1;
        }
    }

    assert_eq!(created, 1);
}

#[sqlx::test]
#[ignore]
async fn test_find_by_slug_not_found(pool: PgPool) {
    let repo = PgLinkRepository::new(Arc::new(pool));

    let result = repo.find_by_slug("notfound").await.unwrap();

    assert!(result.is_none());
}

#[sqlx::test]
#[ignore]
async fn test_increment_and_delete(pool: PgPool) {
    let repo = PgLinkRepository::new(Arc::new(pool));
    repo.insert_if_absent(new_link("counted", None)).await.unwrap();

    assert!(repo.increment_clicks("counted").await.unwrap());
    assert!(repo.increment_clicks("counted").await.unwrap());
    let link = repo.find_by_slug("counted").await.unwrap().unwrap();
    assert_eq!(link.click_count, 2);

    assert!(repo.delete("counted").await.unwrap());
    assert!(!repo.delete("counted").await.unwrap());
    assert!(!repo.increment_clicks("counted").await.unwrap());
}

#[sqlx::test]
#[ignore]
async fn test_list_by_owner(pool: PgPool) {
    let repo = PgLinkRepository::new(Arc::new(pool));
    for slug in ["one", "two", "three"] {
        repo.insert_if_absent(new_link(slug, Some("alice"))).await.unwrap();
    }
    repo.insert_if_absent(new_link("other", Some("bob"))).await.unwrap();

    let page = repo.list_by_owner("alice", 0, 2).await.unwrap();
    let slugs: Vec<_> = page.iter().map(|l| l.slug.as_str()).collect();

    assert_eq!(slugs, vec!["three", "two"]);
    assert_eq!(repo.count_by_owner("alice").await.unwrap(), 3);
}

#[sqlx::test]
#[ignore]
async fn test_click_statistics(pool: PgPool) {
    let pool = Arc::new(pool);
    let links = PgLinkRepository::new(pool.clone());
    let stats = PgStatsRepository::new(pool);

    let Insertion::Created(link) = links.insert_if_absent(new_link("visited", None)).await.unwrap()
    else {
        panic!("insert failed");
    };

    // Recorded before the link existed; must not count.
    links
        .append_click_event(ClickEvent::at(
            "visited",
            Some("FR"),
            link.created_at - Duration::days(1),
        ))
        .await
        .unwrap();
    for country in [Some("DE"), Some("DE"), None] {
        links
            .append_click_event(ClickEvent::new("visited", country))
            .await
            .unwrap();
    }

    let filter = ClickFilter::new(link.created_at);
    assert_eq!(stats.count_clicks("visited", filter.clone()).await.unwrap(), 3);

    let countries = stats.country_breakdown("visited", filter.clone()).await.unwrap();
    assert_eq!(countries[0].country, "DE");
    assert_eq!(countries[0].total, 2);
    assert_eq!(countries[1].country, "Unknown");

    let daily = stats.daily_clicks("visited", filter).await.unwrap();
    assert_eq!(daily.iter().map(|d| d.clicks).sum::<i64>(), 3);
    assert_eq!(daily.last().unwrap().date, Utc::now().date_naive());

    let future = ClickFilter::new(link.created_at)
        .with_date_range(Some(Utc::now() + Duration::days(1)), None);
    assert_eq!(stats.count_clicks("visited", future).await.unwrap(), 0);
}

#[sqlx::test]
#[ignore]
async fn test_owner_aggregates(pool: PgPool) {
    let pool = Arc::new(pool);
    let links = PgLinkRepository::new(pool.clone());
    let stats = PgStatsRepository::new(pool);

    for (slug, owner) in [("docs", "alice"), ("blog", "alice"), ("elsewhere", "bob")] {
        links.insert_if_absent(new_link(slug, Some(owner))).await.unwrap();
    }
    for (slug, country) in [("docs", "DE"), ("docs", "US"), ("blog", "DE"), ("elsewhere", "FR")] {
        links.increment_clicks(slug).await.unwrap();
        links
            .append_click_event(ClickEvent::new(slug, Some(country)))
            .await
            .unwrap();
    }
    links
        .append_click_event(ClickEvent::at("docs", Some("JP"), Utc::now() - Duration::days(2)))
        .await
        .unwrap();

    assert_eq!(
        stats.owner_totals("alice").await.unwrap(),
        Totals { links: 2, clicks: 3 }
    );

    let countries = stats
        .owner_country_breakdown(OwnerFilter::new("alice"))
        .await
        .unwrap();
    assert_eq!(countries.len(), 2);
    assert_eq!(countries[0].country, "DE");
    assert_eq!(countries[0].total, 2);

    let daily = stats.owner_daily_clicks(OwnerFilter::new("alice")).await.unwrap();
    assert_eq!(daily.iter().map(|d| d.clicks).sum::<i64>(), 3);

    let top = stats.top_links("alice", 5).await.unwrap();
    assert_eq!(top.len(), 2);
    assert_eq!(top[0].slug, "docs");
    assert_eq!(top[0].click_count, 2);
}

#[sqlx::test]
#[ignore]
async fn test_health_check(pool: PgPool) {
    let repo = PgLinkRepository::new(Arc::new(pool));

    assert!(repo.health_check().await);
}
