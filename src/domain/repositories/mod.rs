//! Repository trait definitions for the domain layer.
//!
//! These traits are the contract between the application services and the storage engine.
//! Implementations live in `crate::infrastructure::persistence`:
//!
//! - PostgreSQL ([`crate::infrastructure::persistence::PgLinkRepository`],
//!   [`crate::infrastructure::persistence::PgStatsRepository`])
//! - In-memory ([`crate::infrastructure::persistence::InMemoryStore`]) for development and tests
//!
//! Mock implementations are generated via `mockall` for unit tests.
//!
//! # Available Repositories
//!
//! - [`LinkRepository`] - The link store: lookup, atomic insert, click accounting, deletion
//! - [`StatsRepository`] - Read-side click analytics

pub mod link_repository;
pub mod stats_repository;

pub use link_repository::{Insertion, LinkRepository};
pub use stats_repository::{
    ClickFilter, CountryCount, DailyCount, LinkClicks, OwnerFilter, StatsRepository, Totals,
};

#[cfg(test)]
pub use link_repository::MockLinkRepository;
#[cfg(test)]
pub use stats_repository::MockStatsRepository;
