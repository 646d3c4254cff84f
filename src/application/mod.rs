//! Application layer services implementing business logic.
//!
//! Services are generic over the repository traits so they can run against PostgreSQL, the
//! in-memory store, or mocks.
//!
//! # Available Services
//!
//! - [`services::link_service::LinkService`] - Slug allocation and the link lifecycle
//! - [`services::redirect_service::RedirectService`] - Slug resolution and visit recording
//! - [`services::stats_service::StatsService`] - Per-link click statistics

pub mod services;
