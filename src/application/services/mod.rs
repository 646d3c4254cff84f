//! Business logic services for the application layer.

pub mod link_service;
pub mod redirect_service;
pub mod stats_service;

pub use link_service::{Availability, DeleteAuthority, LinkService};
pub use redirect_service::{RedirectService, Resolution};
pub use stats_service::{CountryShare, LinkStats, OwnerOverview, StatsService};
