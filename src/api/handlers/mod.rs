//! HTTP request handlers.
//!
//! Each handler module corresponds to a logical grouping of endpoints.

pub mod health;
pub mod links;
pub mod redirect;
pub mod stats;

pub use health::health_handler;
pub use links::{
    create_link_handler, delete_link_handler, list_links_handler, slug_exists_handler,
};
pub use redirect::{home_handler, redirect_handler};
pub use stats::{owner_stats_handler, stats_handler};
