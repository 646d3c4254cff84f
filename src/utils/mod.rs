//! Helpers shared by the services and the HTTP layer.
//!
//! - [`slug`] - Slug generation and requested-slug validation
//! - [`url_normalizer`] - Destination URL validation and normalization
//! - [`country`] - Country extraction from geolocation headers

pub mod country;
pub mod slug;
pub mod url_normalizer;
