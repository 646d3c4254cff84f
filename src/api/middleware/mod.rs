//! HTTP middleware and extractors.
//!
//! Provides caller identity, rate limiting, and request tracing.

pub mod identity;
pub mod rate_limit;
pub mod tracing;
