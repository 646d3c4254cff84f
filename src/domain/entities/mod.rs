//! Core domain entities.
//!
//! - [`Link`] - A persisted slug → destination mapping
//! - [`NewLink`] - Input for the store's atomic insert
//!
//! Entities are plain data. Validation and normalization happen in the application layer
//! before a [`NewLink`] is ever built.

pub mod link;

pub use link::{Link, NewLink};
