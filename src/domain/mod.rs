//! Domain layer containing business entities and contracts.
//!
//! The domain layer has no dependency on the web framework or on a concrete storage engine.
//!
//! # Architecture
//!
//! - [`entities`] - Core business data structures
//! - [`repositories`] - Storage contracts implemented by the infrastructure layer
//! - [`click_event`] - Click tracking event model
//! - [`visit`] - The "record visit" capability and its implementations
//! - [`click_worker`] - Asynchronous click processing worker
//!
//! # Click Processing Flow
//!
//! 1. The redirect resolver finds the link
//! 2. A [`click_event::ClickEvent`] is handed to a [`visit::QueuedVisitRecorder`] (non-blocking)
//! 3. [`click_worker::run_click_worker`] drains the queue with bounded concurrency
//! 4. A [`visit::StoreVisitRecorder`] increments the counter and/or appends a click row,
//!    retrying each write on its own

pub mod click_event;
pub mod click_worker;
pub mod entities;
pub mod repositories;
pub mod visit;
