//! Core types and trait definitions for the Pointage attendance tracker.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod admin;
pub mod error;
pub mod event;
pub mod import;
pub mod member;
pub mod presence;
pub mod report;
pub mod store;

pub use error::{Error, Result};

/// Primary keys are SQLite-style auto-incremented integers.
pub type MemberId = i64;
pub type EventId = i64;
pub type AdminId = i64;
