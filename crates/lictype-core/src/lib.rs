//! Core types and trait definitions for the license typology service.
//!
//! This crate is deliberately free of HTTP, database, and file-format
//! dependencies. All other crates depend on it.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod error;
pub mod inference;
pub mod license;
pub mod policy;
pub mod service;
pub mod store;

pub use error::{Error, Result};
