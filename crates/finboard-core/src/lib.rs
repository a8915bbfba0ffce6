//! Core types and trait definitions for finboard.
//!
//! No HTTP or database dependencies. The store, API, server and CLI crates
//! all depend on it.

// Trait methods declare `Send` futures explicitly; impls use `async fn`.
#![allow(async_fn_in_trait)]

pub mod company;
pub mod error;
pub mod fact;
pub mod import;
pub mod pivot;
pub mod series;
pub mod store;
pub mod summary;

pub use error::{Error, Result};
