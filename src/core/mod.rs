//! Core components of the `yolostocks-rs` crate.
//!
//! This module contains the foundational building blocks:
//! - The HTTP client [`YsClient`] and its builder.
//! - The primary [`YsError`] type.
//! - Shared data models ([`TickerRecord`], [`ExtractionResult`]).
//! - Internal networking helpers.

/// The HTTP client (`YsClient`), builder, and default constants.
pub mod client;
/// The primary error type (`YsError`) for the crate.
pub mod error;
/// Shared data models used across fetch, extract and persist.
pub mod models;
pub mod net;

// convenient re-exports so most code can just `use crate::core::YsClient`
pub use client::{YsClient, YsClientBuilder};
pub use error::{ErrorKind, YsError};
pub use models::{ExtractionResult, Field, MAX_RECORDS, Provenance, TickerRecord};
