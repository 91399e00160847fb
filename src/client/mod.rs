//! Mood backend client.
//!
//! This module provides the HTTP client used for analysis, persistence,
//! and history lookups.

pub mod api;
pub mod error;

pub use api::{ClientConfig, HistoryQuery, MoodApiClient};
pub use error::ClientError;
