//! Report generation module.
//!
//! This module renders scan reports and history listings in Markdown and JSON.

pub mod generator;

pub use generator::*;
