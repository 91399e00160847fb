//! Scan sessions.
//!
//! This module provides the round loop that drives a scan, the controller
//! that guards against overlapping scans, and progress reporting.

pub mod progress;
pub mod scan_loop;

pub use progress::ProgressObserver;
pub use scan_loop::{NoopObserver, ScanController, ScanObserver, ScanPlan};
