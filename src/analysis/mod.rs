//! Analysis modules.
//!
//! Pure reductions and lookups over scan samples and saved history.

pub mod advice;
pub mod aggregator;
pub mod history;

pub use aggregator::*;
