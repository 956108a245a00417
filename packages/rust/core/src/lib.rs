//! Core pipeline orchestration for FlowAtlas.
//!
//! This crate ties the per-host crawler into the end-to-end fetch run and
//! owns catalog persistence. Front ends depend on it instead of reaching
//! into the crawler directly.

pub mod catalog;
pub mod pipeline;

pub use catalog::{load_catalog, write_catalog};
pub use pipeline::{FetchReport, fetch_catalog};

// Front ends implement their progress reporting against these.
pub use flowatlas_crawler::{ProgressReporter, SilentProgress};
