//! Workflow crawling against host APIs.
//!
//! This crate provides:
//! - [`client`], the HTTP client plus URL joining and segment encoding
//! - [`tools`], the run-wide tool cache and tool resolution
//! - [`engine`], the per-host crawler producing aggregated workflows
//! - [`progress`], the reporting seam implemented by front ends

pub mod client;
pub mod engine;
pub mod progress;
pub mod tools;

pub use client::{ApiClient, join_url, push_encoded};
pub use engine::{HostCrawler, WorkflowOutcome};
pub use progress::{ProgressReporter, SilentProgress};
pub use tools::ToolCache;
