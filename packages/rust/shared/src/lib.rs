//! Shared types, error model, and configuration for FlowAtlas.
//!
//! This crate is the foundation depended on by all other FlowAtlas crates.
//! It provides:
//! - [`FlowAtlasError`], the unified error type
//! - Domain types ([`Host`], [`WorkflowSummary`], [`ToolRef`], [`Catalog`])
//! - Configuration ([`AppConfig`], [`FetchConfig`], [`ServeConfig`], hosts loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, DefaultsConfig, FetchConfig, ServeConfig, ServerConfig, config_dir,
    config_file_path, load_config, load_config_from, load_hosts,
};
pub use error::{FlowAtlasError, Result};
pub use types::{
    AggregatedWorkflow, Catalog, Host, Step, ToolDetail, ToolRef, WorkflowDetail, WorkflowSummary,
    composite_key,
};
