//! Application configuration for FlowAtlas.
//!
//! User config lives at `~/.flowatlas/flowatlas.toml`.
//! CLI flags override config file values, which override defaults.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{FlowAtlasError, Result};
use crate::types::Host;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "flowatlas.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".flowatlas";

// ---------------------------------------------------------------------------
// Config structs (matching flowatlas.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Fetch defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Static server settings.
    #[serde(default)]
    pub server: ServerConfig,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Concurrent host workers during a fetch.
    #[serde(default = "default_max_workers")]
    pub max_workers: usize,

    /// Maximum workflows fetched per host.
    #[serde(default = "default_max_workflows")]
    pub max_workflows: usize,

    /// Whether to resolve tool names (one extra request per distinct tool).
    #[serde(default)]
    pub resolve_tool_names: bool,

    /// Path to the hosts file.
    #[serde(default = "default_hosts_file")]
    pub hosts_file: String,

    /// Path the catalog artifact is written to.
    #[serde(default = "default_catalog_file")]
    pub catalog_file: String,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            max_workers: default_max_workers(),
            max_workflows: default_max_workflows(),
            resolve_tool_names: false,
            hosts_file: default_hosts_file(),
            catalog_file: default_catalog_file(),
        }
    }
}

fn default_max_workers() -> usize {
    1
}
fn default_max_workflows() -> usize {
    100
}
fn default_hosts_file() -> String {
    "hosts.json".into()
}
fn default_catalog_file() -> String {
    "workflows.json".into()
}

/// `[server]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Port the static server binds on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Exact origin emitted in the `Access-Control-Allow-Origin` header,
    /// pointing at the companion front-end.
    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,

    /// Directory served as the site root.
    #[serde(default = "default_serve_dir")]
    pub serve_dir: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            cors_origin: default_cors_origin(),
            serve_dir: default_serve_dir(),
        }
    }
}

fn default_port() -> u16 {
    8082
}
fn default_cors_origin() -> String {
    "http://localhost:8081".into()
}
fn default_serve_dir() -> String {
    ".".into()
}

// ---------------------------------------------------------------------------
// Runtime configs (merged from config file + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime fetch configuration, merged from config file and CLI flags.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Maximum concurrent host workers.
    pub max_workers: usize,
    /// Maximum workflows fetched per host.
    pub max_workflows: usize,
    /// Whether to resolve tool names.
    pub resolve_tool_names: bool,
}

impl From<&AppConfig> for FetchConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            max_workers: config.defaults.max_workers,
            max_workflows: config.defaults.max_workflows,
            resolve_tool_names: config.defaults.resolve_tool_names,
        }
    }
}

/// Runtime serve configuration, merged from config file and CLI flags.
#[derive(Debug, Clone)]
pub struct ServeConfig {
    /// Directory served as the site root.
    pub serve_dir: PathBuf,
    /// Port to bind on.
    pub port: u16,
    /// Exact origin allowed by the CORS header.
    pub cors_origin: String,
}

impl From<&AppConfig> for ServeConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            serve_dir: PathBuf::from(&config.server.serve_dir),
            port: config.server.port,
            cors_origin: config.server.cors_origin.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.flowatlas/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| FlowAtlasError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.flowatlas/flowatlas.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| FlowAtlasError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| FlowAtlasError::config(format!("failed to parse {}: {e}", path.display())))
}

// ---------------------------------------------------------------------------
// Hosts file
// ---------------------------------------------------------------------------

/// Load the hosts file: a JSON object mapping host name to base URL.
///
/// Missing or malformed content is fatal at startup, before any network
/// activity. Hosts come back sorted by name so fleet runs enumerate them in
/// a stable order regardless of JSON key order.
pub fn load_hosts(path: &Path) -> Result<Vec<Host>> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        FlowAtlasError::config(format!("cannot read hosts file {}: {e}", path.display()))
    })?;

    let entries: BTreeMap<String, String> = serde_json::from_str(&content).map_err(|e| {
        FlowAtlasError::config(format!("invalid hosts file {}: {e}", path.display()))
    })?;

    if entries.is_empty() {
        tracing::warn!(path = %path.display(), "hosts file contains no hosts");
    }

    entries
        .into_iter()
        .map(|(name, raw)| {
            let base_url = Url::parse(&raw).map_err(|e| {
                FlowAtlasError::config(format!("invalid base URL '{raw}' for host '{name}': {e}"))
            })?;
            Ok(Host { name, base_url })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("max_workers"));
        assert!(toml_str.contains("cors_origin"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.defaults.max_workers, 1);
        assert_eq!(parsed.defaults.max_workflows, 100);
        assert_eq!(parsed.server.port, 8082);
        assert_eq!(parsed.server.cors_origin, "http://localhost:8081");
    }

    #[test]
    fn partial_config_fills_defaults() {
        let toml_str = r#"
[defaults]
max_workers = 8

[server]
port = 9090
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.defaults.max_workers, 8);
        assert_eq!(config.defaults.max_workflows, 100);
        assert!(!config.defaults.resolve_tool_names);
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.serve_dir, ".");
    }

    #[test]
    fn fetch_config_from_app_config() {
        let app = AppConfig::default();
        let fetch = FetchConfig::from(&app);
        assert_eq!(fetch.max_workers, 1);
        assert_eq!(fetch.max_workflows, 100);
        assert!(!fetch.resolve_tool_names);
    }

    #[test]
    fn load_hosts_sorted_by_name() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("hosts.json");
        std::fs::write(
            &path,
            r#"{"zeta": "http://zeta.example:9000", "alpha": "http://alpha.example:9000"}"#,
        )
        .unwrap();

        let hosts = load_hosts(&path).expect("load hosts");
        let names: Vec<&str> = hosts.iter().map(|h| h.name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
        assert_eq!(hosts[0].base_url.as_str(), "http://alpha.example:9000/");
    }

    #[test]
    fn load_hosts_missing_file_is_config_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = load_hosts(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, FlowAtlasError::Config { .. }));
    }

    #[test]
    fn load_hosts_rejects_bad_url() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("hosts.json");
        std::fs::write(&path, r#"{"bad": "not a url"}"#).unwrap();

        let err = load_hosts(&path).unwrap_err();
        assert!(err.to_string().contains("bad"));
    }
}
