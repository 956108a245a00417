//! Tool metadata resolution backed by a run-global cache.

use std::collections::HashMap;

use tokio::sync::Mutex;
use tracing::debug;
use url::Url;

use flowatlas_shared::{FlowAtlasError, Host, Result, ToolDetail, ToolRef};

use crate::client::{ApiClient, join_url, push_encoded};

// ---------------------------------------------------------------------------
// ToolCache
// ---------------------------------------------------------------------------

/// Tool metadata shared across every workflow and host of one run.
///
/// Insertion is first-write-wins: two workers racing on the same unseen id
/// may both fetch, but every caller converges on the entry that won, and no
/// reader ever observes a half-written entry. The lock is never held across
/// network I/O.
#[derive(Debug, Default)]
pub struct ToolCache {
    entries: Mutex<HashMap<String, ToolRef>>,
}

impl ToolCache {
    /// Create an empty cache for a new run.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a tool by id.
    pub async fn get(&self, tool_id: &str) -> Option<ToolRef> {
        self.entries.lock().await.get(tool_id).cloned()
    }

    /// Insert unless the id is already present; returns the winning entry
    /// either way.
    pub async fn insert(&self, tool: ToolRef) -> ToolRef {
        let mut entries = self.entries.lock().await;
        entries.entry(tool.id.clone()).or_insert(tool).clone()
    }

    /// Number of distinct tools cached so far.
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    /// Whether the cache has no entries.
    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// Resolve one tool id to a [`ToolRef`], consulting the cache first.
///
/// Cache hits never touch the network. On a miss with name resolution off, a
/// placeholder with an empty name is cached and returned. On a miss with name
/// resolution on, the tool endpoint is fetched; a failure is not cached, so a
/// later workflow may retry the same id within the run.
pub async fn resolve(
    client: &ApiClient,
    host: &Host,
    tool_id: &str,
    cache: &ToolCache,
    fetch_names: bool,
) -> Result<ToolRef> {
    if let Some(cached) = cache.get(tool_id).await {
        debug!(tool_id, "tool cache hit");
        return Ok(cached);
    }

    if !fetch_names {
        let placeholder = ToolRef {
            id: tool_id.to_string(),
            name: String::new(),
        };
        return Ok(cache.insert(placeholder).await);
    }

    let url = tool_url(host, tool_id)
        .map_err(|e| FlowAtlasError::tool_resolution(tool_id, e.to_string()))?;

    let detail: ToolDetail = client
        .get_json(&url)
        .await
        .map_err(|e| FlowAtlasError::tool_resolution(tool_id, e.to_string()))?;

    let resolved = ToolRef {
        id: tool_id.to_string(),
        name: detail.name,
    };
    Ok(cache.insert(resolved).await)
}

/// Endpoint for one tool's metadata: `{base}/api/tools/{encoded id}`.
fn tool_url(host: &Host, tool_id: &str) -> Result<Url> {
    let base = join_url(&host.base_url, &["/api/tools/"])?;
    push_encoded(&base, tool_id)
}
