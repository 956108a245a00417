//! Domain and wire types for FlowAtlas catalogs.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use url::Url;

// ---------------------------------------------------------------------------
// Host
// ---------------------------------------------------------------------------

/// A workflow host from the hosts file: a name and the base URL all API
/// paths resolve against. Immutable for the duration of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Host {
    /// Human-readable name (the key in the hosts file).
    pub name: String,
    /// Base URL of the host's API.
    pub base_url: Url,
}

// ---------------------------------------------------------------------------
// Wire types (upstream API responses)
// ---------------------------------------------------------------------------

/// One entry in a host's `/api/workflows` listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowSummary {
    pub id: String,
    pub name: String,
    pub owner: String,
}

/// Full workflow detail from `/api/workflows/{id}`. Only `steps` is consumed.
///
/// Steps are keyed by step identifier. `BTreeMap` makes iteration order
/// deterministic across runs, so a workflow's tool list is reproducible.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowDetail {
    #[serde(default)]
    pub steps: BTreeMap<String, Step>,
}

/// A single workflow step. Only `"tool"` steps reference tools; every other
/// kind is ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Step {
    #[serde(rename = "type")]
    pub kind: String,
    /// Identifier of the referenced tool, present on tool steps.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_id: Option<String>,
}

impl Step {
    /// Whether this step references a tool.
    pub fn is_tool(&self) -> bool {
        self.kind == "tool"
    }
}

/// Tool metadata from `/api/tools/{id}`. Only `name` is consumed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDetail {
    pub name: String,
}

// ---------------------------------------------------------------------------
// Aggregate types
// ---------------------------------------------------------------------------

/// A resolved tool reference carried in aggregated workflow records.
/// Identity is `id`; `name` stays empty unless name resolution is enabled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolRef {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

/// One fully resolved workflow in the catalog. Produced only when every tool
/// step resolved; a workflow with any failed tool step is discarded whole.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregatedWorkflow {
    pub host_name: String,
    /// Serialized base URL of the owning host.
    pub host_url: String,
    pub id: String,
    pub name: String,
    pub owner: String,
    /// Tools in step order. Duplicates within a workflow are preserved; only
    /// the cross-workflow cache deduplicates by id.
    pub tools: Vec<ToolRef>,
}

/// The aggregate result of a fleet crawl, keyed by [`composite_key`].
/// `BTreeMap` keeps serialized key order stable.
pub type Catalog = BTreeMap<String, AggregatedWorkflow>;

/// Build the catalog key for a workflow: `host_url + "|" + workflow_id`.
///
/// `|` never appears in a serialized URL, so keys from hosts with distinct
/// base URLs cannot collide even when workflow ids coincide.
pub fn composite_key(base_url: &Url, workflow_id: &str) -> String {
    format!("{base_url}|{workflow_id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn composite_keys_distinct_across_hosts() {
        let a = Url::parse("http://alpha.example:9000/").unwrap();
        let b = Url::parse("http://beta.example:9000/").unwrap();

        // Same workflow id on two hosts must produce two distinct keys.
        assert_ne!(composite_key(&a, "wf-1"), composite_key(&b, "wf-1"));
        assert_eq!(composite_key(&a, "wf-1"), "http://alpha.example:9000/|wf-1");
    }

    #[test]
    fn step_wire_shape() {
        let step: Step =
            serde_json::from_str(r#"{"type": "tool", "tool_id": "t1", "extra": 42}"#).unwrap();
        assert!(step.is_tool());
        assert_eq!(step.tool_id.as_deref(), Some("t1"));

        let step: Step = serde_json::from_str(r#"{"type": "branch"}"#).unwrap();
        assert!(!step.is_tool());
        assert!(step.tool_id.is_none());
    }

    #[test]
    fn detail_without_steps_decodes_empty() {
        let detail: WorkflowDetail = serde_json::from_str(r#"{"id": "wf-1"}"#).unwrap();
        assert!(detail.steps.is_empty());
    }

    #[test]
    fn detail_steps_iterate_in_key_order() {
        let detail: WorkflowDetail = serde_json::from_str(
            r#"{"steps": {"s2": {"type": "tool", "tool_id": "b"},
                          "s1": {"type": "tool", "tool_id": "a"}}}"#,
        )
        .unwrap();

        let ids: Vec<&str> = detail
            .steps
            .values()
            .filter_map(|s| s.tool_id.as_deref())
            .collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn tool_ref_name_defaults_empty() {
        let tool: ToolRef = serde_json::from_str(r#"{"id": "t1"}"#).unwrap();
        assert_eq!(tool.name, "");
    }
}
