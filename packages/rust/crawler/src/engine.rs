//! Per-host workflow crawling and aggregation.
//!
//! A [`HostCrawler`] fetches one host's workflow list, resolves each workflow
//! in list order, and accumulates the fully resolved ones into a map keyed by
//! the composite catalog key. Workflows whose tool steps fail are discarded
//! whole; a retrieval failure on the list or a detail fails the entire host.

use std::collections::BTreeMap;

use tracing::{debug, info, instrument, warn};

use flowatlas_shared::{
    AggregatedWorkflow, Host, Result, ToolRef, WorkflowDetail, WorkflowSummary, composite_key,
};

use crate::client::{ApiClient, join_url};
use crate::progress::ProgressReporter;
use crate::tools::{self, ToolCache};

// ---------------------------------------------------------------------------
// WorkflowOutcome
// ---------------------------------------------------------------------------

/// Result of resolving one workflow: a complete record, or an explicit
/// discard naming the tool that sank it.
#[derive(Debug)]
pub enum WorkflowOutcome {
    /// Every tool step resolved; the record is ready for the catalog.
    Aggregated(AggregatedWorkflow),
    /// A tool step failed to resolve; nothing from this workflow survives.
    Discarded {
        workflow_id: String,
        tool_id: String,
    },
}

// ---------------------------------------------------------------------------
// HostCrawler
// ---------------------------------------------------------------------------

/// Crawls a single host's workflow API.
#[derive(Debug, Clone)]
pub struct HostCrawler {
    client: ApiClient,
    /// Cap on workflows considered per host, in list order.
    max_workflows: usize,
    /// Whether tool names are fetched (one extra request per distinct tool).
    resolve_tool_names: bool,
}

impl HostCrawler {
    pub fn new(client: ApiClient, max_workflows: usize, resolve_tool_names: bool) -> Self {
        Self {
            client,
            max_workflows,
            resolve_tool_names,
        }
    }

    /// Crawl `host`, sharing `cache` with every other crawl of the run.
    ///
    /// Returns the host's aggregated workflows keyed by composite key. A
    /// retrieval failure on the workflow list or any workflow detail fails
    /// the whole host (no partial host result); a workflow discarded over a
    /// tool failure is logged and omitted, and the crawl continues.
    #[instrument(skip_all, fields(host = %host.name))]
    pub async fn crawl(
        &self,
        host: &Host,
        cache: &ToolCache,
        progress: &dyn ProgressReporter,
    ) -> Result<BTreeMap<String, AggregatedWorkflow>> {
        progress.host_started(host);

        let list_url = join_url(&host.base_url, &["/api/workflows"])?;
        let summaries: Vec<WorkflowSummary> = self.client.get_json(&list_url).await?;

        info!(
            url = %host.base_url,
            listed = summaries.len(),
            cap = self.max_workflows,
            "workflow list fetched"
        );

        let mut results = BTreeMap::new();

        // Entries past the cap are never detail-fetched.
        for summary in summaries.into_iter().take(self.max_workflows) {
            progress.workflow_started(host, &summary);

            match self.resolve_workflow(host, summary, cache).await? {
                WorkflowOutcome::Aggregated(workflow) => {
                    results.insert(composite_key(&host.base_url, &workflow.id), workflow);
                }
                WorkflowOutcome::Discarded {
                    workflow_id,
                    tool_id,
                } => {
                    warn!(
                        host = %host.name,
                        %workflow_id,
                        %tool_id,
                        "skipping workflow, tool resolution failed"
                    );
                    progress.workflow_discarded(host, &workflow_id, &tool_id);
                }
            }
        }

        progress.host_finished(host, results.len());
        Ok(results)
    }

    /// Resolve one workflow: fetch its detail, then resolve every tool step.
    ///
    /// A retrieval error on the detail fetch propagates to the caller; a tool
    /// resolution failure turns into [`WorkflowOutcome::Discarded`], dropping
    /// any tools already gathered for earlier steps of this workflow.
    async fn resolve_workflow(
        &self,
        host: &Host,
        summary: WorkflowSummary,
        cache: &ToolCache,
    ) -> Result<WorkflowOutcome> {
        let detail_url = join_url(&host.base_url, &["/api/workflows/", &summary.id])?;
        let detail: WorkflowDetail = self.client.get_json(&detail_url).await?;

        let mut workflow_tools: Vec<ToolRef> = Vec::new();

        for (step_key, step) in &detail.steps {
            if !step.is_tool() {
                continue;
            }

            // A tool step without an id is contained like a failed fetch: this
            // workflow is discarded, the host crawl continues.
            let Some(tool_id) = step.tool_id.as_deref() else {
                debug!(workflow_id = %summary.id, %step_key, "tool step missing tool_id");
                return Ok(WorkflowOutcome::Discarded {
                    workflow_id: summary.id,
                    tool_id: String::new(),
                });
            };

            match tools::resolve(&self.client, host, tool_id, cache, self.resolve_tool_names)
                .await
            {
                // Appended even when it came from the cache, so every tool
                // step is represented in the record.
                Ok(tool) => workflow_tools.push(tool),
                Err(e) => {
                    debug!(workflow_id = %summary.id, tool_id, error = %e, "tool resolution failed");
                    return Ok(WorkflowOutcome::Discarded {
                        workflow_id: summary.id,
                        tool_id: tool_id.to_string(),
                    });
                }
            }
        }

        Ok(WorkflowOutcome::Aggregated(AggregatedWorkflow {
            host_name: host.name.clone(),
            host_url: host.base_url.to_string(),
            id: summary.id,
            name: summary.name,
            owner: summary.owner,
            tools: workflow_tools,
        }))
    }
}
