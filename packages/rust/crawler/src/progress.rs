//! Progress observation for fetch runs.

use flowatlas_shared::{Host, WorkflowSummary};

/// Observer notified as a fetch run progresses.
///
/// The crawl and pipeline code only ever call through this trait, so a no-op
/// implementation is always valid; nothing downstream depends on a live UI.
pub trait ProgressReporter: Send + Sync {
    /// A host's crawl is starting.
    fn host_started(&self, host: &Host);
    /// One workflow is about to be resolved.
    fn workflow_started(&self, host: &Host, summary: &WorkflowSummary);
    /// A workflow was discarded because a tool failed to resolve.
    fn workflow_discarded(&self, host: &Host, workflow_id: &str, tool_id: &str);
    /// A host's crawl finished with this many aggregated workflows.
    fn host_finished(&self, host: &Host, workflows: usize);
    /// A host's crawl failed outright; no workflows from it survive.
    fn host_failed(&self, host: &Host, message: &str);
    /// The whole run finished; `total_workflows` counts catalog entries.
    fn done(&self, total_workflows: usize);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn host_started(&self, _host: &Host) {}
    fn workflow_started(&self, _host: &Host, _summary: &WorkflowSummary) {}
    fn workflow_discarded(&self, _host: &Host, _workflow_id: &str, _tool_id: &str) {}
    fn host_finished(&self, _host: &Host, _workflows: usize) {}
    fn host_failed(&self, _host: &Host, _message: &str) {}
    fn done(&self, _total_workflows: usize) {}
}
