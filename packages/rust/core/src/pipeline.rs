//! End-to-end fetch pipeline: hosts -> per-host crawl -> merged catalog.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use tokio::sync::Semaphore;
use tracing::{info, instrument, warn};

use flowatlas_crawler::{ApiClient, HostCrawler, ProgressReporter, ToolCache};
use flowatlas_shared::{Catalog, FetchConfig, Host, Result, WorkflowSummary};

/// Result of a fetch across every configured host.
#[derive(Debug)]
pub struct FetchReport {
    /// Merged workflows keyed by `host_url|workflow_id`.
    pub catalog: Catalog,
    /// Hosts whose crawl completed.
    pub hosts_succeeded: usize,
    /// Hosts whose crawl failed, with the failure message.
    pub hosts_failed: Vec<(String, String)>,
    /// Workflows dropped over a failed tool step.
    pub discarded: usize,
    /// Total elapsed time.
    pub elapsed: std::time::Duration,
}

impl FetchReport {
    /// Number of workflows in the merged catalog. This is the run total the
    /// front end reports, not the number of hosts.
    pub fn workflow_count(&self) -> usize {
        self.catalog.len()
    }
}

/// Crawl every host concurrently and merge the results into one catalog.
///
/// Hosts run under a semaphore sized by `max_workers`; the tool cache is
/// shared across all of them, so a tool id resolved for one host is reused by
/// every other. A failed host is reported in the result rather than failing
/// the run, so the remaining hosts still contribute their workflows.
#[instrument(skip_all, fields(hosts = hosts.len()))]
pub async fn fetch_catalog(
    hosts: &[Host],
    config: &FetchConfig,
    progress: Arc<dyn ProgressReporter>,
) -> Result<FetchReport> {
    let start = Instant::now();

    info!(
        hosts = hosts.len(),
        max_workers = config.max_workers,
        max_workflows = config.max_workflows,
        resolve_tool_names = config.resolve_tool_names,
        "starting fetch"
    );

    let client = ApiClient::new()?;
    let cache = Arc::new(ToolCache::new());
    let semaphore = Arc::new(Semaphore::new(config.max_workers.max(1)));
    let progress = Arc::new(CountingProgress::new(progress));

    let mut handles = Vec::with_capacity(hosts.len());

    for host in hosts {
        let crawler = HostCrawler::new(
            client.clone(),
            config.max_workflows,
            config.resolve_tool_names,
        );
        let cache = Arc::clone(&cache);
        let sem = Arc::clone(&semaphore);
        let progress = Arc::clone(&progress);
        let host = host.clone();

        handles.push(tokio::spawn(async move {
            let _permit = sem.acquire().await.expect("semaphore closed");
            let outcome = crawler.crawl(&host, &cache, progress.as_ref()).await;
            (host, outcome)
        }));
    }

    let mut catalog = Catalog::new();
    let mut hosts_succeeded = 0;
    let mut hosts_failed: Vec<(String, String)> = Vec::new();

    for handle in handles {
        match handle.await {
            Ok((_host, Ok(workflows))) => {
                hosts_succeeded += 1;
                catalog.extend(workflows);
            }
            Ok((host, Err(e))) => {
                warn!(host = %host.name, error = %e, "host crawl failed");
                progress.host_failed(&host, &e.to_string());
                hosts_failed.push((host.name, e.to_string()));
            }
            Err(e) => {
                warn!(error = %e, "crawl task failed");
                hosts_failed.push(("task".into(), e.to_string()));
            }
        }
    }

    let report = FetchReport {
        catalog,
        hosts_succeeded,
        hosts_failed,
        discarded: progress.discarded(),
        elapsed: start.elapsed(),
    };

    progress.done(report.workflow_count());

    info!(
        workflows = report.workflow_count(),
        hosts_succeeded = report.hosts_succeeded,
        hosts_failed = report.hosts_failed.len(),
        discarded = report.discarded,
        elapsed_ms = report.elapsed.as_millis(),
        "fetch complete"
    );

    Ok(report)
}

// ---------------------------------------------------------------------------
// Discard accounting
// ---------------------------------------------------------------------------

/// Forwards progress events to the caller's reporter while counting
/// discarded workflows for the report.
struct CountingProgress {
    inner: Arc<dyn ProgressReporter>,
    discarded: AtomicUsize,
}

impl CountingProgress {
    fn new(inner: Arc<dyn ProgressReporter>) -> Self {
        Self {
            inner,
            discarded: AtomicUsize::new(0),
        }
    }

    fn discarded(&self) -> usize {
        self.discarded.load(Ordering::Relaxed)
    }
}

impl ProgressReporter for CountingProgress {
    fn host_started(&self, host: &Host) {
        self.inner.host_started(host);
    }

    fn workflow_started(&self, host: &Host, workflow: &WorkflowSummary) {
        self.inner.workflow_started(host, workflow);
    }

    fn workflow_discarded(&self, host: &Host, workflow_id: &str, tool_id: &str) {
        self.discarded.fetch_add(1, Ordering::Relaxed);
        self.inner.workflow_discarded(host, workflow_id, tool_id);
    }

    fn host_finished(&self, host: &Host, workflows: usize) {
        self.inner.host_finished(host, workflows);
    }

    fn host_failed(&self, host: &Host, message: &str) {
        self.inner.host_failed(host, message);
    }

    fn done(&self, total_workflows: usize) {
        self.inner.done(total_workflows);
    }
}
