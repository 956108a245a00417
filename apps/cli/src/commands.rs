//! CLI flag definitions, tracing setup, and the fetch/serve run.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use clap::Parser;
use color_eyre::eyre::Result;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use tracing::info;

use flowatlas_core::pipeline::{FetchReport, fetch_catalog};
use flowatlas_core::{ProgressReporter, write_catalog};
use flowatlas_shared::{FetchConfig, Host, ServeConfig, WorkflowSummary, load_config, load_hosts};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// FlowAtlas: aggregate workflow catalogs from a fleet of hosts.
#[derive(Parser)]
#[command(
    name = "flowatlas",
    version,
    about = "Crawl workflow hosts into a single catalog file and serve it over HTTP.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Fetch workflows from the configured hosts before serving.
    #[arg(short, long)]
    pub fetch: bool,

    /// Resolve tool names from each host (implies --fetch).
    #[arg(short, long)]
    pub tool_names: bool,

    /// Concurrent host crawls.
    #[arg(long)]
    pub max_workers: Option<usize>,

    /// Cap on workflows considered per host, in list order.
    #[arg(long)]
    pub max_workflows: Option<usize>,

    /// Hosts file mapping host names to base URLs.
    #[arg(long)]
    pub hosts: Option<PathBuf>,

    /// Catalog output path.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Port for the static file server.
    #[arg(long)]
    pub port: Option<u16>,

    /// Exit after fetching instead of serving the output directory.
    #[arg(long)]
    pub no_serve: bool,

    /// Log format: text (default) or json.
    #[arg(long, default_value = "text")]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "flowatlas=info",
        1 => "flowatlas=debug",
        _ => "flowatlas=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt().with_env_filter(env_filter).with_target(false).init();
        }
        LogFormat::Json => {
            fmt().json().with_env_filter(env_filter).init();
        }
    }
}

// ---------------------------------------------------------------------------
// Run
// ---------------------------------------------------------------------------

/// Run the tool: an optional fetch phase, then the file server unless
/// `--no-serve` was given. Flags override the config file's defaults.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let config = load_config()?;

    let mut fetch_config = FetchConfig::from(&config);
    if let Some(n) = cli.max_workers {
        fetch_config.max_workers = n;
    }
    if let Some(n) = cli.max_workflows {
        fetch_config.max_workflows = n;
    }
    if cli.tool_names {
        fetch_config.resolve_tool_names = true;
    }

    let hosts_path = cli
        .hosts
        .unwrap_or_else(|| PathBuf::from(&config.defaults.hosts_file));
    let output_path = cli
        .output
        .unwrap_or_else(|| PathBuf::from(&config.defaults.catalog_file));

    let mut serve_config = ServeConfig::from(&config);
    if let Some(port) = cli.port {
        serve_config.port = port;
    }

    if cli.fetch || cli.tool_names {
        let hosts = load_hosts(&hosts_path)?;

        info!(
            hosts_file = %hosts_path.display(),
            hosts = hosts.len(),
            "fetching workflow catalog"
        );

        let reporter = Arc::new(CliProgress::new(hosts.len()));
        let report = fetch_catalog(&hosts, &fetch_config, reporter).await?;
        write_catalog(&output_path, &report.catalog)?;

        print_summary(&report, &output_path);
    }

    if !cli.no_serve {
        flowatlas_server::serve(&serve_config).await?;
    }

    Ok(())
}

/// Print the post-fetch summary block.
fn print_summary(report: &FetchReport, output: &Path) {
    println!();
    println!("  Fetch complete!");
    println!(
        "  Hosts:     {} succeeded, {} failed",
        report.hosts_succeeded,
        report.hosts_failed.len()
    );
    for (host, message) in &report.hosts_failed {
        println!("    {host}: {message}");
    }
    println!("  Workflows: {}", report.workflow_count());
    if report.discarded > 0 {
        println!("  Discarded: {}", report.discarded);
    }
    println!("  Output:    {}", output.display());
    println!("  Time:      {:.1}s", report.elapsed.as_secs_f64());
    println!();
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// An overall host bar plus per-host spinners under one `MultiProgress`,
/// spinners keyed by host name.
struct CliProgress {
    multi: MultiProgress,
    overall: ProgressBar,
    bars: Mutex<HashMap<String, ProgressBar>>,
}

impl CliProgress {
    fn new(total_hosts: usize) -> Self {
        let multi = MultiProgress::new();
        let overall = multi.add(ProgressBar::new(total_hosts as u64));
        overall.set_style(
            ProgressStyle::default_bar()
                .template("{bar:24.cyan/blue} {pos}/{len} hosts {wide_msg}")
                .unwrap()
                .progress_chars("█▓▒░ "),
        );

        Self {
            multi,
            overall,
            bars: Mutex::new(HashMap::new()),
        }
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
            .template("{prefix:.cyan} {spinner:.blue} {wide_msg}")
            .unwrap()
    }

    fn with_bar(&self, host: &Host, f: impl FnOnce(&ProgressBar)) {
        if let Some(bar) = self.bars.lock().unwrap().get(&host.name) {
            f(bar);
        }
    }
}

impl ProgressReporter for CliProgress {
    fn host_started(&self, host: &Host) {
        let bar = self.multi.add(ProgressBar::new_spinner());
        bar.set_style(Self::spinner_style());
        bar.set_prefix(host.name.clone());
        bar.enable_steady_tick(Duration::from_millis(80));
        bar.set_message("listing workflows");
        self.bars.lock().unwrap().insert(host.name.clone(), bar);
    }

    fn workflow_started(&self, host: &Host, workflow: &WorkflowSummary) {
        self.with_bar(host, |bar| {
            bar.set_message(format!("fetching {}", workflow.name));
        });
    }

    fn workflow_discarded(&self, host: &Host, workflow_id: &str, tool_id: &str) {
        self.with_bar(host, |bar| {
            bar.set_message(format!("discarded {workflow_id} (tool '{tool_id}')"));
        });
    }

    fn host_finished(&self, host: &Host, workflows: usize) {
        self.with_bar(host, |bar| {
            bar.finish_with_message(format!("{workflows} workflows"));
        });
        self.overall.inc(1);
    }

    fn host_failed(&self, host: &Host, message: &str) {
        self.with_bar(host, |bar| {
            bar.abandon_with_message(format!("failed: {message}"));
        });
        self.overall.inc(1);
    }

    fn done(&self, total_workflows: usize) {
        self.overall
            .finish_with_message(format!("{total_workflows} workflows"));
    }
}
