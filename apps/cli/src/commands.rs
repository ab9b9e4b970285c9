//! CLI command definitions, routing, and tracing setup.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tokio_util::sync::CancellationToken;
use tracing::info;
use url::Url;

use debrisscan_core::pipeline::{
    AnalysisReport, AnalyzeConfig, PageSource, ProgressReporter,
};
use debrisscan_shared::{
    AppConfig, CrawlConfig, init_config, load_config, validate_tolerance,
};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// debrisscan — name the owners behind anonymous debris.
#[derive(Parser)]
#[command(
    name = "debrisscan",
    version,
    about = "Resolve anonymized debris entries by crawling the fleets on the surrounding map.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Analyze a debris page and resolve its Unknown rows.
    Analyze {
        /// URL of the debris overview page.
        url: Option<String>,

        /// Read the debris page from a saved HTML file instead of fetching it.
        #[arg(long, conflicts_with = "url")]
        file: Option<PathBuf>,

        /// Base URL for building map/fleet requests when using --file.
        #[arg(long, requires = "file")]
        base_url: Option<String>,

        /// Relative deviation allowed when matching credit values.
        #[arg(long)]
        tolerance: Option<f64>,

        /// Require exact credit equality (same as --tolerance 0).
        #[arg(long, conflicts_with = "tolerance")]
        exact: bool,

        /// Milliseconds to wait between consecutive fleet requests.
        #[arg(long)]
        delay_ms: Option<u64>,

        /// Emit the full report as JSON instead of the summary table.
        #[arg(long)]
        json: bool,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "debrisscan=info",
        1 => "debrisscan=debug",
        _ => "debrisscan=trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Analyze {
            url,
            file,
            base_url,
            tolerance,
            exact,
            delay_ms,
            json,
        } => {
            cmd_analyze(
                url.as_deref(),
                file.as_deref(),
                base_url.as_deref(),
                tolerance,
                exact,
                delay_ms,
                json,
            )
            .await
        }
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show().await,
        },
    }
}

// ---------------------------------------------------------------------------
// analyze
// ---------------------------------------------------------------------------

async fn cmd_analyze(
    url: Option<&str>,
    file: Option<&std::path::Path>,
    base_url: Option<&str>,
    tolerance: Option<f64>,
    exact: bool,
    delay_ms: Option<u64>,
    json: bool,
) -> Result<()> {
    let config = load_config()?;

    let source = match (url, file) {
        (Some(url), None) => {
            let parsed = Url::parse(url).map_err(|e| eyre!("invalid URL '{url}': {e}"))?;
            PageSource::Url(parsed)
        }
        (None, Some(path)) => {
            let base = base_url
                .ok_or_else(|| eyre!("--base-url is required with --file"))?;
            let parsed =
                Url::parse(base).map_err(|e| eyre!("invalid base URL '{base}': {e}"))?;
            PageSource::File {
                path: path.to_path_buf(),
                base_url: parsed,
            }
        }
        _ => return Err(eyre!("provide either a debris page URL or --file")),
    };

    // Flags override config file values, which override defaults.
    let mut crawl_config = CrawlConfig::from(&config);
    if let Some(delay) = delay_ms {
        crawl_config.request_delay_ms = delay;
    }

    let tolerance = if exact {
        0.0
    } else {
        tolerance.unwrap_or(config.correlation.tolerance)
    };
    validate_tolerance(tolerance)?;

    let analyze_config = AnalyzeConfig {
        source,
        crawl: crawl_config,
        tolerance,
    };

    info!(
        tolerance,
        delay_ms = analyze_config.crawl.request_delay_ms,
        "starting debris analysis"
    );

    // Ctrl-C cancels at the next suspension point instead of killing the
    // process mid-request.
    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        });
    }

    let reporter = CliProgress::new();
    let report =
        match debrisscan_core::pipeline::analyze(&analyze_config, &reporter, &cancel).await {
            Ok(report) => report,
            Err(e) => {
                reporter.fail(&format!("Analysis failed: {e}"));
                return Err(e.into());
            }
        };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    print_summary(&report);
    Ok(())
}

fn print_summary(report: &AnalysisReport) {
    println!();
    println!("  Debris field {}", report.coords);
    println!("  Fleets on map:  {}", report.fleets_total);
    println!("  Candidates:     {}", report.candidates.len());
    println!(
        "  Resolved:       {}/{}",
        report.resolved, report.unknown_count
    );
    println!(
        "  Time:           {:.1}s",
        report.elapsed_ms as f64 / 1000.0
    );
    println!();

    for resolution in &report.resolutions {
        match &resolution.owner {
            Some(owner) => println!(
                "  row {:>3}  {:>10} credits  -> {owner}",
                resolution.row, resolution.credits
            ),
            None => println!(
                "  row {:>3}  {:>10} credits  -> (unresolved)",
                resolution.row, resolution.credits
            ),
        }
    }

    if !report.candidates.is_empty() {
        println!();
        println!("  Candidates crawled:");
        for candidate in &report.candidates {
            println!(
                "    fleet {:>8}  {:<20} {:>8} recyclers  {:>10} credits",
                candidate.fleet_id, candidate.owner, candidate.recyclers, candidate.credits
            );
        }
    }

    if !report.diagnostics.is_empty() {
        println!();
        println!("  Diagnostics:");
        for line in &report.diagnostics {
            println!("    {line}");
        }
    }
    println!();
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter: a spinner for the setup phases that turns into a
/// bar sized to the fleet total once the crawl starts.
struct CliProgress {
    bar: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap()
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        bar.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { bar }
    }

    fn fail(&self, message: &str) {
        self.bar.abandon_with_message(message.to_string());
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.bar.set_message(name.to_string());
    }

    fn fleet_processed(&self, processed: usize, total: usize) {
        if self.bar.length() != Some(total as u64) {
            self.bar.set_style(
                ProgressStyle::with_template(
                    "{bar:30.cyan} {pos}/{len} fleets ({percent}%)",
                )
                .unwrap(),
            );
            self.bar.set_length(total as u64);
        }
        self.bar.set_position(processed as u64);
    }

    fn done(&self, _report: &AnalysisReport) {
        self.bar.finish_and_clear();
    }
}

// ---------------------------------------------------------------------------
// config
// ---------------------------------------------------------------------------

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}
