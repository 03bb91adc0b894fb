//! LinkGuard - explainable URL risk verdicts
//!
//! A CLI tool that checks a link against local heuristics and several
//! threat-intelligence feeds, then reconciles everything into one
//! safe / suspect / malicious verdict with the reasons behind it.
//!
//! Exit codes:
//!   0 - Success (verdict below --fail-on, or no --fail-on set)
//!   1 - Runtime error (bad config, unwritable report, etc.)
//!   2 - Verdict at or above the --fail-on level

mod analysis;
mod cli;
mod config;
mod error;
mod heuristics;
mod models;
mod report;
mod sources;

use anyhow::{Context, Result};
use chrono::Utc;
use cli::Args;
use config::{Config, CONFIG_FILE};
use indicatif::{ProgressBar, ProgressStyle};
use models::{Report, ReportMetadata, Score, SignalVerdict, SourceId};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // The config file can turn on verbose logging, so it is read first
    let loaded = load_config(&args);
    let config_verbose = matches!(&loaded, Ok((config, _)) if config.general.verbose);
    init_logging(&args, config_verbose);

    info!("LinkGuard v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: url={:?} sources={:?}", args.url, args.sources);

    match run_check(args, loaded).await {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Check failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .linkguard.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(CONFIG_FILE);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            CONFIG_FILE
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE);
    println!("   API keys are read from VT_API_KEY, GSB_API_KEY, OTX_API_KEY and URLHAUS_AUTH_KEY.");
    Ok(())
}

/// Initialize logging based on verbosity settings. `RUST_LOG` wins when set.
fn init_logging(args: &Args, config_verbose: bool) {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(args.log_level(config_verbose)).into())
        .from_env_lossy();

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Run the complete check. Returns exit code (0 or 2).
async fn run_check(args: Args, loaded: Result<(Config, ConfigOrigin)>) -> Result<i32> {
    let start_time = Instant::now();

    let (mut config, origin) = loaded?;
    origin.log();
    config.merge_with_args(&args);

    let url = args.target_url().trim().to_string();
    if url::Url::parse(&url).is_err() {
        warn!("'{}' is not a valid absolute URL; heuristics will run on the raw text", url);
    }

    let enabled = config.enabled_sources()?;

    if args.dry_run {
        return handle_dry_run(&url, &enabled, &config);
    }

    if !args.quiet {
        println!("🔎 Checking {}", url);
    }

    let client = sources::SourceClient::new(&config.sources, config.credentials.clone())?;

    let spinner = lookup_spinner(args.quiet, enabled.len());
    let assessment = client.analyze(&enabled, &url).await;
    spinner.finish_and_clear();
    let assessment = assessment?;
    let verdict = assessment.verdict.clone();
    info!("Verdict for {}: {}", url, verdict.score);

    let unavailable = assessment
        .signals
        .iter()
        .filter(|s| s.verdict == SignalVerdict::Unavailable)
        .count();

    let report = Report {
        metadata: ReportMetadata {
            url: url.clone(),
            host: heuristics::extract_host(&url),
            analysis_date: Utc::now(),
            sources_queried: enabled.len(),
            sources_unavailable: unavailable,
            duration_seconds: start_time.elapsed().as_secs_f64(),
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
        },
        heuristics: assessment.heuristics,
        signals: assessment.signals,
        verdict,
    };

    if let Some(ref path) = config.general.output {
        let output = report::render(&report, config.general.format)?;
        std::fs::write(path, &output)
            .with_context(|| format!("Failed to write report to {}", path))?;
        info!("Report saved to {}", path);
    }

    print_summary(&report, args.quiet);

    if let Some(fail_level) = args.fail_on {
        let threshold = Score::from(fail_level);
        if analysis::at_or_above(&report.verdict, threshold) {
            eprintln!(
                "\n⛔ Verdict is {} (at or above {}). Failing (exit code 2).",
                report.verdict.score, threshold
            );
            return Ok(2);
        }
    }

    Ok(0)
}

/// Spinner shown while lookups are in flight.
fn lookup_spinner(quiet: bool, sources: usize) -> ProgressBar {
    if quiet || sources == 0 {
        return ProgressBar::hidden();
    }

    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(format!("Querying {} threat-intelligence sources...", sources));
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

fn print_summary(report: &Report, quiet: bool) {
    let verdict = &report.verdict;

    if quiet {
        println!("{}", verdict.score);
        return;
    }

    println!("\n📊 Sources:");
    if report.signals.is_empty() {
        println!("   (none queried)");
    }
    for signal in &report.signals {
        println!(
            "   {} {:<22} {}",
            signal.verdict.emoji(),
            signal.source.to_string(),
            signal.rationale
        );
    }

    println!(
        "\n{} Verdict: {}",
        verdict.score.emoji(),
        verdict.score.to_string().to_uppercase()
    );
    for reason in &verdict.reasons {
        println!("   - {}", reason);
    }
}

/// Handle --dry-run: run heuristics, show which sources would be queried, exit.
fn handle_dry_run(url: &str, enabled: &[SourceId], config: &Config) -> Result<i32> {
    println!("\n🔍 Dry run: heuristics only (no source lookups)...\n");

    for h in heuristics::evaluate(url) {
        let mark = if h.matched { "✅" } else { "❌" };
        println!("   {} {:<20} {}", mark, h.rule, h.details);
    }

    println!("\n   Sources that would be queried:");
    if enabled.is_empty() {
        println!("     (none)");
    }
    for source in enabled {
        let credential = if config.credentials.get(*source).is_some() {
            "credential set".to_string()
        } else {
            format!("no credential ({} not set)", source.credential_env())
        };
        println!("     • {:<22} {}", source.to_string(), credential);
    }

    println!("\n✅ Dry run complete. No lookups were made.");
    Ok(0)
}

/// Where the configuration came from. Loading happens before logging is
/// initialized, so this is reported afterwards.
enum ConfigOrigin {
    Explicit(PathBuf),
    DefaultFile,
    Builtin,
    BrokenDefault(anyhow::Error),
}

impl ConfigOrigin {
    fn log(&self) {
        match self {
            ConfigOrigin::Explicit(path) => info!("Loaded config from: {}", path.display()),
            ConfigOrigin::DefaultFile => info!("Loaded default config from {}", CONFIG_FILE),
            ConfigOrigin::Builtin => debug!("No config file found, using defaults"),
            ConfigOrigin::BrokenDefault(e) => warn!("Failed to load config: {:#}", e),
        }
    }
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<(Config, ConfigOrigin)> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        let config = Config::load(config_path)?;
        return Ok((config, ConfigOrigin::Explicit(config_path.clone())));
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => Ok((config, ConfigOrigin::DefaultFile)),
        Ok(None) => Ok((Config::default(), ConfigOrigin::Builtin)),
        Err(e) => Ok((Config::default(), ConfigOrigin::BrokenDefault(e))),
    }
}
