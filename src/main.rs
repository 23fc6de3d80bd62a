//! Odds comparison command-line entry point.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use rust_decimal::Decimal;
use serde::Serialize;
use time::OffsetDateTime;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use odds_edge::config::Config;
use odds_edge::engine::{detect_drops, find_opportunities, RankBy};
use odds_edge::metrics;
use odds_edge::normalize::Canonicalizer;
use odds_edge::odds::RawOddsRecord;

/// Compare two bookmakers' odds and find positive-EV prices.
#[derive(Parser, Debug)]
#[command(name = "odds-edge")]
#[command(about = "Cross-book odds normalization and positive-EV detection")]
#[command(version)]
struct Args {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compare a candidate book snapshot against a reference book snapshot.
    Compare {
        /// Reference (sharp) book records, JSON array.
        #[arg(long)]
        reference: PathBuf,

        /// Candidate book records, JSON array.
        #[arg(long)]
        candidate: PathBuf,

        /// Vocabulary JSON file (overrides VOCABULARY_PATH).
        #[arg(long)]
        vocabulary: Option<PathBuf>,

        /// Bankroll for stake sizing (overrides BANKROLL).
        #[arg(long)]
        bankroll: Option<Decimal>,

        /// Kelly divisor (overrides KELLY_DIVISOR).
        #[arg(long)]
        kelly_divisor: Option<Decimal>,

        /// Minimum EV, exclusive (overrides MIN_EV).
        #[arg(long, allow_hyphen_values = true)]
        min_ev: Option<Decimal>,

        /// Ranking: ev or edge (overrides RANK_BY).
        #[arg(long)]
        rank_by: Option<RankBy>,

        /// Print only the first N opportunities.
        #[arg(long)]
        top: Option<usize>,

        /// Print a Prometheus snapshot to stderr after the run.
        #[arg(long)]
        metrics: bool,

        /// Pretty-print the JSON output.
        #[arg(long)]
        pretty: bool,
    },

    /// Report odds that dropped between two snapshots of one book.
    Movement {
        /// Earlier snapshot, JSON array.
        #[arg(long)]
        previous: PathBuf,

        /// Later snapshot, JSON array.
        #[arg(long)]
        current: PathBuf,

        /// Minimum drop in percent (overrides DROP_THRESHOLD_PCT).
        #[arg(long)]
        threshold: Option<Decimal>,

        /// Vocabulary JSON file (overrides VOCABULARY_PATH).
        #[arg(long)]
        vocabulary: Option<PathBuf>,

        /// Pretty-print the JSON output.
        #[arg(long)]
        pretty: bool,
    },

    /// Check configuration and vocabulary validity.
    CheckConfig,
}

/// JSON envelope written to stdout.
#[derive(Serialize)]
struct Output<T: Serialize> {
    #[serde(with = "time::serde::rfc3339")]
    generated_at: OffsetDateTime,
    report: T,
}

fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let args = Args::parse();
    let config = Config::load().context("Configuration load failed")?;

    // Initialize logging; stdout is reserved for the report
    let filter = if args.verbose || config.verbose {
        EnvFilter::new("odds_edge=debug,info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.rust_log))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    match args.command {
        Command::Compare {
            reference,
            candidate,
            vocabulary,
            bankroll,
            kelly_divisor,
            min_ev,
            rank_by,
            top,
            metrics: with_metrics,
            pretty,
        } => {
            let config = Config {
                bankroll: bankroll.unwrap_or(config.bankroll),
                kelly_divisor: kelly_divisor.unwrap_or(config.kelly_divisor),
                min_ev: min_ev.unwrap_or(config.min_ev),
                rank_by: rank_by.unwrap_or(config.rank_by),
                vocabulary_path: path_override(vocabulary, config.vocabulary_path),
                ..config
            };
            cmd_compare(&config, &reference, &candidate, top, with_metrics, pretty)
        }
        Command::Movement {
            previous,
            current,
            threshold,
            vocabulary,
            pretty,
        } => {
            let config = Config {
                drop_threshold_pct: threshold.unwrap_or(config.drop_threshold_pct),
                vocabulary_path: path_override(vocabulary, config.vocabulary_path),
                ..config
            };
            cmd_movement(&config, &previous, &current, pretty)
        }
        Command::CheckConfig => cmd_check_config(&config),
    }
}

fn path_override(arg: Option<PathBuf>, env: Option<String>) -> Option<String> {
    arg.map(|p| p.to_string_lossy().into_owned()).or(env)
}

/// Compare two snapshots and print the report.
fn cmd_compare(
    config: &Config,
    reference: &Path,
    candidate: &Path,
    top: Option<usize>,
    with_metrics: bool,
    pretty: bool,
) -> anyhow::Result<()> {
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Configuration validation failed: {}", e))?;

    let handle = if with_metrics {
        Some(install_metrics()?)
    } else {
        None
    };

    let canonicalizer = load_canonicalizer(config)?;
    let reference = read_records(reference)?;
    let candidate = read_records(candidate)?;

    let mut report = find_opportunities(&reference, &candidate, &canonicalizer, &config.engine_settings());
    if !report.unmapped_labels.is_empty() {
        warn!(
            labels = report.unmapped_labels.len(),
            "Unmapped market labels; extend the vocabulary to cover them"
        );
    }
    if let Some(n) = top {
        report.opportunities.truncate(n);
    }

    print_json(&report, pretty)?;

    if let Some(handle) = handle {
        eprintln!("{}", handle.render());
    }
    Ok(())
}

/// Compare two snapshots of one book and print the drops.
fn cmd_movement(config: &Config, previous: &Path, current: &Path, pretty: bool) -> anyhow::Result<()> {
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Configuration validation failed: {}", e))?;

    let canonicalizer = load_canonicalizer(config)?;
    let previous = read_records(previous)?;
    let current = read_records(current)?;

    let report = detect_drops(&previous, &current, &canonicalizer, config.drop_threshold_pct);
    print_json(&report, pretty)
}

/// Check configuration validity.
fn cmd_check_config(config: &Config) -> anyhow::Result<()> {
    println!("======================================================================");
    println!("ODDS EDGE - CONFIGURATION CHECK");
    println!("======================================================================");

    print!("Validating configuration... ");
    match config.validate() {
        Ok(()) => println!("OK"),
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration validation failed"));
        }
    }

    print!("Loading vocabulary... ");
    let canonicalizer = match load_canonicalizer(config) {
        Ok(c) => {
            println!("OK");
            c
        }
        Err(e) => {
            println!("FAILED");
            println!("  Error: {:#}", e);
            return Err(anyhow::anyhow!("Vocabulary invalid"));
        }
    };

    println!("----------------------------------------------------------------------");
    println!("Configuration Summary:");
    println!("  Bankroll: {}", config.bankroll);
    println!("  Kelly Divisor: {}", config.kelly_divisor);
    println!("  Minimum EV: {}", config.min_ev);
    println!("  Rank By: {}", config.rank_by);
    println!("  Team Token Limit: {}", config.team_token_limit);
    println!("  Drop Threshold: {}%", config.drop_threshold_pct);
    println!(
        "  Vocabulary: {}",
        config.vocabulary_path.as_deref().unwrap_or("bundled")
    );
    println!(
        "  Markets: {} ({} label variants)",
        canonicalizer.markets().markets().len(),
        canonicalizer.markets().variant_count()
    );
    println!("======================================================================");
    println!("CONFIGURATION CHECK PASSED");
    println!("======================================================================");

    Ok(())
}

fn install_metrics() -> anyhow::Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .context("Failed to install metrics recorder")?;
    metrics::init_metrics();
    Ok(handle)
}

fn load_canonicalizer(config: &Config) -> anyhow::Result<Canonicalizer> {
    let canonicalizer = config.canonicalizer().with_context(|| {
        format!(
            "Failed to load vocabulary {}",
            config.vocabulary_path.as_deref().unwrap_or("(bundled)")
        )
    })?;
    info!(
        markets = canonicalizer.markets().markets().len(),
        variants = canonicalizer.markets().variant_count(),
        "Vocabulary loaded"
    );
    Ok(canonicalizer)
}

fn read_records(path: &Path) -> anyhow::Result<Vec<RawOddsRecord>> {
    let text = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let records: Vec<RawOddsRecord> =
        serde_json::from_str(&text).with_context(|| format!("Failed to parse {}", path.display()))?;
    info!(path = %path.display(), records = records.len(), "Snapshot loaded");
    Ok(records)
}

fn print_json<T: Serialize>(report: &T, pretty: bool) -> anyhow::Result<()> {
    let output = Output {
        generated_at: OffsetDateTime::now_utc(),
        report,
    };
    let json = if pretty {
        serde_json::to_string_pretty(&output)?
    } else {
        serde_json::to_string(&output)?
    };
    println!("{}", json);
    Ok(())
}
