//! nomis-cli: score wallets from pre-fetched chain activity.
//!
//! Reads one wallet activity bundle (or a JSON array of them) and prints the
//! assembled statistics, score and per-category breakdown as JSON.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};
use nomis_core::ScoringCalculationModel;
use nomis_core::types::WalletActivity;
use nomis_scoring::{Category, profile};
use nomis_service::{MemorySnapshotStore, MemoryStatsCache, RequestOptions, ScoringService, ServiceConfig};
use nomis_stats::TokenBalanceEnricher;
use tracing::{debug, info};

/// Wallet statistics and scoring.
#[derive(Parser)]
#[command(name = "nomis-cli")]
#[command(version, about = "Score wallets from their on-chain activity")]
struct Cli {
    /// Configuration file (default: <config dir>/nomis/config.toml when present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Log output format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogFormat {
    /// Human-readable lines
    Text,
    /// One JSON object per event, fields flattened
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Score wallet activity read from a JSON file.
    Score(ScoreArgs),
    /// List scoring models and their category weights.
    Models,
    /// Print the effective configuration.
    Config,
}

#[derive(Args)]
struct ScoreArgs {
    /// Activity JSON: one object or an array of objects. `-` reads stdin.
    #[arg(short, long)]
    input: PathBuf,

    /// Scoring model (default: the configured model).
    #[arg(short, long)]
    model: Option<ScoringCalculationModel>,

    /// Reference time as RFC 3339 (default: now).
    #[arg(long)]
    now: Option<DateTime<Utc>>,

    /// Bypass the stats cache.
    #[arg(long)]
    no_cache: bool,

    /// Print only the score instead of the full result.
    #[arg(long)]
    score_only: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level, cli.log_format);

    let config = load_config(cli.config.as_deref())?;
    match cli.command {
        Commands::Score(args) => score(config, args),
        Commands::Models => {
            print_models();
            Ok(())
        }
        Commands::Config => {
            println!("{}", serde_json::to_string_pretty(&config)?);
            Ok(())
        }
    }
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir()
        .map(|d| d.join("nomis").join("config.toml"))
        .filter(|p| p.is_file())
}

fn load_config(explicit: Option<&Path>) -> Result<ServiceConfig> {
    let path = explicit.map(Path::to_path_buf).or_else(default_config_path);
    if let Some(p) = &path {
        debug!(path = %p.display(), "loading config");
    }
    ServiceConfig::load(path.as_deref()).context("failed to load configuration")
}

fn read_activities(input: &Path) -> Result<Vec<WalletActivity>> {
    let raw = if input == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf).context("failed to read stdin")?;
        buf
    } else {
        std::fs::read_to_string(input).with_context(|| format!("failed to read {}", input.display()))?
    };

    let value: serde_json::Value = serde_json::from_str(&raw).context("input is not valid JSON")?;
    let activities = if value.is_array() {
        serde_json::from_value(value).context("invalid wallet activity list")?
    } else {
        vec![serde_json::from_value(value).context("invalid wallet activity")?]
    };
    Ok(activities)
}

fn score(config: ServiceConfig, args: ScoreArgs) -> Result<()> {
    let activities = read_activities(&args.input)?;
    if activities.is_empty() {
        bail!("no wallet activity in {}", args.input.display());
    }

    let service = ScoringService::new(
        config,
        TokenBalanceEnricher::offline(),
        Arc::new(MemoryStatsCache::new()),
        Arc::new(MemorySnapshotStore::new()),
    );
    let now = args.now.unwrap_or_else(Utc::now);
    let options = RequestOptions {
        disable_cache: args.no_cache,
    };

    let mut results = Vec::with_capacity(activities.len());
    for activity in &activities {
        let scored = service
            .score_wallet(activity, args.model, now, options)
            .with_context(|| format!("failed to score {}", activity.address))?;
        info!(wallet = %activity.address, chain = activity.chain_id, score = %scored.score, "scored");
        results.push(scored);
    }

    if args.score_only {
        for scored in &results {
            println!("{}\t{}\t{}", scored.stats.address, scored.model, scored.score);
        }
        return Ok(());
    }

    let out = match results.as_slice() {
        [single] => serde_json::to_string_pretty(single)?,
        many => serde_json::to_string_pretty(many)?,
    };
    println!("{out}");
    Ok(())
}

fn print_models() {
    print!("{:<4} {:<16}", "id", "model");
    for category in Category::ALL {
        print!(" {:>9}", short_name(category));
    }
    println!();

    for model in ScoringCalculationModel::ALL {
        let p = profile(model);
        print!("{:<4} {:<16}", model.id(), model.name());
        for category in Category::ALL {
            print!(" {:>9}", p.weight(category));
        }
        println!();
    }
}

fn short_name(category: Category) -> &'static str {
    match category {
        Category::Balance => "balance",
        Category::Turnover => "turnover",
        Category::WalletAge => "age",
        Category::Transactions => "txs",
        Category::RecentActivity => "recent",
        Category::DeployedContracts => "deployed",
        Category::TokensHolding => "tokens",
        Category::Nft => "nft",
    }
}

/// Route tracing to stderr so stdout carries only results.
///
/// `RUST_LOG` wins over `--log-level` when set.
fn init_logging(level: &str, format: LogFormat) {
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let (text, json) = match format {
        LogFormat::Text => (Some(fmt::layer().with_writer(std::io::stderr)), None),
        LogFormat::Json => (
            None,
            Some(fmt::layer().json().flatten_event(true).with_writer(std::io::stderr)),
        ),
    };
    tracing_subscriber::registry().with(filter).with(text).with(json).init();
}
