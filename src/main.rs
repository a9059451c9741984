mod cache;
mod config;
mod currency;
mod error;
mod grading;
mod oracle;
mod output;
mod server;
mod sources;
mod types;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use crate::currency::FxRates;
use crate::types::{CardQuery, GradingInfo, LookupRequest};

#[derive(Parser, Debug)]
#[command(
    name = "tcg-price-oracle",
    about = "Look up card prices from per-game providers, normalize to EUR, estimate graded values, and cache results"
)]
struct Args {
    /// Path to config YAML file
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Bind address override for serve mode
    #[arg(short, long)]
    bind: Option<String>,

    /// Look up a single card and exit instead of serving HTTP
    #[arg(long)]
    card: Option<String>,

    /// Set name to narrow the card search
    #[arg(long)]
    set: Option<String>,

    /// Collector number to narrow the card search
    #[arg(long)]
    number: Option<String>,

    /// Game to query: pokemon, yugioh, or magic
    #[arg(short, long, default_value = "pokemon")]
    game: String,

    /// Grading company (PSA, BGS, CGC, SGC); requires --grade
    #[arg(long, requires = "grade")]
    grading_company: Option<String>,

    /// Numeric grade, e.g. 9.5; requires --grading-company
    #[arg(long, requires = "grading_company")]
    grade: Option<String>,

    /// Output format for --card: "table" (default) or "json"
    #[arg(short, long, default_value = "table")]
    output: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let cfg = config::Config::load(&args.config)
        .with_context(|| format!("loading config from {}", args.config.display()))?;

    let fx = FxRates::new(cfg.usd_to_eur);

    let pokemon_key = std::env::var("POKEMON_TCG_API_KEY").ok();
    let client = reqwest::Client::builder()
        .user_agent("tcg-price-oracle/0.1")
        .timeout(Duration::from_secs(cfg.request_timeout_secs))
        .build()
        .context("building HTTP client")?;

    let registry = sources::SourceRegistry::new(client, &cfg.providers, fx, pokemon_key);
    info!("Registered {} price source(s)", registry.source_count());

    let cache = Arc::new(cache::MemoryCache::new(cfg.cache_ttl_hours));
    let oracle = Arc::new(oracle::PriceOracle::new(registry, cache));

    if let Some(card) = args.card {
        let grading = match (args.grading_company, args.grade) {
            (Some(company), Some(grade)) => Some(GradingInfo { company, grade }),
            _ => None,
        };
        let query = CardQuery::from_request(LookupRequest {
            card_name: card,
            set_name: args.set,
            card_number: args.number,
            game: args.game,
            grading,
        })?;

        let result = oracle.lookup(&query).await?;
        match args.output.as_str() {
            "json" => output::print_json(&result)?,
            _ => output::print_result(&result),
        }
        return Ok(());
    }

    let bind = args.bind.unwrap_or(cfg.bind);
    server::serve(oracle, &bind).await
}
