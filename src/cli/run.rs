//! Benchmark run commands.

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;

use crate::provision::{RequestHeaderSet, UrlBatch, DEFAULT_BASE_RESOURCES};
use crate::report::{RunSummary, Throughput};
use crate::strategy::{
    MultiplexedStrategy, PooledConfig, PooledIsolated, PooledShared, SpawnPerRequest,
    StrategyKind, TransportStrategy,
};

use super::CliError;

/// Maximum allowed worker bound; higher values only risk resource
/// exhaustion without adding comparison value.
const MAX_WORKER_LIMIT: usize = 1024;

/// Parse and validate the worker bound.
fn parse_max_workers(s: &str) -> Result<usize, String> {
    let value: usize = s
        .parse()
        .map_err(|_| format!("'{s}' is not a valid number"))?;

    if value == 0 {
        return Err("max-workers must be at least 1".to_string());
    }
    if value > MAX_WORKER_LIMIT {
        return Err(format!(
            "max-workers {value} exceeds maximum of {MAX_WORKER_LIMIT}"
        ));
    }
    Ok(value)
}

/// Tile Fetch Bench CLI
#[derive(Parser, Debug)]
#[command(name = "tile-fetch-bench")]
#[command(about = "Benchmark batched tile downloads under different concurrency strategies", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Session credential string appended to every URL as its query string.
    ///
    /// Treated as an opaque token; an empty or invalid credential is not
    /// rejected up front and instead surfaces as fetch failures.
    #[arg(long, global = true, default_value = "")]
    pub session: String,

    /// Bearer token for the Authorization header
    #[arg(long, global = true)]
    pub bearer_token: Option<String>,

    /// Base resource URL, repeatable. Defaults to the standard tile-metadata set.
    #[arg(long = "url", global = true)]
    pub urls: Vec<String>,

    /// Bound on concurrent in-flight requests for the pooled strategies
    /// (default: 100, max: 1024). Never exceeds the batch size.
    #[arg(long, global = true, default_value = "100", value_parser = parse_max_workers)]
    pub max_workers: usize,

    /// Emit the summary as JSON instead of the human-readable report
    #[arg(long, global = true, default_value_t = false)]
    pub json: bool,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run one strategy against the URL batch
    Run(RunArgs),
    /// Run all four strategies sequentially against the same batch
    Compare(CompareArgs),
}

/// Arguments for a single-strategy run
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Strategy: multiplexed, spawn, pooled-shared, or pooled-isolated
    #[arg(long)]
    pub strategy: StrategyKind,
}

/// Arguments for the comparison run
#[derive(Parser, Debug)]
pub struct CompareArgs {}

/// JSON form of one run's results.
#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    strategy: &'a str,
    #[serde(flatten)]
    summary: &'a RunSummary,
    /// None when throughput is undefined (zero elapsed time)
    throughput: Option<Throughput>,
}

/// Build the provisioned inputs shared by both commands.
fn provision(cli: &Cli) -> (UrlBatch, RequestHeaderSet) {
    let headers = RequestHeaderSet::standard(cli.bearer_token.as_deref().unwrap_or(""));
    let batch = if cli.urls.is_empty() {
        UrlBatch::build(&DEFAULT_BASE_RESOURCES, &cli.session)
    } else {
        UrlBatch::build(&cli.urls, &cli.session)
    };
    (batch, headers)
}

/// Instantiate the selected strategy.
fn build_strategy(kind: StrategyKind, max_workers: usize) -> Box<dyn TransportStrategy> {
    let config = PooledConfig {
        max_workers,
        request_timeout: None,
    };
    match kind {
        StrategyKind::Multiplexed => Box::new(MultiplexedStrategy::new()),
        StrategyKind::SpawnPerRequest => Box::new(SpawnPerRequest::new()),
        StrategyKind::PooledShared => Box::new(PooledShared::new(config)),
        StrategyKind::PooledIsolated => Box::new(PooledIsolated::new(config)),
    }
}

/// Execute one strategy and print its report.
async fn run_one(
    kind: StrategyKind,
    batch: &UrlBatch,
    headers: &RequestHeaderSet,
    max_workers: usize,
    json: bool,
) -> Result<(), CliError> {
    let strategy = build_strategy(kind, max_workers);
    info!(strategy = %kind, urls = batch.len(), "starting benchmark run");

    let summary = strategy.execute(batch, headers).await?;

    if json {
        let report = JsonReport {
            strategy: strategy.name(),
            summary: &summary,
            throughput: summary.throughput().ok(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", summary.render(&strategy.describe(batch, headers)));
    }
    Ok(())
}

impl RunArgs {
    /// Execute a single-strategy benchmark run.
    pub async fn execute(&self, cli: &Cli) -> Result<(), CliError> {
        let (batch, headers) = provision(cli);
        run_one(self.strategy, &batch, &headers, cli.max_workers, cli.json).await
    }
}

impl CompareArgs {
    /// Execute every strategy sequentially against the same batch.
    pub async fn execute(&self, cli: &Cli) -> Result<(), CliError> {
        let (batch, headers) = provision(cli);
        for kind in StrategyKind::ALL {
            if !cli.json {
                println!("=== strategy: {kind} ===");
            }
            run_one(kind, &batch, &headers, cli.max_workers, cli.json).await?;
            if !cli.json {
                println!();
            }
        }
        Ok(())
    }
}
