use std::path::Path;

use rand::thread_rng;
use tracing::info;

use ratewire::RatewireError;
use ratewire::chain::{JsonRpcClient, RpcReader};
use ratewire::config::{AppConfig, fetch_config};
use ratewire::export::append_records;
use ratewire::manifest::fetch_manifest;
use ratewire::publish::{Publisher, TwitterPublisher};
use ratewire::rates::YieldSpace;
use ratewire::report::{assemble_report, collect_rates, select_terms};

/// Terms every report leads with, in display order. The rest of the
/// manifest's terms rotate in via random sampling.
const PRIORITY_TERMS: &[&str] = &["dai", "usdc"];

#[tokio::main]
async fn main() -> Result<(), RatewireError> {
    // Initialize tracing subscriber for logging output.
    tracing_subscriber::fmt::init();

    let config = fetch_config()?;
    let mode = std::env::args().nth(1).unwrap_or_else(|| "report".to_string());

    match mode.as_str() {
        "report" => run_report(&config).await,
        "export" => run_export(&config).await,
        other => Err(RatewireError::Config(format!(
            "unknown mode {other:?}, expected \"report\" or \"export\""
        ))),
    }
}

/// One full report run: manifest, selection, assembly, publication.
async fn run_report(config: &AppConfig) -> Result<(), RatewireError> {
    let Some(twitter) = &config.twitter else {
        return Err(RatewireError::Config(
            "report mode needs the TWITTER_* credential variables".to_string(),
        ));
    };

    let http = reqwest::Client::new();
    let manifest = fetch_manifest(&http, &config.manifest_url).await?;

    let selected = select(config, &manifest)?;
    let client = JsonRpcClient::new(http.clone(), config.rpc_url.clone());
    let now = client.latest_block_timestamp().await?;
    let reader = RpcReader::new(client, &manifest);

    let report = assemble_report(&selected, &manifest, &reader, &YieldSpace, now).await?;
    info!(chars = report.chars().count(), "Assembled report");
    println!("{report}");

    let publisher = TwitterPublisher::new(http, twitter.clone());
    publisher.publish(&report).await
}

/// One batch export run: same selection and computation, records appended
/// to the export file instead of published.
async fn run_export(config: &AppConfig) -> Result<(), RatewireError> {
    let http = reqwest::Client::new();
    let manifest = fetch_manifest(&http, &config.manifest_url).await?;

    let selected = select(config, &manifest)?;
    let client = JsonRpcClient::new(http, config.rpc_url.clone());
    let now = client.latest_block_timestamp().await?;
    let reader = RpcReader::new(client, &manifest);

    let records = collect_rates(&selected, &manifest, &reader, &YieldSpace, now).await?;
    append_records(Path::new(&config.export_path), &records)
}

/// Applies the selection policy to the manifest's term set.
fn select(
    config: &AppConfig,
    manifest: &ratewire::manifest::DeploymentManifest,
) -> Result<Vec<String>, RatewireError> {
    let mut remaining: Vec<&str> = manifest
        .tranches
        .keys()
        .map(String::as_str)
        .filter(|key| !PRIORITY_TERMS.contains(key))
        .collect();
    remaining.sort_unstable();

    let sample_count = config.sample_count.min(remaining.len());
    select_terms(PRIORITY_TERMS, &remaining, sample_count, &mut thread_rng())
}
