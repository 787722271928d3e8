//! Application configuration loaded from environment variables.
//!
//! Feed credentials **must** be provided via environment variables:
//! - `TWITTER_CONSUMER_KEY` / `TWITTER_CONSUMER_SECRET`
//! - `TWITTER_ACCESS_TOKEN` / `TWITTER_ACCESS_TOKEN_SECRET`
//!
//! Optional overrides: `RATEWIRE_MANIFEST_URL`, `RATEWIRE_RPC_URL`,
//! `RATEWIRE_SAMPLE_COUNT`, `RATEWIRE_EXPORT_PATH`.
//!
//! The configuration is built exactly once at process start and passed
//! by reference into the collaborators that need it; business logic
//! never reads the environment directly.

use zeroize::Zeroizing;

/// Default URL of the versioned deployment manifest.
const DEFAULT_MANIFEST_URL: &str =
    "https://raw.githubusercontent.com/ratewire/deployments/main/addresses/mainnet.json";

/// Default public Ethereum JSON-RPC endpoint.
const DEFAULT_RPC_URL: &str = "https://cloudflare-eth.com";

/// Default number of non-priority terms sampled into each report.
const DEFAULT_SAMPLE_COUNT: usize = 2;

/// Default path of the batch-export record file.
const DEFAULT_EXPORT_PATH: &str = "values.csv";

/// Top-level application configuration.
#[derive(Debug)]
pub struct AppConfig {
    pub manifest_url: String,
    pub rpc_url: String,
    pub sample_count: usize,
    pub export_path: String,
    /// Present only when all four feed credentials are set.
    pub twitter: Option<TwitterConfig>,
}

/// OAuth 1.0a credentials for the report feed.
#[derive(Clone, Debug)]
pub struct TwitterConfig {
    pub consumer_key: Zeroizing<String>,
    pub consumer_secret: Zeroizing<String>,
    pub access_token: Zeroizing<String>,
    pub access_token_secret: Zeroizing<String>,
}

/// Loads the application configuration from environment variables.
///
/// The manifest, RPC, sample-count, and export-path values all have
/// working defaults. Feed credentials are optional (export mode does not
/// publish) but when any of the four is set all of them must be present.
///
/// # Errors
///
/// Returns [`RatewireError::Config`](crate::RatewireError::Config) if the
/// credential group is only partially set or `RATEWIRE_SAMPLE_COUNT` is
/// not an integer.
pub fn fetch_config() -> crate::Result<AppConfig> {
    let manifest_url =
        non_empty_var("RATEWIRE_MANIFEST_URL").unwrap_or_else(|| DEFAULT_MANIFEST_URL.to_string());
    let rpc_url = non_empty_var("RATEWIRE_RPC_URL").unwrap_or_else(|| DEFAULT_RPC_URL.to_string());
    let export_path =
        non_empty_var("RATEWIRE_EXPORT_PATH").unwrap_or_else(|| DEFAULT_EXPORT_PATH.to_string());

    let sample_count = match non_empty_var("RATEWIRE_SAMPLE_COUNT") {
        Some(raw) => raw.parse::<usize>().map_err(|e| {
            crate::RatewireError::Config(format!("RATEWIRE_SAMPLE_COUNT is not an integer: {e}"))
        })?,
        None => DEFAULT_SAMPLE_COUNT,
    };

    let twitter = twitter_config()?;

    Ok(AppConfig {
        manifest_url,
        rpc_url,
        sample_count,
        export_path,
        twitter,
    })
}

/// Reads the four feed credential variables as an all-or-nothing group.
fn twitter_config() -> crate::Result<Option<TwitterConfig>> {
    const VARS: [&str; 4] = [
        "TWITTER_CONSUMER_KEY",
        "TWITTER_CONSUMER_SECRET",
        "TWITTER_ACCESS_TOKEN",
        "TWITTER_ACCESS_TOKEN_SECRET",
    ];

    let values: Vec<Option<String>> = VARS.iter().map(|v| non_empty_var(v)).collect();

    if values.iter().all(Option::is_none) {
        return Ok(None);
    }
    if let Some(missing) = VARS
        .iter()
        .zip(&values)
        .find_map(|(name, value)| value.is_none().then_some(*name))
    {
        return Err(crate::RatewireError::Config(format!(
            "feed credentials are partially set: {missing} is missing"
        )));
    }

    let mut values = values.into_iter().flatten().map(Zeroizing::new);
    Ok(Some(TwitterConfig {
        consumer_key: values.next().expect("four credential values"),
        consumer_secret: values.next().expect("four credential values"),
        access_token: values.next().expect("four credential values"),
        access_token_secret: values.next().expect("four credential values"),
    }))
}

/// Returns the value of an environment variable if it exists and is non-empty.
fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.is_empty())
}
