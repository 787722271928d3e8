//! Deployment manifest loading and validation.
//!
//! The manifest is a versioned JSON document, hosted with the deployment
//! artifacts, that maps each term key to its tranche list plus the shared
//! addresses (vault, base-asset tokens). It is fetched fresh once per run
//! and never cached: tranche lists change with every deployment round.
//!
//! Validation happens at load time so that every selected key is
//! guaranteed renderable before any on-chain read or formatting starts.

use std::collections::HashMap;

use serde::Deserialize;
use tracing::info;

use crate::report::display_name;

/// The deployed address book for one network.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentManifest {
    /// Balancer vault holding every principal-token pool's reserves.
    pub balancer_vault: String,
    /// Base-asset token address per term key.
    #[serde(default)]
    pub tokens: HashMap<String, String>,
    /// Tranche lists per term key, each in maturity order.
    pub tranches: HashMap<String, Vec<Tranche>>,
}

/// One fixed-maturity market of a term.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tranche {
    /// Principal-token contract address.
    pub address: String,
    /// Expiry timestamp recorded at deployment. The live value is read
    /// from the pool contract; this one is informational.
    pub expiration: i64,
    /// The paired principal-token trading pool.
    pub pt_pool: PtPool,
}

/// A principal-token pool registered with the vault.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PtPool {
    pub address: String,
    /// Vault-level pool identifier (32-byte hex string).
    pub pool_id: String,
}

impl DeploymentManifest {
    /// Checks that every term key in the manifest is renderable and has a
    /// base-asset token entry.
    ///
    /// # Errors
    ///
    /// Returns [`RatewireError::UnknownTerm`](crate::RatewireError::UnknownTerm)
    /// for a key without a display name, or
    /// [`RatewireError::Config`](crate::RatewireError::Config) for a key
    /// without a base-asset address.
    pub fn validate(&self) -> crate::Result<()> {
        for key in self.tranches.keys() {
            display_name(key)?;
            if !self.tokens.contains_key(key) {
                return Err(crate::RatewireError::Config(format!(
                    "no base asset token for term {key:?}"
                )));
            }
        }
        Ok(())
    }
}

/// Fetches and validates the deployment manifest.
///
/// # Errors
///
/// Returns an error if the request fails, the document does not parse,
/// or validation rejects it.
pub async fn fetch_manifest(
    http: &reqwest::Client,
    url: &str,
) -> crate::Result<DeploymentManifest> {
    let response = http.get(url).send().await?.error_for_status()?;
    let manifest: DeploymentManifest = response.json().await?;
    manifest.validate()?;

    info!(
        url = %url,
        terms = manifest.tranches.len(),
        "Loaded deployment manifest"
    );
    Ok(manifest)
}
