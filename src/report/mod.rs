//! The report generation engine.
//!
//! This module is organized by concern:
//! - [`selector`] - Which terms appear in a given report
//! - [`assembler`] - Per-term rate lines and final report text
//!
//! Everything here is deterministic given its inputs; the only source of
//! randomness is the `Rng` handed to [`select_terms`].

mod assembler;
mod selector;

pub use assembler::{assemble_report, collect_rates};
pub use selector::select_terms;

/// Returns the presentation alias for a term key.
///
/// The table is total over every key the deployment manifest may carry;
/// [`DeploymentManifest::validate`](crate::manifest::DeploymentManifest::validate)
/// checks this at load time so a missing entry can never surface
/// mid-report.
///
/// # Errors
///
/// Returns [`RatewireError::UnknownTerm`](crate::RatewireError::UnknownTerm)
/// for a key with no entry.
pub fn display_name(key: &str) -> crate::Result<&'static str> {
    let name = match key {
        "dai" => "DAI",
        "usdc" => "USDC",
        "stecrv" => "crvSTETH",
        "lusd3crv-f" => "crvLUSD",
        "crvtricrypto" => "crvTriCrypto",
        "crv3crypto" => "crv3Crypto",
        _ => return Err(crate::RatewireError::UnknownTerm(key.to_string())),
    };
    Ok(name)
}
