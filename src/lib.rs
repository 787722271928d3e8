//! Fixed rate reporting engine for on-chain principal token markets.
//!
//! Once per run the engine fetches the current deployment manifest,
//! selects a set of terms (a fixed priority prefix plus a random sample
//! of the rest), reads each term's pool state over JSON-RPC, derives the
//! implied fixed APR, and assembles a line-per-term report that is posted
//! to the configured feed. A batch export mode writes raw `key,apr`
//! records to a CSV file instead of publishing.

pub mod chain;
pub mod config;
pub mod error;
pub mod export;
pub mod manifest;
pub mod publish;
pub mod rates;
pub mod report;

pub use error::{RatewireError, Result};
