//! Crate-level error types.
//!
//! [`RatewireError`] unifies every error source (configuration, HTTP,
//! JSON, RPC, report assembly) behind a single enum so callers can match
//! on the variant they care about while still using the `?` operator for
//! easy propagation.
//!
//! Every variant is fatal to the current run: reports are published
//! all-or-nothing, so nothing here is retried or recovered from.

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, RatewireError>;

/// Top-level error type returned by all public APIs.
#[derive(Debug, thiserror::Error)]
pub enum RatewireError {
    /// Missing or inconsistent configuration: environment variables,
    /// manifest shape, or a selected term with no tranche list.
    #[error("configuration error: {0}")]
    Config(String),

    /// An HTTP request (manifest fetch, RPC transport, publishing) failed.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization or deserialization failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// An `eth_call` round-trip failed or the node returned an error
    /// object. On-chain data is unavailable and the run is aborted.
    #[error("rpc error: {0}")]
    Rpc(String),

    /// Contract return data could not be decoded.
    #[error("abi decoding error: {0}")]
    Abi(String),

    /// The term selector was asked to draw more samples than there are
    /// candidate terms.
    #[error("invalid sample size: requested {requested} of {available} remaining terms")]
    InvalidSampleSize { requested: usize, available: usize },

    /// A term key has no display-name entry. Raised at manifest
    /// validation time so a malformed line can never reach the feed.
    #[error("unknown term: no display name for {0:?}")]
    UnknownTerm(String),

    /// The feed rejected the report.
    #[error("publish error: {0}")]
    Publish(String),

    /// Writing export records failed.
    #[error("io error: {0}")]
    Io(String),
}
