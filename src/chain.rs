//! On-chain pool state access over JSON-RPC.
//!
//! A thin `eth_call` wrapper: typed contract bindings for the handful of
//! view functions the report needs, a [`JsonRpcClient`] speaking JSON-RPC
//! 2.0 over HTTPS, and the [`InstrumentReader`] trait the assembler
//! consumes. No retries live here; an unavailable node fails the run.

use std::collections::HashMap;

use alloy_primitives::{Address, B256};
use alloy_sol_types::{SolCall, sol};
use tracing::debug;

use crate::manifest::{DeploymentManifest, Tranche};

sol!(
    // ERC20 / pool share surface
    function totalSupply() external view returns (uint256);
    function decimals() external view returns (uint8);

    // Principal-token pool parameters
    function expiration() external view returns (uint256);
    function unitSeconds() external view returns (uint256);

    // Vault reserves lookup
    function getPoolTokens(bytes32 poolId) external view returns (address[] memory tokens, uint256[] memory balances, uint256 lastChangeBlock);
);

/// A point-in-time snapshot of one tranche's pool state.
///
/// Produced per tranche, per run. Never cached: reserves and supply are
/// live values.
#[derive(Debug, Clone, Copy)]
pub struct Reading {
    /// Base-asset reserves, in the asset's native fixed point.
    pub base_reserves: u128,
    /// Principal-token reserves, 18-decimal fixed point.
    pub pt_reserves: u128,
    /// Pool share supply, 18-decimal fixed point.
    pub total_supply: u128,
    /// Decimal precision of the base asset.
    pub base_decimals: u8,
    /// Seconds until the tranche expires; negative once past expiry.
    pub seconds_remaining: i64,
    /// The pool's time-stretch basis in seconds.
    pub unit_seconds: i64,
}

/// Source of per-tranche readings.
///
/// The production implementation is [`RpcReader`]; tests substitute
/// canned snapshots.
#[allow(async_fn_in_trait)]
pub trait InstrumentReader {
    /// Returns the current reading for `tranche` of the given term.
    async fn reading(&self, term_key: &str, tranche: &Tranche, now: i64) -> crate::Result<Reading>;
}

/// Minimal JSON-RPC 2.0 client for `eth_call` queries.
pub struct JsonRpcClient {
    http: reqwest::Client,
    url: String,
}

impl JsonRpcClient {
    pub fn new(http: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            http,
            url: url.into(),
        }
    }

    /// Executes `eth_call` against the latest block and returns the raw
    /// return data.
    ///
    /// # Errors
    ///
    /// Returns [`RatewireError::Rpc`](crate::RatewireError::Rpc) if the
    /// node reports an error or the result field is missing, and
    /// [`RatewireError::Abi`](crate::RatewireError::Abi) if the result is
    /// not valid hex.
    pub async fn eth_call(&self, to: &str, data: &[u8]) -> crate::Result<Vec<u8>> {
        let response = self
            .http
            .post(&self.url)
            .json(&call_body(to, data))
            .send()
            .await?
            .error_for_status()?;
        let body: serde_json::Value = response.json().await?;

        if let Some(error) = body.get("error") {
            return Err(crate::RatewireError::Rpc(format!(
                "eth_call to {to} failed: {error}"
            )));
        }
        let result = body["result"].as_str().ok_or_else(|| {
            crate::RatewireError::Rpc(format!("eth_call to {to} returned no result"))
        })?;

        hex::decode(result.trim_start_matches("0x"))
            .map_err(|e| crate::RatewireError::Abi(format!("result is not hex: {e}")))
    }

    /// Returns the timestamp of the latest block.
    ///
    /// # Errors
    ///
    /// Returns [`RatewireError::Rpc`](crate::RatewireError::Rpc) if the
    /// node reports an error or returns a malformed block.
    pub async fn latest_block_timestamp(&self) -> crate::Result<i64> {
        let body = serde_json::json!({
            "id": 1,
            "jsonrpc": "2.0",
            "method": "eth_getBlockByNumber",
            "params": ["latest", false],
        });
        let response = self
            .http
            .post(&self.url)
            .json(&body)
            .send()
            .await?
            .error_for_status()?;
        let body: serde_json::Value = response.json().await?;

        if let Some(error) = body.get("error") {
            return Err(crate::RatewireError::Rpc(format!(
                "eth_getBlockByNumber failed: {error}"
            )));
        }
        let timestamp = body["result"]["timestamp"]
            .as_str()
            .ok_or_else(|| crate::RatewireError::Rpc("block has no timestamp".to_string()))?;

        i64::from_str_radix(timestamp.trim_start_matches("0x"), 16)
            .map_err(|e| crate::RatewireError::Rpc(format!("malformed block timestamp: {e}")))
    }
}

/// Builds the JSON-RPC request body for an `eth_call` against `latest`.
fn call_body(to: &str, data: &[u8]) -> serde_json::Value {
    serde_json::json!({
        "id": 1,
        "jsonrpc": "2.0",
        "method": "eth_call",
        "params": [
            { "to": to, "data": format!("0x{}", hex::encode(data)) },
            "latest"
        ],
    })
}

/// [`InstrumentReader`] backed by a JSON-RPC node and the run's manifest.
pub struct RpcReader {
    client: JsonRpcClient,
    vault: String,
    tokens: HashMap<String, String>,
}

impl RpcReader {
    pub fn new(client: JsonRpcClient, manifest: &DeploymentManifest) -> Self {
        Self {
            client,
            vault: manifest.balancer_vault.clone(),
            tokens: manifest.tokens.clone(),
        }
    }

    /// Executes a typed view call and decodes its return struct.
    async fn call<C: SolCall>(&self, to: &str, call: C) -> crate::Result<C::Return> {
        let data = self.client.eth_call(to, &call.abi_encode()).await?;
        C::abi_decode_returns(&data, false).map_err(|e| {
            crate::RatewireError::Abi(format!("{} returned undecodable data: {e}", C::SIGNATURE))
        })
    }

    /// Base-asset token address for a term key.
    fn base_asset(&self, term_key: &str) -> crate::Result<Address> {
        let raw = self.tokens.get(term_key).ok_or_else(|| {
            crate::RatewireError::Config(format!("no base asset token for term {term_key:?}"))
        })?;
        parse_address(raw)
    }

    /// Seconds until the pool's on-chain expiry, relative to `now`.
    async fn expiry_seconds(&self, pool: &str, now: i64) -> crate::Result<i64> {
        let expiration = to_i64(self.call(pool, expirationCall {}).await?._0, "expiration")?;
        Ok(expiration - now)
    }
}

impl InstrumentReader for RpcReader {
    async fn reading(&self, term_key: &str, tranche: &Tranche, now: i64) -> crate::Result<Reading> {
        let pool = tranche.pt_pool.address.as_str();

        let seconds_remaining = self.expiry_seconds(pool, now).await?;
        let unit_seconds = to_i64(self.call(pool, unitSecondsCall {}).await?._0, "unitSeconds")?;
        let total_supply = to_u128(self.call(pool, totalSupplyCall {}).await?._0, "totalSupply")?;

        let base = self.base_asset(term_key)?;
        let pool_id = parse_pool_id(&tranche.pt_pool.pool_id)?;
        let reserves = self
            .call(self.vault.as_str(), getPoolTokensCall { poolId: pool_id })
            .await?;
        if reserves.tokens.len() < 2 || reserves.balances.len() < 2 {
            return Err(crate::RatewireError::Abi(format!(
                "pool {pool} has fewer than two registered tokens"
            )));
        }

        // The vault orders tokens by address, so the base asset can land
        // on either side.
        let base_index = usize::from(reserves.tokens[0] != base);
        let pt_index = 1 - base_index;

        let base_reserves = to_u128(reserves.balances[base_index], "base reserves")?;
        let pt_reserves = to_u128(reserves.balances[pt_index], "pt reserves")?;
        let base_decimals = self
            .call(&reserves.tokens[base_index].to_string(), decimalsCall {})
            .await?
            ._0;

        debug!(
            term = term_key,
            pool = pool,
            seconds_remaining,
            base_reserves,
            pt_reserves,
            "Read pool state"
        );

        Ok(Reading {
            base_reserves,
            pt_reserves,
            total_supply,
            base_decimals,
            seconds_remaining,
            unit_seconds,
        })
    }
}

fn parse_address(raw: &str) -> crate::Result<Address> {
    raw.parse::<Address>()
        .map_err(|e| crate::RatewireError::Config(format!("invalid address {raw:?}: {e}")))
}

fn parse_pool_id(raw: &str) -> crate::Result<B256> {
    raw.parse::<B256>()
        .map_err(|e| crate::RatewireError::Config(format!("invalid pool id {raw:?}: {e}")))
}

fn to_u128(value: alloy_primitives::U256, what: &str) -> crate::Result<u128> {
    u128::try_from(value)
        .map_err(|_| crate::RatewireError::Abi(format!("{what} exceeds the u128 range")))
}

fn to_i64(value: alloy_primitives::U256, what: &str) -> crate::Result<i64> {
    u64::try_from(value)
        .ok()
        .and_then(|raw| i64::try_from(raw).ok())
        .ok_or_else(|| crate::RatewireError::Abi(format!("{what} exceeds the i64 range")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::U256;

    #[test]
    fn bindings_use_canonical_selectors() {
        assert_eq!(totalSupplyCall::SELECTOR, [0x18, 0x16, 0x0d, 0xdd]);
        assert_eq!(decimalsCall::SELECTOR, [0x31, 0x3c, 0xe5, 0x67]);
    }

    #[test]
    fn encoded_call_starts_with_selector() {
        let data = totalSupplyCall {}.abi_encode();
        assert_eq!(data[..4], totalSupplyCall::SELECTOR);
        assert_eq!(data.len(), 4);
    }

    #[test]
    fn decodes_uint256_return() {
        let mut data = [0u8; 32];
        data[30] = 0x03;
        data[31] = 0xe8;
        let decoded = totalSupplyCall::abi_decode_returns(&data, false).unwrap();
        assert_eq!(decoded._0, U256::from(1_000u64));
    }

    #[test]
    fn call_body_shape() {
        let body = call_body("0x00000000000000000000000000000000000000aa", &[0x18, 0x16]);
        assert_eq!(body["method"], "eth_call");
        assert_eq!(body["jsonrpc"], "2.0");
        assert_eq!(
            body["params"][0]["to"],
            "0x00000000000000000000000000000000000000aa"
        );
        assert_eq!(body["params"][0]["data"], "0x1816");
        assert_eq!(body["params"][1], "latest");
    }

    #[test]
    fn u128_conversion_rejects_oversized_values() {
        assert!(to_u128(U256::MAX, "reserves").is_err());
        assert_eq!(to_u128(U256::from(7u64), "reserves").unwrap(), 7);
    }

    #[test]
    fn rejects_malformed_addresses() {
        assert!(parse_address("not-an-address").is_err());
        assert!(parse_address("0x6B175474E89094C44Da98b954EedeAC495271d0F").is_ok());
    }
}
