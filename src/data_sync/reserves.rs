use crate::logic::types::ReservePair;
use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::{SolCall, sol};
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

sol! {
    /// ERC20 Pair interface for getReserves
    interface IUniswapV2Pair {
        function getReserves() external view returns (uint112 reserve0, uint112 reserve1, uint32 blockTimestampLast);
    }
}

/// Failure to obtain reserves. Callers are expected to treat every variant
/// as a single "oracle unavailable" condition; the variants exist for logs.
#[derive(Debug, Error)]
pub enum OracleError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("RPC error: {0}")]
    Rpc(String),
    #[error("invalid hex in RPC response: {0}")]
    Hex(#[from] hex::FromHexError),
    #[error("ABI decode error: {0}")]
    Abi(#[from] alloy_sol_types::Error),
}

/// Read-only access to the current reserves of a pool.
///
/// One query, no retries. A timeout imposed by the transport surfaces as an
/// `OracleError` like any other failure.
#[async_trait]
pub trait ReserveSource: Send + Sync {
    async fn reserves(&self, pool: Address) -> Result<ReservePair, OracleError>;
}

/// Reserve oracle backed by a JSON-RPC `eth_call` of `getReserves()`
#[derive(Debug, Clone)]
pub struct RpcReserveSource {
    http_client: reqwest::Client,
    rpc_url: String,
}

impl RpcReserveSource {
    pub fn new(rpc_url: String, timeout: Duration) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self { http_client, rpc_url }
    }

    /// Prepare getReserves call data for a pool
    pub fn prepare_get_reserves_call() -> Bytes {
        IUniswapV2Pair::getReservesCall {}.abi_encode().into()
    }

    /// Make a read-only contract call via RPC
    async fn call_contract(&self, to: Address, data: Bytes) -> Result<Bytes, OracleError> {
        let request_body = serde_json::json!({
            "jsonrpc": "2.0",
            "method": "eth_call",
            "params": [
                {
                    "to": format!("{:#x}", to),
                    "data": format!("{:#x}", data)
                },
                "latest"
            ],
            "id": 1
        });

        let response = self.http_client
            .post(&self.rpc_url)
            .header("Content-Type", "application/json")
            .json(&request_body)
            .send()
            .await?;

        let response_json: Value = response.json().await?;

        if let Some(error) = response_json.get("error") {
            return Err(OracleError::Rpc(error.to_string()));
        }

        let result = response_json
            .get("result")
            .and_then(|r| r.as_str())
            .ok_or_else(|| OracleError::Rpc("missing result in RPC response".to_string()))?;

        let bytes = hex::decode(result.trim_start_matches("0x"))?;
        Ok(bytes.into())
    }
}

#[async_trait]
impl ReserveSource for RpcReserveSource {
    async fn reserves(&self, pool: Address) -> Result<ReservePair, OracleError> {
        let call_data = Self::prepare_get_reserves_call();
        let return_data = self.call_contract(pool, call_data).await?;

        let decoded = IUniswapV2Pair::getReservesCall::abi_decode_returns(&return_data)?;
        let pair = ReservePair::new(U256::from(decoded.reserve0), U256::from(decoded.reserve1));

        debug!("Pool {}: reserves {} / {}", pool, pair.reserve0, pair.reserve1);
        Ok(pair)
    }
}

/// Fixed-answer reserve source for tests and dry runs
#[derive(Debug, Clone, Default)]
pub struct MockReserveSource {
    reserves: Option<ReservePair>,
}

impl MockReserveSource {
    /// A source that always reports the given reserves
    pub fn with_reserves(reserve0: U256, reserve1: U256) -> Self {
        Self { reserves: Some(ReservePair::new(reserve0, reserve1)) }
    }

    /// A source that fails every query
    pub fn unavailable() -> Self {
        Self { reserves: None }
    }
}

#[async_trait]
impl ReserveSource for MockReserveSource {
    async fn reserves(&self, _pool: Address) -> Result<ReservePair, OracleError> {
        self.reserves
            .ok_or_else(|| OracleError::Rpc("mock reserve source is offline".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prepare_get_reserves_call() {
        let call_data = RpcReserveSource::prepare_get_reserves_call();
        assert!(!call_data.is_empty());

        // Verify the call data matches getReserves() function selector
        let expected_selector = &IUniswapV2Pair::getReservesCall {}.abi_encode()[0..4];
        assert_eq!(&call_data[0..4], expected_selector);
    }

    #[test]
    fn test_decode_reserves_return() {
        // getReserves() returns three static words: reserve0, reserve1, blockTimestampLast
        let mut return_data = Vec::with_capacity(96);
        return_data.extend_from_slice(&U256::from(1234u64).to_be_bytes::<32>());
        return_data.extend_from_slice(&U256::from(5678u64).to_be_bytes::<32>());
        return_data.extend_from_slice(&U256::from(42u64).to_be_bytes::<32>());

        let decoded = IUniswapV2Pair::getReservesCall::abi_decode_returns(&return_data).unwrap();
        assert_eq!(U256::from(decoded.reserve0), U256::from(1234u64));
        assert_eq!(U256::from(decoded.reserve1), U256::from(5678u64));
        assert_eq!(decoded.blockTimestampLast, 42);
    }

    #[test]
    fn test_rpc_source_creation() {
        let source = RpcReserveSource::new("https://mainnet.base.org".to_string(), Duration::from_secs(10));
        assert_eq!(source.rpc_url, "https://mainnet.base.org");
    }

    #[tokio::test]
    async fn test_mock_source_reports_reserves() {
        let source = MockReserveSource::with_reserves(U256::from(200u64), U256::from(900_000u64));
        let pair = source.reserves(Address::repeat_byte(0x42)).await.unwrap();
        assert_eq!(pair.reserve0, U256::from(200u64));
        assert_eq!(pair.reserve1, U256::from(900_000u64));
    }

    #[tokio::test]
    async fn test_mock_source_unavailable() {
        let source = MockReserveSource::unavailable();
        let result = source.reserves(Address::repeat_byte(0x42)).await;
        assert!(matches!(result, Err(OracleError::Rpc(_))));
    }
}
