use crate::data_sync::config::WatchConfig;
use crate::data_sync::reserves::ReserveSource;
use crate::logic::guard::LoanSizingGuard;
use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::{SolCall, sol};
use eyre::Result;
use serde_json::Value;
use std::time::Duration;
use tracing::{info, warn};

sol! {
    /// Strike contract entry point; returns the net profit the loan cycle
    /// would realize
    interface IFlashStrike {
        function requestFlashLoan(address asset, uint256 amount, address[] path) external returns (uint256 netProfit);
    }
}

/// Addresses and limits for one strike target
#[derive(Debug, Clone)]
pub struct StrikeConfig {
    pub rpc_http_url: String,
    /// Flash-loan strike contract
    pub target_contract: Address,
    /// Asset being borrowed
    pub borrow_asset: Address,
    /// Swap path handed to the strike contract
    pub swap_path: Vec<Address>,
    /// Pair whose reserves bound the loan size
    pub pool_address: Address,
    /// Sender used for call simulation
    pub sender: Address,
    pub gas_limit: u64,
    /// Simulated strikes below this net profit are not worth sending
    pub min_net_profit: U256,
}

impl StrikeConfig {
    /// Build from a watch configuration, parsing its address strings
    pub fn from_watch_config(config: &WatchConfig, sender: Address) -> Result<Self> {
        let target_contract = config.target_contract.parse::<Address>()
            .map_err(|e| eyre::eyre!("Invalid target contract address: {}", e))?;
        let borrow_asset = config.borrow_token.parse::<Address>()
            .map_err(|e| eyre::eyre!("Invalid borrow token address: {}", e))?;
        let quote_token = config.quote_token.parse::<Address>()
            .map_err(|e| eyre::eyre!("Invalid quote token address: {}", e))?;
        let pool_address = config.pool_address.parse::<Address>()
            .map_err(|e| eyre::eyre!("Invalid pool address: {}", e))?;

        Ok(Self {
            rpc_http_url: config.rpc_http_url.clone(),
            target_contract,
            borrow_asset,
            swap_path: vec![borrow_asset, quote_token],
            pool_address,
            sender,
            gas_limit: config.gas_limit,
            min_net_profit: config.min_net_profit()?,
        })
    }
}

/// Outcome of a single strike attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StrikeOutcome {
    /// Simulation succeeded and cleared the profit floor
    Ready { loan_amount: U256, net_profit: U256 },
    /// Simulation succeeded but the profit floor was not met
    Unprofitable { loan_amount: U256, net_profit: U256 },
    /// Loan sized to zero, or the simulated call reverted
    Aborted { reason: String },
}

/// Sizes a strike's flash loan and simulates the call.
///
/// Submission is left to the caller; nothing here signs or broadcasts.
pub struct StrikeExecutor<S: ReserveSource> {
    config: StrikeConfig,
    guard: LoanSizingGuard<S>,
    http_client: reqwest::Client,
}

impl<S: ReserveSource> StrikeExecutor<S> {
    pub fn new(config: StrikeConfig, guard: LoanSizingGuard<S>, timeout: Duration) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self { config, guard, http_client }
    }

    pub fn config(&self) -> &StrikeConfig {
        &self.config
    }

    /// Encode the flash-loan request calldata for a sized loan
    pub fn encode_strike(&self, loan_amount: U256) -> Bytes {
        IFlashStrike::requestFlashLoanCall {
            asset: self.config.borrow_asset,
            amount: loan_amount,
            path: self.config.swap_path.clone(),
        }
        .abi_encode()
        .into()
    }

    /// Size the loan against pool reserves, then simulate the strike call.
    ///
    /// Simulation failures abort the strike rather than propagating.
    pub async fn strike(&self, requested_amount: U256) -> Result<StrikeOutcome> {
        let loan_amount = self.guard.safe_loan_amount(requested_amount, self.config.pool_address).await;

        if loan_amount.is_zero() {
            warn!("Strike aborted: sized loan amount is zero");
            return Ok(StrikeOutcome::Aborted { reason: "sized loan amount is zero".to_string() });
        }

        let calldata = self.encode_strike(loan_amount);

        match self.simulate(calldata).await {
            Ok(return_data) => {
                let net_profit = match IFlashStrike::requestFlashLoanCall::abi_decode_returns(&return_data) {
                    Ok(net_profit) => net_profit,
                    Err(e) => {
                        warn!("Strike aborted: could not decode simulated profit: {}", e);
                        return Ok(StrikeOutcome::Aborted {
                            reason: format!("could not decode simulated profit: {}", e),
                        });
                    }
                };

                if net_profit >= self.config.min_net_profit {
                    info!(
                        "Strike ready: loan {} simulates to net profit {}",
                        loan_amount, net_profit
                    );
                    Ok(StrikeOutcome::Ready { loan_amount, net_profit })
                } else {
                    info!(
                        "Strike unprofitable: loan {} simulates to net profit {} (floor {})",
                        loan_amount, net_profit, self.config.min_net_profit
                    );
                    Ok(StrikeOutcome::Unprofitable { loan_amount, net_profit })
                }
            }
            Err(e) => {
                warn!("Strike aborted: simulation failed: {}", e);
                Ok(StrikeOutcome::Aborted { reason: format!("simulation failed: {}", e) })
            }
        }
    }

    /// Simulate the strike via eth_call from the configured sender
    async fn simulate(&self, data: Bytes) -> Result<Bytes> {
        let request_body = serde_json::json!({
            "jsonrpc": "2.0",
            "method": "eth_call",
            "params": [
                {
                    "from": format!("{:#x}", self.config.sender),
                    "to": format!("{:#x}", self.config.target_contract),
                    "gas": format!("0x{:x}", self.config.gas_limit),
                    "data": format!("{:#x}", data)
                },
                "latest"
            ],
            "id": 1
        });

        let response = self.http_client
            .post(&self.config.rpc_http_url)
            .header("Content-Type", "application/json")
            .json(&request_body)
            .send()
            .await?;

        let response_json: Value = response.json().await?;

        if let Some(error) = response_json.get("error") {
            return Err(eyre::eyre!("RPC error: {}", error));
        }

        let result = response_json
            .get("result")
            .and_then(|r| r.as_str())
            .ok_or_else(|| eyre::eyre!("Missing result in RPC response"))?;

        let bytes = hex::decode(result.trim_start_matches("0x"))?;
        Ok(bytes.into())
    }
}
