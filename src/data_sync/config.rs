use crate::logic::guard::GuardConfig;
use alloy_primitives::U256;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// Configuration for the watch/strike pipeline
///
/// Wei-denominated amounts are kept as decimal strings; 256-bit quantities
/// do not fit TOML integers. They are parsed at use.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchConfig {
    /// WebSocket RPC URL for the pending-transaction subscription
    pub rpc_wss_url: String,
    /// HTTP RPC URL for reserve reads and call simulation
    pub rpc_http_url: String,
    /// Flash-loan strike contract address
    pub target_contract: String,
    /// Uniswap V2 pair whose reserves bound the loan size
    pub pool_address: String,
    /// Asset being borrowed
    pub borrow_token: String,
    /// Second leg of the swap path
    pub quote_token: String,
    /// Pending transfers at or above this value (decimal wei) trigger a strike
    pub whale_threshold_wei: String,
    /// Simulated strikes below this net profit (decimal wei) are not worth sending
    pub min_net_profit_wei: String,
    /// Gas limit attached to call simulation
    pub gas_limit: u64,
    /// WebSocket connection timeout in seconds
    pub ws_connection_timeout_secs: u64,
    /// Maximum number of reconnection attempts
    pub max_reconnect_attempts: u32,
    /// Delay between reconnection attempts in seconds
    pub reconnect_delay_secs: u64,
    /// Timeout for HTTP requests in seconds
    pub http_timeout_secs: u64,
    /// Buffer size for the trigger channel
    pub channel_buffer_size: usize,
    /// Loan sizing policy
    #[serde(default)]
    pub guard: GuardConfig,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            rpc_wss_url: "wss://mainnet.base.org".to_string(),
            rpc_http_url: "https://mainnet.base.org".to_string(),
            target_contract: "0x83EF5c401fAa5B9674BAfAcFb089b30bAc67C9A0".to_string(),
            // WETH/USDC Uniswap V2 pair on Base
            pool_address: "0x88A43bb75941904d47401946215162a26bc773dc".to_string(),
            borrow_token: "0x4200000000000000000000000000000000000006".to_string(),
            quote_token: "0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913".to_string(),
            // 15 ETH
            whale_threshold_wei: "15000000000000000000".to_string(),
            // 0.012 ETH
            min_net_profit_wei: "12000000000000000".to_string(),
            gas_limit: 980_000,
            ws_connection_timeout_secs: 30,
            max_reconnect_attempts: 5,
            reconnect_delay_secs: 2,
            http_timeout_secs: 10,
            channel_buffer_size: 100,
            guard: GuardConfig::default(),
        }
    }
}

impl WatchConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> eyre::Result<Self> {
        let mut config = Self::default();

        if let Ok(rpc_wss_url) = std::env::var("RPC_WSS_URL") {
            // Validate WebSocket URL
            let _url = Url::parse(&rpc_wss_url)
                .map_err(|e| eyre::eyre!("Invalid RPC_WSS_URL: {}", e))?;
            config.rpc_wss_url = rpc_wss_url;
        }

        if let Ok(rpc_http_url) = std::env::var("RPC_HTTP_URL") {
            // Validate HTTP URL
            let _url = Url::parse(&rpc_http_url)
                .map_err(|e| eyre::eyre!("Invalid RPC_HTTP_URL: {}", e))?;
            config.rpc_http_url = rpc_http_url;
        }

        if let Ok(target_contract) = std::env::var("TARGET_CONTRACT") {
            config.target_contract = target_contract;
        }

        if let Ok(pool_address) = std::env::var("POOL_ADDRESS") {
            config.pool_address = pool_address;
        }

        if let Ok(borrow_token) = std::env::var("BORROW_TOKEN") {
            config.borrow_token = borrow_token;
        }

        if let Ok(quote_token) = std::env::var("QUOTE_TOKEN") {
            config.quote_token = quote_token;
        }

        if let Ok(threshold_str) = std::env::var("WHALE_THRESHOLD_WEI") {
            U256::from_str_radix(&threshold_str, 10)
                .map_err(|e| eyre::eyre!("Invalid WHALE_THRESHOLD_WEI: {}", e))?;
            config.whale_threshold_wei = threshold_str;
        }

        if let Ok(profit_str) = std::env::var("MIN_NET_PROFIT_WEI") {
            U256::from_str_radix(&profit_str, 10)
                .map_err(|e| eyre::eyre!("Invalid MIN_NET_PROFIT_WEI: {}", e))?;
            config.min_net_profit_wei = profit_str;
        }

        if let Ok(gas_limit_str) = std::env::var("GAS_LIMIT") {
            config.gas_limit = gas_limit_str.parse()
                .map_err(|e| eyre::eyre!("Invalid GAS_LIMIT: {}", e))?;
        }

        if let Ok(timeout_str) = std::env::var("WS_CONNECTION_TIMEOUT_SECS") {
            config.ws_connection_timeout_secs = timeout_str.parse()
                .map_err(|e| eyre::eyre!("Invalid WS_CONNECTION_TIMEOUT_SECS: {}", e))?;
        }

        if let Ok(max_attempts_str) = std::env::var("MAX_RECONNECT_ATTEMPTS") {
            config.max_reconnect_attempts = max_attempts_str.parse()
                .map_err(|e| eyre::eyre!("Invalid MAX_RECONNECT_ATTEMPTS: {}", e))?;
        }

        if let Ok(delay_str) = std::env::var("RECONNECT_DELAY_SECS") {
            config.reconnect_delay_secs = delay_str.parse()
                .map_err(|e| eyre::eyre!("Invalid RECONNECT_DELAY_SECS: {}", e))?;
        }

        if let Ok(timeout_str) = std::env::var("HTTP_TIMEOUT_SECS") {
            config.http_timeout_secs = timeout_str.parse()
                .map_err(|e| eyre::eyre!("Invalid HTTP_TIMEOUT_SECS: {}", e))?;
        }

        if let Ok(buffer_size_str) = std::env::var("CHANNEL_BUFFER_SIZE") {
            config.channel_buffer_size = buffer_size_str.parse()
                .map_err(|e| eyre::eyre!("Invalid CHANNEL_BUFFER_SIZE: {}", e))?;
        }

        if let Ok(divisor_str) = std::env::var("GUARD_SAFETY_DIVISOR") {
            config.guard.safety_divisor = divisor_str.parse()
                .map_err(|e| eyre::eyre!("Invalid GUARD_SAFETY_DIVISOR: {}", e))?;
        }

        if let Ok(divisor_str) = std::env::var("GUARD_FALLBACK_DIVISOR") {
            config.guard.fallback_divisor = divisor_str.parse()
                .map_err(|e| eyre::eyre!("Invalid GUARD_FALLBACK_DIVISOR: {}", e))?;
        }

        Ok(config)
    }

    pub fn whale_threshold(&self) -> eyre::Result<U256> {
        U256::from_str_radix(&self.whale_threshold_wei, 10)
            .map_err(|e| eyre::eyre!("Invalid whale_threshold_wei: {}", e))
    }

    pub fn min_net_profit(&self) -> eyre::Result<U256> {
        U256::from_str_radix(&self.min_net_profit_wei, 10)
            .map_err(|e| eyre::eyre!("Invalid min_net_profit_wei: {}", e))
    }

    pub fn ws_connection_timeout(&self) -> Duration {
        Duration::from_secs(self.ws_connection_timeout_secs)
    }

    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_secs(self.reconnect_delay_secs)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = WatchConfig::default();
        assert_eq!(config.rpc_wss_url, "wss://mainnet.base.org");
        assert_eq!(config.rpc_http_url, "https://mainnet.base.org");
        assert_eq!(config.gas_limit, 980_000);
        assert_eq!(config.guard.safety_divisor, 10);
    }

    #[test]
    fn test_wei_amounts_parse() {
        let config = WatchConfig::default();
        assert_eq!(
            config.whale_threshold().unwrap(),
            U256::from(15u64) * U256::from(10u64).pow(U256::from(18u64))
        );
        assert_eq!(
            config.min_net_profit().unwrap(),
            U256::from(12u64) * U256::from(10u64).pow(U256::from(15u64))
        );
    }

    #[test]
    fn test_durations() {
        let config = WatchConfig::default();
        assert_eq!(config.ws_connection_timeout(), Duration::from_secs(30));
        assert_eq!(config.reconnect_delay(), Duration::from_secs(2));
        assert_eq!(config.http_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_toml_round_trip_with_guard_section() {
        let toml_str = toml::to_string(&WatchConfig::default()).unwrap();
        let parsed: WatchConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.pool_address, WatchConfig::default().pool_address);
        assert_eq!(parsed.guard.fallback_divisor, 2);
    }

    #[test]
    fn test_guard_section_is_optional_in_toml() {
        let toml_str = r#"
            rpc_wss_url = "wss://mainnet.base.org"
            rpc_http_url = "https://mainnet.base.org"
            target_contract = "0x83EF5c401fAa5B9674BAfAcFb089b30bAc67C9A0"
            pool_address = "0x88A43bb75941904d47401946215162a26bc773dc"
            borrow_token = "0x4200000000000000000000000000000000000006"
            quote_token = "0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913"
            whale_threshold_wei = "15000000000000000000"
            min_net_profit_wei = "12000000000000000"
            gas_limit = 980000
            ws_connection_timeout_secs = 30
            max_reconnect_attempts = 5
            reconnect_delay_secs = 2
            http_timeout_secs = 10
            channel_buffer_size = 100
        "#;
        let parsed: WatchConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(parsed.guard.safety_divisor, 10);
    }
}
