use crate::core::{constants::*, error::SwapResult, SwapError};
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub rpc_url: String,
    pub chain_id: u64,
    /// Remote quoting service. When unset the local calculation path is
    /// the only available quote source.
    pub quote_api_url: Option<String>,
    /// Prefer the local client-side calculation even when a remote quote
    /// API is configured.
    pub use_client_side_router: bool,
    pub private_key: Option<String>,
    pub default_slippage_bps: u16,
    pub max_slippage_bps: u16,
    pub deadline_secs: u64,
    pub quote_poll_interval_secs: u64,
    pub max_quote_block_age: u64,
    pub max_pool_block_age: u64,
    pub pool_cache_ttl_secs: u64,
}

impl Config {
    pub fn from_env() -> SwapResult<Self> {
        let rpc_url =
            env::var("RPC_URL").unwrap_or_else(|_| "http://localhost:8545".to_string());
        let quote_api_url = env::var("QUOTE_API_URL").ok();
        let use_client_side_router = env::var("CLIENT_SIDE_ROUTER")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(quote_api_url.is_none());

        Ok(Self {
            rpc_url,
            chain_id: env::var("CHAIN_ID")
                .unwrap_or_default()
                .parse()
                .unwrap_or(MAINNET_CHAIN_ID),
            quote_api_url,
            use_client_side_router,
            private_key: env::var("PRIVATE_KEY").ok(),
            default_slippage_bps: env::var("DEFAULT_SLIPPAGE_BPS")
                .unwrap_or_default()
                .parse()
                .unwrap_or(DEFAULT_SLIPPAGE_BPS),
            max_slippage_bps: env::var("MAX_SLIPPAGE_BPS")
                .unwrap_or_default()
                .parse()
                .unwrap_or(MAX_SLIPPAGE_BPS),
            deadline_secs: env::var("DEADLINE_SECS")
                .unwrap_or_default()
                .parse()
                .unwrap_or(DEFAULT_DEADLINE_SECS),
            quote_poll_interval_secs: env::var("QUOTE_POLL_INTERVAL_SECS")
                .unwrap_or_default()
                .parse()
                .unwrap_or(QUOTE_POLL_INTERVAL_SECS),
            max_quote_block_age: env::var("MAX_QUOTE_BLOCK_AGE")
                .unwrap_or_default()
                .parse()
                .unwrap_or(MAX_QUOTE_BLOCK_AGE),
            max_pool_block_age: env::var("MAX_POOL_BLOCK_AGE")
                .unwrap_or_default()
                .parse()
                .unwrap_or(MAX_POOL_BLOCK_AGE),
            pool_cache_ttl_secs: env::var("POOL_CACHE_TTL_SECS")
                .unwrap_or_default()
                .parse()
                .unwrap_or(POOL_CACHE_TTL_SECS),
        })
    }

    pub fn validate(&self) -> SwapResult<()> {
        if self.max_slippage_bps > 10000 {
            return Err(SwapError::ConfigError(
                "Max slippage cannot exceed 100%".to_string(),
            ));
        }

        if self.default_slippage_bps > self.max_slippage_bps {
            return Err(SwapError::ConfigError(
                "Default slippage cannot exceed max slippage".to_string(),
            ));
        }

        if self.deadline_secs == 0 {
            return Err(SwapError::ConfigError(
                "Transaction deadline must be greater than 0".to_string(),
            ));
        }

        if !self.use_client_side_router && self.quote_api_url.is_none() {
            return Err(SwapError::ConfigError(
                "Remote routing requires QUOTE_API_URL".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rpc_url: "http://localhost:8545".to_string(),
            chain_id: MAINNET_CHAIN_ID,
            quote_api_url: None,
            use_client_side_router: true,
            private_key: None,
            default_slippage_bps: DEFAULT_SLIPPAGE_BPS,
            max_slippage_bps: MAX_SLIPPAGE_BPS,
            deadline_secs: DEFAULT_DEADLINE_SECS,
            quote_poll_interval_secs: QUOTE_POLL_INTERVAL_SECS,
            max_quote_block_age: MAX_QUOTE_BLOCK_AGE,
            max_pool_block_age: MAX_POOL_BLOCK_AGE,
            pool_cache_ttl_secs: POOL_CACHE_TTL_SECS,
        }
    }
}
