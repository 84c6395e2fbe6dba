pub mod local;
pub mod poller;
pub mod remote;

pub use local::LocalQuoteSource;
pub use poller::QuotePoller;
pub use remote::RemoteQuoteSource;

use crate::core::{error::SwapResult, Config, Route, SwapError, TokenAmount, TradeType};
use ethers::types::{Address, U256};

/// Capability interface over the two interchangeable quoting backends.
/// Callers depend only on this trait; which backend answers is a matter
/// of configuration.
#[async_trait::async_trait]
pub trait QuoteSource: Send + Sync {
    /// Quotes the non-fixed side of a prospective trade: the output amount
    /// for exact-input, the required input amount for exact-output.
    async fn quote(
        &self,
        route: &Route,
        amount: U256,
        trade_type: TradeType,
    ) -> SwapResult<TokenAmount>;
}

/// Dispatches quoting to the configured backend.
pub struct QuoteEngine {
    local: LocalQuoteSource,
    remote: Option<RemoteQuoteSource>,
    use_client_side: bool,
}

impl QuoteEngine {
    pub fn new(config: &Config, weth: Address) -> SwapResult<Self> {
        let remote = config
            .quote_api_url
            .as_ref()
            .map(|url| RemoteQuoteSource::new(url.clone(), weth, config.max_quote_block_age));
        if !config.use_client_side_router && remote.is_none() {
            return Err(SwapError::ConfigError(
                "remote routing requested but no quote API configured".to_string(),
            ));
        }
        Ok(Self {
            local: LocalQuoteSource::new(),
            remote,
            use_client_side: config.use_client_side_router,
        })
    }

    pub fn local_only() -> Self {
        Self {
            local: LocalQuoteSource::new(),
            remote: None,
            use_client_side: true,
        }
    }

    /// Forwards the most recently observed chain head to the remote source
    /// for its staleness checks.
    pub fn note_latest_block(&self, block_number: u64) {
        if let Some(remote) = &self.remote {
            remote.note_latest_block(block_number);
        }
    }

    pub async fn quote(
        &self,
        route: &Route,
        amount: U256,
        trade_type: TradeType,
    ) -> SwapResult<TokenAmount> {
        match (&self.remote, self.use_client_side) {
            (Some(remote), false) => remote.quote(route, amount, trade_type).await,
            _ => self.local.quote(route, amount, trade_type).await,
        }
    }
}
