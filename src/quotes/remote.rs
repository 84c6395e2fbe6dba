use crate::core::{error::SwapResult, Currency, Route, SwapError, TokenAmount, TradeType};
use ethers::types::U256;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TokenDescriptor {
    address: String,
    chain_id: u64,
    decimals: u8,
    symbol: String,
}

impl TokenDescriptor {
    fn from_currency(currency: &Currency, weth: ethers::types::Address) -> Self {
        Self {
            address: format!("{:?}", currency.wrapped_address(weth)),
            chain_id: currency.chain_id(),
            decimals: currency.decimals(),
            symbol: currency.symbol().to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QuoteApiRequest {
    amount: String,
    token_in: TokenDescriptor,
    token_out: TokenDescriptor,
    swap_direction: &'static str,
    client_side_router: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteApiResponse {
    quote: String,
    block_number: u64,
    #[serde(default)]
    gas_use_estimate_usd: Option<String>,
    /// Serialized route description; opaque to this client.
    #[serde(default)]
    route: Option<serde_json::Value>,
}

/// Quote source backed by a remote quoting service. Responses quoted more
/// than `max_block_age` blocks behind the latest known block are discarded
/// rather than reused.
pub struct RemoteQuoteSource {
    http: reqwest::Client,
    api_url: String,
    weth: ethers::types::Address,
    max_block_age: u64,
    latest_block: AtomicU64,
}

impl RemoteQuoteSource {
    pub fn new(api_url: String, weth: ethers::types::Address, max_block_age: u64) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url,
            weth,
            max_block_age,
            latest_block: AtomicU64::new(0),
        }
    }

    /// Records the most recently observed chain head for staleness checks.
    pub fn note_latest_block(&self, block_number: u64) {
        self.latest_block.fetch_max(block_number, Ordering::SeqCst);
    }
}

#[async_trait::async_trait]
impl crate::quotes::QuoteSource for RemoteQuoteSource {
    async fn quote(
        &self,
        route: &Route,
        amount: U256,
        trade_type: TradeType,
    ) -> SwapResult<TokenAmount> {
        let request = QuoteApiRequest {
            amount: amount.to_string(),
            token_in: TokenDescriptor::from_currency(&route.input, self.weth),
            token_out: TokenDescriptor::from_currency(&route.output, self.weth),
            swap_direction: match trade_type {
                TradeType::ExactInput => "exactIn",
                TradeType::ExactOutput => "exactOut",
            },
            client_side_router: false,
        };

        let response = self
            .http
            .post(&self.api_url)
            .json(&request)
            .send()
            .await?
            .error_for_status()
            .map_err(|e| SwapError::NetworkError(e.to_string()))?;
        let body: QuoteApiResponse = response.json().await?;

        let latest_block = self.latest_block.load(Ordering::SeqCst);
        if latest_block > body.block_number
            && latest_block - body.block_number > self.max_block_age
        {
            warn!(
                "Discarding stale remote quote from block {} (latest {})",
                body.block_number, latest_block
            );
            return Err(SwapError::StaleQuote {
                quote_block: body.block_number,
                latest_block,
            });
        }

        debug!(
            "Remote quote at block {}: {} ({} gas est. USD, route {})",
            body.block_number,
            body.quote,
            body.gas_use_estimate_usd.as_deref().unwrap_or("?"),
            if body.route.is_some() { "attached" } else { "omitted" },
        );

        let raw = U256::from_dec_str(&body.quote)
            .map_err(|_| SwapError::InvalidAmount(body.quote.clone()))?;
        let currency = match trade_type {
            TradeType::ExactInput => route.output.clone(),
            TradeType::ExactOutput => route.input.clone(),
        };
        Ok(TokenAmount::new(currency, raw))
    }
}
