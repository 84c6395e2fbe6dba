use ethers::providers::ProviderError;
use ethers::types::U256;
use thiserror::Error;

pub type SwapResult<T> = Result<T, SwapError>;

#[derive(Error, Debug)]
pub enum SwapError {
    #[error("Trades are not comparable: {0}")]
    IncomparableTrades(String),

    #[error("Invalid route: {0}")]
    InvalidRoute(String),

    #[error("Insufficient liquidity: available {available}, required {required}")]
    InsufficientLiquidity { available: U256, required: U256 },

    #[error("Math overflow in calculation")]
    MathOverflow,

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Invalid pool state: {0}")]
    InvalidPoolState(String),

    #[error("Provider error: {0}")]
    ProviderError(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("ABI error: {0}")]
    AbiError(String),

    #[error("Stale quote: quoted at block {quote_block}, latest block {latest_block}")]
    StaleQuote { quote_block: u64, latest_block: u64 },

    #[error("{0}")]
    EstimationFailed(String),

    #[error("Transaction rejected")]
    TransactionRejected,

    #[error("Swap failed: {0}")]
    SwapFailed(String),

    #[error("Could not resolve recipient: {0}")]
    RecipientResolutionFailed(String),

    #[error("Signature error: {0}")]
    SignatureError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Other error: {0}")]
    Other(String),
}

impl SwapError {
    /// Wraps any middleware error, preserving the message.
    pub fn provider<E: std::fmt::Display>(err: E) -> Self {
        SwapError::ProviderError(err.to_string())
    }
}

impl From<ProviderError> for SwapError {
    fn from(err: ProviderError) -> Self {
        SwapError::ProviderError(err.to_string())
    }
}

impl From<anyhow::Error> for SwapError {
    fn from(err: anyhow::Error) -> Self {
        SwapError::Other(err.to_string())
    }
}

impl From<reqwest::Error> for SwapError {
    fn from(err: reqwest::Error) -> Self {
        SwapError::NetworkError(err.to_string())
    }
}

impl From<serde_json::Error> for SwapError {
    fn from(err: serde_json::Error) -> Self {
        SwapError::SerializationError(err.to_string())
    }
}

impl From<ethabi::Error> for SwapError {
    fn from(err: ethabi::Error) -> Self {
        SwapError::AbiError(err.to_string())
    }
}

impl From<std::io::Error> for SwapError {
    fn from(err: std::io::Error) -> Self {
        SwapError::Other(err.to_string())
    }
}
