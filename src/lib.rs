pub mod cli;
pub mod core;
pub mod discovery;
pub mod quotes;
pub mod trade;
pub mod transaction;
pub mod utils;

// Re-export commonly used types
pub use crate::core::{
    Config, Currency, Fraction, Percent, Pool, QuoteRequest, Route, SwapError, SwapResult,
    TokenAmount, TokenInfo, Trade, TradeState, TradeType,
};
pub use crate::discovery::{PairFinder, PoolCache, RouteDiscovery, V2PairFinder};
pub use crate::quotes::{QuoteEngine, QuotePoller, QuoteSource};
pub use crate::trade::{best_trade, derive_trade, is_trade_better, warning_severity};
pub use crate::transaction::{SwapExecutor, TransactionRegistry};
