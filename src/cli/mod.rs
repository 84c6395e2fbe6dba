use clap::{Parser, Subcommand};

pub mod commands;
pub mod display;

#[derive(Parser)]
#[command(name = "swaprouter")]
#[command(about = "Multi-route swap tool for Uniswap-style DEX protocols", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Quote a swap across all discovered routes
    Quote(QuoteArgs),

    /// Execute a swap through the best available route
    Swap(SwapArgs),

    /// List the pools connecting a token pair
    Pools(PoolsArgs),
}

#[derive(Parser)]
pub struct QuoteArgs {
    /// Input token: address, known symbol, or ETH for the native asset
    pub token_in: String,

    /// Amount on the fixed side, in human-readable units (e.g. "1.5")
    pub amount: String,

    /// Output token (optional, defaults to ETH)
    pub token_out: Option<String>,

    /// Slippage tolerance in basis points (default: 50 = 0.5%)
    #[arg(short, long, default_value = "50")]
    pub slippage: u16,

    /// Fix the output side instead of the input side
    #[arg(long)]
    pub exact_out: bool,

    /// Show quotes for all candidate routes, not just the best
    #[arg(short, long)]
    pub all: bool,

    /// Keep re-quoting at the configured poll interval until interrupted
    #[arg(short, long)]
    pub watch: bool,
}

#[derive(Parser)]
pub struct SwapArgs {
    /// Input token: address, known symbol, or ETH for the native asset
    pub token_in: String,

    /// Amount on the fixed side, in human-readable units (e.g. "1.5")
    pub amount: String,

    /// Output token (optional, defaults to ETH)
    pub token_out: Option<String>,

    /// Slippage tolerance in basis points (default: 50 = 0.5%)
    #[arg(short, long, default_value = "50")]
    pub slippage: u16,

    /// Fix the output side instead of the input side
    #[arg(long)]
    pub exact_out: bool,

    /// Recipient address or name; defaults to the connected account
    #[arg(short, long)]
    pub recipient: Option<String>,

    /// Skip the confirmation prompt
    #[arg(long)]
    pub yes: bool,
}

#[derive(Parser)]
pub struct PoolsArgs {
    /// First token: address or known symbol
    pub token_a: String,

    /// Second token: address or known symbol
    pub token_b: String,

    /// Show detailed pool information
    #[arg(short, long)]
    pub detailed: bool,
}
