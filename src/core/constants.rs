use ethers::types::Address;
use std::str::FromStr;

// Uniswap v2 contract addresses (Mainnet)
pub const UNISWAP_V2_FACTORY_ADDRESS: &str = "0x5C69bEe701ef814a2B6a3EDD4B1652CB9cc5aA6f";
pub const UNISWAP_V2_ROUTER_ADDRESS: &str = "0x7a250d5630B4cF539739dF2C5dAcb4c659F2488D";

// Common token addresses (Mainnet)
pub const WETH_ADDRESS: &str = "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2";
pub const DAI_ADDRESS: &str = "0x6B175474E89094C44Da98b954EedeAC495271d0F";
pub const USDC_ADDRESS: &str = "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48";
pub const USDT_ADDRESS: &str = "0xdAC17F958D2ee523a2206206994597C13D831ec7";
pub const UNI_ADDRESS: &str = "0x1f9840a85d5aF5bf1D1762F925BDADdC4201F984";

// Addresses as Address
lazy_static::lazy_static! {
    pub static ref V2_FACTORY: Address = Address::from_str(UNISWAP_V2_FACTORY_ADDRESS).unwrap();
    pub static ref V2_ROUTER: Address = Address::from_str(UNISWAP_V2_ROUTER_ADDRESS).unwrap();
    pub static ref WETH: Address = Address::from_str(WETH_ADDRESS).unwrap();
    pub static ref DAI: Address = Address::from_str(DAI_ADDRESS).unwrap();
    pub static ref USDC: Address = Address::from_str(USDC_ADDRESS).unwrap();
    pub static ref USDT: Address = Address::from_str(USDT_ADDRESS).unwrap();
    pub static ref UNI: Address = Address::from_str(UNI_ADDRESS).unwrap();
}

pub const MAINNET_CHAIN_ID: u64 = 1;

// Fee and slippage arithmetic base: 1 bip = 1/10000
pub const BIPS_BASE: u64 = 10_000;

// Uniswap v2 pools take a flat 0.30% fee
pub const V2_FEE_BIPS: u32 = 30;

// Slippage configuration
pub const DEFAULT_SLIPPAGE_BPS: u16 = 50; // 0.5%
pub const MAX_SLIPPAGE_BPS: u16 = 1000; // 10%

// Transaction configuration
pub const DEFAULT_DEADLINE_SECS: u64 = 1800; // 30 minutes
pub const GAS_ESTIMATE_MARGIN_BPS: u64 = 1000; // +10% over the estimate
pub const PERMIT_VALIDITY_BUFFER_SECS: u64 = 1200; // 20 minutes past the tx deadline

// EIP-1193 error code for a user-rejected request
pub const USER_REJECTED_REQUEST_CODE: i64 = 4001;

// Quote freshness
pub const QUOTE_POLL_INTERVAL_SECS: u64 = 12;
pub const MAX_QUOTE_BLOCK_AGE: u64 = 10;

// Pool discovery freshness
pub const MAX_POOL_BLOCK_AGE: u64 = 10;
pub const POOL_CACHE_TTL_SECS: u64 = 60;

// Routes are at most two hops: direct, or through one base token
pub const MAX_ROUTE_HOPS: usize = 2;

// Price impact severity thresholds, ascending
pub const PRICE_IMPACT_LOW_BPS: u64 = 100; // 1%
pub const PRICE_IMPACT_MEDIUM_BPS: u64 = 300; // 3%
pub const PRICE_IMPACT_HIGH_BPS: u64 = 500; // 5%
pub const PRICE_IMPACT_BLOCKED_BPS: u64 = 1500; // 15%
