pub mod abi;
pub mod config;
pub mod constants;
pub mod error;
pub mod fraction;
pub mod types;

pub use config::Config;
pub use constants::*;
pub use error::{SwapError, SwapResult};
pub use fraction::{bigint_to_u256, u256_to_bigint, Fraction, Percent};
pub use types::*;
