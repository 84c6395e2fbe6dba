use crate::core::{
    constants::BIPS_BASE, error::SwapResult, Route, SwapError, TokenAmount, TradeType,
};
use ethers::types::U256;
use log::debug;

/// Client-side quote calculation over pool snapshots.
/// Constant product formula with the pool's fee, exact integer arithmetic
/// matching the on-chain rounding direction.
pub struct LocalQuoteSource;

impl LocalQuoteSource {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LocalQuoteSource {
    fn default() -> Self {
        Self::new()
    }
}

/// Output amount for a fixed input: floor((in·(base−fee)·Rout) / (Rin·base + in·(base−fee))).
pub fn get_amount_out(
    amount_in: U256,
    reserve_in: U256,
    reserve_out: U256,
    fee_bips: u32,
) -> SwapResult<U256> {
    if reserve_in.is_zero() || reserve_out.is_zero() {
        return Err(SwapError::InvalidPoolState(
            "pool has zero reserves".to_string(),
        ));
    }
    if amount_in.is_zero() {
        return Ok(U256::zero());
    }

    let base = U256::from(BIPS_BASE);
    let fee_num = U256::from(BIPS_BASE - fee_bips as u64);
    let amount_in_with_fee = amount_in.checked_mul(fee_num).ok_or(SwapError::MathOverflow)?;
    let numerator = amount_in_with_fee
        .checked_mul(reserve_out)
        .ok_or(SwapError::MathOverflow)?;
    let denominator = reserve_in
        .checked_mul(base)
        .and_then(|v| v.checked_add(amount_in_with_fee))
        .ok_or(SwapError::MathOverflow)?;

    Ok(numerator / denominator)
}

/// Input amount for a fixed output, rounded up:
/// (Rin·out·base) / ((Rout−out)·(base−fee)) + 1.
pub fn get_amount_in(
    amount_out: U256,
    reserve_in: U256,
    reserve_out: U256,
    fee_bips: u32,
) -> SwapResult<U256> {
    if reserve_in.is_zero() || reserve_out.is_zero() {
        return Err(SwapError::InvalidPoolState(
            "pool has zero reserves".to_string(),
        ));
    }
    if amount_out >= reserve_out {
        return Err(SwapError::InsufficientLiquidity {
            available: reserve_out,
            required: amount_out,
        });
    }
    if amount_out.is_zero() {
        return Ok(U256::zero());
    }

    let base = U256::from(BIPS_BASE);
    let fee_num = U256::from(BIPS_BASE - fee_bips as u64);
    let numerator = reserve_in
        .checked_mul(amount_out)
        .and_then(|v| v.checked_mul(base))
        .ok_or(SwapError::MathOverflow)?;
    let denominator = (reserve_out - amount_out)
        .checked_mul(fee_num)
        .ok_or(SwapError::MathOverflow)?;

    Ok(numerator / denominator + U256::one())
}

#[async_trait::async_trait]
impl crate::quotes::QuoteSource for LocalQuoteSource {
    async fn quote(
        &self,
        route: &Route,
        amount: U256,
        trade_type: TradeType,
    ) -> SwapResult<TokenAmount> {
        match trade_type {
            TradeType::ExactInput => {
                let mut current = amount;
                for (pool, token_in) in route.pools.iter().zip(route.path.iter()) {
                    let reserve_in = pool.reserve_of(token_in)?;
                    let reserve_out = pool.reserve_of(pool.other(token_in)?)?;
                    current = get_amount_out(current, reserve_in, reserve_out, pool.fee_bips)?;
                }
                debug!(
                    "Local quote: {} in -> {} out over {} hops",
                    amount,
                    current,
                    route.hops()
                );
                Ok(TokenAmount::new(route.output.clone(), current))
            }
            TradeType::ExactOutput => {
                let mut current = amount;
                for (pool, token_out) in route
                    .pools
                    .iter()
                    .rev()
                    .zip(route.path.iter().rev())
                {
                    let reserve_out = pool.reserve_of(token_out)?;
                    let reserve_in = pool.reserve_of(pool.other(token_out)?)?;
                    current = get_amount_in(current, reserve_in, reserve_out, pool.fee_bips)?;
                }
                debug!(
                    "Local quote: {} in -> {} out over {} hops",
                    current,
                    amount,
                    route.hops()
                );
                Ok(TokenAmount::new(route.input.clone(), current))
            }
        }
    }
}
