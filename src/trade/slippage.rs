use crate::core::{
    bigint_to_u256, constants::*, error::SwapResult, u256_to_bigint, Fraction, Percent,
    Trade, TokenAmount, TradeType,
};
use num_bigint::BigInt;

/// Bounds the on-chain call must enforce for a trade at a given slippage
/// tolerance. The fixed side passes through unchanged; the estimated side
/// is widened by the tolerance, truncated to match on-chain rounding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlippageAdjustedAmounts {
    pub maximum_input: TokenAmount,
    pub minimum_output: TokenAmount,
}

pub fn slippage_adjusted_amounts(
    trade: &Trade,
    slippage_bips: u64,
) -> SwapResult<SlippageAdjustedAmounts> {
    let base = BigInt::from(BIPS_BASE);
    match trade.trade_type {
        TradeType::ExactInput => {
            let numerator = BigInt::from(BIPS_BASE - slippage_bips.min(BIPS_BASE));
            let min_out = Fraction::new(
                u256_to_bigint(trade.output_amount.raw) * numerator,
                base,
            )?
            .quotient();
            Ok(SlippageAdjustedAmounts {
                maximum_input: trade.input_amount.clone(),
                minimum_output: TokenAmount::new(
                    trade.output_amount.currency.clone(),
                    bigint_to_u256(&min_out)?,
                ),
            })
        }
        TradeType::ExactOutput => {
            let numerator = BigInt::from(BIPS_BASE + slippage_bips);
            let max_in = Fraction::new(
                u256_to_bigint(trade.input_amount.raw) * numerator,
                base,
            )?
            .quotient();
            Ok(SlippageAdjustedAmounts {
                maximum_input: TokenAmount::new(
                    trade.input_amount.currency.clone(),
                    bigint_to_u256(&max_in)?,
                ),
                minimum_output: trade.output_amount.clone(),
            })
        }
    }
}

/// Fee cost and genuine market-depth slippage, reported separately.
#[derive(Debug, Clone)]
pub struct PriceBreakdown {
    /// Liquidity-provider fee across all hops, compounded multiplicatively.
    pub realized_lp_fee: Percent,
    /// The fee expressed in input-currency units, truncated.
    pub realized_lp_fee_amount: TokenAmount,
    /// Mid-price vs execution slippage net of the fee component.
    pub price_impact_without_fee: Option<Percent>,
}

pub fn price_breakdown(trade: &Trade) -> SwapResult<PriceBreakdown> {
    // 1 - Π(1 - fee_hop): chained pools each take their cut of what the
    // previous hop let through
    let mut kept = Fraction::one();
    for pool in &trade.route.pools {
        let hop_kept = Fraction::new(
            BigInt::from(BIPS_BASE - pool.fee_bips as u64),
            BigInt::from(BIPS_BASE),
        )?;
        kept = kept.mul(&hop_kept);
    }
    let realized_lp_fee = Fraction::one().sub(&kept);

    let input = Fraction::from_u256(trade.input_amount.raw);
    let fee_amount_raw = input.mul(&realized_lp_fee).quotient();
    let realized_lp_fee_amount = TokenAmount::new(
        trade.input_amount.currency.clone(),
        bigint_to_u256(&fee_amount_raw)?,
    );

    let mid_price = trade.route.mid_price()?;
    let mid_output = input.mul(&mid_price);
    let price_impact_without_fee = if mid_output.is_zero() {
        None
    } else {
        let output = Fraction::from_u256(trade.output_amount.raw);
        let impact = mid_output.sub(&output).div(&mid_output)?;
        Some(Percent::from_fraction(impact.sub(&realized_lp_fee)))
    };

    Ok(PriceBreakdown {
        realized_lp_fee: Percent::from_fraction(realized_lp_fee),
        realized_lp_fee_amount,
        price_impact_without_fee,
    })
}

/// Ordinal severity of a price impact against the four ascending
/// thresholds. Unknown impact fails safe to the maximum severity.
pub fn warning_severity(price_impact: Option<&Percent>) -> u8 {
    let impact = match price_impact {
        Some(impact) => impact,
        None => return 4,
    };
    if *impact >= Percent::from_bips(PRICE_IMPACT_BLOCKED_BPS) {
        4
    } else if *impact >= Percent::from_bips(PRICE_IMPACT_HIGH_BPS) {
        3
    } else if *impact >= Percent::from_bips(PRICE_IMPACT_MEDIUM_BPS) {
        2
    } else if *impact >= Percent::from_bips(PRICE_IMPACT_LOW_BPS) {
        1
    } else {
        0
    }
}
