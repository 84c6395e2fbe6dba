use crate::core::{error::SwapResult, Fraction, Percent, SwapError, Trade};

/// Decides whether `trade_a` beats `trade_b` by more than `minimum_delta`.
///
/// Presence beats absence; with neither trade present the answer is
/// indeterminate (`None`). Both trades must share trade type and both
/// currency pairs — anything else is a caller bug and faults. Costs are
/// compared as exact rationals (input paid per unit of output); with a
/// positive delta, A only wins if its cost scaled up by (1 + delta) is
/// still strictly below B's, so minor re-quotes cannot flip the answer
/// back and forth.
pub fn is_trade_better(
    trade_a: Option<&Trade>,
    trade_b: Option<&Trade>,
    minimum_delta: &Percent,
) -> SwapResult<Option<bool>> {
    let (a, b) = match (trade_a, trade_b) {
        (Some(_), None) => return Ok(Some(true)),
        (None, Some(_)) => return Ok(Some(false)),
        (None, None) => return Ok(None),
        (Some(a), Some(b)) => (a, b),
    };

    if a.trade_type != b.trade_type {
        return Err(SwapError::IncomparableTrades(
            "trade types differ".to_string(),
        ));
    }
    if a.input_amount.currency != b.input_amount.currency {
        return Err(SwapError::IncomparableTrades(
            "input currencies differ".to_string(),
        ));
    }
    if a.output_amount.currency != b.output_amount.currency {
        return Err(SwapError::IncomparableTrades(
            "output currencies differ".to_string(),
        ));
    }

    let cost_a = a.cost_price()?;
    let cost_b = b.cost_price()?;

    if minimum_delta.is_zero() {
        Ok(Some(cost_a < cost_b))
    } else {
        let scaled = cost_a.mul(&Fraction::one().add(minimum_delta.as_fraction()));
        Ok(Some(scaled < cost_b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{constants::V2_FEE_BIPS, Currency, Pool, Route, TokenInfo, TradeType};
    use ethers::types::{Address, U256};

    fn token(byte: u64, symbol: &str) -> TokenInfo {
        TokenInfo {
            chain_id: 1,
            address: Address::from_low_u64_be(byte),
            decimals: 18,
            symbol: symbol.to_string(),
            name: symbol.to_string(),
        }
    }

    fn route(a: &TokenInfo, b: &TokenInfo) -> Route {
        let pool = Pool::new(
            Address::from_low_u64_be(0x1001),
            a.clone(),
            b.clone(),
            U256::from(1_000_000u64),
            U256::from(1_000_000u64),
            V2_FEE_BIPS,
            100,
        )
        .unwrap();
        Route::new(
            vec![pool],
            Currency::Token(a.clone()),
            Currency::Token(b.clone()),
            Address::from_low_u64_be(0xee),
        )
        .unwrap()
    }

    fn trade(trade_type: TradeType, input: u64, output: u64) -> Trade {
        let a = token(1, "TKA");
        let b = token(2, "TKB");
        Trade::new(route(&a, &b), trade_type, U256::from(input), U256::from(output))
    }

    #[test]
    fn test_presence_beats_absence() {
        let t = trade(TradeType::ExactInput, 100, 99);
        assert_eq!(
            is_trade_better(Some(&t), None, &Percent::zero()).unwrap(),
            Some(true)
        );
        assert_eq!(
            is_trade_better(None, Some(&t), &Percent::zero()).unwrap(),
            Some(false)
        );
        assert_eq!(is_trade_better(None, None, &Percent::zero()).unwrap(), None);
    }

    #[test]
    fn test_equal_prices_are_not_better() {
        let a = trade(TradeType::ExactInput, 100, 99);
        let b = trade(TradeType::ExactInput, 100, 99);
        assert_eq!(
            is_trade_better(Some(&a), Some(&b), &Percent::zero()).unwrap(),
            Some(false)
        );
    }

    #[test]
    fn test_strictly_cheaper_wins_at_zero_delta() {
        let cheap = trade(TradeType::ExactInput, 100, 100);
        let dear = trade(TradeType::ExactInput, 100, 90);
        assert_eq!(
            is_trade_better(Some(&cheap), Some(&dear), &Percent::zero()).unwrap(),
            Some(true)
        );
        assert_eq!(
            is_trade_better(Some(&dear), Some(&cheap), &Percent::zero()).unwrap(),
            Some(false)
        );
    }

    #[test]
    fn test_minimum_delta_hysteresis() {
        // a costs 1.00 per output unit, b costs 1.005: only 50 bips apart
        let a = trade(TradeType::ExactInput, 1000, 1000);
        let b = trade(TradeType::ExactInput, 1005, 1000);
        let one_percent = Percent::from_bips(100);

        // at zero delta a is better
        assert_eq!(
            is_trade_better(Some(&a), Some(&b), &Percent::zero()).unwrap(),
            Some(true)
        );
        // within the 1% band the improvement is not enough to flip
        assert_eq!(
            is_trade_better(Some(&a), Some(&b), &one_percent).unwrap(),
            Some(false)
        );

        // a 2% improvement clears the band
        let much_better = trade(TradeType::ExactInput, 980, 1000);
        assert_eq!(
            is_trade_better(Some(&much_better), Some(&b), &one_percent).unwrap(),
            Some(true)
        );
    }

    #[test]
    fn test_mismatched_trade_types_fault() {
        let a = trade(TradeType::ExactInput, 100, 99);
        let b = trade(TradeType::ExactOutput, 100, 99);
        assert!(matches!(
            is_trade_better(Some(&a), Some(&b), &Percent::zero()),
            Err(SwapError::IncomparableTrades(_))
        ));
    }

    #[test]
    fn test_mismatched_currencies_fault() {
        let a = trade(TradeType::ExactInput, 100, 99);

        let tka = token(1, "TKA");
        let tkc = token(3, "TKC");
        let other = Trade::new(
            route(&tka, &tkc),
            TradeType::ExactInput,
            U256::from(100u64),
            U256::from(99u64),
        );
        assert!(matches!(
            is_trade_better(Some(&a), Some(&other), &Percent::zero()),
            Err(SwapError::IncomparableTrades(_))
        ));
    }
}
