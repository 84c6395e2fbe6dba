pub mod comparator;
pub mod slippage;

pub use comparator::is_trade_better;
pub use slippage::{
    price_breakdown, slippage_adjusted_amounts, warning_severity, PriceBreakdown,
    SlippageAdjustedAmounts,
};

use crate::core::{Currency, QuoteRequest, Route, Trade, TradeState, TradeType};
use crate::discovery::RouteDiscovery;
use crate::quotes::QuoteEngine;
use ethers::types::U256;
use log::{debug, warn};

/// Builds one candidate trade per route.
///
/// Candidates whose endpoints no longer match the requested pair are
/// rejected outright: a slow route enumeration racing a newer request must
/// not produce a trade for the old pair. Routes that fail to quote are
/// skipped, not fatal.
pub async fn candidate_trades(
    engine: &QuoteEngine,
    routes: &[Route],
    request: &QuoteRequest,
) -> Vec<Trade> {
    let mut candidates = Vec::new();

    for route in routes {
        if route.input != request.currency_in || route.output != request.currency_out {
            debug!(
                "Rejecting route {} -> {}: endpoints no longer match request {} -> {}",
                route.input, route.output, request.currency_in, request.currency_out
            );
            continue;
        }

        let quoted = match engine.quote(route, request.amount, request.trade_type).await {
            Ok(amount) => amount,
            Err(e) => {
                debug!("Route failed to quote: {}", e);
                continue;
            }
        };
        if quoted.raw.is_zero() {
            debug!("Route quoted a zero amount, skipping");
            continue;
        }

        candidates.push(match request.trade_type {
            TradeType::ExactInput => Trade::new(
                route.clone(),
                request.trade_type,
                request.amount,
                quoted.raw,
            ),
            TradeType::ExactOutput => Trade::new(
                route.clone(),
                request.trade_type,
                quoted.raw,
                request.amount,
            ),
        });
    }

    candidates
}

/// Ranks the candidates and keeps the best one. Ranking is strict —
/// exact-input maximizes output, exact-output minimizes input — so ties
/// keep the first-seen candidate.
pub async fn best_trade(
    engine: &QuoteEngine,
    routes: &[Route],
    request: &QuoteRequest,
) -> TradeState {
    let mut best: Option<Trade> = None;

    for candidate in candidate_trades(engine, routes, request).await {
        let candidate_wins = match &best {
            None => true,
            Some(current) => match request.trade_type {
                TradeType::ExactInput => {
                    candidate.output_amount.raw > current.output_amount.raw
                }
                TradeType::ExactOutput => {
                    candidate.input_amount.raw < current.input_amount.raw
                }
            },
        };
        if candidate_wins {
            best = Some(candidate);
        }
    }

    match best {
        Some(trade) => TradeState::Valid(trade),
        None => TradeState::NoRouteFound,
    }
}

/// One full derivation cycle: validate inputs, discover routes against a
/// fresh block snapshot, quote and rank. Missing inputs are a no-op
/// `Invalid`, never an error.
pub async fn derive_trade(
    discovery: &RouteDiscovery,
    engine: &QuoteEngine,
    currency_in: Option<&Currency>,
    currency_out: Option<&Currency>,
    amount: Option<U256>,
    trade_type: TradeType,
    latest_block: u64,
) -> TradeState {
    let (currency_in, currency_out, amount) = match (currency_in, currency_out, amount) {
        (Some(ci), Some(co), Some(amount)) if !amount.is_zero() => (ci, co, amount),
        _ => return TradeState::Invalid,
    };
    if currency_in == currency_out {
        return TradeState::Invalid;
    }

    engine.note_latest_block(latest_block);

    let routes = match discovery
        .discover_routes(currency_in, currency_out, latest_block)
        .await
    {
        Ok(routes) => routes,
        Err(e) => {
            warn!("Route discovery failed: {}", e);
            return TradeState::Invalid;
        }
    };
    if routes.is_empty() {
        return TradeState::NoRouteFound;
    }

    let request = QuoteRequest {
        currency_in: currency_in.clone(),
        currency_out: currency_out.clone(),
        amount,
        trade_type,
    };
    best_trade(engine, &routes, &request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{constants::V2_FEE_BIPS, Fraction, Pool, TokenInfo};
    use crate::quotes::local::get_amount_out;
    use ethers::types::Address;
    use num_bigint::BigInt;

    fn token(byte: u64, symbol: &str) -> TokenInfo {
        TokenInfo {
            chain_id: 1,
            address: Address::from_low_u64_be(byte),
            decimals: 18,
            symbol: symbol.to_string(),
            name: symbol.to_string(),
        }
    }

    fn pool(id: u64, a: &TokenInfo, b: &TokenInfo, ra: U256, rb: U256) -> Pool {
        Pool::new(
            Address::from_low_u64_be(0x1000 + id),
            a.clone(),
            b.clone(),
            ra,
            rb,
            V2_FEE_BIPS,
            100,
        )
        .unwrap()
    }

    fn exact_in_request(a: &TokenInfo, b: &TokenInfo, amount: U256) -> QuoteRequest {
        QuoteRequest {
            currency_in: Currency::Token(a.clone()),
            currency_out: Currency::Token(b.clone()),
            amount,
            trade_type: TradeType::ExactInput,
        }
    }

    #[tokio::test]
    async fn test_no_routes_is_no_route_found() {
        let a = token(1, "TKA");
        let b = token(2, "TKB");
        let engine = QuoteEngine::local_only();
        let state = best_trade(
            &engine,
            &[],
            &exact_in_request(&a, &b, U256::from(1000u64)),
        )
        .await;
        assert_eq!(state, TradeState::NoRouteFound);
    }

    #[tokio::test]
    async fn test_stale_route_endpoints_rejected() {
        let a = token(1, "TKA");
        let b = token(2, "TKB");
        let c = token(3, "TKC");
        let weth = Address::from_low_u64_be(0xee);
        let reserves = U256::from(1_000_000_000u64);

        // route quotes fine, but its endpoints belong to an older request
        let stale_route = Route::new(
            vec![pool(1, &a, &c, reserves, reserves)],
            Currency::Token(a.clone()),
            Currency::Token(c),
            weth,
        )
        .unwrap();

        let engine = QuoteEngine::local_only();
        let state = best_trade(
            &engine,
            &[stale_route],
            &exact_in_request(&a, &b, U256::from(1000u64)),
        )
        .await;
        assert_eq!(state, TradeState::NoRouteFound);
    }

    #[tokio::test]
    async fn test_exact_input_maximizes_output() {
        let a = token(1, "TKA");
        let b = token(2, "TKB");
        let weth = Address::from_low_u64_be(0xee);
        let deep = U256::from(1_000_000_000u64);
        let shallow = U256::from(1_000_000u64);

        let deep_route = Route::new(
            vec![pool(1, &a, &b, deep, deep)],
            Currency::Token(a.clone()),
            Currency::Token(b.clone()),
            weth,
        )
        .unwrap();
        let shallow_route = Route::new(
            vec![pool(2, &a, &b, shallow, shallow)],
            Currency::Token(a.clone()),
            Currency::Token(b.clone()),
            weth,
        )
        .unwrap();

        let engine = QuoteEngine::local_only();
        // shallow listed first: the deeper pool still wins on output
        let state = best_trade(
            &engine,
            &[shallow_route, deep_route.clone()],
            &exact_in_request(&a, &b, U256::from(100_000u64)),
        )
        .await;
        let trade = state.trade().expect("valid trade");
        assert_eq!(trade.route, deep_route);
    }

    #[tokio::test]
    async fn test_ties_keep_first_seen() {
        let a = token(1, "TKA");
        let b = token(2, "TKB");
        let weth = Address::from_low_u64_be(0xee);
        let reserves = U256::from(1_000_000_000u64);

        let first = Route::new(
            vec![pool(1, &a, &b, reserves, reserves)],
            Currency::Token(a.clone()),
            Currency::Token(b.clone()),
            weth,
        )
        .unwrap();
        let second = Route::new(
            vec![pool(2, &a, &b, reserves, reserves)],
            Currency::Token(a.clone()),
            Currency::Token(b.clone()),
            weth,
        )
        .unwrap();

        let engine = QuoteEngine::local_only();
        let state = best_trade(
            &engine,
            &[first.clone(), second],
            &exact_in_request(&a, &b, U256::from(1000u64)),
        )
        .await;
        assert_eq!(state.trade().unwrap().route, first);
    }

    #[tokio::test]
    async fn test_exact_output_minimizes_input() {
        let a = token(1, "TKA");
        let b = token(2, "TKB");
        let weth = Address::from_low_u64_be(0xee);
        let deep = U256::from(1_000_000_000u64);
        let shallow = U256::from(1_000_000u64);

        let shallow_route = Route::new(
            vec![pool(1, &a, &b, shallow, shallow)],
            Currency::Token(a.clone()),
            Currency::Token(b.clone()),
            weth,
        )
        .unwrap();
        let deep_route = Route::new(
            vec![pool(2, &a, &b, deep, deep)],
            Currency::Token(a.clone()),
            Currency::Token(b.clone()),
            weth,
        )
        .unwrap();

        let engine = QuoteEngine::local_only();
        let state = best_trade(
            &engine,
            &[shallow_route, deep_route.clone()],
            &QuoteRequest {
                currency_in: Currency::Token(a.clone()),
                currency_out: Currency::Token(b.clone()),
                amount: U256::from(100_000u64),
                trade_type: TradeType::ExactOutput,
            },
        )
        .await;
        let trade = state.trade().expect("valid trade");
        assert_eq!(trade.route, deep_route);
        assert_eq!(trade.output_amount.raw, U256::from(100_000u64));
    }

    /// End to end over a two-hop route: the realized output trails the
    /// naive mid-price output by more than the compounded fee fraction.
    #[tokio::test]
    async fn test_two_hop_output_below_compounded_fee_bound() {
        let a = token(1, "TKA");
        let b = token(2, "TKB");
        let c = token(3, "TKC");
        let weth = Address::from_low_u64_be(0xee);
        // ample symmetric liquidity: 10^24 per side, 18-decimals tokens
        let reserves = U256::from_dec_str("1000000000000000000000000").unwrap();
        let amount_in = U256::from_dec_str("1000000000000000000000").unwrap(); // 1000 * 10^18

        let route = Route::new(
            vec![
                pool(1, &a, &b, reserves, reserves),
                pool(2, &b, &c, reserves, reserves),
            ],
            Currency::Token(a.clone()),
            Currency::Token(c.clone()),
            weth,
        )
        .unwrap();

        let engine = QuoteEngine::local_only();
        let state = best_trade(
            &engine,
            &[route],
            &QuoteRequest {
                currency_in: Currency::Token(a),
                currency_out: Currency::Token(c),
                amount: amount_in,
                trade_type: TradeType::ExactInput,
            },
        )
        .await;
        let trade = state.trade().expect("valid trade");

        // symmetric pricing: naive mid-price output equals the input
        let naive = amount_in;
        // compounded fee bound: naive * (1 - 0.005991)
        let fee_bound = Fraction::new(
            crate::core::u256_to_bigint(naive) * BigInt::from(1_000_000 - 5991),
            BigInt::from(1_000_000),
        )
        .unwrap()
        .quotient();
        let fee_bound = crate::core::bigint_to_u256(&fee_bound).unwrap();

        assert!(trade.output_amount.raw < fee_bound);

        // and it agrees with chaining the hop formula by hand
        let hop1 = get_amount_out(amount_in, reserves, reserves, V2_FEE_BIPS).unwrap();
        let hop2 = get_amount_out(hop1, reserves, reserves, V2_FEE_BIPS).unwrap();
        assert_eq!(trade.output_amount.raw, hop2);
    }

    #[tokio::test]
    async fn test_derive_trade_missing_inputs_invalid() {
        let a = token(1, "TKA");
        let weth_info = token(0xee, "WETH");
        let discovery = RouteDiscovery::new(
            vec![],
            crate::discovery::PoolCache::new(10, 60),
            weth_info.address,
            vec![weth_info.clone()],
        );
        let engine = QuoteEngine::local_only();

        let currency = Currency::Token(a);
        let state = derive_trade(
            &discovery,
            &engine,
            Some(&currency),
            None,
            Some(U256::from(1u64)),
            TradeType::ExactInput,
            100,
        )
        .await;
        assert_eq!(state, TradeState::Invalid);

        // same currency on both sides is invalid, not an error
        let state = derive_trade(
            &discovery,
            &engine,
            Some(&currency),
            Some(&currency),
            Some(U256::from(1u64)),
            TradeType::ExactInput,
            100,
        )
        .await;
        assert_eq!(state, TradeState::Invalid);

        // zero amount is incomplete input
        let other = Currency::Native { chain_id: 1 };
        let state = derive_trade(
            &discovery,
            &engine,
            Some(&currency),
            Some(&other),
            Some(U256::zero()),
            TradeType::ExactInput,
            100,
        )
        .await;
        assert_eq!(state, TradeState::Invalid);
    }
}
