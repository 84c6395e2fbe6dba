use crate::core::{abi, error::SwapResult, SwapError, Trade, TradeType};
use crate::trade::slippage_adjusted_amounts;
use ethabi::Token;
use ethers::providers::Middleware;
use ethers::types::{Address, Bytes, U256};
use log::debug;
use std::str::FromStr;

/// One candidate on-chain call for a trade: where to call, what to call it
/// with, and how much native value rides along.
#[derive(Debug, Clone)]
pub struct SwapCall {
    pub target: Address,
    pub method: &'static str,
    pub args: Vec<Token>,
    pub calldata: Bytes,
    pub value: U256,
}

#[derive(Debug, Clone)]
pub struct SwapCallOptions {
    pub allowed_slippage_bips: u64,
    pub recipient: Address,
    /// Unix-seconds deadline; without one the inputs are incomplete and no
    /// candidates are produced.
    pub deadline: Option<U256>,
}

fn encode_call(
    router: Address,
    method: &'static str,
    args: Vec<Token>,
    value: U256,
) -> SwapResult<SwapCall> {
    let function = abi::v2_swap_function(method)?;
    let calldata = function.encode_input(&args)?;
    Ok(SwapCall {
        target: router,
        method,
        args,
        calldata: calldata.into(),
        value,
    })
}

/// Produces the ordered candidate calls for a trade.
///
/// Exactly one standard call, plus — for exact-input trades — the
/// fee-on-transfer-tolerant variant of the same method appended after it,
/// since the realized output cannot be pinned down when the input token
/// takes a cut in transit.
pub fn build_swap_calls(
    trade: &Trade,
    router: Address,
    options: &SwapCallOptions,
) -> SwapResult<Vec<SwapCall>> {
    let deadline = match options.deadline {
        Some(deadline) => deadline,
        None => {
            debug!("No transaction deadline yet, producing no swap calls");
            return Ok(vec![]);
        }
    };

    let ether_in = trade.route.input.is_native();
    let ether_out = trade.route.output.is_native();
    if ether_in && ether_out {
        return Err(SwapError::InvalidRoute(
            "the router does not support native on both sides".to_string(),
        ));
    }

    let adjusted = slippage_adjusted_amounts(trade, options.allowed_slippage_bips)?;
    let amount_in = adjusted.maximum_input.raw;
    let amount_out = adjusted.minimum_output.raw;

    let path = Token::Array(
        trade
            .route
            .path
            .iter()
            .map(|token| Token::Address(token.address))
            .collect(),
    );
    let to = Token::Address(options.recipient);
    let deadline = Token::Uint(deadline);

    let mut calls = Vec::with_capacity(2);
    match trade.trade_type {
        TradeType::ExactInput => {
            let (method, fot_method, args, value): (_, _, Vec<Token>, _) = if ether_in {
                (
                    "swapExactETHForTokens",
                    "swapExactETHForTokensSupportingFeeOnTransferTokens",
                    vec![Token::Uint(amount_out), path, to, deadline],
                    amount_in,
                )
            } else if ether_out {
                (
                    "swapExactTokensForETH",
                    "swapExactTokensForETHSupportingFeeOnTransferTokens",
                    vec![
                        Token::Uint(amount_in),
                        Token::Uint(amount_out),
                        path,
                        to,
                        deadline,
                    ],
                    U256::zero(),
                )
            } else {
                (
                    "swapExactTokensForTokens",
                    "swapExactTokensForTokensSupportingFeeOnTransferTokens",
                    vec![
                        Token::Uint(amount_in),
                        Token::Uint(amount_out),
                        path,
                        to,
                        deadline,
                    ],
                    U256::zero(),
                )
            };
            calls.push(encode_call(router, method, args.clone(), value)?);
            calls.push(encode_call(router, fot_method, args, value)?);
        }
        TradeType::ExactOutput => {
            let (method, args, value): (_, Vec<Token>, _) = if ether_in {
                (
                    "swapETHForExactTokens",
                    vec![Token::Uint(amount_out), path, to, deadline],
                    amount_in,
                )
            } else if ether_out {
                (
                    "swapTokensForExactETH",
                    vec![
                        Token::Uint(amount_out),
                        Token::Uint(amount_in),
                        path,
                        to,
                        deadline,
                    ],
                    U256::zero(),
                )
            } else {
                (
                    "swapTokensForExactTokens",
                    vec![
                        Token::Uint(amount_out),
                        Token::Uint(amount_in),
                        path,
                        to,
                        deadline,
                    ],
                    U256::zero(),
                )
            };
            calls.push(encode_call(router, method, args, value)?);
        }
    }

    Ok(calls)
}

/// Where a recipient lookup currently stands. `Pending` gates the overall
/// callback at `Loading`; a failed lookup is a validation outcome, not a
/// fault.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecipientState {
    Pending,
    Resolved(Address),
    Invalid(String),
}

/// Resolves the recipient: the connected account when none is given, a
/// literal address when one parses, otherwise a name-service lookup.
pub async fn resolve_recipient<M: Middleware>(
    client: &M,
    recipient: Option<&str>,
    account: Address,
) -> RecipientState {
    let name = match recipient {
        None => return RecipientState::Resolved(account),
        Some(name) => name.trim(),
    };
    if let Ok(address) = Address::from_str(name) {
        return RecipientState::Resolved(address);
    }
    match client.resolve_name(name).await {
        Ok(address) => RecipientState::Resolved(address),
        Err(e) => RecipientState::Invalid(format!("{}: {}", name, e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{constants::V2_FEE_BIPS, Currency, Pool, Route, TokenInfo};
    use pretty_assertions::assert_eq;

    fn token(byte: u64, symbol: &str) -> TokenInfo {
        TokenInfo {
            chain_id: 1,
            address: Address::from_low_u64_be(byte),
            decimals: 18,
            symbol: symbol.to_string(),
            name: symbol.to_string(),
        }
    }

    fn weth_address() -> Address {
        Address::from_low_u64_be(0xee)
    }

    fn route(input: Currency, output: Currency) -> Route {
        let weth = token(0xee, "WETH");
        let a = token(1, "TKA");
        let b = token(2, "TKB");
        let wrapped_in = match &input {
            Currency::Native { .. } => &weth,
            Currency::Token(t) => {
                if t.address == a.address {
                    &a
                } else {
                    &b
                }
            }
        };
        let wrapped_out = match &output {
            Currency::Native { .. } => &weth,
            Currency::Token(t) => {
                if t.address == a.address {
                    &a
                } else {
                    &b
                }
            }
        };
        let pool = Pool::new(
            Address::from_low_u64_be(0x1001),
            wrapped_in.clone(),
            wrapped_out.clone(),
            U256::from(1_000_000u64),
            U256::from(1_000_000u64),
            V2_FEE_BIPS,
            100,
        )
        .unwrap();
        Route::new(vec![pool], input, output, weth_address()).unwrap()
    }

    fn options() -> SwapCallOptions {
        SwapCallOptions {
            allowed_slippage_bips: 50,
            recipient: Address::from_low_u64_be(0xaa),
            deadline: Some(U256::from(1_700_000_000u64)),
        }
    }

    fn router() -> Address {
        Address::from_low_u64_be(0xbb)
    }

    #[test]
    fn test_exact_input_appends_fee_on_transfer_variant() {
        let a = token(1, "TKA");
        let b = token(2, "TKB");
        let trade = Trade::new(
            route(Currency::Token(a), Currency::Token(b)),
            TradeType::ExactInput,
            U256::from(1000u64),
            U256::from(997u64),
        );

        let calls = build_swap_calls(&trade, router(), &options()).unwrap();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].method, "swapExactTokensForTokens");
        assert_eq!(
            calls[1].method,
            "swapExactTokensForTokensSupportingFeeOnTransferTokens"
        );
        // same arguments, different selector
        assert_eq!(calls[0].args, calls[1].args);
        assert_ne!(calls[0].calldata[..4], calls[1].calldata[..4]);
        // amountIn exact, amountOutMin slippage-adjusted: 997*9950/10000
        assert_eq!(calls[0].args[0], Token::Uint(U256::from(1000u64)));
        assert_eq!(calls[0].args[1], Token::Uint(U256::from(992u64)));
        assert_eq!(calls[0].value, U256::zero());
    }

    #[test]
    fn test_exact_output_has_single_candidate() {
        let a = token(1, "TKA");
        let b = token(2, "TKB");
        let trade = Trade::new(
            route(Currency::Token(a), Currency::Token(b)),
            TradeType::ExactOutput,
            U256::from(1004u64),
            U256::from(1000u64),
        );

        let calls = build_swap_calls(&trade, router(), &options()).unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].method, "swapTokensForExactTokens");
        // amountOut exact, amountInMax widened: 1004*10050/10000
        assert_eq!(calls[0].args[0], Token::Uint(U256::from(1000u64)));
        assert_eq!(calls[0].args[1], Token::Uint(U256::from(1009u64)));
    }

    #[test]
    fn test_native_input_attaches_value() {
        let b = token(2, "TKB");
        let trade = Trade::new(
            route(Currency::Native { chain_id: 1 }, Currency::Token(b)),
            TradeType::ExactInput,
            U256::from(1000u64),
            U256::from(997u64),
        );

        let calls = build_swap_calls(&trade, router(), &options()).unwrap();
        assert_eq!(calls[0].method, "swapExactETHForTokens");
        assert_eq!(calls[0].value, U256::from(1000u64));
        assert_eq!(calls[1].value, U256::from(1000u64));
    }

    #[test]
    fn test_native_output_selects_eth_method() {
        let a = token(1, "TKA");
        let trade = Trade::new(
            route(Currency::Token(a), Currency::Native { chain_id: 1 }),
            TradeType::ExactInput,
            U256::from(1000u64),
            U256::from(997u64),
        );

        let calls = build_swap_calls(&trade, router(), &options()).unwrap();
        assert_eq!(calls[0].method, "swapExactTokensForETH");
        assert_eq!(calls[0].value, U256::zero());
    }

    #[test]
    fn test_missing_deadline_yields_no_candidates() {
        let a = token(1, "TKA");
        let b = token(2, "TKB");
        let trade = Trade::new(
            route(Currency::Token(a), Currency::Token(b)),
            TradeType::ExactInput,
            U256::from(1000u64),
            U256::from(997u64),
        );

        let calls = build_swap_calls(
            &trade,
            router(),
            &SwapCallOptions {
                deadline: None,
                ..options()
            },
        )
        .unwrap();
        assert!(calls.is_empty());
    }

    #[test]
    fn test_selector_matches_abi() {
        let a = token(1, "TKA");
        let b = token(2, "TKB");
        let trade = Trade::new(
            route(Currency::Token(a), Currency::Token(b)),
            TradeType::ExactInput,
            U256::from(1000u64),
            U256::from(997u64),
        );
        let calls = build_swap_calls(&trade, router(), &options()).unwrap();
        let expected = abi::v2_swap_function("swapExactTokensForTokens")
            .unwrap()
            .short_signature();
        assert_eq!(&calls[0].calldata[..4], expected.as_slice());
    }
}
