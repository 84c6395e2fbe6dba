//! Hand-built ABI fragments for the handful of contract calls the
//! pipeline makes: factory/pair reads, ERC-20 metadata and permit nonces,
//! and the v2 router swap methods.

use crate::core::error::{SwapError, SwapResult};
use ethabi::{Function, Param, ParamType, StateMutability, Token};
use ethers::providers::Middleware;
use ethers::types::transaction::eip2718::TypedTransaction;
use ethers::types::{Address, TransactionRequest};

fn param(name: &str, kind: ParamType) -> Param {
    Param {
        name: name.to_string(),
        kind,
        internal_type: None,
    }
}

#[allow(deprecated)]
fn function(
    name: &str,
    inputs: Vec<Param>,
    outputs: Vec<Param>,
    state_mutability: StateMutability,
) -> Function {
    Function {
        name: name.to_string(),
        inputs,
        outputs,
        constant: None,
        state_mutability,
    }
}

pub fn erc20_decimals() -> Function {
    function(
        "decimals",
        vec![],
        vec![param("", ParamType::Uint(8))],
        StateMutability::View,
    )
}

pub fn erc20_symbol() -> Function {
    function(
        "symbol",
        vec![],
        vec![param("", ParamType::String)],
        StateMutability::View,
    )
}

pub fn erc20_name() -> Function {
    function(
        "name",
        vec![],
        vec![param("", ParamType::String)],
        StateMutability::View,
    )
}

pub fn erc20_nonces() -> Function {
    function(
        "nonces",
        vec![param("owner", ParamType::Address)],
        vec![param("", ParamType::Uint(256))],
        StateMutability::View,
    )
}

pub fn factory_get_pair() -> Function {
    function(
        "getPair",
        vec![
            param("tokenA", ParamType::Address),
            param("tokenB", ParamType::Address),
        ],
        vec![param("pair", ParamType::Address)],
        StateMutability::View,
    )
}

pub fn pair_token0() -> Function {
    function(
        "token0",
        vec![],
        vec![param("", ParamType::Address)],
        StateMutability::View,
    )
}

pub fn pair_get_reserves() -> Function {
    function(
        "getReserves",
        vec![],
        vec![
            param("reserve0", ParamType::Uint(112)),
            param("reserve1", ParamType::Uint(112)),
            param("blockTimestampLast", ParamType::Uint(32)),
        ],
        StateMutability::View,
    )
}

/// The nine classic v2 router swap methods, by name. The non-exact side,
/// the path, the recipient and the deadline are positional; the
/// fee-on-transfer variants return nothing.
pub fn v2_swap_function(name: &str) -> SwapResult<Function> {
    let amounts_out = vec![param(
        "amounts",
        ParamType::Array(Box::new(ParamType::Uint(256))),
    )];
    let path = param("path", ParamType::Array(Box::new(ParamType::Address)));
    let to = param("to", ParamType::Address);
    let deadline = param("deadline", ParamType::Uint(256));

    let f = match name {
        "swapExactETHForTokens" => function(
            name,
            vec![
                param("amountOutMin", ParamType::Uint(256)),
                path,
                to,
                deadline,
            ],
            amounts_out,
            StateMutability::Payable,
        ),
        "swapExactETHForTokensSupportingFeeOnTransferTokens" => function(
            name,
            vec![
                param("amountOutMin", ParamType::Uint(256)),
                path,
                to,
                deadline,
            ],
            vec![],
            StateMutability::Payable,
        ),
        "swapExactTokensForETH" => function(
            name,
            vec![
                param("amountIn", ParamType::Uint(256)),
                param("amountOutMin", ParamType::Uint(256)),
                path,
                to,
                deadline,
            ],
            amounts_out,
            StateMutability::NonPayable,
        ),
        "swapExactTokensForETHSupportingFeeOnTransferTokens" => function(
            name,
            vec![
                param("amountIn", ParamType::Uint(256)),
                param("amountOutMin", ParamType::Uint(256)),
                path,
                to,
                deadline,
            ],
            vec![],
            StateMutability::NonPayable,
        ),
        "swapExactTokensForTokens" => function(
            name,
            vec![
                param("amountIn", ParamType::Uint(256)),
                param("amountOutMin", ParamType::Uint(256)),
                path,
                to,
                deadline,
            ],
            amounts_out,
            StateMutability::NonPayable,
        ),
        "swapExactTokensForTokensSupportingFeeOnTransferTokens" => function(
            name,
            vec![
                param("amountIn", ParamType::Uint(256)),
                param("amountOutMin", ParamType::Uint(256)),
                path,
                to,
                deadline,
            ],
            vec![],
            StateMutability::NonPayable,
        ),
        "swapETHForExactTokens" => function(
            name,
            vec![param("amountOut", ParamType::Uint(256)), path, to, deadline],
            amounts_out,
            StateMutability::Payable,
        ),
        "swapTokensForExactETH" => function(
            name,
            vec![
                param("amountOut", ParamType::Uint(256)),
                param("amountInMax", ParamType::Uint(256)),
                path,
                to,
                deadline,
            ],
            amounts_out,
            StateMutability::NonPayable,
        ),
        "swapTokensForExactTokens" => function(
            name,
            vec![
                param("amountOut", ParamType::Uint(256)),
                param("amountInMax", ParamType::Uint(256)),
                path,
                to,
                deadline,
            ],
            amounts_out,
            StateMutability::NonPayable,
        ),
        other => {
            return Err(SwapError::AbiError(format!(
                "unknown router method {}",
                other
            )))
        }
    };
    Ok(f)
}

/// Read-only contract call: encode, eth_call, decode.
pub async fn call_read<M: Middleware>(
    client: &M,
    to: Address,
    func: &Function,
    args: &[Token],
) -> SwapResult<Vec<Token>> {
    let data = func.encode_input(args)?;
    let tx: TypedTransaction = TransactionRequest::new().to(to).data(data).into();
    let result = client
        .call(&tx, None)
        .await
        .map_err(SwapError::provider)?;
    Ok(func.decode_output(&result)?)
}

pub fn as_address(token: &Token) -> SwapResult<Address> {
    match token {
        Token::Address(addr) => Ok(*addr),
        other => Err(SwapError::AbiError(format!(
            "expected address, got {:?}",
            other
        ))),
    }
}

pub fn as_uint(token: &Token) -> SwapResult<ethers::types::U256> {
    match token {
        Token::Uint(value) => Ok(*value),
        other => Err(SwapError::AbiError(format!(
            "expected uint, got {:?}",
            other
        ))),
    }
}

pub fn as_string(token: &Token) -> SwapResult<String> {
    match token {
        Token::String(value) => Ok(value.clone()),
        other => Err(SwapError::AbiError(format!(
            "expected string, got {:?}",
            other
        ))),
    }
}
