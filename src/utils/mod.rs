use crate::core::{abi, constants::*, error::SwapResult, Currency, SwapError, TokenInfo};
use ethers::providers::Middleware;
use ethers::types::Address;
use std::str::FromStr;

/// Well-known mainnet token metadata, so common symbols work without an
/// on-chain round trip.
pub fn well_known_token(symbol: &str) -> Option<TokenInfo> {
    let (address, decimals, symbol, name) = match symbol.to_uppercase().as_str() {
        "WETH" => (WETH_ADDRESS, 18, "WETH", "Wrapped Ether"),
        "DAI" => (DAI_ADDRESS, 18, "DAI", "Dai Stablecoin"),
        "USDC" => (USDC_ADDRESS, 6, "USDC", "USD Coin"),
        "USDT" => (USDT_ADDRESS, 6, "USDT", "Tether USD"),
        "UNI" => (UNI_ADDRESS, 18, "UNI", "Uniswap"),
        _ => return None,
    };
    Some(TokenInfo {
        chain_id: MAINNET_CHAIN_ID,
        address: Address::from_str(address).unwrap(),
        decimals,
        symbol: symbol.to_string(),
        name: name.to_string(),
    })
}

/// Base tokens candidate routes may hop through.
pub fn mainnet_bases() -> Vec<TokenInfo> {
    ["WETH", "DAI", "USDC", "USDT"]
        .iter()
        .filter_map(|symbol| well_known_token(symbol))
        .collect()
}

/// Parse a token symbol or hex address into an address.
pub fn parse_token_identifier(input: &str) -> Option<Address> {
    if let Ok(address) = Address::from_str(input) {
        return Some(address);
    }
    well_known_token(input).map(|token| token.address)
}

/// Resolves a CLI token identifier into a currency: "ETH" for the native
/// asset, a known symbol from the static table, or an address whose
/// metadata is read from the chain.
pub async fn load_currency<M: Middleware>(
    client: &M,
    input: &str,
    chain_id: u64,
) -> SwapResult<Currency> {
    if input.eq_ignore_ascii_case("eth") {
        return Ok(Currency::Native { chain_id });
    }
    if let Some(mut token) = well_known_token(input) {
        token.chain_id = chain_id;
        return Ok(Currency::Token(token));
    }

    let address = Address::from_str(input)
        .map_err(|_| SwapError::InvalidAddress(input.to_string()))?;

    let decimals_out = abi::call_read(client, address, &abi::erc20_decimals(), &[]).await?;
    let decimals = abi::as_uint(
        decimals_out
            .first()
            .ok_or_else(|| SwapError::AbiError("empty decimals result".to_string()))?,
    )?
    .as_u64() as u8;

    let symbol = match abi::call_read(client, address, &abi::erc20_symbol(), &[]).await {
        Ok(tokens) => tokens
            .first()
            .and_then(|t| abi::as_string(t).ok())
            .unwrap_or_else(|| "UNKNOWN".to_string()),
        Err(_) => "UNKNOWN".to_string(),
    };
    let name = match abi::call_read(client, address, &abi::erc20_name(), &[]).await {
        Ok(tokens) => tokens
            .first()
            .and_then(|t| abi::as_string(t).ok())
            .unwrap_or_else(|| symbol.clone()),
        Err(_) => symbol.clone(),
    };

    Ok(Currency::Token(TokenInfo {
        chain_id,
        address,
        decimals,
        symbol,
        name,
    }))
}

/// Format large numbers with thousands separators.
pub fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::new();
    let mut count = 0;

    for ch in s.chars().rev() {
        if count == 3 {
            result.push(',');
            count = 0;
        }
        result.push(ch);
        count += 1;
    }

    result.chars().rev().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_well_known_tokens() {
        assert_eq!(well_known_token("usdc").unwrap().decimals, 6);
        assert_eq!(well_known_token("WETH").unwrap().decimals, 18);
        assert!(well_known_token("UNKNOWN").is_none());
    }

    #[test]
    fn test_parse_token_identifier() {
        assert!(parse_token_identifier("DAI").is_some());
        assert!(parse_token_identifier(WETH_ADDRESS).is_some());
        assert!(parse_token_identifier("not-a-token").is_none());
    }

    #[test]
    fn test_mainnet_bases_start_with_weth() {
        let bases = mainnet_bases();
        assert_eq!(bases[0].symbol, "WETH");
        assert_eq!(bases.len(), 4);
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(1234567890), "1,234,567,890");
        assert_eq!(format_number(1000), "1,000");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(0), "0");
    }
}
