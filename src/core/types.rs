use crate::core::error::{SwapError, SwapResult};
use crate::core::fraction::{u256_to_bigint, Fraction};
use ethers::types::{Address, U256};
use num_bigint::BigInt;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// A contract-addressed ERC-20 token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenInfo {
    pub chain_id: u64,
    pub address: Address,
    pub decimals: u8,
    pub symbol: String,
    pub name: String,
}

impl PartialEq for TokenInfo {
    fn eq(&self, other: &Self) -> bool {
        self.chain_id == other.chain_id && self.address == other.address
    }
}

impl Eq for TokenInfo {}

impl Hash for TokenInfo {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.chain_id.hash(state);
        self.address.hash(state);
    }
}

/// A fungible asset: the chain's native asset or an ERC-20 token.
/// Equality is structural: native-vs-native on the same chain, or same
/// chain and contract address.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Currency {
    Native { chain_id: u64 },
    Token(TokenInfo),
}

impl Currency {
    pub fn chain_id(&self) -> u64 {
        match self {
            Currency::Native { chain_id } => *chain_id,
            Currency::Token(token) => token.chain_id,
        }
    }

    pub fn decimals(&self) -> u8 {
        match self {
            Currency::Native { .. } => 18,
            Currency::Token(token) => token.decimals,
        }
    }

    pub fn symbol(&self) -> &str {
        match self {
            Currency::Native { .. } => "ETH",
            Currency::Token(token) => &token.symbol,
        }
    }

    pub fn is_native(&self) -> bool {
        matches!(self, Currency::Native { .. })
    }

    /// The token address this currency routes through: its own address for
    /// a token, the wrapped-native address otherwise.
    pub fn wrapped_address(&self, weth: Address) -> Address {
        match self {
            Currency::Native { .. } => weth,
            Currency::Token(token) => token.address,
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// An exact on-chain amount of a currency, in smallest units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenAmount {
    pub currency: Currency,
    pub raw: U256,
}

impl TokenAmount {
    pub fn new(currency: Currency, raw: U256) -> Self {
        Self { currency, raw }
    }

    /// Parses a human-readable decimal string ("1.5") into smallest units,
    /// exactly. More fractional digits than the currency carries is an
    /// error rather than silent truncation.
    pub fn from_decimal_str(currency: Currency, value: &str) -> SwapResult<Self> {
        let decimals = currency.decimals() as usize;
        let (int_part, frac_part) = match value.split_once('.') {
            Some((i, f)) => (i, f),
            None => (value, ""),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(SwapError::InvalidAmount(value.to_string()));
        }
        if frac_part.len() > decimals {
            return Err(SwapError::InvalidAmount(format!(
                "{} has more than {} decimal places",
                value, decimals
            )));
        }
        let mut digits = String::with_capacity(int_part.len() + decimals);
        digits.push_str(if int_part.is_empty() { "0" } else { int_part });
        digits.push_str(frac_part);
        for _ in 0..(decimals - frac_part.len()) {
            digits.push('0');
        }
        let raw = U256::from_dec_str(&digits)
            .map_err(|_| SwapError::InvalidAmount(value.to_string()))?;
        Ok(Self { currency, raw })
    }

    pub fn as_fraction(&self) -> Fraction {
        Fraction::from_u256(self.raw)
    }

    /// Amount scaled down by the currency's decimals, rendered exactly.
    pub fn to_decimal_string(&self, dp: usize) -> String {
        let scale = BigInt::from(10u32).pow(self.currency.decimals() as u32);
        Fraction::new(u256_to_bigint(self.raw), scale)
            .expect("decimal scale is non-zero")
            .to_decimal_string(dp)
    }
}

/// Trade direction: which side of the swap the user fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TradeType {
    ExactInput,
    ExactOutput,
}

impl fmt::Display for TradeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeType::ExactInput => write!(f, "exact input"),
            TradeType::ExactOutput => write!(f, "exact output"),
        }
    }
}

/// Read-only snapshot of a v2-style pair, canonically ordered by token
/// address. Staleness is judged by `block_number` against the latest
/// known block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pool {
    pub address: Address,
    pub token0: TokenInfo,
    pub token1: TokenInfo,
    pub reserve0: U256,
    pub reserve1: U256,
    pub fee_bips: u32,
    pub block_number: u64,
}

impl Pool {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        address: Address,
        token_a: TokenInfo,
        token_b: TokenInfo,
        reserve_a: U256,
        reserve_b: U256,
        fee_bips: u32,
        block_number: u64,
    ) -> SwapResult<Self> {
        if token_a.address == token_b.address {
            return Err(SwapError::InvalidPoolState(
                "pool tokens must differ".to_string(),
            ));
        }
        let (token0, token1, reserve0, reserve1) = if token_a.address < token_b.address {
            (token_a, token_b, reserve_a, reserve_b)
        } else {
            (token_b, token_a, reserve_b, reserve_a)
        };
        Ok(Self {
            address,
            token0,
            token1,
            reserve0,
            reserve1,
            fee_bips,
            block_number,
        })
    }

    pub fn involves(&self, token: &TokenInfo) -> bool {
        self.token0 == *token || self.token1 == *token
    }

    pub fn other(&self, token: &TokenInfo) -> SwapResult<&TokenInfo> {
        if self.token0 == *token {
            Ok(&self.token1)
        } else if self.token1 == *token {
            Ok(&self.token0)
        } else {
            Err(SwapError::InvalidPoolState(format!(
                "token {} not in pool {:?}",
                token.symbol, self.address
            )))
        }
    }

    pub fn reserve_of(&self, token: &TokenInfo) -> SwapResult<U256> {
        if self.token0 == *token {
            Ok(self.reserve0)
        } else if self.token1 == *token {
            Ok(self.reserve1)
        } else {
            Err(SwapError::InvalidPoolState(format!(
                "token {} not in pool {:?}",
                token.symbol, self.address
            )))
        }
    }

    /// Spot price of `input` in units of the opposite token, raw reserves.
    pub fn spot_price(&self, input: &TokenInfo) -> SwapResult<Fraction> {
        let reserve_in = self.reserve_of(input)?;
        let reserve_out = self.reserve_of(self.other(input)?)?;
        Fraction::new(u256_to_bigint(reserve_out), u256_to_bigint(reserve_in))
            .map_err(|_| SwapError::InvalidPoolState("pool has zero reserves".to_string()))
    }
}

/// An ordered chain of pools connecting an input currency to an output
/// currency. `path` holds the tokens traversed, one more entry than pools.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub pools: Vec<Pool>,
    pub path: Vec<TokenInfo>,
    pub input: Currency,
    pub output: Currency,
}

impl Route {
    /// Validates connectivity: the first pool must involve the (wrapped)
    /// input, each subsequent pool must continue where the previous one
    /// left off, and the chain must end at the (wrapped) output.
    pub fn new(
        pools: Vec<Pool>,
        input: Currency,
        output: Currency,
        weth: Address,
    ) -> SwapResult<Self> {
        if pools.is_empty() {
            return Err(SwapError::InvalidRoute("route has no pools".to_string()));
        }
        let wrapped_in = input.wrapped_address(weth);
        let wrapped_out = output.wrapped_address(weth);
        if wrapped_in == wrapped_out {
            return Err(SwapError::InvalidRoute(
                "route input and output are the same asset".to_string(),
            ));
        }

        let first = &pools[0];
        let mut current = if first.token0.address == wrapped_in {
            first.token0.clone()
        } else if first.token1.address == wrapped_in {
            first.token1.clone()
        } else {
            return Err(SwapError::InvalidRoute(
                "first pool does not involve the input".to_string(),
            ));
        };

        let mut path = vec![current.clone()];
        for pool in &pools {
            let next = pool.other(&current).map_err(|_| {
                SwapError::InvalidRoute("adjacent pools do not share a token".to_string())
            })?;
            path.push(next.clone());
            current = next.clone();
        }

        if current.address != wrapped_out {
            return Err(SwapError::InvalidRoute(
                "route does not end at the output".to_string(),
            ));
        }

        Ok(Self {
            pools,
            path,
            input,
            output,
        })
    }

    pub fn hops(&self) -> usize {
        self.pools.len()
    }

    /// Mid price along the route: product of per-hop spot prices, raw units.
    pub fn mid_price(&self) -> SwapResult<Fraction> {
        let mut price = Fraction::one();
        for (pool, token_in) in self.pools.iter().zip(self.path.iter()) {
            price = price.mul(&pool.spot_price(token_in)?);
        }
        Ok(price)
    }
}

/// A priced, directional swap proposal. Immutable; superseded wholesale
/// when any input changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trade {
    pub route: Route,
    pub trade_type: TradeType,
    pub input_amount: TokenAmount,
    pub output_amount: TokenAmount,
}

impl Trade {
    pub fn new(
        route: Route,
        trade_type: TradeType,
        input_raw: U256,
        output_raw: U256,
    ) -> Self {
        let input_amount = TokenAmount::new(route.input.clone(), input_raw);
        let output_amount = TokenAmount::new(route.output.clone(), output_raw);
        Self {
            route,
            trade_type,
            input_amount,
            output_amount,
        }
    }

    /// Output per unit input, raw units. Exact.
    pub fn execution_price(&self) -> SwapResult<Fraction> {
        Fraction::new(
            u256_to_bigint(self.output_amount.raw),
            u256_to_bigint(self.input_amount.raw),
        )
        .map_err(|_| SwapError::InvalidAmount("trade input amount is zero".to_string()))
    }

    /// Input per unit output, raw units. Lower is better for the payer.
    pub fn cost_price(&self) -> SwapResult<Fraction> {
        Fraction::new(
            u256_to_bigint(self.input_amount.raw),
            u256_to_bigint(self.output_amount.raw),
        )
        .map_err(|_| SwapError::InvalidAmount("trade output amount is zero".to_string()))
    }
}

/// Pipeline input: what the user asked to swap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteRequest {
    pub currency_in: Currency,
    pub currency_out: Currency,
    /// Raw amount of the side fixed by `trade_type`.
    pub amount: U256,
    pub trade_type: TradeType,
}

/// Outcome of one trade-derivation cycle. Validation outcomes are values,
/// not errors; `NoRouteFound` in particular is an expected business state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TradeState {
    Loading,
    Invalid,
    NoRouteFound,
    Valid(Trade),
}

impl TradeState {
    pub fn trade(&self) -> Option<&Trade> {
        match self {
            TradeState::Valid(trade) => Some(trade),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::constants::V2_FEE_BIPS;

    pub fn token(chain_id: u64, byte: u8, decimals: u8, symbol: &str) -> TokenInfo {
        TokenInfo {
            chain_id,
            address: Address::from_low_u64_be(byte as u64),
            decimals,
            symbol: symbol.to_string(),
            name: symbol.to_string(),
        }
    }

    fn pool(a: &TokenInfo, b: &TokenInfo, ra: u64, rb: u64) -> Pool {
        let marker = 0x1000 + a.address.to_low_u64_be() * 31 + b.address.to_low_u64_be();
        Pool::new(
            Address::from_low_u64_be(marker),
            a.clone(),
            b.clone(),
            U256::from(ra),
            U256::from(rb),
            V2_FEE_BIPS,
            100,
        )
        .unwrap()
    }

    #[test]
    fn test_currency_equality() {
        let native_1 = Currency::Native { chain_id: 1 };
        let native_1b = Currency::Native { chain_id: 1 };
        let native_5 = Currency::Native { chain_id: 5 };
        assert_eq!(native_1, native_1b);
        assert_ne!(native_1, native_5);

        let mut tka = token(1, 1, 18, "TKA");
        let tka_renamed = TokenInfo {
            symbol: "OTHER".to_string(),
            ..tka.clone()
        };
        // same chain+address is the same currency regardless of metadata
        assert_eq!(Currency::Token(tka.clone()), Currency::Token(tka_renamed));
        tka.chain_id = 5;
        assert_ne!(Currency::Token(token(1, 1, 18, "TKA")), Currency::Token(tka));
    }

    #[test]
    fn test_from_decimal_str() {
        let tka = Currency::Token(token(1, 1, 18, "TKA"));
        let amount = TokenAmount::from_decimal_str(tka.clone(), "1.5").unwrap();
        assert_eq!(
            amount.raw,
            U256::from_dec_str("1500000000000000000").unwrap()
        );

        let six = Currency::Token(token(1, 2, 6, "USDX"));
        let amount = TokenAmount::from_decimal_str(six.clone(), "0.000001").unwrap();
        assert_eq!(amount.raw, U256::one());

        assert!(TokenAmount::from_decimal_str(six.clone(), "0.0000001").is_err());
        assert!(TokenAmount::from_decimal_str(six, ".").is_err());
    }

    #[test]
    fn test_pool_canonical_order() {
        let a = token(1, 2, 18, "A");
        let b = token(1, 1, 18, "B");
        let p = Pool::new(
            Address::from_low_u64_be(9),
            a.clone(),
            b.clone(),
            U256::from(10u64),
            U256::from(20u64),
            V2_FEE_BIPS,
            1,
        )
        .unwrap();
        // b has the lower address, so it becomes token0 with reserve 20
        assert_eq!(p.token0, b);
        assert_eq!(p.reserve0, U256::from(20u64));
        assert_eq!(p.reserve_of(&a).unwrap(), U256::from(10u64));
    }

    #[test]
    fn test_route_connectivity() {
        let weth = Address::from_low_u64_be(0xee);
        let a = token(1, 1, 18, "A");
        let b = token(1, 2, 18, "B");
        let c = token(1, 3, 18, "C");
        let p_ab = pool(&a, &b, 1000, 1000);
        let p_bc = pool(&b, &c, 1000, 1000);

        let route = Route::new(
            vec![p_ab.clone(), p_bc.clone()],
            Currency::Token(a.clone()),
            Currency::Token(c.clone()),
            weth,
        )
        .unwrap();
        assert_eq!(route.hops(), 2);
        assert_eq!(route.path, vec![a.clone(), b.clone(), c.clone()]);

        // disconnected chain
        let d = token(1, 4, 18, "D");
        let p_cd = pool(&c, &d, 1000, 1000);
        assert!(Route::new(
            vec![p_ab, p_cd],
            Currency::Token(a.clone()),
            Currency::Token(d),
            weth,
        )
        .is_err());

        // wrong endpoint
        assert!(Route::new(
            vec![p_bc],
            Currency::Token(a),
            Currency::Token(c),
            weth
        )
        .is_err());
    }

    #[test]
    fn test_execution_and_cost_price() {
        let weth = Address::from_low_u64_be(0xee);
        let a = token(1, 1, 18, "A");
        let b = token(1, 2, 18, "B");
        let p = pool(&a, &b, 1_000_000, 1_000_000);
        let route = Route::new(
            vec![p],
            Currency::Token(a),
            Currency::Token(b),
            weth,
        )
        .unwrap();
        let trade = Trade::new(
            route,
            TradeType::ExactInput,
            U256::from(100u64),
            U256::from(50u64),
        );
        assert_eq!(
            trade.execution_price().unwrap(),
            Fraction::new(BigInt::from(1), BigInt::from(2)).unwrap()
        );
        assert_eq!(
            trade.cost_price().unwrap(),
            Fraction::new(BigInt::from(2), BigInt::from(1)).unwrap()
        );
    }
}
