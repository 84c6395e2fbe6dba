use crate::core::error::{SwapError, SwapResult};
use ethers::types::U256;
use num_bigint::{BigInt, Sign};
use num_traits::{One, Signed, Zero};
use std::cmp::Ordering;

use super::constants::BIPS_BASE;

/// Exact rational number over arbitrary-precision integers.
///
/// All price, slippage and fee arithmetic in the pipeline goes through this
/// type so results match on-chain integer math bit for bit. The denominator
/// is kept strictly positive; the sign lives in the numerator.
#[derive(Debug, Clone)]
pub struct Fraction {
    numerator: BigInt,
    denominator: BigInt,
}

impl Fraction {
    pub fn new(numerator: BigInt, denominator: BigInt) -> SwapResult<Self> {
        if denominator.is_zero() {
            return Err(SwapError::InvalidAmount(
                "fraction denominator is zero".to_string(),
            ));
        }
        if denominator.is_negative() {
            Ok(Self {
                numerator: -numerator,
                denominator: -denominator,
            })
        } else {
            Ok(Self {
                numerator,
                denominator,
            })
        }
    }

    pub fn from_bigint(value: BigInt) -> Self {
        Self {
            numerator: value,
            denominator: BigInt::one(),
        }
    }

    pub fn from_u256(value: U256) -> Self {
        Self::from_bigint(u256_to_bigint(value))
    }

    pub fn zero() -> Self {
        Self::from_bigint(BigInt::zero())
    }

    pub fn one() -> Self {
        Self::from_bigint(BigInt::one())
    }

    pub fn numerator(&self) -> &BigInt {
        &self.numerator
    }

    pub fn denominator(&self) -> &BigInt {
        &self.denominator
    }

    pub fn is_zero(&self) -> bool {
        self.numerator.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.numerator.is_negative()
    }

    pub fn add(&self, other: &Fraction) -> Fraction {
        Fraction {
            numerator: &self.numerator * &other.denominator
                + &other.numerator * &self.denominator,
            denominator: &self.denominator * &other.denominator,
        }
    }

    pub fn sub(&self, other: &Fraction) -> Fraction {
        Fraction {
            numerator: &self.numerator * &other.denominator
                - &other.numerator * &self.denominator,
            denominator: &self.denominator * &other.denominator,
        }
    }

    pub fn mul(&self, other: &Fraction) -> Fraction {
        Fraction {
            numerator: &self.numerator * &other.numerator,
            denominator: &self.denominator * &other.denominator,
        }
    }

    pub fn div(&self, other: &Fraction) -> SwapResult<Fraction> {
        Fraction::new(
            &self.numerator * &other.denominator,
            &self.denominator * &other.numerator,
        )
    }

    pub fn invert(&self) -> SwapResult<Fraction> {
        Fraction::new(self.denominator.clone(), self.numerator.clone())
    }

    /// Floor of the exact value. Matches on-chain truncation for
    /// non-negative amounts.
    pub fn quotient(&self) -> BigInt {
        // denominator > 0 invariant; adjust truncated division for
        // negative numerators so the result is a true floor.
        let q = &self.numerator / &self.denominator;
        let r = &self.numerator % &self.denominator;
        if r.is_negative() {
            q - BigInt::one()
        } else {
            q
        }
    }

    /// Decimal rendering with `dp` fractional digits, truncated.
    /// Display only; never fed back into amount math.
    pub fn to_decimal_string(&self, dp: usize) -> String {
        let sign = if self.is_negative() { "-" } else { "" };
        let abs = Fraction {
            numerator: self.numerator.abs(),
            denominator: self.denominator.clone(),
        };
        let scale = BigInt::from(10u32).pow(dp as u32);
        let scaled = (&abs.numerator * &scale) / &abs.denominator;
        let int_part = &scaled / &scale;
        let frac_part = &scaled % &scale;
        if dp == 0 {
            format!("{}{}", sign, int_part)
        } else {
            format!("{}{}.{:0>width$}", sign, int_part, frac_part, width = dp)
        }
    }
}

impl PartialEq for Fraction {
    fn eq(&self, other: &Self) -> bool {
        &self.numerator * &other.denominator == &other.numerator * &self.denominator
    }
}

impl Eq for Fraction {}

impl PartialOrd for Fraction {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Fraction {
    fn cmp(&self, other: &Self) -> Ordering {
        // denominators are positive, so cross-multiplication preserves order
        (&self.numerator * &other.denominator).cmp(&(&other.numerator * &self.denominator))
    }
}

/// A fraction of one, e.g. slippage tolerance or a fee rate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Percent(Fraction);

impl Percent {
    pub fn from_bips(bips: u64) -> Self {
        Percent(Fraction {
            numerator: BigInt::from(bips),
            denominator: BigInt::from(BIPS_BASE),
        })
    }

    pub fn from_fraction(fraction: Fraction) -> Self {
        Percent(fraction)
    }

    pub fn zero() -> Self {
        Percent(Fraction::zero())
    }

    pub fn as_fraction(&self) -> &Fraction {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Value scaled to bips, truncated. Display and thresholding only.
    pub fn to_bips(&self) -> BigInt {
        self.0
            .mul(&Fraction::from_bigint(BigInt::from(BIPS_BASE)))
            .quotient()
    }

    pub fn to_percent_string(&self, dp: usize) -> String {
        self.0
            .mul(&Fraction::from_bigint(BigInt::from(100u32)))
            .to_decimal_string(dp)
    }
}

impl PartialOrd for Percent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.0.partial_cmp(&other.0)
    }
}

pub fn u256_to_bigint(value: U256) -> BigInt {
    let mut bytes = [0u8; 32];
    value.to_big_endian(&mut bytes);
    BigInt::from_bytes_be(Sign::Plus, &bytes)
}

pub fn bigint_to_u256(value: &BigInt) -> SwapResult<U256> {
    if value.is_negative() {
        return Err(SwapError::InvalidAmount(
            "negative amount cannot be represented on-chain".to_string(),
        ));
    }
    let (_, bytes) = value.to_bytes_be();
    if bytes.len() > 32 {
        return Err(SwapError::MathOverflow);
    }
    Ok(U256::from_big_endian(&bytes))
}
