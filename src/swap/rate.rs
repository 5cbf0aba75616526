//! Conversion between satoshis and asset units under a fixed-point quote.
//!
//! A quote `(coefficient, scale)` means `coefficient / 10^scale` asset units
//! per bitcoin, so one asset unit costs `1e8 / (coefficient / 10^scale)`
//! satoshis. All math is done on the exact rational and truncates toward
//! zero.

use thiserror::Error;

use super::PriceQuote;

pub const SATS_PER_BTC: u128 = 100_000_000;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RateError {
    #[error("invalid rate coefficient {0:?}")]
    InvalidCoefficient(String),
    #[error("rate coefficient must be > 0")]
    ZeroCoefficient,
    #[error("rate scale {0} out of range")]
    ScaleOutOfRange(u32),
    #[error("amount must be >= 0, got {0}")]
    NegativeAmount(i64),
    #[error("amount overflow converting {0}")]
    Overflow(i64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedPointRate {
    coefficient: u128,
    scale: u32,
}

impl FixedPointRate {
    /// Accepts integer coefficients (`"1000000000"`) as well as decimal ones
    /// (`"10.5"`); a fractional part is folded into the scale.
    pub fn parse(coefficient: &str, scale: u32) -> Result<Self, RateError> {
        let raw = coefficient.trim();
        let invalid = || RateError::InvalidCoefficient(coefficient.to_string());

        let (int_part, frac_part) = match raw.split_once('.') {
            Some((i, f)) => (i, f),
            None => (raw, ""),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(invalid());
        }
        if !int_part.bytes().chain(frac_part.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        let digits = format!("{int_part}{frac_part}");
        let coefficient: u128 = digits.parse().map_err(|_| invalid())?;
        let frac_len = u32::try_from(frac_part.len()).map_err(|_| invalid())?;
        let scale = scale
            .checked_add(frac_len)
            .ok_or(RateError::ScaleOutOfRange(scale))?;

        if coefficient == 0 {
            return Err(RateError::ZeroCoefficient);
        }
        pow10(scale)?;

        Ok(Self { coefficient, scale })
    }

    pub fn from_quote(quote: &PriceQuote) -> Result<Self, RateError> {
        Self::parse(&quote.coefficient, quote.scale)
    }

    /// Same rate with trailing zeros of the coefficient folded into the
    /// scale, so `("1000", 3)` and `("1", 0)` compare equal.
    pub fn normalized(&self) -> Self {
        let mut out = *self;
        while out.scale > 0 && out.coefficient % 10 == 0 {
            out.coefficient /= 10;
            out.scale -= 1;
        }
        out
    }

    pub fn same_rate(&self, other: &Self) -> bool {
        self.normalized() == other.normalized()
    }

    /// `sat * coefficient / (1e8 * 10^scale)`
    pub fn sat_to_asset(&self, sat: i64) -> Result<i64, RateError> {
        let den = SATS_PER_BTC
            .checked_mul(pow10(self.scale)?)
            .ok_or(RateError::ScaleOutOfRange(self.scale))?;
        mul_div(sat, self.coefficient, den)
    }

    /// `units * 1e8 * 10^scale / coefficient`
    pub fn asset_to_sat(&self, units: i64) -> Result<i64, RateError> {
        let num = SATS_PER_BTC
            .checked_mul(pow10(self.scale)?)
            .ok_or(RateError::ScaleOutOfRange(self.scale))?;
        mul_div(units, num, self.coefficient)
    }
}

impl std::fmt::Display for FixedPointRate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}e-{}", self.coefficient, self.scale)
    }
}

pub fn sat_to_asset(sat: i64, quote: &PriceQuote) -> Result<i64, RateError> {
    FixedPointRate::from_quote(quote)?.sat_to_asset(sat)
}

pub fn asset_to_sat(units: i64, quote: &PriceQuote) -> Result<i64, RateError> {
    FixedPointRate::from_quote(quote)?.asset_to_sat(units)
}

/// Sats per asset unit, for logging. Truncated.
pub fn price_sat_per_unit(quote: &PriceQuote) -> Result<i64, RateError> {
    asset_to_sat(1, quote)
}

fn pow10(exp: u32) -> Result<u128, RateError> {
    10u128
        .checked_pow(exp)
        .ok_or(RateError::ScaleOutOfRange(exp))
}

fn gcd(mut a: u128, mut b: u128) -> u128 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

fn mul_div(amount: i64, num: u128, den: u128) -> Result<i64, RateError> {
    let value = u128::try_from(amount).map_err(|_| RateError::NegativeAmount(amount))?;
    let g = gcd(num, den);
    let (num, den) = (num / g, den / g);
    let product = value
        .checked_mul(num)
        .ok_or(RateError::Overflow(amount))?;
    i64::try_from(product / den).map_err(|_| RateError::Overflow(amount))
}
