//! Exact decimal numbers backed by a scaled integer.
//!
//! Sweep axes such as the error rate are stepped many times, so they are
//! never accumulated in binary floating point. A [`Decimal`] stores
//! `units / 10^scale` with trailing zeros stripped, which makes equality,
//! ordering and hashing exact.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::errors::{ErrorInfo, SweepError};

/// Largest number of fraction digits a [`Decimal`] may carry.
pub const MAX_SCALE: u32 = 18;

/// Exact decimal value `units / 10^scale`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Decimal {
    units: i128,
    scale: u32,
}

fn pow10(exp: u32) -> i128 {
    10i128.pow(exp)
}

fn decimal_error(input: &str, message: impl Into<String>) -> SweepError {
    SweepError::Config(
        ErrorInfo::new("decimal.parse", message).with_context("input", input.to_string()),
    )
}

impl Decimal {
    /// The value zero.
    pub const ZERO: Decimal = Decimal { units: 0, scale: 0 };

    /// Builds a decimal from raw scaled units, normalising trailing zeros.
    ///
    /// Fails when the scale exceeds [`MAX_SCALE`] or when the value would not
    /// be representable at [`MAX_SCALE`] fraction digits.
    pub fn from_units(units: i128, scale: u32) -> Result<Self, SweepError> {
        let (units, scale) = strip_trailing_zeros(units, scale);
        if scale > MAX_SCALE {
            return Err(SweepError::Config(
                ErrorInfo::new(
                    "decimal.scale",
                    format!("decimal carries more than {MAX_SCALE} fraction digits"),
                )
                .with_context("scale", scale.to_string()),
            ));
        }
        if units.checked_mul(pow10(MAX_SCALE - scale)).is_none() {
            return Err(SweepError::Config(ErrorInfo::new(
                "decimal.overflow",
                "decimal magnitude out of range",
            )));
        }
        Ok(Self { units, scale })
    }

    /// Integer units at the decimal's own scale.
    pub fn units(&self) -> i128 {
        self.units
    }

    /// Number of fraction digits after normalisation.
    pub fn scale(&self) -> u32 {
        self.scale
    }

    /// Units expressed at a larger scale. Returns `None` when `scale` is
    /// smaller than the decimal's own scale or exceeds [`MAX_SCALE`].
    pub fn units_at(&self, scale: u32) -> Option<i128> {
        if scale < self.scale || scale > MAX_SCALE {
            return None;
        }
        self.units.checked_mul(pow10(scale - self.scale))
    }

    /// True for values strictly above zero.
    pub fn is_positive(&self) -> bool {
        self.units > 0
    }

    /// True for values strictly below zero.
    pub fn is_negative(&self) -> bool {
        self.units < 0
    }

    /// Renders the value with exactly `precision` fraction digits.
    pub fn to_fixed(&self, precision: u32) -> Result<String, SweepError> {
        let units = self.units_at(precision).ok_or_else(|| {
            SweepError::Config(
                ErrorInfo::new(
                    "decimal.precision",
                    format!("{self} cannot be rendered with {precision} fraction digits"),
                )
                .with_hint("raise the precision to at least the value's own scale"),
            )
        })?;
        Ok(format_units(units, precision))
    }
}

fn strip_trailing_zeros(mut units: i128, mut scale: u32) -> (i128, u32) {
    if units == 0 {
        return (0, 0);
    }
    while scale > 0 && units % 10 == 0 {
        units /= 10;
        scale -= 1;
    }
    (units, scale)
}

fn format_units(units: i128, scale: u32) -> String {
    let digits = units.unsigned_abs().to_string();
    let sign = if units < 0 { "-" } else { "" };
    if scale == 0 {
        return format!("{sign}{digits}");
    }
    let width = scale as usize + 1;
    let padded = format!("{digits:0>width$}");
    let (int_part, frac_part) = padded.split_at(padded.len() - scale as usize);
    format!("{sign}{int_part}.{frac_part}")
}

impl From<i64> for Decimal {
    fn from(value: i64) -> Self {
        Self {
            units: value as i128,
            scale: 0,
        }
    }
}

impl From<u32> for Decimal {
    fn from(value: u32) -> Self {
        Self {
            units: value as i128,
            scale: 0,
        }
    }
}

impl FromStr for Decimal {
    type Err = SweepError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let text = input.trim();
        let (negative, body) = match text.as_bytes().first() {
            Some(b'-') => (true, &text[1..]),
            Some(b'+') => (false, &text[1..]),
            _ => (false, text),
        };
        let (mantissa, exponent) = match body.find(['e', 'E']) {
            Some(pos) => {
                let exp: i32 = body[pos + 1..]
                    .parse()
                    .map_err(|_| decimal_error(input, "malformed exponent"))?;
                (&body[..pos], exp)
            }
            None => (body, 0),
        };
        let (int_part, frac_part) = match mantissa.split_once('.') {
            Some((int_part, frac_part)) => (int_part, frac_part),
            None => (mantissa, ""),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(decimal_error(input, "no digits"));
        }
        let mut units: i128 = 0;
        for ch in int_part.chars().chain(frac_part.chars()) {
            let digit = ch
                .to_digit(10)
                .ok_or_else(|| decimal_error(input, format!("unexpected character '{ch}'")))?;
            units = units
                .checked_mul(10)
                .and_then(|value| value.checked_add(digit as i128))
                .ok_or_else(|| decimal_error(input, "too many digits"))?;
        }
        let mut scale = frac_part.len() as i64 - exponent as i64;
        if scale < 0 {
            let shift = u32::try_from(-scale).map_err(|_| decimal_error(input, "exponent out of range"))?;
            units = 10i128
                .checked_pow(shift)
                .and_then(|factor| units.checked_mul(factor))
                .ok_or_else(|| decimal_error(input, "exponent out of range"))?;
            scale = 0;
        }
        if negative {
            units = -units;
        }
        let (units, scale) = strip_trailing_zeros(units, scale as u32);
        Decimal::from_units(units, scale).map_err(|err| decimal_error(input, err.info().message.clone()))
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_units(self.units, self.scale))
    }
}

impl Ord for Decimal {
    fn cmp(&self, other: &Self) -> Ordering {
        let scale = self.scale.max(other.scale);
        // both fit at MAX_SCALE by construction
        let lhs = self.units.saturating_mul(pow10(scale - self.scale));
        let rhs = other.units.saturating_mul(pow10(scale - other.scale));
        lhs.cmp(&rhs)
    }
}

impl PartialOrd for Decimal {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Serialize for Decimal {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DecimalRepr {
    Text(String),
    Int(i64),
    Float(f64),
}

impl<'de> Deserialize<'de> for Decimal {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = match DecimalRepr::deserialize(deserializer)? {
            DecimalRepr::Text(text) => text,
            DecimalRepr::Int(value) => return Ok(Decimal::from(value)),
            // shortest round-trip text of the float, so 0.105 stays 0.105
            DecimalRepr::Float(value) => value.to_string(),
        };
        text.parse().map_err(serde::de::Error::custom)
    }
}
