//! # Fixed-Point Decimal Arithmetic
//!
//! This module provides `Decimal`, the exact numeric intermediate used when
//! combining operands of heterogeneous numeric types. A decimal is an i128
//! unscaled digit count plus an i16 scale: the logical value is
//! `digits * 10^(-scale)`.
//!
//! ## Why i128
//!
//! 38 significant digits cover every value the codec can produce from an i64,
//! an f64's shortest decimal form, or a timestamp at nanosecond resolution,
//! with headroom for the day-to-millisecond rescaling done by timestamp
//! arithmetic. Overflow is still checked on every operation and surfaces as an
//! evaluation error rather than wrapping.
//!
//! ## Rounding
//!
//! `with_scale` re-expresses a decimal at a target scale. Widening multiplies
//! the digits; narrowing divides and resolves the discarded remainder with a
//! `RoundingMode`:
//!
//! | Mode | Behavior |
//! |------|----------|
//! | Floor | toward negative infinity |
//! | Ceiling | toward positive infinity |
//! | HalfUp | nearest, ties away from zero |
//!
//! ## f64 Conversion
//!
//! `from_f64` goes through the float's shortest decimal display form, so the
//! decimal equals the number a user would read back from the double. NaN and
//! infinities are rejected.

use eyre::{ensure, Result};
use std::fmt;
use std::str::FromStr;

/// Rounding policy applied when a decimal is narrowed to a smaller scale.
///
/// The discriminants are wire tags used by expression serialization.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoundingMode {
    Floor = 0,
    Ceiling = 1,
    HalfUp = 2,
}

impl TryFrom<u8> for RoundingMode {
    type Error = eyre::Report;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(RoundingMode::Floor),
            1 => Ok(RoundingMode::Ceiling),
            2 => Ok(RoundingMode::HalfUp),
            _ => eyre::bail!("invalid RoundingMode tag: {}", value),
        }
    }
}

/// Exact fixed-point decimal: `digits * 10^(-scale)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decimal {
    digits: i128,
    scale: i16,
}

pub const MAX_SCALE: i16 = 38;

impl Decimal {
    pub const ZERO: Decimal = Decimal {
        digits: 0,
        scale: 0,
    };

    pub fn new(digits: i128, scale: i16) -> Self {
        Self { digits, scale }
    }

    pub fn digits(&self) -> i128 {
        self.digits
    }

    pub fn scale(&self) -> i16 {
        self.scale
    }

    pub fn is_negative(&self) -> bool {
        self.digits < 0
    }

    pub fn from_i64(value: i64) -> Self {
        Self {
            digits: value as i128,
            scale: 0,
        }
    }

    /// Converts through the shortest decimal display form of the double.
    pub fn from_f64(value: f64) -> Result<Self> {
        ensure!(
            value.is_finite(),
            "cannot represent {} as a decimal",
            value
        );
        format!("{}", value).parse()
    }

    /// Adds two decimals after rescaling both to the larger scale.
    pub fn checked_add(&self, other: &Decimal) -> Result<Decimal> {
        let scale = self.scale.max(other.scale);
        let a = self.rescaled_digits(scale)?;
        let b = other.rescaled_digits(scale)?;
        let digits = a
            .checked_add(b)
            .ok_or_else(|| eyre::eyre!("decimal addition overflow"))?;
        Ok(Decimal { digits, scale })
    }

    /// Multiplies by an integer without changing the scale.
    pub fn checked_mul_i64(&self, factor: i64) -> Result<Decimal> {
        let digits = self
            .digits
            .checked_mul(factor as i128)
            .ok_or_else(|| eyre::eyre!("decimal multiplication overflow"))?;
        Ok(Decimal {
            digits,
            scale: self.scale,
        })
    }

    /// Re-expresses this decimal at `scale`, rounding discarded digits with
    /// `mode` when narrowing.
    pub fn with_scale(&self, scale: i16, mode: RoundingMode) -> Result<Decimal> {
        ensure!(
            (-MAX_SCALE..=MAX_SCALE).contains(&scale),
            "decimal scale {} out of range",
            scale
        );
        if scale >= self.scale {
            return Ok(Decimal {
                digits: self.rescaled_digits(scale)?,
                scale,
            });
        }
        let divisor = pow10((self.scale - scale) as u32)?;
        let quotient = self.digits / divisor;
        let remainder = self.digits % divisor;
        let digits = if remainder == 0 {
            quotient
        } else {
            match mode {
                RoundingMode::Floor => {
                    if remainder < 0 {
                        quotient - 1
                    } else {
                        quotient
                    }
                }
                RoundingMode::Ceiling => {
                    if remainder > 0 {
                        quotient + 1
                    } else {
                        quotient
                    }
                }
                RoundingMode::HalfUp => {
                    if remainder.unsigned_abs() * 2 >= divisor.unsigned_abs() {
                        if remainder < 0 {
                            quotient - 1
                        } else {
                            quotient + 1
                        }
                    } else {
                        quotient
                    }
                }
            }
        };
        Ok(Decimal { digits, scale })
    }

    /// Compares two decimals numerically, independent of scale.
    pub fn cmp_value(&self, other: &Decimal) -> std::cmp::Ordering {
        let scale = self.scale.max(other.scale);
        // Rescaling can only overflow for values far beyond any codec input;
        // saturate so comparison stays total.
        let a = self
            .rescaled_digits(scale)
            .unwrap_or(if self.digits < 0 { i128::MIN } else { i128::MAX });
        let b = other
            .rescaled_digits(scale)
            .unwrap_or(if other.digits < 0 { i128::MIN } else { i128::MAX });
        a.cmp(&b)
    }

    fn rescaled_digits(&self, scale: i16) -> Result<i128> {
        if scale == self.scale {
            return Ok(self.digits);
        }
        ensure!(scale > self.scale, "rescale must widen");
        let factor = pow10((scale - self.scale) as u32)?;
        self.digits
            .checked_mul(factor)
            .ok_or_else(|| eyre::eyre!("decimal rescale overflow"))
    }
}

fn pow10(exp: u32) -> Result<i128> {
    10i128
        .checked_pow(exp)
        .ok_or_else(|| eyre::eyre!("decimal exponent {} out of range", exp))
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.scale <= 0 {
            let shifted = self.digits * 10i128.pow((-self.scale) as u32);
            write!(f, "{}", shifted)
        } else {
            let divisor = 10i128.pow(self.scale as u32);
            let int_part = self.digits / divisor;
            let frac_part = (self.digits % divisor).abs();
            let sign = if self.digits < 0 && int_part == 0 {
                "-"
            } else {
                ""
            };
            write!(
                f,
                "{}{}.{:0>width$}",
                sign,
                int_part,
                frac_part,
                width = self.scale as usize
            )
        }
    }
}

impl FromStr for Decimal {
    type Err = eyre::Report;

    fn from_str(s: &str) -> Result<Self> {
        let (mantissa, exponent) = match s.find(['e', 'E']) {
            Some(pos) => {
                let exp: i32 = s[pos + 1..]
                    .parse()
                    .map_err(|_| eyre::eyre!("invalid decimal literal: {}", s))?;
                (&s[..pos], exp)
            }
            None => (s, 0),
        };
        let (int_part, frac_part) = match mantissa.find('.') {
            Some(pos) => (&mantissa[..pos], &mantissa[pos + 1..]),
            None => (mantissa, ""),
        };
        ensure!(
            !int_part.is_empty() || !frac_part.is_empty(),
            "invalid decimal literal: {}",
            s
        );
        let negative = int_part.starts_with('-');
        let mut digits: i128 = 0;
        for c in int_part.chars().chain(frac_part.chars()) {
            if c == '-' || c == '+' {
                continue;
            }
            let d = c
                .to_digit(10)
                .ok_or_else(|| eyre::eyre!("invalid decimal literal: {}", s))?;
            digits = digits
                .checked_mul(10)
                .and_then(|v| v.checked_add(d as i128))
                .ok_or_else(|| eyre::eyre!("decimal literal out of range: {}", s))?;
        }
        if negative {
            digits = -digits;
        }
        let scale = frac_part.len() as i32 - exponent;
        ensure!(
            (-(MAX_SCALE as i32)..=MAX_SCALE as i32).contains(&scale),
            "decimal scale out of range: {}",
            s
        );
        let mut dec = Decimal {
            digits,
            scale: scale as i16,
        };
        // A negative scale is only reachable via an exponent; normalize so the
        // digits are literal.
        if dec.scale < 0 {
            dec = Decimal {
                digits: dec.rescaled_digits(0)?,
                scale: 0,
            };
        }
        Ok(dec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_rescales_to_wider_scale() {
        let a = Decimal::new(150, 2); // 1.50
        let b = Decimal::new(25, 1); // 2.5
        let sum = a.checked_add(&b).unwrap();
        assert_eq!(sum, Decimal::new(400, 2));
    }

    #[test]
    fn test_with_scale_widens_exactly() {
        let d = Decimal::new(15, 1); // 1.5
        assert_eq!(d.with_scale(3, RoundingMode::HalfUp).unwrap(), Decimal::new(1500, 3));
    }

    #[test]
    fn test_with_scale_floor_and_ceiling() {
        let d = Decimal::new(1250, 3); // 1.250
        assert_eq!(d.with_scale(1, RoundingMode::Floor).unwrap(), Decimal::new(12, 1));
        assert_eq!(d.with_scale(1, RoundingMode::Ceiling).unwrap(), Decimal::new(13, 1));

        let neg = Decimal::new(-1250, 3); // -1.250
        assert_eq!(neg.with_scale(1, RoundingMode::Floor).unwrap(), Decimal::new(-13, 1));
        assert_eq!(neg.with_scale(1, RoundingMode::Ceiling).unwrap(), Decimal::new(-12, 1));
    }

    #[test]
    fn test_with_scale_half_up_ties_away_from_zero() {
        assert_eq!(
            Decimal::new(25, 1).with_scale(0, RoundingMode::HalfUp).unwrap(),
            Decimal::new(3, 0)
        );
        assert_eq!(
            Decimal::new(-25, 1).with_scale(0, RoundingMode::HalfUp).unwrap(),
            Decimal::new(-3, 0)
        );
        assert_eq!(
            Decimal::new(24, 1).with_scale(0, RoundingMode::HalfUp).unwrap(),
            Decimal::new(2, 0)
        );
    }

    #[test]
    fn test_from_f64_uses_shortest_form() {
        assert_eq!(Decimal::from_f64(1.5).unwrap(), Decimal::new(15, 1));
        assert_eq!(Decimal::from_f64(-0.25).unwrap(), Decimal::new(-25, 2));
        assert_eq!(Decimal::from_f64(3.0).unwrap(), Decimal::new(3, 0));
        assert!(Decimal::from_f64(f64::NAN).is_err());
        assert!(Decimal::from_f64(f64::INFINITY).is_err());
    }

    #[test]
    fn test_parse_and_display_round_trip() {
        for s in ["0", "1", "-1", "1.5", "-0.25", "123.456", "-123.456"] {
            let d: Decimal = s.parse().unwrap();
            assert_eq!(d.to_string(), s, "round-trip of {}", s);
        }
    }

    #[test]
    fn test_parse_exponent_normalizes() {
        let d: Decimal = "1.5e3".parse().unwrap();
        assert_eq!(d, Decimal::new(1500, 0));
        let d: Decimal = "15e-3".parse().unwrap();
        assert_eq!(d, Decimal::new(15, 3));
    }

    #[test]
    fn test_cmp_value_across_scales() {
        use std::cmp::Ordering;
        let a = Decimal::new(15, 1); // 1.5
        let b = Decimal::new(1500, 3); // 1.500
        assert_eq!(a.cmp_value(&b), Ordering::Equal);
        assert_eq!(Decimal::new(2, 0).cmp_value(&a), Ordering::Greater);
    }

    #[test]
    fn test_negative_fraction_display() {
        assert_eq!(Decimal::new(-5, 1).to_string(), "-0.5");
        assert_eq!(Decimal::new(-15, 1).to_string(), "-1.5");
    }

    #[test]
    fn test_mul_i64_overflow_is_an_error() {
        let d = Decimal::new(i128::MAX / 2, 0);
        assert!(d.checked_mul_i64(3).is_err());
    }
}
