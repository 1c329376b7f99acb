//! # Timestamp Values
//!
//! A timestamp is an instant measured in milliseconds since the Unix epoch
//! plus a sub-millisecond nanosecond component. The two fields round-trip
//! exactly through both the byte codec and the decimal intermediate used by
//! timestamp arithmetic.
//!
//! ## Decimal Interpretation
//!
//! The logical value of a timestamp, in millisecond units, is
//! `millis + nanos / 1_000_000`. At scale 6 this is exact: one decimal
//! micro-unit of a millisecond is one nanosecond. Timestamp arithmetic sums
//! operands in this representation and converts back with floor division so
//! the nanosecond component stays in `[0, 1_000_000)` even for pre-epoch
//! instants.

use super::decimal::Decimal;
use eyre::{ensure, Result};

/// Nanoseconds per millisecond; also the decimal scale factor at scale 6.
const NANOS_PER_MILLI: i128 = 1_000_000;

/// An instant with sub-millisecond precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp {
    millis: i64,
    nanos: u32,
}

impl Timestamp {
    /// Creates a timestamp from epoch milliseconds and a sub-millisecond
    /// nanosecond component in `[0, 1_000_000)`.
    pub fn new(millis: i64, nanos: u32) -> Result<Self> {
        ensure!(
            (nanos as i128) < NANOS_PER_MILLI,
            "sub-millisecond nanos {} out of range",
            nanos
        );
        Ok(Self { millis, nanos })
    }

    pub fn from_millis(millis: i64) -> Self {
        Self { millis, nanos: 0 }
    }

    pub fn millis(&self) -> i64 {
        self.millis
    }

    pub fn nanos(&self) -> u32 {
        self.nanos
    }

    /// The exact decimal value of this instant in millisecond units.
    pub fn to_decimal(&self) -> Decimal {
        Decimal::new(
            self.millis as i128 * NANOS_PER_MILLI + self.nanos as i128,
            6,
        )
    }

    /// Converts a decimal millisecond value back to a timestamp.
    ///
    /// The decimal is first rounded half-up to scale 6 (nanosecond
    /// resolution), then split with floor division so `nanos` is always
    /// non-negative and `millis + nanos / 1e6` reproduces the value.
    pub fn from_decimal_millis(value: &Decimal) -> Result<Self> {
        let at_nanos = value.with_scale(6, super::RoundingMode::HalfUp)?;
        let total = at_nanos.digits();
        let millis = total.div_euclid(NANOS_PER_MILLI);
        let nanos = total.rem_euclid(NANOS_PER_MILLI) as u32;
        ensure!(
            millis >= i64::MIN as i128 && millis <= i64::MAX as i128,
            "timestamp out of range: {} ms",
            millis
        );
        Ok(Self {
            millis: millis as i64,
            nanos,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decimal_round_trip_preserves_nanos() {
        let ts = Timestamp::new(1_696_000_000_123, 456_789).unwrap();
        let back = Timestamp::from_decimal_millis(&ts.to_decimal()).unwrap();
        assert_eq!(back, ts);
    }

    #[test]
    fn test_pre_epoch_nanos_stay_non_negative() {
        let d = Decimal::new(-1_500_000, 6); // -1.5 ms
        let ts = Timestamp::from_decimal_millis(&d).unwrap();
        assert_eq!(ts.millis(), -2);
        assert_eq!(ts.nanos(), 500_000);
        assert_eq!(ts.to_decimal().cmp_value(&d), std::cmp::Ordering::Equal);
    }

    #[test]
    fn test_sub_nano_fractions_round_half_up() {
        // 1 ms + 0.0000005 ms rounds to 1 ms + 1 ns.
        let d = Decimal::new(1_000_000_5, 7);
        let ts = Timestamp::from_decimal_millis(&d).unwrap();
        assert_eq!((ts.millis(), ts.nanos()), (1, 1));
    }

    #[test]
    fn test_new_rejects_out_of_range_nanos() {
        assert!(Timestamp::new(0, 1_000_000).is_err());
        assert!(Timestamp::new(0, 999_999).is_ok());
    }
}
