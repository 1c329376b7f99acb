//! # Canonical Scalar Value Encoding
//!
//! This module encodes and decodes scalar values to and from the byte form
//! persisted in storage cells and passed between expression nodes. Every
//! logical value has exactly one canonical encoding per (type, sort order),
//! and every encoding is parseable with no context beyond that pair.
//!
//! ## Encodings (ascending order)
//!
//! | Type | Bytes | Layout |
//! |------|-------|--------|
//! | Int2 | 2 | big-endian, sign bit flipped |
//! | Int4 | 4 | big-endian, sign bit flipped |
//! | Int8 | 8 | big-endian, sign bit flipped |
//! | Float4 | 4 | IEEE-754 bits, order-preserving transform, big-endian |
//! | Float8 | 8 | IEEE-754 bits, order-preserving transform, big-endian |
//! | Timestamp | 12 | sign-flipped big-endian millis, then big-endian nanos |
//! | Decimal | 19 | flags byte, scale i16 LE, digits i128 LE |
//! | Text | n | raw UTF-8 |
//! | Blob | n | raw bytes |
//! | NULL | 0 | zero length, for every type |
//!
//! Integer and float encodings are byte-comparable: the surrounding key-value
//! store iterates cells in byte order, so ascending encodings must sort like
//! their logical values. The float transform inverts all bits of negatives and
//! flips the sign bit of positives, giving `-∞ < -1 < 0 < 1 < ∞`.
//!
//! The decimal cell is not byte-comparable; it is a payload format read back
//! through this codec before any comparison. Bit 7 of the flags byte mirrors
//! the digit sign so a reader can test the sign without loading the i128.
//!
//! ## Sort order
//!
//! A descending column stores the ascending encoding with every byte
//! inverted. Encoding applies the inversion last; decoding removes it first.
//! A zero-length encoding is NULL under either order.
//!
//! ## Coercion helpers
//!
//! `decode_coerced` re-reads bytes of one type as a coercible wider type.
//! `decode_decimal` is the arithmetic path: it interprets any numeric-family
//! encoding (integers, floats, decimal, timestamp) as an exact decimal.

use super::{DataType, Decimal, SortOrder, Timestamp, Value};
use eyre::{bail, ensure, Result};
use smallvec::SmallVec;
use std::borrow::Cow;

const SIGN64: u64 = 1 << 63;
const SIGN32: u32 = 1 << 31;
const SIGN16: u16 = 1 << 15;

/// Size of an encoded decimal cell.
pub const DECIMAL_SIZE: usize = 19;

const DECIMAL_NEGATIVE: u8 = 0x80;

/// Encodes `value` as `data_type` under `order` into a fresh buffer.
pub fn encode(value: &Value, data_type: DataType, order: SortOrder) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    encode_into(value, data_type, order, &mut out)?;
    Ok(out)
}

/// Appends the encoding of `value` to `out`.
pub fn encode_into(
    value: &Value,
    data_type: DataType,
    order: SortOrder,
    out: &mut Vec<u8>,
) -> Result<()> {
    let start = out.len();
    encode_raw(value, data_type, out)?;
    if order == SortOrder::Descending {
        for b in &mut out[start..] {
            *b = !*b;
        }
    }
    Ok(())
}

fn encode_raw(value: &Value, data_type: DataType, out: &mut Vec<u8>) -> Result<()> {
    match (value, data_type) {
        (Value::Null, _) => {}
        (Value::Int(v), DataType::Int2) => {
            ensure!(
                i16::try_from(*v).is_ok(),
                "{} out of range for Int2",
                v
            );
            out.extend((*v as i16 as u16 ^ SIGN16).to_be_bytes());
        }
        (Value::Int(v), DataType::Int4) => {
            ensure!(
                i32::try_from(*v).is_ok(),
                "{} out of range for Int4",
                v
            );
            out.extend((*v as i32 as u32 ^ SIGN32).to_be_bytes());
        }
        (Value::Int(v), DataType::Int8) => {
            out.extend((*v as u64 ^ SIGN64).to_be_bytes());
        }
        (Value::Float(f), DataType::Float4) => {
            out.extend(order_float32(*f as f32).to_be_bytes());
        }
        (Value::Float(f), DataType::Float8) => {
            out.extend(order_float64(*f).to_be_bytes());
        }
        (Value::Timestamp(ts), DataType::Timestamp) => {
            out.extend((ts.millis() as u64 ^ SIGN64).to_be_bytes());
            out.extend(ts.nanos().to_be_bytes());
        }
        (Value::Decimal(d), DataType::Decimal) => {
            out.push(if d.is_negative() { DECIMAL_NEGATIVE } else { 0 });
            out.extend(d.scale().to_le_bytes());
            out.extend(d.digits().to_le_bytes());
        }
        (Value::Text(s), DataType::Text) => {
            out.extend(s.as_bytes());
        }
        (Value::Blob(b), DataType::Blob) => {
            out.extend(b.iter());
        }
        (v, t) => bail!("cannot encode {:?} as {:?}", v, t),
    }
    Ok(())
}

/// Decodes `bytes` as a value of `data_type` stored under `order`.
///
/// A zero-length input is NULL for every type, regardless of order.
pub fn decode<'a>(bytes: &'a [u8], data_type: DataType, order: SortOrder) -> Result<Value<'a>> {
    if bytes.is_empty() {
        return Ok(Value::Null);
    }
    match order {
        SortOrder::Ascending => decode_raw(bytes, data_type),
        SortOrder::Descending => {
            let inverted: SmallVec<[u8; 24]> = bytes.iter().map(|b| !b).collect();
            Ok(decode_raw(&inverted, data_type)?.to_owned_static())
        }
    }
}

fn decode_raw<'a>(bytes: &'a [u8], data_type: DataType) -> Result<Value<'a>> {
    match data_type {
        DataType::Int2 | DataType::Int4 | DataType::Int8 => {
            Ok(Value::Int(decode_int(bytes, data_type)?))
        }
        DataType::Float4 => {
            let raw: [u8; 4] = fixed(bytes, data_type)?;
            Ok(Value::Float(
                unorder_float32(u32::from_be_bytes(raw)) as f64
            ))
        }
        DataType::Float8 => {
            let raw: [u8; 8] = fixed(bytes, data_type)?;
            Ok(Value::Float(unorder_float64(u64::from_be_bytes(raw))))
        }
        DataType::Timestamp => {
            let raw: [u8; 12] = fixed(bytes, data_type)?;
            let millis = (u64::from_be_bytes(raw[..8].try_into().unwrap()) ^ SIGN64) as i64;
            let nanos = u32::from_be_bytes(raw[8..].try_into().unwrap());
            Ok(Value::Timestamp(Timestamp::new(millis, nanos)?))
        }
        DataType::Decimal => {
            ensure!(
                bytes.len() == DECIMAL_SIZE,
                "decimal cell must be {} bytes, got {}",
                DECIMAL_SIZE,
                bytes.len()
            );
            let scale = i16::from_le_bytes(bytes[1..3].try_into().unwrap());
            let digits = i128::from_le_bytes(bytes[3..19].try_into().unwrap());
            ensure!(
                (bytes[0] & DECIMAL_NEGATIVE != 0) == (digits < 0),
                "decimal sign flag disagrees with digits"
            );
            Ok(Value::Decimal(Decimal::new(digits, scale)))
        }
        DataType::Text => {
            let s = std::str::from_utf8(bytes)
                .map_err(|e| eyre::eyre!("invalid UTF-8 in text cell: {}", e))?;
            Ok(Value::Text(Cow::Borrowed(s)))
        }
        DataType::Blob => Ok(Value::Blob(Cow::Borrowed(bytes))),
        t => bail!("cannot decode {:?} through the scalar codec", t),
    }
}

/// Re-reads `bytes` encoded as `source` as a value of `target`.
///
/// Fails when `source` is not coercible to `target`; the coercion itself is
/// lossless by construction of the coercion partial order.
pub fn decode_coerced<'a>(
    bytes: &'a [u8],
    source: DataType,
    order: SortOrder,
    target: DataType,
) -> Result<Value<'a>> {
    if source == target {
        return decode(bytes, source, order);
    }
    ensure!(
        source.is_coercible_to(target),
        "cannot coerce {:?} to {:?}",
        source,
        target
    );
    if bytes.is_empty() {
        return Ok(Value::Null);
    }
    match target {
        DataType::Int4 | DataType::Int8 => Ok(Value::Int(decode_long(bytes, source, order)?)),
        DataType::Float4 | DataType::Float8 => Ok(Value::Float(decode_double(bytes, source, order)?)),
        DataType::Decimal => Ok(Value::Decimal(decode_decimal(bytes, source, order)?)),
        t => bail!("cannot coerce {:?} to {:?}", source, t),
    }
}

/// Interprets any numeric-family encoding as an exact decimal.
///
/// This is the arithmetic path used by expressions that combine operands of
/// different numeric kinds. Timestamps yield their millisecond value with the
/// sub-millisecond fraction at scale 6.
pub fn decode_decimal(bytes: &[u8], source: DataType, order: SortOrder) -> Result<Decimal> {
    ensure!(!bytes.is_empty(), "cannot read a decimal from a NULL cell");
    match decode(bytes, source, order)? {
        Value::Int(i) => Ok(Decimal::from_i64(i)),
        Value::Float(f) => Decimal::from_f64(f),
        Value::Decimal(d) => Ok(d),
        Value::Timestamp(ts) => Ok(ts.to_decimal()),
        v => bail!("cannot interpret {:?} as a decimal", v),
    }
}

/// Decodes an integer-family encoding to an i64.
pub fn decode_long(bytes: &[u8], source: DataType, order: SortOrder) -> Result<i64> {
    match decode(bytes, source, order)? {
        Value::Int(i) => Ok(i),
        v => bail!("cannot interpret {:?} as a long", v),
    }
}

/// Decodes an integer- or float-family encoding to an f64.
pub fn decode_double(bytes: &[u8], source: DataType, order: SortOrder) -> Result<f64> {
    match decode(bytes, source, order)? {
        Value::Int(i) => Ok(i as f64),
        Value::Float(f) => Ok(f),
        v => bail!("cannot interpret {:?} as a double", v),
    }
}

fn decode_int(bytes: &[u8], source: DataType) -> Result<i64> {
    match source {
        DataType::Int2 => {
            let raw: [u8; 2] = fixed(bytes, source)?;
            Ok((u16::from_be_bytes(raw) ^ SIGN16) as i16 as i64)
        }
        DataType::Int4 => {
            let raw: [u8; 4] = fixed(bytes, source)?;
            Ok((u32::from_be_bytes(raw) ^ SIGN32) as i32 as i64)
        }
        DataType::Int8 => {
            let raw: [u8; 8] = fixed(bytes, source)?;
            Ok((u64::from_be_bytes(raw) ^ SIGN64) as i64)
        }
        t => bail!("{:?} is not an integer encoding", t),
    }
}

fn fixed<const N: usize>(bytes: &[u8], data_type: DataType) -> Result<[u8; N]> {
    bytes.try_into().map_err(|_| {
        eyre::eyre!(
            "{:?} cell must be {} bytes, got {}",
            data_type,
            N,
            bytes.len()
        )
    })
}

fn order_float64(f: f64) -> u64 {
    let bits = f.to_bits();
    if bits & SIGN64 != 0 {
        !bits
    } else {
        bits ^ SIGN64
    }
}

fn unorder_float64(bits: u64) -> f64 {
    if bits & SIGN64 != 0 {
        f64::from_bits(bits ^ SIGN64)
    } else {
        f64::from_bits(!bits)
    }
}

fn order_float32(f: f32) -> u32 {
    let bits = f.to_bits();
    if bits & SIGN32 != 0 {
        !bits
    } else {
        bits ^ SIGN32
    }
}

fn unorder_float32(bits: u32) -> f32 {
    if bits & SIGN32 != 0 {
        f32::from_bits(bits ^ SIGN32)
    } else {
        f32::from_bits(!bits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(value: Value, data_type: DataType, order: SortOrder) {
        let encoded = encode(&value, data_type, order).unwrap();
        let decoded = decode(&encoded, data_type, order).unwrap();
        assert_eq!(decoded, value, "{:?} under {:?}", data_type, order);
    }

    #[test]
    fn test_round_trip_every_type_both_orders() {
        for order in [SortOrder::Ascending, SortOrder::Descending] {
            round_trip(Value::Int(-42), DataType::Int2, order);
            round_trip(Value::Int(123_456), DataType::Int4, order);
            round_trip(Value::Int(i64::MIN), DataType::Int8, order);
            round_trip(Value::Float(-2.5), DataType::Float4, order);
            round_trip(Value::Float(std::f64::consts::PI), DataType::Float8, order);
            round_trip(
                Value::Timestamp(Timestamp::new(1_696_000_000_123, 456_789).unwrap()),
                DataType::Timestamp,
                order,
            );
            round_trip(
                Value::Decimal(Decimal::new(-123_456, 3)),
                DataType::Decimal,
                order,
            );
            round_trip(Value::Text("héllo".into()), DataType::Text, order);
            round_trip(Value::Blob(vec![0u8, 255, 7].into()), DataType::Blob, order);
        }
    }

    #[test]
    fn test_zero_length_decodes_to_null_for_every_type() {
        for data_type in [
            DataType::Int2,
            DataType::Int8,
            DataType::Float8,
            DataType::Timestamp,
            DataType::Decimal,
            DataType::Text,
            DataType::Blob,
        ] {
            for order in [SortOrder::Ascending, SortOrder::Descending] {
                assert_eq!(decode(&[], data_type, order).unwrap(), Value::Null);
            }
        }
    }

    #[test]
    fn test_null_encodes_to_zero_length() {
        assert!(encode(&Value::Null, DataType::Int8, SortOrder::Ascending)
            .unwrap()
            .is_empty());
        assert!(encode(&Value::Null, DataType::Text, SortOrder::Descending)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_integer_encoding_is_byte_comparable() {
        let values = [i64::MIN, -1000, -1, 0, 1, 1000, i64::MAX];
        let encoded: Vec<Vec<u8>> = values
            .iter()
            .map(|v| encode(&Value::Int(*v), DataType::Int8, SortOrder::Ascending).unwrap())
            .collect();
        for pair in encoded.windows(2) {
            assert!(pair[0] < pair[1]);
        }
    }

    #[test]
    fn test_float_encoding_is_byte_comparable() {
        let values = [f64::NEG_INFINITY, -1.5, -0.0, 0.0, 0.25, 3.0, f64::INFINITY];
        let encoded: Vec<Vec<u8>> = values
            .iter()
            .map(|v| encode(&Value::Float(*v), DataType::Float8, SortOrder::Ascending).unwrap())
            .collect();
        for pair in encoded.windows(2) {
            assert!(pair[0] <= pair[1]);
        }
    }

    #[test]
    fn test_descending_inverts_byte_comparison() {
        let one = encode(&Value::Int(1), DataType::Int8, SortOrder::Descending).unwrap();
        let two = encode(&Value::Int(2), DataType::Int8, SortOrder::Descending).unwrap();
        assert!(two < one);
    }

    #[test]
    fn test_int_out_of_range_for_width() {
        assert!(encode(&Value::Int(40_000), DataType::Int2, SortOrder::Ascending).is_err());
        assert!(encode(&Value::Int(1i64 << 40), DataType::Int4, SortOrder::Ascending).is_err());
    }

    #[test]
    fn test_decode_rejects_wrong_length() {
        let err = decode(&[1, 2, 3], DataType::Int8, SortOrder::Ascending);
        assert!(err.is_err());
        assert!(err.unwrap_err().to_string().contains("8 bytes"));
    }

    #[test]
    fn test_decode_coerced_widens_integers() {
        let bytes = encode(&Value::Int(7), DataType::Int2, SortOrder::Ascending).unwrap();
        assert_eq!(
            decode_coerced(&bytes, DataType::Int2, SortOrder::Ascending, DataType::Int8).unwrap(),
            Value::Int(7)
        );
        assert_eq!(
            decode_coerced(&bytes, DataType::Int2, SortOrder::Ascending, DataType::Decimal)
                .unwrap(),
            Value::Decimal(Decimal::from_i64(7))
        );
    }

    #[test]
    fn test_decode_coerced_respects_sort_order() {
        let bytes = encode(&Value::Int(-3), DataType::Int2, SortOrder::Descending).unwrap();
        assert_eq!(
            decode_coerced(&bytes, DataType::Int2, SortOrder::Descending, DataType::Int8)
                .unwrap(),
            Value::Int(-3)
        );
    }

    #[test]
    fn test_decode_coerced_rejects_illegal_paths() {
        let bytes = encode(&Value::Int(7), DataType::Int8, SortOrder::Ascending).unwrap();
        let err = decode_coerced(&bytes, DataType::Int8, SortOrder::Ascending, DataType::Int2);
        assert!(err.is_err());
        assert!(err.unwrap_err().to_string().contains("cannot coerce"));
    }

    #[test]
    fn test_decode_decimal_from_each_numeric_kind() {
        let order = SortOrder::Ascending;
        let int = encode(&Value::Int(3), DataType::Int4, order).unwrap();
        assert_eq!(
            decode_decimal(&int, DataType::Int4, order).unwrap(),
            Decimal::from_i64(3)
        );

        let float = encode(&Value::Float(1.5), DataType::Float8, order).unwrap();
        assert_eq!(
            decode_decimal(&float, DataType::Float8, order).unwrap(),
            Decimal::new(15, 1)
        );

        let ts = Timestamp::new(10, 500_000).unwrap();
        let ts_bytes = encode(&Value::Timestamp(ts), DataType::Timestamp, order).unwrap();
        assert_eq!(
            decode_decimal(&ts_bytes, DataType::Timestamp, order).unwrap(),
            Decimal::new(10_500_000, 6)
        );
    }

    #[test]
    fn test_decimal_sign_flag_checked_on_decode() {
        let mut bytes =
            encode(&Value::Decimal(Decimal::new(-5, 0)), DataType::Decimal, SortOrder::Ascending)
                .unwrap();
        bytes[0] = 0;
        assert!(decode(&bytes, DataType::Decimal, SortOrder::Ascending).is_err());
    }
}
