// crates/plk-supervisor/src/codec.rs
//! Value codec for process image channels and SDO payloads.
//!
//! Channels address arbitrary bit fields, so every write is a
//! read-modify-write on the bytes the field touches: bits belonging to
//! sibling channels that share those bytes are left untouched. All
//! multi-byte fields are little-endian, as on the wire.

use crate::error::CodecError;
use crate::pi::Channel;
use crate::types::IecDataType;
use alloc::vec;
use alloc::vec::Vec;
use core::fmt;
use core::ops::Range;
use log::debug;

/// A typed value of one of the supported data types.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IecValue {
    Bool(bool),
    Sint(i8),
    Int(i16),
    Dint(i32),
    Lint(i64),
    Usint(u8),
    Uint(u16),
    Udint(u32),
    Ulint(u64),
    Byte(u8),
    Word(u16),
    Dword(u32),
    Lword(u64),
    Real(f32),
    Lreal(f64),
}

impl IecValue {
    pub fn data_type(&self) -> IecDataType {
        match self {
            IecValue::Bool(_) => IecDataType::Bool,
            IecValue::Sint(_) => IecDataType::Sint,
            IecValue::Int(_) => IecDataType::Int,
            IecValue::Dint(_) => IecDataType::Dint,
            IecValue::Lint(_) => IecDataType::Lint,
            IecValue::Usint(_) => IecDataType::Usint,
            IecValue::Uint(_) => IecDataType::Uint,
            IecValue::Udint(_) => IecDataType::Udint,
            IecValue::Ulint(_) => IecDataType::Ulint,
            IecValue::Byte(_) => IecDataType::Byte,
            IecValue::Word(_) => IecDataType::Word,
            IecValue::Dword(_) => IecDataType::Dword,
            IecValue::Lword(_) => IecDataType::Lword,
            IecValue::Real(_) => IecDataType::Real,
            IecValue::Lreal(_) => IecDataType::Lreal,
        }
    }

    /// Raw 64-bit pattern of the value. Signed values are sign-extended,
    /// floats are their IEEE 754 bits.
    pub fn to_raw(&self) -> u64 {
        match *self {
            IecValue::Bool(v) => v as u64,
            IecValue::Sint(v) => v as i64 as u64,
            IecValue::Int(v) => v as i64 as u64,
            IecValue::Dint(v) => v as i64 as u64,
            IecValue::Lint(v) => v as u64,
            IecValue::Usint(v) | IecValue::Byte(v) => v as u64,
            IecValue::Uint(v) | IecValue::Word(v) => v as u64,
            IecValue::Udint(v) | IecValue::Dword(v) => v as u64,
            IecValue::Ulint(v) | IecValue::Lword(v) => v,
            IecValue::Real(v) => v.to_bits() as u64,
            IecValue::Lreal(v) => v.to_bits(),
        }
    }

    /// Builds a value from a raw pattern, truncating to the type's width.
    pub fn from_raw(data_type: IecDataType, raw: u64) -> Self {
        match data_type {
            IecDataType::Bool => IecValue::Bool(raw != 0),
            IecDataType::Sint => IecValue::Sint(raw as i8),
            IecDataType::Int => IecValue::Int(raw as i16),
            IecDataType::Dint => IecValue::Dint(raw as i32),
            IecDataType::Lint => IecValue::Lint(raw as i64),
            IecDataType::Usint => IecValue::Usint(raw as u8),
            IecDataType::Uint => IecValue::Uint(raw as u16),
            IecDataType::Udint => IecValue::Udint(raw as u32),
            IecDataType::Ulint => IecValue::Ulint(raw),
            IecDataType::Byte => IecValue::Byte(raw as u8),
            IecDataType::Word => IecValue::Word(raw as u16),
            IecDataType::Dword => IecValue::Dword(raw as u32),
            IecDataType::Lword => IecValue::Lword(raw),
            IecDataType::Real => IecValue::Real(f32::from_bits(raw as u32)),
            IecDataType::Lreal => IecValue::Lreal(f64::from_bits(raw)),
        }
    }

    /// Serializes the value into an SDO payload of `byte_size` bytes.
    pub fn to_le_bytes(&self) -> Vec<u8> {
        // A full-width scalar channel always fits its own value.
        encode_payload(self).unwrap_or_default()
    }

    /// Deserializes an SDO payload. Extra trailing bytes are ignored.
    pub fn from_le_bytes(data_type: IecDataType, data: &[u8]) -> Result<Self, CodecError> {
        decode_payload(data, data_type)
    }
}

impl fmt::Display for IecValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IecValue::Bool(v) => write!(f, "{}", *v as u8),
            IecValue::Sint(v) => write!(f, "{}", v),
            IecValue::Int(v) => write!(f, "{}", v),
            IecValue::Dint(v) => write!(f, "{}", v),
            IecValue::Lint(v) => write!(f, "{}", v),
            IecValue::Usint(v) | IecValue::Byte(v) => write!(f, "{}", v),
            IecValue::Uint(v) | IecValue::Word(v) => write!(f, "{}", v),
            IecValue::Udint(v) | IecValue::Dword(v) => write!(f, "{}", v),
            IecValue::Ulint(v) | IecValue::Lword(v) => write!(f, "{}", v),
            IecValue::Real(v) => write!(f, "{}", v),
            IecValue::Lreal(v) => write!(f, "{}", v),
        }
    }
}

/// Inclusive numeric domain of a data type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ValueRange {
    Unsigned { min: u64, max: u64 },
    Signed { min: i64, max: i64 },
    Float { min: f64, max: f64 },
}

impl ValueRange {
    /// Checks an integer candidate. Always false for float ranges.
    pub fn contains_integer(&self, value: i128) -> bool {
        match *self {
            ValueRange::Unsigned { min, max } => (min as i128..=max as i128).contains(&value),
            ValueRange::Signed { min, max } => (min as i128..=max as i128).contains(&value),
            ValueRange::Float { .. } => false,
        }
    }

    /// Checks a float candidate. Always false for integer ranges.
    pub fn contains_float(&self, value: f64) -> bool {
        match *self {
            ValueRange::Float { min, max } => value.is_finite() && value >= min && value <= max,
            _ => false,
        }
    }
}

/// Returns the inclusive domain of `data_type` at its natural width.
pub fn range_for(data_type: IecDataType) -> ValueRange {
    range_for_bits(data_type, data_type.bit_size())
}

/// Returns the inclusive domain of `data_type` stored in a `bit_size`-bit field.
pub fn range_for_bits(data_type: IecDataType, bit_size: u8) -> ValueRange {
    let bits = bit_size.clamp(1, data_type.bit_size().max(1)) as u32;
    match data_type {
        IecDataType::Bool => ValueRange::Unsigned { min: 0, max: 1 },
        IecDataType::Real => ValueRange::Float {
            min: -(f32::MAX as f64),
            max: f32::MAX as f64,
        },
        IecDataType::Lreal => ValueRange::Float {
            min: f64::MIN,
            max: f64::MAX,
        },
        dt if dt.is_signed() => ValueRange::Signed {
            min: (-(1i128 << (bits - 1))) as i64,
            max: ((1i128 << (bits - 1)) - 1) as i64,
        },
        _ => ValueRange::Unsigned {
            min: 0,
            max: ((1u128 << bits) - 1) as u64,
        },
    }
}

/// Parses operator text as a value of `data_type`, at its natural width.
///
/// Integers are decimal, or hexadecimal when prefixed with `0x`. Floats are
/// decimal only. BOOL accepts only the encoded values 0 and 1.
pub fn parse_value(text: &str, data_type: IecDataType) -> Result<IecValue, CodecError> {
    parse_value_bits(text, data_type, data_type.bit_size())
}

/// Like [`parse_value`], with the domain narrowed to a `bit_size`-bit field.
pub fn parse_value_bits(
    text: &str,
    data_type: IecDataType,
    bit_size: u8,
) -> Result<IecValue, CodecError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(CodecError::Empty);
    }
    let range = range_for_bits(data_type, bit_size);
    let out_of_range = CodecError::OutOfRange {
        data_type,
        bit_size,
    };

    if data_type.is_float() {
        let value: f64 = text
            .parse()
            .map_err(|_| CodecError::InvalidNumber { data_type })?;
        if !range.contains_float(value) {
            return Err(out_of_range);
        }
        return match data_type {
            IecDataType::Real => {
                let narrowed = value as f32;
                // Non-zero input must not flush to zero.
                if narrowed == 0.0 && value != 0.0 {
                    return Err(out_of_range);
                }
                Ok(IecValue::Real(narrowed))
            }
            _ => Ok(IecValue::Lreal(value)),
        };
    }

    let value = parse_integer(text).ok_or(CodecError::InvalidNumber { data_type })?;
    if !range.contains_integer(value) {
        return Err(out_of_range);
    }
    // In range, so the two's complement truncation is exact.
    Ok(IecValue::from_raw(data_type, value as i64 as u64))
}

/// Decimal or `0x`-prefixed hexadecimal integer with an optional sign.
fn parse_integer(text: &str) -> Option<i128> {
    let (negative, unsigned) = match text.as_bytes().first()? {
        b'-' => (true, &text[1..]),
        b'+' => (false, &text[1..]),
        _ => (false, text),
    };
    let (digits, radix) = match unsigned
        .strip_prefix("0x")
        .or_else(|| unsigned.strip_prefix("0X"))
    {
        Some(hex) => (hex, 16),
        None => (unsigned, 10),
    };
    // from_str_radix would accept a second sign here.
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let magnitude = i128::from_str_radix(digits, radix).ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

/// True if `text` is a valid value for `data_type`. Fails closed.
pub fn is_valid(text: &str, data_type: IecDataType) -> bool {
    match parse_value(text, data_type) {
        Ok(_) => true,
        Err(e) => {
            debug!("Rejected value '{}' for {}: {}", text, data_type, e);
            false
        }
    }
}

/// True if `text` is a valid value for the type and bit size of `channel`.
pub fn is_valid_for_channel(text: &str, channel: &Channel) -> bool {
    parse_value_bits(text, channel.data_type(), channel.bit_size()).is_ok()
}

/// Byte range of `buffer` spanned by `channel`.
fn span(buffer_len: usize, channel: &Channel) -> Result<Range<usize>, CodecError> {
    let start = channel.byte_offset();
    let end = start + channel.byte_len();
    if end > buffer_len {
        return Err(CodecError::BufferTooShort {
            needed: end,
            actual: buffer_len,
        });
    }
    Ok(start..end)
}

fn field_mask(bit_size: u8) -> u128 {
    (1u128 << bit_size) - 1
}

/// Extracts the raw, zero-extended bit field described by `channel`.
pub fn read_field(buffer: &[u8], channel: &Channel) -> Result<u64, CodecError> {
    let bytes = &buffer[span(buffer.len(), channel)?];
    let acc = bytes
        .iter()
        .enumerate()
        .fold(0u128, |acc, (i, b)| acc | (*b as u128) << (8 * i));
    Ok(((acc >> channel.bit_offset()) & field_mask(channel.bit_size())) as u64)
}

/// Stores the low `bit_size` bits of `raw` into the field described by
/// `channel`, in place. Bits outside the field are preserved.
pub fn write_field(buffer: &mut [u8], channel: &Channel, raw: u64) -> Result<(), CodecError> {
    let range = span(buffer.len(), channel)?;
    let mask = field_mask(channel.bit_size()) << channel.bit_offset();
    let bits = ((raw as u128) << channel.bit_offset()) & mask;
    for (i, byte) in buffer[range].iter_mut().enumerate() {
        let byte_mask = (mask >> (8 * i)) as u8;
        let byte_bits = (bits >> (8 * i)) as u8;
        *byte = (*byte & !byte_mask) | byte_bits;
    }
    Ok(())
}

/// Encodes `value` into the field `channel` describes within `buffer`
/// (the whole buffer of the channel's direction).
pub fn encode(value: &IecValue, channel: &Channel, buffer: &mut [u8]) -> Result<(), CodecError> {
    let data_type = channel.data_type();
    if value.data_type() != data_type {
        return Err(CodecError::TypeMismatch {
            expected: data_type,
            actual: value.data_type(),
        });
    }
    let raw = value.to_raw();
    let fits = match range_for_bits(data_type, channel.bit_size()) {
        ValueRange::Unsigned { max, .. } => raw <= max,
        ValueRange::Signed { min, max } => (min..=max).contains(&(raw as i64)),
        ValueRange::Float { .. } => true,
    };
    if !fits {
        return Err(CodecError::OutOfRange {
            data_type,
            bit_size: channel.bit_size(),
        });
    }
    write_field(buffer, channel, raw)
}

/// Decodes the field `channel` describes within `buffer`, sign-extending
/// signed types.
pub fn decode(buffer: &[u8], channel: &Channel) -> Result<IecValue, CodecError> {
    let mut raw = read_field(buffer, channel)?;
    let bits = channel.bit_size() as u32;
    if channel.data_type().is_signed() && bits < 64 {
        let shift = 64 - bits;
        raw = (((raw << shift) as i64) >> shift) as u64;
    }
    Ok(IecValue::from_raw(channel.data_type(), raw))
}

/// Encodes `value` as an SDO payload: a zeroed, full-width field at offset zero.
pub fn encode_payload(value: &IecValue) -> Result<Vec<u8>, CodecError> {
    let channel = Channel::scalar(value.data_type());
    let mut payload = vec![0u8; channel.byte_len()];
    encode(value, &channel, &mut payload)?;
    Ok(payload)
}

/// Decodes an SDO payload carrying a value of `data_type`.
pub fn decode_payload(data: &[u8], data_type: IecDataType) -> Result<IecValue, CodecError> {
    decode(data, &Channel::scalar(data_type))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Direction;
    use alloc::format;
    use alloc::string::ToString;

    fn channel(dt: IecDataType, byte_offset: usize, bit_offset: u8, bit_size: u8) -> Channel {
        Channel::new("ch", dt, byte_offset, bit_offset, bit_size, Direction::Output).unwrap()
    }

    fn bounds(dt: IecDataType, bits: u8) -> (IecValue, IecValue) {
        match range_for_bits(dt, bits) {
            ValueRange::Unsigned { min, max } => {
                (IecValue::from_raw(dt, min), IecValue::from_raw(dt, max))
            }
            ValueRange::Signed { min, max } => (
                IecValue::from_raw(dt, min as u64),
                IecValue::from_raw(dt, max as u64),
            ),
            ValueRange::Float { min, max } => match dt {
                IecDataType::Real => (IecValue::Real(min as f32), IecValue::Real(max as f32)),
                _ => (IecValue::Lreal(min), IecValue::Lreal(max)),
            },
        }
    }

    #[test]
    fn test_ranges() {
        assert_eq!(
            range_for(IecDataType::Usint),
            ValueRange::Unsigned { min: 0, max: 255 }
        );
        assert_eq!(
            range_for(IecDataType::Int),
            ValueRange::Signed {
                min: -32768,
                max: 32767
            }
        );
        assert_eq!(
            range_for(IecDataType::Bool),
            ValueRange::Unsigned { min: 0, max: 1 }
        );
        assert_eq!(
            range_for(IecDataType::Ulint),
            ValueRange::Unsigned {
                min: 0,
                max: u64::MAX
            }
        );
        assert_eq!(
            range_for(IecDataType::Lint),
            ValueRange::Signed {
                min: i64::MIN,
                max: i64::MAX
            }
        );
        assert_eq!(
            range_for_bits(IecDataType::Sint, 4),
            ValueRange::Signed { min: -8, max: 7 }
        );
        assert_eq!(
            range_for_bits(IecDataType::Uint, 12),
            ValueRange::Unsigned { min: 0, max: 4095 }
        );
    }

    #[test]
    fn test_is_valid_unsigned8_example() {
        assert!(!is_valid("256", IecDataType::Usint));
        assert!(is_valid("255", IecDataType::Usint));
        assert!(is_valid("0xFF", IecDataType::Usint));
        assert!(is_valid("0x0", IecDataType::Usint));
        assert!(!is_valid("0x100", IecDataType::Usint));
        assert!(!is_valid("-1", IecDataType::Usint));
    }

    #[test]
    fn test_is_valid_rejects_bad_text_for_every_type() {
        for dt in IecDataType::ALL {
            assert!(!is_valid("", dt), "empty accepted for {dt}");
            assert!(!is_valid("   ", dt), "blank accepted for {dt}");
            assert!(!is_valid("abc", dt), "text accepted for {dt}");
            assert!(!is_valid("12abc", dt), "trailing text accepted for {dt}");
            assert!(!is_valid("--1", dt), "double sign accepted for {dt}");
            assert!(!is_valid("0x", dt), "bare prefix accepted for {dt}");
        }
    }

    #[test]
    fn test_is_valid_rejects_one_past_the_bounds() {
        for dt in IecDataType::ALL {
            match range_for(dt) {
                ValueRange::Unsigned { min, max } => {
                    assert!(is_valid(&max.to_string(), dt));
                    assert!(is_valid(&min.to_string(), dt));
                    assert!(!is_valid(&(max as i128 + 1).to_string(), dt), "{dt}");
                    assert!(!is_valid(&(min as i128 - 1).to_string(), dt), "{dt}");
                }
                ValueRange::Signed { min, max } => {
                    assert!(is_valid(&max.to_string(), dt));
                    assert!(is_valid(&min.to_string(), dt));
                    assert!(!is_valid(&(max as i128 + 1).to_string(), dt), "{dt}");
                    assert!(!is_valid(&(min as i128 - 1).to_string(), dt), "{dt}");
                }
                ValueRange::Float { .. } => {
                    assert!(is_valid("1.5", dt));
                    assert!(is_valid("-0.25", dt));
                    assert!(!is_valid("1e400", dt), "{dt}");
                    assert!(!is_valid("-1e400", dt), "{dt}");
                    assert!(!is_valid("NaN", dt), "{dt}");
                    assert!(!is_valid("inf", dt), "{dt}");
                    assert!(!is_valid("0x10", dt), "{dt}");
                }
            }
        }
        // REAL is bounded by f32, not f64.
        assert!(!is_valid("1e39", IecDataType::Real));
        assert!(is_valid("1e39", IecDataType::Lreal));
        assert!(!is_valid("1e-50", IecDataType::Real));
        assert!(!is_valid("-1e-50", IecDataType::Real));
        assert!(is_valid("1e-50", IecDataType::Lreal));
        assert!(is_valid("1e-40", IecDataType::Real));
        assert!(is_valid("-0.0", IecDataType::Real));
    }

    #[test]
    fn test_boolean_accepts_only_encoded_values() {
        assert!(is_valid("0", IecDataType::Bool));
        assert!(is_valid("1", IecDataType::Bool));
        assert!(!is_valid("2", IecDataType::Bool));
        assert!(!is_valid("true", IecDataType::Bool));
        assert_eq!(
            parse_value("1", IecDataType::Bool),
            Ok(IecValue::Bool(true))
        );
    }

    #[test]
    fn test_signed_hex_and_channel_narrowing() {
        assert_eq!(parse_value("-0x80", IecDataType::Sint), Ok(IecValue::Sint(-128)));
        assert!(!is_valid("0x80", IecDataType::Sint));

        let nibble = channel(IecDataType::Sint, 0, 4, 4);
        assert!(is_valid_for_channel("7", &nibble));
        assert!(is_valid_for_channel("-8", &nibble));
        assert!(!is_valid_for_channel("8", &nibble));
        assert!(!is_valid_for_channel("-9", &nibble));
    }

    #[test]
    fn test_encode_unsigned8_example() {
        let ch = channel(IecDataType::Usint, 0, 0, 8);
        let mut buf = [0u8; 1];
        encode(&IecValue::Usint(255), &ch, &mut buf).unwrap();
        assert_eq!(buf, [0xFF]);
    }

    #[test]
    fn test_encode_boolean_preserves_siblings() {
        let ch = channel(IecDataType::Bool, 2, 3, 1);
        let sibling = channel(IecDataType::Bool, 2, 0, 1);
        let mut buf = [0u8; 4];
        encode(&IecValue::Bool(true), &ch, &mut buf).unwrap();
        assert_eq!(buf[2], 0b0000_1000);
        assert_eq!(decode(&buf, &sibling), Ok(IecValue::Bool(false)));
        assert_eq!(decode(&buf, &ch), Ok(IecValue::Bool(true)));

        // Clearing must not touch bits that were already set by others.
        buf[2] = 0xFF;
        encode(&IecValue::Bool(false), &ch, &mut buf).unwrap();
        assert_eq!(buf[2], 0b1111_0111);
    }

    #[test]
    fn test_little_endian_multi_byte() {
        let ch = channel(IecDataType::Udint, 1, 0, 32);
        let mut buf = [0u8; 6];
        encode(&IecValue::Udint(0x1234_5678), &ch, &mut buf).unwrap();
        assert_eq!(buf, [0x00, 0x78, 0x56, 0x34, 0x12, 0x00]);
    }

    #[test]
    fn test_round_trip_all_types_and_offsets() {
        for dt in IecDataType::ALL {
            let width = dt.bit_size();
            let offsets: &[u8] = if dt.is_float() { &[0] } else { &[0, 1, 3, 7] };
            for &bit_offset in offsets {
                for bit_size in [1, 3, width / 2, width] {
                    if bit_size == 0 || (dt.is_float() && bit_size != width) {
                        continue;
                    }
                    let ch = channel(dt, 1, bit_offset, bit_size);
                    let (min, max) = bounds(dt, bit_size);
                    for value in [min, max, IecValue::from_raw(dt, 0)] {
                        let mut buf = [0xA5u8; 12];
                        let before = buf;
                        encode(&value, &ch, &mut buf).unwrap();
                        assert_eq!(decode(&buf, &ch), Ok(value), "{dt} {bit_offset}/{bit_size}");

                        // Every bit outside the field is unchanged.
                        for bit in 0..buf.len() * 8 {
                            if (ch.start_bit()..ch.end_bit()).contains(&bit) {
                                continue;
                            }
                            let mask = 1u8 << (bit % 8);
                            assert_eq!(buf[bit / 8] & mask, before[bit / 8] & mask);
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_sub_byte_siblings_are_independent() {
        let low = channel(IecDataType::Usint, 0, 0, 3);
        let mid = channel(IecDataType::Sint, 0, 3, 4);
        let top = channel(IecDataType::Bool, 0, 7, 1);
        let mut buf = [0u8; 1];
        encode(&IecValue::Usint(5), &low, &mut buf).unwrap();
        encode(&IecValue::Sint(-3), &mid, &mut buf).unwrap();
        encode(&IecValue::Bool(true), &top, &mut buf).unwrap();
        encode(&IecValue::Usint(2), &low, &mut buf).unwrap();
        assert_eq!(decode(&buf, &low), Ok(IecValue::Usint(2)));
        assert_eq!(decode(&buf, &mid), Ok(IecValue::Sint(-3)));
        assert_eq!(decode(&buf, &top), Ok(IecValue::Bool(true)));
    }

    #[test]
    fn test_encode_rejects_mismatch_and_overflow() {
        let ch = channel(IecDataType::Usint, 0, 0, 4);
        let mut buf = [0u8; 1];
        assert!(matches!(
            encode(&IecValue::Uint(1), &ch, &mut buf),
            Err(CodecError::TypeMismatch { .. })
        ));
        assert!(matches!(
            encode(&IecValue::Usint(16), &ch, &mut buf),
            Err(CodecError::OutOfRange { bit_size: 4, .. })
        ));
        assert_eq!(buf, [0]);
    }

    #[test]
    fn test_buffer_too_short() {
        let ch = channel(IecDataType::Uint, 3, 0, 16);
        let mut buf = [0u8; 4];
        assert_eq!(
            encode(&IecValue::Uint(1), &ch, &mut buf),
            Err(CodecError::BufferTooShort {
                needed: 5,
                actual: 4
            })
        );
        assert_eq!(
            decode_payload(&[0x04, 0x00], IecDataType::Udint),
            Err(CodecError::BufferTooShort {
                needed: 4,
                actual: 2
            })
        );
    }

    #[test]
    fn test_payloads() {
        assert_eq!(IecValue::Udint(4).to_le_bytes(), [0x04, 0x00, 0x00, 0x00]);
        assert_eq!(IecValue::Bool(true).to_le_bytes(), [0x01]);
        assert_eq!(IecValue::Int(-2).to_le_bytes(), [0xFE, 0xFF]);
        assert_eq!(
            IecValue::from_le_bytes(IecDataType::Udint, &[0x04, 0x00, 0x00, 0x00]),
            Ok(IecValue::Udint(4))
        );
        assert_eq!(
            IecValue::from_le_bytes(IecDataType::Real, &1.5f32.to_le_bytes()),
            Ok(IecValue::Real(1.5))
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", IecValue::Udint(4)), "4");
        assert_eq!(format!("{}", IecValue::Bool(true)), "1");
        assert_eq!(format!("{}", IecValue::Sint(-5)), "-5");
        assert_eq!(format!("{}", IecValue::Lreal(2.5)), "2.5");
    }
}
