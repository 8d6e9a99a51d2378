use alloy_primitives::{Address, B256, Bytes, U256, hex};
use serde_json::Value;

use crate::models::errors::FormatError;

/// Largest integer an IEEE-754 double represents exactly. `format_number` refuses
/// anything above it so values stay interchangeable with JavaScript clients.
pub const MAX_SAFE_INTEGER: u64 = (1 << 53) - 1;

fn as_str<'a>(value: &'a Value, reason: &str) -> Result<&'a str, FormatError> {
    value
        .as_str()
        .ok_or_else(|| FormatError::invalid_argument(reason, value))
}

/// `0x` followed only by hex digits, optionally with an exact byte length or an even
/// number of digits.
fn is_hex_string(value: &str, bytes: Option<usize>, even: bool) -> bool {
    let Some(digits) = value.strip_prefix("0x") else {
        return false;
    };
    if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return false;
    }
    match bytes {
        Some(length) => digits.len() == 2 * length,
        None => !even || digits.len() % 2 == 0,
    }
}

fn decode_hex(value: &Value, digits: &str, reason: &str) -> Result<Vec<u8>, FormatError> {
    hex::decode(digits).map_err(|_| FormatError::invalid_argument(reason, value))
}

pub fn format_boolean(value: &Value) -> Result<bool, FormatError> {
    match value {
        Value::Bool(flag) => Ok(*flag),
        Value::String(s) if s == "true" => Ok(true),
        Value::String(s) if s == "false" => Ok(false),
        _ => Err(FormatError::invalid_argument("invalid boolean", value)),
    }
}

/// Even-length hex data, `0x` included.
pub fn format_data(value: &Value) -> Result<Bytes, FormatError> {
    let s = as_str(value, "invalid data")?;
    if !is_hex_string(s, None, true) {
        return Err(FormatError::invalid_argument("invalid data", value));
    }
    Ok(Bytes::from(decode_hex(value, &s[2..], "invalid data")?))
}

pub fn format_hash(value: &Value) -> Result<B256, FormatError> {
    let s = as_str(value, "invalid hash")?;
    if !is_hex_string(s, Some(32), true) {
        return Err(FormatError::invalid_argument("invalid hash", value));
    }
    Ok(B256::from_slice(&decode_hex(value, &s[2..], "invalid hash")?))
}

/// Left-pads up to 32 bytes of hex data into a word.
pub fn format_uint256(value: &Value) -> Result<B256, FormatError> {
    let s = as_str(value, "invalid uint256")?;
    if !is_hex_string(s, None, false) {
        return Err(FormatError::invalid_argument("invalid uint256", value));
    }
    if s.len() % 2 != 0 {
        return Err(FormatError::invalid_argument("invalid BytesLike value", value));
    }
    let bytes = decode_hex(value, &s[2..], "invalid uint256")?;
    if bytes.len() > 32 {
        return Err(FormatError::invalid_argument("padding exceeds data length", value));
    }
    let mut word = B256::ZERO;
    word[32 - bytes.len()..].copy_from_slice(&bytes);
    Ok(word)
}

/// Hex byte string as used for pre-Byzantium state roots.
pub fn hexlify(value: &Value) -> Result<Bytes, FormatError> {
    let s = as_str(value, "invalid BytesLike value")?;
    if !is_hex_string(s, None, true) {
        return Err(FormatError::invalid_argument("invalid BytesLike value", value));
    }
    Ok(Bytes::from(decode_hex(value, &s[2..], "invalid BytesLike value")?))
}

/// Accepts 40 hex digits with or without `0x`. Single-case input is taken as is; mixed
/// case has to carry a valid EIP-55 checksum. The returned `Address` displays checksummed.
pub fn format_address(value: &Value) -> Result<Address, FormatError> {
    let s = as_str(value, "invalid address")?;
    let digits = s.strip_prefix("0x").unwrap_or(s);
    if digits.len() != 40 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(FormatError::invalid_argument("invalid address", value));
    }

    let address = Address::from_slice(&decode_hex(value, digits, "invalid address")?);

    let has_upper = digits.bytes().any(|b| b.is_ascii_uppercase());
    let has_lower = digits.bytes().any(|b| b.is_ascii_lowercase());
    if has_upper && has_lower && address.to_checksum(None)[2..] != *digits {
        return Err(FormatError::invalid_argument("bad address checksum", value));
    }

    Ok(address)
}

/// Parses a non-negative quantity given as a JSON integer or a hex/decimal string.
fn parse_quantity(value: &Value) -> Result<U256, FormatError> {
    match value {
        Value::Number(number) => {
            if let Some(n) = number.as_u64() {
                return Ok(U256::from(n));
            }
            match number.as_f64() {
                Some(f) if f < 0.0 => Err(FormatError::invalid_argument("negative value", value)),
                Some(f) if f.fract() != 0.0 => {
                    Err(FormatError::invalid_argument("underflow", value))
                }
                Some(f) if f > MAX_SAFE_INTEGER as f64 => {
                    Err(FormatError::Overflow { value: value.clone() })
                }
                Some(f) => Ok(U256::from(f as u64)),
                None => Err(FormatError::invalid_argument("invalid BigNumberish value", value)),
            }
        }
        Value::String(s) => {
            if s.is_empty() {
                return Err(FormatError::invalid_argument(
                    "invalid BigNumberish string: empty",
                    value,
                ));
            }
            let (digits, radix) = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
                Some(digits) => (digits, 16),
                None => (s.as_str(), 10),
            };
            let valid = !digits.is_empty()
                && digits.bytes().all(|b| match radix {
                    16 => b.is_ascii_hexdigit(),
                    _ => b.is_ascii_digit(),
                });
            if !valid {
                return Err(FormatError::invalid_argument(
                    "invalid BigNumberish string",
                    value,
                ));
            }
            // Digits are validated above, so the only remaining failure is width
            U256::from_str_radix(digits, radix)
                .map_err(|_| FormatError::Overflow { value: value.clone() })
        }
        _ => Err(FormatError::invalid_argument("invalid BigNumberish value", value)),
    }
}

pub fn format_number(value: &Value) -> Result<u64, FormatError> {
    let quantity = parse_quantity(value)?;
    if quantity > U256::from(MAX_SAFE_INTEGER) {
        return Err(FormatError::Overflow { value: value.clone() });
    }
    Ok(quantity.to::<u64>())
}

pub fn format_big_int(value: &Value) -> Result<U256, FormatError> {
    parse_quantity(value)
}
