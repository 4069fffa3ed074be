//! Lossless integer normalization for typed data values.
//!
//! Integers reach the encoder as native numbers, big integers or numeric strings. They are
//! all brought into a single sign/magnitude representation before any width checks run, so
//! that the same numeric value always produces the same bytes.
use std::{fmt, str::FromStr};

use ethabi::ethereum_types::U256;

use crate::error::TypedDataError;

/// An integer in sign/magnitude form, wide enough for every EIP-712 integer type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Numeric {
    negative: bool,
    magnitude: U256,
}

impl Numeric {
    /// Builds a numeric from its sign and magnitude. Zero is never negative.
    pub fn new(negative: bool, magnitude: U256) -> Self {
        Self { negative: negative && !magnitude.is_zero(), magnitude }
    }

    pub fn is_negative(&self) -> bool {
        self.negative
    }

    pub fn is_zero(&self) -> bool {
        self.magnitude.is_zero()
    }

    pub fn magnitude(&self) -> U256 {
        self.magnitude
    }

    /// Renders the value as a big-endian integer of exactly `bytes` bytes.
    ///
    /// Signed values use the two's complement representative on
    /// `[-2^(8*bytes-1), 2^(8*bytes-1) - 1]`, unsigned values must lie in
    /// `[0, 2^(8*bytes) - 1]`. Anything outside the range is an overflow.
    pub fn to_be_bytes(&self, bytes: usize, signed: bool) -> Result<Vec<u8>, TypedDataError> {
        if bytes == 0 || bytes > 32 {
            return Err(TypedDataError::invalid(format!(
                "integer byte size must be between 1 and 32, got {bytes}"
            )))
        }
        let bits = bytes * 8;
        let magnitude_bits = self.magnitude.bits();

        let fits = match (signed, self.negative) {
            // the most negative value is the only one using the full width
            (true, true) => {
                magnitude_bits < bits ||
                    (magnitude_bits == bits &&
                        self.magnitude.trailing_zeros() as usize == bits - 1)
            }
            (true, false) => magnitude_bits < bits,
            (false, true) => false,
            (false, false) => magnitude_bits <= bits,
        };
        if !fits {
            return Err(TypedDataError::overflow(self, bytes))
        }

        let word = if self.negative {
            (!self.magnitude).overflowing_add(U256::one()).0
        } else {
            self.magnitude
        };
        let mut buf = [0u8; 32];
        word.to_big_endian(&mut buf);
        Ok(buf[32 - bytes..].to_vec())
    }
}

impl fmt::Display for Numeric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negative {
            write!(f, "-")?;
        }
        write!(f, "{}", self.magnitude)
    }
}

/// Parses decimal (`"-42"`) and hex (`"0x2a"`) integer strings.
impl FromStr for Numeric {
    type Err = TypedDataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let (negative, digits) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };

        let magnitude = match digits.strip_prefix("0x").or_else(|| digits.strip_prefix("0X")) {
            Some(hex) => {
                if hex.is_empty() || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
                    return Err(TypedDataError::invalid(format!("`{s}` is not a hex integer")))
                }
                let hex = hex.trim_start_matches('0');
                if hex.is_empty() {
                    U256::zero()
                } else if hex.len() > 64 {
                    return Err(TypedDataError::overflow(s, 32))
                } else {
                    U256::from_str_radix(hex, 16).map_err(|_| TypedDataError::overflow(s, 32))?
                }
            }
            None => {
                if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
                    return Err(TypedDataError::invalid(format!("`{s}` is not an integer")))
                }
                U256::from_dec_str(digits).map_err(|_| TypedDataError::overflow(s, 32))?
            }
        };

        Ok(Numeric::new(negative, magnitude))
    }
}

impl TryFrom<&serde_json::Number> for Numeric {
    type Error = TypedDataError;

    fn try_from(value: &serde_json::Number) -> Result<Self, Self::Error> {
        if let Some(n) = value.as_u64() {
            return Ok(n.into())
        }
        if let Some(n) = value.as_i64() {
            return Ok(n.into())
        }
        // arbitrary precision numbers keep their literal, floats and exponents are rejected
        let literal = value.to_string();
        if literal.contains(['.', 'e', 'E']) {
            return Err(TypedDataError::invalid(format!("`{literal}` is not an integer")))
        }
        literal.parse()
    }
}

impl From<U256> for Numeric {
    fn from(value: U256) -> Self {
        Numeric::new(false, value)
    }
}

macro_rules! impl_from_unsigned {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Numeric {
                fn from(value: $t) -> Self {
                    Numeric::new(false, U256::from(value))
                }
            }
        )*
    };
}

macro_rules! impl_from_signed {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Numeric {
                fn from(value: $t) -> Self {
                    Numeric::new(value < 0, U256::from(value.unsigned_abs()))
                }
            }
        )*
    };
}

impl_from_unsigned!(u8, u16, u32, u64, u128, usize);
impl_from_signed!(i8, i16, i32, i64, i128, isize);
