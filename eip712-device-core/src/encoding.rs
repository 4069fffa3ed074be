//! Byte encoding of primitive typed data values, as sent to a device in a value acknowledgment.
use crate::{
    error::TypedDataError,
    types::{
        field_type::{int_type_width, is_bytes_type},
        TypedValue,
    },
    utils::strip_hex_prefix,
};

/// Encodes a primitive value of EIP-712 type `type_name` into its device representation.
///
/// - `bytes`, `bytes<N>` and `address`: the hex string, without `0x`, decoded as-is
/// - `string`: UTF-8 bytes, without length prefix or terminator
/// - `(u)int<bits>`: big-endian, exactly `bits / 8` bytes, two's complement when signed
/// - `bool`: a single `0x01` or `0x00` byte
///
/// Arrays and structs are never encoded here; the caller sends array lengths through
/// [`encode_array_length`] and lets the device request members one at a time.
pub fn encode_value(type_name: &str, value: &TypedValue) -> Result<Vec<u8>, TypedDataError> {
    if is_bytes_type(type_name)? || type_name == "address" {
        let hex = value.as_str().ok_or_else(|| {
            TypedDataError::invalid(format!(
                "expected a hex string for `{type_name}`, got {}",
                value.kind()
            ))
        })?;
        return Ok(hex::decode(strip_hex_prefix(hex))?)
    }

    if type_name == "string" {
        let s = value.as_str().ok_or_else(|| {
            TypedDataError::invalid(format!("expected a string, got {}", value.kind()))
        })?;
        return Ok(s.as_bytes().to_vec())
    }

    if let Some((signed, bytes)) = int_type_width(type_name)? {
        return value.to_numeric()?.to_be_bytes(bytes, signed)
    }

    if type_name == "bool" {
        return Ok(vec![value.is_truthy() as u8])
    }

    Err(TypedDataError::invalid(format!(
        "unsupported data type for direct field encoding: `{type_name}`"
    )))
}

/// Encodes the length of an array as the `uint16` the device expects.
pub fn encode_array_length(length: usize) -> Result<Vec<u8>, TypedDataError> {
    encode_value("uint16", &TypedValue::from(length as u64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethabi::ethereum_types::U256;
    use hex_literal::hex;

    #[test]
    fn encodes_hex_types() {
        let address = TypedValue::from("0xCD2a3d9F938E13CD947Ec05AbC7FE734Df8DD826");
        assert_eq!(
            encode_value("address", &address).unwrap(),
            hex!("cd2a3d9f938e13cd947ec05abc7fe734df8dd826").to_vec()
        );
        assert_eq!(
            encode_value("bytes", &TypedValue::from("0xdeadbeef")).unwrap(),
            hex!("deadbeef").to_vec()
        );
        assert_eq!(encode_value("bytes2", &TypedValue::from("abcd")).unwrap(), vec![0xab, 0xcd]);
        assert!(encode_value("bytes", &TypedValue::from("0xabc")).is_err());
        assert!(encode_value("address", &TypedValue::from(1u64)).is_err());
    }

    #[test]
    fn encodes_strings_without_framing() {
        assert_eq!(encode_value("string", &TypedValue::from("Hi ü")).unwrap(), "Hi ü".as_bytes());
        assert_eq!(encode_value("string", &TypedValue::from("")).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn encodes_integers() {
        assert_eq!(encode_value("int8", &TypedValue::from(-128i64)).unwrap(), vec![0x80]);
        assert_eq!(encode_value("int8", &TypedValue::from(127i64)).unwrap(), vec![0x7f]);
        assert_eq!(encode_value("uint16", &TypedValue::from(65535u64)).unwrap(), vec![0xff, 0xff]);
        assert_eq!(
            encode_value("uint32", &TypedValue::from("0x2a")).unwrap(),
            vec![0x00, 0x00, 0x00, 0x2a]
        );
        assert_eq!(encode_value("int16", &TypedValue::from("-2")).unwrap(), vec![0xff, 0xfe]);

        for (ty, value) in [("int8", -129i64), ("int8", 128), ("uint16", 65536), ("uint8", -1)] {
            assert!(
                matches!(
                    encode_value(ty, &TypedValue::from(value)),
                    Err(TypedDataError::Overflow { .. })
                ),
                "{ty} {value} should overflow"
            );
        }
    }

    #[test]
    fn integer_formats_encode_identically() {
        let expected = encode_value("uint256", &TypedValue::from(1_000_000u64)).unwrap();
        assert_eq!(encode_value("uint256", &TypedValue::from(U256::from(1_000_000u64))).unwrap(), expected);
        assert_eq!(encode_value("uint256", &TypedValue::from("1000000")).unwrap(), expected);
        assert_eq!(expected.len(), 32);
    }

    #[test]
    fn encodes_booleans() {
        assert_eq!(encode_value("bool", &TypedValue::Bool(true)).unwrap(), vec![1]);
        assert_eq!(encode_value("bool", &TypedValue::Bool(false)).unwrap(), vec![0]);
    }

    #[test]
    fn rejects_composite_types() {
        for ty in ["Person", "uint8[]", "function"] {
            assert!(matches!(
                encode_value(ty, &TypedValue::from("x")),
                Err(TypedDataError::InvalidParameter(_))
            ));
        }
    }

    #[test]
    fn array_length_is_uint16() {
        assert_eq!(encode_array_length(3).unwrap(), vec![0x00, 0x03]);
        assert!(matches!(encode_array_length(70_000), Err(TypedDataError::Overflow { .. })));
    }
}
