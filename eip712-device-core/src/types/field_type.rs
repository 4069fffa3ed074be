//! Conversion of EIP-712 type names into the field descriptors understood by signing devices.
use std::fmt;

use serde::{Deserialize, Serialize};

use super::typed_data::Types;
use crate::error::TypedDataError;

/// Data type tag of a field descriptor, numbered the way device firmware numbers them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
#[repr(u8)]
pub enum DataType {
    Uint = 1,
    Int = 2,
    Bytes = 3,
    String = 4,
    Bool = 5,
    Address = 6,
    Array = 7,
    Struct = 8,
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DataType::Uint => "UINT",
            DataType::Int => "INT",
            DataType::Bytes => "BYTES",
            DataType::String => "STRING",
            DataType::Bool => "BOOL",
            DataType::Address => "ADDRESS",
            DataType::Array => "ARRAY",
            DataType::Struct => "STRUCT",
        };
        f.write_str(name)
    }
}

/// Structured description of a single EIP-712 member type.
///
/// Sizes are in bytes for integers and fixed bytes, in entries for fixed arrays and in
/// members for structs. `None` marks a dynamic size.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldType {
    String,
    Bool,
    Address,
    Uint(u32),
    Int(u32),
    Bytes(Option<u32>),
    Struct { name: String, members: u32 },
    Array { entry: Box<FieldType>, length: Option<u32> },
}

impl FieldType {
    pub fn data_type(&self) -> DataType {
        match self {
            FieldType::String => DataType::String,
            FieldType::Bool => DataType::Bool,
            FieldType::Address => DataType::Address,
            FieldType::Uint(_) => DataType::Uint,
            FieldType::Int(_) => DataType::Int,
            FieldType::Bytes(_) => DataType::Bytes,
            FieldType::Struct { .. } => DataType::Struct,
            FieldType::Array { .. } => DataType::Array,
        }
    }

    /// The optional `size` attribute carried on the wire.
    pub fn size(&self) -> Option<u32> {
        match self {
            FieldType::String | FieldType::Bool | FieldType::Address => None,
            FieldType::Uint(size) | FieldType::Int(size) => Some(*size),
            FieldType::Bytes(size) => *size,
            FieldType::Struct { members, .. } => Some(*members),
            FieldType::Array { length, .. } => *length,
        }
    }

    pub fn entry_type(&self) -> Option<&FieldType> {
        match self {
            FieldType::Array { entry, .. } => Some(&**entry),
            _ => None,
        }
    }

    pub fn struct_name(&self) -> Option<&str> {
        match self {
            FieldType::Struct { name, .. } => Some(name),
            _ => None,
        }
    }

    pub fn is_array(&self) -> bool {
        matches!(self, FieldType::Array { .. })
    }
}

/// Resolves an EIP-712 type name against the custom `types` of a message.
///
/// Precedence is array syntax, `(u)int<bits>`, `bytes<N>`/`bytes`, the fixed primitives
/// `address`, `string` and `bool`, and finally struct names found in `types`. Anything else
/// is rejected.
pub fn field_type(type_name: &str, types: &Types) -> Result<FieldType, TypedDataError> {
    if let Some((entry_name, length)) = split_array_type(type_name)? {
        let entry = field_type(entry_name, types)?;
        if entry.is_array() {
            return Err(TypedDataError::invalid(format!(
                "nested arrays are not supported: `{type_name}`"
            )))
        }
        return Ok(FieldType::Array { entry: Box::new(entry), length })
    }

    if let Some((signed, bits)) = parse_int_type(type_name)? {
        let size = bits / 8;
        return Ok(if signed { FieldType::Int(size) } else { FieldType::Uint(size) })
    }

    if let Some(size) = parse_bytes_type(type_name)? {
        return Ok(FieldType::Bytes(size))
    }

    match type_name {
        "address" => return Ok(FieldType::Address),
        "string" => return Ok(FieldType::String),
        "bool" => return Ok(FieldType::Bool),
        _ => {}
    }

    if let Some(members) = types.get(type_name) {
        return Ok(FieldType::Struct { name: type_name.to_string(), members: members.len() as u32 })
    }

    Err(TypedDataError::invalid(format!("unsupported type name: `{type_name}`")))
}

/// Splits an array type name into its entry type name and its fixed length.
///
/// `uint16[32]` yields `("uint16", Some(32))`, `Person[]` yields `("Person", None)`.
pub fn parse_array_type(type_name: &str) -> Result<(&str, Option<u32>), TypedDataError> {
    split_array_type(type_name)?.ok_or_else(|| {
        TypedDataError::invalid(format!(
            "type name `{type_name}` could not be parsed as an EIP-712 array"
        ))
    })
}

// `Ok(None)` when the name carries no array suffix at all
fn split_array_type(type_name: &str) -> Result<Option<(&str, Option<u32>)>, TypedDataError> {
    let Some(inner) = type_name.strip_suffix(']') else { return Ok(None) };
    let Some((entry, length)) = inner.rsplit_once('[') else { return Ok(None) };
    if !length.chars().all(|c| c.is_ascii_digit()) {
        return Ok(None)
    }
    if entry.is_empty() {
        return Err(TypedDataError::invalid(format!("array type `{type_name}` has no entry type")))
    }

    let length = if length.is_empty() {
        None
    } else {
        let parsed = length.parse::<u32>().map_err(|_| {
            TypedDataError::invalid(format!("array length of `{type_name}` is out of range"))
        })?;
        // a zero length is treated as dynamic
        (parsed != 0).then_some(parsed)
    };
    Ok(Some((entry, length)))
}

// `(signed, bits)` for `int<bits>` / `uint<bits>`
fn parse_int_type(type_name: &str) -> Result<Option<(bool, u32)>, TypedDataError> {
    let (signed, bits) = if let Some(bits) = type_name.strip_prefix("uint") {
        (false, bits)
    } else if let Some(bits) = type_name.strip_prefix("int") {
        (true, bits)
    } else {
        return Ok(None)
    };
    if !bits.chars().all(|c| c.is_ascii_digit()) {
        return Ok(None)
    }

    match bits.parse::<u32>() {
        Ok(bits) if bits % 8 == 0 && (8..=256).contains(&bits) => Ok(Some((signed, bits))),
        _ => Err(TypedDataError::invalid(format!(
            "integer type `{type_name}` must have a bit size that is a multiple of 8 between 8 and 256"
        ))),
    }
}

// `Some(None)` for dynamic `bytes`, `Some(Some(n))` for `bytes<n>`
fn parse_bytes_type(type_name: &str) -> Result<Option<Option<u32>>, TypedDataError> {
    let Some(size) = type_name.strip_prefix("bytes") else { return Ok(None) };
    if size.is_empty() {
        return Ok(Some(None))
    }
    if !size.chars().all(|c| c.is_ascii_digit()) {
        return Ok(None)
    }

    match size.parse::<u32>() {
        Ok(size) if (1..=32).contains(&size) => Ok(Some(Some(size))),
        _ => Err(TypedDataError::invalid(format!(
            "fixed bytes type `{type_name}` must have a size between 1 and 32"
        ))),
    }
}

/// Returns the `(signed, bytes)` shape of an integer type name, if it is one.
pub(crate) fn int_type_width(type_name: &str) -> Result<Option<(bool, usize)>, TypedDataError> {
    Ok(parse_int_type(type_name)?.map(|(signed, bits)| (signed, (bits / 8) as usize)))
}

/// Returns true for `bytes` and `bytes<N>` type names.
pub(crate) fn is_bytes_type(type_name: &str) -> Result<bool, TypedDataError> {
    Ok(parse_bytes_type(type_name)?.is_some())
}
