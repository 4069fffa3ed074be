use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer};

use super::{
    field_type::{field_type, parse_array_type, FieldType},
    value::TypedValue,
};
use crate::error::TypedDataError;

/// Name of the struct type describing the signing domain.
pub const EIP712_DOMAIN: &str = "EIP712Domain";

/// Custom types for `TypedData`
pub type Types = BTreeMap<String, Vec<Eip712DomainType>>;

/// Represents the name and type pair
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Eip712DomainType {
    pub name: String,
    #[serde(rename = "type")]
    pub r#type: String,
}

/// Represents the [EIP-712 typed data](https://eips.ethereum.org/EIPS/eip-712) object, as
/// passed to `eth_signTypedData_v4`.
///
/// Unlike a hashing implementation, the domain is kept as an arbitrary object: the device asks
/// for whichever members `types["EIP712Domain"]` declares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypedData {
    /// The custom types used by this message, including `EIP712Domain`.
    pub types: Types,
    /// The type of the message.
    pub primary_type: String,
    /// Signing domain values.
    pub domain: TypedValue,
    /// The message to be signed.
    pub message: TypedValue,
}

/// According to the MetaMask implementation, the data may also arrive JSON stringified.
impl<'de> Deserialize<'de> for TypedData {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct TypedDataHelper {
            types: Types,
            #[serde(rename = "primaryType")]
            primary_type: String,
            domain: TypedValue,
            message: TypedValue,
        }

        let TypedDataHelper { types, primary_type, domain, message } =
            match serde_json::Value::deserialize(deserializer)? {
                serde_json::Value::String(s) => serde_json::from_str(&s),
                other => TypedDataHelper::deserialize(other),
            }
            .map_err(serde::de::Error::custom)?;
        Ok(TypedData { types, primary_type, domain, message })
    }
}

// === impl TypedData ===

impl TypedData {
    pub fn new(
        types: Types,
        primary_type: impl Into<String>,
        domain: TypedValue,
        message: TypedValue,
    ) -> Self {
        Self { types, primary_type: primary_type.into(), domain, message }
    }

    /// Returns the declared members of struct `name`, in declaration order, together with
    /// their resolved field descriptors.
    pub fn struct_members(&self, name: &str) -> Result<Vec<(String, FieldType)>, TypedDataError> {
        let members = self.types.get(name).ok_or_else(|| {
            TypedDataError::invalid(format!("type `{name}` was not defined in types object"))
        })?;
        members
            .iter()
            .map(|member| Ok((member.name.clone(), field_type(&member.r#type, &self.types)?)))
            .collect()
    }

    /// Resolves the value a device addresses with `member_path`. See [`resolve_member`].
    pub fn member(&self, member_path: &[u32]) -> Result<(&TypedValue, String), TypedDataError> {
        resolve_member(member_path, &self.domain, &self.message, &self.primary_type, &self.types)
    }
}

/// Walks the domain/message graph along a positional member path.
///
/// The first index selects the root, `0` for the domain and `1` for the message. Every following
/// index selects an element when the current value is an array, or the n-th declared member when
/// it is a struct. Returns the value found together with its EIP-712 type name.
pub fn resolve_member<'a>(
    member_path: &[u32],
    domain: &'a TypedValue,
    message: &'a TypedValue,
    primary_type: &str,
    types: &Types,
) -> Result<(&'a TypedValue, String), TypedDataError> {
    let (root, nested) = member_path
        .split_first()
        .ok_or_else(|| TypedDataError::invalid("member path must not be empty"))?;

    let (mut value, mut type_name) = match root {
        0 => (domain, EIP712_DOMAIN.to_string()),
        1 => (message, primary_type.to_string()),
        other => {
            return Err(TypedDataError::invalid(format!(
                "root index can only be 0 or 1, got {other}"
            )))
        }
    };

    for (depth, &index) in nested.iter().enumerate() {
        let position = index as usize;
        match value {
            TypedValue::Array(entries) => {
                let (entry_type, _) = parse_array_type(&type_name)?;
                let entry = entries.get(position).ok_or_else(|| {
                    TypedDataError::invalid(format!(
                        "index {index} is out of bounds for `{type_name}` of length {} at {:?}",
                        entries.len(),
                        &member_path[..depth + 2]
                    ))
                })?;
                type_name = entry_type.to_string();
                value = entry;
            }
            TypedValue::Object(fields) => {
                let member = types.get(&type_name).and_then(|members| members.get(position));
                let member = member.ok_or_else(|| {
                    TypedDataError::invalid(format!(
                        "type `{type_name}` has no member at position {index}"
                    ))
                })?;
                value = fields.get(&member.name).ok_or_else(|| {
                    TypedDataError::invalid(format!(
                        "missing value for member `{}` of `{type_name}` at {:?}",
                        member.name,
                        &member_path[..depth + 2]
                    ))
                })?;
                type_name = member.r#type.clone();
            }
            primitive => {
                return Err(TypedDataError::invalid(format!(
                    "cannot descend into {} value of type `{type_name}` at {:?}",
                    primitive.kind(),
                    &member_path[..depth + 2]
                )))
            }
        }
    }

    Ok((value, type_name))
}
