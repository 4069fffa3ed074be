use std::collections::BTreeMap;

use ethabi::ethereum_types::U256;
use serde::{Deserialize, Deserializer};

use super::numeric::Numeric;
use crate::error::TypedDataError;

/// A node of the `domain` or `message` object graph.
///
/// Values are converted into this closed shape once, when typed data enters the crate, so
/// member resolution and encoding only ever match on these variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypedValue {
    Object(BTreeMap<String, TypedValue>),
    Array(Vec<TypedValue>),
    String(String),
    Bool(bool),
    Number(Numeric),
}

impl TypedValue {
    pub fn as_array(&self) -> Option<&[TypedValue]> {
        match self {
            TypedValue::Array(values) => Some(values),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&BTreeMap<String, TypedValue>> {
        match self {
            TypedValue::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            TypedValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Looks up a field of an object value.
    pub fn get(&self, field: &str) -> Option<&TypedValue> {
        self.as_object().and_then(|map| map.get(field))
    }

    /// Short name of the variant, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            TypedValue::Object(_) => "object",
            TypedValue::Array(_) => "array",
            TypedValue::String(_) => "string",
            TypedValue::Bool(_) => "bool",
            TypedValue::Number(_) => "number",
        }
    }

    /// Loose truthiness: zero numbers and empty strings are false, containers are true.
    pub fn is_truthy(&self) -> bool {
        match self {
            TypedValue::Bool(b) => *b,
            TypedValue::Number(n) => !n.is_zero(),
            TypedValue::String(s) => !s.is_empty(),
            TypedValue::Array(_) | TypedValue::Object(_) => true,
        }
    }

    /// Normalizes a numeric or numeric string value into a [`Numeric`].
    pub fn to_numeric(&self) -> Result<Numeric, TypedDataError> {
        match self {
            TypedValue::Number(n) => Ok(*n),
            TypedValue::String(s) => s.parse(),
            other => Err(TypedDataError::invalid(format!(
                "expected a number, got {}",
                other.kind()
            ))),
        }
    }
}

impl TryFrom<serde_json::Value> for TypedValue {
    type Error = TypedDataError;

    fn try_from(value: serde_json::Value) -> Result<Self, Self::Error> {
        Ok(match value {
            serde_json::Value::Null => {
                return Err(TypedDataError::invalid("null is not a valid typed data value"))
            }
            serde_json::Value::Bool(b) => TypedValue::Bool(b),
            serde_json::Value::Number(n) => TypedValue::Number(Numeric::try_from(&n)?),
            serde_json::Value::String(s) => TypedValue::String(s),
            serde_json::Value::Array(values) => TypedValue::Array(
                values.into_iter().map(TypedValue::try_from).collect::<Result<_, _>>()?,
            ),
            // null members read as absent
            serde_json::Value::Object(map) => TypedValue::Object(
                map.into_iter()
                    .filter(|(_, v)| !v.is_null())
                    .map(|(k, v)| Ok((k, TypedValue::try_from(v)?)))
                    .collect::<Result<_, TypedDataError>>()?,
            ),
        })
    }
}

impl<'de> Deserialize<'de> for TypedValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;
        TypedValue::try_from(value).map_err(serde::de::Error::custom)
    }
}

impl From<&str> for TypedValue {
    fn from(s: &str) -> Self {
        TypedValue::String(s.to_string())
    }
}

impl From<String> for TypedValue {
    fn from(s: String) -> Self {
        TypedValue::String(s)
    }
}

impl From<bool> for TypedValue {
    fn from(b: bool) -> Self {
        TypedValue::Bool(b)
    }
}

impl From<Numeric> for TypedValue {
    fn from(n: Numeric) -> Self {
        TypedValue::Number(n)
    }
}

impl From<U256> for TypedValue {
    fn from(n: U256) -> Self {
        TypedValue::Number(n.into())
    }
}

impl From<u64> for TypedValue {
    fn from(n: u64) -> Self {
        TypedValue::Number(n.into())
    }
}

impl From<i64> for TypedValue {
    fn from(n: i64) -> Self {
        TypedValue::Number(n.into())
    }
}

impl From<u128> for TypedValue {
    fn from(n: u128) -> Self {
        TypedValue::Number(n.into())
    }
}

impl From<i128> for TypedValue {
    fn from(n: i128) -> Self {
        TypedValue::Number(n.into())
    }
}

impl<T: Into<TypedValue>> From<Vec<T>> for TypedValue {
    fn from(values: Vec<T>) -> Self {
        TypedValue::Array(values.into_iter().map(Into::into).collect())
    }
}

impl<K: Into<String>, V: Into<TypedValue>> FromIterator<(K, V)> for TypedValue {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        TypedValue::Object(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}
