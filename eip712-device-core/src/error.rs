use thiserror::Error;

/// Error raised while describing or encoding typed data for a signing device.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypedDataError {
    /// The schema, the data or a device request referenced something that cannot be
    /// resolved or encoded.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    /// An integer does not fit the declared width of its type.
    #[error("overflow when trying to convert number {value} into {bytes} bytes")]
    Overflow { value: String, bytes: usize },
}

impl TypedDataError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        TypedDataError::InvalidParameter(msg.into())
    }

    pub(crate) fn overflow(value: impl ToString, bytes: usize) -> Self {
        TypedDataError::Overflow { value: value.to_string(), bytes }
    }
}

impl From<hex::FromHexError> for TypedDataError {
    fn from(err: hex::FromHexError) -> Self {
        TypedDataError::InvalidParameter(format!("failed to decode hex value: {err}"))
    }
}
