//! Parameters, results and errors of a typed data signing call.
use std::fmt;

use eip712_device_core::{networks::HARDENED, types::TypedData, TypedDataError};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::{messages::ResponseKind, session::SessionState};

/// Minimum number of components accepted in a signer derivation path.
pub const MIN_PATH_DEPTH: usize = 3;

#[derive(Clone, Debug, PartialEq, Eq)]
/// Derivation path of the signing key
pub enum DerivationType {
    /// Trezor Suite / Ledger Live generated HD path
    TrezorLive(usize),
    /// Legacy generated HD Path
    Legacy(usize),
    /// Any other path, in `m/44'/60'/0'/0/0` notation
    Other(String),
    /// A path given as raw components, hardened bit included
    Path(Vec<u32>),
}

impl fmt::Display for DerivationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            DerivationType::TrezorLive(index) => write!(f, "m/44'/60'/{index}'/0/0"),
            DerivationType::Legacy(index) => write!(f, "m/44'/60'/0'/{index}"),
            DerivationType::Other(inner) => f.write_str(inner),
            DerivationType::Path(components) => {
                f.write_str("m")?;
                for component in components {
                    if component & HARDENED != 0 {
                        write!(f, "/{}'", component & !HARDENED)?;
                    } else {
                        write!(f, "/{component}")?;
                    }
                }
                Ok(())
            }
        }
    }
}

impl DerivationType {
    /// Converts the path to its numeric components, setting the hardened bit where marked.
    pub fn to_path(&self) -> Result<Vec<u32>, DeviceSignerError> {
        let path = match self {
            DerivationType::Path(components) => components.clone(),
            other => parse_path(&other.to_string())?,
        };
        if path.len() < MIN_PATH_DEPTH {
            return Err(DeviceSignerError::InvalidPath(format!(
                "`{self}` must have at least {MIN_PATH_DEPTH} components"
            )))
        }
        Ok(path)
    }
}

fn parse_path(path: &str) -> Result<Vec<u32>, DeviceSignerError> {
    let trimmed = path.trim();
    let components = trimmed
        .strip_prefix("m/")
        .or_else(|| trimmed.strip_prefix("M/"))
        .unwrap_or(trimmed);

    components
        .split('/')
        .map(|component| {
            let (index, hardened) = match component.strip_suffix(['\'', 'h', 'H']) {
                Some(index) => (index, true),
                None => (component, false),
            };
            let index = index
                .parse::<u32>()
                .ok()
                .filter(|index| index & HARDENED == 0)
                .ok_or_else(|| {
                    DeviceSignerError::InvalidPath(format!(
                        "`{path}` has an invalid component `{component}`"
                    ))
                })?;
            Ok(if hardened { index | HARDENED } else { index })
        })
        .collect()
}

/// Accepts `"m/44'/60'/0'/0/0"` as well as `[2147483692, 2147483708, ...]`.
impl<'de> Deserialize<'de> for DerivationType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match serde_json::Value::deserialize(deserializer)? {
            serde_json::Value::String(path) => Ok(DerivationType::Other(path)),
            serde_json::Value::Array(components) => components
                .iter()
                .map(|component| {
                    component.as_u64().and_then(|c| u32::try_from(c).ok()).ok_or_else(|| {
                        serde::de::Error::custom(format!("invalid path component {component}"))
                    })
                })
                .collect::<Result<_, _>>()
                .map(DerivationType::Path),
            other => Err(serde::de::Error::custom(format!(
                "expected a path string or an array of indices, got {other}"
            ))),
        }
    }
}

/// Everything a typed data signing call needs.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct SignTypedDataParams {
    /// Derivation path of the signing key.
    pub path: DerivationType,
    /// The typed data to sign.
    pub data: TypedData,
    /// Asks the device to hash arrays of structs the way MetaMask's `eth_signTypedData_v4` does.
    #[serde(rename = "metamaskV4Compatibility")]
    pub metamask_v4_compat: bool,
}

impl SignTypedDataParams {
    pub fn new(path: DerivationType, data: TypedData, metamask_v4_compat: bool) -> Self {
        Self { path, data, metamask_v4_compat }
    }
}

/// Result of a successful signing session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypedDataSignature {
    /// Checksummed address of the signer.
    pub address: String,
    /// `0x`-prefixed hex signature.
    pub signature: String,
}

/// Category of a [`DeviceSignerError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidParameter,
    Overflow,
    ProtocolViolation,
    TransportFailure,
}

#[derive(Error, Debug)]
/// Error when signing typed data on a device
pub enum DeviceSignerError {
    /// The typed data could not be described or encoded
    #[error(transparent)]
    TypedData(#[from] TypedDataError),
    /// The signer derivation path is malformed
    #[error("invalid derivation path: {0}")]
    InvalidPath(String),
    /// The device answered with a message the session does not accept in its current state
    #[error("device sent {got} while the session expected one of {expected:?}")]
    ProtocolViolation { expected: &'static [ResponseKind], got: ResponseKind },
    /// The device answered with the expected message but its content is unusable
    #[error("malformed device response: {0}")]
    MalformedResponse(String),
    /// The session was driven out of order
    #[error("cannot {action} a typed data session in state {state:?}")]
    InvalidState { action: &'static str, state: SessionState },
    /// Underlying transport error, including disconnects and cancellations
    #[error("transport failure: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl DeviceSignerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DeviceSignerError::TypedData(TypedDataError::InvalidParameter(_)) |
            DeviceSignerError::InvalidPath(_) => ErrorKind::InvalidParameter,
            DeviceSignerError::TypedData(TypedDataError::Overflow { .. }) => ErrorKind::Overflow,
            DeviceSignerError::ProtocolViolation { .. } |
            DeviceSignerError::MalformedResponse(_) |
            DeviceSignerError::InvalidState { .. } => ErrorKind::ProtocolViolation,
            DeviceSignerError::Transport(_) => ErrorKind::TransportFailure,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn renders_paths() {
        assert_eq!(DerivationType::TrezorLive(1).to_string(), "m/44'/60'/1'/0/0");
        assert_eq!(DerivationType::Legacy(2).to_string(), "m/44'/60'/0'/2");
        assert_eq!(
            DerivationType::Path(vec![44 | HARDENED, 60 | HARDENED, HARDENED, 0, 0]).to_string(),
            "m/44'/60'/0'/0/0"
        );
    }

    #[test]
    fn converts_paths() {
        assert_eq!(
            DerivationType::TrezorLive(0).to_path().unwrap(),
            vec![44 | HARDENED, 60 | HARDENED, HARDENED, 0, 0]
        );
        assert_eq!(
            DerivationType::Other("m/44h/61h/0h".into()).to_path().unwrap(),
            vec![44 | HARDENED, 61 | HARDENED, HARDENED]
        );
    }

    #[test]
    fn rejects_bad_paths() {
        for path in ["m/44'/60'", "m/44'/x/0", "m/44'//0", "m/44'/60'/4294967295"] {
            let err = DerivationType::Other(path.into()).to_path().unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidParameter, "{path}");
        }
        assert!(DerivationType::Path(vec![44 | HARDENED]).to_path().is_err());
    }

    #[test]
    fn deserializes_params() {
        let params: SignTypedDataParams = serde_json::from_value(json!({
            "path": [2147483692u32, 2147483708u32, 2147483648u32, 0, 0],
            "data": {
                "types": { "EIP712Domain": [] },
                "primaryType": "EIP712Domain",
                "domain": {},
                "message": {}
            },
            "metamaskV4Compatibility": true
        }))
        .unwrap();
        assert_eq!(params.path.to_path().unwrap(), DerivationType::TrezorLive(0).to_path().unwrap());
        assert!(params.metamask_v4_compat);

        let missing_flag = serde_json::from_value::<SignTypedDataParams>(json!({
            "path": "m/44'/60'/0'/0/0",
            "data": { "types": {}, "primaryType": "EIP712Domain", "domain": {}, "message": {} }
        }));
        assert!(missing_flag.is_err());
    }
}
