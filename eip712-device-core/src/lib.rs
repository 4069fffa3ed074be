#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(unsafe_code, rustdoc::broken_intra_doc_links)]
//! EIP-712 typed data, as a signing device consumes it.
//!
//! Devices that sign typed data never receive the whole object. They ask for struct
//! definitions and for individual values, addressed by a positional member path, and hash
//! the data themselves. This crate holds the pieces needed to answer those requests:
//!
//! - [`types::field_type`] turns an EIP-712 type name into a [`types::FieldType`] descriptor
//! - [`types::resolve_member`] finds the value a member path points at
//! - [`encoding::encode_value`] serializes a primitive value into device bytes
//!
//! ```rust
//! use eip712_device_core::{encoding::encode_value, types::TypedData};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let data: TypedData = serde_json::from_str(r#"{
//!     "types": {
//!         "EIP712Domain": [{ "name": "name", "type": "string" }],
//!         "Person": [{ "name": "age", "type": "uint8" }]
//!     },
//!     "primaryType": "Person",
//!     "domain": { "name": "Test" },
//!     "message": { "age": 42 }
//! }"#)?;
//!
//! let (value, type_name) = data.member(&[1, 0])?;
//! assert_eq!(encode_value(&type_name, value)?, vec![42]);
//! # Ok(())
//! # }
//! ```
pub mod types;

pub mod encoding;

pub mod networks;

/// Various utilities
pub mod utils;

mod error;
pub use error::TypedDataError;
