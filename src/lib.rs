#![warn(missing_debug_implementations, rust_2018_idioms, unreachable_pub)]
#![deny(rustdoc::broken_intra_doc_links)]
#![doc(test(
    no_crate_inject,
    attr(deny(warnings, rust_2018_idioms), allow(dead_code, unused_variables))
))]
#![cfg_attr(docsrs, feature(doc_cfg))]
//! # eip712-device
//!
//! Interactive EIP-712 typed data signing against hardware signing devices.
//!
//! The device never sees the typed data as a whole. It asks for struct definitions and then
//! for every value by member path; this crate answers those requests from a parsed
//! [`TypedData`](crate::core::types::TypedData) document and returns the device's signature.
//!
//! # Quickstart
//!
//! A prelude is provided which imports all the important things for you. Bring a transport
//! that speaks to your device and hand it to a [`DeviceSigner`](crate::signer::DeviceSigner):
//!
//! ```no_run
//! use eip712_device::prelude::*;
//!
//! async fn sign<T: DeviceTransport>(
//!     transport: T,
//!     json: &str,
//! ) -> Result<TypedDataSignature, Box<dyn std::error::Error>> {
//!     let data: TypedData = serde_json::from_str(json)?;
//!     let signer = DeviceSigner::new(transport);
//!     let params = SignTypedDataParams::new(HDPath::TrezorLive(0), data, true);
//!     Ok(signer.sign_typed_data(&params).await?)
//! }
//! ```

/// # Typed data, field descriptors and leaf encoding
///
/// Everything needed to describe structs to a device and to encode the values it asks for,
/// without any notion of a session.
///
/// ```rust
/// use eip712_device::core::{encoding::encode_value, types::TypedValue};
///
/// let encoded = encode_value("int16", &TypedValue::from(-4i64)).unwrap();
/// assert_eq!(encoded, vec![0xff, 0xfc]);
/// ```
pub mod core {
    pub use eip712_device_core::*;
}

/// # The request/acknowledge session and the device signer
pub mod signer {
    pub use eip712_device_signer::*;
}

// Re-export eip712_device_core::utils
pub use eip712_device_core::utils;

/// Easy import of frequently used type definitions and traits
pub mod prelude {
    pub use eip712_device_core::types::*;

    pub use eip712_device_signer::*;
}
