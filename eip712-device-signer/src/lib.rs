#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(unsafe_code, rustdoc::broken_intra_doc_links)]
//! Signs EIP-712 typed data on hardware signing devices.
//!
//! Devices never receive the typed data in one piece. After the initial sign request they ask
//! for struct definitions and then for each value by member path, and answer with a
//! signature once they have hashed everything. [`TypedDataSession`] is the state machine that
//! answers those requests, [`DeviceSigner`] drives it over a [`DeviceTransport`].
//!
//! Supported transports are anything implementing [`DeviceTransport`]; framing and device
//! discovery are left to the implementation.
mod app;
pub use app::DeviceSigner;

pub mod messages;
pub use messages::{ResponseKind, StructMember, TypedDataMessage, TypedDataResponse};

mod network;
pub use network::{BuiltinNetworks, NetworkDirectory};

pub mod session;
pub use session::{SessionState, Step, TypedDataSession};

mod transport;
pub use transport::DeviceTransport;

pub mod types;
pub use types::{
    DerivationType as HDPath, DeviceSignerError, ErrorKind, SignTypedDataParams,
    TypedDataSignature,
};
