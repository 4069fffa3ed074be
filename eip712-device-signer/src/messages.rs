//! Logical messages exchanged with the device while signing typed data.
//!
//! These are transport agnostic: a [`DeviceTransport`](crate::DeviceTransport) maps them onto
//! whatever framing the device speaks.
use std::fmt;

use eip712_device_core::types::{DataType, FieldType};
use serde::Serialize;

/// Message sent to the device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypedDataMessage {
    /// Opens the session.
    SignTypedData { address_n: Vec<u32>, primary_type: String, metamask_v4_compat: bool },
    /// Describes the members of the struct the device asked for, in declaration order.
    StructAck { members: Vec<StructMember> },
    /// Carries the encoded value the device asked for.
    ValueAck { value: Vec<u8> },
}

impl TypedDataMessage {
    pub fn name(&self) -> &'static str {
        match self {
            TypedDataMessage::SignTypedData { .. } => "SignTypedData",
            TypedDataMessage::StructAck { .. } => "StructAck",
            TypedDataMessage::ValueAck { .. } => "ValueAck",
        }
    }
}

/// A named struct member together with its descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StructMember {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: WireFieldType,
}

impl StructMember {
    pub fn new(name: impl Into<String>, field_type: &FieldType) -> Self {
        Self { name: name.into(), field_type: field_type.into() }
    }
}

/// Field descriptor in the shape devices expect: a data type tag, an optional size, the entry
/// descriptor of arrays and the name of structs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WireFieldType {
    pub data_type: DataType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry_type: Option<Box<WireFieldType>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub struct_name: Option<String>,
}

impl From<&FieldType> for WireFieldType {
    fn from(field_type: &FieldType) -> Self {
        Self {
            data_type: field_type.data_type(),
            size: field_type.size(),
            entry_type: field_type.entry_type().map(|entry| Box::new(entry.into())),
            struct_name: field_type.struct_name().map(str::to_string),
        }
    }
}

/// Message received from the device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypedDataResponse {
    /// The device wants the definition of struct `name`.
    StructRequest { name: String },
    /// The device wants the value at `member_path`.
    ValueRequest { member_path: Vec<u32> },
    /// The device signed the data.
    Signature { address: String, signature: Vec<u8> },
    /// Anything else the transport decoded, e.g. a failure or an unrelated message type.
    Unexpected { message_type: String },
}

impl TypedDataResponse {
    pub fn kind(&self) -> ResponseKind {
        match self {
            TypedDataResponse::StructRequest { .. } => ResponseKind::StructRequest,
            TypedDataResponse::ValueRequest { .. } => ResponseKind::ValueRequest,
            TypedDataResponse::Signature { .. } => ResponseKind::Signature,
            TypedDataResponse::Unexpected { .. } => ResponseKind::Unexpected,
        }
    }
}

/// Discriminant of a [`TypedDataResponse`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResponseKind {
    StructRequest,
    ValueRequest,
    Signature,
    Unexpected,
}

impl fmt::Display for ResponseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResponseKind::StructRequest => "StructRequest",
            ResponseKind::ValueRequest => "ValueRequest",
            ResponseKind::Signature => "Signature",
            ResponseKind::Unexpected => "unexpected message",
        };
        f.write_str(name)
    }
}
