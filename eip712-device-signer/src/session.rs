//! The typed data signing state machine.
//!
//! The device drives the exchange: after the initial sign request it asks for struct
//! definitions, then for values one member path at a time, and finally answers with a
//! signature. [`TypedDataSession`] turns each device response into the next message to send,
//! or into the final [`TypedDataSignature`], without doing any I/O itself.
use eip712_device_core::{
    encoding::{encode_array_length, encode_value},
    networks::EthereumNetwork,
    types::{parse_array_type, TypedData, TypedValue},
    TypedDataError,
};
use tracing::{debug, trace};

use crate::{
    messages::{ResponseKind, StructMember, TypedDataMessage, TypedDataResponse},
    network::NetworkDirectory,
    types::{DeviceSignerError, TypedDataSignature},
};

const ANY_REQUEST: &[ResponseKind] =
    &[ResponseKind::StructRequest, ResponseKind::ValueRequest, ResponseKind::Signature];
const VALUE_OR_SIGNATURE: &[ResponseKind] = &[ResponseKind::ValueRequest, ResponseKind::Signature];

/// Where a [`TypedDataSession`] currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Nothing has been sent yet.
    Started,
    /// The sign request or a struct acknowledgment was sent.
    AwaitingRequest,
    /// A value acknowledgment was sent; struct definitions can no longer be requested.
    AwaitingValueRequest,
    /// A signature was received.
    Finished,
    /// An error aborted the session.
    Failed,
}

impl SessionState {
    /// Device responses accepted in this state.
    pub fn expected(&self) -> &'static [ResponseKind] {
        match self {
            SessionState::AwaitingRequest => ANY_REQUEST,
            SessionState::AwaitingValueRequest => VALUE_OR_SIGNATURE,
            SessionState::Started | SessionState::Finished | SessionState::Failed => &[],
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionState::Finished | SessionState::Failed)
    }
}

/// Outcome of feeding a device response into the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Send this message and feed the device's answer back in.
    Send(TypedDataMessage),
    /// The session ended with a signature.
    Finished(TypedDataSignature),
}

/// A single typed data signing exchange with a device.
///
/// The session borrows the typed data for its whole lifetime and keeps no state besides the
/// kind of response it is waiting for.
#[derive(Debug)]
pub struct TypedDataSession<'a> {
    data: &'a TypedData,
    networks: &'a dyn NetworkDirectory,
    network: Option<EthereumNetwork>,
    state: SessionState,
}

impl<'a> TypedDataSession<'a> {
    pub fn new(
        data: &'a TypedData,
        networks: &'a dyn NetworkDirectory,
        network: Option<EthereumNetwork>,
    ) -> Self {
        Self { data, networks, network, state: SessionState::Started }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Builds the initial sign request.
    pub fn start(
        &mut self,
        address_n: Vec<u32>,
        metamask_v4_compat: bool,
    ) -> Result<TypedDataMessage, DeviceSignerError> {
        if self.state != SessionState::Started {
            return Err(DeviceSignerError::InvalidState { action: "start", state: self.state })
        }
        self.state = SessionState::AwaitingRequest;
        Ok(TypedDataMessage::SignTypedData {
            address_n,
            primary_type: self.data.primary_type.clone(),
            metamask_v4_compat,
        })
    }

    /// Consumes a device response. Any error moves the session to [`SessionState::Failed`].
    pub fn advance(&mut self, response: TypedDataResponse) -> Result<Step, DeviceSignerError> {
        let step = self.transition(response);
        if step.is_err() {
            self.state = SessionState::Failed;
        }
        step
    }

    /// Marks the session as failed, e.g. after the transport gave up.
    pub fn abort(&mut self) {
        self.state = SessionState::Failed;
    }

    fn transition(&mut self, response: TypedDataResponse) -> Result<Step, DeviceSignerError> {
        let expected = self.state.expected();
        if self.state.is_terminal() || self.state == SessionState::Started {
            return Err(DeviceSignerError::InvalidState { action: "advance", state: self.state })
        }
        let got = response.kind();
        if !expected.contains(&got) {
            return Err(DeviceSignerError::ProtocolViolation { expected, got })
        }

        match response {
            TypedDataResponse::StructRequest { name } => {
                let members = self.struct_ack(&name)?;
                self.state = SessionState::AwaitingRequest;
                Ok(Step::Send(TypedDataMessage::StructAck { members }))
            }
            TypedDataResponse::ValueRequest { member_path } => {
                let value = self.value_ack(&member_path)?;
                self.state = SessionState::AwaitingValueRequest;
                Ok(Step::Send(TypedDataMessage::ValueAck { value }))
            }
            TypedDataResponse::Signature { address, signature } => {
                let address = self
                    .networks
                    .checksum_address(&address, self.network.as_ref())
                    .map_err(|err| {
                        DeviceSignerError::MalformedResponse(format!(
                            "device returned an unusable signer address: {err}"
                        ))
                    })?;
                self.state = SessionState::Finished;
                debug!(%address, "device signed typed data");
                Ok(Step::Finished(TypedDataSignature {
                    address,
                    signature: format!("0x{}", hex::encode(signature)),
                }))
            }
            TypedDataResponse::Unexpected { .. } => {
                Err(DeviceSignerError::ProtocolViolation { expected, got })
            }
        }
    }

    fn struct_ack(&self, name: &str) -> Result<Vec<StructMember>, DeviceSignerError> {
        let members = self
            .data
            .struct_members(name)?
            .into_iter()
            .map(|(member, field_type)| StructMember::new(member, &field_type))
            .collect::<Vec<_>>();
        debug!(struct_name = name, members = members.len(), "acknowledging struct definition");
        Ok(members)
    }

    fn value_ack(&self, member_path: &[u32]) -> Result<Vec<u8>, DeviceSignerError> {
        let (value, type_name) = self.data.member(member_path)?;
        let encoded = match value {
            // the device asks for each element separately, only the length is sent here
            TypedValue::Array(entries) if parse_array_type(&type_name).is_ok() => {
                encode_array_length(entries.len())?
            }
            TypedValue::Array(_) | TypedValue::Object(_) => {
                return Err(TypedDataError::InvalidParameter(format!(
                    "{} value at {member_path:?} does not match its declared type `{type_name}`",
                    value.kind()
                ))
                .into())
            }
            scalar => encode_value(&type_name, scalar)?,
        };
        debug!(?member_path, %type_name, "acknowledging value");
        trace!(value = %hex::encode(&encoded), "encoded value");
        Ok(encoded)
    }
}
