#![allow(dead_code)]
//! Test doubles for the device side of a typed data signing session.
use std::{
    collections::{BTreeMap, VecDeque},
    sync::{
        mpsc::{channel, Receiver, Sender},
        Arc, Mutex,
    },
    thread::{self, JoinHandle},
};

use async_trait::async_trait;
use eip712_device_core::types::{DataType, TypedData};
use eip712_device_signer::{
    messages::WireFieldType, DeviceTransport, StructMember, TypedDataMessage, TypedDataResponse,
};
use thiserror::Error;

pub const DEVICE_ADDRESS: &str = "0x73d0385f4d8e00c5e6504c6030f47bf6212736a8";
pub const DEVICE_SIGNATURE: [u8; 4] = [0xde, 0xad, 0xbe, 0xef];

pub fn fixture(name: &str) -> TypedData {
    let path = format!("{}/tests/fixtures/{name}.json", env!("CARGO_MANIFEST_DIR"));
    let raw = std::fs::read_to_string(path).unwrap();
    serde_json::from_str(&raw).unwrap()
}

#[derive(Debug, Error)]
#[error("device disconnected")]
pub struct DeviceDisconnected;

/// Everything the simulated device saw during a session.
#[derive(Debug, Default, Clone)]
pub struct DeviceRecord {
    pub primary_type: String,
    pub struct_requests: Vec<String>,
    pub structs: BTreeMap<String, Vec<StructMember>>,
    pub values: Vec<(Vec<u32>, Vec<u8>)>,
    pub received: Vec<&'static str>,
}

impl DeviceRecord {
    pub fn value(&self, path: &[u32]) -> Option<&[u8]> {
        self.values.iter().find(|(p, _)| p == path).map(|(_, v)| v.as_slice())
    }
}

/// Misbehaviours the simulated device can be told to exhibit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    None,
    /// Ask for a struct definition again after the first value.
    StructRequestAfterValue,
    /// Stop answering after this many messages.
    DisconnectAfter(usize),
}

/// Host side of the channel to a simulated device running on its own thread.
#[derive(Debug)]
pub struct SimulatedTransport {
    to_device: Sender<TypedDataMessage>,
    from_device: Receiver<TypedDataResponse>,
}

#[async_trait]
impl DeviceTransport for SimulatedTransport {
    type Error = DeviceDisconnected;

    async fn call(&mut self, message: TypedDataMessage) -> Result<TypedDataResponse, Self::Error> {
        self.to_device.send(message).map_err(|_| DeviceDisconnected)?;
        self.from_device.recv().map_err(|_| DeviceDisconnected)
    }
}

pub type DeviceHandle = JoinHandle<Result<DeviceRecord, String>>;

/// Starts a device that requests structs and values the way signing firmware does:
/// every struct definition first, then the domain members, then the message members,
/// depth first, array lengths before array elements.
pub fn spawn_device(fault: Fault) -> (SimulatedTransport, DeviceHandle, Arc<Mutex<DeviceRecord>>) {
    let (to_device, device_rx) = channel();
    let (device_tx, from_device) = channel();
    let record = Arc::new(Mutex::new(DeviceRecord::default()));

    let mut firmware = Firmware { rx: device_rx, tx: device_tx, record: record.clone(), fault };
    let handle = thread::spawn(move || {
        firmware.run()?;
        let record = firmware.record.lock().unwrap().clone();
        Ok(record)
    });

    (SimulatedTransport { to_device, from_device }, handle, record)
}

struct Firmware {
    rx: Receiver<TypedDataMessage>,
    tx: Sender<TypedDataResponse>,
    record: Arc<Mutex<DeviceRecord>>,
    fault: Fault,
}

impl Firmware {
    fn run(&mut self) -> Result<(), String> {
        let primary_type = match self.recv()? {
            TypedDataMessage::SignTypedData { primary_type, .. } => primary_type,
            other => return Err(format!("expected SignTypedData, got {other:?}")),
        };
        self.record.lock().unwrap().primary_type = primary_type.clone();

        self.collect_struct("EIP712Domain")?;
        if primary_type != "EIP712Domain" {
            self.collect_struct(&primary_type)?;
        }

        self.walk_struct("EIP712Domain", vec![0])?;
        if primary_type != "EIP712Domain" {
            self.walk_struct(&primary_type, vec![1])?;
        }

        self.send(TypedDataResponse::Signature {
            address: DEVICE_ADDRESS.to_string(),
            signature: DEVICE_SIGNATURE.to_vec(),
        })
    }

    fn recv(&mut self) -> Result<TypedDataMessage, String> {
        let message = self.rx.recv().map_err(|_| "host disconnected".to_string())?;
        let mut record = self.record.lock().unwrap();
        record.received.push(message.name());
        if let Fault::DisconnectAfter(limit) = self.fault {
            if record.received.len() > limit {
                return Err("simulated disconnect".to_string())
            }
        }
        Ok(message)
    }

    fn send(&mut self, response: TypedDataResponse) -> Result<(), String> {
        self.tx.send(response).map_err(|_| "host disconnected".to_string())
    }

    fn collect_struct(&mut self, name: &str) -> Result<(), String> {
        if self.record.lock().unwrap().structs.contains_key(name) {
            return Ok(())
        }
        self.send(TypedDataResponse::StructRequest { name: name.to_string() })?;
        let members = match self.recv()? {
            TypedDataMessage::StructAck { members } => members,
            other => return Err(format!("expected StructAck, got {other:?}")),
        };
        {
            let mut record = self.record.lock().unwrap();
            record.struct_requests.push(name.to_string());
            record.structs.insert(name.to_string(), members.clone());
        }

        for member in &members {
            let field_type = match &member.field_type.entry_type {
                Some(entry) => entry.as_ref(),
                None => &member.field_type,
            };
            if let Some(struct_name) = &field_type.struct_name {
                self.collect_struct(struct_name)?;
            }
        }
        Ok(())
    }

    fn walk_struct(&mut self, name: &str, path: Vec<u32>) -> Result<(), String> {
        let members = self.record.lock().unwrap().structs.get(name).cloned().unwrap_or_default();
        for (index, member) in members.iter().enumerate() {
            let mut member_path = path.clone();
            member_path.push(index as u32);
            self.walk_field(&member.field_type, member_path)?;
        }
        Ok(())
    }

    fn walk_field(&mut self, field_type: &WireFieldType, path: Vec<u32>) -> Result<(), String> {
        match field_type.data_type {
            DataType::Struct => {
                let name = field_type.struct_name.clone().ok_or("struct without name")?;
                self.walk_struct(&name, path)
            }
            DataType::Array => {
                let value = self.request_value(path.clone())?;
                if value.len() != 2 {
                    return Err(format!("array length at {path:?} is not a uint16: {value:?}"))
                }
                let length = u16::from_be_bytes([value[0], value[1]]) as u32;
                if let Some(size) = field_type.size {
                    if size != length {
                        return Err(format!("fixed array at {path:?} has {length} entries, not {size}"))
                    }
                }
                let entry = field_type.entry_type.clone().ok_or("array without entry type")?;
                for index in 0..length {
                    let mut entry_path = path.clone();
                    entry_path.push(index);
                    self.walk_field(&entry, entry_path)?;
                }
                Ok(())
            }
            _ => self.request_value(path).map(|_| ()),
        }
    }

    fn request_value(&mut self, path: Vec<u32>) -> Result<Vec<u8>, String> {
        self.send(TypedDataResponse::ValueRequest { member_path: path.clone() })?;
        let value = match self.recv()? {
            TypedDataMessage::ValueAck { value } => value,
            other => return Err(format!("expected ValueAck, got {other:?}")),
        };
        let first_value = {
            let mut record = self.record.lock().unwrap();
            record.values.push((path, value.clone()));
            record.values.len() == 1
        };

        if first_value && self.fault == Fault::StructRequestAfterValue {
            self.send(TypedDataResponse::StructRequest { name: "EIP712Domain".to_string() })?;
            // a well behaved host hangs up here, anything it does send is recorded
            let _ = self.recv();
            return Err("struct requested after a value".to_string())
        }
        Ok(value)
    }
}

/// Transport replaying a fixed list of device responses.
#[derive(Debug)]
pub struct ScriptedTransport {
    responses: VecDeque<TypedDataResponse>,
    pub sent: Vec<TypedDataMessage>,
}

impl ScriptedTransport {
    pub fn new(responses: impl IntoIterator<Item = TypedDataResponse>) -> Self {
        Self { responses: responses.into_iter().collect(), sent: Vec::new() }
    }
}

#[async_trait]
impl DeviceTransport for ScriptedTransport {
    type Error = DeviceDisconnected;

    async fn call(&mut self, message: TypedDataMessage) -> Result<TypedDataResponse, Self::Error> {
        self.sent.push(message);
        self.responses.pop_front().ok_or(DeviceDisconnected)
    }
}
