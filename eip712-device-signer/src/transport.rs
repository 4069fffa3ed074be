use async_trait::async_trait;
use std::fmt;

use crate::messages::{TypedDataMessage, TypedDataResponse};

/// A channel to a signing device.
///
/// Implementations deliver one message and return the device's answer. The session never has
/// more than one message in flight, and never retries: a failed call aborts the session.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait DeviceTransport: fmt::Debug + Send {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Sends `message` and waits for the device's response.
    async fn call(&mut self, message: TypedDataMessage) -> Result<TypedDataResponse, Self::Error>;
}
