use futures_util::lock::Mutex;
use tracing::{debug, instrument};

use crate::{
    network::{BuiltinNetworks, NetworkDirectory},
    session::{Step, TypedDataSession},
    transport::DeviceTransport,
    types::{DeviceSignerError, SignTypedDataParams, TypedDataSignature},
};

/// Typed data signer for a single device.
///
/// This is a simple wrapper around a [device transport](DeviceTransport). The transport sits
/// behind a lock so that at most one signing session talks to the device at a time.
#[derive(Debug)]
pub struct DeviceSigner<T, N = BuiltinNetworks> {
    transport: Mutex<T>,
    networks: N,
}

impl<T: DeviceTransport> DeviceSigner<T> {
    /// Instantiates the signer with the built-in network list.
    pub fn new(transport: T) -> Self {
        Self::with_networks(transport, BuiltinNetworks)
    }
}

impl<T: DeviceTransport, N: NetworkDirectory> DeviceSigner<T, N> {
    /// Instantiates the signer with a custom network directory.
    pub fn with_networks(transport: T, networks: N) -> Self {
        Self { transport: Mutex::new(transport), networks }
    }

    /// Consume self and return the transport
    pub fn into_inner(self) -> T {
        self.transport.into_inner()
    }

    /// Signs EIP-712 typed data on the device (requires confirmation on the device).
    ///
    /// The device requests struct definitions and values one at a time; each request is
    /// answered from `params.data` until the device returns its signature. Any error aborts the
    /// exchange without sending anything else.
    #[instrument(skip_all, fields(primary_type = %params.data.primary_type))]
    pub async fn sign_typed_data(
        &self,
        params: &SignTypedDataParams,
    ) -> Result<TypedDataSignature, DeviceSignerError> {
        let address_n = params.path.to_path()?;
        let network = self.networks.resolve_network(&address_n);
        debug!(path = %params.path, network = ?network.as_ref().map(|n| &n.name), "signing typed data");

        let mut transport = self.transport.lock().await;
        let mut session = TypedDataSession::new(&params.data, &self.networks, network);
        let mut message = session.start(address_n, params.metamask_v4_compat)?;

        loop {
            debug!(message = message.name(), "sending to device");
            let response = match transport.call(message).await {
                Ok(response) => response,
                Err(err) => {
                    session.abort();
                    return Err(DeviceSignerError::Transport(Box::new(err)))
                }
            };

            match session.advance(response)? {
                Step::Send(next) => message = next,
                Step::Finished(signature) => return Ok(signature),
            }
        }
    }
}
