use std::fmt;

use eip712_device_core::{
    networks::{ethereum_network_by_path, EthereumNetwork},
    utils::to_checksum_address,
    TypedDataError,
};

/// Source of per-network parameters needed to present the signer address.
pub trait NetworkDirectory: fmt::Debug + Send + Sync {
    /// Finds the network the signer derivation path belongs to.
    fn resolve_network(&self, path: &[u32]) -> Option<EthereumNetwork>;

    /// Checksums a raw hex address according to the rules of `network`.
    fn checksum_address(
        &self,
        address: &str,
        network: Option<&EthereumNetwork>,
    ) -> Result<String, TypedDataError>;
}

/// [`NetworkDirectory`] backed by the network list shipped with `eip712-device-core`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinNetworks;

impl NetworkDirectory for BuiltinNetworks {
    fn resolve_network(&self, path: &[u32]) -> Option<EthereumNetwork> {
        ethereum_network_by_path(path)
    }

    fn checksum_address(
        &self,
        address: &str,
        network: Option<&EthereumNetwork>,
    ) -> Result<String, TypedDataError> {
        to_checksum_address(address, network)
    }
}
