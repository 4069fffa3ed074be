//! Built-in directory of Ethereum-family networks, keyed by SLIP-44 coin type.
use once_cell::sync::Lazy;
use serde::Deserialize;

const NETWORKS_JSON: &str = include_str!("./networks/networks.json");

static NETWORKS: Lazy<Vec<EthereumNetwork>> =
    Lazy::new(|| serde_json::from_str(NETWORKS_JSON).expect("embedded network list is valid"));

/// Bit set on hardened BIP-32 path components.
pub const HARDENED: u32 = 0x8000_0000;

/// Parameters of an Ethereum-family network.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct EthereumNetwork {
    pub name: String,
    pub shortcut: String,
    pub chain: String,
    pub chain_id: u64,
    pub slip44: u32,
    /// Whether addresses on this network use the chain id aware RSKIP-60 checksum.
    pub rskip60: bool,
}

/// Finds the network whose SLIP-44 coin type matches the second component of `path`.
///
/// Several testnets share coin type `1`; the first one listed wins.
pub fn ethereum_network_by_path(path: &[u32]) -> Option<EthereumNetwork> {
    let slip44 = path.get(1)? & !HARDENED;
    NETWORKS.iter().find(|network| network.slip44 == slip44).cloned()
}

/// Finds a network by name or shortcut, ignoring case.
pub fn ethereum_network_by_name(name: &str) -> Option<EthereumNetwork> {
    NETWORKS
        .iter()
        .find(|network| {
            network.name.eq_ignore_ascii_case(name) || network.shortcut.eq_ignore_ascii_case(name)
        })
        .cloned()
}

/// All known networks.
pub fn ethereum_networks() -> &'static [EthereumNetwork] {
    &NETWORKS
}
