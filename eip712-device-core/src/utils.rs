//! Various utilities for manipulating Ethereum related data.
use tiny_keccak::{Hasher, Keccak};

use crate::{error::TypedDataError, networks::EthereumNetwork};

/// Compute the Keccak-256 hash of input bytes.
pub fn keccak256<T: AsRef<[u8]>>(bytes: T) -> [u8; 32] {
    let mut output = [0u8; 32];

    let mut hasher = Keccak::v256();
    hasher.update(bytes.as_ref());
    hasher.finalize(&mut output);

    output
}

/// Removes a leading `0x` or `0X`, if any.
pub fn strip_hex_prefix(s: &str) -> &str {
    s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")).unwrap_or(s)
}

/// Converts an address to its checksummed, `0x`-prefixed form.
///
/// This is [EIP-55](https://eips.ethereum.org/EIPS/eip-55) unless the network opted into
/// [RSKIP-60](https://github.com/rsksmart/RSKIPs/blob/master/IPs/RSKIP60.md), in which case
/// the chain id is mixed into the hashed input.
pub fn to_checksum_address(
    address: &str,
    network: Option<&EthereumNetwork>,
) -> Result<String, TypedDataError> {
    let address = strip_hex_prefix(address).to_ascii_lowercase();
    if address.len() != 40 || !address.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(TypedDataError::invalid(format!("`{address}` is not a valid address")))
    }

    let hashed = match network {
        Some(network) if network.rskip60 => {
            keccak256(format!("{}0x{address}", network.chain_id))
        }
        _ => keccak256(&address),
    };
    let hash = hex::encode(hashed);

    let checksummed = address
        .chars()
        .zip(hash.chars())
        .map(|(c, h)| match h.to_digit(16) {
            Some(nibble) if nibble >= 8 => c.to_ascii_uppercase(),
            _ => c,
        })
        .collect::<String>();

    Ok(format!("0x{checksummed}"))
}
