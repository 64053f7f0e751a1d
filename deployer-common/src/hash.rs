//! Keccak256 hashing and the address encoding built on it.

use tiny_keccak::{Hasher, Keccak};
use web3::types::Address;

/// Perform a Keccak256 hash of data and return its 32-byte result.
pub fn keccak256<B>(data: B) -> [u8; 32]
where
    B: AsRef<[u8]>,
{
    let mut output = [0u8; 32];
    let mut hasher = Keccak::v256();
    hasher.update(data.as_ref());
    hasher.finalize(&mut output);
    output
}

/// Formats an address with the mixed case checksum of EIP-55: a hex letter
/// is upper case when the matching nibble of the hash of the lower case
/// address is 8 or more.
pub fn to_checksum(address: &Address) -> String {
    let lower = hex::encode(address.as_bytes());
    let hash = keccak256(&lower);

    let mut checksummed = String::with_capacity(2 + lower.len());
    checksummed.push_str("0x");
    for (i, c) in lower.chars().enumerate() {
        let nibble = if i % 2 == 0 {
            hash[i / 2] >> 4
        } else {
            hash[i / 2] & 0x0f
        };
        checksummed.push(if nibble >= 8 { c.to_ascii_uppercase() } else { c });
    }
    checksummed
}
