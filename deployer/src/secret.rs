//! Private keys for signing the deployment transaction offline.

use crate::errors::InvalidPrivateKey;
use deployer_common::hash;
use secp256k1::{Message, PublicKey, Secp256k1, SecretKey};
use std::fmt::{self, Debug, Formatter};
use std::str::FromStr;
use web3::signing::{Key, Signature, SigningError};
use web3::types::{Address, H256};
use zeroize::Zeroizing;

/// A secp256k1 private key together with the address it controls.
///
/// The key bytes are wiped when the value is dropped and `Debug` only shows
/// the address.
#[derive(Clone)]
pub struct PrivateKey {
    secret: Zeroizing<[u8; 32]>,
    address: Address,
}

impl PrivateKey {
    /// Creates a key from its 32 raw bytes.
    pub fn from_slice<B: AsRef<[u8]>>(raw: B) -> Result<Self, InvalidPrivateKey> {
        Ok(Self::from_secret(SecretKey::from_slice(raw.as_ref())?))
    }

    fn from_secret(secret: SecretKey) -> Self {
        let public = PublicKey::from_secret_key(&Secp256k1::signing_only(), &secret);
        // Uncompressed public keys carry a 0x04 tag byte that is not hashed.
        let digest = hash::keccak256(&public.serialize_uncompressed()[1..]);

        PrivateKey {
            secret: Zeroizing::new(secret.secret_bytes()),
            address: Address::from_slice(&digest[12..]),
        }
    }

    /// The account address derived from the key.
    pub fn public_address(&self) -> Address {
        self.address
    }

    fn secret_key(&self) -> Result<SecretKey, SigningError> {
        SecretKey::from_slice(&self.secret[..]).map_err(|_| SigningError::InvalidMessage)
    }
}

/// Parses 64 hex digits, with or without a `0x` prefix.
impl FromStr for PrivateKey {
    type Err = InvalidPrivateKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let secret = SecretKey::from_str(s.strip_prefix("0x").unwrap_or(s))?;
        Ok(Self::from_secret(secret))
    }
}

impl Debug for PrivateKey {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "PrivateKey({:?})", self.address)
    }
}

impl Key for &PrivateKey {
    fn sign(&self, message: &[u8], chain_id: Option<u64>) -> Result<Signature, SigningError> {
        let mut signature = self.sign_message(message)?;
        // EIP-155 replay protection folds the chain ID into `v`.
        signature.v += match chain_id {
            Some(chain_id) => 35 + 2 * chain_id,
            None => 27,
        };
        Ok(signature)
    }

    fn sign_message(&self, message: &[u8]) -> Result<Signature, SigningError> {
        let digest =
            Message::from_digest_slice(message).map_err(|_| SigningError::InvalidMessage)?;
        let (recovery, compact) = Secp256k1::signing_only()
            .sign_ecdsa_recoverable(&digest, &self.secret_key()?)
            .serialize_compact();

        Ok(Signature {
            v: recovery.to_i32() as u64,
            r: H256::from_slice(&compact[..32]),
            s: H256::from_slice(&compact[32..]),
        })
    }

    fn address(&self) -> Address {
        self.address
    }
}
