//! Who signs the deployment transaction.

use crate::secret::PrivateKey;
use web3::types::Address;

/// The account a deployment is sent from.
#[derive(Clone, Debug)]
pub enum Account {
    /// An account unlocked on the node, which signs the transaction.
    Local(Address),
    /// A key held by the deployer. The transaction is signed before it is
    /// sent; the chain ID is queried from the node when not given.
    Offline(PrivateKey, Option<u64>),
}

impl Account {
    /// The address the deployment is sent from.
    pub fn address(&self) -> Address {
        match self {
            Account::Local(address) => *address,
            Account::Offline(key, _) => key.public_address(),
        }
    }
}
