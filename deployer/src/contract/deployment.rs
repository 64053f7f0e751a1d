//! A deployment handle whose state is tracked in its type, so that the
//! deployed address can only be read once the creation transaction has been
//! confirmed.

use deployer_common::hash;
use std::fmt::{self, Display, Formatter};
use web3::types::{Address, H256, U64};

/// State of a deployment whose creation transaction was submitted but not yet
/// confirmed.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Pending;

/// State of a deployment whose creation transaction was mined and confirmed.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Confirmed {
    address: Address,
    block_number: Option<U64>,
}

/// A single contract deployment, in state `S`.
#[derive(Clone, Debug, Eq, PartialEq)]
#[must_use = "deployments should be confirmed before their address is used"]
pub struct Deployment<S> {
    contract: String,
    transaction_hash: H256,
    state: S,
}

impl<S> Deployment<S> {
    /// The name of the deployed contract.
    pub fn contract(&self) -> &str {
        &self.contract
    }

    /// The hash of the contract creation transaction.
    pub fn transaction_hash(&self) -> H256 {
        self.transaction_hash
    }
}

impl Deployment<Pending> {
    /// Creates a handle for a submitted contract creation transaction.
    pub fn pending(contract: impl Into<String>, transaction_hash: H256) -> Self {
        Deployment {
            contract: contract.into(),
            transaction_hash,
            state: Pending,
        }
    }

    /// Marks the deployment as confirmed at the given address.
    pub fn confirm(self, address: Address, block_number: Option<U64>) -> Deployment<Confirmed> {
        Deployment {
            contract: self.contract,
            transaction_hash: self.transaction_hash,
            state: Confirmed {
                address,
                block_number,
            },
        }
    }
}

impl Deployment<Confirmed> {
    /// The address of the deployed contract.
    pub fn address(&self) -> Address {
        self.state.address
    }

    /// The block the creation transaction was mined in, if the node reported
    /// it.
    pub fn block_number(&self) -> Option<U64> {
        self.state.block_number
    }
}

/// The report line, with the address in EIP-55 checksum form.
impl Display for Deployment<Confirmed> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(
            f,
            "{} deployed to: {}",
            self.contract,
            hash::to_checksum(&self.address())
        )
    }
}
