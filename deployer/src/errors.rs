//! Errors of a deployment run, from resolving the contract to confirming it.

mod hardhat;

use deployer_common::abi::Error as AbiError;
use secp256k1::Error as Secp256k1Error;
use thiserror::Error;
use web3::error::Error as Web3Error;
use web3::types::H256;

pub use deployer_common::errors::*;

/// Error that can occur while resolving, deploying or confirming a contract.
#[derive(Debug, Error)]
pub enum DeployError {
    /// No compiled artifact matches the requested contract name.
    #[error("no artifact found for {0}")]
    NotFound(String),

    /// A bare contract name matches contracts from several source files and a
    /// fully qualified name is needed to pick one.
    #[error("multiple artifacts for contract {name}, use one of: {}", .candidates.join(", "))]
    Ambiguous {
        /// The requested bare name.
        name: String,
        /// The fully qualified names matching the bare name.
        candidates: Vec<String>,
    },

    /// The creation code could not be produced from the bytecode.
    #[error("could not link bytecode: {0}")]
    Link(#[from] LinkError),

    /// The constructor parameters do not match the contract ABI.
    #[error("error ABI encoding deployment parameters: {0}")]
    Abi(#[from] AbiError),

    /// The contract has no creation code, as for interfaces and abstract
    /// contracts.
    #[error("contract has no bytecode to deploy")]
    EmptyBytecode,

    /// Error submitting the contract deployment transaction.
    #[error("error executing contract deployment transaction: {0}")]
    Tx(#[from] ExecutionError),

    /// The deployment transaction was not confirmed within the block timeout.
    #[error("contract deployment transaction {0:?} was not confirmed in time")]
    ConfirmTimeout(H256),

    /// The deployment transaction was mined but did not create a contract,
    /// for example because the constructor reverted or ran out of gas.
    #[error("contract deployment transaction {0:?} failed")]
    Failure(H256),
}

/// Error that can occur while submitting the deployment transaction.
#[derive(Debug, Error)]
pub enum ExecutionError {
    /// The node request failed, or the node rejected it for a reason not
    /// decoded into another variant.
    #[error("web3 error: {0}")]
    Web3(Web3Error),

    /// The node rejected the transaction because its execution reverted.
    #[error("transaction reverted with message: {0:?}")]
    Revert(Option<String>),

    /// The node rejected the transaction because it hit an invalid opcode.
    #[error("transaction executed an invalid opcode")]
    InvalidOpcode,

    /// The node has no unlocked accounts to sign the transaction with.
    #[error("no local accounts available to sign the transaction")]
    NoLocalAccounts,

    /// The node returned a different hash than the one computed for a locally
    /// signed transaction.
    #[error("node returned an unexpected transaction hash")]
    UnexpectedTransactionHash,
}

impl From<Web3Error> for ExecutionError {
    fn from(err: Web3Error) -> Self {
        if let Web3Error::Rpc(jsonrpc_err) = &err {
            if let Some(err) = hardhat::decode(jsonrpc_err) {
                return err;
            }
        }

        ExecutionError::Web3(err)
    }
}

impl From<Web3Error> for DeployError {
    fn from(err: Web3Error) -> Self {
        DeployError::Tx(err.into())
    }
}

/// An error that is thrown when creating a private key.
#[derive(Clone, Copy, Debug, Error)]
#[error("invalid private key")]
pub struct InvalidPrivateKey;

impl From<Secp256k1Error> for InvalidPrivateKey {
    fn from(_: Secp256k1Error) -> Self {
        InvalidPrivateKey
    }
}
