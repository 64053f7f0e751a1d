//! Implementation of a deployable handle for a compiled contract.

use crate::errors::DeployError;
use deployer_common::abi::{Error as AbiError, Token};
use deployer_common::{Abi, Bytecode, Contract};
use web3::types::Bytes;

/// A compiled contract that has not been deployed yet. It knows how to produce
/// the creation code for a deployment transaction.
#[derive(Clone, Debug)]
pub struct ContractFactory {
    contract: Contract,
}

impl ContractFactory {
    /// Creates a new factory for a contract resolved from an artifact.
    pub fn new(contract: Contract) -> Self {
        ContractFactory { contract }
    }

    /// The name of the contract this factory deploys.
    pub fn name(&self) -> &str {
        &self.contract.name
    }

    /// The fully qualified name of the contract this factory deploys.
    pub fn fully_qualified_name(&self) -> String {
        self.contract.fully_qualified_name()
    }

    /// Gets a reference to the contract ABI.
    pub fn abi(&self) -> &Abi {
        &self.contract.abi
    }

    /// Gets a reference to the contract creation bytecode.
    pub fn bytecode(&self) -> &Bytecode {
        &self.contract.bytecode
    }

    /// Encodes the data for a contract creation transaction: the linked
    /// creation code followed by the ABI encoded constructor parameters.
    pub fn deploy_data(&self, params: Vec<Token>) -> Result<Bytes, DeployError> {
        let bytecode = self.bytecode();
        if bytecode.is_empty() {
            return Err(DeployError::EmptyBytecode);
        }

        let code = bytecode.to_bytes()?;
        let data = match (self.abi().constructor(), params.is_empty()) {
            (None, false) => return Err(AbiError::InvalidData.into()),
            (None, true) => code,
            (Some(ctor), _) => Bytes(ctor.encode_input(code.0, &params)?),
        };

        Ok(data)
    }
}
