//! Compiled contracts loaded from a build output directory.
//!
//! Each contract is keyed by its fully qualified name so that contracts with
//! the same name declared in different source files can coexist. Loaders for
//! specific build tools live in submodules.

use crate::Contract;
use std::collections::HashMap;

pub mod hardhat;

/// A collection of compiled contracts, keyed by fully qualified name.
#[derive(Clone, Debug)]
pub struct Artifact {
    origin: String,
    contracts: HashMap<String, Contract>,
}

impl Artifact {
    /// Creates an empty collection. `origin` is a human readable description
    /// of where the contracts come from, usually the artifacts directory.
    pub fn with_origin(origin: impl Into<String>) -> Self {
        Artifact {
            origin: origin.into(),
            contracts: HashMap::new(),
        }
    }

    /// Where the contracts were loaded from.
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Number of contracts in the collection.
    pub fn len(&self) -> usize {
        self.contracts.len()
    }

    /// Returns `true` if no contract was loaded.
    pub fn is_empty(&self) -> bool {
        self.contracts.is_empty()
    }

    /// Finds every contract identified by `name`. A bare name may match
    /// contracts from several source files, a fully qualified name matches at
    /// most one.
    pub fn find(&self, name: &str) -> Vec<&Contract> {
        self.contracts
            .values()
            .filter(|contract| contract.is_named(name))
            .collect()
    }

    /// Adds a contract, returning the one it replaced under the same fully
    /// qualified name.
    pub fn insert(&mut self, contract: Contract) -> Option<Contract> {
        self.contracts
            .insert(contract.fully_qualified_name(), contract)
    }
}
