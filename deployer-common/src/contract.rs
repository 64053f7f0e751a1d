//! A compiled contract as described by its artifact.

use crate::{Abi, Bytecode};
use serde::Deserialize;
use std::collections::BTreeMap;

/// Represents a compiled contract.
#[derive(Clone, Debug, Deserialize)]
pub struct Contract {
    /// The contract name.
    #[serde(rename = "contractName", default)]
    pub name: String,
    /// Source file the contract is declared in, relative to the project root.
    #[serde(rename = "sourceName", default)]
    pub source_name: Option<String>,
    /// The contract ABI.
    pub abi: Abi,
    /// Creation bytecode, possibly with unlinked library placeholders.
    #[serde(default)]
    pub bytecode: Bytecode,
}

impl Contract {
    /// Creates a contract with the given name, no source, an empty ABI and
    /// empty bytecode.
    pub fn with_name(name: impl Into<String>) -> Self {
        Contract {
            name: name.into(),
            source_name: None,
            abi: Abi {
                constructor: None,
                functions: BTreeMap::new(),
                events: BTreeMap::new(),
                errors: BTreeMap::new(),
                receive: false,
                fallback: false,
            },
            bytecode: Bytecode::default(),
        }
    }

    /// `contracts/Source.sol:Name`, or the bare name when the source file is
    /// unknown.
    pub fn fully_qualified_name(&self) -> String {
        match &self.source_name {
            Some(source) => format!("{}:{}", source, self.name),
            None => self.name.clone(),
        }
    }

    /// Returns `true` if `name` identifies this contract. Names containing a
    /// `:` are compared against the fully qualified name.
    pub fn is_named(&self, name: &str) -> bool {
        if name.contains(':') {
            self.fully_qualified_name() == name
        } else {
            self.name == name
        }
    }
}
