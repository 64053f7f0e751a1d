#![deny(missing_docs, unsafe_code)]

//! Crate for common types shared between the `deployer` runtime and any tool
//! that needs to read compiled contract artifacts.

pub mod artifact;
pub mod bytecode;
pub mod contract;
pub mod errors;
pub mod hash;

pub use crate::artifact::Artifact;
pub use crate::bytecode::Bytecode;
pub use crate::contract::Contract;
pub use ethabi::{self as abi, Contract as Abi};
pub use web3::types::Address;
pub use web3::types::H256 as TransactionHash;
