#![deny(missing_docs, unsafe_code)]

//! Deploys a compiled contract through a pluggable toolkit and reports the
//! address it was deployed to.
//!
//! The [`runner`] sequences the deployment steps against any [`Toolkit`].
//! [`Web3Toolkit`] is a toolkit backed by Hardhat artifacts and a `web3`
//! JSON-RPC transport.

#[cfg(test)]
#[allow(missing_docs)]
#[macro_use]
#[path = "test/macros.rs"]
mod test_macros;

pub mod account;
pub mod arguments;
pub mod config;
pub mod contract;
pub mod errors;
pub mod runner;
pub mod secret;
pub mod toolkit;
pub mod tracing;

pub use crate::config::DeployConfig;
pub use crate::contract::{Confirmed, ContractFactory, Deployment, Pending};
pub use crate::runner::{execute, DeploymentRunner};
pub use crate::toolkit::{ConfirmPolicy, Toolkit, Web3Toolkit};
pub use deployer_common as common;
pub use web3;
