//! Abstractions for compiled contracts that are ready to be deployed, and
//! for tracking a deployment until it is confirmed on chain.

mod deployment;
mod factory;

pub use self::deployment::{Confirmed, Deployment, Pending};
pub use self::factory::ContractFactory;
