//! The collaborator seam used by the deployment runner. A toolkit knows how
//! to resolve compiled contracts and how to get them onto a chain; the runner
//! only sequences its calls.

mod rpc;

pub use self::rpc::{ConfirmPolicy, Web3Toolkit, DEFAULT_BLOCK_TIMEOUT};
use crate::contract::{Confirmed, ContractFactory, Deployment, Pending};
use crate::errors::DeployError;
use deployer_common::abi::Token;

/// A blockchain development toolkit able to deploy compiled contracts.
///
/// Deployments run as a single sequential task, so the returned futures are
/// not required to be `Send`.
#[async_trait::async_trait(?Send)]
pub trait Toolkit {
    /// Resolves a deployable factory for a contract, identified either by its
    /// bare name or by its fully qualified name.
    async fn contract_factory(&self, name: &str) -> Result<ContractFactory, DeployError>;

    /// Submits a contract creation transaction with the given constructor
    /// parameters. Resolves once the node accepted the transaction.
    async fn deploy(
        &self,
        factory: ContractFactory,
        params: Vec<Token>,
    ) -> Result<Deployment<Pending>, DeployError>;

    /// Waits for a submitted deployment to be confirmed on chain. Any limit
    /// on how long to wait is enforced here.
    async fn deployed(
        &self,
        deployment: Deployment<Pending>,
    ) -> Result<Deployment<Confirmed>, DeployError>;
}
