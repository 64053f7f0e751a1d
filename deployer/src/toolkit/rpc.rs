//! A toolkit that deploys contracts from compiled artifacts to a node over
//! JSON-RPC.

mod confirm;
mod submit;

pub use self::confirm::{ConfirmPolicy, DEFAULT_BLOCK_TIMEOUT};
use self::submit::Creation;
use crate::account::Account;
use crate::contract::{Confirmed, ContractFactory, Deployment, Pending};
use crate::errors::DeployError;
use crate::toolkit::Toolkit;
use deployer_common::abi::Token;
use deployer_common::{Artifact, Contract};
use web3::api::Web3;
use web3::types::U256;
use web3::Transport;

/// Deploys contracts found in an [`Artifact`] through a `web3` provider.
#[derive(Clone, Debug)]
pub struct Web3Toolkit<T: Transport> {
    web3: Web3<T>,
    artifact: Artifact,
    account: Option<Account>,
    confirm: ConfirmPolicy,
    gas: Option<U256>,
    gas_price: Option<U256>,
}

impl<T: Transport> Web3Toolkit<T> {
    /// Creates a toolkit that sends deployments from the node's first account
    /// and considers them confirmed once mined.
    pub fn new(web3: Web3<T>, artifact: Artifact) -> Self {
        Web3Toolkit {
            web3,
            artifact,
            account: None,
            confirm: ConfirmPolicy::mined(),
            gas: None,
            gas_price: None,
        }
    }

    /// Sends deployments from `account`.
    pub fn account(mut self, value: Account) -> Self {
        self.account = Some(value);
        self
    }

    /// Waits for deployments according to `value`.
    pub fn confirm(mut self, value: ConfirmPolicy) -> Self {
        self.confirm = value;
        self
    }

    /// Uses a fixed gas limit instead of an estimate.
    pub fn gas(mut self, value: U256) -> Self {
        self.gas = Some(value);
        self
    }

    /// Uses a fixed gas price instead of the node's.
    pub fn gas_price(mut self, value: U256) -> Self {
        self.gas_price = Some(value);
        self
    }

    fn resolve(&self, name: &str) -> Result<&Contract, DeployError> {
        let mut matches = self.artifact.find(name);
        match matches.len() {
            0 => Err(DeployError::NotFound(name.to_owned())),
            1 => Ok(matches.remove(0)),
            _ => {
                let mut candidates = matches
                    .iter()
                    .map(|contract| contract.fully_qualified_name())
                    .collect::<Vec<_>>();
                candidates.sort();
                Err(DeployError::Ambiguous {
                    name: name.to_owned(),
                    candidates,
                })
            }
        }
    }
}

#[async_trait::async_trait(?Send)]
impl<T: Transport> Toolkit for Web3Toolkit<T> {
    async fn contract_factory(&self, name: &str) -> Result<ContractFactory, DeployError> {
        let contract = self.resolve(name)?;
        tracing::debug!(
            contract = %contract.fully_qualified_name(),
            origin = %self.artifact.origin(),
            "resolved contract factory"
        );

        Ok(ContractFactory::new(contract.clone()))
    }

    async fn deploy(
        &self,
        factory: ContractFactory,
        params: Vec<Token>,
    ) -> Result<Deployment<Pending>, DeployError> {
        let creation = Creation {
            data: factory.deploy_data(params)?,
            gas: self.gas,
            gas_price: self.gas_price,
        };
        let transaction_hash = submit::submit(&self.web3, self.account.as_ref(), creation).await?;
        tracing::info!(
            contract = %factory.fully_qualified_name(),
            from = ?self.account.as_ref().map(Account::address),
            ?transaction_hash,
            "submitted contract deployment"
        );

        Ok(Deployment::pending(factory.name(), transaction_hash))
    }

    async fn deployed(
        &self,
        deployment: Deployment<Pending>,
    ) -> Result<Deployment<Confirmed>, DeployError> {
        confirm::confirm(&self.web3, deployment, &self.confirm).await
    }
}
