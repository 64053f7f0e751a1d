//! Explicit configuration for a deployment run.

use crate::account::Account;
use crate::toolkit::{ConfirmPolicy, Web3Toolkit};
use deployer_common::Artifact;
use std::path::PathBuf;
use url::Url;
use web3::api::Web3;
use web3::types::U256;
use web3::Transport;

/// The contract deployed when none is configured.
pub const DEFAULT_CONTRACT: &str = "Implementation";

/// Everything needed to deploy a contract to a node.
#[derive(Clone, Debug)]
pub struct DeployConfig {
    /// The JSON-RPC endpoint of the node to deploy to.
    pub node_url: Url,
    /// The bare or fully qualified name of the contract to deploy.
    pub contract: String,
    /// The directory containing the compiled artifacts.
    pub artifacts: PathBuf,
    /// The account to deploy from. The node's first account is used when it
    /// is not set.
    pub account: Option<Account>,
    /// How the deployment transaction gets confirmed.
    pub confirm: ConfirmPolicy,
    /// The gas limit override.
    pub gas: Option<U256>,
    /// The gas price override.
    pub gas_price: Option<U256>,
}

impl DeployConfig {
    /// Creates a configuration for deploying the default contract from the
    /// given artifacts directory.
    pub fn new(node_url: Url, artifacts: impl Into<PathBuf>) -> Self {
        DeployConfig {
            node_url,
            contract: DEFAULT_CONTRACT.to_owned(),
            artifacts: artifacts.into(),
            account: None,
            confirm: ConfirmPolicy::mined(),
            gas: None,
            gas_price: None,
        }
    }

    /// Creates a toolkit that deploys contracts from `artifact` using this
    /// configuration's account, confirmation and gas settings.
    pub fn toolkit<T: Transport>(&self, web3: Web3<T>, artifact: Artifact) -> Web3Toolkit<T> {
        let mut toolkit = Web3Toolkit::new(web3, artifact).confirm(self.confirm.clone());
        if let Some(account) = &self.account {
            toolkit = toolkit.account(account.clone());
        }
        if let Some(gas) = self.gas {
            toolkit = toolkit.gas(gas);
        }
        if let Some(gas_price) = self.gas_price {
            toolkit = toolkit.gas_price(gas_price);
        }
        toolkit
    }
}
