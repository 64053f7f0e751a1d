//! Waits for the creation transaction of a deployment to be mined and buried
//! under the configured number of blocks.

use crate::contract::{Confirmed, Deployment, Pending};
use crate::errors::DeployError;
use futures_timer::Delay;
use std::time::Duration;
use web3::api::Web3;
use web3::types::{TransactionReceipt, U64};
use web3::Transport;

#[cfg(not(test))]
const FIRST_POLL_INTERVAL: Duration = Duration::from_millis(250);
#[cfg(test)]
const FIRST_POLL_INTERVAL: Duration = Duration::ZERO;

#[cfg(not(test))]
const MAX_POLL_INTERVAL: Duration = Duration::from_secs(7);
#[cfg(test)]
const MAX_POLL_INTERVAL: Duration = Duration::ZERO;

/// Number of blocks to wait for a deployment before giving up.
pub const DEFAULT_BLOCK_TIMEOUT: usize = 25;

/// How long and how hard to wait for a deployment.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ConfirmPolicy {
    /// Blocks required on top of the one the deployment was mined in.
    pub confirmations: usize,
    /// Blocks to wait, counted from the first block seen, before giving up.
    /// `None` waits forever.
    pub block_timeout: Option<usize>,
    /// Delay before polling the node for a new block. It doubles with every
    /// poll that does not see the block waited for.
    pub poll_interval: Duration,
    /// Upper bound for the poll delay.
    pub max_poll_interval: Duration,
}

impl ConfirmPolicy {
    /// Confirms as soon as the deployment is mined.
    pub fn mined() -> Self {
        ConfirmPolicy::with_confirmations(0)
    }

    /// Confirms once `confirmations` blocks were mined on top of the
    /// deployment.
    pub fn with_confirmations(confirmations: usize) -> Self {
        ConfirmPolicy {
            confirmations,
            block_timeout: Some(DEFAULT_BLOCK_TIMEOUT),
            poll_interval: FIRST_POLL_INTERVAL,
            max_poll_interval: MAX_POLL_INTERVAL,
        }
    }

    /// Replaces the block timeout.
    pub fn block_timeout(mut self, blocks: Option<usize>) -> Self {
        self.block_timeout = blocks;
        self
    }
}

/// Polls the node until the deployment is confirmed, then reads the contract
/// address from its receipt.
///
/// The receipt is fetched again after every block that was waited for, so a
/// deployment that a reorg moved to another block is tracked there.
pub async fn confirm<T: Transport>(
    web3: &Web3<T>,
    deployment: Deployment<Pending>,
    policy: &ConfirmPolicy,
) -> Result<Deployment<Confirmed>, DeployError> {
    let hash = deployment.transaction_hash();
    let confirmations = policy.confirmations;
    let mut head = web3.eth().block_number().await?;
    let deadline = policy.block_timeout.map(|blocks| head + blocks);

    let receipt = loop {
        let receipt = web3.eth().transaction_receipt(hash).await?;
        let needed = match receipt {
            Some(receipt) => match receipt.block_number {
                Some(mined) if confirmations == 0 || head >= mined + confirmations => {
                    break receipt
                }
                Some(mined) => mined + confirmations,
                None => head + confirmations + 1,
            },
            None => head + confirmations + 1,
        };

        if matches!(deadline, Some(deadline) if needed > deadline) {
            return Err(DeployError::ConfirmTimeout(hash));
        }
        tracing::debug!(%head, %needed, "waiting for deployment block");
        head = wait_for_block(web3, needed, policy).await?;
    };

    into_confirmed(deployment, receipt)
}

async fn wait_for_block<T: Transport>(
    web3: &Web3<T>,
    block: U64,
    policy: &ConfirmPolicy,
) -> Result<U64, DeployError> {
    let mut interval = policy.poll_interval;
    loop {
        if !interval.is_zero() {
            Delay::new(interval).await;
        }

        let head = web3.eth().block_number().await?;
        if head >= block {
            return Ok(head);
        }
        interval = (interval * 2).min(policy.max_poll_interval);
    }
}

/// Only a successful receipt that names the created contract confirms the
/// deployment; a reverted constructor leaves no contract behind.
fn into_confirmed(
    deployment: Deployment<Pending>,
    receipt: TransactionReceipt,
) -> Result<Deployment<Confirmed>, DeployError> {
    match (receipt.status, receipt.contract_address) {
        (Some(status), Some(address)) if status == U64::one() => {
            tracing::info!(
                ?address,
                block_number = ?receipt.block_number,
                "contract deployment confirmed"
            );
            Ok(deployment.confirm(address, receipt.block_number))
        }
        _ => Err(DeployError::Failure(deployment.transaction_hash())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::prelude::*;
    use serde_json::Value;
    use web3::error::Error as Web3Error;
    use web3::types::{Address, H2048, H256};

    const HASH: H256 = H256::repeat_byte(0x42);

    fn contract_address() -> Address {
        addr!("0x5FbDB2315678afecb367f032d93F642f64180aa3")
    }

    fn receipt(block: u64, status: &str, contract_address: Option<Address>) -> Value {
        json!({
            "transactionHash": HASH,
            "transactionIndex": "0x0",
            "from": addr!("0x9876543210987654321098765432109876543210"),
            "blockNumber": U64::from(block),
            "blockHash": H256::repeat_byte(1),
            "cumulativeGasUsed": "0x1337",
            "gasUsed": "0x1337",
            "contractAddress": contract_address,
            "logsBloom": H2048::zero(),
            "logs": [],
            "status": status,
        })
    }

    fn mined_in(block: u64) -> Value {
        receipt(block, "0x1", Some(contract_address()))
    }

    fn pending() -> Deployment<Pending> {
        Deployment::pending("Implementation", HASH)
    }

    #[test]
    fn mined_deployment_is_confirmed() {
        let transport = TestTransport::new();
        let web3 = Web3::new(transport.clone());

        transport.push_reply(json!("0x1"));
        transport.push_reply(mined_in(1));
        let deployment = confirm(&web3, pending(), &ConfirmPolicy::mined())
            .immediate()
            .unwrap();

        assert_eq!(deployment.address(), contract_address());
        assert_eq!(deployment.block_number(), Some(1.into()));
        transport.expect_request("eth_blockNumber", &[]);
        transport.expect_request("eth_getTransactionReceipt", &[json!(HASH)]);
        transport.assert_drained();
    }

    #[test]
    fn receipt_ahead_of_block_number_is_enough_without_confirmations() {
        let transport = TestTransport::new();
        let web3 = Web3::new(transport.clone());

        // Automining nodes can return the receipt before the new block number.
        transport.push_reply(json!("0x1"));
        transport.push_reply(mined_in(2));
        let deployment = confirm(&web3, pending(), &ConfirmPolicy::mined())
            .immediate()
            .unwrap();

        assert_eq!(deployment.block_number(), Some(2.into()));
        transport.expect_request("eth_blockNumber", &[]);
        transport.expect_request("eth_getTransactionReceipt", &[json!(HASH)]);
        transport.assert_drained();
    }

    #[test]
    fn waits_for_confirmation_blocks() {
        let transport = TestTransport::new();
        let web3 = Web3::new(transport.clone());

        transport.push_reply(json!("0x1"));
        transport.push_reply(mined_in(1));
        transport.push_reply(json!("0x2"));
        transport.push_reply(json!("0x3"));
        transport.push_reply(mined_in(1));
        let deployment = confirm(&web3, pending(), &ConfirmPolicy::with_confirmations(2))
            .immediate()
            .unwrap();

        assert_eq!(deployment.block_number(), Some(1.into()));
        transport.expect_request("eth_blockNumber", &[]);
        transport.expect_request("eth_getTransactionReceipt", &[json!(HASH)]);
        transport.expect_request("eth_blockNumber", &[]);
        transport.expect_request("eth_blockNumber", &[]);
        transport.expect_request("eth_getTransactionReceipt", &[json!(HASH)]);
        transport.assert_drained();
    }

    #[test]
    fn follows_deployment_moved_by_reorg() {
        let transport = TestTransport::new();
        let web3 = Web3::new(transport.clone());

        transport.push_reply(json!("0x1"));
        transport.push_reply(mined_in(1));
        transport.push_reply(json!("0x2"));
        // The block it was mined in got replaced.
        transport.push_reply(json!(null));
        transport.push_reply(json!("0x4"));
        transport.push_reply(mined_in(3));
        let deployment = confirm(&web3, pending(), &ConfirmPolicy::with_confirmations(1))
            .immediate()
            .unwrap();

        assert_eq!(deployment.block_number(), Some(3.into()));
        transport.expect_request("eth_blockNumber", &[]);
        transport.expect_request("eth_getTransactionReceipt", &[json!(HASH)]);
        transport.expect_request("eth_blockNumber", &[]);
        transport.expect_request("eth_getTransactionReceipt", &[json!(HASH)]);
        transport.expect_request("eth_blockNumber", &[]);
        transport.expect_request("eth_getTransactionReceipt", &[json!(HASH)]);
        transport.assert_drained();
    }

    #[test]
    fn gives_up_after_block_timeout() {
        let transport = TestTransport::new();
        let web3 = Web3::new(transport.clone());

        // Pending at block 1, so block 2 is the earliest it can be mined in.
        transport.push_reply(json!("0x1"));
        transport.push_reply(json!(null));
        // Still pending at block 2, which would need block 3.
        transport.push_reply(json!("0x2"));
        transport.push_reply(json!(null));
        let err = confirm(&web3, pending(), &ConfirmPolicy::mined().block_timeout(Some(1)))
            .immediate()
            .unwrap_err();

        assert!(
            matches!(err, DeployError::ConfirmTimeout(hash) if hash == HASH),
            "unexpected error {err:?}"
        );
        transport.expect_request("eth_blockNumber", &[]);
        transport.expect_request("eth_getTransactionReceipt", &[json!(HASH)]);
        transport.expect_request("eth_blockNumber", &[]);
        transport.expect_request("eth_getTransactionReceipt", &[json!(HASH)]);
        transport.assert_drained();
    }

    #[test]
    fn waits_forever_without_block_timeout() {
        let transport = TestTransport::new();
        let web3 = Web3::new(transport.clone());

        transport.push_reply(json!("0x1"));
        transport.push_reply(json!(null));
        transport.push_reply(json!("0x100"));
        transport.push_reply(mined_in(0x100));
        let deployment = confirm(&web3, pending(), &ConfirmPolicy::mined().block_timeout(None))
            .immediate()
            .unwrap();

        assert_eq!(deployment.block_number(), Some(0x100.into()));
        transport.expect_request("eth_blockNumber", &[]);
        transport.expect_request("eth_getTransactionReceipt", &[json!(HASH)]);
        transport.expect_request("eth_blockNumber", &[]);
        transport.expect_request("eth_getTransactionReceipt", &[json!(HASH)]);
        transport.assert_drained();
    }

    #[test]
    fn reverted_deployment_fails() {
        let transport = TestTransport::new();
        let web3 = Web3::new(transport.clone());

        transport.push_reply(json!("0x1"));
        transport.push_reply(receipt(1, "0x0", None));
        let err = confirm(&web3, pending(), &ConfirmPolicy::mined())
            .immediate()
            .unwrap_err();

        assert!(
            matches!(err, DeployError::Failure(hash) if hash == HASH),
            "unexpected error {err:?}"
        );
    }

    #[test]
    fn receipt_without_contract_address_fails() {
        let transport = TestTransport::new();
        let web3 = Web3::new(transport.clone());

        transport.push_reply(json!("0x1"));
        transport.push_reply(receipt(1, "0x1", None));
        let err = confirm(&web3, pending(), &ConfirmPolicy::mined())
            .immediate()
            .unwrap_err();

        assert!(matches!(err, DeployError::Failure(_)), "unexpected error {err:?}");
    }

    #[test]
    fn node_error_while_polling_is_returned() {
        let transport = TestTransport::new();
        let web3 = Web3::new(transport.clone());

        transport.push_reply(json!("0x1"));
        transport.push_error(Web3Error::Unreachable);
        let err = confirm(&web3, pending(), &ConfirmPolicy::mined())
            .immediate()
            .unwrap_err();

        assert!(
            matches!(
                err,
                DeployError::Tx(crate::errors::ExecutionError::Web3(Web3Error::Unreachable))
            ),
            "unexpected error {err:?}"
        );
    }
}
