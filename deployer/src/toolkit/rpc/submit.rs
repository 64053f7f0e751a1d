//! Sends the contract creation transaction, either for the node to sign or
//! signed with a local key.

use crate::account::Account;
use crate::errors::ExecutionError;
use crate::secret::PrivateKey;
use web3::api::Web3;
use web3::types::{
    Address, Bytes, CallRequest, TransactionParameters, TransactionRequest, H256, U256,
};
use web3::Transport;

/// A contract creation transaction. Missing gas parameters are filled in by
/// the node.
#[derive(Clone, Debug)]
pub struct Creation {
    pub data: Bytes,
    pub gas: Option<U256>,
    pub gas_price: Option<U256>,
}

/// Sends `creation` from `account`, or from the node's first account when no
/// account is given, and returns the transaction hash.
pub async fn submit<T: Transport>(
    web3: &Web3<T>,
    account: Option<&Account>,
    creation: Creation,
) -> Result<H256, ExecutionError> {
    let hash = match account {
        Some(Account::Offline(key, chain_id)) => {
            send_signed(web3, key, *chain_id, creation).await?
        }
        Some(Account::Local(from)) => send_unsigned(web3, *from, creation).await?,
        None => {
            let from = node_account(web3).await?;
            send_unsigned(web3, from, creation).await?
        }
    };
    tracing::debug!(?hash, "sent contract creation transaction");

    Ok(hash)
}

async fn node_account<T: Transport>(web3: &Web3<T>) -> Result<Address, ExecutionError> {
    web3.eth()
        .accounts()
        .await?
        .into_iter()
        .next()
        .ok_or(ExecutionError::NoLocalAccounts)
}

async fn send_unsigned<T: Transport>(
    web3: &Web3<T>,
    from: Address,
    creation: Creation,
) -> Result<H256, ExecutionError> {
    let request = TransactionRequest {
        from,
        gas: creation.gas,
        gas_price: creation.gas_price,
        data: Some(creation.data),
        ..Default::default()
    };

    Ok(web3.eth().send_transaction(request).await?)
}

/// Signs locally and sends the raw transaction. The node must agree on the
/// hash, otherwise it did not accept the transaction that was signed.
async fn send_signed<T: Transport>(
    web3: &Web3<T>,
    key: &PrivateKey,
    chain_id: Option<u64>,
    creation: Creation,
) -> Result<H256, ExecutionError> {
    let gas = match creation.gas {
        Some(gas) => gas,
        None => {
            let estimate = CallRequest {
                from: Some(key.public_address()),
                gas_price: creation.gas_price,
                data: Some(creation.data.clone()),
                ..Default::default()
            };
            web3.eth().estimate_gas(estimate, None).await?
        }
    };

    // Nonce, and gas price or chain ID when not given, are queried by web3.
    let parameters = TransactionParameters {
        gas,
        gas_price: creation.gas_price,
        data: creation.data,
        chain_id,
        ..Default::default()
    };
    let signed = web3.accounts().sign_transaction(parameters, key).await?;

    let hash = web3
        .eth()
        .send_raw_transaction(signed.raw_transaction)
        .await?;
    if hash != signed.transaction_hash {
        return Err(ExecutionError::UnexpectedTransactionHash);
    }

    Ok(hash)
}
