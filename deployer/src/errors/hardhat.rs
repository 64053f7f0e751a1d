//! Hardhat Network reports failed transactions as JSON-RPC errors whose
//! message describes what the EVM did. The known messages are turned into
//! [`ExecutionError`] variants here.

use crate::errors::ExecutionError;
use jsonrpc_core::Error as JsonrpcError;

const VM_EXCEPTION: &str = "VM Exception while processing transaction: ";

/// Returns the execution failure described by a Hardhat node error, or `None`
/// for errors that are not about the transaction's execution.
pub fn decode(err: &JsonrpcError) -> Option<ExecutionError> {
    let message = err.message.trim_start_matches("Error: ");

    match message.strip_prefix(VM_EXCEPTION) {
        Some("invalid opcode") => Some(ExecutionError::InvalidOpcode),
        Some(detail) => {
            let reason = detail
                .strip_prefix("reverted with reason string '")
                .and_then(|quoted| quoted.strip_suffix('\''));
            Some(ExecutionError::Revert(reason.map(str::to_owned)))
        }
        None if message.starts_with("Transaction reverted") => {
            Some(ExecutionError::Revert(None))
        }
        None => None,
    }
}
