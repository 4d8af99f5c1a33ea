// relay-delivery/src/lib.rs

//! Network boundary of the relay.
//!
//! Everything the relay needs from a chain goes through [`DeliveryInterface`]:
//! read-only contract calls, simulations, signed broadcasts, receipt polling
//! and balance queries. The relay's own logic never talks JSON-RPC directly,
//! so it can run against any implementation of this trait.

use async_trait::async_trait;
use relay_types::{Address, Bytes, ContractCall, TransactionReceipt, B256, U256};
use thiserror::Error;

pub mod implementations;

pub use implementations::evm::alloy::{AlloyDelivery, ReceiptPolling};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DeliveryError {
	/// Transport or node failure. The message is the underlying one, verbatim.
	#[error("{0}")]
	Network(String),

	/// The call would revert against current chain state.
	#[error("Execution reverted: {0}")]
	Reverted(String),

	#[error("Transaction not found: {0}")]
	TransactionNotFound(B256),

	#[error("Timed out after {0} seconds waiting for receipt")]
	Timeout(u64),

	#[error("Invalid RPC response: {0}")]
	Decode(String),
}

/// Operations the relay issues against a network.
#[async_trait]
pub trait DeliveryInterface: Send + Sync {
	/// Read-only call against the latest state.
	async fn call(&self, call: &ContractCall) -> Result<Bytes, DeliveryError>;

	/// Executes `call` without broadcasting it. Reverts surface as
	/// [`DeliveryError::Reverted`].
	async fn simulate(&self, call: &ContractCall) -> Result<(), DeliveryError>;

	/// Signs `call` with the relayer account and broadcasts it. Returns once
	/// the node accepted the transaction, not once it is mined.
	async fn submit(&self, call: &ContractCall) -> Result<B256, DeliveryError>;

	/// Polls until `hash` is mined.
	async fn wait_for_receipt(&self, hash: B256) -> Result<TransactionReceipt, DeliveryError>;

	/// Native balance of `address`.
	async fn get_balance(&self, address: Address) -> Result<U256, DeliveryError>;
}

/// Shortens a transaction hash for log output.
pub fn truncate_hash(hash: &B256) -> String {
	let hash_str = hex::encode(hash.as_slice());
	format!("0x{}..", &hash_str[..8])
}
