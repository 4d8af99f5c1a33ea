//! Transaction delivery types for the relay.
//!
//! This module defines what crosses the network boundary (a contract call)
//! and what comes back to callers (an execution outcome or a receipt).

use alloy::primitives::{Address, Bytes, B256};
use serde::{Deserialize, Serialize};

/// One contract invocation as handed to the network boundary.
///
/// The same value is used to simulate and then broadcast an execution, so
/// both phases see identical arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractCall {
	/// Contract being called.
	pub to: Address,
	/// Sender used for simulation. Broadcasts are always sent by the relayer.
	pub from: Option<Address>,
	/// ABI encoded calldata.
	pub input: Bytes,
}

impl ContractCall {
	pub fn new(to: Address, input: impl Into<Bytes>) -> Self {
		Self {
			to,
			from: None,
			input: input.into(),
		}
	}

	pub fn with_from(mut self, from: Address) -> Self {
		self.from = Some(from);
		self
	}
}

/// Result of an authorization execution as reported to the caller.
///
/// A successful outcome means the transaction was accepted into the pending
/// pool, not that it was mined.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionOutcome {
	pub success: bool,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub transaction_hash: Option<B256>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub error: Option<String>,
}

impl TransactionOutcome {
	pub fn submitted(hash: B256) -> Self {
		Self {
			success: true,
			transaction_hash: Some(hash),
			error: None,
		}
	}

	pub fn failed(error: impl Into<String>) -> Self {
		Self {
			success: false,
			transaction_hash: None,
			error: Some(error.into()),
		}
	}
}

/// Transaction receipt containing execution details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionReceipt {
	/// The hash of the transaction.
	pub transaction_hash: B256,
	/// The block number where the transaction was included.
	pub block_number: u64,
	/// Gas consumed by the transaction.
	pub gas_used: u64,
	/// Whether the transaction executed successfully.
	pub success: bool,
}

impl TransactionReceipt {
	pub fn status(&self) -> ReceiptStatus {
		if self.success {
			ReceiptStatus::Confirmed
		} else {
			ReceiptStatus::Failed
		}
	}
}

/// Final on-chain status of a mined transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReceiptStatus {
	Confirmed,
	Failed,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_outcome_serialization_omits_absent_fields() {
		let hash = B256::repeat_byte(0x01);
		let ok = serde_json::to_value(TransactionOutcome::submitted(hash)).unwrap();
		assert_eq!(ok["success"], true);
		assert_eq!(ok["transactionHash"], format!("{hash}"));
		assert!(ok.get("error").is_none());

		let failed = serde_json::to_value(TransactionOutcome::failed("Authorization expired")).unwrap();
		assert_eq!(failed["success"], false);
		assert_eq!(failed["error"], "Authorization expired");
		assert!(failed.get("transactionHash").is_none());
	}

	#[test]
	fn test_receipt_status_projection() {
		let mut receipt = TransactionReceipt {
			transaction_hash: B256::ZERO,
			block_number: 10,
			gas_used: 21_000,
			success: true,
		};
		assert_eq!(receipt.status(), ReceiptStatus::Confirmed);

		receipt.success = false;
		assert_eq!(receipt.status(), ReceiptStatus::Failed);
		assert_eq!(
			serde_json::to_string(&ReceiptStatus::Failed).unwrap(),
			"\"failed\""
		);
	}

	#[test]
	fn test_contract_call_builder() {
		let to = Address::repeat_byte(0x01);
		let from = Address::repeat_byte(0x02);
		let call = ContractCall::new(to, vec![0xde, 0xad]).with_from(from);
		assert_eq!(call.to, to);
		assert_eq!(call.from, Some(from));
		assert_eq!(call.input.as_ref(), &[0xde, 0xad]);
	}
}
