//! Alloy-based EVM delivery.
//!
//! Two providers share one RPC endpoint: a plain provider for reads,
//! simulations and receipt polling, and a wallet-bound provider that fills
//! gas, nonce and chain id and signs every broadcast with the relayer key.

use crate::{truncate_hash, DeliveryError, DeliveryInterface};
use alloy::network::{Ethereum, EthereumWallet, ReceiptResponse, TransactionBuilder};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;
use alloy::sol_types::decode_revert_reason;
use alloy::transports::{RpcError, TransportErrorKind};
use async_trait::async_trait;
use relay_types::{Address, Bytes, ContractCall, TransactionReceipt, B256, U256};
use std::fmt;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info};

/// How receipts are polled.
#[derive(Debug, Clone, Copy)]
pub struct ReceiptPolling {
	pub interval: Duration,
	pub timeout: Duration,
}

impl Default for ReceiptPolling {
	fn default() -> Self {
		Self {
			interval: Duration::from_secs(4),
			timeout: Duration::from_secs(180),
		}
	}
}

/// Alloy-based EVM delivery implementation.
pub struct AlloyDelivery {
	/// Provider for queries and simulations.
	reader: Box<dyn Provider<Ethereum>>,
	/// Provider that signs with the relayer wallet.
	writer: Box<dyn Provider<Ethereum>>,
	chain_id: u64,
	polling: ReceiptPolling,
}

impl fmt::Debug for AlloyDelivery {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("AlloyDelivery")
			.field("chain_id", &self.chain_id)
			.field("polling", &self.polling)
			.field("provider", &"<Provider>")
			.finish()
	}
}

impl AlloyDelivery {
	/// Creates both providers for `rpc_url`. No request is sent until the
	/// first operation.
	pub fn new(
		rpc_url: &str,
		chain_id: u64,
		wallet: EthereumWallet,
		polling: ReceiptPolling,
	) -> Result<Self, DeliveryError> {
		let url: alloy::transports::http::reqwest::Url = rpc_url
			.parse()
			.map_err(|e| DeliveryError::Network(format!("Invalid RPC URL: {}", e)))?;

		let reader = ProviderBuilder::new().connect_http(url.clone());

		let writer = ProviderBuilder::new()
			.with_chain_id(chain_id)
			.wallet(wallet)
			.connect_http(url);

		debug!(chain_id, "Configured alloy providers");

		Ok(Self::with_providers(reader, writer, chain_id, polling))
	}

	/// Wraps already connected providers. `writer` must sign for the relayer.
	pub fn with_providers<R, W>(reader: R, writer: W, chain_id: u64, polling: ReceiptPolling) -> Self
	where
		R: Provider<Ethereum> + 'static,
		W: Provider<Ethereum> + 'static,
	{
		Self {
			reader: Box::new(reader),
			writer: Box::new(writer),
			chain_id,
			polling,
		}
	}

	fn request(call: &ContractCall) -> TransactionRequest {
		let request = TransactionRequest::default()
			.with_to(call.to)
			.with_input(call.input.clone());

		match call.from {
			Some(from) => request.with_from(from),
			None => request,
		}
	}
}

/// JSON-RPC error code nodes use for a reverted `eth_call`.
const EXECUTION_REVERTED_CODE: i64 = 3;

/// Turns a failed `eth_call` into a delivery error.
///
/// Only error responses that describe a revert become [`DeliveryError::Reverted`]:
/// revert data, code 3, or a message mentioning a revert. Anything else
/// (rate limits, missing state, transport failures) is a network error.
fn simulation_error(err: RpcError<TransportErrorKind>) -> DeliveryError {
	if let Some(payload) = err.as_error_resp() {
		if let Some(reason) = payload
			.as_revert_data()
			.and_then(|data| revert_reason(&data))
		{
			return DeliveryError::Reverted(reason);
		}
		if payload.code == EXECUTION_REVERTED_CODE
			|| payload.message.to_lowercase().contains("revert")
		{
			return DeliveryError::Reverted(payload.message.to_string());
		}
	}
	DeliveryError::Network(err.to_string())
}

/// Decodes `Error(string)`, `Panic(uint256)` or custom revert payloads.
pub fn revert_reason(data: &[u8]) -> Option<String> {
	if data.is_empty() {
		return None;
	}
	decode_revert_reason(data)
}

#[async_trait]
impl DeliveryInterface for AlloyDelivery {
	async fn call(&self, call: &ContractCall) -> Result<Bytes, DeliveryError> {
		self.reader
			.call(Self::request(call))
			.await
			.map_err(|e| DeliveryError::Network(e.to_string()))
	}

	async fn simulate(&self, call: &ContractCall) -> Result<(), DeliveryError> {
		self.reader
			.call(Self::request(call))
			.await
			.map(|_| ())
			.map_err(simulation_error)
	}

	async fn submit(&self, call: &ContractCall) -> Result<B256, DeliveryError> {
		// The wallet filler sets the sender.
		let request = TransactionRequest::default()
			.with_to(call.to)
			.with_input(call.input.clone());

		let pending = self
			.writer
			.send_transaction(request)
			.await
			.map_err(|e| DeliveryError::Network(e.to_string()))?;

		let tx_hash = *pending.tx_hash();
		info!(tx_hash = %truncate_hash(&tx_hash), "Submitted transaction");

		Ok(tx_hash)
	}

	async fn wait_for_receipt(&self, hash: B256) -> Result<TransactionReceipt, DeliveryError> {
		let start_time = Instant::now();

		info!(
			tx_hash = %truncate_hash(&hash),
			"Waiting for receipt (timeout: {}s)",
			self.polling.timeout.as_secs()
		);

		loop {
			let receipt = self
				.reader
				.get_transaction_receipt(hash)
				.await
				.map_err(|e| DeliveryError::Network(format!("Failed to get receipt: {}", e)))?;

			if let Some(receipt) = receipt {
				let block_number = receipt.block_number().ok_or_else(|| {
					DeliveryError::Decode("Receipt without block number".to_string())
				})?;

				return Ok(TransactionReceipt {
					transaction_hash: receipt.transaction_hash(),
					block_number,
					gas_used: receipt.gas_used(),
					success: receipt.status(),
				});
			}

			// No receipt yet: make sure the node knows the transaction at all.
			let known = self
				.reader
				.get_transaction_by_hash(hash)
				.await
				.map_err(|e| DeliveryError::Network(format!("Failed to get transaction: {}", e)))?;
			if known.is_none() {
				return Err(DeliveryError::TransactionNotFound(hash));
			}

			if start_time.elapsed() >= self.polling.timeout {
				return Err(DeliveryError::Timeout(self.polling.timeout.as_secs()));
			}

			debug!(tx_hash = %truncate_hash(&hash), "Transaction pending");
			tokio::time::sleep(self.polling.interval).await;
		}
	}

	async fn get_balance(&self, address: Address) -> Result<U256, DeliveryError> {
		self.reader
			.get_balance(address)
			.await
			.map_err(|e| DeliveryError::Network(e.to_string()))
	}
}
