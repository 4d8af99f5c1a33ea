//! Authorization execution.

use crate::clock::Clock;
use crate::contract;
use crate::error::{AuthorizationRejection, CoreError};
use relay_delivery::{truncate_hash, DeliveryInterface};
use relay_types::{
	Address, AuthorizationKind, AuthorizationMessage, ChainId, ContractCall, NetworkProfile,
	SignatureParts, TransactionOutcome, TransactionReceipt, B256, U256,
};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Relays EIP-3009 authorizations to the configured token contract.
///
/// The relay holds only immutable configuration and shared handles, so one
/// instance serves any number of concurrent requests without locking. It
/// does not deduplicate nonces: two requests for the same authorization may
/// both pass the nonce check, and the contract decides which one lands.
pub struct AuthorizationRelay {
	profile: NetworkProfile,
	token: Address,
	relayer: Address,
	delivery: Arc<dyn DeliveryInterface>,
	clock: Arc<dyn Clock>,
}

impl AuthorizationRelay {
	pub fn new(
		profile: NetworkProfile,
		token: Address,
		relayer: Address,
		delivery: Arc<dyn DeliveryInterface>,
		clock: Arc<dyn Clock>,
	) -> Self {
		Self {
			profile,
			token,
			relayer,
			delivery,
			clock,
		}
	}

	pub fn profile(&self) -> &NetworkProfile {
		&self.profile
	}

	pub fn chain_id(&self) -> ChainId {
		self.profile.chain_id
	}

	pub fn token_address(&self) -> Address {
		self.token
	}

	pub fn relayer_address(&self) -> Address {
		self.relayer
	}

	/// Native balance of the relayer account.
	pub async fn relayer_balance(&self) -> Result<U256, CoreError> {
		Ok(self.delivery.get_balance(self.relayer).await?)
	}

	/// Whether the token contract already consumed `(authorizer, nonce)`.
	pub async fn is_nonce_used(&self, authorizer: Address, nonce: B256) -> Result<bool, CoreError> {
		let call = ContractCall::new(
			self.token,
			contract::encode_authorization_state(authorizer, nonce),
		);
		let output = self.delivery.call(&call).await?;
		contract::decode_authorization_state(&output)
	}

	/// Validates and submits an authorization.
	///
	/// Never fails: every problem, including network errors, is reported as
	/// an unsuccessful outcome. A successful outcome means the transaction was
	/// accepted by the node, not that it was mined.
	#[instrument(skip_all, fields(authorizer = %message.from, kind = %kind))]
	pub async fn execute_authorization(
		&self,
		message: &AuthorizationMessage,
		signature: &[u8],
		kind: AuthorizationKind,
	) -> TransactionOutcome {
		match self.try_execute(message, signature, kind).await {
			Ok(hash) => TransactionOutcome::submitted(hash),
			Err(CoreError::Rejected(rejection)) => {
				info!(reason = %rejection, "Authorization rejected");
				TransactionOutcome::failed(rejection.to_string())
			}
			Err(error) => {
				warn!(error = %error, "Authorization execution failed");
				TransactionOutcome::failed(error.to_string())
			}
		}
	}

	async fn try_execute(
		&self,
		message: &AuthorizationMessage,
		signature: &[u8],
		kind: AuthorizationKind,
	) -> Result<B256, CoreError> {
		if self.is_nonce_used(message.from, message.nonce).await? {
			return Err(AuthorizationRejection::NonceUsed.into());
		}

		let now = U256::from(self.clock.now());
		if message.valid_after > now {
			return Err(AuthorizationRejection::NotYetValid.into());
		}
		if message.valid_before < now {
			return Err(AuthorizationRejection::Expired.into());
		}

		let parts = SignatureParts::decompose(signature)?;

		let call = ContractCall::new(
			self.token,
			contract::encode_execution(kind, message, &parts),
		)
		.with_from(self.relayer);

		debug!(entry_point = kind.entry_point(), "Simulating authorization");
		self.delivery.simulate(&call).await?;

		let hash = self.delivery.submit(&call).await?;
		info!(tx_hash = %truncate_hash(&hash), "Authorization submitted");

		Ok(hash)
	}

	/// Waits until `hash` is mined and returns its receipt.
	///
	/// Termination is governed by the delivery's receipt polling.
	pub async fn wait_for_transaction(&self, hash: B256) -> Result<TransactionReceipt, CoreError> {
		Ok(self.delivery.wait_for_receipt(hash).await?)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::contract::IEIP3009;
	use crate::{FixedClock, RelayBuilder};
	use alloy::sol_types::{SolCall, SolValue};
	use async_trait::async_trait;
	use relay_config::{NetworkConfig, RelayConfig, RelayerConfig, ServerConfig};
	use relay_delivery::DeliveryError;
	use relay_types::Bytes;
	use std::sync::Mutex;
	use std::time::Duration;

	const DEV_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
	const NOW: u64 = 1_700_000_000;

	/// Stand-in network with scripted answers that records every request.
	#[derive(Default)]
	struct ScriptedDelivery {
		nonce_used: bool,
		read_error: Option<String>,
		revert: Option<String>,
		submit_error: Option<String>,
		receipt: Option<TransactionReceipt>,
		reads: Mutex<Vec<ContractCall>>,
		simulations: Mutex<Vec<ContractCall>>,
		submissions: Mutex<Vec<ContractCall>>,
	}

	impl ScriptedDelivery {
		fn reads(&self) -> usize {
			self.reads.lock().unwrap().len()
		}
		fn simulations(&self) -> Vec<ContractCall> {
			self.simulations.lock().unwrap().clone()
		}
		fn submissions(&self) -> Vec<ContractCall> {
			self.submissions.lock().unwrap().clone()
		}
	}

	#[async_trait]
	impl DeliveryInterface for ScriptedDelivery {
		async fn call(&self, call: &ContractCall) -> Result<Bytes, DeliveryError> {
			self.reads.lock().unwrap().push(call.clone());
			match &self.read_error {
				Some(message) => Err(DeliveryError::Network(message.clone())),
				None => Ok(self.nonce_used.abi_encode().into()),
			}
		}

		async fn simulate(&self, call: &ContractCall) -> Result<(), DeliveryError> {
			self.simulations.lock().unwrap().push(call.clone());
			match &self.revert {
				Some(reason) => Err(DeliveryError::Reverted(reason.clone())),
				None => Ok(()),
			}
		}

		async fn submit(&self, call: &ContractCall) -> Result<B256, DeliveryError> {
			self.submissions.lock().unwrap().push(call.clone());
			match &self.submit_error {
				Some(message) => Err(DeliveryError::Network(message.clone())),
				None => Ok(B256::repeat_byte(0x77)),
			}
		}

		async fn wait_for_receipt(&self, hash: B256) -> Result<TransactionReceipt, DeliveryError> {
			self.receipt
				.clone()
				.ok_or(DeliveryError::TransactionNotFound(hash))
		}

		async fn get_balance(&self, _address: Address) -> Result<U256, DeliveryError> {
			Ok(U256::from(10u64).pow(U256::from(18u64)))
		}
	}

	fn config(chain_id: u64) -> RelayConfig {
		RelayConfig {
			environment: "test".to_string(),
			log_level: "debug".to_string(),
			server: ServerConfig {
				host: "127.0.0.1".to_string(),
				port: 0,
				allowed_origins: vec![],
			},
			network: NetworkConfig {
				chain_id: ChainId(chain_id),
				rpc_url: "http://127.0.0.1:8545".to_string(),
				token_address: None,
				receipt_poll_interval: Duration::from_secs(1),
				receipt_timeout: Duration::from_secs(5),
			},
			relayer: RelayerConfig {
				private_key: DEV_KEY.to_string(),
			},
		}
	}

	fn relay_with(delivery: Arc<ScriptedDelivery>) -> AuthorizationRelay {
		RelayBuilder::new(config(11155111))
			.with_delivery_factory(move |_, _| Ok(delivery as Arc<dyn DeliveryInterface>))
			.with_clock(Arc::new(FixedClock(NOW)))
			.build()
			.unwrap()
	}

	fn message(valid_after: u64, valid_before: u64) -> AuthorizationMessage {
		AuthorizationMessage {
			from: Address::repeat_byte(0x11),
			to: Address::repeat_byte(0x22),
			value: U256::from(1_000_000u64),
			valid_after: U256::from(valid_after),
			valid_before: U256::from(valid_before),
			nonce: B256::repeat_byte(0x33),
		}
	}

	fn signature() -> Vec<u8> {
		let mut bytes = vec![0xaa; 64];
		bytes.push(0x1c);
		bytes
	}

	#[tokio::test]
	async fn test_transfer_is_simulated_then_submitted() {
		let delivery = Arc::new(ScriptedDelivery::default());
		let relay = relay_with(delivery.clone());

		let outcome = relay
			.execute_authorization(
				&message(0, 9_999_999_999),
				&signature(),
				AuthorizationKind::Transfer,
			)
			.await;

		assert_eq!(outcome, TransactionOutcome::submitted(B256::repeat_byte(0x77)));

		let simulations = delivery.simulations();
		let submissions = delivery.submissions();
		assert_eq!(simulations.len(), 1);
		assert_eq!(submissions.len(), 1);
		assert_eq!(simulations[0], submissions[0]);
		assert_eq!(simulations[0].from, Some(relay.relayer_address()));
		assert_eq!(simulations[0].to, relay.token_address());

		let call = IEIP3009::transferWithAuthorizationCall::abi_decode(&submissions[0].input).unwrap();
		assert_eq!(call.value, U256::from(1_000_000u64));
		assert_eq!(call.nonce, B256::repeat_byte(0x33));
		assert_eq!(call.v, 28);
		assert_eq!(call.r, B256::repeat_byte(0xaa));
	}

	#[tokio::test]
	async fn test_receive_uses_receive_entry_point() {
		let delivery = Arc::new(ScriptedDelivery::default());
		let relay = relay_with(delivery.clone());

		let outcome = relay
			.execute_authorization(
				&message(0, 9_999_999_999),
				&signature(),
				AuthorizationKind::Receive,
			)
			.await;

		assert!(outcome.success);
		assert_eq!(
			&delivery.submissions()[0].input[..4],
			IEIP3009::receiveWithAuthorizationCall::SELECTOR.as_slice()
		);
	}

	#[tokio::test]
	async fn test_used_nonce_stops_after_the_check() {
		let delivery = Arc::new(ScriptedDelivery {
			nonce_used: true,
			..Default::default()
		});
		let relay = relay_with(delivery.clone());

		let outcome = relay
			.execute_authorization(
				&message(0, 9_999_999_999),
				&signature(),
				AuthorizationKind::Transfer,
			)
			.await;

		assert_eq!(outcome, TransactionOutcome::failed("Nonce already used"));
		assert_eq!(delivery.reads(), 1);
		assert!(delivery.simulations().is_empty());
		assert!(delivery.submissions().is_empty());
	}

	#[tokio::test]
	async fn test_time_window() {
		let cases = [
			(NOW + 1, NOW + 100, Some("Authorization not yet valid")),
			(0, NOW - 1, Some("Authorization expired")),
			(NOW, NOW + 100, None),
			(0, NOW, None),
			(NOW, NOW, None),
		];

		for (valid_after, valid_before, expected) in cases {
			let delivery = Arc::new(ScriptedDelivery::default());
			let relay = relay_with(delivery.clone());

			let outcome = relay
				.execute_authorization(
					&message(valid_after, valid_before),
					&signature(),
					AuthorizationKind::Transfer,
				)
				.await;

			match expected {
				Some(reason) => {
					assert_eq!(outcome, TransactionOutcome::failed(reason));
					assert!(delivery.simulations().is_empty());
					assert!(delivery.submissions().is_empty());
				}
				None => {
					assert!(outcome.success, "window [{valid_after}, {valid_before}] rejected");
					assert_eq!(delivery.submissions().len(), 1);
				}
			}
		}
	}

	#[tokio::test]
	async fn test_simulation_revert_prevents_broadcast() {
		let delivery = Arc::new(ScriptedDelivery {
			revert: Some("FiatTokenV2: invalid signature".to_string()),
			..Default::default()
		});
		let relay = relay_with(delivery.clone());

		let outcome = relay
			.execute_authorization(
				&message(0, 9_999_999_999),
				&signature(),
				AuthorizationKind::Transfer,
			)
			.await;

		assert!(!outcome.success);
		assert!(outcome
			.error
			.unwrap()
			.contains("FiatTokenV2: invalid signature"));
		assert_eq!(delivery.simulations().len(), 1);
		assert!(delivery.submissions().is_empty());
	}

	#[tokio::test]
	async fn test_transport_error_is_reported_verbatim() {
		let delivery = Arc::new(ScriptedDelivery {
			read_error: Some("error sending request for url (http://127.0.0.1:8545/)".to_string()),
			..Default::default()
		});
		let relay = relay_with(delivery.clone());

		let outcome = relay
			.execute_authorization(
				&message(0, 9_999_999_999),
				&signature(),
				AuthorizationKind::Transfer,
			)
			.await;

		assert_eq!(
			outcome,
			TransactionOutcome::failed("error sending request for url (http://127.0.0.1:8545/)")
		);
		assert!(delivery.simulations().is_empty());
	}

	#[tokio::test]
	async fn test_broadcast_failure_is_a_failed_outcome() {
		let delivery = Arc::new(ScriptedDelivery {
			submit_error: Some("nonce too low".to_string()),
			..Default::default()
		});
		let relay = relay_with(delivery.clone());

		let outcome = relay
			.execute_authorization(
				&message(0, 9_999_999_999),
				&signature(),
				AuthorizationKind::Transfer,
			)
			.await;

		assert_eq!(outcome, TransactionOutcome::failed("nonce too low"));
	}

	#[tokio::test]
	async fn test_malformed_signature_is_a_failed_outcome() {
		let delivery = Arc::new(ScriptedDelivery::default());
		let relay = relay_with(delivery.clone());

		let mut bad = signature();
		bad[64] = 5;
		let outcome = relay
			.execute_authorization(&message(0, 9_999_999_999), &bad, AuthorizationKind::Transfer)
			.await;

		assert!(!outcome.success);
		assert!(outcome.error.unwrap().starts_with("Invalid signature"));
		assert!(delivery.simulations().is_empty());
	}

	#[tokio::test]
	async fn test_nonce_status_is_idempotent() {
		let delivery = Arc::new(ScriptedDelivery {
			nonce_used: true,
			..Default::default()
		});
		let relay = relay_with(delivery.clone());

		let authorizer = Address::repeat_byte(0x11);
		let nonce = B256::repeat_byte(0x33);
		assert!(relay.is_nonce_used(authorizer, nonce).await.unwrap());
		assert!(relay.is_nonce_used(authorizer, nonce).await.unwrap());

		assert_eq!(delivery.reads(), 2);
		assert!(delivery.submissions().is_empty());
	}

	#[tokio::test]
	async fn test_wait_for_transaction_and_balance() {
		let receipt = TransactionReceipt {
			transaction_hash: B256::repeat_byte(0x77),
			block_number: 42,
			gas_used: 85_000,
			success: true,
		};
		let delivery = Arc::new(ScriptedDelivery {
			receipt: Some(receipt.clone()),
			..Default::default()
		});
		let relay = relay_with(delivery);

		assert_eq!(
			relay.wait_for_transaction(B256::repeat_byte(0x77)).await.unwrap(),
			receipt
		);
		assert_eq!(
			relay.relayer_balance().await.unwrap(),
			U256::from(1_000_000_000_000_000_000u128)
		);

		let unknown = relay_with(Arc::new(ScriptedDelivery::default()))
			.wait_for_transaction(B256::ZERO)
			.await;
		assert!(matches!(
			unknown,
			Err(CoreError::Delivery(DeliveryError::TransactionNotFound(_)))
		));
	}

	#[test]
	fn test_construction_failures() {
		let unsupported = RelayBuilder::new(config(42161)).build();
		assert!(matches!(
			unsupported,
			Err(CoreError::UnsupportedChain(ChainId(42161)))
		));

		let mut bad_key = config(1);
		bad_key.relayer.private_key = "0x1234".to_string();
		assert!(matches!(
			RelayBuilder::new(bad_key).build(),
			Err(CoreError::Account(_))
		));
	}

	#[test]
	fn test_default_construction_derives_relayer() {
		let relay = RelayBuilder::new(config(1)).build().unwrap();
		assert_eq!(
			relay.relayer_address(),
			alloy::primitives::address!("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266")
		);
		assert_eq!(
			relay.token_address(),
			alloy::primitives::address!("0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48")
		);
		assert_eq!(relay.chain_id(), ChainId::ETHEREUM);
	}
}
