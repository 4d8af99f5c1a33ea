//! Authorization relay core.
//!
//! [`AuthorizationRelay`] validates EIP-3009 authorizations and submits them
//! on behalf of their signers. It is built once per process by
//! [`RelayBuilder`] and shared by reference with every request handler.

use relay_account::{AccountError, AccountInterface, LocalWallet};
use relay_config::{NetworkConfig, RelayConfig, RelayerConfig};
use relay_delivery::{AlloyDelivery, DeliveryError, DeliveryInterface, ReceiptPolling};
use relay_types::NetworkProfile;
use std::sync::Arc;
use tracing::info;

pub mod clock;
pub mod contract;
pub mod error;
pub mod relay;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{AuthorizationRejection, CoreError};
pub use relay::AuthorizationRelay;

type AccountFactory =
	Box<dyn FnOnce(&RelayerConfig) -> Result<Box<dyn AccountInterface>, AccountError> + Send>;
type DeliveryFactory = Box<
	dyn FnOnce(&NetworkConfig, &dyn AccountInterface) -> Result<Arc<dyn DeliveryInterface>, DeliveryError>
		+ Send,
>;

/// Builds an [`AuthorizationRelay`] from configuration.
///
/// By default the relayer is a [`LocalWallet`] and the network is reached
/// through [`AlloyDelivery`]; both can be replaced with factories.
pub struct RelayBuilder {
	config: RelayConfig,
	account_factory: Option<AccountFactory>,
	delivery_factory: Option<DeliveryFactory>,
	clock: Option<Arc<dyn Clock>>,
}

impl RelayBuilder {
	pub fn new(config: RelayConfig) -> Self {
		Self {
			config,
			account_factory: None,
			delivery_factory: None,
			clock: None,
		}
	}

	pub fn with_account_factory<F>(mut self, factory: F) -> Self
	where
		F: FnOnce(&RelayerConfig) -> Result<Box<dyn AccountInterface>, AccountError> + Send + 'static,
	{
		self.account_factory = Some(Box::new(factory));
		self
	}

	pub fn with_delivery_factory<F>(mut self, factory: F) -> Self
	where
		F: FnOnce(&NetworkConfig, &dyn AccountInterface) -> Result<Arc<dyn DeliveryInterface>, DeliveryError>
			+ Send
			+ 'static,
	{
		self.delivery_factory = Some(Box::new(factory));
		self
	}

	pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
		self.clock = Some(clock);
		self
	}

	/// Resolves the network profile, derives the relayer and connects.
	///
	/// Every failure here is a configuration error; the relay cannot serve
	/// requests until it is fixed.
	pub fn build(self) -> Result<AuthorizationRelay, CoreError> {
		let network = &self.config.network;

		let profile = NetworkProfile::known(network.chain_id)
			.ok_or(CoreError::UnsupportedChain(network.chain_id))?
			.with_token_override(network.token_address);
		let token = profile
			.token_address
			.ok_or(CoreError::MissingTokenAddress(network.chain_id))?;

		let account = match self.account_factory {
			Some(factory) => factory(&self.config.relayer)?,
			None => Box::new(LocalWallet::new(&self.config.relayer.private_key)?),
		};

		let delivery = match self.delivery_factory {
			Some(factory) => factory(network, account.as_ref())?,
			None => Arc::new(AlloyDelivery::new(
				&network.rpc_url,
				network.chain_id.0,
				account.wallet(),
				ReceiptPolling {
					interval: network.receipt_poll_interval,
					timeout: network.receipt_timeout,
				},
			)?),
		};

		let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));

		info!(
			chain_id = %profile.chain_id,
			network = %profile.name,
			token = %token,
			relayer = %account.address(),
			"Authorization relay initialized"
		);

		Ok(AuthorizationRelay::new(
			profile,
			token,
			account.address(),
			delivery,
			clock,
		))
	}
}
