//! Relayer account management.
//!
//! The relayer is the account that signs and pays for every submitted
//! transaction. Exactly one exists per process and its key never leaves
//! memory.

use alloy::network::EthereumWallet;
use relay_types::Address;
use thiserror::Error;

pub mod implementations {
	pub mod local;
}

pub use implementations::local::LocalWallet;

#[derive(Debug, Error)]
pub enum AccountError {
	#[error("Relayer private key is not set")]
	MissingKey,
	#[error("Invalid key: {0}")]
	InvalidKey(String),
}

/// Identity the relay submits transactions with.
pub trait AccountInterface: Send + Sync {
	/// Address derived from the held key.
	fn address(&self) -> Address;

	/// Wallet used by the submission provider to sign transactions.
	fn wallet(&self) -> EthereumWallet;
}
