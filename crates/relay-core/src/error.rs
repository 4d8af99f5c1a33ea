// relay-core/src/error.rs

use relay_account::AccountError;
use relay_delivery::DeliveryError;
use relay_types::{ChainId, SignatureError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
	#[error("Unsupported chain ID: {0}")]
	UnsupportedChain(ChainId),

	#[error("No token contract address configured for chain {0}")]
	MissingTokenAddress(ChainId),

	#[error("Account error: {0}")]
	Account(#[from] AccountError),

	#[error(transparent)]
	Delivery(#[from] DeliveryError),

	#[error(transparent)]
	Rejected(#[from] AuthorizationRejection),

	#[error("Invalid signature: {0}")]
	InvalidSignature(#[from] SignatureError),

	#[error("ABI decoding failed: {0}")]
	Abi(String),
}

/// Business rules an authorization failed before anything was simulated.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorizationRejection {
	#[error("Nonce already used")]
	NonceUsed,

	#[error("Authorization not yet valid")]
	NotYetValid,

	#[error("Authorization expired")]
	Expired,
}
