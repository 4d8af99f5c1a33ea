//! Local private key wallet.

use crate::{AccountError, AccountInterface};
use alloy::network::EthereumWallet;
use alloy::signers::local::PrivateKeySigner;
use relay_types::Address;
use std::fmt;

/// Wallet backed by a private key held in process memory.
#[derive(Clone)]
pub struct LocalWallet {
	/// The underlying Alloy signer that handles cryptographic operations.
	signer: PrivateKeySigner,
}

impl LocalWallet {
	/// Creates a wallet from a `0x`-prefixed, 32-byte hex private key.
	pub fn new(private_key_hex: &str) -> Result<Self, AccountError> {
		if private_key_hex.is_empty() {
			return Err(AccountError::MissingKey);
		}

		let key = private_key_hex
			.strip_prefix("0x")
			.ok_or_else(|| AccountError::InvalidKey("Private key must start with 0x".to_string()))?;

		if key.len() != 64 {
			return Err(AccountError::InvalidKey(
				"Private key must be 64 hex characters (32 bytes)".to_string(),
			));
		}

		let signer = key
			.parse::<PrivateKeySigner>()
			.map_err(|e| AccountError::InvalidKey(format!("Invalid private key: {}", e)))?;

		Ok(Self { signer })
	}
}

impl fmt::Debug for LocalWallet {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("LocalWallet")
			.field("address", &self.signer.address())
			.finish_non_exhaustive()
	}
}

impl AccountInterface for LocalWallet {
	fn address(&self) -> Address {
		self.signer.address()
	}

	fn wallet(&self) -> EthereumWallet {
		EthereumWallet::from(self.signer.clone())
	}
}
