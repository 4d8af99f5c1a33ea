//! EIP-3009 authorization types.
//!
//! An authorization is signed off-chain by the token holder and executed
//! on-chain by the relayer. The relay never persists these values; the token
//! contract is the only record of whether an authorization was consumed.

use alloy::primitives::{Address, B256, U256};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Length of an `r || s || v` signature in bytes.
pub const SIGNATURE_LENGTH: usize = 65;

/// Signed off-chain authorization for a token movement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizationMessage {
	/// Token holder that signed the authorization.
	pub from: Address,
	/// Recipient of the tokens.
	pub to: Address,
	/// Amount in the token's smallest unit.
	pub value: U256,
	/// Unix time (seconds) from which the authorization may be executed.
	pub valid_after: U256,
	/// Unix time (seconds) until which the authorization may be executed.
	pub valid_before: U256,
	/// Signer-chosen replay protection value.
	pub nonce: B256,
}

/// Selects the contract entry point used to execute an authorization.
///
/// `Receive` additionally requires the caller to be the payee; the contract
/// enforces that, not the relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthorizationKind {
	Transfer,
	Receive,
}

impl AuthorizationKind {
	/// Name of the token contract function invoked for this kind.
	pub fn entry_point(&self) -> &'static str {
		match self {
			AuthorizationKind::Transfer => "transferWithAuthorization",
			AuthorizationKind::Receive => "receiveWithAuthorization",
		}
	}

	/// Parses the lowercase wire tag (`"transfer"` / `"receive"`).
	pub fn from_tag(tag: &str) -> Option<Self> {
		match tag {
			"transfer" => Some(AuthorizationKind::Transfer),
			"receive" => Some(AuthorizationKind::Receive),
			_ => None,
		}
	}
}

impl fmt::Display for AuthorizationKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			AuthorizationKind::Transfer => write!(f, "transfer"),
			AuthorizationKind::Receive => write!(f, "receive"),
		}
	}
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignatureError {
	#[error("Invalid signature length: expected {SIGNATURE_LENGTH} bytes, got {0}")]
	InvalidLength(usize),
	#[error("Invalid signature recovery value: {0}")]
	InvalidRecoveryId(u8),
}

/// A 65-byte signature split into the components the contract expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignatureParts {
	/// Recovery value, always 27 or 28.
	pub v: u8,
	pub r: B256,
	pub s: B256,
}

impl SignatureParts {
	/// Splits an `r || s || v` signature.
	///
	/// A trailing parity byte of 0 or 1 is normalized to 27 or 28.
	pub fn decompose(signature: &[u8]) -> Result<Self, SignatureError> {
		if signature.len() != SIGNATURE_LENGTH {
			return Err(SignatureError::InvalidLength(signature.len()));
		}

		let v = match signature[64] {
			parity @ (0 | 1) => parity + 27,
			v @ (27 | 28) => v,
			other => return Err(SignatureError::InvalidRecoveryId(other)),
		};

		Ok(Self {
			v,
			r: B256::from_slice(&signature[..32]),
			s: B256::from_slice(&signature[32..64]),
		})
	}
}
