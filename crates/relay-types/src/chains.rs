//! Chain identifiers and the network profiles the relay knows about.

use alloy::primitives::{address, Address};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Chain identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChainId(pub u64);

impl ChainId {
	pub const ETHEREUM: Self = Self(1);
	pub const SEPOLIA: Self = Self(11155111);
}

impl fmt::Display for ChainId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl FromStr for ChainId {
	type Err = std::num::ParseIntError;

	fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
		Ok(ChainId(s.trim().parse()?))
	}
}

/// Static description of a network the relay can serve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkProfile {
	pub chain_id: ChainId,
	/// Human readable network name for logs.
	pub name: String,
	/// EIP-3009 token contract on this network, if one is known.
	pub token_address: Option<Address>,
}

impl NetworkProfile {
	/// Returns the built-in profile for `chain_id`, if the relay supports it.
	pub fn known(chain_id: ChainId) -> Option<Self> {
		let (name, token) = match chain_id {
			ChainId::ETHEREUM => (
				"Ethereum Mainnet",
				address!("0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48"),
			),
			ChainId::SEPOLIA => (
				"Sepolia",
				address!("0x1c7D4B196Cb0C7B01d743Fbc6116a902379C7238"),
			),
			_ => return None,
		};

		Some(Self {
			chain_id,
			name: name.to_string(),
			token_address: Some(token),
		})
	}

	/// Replaces the token contract address when an override is given.
	pub fn with_token_override(mut self, token: Option<Address>) -> Self {
		if token.is_some() {
			self.token_address = token;
		}
		self
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_chain_id_parsing_and_display() {
		assert_eq!("11155111".parse::<ChainId>().unwrap(), ChainId::SEPOLIA);
		assert_eq!(ChainId(1).to_string(), "1");
		assert!("mainnet".parse::<ChainId>().is_err());
	}

	#[test]
	fn test_known_profiles() {
		let mainnet = NetworkProfile::known(ChainId::ETHEREUM).unwrap();
		assert_eq!(mainnet.name, "Ethereum Mainnet");
		assert_eq!(
			mainnet.token_address,
			Some(address!("0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48"))
		);

		assert!(NetworkProfile::known(ChainId::SEPOLIA).is_some());
		assert!(NetworkProfile::known(ChainId(42161)).is_none());
	}

	#[test]
	fn test_token_override() {
		let custom = Address::repeat_byte(0xab);
		let profile = NetworkProfile::known(ChainId::SEPOLIA)
			.unwrap()
			.with_token_override(Some(custom));
		assert_eq!(profile.token_address, Some(custom));

		let untouched = NetworkProfile::known(ChainId::SEPOLIA)
			.unwrap()
			.with_token_override(None);
		assert!(untouched.token_address.is_some());
	}
}
