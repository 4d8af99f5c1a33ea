//! Configuration types for the relay.

use crate::ConfigError;
use relay_types::{Address, ChainId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_ENVIRONMENT: &str = "development";
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3001;
pub const DEFAULT_ALLOWED_ORIGIN: &str = "http://localhost:5173";
pub const DEFAULT_RECEIPT_POLL_INTERVAL_SECS: u64 = 4;
pub const DEFAULT_RECEIPT_TIMEOUT_SECS: u64 = 180;

/// Configuration as written in a file, before environment overrides.
///
/// Every field is optional here; required settings are checked when the
/// file is turned into a [`RelayConfig`].
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ConfigFile {
	pub environment: Option<String>,
	pub log_level: Option<String>,
	pub server: ServerSection,
	pub network: NetworkSection,
	pub relayer: RelayerSection,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerSection {
	pub host: Option<String>,
	pub port: Option<u16>,
	/// Origins allowed to call the API from a browser.
	pub allowed_origins: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct NetworkSection {
	pub chain_id: Option<u64>,
	pub rpc_url: Option<String>,
	/// Overrides the built-in token contract for the chain.
	pub token_address: Option<String>,
	pub receipt_poll_interval_secs: Option<u64>,
	pub receipt_timeout_secs: Option<u64>,
}

#[derive(Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct RelayerSection {
	pub private_key: Option<String>,
}

impl fmt::Debug for RelayerSection {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("RelayerSection")
			.field("private_key", &self.private_key.as_ref().map(|_| "<redacted>"))
			.finish()
	}
}

/// Complete, validated relay configuration
#[derive(Debug, Clone)]
pub struct RelayConfig {
	/// Deployment environment name (selects the `.env.<environment>` file)
	pub environment: String,
	/// Default tracing filter
	pub log_level: String,
	pub server: ServerConfig,
	pub network: NetworkConfig,
	pub relayer: RelayerConfig,
}

/// HTTP listener settings
#[derive(Debug, Clone)]
pub struct ServerConfig {
	pub host: String,
	pub port: u16,
	pub allowed_origins: Vec<String>,
}

/// Network the relay submits to
#[derive(Debug, Clone)]
pub struct NetworkConfig {
	pub chain_id: ChainId,
	pub rpc_url: String,
	pub token_address: Option<Address>,
	pub receipt_poll_interval: Duration,
	pub receipt_timeout: Duration,
}

/// Relayer identity. The key is only held in memory.
#[derive(Clone)]
pub struct RelayerConfig {
	pub private_key: String,
}

impl fmt::Debug for RelayerConfig {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("RelayerConfig")
			.field("private_key", &"<redacted>")
			.finish()
	}
}

impl ConfigFile {
	/// Validates the collected settings and fills in defaults.
	pub fn into_config(self) -> Result<RelayConfig, ConfigError> {
		let rpc_url = self
			.network
			.rpc_url
			.filter(|url| !url.trim().is_empty())
			.ok_or_else(|| ConfigError::ValidationError("RPC_URL is not set".to_string()))?;
		if !(rpc_url.starts_with("http://") || rpc_url.starts_with("https://")) {
			return Err(ConfigError::ValidationError(
				"RPC URL must start with http:// or https://".to_string(),
			));
		}

		let chain_id = self
			.network
			.chain_id
			.map(ChainId)
			.ok_or_else(|| ConfigError::ValidationError("CHAIN_ID is not set".to_string()))?;

		let private_key = self
			.relayer
			.private_key
			.filter(|key| !key.is_empty())
			.ok_or_else(|| {
				ConfigError::ValidationError("RELAYER_PRIVATE_KEY is not set".to_string())
			})?;
		if !private_key.starts_with("0x") {
			return Err(ConfigError::ValidationError(
				"RELAYER_PRIVATE_KEY must start with 0x".to_string(),
			));
		}

		let token_address = self
			.network
			.token_address
			.filter(|addr| !addr.trim().is_empty())
			.map(|addr| {
				Address::from_str(addr.trim()).map_err(|e| {
					ConfigError::ValidationError(format!("Invalid token address '{}': {}", addr, e))
				})
			})
			.transpose()?;

		Ok(RelayConfig {
			environment: self
				.environment
				.unwrap_or_else(|| DEFAULT_ENVIRONMENT.to_string()),
			log_level: self
				.log_level
				.unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
			server: ServerConfig {
				host: self.server.host.unwrap_or_else(|| DEFAULT_HOST.to_string()),
				port: self.server.port.unwrap_or(DEFAULT_PORT),
				allowed_origins: self
					.server
					.allowed_origins
					.unwrap_or_else(|| vec![DEFAULT_ALLOWED_ORIGIN.to_string()]),
			},
			network: NetworkConfig {
				chain_id,
				rpc_url,
				token_address,
				receipt_poll_interval: Duration::from_secs(
					self.network
						.receipt_poll_interval_secs
						.unwrap_or(DEFAULT_RECEIPT_POLL_INTERVAL_SECS),
				),
				receipt_timeout: Duration::from_secs(
					self.network
						.receipt_timeout_secs
						.unwrap_or(DEFAULT_RECEIPT_TIMEOUT_SECS),
				),
			},
			relayer: RelayerConfig { private_key },
		})
	}
}

/// Splits a comma separated origin list, dropping empty entries.
pub fn parse_origins(raw: &str) -> Vec<String> {
	raw.split(',')
		.map(|origin| origin.trim())
		.filter(|origin| !origin.is_empty())
		.map(str::to_string)
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;

	const KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

	fn minimal() -> ConfigFile {
		let mut file = ConfigFile::default();
		file.network.chain_id = Some(11155111);
		file.network.rpc_url = Some("https://rpc.sepolia.org".to_string());
		file.relayer.private_key = Some(KEY.to_string());
		file
	}

	#[test]
	fn test_defaults_are_applied() {
		let config = minimal().into_config().unwrap();
		assert_eq!(config.environment, "development");
		assert_eq!(config.server.port, 3001);
		assert_eq!(config.server.allowed_origins, vec!["http://localhost:5173"]);
		assert_eq!(config.network.chain_id, ChainId::SEPOLIA);
		assert_eq!(config.network.receipt_timeout, Duration::from_secs(180));
		assert!(config.network.token_address.is_none());
	}

	#[test]
	fn test_required_settings() {
		let mut file = minimal();
		file.network.chain_id = None;
		assert!(matches!(
			file.into_config(),
			Err(ConfigError::ValidationError(msg)) if msg.contains("CHAIN_ID")
		));

		let mut file = minimal();
		file.relayer.private_key = None;
		assert!(matches!(
			file.into_config(),
			Err(ConfigError::ValidationError(msg)) if msg.contains("RELAYER_PRIVATE_KEY")
		));

		let mut file = minimal();
		file.network.rpc_url = Some(String::new());
		assert!(file.into_config().is_err());
	}

	#[test]
	fn test_private_key_needs_prefix() {
		let mut file = minimal();
		file.relayer.private_key = Some(KEY.trim_start_matches("0x").to_string());
		assert!(matches!(
			file.into_config(),
			Err(ConfigError::ValidationError(msg)) if msg.contains("must start with 0x")
		));
	}

	#[test]
	fn test_rpc_url_scheme() {
		let mut file = minimal();
		file.network.rpc_url = Some("ws://localhost:8546".to_string());
		assert!(file.into_config().is_err());
	}

	#[test]
	fn test_token_address_override() {
		let mut file = minimal();
		file.network.token_address = Some("0x0000000000000000000000000000000000000001".to_string());
		let config = file.into_config().unwrap();
		assert_eq!(config.network.token_address, Some(Address::with_last_byte(1)));

		let mut file = minimal();
		file.network.token_address = Some("usdc".to_string());
		assert!(file.into_config().is_err());
	}

	#[test]
	fn test_key_is_redacted_in_debug_output() {
		let config = minimal().into_config().unwrap();
		let rendered = format!("{:?}", config);
		assert!(!rendered.contains(&KEY[2..]));
		assert!(rendered.contains("<redacted>"));
	}

	#[test]
	fn test_parse_origins() {
		assert_eq!(
			parse_origins(" https://a.example , ,https://b.example"),
			vec!["https://a.example", "https://b.example"]
		);
		assert!(parse_origins("").is_empty());
	}
}
