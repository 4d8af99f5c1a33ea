//! Command-line interface definitions.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "eip3009-relay")]
#[command(about = "Relays EIP-3009 token authorizations on behalf of their signers", long_about = None)]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Args {
	/// Path to an optional configuration file (TOML, JSON or YAML)
	#[arg(short, long, env = "RELAY_CONFIG")]
	pub config: Option<PathBuf>,

	/// Log level override (trace, debug, info, warn, error)
	#[arg(short, long)]
	pub log_level: Option<String>,

	/// Subcommand to execute
	#[command(subcommand)]
	pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
	/// Start the relay HTTP server
	Start,
	/// Load and validate the configuration, then exit
	Validate,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_start_is_the_default() {
		let args = Args::try_parse_from(["eip3009-relay"]).unwrap();
		assert_eq!(args.command, None);
		assert!(args.log_level.is_none());
	}

	#[test]
	fn test_validate_with_config() {
		let args = Args::try_parse_from([
			"eip3009-relay",
			"--config",
			"relay.toml",
			"--log-level",
			"debug",
			"validate",
		])
		.unwrap();
		assert_eq!(args.command, Some(Command::Validate));
		assert_eq!(args.config, Some(PathBuf::from("relay.toml")));
		assert_eq!(args.log_level.as_deref(), Some("debug"));
	}
}
