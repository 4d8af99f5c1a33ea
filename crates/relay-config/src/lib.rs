// relay-config/src/lib.rs

//! Configuration for the authorization relay.
//!
//! Settings come from an optional TOML, JSON or YAML file, then from the
//! process environment (including `.env.<environment>` and `.env` files).
//! The chain identifier and the relayer key have no defaults: the loader
//! refuses to produce a configuration without them.

use thiserror::Error;

pub mod loader;
pub mod types;

pub use loader::ConfigLoader;
pub use types::*;

#[derive(Error, Debug)]
pub enum ConfigError {
	#[error("File not found: {0}")]
	FileNotFound(String),

	#[error("Parse error: {0}")]
	ParseError(String),

	#[error("Validation error: {0}")]
	ValidationError(String),

	#[error("Environment variable not found: {0}")]
	EnvVarNotFound(String),

	#[error("IO error: {0}")]
	IoError(#[from] std::io::Error),
}
