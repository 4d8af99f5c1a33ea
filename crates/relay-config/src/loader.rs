//! Configuration loading from files and environment.

use crate::types::{parse_origins, ConfigFile, RelayConfig, DEFAULT_ENVIRONMENT};
use crate::ConfigError;
use std::env;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Configuration loader with environment variable substitution
#[derive(Debug, Default)]
pub struct ConfigLoader {
	file_path: Option<PathBuf>,
	skip_dotenv: bool,
}

impl ConfigLoader {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
		self.file_path = Some(path.as_ref().to_path_buf());
		self
	}

	pub fn with_optional_file<P: AsRef<Path>>(mut self, path: Option<P>) -> Self {
		self.file_path = path.map(|p| p.as_ref().to_path_buf());
		self
	}

	/// Do not read `.env` files before loading.
	pub fn without_dotenv(mut self) -> Self {
		self.skip_dotenv = true;
		self
	}

	/// Loads configuration from the process environment.
	pub fn load(&self) -> Result<RelayConfig, ConfigError> {
		if !self.skip_dotenv {
			if let Ok(dir) = env::current_dir() {
				load_dotenv_files(&dir);
			}
		}
		self.load_with(|key| env::var(key).ok())
	}

	/// Loads configuration, resolving environment variables through `lookup`.
	pub fn load_with<F>(&self, lookup: F) -> Result<RelayConfig, ConfigError>
	where
		F: Fn(&str) -> Option<String>,
	{
		let mut file = match &self.file_path {
			Some(path) => Self::from_file(path, &lookup)?,
			None => ConfigFile::default(),
		};

		Self::apply_env_overrides(&mut file, &lookup)?;

		file.into_config()
	}

	/// Reads a TOML, JSON or YAML file, substituting `${VAR}` placeholders.
	fn from_file<F>(path: &Path, lookup: &F) -> Result<ConfigFile, ConfigError>
	where
		F: Fn(&str) -> Option<String>,
	{
		info!("Loading configuration from {:?}", path);

		if !path.exists() {
			return Err(ConfigError::FileNotFound(path.display().to_string()));
		}
		let contents = std::fs::read_to_string(path)?;
		let contents = substitute_env_vars(&contents, lookup)?;

		match path.extension().and_then(|s| s.to_str()) {
			Some("toml") => toml::from_str(&contents)
				.map_err(|e| ConfigError::ParseError(format!("Failed to parse TOML: {}", e))),
			Some("json") => serde_json::from_str(&contents)
				.map_err(|e| ConfigError::ParseError(format!("Failed to parse JSON: {}", e))),
			Some("yaml") | Some("yml") => serde_yaml::from_str(&contents)
				.map_err(|e| ConfigError::ParseError(format!("Failed to parse YAML: {}", e))),
			_ => Err(ConfigError::ParseError(format!(
				"Unsupported config format: {:?}",
				path
			))),
		}
	}

	/// Apply environment variable overrides
	fn apply_env_overrides<F>(file: &mut ConfigFile, lookup: &F) -> Result<(), ConfigError>
	where
		F: Fn(&str) -> Option<String>,
	{
		if let Some(environment) = lookup("RELAY_ENV") {
			file.environment = Some(environment);
		}

		if let Some(level) = lookup("LOG_LEVEL") {
			file.log_level = Some(level);
		}

		if let Some(host) = lookup("HOST") {
			file.server.host = Some(host);
		}

		if let Some(port) = lookup("PORT") {
			file.server.port = Some(
				port.trim()
					.parse()
					.map_err(|e| ConfigError::ValidationError(format!("Invalid PORT: {}", e)))?,
			);
		}

		if let Some(origins) = lookup("FRONTEND_URL") {
			file.server.allowed_origins = Some(parse_origins(&origins));
		}

		if let Some(chain_id) = lookup("CHAIN_ID") {
			file.network.chain_id = Some(chain_id.trim().parse().map_err(|e| {
				ConfigError::ValidationError(format!("Invalid CHAIN_ID: {}", e))
			})?);
		}

		if let Some(url) = lookup("RPC_URL") {
			debug!("Overriding RPC URL from environment");
			file.network.rpc_url = Some(url);
		}

		if let Some(token) = lookup("TOKEN_ADDRESS") {
			file.network.token_address = Some(token);
		}

		if let Some(key) = lookup("RELAYER_PRIVATE_KEY") {
			debug!("Overriding relayer key from environment");
			file.relayer.private_key = Some(key);
		}

		Ok(())
	}
}

/// Loads `.env.<environment>` and then `.env` from `dir` into the process
/// environment. Parent directories are not searched.
///
/// Variables already present are never overwritten, so the
/// environment-specific file wins over the generic one.
fn load_dotenv_files(dir: &Path) {
	let environment = env::var("RELAY_ENV").unwrap_or_else(|_| DEFAULT_ENVIRONMENT.to_string());
	let specific = format!(".env.{}", environment);

	for name in [specific.as_str(), ".env"] {
		let path = dir.join(name);
		if path.is_file() && dotenvy::from_path(&path).is_ok() {
			debug!("Loaded environment from {}", path.display());
		}
	}
}

/// Replaces `${VAR_NAME}` patterns with values from `lookup`.
fn substitute_env_vars<F>(content: &str, lookup: &F) -> Result<String, ConfigError>
where
	F: Fn(&str) -> Option<String>,
{
	let re = regex::Regex::new(r"\$\{([^}]+)\}")
		.map_err(|e| ConfigError::ParseError(e.to_string()))?;
	let mut result = content.to_string();

	for cap in re.captures_iter(content) {
		let full_match = &cap[0];
		let var_name = &cap[1];

		let value =
			lookup(var_name).ok_or_else(|| ConfigError::EnvVarNotFound(var_name.to_string()))?;

		result = result.replace(full_match, &value);
	}

	Ok(result)
}
