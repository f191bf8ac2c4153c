//! Configuration for the chain account service.
//!
//! The service reads a single YAML document describing the listen address,
//! the list of enabled networks and, per node, the RPC endpoint and explorer
//! credentials. `${VAR}` and `${VAR:-default}` placeholders are resolved from
//! the environment before the document is parsed, so secrets never need to be
//! written to disk.

#[cfg(any(test, feature = "testing"))]
pub mod builders;

use account_types::SecretString;
use regex::Regex;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error that occurs while reading the configuration file.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	/// Error that occurs when the YAML document cannot be parsed.
	#[error("Configuration error: {0}")]
	Parse(String),
	/// Error that occurs when a value is present but unusable.
	#[error("Validation error: {0}")]
	Validation(String),
}

impl From<serde_yaml::Error> for ConfigError {
	fn from(err: serde_yaml::Error) -> Self {
		ConfigError::Parse(err.to_string())
	}
}

/// Root configuration document.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
	/// Listen address of the HTTP surface.
	pub server: ServerConfig,
	/// Network flavour, for example "mainnet" or "testnet".
	#[serde(default = "default_network")]
	pub network: String,
	/// Enabled network names, matched against the adaptor factory table.
	pub chains: Vec<String>,
	/// Node settings keyed by node name, for example "eth".
	#[serde(default)]
	pub wallet_node: HashMap<String, NodeConfig>,
}

/// Listen address of the HTTP API.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
	#[serde(default = "default_host")]
	pub host: String,
	pub port: u16,
}

/// Endpoint and explorer settings for one node.
#[derive(Debug, Clone, Deserialize)]
pub struct NodeConfig {
	/// JSON-RPC endpoint.
	pub rpc_url: String,
	#[serde(default)]
	pub rpc_user: Option<String>,
	#[serde(default)]
	pub rpc_pass: Option<SecretString>,
	/// Base URL of the explorer API used for history and token balances.
	pub data_api_url: String,
	#[serde(default)]
	pub data_api_key: Option<SecretString>,
	#[serde(default)]
	pub data_api_token: Option<SecretString>,
	/// Explorer request timeout in seconds.
	#[serde(default = "default_explorer_timeout")]
	pub time_out: u64,
	/// Overall deadline for establishing the node connection.
	#[serde(default = "default_dial_timeout")]
	pub dial_timeout_secs: u64,
	/// Number of connection attempts before giving up.
	#[serde(default = "default_dial_attempts")]
	pub dial_attempts: usize,
	/// Per-call deadline once connected.
	#[serde(default = "default_request_timeout")]
	pub request_timeout_secs: u64,
	/// Largest batch the node accepts. When unset the whole range goes
	/// out as a single batch.
	#[serde(default)]
	pub batch_limit: Option<usize>,
	/// Concurrent batches in flight when a range is split into groups.
	#[serde(default = "default_batch_workers")]
	pub batch_workers: usize,
	/// Most heights a single range request may span.
	#[serde(default = "default_max_range")]
	pub max_range: u64,
}

impl NodeConfig {
	pub fn dial_timeout(&self) -> Duration {
		Duration::from_secs(self.dial_timeout_secs)
	}

	pub fn request_timeout(&self) -> Duration {
		Duration::from_secs(self.request_timeout_secs)
	}

	pub fn explorer_timeout(&self) -> Duration {
		Duration::from_secs(self.time_out)
	}
}

fn default_network() -> String {
	"mainnet".to_string()
}

fn default_host() -> String {
	"0.0.0.0".to_string()
}

fn default_explorer_timeout() -> u64 {
	35
}

fn default_dial_timeout() -> u64 {
	5
}

fn default_dial_attempts() -> usize {
	5
}

fn default_request_timeout() -> u64 {
	10
}

fn default_batch_workers() -> usize {
	4
}

fn default_max_range() -> u64 {
	5000
}

/// Resolves environment variables in a string.
///
/// Replaces `${VAR_NAME}` with the value of `VAR_NAME` and supports
/// `${VAR_NAME:-default}`. A placeholder without default whose variable is
/// unset is an error. Input is limited to 1MB.
pub(crate) fn resolve_env_vars(input: &str) -> Result<String, ConfigError> {
	const MAX_INPUT_SIZE: usize = 1024 * 1024;
	if input.len() > MAX_INPUT_SIZE {
		return Err(ConfigError::Validation(format!(
			"Configuration file too large: {} bytes (max: {} bytes)",
			input.len(),
			MAX_INPUT_SIZE
		)));
	}

	let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]{0,127})(?::-([^}]{0,256}))?\}")
		.map_err(|e| ConfigError::Parse(format!("Regex error: {}", e)))?;

	let mut missing = None;
	let resolved = re.replace_all(input, |caps: &regex::Captures<'_>| {
		let var_name = &caps[1];
		match (std::env::var(var_name), caps.get(2)) {
			(Ok(value), _) => value,
			(Err(_), Some(default)) => default.as_str().to_string(),
			(Err(_), None) => {
				missing.get_or_insert_with(|| var_name.to_string());
				String::new()
			},
		}
	});

	match missing {
		Some(var_name) => Err(ConfigError::Validation(format!(
			"Environment variable '{}' not found",
			var_name
		))),
		None => Ok(resolved.into_owned()),
	}
}

impl Config {
	/// Loads and validates the configuration file at `path`.
	pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let content = tokio::fs::read_to_string(path.as_ref()).await?;
		content.parse()
	}

	/// Returns the node settings registered under `name`.
	pub fn node(&self, name: &str) -> Result<&NodeConfig, ConfigError> {
		self.wallet_node.get(name).ok_or_else(|| {
			ConfigError::Validation(format!("wallet_node.{} is not configured", name))
		})
	}

	fn validate(&self) -> Result<(), ConfigError> {
		if self.chains.is_empty() {
			return Err(ConfigError::Validation(
				"At least one chain must be enabled".into(),
			));
		}
		if self.chains.iter().any(|chain| chain.trim().is_empty()) {
			return Err(ConfigError::Validation("Chain names cannot be empty".into()));
		}
		if self.server.port == 0 {
			return Err(ConfigError::Validation(
				"Server port must be greater than 0".into(),
			));
		}

		for (name, node) in &self.wallet_node {
			if !(node.rpc_url.starts_with("http://") || node.rpc_url.starts_with("https://")) {
				return Err(ConfigError::Validation(format!(
					"wallet_node.{}.rpc_url must be an http(s) URL",
					name
				)));
			}
			if node.data_api_url.is_empty() {
				return Err(ConfigError::Validation(format!(
					"wallet_node.{}.data_api_url cannot be empty",
					name
				)));
			}
			if node.time_out == 0 || node.dial_timeout_secs == 0 || node.request_timeout_secs == 0
			{
				return Err(ConfigError::Validation(format!(
					"wallet_node.{} timeouts must be greater than 0",
					name
				)));
			}
			if node.dial_attempts == 0 {
				return Err(ConfigError::Validation(format!(
					"wallet_node.{}.dial_attempts must be at least 1",
					name
				)));
			}
			if node.max_range == 0 {
				return Err(ConfigError::Validation(format!(
					"wallet_node.{}.max_range must be at least 1",
					name
				)));
			}
			if node.batch_limit == Some(0) || node.batch_workers == 0 {
				return Err(ConfigError::Validation(format!(
					"wallet_node.{} batch_limit and batch_workers must be at least 1",
					name
				)));
			}
		}

		Ok(())
	}
}

impl FromStr for Config {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let resolved = resolve_env_vars(s)?;
		let config: Config = serde_yaml::from_str(&resolved)?;
		config.validate()?;
		Ok(config)
	}
}
