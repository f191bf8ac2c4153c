//! Builder for in-memory configurations used by tests across the workspace.

use crate::{Config, NodeConfig, ServerConfig};
use std::collections::HashMap;

/// Fluent builder producing a [`Config`] with a single `eth` node.
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
	port: u16,
	chains: Vec<String>,
	rpc_url: String,
	batch_limit: Option<usize>,
}

impl Default for ConfigBuilder {
	fn default() -> Self {
		Self::new()
	}
}

impl ConfigBuilder {
	pub fn new() -> Self {
		Self {
			port: 8189,
			chains: vec!["Ethereum".to_string()],
			rpc_url: "http://127.0.0.1:8545".to_string(),
			batch_limit: None,
		}
	}

	pub fn chains(mut self, chains: &[&str]) -> Self {
		self.chains = chains.iter().map(|c| c.to_string()).collect();
		self
	}

	pub fn rpc_url(mut self, url: impl Into<String>) -> Self {
		self.rpc_url = url.into();
		self
	}

	pub fn batch_limit(mut self, limit: usize) -> Self {
		self.batch_limit = Some(limit);
		self
	}

	pub fn build(self) -> Config {
		let node = NodeConfig {
			rpc_url: self.rpc_url,
			rpc_user: None,
			rpc_pass: None,
			data_api_url: "http://127.0.0.1:9/api".to_string(),
			data_api_key: None,
			data_api_token: None,
			time_out: 5,
			dial_timeout_secs: 1,
			dial_attempts: 1,
			request_timeout_secs: 1,
			batch_limit: self.batch_limit,
			batch_workers: 4,
			max_range: 5000,
		};

		Config {
			server: ServerConfig {
				host: "127.0.0.1".to_string(),
				port: self.port,
			},
			network: "mainnet".to_string(),
			chains: self.chains,
			wallet_node: HashMap::from([("eth".to_string(), node)]),
		}
	}
}
