//! Etherscan-compatible explorer client.

use super::{ExplorerError, ExplorerInterface, ExplorerTransaction, TxListKind, TxListQuery};
use account_config::NodeConfig;
use account_types::SecretString;
use alloy_primitives::{Address, B256, U256};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::str::FromStr;
use std::time::Duration;

const NO_TRANSACTIONS: &str = "No transactions found";

/// Talks to the `module=account` endpoints of an Etherscan-style API.
pub struct EtherscanClient {
	http: reqwest::Client,
	base_url: String,
	api_key: Option<SecretString>,
	token: Option<SecretString>,
}

#[derive(Debug, Deserialize)]
struct ApiEnvelope {
	status: String,
	#[serde(default)]
	message: String,
	result: Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiTransaction {
	block_number: String,
	time_stamp: String,
	hash: String,
	from: String,
	#[serde(default)]
	to: String,
	value: String,
	#[serde(default)]
	gas_price: String,
	#[serde(default)]
	gas_used: String,
	#[serde(default)]
	is_error: Option<String>,
	#[serde(default)]
	contract_address: String,
}

impl EtherscanClient {
	pub fn new(
		base_url: impl Into<String>,
		api_key: Option<SecretString>,
		token: Option<SecretString>,
		timeout: Duration,
	) -> Result<Self, ExplorerError> {
		let http = reqwest::Client::builder()
			.timeout(timeout)
			.build()
			.map_err(|e| ExplorerError::Http(e.to_string()))?;
		Ok(Self {
			http,
			base_url: base_url.into(),
			api_key: api_key.filter(|k| !k.is_empty()),
			token: token.filter(|t| !t.is_empty()),
		})
	}

	/// Builds a client from the explorer settings of a node.
	pub fn from_node(node: &NodeConfig) -> Result<Self, ExplorerError> {
		Self::new(
			node.data_api_url.clone(),
			node.data_api_key.clone(),
			node.data_api_token.clone(),
			node.explorer_timeout(),
		)
	}

	async fn get(&self, mut params: Vec<(&'static str, String)>) -> Result<Value, ExplorerError> {
		if let Some(key) = &self.api_key {
			params.push(("apikey", key.expose_secret().to_string()));
		}
		let mut request = self.http.get(&self.base_url).query(&params);
		if let Some(token) = &self.token {
			request = request.bearer_auth(token.expose_secret());
		}

		let response = request
			.send()
			.await
			.map_err(|e| ExplorerError::Http(e.to_string()))?;
		if !response.status().is_success() {
			return Err(ExplorerError::Http(format!(
				"HTTP status {}",
				response.status()
			)));
		}
		let envelope: ApiEnvelope = response
			.json()
			.await
			.map_err(|e| ExplorerError::InvalidResponse(e.to_string()))?;
		unwrap_envelope(envelope)
	}
}

/// Returns the `result` of a successful response. An empty history is
/// reported by the API as an error status and is turned into an empty list.
fn unwrap_envelope(envelope: ApiEnvelope) -> Result<Value, ExplorerError> {
	if envelope.status == "1" {
		return Ok(envelope.result);
	}
	if envelope.message.starts_with(NO_TRANSACTIONS) {
		return Ok(Value::Array(Vec::new()));
	}
	let detail = match envelope.result {
		Value::String(s) if !s.is_empty() => s,
		_ => envelope.message,
	};
	Err(ExplorerError::Api(detail))
}

fn parse_u256(field: &str, value: &str) -> Result<U256, ExplorerError> {
	if value.is_empty() {
		return Ok(U256::ZERO);
	}
	U256::from_str_radix(value, 10)
		.map_err(|_| ExplorerError::InvalidResponse(format!("{}: {:?}", field, value)))
}

fn parse_optional_address(field: &str, value: &str) -> Result<Option<Address>, ExplorerError> {
	if value.is_empty() {
		return Ok(None);
	}
	Address::from_str(value)
		.map(Some)
		.map_err(|_| ExplorerError::InvalidResponse(format!("{}: {:?}", field, value)))
}

fn parse_transactions(result: Value) -> Result<Vec<ExplorerTransaction>, ExplorerError> {
	let rows: Vec<ApiTransaction> =
		serde_json::from_value(result).map_err(|e| ExplorerError::InvalidResponse(e.to_string()))?;

	rows.into_iter()
		.map(|row| {
			Ok(ExplorerTransaction {
				hash: B256::from_str(&row.hash)
					.map_err(|_| ExplorerError::InvalidResponse(format!("hash: {:?}", row.hash)))?,
				from: parse_optional_address("from", &row.from)?.unwrap_or(Address::ZERO),
				to: parse_optional_address("to", &row.to)?,
				contract_address: parse_optional_address("contractAddress", &row.contract_address)?,
				value: parse_u256("value", &row.value)?,
				gas_used: parse_u256("gasUsed", &row.gas_used)?,
				gas_price: parse_u256("gasPrice", &row.gas_price)?,
				block_number: row.block_number.parse().map_err(|_| {
					ExplorerError::InvalidResponse(format!("blockNumber: {:?}", row.block_number))
				})?,
				timestamp: row.time_stamp.parse().map_err(|_| {
					ExplorerError::InvalidResponse(format!("timeStamp: {:?}", row.time_stamp))
				})?,
				failed: row.is_error.as_deref() == Some("1"),
			})
		})
		.collect()
}

#[async_trait]
impl ExplorerInterface for EtherscanClient {
	async fn transactions(
		&self,
		query: &TxListQuery,
	) -> Result<Vec<ExplorerTransaction>, ExplorerError> {
		let mut params = vec![
			("module", "account".to_string()),
			("address", query.address.to_string()),
			("page", query.page.max(1).to_string()),
			("offset", query.page_size.to_string()),
			("sort", "desc".to_string()),
		];
		match query.kind {
			TxListKind::Native => params.push(("action", "txlist".to_string())),
			TxListKind::Token { contract } => {
				params.push(("action", "tokentx".to_string()));
				params.push(("contractaddress", contract.to_string()));
			},
		}
		let result = self.get(params).await?;
		parse_transactions(result)
	}

	async fn token_balance(
		&self,
		contract: Address,
		address: Address,
	) -> Result<U256, ExplorerError> {
		let result = self
			.get(vec![
				("module", "account".to_string()),
				("action", "tokenbalance".to_string()),
				("contractaddress", contract.to_string()),
				("address", address.to_string()),
				("tag", "latest".to_string()),
			])
			.await?;
		match result {
			Value::String(balance) => parse_u256("result", &balance),
			other => Err(ExplorerError::InvalidResponse(format!(
				"unexpected balance {}",
				other
			))),
		}
	}
}
