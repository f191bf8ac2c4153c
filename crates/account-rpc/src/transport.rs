//! JSON-RPC 2.0 transport.
//!
//! [`RpcTransport`] is the call surface the chain client builds on: single
//! calls, batches in which every element carries its own outcome, and an
//! explicit close. [`HttpTransport`] implements it over a pooled reqwest
//! client, so calls can be issued concurrently without any locking.

use crate::retry::{retry, RetryPolicy};
use crate::RpcError;
use account_types::SecretString;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, info};

/// One call inside a batch.
///
/// `result` is filled by the transport. A batch can succeed as a whole while
/// individual elements still carry errors, so callers must inspect each one.
#[derive(Debug)]
pub struct BatchElem {
	pub method: String,
	pub params: Value,
	pub result: Option<Result<Value, RpcError>>,
}

impl BatchElem {
	pub fn new(method: impl Into<String>, params: Value) -> Self {
		Self {
			method: method.into(),
			params,
			result: None,
		}
	}

	/// Consumes the element, yielding its own outcome.
	pub fn into_result(self) -> Result<Value, RpcError> {
		let method = self.method;
		self.result.unwrap_or_else(|| {
			Err(RpcError::InvalidResponse(format!(
				"no response for batched call {}",
				method
			)))
		})
	}
}

/// Call surface of a JSON-RPC endpoint.
#[async_trait]
pub trait RpcTransport: Send + Sync {
	/// Issues a single call and returns its `result` member.
	async fn call(&self, method: &str, params: Value) -> Result<Value, RpcError>;

	/// Issues every element as one batch.
	///
	/// An `Err` means the batch as a whole failed; otherwise each element's
	/// `result` holds its individual outcome.
	async fn batch_call(&self, batch: &mut [BatchElem]) -> Result<(), RpcError>;

	/// Releases the endpoint. Further calls fail with [`RpcError::Closed`].
	fn close(&self);
}

/// Where and how to reach a node.
#[derive(Debug, Clone)]
pub struct Endpoint {
	pub url: String,
	pub user: Option<String>,
	pub password: Option<SecretString>,
}

impl Endpoint {
	pub fn new(url: impl Into<String>) -> Self {
		Self {
			url: url.into(),
			user: None,
			password: None,
		}
	}
}

#[derive(Debug, Deserialize)]
struct JsonRpcResponse {
	#[serde(default)]
	id: Value,
	#[serde(default)]
	result: Option<Value>,
	#[serde(default)]
	error: Option<JsonRpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct JsonRpcErrorObject {
	code: i64,
	message: String,
}

impl JsonRpcResponse {
	fn into_result(self) -> Result<Value, RpcError> {
		match self.error {
			Some(err) => Err(RpcError::Rpc {
				code: err.code,
				message: err.message,
			}),
			None => Ok(self.result.unwrap_or(Value::Null)),
		}
	}
}

fn request_body(id: u64, method: &str, params: &Value) -> Value {
	json!({
		"jsonrpc": "2.0",
		"id": id,
		"method": method,
		"params": params,
	})
}

/// HTTP implementation of [`RpcTransport`].
pub struct HttpTransport {
	client: reqwest::Client,
	endpoint: Endpoint,
	next_id: AtomicU64,
	closed: AtomicBool,
}

impl HttpTransport {
	/// Builds the transport without touching the network.
	pub fn new(endpoint: Endpoint, connect_timeout: Duration) -> Result<Self, RpcError> {
		let client = reqwest::Client::builder()
			.connect_timeout(connect_timeout)
			.pool_idle_timeout(Duration::from_secs(90))
			.pool_max_idle_per_host(16)
			.build()
			.map_err(|e| RpcError::Transport(e.to_string()))?;

		Ok(Self {
			client,
			endpoint,
			next_id: AtomicU64::new(1),
			closed: AtomicBool::new(false),
		})
	}

	/// Connects to the node, probing it with `eth_chainId` until it answers
	/// or the policy gives up.
	pub async fn dial(endpoint: Endpoint, policy: &RetryPolicy) -> Result<Self, RpcError> {
		let transport = Self::new(endpoint, policy.deadline)?;
		let chain_id = retry(policy, || transport.call("eth_chainId", json!([])))
			.await
			.map_err(|e| RpcError::Dial(format!("{}: {}", transport.endpoint.url, e)))?;

		info!(url = %transport.endpoint.url, chain_id = %chain_id, "Connected to node");
		Ok(transport)
	}

	async fn post(&self, body: &Value) -> Result<Value, RpcError> {
		if self.closed.load(Ordering::Acquire) {
			return Err(RpcError::Closed);
		}

		let mut request = self.client.post(&self.endpoint.url).json(body);
		if let Some(user) = &self.endpoint.user {
			let password = self.endpoint.password.as_ref().map(|p| p.expose_secret());
			request = request.basic_auth(user, password);
		}

		let response = request
			.send()
			.await
			.map_err(|e| RpcError::Transport(e.to_string()))?;

		let status = response.status();
		if !status.is_success() {
			let text = response.text().await.unwrap_or_default();
			return Err(RpcError::Transport(format!("HTTP {}: {}", status, text)));
		}

		response
			.json::<Value>()
			.await
			.map_err(|e| RpcError::InvalidResponse(e.to_string()))
	}
}

#[async_trait]
impl RpcTransport for HttpTransport {
	async fn call(&self, method: &str, params: Value) -> Result<Value, RpcError> {
		let id = self.next_id.fetch_add(1, Ordering::Relaxed);
		let value = self.post(&request_body(id, method, &params)).await?;
		let response: JsonRpcResponse = serde_json::from_value(value)
			.map_err(|e| RpcError::InvalidResponse(format!("{}: {}", method, e)))?;
		response.into_result()
	}

	async fn batch_call(&self, batch: &mut [BatchElem]) -> Result<(), RpcError> {
		if batch.is_empty() {
			return Ok(());
		}

		let base = self.next_id.fetch_add(batch.len() as u64, Ordering::Relaxed);
		let body = Value::Array(
			batch
				.iter()
				.enumerate()
				.map(|(i, elem)| request_body(base + i as u64, &elem.method, &elem.params))
				.collect(),
		);

		let value = self.post(&body).await?;
		let responses: Vec<JsonRpcResponse> = match value {
			Value::Array(_) => serde_json::from_value(value)
				.map_err(|e| RpcError::InvalidResponse(e.to_string()))?,
			other => {
				// Some nodes reject a batch with a single error object.
				let response: JsonRpcResponse = serde_json::from_value(other)
					.map_err(|e| RpcError::InvalidResponse(e.to_string()))?;
				return Err(response.into_result().err().unwrap_or_else(|| {
					RpcError::InvalidResponse("expected an array for a batch request".into())
				}));
			},
		};

		debug!(size = batch.len(), received = responses.len(), "Batch completed");

		for response in responses {
			let index = response
				.id
				.as_u64()
				.and_then(|id| id.checked_sub(base))
				.and_then(|offset| usize::try_from(offset).ok());
			if let Some(elem) = index.and_then(|i| batch.get_mut(i)) {
				elem.result = Some(response.into_result());
			}
		}

		for elem in batch.iter_mut().filter(|elem| elem.result.is_none()) {
			elem.result = Some(Err(RpcError::InvalidResponse(format!(
				"missing response for {}",
				elem.method
			))));
		}

		Ok(())
	}

	fn close(&self) {
		if !self.closed.swap(true, Ordering::AcqRel) {
			debug!(url = %self.endpoint.url, "Closed node connection");
		}
	}
}
