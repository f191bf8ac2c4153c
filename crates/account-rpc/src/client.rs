//! Typed Ethereum JSON-RPC client.
//!
//! [`EthClient`] owns one endpoint handle and exposes the queries the chain
//! adaptors need. Every call runs under the configured request timeout and
//! fails fast; a null result surfaces as [`ClientError::NotFound`] and a
//! header fetched by hash is checked against the requested hash.

use crate::retry::RetryPolicy;
use crate::transport::{BatchElem, Endpoint, HttpTransport, RpcTransport};
use crate::types::{AccountKind, Block, LogFilter, Logs};
use crate::{ClientError, RpcError};
use account_types::BlockTag;
use alloy_consensus::Header;
use alloy_primitives::{Address, Bytes, B256, U256, U64};
use alloy_rpc_types_eth::{Log, Transaction, TransactionReceipt};
use futures::{StreamExt, TryStreamExt};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Log queries may scan many blocks, so they get a longer deadline.
const LOG_TIMEOUT_FACTOR: u32 = 10;

/// Most heights a range request may span unless overridden.
pub const DEFAULT_MAX_RANGE: u64 = 5000;

/// How multi-element requests are sent to the node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchMode {
	/// Any number of calls fits in one batch.
	Full,
	/// The node caps batch size: ranges are split into groups of at most
	/// `group_size` calls with up to `max_workers` groups in flight, and
	/// paired queries are sent one after the other.
	Grouped {
		group_size: usize,
		max_workers: usize,
	},
}

impl BatchMode {
	/// `Grouped` when the node has a batch ceiling, `Full` otherwise.
	pub fn from_limit(limit: Option<usize>, max_workers: usize) -> Self {
		match limit {
			Some(group_size) => BatchMode::Grouped {
				group_size: group_size.max(1),
				max_workers: max_workers.max(1),
			},
			None => BatchMode::Full,
		}
	}
}

/// JSON-RPC client for one Ethereum node.
///
/// Cheap to share behind an `Arc`: calls go straight to the transport, which
/// allows concurrent issuance, so no call is serialised behind a lock.
pub struct EthClient {
	rpc: Arc<dyn RpcTransport>,
	request_timeout: Duration,
	batch_mode: BatchMode,
	max_range: u64,
}

fn decode<T: DeserializeOwned>(value: Value, what: &str) -> Result<T, ClientError> {
	if value.is_null() {
		return Err(ClientError::NotFound(what.to_string()));
	}
	serde_json::from_value(value).map_err(|e| ClientError::Decode(format!("{}: {}", what, e)))
}

fn ensure_hash(requested: B256, received: B256) -> Result<(), ClientError> {
	if requested != received {
		return Err(ClientError::HeaderMismatch {
			requested,
			received,
		});
	}
	Ok(())
}

impl EthClient {
	/// Wraps an established transport. Every call runs under `request_timeout`.
	pub fn new(rpc: Arc<dyn RpcTransport>, request_timeout: Duration, batch_mode: BatchMode) -> Self {
		Self {
			rpc,
			request_timeout,
			batch_mode,
			max_range: DEFAULT_MAX_RANGE,
		}
	}

	/// Caps how many heights [`headers_by_range`](Self::headers_by_range)
	/// accepts in one request.
	pub fn with_max_range(mut self, max_range: u64) -> Self {
		self.max_range = max_range.max(1);
		self
	}

	/// Dials `endpoint` over HTTP, retrying according to `policy`.
	pub async fn connect(
		endpoint: Endpoint,
		policy: &RetryPolicy,
		request_timeout: Duration,
		batch_mode: BatchMode,
	) -> Result<Self, ClientError> {
		let transport = HttpTransport::dial(endpoint, policy).await?;
		Ok(Self::new(Arc::new(transport), request_timeout, batch_mode))
	}

	/// How ranges and paired queries are sent to this node.
	pub fn batch_mode(&self) -> BatchMode {
		self.batch_mode
	}

	async fn call(&self, method: &str, params: Value) -> Result<Value, RpcError> {
		self.call_with_timeout(method, params, self.request_timeout)
			.await
	}

	async fn call_with_timeout(
		&self,
		method: &str,
		params: Value,
		timeout: Duration,
	) -> Result<Value, RpcError> {
		tokio::time::timeout(timeout, self.rpc.call(method, params))
			.await
			.map_err(|_| RpcError::Timeout(timeout))?
	}

	async fn batch(&self, batch: &mut [BatchElem], timeout: Duration) -> Result<(), RpcError> {
		tokio::time::timeout(timeout, self.rpc.batch_call(batch))
			.await
			.map_err(|_| RpcError::Timeout(timeout))?
	}

	/// Fetches the header at `tag`. A null result is [`ClientError::NotFound`].
	pub async fn header_by_number(&self, tag: BlockTag) -> Result<Header, ClientError> {
		let value = self
			.call("eth_getBlockByNumber", json!([tag.to_rpc_arg(), false]))
			.await?;
		decode(value, &format!("header {}", tag))
	}

	/// Fetches a header by hash and checks that it hashes back to `hash`.
	pub async fn header_by_hash(&self, hash: B256) -> Result<Header, ClientError> {
		let value = self.call("eth_getBlockByHash", json!([hash, false])).await?;
		let header: Header = decode(value, &format!("header {}", hash))?;
		ensure_hash(hash, header.hash_slow())?;
		Ok(header)
	}

	/// Header of the latest block the node considers safe.
	pub async fn latest_safe_header(&self) -> Result<Header, ClientError> {
		self.header_by_number(BlockTag::Safe).await
	}

	/// Header of the latest finalized block.
	pub async fn latest_finalized_header(&self) -> Result<Header, ClientError> {
		self.header_by_number(BlockTag::Finalized).await
	}

	/// Fetches every header in `start..=end` in ascending height order.
	pub async fn headers_by_range(&self, start: u64, end: u64) -> Result<Vec<Header>, ClientError> {
		if start > end {
			return Err(ClientError::InvalidArgument(format!(
				"range start {} is after end {}",
				start, end
			)));
		}
		if end - start >= self.max_range {
			return Err(ClientError::InvalidArgument(format!(
				"range {}..={} spans more than {} heights",
				start, end, self.max_range
			)));
		}
		if start == end {
			return Ok(vec![self.header_by_number(BlockTag::Number(start)).await?]);
		}

		let mut batch: Vec<BatchElem> = (start..=end)
			.map(|height| {
				BatchElem::new(
					"eth_getBlockByNumber",
					json!([BlockTag::Number(height).to_rpc_arg(), false]),
				)
			})
			.collect();

		match self.batch_mode {
			BatchMode::Full => self.batch(&mut batch, self.request_timeout).await?,
			BatchMode::Grouped {
				group_size,
				max_workers,
			} => {
				debug!(
					start,
					end,
					groups = batch.len().div_ceil(group_size),
					"Fetching header range in groups"
				);
				// Each group owns a disjoint slice of `batch`.
				let groups: Vec<_> = batch
					.chunks_mut(group_size)
					.map(|group| self.batch(group, self.request_timeout))
					.collect();
				futures::stream::iter(groups)
					.buffer_unordered(max_workers)
					.try_collect::<Vec<()>>()
					.await?;
			},
		}

		batch
			.into_iter()
			.zip(start..=end)
			.map(|(elem, height)| {
				decode::<Header>(elem.into_result()?, &format!("header {}", height))
			})
			.collect()
	}

	/// Fetches a block with its transaction bodies.
	pub async fn block_by_number(&self, tag: BlockTag) -> Result<Block, ClientError> {
		let value = self
			.call("eth_getBlockByNumber", json!([tag.to_rpc_arg(), true]))
			.await?;
		if value.is_null() {
			return Err(ClientError::NotFound(format!("block {}", tag)));
		}
		Block::from_rpc(value)
	}

	/// Fetches a block with transactions and checks its header hash.
	pub async fn block_by_hash(&self, hash: B256) -> Result<Block, ClientError> {
		let value = self.call("eth_getBlockByHash", json!([hash, true])).await?;
		if value.is_null() {
			return Err(ClientError::NotFound(format!("block {}", hash)));
		}
		let block = Block::from_rpc(value)?;
		ensure_hash(hash, block.hash())?;
		Ok(block)
	}

	/// Next nonce for `address` at the latest block.
	pub async fn nonce(&self, address: Address) -> Result<u64, ClientError> {
		let value = self
			.call("eth_getTransactionCount", json!([address, "latest"]))
			.await?;
		let nonce: U64 = decode(value, "transaction count")?;
		Ok(nonce.to::<u64>())
	}

	/// Native balance at the latest block, in wei.
	pub async fn balance(&self, address: Address) -> Result<U256, ClientError> {
		let value = self.call("eth_getBalance", json!([address, "latest"])).await?;
		decode(value, "balance")
	}

	/// Classifies `address` by whether it holds bytecode.
	pub async fn code(&self, address: Address) -> Result<AccountKind, ClientError> {
		let value = self.call("eth_getCode", json!([address, "latest"])).await?;
		let code: Bytes = decode(value, "code")?;
		Ok(if code.is_empty() {
			AccountKind::ExternallyOwned
		} else {
			AccountKind::Contract
		})
	}

	/// `eth_gasPrice`.
	pub async fn suggested_gas_price(&self) -> Result<U256, ClientError> {
		let value = self.call("eth_gasPrice", json!([])).await?;
		decode(value, "gas price")
	}

	/// `eth_maxPriorityFeePerGas`.
	pub async fn suggested_priority_fee(&self) -> Result<U256, ClientError> {
		let value = self.call("eth_maxPriorityFeePerGas", json!([])).await?;
		decode(value, "priority fee")
	}

	/// Broadcasts a signed transaction and returns its hash.
	pub async fn submit_raw_transaction(&self, raw_tx: &str) -> Result<B256, ClientError> {
		let value = self.call("eth_sendRawTransaction", json!([raw_tx])).await?;
		decode(value, "transaction hash")
	}

	/// Fetches a transaction body. Unknown hashes are [`ClientError::NotFound`].
	pub async fn transaction_by_hash(&self, hash: B256) -> Result<Transaction, ClientError> {
		let value = self
			.call("eth_getTransactionByHash", json!([hash]))
			.await?;
		decode(value, &format!("transaction {}", hash))
	}

	/// Fetches a receipt. Pending and unknown transactions have none and
	/// come back as [`ClientError::NotFound`].
	pub async fn transaction_receipt(&self, hash: B256) -> Result<TransactionReceipt, ClientError> {
		let value = self
			.call("eth_getTransactionReceipt", json!([hash]))
			.await?;
		decode(value, &format!("receipt {}", hash))
	}

	/// Runs a log query together with the header of its upper bound.
	///
	/// Both halves must succeed.
	pub async fn filter_logs(&self, filter: &LogFilter) -> Result<Logs, ClientError> {
		let arg = filter.to_rpc_arg()?;
		let timeout = self.request_timeout * LOG_TIMEOUT_FACTOR;
		let (header_method, header_params) = match filter.block_hash {
			Some(hash) => ("eth_getBlockByHash", json!([hash, false])),
			None => (
				"eth_getBlockByNumber",
				json!([filter.to_block.unwrap_or_default().to_rpc_arg(), false]),
			),
		};

		let (header, logs) = match self.batch_mode {
			BatchMode::Full => {
				let mut batch = [
					BatchElem::new(header_method, header_params),
					BatchElem::new("eth_getLogs", json!([arg])),
				];
				self.batch(&mut batch, timeout).await?;
				let [header, logs] = batch;
				(header.into_result(), logs.into_result())
			},
			BatchMode::Grouped { .. } => {
				let header = self
					.call_with_timeout(header_method, header_params, timeout)
					.await;
				let logs = self
					.call_with_timeout("eth_getLogs", json!([arg]), timeout)
					.await;
				(header, logs)
			},
		};

		let header = header.map_err(|source| ClientError::Query {
			what: "the to-block header",
			source,
		})?;
		let logs = logs.map_err(|source| ClientError::Query {
			what: "logs",
			source,
		})?;

		let to_block_header: Header = decode(header, "to-block header")?;
		if let Some(hash) = filter.block_hash {
			ensure_hash(hash, to_block_header.hash_slow())?;
		}
		let logs: Vec<Log> = if logs.is_null() {
			Vec::new()
		} else {
			decode(logs, "logs")?
		};

		Ok(Logs {
			logs,
			to_block_header,
		})
	}

	/// Releases the endpoint handle. Safe to call more than once.
	pub fn close(&self) {
		self.rpc.close();
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testing::{
		block_json, header_json, receipt_json, sample_header, signed, transaction_json,
		MockTransport,
	};
	use alloy_consensus::{Transaction as _, TxEip1559};
	use alloy_primitives::TxKind;

	fn height_of(params: &Value) -> u64 {
		let arg = params[0].as_str().unwrap();
		u64::from_str_radix(arg.trim_start_matches("0x"), 16).unwrap()
	}

	fn header_node() -> Arc<MockTransport> {
		Arc::new(MockTransport::new(|method, params| match method {
			"eth_getBlockByNumber" => match params[0].as_str() {
				Some("latest") | Some("safe") | Some("finalized") => {
					Ok(header_json(&sample_header(500)))
				},
				_ => Ok(header_json(&sample_header(height_of(params)))),
			},
			other => Err(RpcError::Rpc {
				code: -32601,
				message: format!("method {} not found", other),
			}),
		}))
	}

	fn client(node: Arc<MockTransport>, batch_mode: BatchMode) -> EthClient {
		EthClient::new(node, Duration::from_secs(1), batch_mode)
	}

	#[tokio::test]
	async fn test_header_by_number_encodes_height() {
		let node = header_node();
		let client = client(node.clone(), BatchMode::Full);

		let header = client.header_by_number(BlockTag::Number(1000)).await.unwrap();
		assert_eq!(header.number, 1000);
		assert_eq!(node.requests()[0].1[0], "0x3e8");

		let safe = client.latest_safe_header().await.unwrap();
		assert_eq!(safe.number, 500);
	}

	#[tokio::test]
	async fn test_null_header_is_not_found() {
		let node = Arc::new(MockTransport::new(|_, _| Ok(Value::Null)));
		let client = client(node, BatchMode::Full);
		let err = client
			.header_by_number(BlockTag::Number(7))
			.await
			.unwrap_err();
		assert!(matches!(err, ClientError::NotFound(_)));
	}

	#[tokio::test]
	async fn test_header_by_hash_integrity() {
		let expected = sample_header(42);
		let served = expected.clone();
		let node = Arc::new(MockTransport::new(move |_, _| Ok(header_json(&served))));
		let client = client(node, BatchMode::Full);

		let header = client.header_by_hash(expected.hash_slow()).await.unwrap();
		assert_eq!(header.hash_slow(), expected.hash_slow());

		let wrong = B256::repeat_byte(0xee);
		match client.header_by_hash(wrong).await {
			Err(ClientError::HeaderMismatch {
				requested,
				received,
			}) => {
				assert_eq!(requested, wrong);
				assert_eq!(received, expected.hash_slow());
			},
			other => panic!("unexpected: {:?}", other),
		}
	}

	#[tokio::test]
	async fn test_single_height_range_matches_single_lookup() {
		let node = header_node();
		let client = client(node.clone(), BatchMode::Full);

		let range = client.headers_by_range(77, 77).await.unwrap();
		let single = client.header_by_number(BlockTag::Number(77)).await.unwrap();
		assert_eq!(range, vec![single]);
		assert!(node.batch_sizes().is_empty());
	}

	#[tokio::test]
	async fn test_range_uses_one_batch_without_limit() {
		let node = header_node();
		let client = client(node.clone(), BatchMode::Full);

		let headers = client.headers_by_range(10, 19).await.unwrap();
		let numbers: Vec<u64> = headers.iter().map(|h| h.number).collect();
		assert_eq!(numbers, (10..=19).collect::<Vec<_>>());
		assert_eq!(node.batch_sizes(), vec![10]);
	}

	#[tokio::test]
	async fn test_range_split_into_groups_keeps_order() {
		let node = header_node();
		let client = client(
			node.clone(),
			BatchMode::Grouped {
				group_size: 100,
				max_workers: 3,
			},
		);

		let headers = client.headers_by_range(1_000, 1_249).await.unwrap();
		assert_eq!(headers.len(), 250);
		for (offset, header) in headers.iter().enumerate() {
			assert_eq!(header.number, 1_000 + offset as u64);
		}

		let mut sizes = node.batch_sizes();
		sizes.sort_unstable();
		assert_eq!(sizes, vec![50, 100, 100]);
	}

	#[tokio::test]
	async fn test_range_span_is_capped_before_any_call() {
		let node = header_node();
		let client = client(node.clone(), BatchMode::Full).with_max_range(100);

		let err = client.headers_by_range(0, 2_000_000_000).await.unwrap_err();
		assert!(matches!(err, ClientError::InvalidArgument(ref msg) if msg.contains("100")));
		assert!(matches!(
			client.headers_by_range(0, 100).await,
			Err(ClientError::InvalidArgument(_))
		));
		assert!(node.requests().is_empty());

		let headers = client.headers_by_range(0, 99).await.unwrap();
		assert_eq!(headers.len(), 100);

		let unbounded = EthClient::new(node, Duration::from_secs(1), BatchMode::Full);
		assert!(matches!(
			unbounded.headers_by_range(0, u64::MAX).await,
			Err(ClientError::InvalidArgument(_))
		));
	}

	#[tokio::test]
	async fn test_range_aborts_on_bad_element() {
		let node = Arc::new(MockTransport::new(|_, params| {
			if height_of(params) == 5 {
				Ok(json!({ "number": "not a header" }))
			} else {
				Ok(header_json(&sample_header(height_of(params))))
			}
		}));
		let client = client(node, BatchMode::Full);
		let err = client.headers_by_range(1, 9).await.unwrap_err();
		assert!(matches!(err, ClientError::Decode(_)));
	}

	#[tokio::test]
	async fn test_range_propagates_element_error() {
		let node = Arc::new(MockTransport::new(|_, params| {
			if height_of(params) == 3 {
				Err(RpcError::Rpc {
					code: -32000,
					message: "pruned".into(),
				})
			} else {
				Ok(header_json(&sample_header(height_of(params))))
			}
		}));
		let client = client(node, BatchMode::Full);
		assert!(matches!(
			client.headers_by_range(1, 4).await,
			Err(ClientError::Rpc(RpcError::Rpc { .. }))
		));
		assert!(matches!(
			client.headers_by_range(9, 2).await,
			Err(ClientError::InvalidArgument(_))
		));
	}

	#[tokio::test]
	async fn test_block_by_hash_checks_header() {
		let header = sample_header(12);
		let from = Address::repeat_byte(0x01);
		let served = block_json(&header, &[(B256::repeat_byte(0x0a), from, None, U256::from(5))]);
		let node = Arc::new(MockTransport::new(move |_, _| Ok(served.clone())));
		let client = client(node, BatchMode::Full);

		let block = client.block_by_hash(header.hash_slow()).await.unwrap();
		assert_eq!(block.transactions.len(), 1);
		assert_eq!(block.transactions[0].from, from);
		assert!(block.transactions[0].to.is_none());

		assert!(matches!(
			client.block_by_hash(B256::ZERO).await,
			Err(ClientError::HeaderMismatch { .. })
		));
	}

	#[tokio::test]
	async fn test_account_queries() {
		let node = Arc::new(MockTransport::new(|method, params| match method {
			"eth_getTransactionCount" => Ok(json!("0x5")),
			"eth_getBalance" => Ok(json!("0xde0b6b3a7640000")),
			"eth_getCode" if params[0] == json!(Address::repeat_byte(0xcc)) => Ok(json!("0x6080")),
			"eth_getCode" => Ok(json!("0x")),
			_ => Ok(Value::Null),
		}));
		let client = client(node, BatchMode::Full);
		let eoa = Address::repeat_byte(0x01);

		assert_eq!(client.nonce(eoa).await.unwrap(), 5);
		assert_eq!(
			client.balance(eoa).await.unwrap(),
			U256::from(1_000_000_000_000_000_000u128)
		);
		assert_eq!(client.code(eoa).await.unwrap(), AccountKind::ExternallyOwned);
		assert_eq!(
			client.code(Address::repeat_byte(0xcc)).await.unwrap(),
			AccountKind::Contract
		);
	}

	#[tokio::test]
	async fn test_fee_suggestions() {
		let node = Arc::new(MockTransport::new(|method, _| match method {
			"eth_gasPrice" => Ok(json!("0x3b9aca00")),
			"eth_maxPriorityFeePerGas" => Err(RpcError::Rpc {
				code: -32601,
				message: "unsupported".into(),
			}),
			_ => Ok(Value::Null),
		}));
		let client = client(node, BatchMode::Full);
		assert_eq!(
			client.suggested_gas_price().await.unwrap(),
			U256::from(1_000_000_000u64)
		);
		assert!(client.suggested_priority_fee().await.is_err());
	}

	#[tokio::test]
	async fn test_transaction_and_receipt_lookups() {
		let tx = signed(TxEip1559 {
			chain_id: 1,
			nonce: 3,
			gas_limit: 21_000,
			max_fee_per_gas: 30,
			max_priority_fee_per_gas: 2,
			to: TxKind::Call(Address::repeat_byte(0x44)),
			value: U256::from(7u64),
			..Default::default()
		});
		let hash = *tx.hash();
		let tx_json = transaction_json(tx, Address::repeat_byte(0x33), Some(16));
		let node = Arc::new(MockTransport::new(move |method, params| {
			let known = params[0] == json!(hash);
			match method {
				"eth_getTransactionByHash" if known => Ok(tx_json.clone()),
				"eth_getTransactionReceipt" if known => Ok(receipt_json(hash, 16, 21_000, 25, false)),
				_ => Ok(Value::Null),
			}
		}));
		let client = client(node, BatchMode::Full);

		let found = client.transaction_by_hash(hash).await.unwrap();
		assert_eq!(*found.inner.tx_hash(), hash);
		assert_eq!(found.from, Address::repeat_byte(0x33));
		assert_eq!(found.inner.to(), Some(Address::repeat_byte(0x44)));
		assert_eq!(found.inner.value(), U256::from(7u64));
		assert_eq!(found.block_number, Some(16));

		let receipt = client.transaction_receipt(hash).await.unwrap();
		assert!(!receipt.status());
		assert_eq!(receipt.gas_used, 21_000);
		assert_eq!(receipt.effective_gas_price, 25);

		let unknown = B256::repeat_byte(0x99);
		assert!(matches!(
			client.transaction_by_hash(unknown).await,
			Err(ClientError::NotFound(_))
		));
		assert!(matches!(
			client.transaction_receipt(unknown).await,
			Err(ClientError::NotFound(_))
		));
	}

	#[tokio::test(start_paused = true)]
	async fn test_call_timeout() {
		let node = Arc::new(MockTransport::new(|_, _| Ok(json!("0x1"))).with_delay(Duration::from_secs(30)));
		let client = client(node, BatchMode::Full);
		let err = client.nonce(Address::ZERO).await.unwrap_err();
		assert!(matches!(err, ClientError::Rpc(RpcError::Timeout(_))));
	}

	#[tokio::test]
	async fn test_filter_logs_batched() {
		let log = json!({
			"address": Address::repeat_byte(0x22),
			"topics": [B256::repeat_byte(0x01)],
			"data": "0x",
			"blockNumber": "0x64",
			"transactionIndex": "0x0",
			"logIndex": "0x0",
			"removed": false
		});
		let node = Arc::new(MockTransport::new(move |method, _| match method {
			"eth_getLogs" => Ok(json!([log.clone()])),
			"eth_getBlockByNumber" => Ok(header_json(&sample_header(100))),
			_ => Ok(Value::Null),
		}));
		let client = client(node.clone(), BatchMode::Full);

		let filter = LogFilter {
			to_block: Some(BlockTag::Number(100)),
			..Default::default()
		};
		let logs = client.filter_logs(&filter).await.unwrap();
		assert_eq!(logs.logs.len(), 1);
		assert_eq!(logs.logs[0].address(), Address::repeat_byte(0x22));
		assert_eq!(logs.logs[0].topics(), &[B256::repeat_byte(0x01)]);
		assert_eq!(logs.logs[0].block_number, Some(100));
		assert_eq!(logs.to_block_header.number, 100);
		assert_eq!(node.batch_sizes(), vec![2]);
	}

	#[tokio::test]
	async fn test_filter_logs_sequential_reports_failing_half() {
		let node = Arc::new(MockTransport::new(|method, _| match method {
			"eth_getLogs" => Err(RpcError::Rpc {
				code: -32005,
				message: "query returned more than 10000 results".into(),
			}),
			_ => Ok(header_json(&sample_header(100))),
		}));
		let client = client(
			node.clone(),
			BatchMode::Grouped {
				group_size: 100,
				max_workers: 2,
			},
		);

		let err = client.filter_logs(&LogFilter::default()).await.unwrap_err();
		assert!(err.to_string().starts_with("unable to query logs"));
		assert!(node.batch_sizes().is_empty());
	}

	#[tokio::test]
	async fn test_close_is_forwarded() {
		let node = header_node();
		let client = client(node.clone(), BatchMode::Full);
		client.close();
		client.close();
		assert_eq!(node.close_count(), 2);
	}
}
