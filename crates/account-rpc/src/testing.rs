//! In-memory transport and fixtures for tests.

use crate::transport::{BatchElem, RpcTransport};
use crate::RpcError;
use alloy_consensus::{
	Eip658Value, Header, Receipt, ReceiptEnvelope, ReceiptWithBloom, SignableTransaction, Signed,
	TxEnvelope,
};
use alloy_primitives::{Address, PrimitiveSignature, B256, U256};
use alloy_rpc_types_eth::{Log, Transaction, TransactionReceipt};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

type Handler = dyn Fn(&str, &Value) -> Result<Value, RpcError> + Send + Sync;

/// Transport answering every call through a closure.
///
/// Batches are answered element by element with the same closure. Calls and
/// batch sizes are recorded for assertions.
pub struct MockTransport {
	handler: Box<Handler>,
	delay: Option<Duration>,
	requests: Mutex<Vec<(String, Value)>>,
	batch_sizes: Mutex<Vec<usize>>,
	closes: AtomicUsize,
}

impl MockTransport {
	pub fn new(
		handler: impl Fn(&str, &Value) -> Result<Value, RpcError> + Send + Sync + 'static,
	) -> Self {
		Self {
			handler: Box::new(handler),
			delay: None,
			requests: Mutex::new(Vec::new()),
			batch_sizes: Mutex::new(Vec::new()),
			closes: AtomicUsize::new(0),
		}
	}

	/// Delays every call and batch by `delay`.
	pub fn with_delay(mut self, delay: Duration) -> Self {
		self.delay = Some(delay);
		self
	}

	/// Every `(method, params)` seen so far, batched ones included.
	pub fn requests(&self) -> Vec<(String, Value)> {
		self.requests
			.lock()
			.unwrap_or_else(|e| e.into_inner())
			.clone()
	}

	pub fn methods(&self) -> Vec<String> {
		self.requests().into_iter().map(|(method, _)| method).collect()
	}

	/// Sizes of the batches received, in arrival order.
	pub fn batch_sizes(&self) -> Vec<usize> {
		self.batch_sizes
			.lock()
			.unwrap_or_else(|e| e.into_inner())
			.clone()
	}

	pub fn close_count(&self) -> usize {
		self.closes.load(Ordering::SeqCst)
	}

	fn answer(&self, method: &str, params: &Value) -> Result<Value, RpcError> {
		self.requests
			.lock()
			.unwrap_or_else(|e| e.into_inner())
			.push((method.to_string(), params.clone()));
		(self.handler)(method, params)
	}
}

#[async_trait]
impl RpcTransport for MockTransport {
	async fn call(&self, method: &str, params: Value) -> Result<Value, RpcError> {
		if let Some(delay) = self.delay {
			tokio::time::sleep(delay).await;
		}
		self.answer(method, &params)
	}

	async fn batch_call(&self, batch: &mut [BatchElem]) -> Result<(), RpcError> {
		if let Some(delay) = self.delay {
			tokio::time::sleep(delay).await;
		}
		self.batch_sizes
			.lock()
			.unwrap_or_else(|e| e.into_inner())
			.push(batch.len());
		for elem in batch.iter_mut() {
			elem.result = Some(self.answer(&elem.method, &elem.params));
		}
		Ok(())
	}

	fn close(&self) {
		self.closes.fetch_add(1, Ordering::SeqCst);
	}
}

/// A post-London header at `number` with deterministic contents.
pub fn sample_header(number: u64) -> Header {
	Header {
		parent_hash: B256::with_last_byte((number % 251) as u8),
		beneficiary: Address::repeat_byte(0x95),
		state_root: B256::repeat_byte(0x01),
		transactions_root: B256::repeat_byte(0x02),
		receipts_root: B256::repeat_byte(0x03),
		number,
		gas_limit: 30_000_000,
		gas_used: 12_345_678,
		timestamp: 1_700_000_000 + number * 12,
		base_fee_per_gas: Some(7_000_000_000),
		..Default::default()
	}
}

/// Node-style JSON for `header`, including its `hash` member.
pub fn header_json(header: &Header) -> Value {
	let mut value = json!(header);
	value["hash"] = json!(header.hash_slow());
	value
}

/// Node-style JSON for a block with full transaction objects.
pub fn block_json(header: &Header, txs: &[(B256, Address, Option<Address>, U256)]) -> Value {
	let mut value = header_json(header);
	value["transactions"] = Value::Array(
		txs.iter()
			.map(|(hash, from, to, amount)| {
				json!({
					"hash": hash,
					"from": from,
					"to": to,
					"value": amount,
					"blockNumber": format!("{:#x}", header.number),
				})
			})
			.collect(),
	);
	value
}

/// Seals `tx` with a fixed, non-recoverable signature. Enough for lookups,
/// which never check who signed.
pub fn signed<T: SignableTransaction<PrimitiveSignature>>(tx: T) -> Signed<T> {
	tx.into_signed(PrimitiveSignature::new(U256::from(1), U256::from(1), false))
}

/// Node-style `eth_getTransactionByHash` JSON. `block_number` is `None` for
/// a pending transaction.
pub fn transaction_json(
	tx: impl Into<TxEnvelope>,
	from: Address,
	block_number: Option<u64>,
) -> Value {
	json!(Transaction {
		inner: tx.into(),
		block_hash: block_number.map(|n| B256::with_last_byte((n % 251) as u8)),
		block_number,
		transaction_index: block_number.map(|_| 0),
		effective_gas_price: None,
		from,
	})
}

/// Node-style `eth_getTransactionReceipt` JSON for a type-2 transaction
/// without logs.
pub fn receipt_json(
	tx_hash: B256,
	block_number: u64,
	gas_used: u128,
	effective_gas_price: u128,
	succeeded: bool,
) -> Value {
	let receipt: Receipt<Log> = Receipt {
		status: Eip658Value::Eip658(succeeded),
		cumulative_gas_used: gas_used,
		logs: Vec::new(),
	};
	json!(TransactionReceipt {
		inner: ReceiptEnvelope::Eip1559(ReceiptWithBloom {
			receipt,
			logs_bloom: Default::default(),
		}),
		transaction_hash: tx_hash,
		transaction_index: Some(0),
		block_hash: Some(B256::with_last_byte((block_number % 251) as u8)),
		block_number: Some(block_number),
		gas_used,
		effective_gas_price,
		blob_gas_used: None,
		blob_gas_price: None,
		from: Address::ZERO,
		to: None,
		contract_address: None,
		authorization_list: None,
	})
}
