//! JSON-RPC plumbing for EVM nodes.
//!
//! The crate is layered bottom-up: [`retry`] provides the bounded exponential
//! backoff used while dialing, [`transport`] speaks JSON-RPC 2.0 over HTTP
//! (single and batched calls), and [`client`] turns raw responses into typed
//! headers, blocks, receipts and account state.

pub mod client;
pub mod retry;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod transport;
pub mod types;

use alloy_primitives::B256;
use std::time::Duration;
use thiserror::Error;

pub use alloy_rpc_types_eth::{Log, Transaction, TransactionReceipt};
pub use client::{BatchMode, EthClient, DEFAULT_MAX_RANGE};
pub use retry::{retry, RetryError, RetryPolicy};
pub use transport::{BatchElem, Endpoint, HttpTransport, RpcTransport};
pub use types::{AccountKind, Block, LogFilter, Logs, TransactionSummary};

/// Errors raised by the transport layer.
#[derive(Debug, Error)]
pub enum RpcError {
	/// The request could not be delivered or the HTTP exchange failed.
	#[error("Transport error: {0}")]
	Transport(String),
	/// The call did not complete within its deadline.
	#[error("Request timed out after {0:?}")]
	Timeout(Duration),
	/// The node answered with a JSON-RPC error object.
	#[error("RPC error {code}: {message}")]
	Rpc { code: i64, message: String },
	/// The node answered with something that is not valid JSON-RPC.
	#[error("Invalid response: {0}")]
	InvalidResponse(String),
	/// The endpoint handle has been closed.
	#[error("Connection closed")]
	Closed,
	/// The initial connection could not be established.
	#[error("Dial failed: {0}")]
	Dial(String),
}

/// Errors raised by [`EthClient`].
#[derive(Debug, Error)]
pub enum ClientError {
	#[error(transparent)]
	Rpc(#[from] RpcError),
	/// One half of a combined query failed.
	#[error("unable to query {what}: {source}")]
	Query {
		what: &'static str,
		#[source]
		source: RpcError,
	},
	/// The node returned null for the requested entity.
	#[error("Not found: {0}")]
	NotFound(String),
	/// A header fetched by hash hashes to something else.
	#[error("Header mismatch: requested {requested}, received {received}")]
	HeaderMismatch { requested: B256, received: B256 },
	/// The response could not be decoded into the expected shape.
	#[error("Decode error: {0}")]
	Decode(String),
	#[error("Invalid argument: {0}")]
	InvalidArgument(String),
}
