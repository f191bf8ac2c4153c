//! Explorer collaborator.
//!
//! Historical transaction lists and token balances are not available from a
//! plain node, so adaptors delegate them to an indexer API behind
//! [`ExplorerInterface`].

use alloy_primitives::{Address, B256, U256};
use async_trait::async_trait;
use thiserror::Error;

pub mod etherscan;

pub use etherscan::EtherscanClient;

/// Errors raised while querying the explorer.
#[derive(Debug, Error)]
pub enum ExplorerError {
	#[error("Explorer request failed: {0}")]
	Http(String),
	/// The API answered with an error status.
	#[error("Explorer API error: {0}")]
	Api(String),
	#[error("Invalid explorer response: {0}")]
	InvalidResponse(String),
}

/// Which history to list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxListKind {
	/// Native-asset transactions sent or received by the address.
	Native,
	/// Token transfer events for one contract.
	Token { contract: Address },
}

/// One page of an address history lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxListQuery {
	pub address: Address,
	pub kind: TxListKind,
	/// One-based page number.
	pub page: u32,
	pub page_size: u32,
}

/// One history entry as reported by the explorer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExplorerTransaction {
	pub hash: B256,
	pub from: Address,
	/// `None` for contract creation.
	pub to: Option<Address>,
	/// Token contract for token transfers.
	pub contract_address: Option<Address>,
	pub value: U256,
	pub gas_used: U256,
	pub gas_price: U256,
	pub block_number: u64,
	pub timestamp: u64,
	pub failed: bool,
}

impl ExplorerTransaction {
	/// `gas_used * gas_price`, saturating.
	pub fn fee(&self) -> U256 {
		self.gas_used.saturating_mul(self.gas_price)
	}
}

/// Indexer API used for history and token balances.
#[async_trait]
pub trait ExplorerInterface: Send + Sync {
	/// Lists one page of history, newest first.
	async fn transactions(&self, query: &TxListQuery)
		-> Result<Vec<ExplorerTransaction>, ExplorerError>;

	/// Balance of `address` in the token at `contract`, in base units.
	async fn token_balance(&self, contract: Address, address: Address)
		-> Result<U256, ExplorerError>;
}
