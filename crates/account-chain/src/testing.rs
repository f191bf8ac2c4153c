//! In-memory explorer for tests.

use crate::explorer::{ExplorerError, ExplorerInterface, ExplorerTransaction, TxListQuery};
use alloy_primitives::{Address, U256};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

/// Explorer serving a fixed history and fixed token balances.
#[derive(Default)]
pub struct MockExplorer {
	transactions: Vec<ExplorerTransaction>,
	balances: HashMap<(Address, Address), U256>,
	queries: Mutex<Vec<TxListQuery>>,
}

impl MockExplorer {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_transactions(mut self, transactions: Vec<ExplorerTransaction>) -> Self {
		self.transactions = transactions;
		self
	}

	pub fn with_balance(mut self, contract: Address, address: Address, balance: U256) -> Self {
		self.balances.insert((contract, address), balance);
		self
	}

	/// History queries received so far.
	pub fn queries(&self) -> Vec<TxListQuery> {
		self.queries
			.lock()
			.unwrap_or_else(|e| e.into_inner())
			.clone()
	}
}

#[async_trait]
impl ExplorerInterface for MockExplorer {
	async fn transactions(
		&self,
		query: &TxListQuery,
	) -> Result<Vec<ExplorerTransaction>, ExplorerError> {
		self.queries
			.lock()
			.unwrap_or_else(|e| e.into_inner())
			.push(query.clone());
		let skip = (query.page.max(1) as usize - 1) * query.page_size as usize;
		Ok(self
			.transactions
			.iter()
			.skip(skip)
			.take(query.page_size as usize)
			.cloned()
			.collect())
	}

	async fn token_balance(
		&self,
		contract: Address,
		address: Address,
	) -> Result<U256, ExplorerError> {
		self.balances
			.get(&(contract, address))
			.copied()
			.ok_or_else(|| ExplorerError::Api(format!("no balance for {}", address)))
	}
}
