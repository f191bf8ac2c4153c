//! Typed views of node responses.

use crate::ClientError;
use account_types::BlockTag;
use alloy_consensus::Header;
use alloy_primitives::{Address, B256, U256};
use alloy_rpc_types_eth::Log;
use serde::Deserialize;
use serde_json::{json, Map, Value};

/// Code classification of an address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountKind {
	/// No bytecode stored at the address.
	ExternallyOwned,
	Contract,
}

impl AccountKind {
	pub fn as_str(&self) -> &'static str {
		match self {
			AccountKind::ExternallyOwned => "eoa",
			AccountKind::Contract => "contract",
		}
	}
}

/// Transaction summary as it appears inside a full block.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TransactionSummary {
	pub hash: B256,
	pub from: Address,
	#[serde(default)]
	pub to: Option<Address>,
	pub value: U256,
}

#[derive(Debug, Deserialize)]
struct BlockBody {
	#[serde(default)]
	transactions: Vec<TransactionSummary>,
}

/// A block with its header and transaction summaries in node order.
#[derive(Debug, Clone)]
pub struct Block {
	pub header: Header,
	pub transactions: Vec<TransactionSummary>,
}

impl Block {
	/// Decodes an `eth_getBlockBy*` result fetched with full transactions.
	pub(crate) fn from_rpc(value: Value) -> Result<Self, ClientError> {
		let header: Header = serde_json::from_value(value.clone())
			.map_err(|e| ClientError::Decode(format!("block header: {}", e)))?;
		let body: BlockBody = serde_json::from_value(value)
			.map_err(|e| ClientError::Decode(format!("block transactions: {}", e)))?;
		Ok(Self {
			header,
			transactions: body.transactions,
		})
	}

	pub fn hash(&self) -> B256 {
		self.header.hash_slow()
	}
}

/// Log query.
///
/// Either a height range or a single `block_hash`, never both. A missing
/// `from_block` starts at genesis and a missing `to_block` means latest.
#[derive(Debug, Clone, Default)]
pub struct LogFilter {
	pub addresses: Vec<Address>,
	/// Topic sets by position; an empty set matches anything.
	pub topics: Vec<Vec<B256>>,
	pub from_block: Option<u64>,
	pub to_block: Option<BlockTag>,
	pub block_hash: Option<B256>,
}

impl LogFilter {
	pub(crate) fn to_rpc_arg(&self) -> Result<Value, ClientError> {
		let mut arg = Map::new();
		arg.insert("address".into(), json!(self.addresses));

		let topics: Vec<Value> = self
			.topics
			.iter()
			.map(|set| if set.is_empty() { Value::Null } else { json!(set) })
			.collect();
		arg.insert("topics".into(), Value::Array(topics));

		match self.block_hash {
			Some(hash) => {
				if self.from_block.is_some() || self.to_block.is_some() {
					return Err(ClientError::InvalidArgument(
						"cannot specify both block_hash and from_block/to_block".into(),
					));
				}
				arg.insert("blockHash".into(), json!(hash));
			},
			None => {
				let from = BlockTag::Number(self.from_block.unwrap_or(0));
				arg.insert("fromBlock".into(), json!(from.to_rpc_arg()));
				arg.insert(
					"toBlock".into(),
					json!(self.to_block.unwrap_or_default().to_rpc_arg()),
				);
			},
		}

		Ok(Value::Object(arg))
	}
}

/// Logs together with the header they were resolved against.
#[derive(Debug, Clone)]
pub struct Logs {
	pub logs: Vec<Log>,
	pub to_block_header: Header,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_filter_defaults_to_genesis_and_latest() {
		let filter = LogFilter {
			addresses: vec![Address::repeat_byte(0x11)],
			topics: vec![vec![B256::repeat_byte(0xaa)], vec![]],
			..Default::default()
		};
		let arg = filter.to_rpc_arg().unwrap();
		assert_eq!(arg["fromBlock"], "0x0");
		assert_eq!(arg["toBlock"], "latest");
		assert!(arg["topics"][1].is_null());
		assert!(arg.get("blockHash").is_none());
	}

	#[test]
	fn test_filter_rejects_hash_with_range() {
		let filter = LogFilter {
			block_hash: Some(B256::repeat_byte(1)),
			from_block: Some(10),
			..Default::default()
		};
		assert!(matches!(
			filter.to_rpc_arg(),
			Err(ClientError::InvalidArgument(_))
		));
	}
}
