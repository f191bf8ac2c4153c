//! Node and explorer types to response DTOs.

use crate::explorer::ExplorerTransaction;
use account_rpc::{Block, TransactionSummary};
use account_types::{BlockHeader, BlockResponse, BlockTransaction, TxMessage, TxStatus};
use alloy_consensus::Header;
use alloy_primitives::Address;

pub(crate) fn header(header: &Header) -> BlockHeader {
	BlockHeader {
		hash: header.hash_slow().to_string(),
		parent_hash: header.parent_hash.to_string(),
		uncle_hash: header.ommers_hash.to_string(),
		coin_base: header.beneficiary.to_checksum(None),
		root: header.state_root.to_string(),
		tx_hash: header.transactions_root.to_string(),
		receipt_hash: header.receipts_root.to_string(),
		difficulty: header.difficulty.to_string(),
		number: header.number.to_string(),
		gas_limit: header.gas_limit,
		gas_used: header.gas_used,
		time: header.timestamp,
		extra: format!("0x{}", hex::encode(&header.extra_data)),
		mix_digest: header.mix_hash.to_string(),
		nonce: u64::from_be_bytes(header.nonce.0).to_string(),
		base_fee: header.base_fee_per_gas.map(|fee| fee.to_string()),
		withdrawals_hash: header.withdrawals_root.map(|root| root.to_string()),
		blob_gas_used: header.blob_gas_used,
		excess_blob_gas: header.excess_blob_gas,
		parent_beacon_root: header.parent_beacon_block_root.map(|root| root.to_string()),
	}
}

fn block_transaction(tx: &TransactionSummary, height: u64) -> BlockTransaction {
	BlockTransaction {
		hash: tx.hash.to_string(),
		from: tx.from.to_checksum(None),
		to: tx.to.map(|to| to.to_checksum(None)),
		amount: tx.value.to_string(),
		height,
	}
}

/// Transaction summaries are only included when `view_tx` is set.
pub(crate) fn block(block: &Block, view_tx: bool) -> BlockResponse {
	let height = block.header.number;
	let transactions = if view_tx {
		block
			.transactions
			.iter()
			.map(|tx| block_transaction(tx, height))
			.collect()
	} else {
		Vec::new()
	};
	BlockResponse {
		height,
		hash: block.hash().to_string(),
		base_fee: block.header.base_fee_per_gas.map(|fee| fee.to_string()),
		transactions,
	}
}

pub(crate) fn explorer_transaction(tx: &ExplorerTransaction) -> TxMessage {
	TxMessage {
		hash: tx.hash.to_string(),
		from: tx.from.to_checksum(None),
		to: tx.to.map(|to| to.to_checksum(None)).unwrap_or_default(),
		contract_address: tx
			.contract_address
			.unwrap_or(Address::ZERO)
			.to_checksum(None),
		value: tx.value.to_string(),
		fee: tx.fee().to_string(),
		status: if tx.failed {
			TxStatus::Failed
		} else {
			TxStatus::Success
		},
		height: tx.block_number.to_string(),
		timestamp: Some(tx.timestamp),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use account_rpc::testing::sample_header;
	use alloy_primitives::{B256, B64, U256};

	#[test]
	fn test_header_fields() {
		let mut h = sample_header(100);
		h.nonce = B64::from(42u64.to_be_bytes());
		h.extra_data = vec![0xde, 0xad].into();

		let dto = header(&h);
		assert_eq!(dto.hash, h.hash_slow().to_string());
		assert_eq!(dto.number, "100");
		assert_eq!(dto.nonce, "42");
		assert_eq!(dto.extra, "0xdead");
		assert_eq!(dto.base_fee.as_deref(), Some("7000000000"));
		assert_eq!(dto.gas_limit, 30_000_000);
	}

	#[test]
	fn test_post_fork_fields_stay_absent() {
		let dto = header(&sample_header(1));
		assert_eq!(dto.withdrawals_hash, None);
		assert_eq!(dto.blob_gas_used, None);
		assert_eq!(dto.excess_blob_gas, None);
		assert_eq!(dto.parent_beacon_root, None);

		let mut cancun = sample_header(2);
		cancun.withdrawals_root = Some(B256::repeat_byte(4));
		cancun.blob_gas_used = Some(0);
		cancun.excess_blob_gas = Some(131072);
		cancun.parent_beacon_block_root = Some(B256::repeat_byte(5));
		let dto = header(&cancun);
		assert_eq!(dto.blob_gas_used, Some(0));
		assert_eq!(dto.excess_blob_gas, Some(131072));
		assert!(dto.withdrawals_hash.is_some());
	}

	#[test]
	fn test_block_without_transactions_view() {
		let block = Block {
			header: sample_header(7),
			transactions: vec![TransactionSummary {
				hash: B256::repeat_byte(9),
				from: Address::repeat_byte(1),
				to: None,
				value: U256::from(5u64),
			}],
		};
		assert!(super::block(&block, false).transactions.is_empty());

		let full = super::block(&block, true);
		assert_eq!(full.height, 7);
		assert_eq!(full.transactions.len(), 1);
		assert_eq!(full.transactions[0].to, None);
		assert_eq!(full.transactions[0].amount, "5");
		assert_eq!(full.transactions[0].height, 7);
	}
}
