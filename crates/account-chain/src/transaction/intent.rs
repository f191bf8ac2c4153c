//! Transfer intents.
//!
//! An intent arrives as base64 encoded JSON with every amount written as a
//! decimal string. Decoding yields a [`TransferIntent`]; classification
//! validates every field and decides between a native and a token transfer.

use super::TxError;
use account_types::is_zero_address;
use alloy_primitives::{Address, U256};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Raw intent exactly as submitted by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferIntent {
	pub chain_id: String,
	pub nonce: u64,
	pub from_address: String,
	pub to_address: String,
	pub gas_limit: u64,
	pub max_fee_per_gas: String,
	pub max_priority_fee_per_gas: String,
	pub amount: String,
	/// Token contract. Empty, `0x00` or the zero address mean native.
	#[serde(default)]
	pub contract_address: Option<String>,
}

/// What the transaction moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferKind {
	Native,
	Token { contract: Address },
}

/// An intent whose fields have all been parsed and checked.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedIntent {
	pub chain_id: u64,
	pub nonce: u64,
	pub from: Address,
	pub to: Address,
	pub gas_limit: u64,
	pub max_fee_per_gas: u128,
	pub max_priority_fee_per_gas: u128,
	pub amount: U256,
	pub kind: TransferKind,
}

/// Parses a non-negative base-10 integer, rejecting signs, whitespace,
/// prefixes and empty input.
fn parse_decimal<T: FromStr>(field: &'static str, value: &str) -> Result<T, TxError> {
	let invalid = || TxError::InvalidNumber {
		field,
		value: value.to_string(),
	};
	if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
		return Err(invalid());
	}
	value.parse::<T>().map_err(|_| invalid())
}

fn parse_address(field: &'static str, value: &str) -> Result<Address, TxError> {
	Address::from_str(value.trim()).map_err(|_| TxError::InvalidAddress {
		field,
		value: value.to_string(),
	})
}

impl TransferIntent {
	/// Decodes base64 then JSON.
	pub fn from_base64(encoded: &str) -> Result<Self, TxError> {
		let bytes = STANDARD
			.decode(encoded.trim())
			.map_err(|e| TxError::Decode(format!("invalid base64: {}", e)))?;
		serde_json::from_slice(&bytes).map_err(|e| TxError::Decode(format!("invalid intent: {}", e)))
	}

	/// Encodes the intent the way callers submit it.
	pub fn to_base64(&self) -> Result<String, TxError> {
		let json = serde_json::to_vec(self).map_err(|e| TxError::Decode(e.to_string()))?;
		Ok(STANDARD.encode(json))
	}

	/// Validates every field and decides the transfer kind.
	pub fn classify(&self) -> Result<ClassifiedIntent, TxError> {
		let kind = match self.contract_address.as_deref() {
			None => TransferKind::Native,
			Some(contract) if is_zero_address(contract) => TransferKind::Native,
			Some(contract) => TransferKind::Token {
				contract: parse_address("contract", contract)?,
			},
		};

		Ok(ClassifiedIntent {
			chain_id: parse_decimal("chain_id", &self.chain_id)?,
			nonce: self.nonce,
			from: parse_address("from", &self.from_address)?,
			to: parse_address("to", &self.to_address)?,
			gas_limit: self.gas_limit,
			max_fee_per_gas: parse_decimal("max_fee_per_gas", &self.max_fee_per_gas)?,
			max_priority_fee_per_gas: parse_decimal(
				"max_priority_fee_per_gas",
				&self.max_priority_fee_per_gas,
			)?,
			amount: parse_decimal("amount", &self.amount)?,
			kind,
		})
	}
}
