//! Transaction engine.
//!
//! Every transaction moves through the same stages:
//! intent (base64 JSON) → [`ClassifiedIntent`] → unsigned [`TxEip1559`]
//! → [`Signed`] → [`VerifiedTransaction`]. Only the last stage exposes raw
//! bytes suitable for broadcast.

use alloy_consensus::{SignableTransaction, Signed, TxEip1559};
use alloy_primitives::{Address, B256};
use thiserror::Error;

pub mod eip1559;
pub mod erc20;
pub mod intent;
pub mod signature;

pub use eip1559::{unsigned_transaction, verify, VerifiedTransaction};
pub use intent::{ClassifiedIntent, TransferIntent, TransferKind};
pub use signature::parse_signature;

/// Failures of the transaction engine.
///
/// Intent problems and signature problems are kept apart so callers can
/// report them differently.
#[derive(Debug, Error)]
pub enum TxError {
	#[error("Decode error: {0}")]
	Decode(String),
	#[error("invalid {field}: {value:?} is not a decimal integer")]
	InvalidNumber { field: &'static str, value: String },
	#[error("invalid {field} address: {value:?}")]
	InvalidAddress { field: &'static str, value: String },
	#[error("Signature error: {0}")]
	Signature(String),
	#[error("sender address mismatch: expected {expected}, got {recovered}")]
	SenderMismatch { expected: Address, recovered: Address },
}

/// Unsigned transaction plus the hash the signer must sign.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedTransaction {
	pub unsigned: TxEip1559,
	pub payload: B256,
}

/// Decodes and classifies an intent, then builds its unsigned transaction.
pub fn prepare(base64_tx: &str) -> Result<(ClassifiedIntent, PreparedTransaction), TxError> {
	let intent = TransferIntent::from_base64(base64_tx)?.classify()?;
	let unsigned = unsigned_transaction(&intent);
	let payload = unsigned.signature_hash();
	Ok((intent, PreparedTransaction { unsigned, payload }))
}

/// Attaches `signature` to the intent's transaction and checks that it was
/// produced by the intent's sender.
pub fn sign_and_verify(base64_tx: &str, signature: &str) -> Result<VerifiedTransaction, TxError> {
	let (intent, prepared) = prepare(base64_tx)?;
	let signature = parse_signature(signature)?;
	let signed: Signed<TxEip1559> = prepared.unsigned.into_signed(signature);
	verify(&signed, intent.from)
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy_primitives::b256;
	use base64::{engine::general_purpose::STANDARD, Engine as _};

	const SIGNATURE: &str = "0x5eb0c7574c660c22a7b18a8d112b01cf173c2a4e0928435f1d0092893cca65307243e73d045421eb4caa9217495d879506efbfdf2cda3cacc68d5f553774653001";

	fn intent_json(from: &str) -> String {
		let json = serde_json::json!({
			"chain_id": "1",
			"nonce": 5,
			"from_address": from,
			"to_address": "0xf63948D0c77d161A491CD787403ac4222F4d9E55",
			"gas_limit": 21000,
			"max_fee_per_gas": "3000000000",
			"max_priority_fee_per_gas": "2000000000",
			"amount": "1000000000000000000",
			"contract_address": "0x00"
		});
		STANDARD.encode(json.to_string())
	}

	#[test]
	fn test_pipeline() {
		let encoded = intent_json("0x35096AD62E57e86032a3Bb35aDaCF2240d55421D");
		let (_, prepared) = prepare(&encoded).unwrap();
		assert_eq!(
			prepared.payload,
			b256!("544d3d35826114d3e7b69b0d31855c503e5876ba2f64b029652e35876bd31542")
		);

		let verified = sign_and_verify(&encoded, SIGNATURE).unwrap();
		assert_eq!(
			verified.hash,
			b256!("8cb10ae9780d2962e5abd36507d3ef41ff7cacbb12933bf58ad7aa058deb264d")
		);
	}

	#[test]
	fn test_wrong_sender_rejected() {
		let encoded = intent_json("0xf63948D0c77d161A491CD787403ac4222F4d9E55");
		let err = sign_and_verify(&encoded, SIGNATURE).unwrap_err();
		assert!(matches!(err, TxError::SenderMismatch { .. }));
		assert!(err.to_string().starts_with("sender address mismatch"));
	}

	#[test]
	fn test_number_errors_are_not_signature_errors() {
		let json = serde_json::json!({
			"chain_id": "1",
			"nonce": 5,
			"from_address": "0x35096AD62E57e86032a3Bb35aDaCF2240d55421D",
			"to_address": "0xf63948D0c77d161A491CD787403ac4222F4d9E55",
			"gas_limit": 21000,
			"max_fee_per_gas": "3 gwei",
			"max_priority_fee_per_gas": "2000000000",
			"amount": "1",
		});
		let encoded = STANDARD.encode(json.to_string());
		assert!(matches!(
			sign_and_verify(&encoded, SIGNATURE),
			Err(TxError::InvalidNumber { .. })
		));
	}
}
