//! EIP-1559 (type 2) transactions built on `alloy-consensus`.

use super::erc20::encode_transfer;
use super::intent::{ClassifiedIntent, TransferKind};
use super::TxError;
use alloy_consensus::{Signed, TxEip1559};
use alloy_primitives::{Address, Bytes, TxKind, B256, U256};

/// Native transfers pay `amount` to the recipient. Token transfers call the
/// contract with zero value and `transfer(recipient, amount)`.
pub fn unsigned_transaction(intent: &ClassifiedIntent) -> TxEip1559 {
	let (to, value, input) = match intent.kind {
		TransferKind::Native => (intent.to, intent.amount, Bytes::new()),
		TransferKind::Token { contract } => {
			(contract, U256::ZERO, encode_transfer(intent.to, intent.amount))
		},
	};
	TxEip1559 {
		chain_id: intent.chain_id,
		nonce: intent.nonce,
		gas_limit: intent.gas_limit,
		max_fee_per_gas: intent.max_fee_per_gas,
		max_priority_fee_per_gas: intent.max_priority_fee_per_gas,
		to: TxKind::Call(to),
		value,
		access_list: Default::default(),
		input,
	}
}

/// A signed transaction whose signer matched the expected sender.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedTransaction {
	/// `0x02 || rlp(fields, y_parity, r, s)`, ready for broadcast.
	pub raw: Bytes,
	pub hash: B256,
	pub sender: Address,
}

/// Recovers the signer of `signed` and requires it to be `expected`.
///
/// The broadcast encoding is produced only after the check passes.
pub fn verify(signed: &Signed<TxEip1559>, expected: Address) -> Result<VerifiedTransaction, TxError> {
	let recovered = signed
		.recover_signer()
		.map_err(|e| TxError::Signature(format!("recovery failed: {}", e)))?;
	if recovered != expected {
		return Err(TxError::SenderMismatch {
			expected,
			recovered,
		});
	}

	let mut raw = Vec::with_capacity(signed.eip2718_encoded_length());
	signed.eip2718_encode(&mut raw);
	Ok(VerifiedTransaction {
		raw: raw.into(),
		hash: *signed.hash(),
		sender: recovered,
	})
}
