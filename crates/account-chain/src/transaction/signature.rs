//! Parsing of externally produced signatures.

use super::TxError;
use account_types::without_0x_prefix;
use alloy_primitives::PrimitiveSignature;

/// Length of `r || s || v`.
pub const SIGNATURE_LEN: usize = 65;

/// Parses 65 bytes of hex. `v` may be `0`/`1` or the legacy `27`/`28`;
/// chain-id encoded values are rejected since typed transactions carry a
/// bare parity.
pub fn parse_signature(signature: &str) -> Result<PrimitiveSignature, TxError> {
	let bytes = hex::decode(without_0x_prefix(signature.trim()))
		.map_err(|e| TxError::Signature(format!("invalid hex: {}", e)))?;
	if bytes.len() != SIGNATURE_LEN {
		return Err(TxError::Signature(format!(
			"expected {} bytes, got {}",
			SIGNATURE_LEN,
			bytes.len()
		)));
	}
	match bytes[64] {
		0 | 1 | 27 | 28 => {},
		v => return Err(TxError::Signature(format!("invalid recovery id {}", v))),
	}
	PrimitiveSignature::from_raw(&bytes).map_err(|e| TxError::Signature(e.to_string()))
}
