//! Public key decompression and Ethereum address derivation.

use account_types::without_0x_prefix;
use alloy_primitives::{keccak256, Address};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use k256::PublicKey;
use thiserror::Error;

/// Malformed public key input.
#[derive(Debug, Error)]
pub enum AddressError {
	#[error("Invalid hex: {0}")]
	InvalidHex(String),
	/// Wrong length or prefix byte for a SEC1 point.
	#[error("invalid public key format: {len} bytes")]
	InvalidFormat { len: usize },
	/// Right shape, but not a point on secp256k1.
	#[error("invalid public key: not a curve point")]
	InvalidPoint,
}

/// Parses a 33-byte compressed (`0x02`/`0x03`) or 65-byte uncompressed
/// (`0x04`) secp256k1 point.
pub fn decompress_public_key(bytes: &[u8]) -> Result<PublicKey, AddressError> {
	match (bytes.len(), bytes.first()) {
		(33, Some(0x02 | 0x03)) | (65, Some(0x04)) => {
			PublicKey::from_sec1_bytes(bytes).map_err(|_| AddressError::InvalidPoint)
		},
		(len, _) => Err(AddressError::InvalidFormat { len }),
	}
}

/// Last 20 bytes of Keccak256 over the uncompressed X and Y coordinates.
pub fn derive_address(key: &PublicKey) -> Address {
	let point = key.to_encoded_point(false);
	let hash = keccak256(&point.as_bytes()[1..]);
	Address::from_slice(&hash[12..])
}

/// Hex public key to address, accepting an optional `0x` prefix.
pub fn public_key_to_address(public_key: &str) -> Result<Address, AddressError> {
	let bytes = hex::decode(without_0x_prefix(public_key.trim()))
		.map_err(|e| AddressError::InvalidHex(e.to_string()))?;
	let key = decompress_public_key(&bytes)?;
	Ok(derive_address(&key))
}

/// `0x` followed by exactly 40 hex digits. Checksums are not enforced.
pub fn is_valid_address(address: &str) -> bool {
	address.len() == 42
		&& address.starts_with("0x")
		&& address[2..].bytes().all(|b| b.is_ascii_hexdigit())
}
