//! ERC-20 `transfer(address,uint256)` call data.

use alloy_primitives::{Address, Bytes, U256};

/// `keccak256("transfer(address,uint256)")[..4]`
pub const TRANSFER_SELECTOR: [u8; 4] = [0xa9, 0x05, 0x9c, 0xbb];

/// Selector plus two 32-byte words.
pub const TRANSFER_CALLDATA_LEN: usize = 4 + 32 + 32;

/// Selector, left-padded recipient, left-padded amount.
pub fn encode_transfer(recipient: Address, amount: U256) -> Bytes {
	let mut data = Vec::with_capacity(TRANSFER_CALLDATA_LEN);
	data.extend_from_slice(&TRANSFER_SELECTOR);
	data.extend_from_slice(&[0u8; 12]);
	data.extend_from_slice(recipient.as_slice());
	data.extend_from_slice(&amount.to_be_bytes::<32>());
	Bytes::from(data)
}

/// Extracts recipient and amount from `transfer` call data.
///
/// Returns `None` for anything that is not a `transfer` call. Trailing bytes
/// beyond the two arguments are ignored.
pub fn decode_transfer(input: &[u8]) -> Option<(Address, U256)> {
	if input.len() < TRANSFER_CALLDATA_LEN || input[..4] != TRANSFER_SELECTOR {
		return None;
	}
	let recipient = Address::from_slice(&input[16..36]);
	let amount = U256::from_be_slice(&input[36..68]);
	Some((recipient, amount))
}
