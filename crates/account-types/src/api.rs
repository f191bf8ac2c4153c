//! Request and response types for the chain account API.
//!
//! Every capability takes a request naming the target `chain` (the network
//! name under which its adaptor is registered) and answers with an
//! [`ApiResponse`] envelope. The envelope always carries a [`ReturnCode`] and a
//! human readable message; the payload is only present on success.

use crate::BlockTag;
use serde::{Deserialize, Serialize};

/// Outcome classification carried by every response envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReturnCode {
	Success,
	/// Generic failure that does not fit a narrower class.
	Error,
	/// Node or explorer could not be reached, or a call timed out.
	Transport,
	/// The query was well formed but the entity does not exist.
	NotFound,
	/// The node returned data that does not match what was asked for.
	Integrity,
	/// Malformed request input: base64, JSON, hex or numeric strings.
	InvalidArgument,
	/// The recovered signer differs from the declared sender.
	Verification,
	/// Unknown network or a capability the network does not implement.
	Unsupported,
	/// An unexpected fault inside an adaptor.
	Internal,
}

impl ReturnCode {
	pub fn is_success(&self) -> bool {
		matches!(self, ReturnCode::Success)
	}
}

/// Uniform response envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
	pub code: ReturnCode,
	pub msg: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub data: Option<T>,
}

impl<T> ApiResponse<T> {
	/// Wraps a successful payload.
	pub fn success(data: T) -> Self {
		Self {
			code: ReturnCode::Success,
			msg: "success".to_string(),
			data: Some(data),
		}
	}

	/// Builds a failed envelope with no payload.
	pub fn error(code: ReturnCode, msg: impl Into<String>) -> Self {
		Self {
			code,
			msg: msg.into(),
			data: None,
		}
	}

	/// Envelope returned when no adaptor is registered for `chain`.
	pub fn unsupported_chain(chain: &str) -> Self {
		Self::error(
			ReturnCode::Unsupported,
			format!("unsupported operation: chain '{}' is not enabled", chain),
		)
	}
}

/// Implemented by every request so the dispatcher can route it.
pub trait ChainRequest {
	/// Network name used to select the adaptor.
	fn chain(&self) -> &str;
}

macro_rules! chain_requests {
	($($request:ty),* $(,)?) => {
		$(
			impl ChainRequest for $request {
				fn chain(&self) -> &str {
					&self.chain
				}
			}
		)*
	};
}

fn default_page() -> u32 {
	1
}

fn default_page_size() -> u32 {
	10
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SupportChainsRequest {
	pub chain: String,
	#[serde(default)]
	pub network: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConvertAddressRequest {
	pub chain: String,
	#[serde(default)]
	pub network: String,
	/// Hex encoded compressed (33 byte) or uncompressed (65 byte) public key.
	pub public_key: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidAddressRequest {
	pub chain: String,
	#[serde(default)]
	pub network: String,
	pub address: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BlockNumberRequest {
	pub chain: String,
	#[serde(default)]
	pub height: BlockTag,
	/// Include transaction summaries in the response.
	#[serde(default)]
	pub view_tx: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BlockHashRequest {
	pub chain: String,
	pub hash: String,
	#[serde(default)]
	pub view_tx: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BlockHeaderNumberRequest {
	pub chain: String,
	#[serde(default)]
	pub network: String,
	#[serde(default)]
	pub height: BlockTag,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BlockHeaderHashRequest {
	pub chain: String,
	#[serde(default)]
	pub network: String,
	pub hash: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BlockByRangeRequest {
	pub chain: String,
	#[serde(default)]
	pub network: String,
	/// First height, inclusive.
	pub start: u64,
	/// Last height, inclusive.
	pub end: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccountRequest {
	pub chain: String,
	#[serde(default)]
	pub network: String,
	pub address: String,
	/// Token contract; absent or zero means the native asset.
	#[serde(default)]
	pub contract_address: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeeRequest {
	pub chain: String,
	#[serde(default)]
	pub network: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SendTxRequest {
	pub chain: String,
	#[serde(default)]
	pub network: String,
	/// `0x`-prefixed signed transaction bytes.
	pub raw_tx: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TxAddressRequest {
	pub chain: String,
	#[serde(default)]
	pub network: String,
	pub address: String,
	#[serde(default)]
	pub contract_address: Option<String>,
	#[serde(default = "default_page")]
	pub page: u32,
	#[serde(default = "default_page_size")]
	pub page_size: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TxHashRequest {
	pub chain: String,
	#[serde(default)]
	pub network: String,
	pub hash: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UnsignTransactionRequest {
	pub chain: String,
	#[serde(default)]
	pub network: String,
	/// Base64 encoded JSON transfer intent.
	pub base64_tx: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SignedTransactionRequest {
	pub chain: String,
	#[serde(default)]
	pub network: String,
	/// Base64 encoded JSON transfer intent, identical to the unsigned request.
	pub base64_tx: String,
	/// Hex encoded 65 byte `r || s || v` signature over the signing hash.
	pub signature: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DecodeTransactionRequest {
	pub chain: String,
	#[serde(default)]
	pub network: String,
	pub raw_tx: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VerifyTransactionRequest {
	pub chain: String,
	#[serde(default)]
	pub network: String,
	pub public_key: String,
	pub signature: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtraDataRequest {
	pub chain: String,
	#[serde(default)]
	pub network: String,
	pub address: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NftAddressRequest {
	pub chain: String,
	#[serde(default)]
	pub network: String,
	pub address: String,
	#[serde(default = "default_page")]
	pub page: u32,
	#[serde(default = "default_page_size")]
	pub page_size: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NftCollectionRequest {
	pub chain: String,
	#[serde(default)]
	pub network: String,
	pub contract_address: String,
	#[serde(default)]
	pub token_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NftDetailRequest {
	pub chain: String,
	#[serde(default)]
	pub network: String,
	pub contract_address: String,
	pub token_id: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NftHolderListRequest {
	pub chain: String,
	#[serde(default)]
	pub network: String,
	pub contract_address: String,
	#[serde(default)]
	pub token_id: Option<String>,
	#[serde(default = "default_page")]
	pub page: u32,
	#[serde(default = "default_page_size")]
	pub page_size: u32,
}

chain_requests!(
	SupportChainsRequest,
	ConvertAddressRequest,
	ValidAddressRequest,
	BlockNumberRequest,
	BlockHashRequest,
	BlockHeaderNumberRequest,
	BlockHeaderHashRequest,
	BlockByRangeRequest,
	AccountRequest,
	FeeRequest,
	SendTxRequest,
	TxAddressRequest,
	TxHashRequest,
	UnsignTransactionRequest,
	SignedTransactionRequest,
	DecodeTransactionRequest,
	VerifyTransactionRequest,
	ExtraDataRequest,
	NftAddressRequest,
	NftCollectionRequest,
	NftDetailRequest,
	NftHolderListRequest,
);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupportChainsResponse {
	pub support: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConvertAddressResponse {
	/// EIP-55 checksummed address.
	pub address: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidAddressResponse {
	pub valid: bool,
}

/// Lightweight transaction summary inside a block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockTransaction {
	pub hash: String,
	pub from: String,
	/// Absent for contract creation.
	pub to: Option<String>,
	/// Value in wei as a decimal string.
	pub amount: String,
	pub height: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockResponse {
	pub height: u64,
	pub hash: String,
	pub base_fee: Option<String>,
	#[serde(default)]
	pub transactions: Vec<BlockTransaction>,
}

/// Block header with every field rendered as a string.
///
/// Post-fork fields are `None` when the node omits them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockHeader {
	pub hash: String,
	pub parent_hash: String,
	pub uncle_hash: String,
	pub coin_base: String,
	pub root: String,
	pub tx_hash: String,
	pub receipt_hash: String,
	pub difficulty: String,
	pub number: String,
	pub gas_limit: u64,
	pub gas_used: u64,
	pub time: u64,
	/// `0x`-prefixed hex of the extra data field.
	pub extra: String,
	pub mix_digest: String,
	/// Block nonce as a decimal string.
	pub nonce: String,
	pub base_fee: Option<String>,
	pub withdrawals_hash: Option<String>,
	pub blob_gas_used: Option<u64>,
	pub excess_blob_gas: Option<u64>,
	pub parent_beacon_root: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockHeaderResponse {
	pub block_header: BlockHeader,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockByRangeResponse {
	pub block_headers: Vec<BlockHeader>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountResponse {
	pub account_number: String,
	/// Next nonce for the address.
	pub sequence: String,
	/// Balance in the smallest unit of the asset, decimal.
	pub balance: String,
}

/// One fee suggestion, both values in wei.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeeTier {
	pub gas_price: String,
	pub priority_fee: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeeResponse {
	pub gas_price: String,
	pub priority_fee: String,
	pub slow_fee: FeeTier,
	pub normal_fee: FeeTier,
	pub fast_fee: FeeTier,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SendTxResponse {
	pub tx_hash: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TxStatus {
	Success,
	Failed,
	Pending,
}

/// Transaction detail as returned by history and lookup calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TxMessage {
	pub hash: String,
	pub from: String,
	pub to: String,
	/// Token contract for token transfers, zero address for native ones.
	pub contract_address: String,
	pub value: String,
	pub fee: String,
	pub status: TxStatus,
	pub height: String,
	#[serde(default)]
	pub timestamp: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TxAddressResponse {
	pub tx: Vec<TxMessage>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TxHashResponse {
	pub tx: TxMessage,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnsignTransactionResponse {
	/// Signing hash the external signer must sign.
	pub un_sign_tx: String,
	/// Typed unsigned payload, `0x02 || rlp(fields)`.
	pub payload: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignedTransactionResponse {
	/// Broadcast-ready raw transaction.
	pub signed_tx: String,
	pub tx_hash: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecodeTransactionResponse {
	pub base64_tx: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerifyTransactionResponse {
	pub verify: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtraDataResponse {
	pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NftAsset {
	pub contract_address: String,
	pub token_id: String,
	pub amount: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NftAddressResponse {
	pub list: Vec<NftAsset>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NftCollectionResponse {
	pub list: Vec<NftAsset>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NftDetailResponse {
	pub contract_address: String,
	pub token_id: String,
	pub owner: String,
	pub token_uri: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NftHolderListResponse {
	pub holders: Vec<String>,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_envelope_serialization() {
		let ok = ApiResponse::success(SupportChainsResponse { support: true });
		let json = serde_json::to_value(&ok).unwrap();
		assert_eq!(json["code"], "success");
		assert_eq!(json["data"]["support"], true);

		let err: ApiResponse<SupportChainsResponse> = ApiResponse::unsupported_chain("Solana");
		let json = serde_json::to_value(&err).unwrap();
		assert_eq!(json["code"], "unsupported");
		assert!(json.get("data").is_none());
		assert!(json["msg"].as_str().unwrap().contains("Solana"));
	}

	#[test]
	fn test_request_defaults() {
		let req: TxAddressRequest =
			serde_json::from_str(r#"{"chain":"Ethereum","address":"0xabc"}"#).unwrap();
		assert_eq!(req.chain(), "Ethereum");
		assert_eq!(req.page, 1);
		assert_eq!(req.page_size, 10);
		assert!(req.contract_address.is_none());

		let req: BlockHeaderNumberRequest =
			serde_json::from_str(r#"{"chain":"Ethereum","height":"finalized"}"#).unwrap();
		assert_eq!(req.height, BlockTag::Finalized);
	}
}
