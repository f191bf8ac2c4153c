//! Chain adaptors for the account service.
//!
//! A [`ChainAdaptor`] implements the full account/transaction capability set
//! for one network. Adaptors are built from configuration through the
//! factories returned by [`get_all_implementations`] and are driven by the
//! service dispatcher, which never sees chain-specific types.

use account_config::{Config, ConfigError};
use account_rpc::ClientError;
use account_types::*;
use async_trait::async_trait;
use futures::future::BoxFuture;
use std::sync::Arc;
use thiserror::Error;

pub mod address;
pub mod explorer;
pub mod transaction;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

/// Re-export implementations
pub mod implementations {
	pub mod ethereum;
}

use address::AddressError;
use explorer::ExplorerError;
use transaction::TxError;

/// Errors surfaced at the adaptor boundary.
///
/// Each variant maps onto one [`ReturnCode`]; the dispatcher turns them into
/// error envelopes with the message preserved.
#[derive(Debug, Error)]
pub enum ChainError {
	/// Dial or call failure, including timeouts.
	#[error("Transport error: {0}")]
	Transport(String),
	#[error("Not found: {0}")]
	NotFound(String),
	/// Data returned for a by-hash lookup does not hash to the request.
	#[error("Integrity error: {0}")]
	Integrity(String),
	/// Malformed input, rejected before any chain interaction.
	#[error("Invalid argument: {0}")]
	InvalidArgument(String),
	#[error("Verification failed: {0}")]
	Verification(String),
	#[error("unsupported operation: {0}")]
	Unsupported(String),
	#[error("Internal error: {0}")]
	Internal(String),
	#[error("Configuration error: {0}")]
	Configuration(String),
}

impl ChainError {
	/// Envelope code reported for this error.
	pub fn code(&self) -> ReturnCode {
		match self {
			ChainError::Transport(_) => ReturnCode::Transport,
			ChainError::NotFound(_) => ReturnCode::NotFound,
			ChainError::Integrity(_) => ReturnCode::Integrity,
			ChainError::InvalidArgument(_) => ReturnCode::InvalidArgument,
			ChainError::Verification(_) => ReturnCode::Verification,
			ChainError::Unsupported(_) => ReturnCode::Unsupported,
			ChainError::Internal(_) => ReturnCode::Internal,
			ChainError::Configuration(_) => ReturnCode::Error,
		}
	}

	fn not_implemented(operation: &str) -> Self {
		ChainError::Unsupported(format!("{} is not implemented", operation))
	}
}

impl From<ClientError> for ChainError {
	fn from(err: ClientError) -> Self {
		match err {
			ClientError::NotFound(what) => ChainError::NotFound(what),
			ClientError::HeaderMismatch { .. } => ChainError::Integrity(err.to_string()),
			ClientError::InvalidArgument(msg) => ChainError::InvalidArgument(msg),
			ClientError::Rpc(_) | ClientError::Query { .. } | ClientError::Decode(_) => {
				ChainError::Transport(err.to_string())
			},
		}
	}
}

impl From<TxError> for ChainError {
	fn from(err: TxError) -> Self {
		match err {
			TxError::SenderMismatch { .. } | TxError::Signature(_) => {
				ChainError::Verification(err.to_string())
			},
			TxError::Decode(_) | TxError::InvalidNumber { .. } | TxError::InvalidAddress { .. } => {
				ChainError::InvalidArgument(err.to_string())
			},
		}
	}
}

impl From<AddressError> for ChainError {
	fn from(err: AddressError) -> Self {
		ChainError::InvalidArgument(err.to_string())
	}
}

impl From<ExplorerError> for ChainError {
	fn from(err: ExplorerError) -> Self {
		ChainError::Transport(err.to_string())
	}
}

impl From<ConfigError> for ChainError {
	fn from(err: ConfigError) -> Self {
		ChainError::Configuration(err.to_string())
	}
}

/// Capability set every network implements.
///
/// Operations the network cannot meaningfully support keep the default
/// implementation, which fails with [`ChainError::Unsupported`] rather than
/// returning an empty success.
#[async_trait]
pub trait ChainAdaptor: Send + Sync {
	async fn get_support_chains(
		&self,
		req: &SupportChainsRequest,
	) -> Result<SupportChainsResponse, ChainError>;

	/// Derives the address owning a hex encoded public key.
	async fn convert_address(
		&self,
		req: &ConvertAddressRequest,
	) -> Result<ConvertAddressResponse, ChainError>;

	async fn valid_address(
		&self,
		req: &ValidAddressRequest,
	) -> Result<ValidAddressResponse, ChainError>;

	async fn get_block_by_number(
		&self,
		req: &BlockNumberRequest,
	) -> Result<BlockResponse, ChainError>;

	async fn get_block_by_hash(&self, req: &BlockHashRequest)
		-> Result<BlockResponse, ChainError>;

	async fn get_block_header_by_number(
		&self,
		req: &BlockHeaderNumberRequest,
	) -> Result<BlockHeaderResponse, ChainError>;

	async fn get_block_header_by_hash(
		&self,
		req: &BlockHeaderHashRequest,
	) -> Result<BlockHeaderResponse, ChainError>;

	/// Headers for every height in `start..=end`, in ascending order.
	async fn get_block_header_by_range(
		&self,
		req: &BlockByRangeRequest,
	) -> Result<BlockByRangeResponse, ChainError>;

	/// Nonce and balance, optionally for a token contract.
	async fn get_account(&self, req: &AccountRequest) -> Result<AccountResponse, ChainError>;

	async fn get_fee(&self, req: &FeeRequest) -> Result<FeeResponse, ChainError>;

	async fn send_tx(&self, req: &SendTxRequest) -> Result<SendTxResponse, ChainError>;

	async fn get_tx_by_address(
		&self,
		req: &TxAddressRequest,
	) -> Result<TxAddressResponse, ChainError>;

	async fn get_tx_by_hash(&self, req: &TxHashRequest) -> Result<TxHashResponse, ChainError>;

	/// Builds the unsigned payload and the hash an external signer must sign.
	async fn build_unsigned_transaction(
		&self,
		req: &UnsignTransactionRequest,
	) -> Result<UnsignTransactionResponse, ChainError>;

	/// Applies a signature and verifies the recovered sender.
	async fn build_signed_transaction(
		&self,
		req: &SignedTransactionRequest,
	) -> Result<SignedTransactionResponse, ChainError>;

	async fn decode_transaction(
		&self,
		_req: &DecodeTransactionRequest,
	) -> Result<DecodeTransactionResponse, ChainError> {
		Err(ChainError::not_implemented("decode_transaction"))
	}

	async fn verify_signed_transaction(
		&self,
		_req: &VerifyTransactionRequest,
	) -> Result<VerifyTransactionResponse, ChainError> {
		Err(ChainError::not_implemented("verify_signed_transaction"))
	}

	async fn get_extra_data(
		&self,
		_req: &ExtraDataRequest,
	) -> Result<ExtraDataResponse, ChainError> {
		Err(ChainError::not_implemented("get_extra_data"))
	}

	async fn get_nft_list_by_address(
		&self,
		_req: &NftAddressRequest,
	) -> Result<NftAddressResponse, ChainError> {
		Err(ChainError::not_implemented("get_nft_list_by_address"))
	}

	/// Releases the node connection. Idempotent.
	fn close(&self);
}

/// Type alias for adaptor factory functions.
///
/// Factories dial their node while constructing the adaptor, so they are
/// asynchronous.
pub type AdaptorFactory =
	for<'a> fn(&'a Config) -> BoxFuture<'a, Result<Arc<dyn ChainAdaptor>, ChainError>>;

/// Registry trait for adaptor implementations.
pub trait AdaptorRegistry: ImplementationRegistry<Factory = AdaptorFactory> {}

/// Get all registered adaptor implementations.
///
/// Returns `(network name, factory)` pairs. The dispatcher builds an adaptor
/// for every enabled network found here.
pub fn get_all_implementations() -> Vec<(&'static str, AdaptorFactory)> {
	use implementations::ethereum;

	vec![(ethereum::Registry::NAME, ethereum::Registry::factory())]
}
