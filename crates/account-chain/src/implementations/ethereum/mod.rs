//! Ethereum adaptor.
//!
//! Node queries go through [`EthClient`]; address history and token balances
//! go to the explorer. Transaction construction is delegated to the
//! [`crate::transaction`] pipeline and never touches the network.

mod convert;

use crate::address::{is_valid_address, public_key_to_address};
use crate::explorer::{EtherscanClient, ExplorerInterface, TxListKind, TxListQuery};
use crate::transaction::{self, erc20};
use crate::{AdaptorFactory, ChainAdaptor, ChainError};
use account_config::Config;
use account_rpc::{AccountKind, BatchMode, Endpoint, EthClient, RetryPolicy};
use account_types::*;
use alloy_consensus::{SignableTransaction, Transaction as _};
use alloy_primitives::{Address, B256, U256};
use async_trait::async_trait;
use futures::FutureExt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{error, info};

/// Key of the node entry under `wallet_node`.
const NODE_KEY: &str = "eth";

/// Slow, normal and fast tiers as multiples of the node suggestion.
const FEE_MULTIPLIERS: [u64; 3] = [1, 2, 3];

/// Chain adaptor for Ethereum mainnet and EVM networks sharing its RPC.
///
/// Live reads and broadcasts go to the node through [`EthClient`]; address
/// history and token balances come from the explorer.
pub struct EthereumAdaptor {
	client: EthClient,
	explorer: Arc<dyn ExplorerInterface>,
}

fn parse_address(field: &str, value: &str) -> Result<Address, ChainError> {
	Address::from_str(value.trim())
		.map_err(|_| ChainError::InvalidArgument(format!("invalid {}: {:?}", field, value)))
}

fn parse_hash(value: &str) -> Result<B256, ChainError> {
	B256::from_str(value.trim())
		.map_err(|_| ChainError::InvalidArgument(format!("invalid hash: {:?}", value)))
}

/// `None` for the native asset: absent, empty, `none`, `0x00` or the zero address.
fn token_contract(contract_address: Option<&str>) -> Result<Option<Address>, ChainError> {
	match contract_address {
		None => Ok(None),
		Some(contract) if is_zero_address(contract) => Ok(None),
		Some(contract) => parse_address("contract address", contract).map(Some),
	}
}

fn fee_tier(gas_price: U256, priority_fee: U256, multiplier: u64) -> FeeTier {
	let factor = U256::from(multiplier);
	FeeTier {
		gas_price: gas_price.saturating_mul(factor).to_string(),
		priority_fee: priority_fee.saturating_mul(factor).to_string(),
	}
}

impl EthereumAdaptor {
	/// Composes a connected client with an explorer. See [`create_adaptor`]
	/// for building both from configuration.
	pub fn new(client: EthClient, explorer: Arc<dyn ExplorerInterface>) -> Self {
		Self { client, explorer }
	}
}

#[async_trait]
impl ChainAdaptor for EthereumAdaptor {
	async fn get_support_chains(
		&self,
		_req: &SupportChainsRequest,
	) -> Result<SupportChainsResponse, ChainError> {
		Ok(SupportChainsResponse { support: true })
	}

	async fn convert_address(
		&self,
		req: &ConvertAddressRequest,
	) -> Result<ConvertAddressResponse, ChainError> {
		let address = public_key_to_address(&req.public_key)?;
		Ok(ConvertAddressResponse {
			address: address.to_checksum(None),
		})
	}

	async fn valid_address(
		&self,
		req: &ValidAddressRequest,
	) -> Result<ValidAddressResponse, ChainError> {
		Ok(ValidAddressResponse {
			valid: is_valid_address(&req.address),
		})
	}

	async fn get_block_by_number(
		&self,
		req: &BlockNumberRequest,
	) -> Result<BlockResponse, ChainError> {
		let block = self.client.block_by_number(req.height).await?;
		Ok(convert::block(&block, req.view_tx))
	}

	async fn get_block_by_hash(
		&self,
		req: &BlockHashRequest,
	) -> Result<BlockResponse, ChainError> {
		let block = self.client.block_by_hash(parse_hash(&req.hash)?).await?;
		Ok(convert::block(&block, req.view_tx))
	}

	async fn get_block_header_by_number(
		&self,
		req: &BlockHeaderNumberRequest,
	) -> Result<BlockHeaderResponse, ChainError> {
		let header = self.client.header_by_number(req.height).await?;
		Ok(BlockHeaderResponse {
			block_header: convert::header(&header),
		})
	}

	async fn get_block_header_by_hash(
		&self,
		req: &BlockHeaderHashRequest,
	) -> Result<BlockHeaderResponse, ChainError> {
		let header = self.client.header_by_hash(parse_hash(&req.hash)?).await?;
		Ok(BlockHeaderResponse {
			block_header: convert::header(&header),
		})
	}

	async fn get_block_header_by_range(
		&self,
		req: &BlockByRangeRequest,
	) -> Result<BlockByRangeResponse, ChainError> {
		let headers = self.client.headers_by_range(req.start, req.end).await?;
		Ok(BlockByRangeResponse {
			block_headers: headers.iter().map(convert::header).collect(),
		})
	}

	async fn get_account(&self, req: &AccountRequest) -> Result<AccountResponse, ChainError> {
		let address = parse_address("address", &req.address)?;
		let contract = token_contract(req.contract_address.as_deref())?;

		let nonce = self.client.nonce(address).await?;
		let balance = match contract {
			None => self.client.balance(address).await?,
			Some(contract) => self.explorer.token_balance(contract, address).await?,
		};

		Ok(AccountResponse {
			account_number: "0".to_string(),
			sequence: nonce.to_string(),
			balance: balance.to_string(),
		})
	}

	async fn get_fee(&self, _req: &FeeRequest) -> Result<FeeResponse, ChainError> {
		let gas_price = self.client.suggested_gas_price().await?;
		let priority_fee = self.client.suggested_priority_fee().await?;
		let [slow, normal, fast] =
			FEE_MULTIPLIERS.map(|multiplier| fee_tier(gas_price, priority_fee, multiplier));

		Ok(FeeResponse {
			gas_price: gas_price.to_string(),
			priority_fee: priority_fee.to_string(),
			slow_fee: slow,
			normal_fee: normal,
			fast_fee: fast,
		})
	}

	async fn send_tx(&self, req: &SendTxRequest) -> Result<SendTxResponse, ChainError> {
		let raw_tx = with_0x_prefix(req.raw_tx.trim());
		match hex::decode(without_0x_prefix(&raw_tx)) {
			Ok(bytes) if !bytes.is_empty() => {},
			_ => {
				return Err(ChainError::InvalidArgument(
					"raw transaction must be non-empty hex".to_string(),
				))
			},
		}
		let hash = self.client.submit_raw_transaction(&raw_tx).await?;
		info!(tx_hash = %hash, "Submitted transaction");
		Ok(SendTxResponse {
			tx_hash: hash.to_string(),
		})
	}

	async fn get_tx_by_address(
		&self,
		req: &TxAddressRequest,
	) -> Result<TxAddressResponse, ChainError> {
		let address = parse_address("address", &req.address)?;
		let kind = match token_contract(req.contract_address.as_deref())? {
			None => TxListKind::Native,
			Some(contract) => TxListKind::Token { contract },
		};
		let query = TxListQuery {
			address,
			kind,
			page: req.page,
			page_size: req.page_size,
		};

		let txs = self.explorer.transactions(&query).await?;
		Ok(TxAddressResponse {
			tx: txs.iter().map(convert::explorer_transaction).collect(),
		})
	}

	async fn get_tx_by_hash(&self, req: &TxHashRequest) -> Result<TxHashResponse, ChainError> {
		let hash = parse_hash(&req.hash)?;
		let tx = self.client.transaction_by_hash(hash).await?;
		let receipt = match self.client.transaction_receipt(hash).await {
			Ok(receipt) => Some(receipt),
			Err(account_rpc::ClientError::NotFound(_)) => None,
			Err(e) => return Err(e.into()),
		};

		// Token transfers name the contract as `to`; the real recipient and
		// amount live in the call data.
		let (to, value, token) = match tx.inner.to() {
			None => (String::new(), tx.inner.value(), Address::ZERO),
			Some(target) => {
				let transfer = match self.client.code(target).await? {
					AccountKind::Contract => erc20::decode_transfer(tx.inner.input()),
					AccountKind::ExternallyOwned => None,
				};
				match transfer {
					Some((recipient, amount)) => (recipient.to_checksum(None), amount, target),
					None => (target.to_checksum(None), tx.inner.value(), Address::ZERO),
				}
			},
		};

		// Without a receipt the fee is the most the sender could pay.
		let fee = match &receipt {
			Some(r) => U256::from(r.gas_used).saturating_mul(U256::from(r.effective_gas_price)),
			None => U256::from(tx.inner.max_fee_per_gas())
				.saturating_mul(U256::from(tx.inner.gas_limit())),
		};
		let status = match &receipt {
			Some(r) if r.status() => TxStatus::Success,
			Some(_) => TxStatus::Failed,
			None => TxStatus::Pending,
		};
		let height = receipt
			.as_ref()
			.and_then(|r| r.block_number)
			.or(tx.block_number)
			.map(|n| n.to_string())
			.unwrap_or_default();

		Ok(TxHashResponse {
			tx: TxMessage {
				hash: tx.inner.tx_hash().to_string(),
				from: tx.from.to_checksum(None),
				to,
				contract_address: token.to_checksum(None),
				value: value.to_string(),
				fee: fee.to_string(),
				status,
				height,
				timestamp: None,
			},
		})
	}

	async fn build_unsigned_transaction(
		&self,
		req: &UnsignTransactionRequest,
	) -> Result<UnsignTransactionResponse, ChainError> {
		let (intent, prepared) = transaction::prepare(&req.base64_tx)?;
		info!(
			chain_id = intent.chain_id,
			nonce = intent.nonce,
			from = %intent.from,
			signing_hash = %prepared.payload,
			"Built unsigned transaction"
		);
		Ok(UnsignTransactionResponse {
			un_sign_tx: prepared.payload.to_string(),
			payload: format!("0x{}", hex::encode(prepared.unsigned.encoded_for_signing())),
		})
	}

	async fn build_signed_transaction(
		&self,
		req: &SignedTransactionRequest,
	) -> Result<SignedTransactionResponse, ChainError> {
		let verified = transaction::sign_and_verify(&req.base64_tx, &req.signature)
			.inspect_err(|e| error!(error = %e, "Signed transaction rejected"))?;
		info!(tx_hash = %verified.hash, sender = %verified.sender, "Built signed transaction");
		Ok(SignedTransactionResponse {
			signed_tx: format!("0x{}", hex::encode(&verified.raw)),
			tx_hash: verified.hash.to_string(),
		})
	}

	fn close(&self) {
		self.client.close();
	}
}

/// Dials the `eth` node and builds the adaptor.
pub fn create_adaptor(
	config: &Config,
) -> futures::future::BoxFuture<'_, Result<Arc<dyn ChainAdaptor>, ChainError>> {
	async move {
		let node = config.node(NODE_KEY)?;
		let endpoint = Endpoint {
			url: node.rpc_url.clone(),
			user: node.rpc_user.clone().filter(|u| !u.is_empty()),
			password: node.rpc_pass.clone().filter(|p| !p.is_empty()),
		};
		let policy = RetryPolicy::dial(node.dial_attempts, node.dial_timeout());
		let batch_mode = BatchMode::from_limit(node.batch_limit, node.batch_workers);

		let client = EthClient::connect(endpoint, &policy, node.request_timeout(), batch_mode)
			.await?
			.with_max_range(node.max_range);
		let explorer = EtherscanClient::from_node(node)?;
		info!(chain = Registry::NAME, ?batch_mode, "Ethereum adaptor ready");

		let adaptor: Arc<dyn ChainAdaptor> = Arc::new(EthereumAdaptor::new(client, Arc::new(explorer)));
		Ok(adaptor)
	}
	.boxed()
}

/// Registry for the Ethereum adaptor.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "Ethereum";
	type Factory = AdaptorFactory;

	fn factory() -> Self::Factory {
		create_adaptor
	}
}

impl crate::AdaptorRegistry for Registry {}
