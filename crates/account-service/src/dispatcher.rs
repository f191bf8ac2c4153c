//! Request routing across chain adaptors.
//!
//! The dispatcher owns one adaptor per enabled network and forwards each
//! request to the adaptor named by its `chain` field. Every outcome, including
//! an unknown network, an adaptor error or a panic inside an adaptor, comes
//! back as an [`ApiResponse`] envelope.

use account_chain::{AdaptorFactory, ChainAdaptor, ChainError};
use account_config::Config;
use account_types::*;
use futures::FutureExt;
use std::any::Any;
use std::collections::HashMap;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Routes requests to the adaptor registered for their network.
///
/// The registry is fixed after construction and only read afterwards.
pub struct Dispatcher {
	registry: HashMap<String, Arc<dyn ChainAdaptor>>,
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
	if let Some(msg) = payload.downcast_ref::<&str>() {
		msg.to_string()
	} else if let Some(msg) = payload.downcast_ref::<String>() {
		msg.clone()
	} else {
		"unknown panic".to_string()
	}
}

impl Dispatcher {
	/// Builds an adaptor for every configured network found in `factories`.
	///
	/// A network without a factory is skipped with a warning. A factory that
	/// fails aborts construction.
	pub async fn new(
		config: &Config,
		factories: &[(&'static str, AdaptorFactory)],
	) -> Result<Self, ChainError> {
		let mut registry = HashMap::new();
		for chain in &config.chains {
			let Some((name, factory)) = factories.iter().find(|(name, _)| *name == chain.as_str())
			else {
				let supported: Vec<_> = factories.iter().map(|(name, _)| *name).collect();
				warn!(chain = %chain, ?supported, "Unsupported chain in configuration, skipping");
				continue;
			};

			let adaptor = factory(config).await.map_err(|e| {
				error!(chain = %name, error = %e, "Failed to set up chain adaptor");
				e
			})?;
			info!(chain = %name, "Registered chain adaptor");
			registry.insert(name.to_string(), adaptor);
		}
		Ok(Self { registry })
	}

	/// Builds a dispatcher over already constructed adaptors.
	pub fn from_adaptors(
		adaptors: impl IntoIterator<Item = (String, Arc<dyn ChainAdaptor>)>,
	) -> Self {
		Self {
			registry: adaptors.into_iter().collect(),
		}
	}

	/// Registered network names, sorted.
	pub fn supported_chains(&self) -> Vec<String> {
		let mut chains: Vec<_> = self.registry.keys().cloned().collect();
		chains.sort();
		chains
	}

	/// Closes every adaptor.
	pub fn shutdown(&self) {
		for (chain, adaptor) in &self.registry {
			debug!(chain = %chain, "Closing chain adaptor");
			adaptor.close();
		}
	}

	/// Routes `req` to its adaptor and runs `handler` with panics contained.
	pub(crate) async fn dispatch<Req, Resp, F, Fut>(
		&self,
		method: &'static str,
		req: Req,
		handler: F,
	) -> ApiResponse<Resp>
	where
		Req: ChainRequest,
		F: FnOnce(Arc<dyn ChainAdaptor>, Req) -> Fut,
		Fut: Future<Output = Result<Resp, ChainError>>,
	{
		let chain = req.chain().to_string();
		let Some(adaptor) = self.registry.get(&chain).cloned() else {
			warn!(method, chain = %chain, "Request for unsupported chain");
			return ApiResponse::unsupported_chain(&chain);
		};
		debug!(method, chain = %chain, "Dispatching request");

		let outcome = AssertUnwindSafe(async move { handler(adaptor, req).await })
			.catch_unwind()
			.await;
		match outcome {
			Ok(Ok(resp)) => ApiResponse::success(resp),
			Ok(Err(e)) => {
				warn!(method, chain = %chain, code = ?e.code(), error = %e, "Request failed");
				ApiResponse::error(e.code(), e.to_string())
			},
			Err(payload) => {
				let msg = panic_message(payload.as_ref());
				error!(method, chain = %chain, panic = %msg, "Adaptor panicked");
				ApiResponse::error(ReturnCode::Internal, format!("internal error: {}", msg))
			},
		}
	}

	fn not_offered<T>(&self, chain: &str, method: &str) -> ApiResponse<T> {
		if !self.registry.contains_key(chain) {
			return ApiResponse::unsupported_chain(chain);
		}
		ApiResponse::error(
			ReturnCode::Unsupported,
			format!("unsupported operation: {} is not implemented", method),
		)
	}

	/// NFT collection lookups are not offered by any adaptor.
	pub async fn get_nft_collection(
		&self,
		req: NftCollectionRequest,
	) -> ApiResponse<NftCollectionResponse> {
		self.not_offered(req.chain(), "get_nft_collection")
	}

	pub async fn get_nft_detail(&self, req: NftDetailRequest) -> ApiResponse<NftDetailResponse> {
		self.not_offered(req.chain(), "get_nft_detail")
	}

	pub async fn get_nft_holder_list(
		&self,
		req: NftHolderListRequest,
	) -> ApiResponse<NftHolderListResponse> {
		self.not_offered(req.chain(), "get_nft_holder_list")
	}
}

/// One forwarding method per adaptor capability.
macro_rules! dispatch_methods {
	($($method:ident: $req:ty => $resp:ty),* $(,)?) => {
		impl Dispatcher {
			$(
				pub async fn $method(&self, req: $req) -> ApiResponse<$resp> {
					self.dispatch(stringify!($method), req, |adaptor, req| async move {
						adaptor.$method(&req).await
					})
					.await
				}
			)*
		}
	};
}

dispatch_methods!(
	get_support_chains: SupportChainsRequest => SupportChainsResponse,
	convert_address: ConvertAddressRequest => ConvertAddressResponse,
	valid_address: ValidAddressRequest => ValidAddressResponse,
	get_block_by_number: BlockNumberRequest => BlockResponse,
	get_block_by_hash: BlockHashRequest => BlockResponse,
	get_block_header_by_number: BlockHeaderNumberRequest => BlockHeaderResponse,
	get_block_header_by_hash: BlockHeaderHashRequest => BlockHeaderResponse,
	get_block_header_by_range: BlockByRangeRequest => BlockByRangeResponse,
	get_account: AccountRequest => AccountResponse,
	get_fee: FeeRequest => FeeResponse,
	send_tx: SendTxRequest => SendTxResponse,
	get_tx_by_address: TxAddressRequest => TxAddressResponse,
	get_tx_by_hash: TxHashRequest => TxHashResponse,
	build_unsigned_transaction: UnsignTransactionRequest => UnsignTransactionResponse,
	build_signed_transaction: SignedTransactionRequest => SignedTransactionResponse,
	decode_transaction: DecodeTransactionRequest => DecodeTransactionResponse,
	verify_signed_transaction: VerifyTransactionRequest => VerifyTransactionResponse,
	get_extra_data: ExtraDataRequest => ExtraDataResponse,
	get_nft_list_by_address: NftAddressRequest => NftAddressResponse,
);

#[cfg(test)]
pub(crate) mod tests {
	use super::*;
	use account_chain::implementations::ethereum::EthereumAdaptor;
	use account_chain::testing::MockExplorer;
	use account_config::builders::ConfigBuilder;
	use account_rpc::testing::{header_json, sample_header, MockTransport};
	use account_rpc::{BatchMode, EthClient, RpcError};
	use futures::future::BoxFuture;
	use serde_json::{json, Value};
	use std::time::Duration;

	pub(crate) fn ethereum_over(transport: Arc<MockTransport>) -> Arc<dyn ChainAdaptor> {
		let client = EthClient::new(transport, Duration::from_secs(5), BatchMode::Full);
		Arc::new(EthereumAdaptor::new(client, Arc::new(MockExplorer::new())))
	}

	fn fee_node(method: &str, _: &Value) -> Result<Value, RpcError> {
		match method {
			"eth_gasPrice" => Ok(json!("0x3b9aca00")),
			"eth_maxPriorityFeePerGas" => Ok(json!("0x5f5e100")),
			other => Err(RpcError::Transport(format!("unexpected {}", other))),
		}
	}

	fn dispatcher_over(transport: Arc<MockTransport>) -> Dispatcher {
		Dispatcher::from_adaptors([("Ethereum".to_string(), ethereum_over(transport))])
	}

	fn fee_request(chain: &str) -> FeeRequest {
		FeeRequest {
			chain: chain.into(),
			..Default::default()
		}
	}

	#[tokio::test]
	async fn test_routes_to_adaptor() {
		let transport = Arc::new(MockTransport::new(fee_node));
		let dispatcher = dispatcher_over(transport.clone());

		let resp = dispatcher.get_fee(fee_request("Ethereum")).await;
		assert_eq!(resp.code, ReturnCode::Success);
		assert_eq!(resp.data.unwrap().normal_fee.gas_price, "2000000000");
		assert_eq!(transport.requests().len(), 2);
	}

	#[tokio::test]
	async fn test_unknown_chain_never_reaches_an_adaptor() {
		let transport = Arc::new(MockTransport::new(fee_node));
		let dispatcher = dispatcher_over(transport.clone());

		let resp = dispatcher.get_fee(fee_request("Bitcoin")).await;
		assert_eq!(resp.code, ReturnCode::Unsupported);
		assert!(resp.msg.contains("Bitcoin"));
		assert!(resp.data.is_none());
		assert!(transport.requests().is_empty());
	}

	#[tokio::test]
	async fn test_adaptor_errors_become_envelopes() {
		let transport = Arc::new(MockTransport::new(|_, _| {
			Err(RpcError::Transport("connection refused".into()))
		}));
		let dispatcher = dispatcher_over(transport);

		let resp = dispatcher.get_fee(fee_request("Ethereum")).await;
		assert_eq!(resp.code, ReturnCode::Transport);
		assert!(resp.msg.contains("connection refused"));

		let resp = dispatcher
			.decode_transaction(DecodeTransactionRequest {
				chain: "Ethereum".into(),
				..Default::default()
			})
			.await;
		assert_eq!(resp.code, ReturnCode::Unsupported);
	}

	#[tokio::test]
	async fn test_panic_is_contained() {
		let transport = Arc::new(MockTransport::new(
			|method: &str, params: &Value| -> Result<Value, RpcError> {
				if method == "eth_gasPrice" {
					panic!("node exploded");
				}
				fee_node(method, params)
			},
		));
		let dispatcher = dispatcher_over(transport);

		let resp = dispatcher.get_fee(fee_request("Ethereum")).await;
		assert_eq!(resp.code, ReturnCode::Internal);
		assert!(resp.msg.contains("node exploded"));

		// The dispatcher keeps serving afterwards.
		let resp = dispatcher
			.valid_address(ValidAddressRequest {
				chain: "Ethereum".into(),
				address: "0xf63948D0c77d161A491CD787403ac4222F4d9E55".into(),
				..Default::default()
			})
			.await;
		assert_eq!(resp.code, ReturnCode::Success);
		assert!(resp.data.unwrap().valid);
	}

	#[tokio::test]
	async fn test_nft_lookups_are_unsupported() {
		let transport = Arc::new(MockTransport::new(fee_node));
		let dispatcher = dispatcher_over(transport.clone());
		let resp = dispatcher
			.get_nft_collection(NftCollectionRequest {
				chain: "Ethereum".into(),
				..Default::default()
			})
			.await;
		assert_eq!(resp.code, ReturnCode::Unsupported);
		assert!(resp.msg.contains("get_nft_collection"));

		let resp = dispatcher
			.get_nft_detail(NftDetailRequest {
				chain: "Ethereum".into(),
				..Default::default()
			})
			.await;
		assert_eq!(resp.code, ReturnCode::Unsupported);

		let resp = dispatcher
			.get_nft_holder_list(NftHolderListRequest {
				chain: "Bitcoin".into(),
				..Default::default()
			})
			.await;
		assert_eq!(resp.code, ReturnCode::Unsupported);
		assert!(resp.msg.contains("Bitcoin"));
		assert!(transport.requests().is_empty());
	}

	fn header_node(_: &str, params: &Value) -> Result<Value, RpcError> {
		let arg = params[0].as_str().unwrap_or_default();
		let height = u64::from_str_radix(arg.trim_start_matches("0x"), 16)
			.map_err(|e| RpcError::Transport(e.to_string()))?;
		Ok(header_json(&sample_header(height)))
	}

	#[tokio::test]
	async fn test_grouped_header_range() {
		let transport = Arc::new(MockTransport::new(header_node));
		let client = EthClient::new(
			transport.clone(),
			Duration::from_secs(5),
			BatchMode::Grouped {
				group_size: 100,
				max_workers: 3,
			},
		);
		let adaptor: Arc<dyn ChainAdaptor> =
			Arc::new(EthereumAdaptor::new(client, Arc::new(MockExplorer::new())));
		let dispatcher = Dispatcher::from_adaptors([("Ethereum".to_string(), adaptor)]);

		let resp = dispatcher
			.get_block_header_by_range(BlockByRangeRequest {
				chain: "Ethereum".into(),
				start: 1_000,
				end: 1_249,
				..Default::default()
			})
			.await;
		assert_eq!(resp.code, ReturnCode::Success);
		let headers = resp.data.unwrap().block_headers;
		assert_eq!(headers.len(), 250);
		for (offset, header) in headers.iter().enumerate() {
			assert_eq!(header.number, (1_000 + offset).to_string());
		}
		assert_eq!(transport.batch_sizes().len(), 3);
	}

	#[tokio::test]
	async fn test_oversized_range_is_an_envelope() {
		let transport = Arc::new(MockTransport::new(header_node));
		let dispatcher = dispatcher_over(transport.clone());

		let resp = dispatcher
			.get_block_header_by_range(BlockByRangeRequest {
				chain: "Ethereum".into(),
				start: 0,
				end: 2_000_000_000,
				..Default::default()
			})
			.await;
		assert_eq!(resp.code, ReturnCode::InvalidArgument);
		assert!(resp.data.is_none());
		assert!(transport.requests().is_empty());
	}

	fn mock_factory(_config: &Config) -> BoxFuture<'_, Result<Arc<dyn ChainAdaptor>, ChainError>> {
		async move { Ok(ethereum_over(Arc::new(MockTransport::new(fee_node)))) }.boxed()
	}

	fn failing_factory(_config: &Config) -> BoxFuture<'_, Result<Arc<dyn ChainAdaptor>, ChainError>> {
		async move { Err(ChainError::Transport("dial failed".into())) }.boxed()
	}

	#[tokio::test]
	async fn test_new_skips_unknown_chains() {
		let config = ConfigBuilder::new().chains(&["Ethereum", "Solana"]).build();
		let factories: [(&'static str, AdaptorFactory); 1] = [("Ethereum", mock_factory)];

		let dispatcher = Dispatcher::new(&config, &factories).await.unwrap();
		assert_eq!(dispatcher.supported_chains(), vec!["Ethereum".to_string()]);
	}

	#[tokio::test]
	async fn test_new_fails_on_factory_error() {
		let config = ConfigBuilder::new().build();
		let factories: [(&'static str, AdaptorFactory); 1] = [("Ethereum", failing_factory)];

		assert!(matches!(
			Dispatcher::new(&config, &factories).await,
			Err(ChainError::Transport(_))
		));
	}

	#[tokio::test]
	async fn test_shutdown_closes_adaptors() {
		let transport = Arc::new(MockTransport::new(fee_node));
		let dispatcher = dispatcher_over(transport.clone());
		dispatcher.shutdown();
		assert_eq!(transport.close_count(), 1);
	}
}
