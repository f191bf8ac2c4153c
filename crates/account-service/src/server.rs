//! HTTP surface for the chain account API.
//!
//! Every capability is a `POST /api/v1/<operation>` route taking the typed
//! request as JSON. Responses are always HTTP 200 with the outcome carried in
//! the envelope `code`, including bodies that fail to parse.

use crate::dispatcher::Dispatcher;
use account_config::ServerConfig;
use account_types::*;
use axum::{
	extract::{rejection::JsonRejection, State},
	response::{IntoResponse, Json, Response},
	routing::{get, post},
	Router,
};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

fn rejected(rejection: JsonRejection) -> Response {
	tracing::warn!("Rejected request body: {}", rejection);
	Json(ApiResponse::<()>::error(
		ReturnCode::InvalidArgument,
		rejection.body_text(),
	))
	.into_response()
}

/// Adds one POST route per operation, forwarding to the dispatcher method of
/// the same name.
macro_rules! api_routes {
	($router:expr, $($method:ident: $req:ty),* $(,)?) => {
		$router
		$(
			.route(
				concat!("/", stringify!($method)),
				post(
					|State(dispatcher): State<Arc<Dispatcher>>,
					 payload: Result<Json<$req>, JsonRejection>| async move {
						match payload {
							Ok(Json(req)) => Json(dispatcher.$method(req).await).into_response(),
							Err(rejection) => rejected(rejection),
						}
					},
				),
			)
		)*
	};
}

/// Builds the API router over `dispatcher`.
pub fn router(dispatcher: Arc<Dispatcher>) -> Router {
	let api = api_routes!(
		Router::new(),
		get_support_chains: SupportChainsRequest,
		convert_address: ConvertAddressRequest,
		valid_address: ValidAddressRequest,
		get_block_by_number: BlockNumberRequest,
		get_block_by_hash: BlockHashRequest,
		get_block_header_by_number: BlockHeaderNumberRequest,
		get_block_header_by_hash: BlockHeaderHashRequest,
		get_block_header_by_range: BlockByRangeRequest,
		get_account: AccountRequest,
		get_fee: FeeRequest,
		send_tx: SendTxRequest,
		get_tx_by_address: TxAddressRequest,
		get_tx_by_hash: TxHashRequest,
		build_unsigned_transaction: UnsignTransactionRequest,
		build_signed_transaction: SignedTransactionRequest,
		decode_transaction: DecodeTransactionRequest,
		verify_signed_transaction: VerifyTransactionRequest,
		get_extra_data: ExtraDataRequest,
		get_nft_list_by_address: NftAddressRequest,
		get_nft_collection: NftCollectionRequest,
		get_nft_detail: NftDetailRequest,
		get_nft_holder_list: NftHolderListRequest,
	);

	Router::new()
		.nest("/api/v1", api)
		.route("/health", get(|| async { "ok" }))
		.layer(
			ServiceBuilder::new()
				.layer(TraceLayer::new_for_http())
				.layer(CorsLayer::permissive()),
		)
		.with_state(dispatcher)
}

/// Serves the API until `shutdown` resolves.
pub async fn start_server(
	config: &ServerConfig,
	dispatcher: Arc<Dispatcher>,
	shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), Box<dyn std::error::Error>> {
	let bind_address = format!("{}:{}", config.host, config.port);
	let listener = TcpListener::bind(&bind_address).await?;

	tracing::info!(
		chains = ?dispatcher.supported_chains(),
		"Chain account API listening on {}",
		bind_address
	);

	axum::serve(listener, router(dispatcher))
		.with_graceful_shutdown(shutdown)
		.await?;
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::dispatcher::tests::ethereum_over;
	use account_rpc::testing::MockTransport;
	use account_rpc::RpcError;
	use axum::body::{to_bytes, Body};
	use axum::http::{Request, StatusCode};
	use serde_json::Value;
	use tower::ServiceExt;

	fn app() -> Router {
		let transport = Arc::new(MockTransport::new(|method, _| {
			Err(RpcError::Transport(format!("unexpected {}", method)))
		}));
		let dispatcher = Dispatcher::from_adaptors([("Ethereum".to_string(), ethereum_over(transport))]);
		router(Arc::new(dispatcher))
	}

	async fn post_json(path: &str, body: &str) -> (StatusCode, Value) {
		let response = app()
			.oneshot(
				Request::builder()
					.method("POST")
					.uri(path)
					.header("content-type", "application/json")
					.body(Body::from(body.to_string()))
					.unwrap(),
			)
			.await
			.unwrap();
		let status = response.status();
		let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
		(status, serde_json::from_slice(&bytes).unwrap())
	}

	#[tokio::test]
	async fn test_valid_address_route() {
		let (status, body) = post_json(
			"/api/v1/valid_address",
			r#"{"chain":"Ethereum","address":"0xf63948D0c77d161A491CD787403ac4222F4d9E55"}"#,
		)
		.await;
		assert_eq!(status, StatusCode::OK);
		assert_eq!(body["code"], "success");
		assert_eq!(body["data"]["valid"], true);
	}

	#[tokio::test]
	async fn test_unknown_chain_route() {
		let (status, body) =
			post_json("/api/v1/get_fee", r#"{"chain":"Tron"}"#).await;
		assert_eq!(status, StatusCode::OK);
		assert_eq!(body["code"], "unsupported");
		assert!(body.get("data").is_none());
	}

	#[tokio::test]
	async fn test_malformed_body_is_an_envelope() {
		let (status, body) = post_json("/api/v1/get_account", r#"{"chain":"#).await;
		assert_eq!(status, StatusCode::OK);
		assert_eq!(body["code"], "invalid_argument");
	}

	#[tokio::test]
	async fn test_health() {
		let response = app()
			.oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
			.await
			.unwrap();
		assert_eq!(response.status(), StatusCode::OK);
	}
}
