//! HTTP API for the authorization relay.

use alloy::primitives::utils::format_ether;
use axum::{
	extract::{rejection::JsonRejection, Path, Query, State},
	http::{header, HeaderValue, Method, StatusCode},
	response::{IntoResponse, Json, Response},
	routing::{get, post},
	Router,
};
use relay_config::ServerConfig;
use relay_core::AuthorizationRelay;
use relay_delivery::truncate_hash;
use relay_types::validation::{parse_address, parse_bytes32};
use relay_types::{ExecuteAuthorizationInput, FieldError};
use serde::Deserialize;
use serde_json::{json, Value};
use std::future::Future;
use std::sync::Arc;
use tower_http::{
	cors::{AllowOrigin, CorsLayer},
	trace::TraceLayer,
};
use tracing::{info, warn};

#[derive(Clone)]
struct AppState {
	relay: Arc<AuthorizationRelay>,
}

/// Builds the API router for `relay`.
///
/// Browser access is limited to `allowed_origins`; origins that are not
/// valid header values are skipped.
pub fn router(relay: Arc<AuthorizationRelay>, allowed_origins: &[String]) -> Router {
	Router::new()
		.route("/", get(describe))
		.route("/api/health", get(health))
		.route("/api/authorization/execute", post(execute_authorization))
		.route("/api/authorization/nonce-status", get(nonce_status))
		.route("/api/authorization/transaction/{hash}", get(transaction_status))
		.fallback(not_found)
		.with_state(AppState { relay })
		.layer(TraceLayer::new_for_http())
		.layer(cors_layer(allowed_origins))
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
	let origins: Vec<HeaderValue> = allowed_origins
		.iter()
		.filter_map(|origin| match HeaderValue::from_str(origin) {
			Ok(value) => Some(value),
			Err(_) => {
				warn!(origin = %origin, "Ignoring invalid CORS origin");
				None
			}
		})
		.collect();

	CorsLayer::new()
		.allow_origin(AllowOrigin::list(origins))
		.allow_methods([Method::GET, Method::POST])
		.allow_headers([header::CONTENT_TYPE])
}

/// Binds the listener and serves until `shutdown` resolves.
pub async fn serve<F>(
	config: &ServerConfig,
	relay: Arc<AuthorizationRelay>,
	shutdown: F,
) -> anyhow::Result<()>
where
	F: Future<Output = ()> + Send + 'static,
{
	let app = router(relay, &config.allowed_origins);
	let bind_address = format!("{}:{}", config.host, config.port);
	let listener = tokio::net::TcpListener::bind(&bind_address).await?;

	info!("API server listening on {}", bind_address);

	axum::serve(listener, app)
		.with_graceful_shutdown(shutdown)
		.await?;

	Ok(())
}

async fn describe() -> Json<Value> {
	Json(json!({
		"name": "eip3009-relay",
		"version": env!("CARGO_PKG_VERSION"),
		"description": "Gasless EIP-3009 token transfers relayed on behalf of the signer",
		"endpoints": {
			"health": "GET /api/health",
			"execute": "POST /api/authorization/execute",
			"nonceStatus": "GET /api/authorization/nonce-status?authorizer=<address>&nonce=<bytes32>",
			"transaction": "GET /api/authorization/transaction/{hash}"
		}
	}))
}

/// Liveness plus the relayer's native balance.
async fn health(State(state): State<AppState>) -> Response {
	let relay = &state.relay;
	match relay.relayer_balance().await {
		Ok(balance) => Json(json!({
			"status": "ok",
			"timestamp": chrono::Utc::now().to_rfc3339(),
			"chainId": relay.chain_id().0,
			"relayer": {
				"address": relay.relayer_address().to_string(),
				"balance": format_ether(balance),
			}
		}))
		.into_response(),
		Err(e) => {
			warn!(error = %e, "Health check failed");
			(
				StatusCode::INTERNAL_SERVER_ERROR,
				Json(json!({ "status": "error", "error": e.to_string() })),
			)
				.into_response()
		}
	}
}

async fn execute_authorization(
	State(state): State<AppState>,
	body: Result<Json<ExecuteAuthorizationInput>, JsonRejection>,
) -> Response {
	let input = match body {
		Ok(Json(input)) => input,
		Err(rejection) => {
			return validation_failed(&[FieldError {
				field: "body".to_string(),
				message: rejection.body_text(),
			}])
		}
	};

	let request = match input.validate() {
		Ok(request) => request,
		Err(errors) => return validation_failed(errors.fields()),
	};

	let outcome = state
		.relay
		.execute_authorization(&request.message, &request.signature, request.kind)
		.await;

	match (outcome.success, outcome.transaction_hash) {
		(true, Some(hash)) => Json(json!({
			"success": true,
			"transactionHash": hash,
			"message": "Transaction submitted",
		}))
		.into_response(),
		_ => failure(
			StatusCode::BAD_REQUEST,
			outcome.error.as_deref().unwrap_or("Unknown error"),
		),
	}
}

#[derive(Debug, Deserialize)]
struct NonceStatusParams {
	authorizer: Option<String>,
	nonce: Option<String>,
}

async fn nonce_status(
	State(state): State<AppState>,
	Query(params): Query<NonceStatusParams>,
) -> Response {
	let Some(authorizer) = params.authorizer.filter(|s| !s.is_empty()) else {
		return failure(StatusCode::BAD_REQUEST, "Missing authorizer parameter");
	};
	let Some(nonce) = params.nonce.filter(|s| !s.is_empty()) else {
		return failure(StatusCode::BAD_REQUEST, "Missing nonce parameter");
	};

	let authorizer = match parse_address("authorizer", &authorizer) {
		Ok(address) => address,
		Err(errors) => return validation_failed(errors.fields()),
	};
	let nonce = match parse_bytes32("nonce", &nonce) {
		Ok(nonce) => nonce,
		Err(errors) => return validation_failed(errors.fields()),
	};

	match state.relay.is_nonce_used(authorizer, nonce).await {
		Ok(is_used) => Json(json!({
			"success": true,
			"authorizer": authorizer,
			"nonce": nonce,
			"isUsed": is_used,
		}))
		.into_response(),
		Err(e) => {
			warn!(authorizer = %authorizer, error = %e, "Nonce status lookup failed");
			failure(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
		}
	}
}

/// Waits for a submitted transaction and reports how it was mined.
async fn transaction_status(State(state): State<AppState>, Path(hash): Path<String>) -> Response {
	let Ok(hash) = parse_bytes32("hash", &hash) else {
		return failure(StatusCode::BAD_REQUEST, "Invalid transaction hash");
	};

	match state.relay.wait_for_transaction(hash).await {
		Ok(receipt) => Json(json!({
			"success": true,
			"transactionHash": receipt.transaction_hash,
			"status": receipt.status(),
			"blockNumber": receipt.block_number.to_string(),
			"gasUsed": receipt.gas_used.to_string(),
		}))
		.into_response(),
		Err(e) => {
			warn!(tx_hash = %truncate_hash(&hash), error = %e, "Transaction status lookup failed");
			failure(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
		}
	}
}

async fn not_found() -> (StatusCode, Json<Value>) {
	(StatusCode::NOT_FOUND, Json(json!({ "error": "Not Found" })))
}

fn failure(status: StatusCode, error: &str) -> Response {
	(status, Json(json!({ "success": false, "error": error }))).into_response()
}

fn validation_failed(details: &[FieldError]) -> Response {
	(
		StatusCode::BAD_REQUEST,
		Json(json!({
			"success": false,
			"error": "Request validation failed",
			"details": details,
		})),
	)
		.into_response()
}
