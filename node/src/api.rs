//! # REST + JSON-RPC API
//!
//! Builds the axum router for the node's HTTP interface. Handlers share
//! [`AppState`] through axum's `State` extractor.
//!
//! ## Endpoints
//!
//! | Method | Path           | Description                  |
//! |--------|----------------|------------------------------|
//! | GET    | `/health`      | Liveness check               |
//! | GET    | `/status`      | Node status summary          |
//! | GET    | `/assets`      | Every registered asset       |
//! | GET    | `/assets/:id`  | One asset by id              |
//! | POST   | `/rpc`         | JSON-RPC 2.0 gateway         |
//!
//! ## RPC methods
//!
//! Lookups: `getBlockchainStatus`, `getAsset`, `getAssetByName`,
//! `getAllAssets`, `getTransaction`.
//!
//! Transaction creation (all take `publicKey` and an optional
//! `phasing: {"maxHeight": n}`): `sendMessage`, `assignAlias`, `issueAsset`,
//! `transferAsset`, `placeAskOrder`, `placeBidOrder`, `cancelAskOrder`,
//! `cancelBidOrder`.
//!
//! Voting: `castVotePhased` (`publicKey`, `pendingTransaction: [id, ..]`).
//!
//! Params are always a named object. Ids travel as decimal (or `0x` hex)
//! strings.

use axum::{
    extract::{Path, State},
    http::{Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use tessera_protocol::asset::AssetRegistry;
use tessera_protocol::ledger::{
    ChainView, MemoryChain, PublicKeyResolver, SenderResolver, SubmissionError,
    TransactionSubmitter,
};
use tessera_protocol::transaction::{
    parse_unsigned_id, AliasAssignment, ArbitraryMessage, AssetIssuance, AssetTransfer,
    Attachment, AttachmentError, OrderCancellation, OrderTerms, PhasedTransactionGate, TwoPhased,
    VoteCastingError, VoteCastingHandler, VoteCastingRequest,
};

use crate::metrics::SharedMetrics;

// ---------------------------------------------------------------------------
// Application State
// ---------------------------------------------------------------------------

/// Shared application state. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    /// The node's reported version string.
    pub version: String,
    /// Transaction index and chain height, written by the ledger worker.
    pub chain: Arc<MemoryChain>,
    /// Read handle over the asset registry.
    pub assets: AssetRegistry,
    pub resolver: Arc<dyn SenderResolver>,
    pub submitter: Arc<dyn TransactionSubmitter>,
    pub votes: Arc<VoteCastingHandler>,
    pub metrics: SharedMetrics,
}

impl AppState {
    pub fn new(
        version: String,
        chain: Arc<MemoryChain>,
        assets: AssetRegistry,
        submitter: Arc<dyn TransactionSubmitter>,
        max_votes: u8,
        metrics: SharedMetrics,
    ) -> Self {
        let resolver: Arc<dyn SenderResolver> = Arc::new(PublicKeyResolver);
        let votes = Arc::new(VoteCastingHandler::new(
            PhasedTransactionGate::new(max_votes),
            Arc::clone(&chain) as Arc<dyn ChainView>,
            Arc::clone(&resolver),
            Arc::clone(&submitter),
        ));
        Self {
            version,
            chain,
            assets,
            resolver,
            submitter,
            votes,
            metrics,
        }
    }
}

// ---------------------------------------------------------------------------
// Router Construction
// ---------------------------------------------------------------------------

/// Builds the axum [`Router`] with all API routes, CORS, and tracing.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .route("/status", get(status_handler))
        .route("/assets", get(assets_handler))
        .route("/assets/:id", get(asset_by_id_handler))
        .route("/rpc", post(rpc_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ---------------------------------------------------------------------------
// JSON-RPC Types
// ---------------------------------------------------------------------------

/// A JSON-RPC 2.0 request envelope.
#[derive(Debug, Deserialize)]
pub struct JsonRpcRequest {
    /// Protocol version. Must be "2.0".
    pub jsonrpc: String,
    pub method: String,
    /// Method parameters, as a named object.
    pub params: Option<Value>,
    /// Request identifier. Echoed back in the response.
    pub id: Value,
}

/// A JSON-RPC 2.0 response envelope.
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
    pub id: Value,
}

/// A JSON-RPC 2.0 error object.
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// Error codes beyond the JSON-RPC reserved range.
pub mod codes {
    pub const INVALID_REQUEST: i32 = -32600;
    pub const METHOD_NOT_FOUND: i32 = -32601;
    pub const INVALID_PARAMS: i32 = -32602;
    pub const INTERNAL_ERROR: i32 = -32603;
    pub const NOT_FOUND: i32 = -32001;
    pub const ATTACHMENT_REJECTED: i32 = -32010;
    pub const SUBMISSION_FAILED: i32 = -32011;
    pub const MISSING_PENDING_TRANSACTION: i32 = 3;
    pub const INCORRECT_PENDING_TRANSACTION: i32 = 4;
}

type RpcResult = Result<Value, JsonRpcError>;

impl JsonRpcError {
    fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    fn invalid_params(message: impl std::fmt::Display) -> Self {
        Self::new(codes::INVALID_PARAMS, format!("Invalid params: {message}"))
    }

    fn not_found(message: impl Into<String>) -> Self {
        Self::new(codes::NOT_FOUND, message)
    }
}

impl From<AttachmentError> for JsonRpcError {
    fn from(e: AttachmentError) -> Self {
        tracing::warn!(error = %e, "attachment rejected");
        Self::new(codes::ATTACHMENT_REJECTED, e.to_string())
    }
}

impl From<SubmissionError> for JsonRpcError {
    fn from(e: SubmissionError) -> Self {
        match e {
            SubmissionError::Account(e) => Self::invalid_params(format_args!("publicKey: {e}")),
            other => Self::new(codes::SUBMISSION_FAILED, other.to_string()),
        }
    }
}

impl From<VoteCastingError> for JsonRpcError {
    fn from(e: VoteCastingError) -> Self {
        let code = match &e {
            VoteCastingError::MissingPendingTransaction => codes::MISSING_PENDING_TRANSACTION,
            VoteCastingError::IncorrectPendingTransaction(_) => {
                codes::INCORRECT_PENDING_TRANSACTION
            }
            VoteCastingError::Sender(_) => codes::INVALID_PARAMS,
            VoteCastingError::Attachment(_) => codes::ATTACHMENT_REJECTED,
            VoteCastingError::Submission(_) => codes::SUBMISSION_FAILED,
        };
        Self {
            code,
            message: e.to_string(),
            data: Some(json!({ "errorCode": e.error_code() })),
        }
    }
}

// ---------------------------------------------------------------------------
// Params
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct AssetParams {
    asset: String,
}

#[derive(Debug, Deserialize)]
struct NameParams {
    name: String,
}

#[derive(Debug, Deserialize)]
struct TransactionParams {
    transaction: String,
}

/// Fields shared by every transaction-creating method.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Create<T> {
    public_key: String,
    #[serde(default)]
    phasing: Option<TwoPhased>,
    #[serde(flatten)]
    body: T,
}

#[derive(Debug, Deserialize)]
struct MessageBody {
    /// Hex-encoded message bytes.
    message: String,
}

#[derive(Debug, Deserialize)]
struct AliasBody {
    alias: String,
    uri: String,
}

#[derive(Debug, Deserialize)]
struct IssueBody {
    name: String,
    #[serde(default)]
    description: Option<String>,
    quantity: i32,
}

#[derive(Debug, Deserialize)]
struct TransferBody {
    #[serde(default)]
    asset: Option<String>,
    quantity: i32,
}

#[derive(Debug, Deserialize)]
struct OrderBody {
    #[serde(default)]
    asset: Option<String>,
    quantity: i32,
    price: i64,
}

#[derive(Debug, Deserialize)]
struct CancelBody {
    #[serde(default)]
    order: Option<String>,
}

fn parse_params<T: DeserializeOwned>(params: Option<Value>) -> Result<T, JsonRpcError> {
    let params = params.unwrap_or_else(|| Value::Object(Default::default()));
    serde_json::from_value(params).map_err(JsonRpcError::invalid_params)
}

fn parse_id(value: &str, field: &str) -> Result<u64, JsonRpcError> {
    parse_unsigned_id(value).map_err(|e| JsonRpcError::invalid_params(format_args!("{field}: {e}")))
}

fn parse_optional_id(value: Option<&str>, field: &str) -> Result<Option<u64>, JsonRpcError> {
    value.map(|v| parse_id(v, field)).transpose()
}

fn to_json<T: Serialize>(value: T) -> RpcResult {
    serde_json::to_value(value)
        .map_err(|e| JsonRpcError::new(codes::INTERNAL_ERROR, format!("Internal error: {e}")))
}

// ---------------------------------------------------------------------------
// Response Types
// ---------------------------------------------------------------------------

/// Response payload for `GET /status` and `getBlockchainStatus`.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub version: String,
    /// Height of the latest forged block.
    pub height: u32,
    /// Transactions in the index.
    pub transactions: usize,
    /// Registered assets.
    pub assets: usize,
    /// Cap on pending transactions per vote.
    pub max_votes: u8,
    /// ISO-8601 timestamp of the response.
    pub timestamp: String,
}

/// Error body returned by REST endpoints.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn status(state: &AppState) -> StatusResponse {
    StatusResponse {
        version: state.version.clone(),
        height: state.chain.height(),
        transactions: state.chain.transaction_count(),
        assets: state.assets.len(),
        max_votes: state.votes.gate().max_votes(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    }
}

// ---------------------------------------------------------------------------
// REST Handlers
// ---------------------------------------------------------------------------

/// `GET /health`: liveness only.
async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({ "status": "ok" })))
}

async fn status_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(status(&state))
}

/// `GET /assets`: all assets in registration order.
async fn assets_handler(State(state): State<AppState>) -> impl IntoResponse {
    let assets: Vec<_> = state
        .assets
        .get_all_assets()
        .iter()
        .map(|a| a.as_ref().clone())
        .collect();
    Json(json!({ "assets": assets }))
}

/// `GET /assets/:id`: 400 on an unparsable id, 404 if unknown.
async fn asset_by_id_handler(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    let asset_id = match parse_unsigned_id(&id) {
        Ok(asset_id) => asset_id,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            )
                .into_response()
        }
    };

    match state.assets.get_asset(asset_id) {
        Some(asset) => (StatusCode::OK, Json(asset.as_ref().clone())).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("Asset not found: {asset_id}"),
            }),
        )
            .into_response(),
    }
}

// ---------------------------------------------------------------------------
// JSON-RPC
// ---------------------------------------------------------------------------

/// `POST /rpc`: JSON-RPC 2.0 gateway.
async fn rpc_handler(
    State(state): State<AppState>,
    Json(req): Json<JsonRpcRequest>,
) -> impl IntoResponse {
    let outcome = if req.jsonrpc != "2.0" {
        Err(JsonRpcError::new(
            codes::INVALID_REQUEST,
            "Invalid Request: jsonrpc must be \"2.0\"",
        ))
    } else {
        dispatch(&state, &req.method, req.params)
    };

    let (result, error) = match outcome {
        Ok(value) => (Some(value), None),
        Err(e) => {
            tracing::debug!(method = %req.method, code = e.code, message = %e.message, "rpc error");
            (None, Some(e))
        }
    };
    Json(JsonRpcResponse {
        jsonrpc: "2.0".into(),
        result,
        error,
        id: req.id,
    })
}

fn dispatch(state: &AppState, method: &str, params: Option<Value>) -> RpcResult {
    match method {
        "getBlockchainStatus" => to_json(status(state)),

        "getAsset" => {
            let p: AssetParams = parse_params(params)?;
            let id = parse_id(&p.asset, "asset")?;
            let asset = state
                .assets
                .get_asset(id)
                .ok_or_else(|| JsonRpcError::not_found(format!("Asset not found: {id}")))?;
            to_json(asset.as_ref())
        }

        "getAssetByName" => {
            let p: NameParams = parse_params(params)?;
            let asset = state.assets.get_asset_by_name(&p.name).ok_or_else(|| {
                JsonRpcError::not_found(format!("Asset not found: {:?}", p.name))
            })?;
            to_json(asset.as_ref())
        }

        "getAllAssets" => {
            let assets: Vec<_> = state
                .assets
                .get_all_assets()
                .iter()
                .map(|a| a.as_ref().clone())
                .collect();
            Ok(json!({ "assets": assets }))
        }

        "getTransaction" => {
            let p: TransactionParams = parse_params(params)?;
            let id = parse_id(&p.transaction, "transaction")?;
            let tx = state
                .chain
                .transaction_by_id(id)
                .ok_or_else(|| JsonRpcError::not_found(format!("Transaction not found: {id}")))?;
            Ok(tx.to_json())
        }

        "sendMessage" => create(state, params, |b: MessageBody| {
            let bytes = hex::decode(b.message.trim())
                .map_err(|e| JsonRpcError::invalid_params(format_args!("message: {e}")))?;
            Ok(ArbitraryMessage::new(bytes)?.into())
        }),

        "assignAlias" => create(state, params, |b: AliasBody| {
            Ok(AliasAssignment::new(&b.alias, &b.uri)?.into())
        }),

        "issueAsset" => create(state, params, |b: IssueBody| {
            Ok(AssetIssuance::new(&b.name, b.description.as_deref(), b.quantity)?.into())
        }),

        "transferAsset" => create(state, params, |b: TransferBody| {
            let asset = parse_optional_id(b.asset.as_deref(), "asset")?;
            Ok(AssetTransfer::new(asset, b.quantity).into())
        }),

        "placeAskOrder" => create(state, params, |b: OrderBody| {
            let asset = parse_optional_id(b.asset.as_deref(), "asset")?;
            Ok(Attachment::AskOrderPlacement(OrderTerms::new(
                asset, b.quantity, b.price,
            )))
        }),

        "placeBidOrder" => create(state, params, |b: OrderBody| {
            let asset = parse_optional_id(b.asset.as_deref(), "asset")?;
            Ok(Attachment::BidOrderPlacement(OrderTerms::new(
                asset, b.quantity, b.price,
            )))
        }),

        "cancelAskOrder" => create(state, params, |b: CancelBody| {
            let order = parse_optional_id(b.order.as_deref(), "order")?;
            Ok(Attachment::AskOrderCancellation(OrderCancellation::new(order)))
        }),

        "cancelBidOrder" => create(state, params, |b: CancelBody| {
            let order = parse_optional_id(b.order.as_deref(), "order")?;
            Ok(Attachment::BidOrderCancellation(OrderCancellation::new(order)))
        }),

        "castVotePhased" => {
            let request: VoteCastingRequest = parse_params(params)?;
            let receipt = state.votes.handle(&request).map_err(|e| {
                let code = e.error_code().to_string();
                state
                    .metrics
                    .vote_casting_rejected_total
                    .with_label_values(&[code.as_str()])
                    .inc();
                JsonRpcError::from(e)
            })?;
            to_json(receipt)
        }

        _ => Err(JsonRpcError::new(
            codes::METHOD_NOT_FOUND,
            format!("Method not found: {method}"),
        )),
    }
}

/// Shared path of every transaction-creating method: parse params, build
/// the attachment, resolve the sender, submit.
fn create<T, F>(state: &AppState, params: Option<Value>, build: F) -> RpcResult
where
    T: DeserializeOwned,
    F: FnOnce(T) -> Result<Attachment, JsonRpcError>,
{
    let Create {
        public_key,
        phasing,
        body,
    } = parse_params::<Create<T>>(params)?;

    let attachment = build(body)?;

    if let Some(p) = &phasing {
        let next_height = state.chain.height().saturating_add(1);
        if !p.is_open_at(next_height) {
            return Err(JsonRpcError::invalid_params(format_args!(
                "phasing.maxHeight {} is below the next block height {next_height}",
                p.max_height
            )));
        }
    }

    let sender = state.resolver.resolve_sender(&public_key)?;
    let receipt = state
        .submitter
        .create_and_broadcast(&sender, attachment, phasing)?;
    to_json(receipt)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
