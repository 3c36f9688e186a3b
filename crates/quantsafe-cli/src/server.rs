//! HTTP API
//!
//! - `GET  /health`                       - status and configured algorithms
//! - `POST /generate-kyber-keypair`       - KEM keypair
//! - `POST /generate-dilithium-keypair`   - signature keypair
//! - `POST /kyber-encapsulate`            - `{publicKey}`
//! - `POST /kyber-decapsulate`            - `{privateKey, ciphertext}`
//! - `POST /dilithium-sign`               - `{privateKey, message}`
//! - `POST /dilithium-verify`             - `{publicKey, message, signature}`
//! - `POST /kyber/validate-key`           - `{publicKey}`, always 200
//! - `POST /dilithium/validate-key`       - `{publicKey}`, always 200
//! - `POST /create-challenge`             - `{userId}`

use std::sync::Arc;

use anyhow::Context;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use quantsafe_core::wire::{
    ChallengeData, ChallengeRequest, DecapsulateRequest, EncapsulateRequest, EncapsulationData,
    Envelope, HealthReport, KeyPairData, SignRequest, ValidateKeyRequest, ValidationReport,
    VerifyRequest,
};
use quantsafe_core::{CryptoPool, PqcService, ServiceError};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Listener settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 5001;

impl ServerConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<PqcService>,
    pub pool: CryptoPool,
}

impl AppState {
    pub fn new(service: PqcService, pool: CryptoPool) -> Self {
        Self {
            service: Arc::new(service),
            pool,
        }
    }
}

// ── Errors ────────────────────────────────────────────────────────────────────

/// Failure envelope with a status derived from the error kind
pub struct ApiError(ServiceError);

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            ServiceError::Provider(_) => StatusCode::UNPROCESSABLE_ENTITY,
            err if err.is_caller_fault() => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::error!(error = %self.0, "Request failed");
        } else {
            tracing::warn!(error = %self.0, status = status.as_u16(), "Request rejected");
        }

        (status, Json(Envelope::<()>::failure(&self.0))).into_response()
    }
}

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| ServiceError::BadRequest(rejection.body_text()).into())
}

// ── Router ────────────────────────────────────────────────────────────────────

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/generate-kyber-keypair", post(generate_kyber_keypair))
        .route("/generate-dilithium-keypair", post(generate_dilithium_keypair))
        .route("/kyber-encapsulate", post(kyber_encapsulate))
        .route("/kyber-decapsulate", post(kyber_decapsulate))
        .route("/dilithium-sign", post(dilithium_sign))
        .route("/dilithium-verify", post(dilithium_verify))
        .route("/kyber/validate-key", post(validate_kyber_key))
        .route("/dilithium/validate-key", post(validate_dilithium_key))
        .route("/create-challenge", post(create_challenge))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn serve(config: ServerConfig, state: AppState) -> anyhow::Result<()> {
    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!(
        addr = addr.as_str(),
        workers = state.pool.workers(),
        kem = %state.service.kem_algorithm(),
        signature = %state.service.signature_algorithm(),
        "QuantSafe PQC bridge listening"
    );

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}

// ── Handlers ──────────────────────────────────────────────────────────────────

async fn health(State(state): State<AppState>) -> Json<HealthReport> {
    Json(state.service.health())
}

async fn generate_kyber_keypair(
    State(state): State<AppState>,
) -> Result<Json<Envelope<KeyPairData>>, ApiError> {
    let service = state.service.clone();
    let data = state.pool.run(move || service.generate_kem_keypair()).await?;
    Ok(Json(Envelope::ok(data)))
}

async fn generate_dilithium_keypair(
    State(state): State<AppState>,
) -> Result<Json<Envelope<KeyPairData>>, ApiError> {
    let service = state.service.clone();
    let data = state
        .pool
        .run(move || service.generate_signature_keypair())
        .await?;
    Ok(Json(Envelope::ok(data)))
}

async fn kyber_encapsulate(
    State(state): State<AppState>,
    payload: Result<Json<EncapsulateRequest>, JsonRejection>,
) -> Result<Json<Envelope<EncapsulationData>>, ApiError> {
    let req = body(payload)?;
    let service = state.service.clone();
    let data = state
        .pool
        .run(move || service.encapsulate(&req.public_key))
        .await?;
    Ok(Json(Envelope::ok(data)))
}

async fn kyber_decapsulate(
    State(state): State<AppState>,
    payload: Result<Json<DecapsulateRequest>, JsonRejection>,
) -> Result<Json<Envelope<String>>, ApiError> {
    let req = body(payload)?;
    let service = state.service.clone();
    let data = state
        .pool
        .run(move || service.decapsulate(&req.private_key, &req.ciphertext))
        .await?;
    Ok(Json(Envelope::ok(data)))
}

async fn dilithium_sign(
    State(state): State<AppState>,
    payload: Result<Json<SignRequest>, JsonRejection>,
) -> Result<Json<Envelope<String>>, ApiError> {
    let req = body(payload)?;
    let service = state.service.clone();
    let data = state
        .pool
        .run(move || service.sign(&req.private_key, &req.message))
        .await?;
    Ok(Json(Envelope::ok(data)))
}

async fn dilithium_verify(
    State(state): State<AppState>,
    payload: Result<Json<VerifyRequest>, JsonRejection>,
) -> Result<Json<Envelope<bool>>, ApiError> {
    let req = body(payload)?;
    let service = state.service.clone();
    let data = state
        .pool
        .run(move || service.verify(&req.public_key, &req.message, &req.signature))
        .await?;
    Ok(Json(Envelope::ok(data)))
}

/// Always 200: malformed input is reported inside the verdict
async fn validate_kyber_key(
    State(state): State<AppState>,
    payload: Result<Json<ValidateKeyRequest>, JsonRejection>,
) -> Json<ValidationReport> {
    let req = payload.map(|Json(req)| req).unwrap_or_default();
    tracing::info!(present = req.public_key.is_some(), "Kyber key validation requested");
    Json(state.service.validate_kem_key(req.public_key.as_deref()).into())
}

/// Always 200: malformed input is reported inside the verdict
async fn validate_dilithium_key(
    State(state): State<AppState>,
    payload: Result<Json<ValidateKeyRequest>, JsonRejection>,
) -> Json<ValidationReport> {
    let req = payload.map(|Json(req)| req).unwrap_or_default();
    tracing::info!(present = req.public_key.is_some(), "Dilithium key validation requested");
    Json(state.service.validate_signature_key(req.public_key.as_deref()).into())
}

async fn create_challenge(
    State(state): State<AppState>,
    payload: Result<Json<ChallengeRequest>, JsonRejection>,
) -> Result<Json<Envelope<ChallengeData>>, ApiError> {
    let req = body(payload)?;
    let data = state.service.create_challenge(&req.user_id)?;
    Ok(Json(Envelope::ok(data)))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
