//! Request handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use zkvault_circuits::{create_commitment, Address, Commitment, Secret};
use zkvault_ledger::{Amount, CommitmentStatus, LedgerError, VaultEvent, VaultLedger, VaultSummary};
use zkvault_prover::{prove_withdrawal, ProofEnvelope};

use crate::deployment;
use crate::error::ApiError;
use crate::AppState;

type SharedState = State<Arc<RwLock<AppState>>>;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

#[derive(Serialize)]
pub struct VaultInfo {
    pub address: Address,
    pub network: String,
    #[serde(flatten)]
    pub summary: VaultSummary,
}

pub async fn vault_info(State(state): SharedState) -> Json<VaultInfo> {
    let state = state.read().await;
    Json(VaultInfo {
        address: state.deployment.address,
        network: state.network.clone(),
        summary: state.ledger.summary(),
    })
}

pub async fn events(State(state): SharedState) -> Json<Vec<VaultEvent>> {
    Json(state.read().await.ledger.events().to_vec())
}

#[derive(Serialize, Deserialize)]
pub struct StatusResponse {
    pub commitment: Commitment,
    pub status: CommitmentStatus,
}

pub async fn commitment_status(
    State(state): SharedState,
    Path(commitment): Path<String>,
) -> Result<Json<StatusResponse>, ApiError> {
    let commitment: Commitment = commitment
        .parse()
        .map_err(|e| ApiError::BadRequest(format!("invalid commitment: {e}")))?;
    let status = state.read().await.ledger.status(&commitment);
    Ok(Json(StatusResponse { commitment, status }))
}

/// Run one ledger transition on a blocking thread under the write lock.
///
/// The transition is applied to a staged copy, which replaces the live
/// ledger only once its snapshot is on disk.
async fn transition<F>(state: Arc<RwLock<AppState>>, apply: F) -> Result<VaultEvent, ApiError>
where
    F: FnOnce(&mut VaultLedger) -> Result<VaultEvent, LedgerError> + Send + 'static,
{
    let mut guard = state.write_owned().await;
    tokio::task::spawn_blocking(move || -> Result<VaultEvent, ApiError> {
        let mut staged = guard.ledger.clone();
        let event = apply(&mut staged)?;
        deployment::save_ledger(&guard.ledger_path, &staged.snapshot())
            .map_err(|e| ApiError::Internal(format!("failed to persist ledger: {e}")))?;
        guard.ledger = staged;
        Ok(event)
    })
    .await
    .map_err(|e| ApiError::Internal(format!("ledger task failed: {e}")))?
}

#[derive(Deserialize)]
pub struct DepositRequest {
    pub commitment: Commitment,
    /// Decimal string; amounts can exceed what JSON numbers carry exactly
    pub value: String,
}

pub async fn deposit(
    State(state): SharedState,
    Json(req): Json<DepositRequest>,
) -> Result<Json<VaultEvent>, ApiError> {
    let value: Amount = req
        .value
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("invalid value: {}", req.value)))?;

    let commitment = req.commitment;
    let event = transition(state, move |ledger| ledger.deposit(commitment, value)).await?;
    Ok(Json(event))
}

pub async fn withdraw(
    State(state): SharedState,
    Json(envelope): Json<ProofEnvelope>,
) -> Result<Json<VaultEvent>, ApiError> {
    // Verification and the spent-set update share one write lock
    let event = transition(state, move |ledger| ledger.withdraw(&envelope)).await?;
    Ok(Json(event))
}

#[derive(Deserialize)]
pub struct ProveWithdrawRequest {
    pub secret: Secret,
    pub recipient: Address,
}

#[derive(Serialize, Deserialize)]
pub struct ProveWithdrawResponse {
    pub commitment: Commitment,
    pub proof: ProofEnvelope,
}

pub async fn prove_withdraw(
    State(state): SharedState,
    Json(req): Json<ProveWithdrawRequest>,
) -> Result<Json<ProveWithdrawResponse>, ApiError> {
    let keys = state.read().await.keys.clone();

    let result = tokio::task::spawn_blocking(move || {
        prove_withdrawal(&keys.proving_key, &keys.params, &req.secret, &req.recipient)
    })
    .await
    .map_err(|e| ApiError::Internal(format!("prover task failed: {e}")))??;

    Ok(Json(ProveWithdrawResponse {
        commitment: result.signals.commitment(),
        proof: result.envelope(),
    }))
}

#[derive(Deserialize)]
pub struct CreateCommitmentRequest {
    pub secret: Secret,
}

#[derive(Serialize, Deserialize)]
pub struct CreateCommitmentResponse {
    pub commitment: Commitment,
    pub decimal: String,
}

pub async fn create_commitment_handler(
    State(state): SharedState,
    Json(req): Json<CreateCommitmentRequest>,
) -> Result<Json<CreateCommitmentResponse>, ApiError> {
    let params = state.read().await.keys.params.clone();
    let commitment = create_commitment(&req.secret, &params)?;
    Ok(Json(CreateCommitmentResponse {
        commitment,
        decimal: commitment.to_decimal_string(),
    }))
}

#[derive(Serialize, Deserialize)]
pub struct GenerateSecretResponse {
    pub secret: String,
    pub commitment: Commitment,
}

pub async fn generate_secret(
    State(state): SharedState,
) -> Result<Json<GenerateSecretResponse>, ApiError> {
    let params = state.read().await.keys.params.clone();
    let secret = Secret::random(&mut rand::rngs::OsRng);
    let commitment = create_commitment(&secret, &params)?;
    Ok(Json(GenerateSecretResponse {
        secret: secret.to_decimal_string(),
        commitment,
    }))
}
