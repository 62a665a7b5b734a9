//! API error responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use zkvault_circuits::CommitmentError;
use zkvault_ledger::{ErrorKind, LedgerError};
use zkvault_prover::ProveError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error(transparent)]
    Prove(#[from] ProveError),
    #[error(transparent)]
    Commitment(#[from] CommitmentError),
    #[error("{0}")]
    BadRequest(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Ledger(err) => match err.kind() {
                ErrorKind::Validation => StatusCode::BAD_REQUEST,
                ErrorKind::Conflict => StatusCode::CONFLICT,
                ErrorKind::Rejected => StatusCode::UNPROCESSABLE_ENTITY,
                ErrorKind::Fatal => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Prove(ProveError::Unsatisfiable(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Prove(ProveError::Commitment(_)) | Self::Commitment(_) | Self::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Prove(ProveError::Synthesis(_)) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let body = serde_json::json!({
            "error": self.to_string(),
        });
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zkvault_circuits::Commitment;
    use zkvault_ledger::CommitmentStatus;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (
                LedgerError::InvalidAmount {
                    expected: 1,
                    actual: 2,
                },
                StatusCode::BAD_REQUEST,
            ),
            (
                LedgerError::CommitmentReused(Commitment::default()),
                StatusCode::CONFLICT,
            ),
            (
                LedgerError::UnknownOrSpent {
                    commitment: Commitment::default(),
                    status: CommitmentStatus::Spent,
                },
                StatusCode::CONFLICT,
            ),
            (LedgerError::ProofRejected, StatusCode::UNPROCESSABLE_ENTITY),
            (
                LedgerError::Verifier("bad key".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status(), status);
        }

        assert_eq!(
            ApiError::from(ProveError::Unsatisfiable("0".into())).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }
}
