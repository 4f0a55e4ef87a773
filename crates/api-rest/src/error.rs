//! HTTP mapping of the core error taxonomy.
//!
//! Every handler returns `Result<_, ApiError>`; `?` on a core call converts
//! through `From<BankError>` so the status-code policy lives in exactly one
//! place. Bodies are structured JSON (`{"error": {"code", "message"}}`) so
//! clients can branch on `code` without parsing prose.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

use bloodbank_core::BankError;
use bloodbank_types::TextError;

/// Structured error response body.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorDetail {
    #[schema(example = "INVALID_TRANSITION")]
    pub code: &'static str,
    pub message: String,
}

/// A core failure on its way out as an HTTP response.
#[derive(Debug)]
pub struct ApiError(pub BankError);

impl From<BankError> for ApiError {
    fn from(err: BankError) -> Self {
        Self(err)
    }
}

impl From<TextError> for ApiError {
    fn from(err: TextError) -> Self {
        Self(BankError::Validation(err.to_string()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self.0 {
            BankError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION", self.0.to_string()),
            BankError::InvalidTestValue { .. } => (
                StatusCode::BAD_REQUEST,
                "INVALID_TEST_VALUE",
                self.0.to_string(),
            ),
            BankError::VolumeExceeded { .. } => (
                StatusCode::BAD_REQUEST,
                "VOLUME_EXCEEDED",
                self.0.to_string(),
            ),
            BankError::InvalidTransition { .. } => (
                StatusCode::CONFLICT,
                "INVALID_TRANSITION",
                self.0.to_string(),
            ),
            BankError::IneligibleDonor { .. } => (
                StatusCode::CONFLICT,
                "INELIGIBLE_DONOR",
                self.0.to_string(),
            ),
            BankError::DonorDeferred { .. } => {
                (StatusCode::CONFLICT, "DONOR_DEFERRED", self.0.to_string())
            }
            BankError::AlreadyInspected => (
                StatusCode::CONFLICT,
                "ALREADY_INSPECTED",
                self.0.to_string(),
            ),
            BankError::ConcurrentModification => (
                StatusCode::CONFLICT,
                "CONCURRENT_MODIFICATION",
                self.0.to_string(),
            ),
            BankError::NotFound { .. } => (StatusCode::NOT_FOUND, "NOT_FOUND", self.0.to_string()),
            BankError::LockPoisoned => {
                tracing::error!("storage lock poisoned while handling a request");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = ErrorBody {
            error: ErrorDetail { code, message },
        };
        (status, Json(body)).into_response()
    }
}
