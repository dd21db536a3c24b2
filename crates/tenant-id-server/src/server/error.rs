//! Error types for the onboarding service.
//!
//! Every failure is reported to clients inside the regular JSON envelope with a
//! numeric business code, so callers can branch on `code` without parsing
//! messages.
//!
//! ## Error Cases
//! - `InvalidRequest`: the request body was malformed or failed validation.
//! - `SidGeneration`: no correlation id could be minted. Request processing is
//!   aborted before any handler runs.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tenant_id::GenerationError;

use crate::server::envelope::Envelope;

/// Business code of a successful response.
pub const CODE_SUCCESS: u32 = 0;
/// Business code for malformed or invalid requests.
pub const CODE_INVALID_REQUEST: u32 = 3001;
/// Business code for a request rejected because no correlation id could be
/// minted.
pub const CODE_SID_GENERATION: u32 = 3009;

pub type Result<T> = core::result::Result<T, Error>;

/// Unified error type for the onboarding service.
#[derive(Clone, thiserror::Error, Debug)]
pub enum Error {
    /// The client request was malformed or failed validation.
    #[error("Invalid request: {reason}")]
    InvalidRequest { reason: String },

    /// The correlation id generator could not produce an id.
    #[error("Correlation id error: {0}")]
    SidGeneration(#[from] GenerationError),
}

impl Error {
    pub fn code(&self) -> u32 {
        match self {
            Self::InvalidRequest { .. } => CODE_INVALID_REQUEST,
            Self::SidGeneration(_) => CODE_SID_GENERATION,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidRequest { .. } => StatusCode::BAD_REQUEST,
            Self::SidGeneration(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Attaches the request's correlation id so the error can be rendered.
    pub fn with_sid(self, sid: impl Into<String>) -> ApiError {
        ApiError {
            sid: sid.into(),
            error: self,
        }
    }
}

/// An [`Error`] bound to the correlation id of the request that raised it.
///
/// `sid` is empty when the failure is the correlation id itself.
#[derive(Debug)]
pub struct ApiError {
    pub sid: String,
    pub error: Error,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let envelope = Envelope::<()>::failure(self.error.code(), self.error.to_string(), self.sid);
        (self.error.status(), Json(envelope)).into_response()
    }
}
