use axum::{
    Json,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::server::error::CODE_SUCCESS;

/// JSON wrapper shared by every response.
///
/// `sid` is the correlation id of the request, so a client-side report can be
/// matched against server logs.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub code: u32,
    pub message: String,
    pub sid: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    pub fn success(sid: impl Into<String>, data: T) -> Self {
        Self {
            code: CODE_SUCCESS,
            message: "success".to_owned(),
            sid: sid.into(),
            data: Some(data),
        }
    }

    pub fn failure(code: u32, message: impl Into<String>, sid: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            sid: sid.into(),
            data: None,
        }
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}
