//! Onboarding handlers.
//!
//! Handlers fill in any identifier or credential the caller did not supply and
//! return the complete set. Storing the values, checking them against existing
//! rows, and retrying on a collision belong to the persistence layer, which
//! sits behind this service.

use axum::{
    Extension, Json,
    extract::{Path, State, rejection::JsonRejection},
};
use serde::{Deserialize, Serialize};
use tenant_id::ApiCredentials;

use crate::server::{
    envelope::Envelope,
    error::{ApiError, Error, Result},
    middleware::RequestSid,
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct CreateAppRequest {
    pub name: String,
    #[serde(default)]
    pub app_id: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub api_secret: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct IssueKeyRequest {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub api_secret: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AppCredentials {
    pub name: String,
    pub app_id: String,
    #[serde(flatten)]
    pub credentials: ApiCredentials,
}

#[derive(Debug, Serialize)]
pub struct IssuedKey {
    pub app_id: String,
    #[serde(flatten)]
    pub credentials: ApiCredentials,
}

pub async fn health(Extension(RequestSid(sid)): Extension<RequestSid>) -> Envelope<&'static str> {
    Envelope::success(sid, "ok")
}

pub async fn create_app(
    State(state): State<AppState>,
    Extension(RequestSid(sid)): Extension<RequestSid>,
    body: core::result::Result<Json<CreateAppRequest>, JsonRejection>,
) -> core::result::Result<Envelope<AppCredentials>, ApiError> {
    let Json(request) = body
        .map_err(rejected)
        .map_err(|err| err.with_sid(sid.as_str()))?;
    let name = validate_name(&request.name).map_err(|err| err.with_sid(sid.as_str()))?;

    let app_id =
        supplied(request.app_id).unwrap_or_else(|| state.credentials.app_id(state.app_id_len));
    let credentials = fill_credentials(&state, &app_id, request.api_key, request.api_secret);
    tracing::info!(app_id = %app_id, "application credentials issued");

    Ok(Envelope::success(
        sid,
        AppCredentials {
            name,
            app_id,
            credentials,
        },
    ))
}

pub async fn issue_key(
    State(state): State<AppState>,
    Extension(RequestSid(sid)): Extension<RequestSid>,
    Path(app_id): Path<String>,
    body: core::result::Result<Json<IssueKeyRequest>, JsonRejection>,
) -> core::result::Result<Envelope<IssuedKey>, ApiError> {
    let Json(request) = body
        .map_err(rejected)
        .map_err(|err| err.with_sid(sid.as_str()))?;

    let credentials = fill_credentials(&state, &app_id, request.api_key, request.api_secret);
    tracing::info!(app_id = %app_id, "api key issued");

    Ok(Envelope::success(sid, IssuedKey { app_id, credentials }))
}

fn rejected(rejection: JsonRejection) -> Error {
    Error::InvalidRequest {
        reason: rejection.body_text(),
    }
}

fn validate_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::InvalidRequest {
            reason: "name must not be empty".to_owned(),
        });
    }
    Ok(name.to_owned())
}

/// Treats a missing and an empty caller value alike.
fn supplied(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.is_empty())
}

fn fill_credentials(
    state: &AppState,
    app_id: &str,
    api_key: Option<String>,
    api_secret: Option<String>,
) -> ApiCredentials {
    ApiCredentials {
        api_key: supplied(api_key).unwrap_or_else(|| state.credentials.api_key(app_id)),
        api_secret: supplied(api_secret).unwrap_or_else(|| state.credentials.api_secret()),
    }
}
