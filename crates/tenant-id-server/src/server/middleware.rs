use axum::{
    extract::{Request, State},
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tenant_id::Sid;
use tracing::Instrument;

use crate::server::{error::Error, state::AppState};

/// Response header echoing the request's correlation id.
pub static SID_HEADER: HeaderName = HeaderName::from_static("x-request-sid");

/// The correlation id of the current request, stored in request extensions.
#[derive(Clone, Debug)]
pub struct RequestSid(pub Sid);

/// Mints a correlation id for every inbound request.
///
/// The id is stored as a [`RequestSid`] extension for handlers, recorded on a
/// `request` span that wraps the rest of the stack so every log line carries
/// it, and echoed in the [`SID_HEADER`] response header. If no id can be
/// minted the request is rejected before any handler runs.
pub async fn stamp_sid(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let sid = match state.sids.new_sid(&state.sid_tag) {
        Ok(sid) => sid,
        Err(err) => {
            tracing::error!(error = %err, "rejecting request without a correlation id");
            return Error::from(err).with_sid(String::new()).into_response();
        }
    };

    let span = tracing::info_span!(
        "request",
        sid = %sid,
        method = %request.method(),
        path = %request.uri().path(),
    );
    request.extensions_mut().insert(RequestSid(sid.clone()));

    async move {
        tracing::info!("request received");
        let mut response = next.run(request).await;

        match HeaderValue::from_str(sid.as_str()) {
            Ok(value) => {
                response.headers_mut().insert(SID_HEADER.clone(), value);
            }
            Err(_) => tracing::debug!("correlation id is not a valid header value"),
        }

        tracing::info!(status = response.status().as_u16(), "request completed");
        response
    }
    .instrument(span)
    .await
}
