//! Response helpers shared by every endpoint.

use perspecto_db::DataError;
use serde::de::DeserializeOwned;

/// JSON fields probed, in order, for a human-readable error message.
const MESSAGE_FIELDS: &[&str] = &["message", "msg", "error_description", "error"];

/// Map a transport failure (connect, TLS, timeout, body read).
pub(crate) fn transport(err: reqwest::Error) -> DataError {
    DataError::Transport(err.to_string())
}

/// Pull the display message out of an error body.
///
/// Returns the first string among `message`, `msg`, `error_description`
/// and `error`; otherwise the raw body, or the canonical status text when
/// the body is empty.
pub fn extract_error_message(status: u16, body: &str) -> String {
    if let Ok(serde_json::Value::Object(fields)) = serde_json::from_str(body) {
        for field in MESSAGE_FIELDS {
            if let Some(msg) = fields.get(*field).and_then(|v| v.as_str()) {
                if !msg.is_empty() {
                    return msg.to_string();
                }
            }
        }
    }
    let body = body.trim();
    if !body.is_empty() {
        return body.to_string();
    }
    reqwest::StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .map_or_else(|| format!("HTTP {status}"), str::to_string)
}

/// Return the response unchanged on a 2xx status, otherwise a
/// [`DataError::Remote`] carrying the extracted message.
pub(crate) async fn ensure_success(
    response: reqwest::Response,
) -> Result<reqwest::Response, DataError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<unreadable body>".to_string());
    tracing::debug!(status = status.as_u16(), %body, "Backend returned an error");
    Err(DataError::Remote {
        status: status.as_u16(),
        message: extract_error_message(status.as_u16(), &body),
    })
}

/// Decode a successful JSON response body.
pub(crate) async fn parse_response<T: DeserializeOwned>(
    response: reqwest::Response,
    what: &str,
) -> Result<T, DataError> {
    let response = ensure_success(response).await?;
    let bytes = response.bytes().await.map_err(transport)?;
    serde_json::from_slice(&bytes).map_err(|source| DataError::Decode {
        table: what.to_string(),
        source,
    })
}

/// Assert a success status, discarding the body.
pub(crate) async fn check_status(response: reqwest::Response) -> Result<(), DataError> {
    ensure_success(response).await?;
    Ok(())
}
