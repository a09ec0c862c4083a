//! Plumbing shared by the REST collaborators.

use std::time::Duration;

use reqwest::{Client, Response};
use serde_json::Value;
use tracing::warn;
use url::Url;

use crate::errors::AdminError;

/// Builds the one HTTP client the process shares between both collaborators.
///
/// # Errors
///
/// Returns an error if the TLS backend can't be initialised.
pub fn build_http_client(timeout: Duration) -> Result<Client, AdminError> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| AdminError::UpstreamFailure(format!("Failed to create HTTP client: {e}")))
}

/// Appends `path` to `base`, keeping any path prefix `base` already carries.
///
/// # Errors
///
/// Returns an error if the joined URL doesn't parse.
pub fn endpoint(base: &Url, path: &str) -> Result<Url, AdminError> {
    let mut root = base.as_str().trim_end_matches('/').to_string();
    root.push('/');
    root.push_str(path.trim_start_matches('/'));
    Url::parse(&root).map_err(|e| AdminError::UpstreamFailure(format!("bad endpoint {root}: {e}")))
}

/// Turns a non-2xx response into `UpstreamFailure` carrying the provider's own
/// error message, and returns the JSON body otherwise.
///
/// # Errors
///
/// Returns an error for non-success statuses or undecodable bodies.
pub async fn read_json(response: Response, operation: &str) -> Result<Value, AdminError> {
    let status = response.status();
    let text = response.text().await?;

    if !status.is_success() {
        let message = serde_json::from_str::<Value>(&text)
            .ok()
            .and_then(|v| {
                v.get("error")
                    .and_then(|e| e.get("message"))
                    .and_then(Value::as_str)
                    .map(ToString::to_string)
            })
            .unwrap_or(text);
        warn!(%status, operation, "Upstream call rejected: {}", message);
        return Err(AdminError::UpstreamFailure(format!(
            "{operation} failed ({status}): {message}"
        )));
    }

    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_str(&text)?)
}
