use once_cell::sync::Lazy;
use reqwest::StatusCode;
use tracing::{debug, warn};

use crate::completion::{CompletionError, CompletionResult, ErrorBody};
use crate::error::{DecodeError, Result};
use crate::logger::LogConfig;
use crate::request::OutboundRequest;

static CLIENT: Lazy<reqwest::Client> = Lazy::new(reqwest::Client::new);

/// Sends one completion request and turns the response into the translated text.
#[derive(Debug, Clone)]
pub struct CompletionClient {
    http: reqwest::Client,
    log: LogConfig,
}

impl CompletionClient {
    pub fn new(log: LogConfig) -> Self {
        Self::with_http(CLIENT.clone(), log)
    }

    pub fn with_http(http: reqwest::Client, log: LogConfig) -> Self {
        Self { http, log }
    }

    /// One round trip, no retries.
    pub async fn execute(&self, req: OutboundRequest) -> Result<String> {
        if self.log.trace_bodies() {
            debug!(body = %String::from_utf8_lossy(&req.body), "completion request");
        }

        let resp = self
            .http
            .request(req.method, req.url.as_str())
            .headers(req.headers)
            .body(req.body)
            .send()
            .await?;

        let status = resp.status();
        debug!(%status, "completion response received");

        let body = resp.bytes().await?;
        if self.log.trace_bodies() {
            debug!(body = %String::from_utf8_lossy(&body), "completion response body");
        }

        decode_response(status, &body)
    }
}

/// Classifies a response by status: 200 is a `CompletionResult`, anything
/// else is an error body.
pub fn decode_response(status: StatusCode, body: &[u8]) -> Result<String> {
    if status == StatusCode::OK {
        let result: CompletionResult = serde_json::from_slice(body).map_err(|source| {
            DecodeError::Malformed { status: status.as_u16(), shape: "completion result", source }
        })?;
        return result.first_content().ok_or_else(|| DecodeError::NoChoices.into());
    }

    let parsed: ErrorBody = serde_json::from_slice(body).map_err(|source| DecodeError::Malformed {
        status: status.as_u16(),
        shape: "completion error",
        source,
    })?;
    warn!(%status, code = ?parsed.error.code, "completion endpoint rejected request");
    Err(CompletionError { status: status.as_u16(), detail: parsed.error }.into())
}
