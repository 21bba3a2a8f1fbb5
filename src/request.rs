use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Method;

use crate::completion::{CompletionRequest, Message};
use crate::error::{ConfigError, Error, Result};

pub const ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
pub const MODEL: &str = "gpt-3.5-turbo-1106";
pub const INSTRUCTION: &str = "Translate this into Japanese.\n\n";

/// A fully formed request, ready to hand to the completion client.
#[derive(Debug, Clone)]
pub struct OutboundRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

pub fn build_prompt(text: &str) -> String {
    format!("{INSTRUCTION}{text}")
}

pub fn completion_request(text: &str) -> CompletionRequest {
    CompletionRequest {
        model: MODEL.to_string(),
        messages: vec![Message::user(build_prompt(text))],
    }
}

/// Builds the translation request for `text`. Performs no I/O.
pub fn build_request(text: &str, api_key: &str) -> Result<OutboundRequest> {
    if api_key.is_empty() {
        return Err(ConfigError::MissingCredential.into());
    }
    let mut auth = HeaderValue::from_str(&format!("Bearer {api_key}"))
        .map_err(|_| ConfigError::InvalidCredential)?;
    auth.set_sensitive(true);

    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(AUTHORIZATION, auth);

    let body = serde_json::to_vec(&completion_request(text)).map_err(Error::Encode)?;

    Ok(OutboundRequest {
        method: Method::POST,
        url: ENDPOINT.to_string(),
        headers,
        body,
    })
}
