use async_trait::async_trait;
use tracing::debug;

use crate::client::CompletionClient;
use crate::error::Result;
use crate::logger::LogConfig;
use crate::request::build_request;

pub const DRY_RUN_TRANSLATION: &str = "dry run: 翻訳はスキップされました";

#[async_trait]
pub trait Translator: Send + Sync + 'static {
    async fn translate(&self, text: &str) -> Result<String>;
}

/// Translates through the OpenAI chat completion endpoint.
pub struct OpenAiTranslator {
    api_key: String,
    client: CompletionClient,
}

impl OpenAiTranslator {
    pub fn new(api_key: impl Into<String>, log: LogConfig) -> Self {
        Self::with_client(api_key, CompletionClient::new(log))
    }

    pub fn with_client(api_key: impl Into<String>, client: CompletionClient) -> Self {
        Self { api_key: api_key.into(), client }
    }
}

#[async_trait]
impl Translator for OpenAiTranslator {
    async fn translate(&self, text: &str) -> Result<String> {
        let request = build_request(text, &self.api_key)?;
        debug!(chars = text.chars().count(), url = %request.url, "requesting translation");
        self.client.execute(request).await
    }
}

/// Answers with a fixed string and never touches the network.
pub struct DryRunTranslator;

#[async_trait]
impl Translator for DryRunTranslator {
    async fn translate(&self, _text: &str) -> Result<String> {
        Ok(DRY_RUN_TRANSLATION.to_string())
    }
}
