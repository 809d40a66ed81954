use std::time::Duration;

use async_trait::async_trait;
use common::{
    env_config::OpenAiConfig,
    error::{AppError, Res},
};
use reqwest::Client;
use serde::Serialize;

use crate::{
    models::completion::{ChatMessage, Completion},
    services::provider::CompletionProvider,
};

/// Client of an OpenAI-compatible `/chat/completions` endpoint.
pub struct OpenAiClient {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
    temperature: f32,
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: &'a [ChatMessage],
}

impl OpenAiClient {
    pub fn new(config: &OpenAiConfig) -> Res<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(OpenAiClient {
            client,
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
        })
    }
}

#[async_trait]
impl CompletionProvider for OpenAiClient {
    async fn complete(&self, messages: &[ChatMessage]) -> Res<Completion> {
        let request = CompletionRequest {
            model: &self.model,
            temperature: self.temperature,
            messages,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::Upstream(e.to_string()))?;

        let status = response.status();
        let body: serde_json::Value = if status.is_success() {
            response
                .json()
                .await
                .map_err(|e| AppError::Upstream(format!("invalid response body: {}", e)))?
        } else {
            let text = response.text().await.unwrap_or_default();
            return Err(AppError::Upstream(format!(
                "{} {}",
                status,
                error_message(&text)
            )));
        };

        parse_completion(&body)
    }
}

/// Extracts the reply and the billed tokens from a completion response.
fn parse_completion(body: &serde_json::Value) -> Res<Completion> {
    let message = body["choices"]
        .get(0)
        .map(|choice| &choice["message"])
        .ok_or_else(|| AppError::Upstream("response has no choices".to_string()))?;

    Ok(Completion {
        reply: message["content"].as_str().unwrap_or("").to_string(),
        total_tokens: body["usage"]["total_tokens"].as_u64().unwrap_or(0),
    })
}

/// `error.message` of an OpenAI error body, the raw text otherwise.
fn error_message(text: &str) -> String {
    serde_json::from_str::<serde_json::Value>(text)
        .ok()
        .and_then(|body| body["error"]["message"].as_str().map(String::from))
        .unwrap_or_else(|| text.to_string())
}
