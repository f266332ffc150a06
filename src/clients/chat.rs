//! Text-completion client for the chat endpoint
//!
//! Posts a completions request with fixed sampling parameters and returns
//! the first choice's text, trimmed.

use super::CompletionModel;
use crate::error::PipelineError;
use crate::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{error, info};

const MAX_TOKENS: u32 = 250;
const TEMPERATURE: f64 = 0.5;

pub struct CompletionsClient {
    client: Client,
    url: String,
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    prompt: &'a str,
    max_tokens: u32,
    temperature: f64,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    #[serde(default)]
    text: String,
}

impl CompletionsClient {
    pub fn new(url: String) -> Self {
        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .expect("Failed to build HTTP client");

        Self { client, url }
    }
}

#[async_trait]
impl CompletionModel for CompletionsClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let request = CompletionRequest {
            prompt,
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
        };

        info!("Calling chat completion endpoint");

        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                error!("Completion request failed: {}", e);
                PipelineError::UpstreamTransport {
                    endpoint: self.url.clone(),
                    detail: e.to_string(),
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Completion endpoint returned {}: {}", status, body);
            return Err(PipelineError::UpstreamStatus {
                endpoint: self.url.clone(),
                status: status.as_u16(),
                body,
            });
        }

        let raw: serde_json::Value = response.json().await.map_err(|e| {
            PipelineError::UpstreamTransport {
                endpoint: self.url.clone(),
                detail: e.to_string(),
            }
        })?;

        let parsed: CompletionResponse = serde_json::from_value(raw.clone())
            .map_err(|_| PipelineError::MalformedResponse {
                endpoint: self.url.clone(),
                body: raw.to_string(),
            })?;

        let text = parsed
            .choices
            .first()
            .map(|choice| choice.text.trim().to_string())
            .ok_or_else(|| PipelineError::MalformedResponse {
                endpoint: self.url.clone(),
                body: raw.to_string(),
            })?;

        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serializes_with_fixed_sampling_parameters() {
        let request = CompletionRequest {
            prompt: "Explain my loan decision",
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["max_tokens"], 250);
        assert_eq!(json["temperature"], 0.5);
        assert_eq!(json["prompt"], "Explain my loan decision");
    }

    #[test]
    fn first_choice_text_is_used() {
        let body = r#"{"choices":[{"text":"  You were approved.  "},{"text":"ignored"}]}"#;
        let parsed: CompletionResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.choices[0].text.trim(), "You were approved.");
    }
}
