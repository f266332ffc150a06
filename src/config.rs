//! Environment-backed configuration
//!
//! All tunables come from the environment (`.env` is loaded by the binaries).
//! Missing required variables fail `from_env`, so the process refuses to
//! start rather than limping along with a half-configured pipeline.

use crate::error::PipelineError;
use crate::Result;
use std::env;

/// Default input tensor name; TF→ONNX exports commonly use "input:0".
pub const DEFAULT_RATE_INPUT_NAME: &str = "input:0";

/// Minimum classifier score for the "approved" class required to proceed
/// to rate prediction.
pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.75;

#[derive(Debug, Clone)]
pub struct Config {
    /// GCP project hosting the approval classifier endpoint.
    pub vertex_project_id: String,
    pub vertex_region: String,
    pub vertex_endpoint_id: String,

    /// KServe v2 infer URL for the interest-rate regressor.
    pub rate_model_url: String,
    /// Appended as `?version=` to the rate model URL when set.
    pub rate_model_version: Option<String>,
    pub rate_input_name: String,
    /// Output tensor to select; first output is used when unset.
    pub rate_output_name: Option<String>,

    /// Completions URL for the chat model.
    pub chat_model_url: String,

    pub confidence_threshold: f64,
    pub port: u16,
}

impl Config {
    /// Load configuration from the environment.
    ///
    /// `VERTEX_PROJECT_ID`, `VERTEX_ENDPOINT_ID`, `RATE_MODEL_URL` and
    /// `CHAT_MODEL_URL` are required; everything else has a default.
    pub fn from_env() -> Result<Self> {
        let confidence_threshold = match env::var("CONFIDENCE_THRESHOLD") {
            Ok(raw) => raw.parse::<f64>().map_err(|_| {
                PipelineError::Config(format!(
                    "CONFIDENCE_THRESHOLD must be a float, got {:?}",
                    raw
                ))
            })?,
            Err(_) => DEFAULT_CONFIDENCE_THRESHOLD,
        };

        let port = match env::var("PORT").or_else(|_| env::var("API_PORT")) {
            Ok(raw) => raw.parse::<u16>().map_err(|_| {
                PipelineError::Config(format!("PORT must be a u16, got {:?}", raw))
            })?,
            Err(_) => 8080,
        };

        Ok(Self {
            vertex_project_id: require("VERTEX_PROJECT_ID")?,
            vertex_region: env::var("VERTEX_REGION")
                .unwrap_or_else(|_| "us-central1".to_string()),
            vertex_endpoint_id: require("VERTEX_ENDPOINT_ID")?,
            rate_model_url: require("RATE_MODEL_URL")?,
            rate_model_version: optional("RATE_MODEL_VERSION"),
            rate_input_name: env::var("RATE_MODEL_INPUT_NAME")
                .unwrap_or_else(|_| DEFAULT_RATE_INPUT_NAME.to_string()),
            rate_output_name: optional("RATE_MODEL_OUTPUT_NAME"),
            chat_model_url: require("CHAT_MODEL_URL")?,
            confidence_threshold,
            port,
        })
    }

    /// Vertex AI `:predict` URL for the approval classifier.
    pub fn approval_endpoint_url(&self) -> String {
        format!(
            "https://{region}-aiplatform.googleapis.com/v1/projects/{project}/locations/{region}/endpoints/{endpoint}:predict",
            region = self.vertex_region,
            project = self.vertex_project_id,
            endpoint = self.vertex_endpoint_id,
        )
    }
}

fn require(name: &str) -> Result<String> {
    env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| {
            PipelineError::Config(format!("missing required environment variable {}", name))
        })
}

fn optional(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn approval_url_shape() {
        let config = Config {
            vertex_project_id: "demo-project".into(),
            vertex_region: "us-central1".into(),
            vertex_endpoint_id: "12345".into(),
            rate_model_url: "https://rate.example/v2/models/interest-rate/infer".into(),
            rate_model_version: None,
            rate_input_name: DEFAULT_RATE_INPUT_NAME.into(),
            rate_output_name: None,
            chat_model_url: "https://chat.example/v1/completions".into(),
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            port: 8080,
        };

        assert_eq!(
            config.approval_endpoint_url(),
            "https://us-central1-aiplatform.googleapis.com/v1/projects/demo-project/locations/us-central1/endpoints/12345:predict"
        );
    }
}
