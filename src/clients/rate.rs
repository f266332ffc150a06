//! KServe v2 interest-rate regressor client
//!
//! Wraps the 5-feature rate vector in a v2 tensor envelope (named input,
//! shape `[1, 5]`, FP32, flat data array) and extracts the first scalar of
//! the selected output tensor as the predicted rate.

use super::RateModel;
use crate::error::PipelineError;
use crate::features::LoanFeatures;
use crate::models::{InferRequest, InferResponse, InferTensor, RateResult};
use crate::Result;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{error, info};

/// Fixed request timeout on the rate call.
const RATE_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

pub struct KserveRateClient {
    client: Client,
    model_url: String,
    input_name: String,
    /// Output tensor to select; first output when unset.
    output_name: Option<String>,
}

impl KserveRateClient {
    pub fn new(
        model_url: String,
        model_version: Option<String>,
        input_name: String,
        output_name: Option<String>,
    ) -> Self {
        let client = Client::builder()
            .timeout(RATE_REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build HTTP client");

        // Infer URLs look like .../v2/models/<model>/infer; a version
        // override rides along as a query parameter.
        let model_url = match model_version {
            Some(version) if model_url.contains('?') => {
                format!("{}&version={}", model_url, version)
            }
            Some(version) => format!("{}?version={}", model_url, version),
            None => model_url,
        };

        Self {
            client,
            model_url,
            input_name,
            output_name,
        }
    }

    fn select_output<'a>(&self, outputs: &'a [InferTensor]) -> Option<&'a InferTensor> {
        if let Some(wanted) = &self.output_name {
            if let Some(output) = outputs.iter().find(|o| &o.name == wanted) {
                return Some(output);
            }
        }
        outputs.first()
    }
}

#[async_trait]
impl RateModel for KserveRateClient {
    async fn predict_rate(&self, features: &LoanFeatures) -> Result<RateResult> {
        let request = InferRequest {
            inputs: vec![InferTensor::fp32_row(
                &self.input_name,
                features.rate_vector().to_vec(),
            )],
        };

        info!("Calling rate endpoint: {}", self.model_url);

        let response = self
            .client
            .post(&self.model_url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                error!("Rate endpoint request failed: {}", e);
                PipelineError::UpstreamTransport {
                    endpoint: self.model_url.clone(),
                    detail: e.to_string(),
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Rate endpoint returned {}: {}", status, body);
            return Err(PipelineError::UpstreamStatus {
                endpoint: self.model_url.clone(),
                status: status.as_u16(),
                body,
            });
        }

        let raw: serde_json::Value = response.json().await.map_err(|e| {
            error!("Failed to read rate response: {}", e);
            PipelineError::UpstreamTransport {
                endpoint: self.model_url.clone(),
                detail: e.to_string(),
            }
        })?;

        let parsed: InferResponse = serde_json::from_value(raw.clone()).map_err(|_| {
            PipelineError::MalformedResponse {
                endpoint: self.model_url.clone(),
                body: raw.to_string(),
            }
        })?;

        let predicted_rate = self
            .select_output(&parsed.outputs)
            .and_then(|output| output.data.first())
            .copied()
            .ok_or_else(|| PipelineError::MalformedResponse {
                endpoint: self.model_url.clone(),
                body: raw.to_string(),
            })?;

        info!("Predicted interest rate: {:.4}", predicted_rate);

        Ok(RateResult {
            predicted_rate,
            raw_response: raw,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(output_name: Option<&str>) -> KserveRateClient {
        KserveRateClient::new(
            "https://rate.example/v2/models/interest-rate/infer".to_string(),
            None,
            "input:0".to_string(),
            output_name.map(str::to_string),
        )
    }

    fn tensor(name: &str, data: Vec<f64>) -> InferTensor {
        InferTensor {
            name: name.to_string(),
            shape: vec![1, data.len()],
            datatype: "FP32".to_string(),
            data,
        }
    }

    #[test]
    fn version_override_becomes_query_parameter() {
        let with_version = KserveRateClient::new(
            "https://rate.example/v2/models/interest-rate/infer".to_string(),
            Some("5".to_string()),
            "input:0".to_string(),
            None,
        );
        assert_eq!(
            with_version.model_url,
            "https://rate.example/v2/models/interest-rate/infer?version=5"
        );

        let with_query = KserveRateClient::new(
            "https://rate.example/infer?foo=bar".to_string(),
            Some("5".to_string()),
            "input:0".to_string(),
            None,
        );
        assert_eq!(with_query.model_url, "https://rate.example/infer?foo=bar&version=5");
    }

    #[test]
    fn unnamed_selection_takes_first_output() {
        let outputs = vec![tensor("Identity:0", vec![6.2]), tensor("aux", vec![9.9])];
        let selected = client(None).select_output(&outputs).unwrap();
        assert_eq!(selected.name, "Identity:0");
    }

    #[test]
    fn named_selection_matches_by_name() {
        let outputs = vec![tensor("Identity:0", vec![6.2]), tensor("aux", vec![9.9])];
        let selected = client(Some("aux")).select_output(&outputs).unwrap();
        assert_eq!(selected.data, vec![9.9]);
    }

    #[test]
    fn unmatched_name_falls_back_to_first_output() {
        let outputs = vec![tensor("Identity:0", vec![6.2])];
        let selected = client(Some("missing")).select_output(&outputs).unwrap();
        assert_eq!(selected.name, "Identity:0");
    }

    #[test]
    fn empty_outputs_selects_nothing() {
        assert!(client(None).select_output(&[]).is_none());
    }
}
