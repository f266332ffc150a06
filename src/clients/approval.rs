//! Vertex AI approval classifier client
//!
//! Sends the 4-feature approval vector to the configured `:predict` endpoint
//! and extracts the confidence for the "approved" class from the parallel
//! `classes`/`scores` sequences. Uses a long-lived reqwest::Client for
//! connection pooling.

use super::ApprovalModel;
use crate::auth::TokenProvider;
use crate::error::PipelineError;
use crate::features::LoanFeatures;
use crate::models::{ApprovalResult, ClassificationResponse};
use crate::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

/// Class label the classifier emits for approved loans.
const APPROVED_CLASS_LABEL: &str = "1";

pub struct VertexApprovalClient {
    client: Client,
    endpoint_url: String,
    tokens: Arc<dyn TokenProvider>,
    threshold: f64,
}

impl VertexApprovalClient {
    pub fn new(endpoint_url: String, tokens: Arc<dyn TokenProvider>, threshold: f64) -> Self {
        // No request timeout here: the classification call is allowed to run
        // as long as the gateway lets it (the rate client differs).
        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(8)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            endpoint_url,
            tokens,
            threshold,
        }
    }
}

#[async_trait]
impl ApprovalModel for VertexApprovalClient {
    async fn score(&self, features: &LoanFeatures) -> Result<ApprovalResult> {
        let token = self.tokens.token().await?;

        let body = json!({
            "instances": [{
                "avg_credit_score": features.avg_credit_score,
                "avg_annual_income": features.avg_annual_income,
                "avg_requested_amount": features.avg_requested_amount,
                "loan_to_income_ratio": features.loan_to_income_ratio,
            }]
        });

        info!("Calling approval endpoint: {}", self.endpoint_url);

        let response = self
            .client
            .post(&self.endpoint_url)
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!("Approval endpoint request failed: {}", e);
                PipelineError::UpstreamTransport {
                    endpoint: self.endpoint_url.clone(),
                    detail: e.to_string(),
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Approval endpoint returned {}: {}", status, body);
            return Err(PipelineError::UpstreamStatus {
                endpoint: self.endpoint_url.clone(),
                status: status.as_u16(),
                body,
            });
        }

        let raw: serde_json::Value = response.json().await.map_err(|e| {
            error!("Failed to read approval response: {}", e);
            PipelineError::UpstreamTransport {
                endpoint: self.endpoint_url.clone(),
                detail: e.to_string(),
            }
        })?;

        let confidence = extract_confidence(&raw).ok_or_else(|| {
            PipelineError::MalformedResponse {
                endpoint: self.endpoint_url.clone(),
                body: raw.to_string(),
            }
        })?;

        info!("Approval confidence: {:.4}", confidence);

        Ok(ApprovalResult {
            approved: confidence >= self.threshold,
            confidence,
            raw_response: raw,
        })
    }
}

/// Pull the approved-class score out of a classification response.
///
/// The score is taken at the index of class label "1". When that label is
/// absent the first class's score is used; whether index 0 is the right
/// fallback depends on the model's label ordering, so the case is logged.
pub fn extract_confidence(raw: &serde_json::Value) -> Option<f64> {
    let parsed: ClassificationResponse = serde_json::from_value(raw.clone()).ok()?;
    let prediction = parsed.predictions.first()?;

    let index = match prediction
        .classes
        .iter()
        .position(|c| c == APPROVED_CLASS_LABEL)
    {
        Some(index) => index,
        None => {
            warn!(
                classes = ?prediction.classes,
                "Class label \"1\" not found; falling back to index 0"
            );
            0
        }
    };

    prediction.scores.get(index).copied()
}
