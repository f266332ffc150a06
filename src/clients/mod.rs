//! Model-serving client traits and implementations
//!
//! Each upstream endpoint sits behind a trait so the orchestrator and the
//! demo binary can run against mocks without any live model-serving
//! infrastructure.

use crate::features::LoanFeatures;
use crate::models::{ApprovalResult, RateResult};
use crate::Result;
use async_trait::async_trait;

pub mod approval;
pub mod chat;
pub mod rate;

pub use approval::VertexApprovalClient;
pub use chat::CompletionsClient;
pub use rate::KserveRateClient;

/// Approval classifier: confidence that the loan should be approved.
#[async_trait]
pub trait ApprovalModel: Send + Sync {
    async fn score(&self, features: &LoanFeatures) -> Result<ApprovalResult>;
}

/// Interest-rate regressor, consulted only for approved loans.
#[async_trait]
pub trait RateModel: Send + Sync {
    async fn predict_rate(&self, features: &LoanFeatures) -> Result<RateResult>;
}

/// Text-completion model behind the chat endpoint.
#[async_trait]
pub trait CompletionModel: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;
}

/// Mock approval model with a fixed confidence.
/// Keeps the pipeline runnable without a live classifier.
pub struct MockApprovalModel {
    pub confidence: f64,
    pub threshold: f64,
}

#[async_trait]
impl ApprovalModel for MockApprovalModel {
    async fn score(&self, _features: &LoanFeatures) -> Result<ApprovalResult> {
        Ok(ApprovalResult {
            approved: self.confidence >= self.threshold,
            confidence: self.confidence,
            raw_response: serde_json::json!({
                "predictions": [{
                    "classes": ["0", "1"],
                    "scores": [1.0 - self.confidence, self.confidence],
                }]
            }),
        })
    }
}

/// Mock rate model returning a fixed rate.
pub struct MockRateModel {
    pub rate: f64,
}

#[async_trait]
impl RateModel for MockRateModel {
    async fn predict_rate(&self, _features: &LoanFeatures) -> Result<RateResult> {
        Ok(RateResult {
            predicted_rate: self.rate,
            raw_response: serde_json::json!({
                "outputs": [{
                    "name": "Identity:0",
                    "shape": [1, 1],
                    "datatype": "FP32",
                    "data": [self.rate],
                }]
            }),
        })
    }
}

/// Mock completion model echoing the prompt length.
pub struct MockCompletionModel;

#[async_trait]
impl CompletionModel for MockCompletionModel {
    async fn complete(&self, prompt: &str) -> Result<String> {
        Ok(format!(
            "Mock completion ({} prompt chars). Configure CHAT_MODEL_URL for real answers.",
            prompt.len()
        ))
    }
}
