//! Core data models for the loan decision pipeline
//!
//! Domain shapes plus the wire formats spoken to the model-serving gateways:
//! the KServe v2 tensor envelope and the Vertex AI classification response.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

//
// ================= Decision =================
//

/// Outcome of the approval-classifier call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApprovalResult {
    pub approved: bool,
    /// Classifier score for the "approved" class, in [0, 1].
    pub confidence: f64,
    /// Raw upstream response, kept for debuggability.
    pub raw_response: serde_json::Value,
}

/// Outcome of the rate-regressor call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateResult {
    pub predicted_rate: f64,
    pub raw_response: serde_json::Value,
}

/// Final `/predict` response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionOutcome {
    pub decision_id: Uuid,
    pub loan_approved: bool,
    pub approval_confidence: f64,
    /// Absent when the loan was declined.
    pub predicted_interest_rate: Option<f64>,
    pub approval_model_output: serde_json::Value,
    pub rate_model_output: serde_json::Value,
    pub decided_at: DateTime<Utc>,
}

/// The single most-recent decision, cached in process memory so the chat
/// endpoint can ground its answers. Overwritten by every `/predict` call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionContext {
    pub decision_id: Uuid,
    pub loan_approved: bool,
    pub approval_confidence: f64,
    pub predicted_interest_rate: Option<f64>,
    pub avg_credit_score: f64,
    pub avg_annual_income: f64,
    pub avg_requested_amount: f64,
    pub decided_at: DateTime<Utc>,
}

//
// ================= Chat =================
//

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatReply {
    pub response: String,
}

//
// ================= KServe v2 envelope =================
//

/// One named tensor in a v2 infer request or response: shape and datatype
/// metadata plus a flat numeric data array.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InferTensor {
    pub name: String,
    pub shape: Vec<usize>,
    pub datatype: String,
    pub data: Vec<f64>,
}

impl InferTensor {
    /// Single-row FP32 tensor, shape `[1, data.len()]`.
    pub fn fp32_row(name: &str, data: Vec<f64>) -> Self {
        Self {
            name: name.to_string(),
            shape: vec![1, data.len()],
            datatype: "FP32".to_string(),
            data,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InferRequest {
    pub inputs: Vec<InferTensor>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InferResponse {
    #[serde(default)]
    pub outputs: Vec<InferTensor>,
}

//
// ================= Vertex classification =================
//

/// One classification prediction: parallel class-label and score sequences.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassPrediction {
    #[serde(default)]
    pub classes: Vec<String>,
    #[serde(default)]
    pub scores: Vec<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationResponse {
    #[serde(default)]
    pub predictions: Vec<ClassPrediction>,
}
