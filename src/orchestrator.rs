//! Decision orchestrator
//!
//! The two-stage conditional pipeline at the heart of the backend:
//!
//! FEATURES → APPROVAL → THRESHOLD GATE → (RATE) → CONTEXT OVERWRITE
//!
//! The approval classifier is always consulted; the rate regressor only when
//! the approval confidence clears the configured threshold. The outcome
//! overwrites the single-slot decision context unconditionally, declines
//! included, so chat grounding always reflects the latest call.

use crate::clients::{ApprovalModel, RateModel};
use crate::context::DecisionContextStore;
use crate::features::{LoanFeatures, LoanRequest};
use crate::models::{DecisionContext, DecisionOutcome};
use crate::Result;
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

pub struct DecisionOrchestrator {
    approval: Arc<dyn ApprovalModel>,
    rate: Arc<dyn RateModel>,
    context: DecisionContextStore,
}

impl DecisionOrchestrator {
    pub fn new(
        approval: Arc<dyn ApprovalModel>,
        rate: Arc<dyn RateModel>,
        context: DecisionContextStore,
    ) -> Self {
        Self {
            approval,
            rate,
            context,
        }
    }

    /// Run one loan request through the pipeline.
    ///
    /// An approval-stage error aborts the request and the rate stage never
    /// runs. A rate-stage error after an approval does not: the approval
    /// stands, the rate is omitted, and the context slot is still
    /// overwritten.
    pub async fn decide(&self, request: &LoanRequest) -> Result<DecisionOutcome> {
        let decision_id = Uuid::new_v4();
        let features = LoanFeatures::from_request(request);

        info!(
            %decision_id,
            credit_score = features.avg_credit_score,
            requested_amount = features.avg_requested_amount,
            "Running loan decision pipeline"
        );

        let approval = self.approval.score(&features).await?;

        // The classifier client owns the threshold comparison; the gate
        // here only consumes its verdict.
        let loan_approved = approval.approved;
        info!(
            %decision_id,
            confidence = approval.confidence,
            loan_approved,
            "Approval stage complete"
        );

        // A rate failure does not undo an approval: the decision stands
        // with the rate omitted.
        let rate = if loan_approved {
            match self.rate.predict_rate(&features).await {
                Ok(result) => Some(result),
                Err(e) => {
                    warn!(%decision_id, "Rate prediction unavailable: {}", e);
                    None
                }
            }
        } else {
            None
        };

        let outcome = DecisionOutcome {
            decision_id,
            loan_approved,
            approval_confidence: approval.confidence,
            predicted_interest_rate: rate.as_ref().map(|r| r.predicted_rate),
            approval_model_output: approval.raw_response,
            rate_model_output: rate
                .map(|r| r.raw_response)
                .unwrap_or_else(|| serde_json::json!({})),
            decided_at: Utc::now(),
        };

        // Declines overwrite the slot too; the chat responder must always
        // see the latest outcome, not the latest approval.
        self.context
            .store(DecisionContext {
                decision_id,
                loan_approved: outcome.loan_approved,
                approval_confidence: outcome.approval_confidence,
                predicted_interest_rate: outcome.predicted_interest_rate,
                avg_credit_score: features.avg_credit_score,
                avg_annual_income: features.avg_annual_income,
                avg_requested_amount: features.avg_requested_amount,
                decided_at: outcome.decided_at,
            })
            .await;

        Ok(outcome)
    }
}
