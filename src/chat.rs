//! Chat responder
//!
//! Grounds free-text questions in the latest loan decision. Reads the
//! single-slot context store, interpolates it into a fixed prompt template
//! and forwards the prompt to the completion model.

use crate::clients::CompletionModel;
use crate::context::DecisionContextStore;
use crate::models::DecisionContext;
use crate::Result;
use std::sync::Arc;
use tracing::info;

const NO_CONTEXT_PLACEHOLDER: &str = "No loan decision context available yet.";

pub struct ChatResponder {
    completions: Arc<dyn CompletionModel>,
    context: DecisionContextStore,
}

impl ChatResponder {
    pub fn new(completions: Arc<dyn CompletionModel>, context: DecisionContextStore) -> Self {
        Self {
            completions,
            context,
        }
    }

    /// Answer a user message, grounded in the latest decision if one exists.
    pub async fn respond(&self, message: &str) -> Result<String> {
        let latest = self.context.latest().await;
        info!(has_context = latest.is_some(), "Handling chat message");

        let prompt = build_prompt(message, latest.as_ref());
        self.completions.complete(&prompt).await
    }
}

fn summarize_context(context: Option<&DecisionContext>) -> String {
    match context {
        Some(ctx) => {
            let rate = match ctx.predicted_interest_rate {
                Some(rate) => format!("{:.2}", rate),
                None => "N/A".to_string(),
            };
            format!(
                "Loan Approved: {}\n\
                 Confidence: {:.2}\n\
                 Predicted Interest Rate: {}\n\
                 Credit Score: {}\n\
                 Annual Income: {}\n\
                 Requested Amount: {}\n",
                if ctx.loan_approved { "Yes" } else { "No" },
                ctx.approval_confidence,
                rate,
                ctx.avg_credit_score,
                ctx.avg_annual_income,
                ctx.avg_requested_amount,
            )
        }
        None => NO_CONTEXT_PLACEHOLDER.to_string(),
    }
}

fn build_prompt(message: &str, context: Option<&DecisionContext>) -> String {
    format!(
        "You are a smart and empathetic financial assistant helping users understand their loan results.\n\
         \n\
         Context from the latest loan prediction:\n\
         {context}\n\
         \n\
         User asked: \"{message}\"\n\
         \n\
         Respond based on the above context.\n\
         If the loan was denied, explain why and give 2-3 clear improvement tips.\n\
         If approved, explain what helped and how to reduce the interest rate further.\n\
         Be concise, friendly, and encouraging.",
        context = summarize_context(context),
        message = message,
    )
}
