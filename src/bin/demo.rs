use loan_decision_backend::{
    clients::{MockApprovalModel, MockRateModel},
    context::DecisionContextStore,
    features::LoanRequest,
    orchestrator::DecisionOrchestrator,
};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    info!("Loan Decision Backend demo starting");

    // Mock clients keep the pipeline runnable without any live
    // model-serving endpoints.
    let context = DecisionContextStore::new();
    let orchestrator = DecisionOrchestrator::new(
        Arc::new(MockApprovalModel {
            confidence: 0.8,
            threshold: 0.75,
        }),
        Arc::new(MockRateModel { rate: 6.13 }),
        context.clone(),
    );

    let request = LoanRequest {
        avg_credit_score: Some(720.0),
        avg_annual_income: Some(95_000.0),
        avg_requested_amount: Some(35_000.0),
        avg_requested_tenor_months: Some(60.0),
        total_past_due: Some(0.04),
    };

    info!(?request, "Running decision pipeline");

    match orchestrator.decide(&request).await {
        Ok(outcome) => {
            println!("\n=== LOAN DECISION ===");
            println!("Decision ID: {}", outcome.decision_id);
            println!("Approved: {}", outcome.loan_approved);
            println!("Confidence: {:.2}", outcome.approval_confidence);
            match outcome.predicted_interest_rate {
                Some(rate) => println!("Predicted Rate: {:.2}%", rate),
                None => println!("Predicted Rate: n/a (declined)"),
            }

            if let Some(cached) = context.latest().await {
                println!("\nCached context for chat grounding:");
                println!(
                    "  approved={} confidence={:.2} credit_score={}",
                    cached.loan_approved, cached.approval_confidence, cached.avg_credit_score
                );
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("Decision pipeline failed: {}", e);
            Err(Box::new(e) as Box<dyn std::error::Error>)
        }
    }
}
