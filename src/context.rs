//! Single-slot decision context store
//!
//! Holds the most recent loan decision for chat grounding. One slot,
//! last-writer-wins: every `/predict` overwrites it unconditionally and
//! `/chat` reads whatever is there. State is process-local with no expiry
//! and is lost on restart. Under concurrent multi-user traffic this is a
//! race between writers; the demo is single-user, so the lock only keeps
//! individual reads and writes consistent.

use crate::models::DecisionContext;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Clone)]
pub struct DecisionContextStore {
    slot: Arc<RwLock<Option<DecisionContext>>>,
}

impl DecisionContextStore {
    pub fn new() -> Self {
        Self {
            slot: Arc::new(RwLock::new(None)),
        }
    }

    /// Overwrite the slot with the latest decision.
    pub async fn store(&self, context: DecisionContext) {
        let mut slot = self.slot.write().await;
        *slot = Some(context);
    }

    /// Latest decision, or `None` before the first `/predict`.
    pub async fn latest(&self) -> Option<DecisionContext> {
        let slot = self.slot.read().await;
        slot.clone()
    }
}

impl Default for DecisionContextStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn context(approved: bool, confidence: f64) -> DecisionContext {
        DecisionContext {
            decision_id: Uuid::new_v4(),
            loan_approved: approved,
            approval_confidence: confidence,
            predicted_interest_rate: approved.then_some(6.1),
            avg_credit_score: 720.0,
            avg_annual_income: 95_000.0,
            avg_requested_amount: 35_000.0,
            decided_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn empty_until_first_store() {
        let store = DecisionContextStore::new();
        assert!(store.latest().await.is_none());
    }

    #[tokio::test]
    async fn store_overwrites_without_merging() {
        let store = DecisionContextStore::new();

        store.store(context(true, 0.9)).await;
        store.store(context(false, 0.4)).await;

        let latest = store.latest().await.unwrap();
        assert!(!latest.loan_approved);
        assert_eq!(latest.approval_confidence, 0.4);
        assert!(latest.predicted_interest_rate.is_none());
    }
}
