//! Loan Decision Backend
//!
//! A demo loan-approval pipeline that:
//! - Normalizes borrower payloads into fixed-order feature vectors
//! - Delegates approval to an external classification endpoint
//! - Delegates interest-rate prediction to a KServe v2 regression endpoint
//! - Gates the rate call on a configurable confidence threshold
//! - Grounds a chat endpoint in the most recent decision
//!
//! PIPELINE:
//! FEATURES → APPROVAL → THRESHOLD GATE → RATE? → CONTEXT → (CHAT)

pub mod api;
pub mod auth;
pub mod chat;
pub mod clients;
pub mod config;
pub mod context;
pub mod error;
pub mod features;
pub mod models;
pub mod orchestrator;

pub use error::Result;

// Re-export common types
pub use config::Config;
pub use context::DecisionContextStore;
pub use features::{LoanFeatures, LoanRequest};
pub use models::*;
pub use orchestrator::DecisionOrchestrator;
