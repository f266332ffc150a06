//! Borrower feature normalization
//!
//! Maps a partial borrower payload into the two fixed-order feature vectors
//! the externally trained models expect. Missing fields take documented
//! defaults; no physical-plausibility validation is performed beyond the
//! divide-by-zero guard on income.

use serde::{Deserialize, Serialize};

pub const DEFAULT_CREDIT_SCORE: f64 = 650.0;
pub const DEFAULT_ANNUAL_INCOME: f64 = 100_000.0;
pub const DEFAULT_REQUESTED_AMOUNT: f64 = 50_000.0;
pub const DEFAULT_TENOR_MONTHS: f64 = 60.0;
pub const DEFAULT_TOTAL_PAST_DUE: f64 = 0.05;

/// Inbound `/predict` body. Every field is optional; absent fields silently
/// take the defaults above rather than failing the request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoanRequest {
    pub avg_credit_score: Option<f64>,
    pub avg_annual_income: Option<f64>,
    pub avg_requested_amount: Option<f64>,
    pub avg_requested_tenor_months: Option<f64>,
    pub total_past_due: Option<f64>,
}

/// Normalized borrower features, immutable once constructed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct LoanFeatures {
    pub avg_credit_score: f64,
    pub avg_annual_income: f64,
    pub avg_requested_amount: f64,
    pub avg_requested_tenor_months: f64,
    pub total_past_due: f64,
    pub loan_to_income_ratio: f64,
}

impl LoanFeatures {
    pub fn from_request(req: &LoanRequest) -> Self {
        let avg_credit_score = req.avg_credit_score.unwrap_or(DEFAULT_CREDIT_SCORE);
        let avg_annual_income = req.avg_annual_income.unwrap_or(DEFAULT_ANNUAL_INCOME);
        let avg_requested_amount = req.avg_requested_amount.unwrap_or(DEFAULT_REQUESTED_AMOUNT);
        let avg_requested_tenor_months = req
            .avg_requested_tenor_months
            .unwrap_or(DEFAULT_TENOR_MONTHS);
        let total_past_due = req.total_past_due.unwrap_or(DEFAULT_TOTAL_PAST_DUE);

        Self {
            avg_credit_score,
            avg_annual_income,
            avg_requested_amount,
            avg_requested_tenor_months,
            total_past_due,
            loan_to_income_ratio: avg_requested_amount / avg_annual_income.max(1.0),
        }
    }

    /// Feature vector for the approval classifier. Order is fixed and must
    /// match the classifier's training schema.
    pub fn approval_vector(&self) -> [f64; 4] {
        [
            self.avg_credit_score,
            self.avg_annual_income,
            self.avg_requested_amount,
            self.loan_to_income_ratio,
        ]
    }

    /// Feature vector for the rate regressor. Order is fixed and must match
    /// the regressor's training schema.
    pub fn rate_vector(&self) -> [f64; 5] {
        [
            self.avg_credit_score,
            self.avg_annual_income,
            self.avg_requested_amount,
            self.avg_requested_tenor_months,
            self.total_past_due,
        ]
    }
}

impl From<&LoanRequest> for LoanFeatures {
    fn from(req: &LoanRequest) -> Self {
        Self::from_request(req)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_request_takes_all_defaults() {
        let features = LoanFeatures::from_request(&LoanRequest::default());

        assert_eq!(features.avg_credit_score, DEFAULT_CREDIT_SCORE);
        assert_eq!(features.avg_annual_income, DEFAULT_ANNUAL_INCOME);
        assert_eq!(features.avg_requested_amount, DEFAULT_REQUESTED_AMOUNT);
        assert_eq!(features.avg_requested_tenor_months, DEFAULT_TENOR_MONTHS);
        assert_eq!(features.total_past_due, DEFAULT_TOTAL_PAST_DUE);
        assert_eq!(features.loan_to_income_ratio, 50_000.0 / 100_000.0);
    }

    #[test]
    fn partial_request_fills_only_missing_fields() {
        let req = LoanRequest {
            avg_credit_score: Some(720.0),
            avg_requested_amount: Some(35_000.0),
            ..Default::default()
        };
        let features = LoanFeatures::from_request(&req);

        assert_eq!(features.avg_credit_score, 720.0);
        assert_eq!(features.avg_requested_amount, 35_000.0);
        assert_eq!(features.avg_annual_income, DEFAULT_ANNUAL_INCOME);
        assert_eq!(features.total_past_due, DEFAULT_TOTAL_PAST_DUE);
    }

    #[test]
    fn vector_lengths_and_order_are_fixed() {
        let req = LoanRequest {
            avg_credit_score: Some(720.0),
            avg_annual_income: Some(95_000.0),
            avg_requested_amount: Some(35_000.0),
            avg_requested_tenor_months: Some(60.0),
            total_past_due: Some(0.04),
        };
        let features = LoanFeatures::from_request(&req);

        assert_eq!(
            features.approval_vector(),
            [720.0, 95_000.0, 35_000.0, 35_000.0 / 95_000.0]
        );
        assert_eq!(
            features.rate_vector(),
            [720.0, 95_000.0, 35_000.0, 60.0, 0.04]
        );
    }

    #[test]
    fn zero_income_is_guarded_against_division() {
        let req = LoanRequest {
            avg_annual_income: Some(0.0),
            avg_requested_amount: Some(40_000.0),
            ..Default::default()
        };
        let features = LoanFeatures::from_request(&req);

        assert_eq!(features.loan_to_income_ratio, 40_000.0);
    }

    #[test]
    fn malformed_fields_are_rejected_by_serde() {
        // Permissive on absence, not on type: a non-numeric field is a 422
        // at the API layer, never a silent default.
        let result: std::result::Result<LoanRequest, _> =
            serde_json::from_str(r#"{"avg_credit_score": "high"}"#);
        assert!(result.is_err());
    }
}
