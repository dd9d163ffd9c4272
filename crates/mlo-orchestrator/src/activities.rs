//! # Activities
//!
//! The boundary between the orchestrator and the work each stage
//! performs. Real implementations call vendor integrations (through
//! `mlo-integration`), the compliance engine, and human task queues;
//! tests script them.
//!
//! An activity reports success or failure with a human-readable reason —
//! a failed report is a *business* outcome the orchestrator maps through
//! its gating policy. An `Err(ActivityFailure)` is an *operational*
//! fault and always terminates the run as a denial.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use mlo_core::{Loan, OpContext};

/// An unrecoverable activity fault (infrastructure down, invariant
/// broken). Treated as a gating failure wherever it occurs.
#[derive(Error, Debug)]
#[error("activity failed: {0}")]
pub struct ActivityFailure(pub String);

/// The structured result every activity returns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityReport {
    pub success: bool,
    /// Human-readable reason, surfaced in notifications.
    pub reason: String,
    /// Structured details (credit score, appraisal id, violation
    /// counts, …).
    pub data: Option<Value>,
}

impl ActivityReport {
    pub fn ok(reason: impl Into<String>) -> Self {
        Self {
            success: true,
            reason: reason.into(),
            data: None,
        }
    }

    pub fn ok_with(reason: impl Into<String>, data: Value) -> Self {
        Self {
            success: true,
            reason: reason.into(),
            data: Some(data),
        }
    }

    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            success: false,
            reason: reason.into(),
            data: None,
        }
    }
}

/// One method per stage. The orchestrator owns ordering, status
/// transitions, and the gating policy; activities own the work.
pub trait Activities: Send + Sync {
    fn validate_application(
        &self,
        loan: &Loan,
        ctx: &OpContext,
    ) -> impl std::future::Future<Output = Result<ActivityReport, ActivityFailure>> + Send;

    fn collect_documents(
        &self,
        loan: &Loan,
        ctx: &OpContext,
    ) -> impl std::future::Future<Output = Result<ActivityReport, ActivityFailure>> + Send;

    fn run_credit_check(
        &self,
        loan: &Loan,
        ctx: &OpContext,
    ) -> impl std::future::Future<Output = Result<ActivityReport, ActivityFailure>> + Send;

    fn verify_income(
        &self,
        loan: &Loan,
        ctx: &OpContext,
    ) -> impl std::future::Future<Output = Result<ActivityReport, ActivityFailure>> + Send;

    fn order_appraisal(
        &self,
        loan: &Loan,
        ctx: &OpContext,
    ) -> impl std::future::Future<Output = Result<ActivityReport, ActivityFailure>> + Send;

    fn run_compliance_check(
        &self,
        loan: &Loan,
        ctx: &OpContext,
    ) -> impl std::future::Future<Output = Result<ActivityReport, ActivityFailure>> + Send;

    fn underwriting_review(
        &self,
        loan: &Loan,
        ctx: &OpContext,
    ) -> impl std::future::Future<Output = Result<ActivityReport, ActivityFailure>> + Send;

    fn final_approval(
        &self,
        loan: &Loan,
        ctx: &OpContext,
    ) -> impl std::future::Future<Output = Result<ActivityReport, ActivityFailure>> + Send;

    fn prepare_closing(
        &self,
        loan: &Loan,
        ctx: &OpContext,
    ) -> impl std::future::Future<Output = Result<ActivityReport, ActivityFailure>> + Send;

    fn process_closing(
        &self,
        loan: &Loan,
        ctx: &OpContext,
    ) -> impl std::future::Future<Output = Result<ActivityReport, ActivityFailure>> + Send;

    fn fund_loan(
        &self,
        loan: &Loan,
        ctx: &OpContext,
    ) -> impl std::future::Future<Output = Result<ActivityReport, ActivityFailure>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn report_constructors() {
        let ok = ActivityReport::ok("Credit check passed");
        assert!(ok.success);
        assert!(ok.data.is_none());

        let with_data = ActivityReport::ok_with("passed", json!({"credit_score": 718}));
        assert_eq!(with_data.data.unwrap()["credit_score"], 718);

        let failed = ActivityReport::failed("Credit score too low");
        assert!(!failed.success);
        assert_eq!(failed.reason, "Credit score too low");
    }

    #[test]
    fn report_serde_roundtrip() {
        let report = ActivityReport::ok_with("verified", json!({"dti_ratio": 0.31}));
        let encoded = serde_json::to_string(&report).unwrap();
        let back: ActivityReport = serde_json::from_str(&encoded).unwrap();
        assert_eq!(back, report);
    }
}
