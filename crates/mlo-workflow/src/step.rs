//! # Workflow Steps
//!
//! The step record and its gates: completion criteria resolved against
//! live loan state, and per-step compliance requirements resolved against
//! the loan's compliance data snapshot.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use mlo_core::{ActorId, Loan, LoanId, OfficerId, RegulationCode, StepId, TenantId};

// ---------------------------------------------------------------------------
// StepName
// ---------------------------------------------------------------------------

/// The ten canonical workflow steps, in template order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepName {
    ApplicationReceived,
    InitialDocumentCollection,
    CreditCheck,
    IncomeVerification,
    PropertyAppraisal,
    UnderwritingReview,
    FinalApproval,
    ClosingPreparation,
    Closing,
    Funding,
}

impl StepName {
    /// The human-facing step title.
    pub fn title(&self) -> &'static str {
        match self {
            Self::ApplicationReceived => "Application Received",
            Self::InitialDocumentCollection => "Initial Document Collection",
            Self::CreditCheck => "Credit Check",
            Self::IncomeVerification => "Income Verification",
            Self::PropertyAppraisal => "Property Appraisal",
            Self::UnderwritingReview => "Underwriting Review",
            Self::FinalApproval => "Final Approval",
            Self::ClosingPreparation => "Closing Preparation",
            Self::Closing => "Closing",
            Self::Funding => "Funding",
        }
    }
}

impl std::fmt::Display for StepName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.title())
    }
}

// ---------------------------------------------------------------------------
// StepType
// ---------------------------------------------------------------------------

/// How a step is performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepType {
    /// Completed automatically by the platform.
    System,
    /// Requires a person.
    Manual,
    /// Backed by a vendor integration.
    Integration,
}

// ---------------------------------------------------------------------------
// WorkflowStep
// ---------------------------------------------------------------------------

/// Criterion name → expected value, as declared by the template.
pub type CompletionCriteria = BTreeMap<String, Value>;

/// Regulation → required snapshot field/value pairs.
pub type ComplianceRequirements = BTreeMap<RegulationCode, BTreeMap<String, Value>>;

/// One ordered, gated unit of work in loan processing.
///
/// Created in a fixed batch when the loan's workflow is initialized;
/// mutated only by completion and assignment; never deleted once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowStep {
    pub id: StepId,
    pub tenant_id: TenantId,
    pub loan_id: LoanId,
    pub name: StepName,
    pub step_type: StepType,
    /// Position in the loan's workflow, 1..N, unique per loan.
    pub step_order: u32,
    pub is_required: bool,
    pub is_completed: bool,
    pub completion_criteria: CompletionCriteria,
    pub compliance_requirements: ComplianceRequirements,
    pub assigned_to: Option<OfficerId>,
    pub due_date: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub completed_by: Option<ActorId>,
}

impl WorkflowStep {
    /// Whether the step is overdue: due date passed and not completed.
    /// Query-only — overdue steps surface in dashboards, nothing here
    /// escalates automatically.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.due_date < now && !self.is_completed
    }

    /// Whether the step's compliance requirement gates hold against the
    /// loan's snapshot. Every declared field must match its expected
    /// value exactly; an absent field never matches.
    pub fn meets_compliance_requirements(&self, loan: &Loan) -> bool {
        self.compliance_requirements.iter().all(|(code, fields)| {
            fields.iter().all(|(field, expected)| {
                loan.compliance.field(*code, field) == Some(expected)
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use serde_json::json;

    fn step(due: DateTime<Utc>, completed: bool) -> WorkflowStep {
        WorkflowStep {
            id: StepId::new(),
            tenant_id: TenantId::new(),
            loan_id: LoanId::new(),
            name: StepName::CreditCheck,
            step_type: StepType::Integration,
            step_order: 3,
            is_required: true,
            is_completed: completed,
            completion_criteria: CompletionCriteria::new(),
            compliance_requirements: ComplianceRequirements::new(),
            assigned_to: None,
            due_date: due,
            completed_at: None,
            completed_by: None,
        }
    }

    #[test]
    fn overdue_requires_past_due_and_incomplete() {
        let now = Utc.with_ymd_and_hms(2026, 8, 12, 12, 0, 0).unwrap();
        assert!(step(now - Duration::hours(1), false).is_overdue(now));
        assert!(!step(now + Duration::hours(1), false).is_overdue(now));
        assert!(!step(now - Duration::hours(1), true).is_overdue(now));
    }

    #[test]
    fn compliance_requirements_match_exactly() {
        let mut s = step(Utc::now(), false);
        let mut trid = BTreeMap::new();
        trid.insert("loan_estimate".to_string(), json!(true));
        s.compliance_requirements.insert(RegulationCode::Trid, trid);

        let mut loan = Loan::new(
            TenantId::new(),
            "ML-1",
            chrono::NaiveDate::from_ymd_opt(2026, 8, 3).unwrap(),
        );
        assert!(!s.meets_compliance_requirements(&loan));

        loan.compliance
            .set_field(RegulationCode::Trid, "loan_estimate", json!(true));
        assert!(s.meets_compliance_requirements(&loan));

        // A present-but-different value does not match.
        loan.compliance
            .set_field(RegulationCode::Trid, "loan_estimate", json!(false));
        assert!(!s.meets_compliance_requirements(&loan));
    }

    #[test]
    fn step_name_titles() {
        assert_eq!(StepName::ApplicationReceived.title(), "Application Received");
        assert_eq!(StepName::Funding.title(), "Funding");
    }

    #[test]
    fn serde_roundtrip() {
        let s = step(Utc::now(), false);
        let json = serde_json::to_string(&s).unwrap();
        let back: WorkflowStep = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, s.id);
        assert_eq!(back.name, s.name);
        assert_eq!(back.step_order, s.step_order);
    }
}
