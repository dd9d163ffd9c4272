//! # Step Template
//!
//! The fixed, ordered catalog of the ten processing steps: due-date
//! offsets from the application date, assignment defaults, completion
//! criteria, and per-step compliance requirement gates. Also the status →
//! step-names mapping that drives status-based completion.

use std::collections::BTreeMap;

use serde_json::{json, Value};

use mlo_core::{LoanStatus, RegulationCode};

use crate::step::{ComplianceRequirements, CompletionCriteria, StepName, StepType};

/// One entry in the step catalog.
#[derive(Debug, Clone)]
pub struct StepTemplate {
    pub name: StepName,
    pub step_type: StepType,
    pub is_required: bool,
    /// Hours after the application date the step is due.
    pub due_offset_hours: i64,
    /// Whether the step defaults to the loan's assigned officer.
    pub assign_to_officer: bool,
    pub completion_criteria: CompletionCriteria,
    pub compliance_requirements: ComplianceRequirements,
}

fn criteria(entries: &[(&str, Value)]) -> CompletionCriteria {
    entries
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

fn requirements(
    entries: &[(RegulationCode, &[(&str, Value)])],
) -> ComplianceRequirements {
    entries
        .iter()
        .map(|(code, fields)| {
            let map: BTreeMap<String, Value> = fields
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect();
            (*code, map)
        })
        .collect()
}

/// The standard ten-step template, in order.
pub fn standard_steps() -> Vec<StepTemplate> {
    use RegulationCode::*;
    vec![
        StepTemplate {
            name: StepName::ApplicationReceived,
            step_type: StepType::System,
            is_required: true,
            due_offset_hours: 1,
            assign_to_officer: false,
            completion_criteria: criteria(&[("application_submitted", json!(true))]),
            compliance_requirements: ComplianceRequirements::new(),
        },
        StepTemplate {
            name: StepName::InitialDocumentCollection,
            step_type: StepType::Manual,
            is_required: true,
            due_offset_hours: 3 * 24,
            assign_to_officer: true,
            completion_criteria: criteria(&[("documents_uploaded", json!(5))]),
            compliance_requirements: requirements(&[(Trid, &[("loan_estimate", json!(true))])]),
        },
        StepTemplate {
            name: StepName::CreditCheck,
            step_type: StepType::Integration,
            is_required: true,
            due_offset_hours: 5 * 24,
            assign_to_officer: true,
            completion_criteria: criteria(&[("credit_report_obtained", json!(true))]),
            compliance_requirements: requirements(&[(
                Fcra,
                &[("credit_report_obtained", json!(true))],
            )]),
        },
        StepTemplate {
            name: StepName::IncomeVerification,
            step_type: StepType::Manual,
            is_required: true,
            due_offset_hours: 7 * 24,
            assign_to_officer: true,
            completion_criteria: criteria(&[("income_verified", json!(true))]),
            compliance_requirements: requirements(&[(
                Ecoa,
                &[("income_verification", json!(true))],
            )]),
        },
        StepTemplate {
            name: StepName::PropertyAppraisal,
            step_type: StepType::Integration,
            is_required: true,
            due_offset_hours: 10 * 24,
            assign_to_officer: false,
            completion_criteria: criteria(&[("appraisal_completed", json!(true))]),
            compliance_requirements: requirements(&[(
                Respa,
                &[("appraisal_ordered", json!(true))],
            )]),
        },
        StepTemplate {
            name: StepName::UnderwritingReview,
            step_type: StepType::Manual,
            is_required: true,
            due_offset_hours: 14 * 24,
            // Assigned to an underwriter once one picks it up.
            assign_to_officer: false,
            completion_criteria: criteria(&[("underwriting_approved", json!(true))]),
            compliance_requirements: requirements(&[
                (Trid, &[("closing_disclosure", json!(true))]),
                (Ecoa, &[("adverse_action_notice", json!(false))]),
                (Respa, &[("hud1_settlement_statement", json!(true))]),
            ]),
        },
        StepTemplate {
            name: StepName::FinalApproval,
            step_type: StepType::Manual,
            is_required: true,
            due_offset_hours: 18 * 24,
            assign_to_officer: false,
            completion_criteria: criteria(&[("final_approval", json!(true))]),
            compliance_requirements: requirements(&[
                (Trid, &[("intent_to_proceed", json!(true))]),
                (Glba, &[("privacy_notice", json!(true))]),
                (Fcra, &[("risk_based_pricing_notice", json!(true))]),
            ]),
        },
        StepTemplate {
            name: StepName::ClosingPreparation,
            step_type: StepType::Manual,
            is_required: true,
            due_offset_hours: 21 * 24,
            assign_to_officer: true,
            completion_criteria: criteria(&[("closing_documents_prepared", json!(true))]),
            compliance_requirements: requirements(&[
                (Trid, &[("closing_disclosure", json!(true))]),
                (Respa, &[("hud1_settlement_statement", json!(true))]),
            ]),
        },
        StepTemplate {
            name: StepName::Closing,
            step_type: StepType::Manual,
            is_required: true,
            due_offset_hours: 25 * 24,
            assign_to_officer: true,
            completion_criteria: criteria(&[("closing_completed", json!(true))]),
            compliance_requirements: requirements(&[
                (Trid, &[("closing_disclosure", json!(true))]),
                (Respa, &[("hud1_settlement_statement", json!(true))]),
                (Glba, &[("privacy_notice", json!(true))]),
            ]),
        },
        StepTemplate {
            name: StepName::Funding,
            step_type: StepType::System,
            is_required: true,
            due_offset_hours: 26 * 24,
            assign_to_officer: false,
            completion_criteria: criteria(&[("funding_completed", json!(true))]),
            compliance_requirements: requirements(&[
                (AmlBsa, &[("suspicious_activity_reviewed", json!(true))]),
                (SafeAct, &[("originator_licensed", json!(true))]),
            ]),
        },
    ]
}

/// The steps a loan status completes when the loan reaches it.
///
/// Many-to-many by design: one status can complete several steps,
/// matching the template groupings.
pub fn steps_for_status(status: LoanStatus) -> &'static [StepName] {
    match status {
        LoanStatus::Application => &[StepName::ApplicationReceived],
        LoanStatus::Processing => &[
            StepName::InitialDocumentCollection,
            StepName::CreditCheck,
            StepName::IncomeVerification,
            StepName::PropertyAppraisal,
        ],
        LoanStatus::Underwriting => &[StepName::UnderwritingReview],
        LoanStatus::Approved => &[StepName::FinalApproval],
        LoanStatus::Closed => &[StepName::ClosingPreparation, StepName::Closing],
        LoanStatus::Funded => &[StepName::Funding],
        LoanStatus::Denied => &[],
    }
}
