//! # Violations & Summaries
//!
//! The violation record the evaluator produces and the reduced summary
//! consumers read. Violations are produced fresh on every run — they are
//! not mutable state, only audit log entries persist them.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use mlo_core::{LoanId, RegulationCode, Severity, ViolationKind};

/// A detected failure of a loan's recorded data to satisfy a rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    pub regulation: RegulationCode,
    /// The violated rule's id within its regulation.
    pub rule_id: String,
    pub kind: ViolationKind,
    /// The rule's description, verbatim.
    pub message: String,
    pub severity: Severity,
    /// The snapshot field involved, where the check names one.
    pub field: Option<String>,
    pub loan_id: LoanId,
    /// The evaluation clock — identical across one run, so repeated runs
    /// with a fixed clock produce value-identical violations.
    pub detected_at: DateTime<Utc>,
}

/// The reduction of one full compliance run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceSummary {
    /// True iff zero violations across every regulation the catalog
    /// knows. Vacuously true for an empty catalog — check
    /// `rules_evaluated` to distinguish "no rules ran" from "compliant".
    pub is_compliant: bool,
    pub total_violations: usize,
    pub critical_violations: usize,
    pub high_violations: usize,
    /// Violation count per regulation, only for regulations with at
    /// least one violation.
    pub violations_by_regulation: BTreeMap<RegulationCode, usize>,
    /// How many catalog rules the run evaluated. Zero signals an empty
    /// catalog — "indeterminate", not "clean".
    pub rules_evaluated: usize,
}

impl ComplianceSummary {
    /// Reduce a violation list to a summary.
    pub fn from_violations(violations: &[Violation], rules_evaluated: usize) -> Self {
        let mut by_regulation: BTreeMap<RegulationCode, usize> = BTreeMap::new();
        for v in violations {
            *by_regulation.entry(v.regulation).or_insert(0) += 1;
        }
        Self {
            is_compliant: violations.is_empty(),
            total_violations: violations.len(),
            critical_violations: violations
                .iter()
                .filter(|v| v.severity == Severity::Critical)
                .count(),
            high_violations: violations
                .iter()
                .filter(|v| v.severity == Severity::High)
                .count(),
            violations_by_regulation: by_regulation,
            rules_evaluated,
        }
    }
}
