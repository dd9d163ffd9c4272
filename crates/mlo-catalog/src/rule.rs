//! # Rule Definitions
//!
//! The shape of catalog entries: a [`Regulation`] owns an ordered list of
//! [`Rule`]s, each carrying a [`CheckKind`] that tells the evaluator what
//! to test, a declared severity, and an optional remediation text.

use serde::{Deserialize, Serialize};

use mlo_core::{RegulationCode, Severity, ViolationKind};

// ---------------------------------------------------------------------------
// CheckKind
// ---------------------------------------------------------------------------

/// What a rule tests against the loan's compliance data snapshot.
///
/// The evaluator dispatches on this tag — there is no reflection-style
/// lookup of per-regulation validator methods. Adding a check kind is a
/// compile-time event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CheckKind {
    /// A named snapshot field must be present and truthy; absence is a
    /// violation of the declared kind (missing disclosure, notice, …).
    RequiredField {
        field: String,
        violation: ViolationKind,
    },

    /// A named snapshot field must be absent. Presence — with any value —
    /// is a `prohibited_field` violation (ECOA prohibited basis).
    ProhibitedField { field: String },

    /// If the named date field is present, its business-day distance from
    /// the loan's application date must not exceed the threshold.
    Timing {
        date_field: String,
        max_business_days: u32,
    },

    /// A truthy flag directly triggers the declared violation
    /// (RESPA referral fees).
    FlagTriggered {
        field: String,
        violation: ViolationKind,
    },

    /// The loan's assigned originator must hold an active SAFE Act
    /// license, resolved through the officer directory.
    LicensedOriginator,
}

// ---------------------------------------------------------------------------
// Rule / Regulation
// ---------------------------------------------------------------------------

/// One compliance rule within a regulation. Immutable reference data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    /// Rule identifier, unique within its regulation.
    pub id: String,
    /// Human-readable description; used verbatim as the violation message.
    pub description: String,
    /// What the evaluator tests.
    pub check: CheckKind,
    /// Declared severity of a violation of this rule.
    pub severity: Severity,
    /// Declared corrective action, recorded (not executed) when the rule
    /// is violated.
    #[serde(default)]
    pub remediation: Option<String>,
}

/// A named body of compliance rules. Immutable reference data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Regulation {
    pub code: RegulationCode,
    pub name: String,
    /// Rules in declaration order — the order violations are reported in.
    pub rules: Vec<Rule>,
}

impl Regulation {
    /// Look up a rule by id.
    pub fn rule(&self, rule_id: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.id == rule_id)
    }
}
