//! # Regulatory Domain Vocabulary
//!
//! The closed enums shared by the catalog, the evaluator, and the audit
//! trail: regulation codes, violation kinds, and the severity ladder.
//!
//! ## Design
//!
//! Regulation dispatch is a closed enum rather than string lookup. The
//! set of regulations the stack evaluates is statically enumerable;
//! adding one is a compile-time event that forces the catalog and the
//! evaluator to account for it.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// RegulationCode
// ---------------------------------------------------------------------------

/// The federal regulations the compliance engine evaluates.
///
/// Wire names match the regulator's conventional abbreviations
/// (`"TRID"`, `"AML_BSA"`, …) as used in catalog documents and audit
/// metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RegulationCode {
    /// TILA-RESPA Integrated Disclosure rule (Loan Estimate / Closing
    /// Disclosure timing and content).
    #[serde(rename = "TRID")]
    Trid,
    /// Equal Credit Opportunity Act (notices, prohibited basis fields).
    #[serde(rename = "ECOA")]
    Ecoa,
    /// Real Estate Settlement Procedures Act (settlement disclosures,
    /// kickback prohibition).
    #[serde(rename = "RESPA")]
    Respa,
    /// Gramm-Leach-Bliley Act (privacy notice, opt-out mechanism).
    #[serde(rename = "GLBA")]
    Glba,
    /// Fair Credit Reporting Act (adverse action, risk-based pricing).
    #[serde(rename = "FCRA")]
    Fcra,
    /// Anti-Money Laundering / Bank Secrecy Act (SAR review, CDD).
    #[serde(rename = "AML_BSA")]
    AmlBsa,
    /// SAFE Act (loan originator licensing).
    #[serde(rename = "SAFE_ACT")]
    SafeAct,
}

/// Total number of regulation codes.
pub const REGULATION_COUNT: usize = 7;

impl RegulationCode {
    /// All regulation codes in canonical evaluation order.
    pub const ALL: [RegulationCode; REGULATION_COUNT] = [
        Self::Trid,
        Self::Ecoa,
        Self::Respa,
        Self::Glba,
        Self::Fcra,
        Self::AmlBsa,
        Self::SafeAct,
    ];

    /// The wire name for this regulation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trid => "TRID",
            Self::Ecoa => "ECOA",
            Self::Respa => "RESPA",
            Self::Glba => "GLBA",
            Self::Fcra => "FCRA",
            Self::AmlBsa => "AML_BSA",
            Self::SafeAct => "SAFE_ACT",
        }
    }

    /// Parse a wire name back into a code. Returns `None` for unknown
    /// names — callers decide whether to warn-and-skip or reject.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "TRID" => Some(Self::Trid),
            "ECOA" => Some(Self::Ecoa),
            "RESPA" => Some(Self::Respa),
            "GLBA" => Some(Self::Glba),
            "FCRA" => Some(Self::Fcra),
            "AML_BSA" => Some(Self::AmlBsa),
            "SAFE_ACT" => Some(Self::SafeAct),
            _ => None,
        }
    }
}

impl std::fmt::Display for RegulationCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Severity
// ---------------------------------------------------------------------------

/// Violation severity ladder. Ordered: `Low < Medium < High < Critical`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Return the string value for serialization.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ViolationKind
// ---------------------------------------------------------------------------

/// The taxonomy of compliance violations the evaluator can produce.
///
/// Violations are data, not errors: a non-compliant loan is a normal
/// evaluation result, and these kinds classify it for audit and
/// remediation routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    /// A required disclosure document was not provided.
    MissingDisclosure,
    /// A required notice was not provided.
    MissingNotice,
    /// A prohibited-basis field was collected (ECOA).
    ProhibitedField,
    /// A disclosure was provided outside its timing window.
    TimingViolation,
    /// The assigned loan originator is not licensed (SAFE Act).
    UnlicensedOriginator,
    /// Referral fees recorded against the loan (RESPA §8).
    KickbackViolation,
    /// GLBA privacy notice not provided.
    MissingPrivacyNotice,
    /// GLBA information-sharing opt-out mechanism not provided.
    MissingOptOut,
    /// Suspicious-activity review not performed (AML/BSA).
    MissingSarReview,
    /// Customer due diligence not performed (AML/BSA).
    MissingCdd,
}

impl ViolationKind {
    /// Return the string value for serialization.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissingDisclosure => "missing_disclosure",
            Self::MissingNotice => "missing_notice",
            Self::ProhibitedField => "prohibited_field",
            Self::TimingViolation => "timing_violation",
            Self::UnlicensedOriginator => "unlicensed_originator",
            Self::KickbackViolation => "kickback_violation",
            Self::MissingPrivacyNotice => "missing_privacy_notice",
            Self::MissingOptOut => "missing_opt_out",
            Self::MissingSarReview => "missing_sar_review",
            Self::MissingCdd => "missing_cdd",
        }
    }
}

impl std::fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn regulation_wire_names_roundtrip() {
        for code in RegulationCode::ALL {
            assert_eq!(RegulationCode::parse(code.as_str()), Some(code));
        }
    }

    #[test]
    fn regulation_parse_rejects_unknown() {
        assert_eq!(RegulationCode::parse("HMDA"), None);
        assert_eq!(RegulationCode::parse(""), None);
        assert_eq!(RegulationCode::parse("trid"), None);
    }

    #[test]
    fn regulation_serde_uses_wire_names() {
        let json = serde_json::to_string(&RegulationCode::AmlBsa).unwrap();
        assert_eq!(json, "\"AML_BSA\"");
        let back: RegulationCode = serde_json::from_str("\"SAFE_ACT\"").unwrap();
        assert_eq!(back, RegulationCode::SafeAct);
    }

    #[test]
    fn all_covers_every_code() {
        assert_eq!(RegulationCode::ALL.len(), REGULATION_COUNT);
    }

    #[test]
    fn severity_ordering() {
        assert!(Severity::Low < Severity::Medium);
        assert!(Severity::Medium < Severity::High);
        assert!(Severity::High < Severity::Critical);
    }

    #[test]
    fn severity_serde_snake_case() {
        assert_eq!(serde_json::to_string(&Severity::Critical).unwrap(), "\"critical\"");
    }

    #[test]
    fn violation_kind_display() {
        assert_eq!(ViolationKind::ProhibitedField.to_string(), "prohibited_field");
        assert_eq!(ViolationKind::TimingViolation.to_string(), "timing_violation");
        assert_eq!(
            ViolationKind::UnlicensedOriginator.to_string(),
            "unlicensed_originator"
        );
    }
}
