//! # Rule Catalog
//!
//! The loaded registry the evaluator consults. Holds regulations in
//! canonical code order; exposes lookup by code and remediation lookup by
//! (code, rule id).
//!
//! ## Fail-Soft Loading
//!
//! A missing or corrupt source document degrades to an empty catalog with
//! a `tracing::warn!` — never an error. An unknown regulation code inside
//! an otherwise valid document is warned and skipped, and the remaining
//! regulations load normally.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use mlo_core::{RegulationCode, Severity, ViolationKind};

use crate::rule::{CheckKind, Regulation, Rule};

// ---------------------------------------------------------------------------
// Source document shape
// ---------------------------------------------------------------------------

/// One regulation's entry in the source document.
#[derive(Debug, Deserialize)]
struct RegulationDoc {
    name: String,
    rules: Vec<Rule>,
}

// ---------------------------------------------------------------------------
// RuleCatalog
// ---------------------------------------------------------------------------

/// The regulation → rules registry, loaded once at startup.
#[derive(Debug, Clone, Default)]
pub struct RuleCatalog {
    regulations: Vec<Regulation>,
}

impl RuleCatalog {
    /// An empty catalog. Evaluation against it yields zero violations.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load a catalog from a JSON document mapping regulation wire names
    /// to `{name, rules}` entries.
    ///
    /// Fails soft: an unparseable document yields an empty catalog with a
    /// warning. Unknown regulation codes are warned and skipped.
    /// Regulations are ordered canonically regardless of document order.
    pub fn from_json_str(source: &str) -> Self {
        let parsed: BTreeMap<String, RegulationDoc> = match serde_json::from_str(source) {
            Ok(doc) => doc,
            Err(e) => {
                tracing::warn!(error = %e, "rule catalog source unparseable — continuing with empty catalog");
                return Self::empty();
            }
        };

        let mut by_code: BTreeMap<RegulationCode, Regulation> = BTreeMap::new();
        for (key, doc) in parsed {
            match RegulationCode::parse(&key) {
                Some(code) => {
                    by_code.insert(
                        code,
                        Regulation {
                            code,
                            name: doc.name,
                            rules: doc.rules,
                        },
                    );
                }
                None => {
                    tracing::warn!(regulation = %key, "unknown regulation code in catalog source — skipped");
                }
            }
        }

        let regulations = RegulationCode::ALL
            .iter()
            .filter_map(|code| by_code.remove(code))
            .collect();
        Self { regulations }
    }

    /// Load a catalog from a file path.
    ///
    /// Fails soft: a missing or unreadable file yields an empty catalog
    /// with a warning.
    pub fn load_from_path(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(source) => Self::from_json_str(&source),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "rule catalog source not found — continuing with empty catalog");
                Self::empty()
            }
        }
    }

    /// All regulations in canonical evaluation order.
    pub fn regulations(&self) -> &[Regulation] {
        &self.regulations
    }

    /// The regulation entry for a code, if loaded.
    pub fn regulation(&self, code: RegulationCode) -> Option<&Regulation> {
        self.regulations.iter().find(|r| r.code == code)
    }

    /// The rules for a regulation, in declaration order. Empty if the
    /// regulation is not loaded.
    pub fn rules_for(&self, code: RegulationCode) -> &[Rule] {
        self.regulation(code).map_or(&[], |r| r.rules.as_slice())
    }

    /// The declared remediation text for a rule, if any.
    pub fn remediation_for(&self, code: RegulationCode, rule_id: &str) -> Option<&str> {
        self.regulation(code)?
            .rule(rule_id)?
            .remediation
            .as_deref()
    }

    /// Whether the catalog holds no regulations at all.
    pub fn is_empty(&self) -> bool {
        self.regulations.is_empty()
    }

    /// Total number of rules across all regulations.
    pub fn rule_count(&self) -> usize {
        self.regulations.iter().map(|r| r.rules.len()).sum()
    }

    /// The built-in seven-regulation battery.
    pub fn standard() -> Self {
        Self {
            regulations: vec![
                trid(),
                ecoa(),
                respa(),
                glba(),
                fcra(),
                aml_bsa(),
                safe_act(),
            ],
        }
    }
}

// ---------------------------------------------------------------------------
// Standard battery
// ---------------------------------------------------------------------------

fn required(
    id: &str,
    description: &str,
    violation: ViolationKind,
    remediation: &str,
) -> Rule {
    Rule {
        id: id.into(),
        description: description.into(),
        check: CheckKind::RequiredField {
            field: id.into(),
            violation,
        },
        severity: Severity::High,
        remediation: Some(remediation.into()),
    }
}

fn prohibited(id: &str, description: &str, remediation: &str) -> Rule {
    Rule {
        id: id.into(),
        description: description.into(),
        check: CheckKind::ProhibitedField { field: id.into() },
        severity: Severity::Critical,
        remediation: Some(remediation.into()),
    }
}

fn trid() -> Regulation {
    Regulation {
        code: RegulationCode::Trid,
        name: "TILA-RESPA Integrated Disclosure Rule".into(),
        rules: vec![
            required(
                "loan_estimate",
                "Loan Estimate must be provided within 3 business days",
                ViolationKind::MissingDisclosure,
                "Issue the Loan Estimate and record the delivery date",
            ),
            required(
                "closing_disclosure",
                "Closing Disclosure must be provided 3 business days before closing",
                ViolationKind::MissingDisclosure,
                "Issue the Closing Disclosure and reschedule closing if the waiting period is short",
            ),
            required(
                "intent_to_proceed",
                "Intent to Proceed must be obtained before proceeding",
                ViolationKind::MissingDisclosure,
                "Obtain and record the borrower's intent to proceed",
            ),
            Rule {
                id: "loan_estimate_timing".into(),
                description: "Loan Estimate provided more than 3 business days after application"
                    .into(),
                check: CheckKind::Timing {
                    date_field: "loan_estimate_date".into(),
                    max_business_days: 3,
                },
                severity: Severity::High,
                remediation: Some(
                    "Document the delay and issue a corrected Loan Estimate".into(),
                ),
            },
        ],
    }
}

fn ecoa() -> Regulation {
    Regulation {
        code: RegulationCode::Ecoa,
        name: "Equal Credit Opportunity Act".into(),
        rules: vec![
            required(
                "adverse_action_notice",
                "Adverse Action Notice required for denials",
                ViolationKind::MissingNotice,
                "Issue the Adverse Action Notice within 30 days of the decision",
            ),
            required(
                "equal_credit_opportunity_notice",
                "Equal Credit Opportunity Notice required",
                ViolationKind::MissingNotice,
                "Provide the ECOA notice to the applicant",
            ),
            prohibited(
                "marital_status",
                "Marital status cannot be used for credit decisions",
                "Purge the field from the application record and retrain intake staff",
            ),
            prohibited(
                "race",
                "Race cannot be used for credit decisions",
                "Purge the field from the application record and retrain intake staff",
            ),
            prohibited(
                "religion",
                "Religion cannot be used for credit decisions",
                "Purge the field from the application record and retrain intake staff",
            ),
        ],
    }
}

fn respa() -> Regulation {
    Regulation {
        code: RegulationCode::Respa,
        name: "Real Estate Settlement Procedures Act".into(),
        rules: vec![
            required(
                "good_faith_estimate",
                "Good Faith Estimate required",
                ViolationKind::MissingDisclosure,
                "Issue the Good Faith Estimate to the borrower",
            ),
            required(
                "hud1_settlement_statement",
                "HUD-1 Settlement Statement required",
                ViolationKind::MissingDisclosure,
                "Prepare the HUD-1 Settlement Statement before closing",
            ),
            required(
                "servicing_disclosure",
                "Servicing Disclosure required",
                ViolationKind::MissingDisclosure,
                "Provide the Servicing Disclosure Statement",
            ),
            Rule {
                id: "referral_fees".into(),
                description: "Referral fees may violate RESPA kickback prohibitions".into(),
                check: CheckKind::FlagTriggered {
                    field: "referral_fees".into(),
                    violation: ViolationKind::KickbackViolation,
                },
                severity: Severity::Critical,
                remediation: Some(
                    "Escalate to compliance counsel and unwind the referral arrangement".into(),
                ),
            },
        ],
    }
}

fn glba() -> Regulation {
    Regulation {
        code: RegulationCode::Glba,
        name: "Gramm-Leach-Bliley Act".into(),
        rules: vec![
            required(
                "privacy_notice_provided",
                "Privacy notice must be provided to customers",
                ViolationKind::MissingPrivacyNotice,
                "Deliver the privacy notice and record delivery",
            ),
            required(
                "opt_out_mechanism",
                "Opt-out mechanism must be provided for information sharing",
                ViolationKind::MissingOptOut,
                "Provide an opt-out mechanism before any information sharing",
            ),
        ],
    }
}

fn fcra() -> Regulation {
    Regulation {
        code: RegulationCode::Fcra,
        name: "Fair Credit Reporting Act".into(),
        rules: vec![
            required(
                "adverse_action_notice",
                "Adverse Action Notice required for credit denials",
                ViolationKind::MissingNotice,
                "Issue the FCRA adverse action notice with credit score disclosure",
            ),
            required(
                "risk_based_pricing_notice",
                "Risk-Based Pricing Notice required",
                ViolationKind::MissingNotice,
                "Issue the Risk-Based Pricing Notice",
            ),
        ],
    }
}

fn aml_bsa() -> Regulation {
    Regulation {
        code: RegulationCode::AmlBsa,
        name: "Anti-Money Laundering / Bank Secrecy Act".into(),
        rules: vec![
            required(
                "suspicious_activity_reviewed",
                "Suspicious activity must be reviewed for AML compliance",
                ViolationKind::MissingSarReview,
                "Complete the suspicious-activity review and file a SAR if warranted",
            ),
            required(
                "customer_due_diligence",
                "Customer Due Diligence must be performed",
                ViolationKind::MissingCdd,
                "Perform and document customer due diligence",
            ),
        ],
    }
}

fn safe_act() -> Regulation {
    Regulation {
        code: RegulationCode::SafeAct,
        name: "SAFE Mortgage Licensing Act".into(),
        rules: vec![Rule {
            id: "originator_licensed".into(),
            description: "Loan originator must be licensed under SAFE Act".into(),
            check: CheckKind::LicensedOriginator,
            severity: Severity::Critical,
            remediation: Some(
                "Reassign the loan to a licensed originator and report the lapse".into(),
            ),
        }],
    }
}
