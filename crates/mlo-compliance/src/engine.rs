//! # Compliance Engine
//!
//! The catalog-driven evaluator. Dispatches on each rule's [`CheckKind`]
//! — an explicit registry populated at startup, statically enumerable, no
//! reflection-style method lookup.
//!
//! ## Evaluation Order
//!
//! Regulations in canonical catalog order, rules in declaration order.
//! Each detected condition emits exactly one violation.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate};
use serde_json::{json, Value};
use thiserror::Error;

use mlo_audit::{
    AuditAction, AuditEntryType, AuditError, AuditSink, ComplianceAuditEntry, EntityRef,
};
use mlo_catalog::{CheckKind, Rule, RuleCatalog};
use mlo_core::{
    business_days_between, Loan, OpContext, RegulationCode, ViolationKind,
};

use crate::directory::OfficerDirectory;
use crate::violation::{ComplianceSummary, Violation};

// ---------------------------------------------------------------------------
// ComplianceError
// ---------------------------------------------------------------------------

/// Operational failures during evaluation. A non-compliant loan is never
/// one of these.
#[derive(Error, Debug)]
pub enum ComplianceError {
    /// A timing rule's date field holds a value that is not a date.
    #[error("malformed date in {regulation} field {field}: {value}")]
    MalformedDateField {
        /// The regulation whose snapshot holds the field.
        regulation: RegulationCode,
        /// The offending field name.
        field: String,
        /// The value that failed to parse.
        value: String,
    },

    /// The audit sink rejected an append.
    #[error(transparent)]
    Audit(#[from] AuditError),
}

// ---------------------------------------------------------------------------
// ComplianceEngine
// ---------------------------------------------------------------------------

/// Evaluates loans against the rule catalog and records the audit trail.
pub struct ComplianceEngine {
    catalog: RuleCatalog,
    audit: Arc<dyn AuditSink>,
    officers: Arc<dyn OfficerDirectory>,
}

impl ComplianceEngine {
    pub fn new(
        catalog: RuleCatalog,
        audit: Arc<dyn AuditSink>,
        officers: Arc<dyn OfficerDirectory>,
    ) -> Self {
        Self {
            catalog,
            audit,
            officers,
        }
    }

    /// The catalog this engine evaluates against.
    pub fn catalog(&self) -> &RuleCatalog {
        &self.catalog
    }

    /// Evaluate one regulation's rules against the loan snapshot.
    ///
    /// Pure with respect to the audit trail — nothing is recorded here.
    /// [`run_all`](Self::run_all) is the recording entry point.
    pub fn evaluate(
        &self,
        loan: &Loan,
        code: RegulationCode,
        ctx: &OpContext,
    ) -> Result<Vec<Violation>, ComplianceError> {
        let mut violations = Vec::new();
        for rule in self.catalog.rules_for(code) {
            if let Some(violation) = self.check_rule(loan, code, rule, ctx)? {
                violations.push(violation);
            }
        }
        Ok(violations)
    }

    /// Run every regulation the catalog knows, in canonical order, and
    /// record the audit trail for the run.
    ///
    /// Appends one `compliance_violation` and one `compliance_remediation`
    /// entry per violation, then exactly one `compliance_check` summary
    /// entry for the invocation.
    pub fn run_all(&self, loan: &Loan, ctx: &OpContext) -> Result<Vec<Violation>, ComplianceError> {
        if self.catalog.is_empty() {
            tracing::warn!(
                loan_id = %loan.id,
                "compliance check running against an empty rule catalog — no rules will be evaluated"
            );
        }

        let mut all = Vec::new();
        for regulation in self.catalog.regulations() {
            all.extend(self.evaluate(loan, regulation.code, ctx)?);
        }

        for violation in &all {
            self.record_violation(loan, violation, ctx)?;
        }

        self.audit.append(
            ComplianceAuditEntry::new(
                ctx.tenant_id,
                AuditEntryType::ComplianceCheck,
                EntityRef::loan(loan.id),
                AuditAction::ComplianceCheckCompleted,
                ctx.actor,
                ctx.now,
            )
            .with_new_values(json!({ "violations": all }))
            .with_metadata(json!({ "total_violations": all.len() })),
        )?;

        Ok(all)
    }

    /// Run all regulations and reduce to a summary.
    pub fn summarize(
        &self,
        loan: &Loan,
        ctx: &OpContext,
    ) -> Result<ComplianceSummary, ComplianceError> {
        let violations = self.run_all(loan, ctx)?;
        Ok(ComplianceSummary::from_violations(
            &violations,
            self.catalog.rule_count(),
        ))
    }

    /// Manually trigger remediation recording for a rule, outside a
    /// check run. Returns the catalog's remediation text, if declared.
    pub fn trigger_remediation(
        &self,
        entity: EntityRef,
        code: RegulationCode,
        rule_id: &str,
        ctx: &OpContext,
    ) -> Result<Option<String>, ComplianceError> {
        let remediation = self
            .catalog
            .remediation_for(code, rule_id)
            .map(String::from);

        self.audit.append(
            ComplianceAuditEntry::new(
                ctx.tenant_id,
                AuditEntryType::ComplianceRemediation,
                entity,
                AuditAction::RemediationTriggered,
                ctx.actor,
                ctx.now,
            )
            .with_metadata(json!({
                "regulation": code.as_str(),
                "rule_id": rule_id,
                "remediation": remediation,
            })),
        )?;

        tracing::info!(
            regulation = %code,
            rule_id,
            remediation = remediation.as_deref().unwrap_or("<none>"),
            "manual remediation triggered"
        );
        Ok(remediation)
    }

    // -- internals ----------------------------------------------------------

    /// Apply one rule. Returns at most one violation per detected
    /// condition.
    fn check_rule(
        &self,
        loan: &Loan,
        code: RegulationCode,
        rule: &Rule,
        ctx: &OpContext,
    ) -> Result<Option<Violation>, ComplianceError> {
        let violation = |kind: ViolationKind, field: Option<&str>| Violation {
            regulation: code,
            rule_id: rule.id.clone(),
            kind,
            message: rule.description.clone(),
            severity: rule.severity,
            field: field.map(String::from),
            loan_id: loan.id,
            detected_at: ctx.now,
        };

        let found = match &rule.check {
            CheckKind::RequiredField { field, violation: kind } => {
                (!loan.compliance.is_truthy(code, field))
                    .then(|| violation(*kind, Some(field.as_str())))
            }
            CheckKind::ProhibitedField { field } => loan
                .compliance
                .has_field(code, field)
                .then(|| violation(ViolationKind::ProhibitedField, Some(field.as_str()))),
            CheckKind::Timing {
                date_field,
                max_business_days,
            } => match loan.compliance.field(code, date_field) {
                None => None,
                Some(value) => {
                    let date = parse_snapshot_date(value).ok_or_else(|| {
                        ComplianceError::MalformedDateField {
                            regulation: code,
                            field: date_field.clone(),
                            value: value.to_string(),
                        }
                    })?;
                    (business_days_between(loan.application_date, date) > *max_business_days)
                        .then(|| violation(ViolationKind::TimingViolation, Some(date_field.as_str())))
                }
            },
            CheckKind::FlagTriggered { field, violation: kind } => loan
                .compliance
                .is_truthy(code, field)
                .then(|| violation(*kind, Some(field.as_str()))),
            CheckKind::LicensedOriginator => {
                let licensed = loan
                    .officer_id
                    .and_then(|id| self.officers.find_officer(loan.tenant_id, id))
                    .map_or(false, |officer| officer.is_licensed_on(ctx.now.date_naive()));
                (!licensed).then(|| violation(ViolationKind::UnlicensedOriginator, None))
            }
        };

        Ok(found)
    }

    /// Record one violation: the violation entry, then its remediation
    /// entry carrying the rule's declared remediation text.
    fn record_violation(
        &self,
        loan: &Loan,
        violation: &Violation,
        ctx: &OpContext,
    ) -> Result<(), ComplianceError> {
        tracing::warn!(
            loan_id = %loan.id,
            regulation = %violation.regulation,
            rule_id = %violation.rule_id,
            kind = %violation.kind,
            severity = %violation.severity,
            "compliance violation detected"
        );

        let violation_json = serde_json::to_value(violation).unwrap_or(Value::Null);

        self.audit.append(
            ComplianceAuditEntry::new(
                ctx.tenant_id,
                AuditEntryType::ComplianceViolation,
                EntityRef::loan(loan.id),
                AuditAction::ViolationDetected,
                ctx.actor,
                ctx.now,
            )
            .with_metadata(violation_json.clone()),
        )?;

        let remediation = self
            .catalog
            .remediation_for(violation.regulation, &violation.rule_id);

        self.audit.append(
            ComplianceAuditEntry::new(
                ctx.tenant_id,
                AuditEntryType::ComplianceRemediation,
                EntityRef::loan(loan.id),
                AuditAction::RemediationTriggered,
                ctx.actor,
                ctx.now,
            )
            .with_metadata(json!({
                "violation": violation_json,
                "remediation": remediation,
            })),
        )?;

        Ok(())
    }
}

impl std::fmt::Debug for ComplianceEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComplianceEngine")
            .field("rule_count", &self.catalog.rule_count())
            .finish()
    }
}

/// Parse a snapshot date value: `"YYYY-MM-DD"` or RFC 3339.
fn parse_snapshot_date(value: &Value) -> Option<NaiveDate> {
    let s = value.as_str()?;
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive()))
}
