//! # Loan Entity & Status State Machine
//!
//! Models a mortgage loan through origination, from application to funding.
//!
//! ## Statuses
//!
//! ```text
//! Application ──▶ Processing ──▶ Underwriting ──▶ Approved ──▶ Closed ──▶ Funded
//!      │               │               │              │                  (terminal)
//!      └───────────────┴───────────────┴──────────────┴──▶ Denied (terminal)
//! ```
//!
//! `Closed` reflects a completed closing whose funds are not yet
//! disbursed; it may still advance to `Funded`. `Denied` and `Funded`
//! accept no outgoing transitions.
//!
//! ## Design Decision
//!
//! Status transitions go through [`Loan::update_status`], which validates
//! the edge against the transition table and appends a
//! [`StatusChangeRecord`] to the loan's history. The status change itself
//! is the primary trigger for workflow step completion and compliance
//! re-evaluation downstream — those effects live in `mlo-workflow` and
//! `mlo-orchestrator`, not here.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::compliance_data::ComplianceData;
use crate::context::OpContext;
use crate::error::{LoanError, ValidationError};
use crate::identity::{BorrowerId, LoanId, OfficerId, TenantId};

// ---------------------------------------------------------------------------
// LoanStatus
// ---------------------------------------------------------------------------

/// The lifecycle status of a loan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanStatus {
    /// Application received, not yet validated.
    Application,
    /// Application validated; documents, verifications, and appraisal in
    /// flight.
    Processing,
    /// Under review by an underwriter.
    Underwriting,
    /// Approved; heading to closing.
    Approved,
    /// Denied (terminal).
    Denied,
    /// Closing completed, funds not yet disbursed.
    Closed,
    /// Funds disbursed (terminal).
    Funded,
}

impl LoanStatus {
    /// Return the string value for serialization.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Application => "application",
            Self::Processing => "processing",
            Self::Underwriting => "underwriting",
            Self::Approved => "approved",
            Self::Denied => "denied",
            Self::Closed => "closed",
            Self::Funded => "funded",
        }
    }

    /// Whether this status is terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Denied | Self::Funded)
    }

    /// Whether `self -> to` is a legal transition.
    pub fn can_transition_to(&self, to: LoanStatus) -> bool {
        matches!(
            (self, to),
            (Self::Application, Self::Processing)
                | (Self::Application, Self::Denied)
                | (Self::Processing, Self::Underwriting)
                | (Self::Processing, Self::Denied)
                | (Self::Underwriting, Self::Approved)
                | (Self::Underwriting, Self::Denied)
                | (Self::Approved, Self::Closed)
                | (Self::Approved, Self::Denied)
                | (Self::Closed, Self::Funded)
        )
    }
}

impl std::fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// StatusChangeRecord
// ---------------------------------------------------------------------------

/// Record of one accepted status transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusChangeRecord {
    /// Status before the transition.
    pub from: LoanStatus,
    /// Status after the transition.
    pub to: LoanStatus,
    /// Why the transition happened (e.g. "Workflow automation",
    /// "Credit check failed").
    pub reason: Option<String>,
    /// The acting principal, if any.
    pub changed_by: Option<crate::identity::ActorId>,
    /// When the transition occurred.
    pub changed_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// LoanOfficer
// ---------------------------------------------------------------------------

/// A loan officer, as seen by the SAFE Act licensing check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanOfficer {
    pub id: OfficerId,
    pub name: String,
    /// NMLS registry number, if registered.
    pub nmls_id: Option<String>,
    /// Whether the officer's SAFE Act license is currently active.
    pub license_active: bool,
    /// License expiry, if the license carries one.
    pub license_expires: Option<NaiveDate>,
}

impl LoanOfficer {
    /// Whether the officer may originate loans on the given date: the
    /// license must be active and unexpired.
    pub fn is_licensed_on(&self, date: NaiveDate) -> bool {
        self.license_active && self.license_expires.map_or(true, |exp| exp >= date)
    }
}

// ---------------------------------------------------------------------------
// Loan
// ---------------------------------------------------------------------------

/// A mortgage loan with its status history and compliance data snapshot.
///
/// The loan exclusively owns its [`ComplianceData`]; workflow steps and
/// audit entries are held by their own stores and keyed by `id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Loan {
    pub id: LoanId,
    pub tenant_id: TenantId,
    /// Human-facing loan number (e.g. "ML-2026-000417").
    pub loan_number: String,
    pub status: LoanStatus,
    /// The assigned loan officer, if any. SAFE Act evaluation resolves
    /// this through the officer directory.
    pub officer_id: Option<OfficerId>,
    pub borrower_id: Option<BorrowerId>,
    /// Principal amount in cents. Stored integral — no floating-point
    /// money.
    pub loan_amount_cents: i64,
    pub loan_type: Option<String>,
    pub property_type: Option<String>,
    pub application_date: NaiveDate,
    pub closing_date: Option<NaiveDate>,
    pub funding_date: Option<NaiveDate>,
    /// Per-regulation compliance data snapshot.
    pub compliance: ComplianceData,
    /// Ordered log of accepted status transitions.
    pub status_history: Vec<StatusChangeRecord>,
}

impl Loan {
    /// Create a new loan in `Application` status.
    pub fn new(
        tenant_id: TenantId,
        loan_number: impl Into<String>,
        application_date: NaiveDate,
    ) -> Self {
        Self {
            id: LoanId::new(),
            tenant_id,
            loan_number: loan_number.into(),
            status: LoanStatus::Application,
            officer_id: None,
            borrower_id: None,
            loan_amount_cents: 0,
            loan_type: None,
            property_type: None,
            application_date,
            closing_date: None,
            funding_date: None,
            compliance: ComplianceData::new(),
            status_history: Vec::new(),
        }
    }

    /// Transition the loan to a new status.
    ///
    /// Rejects edges outside the transition table and any transition out
    /// of a terminal status. On success, appends a [`StatusChangeRecord`]
    /// stamped from the context.
    pub fn update_status(
        &mut self,
        to: LoanStatus,
        reason: Option<&str>,
        ctx: &OpContext,
    ) -> Result<(), LoanError> {
        if self.status.is_terminal() {
            return Err(LoanError::TerminalStatus {
                status: self.status.to_string(),
            });
        }
        if !self.status.can_transition_to(to) {
            return Err(LoanError::InvalidTransition {
                from: self.status.to_string(),
                to: to.to_string(),
            });
        }
        self.status_history.push(StatusChangeRecord {
            from: self.status,
            to,
            reason: reason.map(String::from),
            changed_by: ctx.actor,
            changed_at: ctx.now,
        });
        self.status = to;
        Ok(())
    }

    /// Validate the fields a processable application must carry.
    ///
    /// Checked by the orchestrator's validation stage before anything else
    /// runs. Rejection carries the first offending field; nothing is
    /// mutated.
    pub fn validate_application(&self) -> Result<(), ValidationError> {
        if self.loan_amount_cents <= 0 {
            return Err(ValidationError::InvalidValue {
                field: "loan_amount_cents".into(),
                reason: "loan amount must be positive".into(),
            });
        }
        if self.borrower_id.is_none() {
            return Err(ValidationError::MissingField {
                field: "borrower_id".into(),
            });
        }
        for (name, value) in [
            ("loan_type", &self.loan_type),
            ("property_type", &self.property_type),
        ] {
            if value.as_deref().map_or(true, str::is_empty) {
                return Err(ValidationError::MissingField { field: name.into() });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn ctx(tenant: TenantId) -> OpContext {
        OpContext::system(tenant, Utc::now())
    }

    fn make_loan() -> Loan {
        let tenant = TenantId::new();
        let mut loan = Loan::new(
            tenant,
            "ML-2026-000001",
            NaiveDate::from_ymd_opt(2026, 8, 3).unwrap(),
        );
        loan.borrower_id = Some(BorrowerId::new());
        loan.loan_amount_cents = 42_500_000;
        loan.loan_type = Some("conventional".into());
        loan.property_type = Some("single_family".into());
        loan
    }

    // ── Status machine ───────────────────────────────────────────────

    #[test]
    fn full_lifecycle_to_funded() {
        let mut loan = make_loan();
        let c = ctx(loan.tenant_id);
        loan.update_status(LoanStatus::Processing, Some("validated"), &c).unwrap();
        loan.update_status(LoanStatus::Underwriting, None, &c).unwrap();
        loan.update_status(LoanStatus::Approved, None, &c).unwrap();
        loan.update_status(LoanStatus::Closed, None, &c).unwrap();
        loan.update_status(LoanStatus::Funded, None, &c).unwrap();
        assert_eq!(loan.status, LoanStatus::Funded);
        assert_eq!(loan.status_history.len(), 5);
        assert_eq!(loan.status_history[0].from, LoanStatus::Application);
        assert_eq!(loan.status_history[0].reason.as_deref(), Some("validated"));
    }

    #[test]
    fn denial_is_reachable_from_every_active_status() {
        for setup in [
            vec![],
            vec![LoanStatus::Processing],
            vec![LoanStatus::Processing, LoanStatus::Underwriting],
            vec![
                LoanStatus::Processing,
                LoanStatus::Underwriting,
                LoanStatus::Approved,
            ],
        ] {
            let mut loan = make_loan();
            let c = ctx(loan.tenant_id);
            for status in setup {
                loan.update_status(status, None, &c).unwrap();
            }
            loan.update_status(LoanStatus::Denied, Some("gating failure"), &c)
                .unwrap();
            assert_eq!(loan.status, LoanStatus::Denied);
        }
    }

    #[test]
    fn closed_cannot_be_denied() {
        let mut loan = make_loan();
        let c = ctx(loan.tenant_id);
        for status in [
            LoanStatus::Processing,
            LoanStatus::Underwriting,
            LoanStatus::Approved,
            LoanStatus::Closed,
        ] {
            loan.update_status(status, None, &c).unwrap();
        }
        assert!(loan.update_status(LoanStatus::Denied, None, &c).is_err());
        assert_eq!(loan.status, LoanStatus::Closed);
    }

    #[test]
    fn terminal_statuses_accept_nothing() {
        let mut loan = make_loan();
        let c = ctx(loan.tenant_id);
        loan.update_status(LoanStatus::Denied, None, &c).unwrap();
        let err = loan.update_status(LoanStatus::Processing, None, &c);
        assert!(matches!(err, Err(LoanError::TerminalStatus { .. })));
    }

    #[test]
    fn skipping_stages_is_rejected() {
        let mut loan = make_loan();
        let c = ctx(loan.tenant_id);
        let err = loan.update_status(LoanStatus::Approved, None, &c);
        assert!(matches!(err, Err(LoanError::InvalidTransition { .. })));
        assert_eq!(loan.status, LoanStatus::Application);
        assert!(loan.status_history.is_empty());
    }

    // ── Application validation ───────────────────────────────────────

    #[test]
    fn complete_application_validates() {
        assert!(make_loan().validate_application().is_ok());
    }

    #[test]
    fn zero_amount_is_rejected() {
        let mut loan = make_loan();
        loan.loan_amount_cents = 0;
        assert!(matches!(
            loan.validate_application(),
            Err(ValidationError::InvalidValue { .. })
        ));
    }

    #[test]
    fn missing_borrower_is_rejected() {
        let mut loan = make_loan();
        loan.borrower_id = None;
        assert!(matches!(
            loan.validate_application(),
            Err(ValidationError::MissingField { .. })
        ));
    }

    #[test]
    fn empty_loan_type_is_rejected() {
        let mut loan = make_loan();
        loan.loan_type = Some(String::new());
        assert!(loan.validate_application().is_err());
    }

    // ── Officer licensing ────────────────────────────────────────────

    #[test]
    fn licensed_officer_with_future_expiry() {
        let officer = LoanOfficer {
            id: OfficerId::new(),
            name: "Dana Reyes".into(),
            nmls_id: Some("1027345".into()),
            license_active: true,
            license_expires: Some(NaiveDate::from_ymd_opt(2027, 1, 1).unwrap()),
        };
        assert!(officer.is_licensed_on(NaiveDate::from_ymd_opt(2026, 8, 3).unwrap()));
        assert!(!officer.is_licensed_on(NaiveDate::from_ymd_opt(2027, 1, 2).unwrap()));
    }

    #[test]
    fn inactive_license_never_passes() {
        let officer = LoanOfficer {
            id: OfficerId::new(),
            name: "Sam Okafor".into(),
            nmls_id: None,
            license_active: false,
            license_expires: None,
        };
        assert!(!officer.is_licensed_on(NaiveDate::from_ymd_opt(2026, 8, 3).unwrap()));
    }

    // ── Display / serde ──────────────────────────────────────────────

    #[test]
    fn status_display() {
        assert_eq!(LoanStatus::Application.to_string(), "application");
        assert_eq!(LoanStatus::Underwriting.to_string(), "underwriting");
        assert_eq!(LoanStatus::Funded.to_string(), "funded");
    }

    #[test]
    fn loan_serde_roundtrip() {
        let loan = make_loan();
        let json = serde_json::to_string(&loan).unwrap();
        let back: Loan = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, loan.id);
        assert_eq!(back.status, loan.status);
        assert_eq!(back.loan_amount_cents, loan.loan_amount_cents);
    }
}
