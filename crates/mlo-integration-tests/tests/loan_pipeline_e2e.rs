//! # Loan Pipeline End-to-End
//!
//! The orchestrator driving real engines: activities backed by the
//! actual compliance engine, the workflow engine completing steps from
//! status changes, and the audit trail recording everything in order.

use std::sync::Arc;

use chrono::{NaiveDate, TimeZone, Utc};
use serde_json::json;

use mlo_audit::{
    AuditAction, AuditEntryType, AuditSink, ComplianceAuditEntry, EntityRef, MemoryAuditSink,
};
use mlo_catalog::RuleCatalog;
use mlo_compliance::{ComplianceEngine, MemoryOfficerDirectory};
use mlo_core::{
    BorrowerId, Loan, LoanId, LoanOfficer, LoanStatus, OfficerId, OpContext, RegulationCode,
    TenantId,
};
use mlo_orchestrator::{
    Activities, ActivityFailure, ActivityReport, CancelToken, LoanStore, MemoryEventPublisher,
    MemoryLoanStore, MemoryNotificationSink, NotificationKind, Orchestrator, RunOutcome,
};

/// Activities wired to the real compliance engine; vendor-backed stages
/// succeed with canned data, and the credit decision is configurable.
struct PlatformActivities {
    compliance: ComplianceEngine,
    audit: Arc<MemoryAuditSink>,
    credit_approved: bool,
}

impl PlatformActivities {
    /// Vendor-backed activities record their sync the way the live
    /// integration layer does.
    fn record_sync(&self, loan: &Loan, ctx: &OpContext, provider: &str) {
        let entry = ComplianceAuditEntry::new(
            ctx.tenant_id,
            AuditEntryType::IntegrationSync,
            EntityRef::integration(*loan.id.as_uuid()),
            AuditAction::SyncCompleted,
            ctx.actor,
            ctx.now,
        )
        .with_metadata(json!({ "provider": provider, "loan_id": loan.id }));
        let _ = self.audit.append(entry);
    }

    fn report_compliance(&self, loan: &Loan, ctx: &OpContext) -> ActivityReport {
        match self.compliance.summarize(loan, ctx) {
            Ok(summary) if summary.is_compliant => ActivityReport::ok_with(
                "Loan is compliant",
                json!({ "total_violations": summary.total_violations }),
            ),
            Ok(summary) => ActivityReport {
                success: false,
                reason: "Compliance issues detected".into(),
                data: Some(json!({ "total_violations": summary.total_violations })),
            },
            Err(e) => ActivityReport::failed(format!("compliance run failed: {e}")),
        }
    }
}

impl Activities for PlatformActivities {
    async fn validate_application(
        &self,
        loan: &Loan,
        _ctx: &OpContext,
    ) -> Result<ActivityReport, ActivityFailure> {
        Ok(match loan.validate_application() {
            Ok(()) => ActivityReport::ok("Application is valid"),
            Err(e) => ActivityReport::failed(e.to_string()),
        })
    }

    async fn collect_documents(
        &self,
        _loan: &Loan,
        _ctx: &OpContext,
    ) -> Result<ActivityReport, ActivityFailure> {
        Ok(ActivityReport::ok_with(
            "All required documents uploaded",
            json!({ "uploaded": 5, "required": 5 }),
        ))
    }

    async fn run_credit_check(
        &self,
        loan: &Loan,
        ctx: &OpContext,
    ) -> Result<ActivityReport, ActivityFailure> {
        Ok(if self.credit_approved {
            self.record_sync(loan, ctx, "experian");
            ActivityReport::ok_with("Credit check passed", json!({ "credit_score": 731 }))
        } else {
            ActivityReport::failed("Credit score too low")
        })
    }

    async fn verify_income(
        &self,
        _loan: &Loan,
        _ctx: &OpContext,
    ) -> Result<ActivityReport, ActivityFailure> {
        Ok(ActivityReport::ok_with(
            "Income verified",
            json!({ "dti_ratio": 0.34 }),
        ))
    }

    async fn order_appraisal(
        &self,
        loan: &Loan,
        ctx: &OpContext,
    ) -> Result<ActivityReport, ActivityFailure> {
        self.record_sync(loan, ctx, "clear_capital");
        Ok(ActivityReport::ok_with(
            "Appraisal ordered",
            json!({ "appraisal_id": "APP-284117" }),
        ))
    }

    async fn run_compliance_check(
        &self,
        loan: &Loan,
        ctx: &OpContext,
    ) -> Result<ActivityReport, ActivityFailure> {
        Ok(self.report_compliance(loan, ctx))
    }

    async fn underwriting_review(
        &self,
        _loan: &Loan,
        _ctx: &OpContext,
    ) -> Result<ActivityReport, ActivityFailure> {
        Ok(ActivityReport::ok("Underwriting approved"))
    }

    async fn final_approval(
        &self,
        _loan: &Loan,
        _ctx: &OpContext,
    ) -> Result<ActivityReport, ActivityFailure> {
        Ok(ActivityReport::ok("Final approval granted"))
    }

    async fn prepare_closing(
        &self,
        _loan: &Loan,
        _ctx: &OpContext,
    ) -> Result<ActivityReport, ActivityFailure> {
        Ok(ActivityReport::ok("Closing documents prepared"))
    }

    async fn process_closing(
        &self,
        _loan: &Loan,
        _ctx: &OpContext,
    ) -> Result<ActivityReport, ActivityFailure> {
        Ok(ActivityReport::ok("Closing completed"))
    }

    async fn fund_loan(
        &self,
        _loan: &Loan,
        _ctx: &OpContext,
    ) -> Result<ActivityReport, ActivityFailure> {
        Ok(ActivityReport::ok("Funds disbursed"))
    }
}

struct Env {
    orchestrator: Orchestrator<PlatformActivities>,
    store: Arc<MemoryLoanStore>,
    sink: Arc<MemoryAuditSink>,
    notifications: Arc<MemoryNotificationSink>,
    loan_id: LoanId,
    ctx: OpContext,
}

fn env(credit_approved: bool, compliant_snapshot: bool) -> Env {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();

    let store = Arc::new(MemoryLoanStore::new());
    let sink = Arc::new(MemoryAuditSink::new());
    let notifications = Arc::new(MemoryNotificationSink::new());
    let publisher = Arc::new(MemoryEventPublisher::new());
    let directory = Arc::new(MemoryOfficerDirectory::new());

    let tenant = TenantId::new();
    let officer = LoanOfficer {
        id: OfficerId::new(),
        name: "Dana Reyes".into(),
        nmls_id: Some("1027345".into()),
        license_active: true,
        license_expires: None,
    };
    directory.insert(tenant, officer.clone());

    let mut loan = Loan::new(
        tenant,
        "ML-2026-000900",
        NaiveDate::from_ymd_opt(2026, 8, 3).unwrap(),
    );
    loan.borrower_id = Some(BorrowerId::new());
    loan.loan_amount_cents = 36_000_000;
    loan.loan_type = Some("conventional".into());
    loan.property_type = Some("single_family".into());
    loan.officer_id = Some(officer.id);

    if compliant_snapshot {
        use RegulationCode::*;
        for (code, field) in [
            (Trid, "loan_estimate"),
            (Trid, "closing_disclosure"),
            (Trid, "intent_to_proceed"),
            (Ecoa, "adverse_action_notice"),
            (Ecoa, "equal_credit_opportunity_notice"),
            (Respa, "good_faith_estimate"),
            (Respa, "hud1_settlement_statement"),
            (Respa, "servicing_disclosure"),
            (Glba, "privacy_notice_provided"),
            (Glba, "opt_out_mechanism"),
            (Fcra, "adverse_action_notice"),
            (Fcra, "risk_based_pricing_notice"),
            (AmlBsa, "suspicious_activity_reviewed"),
            (AmlBsa, "customer_due_diligence"),
        ] {
            loan.compliance.set_field(code, field, json!(true));
        }
    }

    let loan_id = loan.id;
    store.insert_loan(loan);

    let activities = PlatformActivities {
        compliance: ComplianceEngine::new(RuleCatalog::standard(), sink.clone(), directory),
        audit: sink.clone(),
        credit_approved,
    };
    let orchestrator = Orchestrator::new(
        store.clone(),
        activities,
        sink.clone(),
        notifications.clone(),
        publisher,
    );

    Env {
        orchestrator,
        store,
        sink,
        notifications,
        loan_id,
        ctx: OpContext::system(tenant, Utc.with_ymd_and_hms(2026, 8, 12, 10, 0, 0).unwrap()),
    }
}

#[tokio::test]
async fn compliant_loan_processes_to_funding() {
    let env = env(true, true);
    let outcome = env
        .orchestrator
        .process_loan(env.loan_id, &env.ctx, &CancelToken::new())
        .await
        .unwrap();
    assert_eq!(outcome, RunOutcome::Funded);

    let loan = env
        .store
        .load_loan(env.ctx.tenant_id, env.loan_id)
        .unwrap()
        .unwrap();
    assert_eq!(loan.status, LoanStatus::Funded);
    assert_eq!(loan.status_history.len(), 5);

    // The audit trail covers the whole run: initialization, the
    // compliance check, step completions, and status changes.
    let tenant = env.ctx.tenant_id;
    assert_eq!(
        env.sink
            .entries_by_type(tenant, AuditEntryType::WorkflowInitialized)
            .len(),
        1
    );
    assert_eq!(
        env.sink
            .entries_by_type(tenant, AuditEntryType::ComplianceCheck)
            .len(),
        1
    );
    assert_eq!(
        env.sink
            .entries_by_type(tenant, AuditEntryType::ComplianceViolation)
            .len(),
        0
    );
    assert_eq!(
        env.sink
            .entries_by_type(tenant, AuditEntryType::WorkflowStepCompleted)
            .len(),
        9
    );
    assert_eq!(
        env.sink
            .entries_by_type(tenant, AuditEntryType::LoanStatusChanged)
            .len(),
        5
    );
    // One vendor sync each for the credit pull and the appraisal order.
    assert_eq!(
        env.sink
            .entries_by_type(tenant, AuditEntryType::IntegrationSync)
            .len(),
        2
    );
}

#[tokio::test]
async fn credit_denial_halts_with_audit_trail_intact() {
    let env = env(false, true);
    let outcome = env
        .orchestrator
        .process_loan(env.loan_id, &env.ctx, &CancelToken::new())
        .await
        .unwrap();
    assert_eq!(outcome, RunOutcome::Denied);

    let loan = env
        .store
        .load_loan(env.ctx.tenant_id, env.loan_id)
        .unwrap()
        .unwrap();
    assert_eq!(loan.status, LoanStatus::Denied);

    // Processing then denied: two transitions, both audited.
    assert_eq!(loan.status_history.len(), 2);
    assert_eq!(
        env.sink
            .entries_by_type(env.ctx.tenant_id, AuditEntryType::LoanStatusChanged)
            .len(),
        2
    );
    assert!(env
        .notifications
        .sent()
        .iter()
        .any(|(_, kind, message)| *kind == NotificationKind::Error
            && message == "Credit check failed"));
}

#[tokio::test]
async fn violations_surface_as_warnings_without_halting() {
    let env = env(true, false);
    let outcome = env
        .orchestrator
        .process_loan(env.loan_id, &env.ctx, &CancelToken::new())
        .await
        .unwrap();

    // The non-compliant snapshot fails the compliance stage, which is
    // non-gating: the loan still funds, with a warning on record.
    assert_eq!(outcome, RunOutcome::Funded);
    assert!(env
        .notifications
        .sent()
        .iter()
        .any(|(_, kind, message)| *kind == NotificationKind::Warning
            && message == "Compliance issues detected"));

    // Violations were individually audited during the stage.
    assert!(
        !env.sink
            .entries_by_type(env.ctx.tenant_id, AuditEntryType::ComplianceViolation)
            .is_empty()
    );
}

#[tokio::test]
async fn audit_entries_are_never_mutated_by_later_stages() {
    let env = env(true, true);
    env.orchestrator
        .process_loan(env.loan_id, &env.ctx, &CancelToken::new())
        .await
        .unwrap();

    // Snapshot the trail, trigger more activity, and verify the earlier
    // entries are untouched (append-only).
    let before = env.sink.entries_for_tenant(env.ctx.tenant_id);

    // A finished run cannot be resumed; the attempt adds nothing.
    env.orchestrator
        .resume(env.loan_id, &env.ctx, &CancelToken::new())
        .await
        .unwrap_err();

    let after = env.sink.entries_for_tenant(env.ctx.tenant_id);
    assert_eq!(after.len(), before.len());
    for (a, b) in before.iter().zip(after.iter()) {
        assert_eq!(a.id, b.id);
        assert_eq!(a.sequence, b.sequence);
        assert_eq!(a.entry_type, b.entry_type);
    }
}
