//! # Vendor Client × Orchestrator Gating
//!
//! The credit-check activity backed by the real retrying vendor client:
//! a transient bureau failure is absorbed by the retry policy, while
//! retry exhaustion surfaces as a failed activity that the orchestrator
//! gates into a denial.

use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, TimeZone, Utc};
use parking_lot::Mutex;
use serde_json::json;

use mlo_audit::MemoryAuditSink;
use mlo_core::{BorrowerId, Loan, LoanId, LoanStatus, OpContext, TenantId};
use mlo_integration::{
    Credential, CredentialStore, IntegrationError, RetryPolicy, Transport, VendorClient,
    VendorRequest, VendorResponse,
};
use mlo_orchestrator::{
    Activities, ActivityFailure, ActivityReport, CancelToken, LoanStore, MemoryEventPublisher,
    MemoryLoanStore, MemoryNotificationSink, NotificationKind, Orchestrator, RunOutcome,
};

/// A canned credit bureau: pops one response per request.
struct CannedBureau {
    responses: Mutex<Vec<VendorResponse>>,
}

impl CannedBureau {
    fn new(responses: Vec<(u16, &str)>) -> Self {
        Self {
            responses: Mutex::new(
                responses
                    .into_iter()
                    .map(|(status, body)| VendorResponse {
                        status,
                        body: body.to_string(),
                    })
                    .collect(),
            ),
        }
    }
}

impl Transport for CannedBureau {
    async fn send(
        &self,
        _request: &VendorRequest,
        _credential: Option<&Credential>,
    ) -> Result<VendorResponse, IntegrationError> {
        let mut responses = self.responses.lock();
        if responses.is_empty() {
            return Err(IntegrationError::Transport("bureau script exhausted".into()));
        }
        Ok(responses.remove(0))
    }
}

/// Activities where only the credit check does real work, through the
/// vendor client.
struct CreditActivities {
    bureau: VendorClient<CannedBureau>,
}

impl CreditActivities {
    fn ok(reason: &str) -> Result<ActivityReport, ActivityFailure> {
        Ok(ActivityReport::ok(reason))
    }
}

impl Activities for CreditActivities {
    async fn validate_application(
        &self,
        _loan: &Loan,
        _ctx: &OpContext,
    ) -> Result<ActivityReport, ActivityFailure> {
        Self::ok("valid")
    }
    async fn collect_documents(
        &self,
        _loan: &Loan,
        _ctx: &OpContext,
    ) -> Result<ActivityReport, ActivityFailure> {
        Self::ok("documents complete")
    }
    async fn run_credit_check(
        &self,
        loan: &Loan,
        _ctx: &OpContext,
    ) -> Result<ActivityReport, ActivityFailure> {
        let outcome = self
            .bureau
            .call(&VendorRequest::post(
                "credit-check",
                json!({ "loan_number": loan.loan_number }),
            ))
            .await;
        Ok(if outcome.success {
            let approved = outcome
                .data
                .as_ref()
                .and_then(|d| d["approved"].as_bool())
                .unwrap_or(false);
            if approved {
                ActivityReport::ok_with("Credit check passed", outcome.data.unwrap_or_default())
            } else {
                ActivityReport::failed("Credit score too low")
            }
        } else {
            ActivityReport::failed(outcome.error.unwrap_or_else(|| "bureau unavailable".into()))
        })
    }
    async fn verify_income(
        &self,
        _loan: &Loan,
        _ctx: &OpContext,
    ) -> Result<ActivityReport, ActivityFailure> {
        Self::ok("income verified")
    }
    async fn order_appraisal(
        &self,
        _loan: &Loan,
        _ctx: &OpContext,
    ) -> Result<ActivityReport, ActivityFailure> {
        Self::ok("appraisal ordered")
    }
    async fn run_compliance_check(
        &self,
        _loan: &Loan,
        _ctx: &OpContext,
    ) -> Result<ActivityReport, ActivityFailure> {
        Self::ok("compliant")
    }
    async fn underwriting_review(
        &self,
        _loan: &Loan,
        _ctx: &OpContext,
    ) -> Result<ActivityReport, ActivityFailure> {
        Self::ok("underwriting approved")
    }
    async fn final_approval(
        &self,
        _loan: &Loan,
        _ctx: &OpContext,
    ) -> Result<ActivityReport, ActivityFailure> {
        Self::ok("approved")
    }
    async fn prepare_closing(
        &self,
        _loan: &Loan,
        _ctx: &OpContext,
    ) -> Result<ActivityReport, ActivityFailure> {
        Self::ok("closing prepared")
    }
    async fn process_closing(
        &self,
        _loan: &Loan,
        _ctx: &OpContext,
    ) -> Result<ActivityReport, ActivityFailure> {
        Self::ok("closing completed")
    }
    async fn fund_loan(
        &self,
        _loan: &Loan,
        _ctx: &OpContext,
    ) -> Result<ActivityReport, ActivityFailure> {
        Self::ok("funded")
    }
}

struct Env {
    orchestrator: Orchestrator<CreditActivities>,
    store: Arc<MemoryLoanStore>,
    notifications: Arc<MemoryNotificationSink>,
    loan_id: LoanId,
    ctx: OpContext,
}

fn env(bureau_script: Vec<(u16, &str)>) -> Env {
    let store = Arc::new(MemoryLoanStore::new());
    let notifications = Arc::new(MemoryNotificationSink::new());

    let tenant = TenantId::new();
    let mut loan = Loan::new(
        tenant,
        "ML-2026-001200",
        NaiveDate::from_ymd_opt(2026, 8, 3).unwrap(),
    );
    loan.borrower_id = Some(BorrowerId::new());
    loan.loan_amount_cents = 27_500_000;
    loan.loan_type = Some("fha".into());
    loan.property_type = Some("townhouse".into());
    let loan_id = loan.id;
    store.insert_loan(loan);

    let bureau = VendorClient::new(
        CannedBureau::new(bureau_script),
        RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_millis(1),
        },
        CredentialStore::new(vec![Credential {
            name: "primary".into(),
            token: "token-primary".into(),
        }]),
    );

    let orchestrator = Orchestrator::new(
        store.clone(),
        CreditActivities { bureau },
        Arc::new(MemoryAuditSink::new()),
        notifications.clone(),
        Arc::new(MemoryEventPublisher::new()),
    );

    Env {
        orchestrator,
        store,
        notifications,
        loan_id,
        ctx: OpContext::system(tenant, Utc.with_ymd_and_hms(2026, 8, 5, 9, 0, 0).unwrap()),
    }
}

#[tokio::test]
async fn transient_bureau_failure_is_retried_and_the_loan_funds() {
    let env = env(vec![
        (503, "service unavailable"),
        (200, r#"{"approved": true, "credit_score": 702}"#),
    ]);
    let outcome = env
        .orchestrator
        .process_loan(env.loan_id, &env.ctx, &CancelToken::new())
        .await
        .unwrap();
    assert_eq!(outcome, RunOutcome::Funded);
}

#[tokio::test]
async fn bureau_exhaustion_gates_the_loan_to_denial() {
    let env = env(vec![
        (500, "bureau down"),
        (500, "bureau down"),
        (500, "bureau down"),
    ]);
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
    assert!(env
        .notifications
        .sent()
        .iter()
        .any(|(_, kind, message)| *kind == NotificationKind::Error
            && message == "Credit check failed"));
}

#[tokio::test]
async fn declined_credit_denies_without_retries_mattering() {
    let env = env(vec![(200, r#"{"approved": false, "credit_score": 540}"#)]);
    let outcome = env
        .orchestrator
        .process_loan(env.loan_id, &env.ctx, &CancelToken::new())
        .await
        .unwrap();
    assert_eq!(outcome, RunOutcome::Denied);
}
