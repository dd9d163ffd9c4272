//! # Processing Pipeline
//!
//! The orchestrator: walks the stage sequence for one loan, applies the
//! gating policy, and owns the single status-update path — loan state
//! machine transition, workflow advancement, audit entry, event publish,
//! workflow event record, in that order.
//!
//! ## Durable Cursor
//!
//! The run record's cursor is persisted *before* each stage executes. A
//! crash or cooperative cancellation leaves the cursor pointing at the
//! stage that did not complete; [`Orchestrator::resume`] picks up there
//! without re-executing earlier stages.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

use mlo_audit::{
    AuditAction, AuditEntryType, AuditError, AuditSink, ComplianceAuditEntry, EntityRef,
};
use mlo_core::{Loan, LoanError, LoanId, LoanStatus, OpContext, TenantId};
use mlo_workflow::{WorkflowEngine, WorkflowError};

use crate::activities::{Activities, ActivityReport};
use crate::events::{EventPublisher, NotificationKind, NotificationSink};
use crate::locks::LoanLocks;
use crate::stage::{ProcessingStage, RunOutcome};
use crate::store::{LoanStore, StoreError, WorkflowEvent};

// ---------------------------------------------------------------------------
// CancelToken
// ---------------------------------------------------------------------------

/// Cooperative cancellation flag, checked at stage boundaries. Stages
/// can run long (appraisal turnaround is measured in days), so runs must
/// be stoppable between them without losing progress.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. The run stops before its next stage.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

// ---------------------------------------------------------------------------
// ProcessingRun
// ---------------------------------------------------------------------------

/// The durable record of one processing run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingRun {
    pub tenant_id: TenantId,
    pub loan_id: LoanId,
    /// The next stage to execute; `None` once the run has finished.
    pub cursor: Option<ProcessingStage>,
    pub outcome: Option<RunOutcome>,
    pub started_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProcessingRun {
    /// A fresh run positioned at the first stage.
    pub fn new(tenant_id: TenantId, loan_id: LoanId, now: DateTime<Utc>) -> Self {
        Self {
            tenant_id,
            loan_id,
            cursor: Some(ProcessingStage::first()),
            outcome: None,
            started_at: now,
            updated_at: now,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.outcome.is_some()
    }
}

// ---------------------------------------------------------------------------
// OrchestratorError
// ---------------------------------------------------------------------------

/// Errors from the orchestrator.
#[derive(Error, Debug)]
pub enum OrchestratorError {
    /// The loan does not exist in the store.
    #[error("loan {loan_id} not found")]
    LoanNotFound {
        /// The missing loan's id.
        loan_id: String,
    },

    /// Resume was requested but no unfinished run exists.
    #[error("no processing run to resume for loan {loan_id}")]
    NoRunToResume {
        /// The loan with no resumable run.
        loan_id: String,
    },

    /// The run was cancelled before the given stage executed. The
    /// cursor is preserved; resume continues here.
    #[error("processing cancelled before stage {stage}")]
    Cancelled {
        /// The stage that did not run.
        stage: ProcessingStage,
    },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    #[error(transparent)]
    Audit(#[from] AuditError),

    #[error(transparent)]
    Loan(#[from] LoanError),
}

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

/// Sequences a loan through the processing stages against its
/// activities, translating activity outcomes into status transitions and
/// notifications. No component above this one retries loan-level
/// business decisions.
pub struct Orchestrator<A: Activities> {
    store: Arc<dyn LoanStore>,
    activities: A,
    workflow: WorkflowEngine,
    audit: Arc<dyn AuditSink>,
    notifications: Arc<dyn NotificationSink>,
    publisher: Arc<dyn EventPublisher>,
    locks: LoanLocks,
}

impl<A: Activities> Orchestrator<A> {
    pub fn new(
        store: Arc<dyn LoanStore>,
        activities: A,
        audit: Arc<dyn AuditSink>,
        notifications: Arc<dyn NotificationSink>,
        publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            store,
            activities,
            workflow: WorkflowEngine::new(audit.clone()),
            audit,
            notifications,
            publisher,
            locks: LoanLocks::new(),
        }
    }

    /// Start a fresh processing run for a loan and drive it to an
    /// outcome, holding the loan's lock for the duration.
    pub async fn process_loan(
        &self,
        loan_id: LoanId,
        ctx: &OpContext,
        cancel: &CancelToken,
    ) -> Result<RunOutcome, OrchestratorError> {
        let lock = self.locks.lock_for(loan_id);
        let _guard = lock.lock().await;
        let run = ProcessingRun::new(ctx.tenant_id, loan_id, ctx.now);
        self.execute(run, ctx, cancel).await
    }

    /// Resume an unfinished run from its persisted cursor.
    pub async fn resume(
        &self,
        loan_id: LoanId,
        ctx: &OpContext,
        cancel: &CancelToken,
    ) -> Result<RunOutcome, OrchestratorError> {
        let lock = self.locks.lock_for(loan_id);
        let _guard = lock.lock().await;
        let run = self
            .store
            .load_run(ctx.tenant_id, loan_id)?
            .filter(|r| !r.is_finished())
            .ok_or_else(|| OrchestratorError::NoRunToResume {
                loan_id: loan_id.to_string(),
            })?;
        self.execute(run, ctx, cancel).await
    }

    async fn execute(
        &self,
        mut run: ProcessingRun,
        ctx: &OpContext,
        cancel: &CancelToken,
    ) -> Result<RunOutcome, OrchestratorError> {
        let mut loan = self
            .store
            .load_loan(ctx.tenant_id, run.loan_id)?
            .ok_or_else(|| OrchestratorError::LoanNotFound {
                loan_id: run.loan_id.to_string(),
            })?;

        // Materialize the workflow on first contact with this loan.
        if self.store.load_steps(ctx.tenant_id, loan.id)?.is_empty() {
            let steps = self.workflow.initialize(&loan, &[], ctx)?;
            self.store.save_steps(&steps)?;
        }

        while let Some(stage) = run.cursor {
            if cancel.is_cancelled() {
                run.updated_at = ctx.now;
                self.store.save_run(&run)?;
                tracing::info!(loan_id = %loan.id, %stage, "processing cancelled at stage boundary");
                return Err(OrchestratorError::Cancelled { stage });
            }

            // Durable cursor: checkpoint before the stage runs.
            run.updated_at = ctx.now;
            self.store.save_run(&run)?;

            // Underwriting begins with the status transition, before the
            // review itself.
            if stage == ProcessingStage::Underwriting {
                self.set_status(&mut loan, LoanStatus::Underwriting, "Underwriting started", ctx)?;
            }

            let report = match self.run_stage(stage, &loan, ctx).await {
                Ok(report) => report,
                Err(failure) => {
                    tracing::error!(
                        loan_id = %loan.id,
                        %stage,
                        error = %failure,
                        "activity error — treating as gating failure"
                    );
                    self.notifications.notify(
                        ctx.tenant_id,
                        loan.id,
                        NotificationKind::Error,
                        &format!("Processing failed: {failure}"),
                    );
                    let outcome = self.force_denied(&mut loan, &failure.to_string(), ctx)?;
                    return self.finish(run, outcome, ctx);
                }
            };

            if report.success {
                self.on_stage_success(stage, &mut loan, ctx)?;
                if stage == ProcessingStage::Fund {
                    return self.finish(run, RunOutcome::Funded, ctx);
                }
            } else {
                tracing::warn!(
                    loan_id = %loan.id,
                    %stage,
                    reason = %report.reason,
                    "stage reported failure"
                );
                if stage.is_gating() {
                    self.notifications.notify(
                        ctx.tenant_id,
                        loan.id,
                        NotificationKind::Error,
                        failure_message(stage),
                    );
                    let outcome = self.force_denied(&mut loan, &report.reason, ctx)?;
                    return self.finish(run, outcome, ctx);
                }
                match stage {
                    ProcessingStage::ProcessClosing => {
                        // Terminal, but the closing partially completed:
                        // closed, not denied.
                        self.notifications.notify(
                            ctx.tenant_id,
                            loan.id,
                            NotificationKind::Error,
                            failure_message(stage),
                        );
                        self.set_status(&mut loan, LoanStatus::Closed, &report.reason, ctx)?;
                        return self.finish(run, RunOutcome::Closed, ctx);
                    }
                    ProcessingStage::Fund => {
                        // Funds not disbursed; the loan stays closed.
                        return self.finish(run, RunOutcome::Closed, ctx);
                    }
                    _ => {
                        self.notifications.notify(
                            ctx.tenant_id,
                            loan.id,
                            NotificationKind::Warning,
                            failure_message(stage),
                        );
                    }
                }
            }

            run.cursor = stage.next();
        }

        // Only reachable if a persisted run's cursor was already `None`.
        self.finish(run, RunOutcome::Closed, ctx)
    }

    /// Dispatch one stage to its activity.
    async fn run_stage(
        &self,
        stage: ProcessingStage,
        loan: &Loan,
        ctx: &OpContext,
    ) -> Result<ActivityReport, crate::activities::ActivityFailure> {
        match stage {
            ProcessingStage::Validate => self.activities.validate_application(loan, ctx).await,
            ProcessingStage::CollectDocuments => self.activities.collect_documents(loan, ctx).await,
            ProcessingStage::CreditCheck => self.activities.run_credit_check(loan, ctx).await,
            ProcessingStage::VerifyIncome => self.activities.verify_income(loan, ctx).await,
            ProcessingStage::OrderAppraisal => self.activities.order_appraisal(loan, ctx).await,
            ProcessingStage::ComplianceCheck => self.activities.run_compliance_check(loan, ctx).await,
            ProcessingStage::Underwriting => self.activities.underwriting_review(loan, ctx).await,
            ProcessingStage::FinalApproval => self.activities.final_approval(loan, ctx).await,
            ProcessingStage::PrepareClosing => self.activities.prepare_closing(loan, ctx).await,
            ProcessingStage::ProcessClosing => self.activities.process_closing(loan, ctx).await,
            ProcessingStage::Fund => self.activities.fund_loan(loan, ctx).await,
        }
    }

    /// Side effects of a successful stage.
    fn on_stage_success(
        &self,
        stage: ProcessingStage,
        loan: &mut Loan,
        ctx: &OpContext,
    ) -> Result<(), OrchestratorError> {
        match stage {
            ProcessingStage::Validate => {
                self.set_status(loan, LoanStatus::Processing, "Application validated", ctx)?;
                self.notifications.notify(
                    ctx.tenant_id,
                    loan.id,
                    NotificationKind::Info,
                    "Application validated, processing started",
                );
            }
            ProcessingStage::FinalApproval => {
                self.set_status(loan, LoanStatus::Approved, "Final approval granted", ctx)?;
                self.notifications.notify(
                    ctx.tenant_id,
                    loan.id,
                    NotificationKind::Success,
                    "Loan approved",
                );
            }
            ProcessingStage::ProcessClosing => {
                self.set_status(loan, LoanStatus::Closed, "Closing completed", ctx)?;
                self.notifications.notify(
                    ctx.tenant_id,
                    loan.id,
                    NotificationKind::Success,
                    "Closing completed",
                );
            }
            ProcessingStage::Fund => {
                self.set_status(loan, LoanStatus::Funded, "Loan funded", ctx)?;
                self.notifications.notify(
                    ctx.tenant_id,
                    loan.id,
                    NotificationKind::Success,
                    "Loan funded successfully",
                );
            }
            _ => {}
        }
        Ok(())
    }

    /// The single status-update path: state machine transition, workflow
    /// advancement, audit entry, event publish, workflow event record.
    /// A no-op when the loan already holds the target status, so resumed
    /// runs do not replay transitions.
    fn set_status(
        &self,
        loan: &mut Loan,
        status: LoanStatus,
        reason: &str,
        ctx: &OpContext,
    ) -> Result<(), OrchestratorError> {
        if loan.status == status {
            return Ok(());
        }
        let old = loan.status;
        loan.update_status(status, Some(reason), ctx)?;
        self.store.save_loan(loan)?;

        let mut steps = self.store.load_steps(ctx.tenant_id, loan.id)?;
        self.workflow.advance_for_status(&mut steps, status, ctx)?;
        self.store.save_steps(&steps)?;

        self.audit.append(
            ComplianceAuditEntry::new(
                ctx.tenant_id,
                AuditEntryType::LoanStatusChanged,
                EntityRef::loan(loan.id),
                AuditAction::StatusChanged,
                ctx.actor,
                ctx.now,
            )
            .with_old_values(json!({ "status": old.as_str() }))
            .with_new_values(json!({ "status": status.as_str() }))
            .with_metadata(json!({ "reason": reason })),
        )?;

        self.publisher.publish(
            "loan_state_changes",
            &loan.id.to_string(),
            json!({ "loan_id": loan.id, "status": status.as_str() }),
        );
        self.store.append_workflow_event(WorkflowEvent {
            id: Uuid::new_v4(),
            tenant_id: ctx.tenant_id,
            loan_id: loan.id,
            status,
            metadata: json!({ "source": "loan_pipeline", "reason": reason }),
            recorded_at: ctx.now,
        })?;
        Ok(())
    }

    /// Deny the loan if the state machine permits it. A loan already
    /// closed cannot be denied — the run ends as `Closed` instead.
    fn force_denied(
        &self,
        loan: &mut Loan,
        reason: &str,
        ctx: &OpContext,
    ) -> Result<RunOutcome, OrchestratorError> {
        if loan.status.can_transition_to(LoanStatus::Denied) {
            self.set_status(loan, LoanStatus::Denied, reason, ctx)?;
            Ok(RunOutcome::Denied)
        } else {
            tracing::warn!(
                loan_id = %loan.id,
                status = %loan.status,
                "cannot deny from current status — leaving status unchanged"
            );
            Ok(if loan.status == LoanStatus::Closed {
                RunOutcome::Closed
            } else {
                RunOutcome::Denied
            })
        }
    }

    /// Seal the run record with its outcome.
    fn finish(
        &self,
        mut run: ProcessingRun,
        outcome: RunOutcome,
        ctx: &OpContext,
    ) -> Result<RunOutcome, OrchestratorError> {
        run.outcome = Some(outcome);
        run.cursor = None;
        run.updated_at = ctx.now;
        self.store.save_run(&run)?;
        tracing::info!(loan_id = %run.loan_id, %outcome, "processing run finished");
        Ok(outcome)
    }
}

/// The user-facing message for a stage failure.
fn failure_message(stage: ProcessingStage) -> &'static str {
    match stage {
        ProcessingStage::Validate => "Application validation failed",
        ProcessingStage::CollectDocuments => "Document collection incomplete",
        ProcessingStage::CreditCheck => "Credit check failed",
        ProcessingStage::VerifyIncome => "Income verification failed",
        ProcessingStage::OrderAppraisal => "Appraisal could not be ordered",
        ProcessingStage::ComplianceCheck => "Compliance issues detected",
        ProcessingStage::Underwriting => "Underwriting review failed",
        ProcessingStage::FinalApproval => "Final approval failed",
        ProcessingStage::PrepareClosing => "Closing preparation incomplete",
        ProcessingStage::ProcessClosing => "Closing failed",
        ProcessingStage::Fund => "Funding incomplete",
    }
}
