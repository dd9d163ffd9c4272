//! # Workflow Engine
//!
//! Materializes the step template, completes steps from status changes,
//! and enforces criteria gates on explicit completion. Every transition
//! is recorded in the audit trail.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

use mlo_audit::{
    AuditAction, AuditEntryType, AuditError, AuditSink, ComplianceAuditEntry, EntityRef,
};
use mlo_core::{Loan, LoanStatus, OfficerId, OpContext, StepId};

use crate::step::{StepName, WorkflowStep};
use crate::template::{standard_steps, steps_for_status};

// ---------------------------------------------------------------------------
// CriteriaContext
// ---------------------------------------------------------------------------

/// Live loan/document/compliance state, as seen by completion criteria.
///
/// The engine resolves criterion names against this boundary; the real
/// implementation reads the document store and the compliance engine.
pub trait CriteriaContext {
    /// How many documents are uploaded for the loan.
    fn documents_uploaded(&self) -> usize;
    /// Whether the loan is currently compliant.
    fn is_compliant(&self) -> bool;
    /// The loan's current status.
    fn loan_status(&self) -> LoanStatus;
}

// ---------------------------------------------------------------------------
// WorkflowError
// ---------------------------------------------------------------------------

/// Errors from workflow operations.
#[derive(Error, Debug)]
pub enum WorkflowError {
    /// The loan's workflow is already initialized. A second
    /// initialization would corrupt step ordering.
    #[error("workflow already initialized for loan {loan_id}")]
    AlreadyInitialized {
        /// The loan whose workflow exists.
        loan_id: String,
    },

    /// Completion was attempted before the step's criteria were
    /// satisfied. Nothing was mutated; the caller must resolve the
    /// criteria first.
    #[error("step {step} does not meet completion criteria")]
    CriteriaNotMet {
        /// The step's title.
        step: String,
    },

    /// The step is already completed; `pending → completed` is terminal.
    #[error("step {step} is already completed")]
    StepAlreadyCompleted {
        /// The step's title.
        step: String,
    },

    /// The audit sink rejected an append.
    #[error(transparent)]
    Audit(#[from] AuditError),
}

// ---------------------------------------------------------------------------
// WorkflowEngine
// ---------------------------------------------------------------------------

/// The workflow engine. Stateless apart from its audit sink — step
/// storage is the caller's boundary.
pub struct WorkflowEngine {
    audit: Arc<dyn AuditSink>,
}

impl WorkflowEngine {
    pub fn new(audit: Arc<dyn AuditSink>) -> Self {
        Self { audit }
    }

    /// Materialize the standard template into concrete steps for a loan,
    /// `step_order` 1..N in template order, due dates offset from the
    /// application date.
    ///
    /// Rejects a loan that already has steps — double initialization
    /// would corrupt ordering.
    pub fn initialize(
        &self,
        loan: &Loan,
        existing: &[WorkflowStep],
        ctx: &OpContext,
    ) -> Result<Vec<WorkflowStep>, WorkflowError> {
        if existing.iter().any(|s| s.loan_id == loan.id) {
            return Err(WorkflowError::AlreadyInitialized {
                loan_id: loan.id.to_string(),
            });
        }

        let application_midnight = loan
            .application_date
            .and_time(chrono::NaiveTime::MIN)
            .and_utc();

        let steps: Vec<WorkflowStep> = standard_steps()
            .into_iter()
            .enumerate()
            .map(|(index, template)| WorkflowStep {
                id: StepId::new(),
                tenant_id: loan.tenant_id,
                loan_id: loan.id,
                name: template.name,
                step_type: template.step_type,
                step_order: index as u32 + 1,
                is_required: template.is_required,
                is_completed: false,
                completion_criteria: template.completion_criteria,
                compliance_requirements: template.compliance_requirements,
                assigned_to: if template.assign_to_officer {
                    loan.officer_id
                } else {
                    None
                },
                due_date: application_midnight + chrono::Duration::hours(template.due_offset_hours),
                completed_at: None,
                completed_by: None,
            })
            .collect();

        self.audit.append(
            ComplianceAuditEntry::new(
                ctx.tenant_id,
                AuditEntryType::WorkflowInitialized,
                EntityRef::loan(loan.id),
                AuditAction::WorkflowInitialized,
                ctx.actor,
                ctx.now,
            )
            .with_new_values(json!({ "workflow_steps": steps.len() })),
        )?;

        tracing::info!(loan_id = %loan.id, steps = steps.len(), "workflow initialized");
        Ok(steps)
    }

    /// Complete every step the new status maps to, skipping steps that
    /// are already completed. Calling twice with the same status is a
    /// no-op the second time.
    ///
    /// Returns the ids of the steps completed by this call.
    pub fn advance_for_status(
        &self,
        steps: &mut [WorkflowStep],
        status: LoanStatus,
        ctx: &OpContext,
    ) -> Result<Vec<StepId>, WorkflowError> {
        let mapped = steps_for_status(status);
        let mut completed = Vec::new();

        for step in steps.iter_mut() {
            if mapped.contains(&step.name) && !step.is_completed {
                mark_completed(step, ctx);
                self.audit.append(
                    ComplianceAuditEntry::new(
                        ctx.tenant_id,
                        AuditEntryType::WorkflowStepCompleted,
                        EntityRef::step(step.id),
                        AuditAction::StepCompleted,
                        ctx.actor,
                        ctx.now,
                    )
                    .with_new_values(json!({
                        "step_name": step.name.title(),
                        "loan_status": status.as_str(),
                    }))
                    .with_metadata(json!({ "loan_id": step.loan_id })),
                )?;
                completed.push(step.id);
            }
        }

        Ok(completed)
    }

    /// Complete a step explicitly, enforcing its completion criteria.
    ///
    /// Unknown criterion names evaluate false — a template entry the
    /// resolver cannot answer keeps the step gated rather than silently
    /// passing.
    pub fn complete_step(
        &self,
        step: &mut WorkflowStep,
        resolver: &dyn CriteriaContext,
        ctx: &OpContext,
    ) -> Result<(), WorkflowError> {
        if step.is_completed {
            return Err(WorkflowError::StepAlreadyCompleted {
                step: step.name.title().to_string(),
            });
        }
        let all_met = step
            .completion_criteria
            .iter()
            .all(|(name, expected)| criterion_met(name, expected, resolver));
        if !all_met {
            return Err(WorkflowError::CriteriaNotMet {
                step: step.name.title().to_string(),
            });
        }

        mark_completed(step, ctx);
        self.audit.append(
            ComplianceAuditEntry::new(
                ctx.tenant_id,
                AuditEntryType::WorkflowStepCompleted,
                EntityRef::step(step.id),
                AuditAction::StepCompleted,
                ctx.actor,
                ctx.now,
            )
            .with_new_values(json!({
                "step_name": step.name.title(),
                "completed_by": ctx.actor.map(|a| a.to_string()),
            }))
            .with_metadata(json!({ "loan_id": step.loan_id })),
        )?;
        Ok(())
    }

    /// Assign a step to an officer.
    pub fn assign_step(
        &self,
        step: &mut WorkflowStep,
        assignee: OfficerId,
        ctx: &OpContext,
    ) -> Result<(), WorkflowError> {
        step.assigned_to = Some(assignee);
        self.audit.append(
            ComplianceAuditEntry::new(
                ctx.tenant_id,
                AuditEntryType::WorkflowStepAssigned,
                EntityRef::step(step.id),
                AuditAction::StepAssigned,
                ctx.actor,
                ctx.now,
            )
            .with_new_values(json!({ "assigned_to": assignee.to_string() }))
            .with_metadata(json!({ "loan_id": step.loan_id })),
        )?;
        Ok(())
    }

    /// Incomplete steps past their due date, optionally filtered by
    /// assignee, ordered by due date.
    pub fn overdue_steps<'a>(
        &self,
        steps: &'a [WorkflowStep],
        now: DateTime<Utc>,
        assignee: Option<OfficerId>,
    ) -> Vec<&'a WorkflowStep> {
        let mut overdue: Vec<&WorkflowStep> = steps
            .iter()
            .filter(|s| s.is_overdue(now))
            .filter(|s| assignee.map_or(true, |a| s.assigned_to == Some(a)))
            .collect();
        overdue.sort_by_key(|s| s.due_date);
        overdue
    }

    /// Per-loan progress summary for dashboards.
    pub fn summary(&self, steps: &[WorkflowStep], now: DateTime<Utc>) -> WorkflowSummary {
        let completed = steps.iter().filter(|s| s.is_completed).count();
        let current_step = steps
            .iter()
            .filter(|s| !s.is_completed)
            .min_by_key(|s| s.step_order)
            .map(|s| s.name);
        let next_due_date = steps
            .iter()
            .filter(|s| !s.is_completed)
            .map(|s| s.due_date)
            .min();
        WorkflowSummary {
            total_steps: steps.len(),
            completed_steps: completed,
            pending_steps: steps.len() - completed,
            overdue_steps: steps.iter().filter(|s| s.is_overdue(now)).count(),
            current_step,
            next_due_date,
        }
    }

    /// Tenant-wide completion statistics.
    pub fn statistics(&self, steps: &[WorkflowStep], now: DateTime<Utc>) -> WorkflowStatistics {
        let total = steps.len();
        let completed = steps.iter().filter(|s| s.is_completed).count();
        let completion_rate = if total > 0 {
            (completed as f64 / total as f64 * 10_000.0).round() / 100.0
        } else {
            0.0
        };
        WorkflowStatistics {
            total_steps: total,
            completed_steps: completed,
            overdue_steps: steps.iter().filter(|s| s.is_overdue(now)).count(),
            completion_rate,
        }
    }
}

impl std::fmt::Debug for WorkflowEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkflowEngine").finish()
    }
}

fn mark_completed(step: &mut WorkflowStep, ctx: &OpContext) {
    step.is_completed = true;
    step.completed_at = Some(ctx.now);
    step.completed_by = ctx.actor;
}

/// Resolve one criterion. Unknown names fail closed.
fn criterion_met(name: &str, expected: &Value, resolver: &dyn CriteriaContext) -> bool {
    match name {
        "documents_uploaded" => expected
            .as_u64()
            .map_or(false, |required| resolver.documents_uploaded() as u64 >= required),
        "compliance_verified" => resolver.is_compliant(),
        "approval_received" => resolver.loan_status() == LoanStatus::Approved,
        _ => false,
    }
}

// ---------------------------------------------------------------------------
// Summary types
// ---------------------------------------------------------------------------

/// Per-loan workflow progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowSummary {
    pub total_steps: usize,
    pub completed_steps: usize,
    pub pending_steps: usize,
    pub overdue_steps: usize,
    /// The first incomplete step by order, if any remain.
    pub current_step: Option<StepName>,
    /// The earliest due date among incomplete steps.
    pub next_due_date: Option<DateTime<Utc>>,
}

/// Aggregate workflow statistics across many steps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowStatistics {
    pub total_steps: usize,
    pub completed_steps: usize,
    pub overdue_steps: usize,
    /// Percentage of steps completed, rounded to two decimals.
    pub completion_rate: f64,
}

/// Convenience: total per-loan ordering check used by store validation.
pub fn orders_are_contiguous(steps: &[WorkflowStep]) -> bool {
    let mut orders: Vec<u32> = steps.iter().map(|s| s.step_order).collect();
    orders.sort_unstable();
    orders.iter().enumerate().all(|(i, o)| *o == i as u32 + 1)
}
