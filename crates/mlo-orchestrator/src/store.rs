//! # Loan Store Boundary
//!
//! The persistence interface the orchestrator reads and writes through,
//! plus an in-memory implementation. Real deployments back this with the
//! platform database; the orchestrator never sees connection details.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

use mlo_core::{Loan, LoanId, LoanStatus, TenantId};
use mlo_workflow::WorkflowStep;

use crate::pipeline::ProcessingRun;

/// Errors from the loan store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The backing store failed the operation.
    #[error("store operation failed: {reason}")]
    Backend {
        /// Why the operation failed.
        reason: String,
    },
}

/// A recorded loan status-change event, kept alongside the published
/// stream for in-platform queries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowEvent {
    pub id: Uuid,
    pub tenant_id: TenantId,
    pub loan_id: LoanId,
    pub status: LoanStatus,
    pub metadata: Value,
    pub recorded_at: DateTime<Utc>,
}

/// Tenant-scoped persistence for loans, their workflow steps, workflow
/// events, and processing run records.
pub trait LoanStore: Send + Sync {
    fn load_loan(&self, tenant_id: TenantId, id: LoanId) -> Result<Option<Loan>, StoreError>;
    fn save_loan(&self, loan: &Loan) -> Result<(), StoreError>;
    fn load_steps(&self, tenant_id: TenantId, loan_id: LoanId)
        -> Result<Vec<WorkflowStep>, StoreError>;
    fn save_steps(&self, steps: &[WorkflowStep]) -> Result<(), StoreError>;
    fn append_workflow_event(&self, event: WorkflowEvent) -> Result<(), StoreError>;
    fn save_run(&self, run: &ProcessingRun) -> Result<(), StoreError>;
    fn load_run(
        &self,
        tenant_id: TenantId,
        loan_id: LoanId,
    ) -> Result<Option<ProcessingRun>, StoreError>;
}

// ---------------------------------------------------------------------------
// MemoryLoanStore
// ---------------------------------------------------------------------------

#[derive(Default)]
struct StoreInner {
    loans: HashMap<(TenantId, LoanId), Loan>,
    steps: HashMap<(TenantId, LoanId), Vec<WorkflowStep>>,
    events: Vec<WorkflowEvent>,
    runs: HashMap<(TenantId, LoanId), ProcessingRun>,
}

/// In-memory loan store.
#[derive(Default)]
pub struct MemoryLoanStore {
    inner: Mutex<StoreInner>,
}

impl MemoryLoanStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a loan.
    pub fn insert_loan(&self, loan: Loan) {
        self.inner
            .lock()
            .loans
            .insert((loan.tenant_id, loan.id), loan);
    }

    /// Recorded workflow events for a loan, in append order.
    pub fn events_for_loan(&self, tenant_id: TenantId, loan_id: LoanId) -> Vec<WorkflowEvent> {
        self.inner
            .lock()
            .events
            .iter()
            .filter(|e| e.tenant_id == tenant_id && e.loan_id == loan_id)
            .cloned()
            .collect()
    }
}

impl LoanStore for MemoryLoanStore {
    fn load_loan(&self, tenant_id: TenantId, id: LoanId) -> Result<Option<Loan>, StoreError> {
        Ok(self.inner.lock().loans.get(&(tenant_id, id)).cloned())
    }

    fn save_loan(&self, loan: &Loan) -> Result<(), StoreError> {
        self.inner
            .lock()
            .loans
            .insert((loan.tenant_id, loan.id), loan.clone());
        Ok(())
    }

    fn load_steps(
        &self,
        tenant_id: TenantId,
        loan_id: LoanId,
    ) -> Result<Vec<WorkflowStep>, StoreError> {
        Ok(self
            .inner
            .lock()
            .steps
            .get(&(tenant_id, loan_id))
            .cloned()
            .unwrap_or_default())
    }

    fn save_steps(&self, steps: &[WorkflowStep]) -> Result<(), StoreError> {
        let mut inner = self.inner.lock();
        for step in steps {
            let bucket = inner
                .steps
                .entry((step.tenant_id, step.loan_id))
                .or_default();
            match bucket.iter_mut().find(|s| s.id == step.id) {
                Some(existing) => *existing = step.clone(),
                None => bucket.push(step.clone()),
            }
        }
        Ok(())
    }

    fn append_workflow_event(&self, event: WorkflowEvent) -> Result<(), StoreError> {
        self.inner.lock().events.push(event);
        Ok(())
    }

    fn save_run(&self, run: &ProcessingRun) -> Result<(), StoreError> {
        self.inner
            .lock()
            .runs
            .insert((run.tenant_id, run.loan_id), run.clone());
        Ok(())
    }

    fn load_run(
        &self,
        tenant_id: TenantId,
        loan_id: LoanId,
    ) -> Result<Option<ProcessingRun>, StoreError> {
        Ok(self.inner.lock().runs.get(&(tenant_id, loan_id)).cloned())
    }
}

impl std::fmt::Debug for MemoryLoanStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("MemoryLoanStore")
            .field("loans", &inner.loans.len())
            .field("events", &inner.events.len())
            .finish()
    }
}
