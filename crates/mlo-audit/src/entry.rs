//! # Audit Entry Types
//!
//! The typed vocabulary of the audit trail and the entry record itself.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use mlo_core::{ActorId, LoanId, StepId, TenantId};

// ---------------------------------------------------------------------------
// AuditEntryType
// ---------------------------------------------------------------------------

/// The category of audit trail event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditEntryType {
    /// A full compliance check run completed.
    ComplianceCheck,
    /// A violation was detected during evaluation.
    ComplianceViolation,
    /// A remediation action was recorded for a violation.
    ComplianceRemediation,
    /// A loan's workflow was initialized from the template.
    WorkflowInitialized,
    /// A workflow step was completed.
    WorkflowStepCompleted,
    /// A workflow step was assigned.
    WorkflowStepAssigned,
    /// A loan status transition was accepted.
    LoanStatusChanged,
    /// A vendor integration sync completed.
    IntegrationSync,
}

impl AuditEntryType {
    /// Return the string value for serialization.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ComplianceCheck => "compliance_check",
            Self::ComplianceViolation => "compliance_violation",
            Self::ComplianceRemediation => "compliance_remediation",
            Self::WorkflowInitialized => "workflow_initialized",
            Self::WorkflowStepCompleted => "workflow_step_completed",
            Self::WorkflowStepAssigned => "workflow_step_assigned",
            Self::LoanStatusChanged => "loan_status_changed",
            Self::IntegrationSync => "integration_sync",
        }
    }
}

impl std::fmt::Display for AuditEntryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// AuditAction
// ---------------------------------------------------------------------------

/// The specific action recorded within an entry type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    ViolationDetected,
    ComplianceCheckCompleted,
    RemediationTriggered,
    WorkflowInitialized,
    StepCompleted,
    StepAssigned,
    StatusChanged,
    SyncCompleted,
}

impl AuditAction {
    /// Return the string value for serialization.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ViolationDetected => "violation_detected",
            Self::ComplianceCheckCompleted => "compliance_check_completed",
            Self::RemediationTriggered => "remediation_triggered",
            Self::WorkflowInitialized => "workflow_initialized",
            Self::StepCompleted => "step_completed",
            Self::StepAssigned => "step_assigned",
            Self::StatusChanged => "status_changed",
            Self::SyncCompleted => "sync_completed",
        }
    }
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// EntityRef
// ---------------------------------------------------------------------------

/// The kind of entity an audit entry is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Loan,
    WorkflowStep,
    Integration,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Loan => "loan",
            Self::WorkflowStep => "workflow_step",
            Self::Integration => "integration",
        };
        f.write_str(s)
    }
}

/// A typed reference to the audited entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityRef {
    pub kind: EntityKind,
    pub id: Uuid,
}

impl EntityRef {
    pub fn loan(id: LoanId) -> Self {
        Self {
            kind: EntityKind::Loan,
            id: *id.as_uuid(),
        }
    }

    pub fn step(id: StepId) -> Self {
        Self {
            kind: EntityKind::WorkflowStep,
            id: *id.as_uuid(),
        }
    }

    pub fn integration(id: Uuid) -> Self {
        Self {
            kind: EntityKind::Integration,
            id,
        }
    }
}

// ---------------------------------------------------------------------------
// ComplianceAuditEntry
// ---------------------------------------------------------------------------

/// One immutable entry in the audit trail.
///
/// `sequence` is assigned by the sink at append time — zero until then —
/// and is strictly increasing per `(tenant, entity)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplianceAuditEntry {
    pub id: Uuid,
    pub tenant_id: TenantId,
    /// Sink-assigned position in the entity's trail.
    pub sequence: u64,
    pub entry_type: AuditEntryType,
    pub entity: EntityRef,
    pub action: AuditAction,
    /// Entity state before the action, where meaningful.
    pub old_values: Option<serde_json::Value>,
    /// Entity state after the action, where meaningful.
    pub new_values: Option<serde_json::Value>,
    /// Structured context payload (violation details, counts, …).
    pub metadata: Option<serde_json::Value>,
    /// The acting principal, or `None` for system-driven actions.
    pub actor: Option<ActorId>,
    pub recorded_at: DateTime<Utc>,
}

impl ComplianceAuditEntry {
    /// Create an entry ready for appending. The sink assigns `sequence`.
    pub fn new(
        tenant_id: TenantId,
        entry_type: AuditEntryType,
        entity: EntityRef,
        action: AuditAction,
        actor: Option<ActorId>,
        recorded_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            tenant_id,
            sequence: 0,
            entry_type,
            entity,
            action,
            old_values: None,
            new_values: None,
            metadata: None,
            actor,
            recorded_at,
        }
    }

    /// Builder: attach the before-state.
    pub fn with_old_values(mut self, values: serde_json::Value) -> Self {
        self.old_values = Some(values);
        self
    }

    /// Builder: attach the after-state.
    pub fn with_new_values(mut self, values: serde_json::Value) -> Self {
        self.new_values = Some(values);
        self
    }

    /// Builder: attach the metadata payload.
    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = Some(metadata);
        self
    }
}
