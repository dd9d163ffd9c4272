//! # Audit Sink
//!
//! The append-only boundary the rest of the stack writes through, plus an
//! in-memory implementation used by tests and single-process deployments.
//!
//! ## Append-Only Contract
//!
//! [`AuditSink`] deliberately exposes a single write operation. There is
//! no update, no delete, and no way to reorder what was written. Sinks
//! backed by real storage must uphold the same contract — the trail is
//! the system of record for regulatory review.

use std::collections::BTreeMap;

use parking_lot::Mutex;
use thiserror::Error;
use uuid::Uuid;

use mlo_core::TenantId;

use crate::entry::{AuditEntryType, ComplianceAuditEntry, EntityKind};

/// Errors from an audit sink.
///
/// A failed append is an operational failure (storage down, serialization
/// refused) — never a business outcome.
#[derive(Error, Debug)]
pub enum AuditError {
    /// The backing store rejected the append.
    #[error("audit append failed: {reason}")]
    AppendFailed {
        /// Why the store rejected the entry.
        reason: String,
    },
}

/// The append-only sink the stack records audit entries through.
///
/// `append` assigns and returns the entry's sequence number, strictly
/// increasing per `(tenant, entity)`.
pub trait AuditSink: Send + Sync {
    fn append(&self, entry: ComplianceAuditEntry) -> Result<u64, AuditError>;
}

// ---------------------------------------------------------------------------
// MemoryAuditSink
// ---------------------------------------------------------------------------

#[derive(Default)]
struct SinkInner {
    entries: Vec<ComplianceAuditEntry>,
    next_sequence: BTreeMap<(TenantId, EntityKind, Uuid), u64>,
}

/// In-memory audit sink.
///
/// Assigns per-entity sequences starting at 1 and keeps entries in append
/// order. All query methods are tenant-scoped; there is no cross-tenant
/// read path.
#[derive(Default)]
pub struct MemoryAuditSink {
    inner: Mutex<SinkInner>,
}

impl MemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All entries for a tenant, in append order.
    pub fn entries_for_tenant(&self, tenant_id: TenantId) -> Vec<ComplianceAuditEntry> {
        self.inner
            .lock()
            .entries
            .iter()
            .filter(|e| e.tenant_id == tenant_id)
            .cloned()
            .collect()
    }

    /// The trail for one entity, in sequence order.
    pub fn entries_for_entity(
        &self,
        tenant_id: TenantId,
        kind: EntityKind,
        id: Uuid,
    ) -> Vec<ComplianceAuditEntry> {
        self.inner
            .lock()
            .entries
            .iter()
            .filter(|e| e.tenant_id == tenant_id && e.entity.kind == kind && e.entity.id == id)
            .cloned()
            .collect()
    }

    /// Entries of one type for a tenant, in append order.
    pub fn entries_by_type(
        &self,
        tenant_id: TenantId,
        entry_type: AuditEntryType,
    ) -> Vec<ComplianceAuditEntry> {
        self.inner
            .lock()
            .entries
            .iter()
            .filter(|e| e.tenant_id == tenant_id && e.entry_type == entry_type)
            .cloned()
            .collect()
    }

    /// Violation entries recorded at or after the cutoff, for dashboards.
    pub fn violations_since(
        &self,
        tenant_id: TenantId,
        cutoff: chrono::DateTime<chrono::Utc>,
    ) -> Vec<ComplianceAuditEntry> {
        self.inner
            .lock()
            .entries
            .iter()
            .filter(|e| {
                e.tenant_id == tenant_id
                    && e.entry_type == AuditEntryType::ComplianceViolation
                    && e.recorded_at >= cutoff
            })
            .cloned()
            .collect()
    }

    /// Total entry count across all tenants.
    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    /// Whether the sink holds no entries.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().entries.is_empty()
    }
}

impl AuditSink for MemoryAuditSink {
    fn append(&self, mut entry: ComplianceAuditEntry) -> Result<u64, AuditError> {
        let mut inner = self.inner.lock();
        let key = (entry.tenant_id, entry.entity.kind, entry.entity.id);
        let seq = inner.next_sequence.entry(key).or_insert(0);
        *seq += 1;
        entry.sequence = *seq;
        let assigned = *seq;
        inner.entries.push(entry);
        Ok(assigned)
    }
}

impl std::fmt::Debug for MemoryAuditSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryAuditSink")
            .field("entries", &self.len())
            .finish()
    }
}
