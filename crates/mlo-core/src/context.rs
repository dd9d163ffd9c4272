//! # Operation Context
//!
//! Explicit per-call context threaded through every side-effecting
//! operation: tenant scope, acting principal, and the clock value the
//! operation should treat as "now".
//!
//! ## Why explicit
//!
//! The stack must be safely callable concurrently for different tenants,
//! and evaluation must be reproducible. Ambient "current tenant" /
//! "current user" / wall-clock reads would break both, so all three are
//! parameters. Timing checks evaluated with a fixed `now` are fully
//! deterministic.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::identity::{ActorId, TenantId};

/// The context for one operation against one tenant's data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpContext {
    /// The tenant whose data this operation touches.
    pub tenant_id: TenantId,
    /// The acting principal, or `None` for system-driven operations
    /// (workflow automation, scheduled checks).
    pub actor: Option<ActorId>,
    /// The instant the operation treats as now.
    pub now: DateTime<Utc>,
}

impl OpContext {
    /// Context for a system-driven operation (no human actor).
    pub fn system(tenant_id: TenantId, now: DateTime<Utc>) -> Self {
        Self {
            tenant_id,
            actor: None,
            now,
        }
    }

    /// Context for an operation performed by a known principal.
    pub fn acting(tenant_id: TenantId, actor: ActorId, now: DateTime<Utc>) -> Self {
        Self {
            tenant_id,
            actor: Some(actor),
            now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_context_has_no_actor() {
        let ctx = OpContext::system(TenantId::new(), Utc::now());
        assert!(ctx.actor.is_none());
    }

    #[test]
    fn acting_context_carries_actor() {
        let actor = ActorId::new();
        let ctx = OpContext::acting(TenantId::new(), actor, Utc::now());
        assert_eq!(ctx.actor, Some(actor));
    }
}
