//! # Officer Directory
//!
//! The cross-entity boundary the SAFE Act check resolves loan officers
//! through. Real deployments back this with the personnel store; tests
//! and single-process use get an in-memory map.

use std::collections::BTreeMap;

use parking_lot::Mutex;

use mlo_core::{LoanOfficer, OfficerId, TenantId};

/// Resolves loan officers for licensing checks. Tenant-scoped.
pub trait OfficerDirectory: Send + Sync {
    /// Look up an officer within a tenant. `None` means the officer does
    /// not exist — which the SAFE Act check treats as unlicensed.
    fn find_officer(&self, tenant_id: TenantId, officer_id: OfficerId) -> Option<LoanOfficer>;
}

/// In-memory officer directory.
#[derive(Debug, Default)]
pub struct MemoryOfficerDirectory {
    officers: Mutex<BTreeMap<(TenantId, OfficerId), LoanOfficer>>,
}

impl MemoryOfficerDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an officer under a tenant.
    pub fn insert(&self, tenant_id: TenantId, officer: LoanOfficer) {
        self.officers.lock().insert((tenant_id, officer.id), officer);
    }
}

impl OfficerDirectory for MemoryOfficerDirectory {
    fn find_officer(&self, tenant_id: TenantId, officer_id: OfficerId) -> Option<LoanOfficer> {
        self.officers.lock().get(&(tenant_id, officer_id)).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn officer() -> LoanOfficer {
        LoanOfficer {
            id: OfficerId::new(),
            name: "Dana Reyes".into(),
            nmls_id: Some("1027345".into()),
            license_active: true,
            license_expires: None,
        }
    }

    #[test]
    fn lookup_is_tenant_scoped() {
        let directory = MemoryOfficerDirectory::new();
        let tenant_a = TenantId::new();
        let tenant_b = TenantId::new();
        let o = officer();
        directory.insert(tenant_a, o.clone());

        assert!(directory.find_officer(tenant_a, o.id).is_some());
        assert!(directory.find_officer(tenant_b, o.id).is_none());
    }

    #[test]
    fn missing_officer_is_none() {
        let directory = MemoryOfficerDirectory::new();
        assert!(directory.find_officer(TenantId::new(), OfficerId::new()).is_none());
    }
}
