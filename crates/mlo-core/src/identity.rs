//! # Identity Newtypes
//!
//! Domain-primitive newtypes for identifiers throughout the MLO Stack.
//! Each identifier is a distinct type — you cannot pass a [`LoanId`] where
//! a [`StepId`] is expected, and tenant scoping is visible in every
//! signature that carries a [`TenantId`].
//!
//! All identifiers are UUID-backed and therefore always valid by
//! construction.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! uuid_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(Uuid);

        impl $name {
            /// Create a new random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Create an identifier from an existing UUID.
            pub fn from_uuid(id: Uuid) -> Self {
                Self(id)
            }

            /// Access the underlying UUID.
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

uuid_id! {
    /// A unique identifier for a tenant (lender organization). Every read
    /// and write in the stack is scoped by tenant — there is no ambient
    /// tenant state.
    TenantId
}

uuid_id! {
    /// A unique identifier for a loan.
    LoanId
}

uuid_id! {
    /// A unique identifier for a workflow step row.
    StepId
}

uuid_id! {
    /// A unique identifier for a loan officer.
    OfficerId
}

uuid_id! {
    /// A unique identifier for a borrower.
    BorrowerId
}

uuid_id! {
    /// The actor (user or system principal) performing an operation.
    /// Recorded on audit entries and step completions.
    ActorId
}
