//! # mlo-core — Foundational Types for the MLO Stack
//!
//! This crate is the bedrock of the mortgage loan-origination stack. It
//! defines the type-system primitives every other crate builds on. Every
//! other crate in the workspace depends on `mlo-core`; it depends on
//! nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for domain primitives.** `TenantId`, `LoanId`,
//!    `StepId`, `OfficerId`, `ActorId`, `BorrowerId` — all UUID-backed
//!    newtypes. No bare strings or raw UUIDs for identifiers.
//!
//! 2. **Closed enums for regulatory vocabulary.** One `RegulationCode`
//!    definition, one `Severity` ladder, one `ViolationKind` taxonomy.
//!    Adding a regulation forces every consumer to handle it — no
//!    reflection-style string dispatch.
//!
//! 3. **Explicit operation context.** Every side-effecting operation takes
//!    an [`OpContext`] carrying tenant, actor, and clock. There is no
//!    ambient "current tenant" or "current user" anywhere in the stack,
//!    so the same code is safely callable concurrently for different
//!    tenants.
//!
//! 4. **Status transitions are validated.** [`Loan::update_status`] rejects
//!    edges outside the transition table and records every accepted change
//!    in the loan's status history.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `mlo-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.
//! - All public types derive `Debug`, `Clone`, and implement
//!   `Serialize`/`Deserialize`.

pub mod compliance_data;
pub mod context;
pub mod domain;
pub mod error;
pub mod identity;
pub mod loan;
pub mod temporal;

pub use compliance_data::ComplianceData;
pub use context::OpContext;
pub use domain::{RegulationCode, Severity, ViolationKind, REGULATION_COUNT};
pub use error::{LoanError, ValidationError};
pub use identity::{ActorId, BorrowerId, LoanId, OfficerId, StepId, TenantId};
pub use loan::{Loan, LoanOfficer, LoanStatus, StatusChangeRecord};
pub use temporal::{business_days_between, is_business_day};
