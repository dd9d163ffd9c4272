//! # mlo-compliance — Compliance Rule Evaluation Engine
//!
//! Evaluates a loan's recorded disclosures, notices, and data against the
//! rule catalog, producing structured violations and an immutable audit
//! trail of every check.
//!
//! ## Determinism
//!
//! Evaluation is a pure function of the loan snapshot, the catalog, the
//! officer directory, and the context clock. Regulations are walked in
//! canonical order and rules in declaration order, so two runs over
//! unchanged data produce value-identical violation lists — a requirement
//! for reproducible audit entries.
//!
//! ## Violations Are Data
//!
//! A non-compliant loan is a normal result, never an error. Typed errors
//! are reserved for genuine operational failures: a malformed date value
//! in the snapshot, or an audit sink refusing an append.
//!
//! ## Audit Contract
//!
//! Per [`ComplianceEngine::run_all`] invocation:
//! - one `compliance_violation` entry per violation found,
//! - one `compliance_remediation` entry per violation found,
//! - exactly one `compliance_check` summary entry — never per violation.

pub mod directory;
pub mod engine;
pub mod violation;

pub use directory::{MemoryOfficerDirectory, OfficerDirectory};
pub use engine::{ComplianceEngine, ComplianceError};
pub use violation::{ComplianceSummary, Violation};
