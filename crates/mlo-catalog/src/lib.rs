//! # mlo-catalog — Regulatory Rule Catalog
//!
//! The registry of regulations → rules → remediation actions the
//! compliance engine evaluates against. Reference data: loaded once at
//! process start, immutable afterwards.
//!
//! ## Sources
//!
//! - [`RuleCatalog::standard()`] — the built-in seven-regulation battery
//!   (TRID, ECOA, RESPA, GLBA, FCRA, AML/BSA, SAFE Act). Constructed in
//!   code, so it cannot fail to load.
//! - [`RuleCatalog::load_from_path()`] / [`RuleCatalog::from_json_str()`]
//!   — an external static document. Loading **fails soft**: a missing or
//!   unparseable source yields an empty catalog and a warning, never an
//!   error. Compliance checking must never crash loan processing; an
//!   empty catalog is distinguishable from a compliant loan through the
//!   summary's evaluated-rule count.
//!
//! ## Determinism
//!
//! Regulations are held in canonical code order and rules in declaration
//! order. Evaluation walks them in that order, so repeated runs over
//! unchanged data produce identical violation lists.

pub mod catalog;
pub mod rule;

pub use catalog::RuleCatalog;
pub use rule::{CheckKind, Regulation, Rule};
