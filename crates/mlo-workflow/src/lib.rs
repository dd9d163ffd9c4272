//! # mlo-workflow — Loan Processing Workflow Engine
//!
//! Drives a loan through the ten canonical processing steps, each gated
//! by completion criteria and compliance prerequisites.
//!
//! ## Model
//!
//! - The step catalog is a fixed, ordered template
//!   ([`template::standard_steps`]): Application Received → Initial
//!   Document Collection → Credit Check → Income Verification → Property
//!   Appraisal → Underwriting Review → Final Approval → Closing
//!   Preparation → Closing → Funding.
//! - [`WorkflowEngine::initialize`] materializes the template into
//!   concrete steps bound to one loan, order 1..N. Initializing twice is
//!   rejected — double-initialization would corrupt step ordering.
//! - Steps complete either through the status → step mapping
//!   ([`WorkflowEngine::advance_for_status`], idempotent per status) or
//!   explicitly through [`WorkflowEngine::complete_step`], which enforces
//!   completion criteria and fails closed on unknown criterion keys.
//! - Per step, `pending → completed` is terminal. There is no reopening.
//!
//! Overdue detection is query-only: it surfaces counts for dashboards and
//! never mutates state.

pub mod engine;
pub mod step;
pub mod template;

pub use engine::{CriteriaContext, WorkflowEngine, WorkflowError, WorkflowStatistics, WorkflowSummary};
pub use step::{StepName, StepType, WorkflowStep};
pub use template::{standard_steps, steps_for_status, StepTemplate};
