//! # mlo-orchestrator — Loan Processing Orchestrator
//!
//! Drives a loan through the full stage sequence — validate → collect
//! documents → credit check → income verification → appraisal →
//! compliance check → underwriting → final approval → closing
//! preparation → closing → funding — as discrete, independently
//! resumable stages.
//!
//! ## Control Policy
//!
//! - A failing **gating** stage (validation, credit check, income
//!   verification, underwriting, final approval) terminates the run,
//!   sets the loan `denied`, and emits an error notification.
//! - A failing **non-gating** stage (document collection, appraisal
//!   ordering, compliance check, closing preparation) emits a warning
//!   and the sequence continues.
//! - A closing failure is terminal but maps to `closed`, not `denied` —
//!   the closing partially completed, funds were not disbursed.
//! - Any activity error is treated as a gating failure.
//!
//! ## Durability & Concurrency
//!
//! The run record carries a stage cursor persisted before each stage, so
//! a crash or cancellation resumes where it left off instead of
//! restarting. Stage execution is strictly sequential within one loan,
//! and [`locks::LoanLocks`] serializes runs per loan id — compliance
//! evaluation and workflow advancement for the same loan never
//! interleave. Cancellation is cooperative, checked between stages.

pub mod activities;
pub mod events;
pub mod locks;
pub mod pipeline;
pub mod stage;
pub mod store;

pub use activities::{Activities, ActivityFailure, ActivityReport};
pub use events::{
    EventPublisher, MemoryEventPublisher, MemoryNotificationSink, NotificationKind,
    NotificationSink, PublishedEvent,
};
pub use locks::LoanLocks;
pub use pipeline::{CancelToken, Orchestrator, OrchestratorError, ProcessingRun};
pub use stage::{ProcessingStage, RunOutcome};
pub use store::{LoanStore, MemoryLoanStore, StoreError, WorkflowEvent};
