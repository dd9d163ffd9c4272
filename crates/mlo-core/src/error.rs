//! # Error Types — Structured Error Hierarchy
//!
//! Core error types shared across the stack. All errors use `thiserror`
//! for derive-based `Display` and `Error` implementations.
//!
//! ## Design
//!
//! - Malformed input is rejected up front with [`ValidationError`] and no
//!   partial mutation.
//! - State machine errors include the current state and the attempted
//!   transition.
//! - A non-compliant loan is **never** an error — compliance findings are
//!   data and live in `mlo-compliance`.

use thiserror::Error;

/// Malformed input to an operation. The specific call is rejected;
/// nothing is mutated.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("missing required field: {field}")]
    MissingField {
        /// Name of the missing field.
        field: String,
    },

    /// A field is present but its value is not acceptable.
    #[error("invalid value for {field}: {reason}")]
    InvalidValue {
        /// Name of the offending field.
        field: String,
        /// Why the value was rejected.
        reason: String,
    },
}

/// Errors from the loan status state machine.
#[derive(Error, Debug)]
pub enum LoanError {
    /// Attempted transition is not in the transition table.
    #[error("invalid loan status transition: {from} -> {to}")]
    InvalidTransition {
        /// Current status.
        from: String,
        /// Attempted target status.
        to: String,
    },

    /// The loan is in a terminal status and accepts no transitions.
    #[error("loan is in terminal status {status}")]
    TerminalStatus {
        /// The terminal status.
        status: String,
    },
}
