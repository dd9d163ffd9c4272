//! # Integration Errors
//!
//! Typed failures from vendor calls. Surfaced to the calling
//! orchestration stage as a failed-activity result — never silently
//! swallowed, never retried above the client's own policy.

use thiserror::Error;

/// Errors from a vendor integration call.
#[derive(Error, Debug)]
pub enum IntegrationError {
    /// The vendor rejected our credentials. The client rotates to the
    /// next credential before the following attempt.
    #[error("vendor rejected credentials (status {status})")]
    Unauthorized {
        /// The HTTP status returned.
        status: u16,
    },

    /// The vendor returned a non-success status.
    #[error("vendor returned status {status}: {body}")]
    Api {
        /// The HTTP status returned.
        status: u16,
        /// The response body, for diagnosis.
        body: String,
    },

    /// The request never produced a response (connect failure, timeout).
    #[error("transport error: {0}")]
    Transport(String),

    /// All attempts were used without success. Carries the final
    /// attempt's error for status/body context.
    #[error("vendor request failed after {attempts} attempts: {last}")]
    Exhausted {
        /// How many attempts were made.
        attempts: u32,
        /// The last attempt's error.
        #[source]
        last: Box<IntegrationError>,
    },
}
