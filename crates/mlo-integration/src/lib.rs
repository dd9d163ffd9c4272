//! # mlo-integration — Vendor Integration Client Base
//!
//! The reusable outbound-call contract vendor integrations (credit
//! bureaus, appraisal management, document signing) are built on:
//!
//! - up to 3 attempts per request, exponential backoff starting at the
//!   configured base delay and doubling each retry;
//! - a 401 response rotates to the next configured credential
//!   (round-robin) before the next attempt;
//! - after exhausting attempts, a typed [`IntegrationError`] carrying
//!   status/body context — never a silent hang. Callers bound total
//!   latency through the policy and the transport's request timeout.
//!
//! The orchestrator consumes the normalized [`VendorOutcome`] shape and
//! treats exhaustion as a failed activity, per its gating policy.
//!
//! [`providers`] carries the static registry of known vendors and the
//! regulations that govern each.

pub mod client;
pub mod error;
pub mod http;
pub mod providers;

pub use client::{
    Credential, CredentialStore, HttpMethod, RetryPolicy, Transport, VendorClient, VendorOutcome,
    VendorRequest, VendorResponse,
};
pub use error::IntegrationError;
pub use http::HttpTransport;
pub use providers::{available_providers, provider_config, providers_by_type, ProviderConfig, ProviderType};
