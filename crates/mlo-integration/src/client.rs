//! # Vendor Client
//!
//! The generic request loop: attempt, classify, rotate credentials on
//! 401, back off exponentially, and surface a typed error once attempts
//! are exhausted. The transport is a trait so vendor activities test
//! against scripted responses without a network.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::IntegrationError;

// ---------------------------------------------------------------------------
// Credentials
// ---------------------------------------------------------------------------

/// One API credential for a vendor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    /// Label for logs ("primary", "fallback-2").
    pub name: String,
    /// Bearer token or API key.
    pub token: String,
}

/// A round-robin credential set.
///
/// [`rotate`](Self::rotate) advances to the next credential; the client
/// calls it when a vendor answers 401, so the next attempt presents
/// different credentials. A store of one credential never rotates.
#[derive(Debug, Default)]
pub struct CredentialStore {
    credentials: Vec<Credential>,
    index: AtomicUsize,
}

impl CredentialStore {
    pub fn new(credentials: Vec<Credential>) -> Self {
        Self {
            credentials,
            index: AtomicUsize::new(0),
        }
    }

    /// The credential the next request should present, if any are
    /// configured.
    pub fn current(&self) -> Option<Credential> {
        if self.credentials.is_empty() {
            return None;
        }
        let i = self.index.load(Ordering::Relaxed) % self.credentials.len();
        Some(self.credentials[i].clone())
    }

    /// Advance to the next credential. No-op for a set of one.
    pub fn rotate(&self) {
        if self.credentials.len() <= 1 {
            return;
        }
        self.index.fetch_add(1, Ordering::Relaxed);
    }

    pub fn len(&self) -> usize {
        self.credentials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.credentials.is_empty()
    }
}

// ---------------------------------------------------------------------------
// RetryPolicy
// ---------------------------------------------------------------------------

/// Retry schedule: `max_attempts` total tries, delays doubling from
/// `base_delay`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    /// The delay before retry number `retry` (zero-based):
    /// `base_delay * 2^retry`.
    pub fn delay(&self, retry: u32) -> Duration {
        self.base_delay * 2u32.saturating_pow(retry)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

// ---------------------------------------------------------------------------
// Request / response shapes
// ---------------------------------------------------------------------------

/// HTTP method for a vendor request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

/// An outbound vendor request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VendorRequest {
    pub method: HttpMethod,
    /// Path relative to the vendor's base URL (e.g. "credit-check").
    pub path: String,
    /// JSON payload; ignored for GET.
    pub payload: Value,
}

impl VendorRequest {
    pub fn post(path: impl Into<String>, payload: Value) -> Self {
        Self {
            method: HttpMethod::Post,
            path: path.into(),
            payload,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Get,
            path: path.into(),
            payload: Value::Null,
        }
    }
}

/// A raw vendor response, before classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VendorResponse {
    pub status: u16,
    pub body: String,
}

/// The normalized shape the orchestrator consumes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VendorOutcome {
    pub success: bool,
    /// Parsed response body on success.
    pub data: Option<Value>,
    /// Human-readable failure context on failure.
    pub error: Option<String>,
}

// ---------------------------------------------------------------------------
// Transport
// ---------------------------------------------------------------------------

/// One network send. Implementations perform no retries — the client
/// owns the retry loop.
pub trait Transport: Send + Sync {
    fn send(
        &self,
        request: &VendorRequest,
        credential: Option<&Credential>,
    ) -> impl std::future::Future<Output = Result<VendorResponse, IntegrationError>> + Send;
}

// ---------------------------------------------------------------------------
// VendorClient
// ---------------------------------------------------------------------------

/// The retrying vendor client.
pub struct VendorClient<T: Transport> {
    transport: T,
    policy: RetryPolicy,
    credentials: CredentialStore,
}

impl<T: Transport> VendorClient<T> {
    pub fn new(transport: T, policy: RetryPolicy, credentials: CredentialStore) -> Self {
        Self {
            transport,
            policy,
            credentials,
        }
    }

    /// Issue a request under the retry policy.
    ///
    /// - 2xx: returns the parsed JSON body (`Null` if the body is not
    ///   JSON).
    /// - 401: rotates credentials, then retries.
    /// - Other statuses and transport failures: retries.
    /// - Out of attempts: [`IntegrationError::Exhausted`] wrapping the
    ///   final error.
    pub async fn request(&self, request: &VendorRequest) -> Result<Value, IntegrationError> {
        let mut attempt: u32 = 0;
        loop {
            let credential = self.credentials.current();
            let outcome = self.transport.send(request, credential.as_ref()).await;

            let err = match outcome {
                Ok(resp) if resp.status == 401 => {
                    self.credentials.rotate();
                    IntegrationError::Unauthorized { status: resp.status }
                }
                Ok(resp) if (200..300).contains(&resp.status) => {
                    let data = serde_json::from_str(&resp.body).unwrap_or(Value::Null);
                    return Ok(data);
                }
                Ok(resp) => IntegrationError::Api {
                    status: resp.status,
                    body: resp.body,
                },
                Err(e) => e,
            };

            attempt += 1;
            if attempt >= self.policy.max_attempts {
                return Err(IntegrationError::Exhausted {
                    attempts: attempt,
                    last: Box::new(err),
                });
            }

            let delay = self.policy.delay(attempt - 1);
            tracing::warn!(
                attempt,
                max_attempts = self.policy.max_attempts,
                delay_ms = delay.as_millis() as u64,
                error = %err,
                "vendor request failed — backing off before retry"
            );
            tokio::time::sleep(delay).await;
        }
    }

    /// Issue a request and normalize the result for the orchestrator.
    /// Never returns an error — failure becomes `success: false` with
    /// context.
    pub async fn call(&self, request: &VendorRequest) -> VendorOutcome {
        match self.request(request).await {
            Ok(data) => VendorOutcome {
                success: true,
                data: Some(data),
                error: None,
            },
            Err(e) => VendorOutcome {
                success: false,
                data: None,
                error: Some(e.to_string()),
            },
        }
    }
}

impl<T: Transport> std::fmt::Debug for VendorClient<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VendorClient")
            .field("policy", &self.policy)
            .field("credentials", &self.credentials.len())
            .finish()
    }
}
