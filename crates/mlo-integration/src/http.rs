//! # HTTP Transport
//!
//! The `reqwest`-backed [`Transport`] used against live vendor endpoints.
//! Presents the current credential as a bearer token and applies a
//! per-request timeout so retries never stack on a hung connection.

use std::time::Duration;

use url::Url;

use crate::client::{Credential, HttpMethod, Transport, VendorRequest, VendorResponse};
use crate::error::IntegrationError;

/// A vendor transport over HTTPS.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: reqwest::Client,
    base_url: Url,
}

impl HttpTransport {
    /// Build a transport for a vendor base URL with a request timeout.
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, IntegrationError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| IntegrationError::Transport(e.to_string()))?;
        Ok(Self { http, base_url })
    }

    fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

impl Transport for HttpTransport {
    async fn send(
        &self,
        request: &VendorRequest,
        credential: Option<&Credential>,
    ) -> Result<VendorResponse, IntegrationError> {
        let url = self.endpoint(&request.path);
        let mut builder = match request.method {
            HttpMethod::Get => self.http.get(&url),
            HttpMethod::Post => self.http.post(&url).json(&request.payload),
            HttpMethod::Put => self.http.put(&url).json(&request.payload),
            HttpMethod::Delete => self.http.delete(&url),
        };
        if let Some(credential) = credential {
            builder = builder.bearer_auth(&credential.token);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| IntegrationError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        Ok(VendorResponse { status, body })
    }
}
