//! Shared HTTP client for the Athenaeum services.
//!
//! Provides a minimal client with optional Bearer auth, generic
//! GET/POST/PATCH/DELETE helpers that unwrap the `{status, data}` response
//! envelope, and domain methods for the catalog, storage and analytics
//! endpoints. Non-2xx responses surface as [`StatusError`] inside the
//! returned `anyhow::Error`, so callers can downcast to tell a 404 apart.

pub mod api;

use std::fmt;
use std::time::Duration;

use anyhow::{Context, Result};
use athenaeum_core::models::PageInfo;
use athenaeum_core::ClientConfig;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;

/// Authentication strategy for the API.
#[derive(Clone)]
pub enum Auth {
    /// `Authorization: Bearer {token}`
    Bearer(String),
    /// No credentials (e.g. a public storage endpoint)
    Anonymous,
}

impl fmt::Debug for Auth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Auth::Bearer(_) => f.write_str("Bearer(***)"),
            Auth::Anonymous => f.write_str("Anonymous"),
        }
    }
}

/// Non-2xx response from the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusError {
    pub status: u16,
    pub body: String,
}

impl fmt::Display for StatusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "API request failed with status {}: {}",
            self.status, self.body
        )
    }
}

impl std::error::Error for StatusError {}

/// HTTP status carried by an error chain, if the failure was a response.
pub fn status_of(err: &anyhow::Error) -> Option<u16> {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<StatusError>())
        .map(|e| e.status)
}

/// Standard response envelope: `{status, message?, data, pagination?}`.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
    pub data: Option<T>,
    #[serde(default)]
    pub pagination: Option<PageInfo>,
}

impl<T> Envelope<T> {
    pub fn is_success(&self) -> bool {
        self.status.eq_ignore_ascii_case("success") || self.status.eq_ignore_ascii_case("ok")
    }

    /// Unwrap the payload, failing when the envelope reports an error or has no data.
    pub fn into_data(self) -> Result<(T, Option<PageInfo>)> {
        if !self.is_success() {
            return Err(anyhow::anyhow!(
                "API reported status '{}': {}",
                self.status,
                self.message.unwrap_or_else(|| "no message".to_string())
            ));
        }
        let data = self
            .data
            .ok_or_else(|| anyhow::anyhow!("API response is missing the data field"))?;
        Ok((data, self.pagination))
    }
}

/// HTTP client for the Athenaeum API with configurable auth.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    auth: Auth,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, auth: Auth, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            auth,
        })
    }

    /// Client for the catalog and analytics endpoints. Requires a token.
    pub fn catalog_from_config(config: &ClientConfig) -> Result<Self> {
        let token = config.require_token()?;
        Self::new(
            config.api_url.clone(),
            Auth::Bearer(token.to_string()),
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    /// Client for the object-storage service. Sends the token when one is configured.
    pub fn storage_from_config(config: &ClientConfig) -> Result<Self> {
        let auth = match &config.api_token {
            Some(token) => Auth::Bearer(token.clone()),
            None => Auth::Anonymous,
        };
        Self::new(
            config.storage_url.clone(),
            auth,
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn apply_auth(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.auth {
            Auth::Bearer(token) => request.header("Authorization", format!("Bearer {}", token)),
            Auth::Anonymous => request,
        }
    }

    /// Send the request and turn any non-2xx status into a [`StatusError`].
    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = self
            .apply_auth(request)
            .send()
            .await
            .context("Failed to send request")?;

        let status = response.status();
        tracing::debug!(
            url = %response.url(),
            status = status.as_u16(),
            "API response received"
        );
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(StatusError {
                status: status.as_u16(),
                body,
            }
            .into());
        }

        Ok(response)
    }

    async fn read_envelope<T: DeserializeOwned>(response: Response) -> Result<Envelope<T>> {
        response
            .json()
            .await
            .context("Failed to parse response as JSON")
    }

    /// GET request with optional query parameters. Returns the envelope payload.
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<(T, Option<PageInfo>)> {
        let mut request = self.client.get(self.build_url(path));
        if !query.is_empty() {
            request = request.query(query);
        }
        let response = self.send(request).await?;
        Self::read_envelope(response).await?.into_data()
    }

    /// POST JSON body and return the envelope payload.
    pub async fn post_json<T: DeserializeOwned, B: serde::Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let request = self.client.post(self.build_url(path)).json(body);
        let response = self.send(request).await?;
        Ok(Self::read_envelope(response).await?.into_data()?.0)
    }

    /// PATCH with an optional JSON body and return the envelope payload.
    pub async fn patch_json<T: DeserializeOwned, B: serde::Serialize + ?Sized>(
        &self,
        path: &str,
        body: Option<&B>,
    ) -> Result<T> {
        let mut request = self.client.patch(self.build_url(path));
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = self.send(request).await?;
        Ok(Self::read_envelope(response).await?.into_data()?.0)
    }

    /// POST multipart form and return the envelope payload.
    pub async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: reqwest::multipart::Form,
    ) -> Result<T> {
        let request = self.client.post(self.build_url(path)).multipart(form);
        let response = self.send(request).await?;
        Ok(Self::read_envelope(response).await?.into_data()?.0)
    }

    /// POST with no body, ignoring whatever the server answers with.
    pub async fn post_empty(&self, path: &str) -> Result<()> {
        let request = self.client.post(self.build_url(path));
        self.send(request).await?;
        Ok(())
    }

    /// DELETE request. Returns Ok(()) on success.
    pub async fn delete(&self, path: &str) -> Result<()> {
        let request = self.client.delete(self.build_url(path));
        self.send(request).await?;
        Ok(())
    }
}

pub use api::{ResourceData, TrackKind};
