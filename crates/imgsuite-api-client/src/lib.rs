//! HTTP client for the image-processing backend.
//!
//! Provides [`ApiClient`] with one method per backend operation, pure URL builders
//! for the image variants, the [`ImageApi`] trait the session runner is written
//! against, and a cancellable [`StatusPoller`]. The CLI uses this client directly.

pub mod api;
pub mod endpoints;
pub mod error;
pub mod poll;
pub mod session;

use anyhow::{Context, Result};
use imgsuite_core::ClientConfig;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;

pub use api::ImageApi;
pub use endpoints::Endpoints;
pub use error::{ApiError, Failure};
pub use poll::StatusPoller;
pub use session::Session;

// Re-export domain types for convenience.
pub use imgsuite_core::models::{
    EditOperation, ImageMeta, ImagePage, ImageStatus, ImageUpload, OutputFormat, Variant,
};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// HTTP client for the image backend.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    endpoints: Endpoints,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self> {
        let endpoints = Endpoints::new(base_url);
        if endpoints.base_url().is_empty() {
            return Err(anyhow::anyhow!(
                "An absolute API base URL is required to send requests"
            ));
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client, endpoints })
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        Self::with_timeout(&config.api_base, config.timeout())
    }

    /// Create client from environment: IMGSUITE_API_BASE (or API_BASE), IMGSUITE_TIMEOUT_SECS.
    pub fn from_env() -> Result<Self> {
        let config = ClientConfig::from_env().context("Failed to load client configuration")?;
        Self::from_config(&config)
    }

    pub fn base_url(&self) -> &str {
        self.endpoints.base_url()
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// Raw client for custom requests.
    pub fn client(&self) -> &Client {
        &self.client
    }
}

/// Send a prepared request. Transport errors map to [`Failure::Transport`].
async fn send(request: reqwest::RequestBuilder) -> Result<Response, Failure> {
    request.send().await.map_err(Failure::Transport)
}

/// Turn a non-success response into [`Failure::Http`] carrying the body text.
async fn ensure_success(response: Response) -> Result<Response, Failure> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    Err(http_failure(response).await)
}

async fn http_failure(response: Response) -> Failure {
    let status = response.status();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    Failure::Http { status, body }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, Failure> {
    response.json().await.map_err(Failure::Decode)
}
