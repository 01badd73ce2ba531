//! HTTP client for the zones API.
//!
//! This module provides the production [`ZoneBackend`]:
//! - One pooled `reqwest` client with a per-request timeout
//! - Bearer authentication on every call
//! - Retry with exponential backoff for idempotent calls on transport
//!   errors, 429 and 5xx
//! - Server `detail` messages surfaced in errors

use std::time::Duration;

use log::{debug, info, warn};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::backend::{ScanUpload, ZoneBackend};
use crate::wire::{ErrorBody, MapZone, PaddingUpdate, ScanJob, ScanResult, UserProfile, WireZone};
use crate::{EditorConfig, Result, ZoneError};

// Base backoff; doubled per retry
const BACKOFF_BASE_MS: u64 = 500;
const BACKOFF_MAX_SHIFT: u32 = 4;

/// Zones API client.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    api_base: String,
    auth_header: Option<String>,
    max_retries: u32,
}

impl HttpBackend {
    /// Create a client for `config.api_base`.
    ///
    /// A missing token is accepted here; every request then fails with
    /// [`ZoneError::Unauthenticated`] so the caller can route to sign-in.
    pub fn new(config: &EditorConfig, token: Option<String>) -> Result<Self> {
        config.validate()?;
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| ZoneError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            auth_header: token
                .filter(|t| !t.trim().is_empty())
                .map(|t| format!("Bearer {}", t.trim())),
            max_retries: config.max_retries,
        })
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    pub fn is_authenticated(&self) -> bool {
        self.auth_header.is_some()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_base, path)
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        let auth = self.auth_header.as_deref().ok_or(ZoneError::Unauthenticated)?;
        Ok(self
            .client
            .request(method, self.url(path))
            .header("Authorization", auth))
    }

    /// Send an idempotent request, retrying transient failures.
    async fn send_with_retry<F>(&self, label: &str, build: F) -> Result<Response>
    where
        F: Fn() -> Result<RequestBuilder>,
    {
        let mut retries = 0;

        loop {
            let outcome = match build()?.send().await {
                Ok(resp) => check_status(resp).await,
                Err(e) => Err(ZoneError::http(
                    e.status().map(|s| s.as_u16()),
                    format!("Request error: {}", e),
                )),
            };

            match outcome {
                Ok(resp) => return Ok(resp),
                Err(e) if e.is_retryable() && retries < self.max_retries => {
                    retries += 1;
                    let backoff = backoff(retries);
                    warn!(
                        "[HttpBackend] {} failed: {}, retry {} after {:?}",
                        label, e, retries, backoff
                    );
                    tokio::time::sleep(backoff).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let resp = self
            .send_with_retry(path, || self.request(Method::GET, path))
            .await?;
        parse_json(resp).await
    }

    async fn put_json<P, T>(&self, path: &str, body: &P) -> Result<T>
    where
        P: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let resp = self
            .send_with_retry(path, || Ok(self.request(Method::PUT, path)?.json(body)))
            .await?;
        parse_json(resp).await
    }
}

fn backoff(retry: u32) -> Duration {
    // 1s, 2s, 4s, 8s...
    Duration::from_millis(BACKOFF_BASE_MS * (1 << retry.min(BACKOFF_MAX_SHIFT)))
}

/// Turn a non-2xx response into an error carrying the server's `detail`.
async fn check_status(resp: Response) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    if status == StatusCode::UNAUTHORIZED {
        return Err(ZoneError::Unauthenticated);
    }

    let text = resp.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&text)
        .map(|body| body.message())
        .unwrap_or_else(|_| {
            status
                .canonical_reason()
                .unwrap_or("Request failed")
                .to_string()
        });
    Err(ZoneError::http(Some(status.as_u16()), message))
}

async fn parse_json<T: DeserializeOwned>(resp: Response) -> Result<T> {
    let bytes = resp
        .bytes()
        .await
        .map_err(|e| ZoneError::http(None, format!("Failed to read response: {}", e)))?;
    serde_json::from_slice(&bytes)
        .map_err(|e| ZoneError::MalformedResponse(format!("Parse error: {}", e)))
}

#[async_trait::async_trait]
impl ZoneBackend for HttpBackend {
    async fn fetch_profile(&self) -> Result<UserProfile> {
        self.get_json("/api/users/me").await
    }

    async fn fetch_zones(&self) -> Result<Vec<MapZone>> {
        let zones: Vec<MapZone> = self.get_json("/api/zones/map").await?;
        debug!("[HttpBackend] Fetched {} zones", zones.len());
        Ok(zones)
    }

    async fn replace_zones(&self, campus_id: &str, zones: &[WireZone]) -> Result<()> {
        let path = format!("/api/zones/bulk/{}", campus_id);
        let _: serde_json::Value = self.put_json(&path, zones).await?;
        info!(
            "[HttpBackend] Replaced zones of campus {} with {}",
            campus_id,
            zones.len()
        );
        Ok(())
    }

    async fn update_padding(&self, meters: u32) -> Result<u32> {
        let echo: PaddingUpdate = self
            .put_json(
                "/api/campuses/boundary-padding",
                &PaddingUpdate {
                    boundary_padding: meters,
                },
            )
            .await?;
        Ok(echo.boundary_padding)
    }

    /// Uploads are not retried: a repeated POST would queue a second scan.
    async fn submit_scan(&self, upload: ScanUpload) -> Result<ScanJob> {
        let part = Part::bytes(upload.bytes).file_name(upload.file_name.clone());
        let form = Form::new()
            .part("file", part)
            .text("latitude", upload.latitude.to_string())
            .text("longitude", upload.longitude.to_string());

        let resp = self
            .request(Method::POST, "/api/scans")?
            .multipart(form)
            .send()
            .await
            .map_err(|e| ZoneError::http(None, format!("Upload of {} failed: {}", upload.file_name, e)))?;
        parse_json(check_status(resp).await?).await
    }

    async fn fetch_scan_results(&self) -> Result<Vec<ScanResult>> {
        self.get_json("/api/scans/results").await
    }
}
