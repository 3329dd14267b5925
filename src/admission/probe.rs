//! Reachability probes routed through a resource.
//!
//! # Responsibilities
//! - Turn a resource identifier into a proxy URL
//! - Fetch a probe target through that proxy
//! - Decode provider metadata
//!
//! # Design Decisions
//! - Identifiers without a scheme are plain HTTP proxies
//! - A 200 whose body is not a JSON object, or is too large, is a
//!   `Decode` error; callers that only care about reachability may
//!   treat it as reachable
//! - Missing metadata fields are tolerated

use rand::seq::SliceRandom;
use serde::Deserialize;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use url::Url;

use crate::pool::types::Resource;

const PROXY_SCHEMES: &[&str] = &["http", "https", "socks5", "socks5h"];
const MAX_PROBE_BODY_BYTES: usize = 64 * 1024;

/// Why a probe failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProbeError {
    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    #[error("HTTP {0}")]
    Status(u16),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Invalid resource address: {0}")]
    InvalidResource(String),

    #[error("Undecodable probe response: {0}")]
    Decode(String),
}

/// What the probe target reported about the resource's exit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ProbeReport {
    /// Network provider / organization string.
    #[serde(rename = "org")]
    pub organization: Option<String>,
    pub country_name: Option<String>,
    pub country_code: Option<String>,
    pub city: Option<String>,
}

/// A reachability probe.
pub trait Prober: Send + Sync {
    fn probe(&self, resource: &Resource) -> impl Future<Output = Result<ProbeReport, ProbeError>> + Send;
}

/// Build the proxy URL for a resource identifier.
pub fn proxy_url(resource: &Resource) -> Result<Url, ProbeError> {
    let raw = resource.as_str();
    let candidate = if raw.contains("://") {
        raw.to_string()
    } else {
        format!("http://{raw}")
    };

    let url = Url::parse(&candidate)
        .map_err(|e| ProbeError::InvalidResource(format!("{raw}: {e}")))?;
    if !PROXY_SCHEMES.contains(&url.scheme()) {
        return Err(ProbeError::InvalidResource(format!(
            "{raw}: unsupported scheme '{}'",
            url.scheme()
        )));
    }
    if url.host_str().is_none() {
        return Err(ProbeError::InvalidResource(format!("{raw}: missing host")));
    }
    Ok(url)
}

/// Decode a probe target's response body.
fn decode_report(body: &[u8]) -> Result<ProbeReport, ProbeError> {
    if body.len() > MAX_PROBE_BODY_BYTES {
        return Err(ProbeError::Decode(format!(
            "body of {} bytes exceeds {MAX_PROBE_BODY_BYTES}",
            body.len()
        )));
    }
    serde_json::from_slice(body).map_err(|e| ProbeError::Decode(e.to_string()))
}

/// HTTP prober built on `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpProber {
    targets: Vec<String>,
    timeout: Duration,
}

impl HttpProber {
    /// `targets` must not be empty; one is picked at random per probe.
    pub fn new(targets: Vec<String>, timeout: Duration) -> Self {
        Self { targets, timeout }
    }

    pub fn single(target: impl Into<String>, timeout: Duration) -> Self {
        Self::new(vec![target.into()], timeout)
    }

    fn pick_target(&self) -> Option<&str> {
        self.targets
            .choose(&mut rand::thread_rng())
            .map(String::as_str)
    }

    async fn fetch(&self, resource: &Resource) -> Result<ProbeReport, ProbeError> {
        let target = self
            .pick_target()
            .ok_or_else(|| ProbeError::Transport("no probe target configured".to_string()))?;

        let proxy = reqwest::Proxy::all(proxy_url(resource)?.as_str())
            .map_err(|e| ProbeError::InvalidResource(e.to_string()))?;

        let client = reqwest::Client::builder()
            .proxy(proxy)
            .timeout(self.timeout)
            .tcp_nodelay(true)
            .build()
            .map_err(|e| ProbeError::Transport(format!("failed to build probe client: {e}")))?;

        let response = client
            .get(target)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| self.classify_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProbeError::Status(status.as_u16()));
        }

        let body = response.bytes().await.map_err(|e| self.classify_error(e))?;
        decode_report(&body)
    }

    fn classify_error(&self, e: reqwest::Error) -> ProbeError {
        if e.is_timeout() {
            ProbeError::Timeout(self.timeout)
        } else {
            ProbeError::Transport(e.to_string())
        }
    }
}

impl Prober for HttpProber {
    fn probe(&self, resource: &Resource) -> impl Future<Output = Result<ProbeReport, ProbeError>> + Send {
        self.fetch(resource)
    }
}
