//! Admission validator.
//!
//! # Responsibilities
//! - Probe each candidate resource with a bounded timeout
//! - Classify the reported provider
//! - Accept only reachable, eligible resources
//!
//! # Design Decisions
//! - Probes fan out concurrently; each has its own deadline
//! - Probe failures become rejections with a reason, never errors
//! - Output preserves input order

use futures_util::future::join_all;
use serde::Serialize;
use std::time::{Duration, Instant};
use tokio::time::timeout;

use crate::admission::classify::{Classification, Classifier};
use crate::admission::probe::{HttpProber, ProbeError, Prober};
use crate::config::ValidationConfig;
use crate::observability::metrics;
use crate::pool::groups::DEFAULT_GROUP;
use crate::pool::types::Resource;

/// Outcome of validating one resource.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationResult {
    pub resource: Resource,
    pub accepted: bool,
    pub classification: Classification,
    /// Probe round-trip time, when the probe succeeded.
    pub latency: Option<Duration>,
    pub organization: Option<String>,
    pub country: Option<String>,
    pub country_code: Option<String>,
    pub city: Option<String>,
    pub reasons: Vec<String>,
}

impl ValidationResult {
    fn rejected(resource: Resource, error: ProbeError) -> Self {
        Self {
            resource,
            accepted: false,
            classification: Classification::Unclassified,
            latency: None,
            organization: None,
            country: None,
            country_code: None,
            city: None,
            reasons: vec![error.to_string()],
        }
    }

    /// Group label for admission: the reported country code.
    pub fn group(&self) -> &str {
        self.country_code.as_deref().unwrap_or(DEFAULT_GROUP)
    }
}

/// Validates resources before they are admitted to the pool.
#[derive(Debug)]
pub struct Validator<P> {
    prober: P,
    classifier: Classifier,
    timeout: Duration,
}

impl Validator<HttpProber> {
    /// Validator probing `config.probe_url` over HTTP.
    pub fn from_config(config: &ValidationConfig) -> Self {
        let timeout = Duration::from_secs(config.timeout_secs);
        Self::new(
            HttpProber::single(config.probe_url.clone(), timeout),
            Classifier::new(&config.infrastructure_keywords),
            timeout,
        )
    }
}

impl<P: Prober> Validator<P> {
    pub fn new(prober: P, classifier: Classifier, timeout: Duration) -> Self {
        Self {
            prober,
            classifier,
            timeout,
        }
    }

    pub fn prober(&self) -> &P {
        &self.prober
    }

    /// Probe and classify a single resource.
    pub async fn validate(&self, resource: &Resource) -> ValidationResult {
        let started = Instant::now();
        let probed = match timeout(self.timeout, self.prober.probe(resource)).await {
            Ok(result) => result,
            Err(_) => Err(ProbeError::Timeout(self.timeout)),
        };

        let result = match probed {
            Ok(report) => {
                let classification = self.classifier.classify(report.organization.as_deref());
                let mut reasons = Vec::new();
                if let Classification::Infrastructure { keyword } = &classification {
                    reasons.push(format!("Provider matches infrastructure keyword '{keyword}'"));
                }
                ValidationResult {
                    resource: resource.clone(),
                    accepted: classification.is_eligible(),
                    classification,
                    latency: Some(started.elapsed()),
                    organization: report.organization,
                    country: report.country_name,
                    country_code: report.country_code,
                    city: report.city,
                    reasons,
                }
            }
            Err(e) => ValidationResult::rejected(resource.clone(), e),
        };

        if result.accepted {
            tracing::info!(
                resource = %result.resource,
                country = result.country.as_deref().unwrap_or("-"),
                city = result.city.as_deref().unwrap_or("-"),
                provider = result.organization.as_deref().unwrap_or("-"),
                "Resource accepted"
            );
        } else {
            tracing::warn!(
                resource = %result.resource,
                reasons = %result.reasons.join(", "),
                "Resource rejected"
            );
        }
        metrics::record_validation(result.accepted);
        result
    }

    /// Validate every resource concurrently, returning all results in input order.
    pub async fn validate_report(&self, resources: &[Resource]) -> Vec<ValidationResult> {
        join_all(resources.iter().map(|r| self.validate(r))).await
    }

    /// Validate every resource concurrently, returning the accepted ones in input order.
    pub async fn validate_all(&self, resources: &[Resource]) -> Vec<Resource> {
        self.validate_report(resources)
            .await
            .into_iter()
            .filter(|r| r.accepted)
            .map(|r| r.resource)
            .collect()
    }
}
