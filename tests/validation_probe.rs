//! Admission validation through real sockets.

mod common;

use std::time::Duration;

use egress_pool::admission::{Classification, Classifier, HttpProber, Prober, Validator};
use egress_pool::config::ValidationConfig;
use egress_pool::lifecycle::bootstrap;
use egress_pool::Resource;

use common::{
    config_for, refused_address, start_hung_proxy, start_mock_proxy, DATACENTER, PROBE_TARGET,
    RESIDENTIAL,
};

fn validator(timeout: Duration) -> Validator<HttpProber> {
    Validator::new(
        HttpProber::single(PROBE_TARGET, timeout),
        Classifier::new(ValidationConfig::default().infrastructure_keywords),
        timeout,
    )
}

#[tokio::test]
async fn test_probe_through_proxy_reads_metadata() {
    let proxy = start_mock_proxy(200, RESIDENTIAL).await;
    let prober = HttpProber::single(PROBE_TARGET, Duration::from_secs(2));

    let report = prober.probe(&Resource::new(proxy.address())).await.unwrap();

    assert_eq!(report.organization.as_deref(), Some("Comcast Cable Communications"));
    assert_eq!(report.country_code.as_deref(), Some("US"));
    assert_eq!(report.city.as_deref(), Some("Denver"));
    assert_eq!(proxy.requests(), 1);
}

#[tokio::test]
async fn test_residential_exit_is_accepted() {
    let proxy = start_mock_proxy(200, RESIDENTIAL).await;
    let result = validator(Duration::from_secs(2))
        .validate(&Resource::new(proxy.address()))
        .await;

    assert!(result.accepted, "reasons: {:?}", result.reasons);
    assert_eq!(result.classification, Classification::Eligible);
    assert_eq!(result.country.as_deref(), Some("United States"));
    assert_eq!(result.group(), "US");
    assert!(result.latency.is_some());
}

#[tokio::test]
async fn test_datacenter_exit_is_rejected() {
    let proxy = start_mock_proxy(200, DATACENTER).await;
    let result = validator(Duration::from_secs(2))
        .validate(&Resource::new(proxy.address()))
        .await;

    assert!(!result.accepted);
    assert_eq!(
        result.classification,
        Classification::Infrastructure { keyword: "amazon".into() }
    );
}

#[tokio::test]
async fn test_error_status_is_rejected() {
    let proxy = start_mock_proxy(407, "").await;
    let result = validator(Duration::from_secs(2))
        .validate(&Resource::new(proxy.address()))
        .await;

    assert!(!result.accepted);
    assert_eq!(result.reasons, vec!["HTTP 407".to_string()]);
}

#[tokio::test]
async fn test_html_portal_page_is_rejected() {
    let proxy = start_mock_proxy(200, "<html><body>Wi-Fi login portal</body></html>").await;
    let result = validator(Duration::from_secs(2))
        .validate(&Resource::new(proxy.address()))
        .await;

    assert!(!result.accepted);
    assert_eq!(result.classification, Classification::Unclassified);
    assert!(
        result.reasons[0].starts_with("Undecodable probe response"),
        "reasons: {:?}",
        result.reasons
    );
    assert_eq!(proxy.requests(), 1);
}

#[tokio::test]
async fn test_hung_and_refused_resources_are_excluded() {
    let good = start_mock_proxy(200, RESIDENTIAL).await;
    let hung = start_hung_proxy().await;
    let refused = refused_address().await;
    let other = start_mock_proxy(200, RESIDENTIAL).await;

    let resources = vec![
        Resource::new(hung.to_string()),
        Resource::new(good.address()),
        Resource::new(refused.to_string()),
        Resource::new(other.address()),
    ];

    let v = validator(Duration::from_millis(500));
    let started = std::time::Instant::now();
    let report = v.validate_report(&resources).await;
    assert!(started.elapsed() < Duration::from_secs(5));

    assert!(!report[0].accepted);
    assert_eq!(report[0].reasons, vec!["Timeout after 500ms".to_string()]);
    assert!(!report[2].accepted);
    assert!(report[2].reasons[0].starts_with("Transport error"));

    let accepted = v.validate_all(&resources).await;
    assert_eq!(accepted, vec![resources[1].clone(), resources[3].clone()]);
}

#[tokio::test]
async fn test_bootstrap_admits_only_validated_resources() {
    let mut addresses = Vec::new();
    for _ in 0..4 {
        addresses.push(start_mock_proxy(200, RESIDENTIAL).await.address());
    }
    addresses.push(start_mock_proxy(200, DATACENTER).await.address());
    addresses.push(refused_address().await.to_string());

    let pool = bootstrap(&config_for(&addresses)).await.unwrap();

    assert_eq!(pool.len(), 4);
    let admitted: Vec<String> = pool.resources().iter().map(|r| r.to_string()).collect();
    assert_eq!(admitted, addresses[..4].to_vec());
    assert_eq!(pool.group_labels(), vec!["US".to_string()]);
}
