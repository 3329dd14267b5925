//! Shared utilities for integration tests.
//!
//! Each helper binds an ephemeral port on 127.0.0.1 and plays the part of
//! a forward proxy: it reads one request and answers it directly.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use egress_pool::config::{PoolConfig, ResourceConfig};

/// Probe target used with the mock proxies. Plain HTTP, so the client
/// sends an absolute-form GET to the proxy instead of a CONNECT.
pub const PROBE_TARGET: &str = "http://probe.test/json";

/// Probe body of a residential exit.
pub const RESIDENTIAL: &str = r#"{"ip":"198.51.100.4","city":"Denver","country_name":"United States","country_code":"US","org":"Comcast Cable Communications"}"#;

/// Probe body of a hosting-provider exit.
pub const DATACENTER: &str = r#"{"ip":"203.0.113.9","city":"Ashburn","country_name":"United States","country_code":"US","org":"Amazon.com, Inc."}"#;

/// A running mock proxy.
pub struct MockProxy {
    pub addr: SocketAddr,
    requests: Arc<AtomicUsize>,
}

impl MockProxy {
    /// Resource identifier for this proxy.
    pub fn address(&self) -> String {
        self.addr.to_string()
    }

    /// Requests answered so far.
    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

/// Start a mock proxy that answers every request with `status` and `body`.
pub async fn start_mock_proxy(status: u16, body: &'static str) -> MockProxy {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let requests = Arc::new(AtomicUsize::new(0));
    let counter = requests.clone();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((socket, _)) => {
                    let counter = counter.clone();
                    tokio::spawn(async move {
                        respond(socket, status, body).await;
                        counter.fetch_add(1, Ordering::SeqCst);
                    });
                }
                Err(_) => break,
            }
        }
    });

    MockProxy { addr, requests }
}

async fn respond(mut socket: TcpStream, status: u16, body: &str) {
    read_request_head(&mut socket).await;

    let status_text = match status {
        200 => "200 OK",
        403 => "403 Forbidden",
        407 => "407 Proxy Authentication Required",
        502 => "502 Bad Gateway",
        503 => "503 Service Unavailable",
        _ => "500 Internal Server Error",
    };
    let response = format!(
        "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status_text,
        body.len(),
        body
    );
    let _ = socket.write_all(response.as_bytes()).await;
    let _ = socket.shutdown().await;
}

async fn read_request_head(socket: &mut TcpStream) {
    let mut head = Vec::new();
    let mut buf = [0u8; 1024];
    while !head.windows(4).any(|w| w == b"\r\n\r\n") {
        match socket.read(&mut buf).await {
            Ok(0) | Err(_) => return,
            Ok(n) => head.extend_from_slice(&buf[..n]),
        }
    }
}

/// Start a proxy that accepts connections and never answers.
pub async fn start_hung_proxy() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });

    addr
}

/// An address nothing listens on.
pub async fn refused_address() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    // Give the OS a moment to release the port.
    tokio::time::sleep(Duration::from_millis(10)).await;
    addr
}

/// Config over `addresses` with probes aimed at the mock target.
pub fn config_for(addresses: &[String]) -> PoolConfig {
    let mut config = PoolConfig {
        resources: addresses.iter().map(ResourceConfig::new).collect(),
        ..Default::default()
    };
    config.validation.probe_url = PROBE_TARGET.to_string();
    config.validation.timeout_secs = 2;
    config.health_check.targets = vec![PROBE_TARGET.to_string()];
    config.health_check.timeout_secs = 2;
    config
}
