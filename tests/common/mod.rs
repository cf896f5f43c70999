//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{extract::RawQuery, http::HeaderMap, routing::get, Router};
use hop_relay::config::RelayConfig;
use hop_relay::hop::HopStats;
use hop_relay::{HopServer, Shutdown};
use tokio::net::TcpListener;

/// A relay instance running on an ephemeral port.
pub struct Relay {
    pub addr: SocketAddr,
    pub stats: Arc<HopStats>,
    shutdown: Shutdown,
}

impl Relay {
    pub fn url(&self, hops: &str) -> String {
        format!("http://{}/?hops={}", self.addr, hops)
    }
}

impl Drop for Relay {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Bind a listener on an ephemeral local port.
pub async fn bind() -> TcpListener {
    TcpListener::bind("127.0.0.1:0").await.unwrap()
}

/// Start a relay on an already-bound listener.
pub fn start_relay(listener: TcpListener, hosts: Vec<String>, configure: impl FnOnce(&mut RelayConfig)) -> Relay {
    let addr = listener.local_addr().unwrap();

    let mut config = RelayConfig::default();
    config.listener.port = addr.port();
    config.hops.hosts = hosts;
    configure(&mut config);

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let server = HopServer::new(config);
    let stats = server.stats();

    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    Relay { addr, stats, shutdown }
}

/// What a mock peer saw on one request.
#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct Recorded {
    pub query: Option<String>,
    pub request_id: Option<String>,
}

/// Start a mock peer that answers `reply` and records every request.
#[allow(dead_code)]
pub async fn start_recording_backend(reply: &'static str) -> (SocketAddr, Arc<Mutex<Vec<Recorded>>>) {
    let seen: Arc<Mutex<Vec<Recorded>>> = Arc::default();
    let log = seen.clone();

    let app = Router::new().route(
        "/",
        get(move |RawQuery(query): RawQuery, headers: HeaderMap| {
            let log = log.clone();
            async move {
                let request_id = headers
                    .get("request-id")
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_string);
                log.lock().unwrap().push(Recorded { query, request_id });
                reply
            }
        }),
    );

    let listener = bind().await;
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    (addr, seen)
}

/// Start a mock peer that waits `delay` before answering `reply`. The counter
/// goes up only once a reply has been produced.
#[allow(dead_code)]
pub async fn start_delayed_backend(reply: &'static str, delay: Duration) -> (SocketAddr, Arc<AtomicUsize>) {
    let completed = Arc::new(AtomicUsize::new(0));
    let done = completed.clone();

    let app = Router::new().route(
        "/",
        get(move || {
            let done = done.clone();
            async move {
                tokio::time::sleep(delay).await;
                done.fetch_add(1, Ordering::SeqCst);
                reply
            }
        }),
    );

    let listener = bind().await;
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    (addr, completed)
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}
