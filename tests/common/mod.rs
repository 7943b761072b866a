//! Common test utilities for integration tests
//!
//! Provides a wiremock upstream that serves repository records and a helper
//! that runs the HTTP server on an ephemeral port.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use repositories::adapters::http;
use repositories::RepositoryService;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

/// Upstream envelope for one record.
pub fn record_json(id: i64, name: &str) -> Value {
    json!({
        "repository": {
            "id": id,
            "name": name,
            "fetchedAt": "2024-01-01T00:00:00Z"
        }
    })
}

/// Serves the given records in order, wrapping around at the end.
pub struct CyclingResponder {
    records: Vec<(i64, &'static str)>,
    next: AtomicUsize,
}

impl CyclingResponder {
    pub fn new(records: Vec<(i64, &'static str)>) -> Self {
        Self {
            records,
            next: AtomicUsize::new(0),
        }
    }
}

impl Respond for CyclingResponder {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        let index = self.next.fetch_add(1, Ordering::SeqCst) % self.records.len();
        let (id, name) = self.records[index];
        ResponseTemplate::new(200).set_body_json(record_json(id, name))
    }
}

/// Mount a cycling `GET /repository` responder on `server`.
pub async fn mount_cycling(server: &MockServer, records: Vec<(i64, &'static str)>) {
    Mock::given(method("GET"))
        .and(path("/repository"))
        .respond_with(CyclingResponder::new(records))
        .mount(server)
        .await;
}

/// A running HTTP server bound to an ephemeral local port.
pub struct TestServer {
    pub addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    handle: JoinHandle<anyhow::Result<()>>,
}

impl TestServer {
    pub async fn start(service: Arc<dyn RepositoryService>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("listener address");

        let (tx, rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(http::serve(listener, service, async move {
            let _ = rx.await;
        }));

        Self {
            addr,
            shutdown: Some(tx),
            handle,
        }
    }

    pub fn url(&self, path_and_query: &str) -> String {
        format!("http://{}{}", self.addr, path_and_query)
    }

    pub async fn stop(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        self.handle
            .await
            .expect("server task panicked")
            .expect("server returned an error");
    }
}

/// Setup test logging
///
/// Initializes tracing subscriber for test output.
/// Call this at the beginning of tests that need logging.
pub fn setup_test_logging() {
    use tracing_subscriber::fmt;

    let _ = fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}
