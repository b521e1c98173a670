//! In-process stand-in for the developer API, used by unit tests.
//!
//! Serves `POST /auth/token/` with a fixed auth response and every other
//! path with a fixed billing response, recording hits, form bodies and
//! request URIs for assertions.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Router;
use axum::http::{HeaderMap, StatusCode, Uri, header};
use axum::routing::post;
use tokio::net::TcpListener;

#[derive(Default)]
struct Recorded {
    auth_hits: AtomicUsize,
    api_hits: AtomicUsize,
    auth_bodies: Mutex<Vec<String>>,
    auth_content_types: Mutex<Vec<String>>,
    api_uris: Mutex<Vec<String>>,
}

pub struct MockUpstreamBuilder {
    auth: (StatusCode, String),
    api: (StatusCode, String),
    auth_delay: Duration,
}

impl MockUpstreamBuilder {
    pub fn auth(mut self, status: StatusCode, body: &str) -> Self {
        self.auth = (status, body.to_string());
        self
    }

    pub fn api(mut self, status: StatusCode, body: &str) -> Self {
        self.api = (status, body.to_string());
        self
    }

    /// Hold every auth response for `delay` before answering.
    pub fn auth_delay(mut self, delay: Duration) -> Self {
        self.auth_delay = delay;
        self
    }

    pub async fn start(self) -> MockUpstream {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let recorded = Arc::new(Recorded::default());

        let auth_recorded = recorded.clone();
        let auth = self.auth;
        let delay = self.auth_delay;
        let api_recorded = recorded.clone();
        let api = self.api;

        let app = Router::new()
            .route(
                "/auth/token/",
                post(move |headers: HeaderMap, body: String| async move {
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                    auth_recorded.auth_hits.fetch_add(1, Ordering::SeqCst);
                    auth_recorded.auth_bodies.lock().unwrap().push(body);
                    let content_type = headers
                        .get(header::CONTENT_TYPE)
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or_default()
                        .to_string();
                    auth_recorded
                        .auth_content_types
                        .lock()
                        .unwrap()
                        .push(content_type);
                    auth
                }),
            )
            .fallback(move |uri: Uri| async move {
                api_recorded.api_hits.fetch_add(1, Ordering::SeqCst);
                api_recorded.api_uris.lock().unwrap().push(uri.to_string());
                api
            });

        let server = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        MockUpstream {
            url: format!("http://{addr}"),
            recorded,
            server,
        }
    }
}

pub struct MockUpstream {
    url: String,
    recorded: Arc<Recorded>,
    server: tokio::task::JoinHandle<()>,
}

impl MockUpstream {
    /// Defaults: auth issues `at_mock` valid for an hour, billing calls get `200 {}`.
    pub fn builder() -> MockUpstreamBuilder {
        MockUpstreamBuilder {
            auth: (
                StatusCode::OK,
                r#"{"access_token":"at_mock","token_type":"Bearer","expires_in":3600,"scope":"androidpublisher"}"#.to_string(),
            ),
            api: (StatusCode::OK, "{}".to_string()),
            auth_delay: Duration::ZERO,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn auth_url(&self) -> String {
        format!("{}/auth/token/", self.url)
    }

    pub fn auth_hits(&self) -> usize {
        self.recorded.auth_hits.load(Ordering::SeqCst)
    }

    pub fn api_hits(&self) -> usize {
        self.recorded.api_hits.load(Ordering::SeqCst)
    }

    pub fn last_auth_body(&self) -> Option<String> {
        self.recorded.auth_bodies.lock().unwrap().last().cloned()
    }

    pub fn last_auth_content_type(&self) -> Option<String> {
        self.recorded.auth_content_types.lock().unwrap().last().cloned()
    }

    /// Path and query of the most recent billing request.
    pub fn last_api_uri(&self) -> Option<String> {
        self.recorded.api_uris.lock().unwrap().last().cloned()
    }
}

impl Drop for MockUpstream {
    fn drop(&mut self) {
        self.server.abort();
    }
}

/// URL of a local port nothing listens on.
pub async fn unreachable_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}
