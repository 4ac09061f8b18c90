//! Local HTTP stub standing in for a provider endpoint in adapter tests.

use std::sync::{Arc, Mutex};

use axum::http::{HeaderMap, StatusCode};
use axum::Router;

/// What the stub saw for one request.
#[derive(Debug, Clone)]
pub(crate) struct CapturedRequest {
    pub authorization: Option<String>,
    pub goog_api_key: Option<String>,
    pub body: serde_json::Value,
}

/// Answers every request with a fixed status and body.
pub(crate) struct StubServer {
    pub url: String,
    requests: Arc<Mutex<Vec<CapturedRequest>>>,
    handle: tokio::task::JoinHandle<()>,
}

impl StubServer {
    pub async fn spawn(status: StatusCode, reply: &'static str) -> Self {
        let requests: Arc<Mutex<Vec<CapturedRequest>>> = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&requests);

        let app = Router::new().fallback(move |headers: HeaderMap, body: String| {
            let seen = Arc::clone(&seen);
            async move {
                let header = |name: &str| {
                    headers
                        .get(name)
                        .and_then(|v| v.to_str().ok())
                        .map(String::from)
                };
                let captured = CapturedRequest {
                    authorization: header("authorization"),
                    goog_api_key: header("x-goog-api-key"),
                    body: serde_json::from_str(&body).unwrap_or(serde_json::Value::Null),
                };
                seen.lock().unwrap().push(captured);
                (status, reply)
            }
        });

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            url: format!("http://{}/v1/chat/completions", addr),
            requests,
            handle,
        }
    }

    pub fn requests(&self) -> Vec<CapturedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Drop for StubServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
