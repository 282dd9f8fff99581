use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::convert::Infallible;
use std::time::Duration;

use bytes::Bytes;
use hyper::{HeaderMap, Method};
use n8n_proxy::config::{ApiStyle, Config, LogFormat, UpstreamCredential};
use n8n_proxy::AppState;
use serde_json::Value;
use warp::path::FullPath;
use warp::Filter;

/// A request as seen by the mock n8n.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub path: String,
    pub query: HashMap<String, String>,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl Recorded {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap()
    }
}

/// Status, content type (empty for none) and body of a canned answer.
pub type Responder = fn(&Recorded) -> (u16, &'static str, String);

pub struct MockUpstream {
    pub addr: SocketAddr,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

impl MockUpstream {
    pub async fn start(responder: Responder) -> Self {
        Self::start_delayed(Duration::ZERO, responder).await
    }

    /// Like [`MockUpstream::start`], but holds every answer for `delay`.
    pub async fn start_delayed(delay: Duration, responder: Responder) -> Self {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let log = requests.clone();

        let filter = warp::method()
            .and(warp::path::full())
            .and(warp::query::<HashMap<String, String>>())
            .and(warp::header::headers_cloned())
            .and(warp::body::bytes())
            .and_then(
                move |method: Method, path: FullPath, query: HashMap<String, String>, headers: HeaderMap, body: Bytes| {
                    let recorded = Recorded {
                        method,
                        path: path.as_str().to_string(),
                        query,
                        headers,
                        body,
                    };
                    let (status, content_type, body) = responder(&recorded);
                    log.lock().unwrap().push(recorded);

                    async move {
                        if !delay.is_zero() {
                            tokio::time::sleep(delay).await;
                        }
                        let mut builder = warp::http::Response::builder().status(status);
                        if !content_type.is_empty() {
                            builder = builder.header("content-type", content_type);
                        }
                        Ok::<_, Infallible>(builder.body(body).unwrap())
                    }
                },
            );

        let (addr, server) = warp::serve(filter).bind_ephemeral(([127, 0, 0, 1], 0));
        tokio::spawn(server);

        Self { addr, requests }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    pub fn single_request(&self) -> Recorded {
        let requests = self.requests();
        assert_eq!(requests.len(), 1, "expected exactly one upstream call, got {:?}", requests);
        requests.into_iter().next().unwrap()
    }
}

pub fn json_ok(body: &str) -> (u16, &'static str, String) {
    (200, "application/json; charset=utf-8", body.to_string())
}

pub fn basic_credential() -> UpstreamCredential {
    UpstreamCredential::Basic {
        username: "admin".to_string(),
        password: "secret".to_string(),
    }
}

pub fn test_config(base_url: String, api_style: ApiStyle, credential: UpstreamCredential) -> Config {
    Config {
        base_url,
        api_style,
        credential,
        request_timeout: None,
        listen_addr: "127.0.0.1:0".parse().unwrap(),
        static_dir: None,
        log_format: LogFormat::Pretty,
    }
}

pub fn state_for(upstream: &MockUpstream, api_style: ApiStyle) -> Arc<AppState> {
    let config = test_config(upstream.base_url(), api_style, basic_credential());
    Arc::new(AppState::new(config).unwrap())
}
