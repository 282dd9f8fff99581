// Outbound side: one authenticated call to n8n per browser request.

mod normalize;


pub use normalize::{is_json_content_type, normalize, upstream_message};

use bytes::Bytes;
use hyper::header::{HeaderValue, ACCEPT};
use hyper::{HeaderMap, Method, StatusCode};
use reqwest::{Client, RequestBuilder};
use serde_json::Value;

use crate::config::{Config, UpstreamCredential};
use crate::errors::{GatewayError, Result};

/// One outbound call: a prefixed upstream path, GET or POST, and an
/// optional JSON body. Consumed when sent.
#[derive(Debug, Clone, PartialEq)]
pub struct ProxyRequest {
    pub path: String,
    pub method: Method,
    pub body: Option<Value>,
}

impl ProxyRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            method: Method::GET,
            body: None,
        }
    }

    pub fn post(path: impl Into<String>, body: Option<Value>) -> Self {
        Self {
            path: path.into(),
            method: Method::POST,
            body,
        }
    }
}

/// Raw upstream answer, before normalization.
#[derive(Debug)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl UpstreamResponse {
    pub fn normalize(&self) -> Result<Value> {
        normalize(self.status, &self.headers, &self.body)
    }
}

#[derive(Debug, Clone)]
pub struct UpstreamClient {
    http_client: Client,
    base_url: String,
    prefix: &'static str,
    credential: UpstreamCredential,
}

impl UpstreamClient {
    pub fn new(config: &Config) -> Result<Self> {
        let mut builder = Client::builder().user_agent(concat!("n8n-proxy/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }

        let http_client = builder.build().map_err(|e| GatewayError::Transport {
            message: format!("failed to create HTTP client: {}", e),
            timed_out: false,
        })?;

        Ok(Self {
            http_client,
            base_url: config.base_url.clone(),
            prefix: config.api_style.prefix(),
            credential: config.credential.clone(),
        })
    }

    pub fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Builds the outbound request without sending it.
    pub fn build(&self, request: ProxyRequest) -> Result<RequestBuilder> {
        let ProxyRequest { path, method, body } = request;

        if !path.starts_with(self.prefix) {
            return Err(GatewayError::InvalidRequest(format!(
                "upstream path {} does not start with {}",
                path, self.prefix
            )));
        }

        let builder = if method == Method::GET {
            self.http_client.get(self.url_for(&path))
        } else if method == Method::POST {
            let builder = self.http_client.post(self.url_for(&path));
            match body {
                Some(body) => builder.json(&body),
                None => builder,
            }
        } else {
            return Err(GatewayError::InvalidRequest(format!(
                "method {} is not proxied",
                method
            )));
        };

        let builder = builder.header(ACCEPT, HeaderValue::from_static("application/json"));

        Ok(match &self.credential {
            UpstreamCredential::Basic { username, password } => builder.basic_auth(username, Some(password)),
            UpstreamCredential::ApiKey { header, key } => builder.header(header.as_str(), key.as_str()),
        })
    }

    /// Performs the call and reads the whole body. Non-2xx statuses are
    /// returned as-is; only transport failures are errors here.
    pub async fn send(&self, request: ProxyRequest) -> Result<UpstreamResponse> {
        let method = request.method.clone();
        let url = self.url_for(&request.path);
        let builder = self.build(request)?;

        tracing::debug!(%method, %url, "calling n8n");

        let response = builder.send().await.map_err(|e| {
            tracing::warn!(%method, %url, error = %e, "n8n unreachable");
            GatewayError::from(e)
        })?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(|e| {
            tracing::warn!(%method, %url, error = %e, "failed to read n8n response body");
            GatewayError::from(e)
        })?;

        tracing::debug!(%method, %url, status = status.as_u16(), bytes = body.len(), "n8n responded");

        Ok(UpstreamResponse { status, headers, body })
    }

    /// Request Builder followed by the Response Normalizer.
    pub async fn call(&self, request: ProxyRequest) -> Result<Value> {
        let response = self.send(request).await?;
        let result = response.normalize();
        if let Err(e) = &result {
            tracing::warn!(status = response.status.as_u16(), error = %e, "n8n call failed");
        }
        result
    }
}
