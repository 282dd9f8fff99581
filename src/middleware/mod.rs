use hyper::header::{
    HeaderValue,
    ACCESS_CONTROL_ALLOW_HEADERS,
    ACCESS_CONTROL_ALLOW_METHODS,
    ACCESS_CONTROL_ALLOW_ORIGIN,
    ACCESS_CONTROL_MAX_AGE,
};
use hyper::HeaderMap;


pub const ALLOWED_METHODS: &str = "GET, POST, OPTIONS";
pub const ALLOWED_HEADERS: &str = "Content-Type";
/// How long browsers may cache a preflight answer, in seconds.
pub const PREFLIGHT_MAX_AGE: &str = "600";

/// Headers attached to every reply, errors and static files included.
pub fn cors_headers() -> HeaderMap {
    let mut headers = HeaderMap::with_capacity(4);
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(ACCESS_CONTROL_ALLOW_METHODS, HeaderValue::from_static(ALLOWED_METHODS));
    headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static(ALLOWED_HEADERS));
    headers.insert(ACCESS_CONTROL_MAX_AGE, HeaderValue::from_static(PREFLIGHT_MAX_AGE));
    headers
}

/// Access log line for every inbound request.
pub fn log_request(info: warp::log::Info<'_>) {
    let status = info.status();
    let elapsed_ms = info.elapsed().as_millis() as u64;
    if status.is_server_error() {
        tracing::warn!(method = %info.method(), path = info.path(), status = status.as_u16(), elapsed_ms, "request failed");
    } else {
        tracing::info!(method = %info.method(), path = info.path(), status = status.as_u16(), elapsed_ms, "request");
    }
}
