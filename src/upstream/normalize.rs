use hyper::header::{CONTENT_LENGTH, CONTENT_TYPE};
use hyper::{HeaderMap, StatusCode};
use serde_json::{json, Value};

use crate::errors::{GatewayError, Result};

/// Turns a raw upstream answer into the JSON handed to the browser layer.
///
/// Successful responses without a JSON payload (204, `Content-Length: 0`,
/// an empty body or a non-JSON content type) become `{}`. Any other 2xx body
/// must parse. Non-2xx statuses become [`GatewayError::Upstream`] with the
/// upstream's own message.
pub fn normalize(status: StatusCode, headers: &HeaderMap, body: &[u8]) -> Result<Value> {
    if !status.is_success() {
        return Err(GatewayError::Upstream {
            status: status.as_u16(),
            message: upstream_message(status, body),
        });
    }

    if status == StatusCode::NO_CONTENT || declared_empty(headers) || body.is_empty() {
        return Ok(json!({}));
    }

    let content_type = headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok());
    if !content_type.map_or(false, is_json_content_type) {
        return Ok(json!({}));
    }

    serde_json::from_slice(body).map_err(|e| GatewayError::Decode(e.to_string()))
}

fn declared_empty(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        == Some(0)
}

pub fn is_json_content_type(content_type: &str) -> bool {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    mime == "application/json" || mime.ends_with("+json")
}

/// Human-readable message of a failed upstream call: the JSON `message`
/// field, then an `error` string, then the raw text.
pub fn upstream_message(status: StatusCode, body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    let text = text.trim();

    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(text) {
        for field in ["message", "error"] {
            if let Some(Value::String(message)) = map.get(field) {
                if !message.is_empty() {
                    return message.clone();
                }
            }
        }
    }

    if text.is_empty() {
        format!("n8n API responded with status {}", status)
    } else {
        text.to_string()
    }
}
