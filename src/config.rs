use std::env;
use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[cfg(test)]
mod tests;

pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:4000";
pub const DEFAULT_API_KEY_HEADER: &str = "X-N8N-API-KEY";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set in environment")]
    Missing(&'static str),

    #[error("{key} has an invalid value {value:?}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("no upstream credential configured: set N8N_API_KEY, or both N8N_USER and N8N_PASS")]
    MissingCredential,
}

/// Path convention of the upstream API. One choice pins the path prefix,
/// the execution filter shape and the run verb together.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiStyle {
    /// Public API under `/api/v1`.
    Versioned,
    /// Internal API under `/rest`.
    Legacy,
}

impl ApiStyle {
    fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "versioned" | "v1" => Some(Self::Versioned),
            "legacy" | "rest" => Some(Self::Legacy),
            _ => None,
        }
    }

    pub fn prefix(self) -> &'static str {
        match self {
            Self::Versioned => "/api/v1",
            Self::Legacy => "/rest",
        }
    }

    pub fn version_marker(self) -> &'static str {
        match self {
            Self::Versioned => "v1",
            Self::Legacy => "legacy",
        }
    }

    pub fn run_verb(self) -> &'static str {
        match self {
            Self::Versioned => "start",
            Self::Legacy => "run",
        }
    }

    /// Query string selecting the executions of one workflow.
    pub fn executions_filter(self, workflow_id: &str) -> String {
        match self {
            Self::Versioned => format!("filters[workflowId]={}", workflow_id),
            Self::Legacy => format!("workflowId={}", workflow_id),
        }
    }
}

#[derive(Clone, PartialEq, Eq)]
pub enum UpstreamCredential {
    Basic { username: String, password: String },
    ApiKey { header: String, key: String },
}

impl UpstreamCredential {
    pub fn mode(&self) -> &'static str {
        match self {
            Self::Basic { .. } => "basic",
            Self::ApiKey { .. } => "api-key",
        }
    }
}

// Keeps secrets out of logs and panic messages.
impl fmt::Debug for UpstreamCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
            Self::ApiKey { header, .. } => f
                .debug_struct("ApiKey")
                .field("header", header)
                .field("key", &"<redacted>")
                .finish(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Process configuration, resolved once at startup and never mutated.
#[derive(Debug, Clone)]
pub struct Config {
    /// Upstream base URL without a trailing slash.
    pub base_url: String,
    pub api_style: ApiStyle,
    pub credential: UpstreamCredential,
    /// `None` leaves the transport default in place.
    pub request_timeout: Option<Duration>,
    pub listen_addr: SocketAddr,
    pub static_dir: Option<PathBuf>,
    pub log_format: LogFormat,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup. Empty values
    /// count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let base_url = parse_base_url(get("N8N_URL").ok_or(ConfigError::Missing("N8N_URL"))?)?;

        let api_style = match get("N8N_API_STYLE") {
            Some(value) => ApiStyle::parse(&value).ok_or_else(|| ConfigError::Invalid {
                key: "N8N_API_STYLE",
                value,
                reason: "expected `versioned` or `legacy`".to_string(),
            })?,
            None => ApiStyle::Versioned,
        };

        let credential = if let Some(key) = get("N8N_API_KEY") {
            UpstreamCredential::ApiKey {
                header: get("N8N_API_KEY_HEADER").unwrap_or_else(|| DEFAULT_API_KEY_HEADER.to_string()),
                key,
            }
        } else {
            match (get("N8N_USER"), get("N8N_PASS")) {
                (Some(username), Some(password)) => UpstreamCredential::Basic { username, password },
                (Some(_), None) => return Err(ConfigError::Missing("N8N_PASS")),
                (None, Some(_)) => return Err(ConfigError::Missing("N8N_USER")),
                (None, None) => return Err(ConfigError::MissingCredential),
            }
        };

        let request_timeout = match get("N8N_TIMEOUT_SECS") {
            Some(value) => match value.parse::<u64>() {
                Ok(secs) if secs > 0 => Some(Duration::from_secs(secs)),
                _ => {
                    return Err(ConfigError::Invalid {
                        key: "N8N_TIMEOUT_SECS",
                        value,
                        reason: "expected a positive number of seconds".to_string(),
                    })
                }
            },
            None => None,
        };

        let listen_raw = get("PROXY_LISTEN_ADDR").unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string());
        let listen_addr = listen_raw.parse().map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
            key: "PROXY_LISTEN_ADDR",
            value: listen_raw.clone(),
            reason: e.to_string(),
        })?;

        let log_format = match get("LOG_FORMAT") {
            Some(value) if value.eq_ignore_ascii_case("json") => LogFormat::Json,
            Some(value) if value.eq_ignore_ascii_case("pretty") => LogFormat::Pretty,
            Some(value) => {
                return Err(ConfigError::Invalid {
                    key: "LOG_FORMAT",
                    value,
                    reason: "expected `pretty` or `json`".to_string(),
                })
            }
            None => LogFormat::Pretty,
        };

        Ok(Self {
            base_url,
            api_style,
            credential,
            request_timeout,
            listen_addr,
            static_dir: get("PROXY_STATIC_DIR").map(PathBuf::from),
            log_format,
        })
    }
}

fn parse_base_url(raw: String) -> Result<String, ConfigError> {
    let invalid = |reason: String| ConfigError::Invalid {
        key: "N8N_URL",
        value: raw.clone(),
        reason,
    };

    let url = reqwest::Url::parse(&raw).map_err(|e| invalid(e.to_string()))?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(invalid("scheme must be http or https".to_string()));
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err(invalid("must not carry a query or fragment".to_string()));
    }

    Ok(raw.trim_end_matches('/').to_string())
}
