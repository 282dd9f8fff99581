use thiserror::Error;

/// Failure of a single proxied call.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The upstream could not be reached at all.
    #[error("{message}")]
    Transport { message: String, timed_out: bool },

    /// The upstream answered with a non-2xx status.
    #[error("{message}")]
    Upstream { status: u16, message: String },

    /// A 2xx JSON body that does not parse.
    #[error("upstream returned malformed JSON: {0}")]
    Decode(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl GatewayError {
    /// Text shown to the browser. Transport details stay in the logs.
    pub fn public_message(&self) -> String {
        match self {
            Self::Transport { timed_out: true, .. } => "request to n8n timed out".to_string(),
            Self::Transport { .. } => {
                "failed to connect to n8n, check that it is running and N8N_URL is correct".to_string()
            }
            other => other.to_string(),
        }
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(e: reqwest::Error) -> Self {
        Self::Transport {
            timed_out: e.is_timeout(),
            message: e.to_string(),
        }
    }
}

/// Rejection carrying a failed operation and what the browser asked for.
#[derive(Debug)]
pub struct OperationFailed {
    pub context: String,
    pub error: GatewayError,
}

impl OperationFailed {
    pub fn new(context: impl Into<String>, error: GatewayError) -> Self {
        Self {
            context: context.into(),
            error,
        }
    }
}

impl warp::reject::Reject for OperationFailed {}

pub type Result<T> = std::result::Result<T, GatewayError>;
