//! Browser-facing operations. Each one is a single call through
//! [`UpstreamClient::call`], parameterised by path, method, body and, for
//! toggling, the direction.

use serde_json::Value;

use crate::config::ApiStyle;
use crate::errors::{GatewayError, Result};
use crate::upstream::{ProxyRequest, UpstreamClient};


/// Upstream verb for a toggle. The browser sends the workflow's current
/// state, so an active workflow is deactivated and vice versa.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleAction {
    Activate,
    Deactivate,
}

impl ToggleAction {
    pub fn from_current_state(active: bool) -> Self {
        if active {
            Self::Deactivate
        } else {
            Self::Activate
        }
    }

    pub fn verb(self) -> &'static str {
        match self {
            Self::Activate => "activate",
            Self::Deactivate => "deactivate",
        }
    }

    pub fn past_tense(self) -> &'static str {
        match self {
            Self::Activate => "activated",
            Self::Deactivate => "deactivated",
        }
    }
}

/// Workflow ids travel as a single path segment.
pub fn validate_workflow_id(id: &str) -> Result<()> {
    let valid = !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(GatewayError::InvalidRequest(format!("invalid workflow id {:?}", id)))
    }
}

pub fn workflows_path(style: ApiStyle) -> String {
    format!("{}/workflows", style.prefix())
}

pub fn workflow_path(style: ApiStyle, id: &str) -> String {
    format!("{}/workflows/{}", style.prefix(), id)
}

pub fn run_path(style: ApiStyle, id: &str) -> String {
    format!("{}/{}", workflow_path(style, id), style.run_verb())
}

pub fn toggle_path(style: ApiStyle, id: &str, action: ToggleAction) -> String {
    format!("{}/{}", workflow_path(style, id), action.verb())
}

pub fn executions_path(style: ApiStyle, id: &str) -> String {
    format!("{}/executions?{}", style.prefix(), style.executions_filter(id))
}

/// n8n wraps collections as `{ "data": [...], "nextCursor": ... }` on some
/// versions and returns the bare array on others.
pub fn unwrap_envelope(value: Value) -> Value {
    match value {
        Value::Object(mut map) if map.get("data").map_or(false, Value::is_array) => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

pub async fn list_workflows(client: &UpstreamClient, style: ApiStyle) -> Result<Value> {
    let value = client.call(ProxyRequest::get(workflows_path(style))).await?;
    Ok(unwrap_envelope(value))
}

pub async fn get_workflow(client: &UpstreamClient, style: ApiStyle, id: &str) -> Result<Value> {
    validate_workflow_id(id)?;
    client.call(ProxyRequest::get(workflow_path(style, id))).await
}

pub async fn create_workflow(client: &UpstreamClient, style: ApiStyle, definition: Value) -> Result<Value> {
    client
        .call(ProxyRequest::post(workflows_path(style), Some(definition)))
        .await
}

pub async fn run_workflow(client: &UpstreamClient, style: ApiStyle, id: &str) -> Result<Value> {
    validate_workflow_id(id)?;
    client.call(ProxyRequest::post(run_path(style, id), None)).await
}

pub async fn toggle_workflow(
    client: &UpstreamClient,
    style: ApiStyle,
    id: &str,
    action: ToggleAction,
) -> Result<Value> {
    validate_workflow_id(id)?;
    client
        .call(ProxyRequest::post(toggle_path(style, id, action), None))
        .await
}

pub async fn list_executions(client: &UpstreamClient, style: ApiStyle, id: &str) -> Result<Value> {
    validate_workflow_id(id)?;
    client.call(ProxyRequest::get(executions_path(style, id))).await
}
