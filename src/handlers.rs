use std::convert::Infallible;
use std::sync::Arc;

use hyper::StatusCode;
use serde_json::Value;
use warp::{Rejection, Reply};

use crate::errors::{GatewayError, OperationFailed};
use crate::models::{AppState, ErrorBody, RunResponse, SettingsSnapshot, ToggleRequest, ToggleResponse};
use crate::services::{self, ToggleAction};


fn failed(context: String, error: GatewayError) -> Rejection {
    match &error {
        GatewayError::InvalidRequest(_) => tracing::debug!(%context, %error, "rejected browser request"),
        GatewayError::Transport { .. } => tracing::error!(%context, %error, "n8n unreachable"),
        _ => tracing::error!(%context, %error, "n8n call failed"),
    }
    warp::reject::custom(OperationFailed::new(context, error))
}

pub async fn list_workflows(state: Arc<AppState>) -> Result<impl Reply, Rejection> {
    let workflows = services::list_workflows(&state.upstream, state.config.api_style)
        .await
        .map_err(|e| failed("Failed to fetch workflows".to_string(), e))?;
    Ok(warp::reply::json(&workflows))
}

pub async fn get_workflow(id: String, state: Arc<AppState>) -> Result<impl Reply, Rejection> {
    let workflow = services::get_workflow(&state.upstream, state.config.api_style, &id)
        .await
        .map_err(|e| failed(format!("Failed to fetch workflow {}", id), e))?;
    Ok(warp::reply::json(&workflow))
}

pub async fn create_workflow(definition: Value, state: Arc<AppState>) -> Result<impl Reply, Rejection> {
    let created = services::create_workflow(&state.upstream, state.config.api_style, definition)
        .await
        .map_err(|e| failed("Failed to create workflow".to_string(), e))?;
    Ok(warp::reply::json(&created))
}

pub async fn run_workflow(id: String, state: Arc<AppState>) -> Result<impl Reply, Rejection> {
    let data = services::run_workflow(&state.upstream, state.config.api_style, &id)
        .await
        .map_err(|e| failed(format!("Failed to run workflow {}", id), e))?;

    tracing::info!(workflow = %id, "workflow run triggered");
    Ok(warp::reply::json(&RunResponse {
        success: true,
        message: "Workflow run triggered.".to_string(),
        data,
    }))
}

pub async fn toggle_workflow(
    id: String,
    request: ToggleRequest,
    state: Arc<AppState>,
) -> Result<impl Reply, Rejection> {
    let action = ToggleAction::from_current_state(request.active);
    let data = services::toggle_workflow(&state.upstream, state.config.api_style, &id, action)
        .await
        .map_err(|e| failed(format!("Failed to {} workflow {}", action.verb(), id), e))?;

    tracing::info!(workflow = %id, action = action.verb(), "workflow toggled");
    Ok(warp::reply::json(&ToggleResponse {
        success: true,
        message: format!("Workflow {} {}.", id, action.past_tense()),
        action: action.verb(),
        data,
    }))
}

pub async fn list_executions(id: String, state: Arc<AppState>) -> Result<impl Reply, Rejection> {
    let executions = services::list_executions(&state.upstream, state.config.api_style, &id)
        .await
        .map_err(|e| failed(format!("Failed to fetch executions for workflow {}", id), e))?;
    Ok(warp::reply::json(&executions))
}

pub async fn settings(state: Arc<AppState>) -> Result<impl Reply, Infallible> {
    Ok(warp::reply::json(&SettingsSnapshot::from_config(&state.config)))
}

/// Every failure answers `{ "error": ... }`. Unknown routes and methods keep
/// 404 and 405; everything else, bad browser input included, is a 500.
pub async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    let (code, message) = if let Some(e) = err.find::<OperationFailed>() {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("{}: {}", e.context, e.error.public_message()),
        )
    } else if err.is_not_found() {
        (StatusCode::NOT_FOUND, "Not Found".to_string())
    } else if let Some(e) = err.find::<warp::filters::body::BodyDeserializeError>() {
        (StatusCode::INTERNAL_SERVER_ERROR, format!("Invalid request body: {}", e))
    } else if err.find::<warp::reject::LengthRequired>().is_some() {
        (StatusCode::INTERNAL_SERVER_ERROR, "Content-Length required".to_string())
    } else if err.find::<warp::reject::PayloadTooLarge>().is_some() {
        (StatusCode::INTERNAL_SERVER_ERROR, "Request body too large".to_string())
    } else if err.find::<warp::reject::UnsupportedMediaType>().is_some() {
        (StatusCode::INTERNAL_SERVER_ERROR, "Expected a JSON body".to_string())
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        (StatusCode::METHOD_NOT_ALLOWED, "Method not allowed".to_string())
    } else {
        tracing::error!(rejection = ?err, "unhandled rejection");
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
    };

    Ok(warp::reply::with_status(
        warp::reply::json(&ErrorBody { error: message }),
        code,
    ))
}
