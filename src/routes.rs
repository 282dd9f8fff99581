use std::convert::Infallible;
use std::sync::Arc;

use hyper::{Method, StatusCode};
use serde_json::Value;
use warp::filters::BoxedFilter;
use warp::reply::Response;
use warp::{Filter, Rejection, Reply};

use crate::handlers;
use crate::middleware::{cors_headers, log_request};
use crate::models::{AppState, ToggleRequest};

/// Largest browser body accepted for workflow definitions and toggles.
pub const MAX_BODY_BYTES: u64 = 1024 * 1024;

fn with_state(state: Arc<AppState>) -> impl Filter<Extract = (Arc<AppState>,), Error = Infallible> + Clone {
    warp::any().map(move || state.clone())
}

fn json_body<T>() -> impl Filter<Extract = (T,), Error = Rejection> + Clone
where
    T: serde::de::DeserializeOwned + Send,
{
    warp::body::content_length_limit(MAX_BODY_BYTES).and(warp::body::json())
}

/// The `/api` surface plus health and CORS preflight, without recovery.
pub fn api(state: Arc<AppState>) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let list = warp::path!("api" / "workflows")
        .and(warp::get())
        .and(with_state(state.clone()))
        .and_then(handlers::list_workflows);

    let create = warp::path!("api" / "workflows")
        .and(warp::post())
        .and(json_body::<Value>())
        .and(with_state(state.clone()))
        .and_then(handlers::create_workflow);

    let detail = warp::path!("api" / "workflows" / String)
        .and(warp::get())
        .and(with_state(state.clone()))
        .and_then(handlers::get_workflow);

    let run = warp::path!("api" / "workflows" / String / "run")
        .and(warp::post())
        .and(with_state(state.clone()))
        .and_then(handlers::run_workflow);

    let toggle = warp::path!("api" / "workflows" / String / "toggle")
        .and(warp::post())
        .and(json_body::<ToggleRequest>())
        .and(with_state(state.clone()))
        .and_then(handlers::toggle_workflow);

    let executions = warp::path!("api" / "workflows" / String / "executions")
        .and(warp::get())
        .and(with_state(state.clone()))
        .and_then(handlers::list_executions);

    let settings = warp::path!("api" / "settings")
        .and(warp::get())
        .and(with_state(state))
        .and_then(handlers::settings);

    let health = warp::path("health")
        .and(warp::path::end())
        .and(warp::get())
        .map(|| "OK");

    // Rejects everything but OPTIONS as not found so unknown paths keep
    // answering 404 instead of 405.
    let preflight = warp::method().and_then(|method: Method| async move {
        if method == Method::OPTIONS {
            Ok(StatusCode::NO_CONTENT)
        } else {
            Err(warp::reject::not_found())
        }
    });

    list.or(create)
        .or(detail)
        .or(run)
        .or(toggle)
        .or(executions)
        .or(settings)
        .or(health)
        .or(preflight)
}

/// Full service: API, optional static page, error recovery, CORS headers
/// and access logging.
pub fn routes(state: Arc<AppState>) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone {
    let static_dir = state.config.static_dir.clone();
    let api = api(state).map(|reply| Reply::into_response(reply));

    let site: BoxedFilter<(Response,)> = match static_dir {
        Some(dir) => api
            .or(warp::fs::dir(dir).map(|file: warp::filters::fs::File| file.into_response()))
            .unify()
            .boxed(),
        None => api.boxed(),
    };

    site.recover(handlers::handle_rejection)
        .with(warp::reply::with::headers(cors_headers()))
        .with(warp::log::custom(log_request))
}
