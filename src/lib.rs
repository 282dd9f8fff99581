pub mod config;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod upstream;

pub use config::{ApiStyle, Config, ConfigError, UpstreamCredential};
pub use errors::GatewayError;
pub use models::AppState;
