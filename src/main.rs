use std::sync::Arc;

use n8n_proxy::{
    config::{Config, LogFormat},
    routes::routes,
    AppState,
};
use tracing_subscriber::EnvFilter;

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("n8n_proxy=info,warp=info"));
    let subscriber = tracing_subscriber::fmt().with_env_filter(filter);

    match format {
        LogFormat::Json => subscriber.json().init(),
        LogFormat::Pretty => subscriber.init(),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Nothing is listening yet, so a bad configuration stops the process here.
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            init_tracing(LogFormat::Pretty);
            tracing::error!(error = %e, "invalid configuration");
            return Err(e.into());
        }
    };
    init_tracing(config.log_format);

    let listen_addr = config.listen_addr;
    tracing::info!(
        base_url = %config.base_url,
        api_prefix = config.api_style.prefix(),
        auth = config.credential.mode(),
        timeout_secs = config.request_timeout.map(|t| t.as_secs()),
        static_dir = ?config.static_dir,
        "configuration loaded"
    );

    let state = Arc::new(AppState::new(config)?);

    tracing::info!("n8n proxy running on http://{}", listen_addr);
    warp::serve(routes(state)).run(listen_addr).await;

    Ok(())
}
