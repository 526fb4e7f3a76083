use std::sync::Arc;

use anyhow::Result;
use evdash::{config::ServiceConfig, http, telemetry};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    telemetry::init();

    let config = Arc::new(ServiceConfig::from_env());
    info!("starting EV dashboard data service");
    info!("dataset: {}", config.data_path.display());

    let port = config.port;
    let routes = http::routes(config);

    info!("listening on port {}", port);
    info!("health check: http://localhost:{}/health", port);
    info!("dataset endpoint: GET http://localhost:{}/api/csv", port);

    warp::serve(routes).run(([0, 0, 0, 0], port)).await;

    Ok(())
}
