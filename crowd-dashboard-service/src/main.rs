use anyhow::Context;
use crowd_dashboard_service::{server, App, ServiceConfig};
use crowd_telemetry::{Scheduler, TokioScheduler};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServiceConfig::from_env()?;
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.as_str()));
    fmt().with_env_filter(filter).with_target(true).init();

    let scheduler: Arc<dyn Scheduler> = Arc::new(TokioScheduler::current());
    let app = Arc::new(App::new(config.clone(), scheduler)?);

    let addr = config.bind_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!("crowd-dashboard-service listening on http://{addr}");

    server::serve(app, listener).await?;
    Ok(())
}
