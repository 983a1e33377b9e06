use crate::app::App;
use crate::error::ServiceResult;
use crate::routes;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use tracing::{debug, error};
use std::sync::Arc;
use tokio::net::TcpListener;

/// Accept loop. Each connection is served on its own task.
pub async fn serve(app: Arc<App>, listener: TcpListener) -> ServiceResult<()> {
    loop {
        let (stream, peer) = listener.accept().await?;
        debug!("connection from {peer}");
        let app = Arc::clone(&app);
        tokio::spawn(async move {
            let svc = service_fn(move |req| routes::handle(Arc::clone(&app), req));
            if let Err(e) = http1::Builder::new()
                .serve_connection(TokioIo::new(stream), svc)
                .await
            {
                error!("connection error from {peer}: {e}");
            }
        });
    }
}
