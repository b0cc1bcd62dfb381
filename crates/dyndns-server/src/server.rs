use crate::router::build_router;
use crate::state::AppState;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

/// Default upper bound for closing the provider on shutdown
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);

/// Bind `bind_address:port` and serve until `shutdown` resolves
pub async fn run_http_server(
    state: Arc<AppState>,
    bind_address: &str,
    port: u16,
    shutdown_timeout: Duration,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    let listener = TcpListener::bind(format!("{bind_address}:{port}")).await?;
    tracing::info!(%bind_address, port, provider = state.provider.name(), "DynDNS server listening");
    serve(listener, state, shutdown_timeout, shutdown).await
}

/// Serve on an already bound listener
///
/// When `shutdown` resolves the provider is closed first (bounded by
/// `shutdown_timeout`), then in-flight requests drain.
pub async fn serve(
    listener: TcpListener,
    state: Arc<AppState>,
    shutdown_timeout: Duration,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    let provider = Arc::clone(&state.provider);
    let app = build_router(state).into_make_service_with_connect_info::<SocketAddr>();

    let graceful = async move {
        shutdown.await;
        tracing::info!("shutting down, closing DNS provider");

        match tokio::time::timeout(shutdown_timeout, provider.close()).await {
            Ok(Ok(())) => tracing::debug!("DNS provider closed"),
            Ok(Err(e)) => tracing::warn!(error = %e, "failed to close DNS provider"),
            Err(_) => tracing::warn!(?shutdown_timeout, "closing DNS provider timed out"),
        }
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(graceful)
        .await?;

    tracing::info!("server stopped");
    Ok(())
}
