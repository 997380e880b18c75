//! Listener bootstrap and graceful shutdown.

use std::future::{Future, IntoFuture};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::Notify;

/// How long in-flight requests may keep running after a shutdown signal.
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(30);

pub async fn bind(port: u16) -> std::io::Result<TcpListener> {
    TcpListener::bind(SocketAddr::from(([0, 0, 0, 0], port))).await
}

pub fn log_banner(addr: SocketAddr) {
    tracing::info!(%addr, "listening");
    tracing::info!("endpoints: POST /3d-toy-sale/, POST /jewelry-sale/, GET /health");
}

/// Serve `app` until `signal` resolves, then drain for at most `grace`.
///
/// Connections still open when the grace period ends are dropped.
pub async fn run<S>(
    listener: TcpListener,
    app: Router,
    signal: S,
    grace: Duration,
) -> std::io::Result<()>
where
    S: Future<Output = ()> + Send + 'static,
{
    let draining = Arc::new(Notify::new());
    let notify = draining.clone();

    let server = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            signal.await;
            tracing::info!("shutdown signal received, draining connections");
            notify.notify_one();
        })
        .into_future();

    tokio::select! {
        result = server => result,
        _ = async {
            draining.notified().await;
            tokio::time::sleep(grace).await;
        } => {
            tracing::warn!(grace_secs = grace.as_secs(), "drain period elapsed, abandoning open connections");
            Ok(())
        }
    }
}

/// Resolves on Ctrl-C, or on SIGTERM where available.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
