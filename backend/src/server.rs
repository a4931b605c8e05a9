use std::time::Duration;

use aide::openapi::OpenApi;
use axum::{error_handling::HandleErrorLayer, extract::DefaultBodyLimit, BoxError, Extension, Router};
use tokio::{net::TcpListener, signal};
use tower::{timeout::error::Elapsed, ServiceBuilder};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    routes,
    state::AppState,
    types::{AppConfig, AppError},
};

/// Time a request may take before it is cancelled
const REQUEST_TIMEOUT_SECS: u64 = 60;

/// Builds the application router with all layers applied
pub fn router(config: &AppConfig, state: AppState) -> Router {
    let mut openapi = OpenApi::default();

    routes::handler()
        .finish_api(&mut openapi)
        .layer(Extension(openapi))
        .layer(Extension(config.environment))
        .layer(Extension(state.staging_area))
        .layer(Extension(state.media_host))
        .layer(Extension(state.record_store))
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        // Any origin may upload
        .layer(CorsLayer::permissive())
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_middleware_error))
                .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS)),
        )
}

/// Turns middleware failures into the API's JSON error responses
async fn handle_middleware_error(err: BoxError) -> AppError {
    if err.is::<Elapsed>() {
        AppError::request_timeout()
    } else {
        tracing::error!("Unhandled middleware error: {err}");
        AppError::internal()
    }
}

/// Starts the server with the given configuration and dependencies
///
/// # Errors
///
/// Returns an error if the server fails to start or bind to the port
pub async fn start(config: AppConfig, state: AppState) -> anyhow::Result<()> {
    let router = router(&config, state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], config.port));

    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("🔄 Image upload relay started on http://{addr}");

    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
