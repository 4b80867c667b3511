//! SemanticFlow API - Table Semantic Classification Service
//!
//! Serves the semantic engine over HTTP: single-table analysis, the gate
//! and classification stages on their own, background batches with
//! progress and cancellation, and a profiling signal cache.

use semanticflow::config::Settings;
use semanticflow::routes::create_router;
use semanticflow::state::AppState;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing subscriber for structured logging
    init_tracing();

    info!("🚀 Starting SemanticFlow - Table Semantic Classification...");

    // Load configuration
    let settings = Settings::load()?;
    info!("📋 Configuration loaded successfully");
    info!(
        "🧮 Batch concurrency {}, estimator timeout {} ms",
        settings.analysis.batch_concurrency, settings.analysis.estimator_timeout_ms
    );

    let state = Arc::new(AppState::with_rule_based_estimator(settings.clone()));
    info!("🤖 Semantic estimator: {}", state.analyzer.estimator_name());

    // Build the router
    let app = create_router(state, &settings);

    // Create socket address
    let addr = SocketAddr::from((settings.server.host, settings.server.port));

    info!("🌐 Server listening on http://{}", addr);
    info!("");
    info!("📚 API Endpoints:");
    info!("   ─── Analysis ───");
    info!("   POST /api/analyze                  - Full semantic profile for one table");
    info!("   POST /api/gate                     - Gatekeeper verdict only");
    info!("   POST /api/classify                 - Field roles only");
    info!("   GET  /api/rules                    - Gate and classification rules");
    info!("   POST /api/profiles/override        - Analyst override of the estimator score");
    info!("");
    info!("   ─── Batches ───");
    info!("   POST /api/batches                  - Start a batch");
    info!("   GET  /api/batches                  - List batches");
    info!("   GET  /api/batches/{{id}}             - Progress and outcomes");
    info!("   POST /api/batches/{{id}}/cancel      - Stop before the next table");
    info!("");
    info!("   ─── Profiling ───");
    info!("   PUT/GET/DELETE /api/profiling/{{table}} - Manage cached signals");
    info!("");

    // Create TCP listener and serve
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("👋 Server shutdown complete");
    Ok(())
}

/// Initialize tracing with structured logging
fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,semanticflow=debug,tower_http=debug"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true)
                .compact(),
        )
        .init();
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("📴 Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            info!("📴 Received terminate signal, initiating graceful shutdown...");
        },
    }
}
