//! Application entry point and server initialization
//!
//! Loads configuration, opens the click counter database, picks the data
//! backend and serves the router until SIGINT or SIGTERM.

use std::sync::Arc;

use dotenvy::dotenv;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use storefront::config::Config;
use storefront::database::{init_db, AppState};
use storefront::memory::MemoryService;
use storefront::remote::DataService;
use storefront::route::create_app;
use storefront::supabase::SupabaseClient;

/// Application entry point
///
/// This asynchronous main function:
/// 1. Loads environment variables from .env file
/// 2. Builds [`Config`] from the environment
/// 3. Picks the data service (hosted project, or in-memory when unset)
/// 4. Opens the click counter database
/// 5. Creates the application state and router
/// 6. Starts the HTTP server with graceful shutdown handling
///
/// # Environment Variables
///
/// See [`Config::load`] for the full list; the common ones are
/// - `PORT` - Server port number (default: 3000)
/// - `DATABASE_URL` - Path to the click counter file (default: "clicks.db")
/// - `SUPABASE_URL` / `SUPABASE_ANON_KEY` - Hosted data service
/// - `SUPABASE_SERVICE_ROLE` - Enables admin writes
/// - `RUST_LOG` - Log filter (default: "storefront=debug,tower_http=debug")
#[tokio::main]
async fn main() {
    // Load environment variables from .env file if it exists
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("storefront=debug,tower_http=debug")),
        )
        .init();

    let config = Config::load();

    let data: Arc<dyn DataService> = match config.supabase_url.as_deref() {
        Some(url) => Arc::new(SupabaseClient::new(
            url,
            &config.supabase_anon_key,
            config.service_role_key.clone(),
        )),
        None => {
            warn!("SUPABASE_URL not set; using the in-memory data service");
            Arc::new(MemoryService::new())
        }
    };
    let backend = config.supabase_url.clone().unwrap_or_else(|| "in-memory".to_string());

    let db = match init_db(&config.database_url) {
        Ok(db) => db,
        Err(e) => {
            error!("Failed to initialize database {}: {e}", config.database_url);
            std::process::exit(1);
        }
    };

    let port = config.port;
    let db_name = config.database_url.clone();
    let state = AppState::new(db, data, config);
    // Create the Axum router with all routes configured
    let app = create_app(state).layer(TraceLayer::new_for_http());

    let addr = format!("0.0.0.0:{}", port);
    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind {addr}: {e}");
            std::process::exit(1);
        }
    };

    info!("🚀 Server running at http://localhost:{}", port);
    info!("📂 Click counters in {}", db_name);
    info!("🛍️ Data service: {}", backend);

    // Serve until SIGTERM or SIGINT
    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("Server error: {e}");
    }
}

/// Handles graceful shutdown signals
///
/// Returns when one of these is received:
/// - SIGINT (Ctrl+C) - Interrupt signal from terminal
/// - SIGTERM - Termination signal (common in Docker/Kubernetes)
///
/// After it returns, in-flight requests (and their click counter writes)
/// are allowed to finish before the process exits. A handler that cannot be
/// installed is logged and that signal is never awaited.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    };

    // Handle SIGTERM on Unix systems (Linux, macOS)
    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    // On non-Unix systems (Windows), only handle Ctrl+C
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("🛑 Shutdown signal received, stopping server.");
}
