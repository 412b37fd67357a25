// ABOUTME: Entry point for the roster binary.
// ABOUTME: Parses CLI arguments, initializes tracing, opens the employee store, and starts the HTTP server.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use roster_server::{AppState, ConfigOverrides, RosterConfig, create_router};
use roster_store::EmployeeStore;

/// Employee record service: CRUD and search over HTTP/JSON.
#[derive(Debug, Parser)]
#[command(name = "roster", version, about)]
struct Cli {
    /// SQLite database file (overrides ROSTER_DB_PATH).
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// Socket address to listen on (overrides ROSTER_BIND).
    #[arg(long)]
    bind: Option<String>,

    /// Allow binding a non-loopback address.
    #[arg(long)]
    allow_remote: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let dotenv = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new(
                    "roster=debug,roster_server=debug,roster_store=debug,tower_http=debug",
                )
            }),
        )
        .init();

    if let Some(e) = dotenv_problem(dotenv) {
        tracing::warn!("ignoring unreadable .env file: {}", e);
    }

    let cli = Cli::parse();
    let config = RosterConfig::load(ConfigOverrides {
        db_path: cli.db_path,
        bind: cli.bind,
        allow_remote: cli.allow_remote,
    })?;

    tracing::info!("roster starting up");

    let store = EmployeeStore::open(&config.db_path)
        .with_context(|| format!("failed to open database {}", config.db_path.display()))?;
    let state = Arc::new(AppState::new(store));
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;
    tracing::info!("listening on http://{}", config.bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("roster stopped");
    Ok(())
}

/// A missing .env file is fine; any other failure is worth reporting.
fn dotenv_problem(result: Result<PathBuf, dotenvy::Error>) -> Option<dotenvy::Error> {
    match result {
        Err(e) if !e.not_found() => Some(e),
        _ => None,
    }
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("received Ctrl+C, shutting down"),
        _ = terminate => tracing::info!("received SIGTERM, shutting down"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_dotenv_is_silent() {
        let missing = dotenvy::Error::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "no .env",
        ));
        assert!(dotenv_problem(Err(missing)).is_none());
        assert!(dotenv_problem(Ok(PathBuf::from(".env"))).is_none());
    }

    #[test]
    fn malformed_dotenv_is_reported() {
        let broken = dotenvy::Error::LineParse("ROSTER_BIND 127.0.0.1".to_string(), 11);
        let problem = dotenv_problem(Err(broken)).unwrap();
        assert!(!problem.not_found());
    }
}
