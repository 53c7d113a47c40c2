use std::sync::Arc;

use clap::{Parser, ValueEnum};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use notes_db::{Database, DatabaseConfig};
use notes_server::auth::Authenticator;
use notes_server::config::ServerConfig;
use notes_server::routes;
use notes_server::state::AppState;

const DEFAULT_LOG_DIRECTIVES: &str = "notes_core=info,notes_db=info,notes_server=info,tower_http=info";

#[derive(Parser)]
#[command(name = "notes-server", version, about = "REST API for per-user notes")]
struct Args {
    /// Profile whose `.env.<profile>` file is loaded before `.env` (e.g. `localhost`)
    #[arg(long, env = "NOTES_PROFILE")]
    profile: Option<String>,

    /// Port to listen on; overrides NOTES_SERVER_PORT
    #[arg(short, long)]
    port: Option<u16>,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if let Some(profile) = &args.profile {
        let _ = dotenvy::from_filename(format!(".env.{profile}"));
    }
    let _ = dotenvy::dotenv();

    init_tracing(args.log_format);
    if let Some(profile) = &args.profile {
        tracing::info!("Using profile [{profile}]");
    }

    let config = ServerConfig::from_env()?;
    let port = args.port.unwrap_or(config.port);
    let addr = format!("0.0.0.0:{port}");

    let db = Database::connect(&DatabaseConfig::from_env()?).await?;
    db.migrate().await?;

    let auth = Authenticator::new(&config.auth)?;
    let state = Arc::new(AppState {
        db,
        auth,
        page_limits: config.page_limits,
    });

    let app = routes::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    tracing::info!("Starting server on {addr}");
    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_DIRECTIVES));

    match format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
        LogFormat::Text => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_target(false))
            .init(),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for CTRL+C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {e}");
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

    tracing::info!("Shutdown signal received");
}
