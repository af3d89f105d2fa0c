use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use inner_ear::api::{create_router, AppState};
use inner_ear::client::terminal;
use inner_ear::config::Config;

#[derive(Parser)]
#[command(name = "inner-ear")]
#[command(about = "The Inner Ear: a jazz mentor chat relay for the Gemini API")]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the relay server (default)
    Serve,
    /// Chat with the mentor from the terminal through a running relay
    Chat {
        /// Relay base URL (overrides INNER_EAR_SERVER)
        #[arg(long)]
        server: Option<String>,
        /// Where the obfuscated API key is kept (overrides INNER_EAR_KEY_FILE)
        #[arg(long)]
        key_file: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    dotenvy::dotenv().ok();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "inner_ear=info,tower_http=debug".into());
    let json_logs = std::env::var("LOG_FORMAT").is_ok_and(|format| format == "json");
    if json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    let mut config = Config::from_env();

    match args.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config).await,
        Command::Chat { server, key_file } => {
            if let Some(server) = server {
                config.client.server_url = server;
            }
            if let Some(key_file) = key_file {
                config.client.key_file = key_file;
            }
            terminal::run(&config.client).await
        }
    }
}

async fn serve(config: Config) -> anyhow::Result<()> {
    tracing::info!("Initializing Gemini relay: {}...", config.gemini.model);
    let state = AppState::from_config(config.clone())?;
    tracing::info!(
        "Relaying to {} (timeout {}s)",
        state.llm.base_url(),
        config.gemini.timeout_secs
    );

    if !config.server.static_dir.is_dir() {
        tracing::warn!(
            "Static directory {} not found - only /api routes will respond",
            config.server.static_dir.display()
        );
    }

    let app = create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    tracing::info!("The Inner Ear starting on http://{}", addr);
    tracing::info!("  Health check: http://{}/api/health", addr);
    tracing::info!("  API docs:     http://{}/api/docs", addr);
    tracing::info!("  OpenAPI spec: http://{}/api/openapi.json", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
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
                tracing::error!("Failed to install SIGTERM handler: {}", e);
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

    tracing::info!("Shutdown signal received, draining connections...");
}
