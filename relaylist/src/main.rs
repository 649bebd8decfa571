//! Relaylist - mood-matched playlists from SMS conversations
//!
//! `relaylist serve` runs the HTTP service (default);
//! `relaylist analyze <csv>` analyzes an export offline.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use relaylist::services::emotion_mapper::{emotion_to_genres, mood_description, DEFAULT_GENRE_LIMIT};
use relaylist::services::spotify::{build_http_client, SpotifyAuth, SpotifyClient};
use relaylist::services::{ChatAnalyzer, SmsParser};
use relaylist::AppState;
use relaylist_common::config::{
    load_toml_config, resolve_spotify_credentials, RootFolderInitializer, RootFolderResolver,
    TomlConfig,
};
use serde_json::json;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for relaylist
#[derive(Parser, Debug)]
#[command(name = "relaylist")]
#[command(about = "Mood-matched Spotify playlists from SMS conversations")]
#[command(version)]
struct Cli {
    /// Root folder holding the database
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Path to config.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP service
    Serve {
        /// Overrides [http] host
        #[arg(long)]
        host: Option<String>,

        /// Overrides [http] port
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Analyze an SMS export and print the result
    Analyze {
        /// CSV export to analyze
        file: PathBuf,

        /// Print the full analysis as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = load_toml_config(cli.config.as_deref());

    let default_level = config
        .as_ref()
        .map(|c| c.logging.level.clone())
        .unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = config.context("Failed to load configuration")?;

    match cli.command.unwrap_or(Command::Serve {
        host: None,
        port: None,
    }) {
        Command::Serve { host, port } => serve(config, cli.root, host, port).await,
        Command::Analyze { file, json } => analyze(&file, json),
    }
}

async fn serve(
    mut config: TomlConfig,
    root: Option<PathBuf>,
    host: Option<String>,
    port: Option<u16>,
) -> Result<()> {
    if let Some(host) = host {
        config.http.host = host;
    }
    if let Some(port) = port {
        config.http.port = port;
    }

    info!("Starting Relaylist v{}", env!("CARGO_PKG_VERSION"));

    // Resolve and create the root folder
    let root_folder = RootFolderResolver::new()
        .with_cli_arg(root)
        .with_toml_config(&config)
        .resolve();
    let initializer = RootFolderInitializer::new(root_folder);
    initializer
        .ensure_directory_exists()
        .context("Failed to initialize root folder")?;
    info!("Root folder: {}", initializer.root_folder().display());

    let db_path = initializer.database_path();
    info!("Database: {}", db_path.display());
    let db_pool = relaylist_common::db::init_database(&db_path)
        .await
        .context("Failed to open database")?;
    info!("✓ Database ready");

    let mut state = AppState::new(db_pool.clone());

    match resolve_spotify_credentials(&config, &config.http.callback_url()) {
        Ok(credentials) => {
            let http = build_http_client()?;
            let auth = Arc::new(SpotifyAuth::new(credentials, http).with_store(db_pool));
            if let Err(e) = auth.restore().await {
                warn!("Could not restore Spotify login: {}", e);
            }
            let client = SpotifyClient::new(auth.clone())?;
            info!("✓ Spotify configured (redirect URI {})", auth.redirect_uri());
            state = state.with_catalog(Arc::new(client)).with_spotify_auth(auth);
        }
        Err(e) => {
            warn!("{}", e);
            warn!("Spotify features disabled; analysis still available");
        }
    }

    let app = relaylist::build_router(state);

    let addr = format!("{}:{}", config.http.host, config.http.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("Listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

fn analyze(file: &Path, as_json: bool) -> Result<()> {
    let conversation = SmsParser::new()
        .parse_file(file)
        .with_context(|| format!("Failed to parse {}", file.display()))?;
    let analysis = ChatAnalyzer::new()
        .analyze(&conversation.messages)
        .with_context(|| format!("Failed to analyze {}", file.display()))?;

    if as_json {
        let output = json!({
            "contact": {
                "name": conversation.contact_name,
                "phone": conversation.contact_phone,
            },
            "statistics": conversation.statistics,
            "skipped_rows": conversation.skipped_rows,
            "analysis": analysis,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    let emotion = analysis.emotions.dominant;
    let sentiment = analysis.sentiment.average_polarity;
    println!(
        "Conversation with {} ({})",
        conversation.contact_name, conversation.contact_phone
    );
    println!();
    println!("{}", analysis.summary);
    println!();
    println!("Mood: {}", mood_description(emotion, sentiment));
    println!(
        "Suggested genres: {}",
        emotion_to_genres(emotion, DEFAULT_GENRE_LIMIT).join(", ")
    );
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
