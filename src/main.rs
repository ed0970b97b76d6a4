use clap::Parser;
use photo_wall::api::{self, AppState};
use photo_wall::auth::FixedCredentials;
use photo_wall::config::ServerConfig;
use photo_wall::repo::PhotoRepository;
use photo_wall::store::FileStore;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "photo-wall")]
#[command(about = "Self-hosted photo wall backend")]
#[command(long_about = "\
Self-hosted photo wall backend

Accepts image uploads over HTTP, normalizes them to JPEG (quality 90),
records metadata in a SQLite database, and serves the gallery as JSON.
The uploads directory is served at /uploads for the frontend.

Configuration is layered: built-in defaults, then an optional config.toml
(--config), then the flags below. PORT in the environment is equivalent
to --port.")]
#[command(version)]
struct Cli {
    /// Path to a config.toml
    #[arg(long)]
    config: Option<PathBuf>,

    /// Port to listen on (overrides the config file)
    #[arg(long, env = "PORT")]
    port: Option<u16>,

    /// SQLite database file (overrides the config file)
    #[arg(long)]
    database: Option<PathBuf>,

    /// Directory for normalized uploads (overrides the config file)
    #[arg(long)]
    uploads_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let mut config = ServerConfig::load(cli.config.as_deref())?;
    if let Some(port) = cli.port {
        config.port = port;
    }
    if let Some(database) = cli.database {
        config.database = database;
    }
    if let Some(uploads_dir) = cli.uploads_dir {
        config.uploads_dir = uploads_dir;
    }

    std::fs::create_dir_all(&config.uploads_dir)?;

    let repo = Arc::new(PhotoRepository::open(&config.database)?);
    let store = FileStore::new(&config.uploads_dir);
    let auth = Arc::new(FixedCredentials::new(
        config.credentials.username.clone(),
        config.credentials.password.clone(),
    ));
    let state = AppState::new(repo, store, auth);
    let app = api::router(state, &config.uploads_dir);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?;
    info!(
        "listening on {} (database {}, uploads {})",
        listener.local_addr()?,
        config.database.display(),
        config.uploads_dir.display()
    );
    axum::serve(listener, app).await?;
    Ok(())
}
