//! Example todo client: open the offline cache and log in.
//!
//! Run with: cargo run -p todo-client-demo -- --access-token <token>
//!
//! Set `RUST_LOG=debug` to see the session lifecycle.

use std::{path::PathBuf, sync::Arc};

use anyhow::Context;
use clap::{Parser, ValueEnum};
use mobile_backend_core::{LocalStore, SessionConfig, StoreError};
use mobile_backend_remote::{HttpBackend, StaticIdentityProvider};
use mobile_backend_session::{
    SessionCell, SessionError,
    storage::{MemoryStore, SqliteStore},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Todo client session demo
#[derive(Parser)]
#[command(name = "todo-client", about = "Open the offline todo cache and log in")]
struct Cli {
    /// JSON file overriding the session configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Local cache backend
    #[arg(short, long, value_enum, default_value_t = StoreKind::Sqlite)]
    store: StoreKind,

    /// Identity-provider access token to exchange for a backend session
    #[arg(long)]
    access_token: Option<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum StoreKind {
    Memory,
    Sqlite,
}

type StoreFactory = fn(&str) -> Result<Arc<dyn LocalStore>, StoreError>;

fn memory_store(name: &str) -> Result<Arc<dyn LocalStore>, StoreError> {
    Ok(Arc::new(MemoryStore::new(name)))
}

fn sqlite_store(name: &str) -> Result<Arc<dyn LocalStore>, StoreError> {
    Ok(Arc::new(SqliteStore::new(name)))
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<SessionConfig> {
    let Some(path) = path else {
        return Ok(SessionConfig::default());
    };
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse config {}", path.display()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref())?;

    let factory: StoreFactory = match cli.store {
        StoreKind::Memory => memory_store,
        StoreKind::Sqlite => sqlite_store,
    };
    let mut backend = HttpBackend::new(factory);
    if let Some(token) = cli.access_token {
        backend = backend.with_identity_provider(Arc::new(StaticIdentityProvider::new(token)));
    }

    let sessions = SessionCell::new(config, backend);
    let session = sessions.get().await.context("Failed to open session")?;
    tracing::info!(
        endpoint = %session.config().endpoint,
        local_cache = session.local_store().name(),
        tables = session.local_store().tables().len(),
        "Offline cache ready"
    );

    match session.authenticate().await {
        Ok(user) => {
            tracing::info!(user_id = %user.user_id, "Logged in");
        }
        Err(SessionError::LoginDenied { provider, status, .. }) => {
            anyhow::bail!("{provider} refused the login (HTTP {status})");
        }
        Err(e) => return Err(e).context("Login failed"),
    }

    println!(
        "initialized={} authenticated={}",
        sessions.is_initialized(),
        session.is_authenticated()
    );
    Ok(())
}
