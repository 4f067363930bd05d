//! rpgd - tabletop RPG campaign state daemon
//!
//! Keeps NPCs, bestiaries, quests and one combat encounter per campaign,
//! and exposes them as narrative tools over HTTP.

pub mod api;
pub mod bestiary;
pub mod campaign;
pub mod combat;
pub mod db;
pub mod error;
pub mod init;
pub mod locks;
pub mod npc;
pub mod quests;
pub mod store;
pub mod tools;
pub mod world;

use std::net::{Ipv4Addr, SocketAddr};
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::info;

use combat::Dice;
use db::Database;
use store::Repositories;
use tools::Toolbox;

/// Config file read when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "rpgd.toml";

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Server configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub bind_addr: SocketAddr,
    /// None = in-memory
    pub db_path: Option<String>,
    /// CORS origins; empty disables CORS, "*" allows any
    pub allowed_origins: Vec<String>,
    /// When set, tool calls must send it in `X-API-Key`
    pub api_key: Option<String>,
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from((Ipv4Addr::LOCALHOST, 8000)),
            db_path: None,
            allowed_origins: Vec::new(),
            api_key: None,
            log_format: LogFormat::Text,
        }
    }
}

impl Config {
    /// Layer defaults, the TOML file (if present) and `RPGD_` variables
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));
        Self::figment(file)
            .extract()
            .with_context(|| format!("invalid configuration (file: {})", file.display()))
    }

    fn figment(file: &Path) -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(file))
            .merge(Env::prefixed("RPGD_"))
    }
}

/// The rpgd server instance
pub struct Server {
    config: Config,
    db: Arc<Database>,
    tools: Arc<Toolbox>,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
}

impl Server {
    /// Create a new server instance
    pub async fn new(config: Config) -> Result<Self> {
        let db = Database::new(config.db_path.as_deref()).await?;
        let repos = Repositories::sqlite(db.pool().clone());
        let tools = Toolbox::new(repos, Dice::random());
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        Ok(Self {
            config,
            db: Arc::new(db),
            tools: Arc::new(tools),
            shutdown_tx,
            shutdown_rx,
        })
    }

    /// Get the database handle
    pub fn db(&self) -> Arc<Database> {
        self.db.clone()
    }

    /// Get the tool facade
    pub fn tools(&self) -> Arc<Toolbox> {
        self.tools.clone()
    }

    /// Build the router
    pub fn router(&self) -> Router {
        let state = api::AppState {
            db: self.db.clone(),
            tools: self.tools.clone(),
            api_key: self.config.api_key.as_deref().map(Arc::from),
        };
        api::router(state, &self.config.allowed_origins)
    }

    /// Run the server until shutdown
    pub async fn run(&self) -> Result<()> {
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        let local_addr = listener.local_addr()?;
        info!("rpgd listening on {}", local_addr);

        let router = self.router();
        let mut shutdown_rx = self.shutdown_rx.clone();

        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                shutdown_rx.changed().await.ok();
            })
            .await?;

        info!("rpgd shutdown complete");
        Ok(())
    }

    /// Signal the server to shutdown
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(true);
    }

    /// Get the configured bind address
    pub fn bind_addr(&self) -> SocketAddr {
        self.config.bind_addr
    }
}
