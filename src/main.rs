//! rpgd - tabletop RPG campaign state daemon

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use rpgd::{Config, LogFormat, Server};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Campaign state server
#[derive(Parser, Debug)]
#[command(name = "rpgd", version, about = "Tabletop RPG campaign state daemon")]
struct Args {
    /// Config file (default: rpgd.toml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to listen on
    #[arg(short, long)]
    bind: Option<SocketAddr>,

    /// SQLite database file (default: in-memory)
    #[arg(short, long)]
    database: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = Config::load(args.config.as_deref())?;
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }
    if let Some(database) = args.database {
        config.db_path = Some(database);
    }

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "rpgd=info,tower_http=debug".into());
    let registry = tracing_subscriber::registry().with(filter);
    match config.log_format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).init(),
    }

    if config.db_path.is_none() {
        tracing::warn!("No database configured; campaigns will not survive a restart");
    }

    let server = Server::new(config).await?;
    server.run().await?;

    Ok(())
}
