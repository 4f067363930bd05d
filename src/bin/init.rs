//! rpgd_init - One-time database initialization tool
//!
//! Creates a fresh campaign database, optionally with a first campaign.

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Parser;
use rpgd::init::{init_database, SeedCampaign};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// rpgd database initialization tool
#[derive(Parser, Debug)]
#[command(name = "rpgd_init", version, about = "Initialize a new rpgd database")]
struct Args {
    /// Path to SQLite database file to create (must not exist)
    #[arg(short, long)]
    database: PathBuf,

    /// Name of a campaign to create
    #[arg(long)]
    campaign: Option<String>,

    /// Player character for the campaign
    #[arg(long, requires = "campaign")]
    player: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rpgd=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let seed = match (args.campaign, args.player) {
        (Some(name), player_name) => Some(SeedCampaign { name, player_name }),
        (None, Some(_)) => bail!("--player needs --campaign"),
        (None, None) => None,
    };

    if let Some(campaign) = init_database(&args.database, seed).await? {
        println!("Campaign ID: {}", campaign.id);
    }

    Ok(())
}
