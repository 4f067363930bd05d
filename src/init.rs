//! Database initialization module
//!
//! Provides one-time database setup for the rpgd_init tool.

use std::path::Path;

use anyhow::{anyhow, bail, Result};
use tracing::info;

use crate::campaign::{CampaignService, NewCampaign};
use crate::db::Database;
use crate::store::Repositories;
use crate::world::Campaign;

/// A campaign to create alongside the database
#[derive(Debug, Clone)]
pub struct SeedCampaign {
    pub name: String,
    pub player_name: Option<String>,
}

/// Initialize a new campaign database
///
/// # Arguments
/// * `path` - Path to the SQLite database file (must not exist)
/// * `seed` - Optional campaign to create
///
/// # Errors
/// * Database file already exists
/// * Database creation fails
/// * Seed campaign is invalid
pub async fn init_database(path: &Path, seed: Option<SeedCampaign>) -> Result<Option<Campaign>> {
    // Fail if database already exists
    if path.exists() {
        bail!(
            "Database file already exists: {}. Remove it first or use a different path.",
            path.display()
        );
    }
    let path_str = path
        .to_str()
        .ok_or_else(|| anyhow!("Database path is not valid UTF-8: {}", path.display()))?;

    info!("Creating new database at {}", path.display());

    // Create the database (runs migrations)
    let db = Database::new(Some(path_str)).await?;

    let mut created = None;
    if let Some(seed) = seed {
        let service = CampaignService::new(Repositories::sqlite(db.pool().clone()));
        let (campaign, _) = service
            .begin_campaign(NewCampaign {
                name: seed.name,
                player_name: seed.player_name,
                ..Default::default()
            })
            .await
            .map_err(|e| anyhow!("{}", e))?;
        info!("Created campaign '{}' ({})", campaign.name, campaign.id);
        created = Some(campaign);
    }

    db.pool().close().await;
    info!("Database initialization complete");
    Ok(created)
}
