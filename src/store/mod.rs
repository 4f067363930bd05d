//! Repository layer - one capability trait per entity
//!
//! Services depend on these traits, never on the storage engine. The only
//! adapter is [`SqliteRepository`], which keeps every entity as a JSON
//! document in the `documents` table.

mod documents;
mod sqlite;

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::combat::CombatState;
use crate::world::{Bestiary, BestiaryEntry, Campaign, Npc, NpcIndex, Player};

pub use documents::{DocumentStore, DocumentTxn, GLOBAL_SCOPE};
pub use sqlite::SqliteRepository;

/// Campaign metadata and the global campaign list
#[async_trait]
pub trait CampaignRepository: Send + Sync {
    /// Get campaign metadata by ID
    async fn get_campaign(&self, campaign_id: &str) -> Result<Option<Campaign>>;

    /// Register a new campaign: metadata, player, empty NPC index and list entry
    async fn create_campaign(&self, campaign: &Campaign, player: Option<&Player>) -> Result<()>;

    /// All campaigns as campaign ID -> slug
    async fn list_campaigns(&self) -> Result<BTreeMap<String, String>>;

    /// Remove a campaign and everything stored under it
    async fn delete_campaign(&self, campaign_id: &str) -> Result<bool>;
}

/// The player character document. Saving the player's NPC record keeps it current.
#[async_trait]
pub trait PlayerRepository: Send + Sync {
    async fn get_player(&self, campaign_id: &str) -> Result<Option<Player>>;
}

/// NPC documents and the keyword index
#[async_trait]
pub trait NpcRepository: Send + Sync {
    /// Get an NPC by slug
    async fn get_npc(&self, campaign_id: &str, slug: &str) -> Result<Option<Npc>>;

    /// Replace an existing NPC document, mirroring it into the player sheet
    /// when it is the player's record
    async fn save_npc(&self, campaign_id: &str, slug: &str, npc: &Npc) -> Result<()>;

    /// Write an NPC and its index entry together.
    /// Returns false (and writes nothing) if the slug is taken.
    async fn create_npc(&self, campaign_id: &str, slug: &str, npc: &Npc) -> Result<bool>;

    /// Slug -> keywords and storage key
    async fn get_npc_index(&self, campaign_id: &str) -> Result<NpcIndex>;

    /// Delete an NPC document and its index entry together
    async fn delete_npc(&self, campaign_id: &str, slug: &str) -> Result<bool>;
}

/// Creature templates
#[async_trait]
pub trait BestiaryRepository: Send + Sync {
    async fn get_bestiary(&self, campaign_id: &str) -> Result<Bestiary>;

    /// Case-insensitive lookup by creature name
    async fn get_entry(&self, campaign_id: &str, name: &str) -> Result<Option<BestiaryEntry>>;

    /// Insert an entry unless the name is taken.
    /// Returns the existing entry when it is.
    async fn insert_entry(
        &self,
        campaign_id: &str,
        name: &str,
        entry: &BestiaryEntry,
    ) -> Result<Option<BestiaryEntry>>;
}

/// The active encounter; presence of the document means combat is on
#[async_trait]
pub trait CombatRepository: Send + Sync {
    async fn get_combat_state(&self, campaign_id: &str) -> Result<Option<CombatState>>;

    async fn save_combat_state(&self, campaign_id: &str, state: &CombatState) -> Result<()>;

    async fn delete_combat_state(&self, campaign_id: &str) -> Result<bool>;

    async fn has_combat(&self, campaign_id: &str) -> Result<bool> {
        Ok(self.get_combat_state(campaign_id).await?.is_some())
    }
}

/// Repository handles injected into the services
#[derive(Clone)]
pub struct Repositories {
    pub campaigns: Arc<dyn CampaignRepository>,
    pub players: Arc<dyn PlayerRepository>,
    pub npcs: Arc<dyn NpcRepository>,
    pub bestiary: Arc<dyn BestiaryRepository>,
    pub combat: Arc<dyn CombatRepository>,
}

impl Repositories {
    /// All repositories backed by one SQLite document store
    pub fn sqlite(pool: SqlitePool) -> Self {
        let repo = Arc::new(SqliteRepository::new(pool));
        Self {
            campaigns: repo.clone(),
            players: repo.clone(),
            npcs: repo.clone(),
            bestiary: repo.clone(),
            combat: repo,
        }
    }
}
