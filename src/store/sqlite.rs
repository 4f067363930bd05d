//! SQLite adapter for every repository trait

use std::collections::BTreeMap;

use anyhow::Result;
use async_trait::async_trait;
use sqlx::SqlitePool;
use tracing::debug;

use super::documents::{DocumentStore, GLOBAL_SCOPE};
use super::{
    BestiaryRepository, CampaignRepository, CombatRepository, NpcRepository, PlayerRepository,
};
use crate::combat::CombatState;
use crate::world::{
    creature_key, npc_key, slugify, Bestiary, BestiaryEntry, Campaign, Npc, NpcIndex, NpcIndexEntry, Player,
};

const CAMPAIGN_LIST_KEY: &str = "campaign-list";
const CAMPAIGN_KEY: &str = "campaign";
const PLAYER_KEY: &str = "player";
const NPC_INDEX_KEY: &str = "npcs";
const BESTIARY_KEY: &str = "bestiary";
const COMBAT_KEY: &str = "combat";

/// Repository adapter over the keyed document store
pub struct SqliteRepository {
    docs: DocumentStore,
}

impl SqliteRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            docs: DocumentStore::new(pool),
        }
    }
}

#[async_trait]
impl CampaignRepository for SqliteRepository {
    async fn get_campaign(&self, campaign_id: &str) -> Result<Option<Campaign>> {
        self.docs.get(campaign_id, CAMPAIGN_KEY).await
    }

    async fn create_campaign(&self, campaign: &Campaign, player: Option<&Player>) -> Result<()> {
        let mut txn = self.docs.begin().await?;

        let mut list: BTreeMap<String, String> = txn
            .get(GLOBAL_SCOPE, CAMPAIGN_LIST_KEY)
            .await?
            .unwrap_or_default();
        list.insert(campaign.id.clone(), campaign.slug.clone());

        txn.put(&campaign.id, CAMPAIGN_KEY, campaign).await?;
        txn.put(&campaign.id, NPC_INDEX_KEY, &NpcIndex::new()).await?;
        if let Some(player) = player {
            txn.put(&campaign.id, PLAYER_KEY, player).await?;
        }
        txn.put(GLOBAL_SCOPE, CAMPAIGN_LIST_KEY, &list).await?;
        txn.commit().await?;

        debug!("Stored campaign {} ({})", campaign.id, campaign.slug);
        Ok(())
    }

    async fn list_campaigns(&self) -> Result<BTreeMap<String, String>> {
        Ok(self
            .docs
            .get(GLOBAL_SCOPE, CAMPAIGN_LIST_KEY)
            .await?
            .unwrap_or_default())
    }

    async fn delete_campaign(&self, campaign_id: &str) -> Result<bool> {
        let mut txn = self.docs.begin().await?;

        let mut list: BTreeMap<String, String> = txn
            .get(GLOBAL_SCOPE, CAMPAIGN_LIST_KEY)
            .await?
            .unwrap_or_default();
        let listed = list.remove(campaign_id).is_some();
        let removed = txn.delete_scope(campaign_id).await?;

        txn.put(GLOBAL_SCOPE, CAMPAIGN_LIST_KEY, &list).await?;
        txn.commit().await?;

        debug!("Deleted campaign {} ({} documents)", campaign_id, removed);
        Ok(listed || removed > 0)
    }
}

#[async_trait]
impl PlayerRepository for SqliteRepository {
    async fn get_player(&self, campaign_id: &str) -> Result<Option<Player>> {
        self.docs.get(campaign_id, PLAYER_KEY).await
    }
}

#[async_trait]
impl NpcRepository for SqliteRepository {
    async fn get_npc(&self, campaign_id: &str, slug: &str) -> Result<Option<Npc>> {
        self.docs.get(campaign_id, &npc_key(slug)).await
    }

    async fn save_npc(&self, campaign_id: &str, slug: &str, npc: &Npc) -> Result<()> {
        let mut txn = self.docs.begin().await?;
        txn.put(campaign_id, &npc_key(slug), npc).await?;

        // The player sheet mirrors the player's NPC record
        if let Some(mut player) = txn.get::<Player>(campaign_id, PLAYER_KEY).await? {
            if slugify(&player.name) == slug {
                player.health = npc.health;
                player.max_health = npc.max_health;
                player.inventory = npc.inventory.clone();
                txn.put(campaign_id, PLAYER_KEY, &player).await?;
                debug!("Mirrored {} into the player sheet", npc.name);
            }
        }

        txn.commit().await
    }

    async fn create_npc(&self, campaign_id: &str, slug: &str, npc: &Npc) -> Result<bool> {
        let key = npc_key(slug);
        let mut txn = self.docs.begin().await?;

        if txn.get::<Npc>(campaign_id, &key).await?.is_some() {
            return Ok(false);
        }

        let mut index: NpcIndex = txn
            .get(campaign_id, NPC_INDEX_KEY)
            .await?
            .unwrap_or_default();
        index.insert(slug.to_string(), NpcIndexEntry::new(slug, npc.keywords.clone()));

        txn.put(campaign_id, &key, npc).await?;
        txn.put(campaign_id, NPC_INDEX_KEY, &index).await?;
        txn.commit().await?;

        Ok(true)
    }

    async fn get_npc_index(&self, campaign_id: &str) -> Result<NpcIndex> {
        Ok(self
            .docs
            .get(campaign_id, NPC_INDEX_KEY)
            .await?
            .unwrap_or_default())
    }

    async fn delete_npc(&self, campaign_id: &str, slug: &str) -> Result<bool> {
        let mut txn = self.docs.begin().await?;

        let existed = txn.delete(campaign_id, &npc_key(slug)).await?;
        let mut index: NpcIndex = txn
            .get(campaign_id, NPC_INDEX_KEY)
            .await?
            .unwrap_or_default();
        if index.remove(slug).is_some() {
            txn.put(campaign_id, NPC_INDEX_KEY, &index).await?;
        }
        txn.commit().await?;

        Ok(existed)
    }
}

#[async_trait]
impl BestiaryRepository for SqliteRepository {
    async fn get_bestiary(&self, campaign_id: &str) -> Result<Bestiary> {
        Ok(self
            .docs
            .get(campaign_id, BESTIARY_KEY)
            .await?
            .unwrap_or_default())
    }

    async fn get_entry(&self, campaign_id: &str, name: &str) -> Result<Option<BestiaryEntry>> {
        let mut bestiary = self.get_bestiary(campaign_id).await?;
        Ok(bestiary.remove(&creature_key(name)))
    }

    async fn insert_entry(
        &self,
        campaign_id: &str,
        name: &str,
        entry: &BestiaryEntry,
    ) -> Result<Option<BestiaryEntry>> {
        let key = creature_key(name);
        let mut txn = self.docs.begin().await?;

        let mut bestiary: Bestiary = txn
            .get(campaign_id, BESTIARY_KEY)
            .await?
            .unwrap_or_default();
        if let Some(existing) = bestiary.get(&key) {
            return Ok(Some(existing.clone()));
        }

        bestiary.insert(key, entry.clone());
        txn.put(campaign_id, BESTIARY_KEY, &bestiary).await?;
        txn.commit().await?;

        Ok(None)
    }
}

#[async_trait]
impl CombatRepository for SqliteRepository {
    async fn get_combat_state(&self, campaign_id: &str) -> Result<Option<CombatState>> {
        self.docs.get(campaign_id, COMBAT_KEY).await
    }

    async fn save_combat_state(&self, campaign_id: &str, state: &CombatState) -> Result<()> {
        self.docs.put(campaign_id, COMBAT_KEY, state).await
    }

    async fn delete_combat_state(&self, campaign_id: &str) -> Result<bool> {
        self.docs.delete(campaign_id, COMBAT_KEY).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::{Participant, ThreatLevel};
    use crate::db::test_utils::test_pool;
    use crate::world::PlayerRef;

    async fn repo() -> SqliteRepository {
        SqliteRepository::new(test_pool().await)
    }

    fn campaign(id: &str) -> Campaign {
        Campaign {
            id: id.to_string(),
            slug: "test-campaign".to_string(),
            name: "Test Campaign".to_string(),
            description: "A test campaign".to_string(),
            player: Some(PlayerRef {
                name: "Hero".to_string(),
            }),
            metadata: Default::default(),
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    #[tokio::test]
    async fn test_campaign_lifecycle() {
        let repo = repo().await;
        let player = Player {
            name: "Hero".to_string(),
            health: 30,
            max_health: 30,
            inventory: Default::default(),
        };

        repo.create_campaign(&campaign("test-123"), Some(&player))
            .await
            .unwrap();

        let stored = repo.get_campaign("test-123").await.unwrap().unwrap();
        assert_eq!(stored.name, "Test Campaign");
        assert_eq!(
            repo.list_campaigns().await.unwrap().get("test-123"),
            Some(&"test-campaign".to_string())
        );
        assert_eq!(repo.get_player("test-123").await.unwrap(), Some(player));

        assert!(repo.delete_campaign("test-123").await.unwrap());
        assert!(repo.get_campaign("test-123").await.unwrap().is_none());
        assert!(repo.list_campaigns().await.unwrap().is_empty());
        assert!(!repo.delete_campaign("test-123").await.unwrap());
    }

    #[tokio::test]
    async fn test_get_campaign_not_found() {
        let repo = repo().await;
        assert!(repo.get_campaign("nonexistent-123").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_npc_updates_index() {
        let repo = repo().await;
        let npc = Npc::new("Steve", vec!["steve".into(), "blacksmith".into()], "A smith");

        assert!(repo.create_npc("c1", "steve", &npc).await.unwrap());

        let stored = repo.get_npc("c1", "steve").await.unwrap().unwrap();
        assert_eq!(stored.arc, "A smith");

        let index = repo.get_npc_index("c1").await.unwrap();
        assert_eq!(index["steve"].keywords, vec!["steve", "blacksmith"]);
        assert_eq!(index["steve"].key, "npc-steve");
    }

    #[tokio::test]
    async fn test_create_npc_refuses_duplicate() {
        let repo = repo().await;
        let npc = Npc::new("Steve", vec![], "");
        assert!(repo.create_npc("c1", "steve", &npc).await.unwrap());

        let mut other = npc.clone();
        other.arc = "Impostor".to_string();
        assert!(!repo.create_npc("c1", "steve", &other).await.unwrap());
        assert_eq!(repo.get_npc("c1", "steve").await.unwrap().unwrap().arc, "");
    }

    #[tokio::test]
    async fn test_delete_npc_removes_index_entry() {
        let repo = repo().await;
        repo.create_npc("c1", "bob", &Npc::new("Bob", vec!["bob".into()], ""))
            .await
            .unwrap();

        assert!(repo.delete_npc("c1", "bob").await.unwrap());
        assert!(repo.get_npc("c1", "bob").await.unwrap().is_none());
        assert!(!repo.get_npc_index("c1").await.unwrap().contains_key("bob"));
    }

    #[tokio::test]
    async fn test_save_npc_updates_existing() {
        let repo = repo().await;
        let mut npc = Npc::new("Alice", vec![], "");
        repo.create_npc("c1", "alice", &npc).await.unwrap();

        npc.health = 15;
        repo.save_npc("c1", "alice", &npc).await.unwrap();
        assert_eq!(repo.get_npc("c1", "alice").await.unwrap().unwrap().health, 15);
    }

    #[tokio::test]
    async fn test_save_npc_mirrors_player_sheet() {
        let repo = repo().await;
        let player = Player {
            name: "Hero".to_string(),
            health: 20,
            max_health: 20,
            inventory: Default::default(),
        };
        repo.create_campaign(&campaign("c1"), Some(&player))
            .await
            .unwrap();

        let mut hero = Npc::new("Hero", vec!["hero".into(), "player".into()], "");
        repo.create_npc("c1", "hero", &hero).await.unwrap();
        let mut bob = Npc::new("Bob", vec![], "");
        repo.create_npc("c1", "bob", &bob).await.unwrap();

        hero.health = 7;
        hero.inventory.money = 12;
        repo.save_npc("c1", "hero", &hero).await.unwrap();
        bob.health = 1;
        repo.save_npc("c1", "bob", &bob).await.unwrap();

        let sheet = repo.get_player("c1").await.unwrap().unwrap();
        assert_eq!(sheet.health, 7);
        assert_eq!(sheet.max_health, 20);
        assert_eq!(sheet.inventory.money, 12);
    }

    #[tokio::test]
    async fn test_bestiary_entry_lookup_is_case_insensitive() {
        let repo = repo().await;
        assert!(repo.get_bestiary("c1").await.unwrap().is_empty());

        let entry = BestiaryEntry {
            threat_level: ThreatLevel::Deadly,
            hp: "10d10".to_string(),
            weapons: [("Fire Breath".to_string(), "4d6".to_string())].into(),
        };
        assert!(repo.insert_entry("c1", "Dragon", &entry).await.unwrap().is_none());

        let found = repo.get_entry("c1", "dRaGoN").await.unwrap().unwrap();
        assert_eq!(found.threat_level, ThreatLevel::Deadly);
        assert!(repo.get_entry("c1", "unicorn").await.unwrap().is_none());

        let again = repo.insert_entry("c1", "dragon", &entry).await.unwrap();
        assert_eq!(again, Some(entry));
    }

    #[tokio::test]
    async fn test_combat_presence_is_the_active_flag() {
        let repo = repo().await;
        assert!(!repo.has_combat("c1").await.unwrap());

        let mut state = CombatState::new();
        state.seed("Steve", Participant::new(20, 20, 50, "Steve"));
        repo.save_combat_state("c1", &state).await.unwrap();
        assert!(repo.has_combat("c1").await.unwrap());
        assert_eq!(repo.get_combat_state("c1").await.unwrap(), Some(state));

        assert!(repo.delete_combat_state("c1").await.unwrap());
        assert!(!repo.has_combat("c1").await.unwrap());
    }
}
