//! NPC lifecycle
//!
//! Handles NPC records outside of combat:
//! - Creation with starting weapons and keyword indexing
//! - Healing, mirrored into an active encounter
//! - Inventory and money
//! - Listing and inspection

mod inventory;

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::info;

use crate::combat::{health_description, healing_descriptor, resolve_npc, CombatEngine, Dice};
use crate::error::ToolError;
use crate::store::Repositories;
use crate::world::{npc_key, slugify, Item, Npc, DEFAULT_HIT_CHANCE, DEFAULT_MAX_HEALTH};

pub use inventory::{ItemUpdate, NewItem};

/// Source named when a heal does not say where it came from
pub const DEFAULT_HEAL_SOURCE: &str = "healing";

/// Arguments for creating an NPC
#[derive(Debug, Clone, Default)]
pub struct NewNpc {
    pub name: String,
    pub keywords: Vec<String>,
    pub arc: String,
    pub health: Option<i32>,
    pub max_health: Option<i32>,
    pub hit_chance: Option<u32>,
    /// Weapon name -> damage formula
    pub weapons: BTreeMap<String, String>,
}

/// NPC operations for a campaign store
pub struct NpcService {
    repos: Repositories,
    combat: Arc<CombatEngine>,
    dice: Dice,
}

impl NpcService {
    /// Create a new NPC service
    pub fn new(repos: Repositories, combat: Arc<CombatEngine>, dice: Dice) -> Self {
        Self { repos, combat, dice }
    }

    /// Find an NPC by name or keyword, or fail with NotFound
    pub async fn require(&self, campaign_id: &str, name: &str) -> Result<(String, Npc), ToolError> {
        resolve_npc(self.repos.npcs.as_ref(), campaign_id, name)
            .await?
            .ok_or_else(|| ToolError::npc_not_found(name))
    }

    /// Create an NPC and register its keywords
    pub async fn create_npc(&self, campaign_id: &str, new: NewNpc) -> Result<String, ToolError> {
        let name = new.name.trim();
        let slug = slugify(name);
        if slug.is_empty() {
            return Err(ToolError::InvalidArgument(
                "NPC name must contain at least one letter or digit.".to_string(),
            ));
        }

        let max_health = new.max_health.unwrap_or(DEFAULT_MAX_HEALTH);
        if max_health < 1 {
            return Err(ToolError::InvalidArgument(format!(
                "max_health must be at least 1 (got {}).",
                max_health
            )));
        }
        let hit_chance = new.hit_chance.unwrap_or(DEFAULT_HIT_CHANCE);
        if !(1..=100).contains(&hit_chance) {
            return Err(ToolError::InvalidArgument(format!(
                "hit_chance must be between 1 and 100 (got {}).",
                hit_chance
            )));
        }

        let mut npc = Npc::new(name, new.keywords, &new.arc);
        npc.max_health = max_health;
        npc.set_health(new.health.unwrap_or(max_health));
        npc.hit_chance = hit_chance;
        for (weapon, damage) in &new.weapons {
            npc.inventory
                .items
                .insert(weapon.clone(), Item::starting_weapon(weapon, damage));
        }

        if !self.repos.npcs.create_npc(campaign_id, &slug, &npc).await? {
            return Err(ToolError::AlreadyExists {
                kind: "NPC",
                name: name.to_string(),
                details: "Use get_npc or list_npcs to view existing NPCs.".to_string(),
            });
        }
        info!("Created NPC {} ({}) in campaign {}", npc.name, slug, campaign_id);

        let mut message = format!(
            "NPC '{}' created successfully!\n\nFile: {}.json\nKeywords: {}",
            npc.name,
            npc_key(&slug),
            npc.keywords.join(", ")
        );
        if !new.weapons.is_empty() {
            let weapons: Vec<String> = new
                .weapons
                .iter()
                .map(|(w, d)| format!("{} ({})", w, d))
                .collect();
            message.push_str(&format!("\nWeapons: {}", weapons.join(", ")));
        }
        Ok(message)
    }

    /// Roll healing for an NPC, capped at max health
    pub async fn heal_npc(
        &self,
        campaign_id: &str,
        npc_name: &str,
        heal_dice: &str,
        source: Option<&str>,
    ) -> Result<String, ToolError> {
        let (slug, mut npc) = self.require(campaign_id, npc_name).await?;
        let source = source.unwrap_or(DEFAULT_HEAL_SOURCE).trim();
        let from = if source.is_empty() {
            String::new()
        } else {
            format!(" from {}", source)
        };

        let amount = self.dice.roll(heal_dice).max(0);
        let old_health = npc.health;

        if old_health >= npc.max_health {
            return Ok(format!(
                "{} receives healing{}, but is already in perfect health.",
                npc.name, from
            ));
        }

        npc.set_health(old_health.saturating_add(amount));
        self.repos.npcs.save_npc(campaign_id, &slug, &npc).await?;
        self.combat
            .sync_combat_health(campaign_id, &npc.name, npc.health)
            .await?;

        let mut lines = vec![format!(
            "{} receives {}{}.",
            npc.name,
            healing_descriptor(amount, heal_dice),
            from
        )];
        if npc.health >= npc.max_health {
            lines.push(format!("{} is fully restored to perfect health.", npc.name));
        } else {
            lines.push(format!(
                "{} recovers from {} to {}.",
                npc.name,
                health_description(old_health, npc.max_health),
                health_description(npc.health, npc.max_health)
            ));
        }
        Ok(lines.join("\n"))
    }

    /// One line per NPC: name and keywords
    pub async fn list_npcs(&self, campaign_id: &str) -> Result<String, ToolError> {
        let index = self.repos.npcs.get_npc_index(campaign_id).await?;
        if index.is_empty() {
            return Ok("No NPCs in this campaign.".to_string());
        }

        let mut lines = vec![format!("NPCs ({}):", index.len())];
        for slug in index.keys() {
            let Some(npc) = self.repos.npcs.get_npc(campaign_id, slug).await? else {
                continue;
            };
            let state = health_description(npc.health, npc.max_health);
            if npc.keywords.is_empty() {
                lines.push(format!("- {} ({})", npc.name, state));
            } else {
                lines.push(format!(
                    "- {} ({}) [{}]",
                    npc.name,
                    state,
                    npc.keywords.join(", ")
                ));
            }
        }
        Ok(lines.join("\n"))
    }

    /// Full sheet of one NPC
    pub async fn get_npc(&self, campaign_id: &str, name: &str) -> Result<String, ToolError> {
        let (_, npc) = self.require(campaign_id, name).await?;
        Ok(render_npc(&npc))
    }
}

fn render_npc(npc: &Npc) -> String {
    let mut out = vec![
        format!("Name: {}", npc.name),
        format!("Keywords: {}", npc.keywords.join(", ")),
        format!(
            "Condition: {}",
            health_description(npc.health, npc.max_health)
        ),
        format!("Hit chance: {}%", npc.hit_chance),
    ];

    if !npc.arc.is_empty() {
        out.push(String::new());
        out.push(format!("Arc: {}", npc.arc));
    }

    out.push(String::new());
    out.push(inventory::render(&npc.inventory));

    if !npc.insights.is_empty() {
        out.push(String::new());
        out.push("Insights:".to_string());
        out.extend(npc.insights.iter().map(|i| format!("- {}", i)));
    }

    if !npc.todos.is_empty() {
        out.push(String::new());
        out.push("Todos:".to_string());
        out.extend(
            npc.todos
                .iter()
                .map(|t| format!("- {}: {} (from {})", t.name, t.description, t.source)),
        );
    }

    out.join("\n")
}
