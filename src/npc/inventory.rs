//! NPC inventory and money

use tracing::debug;

use super::NpcService;
use crate::error::ToolError;
use crate::world::{Inventory, Item};

/// Source recorded when an item's provenance is not given
const DEFAULT_ITEM_SOURCE: &str = "found";

/// Arguments for giving an NPC an item
#[derive(Debug, Clone, Default)]
pub struct NewItem {
    pub name: String,
    pub description: String,
    pub source: Option<String>,
    pub is_weapon: bool,
    /// Required for weapons
    pub damage: Option<String>,
}

/// Changes to an item an NPC already carries; `None` leaves a field as is
#[derive(Debug, Clone, Default)]
pub struct ItemUpdate {
    pub description: Option<String>,
    pub is_weapon: Option<bool>,
    pub damage: Option<String>,
}

impl NpcService {
    /// Give an NPC an item
    pub async fn add_item(
        &self,
        campaign_id: &str,
        npc_name: &str,
        new: NewItem,
    ) -> Result<String, ToolError> {
        let (slug, mut npc) = self.require(campaign_id, npc_name).await?;

        let item_name = new.name.trim();
        if item_name.is_empty() {
            return Err(ToolError::InvalidArgument("Item name is required.".to_string()));
        }
        if let Some((existing, _)) = npc.inventory.find_item(item_name) {
            return Err(ToolError::AlreadyExists {
                kind: "Item",
                name: item_name.to_string(),
                details: format!("{} already carries '{}'.", npc.name, existing),
            });
        }

        let damage = new
            .damage
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty());
        if new.is_weapon && damage.is_none() {
            return Err(ToolError::InvalidArgument(
                "Weapons need a damage formula (e.g. '1d8').".to_string(),
            ));
        }

        let item = Item {
            description: new.description,
            source: new
                .source
                .unwrap_or_else(|| DEFAULT_ITEM_SOURCE.to_string()),
            is_weapon: new.is_weapon,
            damage_formula: damage.filter(|_| new.is_weapon).map(String::from),
        };
        let summary = item_line(item_name, &item);
        npc.inventory.items.insert(item_name.to_string(), item);
        self.repos.npcs.save_npc(campaign_id, &slug, &npc).await?;

        debug!("{} received {}", npc.name, item_name);
        Ok(format!("Added to {}'s inventory: {}", npc.name, summary))
    }

    /// Take an item away from an NPC
    pub async fn remove_item(
        &self,
        campaign_id: &str,
        npc_name: &str,
        item_name: &str,
    ) -> Result<String, ToolError> {
        let (slug, mut npc) = self.require(campaign_id, npc_name).await?;

        let key = match npc.inventory.find_item(item_name) {
            Some((key, _)) => key.to_string(),
            None => {
                return Err(ToolError::NotFound {
                    kind: "Item",
                    name: item_name.to_string(),
                    hint: format!("{} carries: {}", npc.name, carried(&npc.inventory)),
                })
            }
        };
        npc.inventory.items.remove(&key);
        self.repos.npcs.save_npc(campaign_id, &slug, &npc).await?;

        Ok(format!("Removed '{}' from {}'s inventory.", key, npc.name))
    }

    /// Edit an item in place. Weapons must end up with a damage formula.
    pub async fn update_item(
        &self,
        campaign_id: &str,
        npc_name: &str,
        item_name: &str,
        update: ItemUpdate,
    ) -> Result<String, ToolError> {
        let (slug, mut npc) = self.require(campaign_id, npc_name).await?;

        let (key, mut item) = match npc.inventory.find_item(item_name) {
            Some((key, item)) => (key.to_string(), item.clone()),
            None => {
                return Err(ToolError::NotFound {
                    kind: "Item",
                    name: item_name.to_string(),
                    hint: format!("{} carries: {}", npc.name, carried(&npc.inventory)),
                })
            }
        };

        if let Some(description) = update.description {
            item.description = description;
        }
        if let Some(is_weapon) = update.is_weapon {
            item.is_weapon = is_weapon;
        }
        if let Some(damage) = update.damage {
            let damage = damage.trim();
            item.damage_formula = (!damage.is_empty()).then(|| damage.to_string());
        }

        if item.is_weapon && item.weapon_damage().is_none() {
            return Err(ToolError::InvalidArgument(
                "Weapons need a damage formula (e.g. '1d8').".to_string(),
            ));
        }
        if !item.is_weapon {
            item.damage_formula = None;
        }

        let summary = item_line(&key, &item);
        npc.inventory.items.insert(key, item);
        self.repos.npcs.save_npc(campaign_id, &slug, &npc).await?;

        Ok(format!("Updated {}'s inventory: {}", npc.name, summary))
    }

    /// Show an NPC's money and items
    pub async fn get_inventory(&self, campaign_id: &str, npc_name: &str) -> Result<String, ToolError> {
        let (_, npc) = self.require(campaign_id, npc_name).await?;
        Ok(format!("{}'s inventory:\n{}", npc.name, render(&npc.inventory)))
    }

    /// Add coins to an NPC's purse
    pub async fn add_money(
        &self,
        campaign_id: &str,
        npc_name: &str,
        amount: i64,
    ) -> Result<String, ToolError> {
        require_positive(amount)?;
        let (slug, mut npc) = self.require(campaign_id, npc_name).await?;

        npc.inventory.money = npc.inventory.money.saturating_add(amount);
        self.repos.npcs.save_npc(campaign_id, &slug, &npc).await?;

        Ok(format!(
            "{} gains {} coins. Total: {}",
            npc.name, amount, npc.inventory.money
        ))
    }

    /// Spend coins from an NPC's purse
    pub async fn remove_money(
        &self,
        campaign_id: &str,
        npc_name: &str,
        amount: i64,
    ) -> Result<String, ToolError> {
        require_positive(amount)?;
        let (slug, mut npc) = self.require(campaign_id, npc_name).await?;

        if amount > npc.inventory.money {
            return Err(ToolError::InvalidArgument(format!(
                "{} only has {} coins.",
                npc.name, npc.inventory.money
            )));
        }
        npc.inventory.money -= amount;
        self.repos.npcs.save_npc(campaign_id, &slug, &npc).await?;

        Ok(format!(
            "{} spends {} coins. Remaining: {}",
            npc.name, amount, npc.inventory.money
        ))
    }
}

fn require_positive(amount: i64) -> Result<(), ToolError> {
    if amount <= 0 {
        return Err(ToolError::InvalidArgument(format!(
            "Amount must be positive (got {}).",
            amount
        )));
    }
    Ok(())
}

fn carried(inventory: &Inventory) -> String {
    if inventory.items.is_empty() {
        "nothing".to_string()
    } else {
        inventory.item_names().join(", ")
    }
}

fn item_line(name: &str, item: &Item) -> String {
    let mut line = match item.weapon_damage() {
        Some(damage) => format!("{} (weapon, {})", name, damage),
        None => name.to_string(),
    };
    if !item.description.is_empty() {
        line.push_str(&format!(": {}", item.description));
    }
    line.push_str(&format!(" [{}]", item.source));
    line
}

/// Money line followed by one line per item
pub(super) fn render(inventory: &Inventory) -> String {
    let mut lines = vec![format!("Money: {}", inventory.money)];
    if inventory.items.is_empty() {
        lines.push("Items: none".to_string());
    } else {
        lines.push("Items:".to_string());
        lines.extend(
            inventory
                .items
                .iter()
                .map(|(name, item)| format!("- {}", item_line(name, item))),
        );
    }
    lines.join("\n")
}
