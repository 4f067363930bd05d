//! NPC records, inventories and quest entries

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::slug::slugify;

/// Health given to an NPC created without one
pub const DEFAULT_MAX_HEALTH: i32 = 20;

/// Hit chance given to an NPC created without one
pub const DEFAULT_HIT_CHANCE: u32 = 50;

/// Storage key of an NPC document
pub fn npc_key(slug: &str) -> String {
    format!("npc-{}", slug)
}

/// An item carried by an NPC or the player
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub description: String,
    pub source: String,
    /// Whether the item is a proper weapon
    #[serde(rename = "weapon", default)]
    pub is_weapon: bool,
    /// Damage formula, meaningful only for weapons
    #[serde(rename = "damage", default, skip_serializing_if = "Option::is_none")]
    pub damage_formula: Option<String>,
}

impl Item {
    /// A weapon handed out at creation time
    pub fn starting_weapon(name: &str, damage: &str) -> Self {
        Self {
            description: format!("A {}", name.to_lowercase()),
            source: "starting equipment".to_string(),
            is_weapon: true,
            damage_formula: Some(damage.to_string()),
        }
    }

    /// Damage formula if this item can be wielded as a proper weapon
    pub fn weapon_damage(&self) -> Option<&str> {
        if !self.is_weapon {
            return None;
        }
        self.damage_formula.as_deref().filter(|d| !d.trim().is_empty())
    }
}

/// Money and items
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    #[serde(default)]
    pub money: i64,
    #[serde(default)]
    pub items: BTreeMap<String, Item>,
}

impl Inventory {
    /// Find an item by name: exact first, then case-insensitive
    pub fn find_item(&self, name: &str) -> Option<(&str, &Item)> {
        if let Some((key, item)) = self.items.get_key_value(name) {
            return Some((key.as_str(), item));
        }
        let lower = name.to_lowercase();
        self.items
            .iter()
            .find(|(key, _)| key.to_lowercase() == lower)
            .map(|(key, item)| (key.as_str(), item))
    }

    /// Item names in display order
    pub fn item_names(&self) -> Vec<&str> {
        self.items.keys().map(|k| k.as_str()).collect()
    }
}

/// A task owned by exactly one NPC
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub name: String,
    pub description: String,
    /// Who or what handed out the task; an NPC's display name when
    /// `source_is_npc` is set
    pub source: String,
    pub source_is_npc: bool,
}

/// A persisted non-player character
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Npc {
    pub name: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub arc: String,
    #[serde(default = "default_max_health")]
    pub health: i32,
    #[serde(default = "default_max_health")]
    pub max_health: i32,
    #[serde(default = "default_hit_chance")]
    pub hit_chance: u32,
    #[serde(default)]
    pub inventory: Inventory,
    #[serde(default)]
    pub insights: Vec<String>,
    #[serde(default)]
    pub todos: Vec<Todo>,
}

fn default_max_health() -> i32 {
    DEFAULT_MAX_HEALTH
}

fn default_hit_chance() -> u32 {
    DEFAULT_HIT_CHANCE
}

impl Npc {
    /// Create an NPC at full health with an empty inventory
    pub fn new(name: &str, keywords: Vec<String>, arc: &str) -> Self {
        Self {
            name: name.to_string(),
            keywords,
            arc: arc.to_string(),
            health: DEFAULT_MAX_HEALTH,
            max_health: DEFAULT_MAX_HEALTH,
            hit_chance: DEFAULT_HIT_CHANCE,
            inventory: Inventory::default(),
            insights: Vec::new(),
            todos: Vec::new(),
        }
    }

    /// Storage slug derived from the display name
    pub fn slug(&self) -> String {
        slugify(&self.name)
    }

    /// Set health, clamped into `[0, max_health]`
    pub fn set_health(&mut self, health: i32) {
        self.health = health.clamp(0, self.max_health.max(0));
    }
}

/// One row of the per-campaign NPC index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NpcIndexEntry {
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Storage key of the NPC document
    #[serde(alias = "file")]
    pub key: String,
}

impl NpcIndexEntry {
    /// Index entry for an NPC stored under `slug`
    pub fn new(slug: &str, keywords: Vec<String>) -> Self {
        Self {
            keywords,
            key: npc_key(slug),
        }
    }

    /// Case-insensitive keyword match
    pub fn matches_keyword(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        self.keywords.iter().any(|k| k.to_lowercase() == term)
    }
}

/// Slug -> index entry
pub type NpcIndex = BTreeMap<String, NpcIndexEntry>;
