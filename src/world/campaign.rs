//! Campaign metadata and the player character

use serde::{Deserialize, Serialize};

use super::npc::Inventory;

/// Reference to the campaign's designated player
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRef {
    pub name: String,
}

/// Campaign metadata document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Campaign {
    pub id: String,
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// The player is never deleted when slain
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player: Option<PlayerRef>,
    /// Free-form metadata supplied by the caller
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
    pub created_at: String,
}

impl Campaign {
    /// Whether `name` is the designated player (case-insensitive)
    pub fn is_player(&self, name: &str) -> bool {
        self.player
            .as_ref()
            .is_some_and(|p| p.name.to_lowercase() == name.to_lowercase())
    }
}

/// The player character document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub name: String,
    pub health: i32,
    pub max_health: i32,
    #[serde(default)]
    pub inventory: Inventory,
}
