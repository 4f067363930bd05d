//! Bestiary templates

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::combat::ThreatLevel;

/// Key a creature is stored under
pub fn creature_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Immutable creature template, rolled into fresh stats for each fight
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BestiaryEntry {
    pub threat_level: ThreatLevel,
    /// Hit point formula in dice notation
    pub hp: String,
    /// Weapon name -> damage formula
    #[serde(default)]
    pub weapons: BTreeMap<String, String>,
}

impl BestiaryEntry {
    /// Damage formula of a weapon, matched exactly
    pub fn weapon(&self, name: &str) -> Option<&str> {
        self.weapons.get(name).map(|s| s.as_str())
    }

    /// "dagger (1d4), bite (1d6)"
    pub fn weapon_summary(&self) -> String {
        if self.weapons.is_empty() {
            return "none".to_string();
        }
        self.weapons
            .iter()
            .map(|(w, d)| format!("{} ({})", w, d))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Creature key -> template
pub type Bestiary = BTreeMap<String, BestiaryEntry>;
