//! Bestiary templates
//!
//! Entries are written once and never changed; each fight rolls fresh
//! stats from them.

use std::collections::BTreeMap;

use tracing::info;

use crate::combat::ThreatLevel;
use crate::error::ToolError;
use crate::store::Repositories;
use crate::world::BestiaryEntry;

/// Bestiary operations for a campaign store
pub struct BestiaryService {
    repos: Repositories,
}

impl BestiaryService {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    /// Add a creature template unless one with the same name exists
    pub async fn create_entry(
        &self,
        campaign_id: &str,
        name: &str,
        threat_level: &str,
        hp: &str,
        weapons: BTreeMap<String, String>,
    ) -> Result<String, ToolError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ToolError::InvalidArgument(
                "Creature name is required.".to_string(),
            ));
        }
        let threat_level: ThreatLevel = threat_level.parse().map_err(|_| {
            let levels: Vec<String> = ThreatLevel::all().iter().map(|t| t.to_string()).collect();
            ToolError::InvalidArgument(format!(
                "Unknown threat level '{}'. Use one of: {}",
                threat_level,
                levels.join(", ")
            ))
        })?;
        if hp.trim().is_empty() {
            return Err(ToolError::InvalidArgument(
                "HP formula is required (e.g. '2d6').".to_string(),
            ));
        }

        let entry = BestiaryEntry {
            threat_level,
            hp: hp.trim().to_string(),
            weapons,
        };

        if let Some(existing) = self
            .repos
            .bestiary
            .insert_entry(campaign_id, name, &entry)
            .await?
        {
            return Err(ToolError::AlreadyExists {
                kind: "Bestiary entry",
                name: name.to_string(),
                details: format!(
                    "Existing: {}, {} HP, {}. Use get_bestiary to view.",
                    existing.threat_level,
                    existing.hp,
                    existing.weapon_summary()
                ),
            });
        }
        info!("Added {} to bestiary of campaign {}", name, campaign_id);

        Ok(format!(
            "Bestiary entry '{}' created successfully!\n\nThreat Level: {}\nHP: {}\nWeapons: {}",
            name,
            entry.threat_level,
            entry.hp,
            entry.weapon_summary()
        ))
    }

    /// Every creature template, one line each
    pub async fn get_bestiary(&self, campaign_id: &str) -> Result<String, ToolError> {
        let bestiary = self.repos.bestiary.get_bestiary(campaign_id).await?;
        if bestiary.is_empty() {
            return Ok("The bestiary is empty.".to_string());
        }

        let mut lines = vec![format!("Bestiary ({}):", bestiary.len())];
        for (name, entry) in &bestiary {
            lines.push(format!(
                "- {}: {} threat, {} HP, weapons: {}",
                name,
                entry.threat_level,
                entry.hp,
                entry.weapon_summary()
            ));
        }
        Ok(lines.join("\n"))
    }
}
