//! Participant resolution
//!
//! Free-text names become canonical combatants in a fixed order: fighters
//! already in the encounter, then NPCs (slug, then keyword), then bestiary
//! creatures by exact name.

use anyhow::Result;

use super::dice::Dice;
use super::state::{CombatState, Participant};
use crate::error::{InventoryKind, ParticipantRole, ToolError};
use crate::store::{NpcRepository, Repositories};
use crate::world::{slugify, BestiaryEntry, Npc};

/// Weapon used when the caller names none
pub const DEFAULT_WEAPON: &str = "unarmed";

/// Damage of an unarmed strike
pub const UNARMED_DAMAGE: &str = "1d4";

/// Damage of a non-weapon item swung in anger
pub const IMPROVISED_DAMAGE: &str = "1d4";

const UNARMED_WORDS: &[&str] = &["fists", "fist", "punch", "kick", "unarmed", "bare hands"];

/// Whether a weapon name means fighting without one
pub fn is_unarmed(weapon: &str) -> bool {
    let w = weapon.trim().to_lowercase();
    UNARMED_WORDS.contains(&w.as_str())
}

/// Find an NPC by slug, then by case-insensitive keyword.
/// Returns the NPC's slug alongside the record.
pub async fn resolve_npc(
    npcs: &dyn NpcRepository,
    campaign_id: &str,
    name: &str,
) -> Result<Option<(String, Npc)>> {
    let slug = slugify(name);
    if !slug.is_empty() {
        if let Some(npc) = npcs.get_npc(campaign_id, &slug).await? {
            return Ok(Some((slug, npc)));
        }
    }

    let index = npcs.get_npc_index(campaign_id).await?;
    for (slug, entry) in &index {
        if !entry.matches_keyword(name) {
            continue;
        }
        if let Some(npc) = npcs.get_npc(campaign_id, slug).await? {
            return Ok(Some((slug.clone(), npc)));
        }
    }

    Ok(None)
}

/// Resolve a name against the NPC registry, then the bestiary.
/// NPCs resolve to their display name, creatures to the name as given.
pub async fn resolve_name(
    repos: &Repositories,
    campaign_id: &str,
    name: &str,
) -> Result<Option<String>> {
    if let Some((_, npc)) = resolve_npc(repos.npcs.as_ref(), campaign_id, name).await? {
        return Ok(Some(npc.name));
    }
    if repos.bestiary.get_entry(campaign_id, name).await?.is_some() {
        return Ok(Some(name.to_string()));
    }
    Ok(None)
}

/// Resolve a combatant, reusing the canonical name of anyone already fighting
pub async fn resolve_participant(
    repos: &Repositories,
    campaign_id: &str,
    state: &CombatState,
    name: &str,
) -> Result<Option<String>> {
    if let Some(existing) = state.find(name) {
        return Ok(Some(existing.to_string()));
    }
    resolve_name(repos, campaign_id, name).await
}

/// Backing record of a combatant
#[derive(Debug, Clone)]
pub enum ParticipantSource {
    /// A persisted NPC, stored under `slug`
    Npc { slug: String, npc: Npc },
    /// A bestiary template
    Creature(BestiaryEntry),
}

impl ParticipantSource {
    /// Look up what backs a canonical name: NPC by slug first, then bestiary
    pub async fn lookup(
        repos: &Repositories,
        campaign_id: &str,
        name: &str,
    ) -> Result<Option<Self>> {
        let slug = slugify(name);
        if let Some(npc) = repos.npcs.get_npc(campaign_id, &slug).await? {
            return Ok(Some(ParticipantSource::Npc { slug, npc }));
        }
        Ok(repos
            .bestiary
            .get_entry(campaign_id, name)
            .await?
            .map(ParticipantSource::Creature))
    }

    /// Stats for entering combat. NPCs bring their persisted health;
    /// creatures roll fresh hit points from their template.
    pub fn seed_stats(&self, team: &str, dice: &Dice) -> Participant {
        match self {
            ParticipantSource::Npc { npc, .. } => {
                Participant::new(npc.health, npc.max_health, npc.hit_chance, team)
            }
            ParticipantSource::Creature(entry) => {
                let max_health = dice.roll(&entry.hp);
                Participant::new(max_health, max_health, entry.threat_level.hit_chance(), team)
            }
        }
    }
}

/// A resolved damage source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Weapon {
    /// Name as the caller gave it
    pub name: String,
    pub formula: String,
    pub improvised: bool,
}

impl Weapon {
    fn new(name: &str, formula: &str, improvised: bool) -> Self {
        Self {
            name: name.to_string(),
            formula: formula.to_string(),
            improvised,
        }
    }

    /// How the weapon reads in combat narration
    pub fn describe(&self) -> String {
        if self.improvised {
            format!("improvised weapon ({})", self.name)
        } else {
            self.name.clone()
        }
    }
}

/// Pick the damage source for an attacker's chosen weapon
///
/// NPCs fight with what they carry: a proper weapon uses its formula and any
/// other item is improvised. An NPC carrying nothing by that name may still
/// fight unarmed. Creatures only ever use their template weapons.
pub fn choose_weapon(
    source: Option<&ParticipantSource>,
    owner: &str,
    weapon: &str,
) -> Result<Weapon, ToolError> {
    match source {
        Some(ParticipantSource::Npc { npc, .. }) => {
            if let Some((_, item)) = npc.inventory.find_item(weapon) {
                return Ok(match item.weapon_damage() {
                    Some(formula) => Weapon::new(weapon, formula, false),
                    None => Weapon::new(weapon, IMPROVISED_DAMAGE, true),
                });
            }
            if is_unarmed(weapon) {
                return Ok(Weapon::new(weapon, UNARMED_DAMAGE, false));
            }
            Err(ToolError::InventoryMismatch {
                owner: owner.to_string(),
                item: weapon.to_string(),
                available: npc
                    .inventory
                    .item_names()
                    .into_iter()
                    .map(String::from)
                    .collect(),
                kind: InventoryKind::Items,
            })
        }
        Some(ParticipantSource::Creature(entry)) => {
            if let Some(formula) = entry.weapon(weapon) {
                return Ok(Weapon::new(weapon, formula, false));
            }
            Err(ToolError::InventoryMismatch {
                owner: owner.to_string(),
                item: weapon.to_string(),
                available: entry.weapons.keys().cloned().collect(),
                kind: InventoryKind::Weapons,
            })
        }
        None => Err(ToolError::InvalidParticipant {
            name: owner.to_string(),
            role: ParticipantRole::Attacker,
        }),
    }
}
