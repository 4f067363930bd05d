//! Combat engine
//!
//! Drives one encounter per campaign through attacks and removals:
//! - Resolve and seed participants
//! - Team declarations and betrayal
//! - d20 hit rolls against hit chance
//! - Damage, death and NPC cleanup
//! - Ending combat when one team remains

use std::str::FromStr;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::dice::Dice;
use super::narrative::{damage_descriptor, health_description};
use super::resolver::{choose_weapon, resolve_participant, ParticipantSource, DEFAULT_WEAPON};
use super::state::{is_hit, CombatState, Participant};
use crate::error::{ParticipantRole, ToolError};
use crate::store::Repositories;
use crate::world::{slugify, DEFAULT_HIT_CHANCE};

/// Cosmetic hit locations
const HIT_LOCATIONS: &[&str] = &["head", "chest", "arm", "leg"];

/// Why a participant leaves combat
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemovalReason {
    #[default]
    Death,
    Flee,
    Surrender,
}

impl FromStr for RemovalReason {
    type Err = ToolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "death" | "" => Ok(RemovalReason::Death),
            "flee" => Ok(RemovalReason::Flee),
            "surrender" => Ok(RemovalReason::Surrender),
            other => Err(ToolError::InvalidArgument(format!(
                "Unknown reason '{}'. Use death, flee or surrender.",
                other
            ))),
        }
    }
}

/// An attack request
#[derive(Debug, Clone, Default)]
pub struct Attack {
    pub attacker: String,
    pub target: String,
    pub weapon: Option<String>,
    pub team: Option<String>,
}

/// Outcome of an attack
#[derive(Debug, Clone, Default)]
pub struct AttackReport {
    pub attacker: String,
    pub target: String,
    /// The d20 roll
    pub roll: u32,
    pub hit: bool,
    pub betrayal: bool,
    /// Damage dealt if the attack hit
    pub damage: Option<i32>,
    pub slain: bool,
    pub combat_ended: bool,
    pub narrative: Vec<String>,
}

impl AttackReport {
    /// Narrative shown to the table
    pub fn text(&self) -> String {
        self.narrative.join("\n")
    }
}

/// Outcome of removing a participant
#[derive(Debug, Clone)]
pub struct RemovalReport {
    pub name: String,
    pub reason: RemovalReason,
    pub combat_ended: bool,
}

impl RemovalReport {
    /// Narrative shown to the table
    pub fn text(&self) -> String {
        let mut text = match self.reason {
            RemovalReason::Death => format!("{} has been slain!", self.name),
            RemovalReason::Flee => format!("{} flees from combat!", self.name),
            RemovalReason::Surrender => format!("{} surrenders!", self.name),
        };
        if self.combat_ended {
            text.push_str(COMBAT_ENDED);
        }
        text
    }
}

const COMBAT_ENDED: &str = "\nCombat has ended!";

/// Combat engine for a campaign store
pub struct CombatEngine {
    repos: Repositories,
    dice: Dice,
}

impl CombatEngine {
    /// Create an engine over the given repositories and dice
    pub fn new(repos: Repositories, dice: Dice) -> Self {
        Self { repos, dice }
    }

    /// Current encounter, if any
    pub async fn status(&self, campaign_id: &str) -> Result<Option<CombatState>> {
        self.repos.combat.get_combat_state(campaign_id).await
    }

    /// Resolve one attack, starting combat if none is active
    pub async fn attack(&self, campaign_id: &str, req: Attack) -> Result<AttackReport, ToolError> {
        let weapon = req
            .weapon
            .as_deref()
            .map(str::trim)
            .filter(|w| !w.is_empty())
            .unwrap_or(DEFAULT_WEAPON)
            .to_string();
        let team = req
            .team
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty());

        let existing = self.repos.combat.get_combat_state(campaign_id).await?;
        let starting = existing.is_none();
        let mut state = existing.unwrap_or_default();

        let attacker = resolve_participant(&self.repos, campaign_id, &state, &req.attacker)
            .await?
            .ok_or_else(|| ToolError::InvalidParticipant {
                name: req.attacker.clone(),
                role: ParticipantRole::Attacker,
            })?;
        let target = resolve_participant(&self.repos, campaign_id, &state, &req.target)
            .await?
            .ok_or_else(|| ToolError::InvalidParticipant {
                name: req.target.clone(),
                role: ParticipantRole::Target,
            })?;

        // Inventory is read fresh on every attack, not from combat state
        let attacker_source = ParticipantSource::lookup(&self.repos, campaign_id, &attacker).await?;

        if !state.contains(&attacker) {
            let source = attacker_source
                .as_ref()
                .ok_or_else(|| ToolError::InvalidParticipant {
                    name: attacker.clone(),
                    role: ParticipantRole::Attacker,
                })?;
            let stats = source.seed_stats(team.unwrap_or(attacker.as_str()), &self.dice);
            state.seed(&attacker, stats);
        }
        if !state.contains(&target) {
            let source = ParticipantSource::lookup(&self.repos, campaign_id, &target)
                .await?
                .ok_or_else(|| ToolError::InvalidParticipant {
                    name: target.clone(),
                    role: ParticipantRole::Target,
                })?;
            let stats = source.seed_stats(&target, &self.dice);
            state.seed(&target, stats);
        }

        if let Some(team) = team {
            state.set_team(&attacker, team);
        }

        let mut report = AttackReport {
            attacker: attacker.clone(),
            target: target.clone(),
            ..Default::default()
        };

        let hit_chance = state.get(&attacker).map_or(DEFAULT_HIT_CHANCE, |p| p.hit_chance);
        report.roll = self.dice.d20();
        report.hit = is_hit(report.roll, hit_chance);

        report.betrayal = state.check_betrayal(&attacker, &target);
        if report.betrayal {
            info!("{} betrayed their team", attacker);
            report
                .narrative
                .push(format!("{} has betrayed their team!", attacker));
        }

        if !report.hit {
            report
                .narrative
                .push(format!("{} attacks {} with {}.", attacker, target, weapon));
            report.narrative.push(format!("{} dodges the attack.", target));
            if let Some(t) = state.get(&target) {
                report
                    .narrative
                    .push(format!("{} is {}.", target, health_description(t.health, t.max_health)));
            }
            self.repos.combat.save_combat_state(campaign_id, &state).await?;
            log_start(starting, campaign_id);
            return Ok(report);
        }

        let weapon = choose_weapon(attacker_source.as_ref(), &attacker, &weapon)?;
        let damage = self.dice.roll(&weapon.formula).max(0);
        let location = self
            .dice
            .choose(HIT_LOCATIONS)
            .copied()
            .unwrap_or(HIT_LOCATIONS[0]);

        let health = state.apply_damage(&target, damage).unwrap_or(0);
        let max_health = state.get(&target).map_or(0, |p| p.max_health);
        self.sync_npc_health(campaign_id, &target, health, max_health)
            .await?;

        report.damage = Some(damage);
        report.narrative.push(format!(
            "{} attacks {} with {}.",
            attacker,
            target,
            weapon.describe()
        ));
        report.narrative.push(format!(
            "The attack {} into the {}.",
            damage_descriptor(damage, &weapon.formula),
            location
        ));
        debug!(
            "{} hit {} for {} ({}), {} left",
            attacker, target, damage, weapon.formula, health
        );

        if !state.get(&target).map_or(true, Participant::is_dead) {
            report.narrative.push(format!(
                "{} is {}.",
                target,
                health_description(health, max_health)
            ));
            self.repos.combat.save_combat_state(campaign_id, &state).await?;
            log_start(starting, campaign_id);
            return Ok(report);
        }

        report.slain = true;
        report.narrative.push(format!("{} has been slain!", target));
        self.handle_death(campaign_id, &target).await?;
        state.remove(&target);

        report.combat_ended = self.settle(campaign_id, &state).await?;
        if report.combat_ended {
            report.narrative.push(COMBAT_ENDED.to_string());
        }

        Ok(report)
    }

    /// Take a participant out of the encounter
    pub async fn remove_from_combat(
        &self,
        campaign_id: &str,
        name: &str,
        reason: RemovalReason,
    ) -> Result<RemovalReport, ToolError> {
        let mut state = self
            .repos
            .combat
            .get_combat_state(campaign_id)
            .await?
            .ok_or(ToolError::NoActiveCombat)?;

        let canonical = state
            .find(name)
            .map(str::to_string)
            .ok_or_else(|| ToolError::NotInCombat(name.to_string()))?;

        if reason == RemovalReason::Death {
            self.handle_death(campaign_id, &canonical).await?;
        }
        state.remove(&canonical);
        info!("{} left combat ({:?})", canonical, reason);

        let combat_ended = self.settle(campaign_id, &state).await?;

        Ok(RemovalReport {
            name: canonical,
            reason,
            combat_ended,
        })
    }

    /// Mirror an NPC's new health into the active encounter.
    /// Returns whether the NPC is fighting.
    pub async fn sync_combat_health(
        &self,
        campaign_id: &str,
        npc_name: &str,
        health: i32,
    ) -> Result<bool> {
        let Some(mut state) = self.repos.combat.get_combat_state(campaign_id).await? else {
            return Ok(false);
        };
        let Some(canonical) = state.find(npc_name).map(str::to_string) else {
            return Ok(false);
        };

        state.set_health(&canonical, health);
        self.repos.combat.save_combat_state(campaign_id, &state).await?;
        Ok(true)
    }

    /// Write combat health back to the NPC record, if the fighter is an NPC
    async fn sync_npc_health(
        &self,
        campaign_id: &str,
        name: &str,
        health: i32,
        max_health: i32,
    ) -> Result<()> {
        let slug = slugify(name);
        if let Some(mut npc) = self.repos.npcs.get_npc(campaign_id, &slug).await? {
            npc.health = health;
            npc.max_health = max_health;
            self.repos.npcs.save_npc(campaign_id, &slug, &npc).await?;
        }
        Ok(())
    }

    /// Delete a dead NPC's record unless it is the campaign's player
    async fn handle_death(&self, campaign_id: &str, name: &str) -> Result<bool> {
        let is_player = self
            .repos
            .campaigns
            .get_campaign(campaign_id)
            .await?
            .is_some_and(|c| c.is_player(name));
        if is_player {
            info!("Player {} fell in campaign {}", name, campaign_id);
            return Ok(false);
        }

        let deleted = self.repos.npcs.delete_npc(campaign_id, &slugify(name)).await?;
        if deleted {
            info!("NPC {} died and was removed from campaign {}", name, campaign_id);
        }
        Ok(deleted)
    }

    /// End the encounter if one team remains, otherwise persist it.
    /// Returns true if combat ended.
    async fn settle(&self, campaign_id: &str, state: &CombatState) -> Result<bool> {
        if !state.is_decided() {
            self.repos.combat.save_combat_state(campaign_id, state).await?;
            return Ok(false);
        }

        for (name, p) in &state.participants {
            self.sync_npc_health(campaign_id, name, p.health, p.max_health)
                .await?;
        }
        self.repos.combat.delete_combat_state(campaign_id).await?;
        info!("Combat ended in campaign {}", campaign_id);
        Ok(true)
    }
}

fn log_start(starting: bool, campaign_id: &str) {
    if starting {
        info!("Combat started in campaign {}", campaign_id);
    }
}

/// Render an encounter for the table
pub fn describe_combat(state: Option<&CombatState>) -> String {
    let Some(state) = state else {
        return "No active combat.".to_string();
    };

    let mut lines = vec!["Active combat:".to_string()];
    for (name, p) in &state.participants {
        lines.push(format!(
            "- {} (team: {}): {}",
            name,
            p.team,
            health_description(p.health, p.max_health)
        ));
    }
    lines.join("\n")
}
