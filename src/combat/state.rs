//! Combat state tracking
//!
//! One encounter per campaign. The encounter is a plain value: callers load
//! it, apply updates, and persist it once. Its presence in storage is what
//! makes combat active.

use std::collections::BTreeSet;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::world::same_slug;

/// Stats of one fighter for the duration of an encounter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub health: i32,
    pub max_health: i32,
    pub hit_chance: u32,
    /// Fighters sharing a team are allies
    pub team: String,
}

impl Participant {
    /// Create a participant
    pub fn new(health: i32, max_health: i32, hit_chance: u32, team: &str) -> Self {
        Self {
            health,
            max_health,
            hit_chance,
            team: team.to_string(),
        }
    }

    /// Check if participant is dead
    pub fn is_dead(&self) -> bool {
        self.health <= 0
    }
}

/// An active encounter, keyed by canonical participant name in join order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatState {
    #[serde(default)]
    pub participants: IndexMap<String, Participant>,
}

impl CombatState {
    /// Create an empty encounter
    pub fn new() -> Self {
        Self::default()
    }

    /// Canonical name of the participant whose slug matches `name`
    pub fn find(&self, name: &str) -> Option<&str> {
        self.participants
            .keys()
            .find(|p| same_slug(p, name))
            .map(|p| p.as_str())
    }

    /// Get a participant by canonical name
    pub fn get(&self, name: &str) -> Option<&Participant> {
        self.participants.get(name)
    }

    /// Check if a canonical name is already fighting
    pub fn contains(&self, name: &str) -> bool {
        self.participants.contains_key(name)
    }

    /// Add a participant unless already present; returns whether it was added
    pub fn seed(&mut self, name: &str, participant: Participant) -> bool {
        if self.participants.contains_key(name) {
            return false;
        }
        self.participants.insert(name.to_string(), participant);
        true
    }

    /// Re-declare a participant's team
    pub fn set_team(&mut self, name: &str, team: &str) {
        if let Some(p) = self.participants.get_mut(name) {
            p.team = team.to_string();
        }
    }

    /// Move the attacker to a solo team if it is attacking its own team.
    /// Returns true if that happened.
    pub fn check_betrayal(&mut self, attacker: &str, target: &str) -> bool {
        let same_team = match (self.participants.get(attacker), self.participants.get(target)) {
            (Some(a), Some(t)) => a.team == t.team,
            _ => false,
        };
        if same_team {
            self.set_team(attacker, attacker);
        }
        same_team
    }

    /// Subtract damage, never dropping below 0. Returns the new health.
    pub fn apply_damage(&mut self, name: &str, amount: i32) -> Option<i32> {
        let p = self.participants.get_mut(name)?;
        p.health = p.health.saturating_sub(amount.max(0)).max(0);
        Some(p.health)
    }

    /// Overwrite a participant's health, clamped into `[0, max_health]`
    pub fn set_health(&mut self, name: &str, health: i32) -> bool {
        match self.participants.get_mut(name) {
            Some(p) => {
                p.health = health.clamp(0, p.max_health.max(0));
                true
            }
            None => false,
        }
    }

    /// Remove a participant, keeping everyone else in join order
    pub fn remove(&mut self, name: &str) -> Option<Participant> {
        self.participants.shift_remove(name)
    }

    /// Distinct teams among remaining participants
    pub fn remaining_teams(&self) -> BTreeSet<&str> {
        self.participants.values().map(|p| p.team.as_str()).collect()
    }

    /// At most one team left standing: the encounter is over
    pub fn is_decided(&self) -> bool {
        self.remaining_teams().len() <= 1
    }
}

/// Minimum d20 roll that hits for a hit chance percentage
pub fn hit_threshold(hit_chance: u32) -> i64 {
    21 - i64::from(hit_chance) * 20 / 100
}

/// Whether a d20 roll hits
pub fn is_hit(roll: u32, hit_chance: u32) -> bool {
    i64::from(roll) >= hit_threshold(hit_chance)
}
