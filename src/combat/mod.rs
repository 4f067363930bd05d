//! Combat system module
//!
//! Implements narrative tabletop combat with:
//! - Dice formulas (e.g., "2d6+3", "15+1d6")
//! - Descriptor tables that hide the numbers
//! - Participant resolution across NPCs and the bestiary
//! - Team-based encounters with betrayal
//! - Death handling and combat end

mod dice;
mod engine;
mod narrative;
mod resolver;
mod state;

pub use dice::{
    max_value, parse_formula, roll_formula, Dice, DiceRoll, Formula, RandomRoller, Roller,
    ScriptedRoller,
};
pub use engine::{describe_combat, Attack, AttackReport, CombatEngine, RemovalReason, RemovalReport};
pub use narrative::{damage_descriptor, health_description, healing_descriptor, ThreatLevel};
pub use resolver::{
    choose_weapon, is_unarmed, resolve_name, resolve_npc, resolve_participant, ParticipantSource,
    Weapon,
};
pub use state::{hit_threshold, is_hit, CombatState, Participant};
