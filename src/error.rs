//! Failures surfaced by campaign operations
//!
//! Every variant renders as the narrative text relayed to the caller.

use thiserror::Error;

/// Which side of an attack failed to resolve
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticipantRole {
    Attacker,
    Target,
}

impl ParticipantRole {
    fn noun(&self) -> &'static str {
        match self {
            ParticipantRole::Attacker => "participant",
            ParticipantRole::Target => "target",
        }
    }

    fn plural(&self) -> &'static str {
        match self {
            ParticipantRole::Attacker => "Attackers",
            ParticipantRole::Target => "Targets",
        }
    }
}

/// Where a missing weapon was looked for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InventoryKind {
    /// An NPC's carried items
    Items,
    /// A bestiary creature's natural weapons
    Weapons,
}

/// Operation errors
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("{kind} '{name}' not found. {hint}")]
    NotFound {
        kind: &'static str,
        name: String,
        hint: String,
    },

    #[error("{kind} '{name}' already exists.\n\n{details}")]
    AlreadyExists {
        kind: &'static str,
        name: String,
        details: String,
    },

    #[error(
        "{name} is not a valid {}. {} must be either NPCs (use create_npc) or bestiary creatures (use create_bestiary_entry).",
        .role.noun(),
        .role.plural()
    )]
    InvalidParticipant { name: String, role: ParticipantRole },

    #[error("{}", inventory_mismatch(.owner, .item, .available, .kind))]
    InventoryMismatch {
        owner: String,
        item: String,
        available: Vec<String>,
        kind: InventoryKind,
    },

    #[error("{0}")]
    InvalidArgument(String),

    #[error("There's no active combat.")]
    NoActiveCombat,

    #[error("{0} is not in combat.")]
    NotInCombat(String),

    #[error("storage error: {0:#}")]
    Storage(#[from] anyhow::Error),
}

impl ToolError {
    /// An NPC that could not be resolved by name or keyword
    pub fn npc_not_found(name: &str) -> Self {
        ToolError::NotFound {
            kind: "NPC",
            name: name.to_string(),
            hint: "Use NPC name or keyword.".to_string(),
        }
    }

    /// A campaign id with no campaign behind it
    pub fn campaign_not_found(campaign_id: &str) -> Self {
        ToolError::NotFound {
            kind: "Campaign",
            name: campaign_id.to_string(),
            hint: "Use list_campaigns to see available campaigns.".to_string(),
        }
    }
}

fn inventory_mismatch(owner: &str, item: &str, available: &[String], kind: &InventoryKind) -> String {
    match kind {
        InventoryKind::Items => {
            let list = if available.is_empty() {
                "none (try 'fists' for unarmed)".to_string()
            } else {
                available.join(", ")
            };
            format!(
                "{} doesn't have '{}' in inventory. Available items: {}",
                owner, item, list
            )
        }
        InventoryKind::Weapons => {
            let list = if available.is_empty() {
                "none".to_string()
            } else {
                available.join(", ")
            };
            format!("{} doesn't have '{}'. Available weapons: {}", owner, item, list)
        }
    }
}
