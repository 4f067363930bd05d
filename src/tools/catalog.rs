//! Tool catalog served to callers

use serde::Serialize;

/// A callable tool and its arguments
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ToolDefinition {
    pub name: &'static str,
    pub description: &'static str,
    pub required: &'static [&'static str],
    pub optional: &'static [&'static str],
}

const fn tool(
    name: &'static str,
    description: &'static str,
    required: &'static [&'static str],
    optional: &'static [&'static str],
) -> ToolDefinition {
    ToolDefinition {
        name,
        description,
        required,
        optional,
    }
}

static TOOLS: &[ToolDefinition] = &[
    tool(
        "begin_campaign",
        "Start a new campaign, optionally with a player character.",
        &["name"],
        &["description", "player_name", "player_health", "metadata"],
    ),
    tool(
        "delete_campaign",
        "Delete a campaign and everything in it.",
        &["campaign_id"],
        &[],
    ),
    tool("list_campaigns", "List all campaigns.", &[], &[]),
    tool(
        "get_campaign",
        "Show a campaign's details.",
        &["campaign_id"],
        &[],
    ),
    tool(
        "create_npc",
        "Create an NPC with keywords, an arc and starting weapons.",
        &["campaign_id", "name"],
        &["keywords", "arc", "health", "max_health", "hit_chance", "weapons"],
    ),
    tool(
        "heal_npc",
        "Heal an NPC by a dice formula, up to max health.",
        &["campaign_id", "npc_name", "heal_dice"],
        &["source"],
    ),
    tool("list_npcs", "List the campaign's NPCs.", &["campaign_id"], &[]),
    tool(
        "get_npc",
        "Show an NPC's sheet.",
        &["campaign_id", "npc_name"],
        &[],
    ),
    tool(
        "add_item",
        "Give an NPC an item. Weapons need a damage formula.",
        &["campaign_id", "npc_name", "item_name"],
        &["description", "source", "is_weapon", "damage"],
    ),
    tool(
        "remove_item",
        "Take an item from an NPC.",
        &["campaign_id", "npc_name", "item_name"],
        &[],
    ),
    tool(
        "update_item",
        "Change an item's description, weapon flag or damage. Weapons need a damage formula.",
        &["campaign_id", "npc_name", "item_name"],
        &["description", "is_weapon", "damage"],
    ),
    tool(
        "get_inventory",
        "Show an NPC's money and items.",
        &["campaign_id", "npc_name"],
        &[],
    ),
    tool(
        "add_money",
        "Give an NPC coins.",
        &["campaign_id", "npc_name", "amount"],
        &[],
    ),
    tool(
        "remove_money",
        "Take coins from an NPC.",
        &["campaign_id", "npc_name", "amount"],
        &[],
    ),
    tool(
        "create_bestiary_entry",
        "Add a creature template: threat level, HP formula and weapons.",
        &["campaign_id", "name", "threat_level", "hp"],
        &["weapons"],
    ),
    tool(
        "get_bestiary",
        "List the campaign's creature templates.",
        &["campaign_id"],
        &[],
    ),
    tool(
        "attack",
        "Resolve one attack. Starts combat if none is active.",
        &["campaign_id", "attacker", "target"],
        &["weapon", "team"],
    ),
    tool(
        "remove_from_combat",
        "Remove a participant from combat (death, flee or surrender).",
        &["campaign_id", "name"],
        &["reason"],
    ),
    tool(
        "get_combat_status",
        "Show the active combat, if any.",
        &["campaign_id"],
        &[],
    ),
    tool(
        "add_npc_todo",
        "Give an NPC a todo, optionally from another NPC.",
        &["campaign_id", "npc_name", "todo_name", "source"],
        &["description", "source_is_npc"],
    ),
    tool(
        "complete_todo",
        "Complete an NPC's todo by fuzzy name.",
        &["campaign_id", "npc_name", "todo_name", "resolution"],
        &[],
    ),
    tool(
        "abandon_todo",
        "Abandon an NPC's todo by fuzzy name.",
        &["campaign_id", "npc_name", "todo_name", "reason"],
        &[],
    ),
];

/// Every tool, in catalog order
pub fn tool_definitions() -> &'static [ToolDefinition] {
    TOOLS
}

/// Look up a tool by name
pub fn find_tool(name: &str) -> Option<&'static ToolDefinition> {
    TOOLS.iter().find(|t| t.name == name)
}
