//! Tool argument payloads

use std::collections::BTreeMap;

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct CampaignArgs {
    pub campaign_id: String,
}

#[derive(Debug, Deserialize)]
pub struct BeginCampaignArgs {
    pub name: String,
    pub description: Option<String>,
    pub player_name: Option<String>,
    pub player_health: Option<i32>,
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct CreateNpcArgs {
    pub campaign_id: String,
    pub name: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub arc: String,
    pub health: Option<i32>,
    pub max_health: Option<i32>,
    pub hit_chance: Option<u32>,
    #[serde(default)]
    pub weapons: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
pub struct NpcArgs {
    pub campaign_id: String,
    #[serde(alias = "name")]
    pub npc_name: String,
}

#[derive(Debug, Deserialize)]
pub struct HealNpcArgs {
    pub campaign_id: String,
    pub npc_name: String,
    pub heal_dice: String,
    pub source: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AddItemArgs {
    pub campaign_id: String,
    pub npc_name: String,
    pub item_name: String,
    #[serde(default)]
    pub description: String,
    pub source: Option<String>,
    #[serde(default, alias = "weapon")]
    pub is_weapon: bool,
    pub damage: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RemoveItemArgs {
    pub campaign_id: String,
    pub npc_name: String,
    pub item_name: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateItemArgs {
    pub campaign_id: String,
    pub npc_name: String,
    pub item_name: String,
    pub description: Option<String>,
    #[serde(alias = "weapon")]
    pub is_weapon: Option<bool>,
    pub damage: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MoneyArgs {
    pub campaign_id: String,
    pub npc_name: String,
    pub amount: i64,
}

#[derive(Debug, Deserialize)]
pub struct CreateBestiaryEntryArgs {
    pub campaign_id: String,
    pub name: String,
    pub threat_level: String,
    pub hp: String,
    #[serde(default)]
    pub weapons: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
pub struct AttackArgs {
    pub campaign_id: String,
    pub attacker: String,
    pub target: String,
    pub weapon: Option<String>,
    pub team: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RemoveFromCombatArgs {
    pub campaign_id: String,
    pub name: String,
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AddTodoArgs {
    pub campaign_id: String,
    pub npc_name: String,
    pub todo_name: String,
    #[serde(default)]
    pub description: String,
    pub source: String,
    #[serde(default)]
    pub source_is_npc: bool,
}

#[derive(Debug, Deserialize)]
pub struct CompleteTodoArgs {
    pub campaign_id: String,
    pub npc_name: String,
    pub todo_name: String,
    pub resolution: String,
}

#[derive(Debug, Deserialize)]
pub struct AbandonTodoArgs {
    pub campaign_id: String,
    pub npc_name: String,
    pub todo_name: String,
    pub reason: String,
}
