//! Tool facade
//!
//! Every campaign operation is exposed as a named tool that takes a JSON
//! argument object and answers with narrative text. The facade owns the
//! services, checks that the campaign exists, and holds the campaign's
//! write lock for the whole call.

mod args;
mod catalog;

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::bestiary::BestiaryService;
use crate::campaign::{CampaignService, NewCampaign};
use crate::combat::{describe_combat, Attack, CombatEngine, Dice, RemovalReason};
use crate::error::ToolError;
use crate::locks::{CampaignGuard, CampaignLocks};
use crate::npc::{ItemUpdate, NewItem, NewNpc, NpcService};
use crate::quests::QuestLedger;
use crate::store::Repositories;

use args::*;
pub use catalog::{find_tool, tool_definitions, ToolDefinition};

/// Result of a tool call as relayed to the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolOutput {
    pub text: String,
    pub is_error: bool,
}

impl ToolOutput {
    fn ok(text: String) -> Self {
        Self {
            text,
            is_error: false,
        }
    }

    fn error(err: &ToolError) -> Self {
        Self {
            text: format!("Error: {}", err),
            is_error: true,
        }
    }
}

/// All campaign services behind one dispatch point
pub struct Toolbox {
    campaigns: CampaignService,
    npcs: NpcService,
    bestiary: BestiaryService,
    quests: QuestLedger,
    combat: Arc<CombatEngine>,
    locks: CampaignLocks,
}

impl Toolbox {
    /// Wire every service to the same repositories and dice
    pub fn new(repos: Repositories, dice: Dice) -> Self {
        let combat = Arc::new(CombatEngine::new(repos.clone(), dice.clone()));
        Self {
            campaigns: CampaignService::new(repos.clone()),
            npcs: NpcService::new(repos.clone(), combat.clone(), dice),
            bestiary: BestiaryService::new(repos.clone()),
            quests: QuestLedger::new(repos),
            combat,
            locks: CampaignLocks::new(),
        }
    }

    /// Run a tool by name. Failures come back as error text, never as a fault.
    pub async fn call(&self, name: &str, args: Value) -> ToolOutput {
        debug!("Tool call: {}", name);
        match self.dispatch(name, args).await {
            Ok(text) => ToolOutput::ok(text),
            Err(err) => {
                if matches!(err, ToolError::Storage(_)) {
                    warn!("Tool {} failed: {}", name, err);
                }
                ToolOutput::error(&err)
            }
        }
    }

    async fn dispatch(&self, name: &str, args: Value) -> Result<String, ToolError> {
        match name {
            "begin_campaign" => self.begin_campaign(parse(name, args)?).await,
            "delete_campaign" => {
                let a: CampaignArgs = parse(name, args)?;
                let _list = self.locks.acquire_list().await;
                let _campaign = self.locks.acquire(&a.campaign_id).await;
                self.campaigns.delete_campaign(&a.campaign_id).await
            }
            "list_campaigns" => {
                let _list = self.locks.acquire_list().await;
                self.campaigns.list_campaigns().await
            }
            "get_campaign" => {
                let a: CampaignArgs = parse(name, args)?;
                let _guard = self.locks.acquire(&a.campaign_id).await;
                self.campaigns.get_campaign(&a.campaign_id).await
            }

            "create_npc" => {
                let a: CreateNpcArgs = parse(name, args)?;
                let _guard = self.enter(&a.campaign_id).await?;
                let new = NewNpc {
                    name: a.name,
                    keywords: a.keywords,
                    arc: a.arc,
                    health: a.health,
                    max_health: a.max_health,
                    hit_chance: a.hit_chance,
                    weapons: a.weapons,
                };
                self.npcs.create_npc(&a.campaign_id, new).await
            }
            "heal_npc" => {
                let a: HealNpcArgs = parse(name, args)?;
                let _guard = self.enter(&a.campaign_id).await?;
                self.npcs
                    .heal_npc(&a.campaign_id, &a.npc_name, &a.heal_dice, a.source.as_deref())
                    .await
            }
            "list_npcs" => {
                let a: CampaignArgs = parse(name, args)?;
                let _guard = self.enter(&a.campaign_id).await?;
                self.npcs.list_npcs(&a.campaign_id).await
            }
            "get_npc" => {
                let a: NpcArgs = parse(name, args)?;
                let _guard = self.enter(&a.campaign_id).await?;
                self.npcs.get_npc(&a.campaign_id, &a.npc_name).await
            }

            "add_item" => {
                let a: AddItemArgs = parse(name, args)?;
                let _guard = self.enter(&a.campaign_id).await?;
                let item = NewItem {
                    name: a.item_name,
                    description: a.description,
                    source: a.source,
                    is_weapon: a.is_weapon,
                    damage: a.damage,
                };
                self.npcs.add_item(&a.campaign_id, &a.npc_name, item).await
            }
            "remove_item" => {
                let a: RemoveItemArgs = parse(name, args)?;
                let _guard = self.enter(&a.campaign_id).await?;
                self.npcs
                    .remove_item(&a.campaign_id, &a.npc_name, &a.item_name)
                    .await
            }
            "update_item" => {
                let a: UpdateItemArgs = parse(name, args)?;
                let _guard = self.enter(&a.campaign_id).await?;
                let update = ItemUpdate {
                    description: a.description,
                    is_weapon: a.is_weapon,
                    damage: a.damage,
                };
                self.npcs
                    .update_item(&a.campaign_id, &a.npc_name, &a.item_name, update)
                    .await
            }
            "get_inventory" => {
                let a: NpcArgs = parse(name, args)?;
                let _guard = self.enter(&a.campaign_id).await?;
                self.npcs.get_inventory(&a.campaign_id, &a.npc_name).await
            }
            "add_money" => {
                let a: MoneyArgs = parse(name, args)?;
                let _guard = self.enter(&a.campaign_id).await?;
                self.npcs
                    .add_money(&a.campaign_id, &a.npc_name, a.amount)
                    .await
            }
            "remove_money" => {
                let a: MoneyArgs = parse(name, args)?;
                let _guard = self.enter(&a.campaign_id).await?;
                self.npcs
                    .remove_money(&a.campaign_id, &a.npc_name, a.amount)
                    .await
            }

            "create_bestiary_entry" => {
                let a: CreateBestiaryEntryArgs = parse(name, args)?;
                let _guard = self.enter(&a.campaign_id).await?;
                self.bestiary
                    .create_entry(&a.campaign_id, &a.name, &a.threat_level, &a.hp, a.weapons)
                    .await
            }
            "get_bestiary" => {
                let a: CampaignArgs = parse(name, args)?;
                let _guard = self.enter(&a.campaign_id).await?;
                self.bestiary.get_bestiary(&a.campaign_id).await
            }

            "attack" => {
                let a: AttackArgs = parse(name, args)?;
                let _guard = self.enter(&a.campaign_id).await?;
                let attack = Attack {
                    attacker: a.attacker,
                    target: a.target,
                    weapon: a.weapon,
                    team: a.team,
                };
                let report = self.combat.attack(&a.campaign_id, attack).await?;
                Ok(report.text())
            }
            "remove_from_combat" => {
                let a: RemoveFromCombatArgs = parse(name, args)?;
                let reason: RemovalReason = a.reason.as_deref().unwrap_or_default().parse()?;
                let _guard = self.enter(&a.campaign_id).await?;
                let report = self
                    .combat
                    .remove_from_combat(&a.campaign_id, &a.name, reason)
                    .await?;
                Ok(report.text())
            }
            "get_combat_status" => {
                let a: CampaignArgs = parse(name, args)?;
                let _guard = self.enter(&a.campaign_id).await?;
                let state = self.combat.status(&a.campaign_id).await?;
                Ok(describe_combat(state.as_ref()))
            }

            "add_npc_todo" => {
                let a: AddTodoArgs = parse(name, args)?;
                let _guard = self.enter(&a.campaign_id).await?;
                self.quests
                    .add_npc_todo(
                        &a.campaign_id,
                        &a.npc_name,
                        &a.todo_name,
                        &a.description,
                        &a.source,
                        a.source_is_npc,
                    )
                    .await
            }
            "complete_todo" => {
                let a: CompleteTodoArgs = parse(name, args)?;
                let _guard = self.enter(&a.campaign_id).await?;
                self.quests
                    .complete_todo(&a.campaign_id, &a.npc_name, &a.todo_name, &a.resolution)
                    .await
            }
            "abandon_todo" => {
                let a: AbandonTodoArgs = parse(name, args)?;
                let _guard = self.enter(&a.campaign_id).await?;
                self.quests
                    .abandon_todo(&a.campaign_id, &a.npc_name, &a.todo_name, &a.reason)
                    .await
            }

            _ => Err(ToolError::NotFound {
                kind: "Tool",
                name: name.to_string(),
                hint: "Use GET /tools to see available tools.".to_string(),
            }),
        }
    }

    async fn begin_campaign(&self, a: BeginCampaignArgs) -> Result<String, ToolError> {
        let _list = self.locks.acquire_list().await;
        let new = NewCampaign {
            name: a.name,
            description: a.description,
            player_name: a.player_name,
            player_health: a.player_health,
            metadata: a.metadata,
        };
        let (_, summary) = self.campaigns.begin_campaign(new).await?;
        Ok(summary)
    }

    /// Lock a campaign and make sure it exists
    async fn enter(&self, campaign_id: &str) -> Result<CampaignGuard<'_>, ToolError> {
        let guard = self.locks.acquire(campaign_id).await;
        self.campaigns.require(campaign_id).await?;
        Ok(guard)
    }
}

fn parse<T: DeserializeOwned>(tool: &str, args: Value) -> Result<T, ToolError> {
    // A bare call with no body means "no arguments"
    let args = if args.is_null() {
        Value::Object(Default::default())
    } else {
        args
    };
    serde_json::from_value(args)
        .map_err(|e| ToolError::InvalidArgument(format!("Invalid arguments for {}: {}", tool, e)))
}
