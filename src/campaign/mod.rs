//! Campaign management
//!
//! A campaign is the scope every other record lives in. Creating one may
//! also register the player character, who fights as an NPC but is never
//! deleted on death.

use tracing::info;
use uuid::Uuid;

use crate::error::ToolError;
use crate::store::Repositories;
use crate::world::{slugify, Campaign, Npc, Player, PlayerRef, DEFAULT_MAX_HEALTH};

/// Keyword every player character answers to
pub const PLAYER_KEYWORD: &str = "player";

/// Arguments for starting a campaign
#[derive(Debug, Clone, Default)]
pub struct NewCampaign {
    pub name: String,
    pub description: Option<String>,
    pub player_name: Option<String>,
    pub player_health: Option<i32>,
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

/// Campaign operations
pub struct CampaignService {
    repos: Repositories,
}

impl CampaignService {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    /// Load a campaign or fail with NotFound
    pub async fn require(&self, campaign_id: &str) -> Result<Campaign, ToolError> {
        self.repos
            .campaigns
            .get_campaign(campaign_id)
            .await?
            .ok_or_else(|| ToolError::campaign_not_found(campaign_id))
    }

    /// Start a new campaign. Returns the campaign and a summary.
    pub async fn begin_campaign(&self, new: NewCampaign) -> Result<(Campaign, String), ToolError> {
        let name = new.name.trim();
        let slug = slugify(name);
        if slug.is_empty() {
            return Err(ToolError::InvalidArgument(
                "Campaign name must contain at least one letter or digit.".to_string(),
            ));
        }

        let player_name = new
            .player_name
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty());
        let player_health = new.player_health.unwrap_or(DEFAULT_MAX_HEALTH);
        if player_name.is_some() && player_health < 1 {
            return Err(ToolError::InvalidArgument(format!(
                "player_health must be at least 1 (got {}).",
                player_health
            )));
        }
        if player_name.is_some_and(|p| slugify(p).is_empty()) {
            return Err(ToolError::InvalidArgument(
                "Player name must contain at least one letter or digit.".to_string(),
            ));
        }

        let campaign = Campaign {
            id: Uuid::new_v4().to_string(),
            slug,
            name: name.to_string(),
            description: new.description.unwrap_or_default(),
            player: player_name.map(|p| PlayerRef {
                name: p.to_string(),
            }),
            metadata: new.metadata,
            created_at: chrono::Utc::now().to_rfc3339(),
        };
        let player = player_name.map(|p| Player {
            name: p.to_string(),
            health: player_health,
            max_health: player_health,
            inventory: Default::default(),
        });

        self.repos
            .campaigns
            .create_campaign(&campaign, player.as_ref())
            .await?;

        if let Some(player) = &player {
            let mut npc = Npc::new(
                &player.name,
                vec![player.name.clone(), PLAYER_KEYWORD.to_string()],
                "The player character",
            );
            npc.max_health = player.max_health;
            npc.health = player.health;
            self.repos
                .npcs
                .create_npc(&campaign.id, &slugify(&player.name), &npc)
                .await?;
        }
        info!("Created campaign {} ({})", campaign.name, campaign.id);

        let mut summary = format!(
            "Campaign '{}' created!\n\nCampaign ID: {}\nSlug: {}",
            campaign.name, campaign.id, campaign.slug
        );
        if let Some(player) = &player {
            summary.push_str(&format!("\nPlayer: {}", player.name));
        }
        Ok((campaign, summary))
    }

    /// Remove a campaign and everything in it
    pub async fn delete_campaign(&self, campaign_id: &str) -> Result<String, ToolError> {
        let campaign = self.require(campaign_id).await?;
        self.repos.campaigns.delete_campaign(campaign_id).await?;
        info!("Deleted campaign {} ({})", campaign.name, campaign_id);
        Ok(format!("Campaign '{}' deleted.", campaign.name))
    }

    /// One line per campaign
    pub async fn list_campaigns(&self) -> Result<String, ToolError> {
        let list = self.repos.campaigns.list_campaigns().await?;
        if list.is_empty() {
            return Ok("No campaigns yet. Use begin_campaign to start one.".to_string());
        }

        let mut lines = vec![format!("Campaigns ({}):", list.len())];
        for (id, slug) in &list {
            let name = self
                .repos
                .campaigns
                .get_campaign(id)
                .await?
                .map_or_else(|| slug.clone(), |c| c.name);
            lines.push(format!("- {} (id: {})", name, id));
        }
        Ok(lines.join("\n"))
    }

    /// Campaign details
    pub async fn get_campaign(&self, campaign_id: &str) -> Result<String, ToolError> {
        let campaign = self.require(campaign_id).await?;
        let npc_count = self.repos.npcs.get_npc_index(campaign_id).await?.len();
        let in_combat = self.repos.combat.has_combat(campaign_id).await?;

        let mut lines = vec![
            format!("Name: {}", campaign.name),
            format!("ID: {}", campaign.id),
            format!("Slug: {}", campaign.slug),
            format!("Created: {}", campaign.created_at),
        ];
        if let Some(player) = &campaign.player {
            lines.push(format!("Player: {}", player.name));
        }
        lines.push(format!("NPCs: {}", npc_count));
        lines.push(format!(
            "Combat: {}",
            if in_combat { "active" } else { "none" }
        ));
        if !campaign.description.is_empty() {
            lines.push(String::new());
            lines.push(campaign.description.clone());
        }
        if !campaign.metadata.is_empty() {
            lines.push(String::new());
            lines.push(format!(
                "Metadata: {}",
                serde_json::Value::Object(campaign.metadata.clone())
            ));
        }
        Ok(lines.join("\n"))
    }
}
