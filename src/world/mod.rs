//! Campaign world records - campaigns, the player, NPCs and the bestiary

mod bestiary;
mod campaign;
mod npc;
mod slug;

pub use bestiary::{creature_key, Bestiary, BestiaryEntry};
pub use campaign::{Campaign, Player, PlayerRef};
pub use npc::{
    npc_key, Inventory, Item, Npc, NpcIndex, NpcIndexEntry, Todo, DEFAULT_HIT_CHANCE,
    DEFAULT_MAX_HEALTH,
};
pub use slug::{same_slug, slugify};
