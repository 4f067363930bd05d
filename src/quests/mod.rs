//! Quest ledger
//!
//! Each NPC owns an ordered list of todos. Closing one (completed or
//! abandoned) leaves an insight on the owner and, when the todo came from
//! another NPC who is still alive, a matching insight on that NPC.

use tracing::{debug, info};

use crate::combat::resolve_npc;
use crate::error::ToolError;
use crate::store::Repositories;
use crate::world::Todo;

/// Locate a todo by fuzzy name.
///
/// Precedence: case-insensitive equality, then the search term inside a
/// todo name, then a todo name inside the search term. Within each pass the
/// first todo in list order wins.
pub fn find_todo(todos: &[Todo], search: &str) -> Option<usize> {
    let search = search.to_lowercase();
    let names: Vec<String> = todos.iter().map(|t| t.name.to_lowercase()).collect();

    names
        .iter()
        .position(|n| *n == search)
        .or_else(|| names.iter().position(|n| n.contains(&search)))
        .or_else(|| names.iter().position(|n| search.contains(n.as_str())))
}

/// How a todo was closed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Closure {
    /// Completed, with how it was resolved
    Completed(String),
    /// Abandoned, with why
    Abandoned(String),
}

impl Closure {
    fn owner_insight(&self, todo: &Todo) -> String {
        match self {
            Closure::Completed(resolution) => {
                format!("Completed '{}' for {}: {}", todo.name, todo.source, resolution)
            }
            Closure::Abandoned(reason) => {
                format!("Abandoned '{}' (from {}): {}", todo.name, todo.source, reason)
            }
        }
    }

    fn source_insight(&self, owner: &str, todo: &Todo) -> String {
        match self {
            Closure::Completed(resolution) => {
                format!("{} completed '{}' for them: {}", owner, todo.name, resolution)
            }
            Closure::Abandoned(reason) => format!(
                "{} was asked to '{}' but abandoned it: {}",
                owner, todo.name, reason
            ),
        }
    }

    fn summary(&self, owner: &str, todo: &Todo) -> [String; 2] {
        match self {
            Closure::Completed(resolution) => [
                format!("{} completed '{}'.", owner, todo.name),
                format!("Resolution: {}", resolution),
            ],
            Closure::Abandoned(reason) => [
                format!("{} abandoned '{}'.", owner, todo.name),
                format!("Reason: {}", reason),
            ],
        }
    }
}

/// Quest operations for a campaign store
pub struct QuestLedger {
    repos: Repositories,
}

impl QuestLedger {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    /// Hand an NPC a new todo
    pub async fn add_npc_todo(
        &self,
        campaign_id: &str,
        npc_name: &str,
        todo_name: &str,
        description: &str,
        source: &str,
        source_is_npc: bool,
    ) -> Result<String, ToolError> {
        let (slug, mut npc) = resolve_npc(self.repos.npcs.as_ref(), campaign_id, npc_name)
            .await?
            .ok_or_else(|| ToolError::npc_not_found(npc_name))?;

        // An NPC source is pinned to its display name now, not re-resolved later
        let mut source_name = source.to_string();
        if source_is_npc {
            if let Some((_, giver)) =
                resolve_npc(self.repos.npcs.as_ref(), campaign_id, source).await?
            {
                source_name = giver.name;
            }
        }

        npc.todos.push(Todo {
            name: todo_name.to_string(),
            description: description.to_string(),
            source: source_name.clone(),
            source_is_npc,
        });
        self.repos.npcs.save_npc(campaign_id, &slug, &npc).await?;
        debug!("{} took on '{}' from {}", npc.name, todo_name, source_name);

        Ok(format!(
            "Todo '{}' added to {}.\nSource: {}\nTotal todos: {}",
            todo_name,
            npc.name,
            source_name,
            npc.todos.len()
        ))
    }

    /// Mark a todo done
    pub async fn complete_todo(
        &self,
        campaign_id: &str,
        npc_name: &str,
        todo_name: &str,
        resolution: &str,
    ) -> Result<String, ToolError> {
        self.close(
            campaign_id,
            npc_name,
            todo_name,
            Closure::Completed(resolution.to_string()),
        )
        .await
    }

    /// Give up on a todo
    pub async fn abandon_todo(
        &self,
        campaign_id: &str,
        npc_name: &str,
        todo_name: &str,
        reason: &str,
    ) -> Result<String, ToolError> {
        self.close(
            campaign_id,
            npc_name,
            todo_name,
            Closure::Abandoned(reason.to_string()),
        )
        .await
    }

    async fn close(
        &self,
        campaign_id: &str,
        npc_name: &str,
        todo_name: &str,
        closure: Closure,
    ) -> Result<String, ToolError> {
        let (slug, mut npc) = resolve_npc(self.repos.npcs.as_ref(), campaign_id, npc_name)
            .await?
            .ok_or_else(|| ToolError::npc_not_found(npc_name))?;

        let Some(idx) = find_todo(&npc.todos, todo_name) else {
            let available: Vec<&str> = npc.todos.iter().map(|t| t.name.as_str()).collect();
            let available = if available.is_empty() {
                "none".to_string()
            } else {
                available.join(", ")
            };
            return Err(ToolError::NotFound {
                kind: "Todo",
                name: todo_name.to_string(),
                hint: format!("Available for {}: {}", npc.name, available),
            });
        };

        // Owner is persisted before touching the source
        let todo = npc.todos.remove(idx);
        npc.insights.push(closure.owner_insight(&todo));
        self.repos.npcs.save_npc(campaign_id, &slug, &npc).await?;
        info!("{} closed '{}' ({:?})", npc.name, todo.name, closure);

        let mut lines: Vec<String> = closure.summary(&npc.name, &todo).into();
        lines.push(format!("Insight added to {}.", npc.name));

        if todo.source_is_npc {
            let insight = closure.source_insight(&npc.name, &todo);
            if self.add_insight(campaign_id, &todo.source, insight).await? {
                lines.push(format!("Insight added to {}.", todo.source));
            } else {
                lines.push(format!(
                    "({} no longer exists - no insight added)",
                    todo.source
                ));
            }
        }

        Ok(lines.join("\n"))
    }

    /// Append an insight to an NPC if it still exists
    async fn add_insight(&self, campaign_id: &str, name: &str, insight: String) -> anyhow::Result<bool> {
        let Some((slug, mut npc)) = resolve_npc(self.repos.npcs.as_ref(), campaign_id, name).await?
        else {
            return Ok(false);
        };
        npc.insights.push(insight);
        self.repos.npcs.save_npc(campaign_id, &slug, &npc).await?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_utils::test_repos;
    use crate::world::{slugify, Npc};

    const C: &str = "c1";

    fn todo(name: &str) -> Todo {
        Todo {
            name: name.to_string(),
            description: String::new(),
            source: "someone".to_string(),
            source_is_npc: false,
        }
    }

    async fn ledger() -> (QuestLedger, Repositories) {
        let repos = test_repos().await;
        for (name, keyword) in [("Aria", "bard"), ("Captain Marcus", "captain")] {
            let npc = Npc::new(name, vec![keyword.to_string()], "");
            repos
                .npcs
                .create_npc(C, &slugify(name), &npc)
                .await
                .unwrap();
        }
        (QuestLedger::new(repos.clone()), repos)
    }

    #[test]
    fn test_exact_match_beats_earlier_substring() {
        let todos = vec![todo("Find the sword of kings"), todo("Find the sword")];
        assert_eq!(find_todo(&todos, "find the SWORD"), Some(1));
    }

    #[test]
    fn test_substring_passes_in_order() {
        let todos = vec![todo("Deliver letter"), todo("Slay the dragon")];
        assert_eq!(find_todo(&todos, "dragon"), Some(1));
        assert_eq!(find_todo(&todos, "please deliver letter today"), Some(0));
        assert_eq!(find_todo(&todos, "bake bread"), None);
    }

    #[test]
    fn test_first_match_in_list_order() {
        let todos = vec![todo("Slay the red dragon"), todo("Slay the blue dragon")];
        assert_eq!(find_todo(&todos, "dragon"), Some(0));
    }

    #[tokio::test]
    async fn test_add_todo_pins_npc_source_name() {
        let (ledger, repos) = ledger().await;

        let msg = ledger
            .add_npc_todo(C, "bard", "Find the lute", "Lost in the woods", "captain", true)
            .await
            .unwrap();
        assert_eq!(
            msg,
            "Todo 'Find the lute' added to Aria.\nSource: Captain Marcus\nTotal todos: 1"
        );

        let aria = repos.npcs.get_npc(C, "aria").await.unwrap().unwrap();
        assert_eq!(aria.todos[0].source, "Captain Marcus");
        assert!(aria.todos[0].source_is_npc);
    }

    #[tokio::test]
    async fn test_complete_propagates_to_source() {
        let (ledger, repos) = ledger().await;
        ledger
            .add_npc_todo(C, "Aria", "Find the lute", "", "Captain Marcus", true)
            .await
            .unwrap();

        let msg = ledger
            .complete_todo(C, "Aria", "lute", "Found it in a hollow log")
            .await
            .unwrap();
        assert_eq!(
            msg,
            "Aria completed 'Find the lute'.\n\
             Resolution: Found it in a hollow log\n\
             Insight added to Aria.\n\
             Insight added to Captain Marcus."
        );

        let aria = repos.npcs.get_npc(C, "aria").await.unwrap().unwrap();
        assert!(aria.todos.is_empty());
        assert_eq!(
            aria.insights,
            vec!["Completed 'Find the lute' for Captain Marcus: Found it in a hollow log"]
        );

        let marcus = repos.npcs.get_npc(C, "captain-marcus").await.unwrap().unwrap();
        assert_eq!(
            marcus.insights,
            vec!["Aria completed 'Find the lute' for them: Found it in a hollow log"]
        );
    }

    #[tokio::test]
    async fn test_abandon_with_dead_source() {
        let (ledger, repos) = ledger().await;
        ledger
            .add_npc_todo(C, "Aria", "Guard the gate", "", "Captain Marcus", true)
            .await
            .unwrap();
        repos.npcs.delete_npc(C, "captain-marcus").await.unwrap();

        let msg = ledger
            .abandon_todo(C, "Aria", "Guard the gate", "The gate fell")
            .await
            .unwrap();
        assert!(msg.starts_with("Aria abandoned 'Guard the gate'.\nReason: The gate fell\n"));
        assert!(msg.ends_with("(Captain Marcus no longer exists - no insight added)"));

        let aria = repos.npcs.get_npc(C, "aria").await.unwrap().unwrap();
        assert_eq!(
            aria.insights,
            vec!["Abandoned 'Guard the gate' (from Captain Marcus): The gate fell"]
        );
    }

    #[tokio::test]
    async fn test_non_npc_source_gets_no_insight() {
        let (ledger, _) = ledger().await;
        ledger
            .add_npc_todo(C, "Aria", "Pay taxes", "", "the crown", false)
            .await
            .unwrap();

        let msg = ledger
            .complete_todo(C, "Aria", "Pay taxes", "Paid")
            .await
            .unwrap();
        assert!(msg.ends_with("Insight added to Aria."));
    }

    #[tokio::test]
    async fn test_missing_todo_lists_available() {
        let (ledger, _) = ledger().await;
        ledger
            .add_npc_todo(C, "Aria", "Pay taxes", "", "the crown", false)
            .await
            .unwrap();

        let err = ledger
            .complete_todo(C, "Aria", "slay dragon", "")
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Todo 'slay dragon' not found. Available for Aria: Pay taxes"
        );

        let err = ledger
            .complete_todo(C, "nobody", "x", "")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "NPC 'nobody' not found. Use NPC name or keyword.");
    }
}
