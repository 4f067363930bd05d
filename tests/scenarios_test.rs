//! End-to-end campaign scenarios through the tool facade

mod common;

use common::RpgTest;
use serde_json::json;

#[tokio::test]
async fn test_goblin_fight() {
    // goblin HP 3+4, d20 20, dagger 2, location chest
    let rpg = RpgTest::start([3, 4, 20, 2, 1]).await;
    let id = rpg.campaign("Lost Mine", Some(("Hero", 20))).await;

    rpg.ok(
        "add_item",
        json!({
            "campaign_id": id,
            "npc_name": "Hero",
            "item_name": "dagger",
            "is_weapon": true,
            "damage": "1d4"
        }),
    )
    .await;
    rpg.ok(
        "create_bestiary_entry",
        json!({
            "campaign_id": id,
            "name": "goblin",
            "threat_level": "low",
            "hp": "2d6",
            "weapons": {"dagger": "1d4"}
        }),
    )
    .await;

    let text = rpg
        .ok(
            "attack",
            json!({"campaign_id": id, "attacker": "hero", "target": "goblin", "weapon": "dagger"}),
        )
        .await;
    assert_eq!(
        text,
        "Hero attacks goblin with dagger.\n\
         The attack strikes lightly into the chest.\n\
         goblin is moderately wounded."
    );

    let status = rpg
        .ok("get_combat_status", json!({"campaign_id": id}))
        .await;
    assert_eq!(
        status,
        "Active combat:\n\
         - Hero (team: Hero): in perfect health\n\
         - goblin (team: goblin): moderately wounded"
    );
}

#[tokio::test]
async fn test_slain_npc_is_deleted_and_combat_ends() {
    // d20 20, fists 4, location arm
    let rpg = RpgTest::start([20, 4, 2]).await;
    let id = rpg.campaign("Ambush", Some(("Hero", 20))).await;
    rpg.ok(
        "create_npc",
        json!({"campaign_id": id, "name": "Bandit", "keywords": ["thug"], "max_health": 3}),
    )
    .await;

    let text = rpg
        .ok(
            "attack",
            json!({"campaign_id": id, "attacker": "Hero", "target": "thug", "weapon": "fists"}),
        )
        .await;
    assert_eq!(
        text,
        "Hero attacks Bandit with fists.\n\
         The attack crashes down with devastating force into the arm.\n\
         Bandit has been slain!\n\
         \n\
         Combat has ended!"
    );

    assert_eq!(
        rpg.err("get_npc", json!({"campaign_id": id, "npc_name": "Bandit"}))
            .await,
        "Error: NPC 'Bandit' not found. Use NPC name or keyword."
    );
    assert_eq!(
        rpg.ok("get_combat_status", json!({"campaign_id": id})).await,
        "No active combat."
    );
}

#[tokio::test]
async fn test_player_survives_death() {
    // d20 1 against hit chance 100, club 10+10, location leg
    let rpg = RpgTest::start([1, 10, 10, 3]).await;
    let id = rpg.campaign("Doom", Some(("Hero", 5))).await;
    rpg.ok(
        "create_npc",
        json!({
            "campaign_id": id,
            "name": "Ogre",
            "hit_chance": 100,
            "weapons": {"club": "2d10"}
        }),
    )
    .await;

    let text = rpg
        .ok(
            "attack",
            json!({"campaign_id": id, "attacker": "Ogre", "target": "player", "weapon": "club"}),
        )
        .await;
    assert!(text.starts_with("Ogre attacks Hero with club.\n"));
    assert!(text.ends_with("Hero has been slain!\n\nCombat has ended!"));

    let sheet = rpg
        .ok("get_npc", json!({"campaign_id": id, "npc_name": "Hero"}))
        .await;
    assert!(sheet.contains("Condition: dead"));
}

#[tokio::test]
async fn test_betrayal_reassigns_team_on_miss() {
    let rpg = RpgTest::start([1]).await;
    let id = rpg.campaign("Feud", None).await;
    for name in ["Aria", "Borin"] {
        rpg.ok("create_npc", json!({"campaign_id": id, "name": name}))
            .await;
    }

    let text = rpg
        .ok(
            "attack",
            json!({"campaign_id": id, "attacker": "Aria", "target": "Borin", "team": "red"}),
        )
        .await;
    assert_eq!(
        text,
        "Aria attacks Borin with unarmed.\nBorin dodges the attack.\nBorin is in perfect health."
    );

    let text = rpg
        .ok(
            "attack",
            json!({"campaign_id": id, "attacker": "Borin", "target": "Aria", "team": "red"}),
        )
        .await;
    assert_eq!(
        text,
        "Borin has betrayed their team!\n\
         Borin attacks Aria with unarmed.\n\
         Aria dodges the attack.\n\
         Aria is in perfect health."
    );

    assert_eq!(
        rpg.ok("get_combat_status", json!({"campaign_id": id})).await,
        "Active combat:\n\
         - Aria (team: red): in perfect health\n\
         - Borin (team: Borin): in perfect health"
    );
}

#[tokio::test]
async fn test_last_team_standing_ends_combat() {
    let rpg = RpgTest::start([1]).await;
    let id = rpg.campaign("Skirmish", None).await;
    for name in ["Aria", "Borin", "Cato"] {
        rpg.ok("create_npc", json!({"campaign_id": id, "name": name}))
            .await;
    }

    for attacker in ["Aria", "Cato"] {
        rpg.ok(
            "attack",
            json!({"campaign_id": id, "attacker": attacker, "target": "Borin", "team": "red"}),
        )
        .await;
    }

    let text = rpg
        .ok(
            "remove_from_combat",
            json!({"campaign_id": id, "name": "borin", "reason": "flee"}),
        )
        .await;
    assert_eq!(text, "Borin flees from combat!\nCombat has ended!");

    assert_eq!(
        rpg.ok("get_combat_status", json!({"campaign_id": id})).await,
        "No active combat."
    );
    // Fleeing is not death
    rpg.ok("get_npc", json!({"campaign_id": id, "npc_name": "Borin"}))
        .await;
    assert_eq!(
        rpg.err(
            "remove_from_combat",
            json!({"campaign_id": id, "name": "Borin"})
        )
        .await,
        "Error: There's no active combat."
    );
}

#[tokio::test]
async fn test_unknown_participants() {
    let rpg = RpgTest::start([]).await;
    let id = rpg.campaign("Empty", Some(("Hero", 20))).await;

    let err = rpg
        .err(
            "attack",
            json!({"campaign_id": id, "attacker": "ghost", "target": "Hero"}),
        )
        .await;
    assert!(err.starts_with("Error: ghost is not a valid participant."));

    let err = rpg
        .err(
            "attack",
            json!({"campaign_id": id, "attacker": "Hero", "target": "ghost"}),
        )
        .await;
    assert!(err.starts_with("Error: ghost is not a valid target. Targets must be"));

    // Nothing was persisted by the failed attacks
    assert_eq!(
        rpg.ok("get_combat_status", json!({"campaign_id": id})).await,
        "No active combat."
    );
}

#[tokio::test]
async fn test_heal_in_combat() {
    // d20 1 (hit chance 100), club 6+5, location head, then heal 6
    let rpg = RpgTest::start([1, 6, 5, 0, 6]).await;
    let id = rpg.campaign("Brawl", Some(("Hero", 20))).await;
    rpg.ok(
        "create_npc",
        json!({
            "campaign_id": id,
            "name": "Ogre",
            "hit_chance": 100,
            "weapons": {"club": "2d6"}
        }),
    )
    .await;

    let text = rpg
        .ok(
            "attack",
            json!({"campaign_id": id, "attacker": "Ogre", "target": "Hero", "weapon": "club"}),
        )
        .await;
    assert_eq!(
        text,
        "Ogre attacks Hero with club.\n\
         The attack strikes solidly into the head.\n\
         Hero is severely wounded."
    );

    let text = rpg
        .ok(
            "heal_npc",
            json!({"campaign_id": id, "npc_name": "Hero", "heal_dice": "1d6", "source": "a potion"}),
        )
        .await;
    assert_eq!(
        text,
        "Hero receives major restoration from a potion.\n\
         Hero recovers from severely wounded to slightly wounded."
    );

    let status = rpg
        .ok("get_combat_status", json!({"campaign_id": id}))
        .await;
    assert!(status.contains("- Hero (team: Hero): slightly wounded"));
}

#[tokio::test]
async fn test_heal_at_full_health() {
    let rpg = RpgTest::start([4]).await;
    let id = rpg.campaign("Rest", Some(("Hero", 20))).await;

    let text = rpg
        .ok(
            "heal_npc",
            json!({"campaign_id": id, "npc_name": "Hero", "heal_dice": "2d6", "source": "a cleric"}),
        )
        .await;
    assert_eq!(
        text,
        "Hero receives healing from a cleric, but is already in perfect health."
    );
}

#[tokio::test]
async fn test_quest_fuzzy_match_prefers_exact() {
    let rpg = RpgTest::start([]).await;
    let id = rpg.campaign("Quests", None).await;
    rpg.ok("create_npc", json!({"campaign_id": id, "name": "Aria"}))
        .await;
    rpg.ok(
        "create_npc",
        json!({"campaign_id": id, "name": "King Alden", "keywords": ["king"]}),
    )
    .await;

    for todo in ["Find the sword of kings", "Find the sword"] {
        rpg.ok(
            "add_npc_todo",
            json!({
                "campaign_id": id,
                "npc_name": "Aria",
                "todo_name": todo,
                "source": "king",
                "source_is_npc": true
            }),
        )
        .await;
    }

    let text = rpg
        .ok(
            "complete_todo",
            json!({
                "campaign_id": id,
                "npc_name": "Aria",
                "todo_name": "find the SWORD",
                "resolution": "Pulled from the lake"
            }),
        )
        .await;
    assert_eq!(
        text,
        "Aria completed 'Find the sword'.\n\
         Resolution: Pulled from the lake\n\
         Insight added to Aria.\n\
         Insight added to King Alden."
    );

    let king = rpg
        .ok("get_npc", json!({"campaign_id": id, "npc_name": "king"}))
        .await;
    assert!(king.contains("- Aria completed 'Find the sword' for them: Pulled from the lake"));

    let aria = rpg
        .ok("get_npc", json!({"campaign_id": id, "npc_name": "Aria"}))
        .await;
    assert!(aria.contains("- Find the sword of kings"));
}

#[tokio::test]
async fn test_deleted_campaign_is_gone() {
    let rpg = RpgTest::start([]).await;
    let id = rpg.campaign("Short Lived", Some(("Hero", 20))).await;

    assert_eq!(
        rpg.ok("delete_campaign", json!({"campaign_id": id})).await,
        "Campaign 'Short Lived' deleted."
    );
    assert!(rpg
        .err("list_npcs", json!({"campaign_id": id}))
        .await
        .starts_with("Error: Campaign '"));
    assert_eq!(
        rpg.ok("list_campaigns", json!({})).await,
        "No campaigns yet. Use begin_campaign to start one."
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_updates_are_not_lost() {
    let rpg = RpgTest::start([]).await;
    let id = rpg.campaign("Market", None).await;
    rpg.ok("create_npc", json!({"campaign_id": id, "name": "Mira"}))
        .await;

    let mut tasks = Vec::new();
    for _ in 0..20 {
        let tools = rpg.tools.clone();
        let id = id.clone();
        tasks.push(tokio::spawn(async move {
            tools
                .call(
                    "add_money",
                    json!({"campaign_id": id, "npc_name": "Mira", "amount": 5}),
                )
                .await
        }));
    }
    for task in tasks {
        assert!(!task.await.unwrap().is_error);
    }

    let inventory = rpg
        .ok("get_inventory", json!({"campaign_id": id, "npc_name": "Mira"}))
        .await;
    assert!(inventory.contains("Money: 100"));
}

#[tokio::test]
async fn test_creature_without_weapon_named_fails() {
    // goblin HP 3+4, d20 20
    let rpg = RpgTest::start([3, 4, 20]).await;
    let id = rpg.campaign("Cave", Some(("Hero", 20))).await;
    rpg.ok(
        "create_bestiary_entry",
        json!({
            "campaign_id": id,
            "name": "goblin",
            "threat_level": "low",
            "hp": "2d6",
            "weapons": {"dagger": "1d4"}
        }),
    )
    .await;

    assert_eq!(
        rpg.err(
            "attack",
            json!({"campaign_id": id, "attacker": "goblin", "target": "Hero"})
        )
        .await,
        "Error: goblin doesn't have 'unarmed'. Available weapons: dagger"
    );
    assert_eq!(
        rpg.ok("get_combat_status", json!({"campaign_id": id})).await,
        "No active combat."
    );
}

#[tokio::test]
async fn test_update_item_turns_tool_into_weapon() {
    // d20 20, crowbar 6 of 1d6, location leg
    let rpg = RpgTest::start([20, 6, 3]).await;
    let id = rpg.campaign("Heist", Some(("Hero", 20))).await;
    rpg.ok("create_npc", json!({"campaign_id": id, "name": "Guard"}))
        .await;
    rpg.ok(
        "add_item",
        json!({"campaign_id": id, "npc_name": "Hero", "item_name": "crowbar"}),
    )
    .await;

    assert!(rpg
        .err(
            "update_item",
            json!({"campaign_id": id, "npc_name": "Hero", "item_name": "crowbar", "is_weapon": true}),
        )
        .await
        .starts_with("Error: Weapons need a damage formula"));
    assert_eq!(
        rpg.ok(
            "update_item",
            json!({
                "campaign_id": id,
                "npc_name": "Hero",
                "item_name": "crowbar",
                "is_weapon": true,
                "damage": "1d6"
            }),
        )
        .await,
        "Updated Hero's inventory: crowbar (weapon, 1d6) [found]"
    );

    let text = rpg
        .ok(
            "attack",
            json!({"campaign_id": id, "attacker": "Hero", "target": "Guard", "weapon": "crowbar"}),
        )
        .await;
    assert_eq!(
        text,
        "Hero attacks Guard with crowbar.\n\
         The attack crashes down with devastating force into the leg.\n\
         Guard is moderately wounded."
    );
}
