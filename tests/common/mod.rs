//! Common test utilities - RpgTest harness driving the tool facade

#![allow(dead_code)]

use std::sync::Arc;

use rpgd::api::{self, AppState};
use rpgd::combat::{Dice, ScriptedRoller};
use rpgd::db::Database;
use rpgd::store::Repositories;
use rpgd::tools::{ToolOutput, Toolbox};
use serde_json::{json, Value};

/// A toolbox over a fresh in-memory database with scripted dice
pub struct RpgTest {
    pub db: Arc<Database>,
    pub tools: Arc<Toolbox>,
}

impl RpgTest {
    /// Start with the given dice script
    pub async fn start(script: impl IntoIterator<Item = u32>) -> Self {
        let db = Database::new(None)
            .await
            .expect("Failed to create database");
        let repos = Repositories::sqlite(db.pool().clone());
        let tools = Toolbox::new(repos, Dice::new(ScriptedRoller::new(script)));
        Self {
            db: Arc::new(db),
            tools: Arc::new(tools),
        }
    }

    /// Call a tool
    pub async fn call(&self, name: &str, args: Value) -> ToolOutput {
        self.tools.call(name, args).await
    }

    /// Call a tool that must succeed and return its text
    pub async fn ok(&self, name: &str, args: Value) -> String {
        let out = self.call(name, args).await;
        assert!(!out.is_error, "{} failed: {}", name, out.text);
        out.text
    }

    /// Call a tool that must fail and return its text
    pub async fn err(&self, name: &str, args: Value) -> String {
        let out = self.call(name, args).await;
        assert!(out.is_error, "{} unexpectedly succeeded: {}", name, out.text);
        out.text
    }

    /// Begin a campaign and return its id
    pub async fn campaign(&self, name: &str, player: Option<(&str, i32)>) -> String {
        let mut args = json!({ "name": name });
        if let Some((player_name, health)) = player {
            args["player_name"] = json!(player_name);
            args["player_health"] = json!(health);
        }
        let text = self.ok("begin_campaign", args).await;
        text.lines()
            .find_map(|l| l.strip_prefix("Campaign ID: "))
            .expect("summary carries the campaign id")
            .to_string()
    }

    /// Router over this harness, optionally requiring an API key
    pub fn router(&self, api_key: Option<&str>) -> axum::Router {
        let state = AppState {
            db: self.db.clone(),
            tools: self.tools.clone(),
            api_key: api_key.map(Arc::from),
        };
        api::router(state, &[])
    }
}
