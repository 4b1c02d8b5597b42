//! Test doubles for deterministic, offline game testing.
//!
//! [`MockNarrator`] replays scripted replies instead of calling an API;
//! [`TestHarness`] wires one into a full session with a character sheet
//! so end-to-end turn flows can be asserted synchronously.

use crate::character::{roll_initial_stats, CharacterState};
use crate::narrator::{GenerationParams, ModelError, NarrativeModel};
use crate::response::{GameResponse, GameStatus};
use crate::session::{GameSession, SessionConfig};
use crate::theme::GameTheme;
use async_trait::async_trait;
use groq::ChatMessage;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// A minimal well-formed narrator reply.
pub fn turn(story: &str) -> Value {
    json!({
        "type": "game",
        "story": story,
        "hp_change": 0,
        "game_status": "playing",
        "input_quality": "valid",
        "inventory_validated": true,
        "suggested_actions": ["Look", "Listen", "Move", "Wait"],
        "scene_description": "A test scene",
        "inventory_add": [],
        "inventory_remove": []
    })
}

/// A reply judging the player's input useless.
pub fn useless_turn(story: &str) -> Value {
    let mut value = turn(story);
    value["input_quality"] = json!("useless");
    value
}

/// A narrator that replays scripted replies in order.
///
/// When the script runs dry it falls back to a generic valid turn, so
/// tests only script the replies they care about.
pub struct MockNarrator {
    replies: Mutex<VecDeque<Result<String, ModelError>>>,
}

impl Default for MockNarrator {
    fn default() -> Self {
        Self::new()
    }
}

impl MockNarrator {
    pub fn new() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
        }
    }

    pub fn queue_json(&self, value: Value) {
        self.queue_raw(value.to_string());
    }

    pub fn queue_raw(&self, raw: impl Into<String>) {
        self.lock().push_back(Ok(raw.into()));
    }

    pub fn queue_error(&self, error: ModelError) {
        self.lock().push_back(Err(error));
    }

    /// Scripted replies not yet consumed.
    pub fn remaining(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<Result<String, ModelError>>> {
        match self.replies.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[async_trait]
impl NarrativeModel for MockNarrator {
    async fn complete(
        &self,
        _messages: &[ChatMessage],
        _params: &GenerationParams,
    ) -> Result<String, ModelError> {
        self.lock()
            .pop_front()
            .unwrap_or_else(|| Ok(turn("The story continues.").to_string()))
    }
}

/// A complete mock-driven game: session plus character sheet.
pub struct TestHarness {
    mock: Arc<MockNarrator>,
    session: GameSession,
    character: CharacterState,
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

impl TestHarness {
    pub fn new() -> Self {
        Self::with_config(SessionConfig::new())
    }

    pub fn with_config(config: SessionConfig) -> Self {
        let mock = Arc::new(MockNarrator::new());
        let session = GameSession::new(Box::new(mock.clone()), config);
        let roll = roll_initial_stats();
        Self {
            mock,
            session,
            character: CharacterState::from_roll(&roll, Default::default()),
        }
    }

    /// Script the next narrator reply.
    pub fn expect_turn(&self, value: Value) {
        self.mock.queue_json(value);
    }

    /// Script the next narrator call to fail.
    pub fn expect_error(&self, error: ModelError) {
        self.mock.queue_error(error);
    }

    /// Start a game and sync the character sheet to it.
    pub async fn start(&mut self, theme: &GameTheme) -> GameResponse {
        let response = self.session.initiate_game(theme).await;
        self.character.inventory = self.session.inventory().clone();
        response
    }

    /// Play one free-text turn, applying its effects to the character.
    pub async fn act(&mut self, action: &str) -> (GameResponse, GameStatus) {
        let response = self.session.step(action).await;
        let status = self.character.apply(&response);
        (response, status)
    }

    /// Play one turn via a suggested action.
    pub async fn act_suggested(&mut self, action: &str) -> (GameResponse, GameStatus) {
        let response = self.session.step_with_suggested_action(action).await;
        let status = self.character.apply(&response);
        (response, status)
    }

    pub fn player_hp(&self) -> i32 {
        self.character.hp
    }

    pub fn character(&self) -> &CharacterState {
        &self.character
    }

    pub fn inventory(&self) -> Vec<String> {
        self.session.inventory().items().to_vec()
    }

    pub fn is_blocked(&self) -> bool {
        self.session.is_blocked()
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::ThemeLibrary;

    #[tokio::test]
    async fn test_mock_replays_in_order_then_falls_back() {
        let mock = MockNarrator::new();
        mock.queue_raw("first");
        mock.queue_raw("second");

        let params = GenerationParams::default();
        assert_eq!(mock.complete(&[], &params).await.unwrap(), "first");
        assert_eq!(mock.complete(&[], &params).await.unwrap(), "second");

        let fallback = mock.complete(&[], &params).await.unwrap();
        assert!(!GameResponse::parse(&fallback).is_error);
    }

    #[tokio::test]
    async fn test_harness_start_syncs_inventory() {
        let mut harness = TestHarness::new();
        harness.expect_turn(turn("You arrive."));
        harness.start(ThemeLibrary::get("jungle").unwrap()).await;

        assert_eq!(harness.inventory(), harness.character().inventory.items());
        assert!(harness.player_hp() >= crate::config::MIN_ROLLED_HP);
    }
}
