//! The game session façade.
//!
//! One session is one player's game: it owns the turn engine and the
//! authoritative inventory snapshot, and absorbs each validated turn's
//! deltas. Hit points live in [`CharacterState`](crate::character),
//! which the caller owns and updates from the same responses.

use crate::character::StatRoll;
use crate::config::default_inventory;
use crate::engine::{EngineConfig, EngineState, TurnEngine};
use crate::inventory::Inventory;
use crate::narrator::{GroqNarrator, NarrativeModel};
use crate::response::{GameResponse, InputQuality};
use crate::theme::GameTheme;
use thiserror::Error;

/// Session construction failures.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("No API key configured: set GROQ_API_KEY")]
    NoApiKey,
}

/// Builder-style session configuration.
#[derive(Debug, Clone, Default)]
pub struct SessionConfig {
    config: EngineConfig,
}

impl SessionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.config.params.model = Some(model.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.config.params.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.config.params.max_tokens = max_tokens;
        self
    }

    pub fn with_top_p(mut self, top_p: f32) -> Self {
        self.config.params.top_p = top_p;
        self
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = Some(prompt.into());
        self
    }

    pub fn with_useless_threshold(mut self, threshold: u32) -> Self {
        self.config.useless_threshold = threshold;
        self
    }

    fn into_engine_config(self) -> EngineConfig {
        self.config
    }
}

/// A single player's game.
pub struct GameSession {
    engine: TurnEngine,
    inventory: Inventory,
    last_response: Option<GameResponse>,
}

impl GameSession {
    pub fn new(narrator: Box<dyn NarrativeModel>, config: SessionConfig) -> Self {
        Self {
            engine: TurnEngine::new(narrator, config.into_engine_config()),
            inventory: Inventory::default(),
            last_response: None,
        }
    }

    /// Build a Groq-backed session from the environment. Fails fast
    /// when no API key is configured.
    pub fn from_env(config: SessionConfig) -> Result<Self, SessionError> {
        let narrator = GroqNarrator::from_env().map_err(|_| SessionError::NoApiKey)?;
        Ok(Self::new(Box::new(narrator), config))
    }

    /// Roll starting stats for the character this session will narrate.
    /// The caller owns the resulting [`CharacterState`](crate::character)
    /// and applies each turn's deltas to it.
    pub fn roll_initial_stats() -> StatRoll {
        crate::character::roll_initial_stats()
    }

    /// Start a game: seeds the inventory from the theme (or the
    /// defaults) and asks the narrator for the opening scene.
    pub async fn initiate_game(&mut self, theme: &GameTheme) -> GameResponse {
        self.inventory = Inventory::new(
            theme
                .custom_inventory
                .clone()
                .unwrap_or_else(default_inventory),
        );
        let response = self.engine.initiate(theme, &self.inventory).await;
        self.absorb(&response);
        response
    }

    /// Play one free-text turn.
    pub async fn step(&mut self, action: &str) -> GameResponse {
        let response = self.engine.step(action, &self.inventory).await;
        self.absorb(&response);
        response
    }

    /// Play one turn chosen from the suggested-action menu.
    pub async fn step_with_suggested_action(&mut self, action: &str) -> GameResponse {
        let response = self
            .engine
            .step_with_suggested_action(action, &self.inventory)
            .await;
        self.absorb(&response);
        response
    }

    // The session's inventory mirrors the same gating CharacterState
    // applies, so the two never drift.
    fn absorb(&mut self, response: &GameResponse) {
        if !response.is_error
            && response.input_quality == InputQuality::Valid
            && response.inventory_validated
        {
            self.inventory
                .apply(&response.inventory_add, &response.inventory_remove);
        }
        self.last_response = Some(response.clone());
    }

    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    /// The action menu from the latest turn.
    pub fn suggested_actions(&self) -> &[String] {
        self.last_response
            .as_ref()
            .map(|r| r.suggested_actions.as_slice())
            .unwrap_or_default()
    }

    /// The scene description from the latest turn.
    pub fn scene(&self) -> Option<&str> {
        self.last_response
            .as_ref()
            .map(|r| r.scene_description.as_str())
    }

    pub fn last_response(&self) -> Option<&GameResponse> {
        self.last_response.as_ref()
    }

    pub fn is_blocked(&self) -> bool {
        self.engine.is_blocked()
    }

    pub fn state(&self) -> EngineState {
        self.engine.state()
    }

    pub fn theme(&self) -> Option<&GameTheme> {
        self.engine.theme()
    }
}
