//! The turn engine.
//!
//! Owns the conversation history, the lifecycle state machine and the
//! anti-abuse counter. The engine validates and reports turns but never
//! touches character state; applying hit point and inventory deltas is
//! the caller's job.

use crate::abuse::AbuseCounter;
use crate::config::MAX_USELESS_INPUTS;
use crate::inventory::Inventory;
use crate::narrator::{GenerationParams, ModelError, NarrativeModel};
use crate::response::GameResponse;
use crate::theme::GameTheme;
use groq::ChatMessage;

/// The built-in narrator system prompt.
pub const NARRATOR_PROMPT: &str = include_str!("prompts/narrator.txt");

/// Engine lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    NotStarted,
    Active,
    Won,
    Lost,
}

/// Engine tuning knobs.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub params: GenerationParams,
    /// Replaces the built-in system prompt when set.
    pub system_prompt: Option<String>,
    pub useless_threshold: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            params: GenerationParams::default(),
            system_prompt: None,
            useless_threshold: MAX_USELESS_INPUTS,
        }
    }
}

/// Drives one game: builds prompts, calls the model, validates replies.
pub struct TurnEngine {
    narrator: Box<dyn NarrativeModel>,
    config: EngineConfig,
    history: Vec<ChatMessage>,
    theme: Option<GameTheme>,
    abuse: AbuseCounter,
    state: EngineState,
}

impl TurnEngine {
    pub fn new(narrator: Box<dyn NarrativeModel>, config: EngineConfig) -> Self {
        let threshold = config.useless_threshold;
        Self {
            narrator,
            config,
            history: Vec::new(),
            theme: None,
            abuse: AbuseCounter::with_threshold(threshold),
            state: EngineState::NotStarted,
        }
    }

    /// Start a new game on the given theme, discarding any previous one.
    ///
    /// On a model failure the engine stays in `NotStarted` with empty
    /// history, so initiation can simply be retried.
    pub async fn initiate(&mut self, theme: &GameTheme, inventory: &Inventory) -> GameResponse {
        self.history.clear();
        self.abuse.reset();
        self.state = EngineState::NotStarted;
        self.theme = Some(theme.clone());

        let system = self
            .config
            .system_prompt
            .clone()
            .unwrap_or_else(|| NARRATOR_PROMPT.to_string());
        self.history.push(ChatMessage::system(system));
        self.history
            .push(ChatMessage::user(opening_prompt(theme, inventory)));

        let response = self.call_model().await;
        if response.is_error {
            self.history.clear();
        } else {
            self.state = EngineState::Active;
            self.observe_status(&response);
        }
        response
    }

    /// Play one turn with a free-form player action.
    pub async fn step(&mut self, action: &str, inventory: &Inventory) -> GameResponse {
        match self.state {
            EngineState::NotStarted => {
                return GameResponse::error("The game has not started yet.");
            }
            EngineState::Won | EngineState::Lost => {
                return GameResponse::error("The adventure is already over.");
            }
            EngineState::Active => {}
        }

        let action = action.trim();
        if action.is_empty() {
            return GameResponse::error("Please enter an action.");
        }

        self.history
            .push(ChatMessage::user(turn_prompt(action, inventory)));

        let response = self.call_model().await;
        if response.is_error {
            // A failed turn leaves no trace: retrying the same action
            // must not duplicate it in the conversation.
            self.history.pop();
        } else {
            self.abuse.record(response.input_quality);
            self.observe_status(&response);
        }
        response
    }

    /// Play one turn with a suggested action. Choosing from the menu is
    /// cooperation, so it lifts any lockout before the turn runs.
    pub async fn step_with_suggested_action(
        &mut self,
        action: &str,
        inventory: &Inventory,
    ) -> GameResponse {
        self.abuse.reset();
        self.step(action, inventory).await
    }

    async fn call_model(&mut self) -> GameResponse {
        let raw = match self
            .narrator
            .complete(&self.history, &self.config.params)
            .await
        {
            Ok(raw) => raw,
            Err(err) => return error_from_model(err),
        };

        let response = GameResponse::parse(&raw);
        if !response.is_error {
            self.history
                .push(ChatMessage::assistant(response.raw_response.clone()));
        }
        response
    }

    fn observe_status(&mut self, response: &GameResponse) {
        use crate::response::GameStatus;
        match response.game_status {
            GameStatus::Won => self.state = EngineState::Won,
            GameStatus::Lost => self.state = EngineState::Lost,
            GameStatus::Playing => {}
        }
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn is_blocked(&self) -> bool {
        self.abuse.is_blocked()
    }

    pub fn useless_count(&self) -> u32 {
        self.abuse.count()
    }

    pub fn theme(&self) -> Option<&GameTheme> {
        self.theme.as_ref()
    }

    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }
}

/// The first user message: theme seed plus starting inventory.
fn opening_prompt(theme: &GameTheme, inventory: &Inventory) -> String {
    format!(
        "NEW GAME - THEME: {name}\n\
         \n\
         OPENING CONTEXT:\n\
         {context}\n\
         \n\
         STARTING INVENTORY:\n\
         {items}\n\
         \n\
         The player owns ONLY these items.\n\
         \n\
         Open the adventure: set the scene in 3-4 sentences, give the \
         player a clear immediate situation, and propose four first \
         actions.",
        name = theme.name,
        context = theme.initial_context,
        items = inventory.format_for_narrator(),
    )
}

/// A regular turn: the inventory block first, then the action.
fn turn_prompt(action: &str, inventory: &Inventory) -> String {
    format!(
        "CURRENT INVENTORY (sole source of truth):\n\
         {items}\n\
         \n\
         PLAYER ACTION: {action}\n\
         \n\
         Remember: the player owns ONLY the items listed above.",
        items = inventory.format_for_narrator(),
    )
}

/// Translate a model failure into a player-facing error response.
fn error_from_model(err: ModelError) -> GameResponse {
    match err {
        ModelError::RateLimited(_) => {
            GameResponse::error("The narrator is out of breath. Try again shortly.")
        }
        ModelError::AuthFailure(_) => {
            GameResponse::error("The narrator refused the connection. Check the GROQ_API_KEY configuration.")
        }
        ModelError::Timeout => {
            GameResponse::error("The narrator took too long to answer. Try again.")
        }
        ModelError::Unavailable(_) | ModelError::MalformedResponse(_) => {
            GameResponse::error("Connection trouble with the narrator. Try again.")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_inventory;
    use crate::testing::{turn, MockNarrator};
    use crate::theme::ThemeLibrary;
    use std::sync::Arc;

    fn engine(mock: Arc<MockNarrator>) -> TurnEngine {
        TurnEngine::new(Box::new(mock), EngineConfig::default())
    }

    fn inventory() -> Inventory {
        Inventory::new(default_inventory())
    }

    #[tokio::test]
    async fn test_step_before_initiate_is_rejected() {
        let mut engine = engine(Arc::new(MockNarrator::new()));
        let response = engine.step("look around", &inventory()).await;
        assert!(response.is_error);
        assert_eq!(engine.state(), EngineState::NotStarted);
        assert!(engine.history().is_empty());
    }

    #[tokio::test]
    async fn test_initiate_builds_history() {
        let mock = Arc::new(MockNarrator::new());
        mock.queue_json(turn("The train screeches to a halt."));
        let mut engine = engine(mock);

        let theme = ThemeLibrary::get("orient_express").unwrap();
        let response = engine.initiate(theme, &inventory()).await;
        assert!(!response.is_error);
        assert_eq!(engine.state(), EngineState::Active);
        // system + opening user + assistant reply
        assert_eq!(engine.history().len(), 3);
        assert!(engine.history()[1]
            .content
            .contains("Murder on the Orient Express"));
        assert!(engine.history()[1].content.contains("Leather pouch"));
    }

    #[tokio::test]
    async fn test_failed_initiate_is_retryable() {
        let mock = Arc::new(MockNarrator::new());
        mock.queue_error(ModelError::Timeout);
        mock.queue_json(turn("At last, the fog lifts."));
        let mut engine = engine(mock);
        let theme = ThemeLibrary::get("manor").unwrap();

        let response = engine.initiate(theme, &inventory()).await;
        assert!(response.is_error);
        assert_eq!(engine.state(), EngineState::NotStarted);
        assert!(engine.history().is_empty());

        let response = engine.initiate(theme, &inventory()).await;
        assert!(!response.is_error);
        assert_eq!(engine.state(), EngineState::Active);
    }

    #[tokio::test]
    async fn test_empty_action_skips_model() {
        let mock = Arc::new(MockNarrator::new());
        mock.queue_json(turn("Opening."));
        let mut engine = engine(mock.clone());
        engine
            .initiate(ThemeLibrary::get("egypt").unwrap(), &inventory())
            .await;

        let before = engine.history().len();
        let response = engine.step("   ", &inventory()).await;
        assert!(response.is_error);
        assert_eq!(engine.history().len(), before);
        assert_eq!(mock.remaining(), 0);
    }

    #[tokio::test]
    async fn test_failed_step_pops_user_message() {
        let mock = Arc::new(MockNarrator::new());
        mock.queue_json(turn("Opening."));
        mock.queue_error(ModelError::Unavailable("503".to_string()));
        let mut engine = engine(mock);
        engine
            .initiate(ThemeLibrary::get("egypt").unwrap(), &inventory())
            .await;

        let before = engine.history().len();
        let response = engine.step("enter the temple", &inventory()).await;
        assert!(response.is_error);
        assert_eq!(engine.history().len(), before);
        assert_eq!(engine.state(), EngineState::Active);
    }

    #[tokio::test]
    async fn test_finished_game_rejects_steps() {
        let mock = Arc::new(MockNarrator::new());
        mock.queue_json(turn("Opening."));
        mock.queue_json(serde_json::json!({
            "story": "You solved it.", "game_status": "won"
        }));
        let mut engine = engine(mock);
        engine
            .initiate(ThemeLibrary::get("manor").unwrap(), &inventory())
            .await;

        engine.step("accuse the butler", &inventory()).await;
        assert_eq!(engine.state(), EngineState::Won);

        let response = engine.step("keep playing", &inventory()).await;
        assert!(response.is_error);
        assert!(response.error_message.contains("already over"));
    }

    #[tokio::test]
    async fn test_turn_prompt_carries_inventory() {
        let mock = Arc::new(MockNarrator::new());
        mock.queue_json(turn("Opening."));
        mock.queue_json(turn("You drink."));
        let mut engine = engine(mock);
        engine
            .initiate(ThemeLibrary::get("jungle").unwrap(), &inventory())
            .await;

        engine.step("drink from the flask", &inventory()).await;
        let user_turn = &engine.history()[engine.history().len() - 2];
        assert!(user_turn.content.contains("CURRENT INVENTORY"));
        assert!(user_turn.content.contains("Water flask"));
        assert!(user_turn.content.contains("PLAYER ACTION: drink from the flask"));
    }
}
