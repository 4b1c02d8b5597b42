//! The narrative-turn contract.
//!
//! The narrator model is untrusted: it sometimes wraps its JSON in code
//! fences, omits fields, or returns prose. [`GameResponse::parse`] is a
//! total function that turns any raw reply into a fully-populated
//! `GameResponse` - downstream consumers never see missing fields and
//! never catch a panic from this boundary.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Number of suggested actions every response carries.
pub const SUGGESTED_ACTION_COUNT: usize = 4;

/// Fillers appended when the model supplies fewer than 4 actions.
const FILLER_ACTIONS: [&str; 4] = [
    "Observe carefully",
    "Advance cautiously",
    "Search for another way",
    "Wait and think",
];

/// Generic actions offered alongside an error response.
const ERROR_ACTIONS: [&str; 4] = [
    "Retry the same action",
    "Do something else",
    "Observe your surroundings",
    "Wait a moment",
];

const DEFAULT_SCENE: &str = "A mysterious place";

/// Maximum length of a diagnostic embedded in an error response.
const MAX_DIAGNOSTIC_LEN: usize = 50;

/// Whether the game continues, or how it ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    #[default]
    Playing,
    Won,
    Lost,
}

impl GameStatus {
    fn from_key(key: &str) -> GameStatus {
        match key {
            "won" => GameStatus::Won,
            "lost" => GameStatus::Lost,
            _ => GameStatus::Playing,
        }
    }
}

/// The model's judgement of the player's input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputQuality {
    #[default]
    Valid,
    Useless,
    Blocked,
}

impl InputQuality {
    fn from_key(key: &str) -> InputQuality {
        match key {
            "useless" => InputQuality::Useless,
            "blocked" => InputQuality::Blocked,
            _ => InputQuality::Valid,
        }
    }
}

/// One validated narrative turn.
#[derive(Debug, Clone, Serialize)]
pub struct GameResponse {
    /// Message kind as reported by the model ("game", "init", ...).
    pub kind: String,
    pub story: String,
    pub hp_change: i32,
    pub game_status: GameStatus,
    pub input_quality: InputQuality,
    /// Whether the model checked inventory-dependent claims.
    pub inventory_validated: bool,
    /// Always exactly [`SUGGESTED_ACTION_COUNT`] entries.
    pub suggested_actions: Vec<String>,
    pub scene_description: String,
    /// Optional; empty means "use the scene description".
    pub image_prompt: String,
    pub inventory_add: Vec<String>,
    pub inventory_remove: Vec<String>,

    pub is_error: bool,
    pub error_message: String,
    /// The model's raw reply, kept for conversation history.
    #[serde(skip)]
    pub raw_response: String,
}

impl Default for GameResponse {
    fn default() -> Self {
        Self {
            kind: "game".to_string(),
            story: String::new(),
            hp_change: 0,
            game_status: GameStatus::Playing,
            input_quality: InputQuality::Valid,
            inventory_validated: true,
            suggested_actions: FILLER_ACTIONS.iter().map(|s| s.to_string()).collect(),
            scene_description: DEFAULT_SCENE.to_string(),
            image_prompt: String::new(),
            inventory_add: Vec::new(),
            inventory_remove: Vec::new(),
            is_error: false,
            error_message: String::new(),
            raw_response: String::new(),
        }
    }
}

impl GameResponse {
    /// Build an error response.
    ///
    /// Gameplay-affecting fields are inert by construction: an error turn
    /// must never mutate character state.
    pub fn error(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            story: format!("*The thread of fate tangles for a moment...* {message}"),
            is_error: true,
            error_message: message,
            suggested_actions: ERROR_ACTIONS.iter().map(|s| s.to_string()).collect(),
            hp_change: 0,
            inventory_add: Vec::new(),
            inventory_remove: Vec::new(),
            ..Self::default()
        }
    }

    /// Parse and validate a raw model reply. Never fails: malformed input
    /// yields an error response instead.
    pub fn parse(raw: &str) -> Self {
        let content = extract_json_block(raw);

        let data: Value = match serde_json::from_str(content) {
            Ok(value) => value,
            Err(_) => {
                return GameResponse::error("Format error. The narrator is rephrasing...");
            }
        };

        match Self::from_value(&data) {
            Ok(mut response) => {
                response.raw_response = raw.to_string();
                response
            }
            Err(detail) => GameResponse::error(format!(
                "Unexpected error: {}",
                truncate(&detail, MAX_DIAGNOSTIC_LEN)
            )),
        }
    }

    /// Map a parsed JSON value onto the contract, applying per-field
    /// defaults for anything absent or mistyped.
    fn from_value(data: &Value) -> Result<Self, String> {
        let obj = data
            .as_object()
            .ok_or_else(|| "response is not a JSON object".to_string())?;

        let str_field = |key: &str, default: &str| -> String {
            obj.get(key)
                .and_then(Value::as_str)
                .unwrap_or(default)
                .to_string()
        };

        let list_field = |key: &str| -> Vec<String> {
            obj.get(key)
                .and_then(Value::as_array)
                .map(|items| {
                    items
                        .iter()
                        .filter_map(Value::as_str)
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default()
        };

        let mut suggested: Vec<String> = list_field("suggested_actions");
        suggested.truncate(SUGGESTED_ACTION_COUNT);
        pad_suggested_actions(&mut suggested);

        Ok(Self {
            kind: str_field("type", "game"),
            story: str_field("story", ""),
            hp_change: coerce_int(obj.get("hp_change")),
            game_status: GameStatus::from_key(&str_field("game_status", "playing")),
            input_quality: InputQuality::from_key(&str_field("input_quality", "valid")),
            inventory_validated: obj
                .get("inventory_validated")
                .and_then(Value::as_bool)
                .unwrap_or(true),
            suggested_actions: suggested,
            scene_description: str_field("scene_description", DEFAULT_SCENE),
            image_prompt: str_field("image_prompt", ""),
            inventory_add: list_field("inventory_add"),
            inventory_remove: list_field("inventory_remove"),
            is_error: false,
            error_message: String::new(),
            raw_response: String::new(),
        })
    }

    /// The prompt to illustrate this turn with, falling back to the
    /// scene description when the model gave none.
    pub fn image_prompt_or_scene(&self) -> &str {
        if self.image_prompt.trim().is_empty() {
            &self.scene_description
        } else {
            &self.image_prompt
        }
    }
}

/// Pad to exactly [`SUGGESTED_ACTION_COUNT`] actions without duplicating
/// anything the model already supplied.
fn pad_suggested_actions(actions: &mut Vec<String>) {
    for filler in FILLER_ACTIONS {
        if actions.len() >= SUGGESTED_ACTION_COUNT {
            break;
        }
        if !actions.iter().any(|a| a == filler) {
            actions.push(filler.to_string());
        }
    }
}

/// Extract the inner content of a fenced code block, with or without a
/// language tag. Text without a complete fence is returned trimmed.
fn extract_json_block(text: &str) -> &str {
    let trimmed = text.trim();
    if let Some(start) = trimmed.find("```") {
        let mut inner = &trimmed[start + 3..];
        if let Some(rest) = inner.strip_prefix("json") {
            inner = rest;
        }
        let inner = inner.trim_start();
        if let Some(end) = inner.find("```") {
            return inner[..end].trim();
        }
    }
    trimmed
}

/// Coerce a JSON value to an integer: accepts numbers (truncating
/// floats) and numeric strings, defaults to 0 otherwise.
fn coerce_int(value: Option<&Value>) -> i32 {
    match value {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .unwrap_or(0) as i32,
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
