//! Turn engine for an LLM-narrated interactive fiction game.
//!
//! This crate provides:
//! - A JSON turn contract with a total validator (malformed model
//!   output becomes an inert error turn, never a panic)
//! - A turn engine owning conversation history, lifecycle state and an
//!   anti-abuse lockout
//! - An authoritative inventory ledger and character sheet
//! - Dice rolling, a built-in theme library, and optional media
//!   provider seams (speech, transcription, illustration)
//!
//! # Quick Start
//!
//! ```ignore
//! use hero_core::{GameSession, SessionConfig, ThemeLibrary};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut session = GameSession::from_env(SessionConfig::new())?;
//!
//!     let theme = ThemeLibrary::get("manor").unwrap();
//!     let opening = session.initiate_game(theme).await;
//!     println!("{}", opening.story);
//!
//!     let turn = session.step("question the butler").await;
//!     println!("{}", turn.story);
//!     Ok(())
//! }
//! ```

pub mod abuse;
pub mod character;
pub mod config;
pub mod dice;
pub mod engine;
pub mod inventory;
pub mod narrator;
pub mod providers;
pub mod response;
pub mod session;
pub mod testing;
pub mod theme;

// Primary public API
pub use character::{roll_initial_stats, CharacterState, StatRoll};
pub use engine::{EngineConfig, EngineState, TurnEngine};
pub use inventory::Inventory;
pub use narrator::{GenerationParams, GroqNarrator, ModelError, NarrativeModel};
pub use response::{GameResponse, GameStatus, InputQuality};
pub use session::{GameSession, SessionConfig, SessionError};
pub use testing::{MockNarrator, TestHarness};
pub use theme::{GameTheme, ThemeLibrary};
