//! End-to-end turn flow tests driven by a scripted narrator.
//!
//! These exercise the whole stack - session, engine, validator,
//! inventory ledger, abuse counter, character sheet - without any
//! network access.

use hero_core::testing::{turn, useless_turn, TestHarness};
use hero_core::{GameStatus, ModelError, ThemeLibrary};
use serde_json::json;

#[tokio::test]
async fn test_full_adventure_turn() {
    let mut harness = TestHarness::new();
    harness.expect_turn(turn("The jungle closes in behind you."));
    harness
        .start(ThemeLibrary::get("jungle").unwrap())
        .await;

    let hp_before = harness.player_hp();
    harness.expect_turn(json!({
        "type": "game",
        "story": "The lock gives way, slicing your palm.",
        "hp_change": -2,
        "game_status": "playing",
        "input_quality": "valid",
        "inventory_validated": true,
        "suggested_actions": ["Enter", "Bandage your hand", "Listen", "Retreat"],
        "scene_description": "A stone doorway",
        "inventory_add": ["Rusty key"],
        "inventory_remove": []
    }));

    let (response, status) = harness.act("force the lock").await;
    assert!(!response.is_error);
    assert_eq!(status, GameStatus::Playing);
    assert_eq!(harness.player_hp(), hp_before - 2);
    assert!(harness.inventory().contains(&"Rusty key".to_string()));
    assert_eq!(response.suggested_actions.len(), 4);
}

#[tokio::test]
async fn test_lockout_lifecycle() {
    let mut harness = TestHarness::new();
    harness.expect_turn(turn("You wake aboard the Odyssey-7."));
    harness.start(ThemeLibrary::get("space").unwrap()).await;

    for _ in 0..2 {
        harness.expect_turn(useless_turn("The console ignores your mashing."));
        harness.act("asdfgh").await;
        assert!(!harness.is_blocked());
    }

    harness.expect_turn(useless_turn("Nothing happens."));
    harness.act("qwerty").await;
    assert!(harness.is_blocked());

    // Picking from the menu lifts the block before the turn runs.
    harness.expect_turn(turn("You check the oxygen readout."));
    let (response, _) = harness.act_suggested("Look").await;
    assert!(!response.is_error);
    assert!(!harness.is_blocked());
}

#[tokio::test]
async fn test_valid_turn_resets_streak() {
    let mut harness = TestHarness::new();
    harness.expect_turn(turn("Rain hammers the manor windows."));
    harness.start(ThemeLibrary::get("manor").unwrap()).await;

    harness.expect_turn(useless_turn("..."));
    harness.act("blorp").await;
    harness.expect_turn(useless_turn("..."));
    harness.act("blorp").await;
    harness.expect_turn(turn("The butler answers carefully."));
    harness.act("question the butler").await;

    harness.expect_turn(useless_turn("..."));
    harness.act("blorp").await;
    assert!(!harness.is_blocked());
}

#[tokio::test]
async fn test_transport_error_is_isolated() {
    let mut harness = TestHarness::new();
    harness.expect_turn(turn("The dunes stretch to the horizon."));
    harness.start(ThemeLibrary::get("egypt").unwrap()).await;

    let hp = harness.player_hp();
    let inventory = harness.inventory();

    harness.expect_error(ModelError::RateLimited("quota".to_string()));
    let (response, status) = harness.act("enter the temple").await;

    assert!(response.is_error);
    assert!(response.story.contains("out of breath"));
    assert_eq!(status, GameStatus::Playing);
    assert_eq!(harness.player_hp(), hp);
    assert_eq!(harness.inventory(), inventory);
    assert!(!harness.is_blocked());

    // The same action can be retried and succeed.
    harness.expect_turn(turn("You slip between the columns."));
    let (response, _) = harness.act("enter the temple").await;
    assert!(!response.is_error);
}

#[tokio::test]
async fn test_malformed_reply_is_isolated() {
    let mut harness = TestHarness::new();
    harness.expect_turn(turn("The hull groans under pressure."));
    harness.start(ThemeLibrary::get("submarine").unwrap()).await;

    let hp = harness.player_hp();
    harness.expect_turn(json!("just a string, not an object"));
    let (response, _) = harness.act("check the sonar").await;

    assert!(response.is_error);
    assert_eq!(harness.player_hp(), hp);
    assert_eq!(response.suggested_actions.len(), 4);
}

#[tokio::test]
async fn test_defeat_by_hit_points() {
    let mut harness = TestHarness::new();
    harness.expect_turn(turn("The investigation begins."));
    harness
        .start(ThemeLibrary::get("orient_express").unwrap())
        .await;

    harness.expect_turn(json!({
        "story": "The killer strikes from the shadows.",
        "hp_change": -99,
        "game_status": "playing"
    }));
    let (_, status) = harness.act("wander the corridor alone").await;
    assert_eq!(status, GameStatus::Lost);
    assert_eq!(harness.player_hp(), 0);
}

#[tokio::test]
async fn test_victory_ends_the_session() {
    let mut harness = TestHarness::new();
    harness.expect_turn(turn("Three suspects, one train."));
    harness
        .start(ThemeLibrary::get("orient_express").unwrap())
        .await;

    harness.expect_turn(json!({
        "story": "Giuseppe confesses. Case closed.",
        "game_status": "won"
    }));
    let (_, status) = harness.act("accuse Giuseppe with the bloodied napkin").await;
    assert_eq!(status, GameStatus::Won);

    let (response, _) = harness.act("keep investigating").await;
    assert!(response.is_error);
    assert!(response.error_message.contains("already over"));
}

#[tokio::test]
async fn test_sparse_reply_is_padded() {
    let mut harness = TestHarness::new();
    harness.expect_turn(turn("Vines part before your machete."));
    harness.start(ThemeLibrary::get("jungle").unwrap()).await;

    harness.expect_turn(json!({
        "story": "A parrot watches you.",
        "suggested_actions": ["Follow the parrot"]
    }));
    let (response, _) = harness.act("look up").await;
    assert_eq!(response.suggested_actions.len(), 4);
    assert_eq!(response.suggested_actions[0], "Follow the parrot");
}
