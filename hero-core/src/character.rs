//! Character state and stat rolling.

use crate::config::{HP_DICE_NOTATION, MAX_HP, MIN_ROLLED_HP};
use crate::dice::{DiceExpression, RollDetails};
use crate::inventory::Inventory;
use crate::response::{GameResponse, GameStatus, InputQuality};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// The outcome of rolling starting stats.
#[derive(Debug, Clone)]
pub struct StatRoll {
    pub hp: i32,
    pub hp_max: i32,
    /// The individual dice, for display.
    pub details: RollDetails,
}

/// Roll starting hit points: 3d6+10, clamped to [15, 30].
pub fn roll_initial_stats() -> StatRoll {
    roll_initial_stats_with_rng(&mut rand::thread_rng())
}

pub fn roll_initial_stats_with_rng<R: Rng>(rng: &mut R) -> StatRoll {
    // The notation is a compile-time constant; parsing it cannot fail.
    let expr = DiceExpression::parse(HP_DICE_NOTATION)
        .expect("hit point dice notation is valid");
    let details = expr.roll_detailed_with_rng(rng);
    let hp = details.total.clamp(MIN_ROLLED_HP, MAX_HP);
    StatRoll {
        hp,
        hp_max: hp,
        details,
    }
}

/// The player character's mutable state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CharacterState {
    pub hp: i32,
    pub hp_max: i32,
    pub inventory: Inventory,
}

impl CharacterState {
    pub fn new(hp: i32, hp_max: i32, inventory: Inventory) -> Self {
        Self {
            hp,
            hp_max,
            inventory,
        }
    }

    pub fn from_roll(roll: &StatRoll, inventory: Inventory) -> Self {
        Self::new(roll.hp, roll.hp_max, inventory)
    }

    pub fn is_alive(&self) -> bool {
        self.hp > 0
    }

    /// Apply one validated turn and report the resulting status.
    ///
    /// Error turns never mutate anything. Inventory deltas only apply
    /// when the input was valid and the model vouched for them. Running
    /// out of hit points always loses, whatever the model claimed.
    pub fn apply(&mut self, response: &GameResponse) -> GameStatus {
        if response.is_error {
            return GameStatus::Playing;
        }

        self.hp = (self.hp + response.hp_change).clamp(0, self.hp_max);

        if response.input_quality == InputQuality::Valid && response.inventory_validated {
            self.inventory
                .apply(&response.inventory_add, &response.inventory_remove);
        }

        if response.game_status == GameStatus::Lost || self.hp <= 0 {
            GameStatus::Lost
        } else if response.game_status == GameStatus::Won {
            GameStatus::Won
        } else {
            GameStatus::Playing
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use serde_json::json;

    fn character() -> CharacterState {
        CharacterState::new(
            20,
            30,
            Inventory::new(vec!["Water flask".to_string()]),
        )
    }

    fn turn(fields: serde_json::Value) -> GameResponse {
        GameResponse::parse(&fields.to_string())
    }

    #[test]
    fn test_stat_roll_in_bounds() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let roll = roll_initial_stats_with_rng(&mut rng);
            assert!((MIN_ROLLED_HP..=MAX_HP).contains(&roll.hp));
            assert_eq!(roll.hp, roll.hp_max);
            assert_eq!(roll.details.rolls.len(), 3);
        }
    }

    #[test]
    fn test_hp_clamped_to_bounds() {
        let mut c = character();
        c.apply(&turn(json!({"story": "x", "hp_change": 100})));
        assert_eq!(c.hp, 30);

        c.apply(&turn(json!({"story": "x", "hp_change": -100})));
        assert_eq!(c.hp, 0);
        assert!(!c.is_alive());
    }

    #[test]
    fn test_zero_hp_loses_even_if_model_says_playing() {
        let mut c = character();
        let status = c.apply(&turn(json!({
            "story": "x", "hp_change": -25, "game_status": "playing"
        })));
        assert_eq!(status, GameStatus::Lost);
    }

    #[test]
    fn test_lost_takes_precedence_over_won() {
        let mut c = character();
        let status = c.apply(&turn(json!({
            "story": "x", "hp_change": -25, "game_status": "won"
        })));
        assert_eq!(status, GameStatus::Lost);
    }

    #[test]
    fn test_inventory_gated_on_validation() {
        let mut c = character();
        c.apply(&turn(json!({
            "story": "x",
            "inventory_validated": false,
            "inventory_add": ["Sword"]
        })));
        assert!(!c.inventory.contains("Sword"));

        c.apply(&turn(json!({
            "story": "x",
            "input_quality": "useless",
            "inventory_add": ["Sword"]
        })));
        assert!(!c.inventory.contains("Sword"));

        c.apply(&turn(json!({
            "story": "x",
            "inventory_add": ["Sword"]
        })));
        assert!(c.inventory.contains("Sword"));
    }

    #[test]
    fn test_error_turn_is_inert() {
        let mut c = character();
        let before = c.clone();
        let status = c.apply(&GameResponse::error("network down"));
        assert_eq!(status, GameStatus::Playing);
        assert_eq!(c.hp, before.hp);
        assert_eq!(c.inventory, before.inventory);
    }
}
