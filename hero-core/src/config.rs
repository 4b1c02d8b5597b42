//! Central gameplay constants.

/// Hard ceiling on hit points, applied after the initial roll.
pub const MAX_HP: i32 = 30;

/// Floor applied to the initial hit point roll.
pub const MIN_ROLLED_HP: i32 = 15;

/// Dice notation used to roll starting hit points.
pub const HP_DICE_NOTATION: &str = "3d6+10";

/// Consecutive useless inputs before the session is blocked.
pub const MAX_USELESS_INPUTS: u32 = 3;

/// Starting items when a theme does not define its own.
pub const DEFAULT_INVENTORY: [&str; 3] = ["Leather pouch", "Water flask", "Old map"];

/// The default starting inventory as owned strings.
pub fn default_inventory() -> Vec<String> {
    DEFAULT_INVENTORY.iter().map(|s| s.to_string()).collect()
}
