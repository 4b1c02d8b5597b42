//! The inventory ledger.
//!
//! The narrator model only proposes deltas; this ledger is the single
//! source of truth for what the player owns. Removal is case-insensitive
//! because the model rarely echoes item names with exact casing.

use serde::{Deserialize, Serialize};

/// The player's items, in acquisition order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    items: Vec<String>,
}

impl Inventory {
    pub fn new(items: Vec<String>) -> Self {
        Self { items }
    }

    /// Add an item. Leading and trailing whitespace is trimmed; empty
    /// names and exact duplicates are ignored. Returns whether the item
    /// was added.
    pub fn add(&mut self, item: &str) -> bool {
        let item = item.trim();
        if item.is_empty() || self.items.iter().any(|i| i == item) {
            return false;
        }
        self.items.push(item.to_string());
        true
    }

    /// Remove the first item matching case-insensitively. Removing an
    /// item the player does not own is a silent no-op. Returns whether
    /// anything was removed.
    pub fn remove(&mut self, item: &str) -> bool {
        let wanted = item.trim().to_lowercase();
        if let Some(pos) = self
            .items
            .iter()
            .position(|i| i.trim().to_lowercase() == wanted)
        {
            self.items.remove(pos);
            return true;
        }
        false
    }

    /// Apply a turn's worth of deltas: removals first, then additions.
    pub fn apply(&mut self, add: &[String], remove: &[String]) {
        for item in remove {
            self.remove(item);
        }
        for item in add {
            self.add(item);
        }
    }

    pub fn contains(&self, item: &str) -> bool {
        let wanted = item.trim().to_lowercase();
        self.items.iter().any(|i| i.trim().to_lowercase() == wanted)
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Render the inventory the way the narrator prompt expects it:
    /// a numbered list with an explicit total, or an unambiguous
    /// "owns nothing" marker.
    pub fn format_for_narrator(&self) -> String {
        if self.items.is_empty() {
            return "- (Inventory empty - the player owns NOTHING)".to_string();
        }
        let mut out = String::new();
        for (i, item) in self.items.iter().enumerate() {
            out.push_str(&format!("  {}. {}\n", i + 1, item));
        }
        out.push_str(&format!("  TOTAL: {} item(s)", self.items.len()));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Inventory {
        Inventory::new(vec!["Leather pouch".to_string(), "Water flask".to_string()])
    }

    #[test]
    fn test_add_trims_and_dedups() {
        let mut inv = sample();
        assert!(inv.add("  Rusty key  "));
        assert_eq!(inv.items().last().unwrap(), "Rusty key");

        assert!(!inv.add("Rusty key"));
        assert!(!inv.add("   "));
        assert_eq!(inv.len(), 3);
    }

    #[test]
    fn test_remove_is_case_insensitive() {
        let mut inv = sample();
        assert!(inv.remove("water FLASK"));
        assert_eq!(inv.items(), &["Leather pouch".to_string()]);
    }

    #[test]
    fn test_remove_missing_is_noop() {
        let mut inv = sample();
        assert!(!inv.remove("Sword"));
        assert_eq!(inv.len(), 2);
    }

    #[test]
    fn test_remove_takes_first_match_only() {
        let mut inv = Inventory::new(vec![
            "Torch".to_string(),
            "torch".to_string(),
            "Rope".to_string(),
        ]);
        inv.remove("TORCH");
        assert_eq!(inv.items(), &["torch".to_string(), "Rope".to_string()]);
    }

    #[test]
    fn test_apply_removes_then_adds() {
        let mut inv = sample();
        inv.apply(
            &["Rusty key".to_string()],
            &["Leather pouch".to_string(), "Ghost item".to_string()],
        );
        assert_eq!(
            inv.items(),
            &["Water flask".to_string(), "Rusty key".to_string()]
        );
    }

    #[test]
    fn test_format_nonempty() {
        let formatted = sample().format_for_narrator();
        assert!(formatted.contains("1. Leather pouch"));
        assert!(formatted.contains("2. Water flask"));
        assert!(formatted.contains("TOTAL: 2 item(s)"));
    }

    #[test]
    fn test_format_empty() {
        let inv = Inventory::default();
        assert!(inv.format_for_narrator().contains("owns NOTHING"));
    }
}
