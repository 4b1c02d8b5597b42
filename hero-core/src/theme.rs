//! Game themes (scenarios).
//!
//! A theme is static configuration: the narrative seed the opening prompt
//! is built from, plus an optional custom starting inventory. Themes can
//! be deserialized from configuration files; a built-in library covers
//! the stock scenarios.

use lazy_static::lazy_static;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

/// A game scenario descriptor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameTheme {
    pub id: String,
    pub name: String,
    pub icon: String,
    pub description: String,
    /// Narrative seed embedded in the opening prompt.
    pub initial_context: String,
    #[serde(default)]
    pub ambient_keywords: Vec<String>,
    /// Starting items; `None` falls back to the default inventory.
    #[serde(default)]
    pub custom_inventory: Option<Vec<String>>,
}

impl GameTheme {
    fn new(
        id: &str,
        name: &str,
        icon: &str,
        description: &str,
        initial_context: &str,
        ambient_keywords: &[&str],
    ) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            icon: icon.to_string(),
            description: description.to_string(),
            initial_context: initial_context.to_string(),
            ambient_keywords: ambient_keywords.iter().map(|s| s.to_string()).collect(),
            custom_inventory: None,
        }
    }

    fn with_inventory(mut self, items: &[&str]) -> Self {
        self.custom_inventory = Some(items.iter().map(|s| s.to_string()).collect());
        self
    }
}

lazy_static! {
    static ref THEMES: Vec<GameTheme> = vec![
        GameTheme::new(
            "orient_express",
            "Murder on the Orient Express",
            "🚂",
            "A lightning-fast whodunit aboard the legendary train",
            "ORIENT EXPRESS, 1934, somewhere between Paris and Istanbul. \
             You are a private detective, summoned urgently to the dining car: \
             the industrialist Mr. Ratchett has been found dead in his cabin, \
             and an avalanche has trapped the train - the murderer is aboard. \
             Three suspects only: Madame Duval, a pale and trembling French \
             actress; Colonel Armstrong, a rigid British officer who looks \
             guilty; Giuseppe the waiter, the nervous last person to see the \
             victim alive. You have four or five actions at most: question \
             suspects, search the victim's cabin, examine the body, accuse. \
             Secretly choose the murderer now and plant one clear clue. \
             Accusing the wrong suspect means defeat; accusing with proof \
             means victory; dithering past six turns lets the killer escape. \
             Keep descriptions short, tense, and fast.",
            &["train", "luxury", "1930s", "mystery", "winter"],
        )
        .with_inventory(&[
            "Notebook",
            "Detective's magnifying glass",
            "Detective's badge",
            "Pocket watch",
        ]),
        GameTheme::new(
            "egypt",
            "Ancient Egypt",
            "🏛️",
            "Political intrigue in the Egypt of the Pharaohs",
            "You are a diplomatic envoy arriving in Memphis, capital of \
             ancient Egypt. Pharaoh Ramses, a mortal but powerful king, has \
             summoned you for a secret mission. The temples are centers of \
             political power, the priests influential administrators, and \
             the monumental architecture testifies to the grandeur of this \
             civilization.",
            &["desert", "pyramids", "nile", "palace", "sand"],
        ),
        GameTheme::new(
            "space",
            "Deep Space Survival",
            "🚀",
            "Alone aboard a drifting ship in uncharted space",
            "You wake in the cryogenics module of the cargo ship Odyssey-7. \
             Alarms flash red. The onboard computer reports the crew missing \
             and the oxygen reserves critical. You are alone, lost in the \
             uncharted sector Zeta-9. Every decision matters for your \
             survival.",
            &["ship", "stars", "module", "console", "void"],
        ),
        GameTheme::new(
            "manor",
            "Victorian Manor",
            "🏚️",
            "An investigation in a mysterious Victorian-era manor",
            "London, 1888. You are a private detective summoned to Blackwood \
             Manor after the Lord's disappearance. The butler greets you \
             under driving rain. The manor is immense, its dark corridors \
             hide secrets, the servants whisper, and the family tears itself \
             apart over the inheritance. It falls to you to uncover the \
             truth.",
            &["fog", "chandelier", "library", "portrait", "rain"],
        ),
        GameTheme::new(
            "jungle",
            "Jungle Expedition",
            "🌿",
            "An archaeological expedition deep in the Amazon",
            "1923. You are an archaeologist in the heart of the Amazon \
             jungle. Your guide has just fled with the provisions. Before \
             you, the ruins of a lost city emerge from the vegetation. The \
             traps of the ancient builders are still armed and the wildlife \
             is hostile. You have your machete, your journal, and your \
             determination.",
            &["vines", "ruins", "river", "parrot", "mist"],
        ),
        GameTheme::new(
            "submarine",
            "Abyssal Depths",
            "🌊",
            "Exploring mysterious ocean depths",
            "You command the research submarine Nautilus II. At a depth of \
             3000 meters you are exploring an unknown oceanic trench. The \
             sonar detects impossible artificial structures. The pressure is \
             immense, the darkness total, and your instruments pick up \
             inexplicable signals rising from the abyss.",
            &["depth", "pressure", "glow", "hull", "silence"],
        ),
    ];
}

/// The built-in theme library.
pub struct ThemeLibrary;

impl ThemeLibrary {
    /// Look up a theme by id.
    pub fn get(theme_id: &str) -> Option<&'static GameTheme> {
        THEMES.iter().find(|t| t.id == theme_id)
    }

    /// All built-in themes.
    pub fn all() -> &'static [GameTheme] {
        &THEMES
    }

    /// Pick a random theme.
    pub fn random() -> &'static GameTheme {
        THEMES
            .choose(&mut rand::thread_rng())
            .expect("built-in theme library is never empty")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_by_id() {
        let theme = ThemeLibrary::get("egypt").unwrap();
        assert_eq!(theme.name, "Ancient Egypt");
        assert!(theme.custom_inventory.is_none());
    }

    #[test]
    fn test_unknown_id() {
        assert!(ThemeLibrary::get("atlantis").is_none());
    }

    #[test]
    fn test_custom_inventory_theme() {
        let theme = ThemeLibrary::get("orient_express").unwrap();
        let items = theme.custom_inventory.as_ref().unwrap();
        assert_eq!(items.len(), 4);
        assert!(items.contains(&"Pocket watch".to_string()));
    }

    #[test]
    fn test_random_is_from_library() {
        let theme = ThemeLibrary::random();
        assert!(ThemeLibrary::get(&theme.id).is_some());
    }

    #[test]
    fn test_theme_deserializes_from_config() {
        let raw = r#"{
            "id": "castle",
            "name": "Forgotten Castle",
            "icon": "🏰",
            "description": "A ruin full of echoes",
            "initial_context": "You push open the rusted gate..."
        }"#;
        let theme: GameTheme = serde_json::from_str(raw).unwrap();
        assert_eq!(theme.id, "castle");
        assert!(theme.ambient_keywords.is_empty());
        assert!(theme.custom_inventory.is_none());
    }
}
