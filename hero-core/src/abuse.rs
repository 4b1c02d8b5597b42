//! Anti-abuse lockout.
//!
//! Players who spam nonsense get a three-strikes counter: only inputs
//! the narrator judged useless count, anything coherent resets the
//! streak. Once blocked, the counter stays blocked until explicitly
//! reset (picking a suggested action does that).

use crate::config::MAX_USELESS_INPUTS;
use crate::response::InputQuality;
use serde::{Deserialize, Serialize};

/// Tracks consecutive useless inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AbuseCounter {
    consecutive_useless: u32,
    threshold: u32,
    blocked: bool,
}

impl Default for AbuseCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl AbuseCounter {
    pub fn new() -> Self {
        Self::with_threshold(MAX_USELESS_INPUTS)
    }

    pub fn with_threshold(threshold: u32) -> Self {
        Self {
            consecutive_useless: 0,
            threshold,
            blocked: false,
        }
    }

    /// Record the narrator's judgement of one input. Useless inputs
    /// increment the streak; everything else resets it.
    pub fn record(&mut self, quality: InputQuality) {
        match quality {
            InputQuality::Useless => {
                self.consecutive_useless += 1;
                if self.consecutive_useless >= self.threshold {
                    self.blocked = true;
                }
            }
            _ => self.reset(),
        }
    }

    /// Clear the streak and lift any block.
    pub fn reset(&mut self) {
        self.consecutive_useless = 0;
        self.blocked = false;
    }

    pub fn is_blocked(&self) -> bool {
        self.blocked
    }

    pub fn count(&self) -> u32 {
        self.consecutive_useless
    }
}
