//! Tabletop dice rolling.
//!
//! Supports the standard `NdF+M` notation (e.g. `3d6+10`): N independent
//! uniform rolls on an F-sided die, plus a signed modifier. Totals are
//! floored at 1.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error type for dice parsing.
#[derive(Debug, Error)]
pub enum DiceError {
    #[error("Invalid dice notation: '{0}'")]
    InvalidNotation(String),
}

/// A parsed dice expression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiceExpression {
    pub count: u32,
    pub faces: u32,
    pub modifier: i32,
    pub original: String,
}

impl DiceExpression {
    /// Parse a dice notation string.
    ///
    /// Accepts exactly `<N>d<F>` with an optional `+M` or `-M` suffix.
    /// Zero dice, zero faces, and anything else malformed is rejected.
    pub fn parse(notation: &str) -> Result<Self, DiceError> {
        let cleaned = notation.trim().to_lowercase();
        let invalid = || DiceError::InvalidNotation(notation.to_string());

        let (count_str, rest) = cleaned.split_once('d').ok_or_else(invalid)?;

        let (faces_str, modifier) = if let Some(pos) = rest.find(['+', '-']) {
            let (faces, sign_and_value) = rest.split_at(pos);
            let sign = if sign_and_value.starts_with('-') { -1 } else { 1 };
            let value: i32 = parse_digits(&sign_and_value[1..]).ok_or_else(invalid)?;
            (faces, sign * value)
        } else {
            (rest, 0)
        };

        let count: u32 = parse_digits(count_str).ok_or_else(invalid)?;
        let faces: u32 = parse_digits(faces_str).ok_or_else(invalid)?;

        if count == 0 || faces == 0 {
            return Err(invalid());
        }

        Ok(DiceExpression {
            count,
            faces,
            modifier,
            original: cleaned,
        })
    }

    /// Roll the expression and return the total.
    pub fn roll(&self) -> i32 {
        self.roll_with_rng(&mut rand::thread_rng())
    }

    /// Roll with a specific RNG (useful for testing).
    pub fn roll_with_rng<R: Rng>(&self, rng: &mut R) -> i32 {
        self.roll_detailed_with_rng(rng).total
    }

    /// Roll and return the individual dice alongside the total.
    pub fn roll_detailed(&self) -> RollDetails {
        self.roll_detailed_with_rng(&mut rand::thread_rng())
    }

    pub fn roll_detailed_with_rng<R: Rng>(&self, rng: &mut R) -> RollDetails {
        let rolls: Vec<u32> = (0..self.count)
            .map(|_| rng.gen_range(1..=self.faces))
            .collect();
        let sum: i32 = rolls.iter().map(|&r| r as i32).sum();

        RollDetails {
            notation: self.original.clone(),
            rolls,
            modifier: self.modifier,
            total: (sum + self.modifier).max(1),
        }
    }
}

impl FromStr for DiceExpression {
    type Err = DiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DiceExpression::parse(s)
    }
}

impl fmt::Display for DiceExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.original)
    }
}

/// Complete result of a dice roll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollDetails {
    pub notation: String,
    pub rolls: Vec<u32>,
    pub modifier: i32,
    pub total: i32,
}

impl fmt::Display for RollDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dice: Vec<String> = self.rolls.iter().map(|r| r.to_string()).collect();
        write!(f, "[{}]", dice.join(", "))?;
        if self.modifier > 0 {
            write!(f, " + {}", self.modifier)?;
        } else if self.modifier < 0 {
            write!(f, " - {}", self.modifier.abs())?;
        }
        write!(f, " = {}", self.total)
    }
}

// Strict digit parsing: `u32::from_str` would accept a leading `+`,
// which the notation grammar does not.
fn parse_digits<T: FromStr>(s: &str) -> Option<T> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// Convenience function to roll dice from a notation string.
pub fn roll(notation: &str) -> Result<i32, DiceError> {
    Ok(DiceExpression::parse(notation)?.roll())
}

/// Roll from a notation string, returning the individual dice too.
pub fn roll_with_details(notation: &str) -> Result<RollDetails, DiceError> {
    Ok(DiceExpression::parse(notation)?.roll_detailed())
}
