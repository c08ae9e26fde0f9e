//! Simple dice roller for table use.
//!
//! Supports `XdY+Z` / `XdY-Z` notation. The engine never consults dice for
//! its own resolution; this exists for the narrator's table rolls.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Error type for dice parsing.
#[derive(Debug, Error)]
pub enum DiceError {
    #[error("invalid dice notation: {0}")]
    InvalidNotation(String),
    #[error("invalid die size: {0}")]
    InvalidDieSize(u32),
    #[error("no dice specified")]
    NoDice,
}

/// The result of a dice roll.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RollResult {
    /// The notation as given.
    pub notation: String,
    /// Individual die results.
    pub rolls: Vec<u32>,
    /// Flat modifier applied after the rolls.
    pub modifier: i32,
    /// Sum of rolls plus modifier.
    pub total: i32,
}

impl fmt::Display for RollResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {:?}", self.notation, self.rolls)?;
        if self.modifier != 0 {
            write!(f, " {:+}", self.modifier)?;
        }
        write!(f, " => {}", self.total)
    }
}

/// Roll dice from notation like "2d6+1" or "1d20".
pub fn roll(notation: &str) -> Result<RollResult, DiceError> {
    let (count, sides, modifier) = parse(notation)?;

    let mut rng = rand::thread_rng();
    let rolls: Vec<u32> = (0..count).map(|_| rng.gen_range(1..=sides)).collect();
    let total = rolls.iter().sum::<u32>() as i32 + modifier;

    Ok(RollResult {
        notation: notation.to_string(),
        rolls,
        modifier,
        total,
    })
}

fn parse(notation: &str) -> Result<(u32, u32, i32), DiceError> {
    let cleaned: String = notation.chars().filter(|c| !c.is_whitespace()).collect();
    let lower = cleaned.to_lowercase();

    let (dice_part, modifier) = match lower.find(['+', '-']) {
        Some(index) => {
            let (dice, rest) = lower.split_at(index);
            let modifier: i32 = rest
                .parse()
                .map_err(|_| DiceError::InvalidNotation(notation.to_string()))?;
            (dice.to_string(), modifier)
        }
        None => (lower.clone(), 0),
    };

    let (count_str, sides_str) = dice_part
        .split_once('d')
        .ok_or_else(|| DiceError::InvalidNotation(notation.to_string()))?;

    let count: u32 = if count_str.is_empty() {
        1
    } else {
        count_str
            .parse()
            .map_err(|_| DiceError::InvalidNotation(notation.to_string()))?
    };
    let sides: u32 = sides_str
        .parse()
        .map_err(|_| DiceError::InvalidNotation(notation.to_string()))?;

    if count == 0 {
        return Err(DiceError::NoDice);
    }
    if sides < 2 {
        return Err(DiceError::InvalidDieSize(sides));
    }
    Ok((count, sides, modifier))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roll_in_range() {
        for _ in 0..100 {
            let result = roll("2d6+1").unwrap();
            assert_eq!(result.rolls.len(), 2);
            assert!((3..=13).contains(&result.total));
        }
    }

    #[test]
    fn test_implicit_single_die() {
        let result = roll("d20").unwrap();
        assert_eq!(result.rolls.len(), 1);
        assert!((1..=20).contains(&result.total));
    }

    #[test]
    fn test_negative_modifier() {
        let result = roll("1d4-2").unwrap();
        assert_eq!(result.modifier, -2);
        assert!((-1..=2).contains(&result.total));
    }

    #[test]
    fn test_invalid_notation() {
        assert!(roll("banana").is_err());
        assert!(roll("0d6").is_err());
        assert!(roll("2d1").is_err());
    }
}
