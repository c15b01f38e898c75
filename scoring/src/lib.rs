pub mod engine;
pub mod error;
pub mod game;
pub mod point;
pub mod set;
pub mod snapshot;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub use engine::{MatchEngine, MatchStatus};
pub use error::{ScoringError, ScoringResult};
pub use game::{GameResult, GameTracker, SetOutcome};
pub use point::{GameOutcome, PointCounter, PointScore};
pub use set::{MatchOutcome, SetResult, SetTracker};
pub use snapshot::{MatchRecord, MatchSnapshot, PointEvent, ServerInfo, SetScore};

// ---------------------------------------------------------------------------
// Domain types shared by every scoring level
// ---------------------------------------------------------------------------

/// One of the two competitors on court. Serialized as `"side1"` / `"side2"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Side1,
    Side2,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::Side1, Side::Side2];

    pub fn opponent(self) -> Self {
        match self {
            Side::Side1 => Side::Side2,
            Side::Side2 => Side::Side1,
        }
    }

    /// 1 or 2, the numbering used by the external `server.sideNumber` field.
    pub fn number(self) -> u8 {
        match self {
            Side::Side1 => 1,
            Side::Side2 => 2,
        }
    }

    pub fn from_number(number: u8) -> Option<Self> {
        match number {
            1 => Some(Side::Side1),
            2 => Some(Side::Side2),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Side::Side1 => "side1",
            Side::Side2 => "side2",
        }
    }

    fn index(self) -> usize {
        match self {
            Side::Side1 => 0,
            Side::Side2 => 1,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Side {
    type Err = ScoringError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "side1" | "1" => Ok(Side::Side1),
            "side2" | "2" => Ok(Side::Side2),
            _ => Err(ScoringError::UnknownSide(raw.to_string())),
        }
    }
}

/// A per-side counter (games in a set, sets in a match).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    pub side1: u32,
    pub side2: u32,
}

impl Tally {
    pub fn new(side1: u32, side2: u32) -> Self {
        Self { side1, side2 }
    }

    pub fn get(&self, side: Side) -> u32 {
        match side {
            Side::Side1 => self.side1,
            Side::Side2 => self.side2,
        }
    }

    pub fn bump(&mut self, side: Side) {
        match side {
            Side::Side1 => self.side1 += 1,
            Side::Side2 => self.side2 += 1,
        }
    }

    pub fn total(&self) -> u32 {
        self.side1 + self.side2
    }

    /// The side strictly ahead, if any.
    pub fn leader(&self) -> Option<Side> {
        match self.side1.cmp(&self.side2) {
            std::cmp::Ordering::Greater => Some(Side::Side1),
            std::cmp::Ordering::Less => Some(Side::Side2),
            std::cmp::Ordering::Equal => None,
        }
    }
}

/// Seed for one match: how many sets win it and who serves first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchConfig {
    pub sets_to_win: u32,
    pub initial_server: Side,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self { sets_to_win: 2, initial_server: Side::Side1 }
    }
}

impl MatchConfig {
    pub fn new(sets_to_win: u32, initial_server: Side) -> ScoringResult<Self> {
        let config = Self { sets_to_win, initial_server };
        config.validate()?;
        Ok(config)
    }

    /// Build from the usual "best of N sets" wording. Only best-of-3 and best-of-5 exist.
    pub fn best_of(sets: u32, initial_server: Side) -> ScoringResult<Self> {
        match sets {
            3 | 5 => Self::new(sets / 2 + 1, initial_server),
            _ => Err(ScoringError::InvalidConfig(format!(
                "best-of-{sets} is not a supported format (use 3 or 5)"
            ))),
        }
    }

    pub fn best_of_sets(&self) -> u32 {
        self.sets_to_win * 2 - 1
    }

    pub fn validate(&self) -> ScoringResult<()> {
        match self.sets_to_win {
            2 | 3 => Ok(()),
            n => Err(ScoringError::InvalidConfig(format!(
                "sets_to_win must be 2 (best-of-3) or 3 (best-of-5), got {n}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn side_parses_wire_names_and_numbers() {
        assert_eq!("side1".parse::<Side>(), Ok(Side::Side1));
        assert_eq!("SIDE2".parse::<Side>(), Ok(Side::Side2));
        assert_eq!("2".parse::<Side>(), Ok(Side::Side2));
        assert_eq!(
            "side3".parse::<Side>(),
            Err(ScoringError::UnknownSide("side3".to_string()))
        );
    }

    #[test]
    fn side_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Side::Side2).unwrap(), "\"side2\"");
        assert_eq!(Side::Side1.opponent(), Side::Side2);
        assert_eq!(Side::from_number(3), None);
    }

    #[test]
    fn best_of_maps_to_sets_to_win() {
        assert_eq!(MatchConfig::best_of(3, Side::Side1).unwrap().sets_to_win, 2);
        assert_eq!(MatchConfig::best_of(5, Side::Side2).unwrap().sets_to_win, 3);
        assert!(matches!(
            MatchConfig::best_of(4, Side::Side1),
            Err(ScoringError::InvalidConfig(_))
        ));
        assert!(MatchConfig::new(0, Side::Side1).is_err());
        assert!(MatchConfig::new(4, Side::Side1).is_err());
    }

    #[test]
    fn tally_leader() {
        let mut t = Tally::default();
        assert_eq!(t.leader(), None);
        t.bump(Side::Side2);
        assert_eq!(t.leader(), Some(Side::Side2));
        assert_eq!(t.total(), 1);
    }
}
