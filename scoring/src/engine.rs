use crate::game::GameResult;
use crate::set::{MatchOutcome, SetResult, SetTracker};
use crate::snapshot::{MatchSnapshot, PointEvent};
use crate::{MatchConfig, ScoringError, ScoringResult, Side, Tally};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "state", content = "winner")]
pub enum MatchStatus {
    InProgress,
    Completed(Side),
}

/// One live match.
///
/// `point_won` resolves the whole point → game → set → match cascade before it returns, so a
/// caller never sees a half-applied point. The engine holds no lock: whoever owns it must make
/// sure only one mutation is in flight at a time.
///
/// Every accepted point is kept in order. That log is what undo and persistence replay from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchEngine {
    config: MatchConfig,
    sets: SetTracker,
    status: MatchStatus,
    points: Vec<Side>,
}

impl MatchEngine {
    pub fn new(config: MatchConfig) -> ScoringResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            sets: SetTracker::new(config.sets_to_win, config.initial_server),
            status: MatchStatus::InProgress,
            points: Vec::new(),
        })
    }

    /// Rebuild an engine by feeding `points` into a fresh match.
    pub fn replay(config: MatchConfig, points: &[Side]) -> ScoringResult<Self> {
        let mut engine = Self::new(config)?;
        for &side in points {
            engine.apply(side)?;
        }
        Ok(engine)
    }

    pub fn point_won(&mut self, side: Side) -> ScoringResult<MatchSnapshot> {
        self.apply(side)?;
        Ok(self.snapshot())
    }

    /// Parse the side of a raw inbound event and score it.
    pub fn apply_event(&mut self, event: &PointEvent) -> ScoringResult<MatchSnapshot> {
        let side = event.side()?;
        self.point_won(side)
    }

    fn apply(&mut self, side: Side) -> ScoringResult<()> {
        if self.is_completed() {
            return Err(ScoringError::MatchAlreadyCompleted);
        }
        if let MatchOutcome::MatchWon(winner) = self.sets.apply_point(side) {
            self.status = MatchStatus::Completed(winner);
        }
        self.points.push(side);
        Ok(())
    }

    /// Take back the most recent point, crossing game, set and match boundaries as needed.
    /// A completed match is reopened if its final point is undone.
    pub fn undo_last_point(&mut self) -> ScoringResult<MatchSnapshot> {
        let Some((_, earlier)) = self.points.split_last() else {
            return Err(ScoringError::NothingToUndo);
        };
        *self = Self::replay(self.config, earlier)?;
        Ok(self.snapshot())
    }

    pub fn snapshot(&self) -> MatchSnapshot {
        MatchSnapshot::capture(self)
    }

    pub fn config(&self) -> MatchConfig {
        self.config
    }

    pub fn status(&self) -> MatchStatus {
        self.status
    }

    pub fn is_completed(&self) -> bool {
        matches!(self.status, MatchStatus::Completed(_))
    }

    pub fn winner(&self) -> Option<Side> {
        match self.status {
            MatchStatus::Completed(winner) => Some(winner),
            MatchStatus::InProgress => None,
        }
    }

    pub fn server(&self) -> Side {
        self.sets.games().server()
    }

    /// Server of the next point; see [`crate::GameTracker::point_server`].
    pub fn point_server(&self) -> Side {
        self.sets.games().point_server()
    }

    pub fn points(&self) -> &[Side] {
        &self.points
    }

    pub fn sets(&self) -> &[SetResult] {
        self.sets.sets()
    }

    pub fn sets_won(&self) -> Tally {
        self.sets.sets_won()
    }

    pub fn current_games(&self) -> Tally {
        self.sets.games().games_won()
    }

    pub fn current_set_games(&self) -> &[GameResult] {
        self.sets.games().games()
    }

    pub fn is_tie_break(&self) -> bool {
        self.sets.games().points().is_tie_break()
    }

    /// Current game's label for `side` ("0".."AD", or the tie-break count).
    pub fn point_label(&self, side: Side) -> String {
        self.sets.games().points().display(side)
    }
}
