use crate::game::{GameTracker, SetOutcome};
use crate::{Side, Tally};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetResult {
    pub winner: Side,
    pub games: Tally,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOutcome {
    Continuing,
    MatchWon(Side),
}

/// Completed sets of the match plus the set in progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetTracker {
    games: GameTracker,
    sets: Vec<SetResult>,
    sets_won: Tally,
    sets_to_win: u32,
}

impl SetTracker {
    pub fn new(sets_to_win: u32, server: Side) -> Self {
        Self {
            games: GameTracker::new(server),
            sets: Vec::new(),
            sets_won: Tally::default(),
            sets_to_win,
        }
    }

    pub fn apply_point(&mut self, side: Side) -> MatchOutcome {
        match self.games.apply_point(side) {
            SetOutcome::Continuing => MatchOutcome::Continuing,
            SetOutcome::SetWon(winner) => self.complete_set(winner),
        }
    }

    fn complete_set(&mut self, winner: Side) -> MatchOutcome {
        self.sets.push(SetResult {
            winner,
            games: self.games.games_won(),
        });
        self.sets_won.bump(winner);
        self.games.start_new_set();

        if self.sets_won.get(winner) == self.sets_to_win {
            MatchOutcome::MatchWon(winner)
        } else {
            MatchOutcome::Continuing
        }
    }

    pub fn games(&self) -> &GameTracker {
        &self.games
    }

    pub fn sets(&self) -> &[SetResult] {
        &self.sets
    }

    pub fn sets_won(&self) -> Tally {
        self.sets_won
    }

    pub fn sets_to_win(&self) -> u32 {
        self.sets_to_win
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: Side = Side::Side1;
    const B: Side = Side::Side2;

    fn win_set(tracker: &mut SetTracker, side: Side) -> MatchOutcome {
        let mut outcome = MatchOutcome::Continuing;
        for _ in 0..24 {
            outcome = tracker.apply_point(side);
        }
        outcome
    }

    #[test]
    fn straight_sets_best_of_three() {
        let mut t = SetTracker::new(2, A);
        assert_eq!(win_set(&mut t, A), MatchOutcome::Continuing);
        assert_eq!(t.sets(), &[SetResult { winner: A, games: Tally::new(6, 0) }]);
        assert_eq!(t.games().games_won(), Tally::default(), "fresh set after a set win");
        assert_eq!(win_set(&mut t, A), MatchOutcome::MatchWon(A));
        assert_eq!(t.sets_won(), Tally::new(2, 0));
    }

    #[test]
    fn best_of_five_needs_three() {
        let mut t = SetTracker::new(3, B);
        assert_eq!(win_set(&mut t, B), MatchOutcome::Continuing);
        assert_eq!(win_set(&mut t, A), MatchOutcome::Continuing);
        assert_eq!(win_set(&mut t, B), MatchOutcome::Continuing);
        assert_eq!(win_set(&mut t, A), MatchOutcome::Continuing);
        assert_eq!(win_set(&mut t, B), MatchOutcome::MatchWon(B));
        assert_eq!(t.sets_won(), Tally::new(2, 3));
        assert_eq!(t.sets().len(), 5);
    }

    #[test]
    fn server_carries_across_sets() {
        let mut t = SetTracker::new(2, A);
        win_set(&mut t, A);
        // six games played, even number of flips
        assert_eq!(t.games().server(), A);
        for _ in 0..4 {
            t.apply_point(B);
        }
        assert_eq!(t.games().server(), B);
    }
}
