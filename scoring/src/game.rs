use crate::point::{GameOutcome, PointCounter};
use crate::{Side, Tally};
use serde::{Deserialize, Serialize};

/// Games needed to take a set with a two-game lead.
pub const GAMES_FOR_SET: u32 = 6;
/// Reaching this many games always takes the set (7-5, or 7-6 through the tie-break).
pub const GAMES_CAP: u32 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameResult {
    pub winner: Side,
    pub tie_break: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOutcome {
    Continuing,
    SetWon(Side),
}

/// Games of the set in progress, and the server.
///
/// This is the only place the server changes: once per completed game, tie-breaks included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameTracker {
    points: PointCounter,
    games: Vec<GameResult>,
    games_won: Tally,
    server: Side,
}

impl GameTracker {
    pub fn new(server: Side) -> Self {
        Self {
            points: PointCounter::standard(),
            games: Vec::new(),
            games_won: Tally::default(),
            server,
        }
    }

    pub fn apply_point(&mut self, side: Side) -> SetOutcome {
        match self.points.apply_point(side) {
            GameOutcome::Continuing => SetOutcome::Continuing,
            GameOutcome::GameWon(winner) => self.complete_game(winner),
        }
    }

    fn complete_game(&mut self, winner: Side) -> SetOutcome {
        self.games.push(GameResult {
            winner,
            tie_break: self.points.is_tie_break(),
        });
        self.games_won.bump(winner);
        self.server = self.server.opponent();
        self.points = if is_tie_break_due(self.games_won) {
            PointCounter::tie_break()
        } else {
            PointCounter::standard()
        };

        if is_set_won(self.games_won, winner) {
            SetOutcome::SetWon(winner)
        } else {
            SetOutcome::Continuing
        }
    }

    /// Clear games and points for the next set. The server carries over.
    pub fn start_new_set(&mut self) {
        self.points = PointCounter::standard();
        self.games.clear();
        self.games_won = Tally::default();
    }

    pub fn points(&self) -> &PointCounter {
        &self.points
    }

    pub fn games(&self) -> &[GameResult] {
        &self.games
    }

    pub fn games_won(&self) -> Tally {
        self.games_won
    }

    /// Server of the current game.
    pub fn server(&self) -> Side {
        self.server
    }

    /// Who serves the next point. Differs from [`Self::server`] only inside a tie-break, where
    /// the starter serves one point and service then changes every two points.
    pub fn point_server(&self) -> Side {
        if self.points.is_tie_break() {
            tie_break_point_server(self.server, self.points.points_played())
        } else {
            self.server
        }
    }
}

pub fn is_tie_break_due(games: Tally) -> bool {
    games.side1 == GAMES_FOR_SET && games.side2 == GAMES_FOR_SET
}

pub fn is_set_won(games: Tally, side: Side) -> bool {
    let (mine, theirs) = (games.get(side), games.get(side.opponent()));
    (mine >= GAMES_FOR_SET && mine >= theirs + 2) || mine >= GAMES_CAP
}

fn tie_break_point_server(starter: Side, points_played: u32) -> Side {
    if (points_played + 1) / 2 % 2 == 0 {
        starter
    } else {
        starter.opponent()
    }
}
