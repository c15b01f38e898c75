use crate::Side;

/// Points needed to take a tie-break; the lead must also be at least two.
pub const TIE_BREAK_POINTS: u32 = 7;

/// Score of one side inside a standard (non tie-break) game.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum PointScore {
    #[default]
    Love,
    Fifteen,
    Thirty,
    Forty,
    Advantage,
}

impl PointScore {
    pub fn label(self) -> &'static str {
        match self {
            PointScore::Love => "0",
            PointScore::Fifteen => "15",
            PointScore::Thirty => "30",
            PointScore::Forty => "40",
            PointScore::Advantage => "AD",
        }
    }

    pub fn parse(label: &str) -> Option<Self> {
        match label.trim() {
            "0" => Some(PointScore::Love),
            "15" => Some(PointScore::Fifteen),
            "30" => Some(PointScore::Thirty),
            "40" => Some(PointScore::Forty),
            "AD" | "A" | "ad" => Some(PointScore::Advantage),
            _ => None,
        }
    }

    /// Raw points won, counting advantage as one past forty.
    pub fn points(self) -> u32 {
        match self {
            PointScore::Love => 0,
            PointScore::Fifteen => 1,
            PointScore::Thirty => 2,
            PointScore::Forty => 3,
            PointScore::Advantage => 4,
        }
    }

    // Only called below Forty; Forty and Advantage are resolved against the opponent.
    fn next(self) -> Self {
        match self {
            PointScore::Love => PointScore::Fifteen,
            PointScore::Fifteen => PointScore::Thirty,
            PointScore::Thirty | PointScore::Forty => PointScore::Forty,
            PointScore::Advantage => PointScore::Advantage,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOutcome {
    Continuing,
    GameWon(Side),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GameScore {
    Standard([PointScore; 2]),
    TieBreak([u32; 2]),
}

/// Point score of the game in progress.
///
/// Knows nothing about games, sets or who serves; the owning [`crate::GameTracker`] replaces it
/// with a fresh counter once it reports [`GameOutcome::GameWon`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PointCounter {
    score: GameScore,
    points_played: u32,
}

impl Default for PointCounter {
    fn default() -> Self {
        Self::standard()
    }
}

impl PointCounter {
    pub fn standard() -> Self {
        Self {
            score: GameScore::Standard([PointScore::Love; 2]),
            points_played: 0,
        }
    }

    pub fn tie_break() -> Self {
        Self {
            score: GameScore::TieBreak([0; 2]),
            points_played: 0,
        }
    }

    pub fn is_tie_break(&self) -> bool {
        matches!(self.score, GameScore::TieBreak(_))
    }

    pub fn points_played(&self) -> u32 {
        self.points_played
    }

    /// `None` while a tie-break is being played.
    pub fn standard_score(&self, side: Side) -> Option<PointScore> {
        match self.score {
            GameScore::Standard(scores) => Some(scores[side.index()]),
            GameScore::TieBreak(_) => None,
        }
    }

    /// `None` outside a tie-break.
    pub fn tie_break_points(&self, side: Side) -> Option<u32> {
        match self.score {
            GameScore::TieBreak(points) => Some(points[side.index()]),
            GameScore::Standard(_) => None,
        }
    }

    /// External label: "0", "15", "30", "40", "AD", or the raw count in a tie-break.
    pub fn display(&self, side: Side) -> String {
        match self.score {
            GameScore::Standard(scores) => scores[side.index()].label().to_string(),
            GameScore::TieBreak(points) => points[side.index()].to_string(),
        }
    }

    pub fn is_deuce(&self) -> bool {
        self.score == GameScore::Standard([PointScore::Forty; 2])
    }

    pub fn advantage(&self) -> Option<Side> {
        let GameScore::Standard(scores) = self.score else {
            return None;
        };
        Side::BOTH
            .into_iter()
            .find(|side| scores[side.index()] == PointScore::Advantage)
    }

    pub fn apply_point(&mut self, side: Side) -> GameOutcome {
        self.points_played += 1;
        match &mut self.score {
            GameScore::Standard(scores) => apply_standard(scores, side),
            GameScore::TieBreak(points) => apply_tie_break(points, side),
        }
    }
}

fn apply_standard(scores: &mut [PointScore; 2], side: Side) -> GameOutcome {
    let (me, them) = (side.index(), side.opponent().index());
    match (scores[me], scores[them]) {
        (PointScore::Advantage, _) => GameOutcome::GameWon(side),
        (PointScore::Forty, PointScore::Forty) => {
            scores[me] = PointScore::Advantage;
            GameOutcome::Continuing
        }
        // Opponent loses the advantage: back to deuce, no game.
        (PointScore::Forty, PointScore::Advantage) => {
            scores[them] = PointScore::Forty;
            GameOutcome::Continuing
        }
        (PointScore::Forty, _) => GameOutcome::GameWon(side),
        (score, _) => {
            scores[me] = score.next();
            GameOutcome::Continuing
        }
    }
}

fn apply_tie_break(points: &mut [u32; 2], side: Side) -> GameOutcome {
    let (me, them) = (side.index(), side.opponent().index());
    points[me] += 1;
    if points[me] >= TIE_BREAK_POINTS && points[me] >= points[them] + 2 {
        GameOutcome::GameWon(side)
    } else {
        GameOutcome::Continuing
    }
}
