//! Flat external shapes: the snapshot read by storage and the UI, the inbound point event, and
//! the persisted match record. Field names follow the existing JSON schema (camelCase).

use crate::engine::MatchEngine;
use crate::game::{GAMES_CAP, GAMES_FOR_SET, is_set_won, is_tie_break_due};
use crate::point::{PointScore, TIE_BREAK_POINTS};
use crate::{MatchConfig, ScoringError, ScoringResult, Side, Tally};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchSnapshot {
    pub side1_point_score: String,
    pub side2_point_score: String,
    /// Completed sets, then the set in progress (absent once the match is over).
    pub sets: Vec<SetScore>,
    pub server: ServerInfo,
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winner: Option<Side>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetScore {
    pub side1_score: u32,
    pub side2_score: u32,
}

impl From<Tally> for SetScore {
    fn from(t: Tally) -> Self {
        Self { side1_score: t.side1, side2_score: t.side2 }
    }
}

impl From<SetScore> for Tally {
    fn from(s: SetScore) -> Self {
        Tally::new(s.side1_score, s.side2_score)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerInfo {
    pub side_number: u8,
}

impl MatchSnapshot {
    pub(crate) fn capture(engine: &MatchEngine) -> Self {
        let mut sets: Vec<SetScore> = engine.sets().iter().map(|s| s.games.into()).collect();
        let completed = engine.is_completed();
        let (side1_point_score, side2_point_score) = if completed {
            ("0".to_string(), "0".to_string())
        } else {
            sets.push(engine.current_games().into());
            (engine.point_label(Side::Side1), engine.point_label(Side::Side2))
        };

        Self {
            side1_point_score,
            side2_point_score,
            sets,
            server: ServerInfo { side_number: engine.server().number() },
            completed,
            winner: engine.winner(),
        }
    }

    pub fn point_score(&self, side: Side) -> &str {
        match side {
            Side::Side1 => &self.side1_point_score,
            Side::Side2 => &self.side2_point_score,
        }
    }

    pub fn server_side(&self) -> Option<Side> {
        Side::from_number(self.server.side_number)
    }

    /// The set being played, if the match is still open.
    pub fn current_set(&self) -> Option<SetScore> {
        if self.completed { None } else { self.sets.last().copied() }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(raw: &str) -> serde_json::Result<Self> {
        serde_json::from_str(raw)
    }
}

// ---------------------------------------------------------------------------
// Inbound event
// ---------------------------------------------------------------------------

/// `{ "matchId": "...", "side": "side1" | "side2" }`. The side stays a raw string until
/// [`PointEvent::side`] validates it, so malformed payloads are refused before any scoring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointEvent {
    pub match_id: String,
    pub side: String,
}

impl PointEvent {
    pub fn new(match_id: impl Into<String>, side: Side) -> Self {
        Self { match_id: match_id.into(), side: side.label().to_string() }
    }

    pub fn side(&self) -> ScoringResult<Side> {
        self.side.parse()
    }
}

// ---------------------------------------------------------------------------
// Persisted record
// ---------------------------------------------------------------------------

/// What gets stored per scoreboard: the seed, every accepted point, and the latest snapshot for
/// readers that only want to display it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRecord {
    pub config: MatchConfig,
    pub points: Vec<Side>,
    pub snapshot: MatchSnapshot,
}

impl MatchRecord {
    pub fn capture(engine: &MatchEngine) -> Self {
        Self {
            config: engine.config(),
            points: engine.points().to_vec(),
            snapshot: engine.snapshot(),
        }
    }

    /// Replay the point log. The stored snapshot must agree with the result.
    pub fn into_engine(self) -> ScoringResult<MatchEngine> {
        let engine = MatchEngine::replay(self.config, &self.points).map_err(|e| match e {
            ScoringError::MatchAlreadyCompleted => {
                ScoringError::InvalidSnapshot("point log continues after the match ended".into())
            }
            other => other,
        })?;
        if engine.snapshot() != self.snapshot {
            return Err(ScoringError::InvalidSnapshot(
                "stored snapshot does not match the point log".into(),
            ));
        }
        Ok(engine)
    }
}

// ---------------------------------------------------------------------------
// Snapshot → engine
// ---------------------------------------------------------------------------

impl MatchEngine {
    /// Rebuild an engine from the flat snapshot alone.
    ///
    /// The snapshot keeps no point history, so a canonical sequence that reaches the same score
    /// is replayed instead; the initial server is chosen so the replayed server matches. The
    /// rebuilt engine's point log is that canonical sequence. Snapshots that legal play cannot
    /// reach are refused.
    pub fn from_snapshot(sets_to_win: u32, snapshot: &MatchSnapshot) -> ScoringResult<Self> {
        let probe_config = MatchConfig::new(sets_to_win, Side::Side1)?;
        let target_server = snapshot.server_side().ok_or_else(|| {
            invalid(format!("server.sideNumber must be 1 or 2, got {}", snapshot.server.side_number))
        })?;
        let points = canonical_points(snapshot, sets_to_win)?;

        let probe = replay_snapshot(probe_config, &points)?;
        let initial_server = if probe.server() == target_server {
            Side::Side1
        } else {
            Side::Side2
        };
        let engine = replay_snapshot(MatchConfig::new(sets_to_win, initial_server)?, &points)?;

        if engine.snapshot() != *snapshot {
            return Err(invalid("score is not reachable by legal play"));
        }
        Ok(engine)
    }
}

/// Longest tie-break a snapshot may describe. Counts past it are refused instead of replayed.
pub const TIE_BREAK_REPLAY_CAP: u32 = 100;

fn invalid(reason: impl Into<String>) -> ScoringError {
    ScoringError::InvalidSnapshot(reason.into())
}

fn replay_snapshot(config: MatchConfig, points: &[Side]) -> ScoringResult<MatchEngine> {
    MatchEngine::replay(config, points).map_err(|e| match e {
        ScoringError::MatchAlreadyCompleted => invalid("more sets listed than the format allows"),
        other => other,
    })
}

/// Checks every count against the rules first, so the replay below is bounded by a few hundred
/// points per set no matter what the snapshot claims.
fn canonical_points(snapshot: &MatchSnapshot, sets_to_win: u32) -> ScoringResult<Vec<Side>> {
    let max_sets = (2 * sets_to_win - 1) as usize;
    if snapshot.sets.len() > max_sets {
        return Err(invalid("more sets listed than the format allows"));
    }

    let (finished, live) = if snapshot.completed {
        (snapshot.sets.as_slice(), None)
    } else {
        let Some((live, finished)) = snapshot.sets.split_last() else {
            return Err(invalid("an unfinished match must list its current set"));
        };
        (finished, Some(Tally::from(*live)))
    };

    for (idx, set) in finished.iter().enumerate() {
        let games = Tally::from(*set);
        let decided = games.side1.max(games.side2) <= GAMES_CAP
            && games.leader().is_some_and(|side| is_set_won(games, side));
        if !decided {
            return Err(invalid(format!("set {} has no winner", idx + 1)));
        }
    }

    let live = match live {
        Some(games) => Some((games, live_points(snapshot, games)?)),
        None => None,
    };

    let mut points = Vec::new();
    for set in finished {
        push_set(&mut points, Tally::from(*set));
    }
    if let Some((games, counts)) = live {
        push_set(&mut points, games);
        push_interleaved(&mut points, counts, |side| vec![side]);
    }

    Ok(points)
}

fn live_points(snapshot: &MatchSnapshot, games: Tally) -> ScoringResult<Tally> {
    if games.side1.max(games.side2) > GAMES_FOR_SET
        || Side::BOTH.into_iter().any(|side| is_set_won(games, side))
    {
        return Err(invalid("the current set is already decided"));
    }

    if !is_tie_break_due(games) {
        return Ok(Tally::new(
            parse_standard(&snapshot.side1_point_score)?,
            parse_standard(&snapshot.side2_point_score)?,
        ));
    }

    let counts = Tally::new(
        parse_tie_break(&snapshot.side1_point_score)?,
        parse_tie_break(&snapshot.side2_point_score)?,
    );
    if counts.side1.max(counts.side2) > TIE_BREAK_REPLAY_CAP {
        return Err(invalid(format!("tie-break longer than {TIE_BREAK_REPLAY_CAP} points")));
    }
    let over = Side::BOTH.into_iter().any(|side| {
        counts.get(side) >= TIE_BREAK_POINTS && counts.get(side) >= counts.get(side.opponent()) + 2
    });
    if over {
        return Err(invalid("the tie-break is already decided"));
    }
    Ok(counts)
}

/// Games alternate while both sides have some left, trailing side first, so no set closes
/// before its final game.
fn push_set(points: &mut Vec<Side>, games: Tally) {
    let mut played = Tally::default();
    push_interleaved(points, games, |side| {
        let needed = if is_tie_break_due(played) {
            TIE_BREAK_POINTS
        } else {
            4
        };
        played.bump(side);
        vec![side; needed as usize]
    });
}

fn push_interleaved(points: &mut Vec<Side>, target: Tally, mut unit: impl FnMut(Side) -> Vec<Side>) {
    let leader = target.leader().unwrap_or(Side::Side1);
    let trailer = leader.opponent();
    let shared = target.get(trailer);
    for _ in 0..shared {
        points.extend(unit(trailer));
        points.extend(unit(leader));
    }
    for _ in shared..target.get(leader) {
        points.extend(unit(leader));
    }
}

fn parse_standard(label: &str) -> ScoringResult<u32> {
    PointScore::parse(label)
        .map(PointScore::points)
        .ok_or_else(|| invalid(format!("unrecognised point score {label:?}")))
}

fn parse_tie_break(label: &str) -> ScoringResult<u32> {
    label
        .trim()
        .parse::<u32>()
        .map_err(|_| invalid(format!("tie-break score must be a number, got {label:?}")))
}
