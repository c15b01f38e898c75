use thiserror::Error;

pub type ScoringResult<T> = Result<T, ScoringError>;

/// Every way a scoring call can be refused. The engine state is untouched whenever one is
/// returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScoringError {
    #[error("invalid match configuration: {0}")]
    InvalidConfig(String),

    #[error("match already completed; no further points are accepted")]
    MatchAlreadyCompleted,

    #[error("unknown side {0:?} (expected \"side1\" or \"side2\")")]
    UnknownSide(String),

    #[error("no points have been scored, nothing to undo")]
    NothingToUndo,

    #[error("invalid snapshot: {0}")]
    InvalidSnapshot(String),
}
