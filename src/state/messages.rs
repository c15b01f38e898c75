use crate::state::records::{Court, Scoreboard};
use crate::state::storage::{LoadingState, StoredData};
use crossterm::event::KeyEvent;
use tennis_scoring::MatchRecord;

#[derive(Debug, Clone)]
pub enum StorageRequest {
    LoadAll,
    /// Re-read courts and scoreboards only. Live matches stay as they are in memory.
    Refresh,
    /// `generation` counts registry writes issued by the app; the worker echoes the latest one
    /// back with each refresh.
    SaveCourts { courts: Vec<Court>, generation: u64 },
    SaveScoreboards { scoreboards: Vec<Scoreboard>, generation: u64 },
    SaveMatch { scoreboard_id: String, record: MatchRecord },
    DeleteMatch { scoreboard_id: String },
}

#[derive(Debug)]
pub enum StorageResponse {
    LoadingStateChanged { loading_state: LoadingState },
    Loaded { data: StoredData },
    Refreshed {
        courts: Vec<Court>,
        scoreboards: Vec<Scoreboard>,
        /// Last registry write applied before the files were read.
        generation: u64,
    },
    Saved { file: &'static str },
    Error { message: String },
}

#[derive(Debug, Clone)]
pub enum UiEvent {
    KeyPressed(KeyEvent),
    Resize,
    AppStarted,
}
