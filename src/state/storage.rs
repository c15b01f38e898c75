use crate::state::messages::{StorageRequest, StorageResponse};
use crate::state::records::{
    Court, Scoreboard, StoredScoreboard, default_courts, default_scoreboards, migrate_scoreboards,
};
use log::{debug, error, info, warn};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tennis_scoring::MatchRecord;
use thiserror::Error;
use tokio::sync::mpsc;

pub const COURTS_FILE: &str = "courts.json";
pub const SCOREBOARDS_FILE: &str = "scoreboards.json";
pub const MATCHES_FILE: &str = "matches.json";

const SPINNER_CHARS: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];
pub const ERROR_CHAR: char = '!';

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("cannot create data directory {}: {source}", path.display())]
    CreateDir { path: PathBuf, source: std::io::Error },
    #[error("cannot read {}: {source}", path.display())]
    Read { path: PathBuf, source: std::io::Error },
    #[error("cannot write {}: {source}", path.display())]
    Write { path: PathBuf, source: std::io::Error },
    #[error("{} is not valid JSON: {source}", path.display())]
    Parse { path: PathBuf, source: serde_json::Error },
    #[error("cannot encode {file}: {source}")]
    Encode { file: &'static str, source: serde_json::Error },
}

#[derive(Debug, Copy, Clone)]
pub struct LoadingState {
    pub is_loading: bool,
    pub spinner_char: char,
}

impl Default for LoadingState {
    fn default() -> Self {
        Self { is_loading: false, spinner_char: ' ' }
    }
}

/// Everything read from the data directory at startup.
#[derive(Debug, Clone, Default)]
pub struct StoredData {
    pub courts: Vec<Court>,
    pub scoreboards: Vec<Scoreboard>,
    /// Keyed by scoreboard id.
    pub matches: BTreeMap<String, MatchRecord>,
}

// ---------------------------------------------------------------------------
// DataStore: JSON files on disk
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct DataStore {
    dir: PathBuf,
}

impl DataStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, file: &str) -> PathBuf {
        self.dir.join(file)
    }

    async fn read_json<T: DeserializeOwned>(&self, file: &str) -> Result<Option<T>, StorageError> {
        let path = self.path(file);
        match tokio::fs::read_to_string(&path).await {
            Ok(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|source| StorageError::Parse { path, source }),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Read { path, source }),
        }
    }

    /// Pretty-printed, written to a sibling temp file and renamed over the target so readers
    /// never see a half-written file.
    async fn write_json<T: Serialize + ?Sized>(
        &self,
        file: &'static str,
        value: &T,
    ) -> Result<(), StorageError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| StorageError::CreateDir { path: self.dir.clone(), source })?;

        let payload = serde_json::to_string_pretty(value)
            .map_err(|source| StorageError::Encode { file, source })?;

        let target = self.path(file);
        let tmp = self.path(&format!("{file}.tmp"));
        tokio::fs::write(&tmp, payload)
            .await
            .map_err(|source| StorageError::Write { path: tmp.clone(), source })?;
        tokio::fs::rename(&tmp, &target)
            .await
            .map_err(|source| StorageError::Write { path: target, source })
    }

    pub async fn load_courts(&self) -> Result<Vec<Court>, StorageError> {
        if let Some(courts) = self.read_json::<Vec<Court>>(COURTS_FILE).await? {
            return Ok(courts);
        }
        info!("no {COURTS_FILE} in {}, seeding defaults", self.dir.display());
        let courts = default_courts();
        self.save_courts(&courts).await?;
        Ok(courts)
    }

    pub async fn load_scoreboards(&self) -> Result<Vec<Scoreboard>, StorageError> {
        let Some(stored) = self.read_json::<Vec<StoredScoreboard>>(SCOREBOARDS_FILE).await? else {
            info!("no {SCOREBOARDS_FILE} in {}, seeding defaults", self.dir.display());
            let scoreboards = default_scoreboards();
            self.save_scoreboards(&scoreboards).await?;
            return Ok(scoreboards);
        };

        let (scoreboards, migrated) = migrate_scoreboards(stored);
        if migrated {
            info!("migrated {SCOREBOARDS_FILE} to the current format");
            self.save_scoreboards(&scoreboards).await?;
        }
        Ok(scoreboards)
    }

    /// A record that no longer parses is skipped with a warning; the rest still load.
    pub async fn load_matches(&self) -> Result<BTreeMap<String, MatchRecord>, StorageError> {
        let Some(raw) = self.read_json::<BTreeMap<String, serde_json::Value>>(MATCHES_FILE).await?
        else {
            return Ok(BTreeMap::new());
        };

        let mut matches = BTreeMap::new();
        for (scoreboard_id, value) in raw {
            match serde_json::from_value::<MatchRecord>(value) {
                Ok(record) => {
                    matches.insert(scoreboard_id, record);
                }
                Err(e) => warn!("skipping stored match for scoreboard {scoreboard_id}: {e}"),
            }
        }
        Ok(matches)
    }

    pub async fn load_all(&self) -> Result<StoredData, StorageError> {
        Ok(StoredData {
            courts: self.load_courts().await?,
            scoreboards: self.load_scoreboards().await?,
            matches: self.load_matches().await?,
        })
    }

    pub async fn save_courts(&self, courts: &[Court]) -> Result<(), StorageError> {
        self.write_json(COURTS_FILE, courts).await
    }

    pub async fn save_scoreboards(&self, scoreboards: &[Scoreboard]) -> Result<(), StorageError> {
        self.write_json(SCOREBOARDS_FILE, scoreboards).await
    }

    pub async fn save_matches(
        &self,
        matches: &BTreeMap<String, MatchRecord>,
    ) -> Result<(), StorageError> {
        self.write_json(MATCHES_FILE, matches).await
    }
}

// ---------------------------------------------------------------------------
// StorageWorker: owns the DataStore on its own task
// ---------------------------------------------------------------------------

pub struct StorageWorker {
    store: DataStore,
    /// Last known contents of matches.json, so one match can be saved without re-reading.
    matches: BTreeMap<String, MatchRecord>,
    registry_generation: u64,
    requests: mpsc::Receiver<StorageRequest>,
    responses: mpsc::Sender<StorageResponse>,
    is_loading: Arc<AtomicBool>,
}

impl StorageWorker {
    pub fn new(
        store: DataStore,
        requests: mpsc::Receiver<StorageRequest>,
        responses: mpsc::Sender<StorageResponse>,
    ) -> Self {
        Self {
            store,
            matches: BTreeMap::new(),
            registry_generation: 0,
            requests,
            responses,
            is_loading: Arc::new(AtomicBool::new(false)),
        }
    }

    pub async fn run(mut self) {
        while let Some(request) = self.requests.recv().await {
            self.start_loading_animation().await;

            let result = match request {
                StorageRequest::LoadAll => self.handle_load_all().await,
                StorageRequest::Refresh => self.handle_refresh().await,
                StorageRequest::SaveCourts { courts, generation } => {
                    self.registry_generation = generation;
                    self.store.save_courts(&courts).await.map(|_| saved(COURTS_FILE))
                }
                StorageRequest::SaveScoreboards { scoreboards, generation } => {
                    self.registry_generation = generation;
                    self.store
                        .save_scoreboards(&scoreboards)
                        .await
                        .map(|_| saved(SCOREBOARDS_FILE))
                }
                StorageRequest::SaveMatch { scoreboard_id, record } => {
                    self.matches.insert(scoreboard_id, record);
                    self.store.save_matches(&self.matches).await.map(|_| saved(MATCHES_FILE))
                }
                StorageRequest::DeleteMatch { scoreboard_id } => {
                    if self.matches.remove(&scoreboard_id).is_some() {
                        self.store.save_matches(&self.matches).await.map(|_| saved(MATCHES_FILE))
                    } else {
                        Ok(saved(MATCHES_FILE))
                    }
                }
            };

            debug!("storage request complete");
            self.stop_loading_animation(result.is_ok()).await;

            let response = result.unwrap_or_else(|err| {
                error!("Storage error: {err}");
                StorageResponse::Error { message: err.to_string() }
            });

            // The UI drops its receiver on quit; queued writes still have to land.
            if self.responses.send(response).await.is_err() {
                debug!("storage response dropped, UI has stopped");
            }
        }
    }

    async fn handle_load_all(&mut self) -> Result<StorageResponse, StorageError> {
        debug!("loading data from {}", self.store.dir().display());
        let data = self.store.load_all().await?;
        self.matches = data.matches.clone();
        Ok(StorageResponse::Loaded { data })
    }

    async fn handle_refresh(&self) -> Result<StorageResponse, StorageError> {
        debug!("refreshing courts and scoreboards");
        Ok(StorageResponse::Refreshed {
            courts: self.store.load_courts().await?,
            scoreboards: self.store.load_scoreboards().await?,
            generation: self.registry_generation,
        })
    }

    async fn start_loading_animation(&self) {
        self.is_loading.store(true, Ordering::Relaxed);

        let mut loading_state =
            LoadingState { is_loading: true, spinner_char: SPINNER_CHARS[0] };
        let _ = self
            .responses
            .send(StorageResponse::LoadingStateChanged { loading_state })
            .await;

        let responses = self.responses.clone();
        let is_loading = self.is_loading.clone();

        tokio::spawn(async move {
            let mut spinner_index = 1;
            let mut interval = tokio::time::interval(Duration::from_millis(33));
            loop {
                interval.tick().await;
                if !is_loading.load(Ordering::Relaxed) {
                    break;
                }
                loading_state.spinner_char = SPINNER_CHARS[spinner_index];
                spinner_index = (spinner_index + 1) % SPINNER_CHARS.len();
                let _ = responses
                    .send(StorageResponse::LoadingStateChanged { loading_state })
                    .await;
            }
        });
    }

    async fn stop_loading_animation(&self, is_ok: bool) {
        self.is_loading.store(false, Ordering::Relaxed);
        tokio::time::sleep(Duration::from_millis(15)).await;

        let spinner_char = if is_ok { ' ' } else { ERROR_CHAR };
        let _ = self
            .responses
            .send(StorageResponse::LoadingStateChanged {
                loading_state: LoadingState { is_loading: false, spinner_char },
            })
            .await;
    }
}

fn saved(file: &'static str) -> StorageResponse {
    StorageResponse::Saved { file }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tennis_scoring::{MatchConfig, MatchEngine, Side};

    fn record_after(points: &[Side]) -> MatchRecord {
        let engine = MatchEngine::replay(MatchConfig::default(), points).unwrap();
        MatchRecord::capture(&engine)
    }

    #[tokio::test]
    async fn test_fresh_directory_is_seeded_and_written_back() {
        let dir = tempfile::tempdir().unwrap();
        let store = DataStore::new(dir.path().join("nested"));

        let data = store.load_all().await.unwrap();
        assert_eq!(data.courts, default_courts());
        assert_eq!(data.scoreboards, default_scoreboards());
        assert!(data.matches.is_empty());

        assert!(dir.path().join("nested").join(COURTS_FILE).exists());
        assert!(dir.path().join("nested").join(SCOREBOARDS_FILE).exists());
        assert!(!dir.path().join("nested").join(MATCHES_FILE).exists());
    }

    #[tokio::test]
    async fn test_files_are_pretty_printed_without_leftover_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = DataStore::new(dir.path());
        store.save_scoreboards(&default_scoreboards()).await.unwrap();

        let raw = std::fs::read_to_string(dir.path().join(SCOREBOARDS_FILE)).unwrap();
        assert!(raw.starts_with("[\n  {"));
        assert!(raw.contains("\"name\": \"Scoreboard 2\""));
        assert!(!dir.path().join(format!("{SCOREBOARDS_FILE}.tmp")).exists());
    }

    #[tokio::test]
    async fn test_legacy_scoreboards_are_migrated_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(SCOREBOARDS_FILE),
            r#"[{"id":"1","courtname":"Centre"},{}]"#,
        )
        .unwrap();
        let store = DataStore::new(dir.path());

        let boards = store.load_scoreboards().await.unwrap();
        assert_eq!(boards[0].name, "Centre");
        assert_eq!(boards[1], Scoreboard { id: "2".into(), name: "Scoreboard 2".into() });

        let rewritten = std::fs::read_to_string(dir.path().join(SCOREBOARDS_FILE)).unwrap();
        assert!(!rewritten.contains("courtname"));
    }

    #[tokio::test]
    async fn test_corrupt_file_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(COURTS_FILE), "{ not json").unwrap();
        let store = DataStore::new(dir.path());
        let err = store.load_courts().await.unwrap_err();
        assert!(matches!(err, StorageError::Parse { .. }));
        assert!(err.to_string().contains(COURTS_FILE));
    }

    #[tokio::test]
    async fn test_matches_round_trip_and_bad_records_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let store = DataStore::new(dir.path());
        let mut matches = BTreeMap::new();
        matches.insert("1".to_string(), record_after(&[Side::Side1, Side::Side2, Side::Side2]));
        store.save_matches(&matches).await.unwrap();
        assert_eq!(store.load_matches().await.unwrap(), matches);

        let mut raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(dir.path().join(MATCHES_FILE)).unwrap())
                .unwrap();
        raw["2"] = serde_json::json!({ "config": "garbage" });
        std::fs::write(dir.path().join(MATCHES_FILE), raw.to_string()).unwrap();

        let loaded = store.load_matches().await.unwrap();
        assert_eq!(loaded.len(), 1);
        assert!(loaded.contains_key("1"));
    }

    #[tokio::test]
    async fn test_worker_loads_then_saves_a_match() {
        let dir = tempfile::tempdir().unwrap();
        let (req_tx, req_rx) = mpsc::channel(10);
        let (resp_tx, mut resp_rx) = mpsc::channel(100);
        let worker = StorageWorker::new(DataStore::new(dir.path()), req_rx, resp_tx);
        let handle = tokio::spawn(worker.run());

        let record = record_after(&[Side::Side1]);
        req_tx.send(StorageRequest::LoadAll).await.unwrap();
        req_tx
            .send(StorageRequest::SaveMatch { scoreboard_id: "3".into(), record: record.clone() })
            .await
            .unwrap();
        req_tx
            .send(StorageRequest::DeleteMatch { scoreboard_id: "9".into() })
            .await
            .unwrap();
        drop(req_tx);
        handle.await.unwrap();

        let mut outcomes = Vec::new();
        while let Some(response) = resp_rx.recv().await {
            match response {
                StorageResponse::LoadingStateChanged { .. } => {}
                StorageResponse::Loaded { data } => outcomes.push(format!("loaded {}", data.courts.len())),
                StorageResponse::Saved { file } => outcomes.push(format!("saved {file}")),
                other => panic!("unexpected response {other:?}"),
            }
        }
        assert_eq!(outcomes, vec!["loaded 3", "saved matches.json", "saved matches.json"]);

        let stored = DataStore::new(dir.path()).load_matches().await.unwrap();
        assert_eq!(stored.get("3"), Some(&record));
    }

    #[tokio::test]
    async fn test_refresh_reports_last_registry_write() {
        let dir = tempfile::tempdir().unwrap();
        let (req_tx, req_rx) = mpsc::channel(10);
        let (resp_tx, mut resp_rx) = mpsc::channel(100);
        let handle = tokio::spawn(StorageWorker::new(DataStore::new(dir.path()), req_rx, resp_tx).run());

        let mut courts = default_courts();
        courts.truncate(2);
        req_tx.send(StorageRequest::Refresh).await.unwrap();
        req_tx.send(StorageRequest::SaveCourts { courts, generation: 4 }).await.unwrap();
        req_tx.send(StorageRequest::Refresh).await.unwrap();
        drop(req_tx);
        handle.await.unwrap();

        let mut refreshes = Vec::new();
        while let Some(response) = resp_rx.recv().await {
            if let StorageResponse::Refreshed { courts, generation, .. } = response {
                refreshes.push((courts.len(), generation));
            }
        }
        assert_eq!(refreshes, vec![(3, 0), (2, 4)]);
    }

    #[tokio::test]
    async fn test_worker_writes_queued_saves_after_ui_stops() {
        let dir = tempfile::tempdir().unwrap();
        let (req_tx, req_rx) = mpsc::channel(10);
        let (resp_tx, resp_rx) = mpsc::channel(100);
        drop(resp_rx);

        let first = record_after(&[Side::Side1]);
        let second = record_after(&[Side::Side1, Side::Side2]);
        req_tx
            .send(StorageRequest::SaveMatch { scoreboard_id: "1".into(), record: first.clone() })
            .await
            .unwrap();
        req_tx
            .send(StorageRequest::SaveMatch { scoreboard_id: "2".into(), record: second.clone() })
            .await
            .unwrap();
        drop(req_tx);

        StorageWorker::new(DataStore::new(dir.path()), req_rx, resp_tx).run().await;

        let stored = DataStore::new(dir.path()).load_matches().await.unwrap();
        assert_eq!(stored.get("1"), Some(&first));
        assert_eq!(stored.get("2"), Some(&second));
    }

    #[tokio::test]
    async fn test_worker_reports_errors() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(COURTS_FILE), "[1, 2").unwrap();
        let (req_tx, req_rx) = mpsc::channel(10);
        let (resp_tx, mut resp_rx) = mpsc::channel(100);
        let handle = tokio::spawn(StorageWorker::new(DataStore::new(dir.path()), req_rx, resp_tx).run());

        req_tx.send(StorageRequest::Refresh).await.unwrap();
        drop(req_tx);
        handle.await.unwrap();

        let mut message = None;
        let mut last_spinner = None;
        while let Some(response) = resp_rx.recv().await {
            match response {
                StorageResponse::Error { message: m } => message = Some(m),
                StorageResponse::LoadingStateChanged { loading_state } if !loading_state.is_loading => {
                    last_spinner = Some(loading_state.spinner_char)
                }
                _ => {}
            }
        }
        assert!(message.unwrap().contains("not valid JSON"));
        assert_eq!(last_spinner, Some(ERROR_CHAR));
    }
}
