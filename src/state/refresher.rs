use crate::state::messages::StorageRequest;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::interval;

pub const REFRESH_EVERY: Duration = Duration::from_secs(30);

/// Re-reads courts and scoreboards from disk on a fixed interval, so edits made by hand or by
/// another scorekeeper show up. Matches are only ever loaded once, on startup.
pub struct PeriodicRefresher {
    storage_requests: mpsc::Sender<StorageRequest>,
    every: Duration,
}

impl PeriodicRefresher {
    pub fn new(storage_requests: mpsc::Sender<StorageRequest>) -> Self {
        Self::with_interval(storage_requests, REFRESH_EVERY)
    }

    pub fn with_interval(storage_requests: mpsc::Sender<StorageRequest>, every: Duration) -> Self {
        Self { storage_requests, every }
    }

    pub async fn run(self) {
        let mut refresh_interval = interval(self.every);
        // Skip the immediate first tick so startup loading isn't double-triggered.
        refresh_interval.tick().await;

        loop {
            refresh_interval.tick().await;
            if self.storage_requests.send(StorageRequest::Refresh).await.is_err() {
                break;
            }
        }
    }
}
