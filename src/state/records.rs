use crate::state::registry::{Record, Registry};
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    #[error("name must not be empty")]
    EmptyName,
    #[error("capacity must be a whole number, got {0:?}")]
    InvalidCapacity(String),
}

// ---------------------------------------------------------------------------
// Courts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CourtStatus {
    #[default]
    Available,
    Occupied,
    Maintenance,
}

impl CourtStatus {
    pub const ALL: [CourtStatus; 3] =
        [CourtStatus::Available, CourtStatus::Occupied, CourtStatus::Maintenance];

    pub fn next(self) -> Self {
        match self {
            CourtStatus::Available => CourtStatus::Occupied,
            CourtStatus::Occupied => CourtStatus::Maintenance,
            CourtStatus::Maintenance => CourtStatus::Available,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CourtStatus::Available => "available",
            CourtStatus::Occupied => "occupied",
            CourtStatus::Maintenance => "maintenance",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CourtKind {
    #[default]
    Indoor,
    Outdoor,
}

impl CourtKind {
    pub const ALL: [CourtKind; 2] = [CourtKind::Indoor, CourtKind::Outdoor];

    pub fn label(self) -> &'static str {
        match self {
            CourtKind::Indoor => "indoor",
            CourtKind::Outdoor => "outdoor",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Court {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default)]
    pub status: CourtStatus,
    #[serde(rename = "type", default)]
    pub kind: CourtKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity: Option<u32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Record for Court {
    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

impl Court {
    pub fn from_draft(id: String, draft: CourtDraft, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: draft.name,
            location: draft.location,
            status: draft.status,
            kind: draft.kind,
            capacity: draft.capacity,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn cycle_status(&mut self, now: DateTime<Utc>) -> CourtStatus {
        self.status = self.status.next();
        self.updated_at = now;
        self.status
    }
}

/// Validated input for a new court.
#[derive(Debug, Clone, PartialEq)]
pub struct CourtDraft {
    pub name: String,
    pub location: Option<String>,
    pub status: CourtStatus,
    pub kind: CourtKind,
    pub capacity: Option<u32>,
}

impl CourtDraft {
    /// Trim every text field; blank optional fields become `None`.
    pub fn parse(
        name: &str,
        location: &str,
        kind: CourtKind,
        capacity: &str,
    ) -> Result<Self, RecordError> {
        let name = non_empty_name(name)?;
        let location = Some(location.trim()).filter(|l| !l.is_empty()).map(str::to_string);
        let capacity = match capacity.trim() {
            "" => None,
            raw => Some(
                raw.parse::<u32>()
                    .map_err(|_| RecordError::InvalidCapacity(raw.to_string()))?,
            ),
        };
        Ok(Self { name, location, status: CourtStatus::Available, kind, capacity })
    }
}

/// Which courts the Courts tab lists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CourtFilter {
    #[default]
    All,
    Status(CourtStatus),
    Kind(CourtKind),
}

impl CourtFilter {
    pub fn next(self) -> Self {
        match self {
            CourtFilter::All => CourtFilter::Status(CourtStatus::Available),
            CourtFilter::Status(CourtStatus::Maintenance) => CourtFilter::Kind(CourtKind::Indoor),
            CourtFilter::Status(status) => CourtFilter::Status(status.next()),
            CourtFilter::Kind(CourtKind::Indoor) => CourtFilter::Kind(CourtKind::Outdoor),
            CourtFilter::Kind(CourtKind::Outdoor) => CourtFilter::All,
        }
    }

    pub fn label(self) -> String {
        match self {
            CourtFilter::All => "all".to_string(),
            CourtFilter::Status(status) => format!("status={}", status.label()),
            CourtFilter::Kind(kind) => format!("type={}", kind.label()),
        }
    }
}

impl Registry<Court> {
    pub fn by_status(&self, status: CourtStatus) -> Vec<&Court> {
        self.filter(move |c| c.status == status).collect()
    }

    pub fn by_kind(&self, kind: CourtKind) -> Vec<&Court> {
        self.filter(move |c| c.kind == kind).collect()
    }

    pub fn matching(&self, filter: CourtFilter) -> Vec<&Court> {
        match filter {
            CourtFilter::All => self.iter().collect(),
            CourtFilter::Status(status) => self.by_status(status),
            CourtFilter::Kind(kind) => self.by_kind(kind),
        }
    }
}

fn seed_date(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0)
        .single()
        .unwrap_or_default()
}

/// Courts written to a fresh data directory.
pub fn default_courts() -> Vec<Court> {
    let court = |id: &str, name: &str, location: &str, status, kind, capacity, updated: DateTime<Utc>| Court {
        id: id.to_string(),
        name: name.to_string(),
        location: Some(location.to_string()),
        status,
        kind,
        capacity: Some(capacity),
        created_at: seed_date(2024, 1, 1),
        updated_at: updated,
    };
    vec![
        court("1", "Court A", "Main Building", CourtStatus::Available, CourtKind::Indoor, 4, seed_date(2024, 1, 1)),
        court("2", "Court B", "Main Building", CourtStatus::Occupied, CourtKind::Indoor, 4, seed_date(2024, 1, 15)),
        court("3", "Outdoor Court 1", "Backyard", CourtStatus::Available, CourtKind::Outdoor, 2, seed_date(2024, 1, 1)),
    ]
}

// ---------------------------------------------------------------------------
// Scoreboards
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scoreboard {
    pub id: String,
    pub name: String,
}

impl Record for Scoreboard {
    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

/// Scoreboard entry as found on disk. Older files named the field `courtname`, and some
/// entries carry no id or name at all.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoredScoreboard {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub courtname: Option<String>,
}

/// Bring stored entries to the current shape. Returns `true` when anything had to change,
/// in which case the file should be written back.
pub fn migrate_scoreboards(stored: Vec<StoredScoreboard>) -> (Vec<Scoreboard>, bool) {
    let mut changed = false;
    let boards = stored
        .into_iter()
        .enumerate()
        .map(|(index, entry)| {
            let id = match entry.id.filter(|id| !id.trim().is_empty()) {
                Some(id) => id,
                None => {
                    changed = true;
                    (index + 1).to_string()
                }
            };
            let name = match entry.name.filter(|n| !n.trim().is_empty()) {
                Some(name) => name,
                None => {
                    changed = true;
                    entry
                        .courtname
                        .filter(|n| !n.trim().is_empty())
                        .unwrap_or_else(|| format!("Scoreboard {}", index + 1))
                }
            };
            Scoreboard { id, name }
        })
        .collect();
    (boards, changed)
}

pub fn default_scoreboards() -> Vec<Scoreboard> {
    (1..=3)
        .map(|n| Scoreboard { id: n.to_string(), name: format!("Scoreboard {n}") })
        .collect()
}

pub fn non_empty_name(raw: &str) -> Result<String, RecordError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(RecordError::EmptyName);
    }
    Ok(name.to_string())
}
