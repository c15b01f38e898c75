use crate::state::app_settings::AppSettings;
use crate::state::app_state::{AppState, FormOutput, FormState};
use crate::state::messages::StorageRequest;
use crate::state::records::{Court, CourtDraft, Scoreboard};
use crate::state::registry::Registry;
use crate::state::storage::StoredData;
use chrono::Utc;
use log::{debug, info, warn};
use tennis_scoring::{MatchConfig, MatchEngine, MatchRecord, MatchSnapshot, ScoringResult, Side};

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub enum MenuItem {
    #[default]
    Courts,
    Scoreboards,
    Match,
    Help,
}

impl MenuItem {
    pub const TABS: [MenuItem; 3] = [MenuItem::Courts, MenuItem::Scoreboards, MenuItem::Match];

    pub fn title(self) -> &'static str {
        match self {
            MenuItem::Courts => "Courts",
            MenuItem::Scoreboards => "Scoreboards",
            MenuItem::Match => "Match",
            MenuItem::Help => "Help",
        }
    }

    fn position(self) -> usize {
        Self::TABS.iter().position(|t| *t == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::TABS[(self.position() + 1) % Self::TABS.len()]
    }

    pub fn prev(self) -> Self {
        Self::TABS[(self.position() + Self::TABS.len() - 1) % Self::TABS.len()]
    }
}

pub fn side_name(side: Side) -> String {
    format!("Side {}", side.number())
}

pub struct App {
    pub settings: AppSettings,
    pub state: AppState,
    /// Writes queued by the handlers below, drained by the key handler after each event.
    pending: Vec<StorageRequest>,
    /// Bumped on every court or scoreboard write. A refresh read before the latest write is stale.
    registry_generation: u64,
}

impl App {
    pub fn new() -> Self {
        let app = Self::with_settings(AppSettings::load());

        if let Some(level) = app.settings.log_level {
            log::set_max_level(level);
            tui_logger::set_default_level(level);
        }

        app
    }

    pub fn with_settings(settings: AppSettings) -> Self {
        Self {
            state: AppState::new(settings.best_of),
            settings,
            pending: Vec::new(),
            registry_generation: 0,
        }
    }

    pub fn take_requests(&mut self) -> Vec<StorageRequest> {
        std::mem::take(&mut self.pending)
    }

    fn persist_courts(&mut self) {
        let courts = self.state.courts.registry.to_vec();
        self.registry_generation += 1;
        self.pending.push(StorageRequest::SaveCourts { courts, generation: self.registry_generation });
    }

    fn persist_scoreboards(&mut self) {
        let scoreboards = self.state.scoreboards.registry.to_vec();
        self.registry_generation += 1;
        self.pending.push(StorageRequest::SaveScoreboards {
            scoreboards,
            generation: self.registry_generation,
        });
    }

    fn persist_match(&mut self, scoreboard_id: &str) {
        if let Some(engine) = self.state.matches.engines.get(scoreboard_id) {
            self.pending.push(StorageRequest::SaveMatch {
                scoreboard_id: scoreboard_id.to_string(),
                record: MatchRecord::capture(engine),
            });
        }
    }

    // -----------------------------------------------------------------------
    // Storage response handlers, called from main_ui_loop
    // -----------------------------------------------------------------------

    pub fn on_data_loaded(&mut self, data: StoredData) {
        self.state.last_error = None;
        self.load_registries(data.courts, data.scoreboards);

        self.state.matches.engines.clear();
        for (scoreboard_id, record) in data.matches {
            if self.state.scoreboards.registry.find(&scoreboard_id).is_none() {
                info!("dropping match for removed scoreboard {scoreboard_id}");
                self.pending.push(StorageRequest::DeleteMatch { scoreboard_id });
                continue;
            }
            match record.into_engine() {
                Ok(engine) => {
                    self.state.matches.engines.insert(scoreboard_id, engine);
                }
                Err(e) => {
                    warn!("stored match for scoreboard {scoreboard_id} not restored: {e}");
                    self.state.last_error = Some(format!("scoreboard {scoreboard_id}: {e}"));
                }
            }
        }

        if self.state.matches.active.is_none() {
            self.state.matches.active =
                self.state.scoreboards.registry.iter().next().map(|b| b.id.clone());
        }
        self.state.loaded = true;
        info!(
            "loaded {} courts, {} scoreboards, {} matches",
            self.state.courts.registry.len(),
            self.state.scoreboards.registry.len(),
            self.state.matches.engines.len()
        );
    }

    pub fn on_refreshed(&mut self, courts: Vec<Court>, scoreboards: Vec<Scoreboard>, generation: u64) {
        if generation != self.registry_generation {
            debug!(
                "ignoring refresh read at write {generation}, local edits are at {}",
                self.registry_generation
            );
            return;
        }
        self.load_registries(courts, scoreboards);
    }

    fn load_registries(&mut self, courts: Vec<Court>, scoreboards: Vec<Scoreboard>) {
        let (courts, courts_fixed) = Registry::from_records(courts);
        let (scoreboards, boards_fixed) = Registry::from_records(scoreboards);
        self.state.courts.registry = courts;
        self.state.scoreboards.registry = scoreboards;
        self.state.courts.clamp_selection();
        self.state.scoreboards.clamp_selection();

        if courts_fixed {
            warn!("court ids were renumbered");
            self.persist_courts();
        }
        if boards_fixed {
            warn!("scoreboard ids were renumbered");
            self.persist_scoreboards();
        }
    }

    pub fn on_saved(&mut self, file: &str) {
        debug!("saved {file}");
    }

    pub fn on_error(&mut self, message: String) {
        self.state.last_error = Some(message);
    }

    // -----------------------------------------------------------------------
    // Tab management
    // -----------------------------------------------------------------------

    pub fn update_tab(&mut self, next: MenuItem) {
        if self.state.active_tab == next {
            return;
        }
        self.state.previous_tab = self.state.active_tab;
        self.state.active_tab = next;
    }

    pub fn next_tab(&mut self) {
        self.update_tab(self.state.active_tab.next());
    }

    pub fn prev_tab(&mut self) {
        self.update_tab(self.state.active_tab.prev());
    }

    pub fn exit_help(&mut self) {
        if self.state.active_tab == MenuItem::Help {
            self.state.active_tab = self.state.previous_tab;
        }
    }

    pub fn toggle_show_logs(&mut self) {
        self.state.show_logs = !self.state.show_logs;
    }

    pub fn request_quit(&mut self) {
        info!("quit requested");
        self.state.should_quit = true;
    }

    pub fn toggle_full_screen(&mut self) {
        self.settings.full_screen = !self.settings.full_screen;
    }

    pub fn clear_messages(&mut self) {
        self.state.last_error = None;
        self.state.status = None;
    }

    // -----------------------------------------------------------------------
    // Lists
    // -----------------------------------------------------------------------

    pub fn select_next(&mut self) {
        match self.state.active_tab {
            MenuItem::Courts => self.state.courts.select_next(),
            MenuItem::Scoreboards => self.state.scoreboards.select_next(),
            _ => {}
        }
    }

    pub fn select_prev(&mut self) {
        match self.state.active_tab {
            MenuItem::Courts => self.state.courts.select_prev(),
            MenuItem::Scoreboards => self.state.scoreboards.select_prev(),
            _ => {}
        }
    }

    pub fn cycle_court_filter(&mut self) {
        self.state.courts.cycle_filter();
    }

    pub fn cycle_court_status(&mut self) {
        let Some(id) = self.state.courts.selected_court().map(|c| c.id.clone()) else {
            return;
        };
        let Some(court) = self.state.courts.registry.find_mut(&id) else {
            return;
        };
        let status = court.cycle_status(Utc::now());
        info!("court {} is now {}", court.name, status.label());
        self.state.status = Some(format!("{} is now {}", court.name, status.label()));
        self.state.courts.clamp_selection();
        self.persist_courts();
    }

    pub fn delete_selected(&mut self) {
        match self.state.active_tab {
            MenuItem::Courts => {
                let Some(id) = self.state.courts.selected_court().map(|c| c.id.clone()) else {
                    return;
                };
                if let Some(court) = self.state.courts.registry.delete(&id) {
                    info!("deleted court {} ({})", court.id, court.name);
                    self.state.status = Some(format!("Deleted {}", court.name));
                }
                self.state.courts.clamp_selection();
                self.persist_courts();
            }
            MenuItem::Scoreboards => {
                let Some(id) = self.state.scoreboards.selected_scoreboard().map(|b| b.id.clone())
                else {
                    return;
                };
                self.delete_scoreboard(&id);
            }
            _ => {}
        }
    }

    /// Removing a scoreboard also drops its match.
    pub fn delete_scoreboard(&mut self, id: &str) -> bool {
        let Some(board) = self.state.scoreboards.registry.delete(id) else {
            return false;
        };
        info!("deleted scoreboard {} ({})", board.id, board.name);
        self.state.status = Some(format!("Deleted {}", board.name));
        self.state.scoreboards.clamp_selection();
        self.persist_scoreboards();

        if self.state.matches.engines.remove(id).is_some() {
            self.pending.push(StorageRequest::DeleteMatch { scoreboard_id: id.to_string() });
        }
        if self.state.matches.active.as_deref() == Some(id) {
            self.state.matches.active = None;
        }
        true
    }

    pub fn create_court(&mut self, draft: CourtDraft) -> Court {
        let court = self
            .state
            .courts
            .registry
            .create(|id| Court::from_draft(id, draft, Utc::now()))
            .clone();
        info!("created court {} ({})", court.id, court.name);
        self.persist_courts();
        court
    }

    pub fn create_scoreboard(&mut self, name: String) -> Scoreboard {
        let board = self
            .state
            .scoreboards
            .registry
            .create(|id| Scoreboard { id, name })
            .clone();
        info!("created scoreboard {} ({})", board.id, board.name);
        self.persist_scoreboards();
        board
    }

    // -----------------------------------------------------------------------
    // Create form
    // -----------------------------------------------------------------------

    pub fn open_form(&mut self) {
        self.state.form = match self.state.active_tab {
            MenuItem::Courts => Some(FormState::court()),
            MenuItem::Scoreboards => Some(FormState::scoreboard()),
            _ => None,
        };
    }

    pub fn cancel_form(&mut self) {
        self.state.form = None;
    }

    pub fn submit_form(&mut self) {
        let Some(form) = self.state.form.as_mut() else {
            return;
        };
        match form.submit() {
            Ok(output) => {
                self.state.form = None;
                let created = match output {
                    FormOutput::Court(draft) => self.create_court(draft).name,
                    FormOutput::Scoreboard(name) => self.create_scoreboard(name).name,
                };
                self.state.status = Some(format!("Created {created}"));
            }
            Err(e) => form.error = Some(e.to_string()),
        }
    }

    // -----------------------------------------------------------------------
    // Matches
    // -----------------------------------------------------------------------

    /// Show the selected scoreboard's match on the Match tab.
    pub fn open_selected_match(&mut self) {
        let Some(id) = self.state.scoreboards.selected_scoreboard().map(|b| b.id.clone()) else {
            return;
        };
        self.state.matches.active = Some(id);
        self.update_tab(MenuItem::Match);
    }

    pub fn active_scoreboard(&self) -> Option<&Scoreboard> {
        self.state.scoreboards.registry.find(self.state.matches.active.as_deref()?)
    }

    /// Start a fresh match on the active scoreboard, replacing any match already there.
    pub fn start_match(&mut self) {
        let Some(id) = self.state.matches.active.clone() else {
            self.state.last_error = Some("Pick a scoreboard first (Scoreboards tab, Enter)".into());
            return;
        };
        let created = MatchConfig::best_of(self.state.matches.best_of, self.state.matches.initial_server)
            .and_then(MatchEngine::new);
        match created {
            Ok(engine) => {
                info!(
                    "new best-of-{} match on scoreboard {id}, {} serving",
                    engine.config().best_of_sets(),
                    engine.server()
                );
                self.state.matches.engines.insert(id.clone(), engine);
                self.state.last_error = None;
                self.state.status = Some("New match started".to_string());
                self.persist_match(&id);
            }
            Err(e) => {
                warn!("cannot start match on scoreboard {id}: {e}");
                self.state.last_error = Some(e.to_string());
            }
        }
    }

    pub fn score_point(&mut self, side: Side) {
        self.mutate_match(|engine| engine.point_won(side));
    }

    pub fn undo_point(&mut self) {
        self.mutate_match(MatchEngine::undo_last_point);
    }

    fn mutate_match(&mut self, op: impl FnOnce(&mut MatchEngine) -> ScoringResult<MatchSnapshot>) {
        let Some(id) = self.state.matches.active.clone() else {
            self.state.last_error = Some("Pick a scoreboard first (Scoreboards tab, Enter)".into());
            return;
        };
        let Some(engine) = self.state.matches.engines.get_mut(&id) else {
            self.state.last_error = Some("No match on this scoreboard, press n to start one".into());
            return;
        };

        match op(engine) {
            Ok(snapshot) => {
                debug!(
                    "scoreboard {id}: {}-{}",
                    snapshot.side1_point_score, snapshot.side2_point_score
                );
                self.state.last_error = None;
                self.state.status = snapshot.winner.map(|w| format!("Match won by {}", side_name(w)));
                self.persist_match(&id);
            }
            Err(e) => {
                warn!("scoreboard {id}: {e}");
                self.state.last_error = Some(e.to_string());
            }
        }
    }

    pub fn toggle_best_of(&mut self) {
        self.state.matches.toggle_best_of();
        self.state.status = Some(format!("Next match: best of {}", self.state.matches.best_of));
    }

    pub fn toggle_initial_server(&mut self) {
        self.state.matches.toggle_initial_server();
        self.state.status = Some(format!(
            "Next match: {} serves first",
            side_name(self.state.matches.initial_server)
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::records::{CourtKind, CourtStatus, default_courts, default_scoreboards};
    use std::collections::BTreeMap;
    use tennis_scoring::ScoringError;

    fn loaded_app() -> App {
        let mut app = App::with_settings(AppSettings::default());
        app.on_data_loaded(StoredData {
            courts: default_courts(),
            scoreboards: default_scoreboards(),
            matches: BTreeMap::new(),
        });
        app
    }

    fn pending_kinds(app: &mut App) -> Vec<&'static str> {
        app.take_requests()
            .iter()
            .map(|r| match r {
                StorageRequest::LoadAll => "load",
                StorageRequest::Refresh => "refresh",
                StorageRequest::SaveCourts { .. } => "courts",
                StorageRequest::SaveScoreboards { .. } => "scoreboards",
                StorageRequest::SaveMatch { .. } => "match",
                StorageRequest::DeleteMatch { .. } => "delete-match",
            })
            .collect()
    }

    #[test]
    fn test_tabs_cycle_and_help_returns() {
        let mut app = loaded_app();
        app.next_tab();
        assert_eq!(app.state.active_tab, MenuItem::Scoreboards);
        app.prev_tab();
        app.prev_tab();
        assert_eq!(app.state.active_tab, MenuItem::Match);
        app.update_tab(MenuItem::Help);
        app.exit_help();
        assert_eq!(app.state.active_tab, MenuItem::Match);
    }

    #[test]
    fn test_load_points_match_tab_at_first_scoreboard() {
        let mut app = loaded_app();
        assert!(app.state.loaded);
        assert_eq!(app.state.matches.active.as_deref(), Some("1"));
        assert!(pending_kinds(&mut app).is_empty());
    }

    #[test]
    fn test_scoring_without_a_match_reports_instead_of_panicking() {
        let mut app = loaded_app();
        app.score_point(Side::Side1);
        assert!(app.state.last_error.as_deref().unwrap().contains("press n"));
        assert!(pending_kinds(&mut app).is_empty());
    }

    #[test]
    fn test_points_are_persisted_after_every_change() {
        let mut app = loaded_app();
        app.start_match();
        app.score_point(Side::Side1);
        app.score_point(Side::Side2);
        app.undo_point();
        assert_eq!(pending_kinds(&mut app), vec!["match", "match", "match", "match"]);

        let engine = app.state.matches.active_engine().unwrap();
        assert_eq!(engine.points(), &[Side::Side1]);
        assert_eq!(engine.point_label(Side::Side1), "15");
    }

    #[test]
    fn test_completed_match_rejects_points_and_shows_error() {
        let mut app = loaded_app();
        app.start_match();
        for _ in 0..48 {
            app.score_point(Side::Side2);
        }
        assert_eq!(app.state.status.as_deref(), Some("Match won by Side 2"));
        app.take_requests();

        app.score_point(Side::Side1);
        assert_eq!(
            app.state.last_error,
            Some(ScoringError::MatchAlreadyCompleted.to_string())
        );
        assert!(pending_kinds(&mut app).is_empty());
    }

    #[test]
    fn test_new_match_uses_toggled_format_and_server() {
        let mut app = loaded_app();
        app.toggle_best_of();
        app.toggle_initial_server();
        app.start_match();
        let engine = app.state.matches.active_engine().unwrap();
        assert_eq!(engine.config().sets_to_win, 3);
        assert_eq!(engine.server(), Side::Side2);
    }

    #[test]
    fn test_deleting_scoreboard_drops_its_match() {
        let mut app = loaded_app();
        app.start_match();
        app.take_requests();

        assert!(app.delete_scoreboard("1"));
        assert_eq!(pending_kinds(&mut app), vec!["scoreboards", "delete-match"]);
        assert!(app.state.matches.engines.is_empty());
        assert_eq!(app.state.matches.active, None);
        assert!(!app.delete_scoreboard("1"));
    }

    #[test]
    fn test_form_submission_creates_with_next_id() {
        let mut app = loaded_app();
        app.update_tab(MenuItem::Scoreboards);
        app.delete_scoreboard("2");
        app.take_requests();

        app.open_form();
        app.submit_form();
        assert_eq!(
            app.state.form.as_ref().and_then(|f| f.error.as_deref()),
            Some("name must not be empty")
        );

        if let Some(form) = app.state.form.as_mut() {
            "Centre".chars().for_each(|c| form.push_char(c));
        }
        app.submit_form();
        assert!(app.state.form.is_none());
        assert_eq!(app.state.scoreboards.registry.find("4").map(|b| b.name.as_str()), Some("Centre"));
        assert_eq!(pending_kinds(&mut app), vec!["scoreboards"]);
    }

    #[test]
    fn test_court_status_cycle_and_delete() {
        let mut app = loaded_app();
        app.cycle_court_status();
        assert_eq!(
            app.state.courts.registry.find("1").map(|c| c.status),
            Some(CourtStatus::Occupied)
        );
        app.select_next();
        app.select_next();
        app.delete_selected();
        assert!(app.state.courts.registry.find("3").is_none());
        assert_eq!(app.state.courts.selected, 1);
        assert_eq!(pending_kinds(&mut app), vec!["courts", "courts"]);
    }

    #[test]
    fn test_refresh_read_before_local_edits_is_ignored() {
        let mut app = loaded_app();
        app.take_requests();
        app.create_court(CourtDraft::parse("New", "", CourtKind::Indoor, "").unwrap());
        let generation = match app.take_requests().as_slice() {
            [StorageRequest::SaveCourts { generation, .. }] => *generation,
            other => panic!("unexpected requests {other:?}"),
        };

        // Files read before the create was written.
        app.on_refreshed(default_courts(), default_scoreboards(), generation - 1);
        assert!(app.state.courts.registry.iter().any(|c| c.name == "New"));

        app.cycle_court_status();
        let Some(StorageRequest::SaveCourts { courts, generation }) = app.take_requests().pop() else {
            panic!("courts were not saved");
        };
        assert!(courts.iter().any(|c| c.name == "New"));

        let mut on_disk = default_courts();
        on_disk.truncate(1);
        app.on_refreshed(on_disk, default_scoreboards(), generation);
        assert_eq!(app.state.courts.registry.len(), 1);
    }

    #[test]
    fn test_stored_matches_are_restored_or_reported() {
        let mut good = MatchEngine::new(MatchConfig::default()).unwrap();
        good.point_won(Side::Side1).unwrap();
        let mut tampered = MatchRecord::capture(&good);
        tampered.snapshot.side1_point_score = "40".into();

        let mut matches = BTreeMap::new();
        matches.insert("1".to_string(), MatchRecord::capture(&good));
        matches.insert("2".to_string(), tampered);
        matches.insert("99".to_string(), MatchRecord::capture(&good));

        let mut app = App::with_settings(AppSettings::default());
        app.on_data_loaded(StoredData {
            courts: default_courts(),
            scoreboards: default_scoreboards(),
            matches,
        });

        assert_eq!(app.state.matches.engines.get("1"), Some(&good));
        assert!(!app.state.matches.engines.contains_key("2"));
        assert!(app.state.last_error.as_deref().unwrap().starts_with("scoreboard 2:"));
        assert_eq!(pending_kinds(&mut app), vec!["delete-match"]);
    }

    #[test]
    fn test_open_selected_match_switches_tab() {
        let mut app = loaded_app();
        app.update_tab(MenuItem::Scoreboards);
        app.select_next();
        app.open_selected_match();
        assert_eq!(app.state.active_tab, MenuItem::Match);
        assert_eq!(app.active_scoreboard().map(|b| b.name.as_str()), Some("Scoreboard 2"));
    }
}
