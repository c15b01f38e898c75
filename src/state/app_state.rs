use crate::app::MenuItem;
use crate::state::records::{
    Court, CourtDraft, CourtFilter, CourtKind, RecordError, Scoreboard, non_empty_name,
};
use crate::state::registry::Registry;
use std::collections::HashMap;
use tennis_scoring::{MatchEngine, Side};

// ---------------------------------------------------------------------------
// Courts tab
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct CourtsState {
    pub registry: Registry<Court>,
    pub filter: CourtFilter,
    /// Index into the filtered list.
    pub selected: usize,
}

impl CourtsState {
    pub fn visible(&self) -> Vec<&Court> {
        self.registry.matching(self.filter)
    }

    pub fn selected_court(&self) -> Option<&Court> {
        self.visible().get(self.selected).copied()
    }

    pub fn select_next(&mut self) {
        self.selected = step_down(self.selected, self.visible().len());
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn cycle_filter(&mut self) {
        self.filter = self.filter.next();
        self.selected = 0;
    }

    pub fn clamp_selection(&mut self) {
        self.selected = clamp(self.selected, self.visible().len());
    }
}

// ---------------------------------------------------------------------------
// Scoreboards tab
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct ScoreboardsState {
    pub registry: Registry<Scoreboard>,
    pub selected: usize,
}

impl ScoreboardsState {
    pub fn selected_scoreboard(&self) -> Option<&Scoreboard> {
        self.registry.iter().nth(self.selected)
    }

    pub fn select_next(&mut self) {
        self.selected = step_down(self.selected, self.registry.len());
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn clamp_selection(&mut self) {
        self.selected = clamp(self.selected, self.registry.len());
    }
}

// ---------------------------------------------------------------------------
// Live matches, one per scoreboard
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct MatchesState {
    pub engines: HashMap<String, MatchEngine>,
    /// Scoreboard shown on the Match tab.
    pub active: Option<String>,
    /// Format and first server for the next match started with `n`.
    pub best_of: u32,
    pub initial_server: Side,
}

impl Default for MatchesState {
    fn default() -> Self {
        Self {
            engines: HashMap::new(),
            active: None,
            best_of: 3,
            initial_server: Side::Side1,
        }
    }
}

impl MatchesState {
    pub fn active_engine(&self) -> Option<&MatchEngine> {
        self.engines.get(self.active.as_deref()?)
    }

    pub fn toggle_best_of(&mut self) {
        self.best_of = if self.best_of == 3 { 5 } else { 3 };
    }

    pub fn toggle_initial_server(&mut self) {
        self.initial_server = self.initial_server.opponent();
    }
}

// ---------------------------------------------------------------------------
// Create form
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
    Court,
    Scoreboard,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Kind(CourtKind),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormField {
    pub label: &'static str,
    pub value: FieldValue,
}

impl FormField {
    fn text(label: &'static str) -> Self {
        Self { label, value: FieldValue::Text(String::new()) }
    }

    pub fn display(&self) -> String {
        match &self.value {
            FieldValue::Text(text) => text.clone(),
            FieldValue::Kind(kind) => format!("< {} >", kind.label()),
        }
    }
}

pub enum FormOutput {
    Court(CourtDraft),
    Scoreboard(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormState {
    pub kind: FormKind,
    pub fields: Vec<FormField>,
    pub focus: usize,
    pub error: Option<String>,
}

impl FormState {
    pub fn court() -> Self {
        Self {
            kind: FormKind::Court,
            fields: vec![
                FormField::text("Name"),
                FormField::text("Location"),
                FormField { label: "Type", value: FieldValue::Kind(CourtKind::Indoor) },
                FormField::text("Capacity"),
            ],
            focus: 0,
            error: None,
        }
    }

    pub fn scoreboard() -> Self {
        Self { kind: FormKind::Scoreboard, fields: vec![FormField::text("Name")], focus: 0, error: None }
    }

    pub fn title(&self) -> &'static str {
        match self.kind {
            FormKind::Court => " New court ",
            FormKind::Scoreboard => " New scoreboard ",
        }
    }

    pub fn push_char(&mut self, c: char) {
        match &mut self.fields[self.focus].value {
            FieldValue::Text(text) => text.push(c),
            FieldValue::Kind(kind) if c == ' ' => *kind = toggle_kind(*kind),
            FieldValue::Kind(_) => {}
        }
    }

    pub fn backspace(&mut self) {
        if let FieldValue::Text(text) = &mut self.fields[self.focus].value {
            text.pop();
        }
    }

    /// Left/Right on a choice field.
    pub fn toggle(&mut self) {
        if let FieldValue::Kind(kind) = &mut self.fields[self.focus].value {
            *kind = toggle_kind(*kind);
        }
    }

    pub fn focus_next(&mut self) {
        self.focus = (self.focus + 1) % self.fields.len();
    }

    pub fn focus_prev(&mut self) {
        self.focus = (self.focus + self.fields.len() - 1) % self.fields.len();
    }

    fn text(&self, idx: usize) -> &str {
        match self.fields.get(idx).map(|f| &f.value) {
            Some(FieldValue::Text(text)) => text,
            _ => "",
        }
    }

    fn court_kind(&self) -> CourtKind {
        self.fields
            .iter()
            .find_map(|f| match f.value {
                FieldValue::Kind(kind) => Some(kind),
                FieldValue::Text(_) => None,
            })
            .unwrap_or_default()
    }

    pub fn submit(&self) -> Result<FormOutput, RecordError> {
        match self.kind {
            FormKind::Court => {
                CourtDraft::parse(self.text(0), self.text(1), self.court_kind(), self.text(3))
                    .map(FormOutput::Court)
            }
            FormKind::Scoreboard => non_empty_name(self.text(0)).map(FormOutput::Scoreboard),
        }
    }
}

fn toggle_kind(kind: CourtKind) -> CourtKind {
    match kind {
        CourtKind::Indoor => CourtKind::Outdoor,
        CourtKind::Outdoor => CourtKind::Indoor,
    }
}

// ---------------------------------------------------------------------------
// AppState
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct AppState {
    pub active_tab: MenuItem,
    pub previous_tab: MenuItem,
    pub show_logs: bool,
    /// Set once the first load from disk has come back.
    pub loaded: bool,
    pub last_error: Option<String>,
    pub status: Option<String>,
    pub courts: CourtsState,
    pub scoreboards: ScoreboardsState,
    pub matches: MatchesState,
    pub form: Option<FormState>,
    /// Set by the quit keys; the main loop stops and flushes storage before exiting.
    pub should_quit: bool,
}

impl AppState {
    pub fn new(best_of: u32) -> Self {
        Self {
            matches: MatchesState { best_of, ..MatchesState::default() },
            ..Self::default()
        }
    }
}

fn step_down(selected: usize, len: usize) -> usize {
    if selected + 1 < len { selected + 1 } else { selected }
}

fn clamp(selected: usize, len: usize) -> usize {
    selected.min(len.saturating_sub(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::records::{CourtStatus, default_courts, default_scoreboards};

    fn courts_state() -> CourtsState {
        let (registry, _) = Registry::from_records(default_courts());
        CourtsState { registry, ..CourtsState::default() }
    }

    #[test]
    fn test_court_navigation_stays_in_bounds() {
        let mut courts = courts_state();
        courts.select_prev();
        assert_eq!(courts.selected, 0);
        for _ in 0..5 {
            courts.select_next();
        }
        assert_eq!(courts.selected, 2);
        assert_eq!(courts.selected_court().map(|c| c.name.as_str()), Some("Outdoor Court 1"));
    }

    #[test]
    fn test_filter_resets_selection() {
        let mut courts = courts_state();
        courts.select_next();
        courts.cycle_filter();
        assert_eq!(courts.filter, CourtFilter::Status(CourtStatus::Available));
        assert_eq!(courts.selected, 0);
        let names: Vec<_> = courts.visible().iter().map(|c| c.name.clone()).collect();
        assert_eq!(names, vec!["Court A", "Outdoor Court 1"]);

        courts.cycle_filter();
        assert_eq!(courts.visible().len(), 1);
        courts.cycle_filter();
        assert!(courts.visible().is_empty());
        assert!(courts.selected_court().is_none());
    }

    #[test]
    fn test_scoreboard_clamp_after_shrink() {
        let (registry, _) = Registry::from_records(default_scoreboards());
        let mut boards = ScoreboardsState { registry, selected: 2 };
        boards.registry.delete("3");
        boards.clamp_selection();
        assert_eq!(boards.selected, 1);
        assert_eq!(boards.selected_scoreboard().map(|b| b.id.as_str()), Some("2"));
    }

    #[test]
    fn test_court_form_collects_fields() {
        let mut form = FormState::court();
        "Court C".chars().for_each(|c| form.push_char(c));
        form.focus_next();
        "Annex".chars().for_each(|c| form.push_char(c));
        form.focus_next();
        form.toggle();
        form.focus_next();
        form.push_char('8');
        form.push_char('x');
        form.backspace();

        let Ok(FormOutput::Court(draft)) = form.submit() else {
            panic!("court form should submit");
        };
        assert_eq!(draft.name, "Court C");
        assert_eq!(draft.location.as_deref(), Some("Annex"));
        assert_eq!(draft.kind, CourtKind::Outdoor);
        assert_eq!(draft.capacity, Some(8));
    }

    #[test]
    fn test_focus_wraps_both_ways() {
        let mut form = FormState::court();
        form.focus_prev();
        assert_eq!(form.focus, 3);
        form.focus_next();
        assert_eq!(form.focus, 0);
    }

    #[test]
    fn test_blank_scoreboard_name_is_refused() {
        let mut form = FormState::scoreboard();
        form.push_char(' ');
        assert!(matches!(form.submit(), Err(RecordError::EmptyName)));
        form.push_char('X');
        assert!(matches!(form.submit(), Ok(FormOutput::Scoreboard(name)) if name == "X"));
    }

    #[test]
    fn test_matches_state_toggles() {
        let mut matches = MatchesState::default();
        matches.toggle_best_of();
        assert_eq!(matches.best_of, 5);
        matches.toggle_best_of();
        assert_eq!(matches.best_of, 3);
        matches.toggle_initial_server();
        assert_eq!(matches.initial_server, Side::Side2);
        assert!(matches.active_engine().is_none());
    }
}
