use tennis_scoring::{MatchSnapshot, Side};
use tui::buffer::Buffer;
use tui::layout::Rect;
use tui::widgets::Widget;

use crate::app::side_name;
use crate::components::theme::{Theme, ThemeColor, resolve};

// ---------------------------------------------------------------------------
// Layout constants
// ---------------------------------------------------------------------------

/// Server marker plus side name.
const NAME_W: usize = 10;
/// One column per set: right-aligned games.
const SET_W: usize = 4;
/// Point score column.
const POINTS_W: usize = 6;

pub const MIN_HEIGHT: u16 = 6;

/// Read-only view of one match, drawn from its snapshot.
///
/// ```text
///     ── Centre Court · best of 3 ──
///
///              S1  S2  S3   PTS
///   ● Side 1    6   3        40
///     Side 2    4   5        AD
///
///            TIE-BREAK
/// ```
pub struct ScoreboardView<'a> {
    pub title: &'a str,
    pub snapshot: &'a MatchSnapshot,
    /// Server of the next point (differs from the snapshot's server inside a tie-break).
    pub point_server: Side,
    pub tie_break: bool,
    pub best_of: u32,
    pub theme: Theme,
}

impl ScoreboardView<'_> {
    pub fn width(&self) -> u16 {
        (NAME_W + SET_W * self.best_of as usize + POINTS_W) as u16
    }

    fn header(&self) -> String {
        let mut line = " ".repeat(NAME_W);
        for n in 1..=self.best_of {
            line.push_str(&format!("{:>SET_W$}", format!("S{n}")));
        }
        line.push_str(&format!("{:>POINTS_W$}", "PTS"));
        line
    }

    fn side_row(&self, side: Side) -> String {
        let marker = if !self.snapshot.completed && side == self.point_server { '●' } else { ' ' };
        let mut line = format!("{marker} {:<w$}", side_name(side), w = NAME_W - 2);
        for idx in 0..self.best_of as usize {
            let games = self.snapshot.sets.get(idx).map(|set| match side {
                Side::Side1 => set.side1_score,
                Side::Side2 => set.side2_score,
            });
            match games {
                Some(games) => line.push_str(&format!("{games:>SET_W$}")),
                None => line.push_str(&" ".repeat(SET_W)),
            }
        }
        let points = if self.snapshot.completed { "" } else { self.snapshot.point_score(side) };
        line.push_str(&format!("{points:>POINTS_W$}"));
        line
    }

    fn footer(&self) -> Option<String> {
        if let Some(winner) = self.snapshot.winner {
            Some(format!("WINNER  {}", side_name(winner)))
        } else if self.tie_break {
            Some("TIE-BREAK".to_string())
        } else {
            None
        }
    }
}

impl Widget for ScoreboardView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height < MIN_HEIGHT || area.width < self.width() {
            return;
        }

        let accent = resolve(ThemeColor::Accent, self.theme);
        let dim = resolve(ThemeColor::Dim, self.theme);
        let primary = resolve(ThemeColor::Primary, self.theme);
        let winner = resolve(ThemeColor::Winner, self.theme);

        let x = area.x + (area.width - self.width()) / 2;
        let centered = |text: &str| area.x + area.width.saturating_sub(text.chars().count() as u16) / 2;

        let title = format!("── {} · best of {} ──", self.title, self.best_of);
        buf.set_string(centered(&title), area.y, &title, accent);
        buf.set_string(x, area.y + 2, self.header(), dim);

        for (offset, side) in Side::BOTH.into_iter().enumerate() {
            let style = if self.snapshot.winner == Some(side) { winner } else { primary };
            buf.set_string(x, area.y + 3 + offset as u16, self.side_row(side), style);
        }

        if let Some(footer) = self.footer()
            && area.height > MIN_HEIGHT
        {
            let style = if self.snapshot.completed { winner } else { accent };
            buf.set_string(centered(&footer), area.y + MIN_HEIGHT, &footer, style);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tennis_scoring::{MatchConfig, MatchEngine};

    fn rendered(view: ScoreboardView, width: u16, height: u16) -> Vec<String> {
        let area = Rect::new(0, 0, width, height);
        let mut buf = Buffer::empty(area);
        view.render(area, &mut buf);
        (0..height)
            .map(|y| (0..width).map(|x| buf[(x, y)].symbol()).collect::<String>())
            .collect()
    }

    fn view<'a>(engine: &MatchEngine, snapshot: &'a MatchSnapshot) -> ScoreboardView<'a> {
        ScoreboardView {
            title: "Centre",
            snapshot,
            point_server: engine.point_server(),
            tie_break: engine.is_tie_break(),
            best_of: engine.config().best_of_sets(),
            theme: Theme::Dark,
        }
    }

    #[test]
    fn test_width_follows_format() {
        let engine = MatchEngine::new(MatchConfig::best_of(5, Side::Side1).unwrap()).unwrap();
        let snap = engine.snapshot();
        assert_eq!(view(&engine, &snap).width(), (NAME_W + 5 * SET_W + POINTS_W) as u16);
    }

    #[test]
    fn test_rows_show_games_points_and_server() {
        let mut engine = MatchEngine::new(MatchConfig::default()).unwrap();
        for side in [Side::Side1; 4].into_iter().chain([Side::Side2, Side::Side2, Side::Side1]) {
            engine.point_won(side).unwrap();
        }
        let snap = engine.snapshot();
        let v = view(&engine, &snap);
        assert_eq!(v.side_row(Side::Side1), "  Side 1     1            15");
        assert_eq!(v.side_row(Side::Side2), "● Side 2     0            30");
        assert_eq!(v.header(), "            S1  S2  S3   PTS");
        assert_eq!(v.footer(), None);
    }

    #[test]
    fn test_render_places_rows_and_winner_footer() {
        let engine = MatchEngine::replay(MatchConfig::default(), &[Side::Side2; 48]).unwrap();
        let snap = engine.snapshot();
        let lines = rendered(view(&engine, &snap), 40, 8);
        assert!(lines[0].contains("Centre · best of 3"));
        assert!(lines[3].contains("Side 1     0   0"));
        assert!(lines[4].contains("Side 2     6   6"));
        assert!(!lines[3].contains('●') && !lines[4].contains('●'));
        assert!(lines[6].contains("WINNER  Side 2"));
    }

    #[test]
    fn test_too_small_area_draws_nothing() {
        let engine = MatchEngine::new(MatchConfig::default()).unwrap();
        let snap = engine.snapshot();
        let lines = rendered(view(&engine, &snap), 20, 8);
        assert!(lines.iter().all(|l| l.trim().is_empty()));
    }
}
