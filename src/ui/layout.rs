use tui::layout::{Constraint, Layout, Rect, Size};
pub const TAB_BAR_HEIGHT: u16 = 3;
pub const STATUS_LINE_HEIGHT: u16 = 1;

/// Pre-computed layout areas for the main draw loop.
pub struct LayoutAreas {
    pub tab_bar: [Rect; 2],
    pub main: Rect,
    /// Log pane, when toggled on.
    pub logs: Option<Rect>,
    pub status_line: Rect,
}

impl LayoutAreas {
    pub fn new(size: Size) -> Self {
        let rect = Rect::new(0, 0, size.width, size.height);
        Self::from_rect(rect, false, false)
    }

    pub fn update(&mut self, area: Rect, full_screen: bool, show_logs: bool) {
        *self = Self::from_rect(area, full_screen, show_logs);
    }

    fn from_rect(area: Rect, full_screen: bool, show_logs: bool) -> Self {
        let (tab_bar, body) = if full_screen {
            ([Rect::ZERO, Rect::ZERO], area)
        } else {
            let [tab, body] =
                Layout::vertical([Constraint::Length(TAB_BAR_HEIGHT), Constraint::Fill(1)]).areas(area);
            (Self::split_tab_bar(tab), body)
        };

        let [content, status_line] =
            Layout::vertical([Constraint::Fill(1), Constraint::Length(STATUS_LINE_HEIGHT)]).areas(body);

        let (main, logs) = if show_logs {
            let [main, logs] =
                Layout::vertical([Constraint::Percentage(65), Constraint::Percentage(35)]).areas(content);
            (main, Some(logs))
        } else {
            (content, None)
        };

        LayoutAreas { tab_bar, main, logs, status_line }
    }

    fn split_tab_bar(area: Rect) -> [Rect; 2] {
        Layout::horizontal([Constraint::Percentage(85), Constraint::Percentage(15)]).areas(area)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tab_bar_and_status_line_reserved() {
        let layout = LayoutAreas::new(Size::new(100, 40));
        assert_eq!(layout.tab_bar[0].height, TAB_BAR_HEIGHT);
        assert_eq!(layout.main.y, TAB_BAR_HEIGHT);
        assert_eq!(layout.main.height, 40 - TAB_BAR_HEIGHT - STATUS_LINE_HEIGHT);
        assert_eq!(layout.status_line.y, 39);
        assert!(layout.logs.is_none());
    }

    #[test]
    fn test_full_screen_with_logs() {
        let mut layout = LayoutAreas::new(Size::new(100, 41));
        layout.update(Rect::new(0, 0, 100, 41), true, true);
        assert_eq!(layout.tab_bar, [Rect::ZERO, Rect::ZERO]);
        assert_eq!(layout.main.y, 0);
        let logs = layout.logs.unwrap();
        assert_eq!(layout.main.height + logs.height, 40);
        assert_eq!(logs.y, layout.main.height);
    }
}
