use log::error;
use tennis_scoring::Side;
use tui::backend::Backend;
use tui::layout::{Alignment, Constraint, Layout, Rect};
use tui::style::{Color, Modifier, Style};
use tui::text::{Line, Span};
use tui::widgets::{Block, BorderType, Borders, Clear, Paragraph, Tabs};
use tui::{Frame, Terminal};
use tui_logger::TuiLoggerWidget;

use crate::app::{App, MenuItem, side_name};
use crate::components::scoreboard::{MIN_HEIGHT, ScoreboardView};
use crate::components::theme::{Theme, ThemeColor, resolve};
use crate::state::app_state::{FieldValue, FormState};
use crate::state::records::CourtStatus;
use crate::state::storage::{ERROR_CHAR, LoadingState};
use crate::ui::layout::LayoutAreas;

const HELP_TEXT: &[(&str, &str)] = &[
    ("Tab / Shift-Tab", "switch tab"),
    ("?  /  Esc", "help / back"),
    ("j k  ↓ ↑", "move in a list"),
    ("a", "new court or scoreboard"),
    ("d", "delete selected"),
    ("s", "cycle court status"),
    ("F", "cycle court filter"),
    ("Enter", "open the selected scoreboard's match"),
    ("1  2", "point to side 1 / side 2"),
    ("u", "undo last point"),
    ("n", "new match on this scoreboard"),
    ("b  v", "toggle best-of / first server"),
    ("f", "full screen"),
    ("\"", "show logs"),
    ("q", "quit"),
];

pub fn draw<B>(terminal: &mut Terminal<B>, app: &mut App, loading: LoadingState)
where
    B: Backend,
{
    let current_size = terminal.size().unwrap_or_default();
    if current_size.width <= 10 || current_size.height <= 10 {
        return;
    }

    let mut layout = LayoutAreas::new(current_size);

    let result = terminal.draw(|f| {
        layout.update(f.area(), app.settings.full_screen, app.state.show_logs);

        if !app.settings.full_screen {
            draw_tabs(f, layout.tab_bar, app);
        }

        match app.state.active_tab {
            MenuItem::Courts => draw_courts(f, layout.main, app),
            MenuItem::Scoreboards => draw_scoreboards(f, layout.main, app),
            MenuItem::Match => draw_match(f, layout.main, app),
            MenuItem::Help => draw_help(f, layout.main),
        }

        if let Some(logs) = layout.logs {
            draw_logs(f, logs);
        }
        draw_status_line(f, layout.status_line, app);

        if let Some(form) = app.state.form.as_ref() {
            draw_form(f, layout.main, form);
        }

        draw_loading_spinner(f, f.area(), app, loading);
    });

    if let Err(e) = result {
        error!("draw failed: {e}");
    }
}

pub fn default_border<'a>(color: Color) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(color))
}

fn draw_tabs(f: &mut Frame, tab_bar: [Rect; 2], app: &App) {
    let style = Style::default().fg(Color::White);
    let border_type = BorderType::Rounded;

    let tab_index = MenuItem::TABS
        .iter()
        .position(|t| *t == app.state.active_tab)
        .unwrap_or(0);

    let titles: Vec<Line> = MenuItem::TABS.iter().map(|t| Line::from(t.title())).collect();
    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .borders(Borders::LEFT | Borders::BOTTOM | Borders::TOP)
                .border_type(border_type),
        )
        .highlight_style(Style::default().add_modifier(Modifier::UNDERLINED))
        .select(tab_index)
        .style(style);
    f.render_widget(tabs, tab_bar[0]);

    let help = Paragraph::new("Help: ? ")
        .alignment(Alignment::Right)
        .block(
            Block::default()
                .borders(Borders::RIGHT | Borders::BOTTOM | Borders::TOP)
                .border_type(border_type),
        )
        .style(style);
    f.render_widget(help, tab_bar[1]);
}

fn draw_not_loaded(f: &mut Frame, area: Rect, app: &App) -> bool {
    if app.state.loaded {
        return false;
    }
    let msg = match app.state.last_error.as_deref() {
        Some(err) => format!("Loading data failed:\n{err}"),
        None => "Loading data...".to_string(),
    };
    f.render_widget(
        Paragraph::new(msg)
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center),
        area,
    );
    true
}

fn status_color(status: CourtStatus) -> Color {
    match status {
        CourtStatus::Available => Color::Green,
        CourtStatus::Occupied => Color::Yellow,
        CourtStatus::Maintenance => Color::Red,
    }
}

fn draw_courts(f: &mut Frame, area: Rect, app: &App) {
    let courts = &app.state.courts;
    let block = default_border(Color::White)
        .title(format!(" Courts ({}) ", courts.filter.label()));
    let inner = block.inner(area);
    f.render_widget(block, area);

    if draw_not_loaded(f, inner, app) {
        return;
    }

    let [legend, content] =
        Layout::vertical([Constraint::Length(2), Constraint::Fill(1)]).areas(inner);
    f.render_widget(
        Paragraph::new("j/k=move  a=add  d=delete  s=status  F=filter")
            .style(Style::default().fg(Color::DarkGray)),
        legend,
    );

    let visible = courts.visible();
    if visible.is_empty() {
        f.render_widget(Paragraph::new("No courts match this filter"), content);
        return;
    }

    let dim = resolve(ThemeColor::Dim, Theme::Dark);
    let lines: Vec<Line> = visible
        .iter()
        .enumerate()
        .map(|(idx, court)| {
            let selected = idx == courts.selected;
            let marker = if selected { "> " } else { "  " };
            let name_style = if selected {
                Style::default().add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            let capacity = court.capacity.map_or_else(|| "-".to_string(), |c| c.to_string());
            Line::from(vec![
                Span::raw(marker),
                Span::styled(format!("{:<4}", court.id), dim),
                Span::styled(format!("{:<20}", court.name), name_style),
                Span::styled(
                    format!("{:<12}", court.status.label()),
                    Style::default().fg(status_color(court.status)),
                ),
                Span::raw(format!("{:<8}", court.kind.label())),
                Span::raw(format!("cap {capacity:<4}")),
                Span::styled(court.location.clone().unwrap_or_default(), dim),
            ])
        })
        .collect();

    f.render_widget(Paragraph::new(lines), content);
}

fn draw_scoreboards(f: &mut Frame, area: Rect, app: &App) {
    let boards = &app.state.scoreboards;
    let block = default_border(Color::White).title(" Scoreboards ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    if draw_not_loaded(f, inner, app) {
        return;
    }

    let [legend, content] =
        Layout::vertical([Constraint::Length(2), Constraint::Fill(1)]).areas(inner);
    f.render_widget(
        Paragraph::new("j/k=move  Enter=open match  a=add  d=delete")
            .style(Style::default().fg(Color::DarkGray)),
        legend,
    );

    if boards.registry.is_empty() {
        f.render_widget(Paragraph::new("No scoreboards yet, press a to add one"), content);
        return;
    }

    let dim = resolve(ThemeColor::Dim, Theme::Dark);
    let lines: Vec<Line> = boards
        .registry
        .iter()
        .enumerate()
        .map(|(idx, board)| {
            let marker = if idx == boards.selected { "> " } else { "  " };
            let summary = match app.state.matches.engines.get(&board.id) {
                None => Span::styled("no match", dim),
                Some(engine) => match engine.winner() {
                    Some(winner) => Span::styled(
                        format!("won by {}", side_name(winner)),
                        resolve(ThemeColor::Winner, Theme::Dark),
                    ),
                    None => {
                        let games = engine.current_games();
                        Span::raw(format!(
                            "sets {}-{}  games {}-{}  {}-{}",
                            engine.sets_won().side1,
                            engine.sets_won().side2,
                            games.side1,
                            games.side2,
                            engine.point_label(Side::Side1),
                            engine.point_label(Side::Side2),
                        ))
                    }
                },
            };
            Line::from(vec![
                Span::raw(marker),
                Span::styled(format!("{:<4}", board.id), dim),
                Span::raw(format!("{:<24}", board.name)),
                summary,
            ])
        })
        .collect();

    f.render_widget(Paragraph::new(lines), content);
}

fn draw_match(f: &mut Frame, area: Rect, app: &App) {
    let block = default_border(Color::White).title(" Match ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    if draw_not_loaded(f, inner, app) {
        return;
    }

    let [legend, settings_line, content] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(2),
        Constraint::Fill(1),
    ])
    .areas(inner);
    f.render_widget(
        Paragraph::new("1/2=point  u=undo  n=new match  b=best-of  v=first server")
            .style(Style::default().fg(Color::DarkGray)),
        legend,
    );

    let matches = &app.state.matches;
    f.render_widget(
        Paragraph::new(format!(
            "next match: best of {}, {} serves first",
            matches.best_of,
            side_name(matches.initial_server)
        ))
        .style(Style::default().fg(Color::Gray)),
        settings_line,
    );

    let Some(board) = app.active_scoreboard() else {
        draw_placeholder(f, content, "Pick a scoreboard on the Scoreboards tab and press Enter");
        return;
    };
    let Some(engine) = matches.active_engine() else {
        draw_placeholder(f, content, &format!("No match on {}. Press n to start one.", board.name));
        return;
    };

    let snapshot = engine.snapshot();
    let view = ScoreboardView {
        title: &board.name,
        snapshot: &snapshot,
        point_server: engine.point_server(),
        tie_break: engine.is_tie_break(),
        best_of: engine.config().best_of_sets(),
        theme: Theme::Dark,
    };
    if content.width < view.width() || content.height < MIN_HEIGHT {
        draw_placeholder(f, content, "Window too small for the scoreboard");
        return;
    }
    f.render_widget(view, content);
}

fn draw_help(f: &mut Frame, area: Rect) {
    let block = default_border(Color::DarkGray).title(" Help ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let lines: Vec<Line> = HELP_TEXT
        .iter()
        .map(|(keys, action)| {
            Line::from(vec![
                Span::styled(format!("{keys:>18}  "), resolve(ThemeColor::Accent, Theme::Dark)),
                Span::raw(*action),
            ])
        })
        .collect();
    f.render_widget(Paragraph::new(lines), inner);
}

fn draw_form(f: &mut Frame, area: Rect, form: &FormState) {
    let height = form.fields.len() as u16 + 4;
    let width = area.width.min(56);
    let popup = Rect::new(
        area.x + area.width.saturating_sub(width) / 2,
        area.y + area.height.saturating_sub(height) / 2,
        width,
        height.min(area.height),
    );
    f.render_widget(Clear, popup);

    let block = default_border(Color::Yellow).title(form.title());
    let inner = block.inner(popup);
    f.render_widget(block, popup);

    let mut lines: Vec<Line> = form
        .fields
        .iter()
        .enumerate()
        .map(|(idx, field)| {
            let focused = idx == form.focus;
            let cursor = if focused && matches!(field.value, FieldValue::Text(_)) { "_" } else { "" };
            let style = if focused {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default()
            };
            Line::from(vec![
                Span::styled(format!("{:>10}: ", field.label), Style::default().fg(Color::Gray)),
                Span::styled(format!("{}{cursor}", field.display()), style),
            ])
        })
        .collect();

    lines.push(match form.error.as_deref() {
        Some(err) => Line::styled(err.to_string(), resolve(ThemeColor::Error, Theme::Dark)),
        None => Line::styled(
            "Enter=save  Esc=cancel  Tab=next field  ←/→=choose",
            Style::default().fg(Color::DarkGray),
        ),
    });
    f.render_widget(Paragraph::new(lines), inner);
}

fn draw_logs(f: &mut Frame, area: Rect) {
    let widget = TuiLoggerWidget::default()
        .block(default_border(Color::DarkGray).title(" Logs "))
        .style_error(Style::default().fg(Color::Red))
        .style_warn(Style::default().fg(Color::Yellow))
        .style_info(Style::default().fg(Color::Gray))
        .style_debug(Style::default().fg(Color::DarkGray));
    f.render_widget(widget, area);
}

fn draw_status_line(f: &mut Frame, area: Rect, app: &App) {
    let line = if let Some(err) = app.state.last_error.as_deref() {
        Line::styled(format!(" {err}"), resolve(ThemeColor::Error, Theme::Dark))
    } else if let Some(status) = app.state.status.as_deref() {
        Line::styled(format!(" {status}"), resolve(ThemeColor::Secondary, Theme::Dark))
    } else {
        Line::styled(
            format!(" data: {}", app.settings.data_dir.display()),
            Style::default().fg(Color::DarkGray),
        )
    };
    f.render_widget(Paragraph::new(line), area);
}

fn draw_placeholder(f: &mut Frame, area: Rect, msg: &str) {
    let block = default_border(Color::DarkGray);
    let inner = block.inner(area);
    f.render_widget(block, area);
    f.render_widget(
        Paragraph::new(msg)
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center),
        inner,
    );
}

fn draw_loading_spinner(f: &mut Frame, area: Rect, app: &App, loading: LoadingState) {
    if !loading.is_loading && loading.spinner_char != ERROR_CHAR {
        return;
    }
    let style = match loading.spinner_char {
        ERROR_CHAR => Style::default().fg(Color::Red),
        _ => Style::default().fg(Color::White),
    };
    let spinner = Paragraph::new(loading.spinner_char.to_string())
        .alignment(Alignment::Right)
        .style(style);
    let area = if app.settings.full_screen {
        Rect::new(area.width.saturating_sub(3), area.height.saturating_sub(2), 1, 1)
    } else {
        Rect::new(area.width.saturating_sub(11), 1, 1, 1)
    };
    f.render_widget(spinner, area);
}
