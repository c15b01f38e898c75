use crate::app::{App, MenuItem};
use crate::state::messages::StorageRequest;
use crossterm::event::KeyCode::Char;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use log::error;
use std::sync::Arc;
use tennis_scoring::Side;
use tokio::sync::{Mutex, mpsc};

pub async fn handle_key_bindings(
    key_event: KeyEvent,
    app: &Arc<Mutex<App>>,
    storage_requests: &mpsc::Sender<StorageRequest>,
) {
    let mut guard = app.lock().await;

    if guard.state.form.is_some() {
        handle_form_keys(key_event, &mut guard);
    } else {
        handle_main_keys(key_event, &mut guard);
    }

    let requests = guard.take_requests();
    drop(guard);
    for request in requests {
        if let Err(e) = storage_requests.send(request).await {
            error!("storage worker is gone: {e}");
        }
    }
}

fn handle_form_keys(key_event: KeyEvent, app: &mut App) {
    let Some(form) = app.state.form.as_mut() else {
        return;
    };
    match (key_event.code, key_event.modifiers) {
        (Char('c'), KeyModifiers::CONTROL) => app.request_quit(),
        (KeyCode::Esc, _) => app.cancel_form(),
        (KeyCode::Enter, _) => app.submit_form(),
        (KeyCode::Tab | KeyCode::Down, _) => form.focus_next(),
        (KeyCode::BackTab | KeyCode::Up, _) => form.focus_prev(),
        (KeyCode::Left | KeyCode::Right, _) => form.toggle(),
        (KeyCode::Backspace, _) => form.backspace(),
        (Char(c), _) => form.push_char(c),
        _ => {}
    }
}

fn handle_main_keys(key_event: KeyEvent, app: &mut App) {
    match (app.state.active_tab, key_event.code, key_event.modifiers) {
        // Quit
        (_, Char('q'), _) | (_, Char('c'), KeyModifiers::CONTROL) => app.request_quit(),

        // Tab switching
        (_, KeyCode::Tab, _) => app.next_tab(),
        (_, KeyCode::BackTab, _) => app.prev_tab(),
        (_, Char('?'), _) => app.update_tab(MenuItem::Help),
        (MenuItem::Help, KeyCode::Esc, _) => app.exit_help(),
        (_, KeyCode::Esc, _) => app.clear_messages(),

        // Lists
        (MenuItem::Courts | MenuItem::Scoreboards, Char('j') | KeyCode::Down, _) => {
            app.select_next()
        }
        (MenuItem::Courts | MenuItem::Scoreboards, Char('k') | KeyCode::Up, _) => {
            app.select_prev()
        }
        (MenuItem::Courts | MenuItem::Scoreboards, Char('a'), _) => app.open_form(),
        (MenuItem::Courts | MenuItem::Scoreboards, Char('d') | KeyCode::Delete, _) => {
            app.delete_selected()
        }
        (MenuItem::Courts, Char('s'), _) => app.cycle_court_status(),
        (MenuItem::Courts, Char('F'), _) => app.cycle_court_filter(),
        (MenuItem::Scoreboards, KeyCode::Enter, _) => app.open_selected_match(),

        // Scoring
        (MenuItem::Match, Char('1'), _) => app.score_point(Side::Side1),
        (MenuItem::Match, Char('2'), _) => app.score_point(Side::Side2),
        (MenuItem::Match, Char('u'), _) => app.undo_point(),
        (MenuItem::Match, Char('n'), _) => app.start_match(),
        (MenuItem::Match, Char('b'), _) => app.toggle_best_of(),
        (MenuItem::Match, Char('v'), _) => app.toggle_initial_server(),

        // Global
        (_, Char('f'), _) => app.toggle_full_screen(),
        (_, Char('"'), _) => app.toggle_show_logs(),

        _ => {}
    }
}
