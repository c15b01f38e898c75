mod app;
mod components;
mod draw;
mod keys;
mod state;
mod ui;

use crate::app::App;
use crate::state::messages::{StorageRequest, StorageResponse, UiEvent};
use crate::state::refresher::PeriodicRefresher;
use crate::state::storage::{DataStore, LoadingState, StorageWorker};
use crossterm::event::{self as crossterm_event, Event};
use crossterm::{cursor, execute, terminal};
use log::{error, info};
use std::io::Stdout;
use std::sync::Arc;
use std::{io, panic};
use std::time::Duration;
use tokio::sync::{Mutex, mpsc};
use tokio::time::timeout;
use tui::{Terminal, backend::CrosstermBackend};

const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if handle_cli_args() {
        return Ok(());
    }

    better_panic::install();

    let backend = CrosstermBackend::new(io::stdout());
    let terminal = Terminal::new(backend)?;

    setup_panic_hook();
    setup_terminal()?;

    tui_logger::init_logger(log::LevelFilter::Trace)?;
    tui_logger::set_default_level(log::LevelFilter::Error);

    let app = App::new();
    let store = DataStore::new(app.settings.data_dir.clone());
    info!("data directory: {}", store.dir().display());
    let app = Arc::new(Mutex::new(app));

    let (ui_event_tx, ui_event_rx) = mpsc::channel::<UiEvent>(100);
    let (storage_req_tx, storage_req_rx) = mpsc::channel::<StorageRequest>(100);
    let (storage_resp_tx, storage_resp_rx) = mpsc::channel::<StorageResponse>(100);

    // Input handler thread
    let input_handler = tokio::spawn(input_handler_task(ui_event_tx.clone()));

    // Storage thread
    let storage_worker = StorageWorker::new(store, storage_req_rx, storage_resp_tx);
    let storage_task = tokio::spawn(storage_worker.run());

    // Periodic registry refresh thread (every 30s)
    let periodic_refresher = PeriodicRefresher::new(storage_req_tx.clone());
    let periodic_task = tokio::spawn(periodic_refresher.run());

    // Trigger the initial load
    let _ = ui_event_tx.send(UiEvent::AppStarted).await;

    main_ui_loop(terminal, app, ui_event_rx, storage_req_tx, storage_resp_rx).await;

    // The worker stops once the refresher's sender is gone too, after writing what is queued.
    periodic_task.abort();
    let _ = periodic_task.await;
    if timeout(SHUTDOWN_GRACE, storage_task).await.is_err() {
        error!("storage worker did not finish within {SHUTDOWN_GRACE:?}");
    }

    input_handler.abort();
    cleanup_terminal();
    // The input task may be parked in a blocking read that only a key press would end.
    std::process::exit(0);
}

fn handle_cli_args() -> bool {
    let mut args = std::env::args().skip(1);
    let Some(arg) = args.next() else {
        return false;
    };

    match arg.as_str() {
        "-h" | "--help" => {
            println!("{}", usage_text());
            true
        }
        "-V" | "--version" => {
            println!("courtside {}", env!("CARGO_PKG_VERSION"));
            true
        }
        _ => {
            eprintln!("Unknown argument: {arg}\n\n{}", usage_text());
            std::process::exit(2);
        }
    }
}

fn usage_text() -> &'static str {
    "courtside - courts, scoreboards and live tennis scoring

Usage:
  courtside
  courtside --help
  courtside --version

Environment:
  COURTSIDE_DATA_DIR   Directory for courts.json, scoreboards.json and matches.json
                       (default $XDG_CONFIG_HOME/courtside, then ~/.config/courtside)
  COURTSIDE_LOG_LEVEL  error | warn | info | debug | trace (default error)
  COURTSIDE_BEST_OF    Sets per new match, 3 or 5 (default 3)"
}

async fn main_ui_loop(
    mut terminal: Terminal<CrosstermBackend<Stdout>>,
    app: Arc<Mutex<App>>,
    mut ui_events: mpsc::Receiver<UiEvent>,
    storage_requests: mpsc::Sender<StorageRequest>,
    mut storage_responses: mpsc::Receiver<StorageResponse>,
) {
    let mut loading = LoadingState::default();

    loop {
        tokio::select! {
            Some(ui_event) = ui_events.recv() => {
                let should_redraw = handle_ui_event(ui_event, &app, &storage_requests).await;
                if app.lock().await.state.should_quit {
                    break;
                }
                if should_redraw && !loading.is_loading {
                    let mut app_guard = app.lock().await;
                    draw::draw(&mut terminal, &mut app_guard, loading);
                }
            }

            Some(response) = storage_responses.recv() => {
                let should_redraw =
                    handle_storage_response(response, &app, &storage_requests, &mut loading).await;
                if should_redraw {
                    let mut app_guard = app.lock().await;
                    draw::draw(&mut terminal, &mut app_guard, loading);
                }
            }

            else => break,
        }
    }
}

async fn handle_ui_event(
    ui_event: UiEvent,
    app: &Arc<Mutex<App>>,
    storage_requests: &mpsc::Sender<StorageRequest>,
) -> bool {
    match ui_event {
        UiEvent::AppStarted => {
            let _ = storage_requests.send(StorageRequest::LoadAll).await;
            true
        }
        UiEvent::KeyPressed(key_event) => {
            keys::handle_key_bindings(key_event, app, storage_requests).await;
            true
        }
        UiEvent::Resize => true,
    }
}

async fn handle_storage_response(
    response: StorageResponse,
    app: &Arc<Mutex<App>>,
    storage_requests: &mpsc::Sender<StorageRequest>,
    loading: &mut LoadingState,
) -> bool {
    let mut guard = app.lock().await;
    match response {
        StorageResponse::LoadingStateChanged { loading_state } => {
            *loading = loading_state;
            return true;
        }
        StorageResponse::Loaded { data } => guard.on_data_loaded(data),
        StorageResponse::Refreshed { courts, scoreboards, generation } => {
            guard.on_refreshed(courts, scoreboards, generation)
        }
        StorageResponse::Saved { file } => guard.on_saved(file),
        StorageResponse::Error { message } => {
            error!("Storage error: {message}");
            guard.on_error(message);
        }
    }

    // Loading can renumber records or drop orphaned matches; write those back.
    let follow_up = guard.take_requests();
    drop(guard);
    for request in follow_up {
        let _ = storage_requests.send(request).await;
    }
    !loading.is_loading
}

async fn input_handler_task(ui_events: mpsc::Sender<UiEvent>) {
    loop {
        if let Ok(event) = crossterm_event::read() {
            let ui_event = match event {
                Event::Key(key_event) => Some(UiEvent::KeyPressed(key_event)),
                Event::Resize(_, _) => Some(UiEvent::Resize),
                _ => None,
            };

            if let Some(ui_event) = ui_event
                && ui_events.send(ui_event).await.is_err()
            {
                break;
            }
        }
    }
}

fn setup_terminal() -> io::Result<()> {
    let mut stdout = io::stdout();
    execute!(stdout, cursor::Hide)?;
    execute!(stdout, terminal::EnterAlternateScreen)?;
    execute!(stdout, terminal::Clear(terminal::ClearType::All))?;
    terminal::enable_raw_mode()
}

/// Best effort: also runs from the panic hook, where there is nobody left to report to.
fn cleanup_terminal() {
    let mut stdout = io::stdout();
    let _ = execute!(stdout, cursor::MoveTo(0, 0));
    let _ = execute!(stdout, terminal::Clear(terminal::ClearType::All));
    let _ = execute!(stdout, terminal::LeaveAlternateScreen);
    let _ = execute!(stdout, cursor::Show);
    let _ = terminal::disable_raw_mode();
}

fn setup_panic_hook() {
    panic::set_hook(Box::new(|panic_info| {
        cleanup_terminal();
        better_panic::Settings::auto().create_panic_handler()(panic_info);
    }));
}
