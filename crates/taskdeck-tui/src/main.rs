use std::fs::File;
use std::io;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use crossterm::event::{
    DisableMouseCapture, EnableMouseCapture, Event, EventStream, KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use futures::StreamExt;
use ratatui::prelude::*;
use taskdeck_service::{HttpService, LocalService, TaskService};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use taskdeck_tui::app::App;
use taskdeck_tui::event::AppEvent;

const DEFAULT_URL: &str = "http://127.0.0.1:8080";

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    init_tracing();

    let args: Vec<String> = std::env::args().collect();

    // Parse CLI: taskdeck [--server URL] [--local]
    // --local → in-memory service, no server needed
    // --server URL → connect to that server
    // otherwise → TASKDECK_SERVER env var, or the default
    let service: Arc<dyn TaskService> = if args.iter().any(|a| a == "--local") {
        Arc::new(LocalService::new())
    } else {
        let url = if let Some(pos) = args.iter().position(|a| a == "--server") {
            args.get(pos + 1)
                .context("--server requires a URL argument")?
                .clone()
        } else {
            std::env::var("TASKDECK_SERVER")
                .ok()
                .filter(|u| !u.is_empty())
                .unwrap_or_else(|| DEFAULT_URL.to_string())
        };
        Arc::new(HttpService::new(&url))
    };

    run_tui(service).await
}

/// Logs go to a file, never to the terminal the TUI owns.
fn init_tracing() {
    let Ok(path) = std::env::var("TASKDECK_LOG") else {
        return;
    };
    let Ok(file) = File::create(&path) else {
        return;
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init();
}

async fn run_tui(service: Arc<dyn TaskService>) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = event_loop(&mut terminal, service).await;

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(ref e) = result {
        eprintln!("Error: {e}");
    }

    result
}

async fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    service: Arc<dyn TaskService>,
) -> Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel::<AppEvent>();
    let mut app = App::new(service, tx);
    let mut events = EventStream::new();

    loop {
        terminal.draw(|frame| app.render(frame))?;

        tokio::select! {
            maybe_event = events.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                        app.handle_key(key);
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => return Err(e.into()),
                    None => break,
                }
            }
            Some(event) = rx.recv() => {
                app.apply(event);
            }
        }

        if app.should_quit() {
            break;
        }
    }

    Ok(())
}
