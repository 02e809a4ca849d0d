// Copyright (C) 2026  Caprica Software Limited
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Terminal host.
//!
//! The host follows a strict setup-run-teardown pattern so the terminal state
//! is restored even when the run loop fails.
//!
//! * The **Main Thread** owns the engine, ticks it and renders.
//! * An **Input Thread** forwards raw key events.
//! * A **Tick Thread** sends the periodic tick that drives both dispatch and
//!   rendering.
//!
//! Both background threads talk to the main thread over a `std::sync::mpsc`
//! channel.

mod keys;
mod render;
mod term;
mod theme;
pub(crate) mod tools;
pub(crate) mod triggers;

use std::{
    io::{self, Stdout},
    rc::Rc,
    sync::mpsc::{self, Receiver, Sender},
    thread,
    time::Duration,
};

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use keymaster::{KeyMaster, Page, PageListener, config::AppConfig};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::{info, warn};

use crate::host::{
    keys::TerminalKeys,
    theme::Theme,
    triggers::{SharedState, register_examples},
};

#[derive(Debug)]
pub(crate) enum HostEvent {
    Key(KeyEvent),
    Tick,
}

/// Host state.
pub(crate) struct App {
    pub config: AppConfig,
    pub theme: Theme,

    pub event_tx: Sender<HostEvent>,
    pub event_rx: Receiver<HostEvent>,

    pub keymaster: KeyMaster,
    pub keys: TerminalKeys,
    pub state: SharedState,

    /// Status line for the remote channel.
    pub remote_status: String,
}

impl App {
    pub fn new(config: AppConfig) -> Self {
        let (event_tx, event_rx) = mpsc::channel();

        let mut keymaster = KeyMaster::new();
        let state = SharedState::default();
        register_examples(&mut keymaster, &state);

        let listener_state = state.clone();
        let listener: PageListener = Rc::new(move |page: Page| {
            listener_state.record(format!("Page {page} activated"));
        });
        keymaster.add_page_listener(listener);

        let remote_status = match &config.remote {
            Some(remote) if remote.enabled => match keymaster.start_remote(remote) {
                Ok(addr) => format!("listening on {addr}"),
                Err(e) => {
                    warn!(error = %e, "remote commands unavailable");
                    format!("unavailable: {e}")
                }
            },
            _ => "disabled".to_string(),
        };

        Self {
            config,
            theme: Theme::default(),
            event_tx,
            event_rx,
            keymaster,
            keys: TerminalKeys::new(),
            state,
            remote_status,
        }
    }
}

/// Runs the terminal host until the user quits.
pub(crate) fn run(config: AppConfig) -> Result<()> {
    let mut app = App::new(config);

    let mut terminal = setup_terminal(&app)?;
    let res = run_loop(&mut terminal, &mut app);
    restore_terminal(&mut terminal);

    app.keymaster.shutdown();

    res.context("Application error occurred")
}

/// Prepares the terminal: background colour, raw mode and the alternate
/// screen.
fn setup_terminal(app: &App) -> Result<Terminal<CrosstermBackend<Stdout>>> {
    // Set the background of the entire terminal window, without this we'd get
    // a thin black outline
    if let Some(hex) = Theme::to_hex(app.theme.background_colour) {
        term::set_terminal_bg(&hex);
    }

    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("Failed to enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend).context("Failed to create terminal")?;

    Ok(terminal)
}

/// Restores the terminal to its original state.
///
/// Best effort, since this runs during cleanup.
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) {
    disable_raw_mode().ok();
    execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
    term::reset_terminal_bg();
    terminal.show_cursor().ok();
}

/// Spawns the input and tick threads, then processes events until the user
/// quits.
fn run_loop(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> Result<()> {
    // Spawn a thread to forward raw key events.
    let tx_keys = app.event_tx.clone();
    thread::spawn(move || {
        loop {
            match event::read() {
                Ok(Event::Key(key)) => {
                    if tx_keys.send(HostEvent::Key(key)).is_err() {
                        break;
                    }
                }
                Ok(_) => {}
                Err(e) => {
                    warn!(error = %e, "failed to read terminal event");
                    break;
                }
            }
        }
    });

    // Spawn a thread to send the periodic tick, which is both the dispatch
    // rate and the minimum frame rate.
    let tx_tick = app.event_tx.clone();
    let interval = Duration::from_millis(app.config.tick_millis.max(1));
    thread::spawn(move || {
        while tx_tick.send(HostEvent::Tick).is_ok() {
            thread::sleep(interval);
        }
    });

    info!(tick_millis = app.config.tick_millis, "host started");

    while let Ok(event) = app.event_rx.recv() {
        match event {
            HostEvent::Key(key) if is_quit(&key) => break,
            HostEvent::Key(key) => app.keys.handle(key),
            HostEvent::Tick => {
                if !app.keymaster.tick(app.keys.state()) {
                    break;
                }
                app.keys.end_frame();
                terminal.draw(|f| render::draw(f, app))?;
            }
        }
    }

    info!("host stopped");
    Ok(())
}

fn is_quit(key: &KeyEvent) -> bool {
    key.kind == KeyEventKind::Press
        && (key.code == KeyCode::Esc
            || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL)))
}
