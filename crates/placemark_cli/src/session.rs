//! Interactive event loop.
//!
//! # Responsibility
//! - Multiplex stdin lines and finished lookups on one thread.
//! - Translate commands into `Action`s and print their outcome.
//!
//! # Invariants
//! - State is only touched from the loop thread.
//! - Reset runs only after an explicit `y`/`yes` answer.

use crate::command::{parse_line, Command, HELP};
use crate::render;
use crossbeam_channel::{select, unbounded, Receiver};
use log::{info, warn};
use placemark_core::{
    Action, App, AppError, KvStore, LookupWorker, Outcome, EXPORT_FILE_NAME,
};
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::thread;
use std::time::Duration;

pub struct Session<S: KvStore> {
    app: App<S>,
    worker: LookupWorker,
    awaiting_reset: bool,
    drain_timeout: Duration,
}

impl<S: KvStore> Session<S> {
    pub fn new(app: App<S>, worker: LookupWorker, drain_timeout: Duration) -> Self {
        Self {
            app,
            worker,
            awaiting_reset: false,
            drain_timeout,
        }
    }

    /// Runs until `quit` or end of input.
    pub fn run(mut self) {
        println!("placemark {}: type `help` for commands", placemark_core::core_version());
        render::status(self.app.state(), self.app.editor(), self.app.tiles());
        prompt();

        let lines = spawn_stdin_reader();
        let results = self.worker.results().clone();
        loop {
            select! {
                recv(lines) -> line => match line {
                    Ok(line) => {
                        if !self.handle_line(&line) {
                            break;
                        }
                        prompt();
                    }
                    Err(_) => {
                        self.drain_pending_lookup(&results);
                        break;
                    }
                },
                recv(results) -> result => {
                    if let Ok(result) = result {
                        self.apply(Action::LookupFinished(result));
                        prompt();
                    }
                }
            }
        }
        info!("event=session_end module=cli status=ok");
    }

    fn handle_line(&mut self, line: &str) -> bool {
        if self.awaiting_reset {
            self.awaiting_reset = false;
            let confirmed = matches!(line.trim().to_ascii_lowercase().as_str(), "y" | "yes");
            if !confirmed {
                println!("reset cancelled");
                return true;
            }
            self.apply(Action::Reset { confirmed: true });
            return true;
        }

        let command = match parse_line(line) {
            Ok(Some(command)) => command,
            Ok(None) => return true,
            Err(message) => {
                println!("{message}");
                return true;
            }
        };

        match command {
            Command::Click { lat, lng } => self.apply(Action::MapClicked { lat, lng }),
            Command::Title(title) => self.apply(Action::SetDraftTitle(title)),
            Command::Notes(notes) => self.apply(Action::SetDraftNotes(notes)),
            Command::Save => self.apply(Action::SubmitDraft),
            Command::Cancel => self.apply(Action::CancelDraft),
            Command::Edit(prefix) => {
                if let Some(id) = self.resolve_id(&prefix) {
                    self.apply(Action::EditPlace(id));
                }
            }
            Command::Remove(prefix) => {
                if let Some(id) = self.resolve_id(&prefix) {
                    self.apply(Action::RemovePlace(id));
                }
            }
            Command::List => render::places(self.app.state()),
            Command::Markers => render::markers(&self.app.markers(), self.app.state()),
            Command::Collect(None) => self.apply(Action::ToggleCollecting),
            Command::Collect(Some(on)) => self.apply(Action::SetCollecting(on)),
            Command::ToggleList => self.apply(Action::ToggleList),
            Command::Export(path) => {
                let path = path.unwrap_or_else(|| EXPORT_FILE_NAME.into());
                export_to(&self.app, &path);
            }
            Command::Import(path) => match std::fs::read_to_string(&path) {
                Ok(text) => self.apply(Action::Import(text)),
                Err(err) => println!("import failed: cannot read {}: {err}", path.display()),
            },
            Command::Reset => match self.app.dispatch(Action::Reset { confirmed: false }) {
                Ok(Outcome::NeedsConfirmation) => {
                    print!("delete all {} places? [y/N] ", self.app.state().locations.len());
                    let _ = io::stdout().flush();
                    self.awaiting_reset = true;
                }
                Ok(_) => {}
                Err(err) => report(&err),
            },
            Command::Status => {
                render::status(self.app.state(), self.app.editor(), self.app.tiles())
            }
            Command::Help => println!("{HELP}"),
            Command::Quit => return false,
        }
        true
    }

    fn apply(&mut self, action: Action) {
        match self.app.dispatch(action) {
            Ok(outcome) => self.show(outcome),
            Err(err) => report(&err),
        }
    }

    fn show(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Unchanged => {}
            Outcome::DraftOpened(_) | Outcome::DraftUpdated => render::draft(self.app.editor()),
            Outcome::DraftCancelled => println!("draft discarded"),
            Outcome::LookupRequested(request) => {
                println!("looking up address...");
                self.worker.submit(request);
            }
            Outcome::Committed(place) => {
                println!("saved {} {}", render::short_id(&place.id), place.title)
            }
            Outcome::StaleLookup => {}
            Outcome::Removed(place) => println!("removed {}", place.title),
            Outcome::ModeChanged {
                collecting,
                show_list,
            } => println!("collecting={collecting} list={show_list}"),
            Outcome::Imported(count) => println!("imported {count} places"),
            Outcome::NeedsConfirmation => {}
            Outcome::Reset => println!("all places cleared"),
        }
    }

    fn resolve_id(&self, prefix: &str) -> Option<String> {
        if self.app.places().get(prefix).is_some() {
            return Some(prefix.to_string());
        }
        let matches: Vec<&str> = self
            .app
            .state()
            .locations
            .iter()
            .map(|place| place.id.as_str())
            .filter(|id| id.starts_with(prefix))
            .collect();
        match matches.as_slice() {
            [id] => Some((*id).to_string()),
            [] => {
                println!("no place matches `{prefix}`");
                None
            }
            _ => {
                println!("`{prefix}` matches {} places; use a longer prefix", matches.len());
                None
            }
        }
    }

    fn drain_pending_lookup(&mut self, results: &Receiver<placemark_core::LookupResult>) {
        if !self.app.editor().is_loading() {
            return;
        }
        match results.recv_timeout(self.drain_timeout) {
            Ok(result) => self.apply(Action::LookupFinished(result)),
            Err(err) => warn!(
                "event=session_drain module=cli status=timeout error={}",
                err
            ),
        }
    }
}

/// Writes the export document for `app` to `path`.
pub fn export_to<S: KvStore>(app: &App<S>, path: &Path) -> bool {
    let document = match app.export_json() {
        Ok(document) => document,
        Err(err) => {
            report(&err);
            return false;
        }
    };
    match std::fs::write(path, document) {
        Ok(()) => {
            println!(
                "exported {} places to {}",
                app.state().locations.len(),
                path.display()
            );
            true
        }
        Err(err) => {
            println!("export failed: {err}");
            false
        }
    }
}

pub fn report(err: &AppError) {
    match err {
        AppError::Service(placemark_core::PlacesServiceError::Transfer(inner)) => {
            println!("import failed: {inner}")
        }
        other => println!("error: {other}"),
    }
}

fn spawn_stdin_reader() -> Receiver<String> {
    let (sender, receiver) = unbounded();
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if sender.send(line).is_err() {
                break;
            }
        }
    });
    receiver
}

fn prompt() {
    print!("> ");
    let _ = io::stdout().flush();
}
