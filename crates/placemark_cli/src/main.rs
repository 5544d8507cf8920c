//! Terminal front end for placemark.
//!
//! # Responsibility
//! - Load settings, start logging and open the local store.
//! - Run one-shot commands or the interactive session.

mod command;
mod render;
mod session;

use log::info;
use placemark_core::db::open_db;
use placemark_core::{
    init_logging, Action, App, DisabledGeocoder, LookupWorker, NominatimClient, Outcome,
    ReverseGeocoder, Settings, SqliteKvStore, EXPORT_FILE_NAME,
};
use session::Session;
use std::error::Error;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

const USAGE: &str = "\
usage: placemark [--config <file>] [--offline] [command]

commands:
  (none)               start the interactive session
  list                 print saved places
  export [path]        write places as JSON (default: places.json)
  import <path>        replace places from a JSON file
  reset --yes          clear all places and modes
  version              print the version";

#[derive(Debug, Default)]
struct CliArgs {
    config: Option<PathBuf>,
    offline: bool,
    command: Vec<String>,
}

impl CliArgs {
    fn parse(mut args: impl Iterator<Item = String>) -> Result<Self, String> {
        let mut parsed = Self::default();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" | "-c" => {
                    let path = args
                        .next()
                        .ok_or_else(|| "--config needs a file path".to_string())?;
                    parsed.config = Some(PathBuf::from(path));
                }
                "--offline" => parsed.offline = true,
                "--help" | "-h" => parsed.command = vec!["help".to_string()],
                _ => {
                    parsed.command.push(arg);
                    parsed.command.extend(args.by_ref());
                }
            }
        }
        Ok(parsed)
    }
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("placemark: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<ExitCode, Box<dyn Error>> {
    let args = CliArgs::parse(std::env::args().skip(1))?;
    match args.command.first().map(String::as_str) {
        Some("help") => {
            println!("{USAGE}");
            return Ok(ExitCode::SUCCESS);
        }
        Some("version") => {
            println!("placemark {}", placemark_core::core_version());
            return Ok(ExitCode::SUCCESS);
        }
        _ => {}
    }

    let settings = Settings::load(args.config.as_deref())?;
    let cwd = std::env::current_dir()?;
    init_logging(&settings.logging.level, settings.log_dir(&cwd))?;

    let conn = open_db(&settings.storage.db_path)?;
    let store = SqliteKvStore::try_new(&conn)?;
    let mut app = App::load(store, settings.tile_source())?;

    let command: Vec<&str> = args.command.iter().map(String::as_str).collect();
    let code = match command.as_slice() {
        [] => {
            let offline = args.offline || !settings.geocode.enabled;
            let geocoder: Arc<dyn ReverseGeocoder> = if offline {
                info!("event=geocoder module=cli status=ok mode=disabled");
                Arc::new(DisabledGeocoder)
            } else {
                Arc::new(NominatimClient::new(&settings.nominatim()))
            };
            let drain_timeout = Duration::from_secs(settings.geocode.timeout_secs + 1);
            Session::new(app, LookupWorker::new(geocoder), drain_timeout).run();
            ExitCode::SUCCESS
        }
        ["list"] => {
            render::places(app.state());
            ExitCode::SUCCESS
        }
        ["export"] => exit_code(session::export_to(&app, Path::new(EXPORT_FILE_NAME))),
        ["export", path] => exit_code(session::export_to(&app, Path::new(path))),
        ["import", path] => {
            let text = std::fs::read_to_string(path)?;
            match app.dispatch(Action::Import(text)) {
                Ok(Outcome::Imported(count)) => {
                    println!("imported {count} places");
                    ExitCode::SUCCESS
                }
                Ok(_) => ExitCode::SUCCESS,
                Err(err) => {
                    session::report(&err);
                    ExitCode::FAILURE
                }
            }
        }
        ["reset", "--yes"] => {
            app.dispatch(Action::Reset { confirmed: true })?;
            println!("all places cleared");
            ExitCode::SUCCESS
        }
        ["reset"] => {
            println!("reset deletes every saved place; rerun as `placemark reset --yes`");
            ExitCode::FAILURE
        }
        _ => {
            eprintln!("{USAGE}");
            ExitCode::from(2)
        }
    };
    Ok(code)
}

fn exit_code(ok: bool) -> ExitCode {
    if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

#[cfg(test)]
mod tests {
    use super::CliArgs;
    use std::path::PathBuf;

    fn parse(args: &[&str]) -> CliArgs {
        CliArgs::parse(args.iter().map(|arg| arg.to_string())).unwrap()
    }

    #[test]
    fn flags_come_before_command() {
        let args = parse(&["--offline", "-c", "my.toml", "export", "out.json"]);
        assert!(args.offline);
        assert_eq!(args.config, Some(PathBuf::from("my.toml")));
        assert_eq!(args.command, vec!["export", "out.json"]);
    }

    #[test]
    fn missing_config_path_is_an_error() {
        assert!(CliArgs::parse(["--config".to_string()].into_iter()).is_err());
    }

    #[test]
    fn no_arguments_means_interactive() {
        let args = parse(&[]);
        assert!(args.command.is_empty());
        assert!(!args.offline);
    }
}
