//! Line parser for the interactive session.

use std::path::PathBuf;

pub const HELP: &str = "\
commands:
  click <lat> <lng>   open a new place draft (collecting mode only)
  title <text>        set the draft title
  notes <text>        set the draft notes
  save                look up the address and commit the draft
  cancel              discard the draft
  edit <id>           edit a saved place (unique id prefix is enough)
  rm <id>             remove a saved place
  list                show saved places
  markers             show map markers and popups
  collect [on|off]    toggle or set collecting mode
  toggle-list         show/hide the place list
  export [path]       write places as JSON (default: places.json)
  import <path>       replace places from a JSON file
  reset               clear everything (asks for confirmation)
  status              show modes, draft and tile source
  help                show this help
  quit                leave";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Click { lat: f64, lng: f64 },
    Title(String),
    Notes(String),
    Save,
    Cancel,
    Edit(String),
    Remove(String),
    List,
    Markers,
    Collect(Option<bool>),
    ToggleList,
    Export(Option<PathBuf>),
    Import(PathBuf),
    Reset,
    Status,
    Help,
    Quit,
}

/// Parses one input line. Blank lines yield `Ok(None)`.
pub fn parse_line(line: &str) -> Result<Option<Command>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };

    let command = match verb.to_ascii_lowercase().as_str() {
        "click" => {
            let mut parts = rest.split_whitespace();
            let lat = parse_number(parts.next(), "lat")?;
            let lng = parse_number(parts.next(), "lng")?;
            if parts.next().is_some() {
                return Err("usage: click <lat> <lng>".to_string());
            }
            Command::Click { lat, lng }
        }
        "title" => Command::Title(rest.to_string()),
        "notes" => Command::Notes(rest.to_string()),
        "save" | "add" => Command::Save,
        "cancel" => Command::Cancel,
        "edit" => Command::Edit(required(rest, "usage: edit <id>")?),
        "rm" | "remove" | "delete" => Command::Remove(required(rest, "usage: rm <id>")?),
        "list" | "ls" => Command::List,
        "markers" | "map" => Command::Markers,
        "collect" => match rest.to_ascii_lowercase().as_str() {
            "" => Command::Collect(None),
            "on" => Command::Collect(Some(true)),
            "off" => Command::Collect(Some(false)),
            _ => return Err("usage: collect [on|off]".to_string()),
        },
        "toggle-list" => Command::ToggleList,
        "export" => Command::Export(Some(rest).filter(|path| !path.is_empty()).map(PathBuf::from)),
        "import" => Command::Import(PathBuf::from(required(rest, "usage: import <path>")?)),
        "reset" => Command::Reset,
        "status" => Command::Status,
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        other => return Err(format!("unknown command `{other}`; type `help`")),
    };
    Ok(Some(command))
}

fn parse_number(value: Option<&str>, name: &str) -> Result<f64, String> {
    let value = value.ok_or_else(|| "usage: click <lat> <lng>".to_string())?;
    value
        .parse::<f64>()
        .map_err(|_| format!("{name} must be a number, got `{value}`"))
}

fn required(value: &str, usage: &str) -> Result<String, String> {
    if value.is_empty() {
        Err(usage.to_string())
    } else {
        Ok(value.to_string())
    }
}
