//! Line commands of the terminal front end.

use std::fmt;
use wikilite_core::Mode;

/// One parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Blank line.
    Empty,
    Search(String),
    /// Tick or untick a mode; `None` toggles it.
    Mode { mode: Mode, selected: Option<bool> },
    Limit(String),
    /// Open the n-th listed result, counting from 1.
    Open(usize),
    Back,
    Reload,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError(String);

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (type :help for commands)", self.0)
    }
}

impl std::error::Error for ParseError {}

pub const HELP: &str = "\
Type a query to search, or one of:
  :mode <title|lexical|semantic|distance> [on|off]   select search modes
  :limit <n>                                         results per mode
  :open <n>                                          open the n-th result
  :back                                              return to the results (exits from the results)
  :reload                                            load the engine's start page again
  :help                                              show this help
  :quit                                              exit";

/// Parse one input line.
pub fn parse(line: &str) -> Result<Command, ParseError> {
    let line = line.trim();
    let Some(rest) = line.strip_prefix(':') else {
        return Ok(if line.is_empty() {
            Command::Empty
        } else {
            Command::Search(line.to_string())
        });
    };

    let mut words = rest.split_whitespace();
    let name = words.next().unwrap_or_default();
    let args: Vec<&str> = words.collect();

    match (name, args.as_slice()) {
        ("mode" | "m", [mode]) => Ok(Command::Mode {
            mode: parse_mode(mode)?,
            selected: None,
        }),
        ("mode" | "m", [mode, switch]) => Ok(Command::Mode {
            mode: parse_mode(mode)?,
            selected: Some(parse_switch(switch)?),
        }),
        ("limit" | "l", [limit]) => Ok(Command::Limit(limit.to_string())),
        ("open" | "o", [n]) => match n.parse::<usize>() {
            Ok(n) if n > 0 => Ok(Command::Open(n)),
            _ => Err(ParseError(format!("not a result number: {}", n))),
        },
        ("back" | "b", []) => Ok(Command::Back),
        ("reload" | "r", []) => Ok(Command::Reload),
        ("help" | "h" | "?", []) => Ok(Command::Help),
        ("quit" | "q" | "exit", []) => Ok(Command::Quit),
        ("mode" | "m" | "limit" | "l" | "open" | "o", _) => {
            Err(ParseError(format!("wrong arguments for :{}", name)))
        }
        _ => Err(ParseError(format!("unknown command :{}", name))),
    }
}

fn parse_mode(s: &str) -> Result<Mode, ParseError> {
    s.parse::<Mode>().map_err(|e| ParseError(e.to_string()))
}

fn parse_switch(s: &str) -> Result<bool, ParseError> {
    match s.to_lowercase().as_str() {
        "on" | "yes" | "1" | "+" => Ok(true),
        "off" | "no" | "0" | "-" => Ok(false),
        other => Err(ParseError(format!("expected on or off, got {}", other))),
    }
}
