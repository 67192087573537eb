//! Line commands accepted on stdin.

use shared::domain::LinkKind;
use thiserror::Error;

pub const HELP: &str = "\
commands:
  edit  <map|store> <index> <text>   type text into an entry
  paste <map|store> <index> <text>   paste text and validate it
  blur  <map|store> <index>          leave the entry (validates non-empty text)
  add   <map|store>                  append an empty entry
  clear <map|store> <index>          empty an entry in place
  show                               print both lists
  submit                             send validated links
  create <pin> <name>                register with a 4-digit PIN and name
  help | quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Edit {
        kind: LinkKind,
        index: usize,
        text: String,
    },
    Paste {
        kind: LinkKind,
        index: usize,
        text: String,
    },
    Blur {
        kind: LinkKind,
        index: usize,
    },
    Add {
        kind: LinkKind,
    },
    Clear {
        kind: LinkKind,
        index: usize,
    },
    Show,
    Submit,
    Create {
        pin: String,
        name: String,
    },
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("empty command")]
    Empty,
    #[error("unknown command '{0}' (try 'help')")]
    UnknownCommand(String),
    #[error("missing {0}")]
    MissingArgument(&'static str),
    #[error("unknown link list '{0}', expected 'map' or 'store'")]
    InvalidKind(String),
    #[error("invalid entry index '{0}'")]
    InvalidIndex(String),
}

pub fn parse_command(line: &str) -> Result<Command, ParseError> {
    let line = line.trim();
    let (verb, rest) = split_word(line);
    match verb {
        "" => Err(ParseError::Empty),
        "edit" => {
            let (kind, index, text) = parse_target_with_text(rest)?;
            Ok(Command::Edit { kind, index, text })
        }
        "paste" => {
            let (kind, index, text) = parse_target_with_text(rest)?;
            if text.is_empty() {
                return Err(ParseError::MissingArgument("text"));
            }
            Ok(Command::Paste { kind, index, text })
        }
        "blur" => {
            let (kind, index, _) = parse_target(rest)?;
            Ok(Command::Blur { kind, index })
        }
        "add" => {
            let (kind, _) = parse_kind(rest)?;
            Ok(Command::Add { kind })
        }
        "clear" => {
            let (kind, index, _) = parse_target(rest)?;
            Ok(Command::Clear { kind, index })
        }
        "show" => Ok(Command::Show),
        "submit" => Ok(Command::Submit),
        "create" => {
            let (pin, name) = split_word(rest);
            if pin.is_empty() {
                return Err(ParseError::MissingArgument("PIN"));
            }
            if name.is_empty() {
                return Err(ParseError::MissingArgument("name"));
            }
            Ok(Command::Create {
                pin: pin.to_string(),
                name: name.trim_end().to_string(),
            })
        }
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" => Ok(Command::Quit),
        other => Err(ParseError::UnknownCommand(other.to_string())),
    }
}

fn split_word(input: &str) -> (&str, &str) {
    let input = input.trim_start();
    match input.find(char::is_whitespace) {
        Some(at) => (&input[..at], input[at..].trim_start()),
        None => (input, ""),
    }
}

fn parse_kind(input: &str) -> Result<(LinkKind, &str), ParseError> {
    let (word, rest) = split_word(input);
    let kind = match word {
        "" => return Err(ParseError::MissingArgument("link list")),
        "map" | "bookmark" => LinkKind::Bookmark,
        "store" => LinkKind::Store,
        other => return Err(ParseError::InvalidKind(other.to_string())),
    };
    Ok((kind, rest))
}

fn parse_target(input: &str) -> Result<(LinkKind, usize, &str), ParseError> {
    let (kind, rest) = parse_kind(input)?;
    let (word, rest) = split_word(rest);
    if word.is_empty() {
        return Err(ParseError::MissingArgument("entry index"));
    }
    let index = word
        .parse::<usize>()
        .map_err(|_| ParseError::InvalidIndex(word.to_string()))?;
    Ok((kind, index, rest))
}

/// Text is the remainder of the line, inner whitespace kept.
fn parse_target_with_text(input: &str) -> Result<(LinkKind, usize, String), ParseError> {
    let (kind, index, text) = parse_target(input)?;
    Ok((kind, index, text.to_string()))
}

#[cfg(test)]
#[path = "tests/command_tests.rs"]
mod tests;
