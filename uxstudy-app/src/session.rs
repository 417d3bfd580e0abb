use std::str::FromStr;

use thiserror::Error;

/// One line typed at the study console.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start(String),
    /// Press a button on the touchscreen or controller panel.
    Tap(usize),
    /// Record a baseline selection by catalogue index.
    Pick(usize),
    /// Spoken keyword, kept verbatim apart from the leading separator.
    Say(String),
    End,
    Status,
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("empty command")]
    Empty,
    #[error("unknown command {0:?}; type `help`")]
    Unknown(String),
    #[error("`{0}` needs an argument")]
    MissingArgument(&'static str),
    #[error("{0:?} is not a button number")]
    BadIndex(String),
}

pub const HELP: &str = "\
commands:
  start <voice|touchscreen|controller|baseline>
  tap <n>      press button n on the active panel
  pick <n>     record baseline selection of catalogue item n
  say <word>   spoken keyword (voice condition)
  end          end the running condition
  status       show progress
  quit";

impl FromStr for Command {
    type Err = ParseError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim_end_matches(['\r', '\n']);
        let trimmed = line.trim_start();
        if trimmed.is_empty() {
            return Err(ParseError::Empty);
        }
        let (verb, rest) = match trimmed.split_once(' ') {
            Some((verb, rest)) => (verb, Some(rest)),
            None => (trimmed, None),
        };

        let index = |name: &'static str| -> Result<usize, ParseError> {
            let raw = rest.map(str::trim).filter(|r| !r.is_empty());
            let raw = raw.ok_or(ParseError::MissingArgument(name))?;
            raw.parse()
                .map_err(|_| ParseError::BadIndex(raw.to_string()))
        };

        match verb.to_ascii_lowercase().as_str() {
            "start" => rest
                .map(str::trim)
                .filter(|r| !r.is_empty())
                .map(|r| Command::Start(r.to_string()))
                .ok_or(ParseError::MissingArgument("start")),
            "tap" => index("tap").map(Command::Tap),
            "pick" => index("pick").map(Command::Pick),
            "say" => rest
                .filter(|r| !r.is_empty())
                .map(|r| Command::Say(r.to_string()))
                .ok_or(ParseError::MissingArgument("say")),
            "end" => Ok(Command::End),
            "status" => Ok(Command::Status),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" => Ok(Command::Quit),
            other => Err(ParseError::Unknown(other.to_string())),
        }
    }
}
