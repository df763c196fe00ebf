//! Serial console command parser.
//!
//! One command per line, case-insensitive verbs:
//!
//! ```text
//! pour <drink name>        pour from the selected menu
//! pump <n> fwd|rev|off     drive one pump
//! all fwd|rev|off          drive every pump
//! cancel                   stop the pour in progress
//! menu <index>             select a menu
//! menus                    list menus and drinks
//! ```

use core::fmt;

use crate::app::commands::AppCommand;
use crate::drivers::pump::PumpMode;
use crate::recipe::Channel;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    Empty,
    UnknownCommand,
    MissingArgument(&'static str),
    BadArgument(&'static str),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "empty line"),
            Self::UnknownCommand => write!(f, "unknown command"),
            Self::MissingArgument(what) => write!(f, "missing {what}"),
            Self::BadArgument(what) => write!(f, "bad {what}"),
        }
    }
}

impl std::error::Error for ParseError {}

fn parse_mode(word: &str) -> Result<PumpMode, ParseError> {
    match word.to_ascii_lowercase().as_str() {
        "fwd" | "forward" | "f" => Ok(PumpMode::Forward),
        "rev" | "reverse" | "r" => Ok(PumpMode::Reverse),
        "off" | "stop" => Ok(PumpMode::Off),
        _ => Err(ParseError::BadArgument("mode")),
    }
}

pub fn parse_command(line: &str) -> Result<AppCommand, ParseError> {
    let line = line.trim();
    let (verb, rest) = line
        .split_once(char::is_whitespace)
        .map_or((line, ""), |(v, r)| (v, r.trim()));
    if verb.is_empty() {
        return Err(ParseError::Empty);
    }

    match verb.to_ascii_lowercase().as_str() {
        "pour" => {
            if rest.is_empty() {
                return Err(ParseError::MissingArgument("drink"));
            }
            Ok(AppCommand::Pour(rest.to_owned()))
        }
        "pump" => {
            let mut args = rest.split_whitespace();
            let number = args.next().ok_or(ParseError::MissingArgument("pump number"))?;
            let channel = number
                .parse::<u8>()
                .ok()
                .and_then(Channel::new)
                .ok_or(ParseError::BadArgument("pump number"))?;
            let mode = parse_mode(args.next().ok_or(ParseError::MissingArgument("mode"))?)?;
            Ok(AppCommand::Manual { channel, mode })
        }
        "all" => match parse_mode(rest)? {
            PumpMode::Forward => Ok(AppCommand::AllForward),
            PumpMode::Reverse => Ok(AppCommand::AllReverse),
            PumpMode::Off => Ok(AppCommand::AllOff),
        },
        "cancel" | "stop" => Ok(AppCommand::Cancel),
        "menu" => rest
            .parse::<usize>()
            .map(AppCommand::SelectMenu)
            .map_err(|_| ParseError::BadArgument("menu index")),
        "menus" => Ok(AppCommand::ListMenus),
        _ => Err(ParseError::UnknownCommand),
    }
}
