//! Line commands typed by the person taking the test.

use std::fmt;

use assess_core::model::{AnswerInput, SlotId};
use assess_core::navigation::NavKey;
use assess_core::session::SessionEvent;
use services::RunnerCommand;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Command(RunnerCommand),
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    Empty,
    Unknown(String),
    MissingArgument { command: &'static str },
    InvalidArgument { command: &'static str, raw: String },
}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputError::Empty => f.write_str("type a command, or `help`"),
            InputError::Unknown(word) => write!(f, "unknown command: {word}"),
            InputError::MissingArgument { command } => write!(f, "{command} requires a value"),
            InputError::InvalidArgument { command, raw } => {
                write!(f, "invalid {command} value: {raw}")
            }
        }
    }
}

impl std::error::Error for InputError {}

fn dispatch(event: SessionEvent) -> Input {
    Input::Command(RunnerCommand::Dispatch(event))
}

fn answer(input: AnswerInput) -> Input {
    dispatch(SessionEvent::Answer(input))
}

/// Parse one line.
///
/// ```text
/// select <n>            pick option n (0-based)
/// text <words...>       fill the gap
/// slot <p-w> <word>     fill a memory slot
/// next | ready | skip   move forward (also Enter, ArrowRight)
/// back                  move back (also ArrowLeft)
/// resubmit | help | quit
/// ```
pub fn parse_line(line: &str) -> Result<Input, InputError> {
    let line = line.trim();
    let (word, rest) = line
        .split_once(char::is_whitespace)
        .map_or((line, ""), |(w, r)| (w, r.trim()));

    if let Some(key) = NavKey::from_key_name(word) {
        return Ok(dispatch(SessionEvent::Key(key)));
    }

    match word.to_ascii_lowercase().as_str() {
        "" => Err(InputError::Empty),
        "next" | "ready" | "skip" | "finish" | "n" => Ok(dispatch(SessionEvent::Advance)),
        "back" | "b" => Ok(dispatch(SessionEvent::Back)),
        "select" | "s" => {
            let index = rest
                .parse::<usize>()
                .map_err(|_| InputError::InvalidArgument {
                    command: "select",
                    raw: rest.to_string(),
                })?;
            Ok(answer(AnswerInput::Select(index)))
        }
        "text" | "t" => Ok(answer(AnswerInput::Text(rest.to_string()))),
        "slot" => {
            let (slot, value) = rest
                .split_once(char::is_whitespace)
                .ok_or(InputError::MissingArgument { command: "slot" })?;
            let slot: SlotId = slot.parse().map_err(|_| InputError::InvalidArgument {
                command: "slot",
                raw: slot.to_string(),
            })?;
            Ok(answer(AnswerInput::Slot {
                slot,
                value: value.trim().to_string(),
            }))
        }
        "resubmit" => Ok(Input::Command(RunnerCommand::Resubmit)),
        "help" | "?" => Ok(Input::Help),
        "quit" | "exit" | "q" => Ok(Input::Quit),
        _ => Err(InputError::Unknown(word.to_string())),
    }
}
