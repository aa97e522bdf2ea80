use crate::errors::{GlideError, Result};
use derive_more::Display;
use std::str::FromStr;

/// A command entered on the interactive console.
#[derive(Debug, Display, Clone, PartialEq)]
pub enum ConsoleCommand {
    #[display("play {}", _0)]
    Play(String),
    #[display("pause")]
    Pause,
    #[display("resume")]
    Resume,
    #[display("seek {}", _0)]
    Seek(f64),
    #[display("volume {}", _0)]
    Volume(f64),
    #[display("fullscreen")]
    Fullscreen,
    #[display("stop")]
    Stop,
    #[display("state")]
    State,
    #[display("help")]
    Help,
    #[display("quit")]
    Quit,
}

impl ConsoleCommand {
    /// The usage description of the console commands.
    pub const USAGE: &'static str = "commands: play <path>, pause, resume, seek <seconds>, \
        volume <value>, fullscreen, stop, state, help, quit";
}

impl FromStr for ConsoleCommand {
    type Err = GlideError;

    fn from_str(line: &str) -> Result<Self> {
        let line = line.trim();
        let (keyword, argument) = match line.split_once(char::is_whitespace) {
            Some((keyword, argument)) => (keyword, argument.trim()),
            None => (line, ""),
        };

        match keyword.to_lowercase().as_str() {
            "play" if !argument.is_empty() => Ok(ConsoleCommand::Play(unquote(argument))),
            "play" => Err(invalid(line, "expected a file path")),
            "pause" => Ok(ConsoleCommand::Pause),
            "resume" => Ok(ConsoleCommand::Resume),
            "seek" => parse_number(line, argument).map(ConsoleCommand::Seek),
            "volume" => parse_number(line, argument).map(ConsoleCommand::Volume),
            "fullscreen" => Ok(ConsoleCommand::Fullscreen),
            "stop" => Ok(ConsoleCommand::Stop),
            "state" => Ok(ConsoleCommand::State),
            "help" => Ok(ConsoleCommand::Help),
            "quit" | "exit" => Ok(ConsoleCommand::Quit),
            _ => Err(invalid(line, "unknown command")),
        }
    }
}

fn parse_number(line: &str, argument: &str) -> Result<f64> {
    argument
        .parse::<f64>()
        .map_err(|e| invalid(line, e.to_string().as_str()))
}

fn unquote(value: &str) -> String {
    value
        .strip_prefix('"')
        .and_then(|e| e.strip_suffix('"'))
        .unwrap_or(value)
        .to_string()
}

fn invalid(line: &str, reason: &str) -> GlideError {
    GlideError::InvalidInput(line.to_string(), reason.to_string())
}
