use crate::core::commands::{CommandError, Result};
use derive_more::Display;
use serde_json::{Map, Value};

pub const COMMAND_PLAY: &str = "play";
pub const COMMAND_PAUSE: &str = "pause";
pub const COMMAND_RESUME: &str = "resume";
pub const COMMAND_SEEK: &str = "seek";
pub const COMMAND_SET_VOLUME: &str = "set_volume";
pub const COMMAND_TOGGLE_FULLSCREEN: &str = "toggle_fullscreen";
pub const COMMAND_STOP: &str = "stop";

pub const ARG_PATH: &str = "path";
pub const ARG_TIME_IN_SECONDS: &str = "time_in_seconds";
pub const ARG_VOLUME: &str = "volume";

/// The named arguments of a command.
pub type CommandArgs = Map<String, Value>;

/// An outbound playback intent for the media engine.
#[derive(Debug, Display, Clone, PartialEq)]
pub enum PlayerCommand {
    #[display("play {}", path)]
    Play { path: String },
    #[display("pause")]
    Pause,
    #[display("resume")]
    Resume,
    #[display("seek {}", time_in_seconds)]
    Seek { time_in_seconds: f64 },
    #[display("set_volume {}", volume)]
    SetVolume { volume: f64 },
    #[display("toggle_fullscreen")]
    ToggleFullscreen,
    #[display("stop")]
    Stop,
}

impl PlayerCommand {
    /// The command name as understood by the command transport.
    pub fn name(&self) -> &'static str {
        match self {
            PlayerCommand::Play { .. } => COMMAND_PLAY,
            PlayerCommand::Pause => COMMAND_PAUSE,
            PlayerCommand::Resume => COMMAND_RESUME,
            PlayerCommand::Seek { .. } => COMMAND_SEEK,
            PlayerCommand::SetVolume { .. } => COMMAND_SET_VOLUME,
            PlayerCommand::ToggleFullscreen => COMMAND_TOGGLE_FULLSCREEN,
            PlayerCommand::Stop => COMMAND_STOP,
        }
    }

    /// The named arguments of the command.
    pub fn args(&self) -> CommandArgs {
        let mut args = CommandArgs::new();

        match self {
            PlayerCommand::Play { path } => {
                args.insert(ARG_PATH.to_string(), Value::from(path.as_str()));
            }
            PlayerCommand::Seek { time_in_seconds } => {
                args.insert(ARG_TIME_IN_SECONDS.to_string(), Value::from(*time_in_seconds));
            }
            PlayerCommand::SetVolume { volume } => {
                args.insert(ARG_VOLUME.to_string(), Value::from(*volume));
            }
            _ => {}
        }

        args
    }

    /// Verify the input constraints of the command.
    /// The volume range belongs to the engine and isn't verified.
    pub fn validate(&self) -> Result<()> {
        match self {
            PlayerCommand::Play { path } if path.trim().is_empty() => Err(
                CommandError::InvalidArgument(ARG_PATH.to_string(), "path is empty".to_string()),
            ),
            PlayerCommand::Seek { time_in_seconds }
                if !time_in_seconds.is_finite() || *time_in_seconds < 0.0 =>
            {
                Err(CommandError::InvalidArgument(
                    ARG_TIME_IN_SECONDS.to_string(),
                    format!("{} is not a valid position", time_in_seconds),
                ))
            }
            _ => Ok(()),
        }
    }
}
