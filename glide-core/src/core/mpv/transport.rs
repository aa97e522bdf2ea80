use crate::core::commands;
use crate::core::commands::{
    CommandArgs, CommandError, CommandTransport, ARG_PATH, ARG_TIME_IN_SECONDS, ARG_VOLUME,
    COMMAND_PAUSE, COMMAND_PLAY, COMMAND_RESUME, COMMAND_SEEK, COMMAND_SET_VOLUME, COMMAND_STOP,
    COMMAND_TOGGLE_FULLSCREEN,
};
use crate::core::mpv::{MpvConnection, MpvError, Result};
use async_trait::async_trait;
use log::{debug, warn};
use serde_json::{json, Value};

/// The [CommandTransport] which executes the player commands on mpv.
///
/// Volume values are passed through as given and are not clamped to `0..=100`.
/// mpv accepts values up to its own `volume-max`, and rejects anything outside of its range,
/// which is returned as a [CommandError::Transport].
#[derive(Debug, Clone)]
pub struct MpvTransport {
    connection: MpvConnection,
}

impl MpvTransport {
    pub fn new(connection: MpvConnection) -> Self {
        Self { connection }
    }

    async fn execute(&self, command: &str, args: &CommandArgs) -> Result<()> {
        match command {
            COMMAND_PLAY => {
                let path = Self::string_arg(command, args, ARG_PATH)?.replace('\\', "/");
                self.set_pause(true).await?;
                self.connection
                    .command(vec![json!("loadfile"), json!(path)])
                    .await?;
                self.set_pause(false).await
            }
            COMMAND_PAUSE => self.set_pause(true).await,
            COMMAND_RESUME => self.set_pause(false).await,
            COMMAND_SEEK => {
                let time = Self::number_arg(command, args, ARG_TIME_IN_SECONDS)?;
                self.connection
                    .command(vec![json!("seek"), json!(time), json!("absolute")])
                    .await
                    .map(|_| ())
            }
            COMMAND_SET_VOLUME => {
                let volume = Self::number_arg(command, args, ARG_VOLUME)?;
                self.connection
                    .command(vec![json!("set_property"), json!("volume"), json!(volume)])
                    .await
                    .map(|_| ())
            }
            COMMAND_TOGGLE_FULLSCREEN => self
                .connection
                .command(vec![json!("cycle"), json!("fullscreen")])
                .await
                .map(|_| ()),
            COMMAND_STOP => self
                .connection
                .command(vec![json!("stop")])
                .await
                .map(|_| ()),
            _ => Err(MpvError::UnsupportedCommand(command.to_string())),
        }
    }

    async fn set_pause(&self, pause: bool) -> Result<()> {
        self.connection
            .command(vec![json!("set_property"), json!("pause"), json!(pause)])
            .await
            .map(|_| ())
    }

    fn string_arg<'a>(command: &str, args: &'a CommandArgs, key: &str) -> Result<&'a str> {
        args.get(key)
            .and_then(Value::as_str)
            .ok_or_else(|| MpvError::MissingArgument(command.to_string(), key.to_string()))
    }

    fn number_arg(command: &str, args: &CommandArgs, key: &str) -> Result<f64> {
        args.get(key)
            .and_then(Value::as_f64)
            .ok_or_else(|| MpvError::MissingArgument(command.to_string(), key.to_string()))
    }
}

#[async_trait]
impl CommandTransport for MpvTransport {
    async fn invoke(&self, command: &str, args: CommandArgs) -> commands::Result<()> {
        debug!("Executing command {} on mpv with {:?}", command, args);
        self.execute(command, &args).await.map_err(|e| {
            warn!("Mpv failed to execute command {}, {}", command, e);
            CommandError::Transport(command.to_string(), e.to_string())
        })
    }
}
