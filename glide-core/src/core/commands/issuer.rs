use crate::core::commands::{CommandTransport, PlayerCommand, Result};
use log::debug;
use std::sync::Arc;

/// Translates user intents into commands for the media engine.
///
/// The issuer is stateless, it doesn't interpret, retry or correlate the command results.
/// Any resulting playback change reaches the player state through the engine events only,
/// e.g. [CommandIssuer::play] doesn't mark the player as playing.
///
/// # Example
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use glide_core::core::commands::{CommandIssuer, CommandTransport};
///
/// async fn example(transport: Arc<dyn CommandTransport>) {
///     let issuer = CommandIssuer::new(transport);
///
///     if let Err(e) = issuer.play("/home/user/Videos/movie.mkv").await {
///         eprintln!("failed to start playback, {}", e);
///     }
/// }
/// ```
#[derive(Debug, Clone)]
pub struct CommandIssuer {
    transport: Arc<dyn CommandTransport>,
}

impl CommandIssuer {
    pub fn new(transport: Arc<dyn CommandTransport>) -> Self {
        Self { transport }
    }

    /// Load the media at the given locator and start its playback.
    pub async fn play<S: Into<String>>(&self, path: S) -> Result<()> {
        self.issue(PlayerCommand::Play { path: path.into() }).await
    }

    pub async fn pause(&self) -> Result<()> {
        self.issue(PlayerCommand::Pause).await
    }

    pub async fn resume(&self) -> Result<()> {
        self.issue(PlayerCommand::Resume).await
    }

    /// Seek to the absolute position in seconds.
    pub async fn seek(&self, time_in_seconds: f64) -> Result<()> {
        self.issue(PlayerCommand::Seek { time_in_seconds }).await
    }

    /// Set the engine volume, the value is passed as-is.
    pub async fn set_volume(&self, volume: f64) -> Result<()> {
        self.issue(PlayerCommand::SetVolume { volume }).await
    }

    pub async fn toggle_fullscreen(&self) -> Result<()> {
        self.issue(PlayerCommand::ToggleFullscreen).await
    }

    pub async fn stop(&self) -> Result<()> {
        self.issue(PlayerCommand::Stop).await
    }

    /// Issue the given command to the transport.
    pub async fn issue(&self, command: PlayerCommand) -> Result<()> {
        command.validate()?;
        debug!("Issuing player command {}", command);
        self.transport.invoke(command.name(), command.args()).await
    }
}
