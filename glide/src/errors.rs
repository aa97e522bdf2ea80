use glide_core::core::commands::CommandError;
use glide_core::core::config::ConfigError;
use glide_core::core::events::ProjectorError;
use glide_core::core::mpv::MpvError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, GlideError>;

#[derive(Debug, Error)]
pub enum GlideError {
    #[error("failed to initialize the logger, {0}")]
    Logging(#[from] glide_logging::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Mpv(#[from] MpvError),
    #[error(transparent)]
    Projector(#[from] ProjectorError),
    #[error(transparent)]
    Command(#[from] CommandError),
    #[error("failed to serialize the player state, {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("no library directory could be determined")]
    LibraryUnavailable,
    #[error("invalid console input \"{0}\", {1}")]
    InvalidInput(String, String),
}
