use std::io;
use thiserror::Error;

/// The result type of mpv operations.
pub type Result<T> = std::result::Result<T, MpvError>;

/// The errors of the mpv IPC collaborator.
#[derive(Debug, Error)]
pub enum MpvError {
    #[error("failed to connect to mpv ipc server {0}, {1}")]
    Connection(String, String),
    #[error("mpv connection has been closed")]
    Closed,
    #[error("mpv didn't reply to request {0} within {1}ms")]
    Timeout(u64, u128),
    #[error("mpv rejected command {0}, {1}")]
    Command(String, String),
    #[error("command {0} is not supported by mpv")]
    UnsupportedCommand(String),
    #[error("command {0} is missing argument {1}")]
    MissingArgument(String, String),
    #[error("failed to parse mpv message, {0}")]
    Parsing(String),
    #[error("failed to spawn mpv process, {0}")]
    Process(String),
    #[error("an io error occurred, {0}")]
    Io(io::Error),
}

impl From<io::Error> for MpvError {
    fn from(error: io::Error) -> Self {
        MpvError::Io(error)
    }
}

impl From<serde_json::Error> for MpvError {
    fn from(error: serde_json::Error) -> Self {
        MpvError::Parsing(error.to_string())
    }
}

impl PartialEq for MpvError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (MpvError::Connection(a, _), MpvError::Connection(b, _)) => a == b,
            (MpvError::Closed, MpvError::Closed) => true,
            (MpvError::Timeout(a, _), MpvError::Timeout(b, _)) => a == b,
            (MpvError::Command(a, b), MpvError::Command(c, d)) => a == c && b == d,
            (MpvError::UnsupportedCommand(a), MpvError::UnsupportedCommand(b)) => a == b,
            (MpvError::MissingArgument(a, b), MpvError::MissingArgument(c, d)) => {
                a == c && b == d
            }
            (MpvError::Parsing(_), MpvError::Parsing(_)) => true,
            (MpvError::Process(_), MpvError::Process(_)) => true,
            (MpvError::Io(a), MpvError::Io(b)) => a.kind() == b.kind(),
            _ => false,
        }
    }
}
