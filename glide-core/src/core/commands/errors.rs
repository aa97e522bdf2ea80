use thiserror::Error;

/// The result type of player command operations.
pub type Result<T> = std::result::Result<T, CommandError>;

/// The errors of player command operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CommandError {
    /// The command argument doesn't meet the input constraints of the command.
    #[error("invalid argument {0}, {1}")]
    InvalidArgument(String, String),
    /// The command transport failed to deliver or execute the command.
    #[error("failed to execute command {0}, {1}")]
    Transport(String, String),
}
