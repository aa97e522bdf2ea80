use std::path::PathBuf;
use std::{io, result};
use thiserror::Error;

/// The result type of logging operations.
pub type Result<T> = result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("the glide logger has already been initialized")]
    AlreadyInitialized,
    #[error("log4rs config file {0:?} does not exist")]
    ConfigNotFound(PathBuf),
    #[error("invalid logging configuration, {0}")]
    InvalidConfig(String),
    #[error("failed to prepare log file {0:?}, {1}")]
    LogFile(PathBuf, io::Error),
}

impl PartialEq for Error {
    fn eq(&self, other: &Error) -> bool {
        match (self, other) {
            (Error::AlreadyInitialized, Error::AlreadyInitialized) => true,
            (Error::ConfigNotFound(a), Error::ConfigNotFound(b)) => a == b,
            (Error::InvalidConfig(_), Error::InvalidConfig(_)) => true,
            (Error::LogFile(a, e1), Error::LogFile(b, e2)) => a == b && e1.kind() == e2.kind(),
            _ => false,
        }
    }
}
