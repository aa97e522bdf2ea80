use std::io;
use thiserror::Error;

/// The result type of configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {0}, {1}")]
    Io(String, io::Error),
}

impl PartialEq for ConfigError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ConfigError::Io(a, e1), ConfigError::Io(b, e2)) => a == b && e1.kind() == e2.kind(),
        }
    }
}
