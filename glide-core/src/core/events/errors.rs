use thiserror::Error;

/// The result type of the event projector.
pub type Result<T> = std::result::Result<T, ProjectorError>;

/// The errors of the event projector.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ProjectorError {
    #[error("the event projector is already subscribed to an event channel")]
    AlreadySubscribed,
}
