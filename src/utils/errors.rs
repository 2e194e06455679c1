use thiserror::Error;

use crate::models::SourceId;

#[derive(Error, Debug)]
pub enum PlayerError {
    #[error("Source not found: {0}")]
    SourceNotFound(SourceId),

    #[error("Duplicate source id: {0}")]
    DuplicateSource(SourceId),

    #[error("Player controller disconnected")]
    Disconnected,

    #[error("Configuration error: {0}")]
    Configuration(String),
}

pub type PlayerResult<T> = std::result::Result<T, PlayerError>;
