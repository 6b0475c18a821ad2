use thiserror::Error;

#[derive(Debug, Error)]
pub enum LockError {
    #[error("not initialized: run 'mfalock init'")]
    NotInitialized,

    #[error("invalid pattern template: {0}")]
    InvalidTemplate(String),

    #[error("invalid step action: {0}")]
    InvalidAction(String),

    #[error("invalid auth status: {0}")]
    InvalidStatus(String),

    #[error("invalid event line: {0}")]
    Event(#[from] crate::event::EventParseError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, LockError>;
