use thiserror::Error;

#[derive(Debug, Error)]
pub enum PhonebookError {
    #[error("not initialized: run 'phonebook init'")]
    NotInitialized,

    #[error("contact not found: {0}")]
    ContactNotFound(i64),

    #[error("invalid storage key '{0}': must be alphanumeric with '-' or '_'")]
    InvalidKey(String),

    #[error("invalid filter '{0}'")]
    InvalidFilter(String),

    #[error("invalid dialog mode: {0}")]
    InvalidMode(String),

    #[error("validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("webhook error: {0}")]
    Webhook(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PhonebookError>;
