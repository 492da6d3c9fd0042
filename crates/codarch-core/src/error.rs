use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodarchError {
    #[error("validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("Snippet not found")]
    NotFound,

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("storage task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("database connection lock poisoned")]
    Poisoned,

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to bind to {addr}: {reason}")]
    Bind { addr: String, reason: String },
}

pub type Result<T> = std::result::Result<T, CodarchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_message_joins_violations() {
        let err = CodarchError::Validation(vec![
            "title: too short".to_string(),
            "code: too short".to_string(),
        ]);
        assert_eq!(
            err.to_string(),
            "validation failed: title: too short; code: too short"
        );
    }

    #[test]
    fn bind_message_names_the_address() {
        let err = CodarchError::Bind {
            addr: "0.0.0.0:3000".to_string(),
            reason: "address in use".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Failed to bind to 0.0.0.0:3000: address in use"
        );
    }
}
