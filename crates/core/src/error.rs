//! Errors raised by the credential store

use std::io;
use std::path::Path;

/// Standard result type for core operations
pub type CoreResult<T> = std::result::Result<T, CoreError>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    /// Reading, encoding or writing stored credentials failed
    #[error("Credential storage error: {message}")]
    Storage { message: String },

    /// The credential file exists but does not hold a key/value object
    #[error("Corrupt credential file {path}: {message}")]
    CorruptStore { path: String, message: String },
}

impl CoreError {
    /// IO failure while performing `action` on `path`
    pub(crate) fn io(action: &str, path: &Path, err: &io::Error) -> Self {
        Self::Storage {
            message: format!("Failed to {action} {}: {err}", path.display()),
        }
    }

    pub(crate) fn corrupt(path: &Path, err: &serde_json::Error) -> Self {
        Self::CorruptStore {
            path: path.display().to_string(),
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_message_names_action_and_path() {
        let io = io::Error::new(io::ErrorKind::PermissionDenied, "denied");
        let err = CoreError::io("write", Path::new("/tmp/credentials.json"), &io);
        assert_eq!(
            err.to_string(),
            "Credential storage error: Failed to write /tmp/credentials.json: denied"
        );
    }
}
