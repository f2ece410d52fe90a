//! Error handling module for powerpack
//!
//! Provides centralized error handling with proper error types using thiserror.
//! Verification mismatches are not errors; they are reported through
//! `VerificationReport`.

use thiserror::Error;

/// Main error type for powerpack
#[derive(Error, Debug)]
pub enum PowerPackError {
    /// IO errors (temp script, console)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// No usable shell among the probed candidates
    #[error("{shell} not found (tried: {})", .tried.join(", "))]
    ShellNotFound { shell: String, tried: Vec<String> },

    /// The resolved shell could not be started or waited on
    #[error("Failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// Deploy script rendering errors
    #[error("Script error: {0}")]
    Script(String),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// General errors (catch-all for edge cases)
    #[error("{0}")]
    General(String),
}

/// Result type alias for powerpack operations
pub type Result<T> = std::result::Result<T, PowerPackError>;

// Convenient error constructors
impl PowerPackError {
    /// Create a shell-not-found error
    pub fn shell_not_found(shell: impl Into<String>, tried: Vec<String>) -> Self {
        Self::ShellNotFound {
            shell: shell.into(),
            tried,
        }
    }

    /// Create a spawn error for `program`
    pub fn spawn(program: impl Into<String>, source: std::io::Error) -> Self {
        Self::Spawn {
            program: program.into(),
            source,
        }
    }

    /// Create a script rendering error
    pub fn script(msg: impl Into<String>) -> Self {
        Self::Script(msg.into())
    }

    /// Create a general error
    pub fn general(msg: impl Into<String>) -> Self {
        Self::General(msg.into())
    }

    /// True for the configuration error raised when no shell is usable
    pub fn is_shell_not_found(&self) -> bool {
        matches!(self, Self::ShellNotFound { .. })
    }
}
