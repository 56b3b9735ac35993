//! Error handling for SessionFx
//!
//! Every failure is scoped to a single session where possible, so most
//! variants carry the session id they belong to.

use std::path::PathBuf;
use thiserror::Error;

use crate::engine::EffectKind;
use crate::session::SessionId;

/// Result type alias for SessionFx operations
pub type Result<T> = std::result::Result<T, SessionFxError>;

/// Main error type for SessionFx operations
#[derive(Error, Debug)]
pub enum SessionFxError {
    // Engine Errors
    #[error("{effect} engine unavailable for session {session_id}: {reason}")]
    EngineUnavailable {
        session_id: SessionId,
        effect: EffectKind,
        reason: String,
    },

    #[error("{effect} engine rejected parameters for session {session_id}: {reason}")]
    ApplyFailure {
        session_id: SessionId,
        effect: EffectKind,
        reason: String,
    },

    // Configuration Errors
    #[error("No configuration stored for profile '{profile}'")]
    ConfigurationMissing { profile: String },

    #[error("Invalid value for parameter '{key}': {value}")]
    InvalidParameter { key: String, value: String },

    // File Errors
    #[error("Failed to read file: {path}: {source}")]
    FileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file: {path}: {source}")]
    FileWriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Event Queue Errors
    #[error("Event queue is closed")]
    QueueClosed,

    // I/O Errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization Errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SessionFxError {
    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            SessionFxError::EngineUnavailable { .. } => "ENGINE_UNAVAILABLE",
            SessionFxError::ApplyFailure { .. } => "APPLY_FAILURE",
            SessionFxError::ConfigurationMissing { .. } => "CONFIGURATION_MISSING",
            SessionFxError::InvalidParameter { .. } => "INVALID_PARAMETER",
            SessionFxError::FileReadError { .. } => "FILE_READ_ERROR",
            SessionFxError::FileWriteError { .. } => "FILE_WRITE_ERROR",
            SessionFxError::QueueClosed => "QUEUE_CLOSED",
            SessionFxError::Io(_) => "IO_ERROR",
            SessionFxError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// Check if the controller keeps serving other sessions after this error
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            SessionFxError::EngineUnavailable { .. }
                | SessionFxError::ApplyFailure { .. }
                | SessionFxError::ConfigurationMissing { .. }
                | SessionFxError::InvalidParameter { .. }
        )
    }

    /// Session the error is scoped to, if any
    pub fn session_id(&self) -> Option<SessionId> {
        match self {
            SessionFxError::EngineUnavailable { session_id, .. }
            | SessionFxError::ApplyFailure { session_id, .. } => Some(*session_id),
            _ => None,
        }
    }

    /// Returns a user-facing recovery suggestion.
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            SessionFxError::EngineUnavailable { .. } => {
                Some("Reopen the audio session once the effect engine is available.")
            }
            SessionFxError::ApplyFailure { .. } => {
                Some("The session was detached; it will be rebuilt when it is opened again.")
            }
            SessionFxError::ConfigurationMissing { .. } => {
                Some("Save settings for this output once to create the profile.")
            }
            SessionFxError::InvalidParameter { .. } => {
                Some("Reset the setting to its default value.")
            }
            _ => None,
        }
    }
}
