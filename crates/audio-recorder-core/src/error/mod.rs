use crate::{RecorderCommand, RecordingState};

use error_location::ErrorLocation;
use serde::Serialize;
use thiserror::Error;

/// Recorder errors with source location tracking.
#[derive(Error, Debug)]
pub enum RecorderError {
    /// Caller supplied time limits that cannot describe a session.
    #[error("Invalid parameters: {reason} {location}")]
    InvalidParameters {
        /// Which constraint was violated.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The platform refused an exclusive audio focus grant.
    #[error("Cannot get audio focus {location}")]
    AudioFocusDenied {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// No writable location exists for the recording file.
    #[error("Unable to access storage directory: {reason} {location}")]
    StorageUnavailable {
        /// Description of the storage problem.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The capture device could not be prepared or started.
    #[error("Failed to start recording: {reason} {location}")]
    CaptureStartFailed {
        /// Description of the device failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The capture device could not finalize the recording.
    #[error("Failed to stop recording: {reason} {location}")]
    CaptureStopFailed {
        /// Description of the device failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The capture device rejected a pause.
    #[error("Failed to pause recording: {reason} {location}")]
    PauseFailed {
        /// Description of the device failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The capture device rejected a resume.
    #[error("Failed to resume recording: {reason} {location}")]
    ResumeFailed {
        /// Description of the device failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// A start was issued while a session is already running.
    #[error("Recording is already active (state: {state:?}) {location}")]
    AlreadyActive {
        /// State at the time of the rejected command.
        state: RecordingState,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// A command was issued that the current state does not accept.
    #[error("Recording is not active: cannot {command} while {state:?} {location}")]
    NotActive {
        /// The rejected command.
        command: RecorderCommand,
        /// State at the time of the rejected command.
        state: RecordingState,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Low-level capture device failure, before the controller classifies it.
    #[error("Capture device error: {reason} {location}")]
    CaptureDevice {
        /// Description of the device error.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// A notification could not be posted or cancelled.
    #[error("Notification error: {reason} {location}")]
    NotificationFailed {
        /// Description of the presenter failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The controller task is no longer running.
    #[error("Recorder controller is not running {location}")]
    ControllerUnavailable {
        /// Source location where error occurred.
        location: ErrorLocation,
    },
}

/// Error tags reported to the application layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Parameter validation failed.
    InvalidParams,
    /// Audio focus was not granted.
    AudioFocusError,
    /// No storage location for the output file.
    FileError,
    /// Start failed.
    StartError,
    /// Stop failed.
    StopError,
    /// Pause failed.
    PauseError,
    /// Resume failed.
    ResumeError,
}

impl ErrorCode {
    /// Wire representation of the tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::InvalidParams => "INVALID_PARAMS",
            ErrorCode::AudioFocusError => "AUDIO_FOCUS_ERROR",
            ErrorCode::FileError => "FILE_ERROR",
            ErrorCode::StartError => "START_ERROR",
            ErrorCode::StopError => "STOP_ERROR",
            ErrorCode::PauseError => "PAUSE_ERROR",
            ErrorCode::ResumeError => "RESUME_ERROR",
        }
    }
}

impl RecorderError {
    /// Maps the error onto the tag the application layer sees.
    ///
    /// Errors that are not tied to a specific command (device, notification,
    /// unavailable controller) report as `START_ERROR`, since they can only
    /// reach a caller through the start path or a dead controller.
    pub fn code(&self) -> ErrorCode {
        match self {
            RecorderError::InvalidParameters { .. } => ErrorCode::InvalidParams,
            RecorderError::AudioFocusDenied { .. } => ErrorCode::AudioFocusError,
            RecorderError::StorageUnavailable { .. } => ErrorCode::FileError,
            RecorderError::CaptureStartFailed { .. } | RecorderError::AlreadyActive { .. } => {
                ErrorCode::StartError
            }
            RecorderError::CaptureStopFailed { .. } => ErrorCode::StopError,
            RecorderError::PauseFailed { .. } => ErrorCode::PauseError,
            RecorderError::ResumeFailed { .. } => ErrorCode::ResumeError,
            RecorderError::NotActive { command, .. } => match command {
                RecorderCommand::Start => ErrorCode::StartError,
                RecorderCommand::Stop => ErrorCode::StopError,
                RecorderCommand::Pause => ErrorCode::PauseError,
                RecorderCommand::Resume => ErrorCode::ResumeError,
            },
            RecorderError::CaptureDevice { .. }
            | RecorderError::NotificationFailed { .. }
            | RecorderError::ControllerUnavailable { .. } => ErrorCode::StartError,
        }
    }

    /// Human-readable description without the location suffix.
    pub fn message(&self) -> String {
        match self {
            RecorderError::InvalidParameters { reason, .. } => reason.clone(),
            RecorderError::AudioFocusDenied { .. } => "Cannot get audio focus".to_string(),
            RecorderError::StorageUnavailable { reason, .. } => {
                format!("Unable to access storage directory: {}", reason)
            }
            RecorderError::CaptureStartFailed { reason, .. } => {
                format!("Failed to start recording: {}", reason)
            }
            RecorderError::CaptureStopFailed { reason, .. } => {
                format!("Failed to stop recording: {}", reason)
            }
            RecorderError::PauseFailed { reason, .. } => {
                format!("Failed to pause recording: {}", reason)
            }
            RecorderError::ResumeFailed { reason, .. } => {
                format!("Failed to resume recording: {}", reason)
            }
            RecorderError::AlreadyActive { state, .. } => {
                format!("Recording is already active ({:?})", state)
            }
            RecorderError::NotActive { command, state, .. } => {
                format!("Recording is not active: cannot {} while {:?}", command, state)
            }
            RecorderError::CaptureDevice { reason, .. } => reason.clone(),
            RecorderError::NotificationFailed { reason, .. } => reason.clone(),
            RecorderError::ControllerUnavailable { .. } => {
                "Recorder controller is not running".to_string()
            }
        }
    }
}

/// Result type alias using [`RecorderError`].
pub type Result<T> = std::result::Result<T, RecorderError>;
