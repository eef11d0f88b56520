use std::{path::PathBuf, time::Duration};

use serde::Serialize;

/// Status tags broadcast to the application layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RecordingStatus {
    /// A session began.
    Started,
    /// A session was finalized by a stop command.
    Stopped,
    /// Capture was paused by a pause command.
    Paused,
    /// Capture resumed, by command or after an interruption ended.
    Resumed,
    /// The recording time limit finalized the session.
    StoppedDueToTimeLimit,
    /// An audio interruption paused capture.
    PausedDueToExternalAction,
    /// The session was torn down after a capture device failure.
    Interrupted,
}

/// One state transition, as seen by the application layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusEvent {
    /// What happened.
    pub status: RecordingStatus,
    /// Seconds of recording time left in the session.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_remaining: Option<f64>,
    /// Finalized file, for transitions that end a session without a command.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_path: Option<PathBuf>,
}

impl StatusEvent {
    pub(crate) fn new(status: RecordingStatus, remaining: Duration) -> Self {
        Self {
            status,
            time_remaining: Some(remaining.as_secs_f64()),
            file_path: None,
        }
    }

    pub(crate) fn with_file(mut self, path: PathBuf) -> Self {
        self.file_path = Some(path);
        self
    }
}
