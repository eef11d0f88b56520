use serde::Serialize;

/// Recording lifecycle state as seen by callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum RecordingState {
    /// No session exists.
    #[default]
    Idle,
    /// A session exists and the capture device is writing.
    Recording,
    /// A session exists and capture is suspended.
    Paused,
}
