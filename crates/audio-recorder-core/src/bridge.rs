//! Response shapes for the application-layer bridge.
//!
//! The bridge is thin marshalling: every call delegates to the
//! [`RecorderHandle`] and turns the outcome into the camelCase payloads
//! (or tagged rejections) the application layer expects.

use crate::{ErrorCode, RecorderError, RecorderHandle, StatusEvent};

use std::path::PathBuf;

use serde::Serialize;
use tokio::sync::broadcast;
use tracing::{instrument, warn};

/// Result of `startRecording`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartResponse {
    /// Always `true` on success.
    pub started: bool,
    /// File the session records to.
    pub file_path: PathBuf,
}

/// Result of `stopRecording`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StopResponse {
    /// The finalized recording.
    pub file_path: PathBuf,
}

/// Result of `pauseRecording`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PauseResponse {
    /// Always `true` on success.
    pub paused: bool,
}

/// Result of `resumeRecording`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResumeResponse {
    /// Always `true` on success.
    pub resumed: bool,
}

/// A failed call: tag plus message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BridgeRejection {
    /// Machine-readable tag.
    pub code: ErrorCode,
    /// Human-readable description.
    pub message: String,
}

impl From<RecorderError> for BridgeRejection {
    fn from(error: RecorderError) -> Self {
        Self {
            code: error.code(),
            message: error.message(),
        }
    }
}

/// Bridge result alias.
pub type BridgeResult<T> = std::result::Result<T, BridgeRejection>;

/// Application-facing command surface.
#[derive(Debug, Clone)]
pub struct RecorderBridge {
    handle: RecorderHandle,
}

impl RecorderBridge {
    /// Wrap a controller handle.
    pub fn new(handle: RecorderHandle) -> Self {
        Self { handle }
    }

    /// `startRecording(recordingTimeLimit, notifyTimeLimitReached?, notifyTimeLimit?)`
    #[instrument(skip(self))]
    pub async fn start_recording(
        &self,
        recording_time_limit: f64,
        notify_time_limit_reached: Option<bool>,
        notify_time_limit: Option<f64>,
    ) -> BridgeResult<StartResponse> {
        self.handle
            .start_recording(
                recording_time_limit,
                notify_time_limit_reached,
                notify_time_limit,
            )
            .await
            .map(|file_path| StartResponse {
                started: true,
                file_path,
            })
            .map_err(reject)
    }

    /// `stopRecording()`
    #[instrument(skip(self))]
    pub async fn stop_recording(&self) -> BridgeResult<StopResponse> {
        self.handle
            .stop_recording()
            .await
            .map(|file_path| StopResponse { file_path })
            .map_err(reject)
    }

    /// `pauseRecording()`
    #[instrument(skip(self))]
    pub async fn pause_recording(&self) -> BridgeResult<PauseResponse> {
        self.handle
            .pause_recording()
            .await
            .map(|()| PauseResponse { paused: true })
            .map_err(reject)
    }

    /// `resumeRecording()`
    #[instrument(skip(self))]
    pub async fn resume_recording(&self) -> BridgeResult<ResumeResponse> {
        self.handle
            .resume_recording()
            .await
            .map(|()| ResumeResponse { resumed: true })
            .map_err(reject)
    }

    /// `onRecordingStatusChanged`
    pub fn on_recording_status_changed(&self) -> broadcast::Receiver<StatusEvent> {
        self.handle.subscribe()
    }

    /// The underlying handle.
    pub fn handle(&self) -> &RecorderHandle {
        &self.handle
    }
}

fn reject(error: RecorderError) -> BridgeRejection {
    warn!(code = error.code().as_str(), error = %error, "Recorder command rejected");
    BridgeRejection::from(error)
}
