use crate::{
    CoreResult, RecorderError, RecordingState, StatusEvent, TimeLimits,
    controller::ControllerMessage,
};

use std::{panic::Location, path::PathBuf};

use error_location::ErrorLocation;
use tokio::sync::{broadcast, mpsc, oneshot};

/// Cloneable command surface of a running [`crate::RecorderController`].
///
/// Every method is a request/reply round trip through the controller's
/// mailbox, so commands from different clones are serialized with each other
/// and with focus changes.
#[derive(Debug, Clone)]
pub struct RecorderHandle {
    pub(crate) commands: mpsc::Sender<ControllerMessage>,
    pub(crate) events: broadcast::Sender<StatusEvent>,
}

impl RecorderHandle {
    /// Start a new session and return the path it records to.
    ///
    /// Parameters are validated here, before the controller is involved, so
    /// an invalid request never acquires focus or touches storage.
    ///
    /// # Errors
    ///
    /// `InvalidParameters`, `AlreadyActive`, `AudioFocusDenied`,
    /// `StorageUnavailable` or `CaptureStartFailed`.
    pub async fn start_recording(
        &self,
        recording_time_limit: f64,
        notify_time_limit_reached: Option<bool>,
        notify_time_limit: Option<f64>,
    ) -> CoreResult<PathBuf> {
        let limits = TimeLimits::new(
            recording_time_limit,
            notify_time_limit_reached,
            notify_time_limit,
        )?;

        self.request(|reply| ControllerMessage::Start { limits, reply })
            .await?
    }

    /// Finalize the session and return the recorded file.
    pub async fn stop_recording(&self) -> CoreResult<PathBuf> {
        self.request(|reply| ControllerMessage::Stop { reply })
            .await?
    }

    /// Suspend capture.
    pub async fn pause_recording(&self) -> CoreResult<()> {
        self.request(|reply| ControllerMessage::Pause { reply })
            .await?
    }

    /// Continue a suspended capture.
    pub async fn resume_recording(&self) -> CoreResult<()> {
        self.request(|reply| ControllerMessage::Resume { reply })
            .await?
    }

    /// Current recording state.
    pub async fn state(&self) -> CoreResult<RecordingState> {
        self.request(|reply| ControllerMessage::State { reply })
            .await
    }

    /// Subscribe to status events. Only events sent after this call are
    /// received.
    pub fn subscribe(&self) -> broadcast::Receiver<StatusEvent> {
        self.events.subscribe()
    }

    /// Stop the controller task, finalizing any active session first.
    pub async fn shutdown(&self) -> CoreResult<()> {
        self.request(|reply| ControllerMessage::Shutdown { reply })
            .await
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> ControllerMessage,
    ) -> CoreResult<T> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.commands
            .send(build(reply_tx))
            .await
            .map_err(|_| unavailable())?;

        reply_rx.await.map_err(|_| unavailable())
    }
}

#[track_caller]
fn unavailable() -> RecorderError {
    RecorderError::ControllerUnavailable {
        location: ErrorLocation::from(Location::caller()),
    }
}
