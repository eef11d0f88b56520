use crate::{CoreResult, RecordingState, TimeLimits};

use std::path::PathBuf;

use tokio::sync::oneshot;

/// Requests a [`crate::RecorderHandle`] sends to the controller task.
#[derive(Debug)]
pub(crate) enum ControllerMessage {
    Start {
        limits: TimeLimits,
        reply: oneshot::Sender<CoreResult<PathBuf>>,
    },
    Stop {
        reply: oneshot::Sender<CoreResult<PathBuf>>,
    },
    Pause {
        reply: oneshot::Sender<CoreResult<()>>,
    },
    Resume {
        reply: oneshot::Sender<CoreResult<()>>,
    },
    State {
        reply: oneshot::Sender<RecordingState>,
    },
    Shutdown {
        reply: oneshot::Sender<()>,
    },
}
