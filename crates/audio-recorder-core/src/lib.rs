//! Audio Recorder Core Library
//!
//! Recording lifecycle controller for microphone capture: start, stop, pause
//! and resume a session that records to a file, arbitrate audio focus
//! interruptions, coordinate foreground notifications, and broadcast status
//! events.
//!
//! # Example
//!
//! ```no_run
//! use audio_recorder_core::{
//!     CoreResult, CpalCaptureDevice, LocalFocusArbiter, Notification, NotificationId,
//!     NotificationPresenter, OutputStorage, RecorderController,
//! };
//!
//! struct Silent;
//!
//! impl NotificationPresenter for Silent {
//!     fn enter_foreground(&mut self) -> CoreResult<()> { Ok(()) }
//!     fn exit_foreground(&mut self) -> CoreResult<()> { Ok(()) }
//!     fn show(&mut self, _: &Notification) -> CoreResult<()> { Ok(()) }
//!     fn cancel(&mut self, _: NotificationId) -> CoreResult<()> { Ok(()) }
//! }
//!
//! #[tokio::main]
//! async fn main() -> CoreResult<()> {
//!     let (arbiter, _interruptions) = LocalFocusArbiter::new();
//!     let recorder = RecorderController::spawn(
//!         CpalCaptureDevice::new(None),
//!         arbiter,
//!         Silent,
//!         OutputStorage::new(Some("recordings".into())),
//!     );
//!
//!     let path = recorder.start_recording(60.0, Some(true), Some(10.0)).await?;
//!     tokio::time::sleep(std::time::Duration::from_secs(3)).await;
//!     recorder.stop_recording().await?;
//!
//!     println!("Recorded to {}", path.display());
//!     Ok(())
//! }
//! ```

mod bridge;
mod capture;
mod controller;
mod error;
mod event;
mod focus;
mod notification;
mod session;
mod storage;

pub use {
    bridge::{
        BridgeRejection, BridgeResult, PauseResponse, RecorderBridge, ResumeResponse,
        StartResponse, StopResponse,
    },
    capture::{CaptureDevice, CpalCaptureDevice},
    controller::{RecorderController, RecorderHandle},
    error::{ErrorCode, RecorderError, Result as CoreResult},
    event::{RecordingStatus, StatusEvent},
    focus::{
        AudioFocusArbiter, FocusChange, FocusContent, FocusGrant, FocusListener, FocusRequest,
        InterruptionSource, LocalFocusArbiter,
    },
    notification::{Notification, NotificationId, NotificationPresenter},
    session::{RecorderCommand, RecordingState, TimeLimits},
    storage::{OutputStorage, RECORDING_EXTENSION},
};

#[cfg(test)]
mod tests;
