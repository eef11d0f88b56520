//! Capture device seam.
//!
//! The controller drives capture only through [`CaptureDevice`]. The device
//! owns the output file for the whole session; the controller only ever
//! hands it a path.

mod cpal_device;

pub use cpal_device::CpalCaptureDevice;

use crate::CoreResult;

use std::path::Path;

/// An opaque recording engine.
///
/// Calls are synchronous and expected to return promptly. Implementations
/// report failures as [`crate::RecorderError::CaptureDevice`]; the controller
/// reclassifies them per command.
pub trait CaptureDevice: Send {
    /// Open the output file and get ready to capture into it.
    fn prepare(&mut self, output_path: &Path) -> CoreResult<()>;

    /// Begin writing audio.
    fn start(&mut self) -> CoreResult<()>;

    /// Suspend writing without closing the file.
    fn pause(&mut self) -> CoreResult<()>;

    /// Continue writing after a pause.
    fn resume(&mut self) -> CoreResult<()>;

    /// Stop writing and finalize the file.
    fn stop(&mut self) -> CoreResult<()>;

    /// Drop all resources held for the session. Safe to call in any state.
    fn release(&mut self) -> CoreResult<()>;
}
