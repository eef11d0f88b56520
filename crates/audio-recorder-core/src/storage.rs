use crate::{CoreResult, RecorderError};

use std::{fs, panic::Location, path::PathBuf};

use error_location::ErrorLocation;
use tracing::{debug, instrument};

/// Extension of every recording file.
pub const RECORDING_EXTENSION: &str = "wav";

/// Allocates a unique output file per session.
///
/// Names are `recording_<unix millis>.wav`. The stamp is forced strictly
/// above the previous allocation, so two sessions started within the same
/// millisecond (or across a clock step backwards) never collide.
#[derive(Debug, Clone)]
pub struct OutputStorage {
    dir: Option<PathBuf>,
    last_stamp: i64,
}

impl OutputStorage {
    /// Storage rooted at `dir`. `None` means no writable location is known
    /// and every allocation fails.
    pub fn new(dir: Option<PathBuf>) -> Self {
        Self { dir, last_stamp: 0 }
    }

    /// Reserve the next output path. Does not create the file.
    ///
    /// # Errors
    ///
    /// Returns `StorageUnavailable` if no directory is configured or the
    /// directory cannot be created or written.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn allocate(&mut self) -> CoreResult<PathBuf> {
        let dir = self.dir.as_ref().ok_or_else(|| RecorderError::StorageUnavailable {
            reason: "No output directory available".to_string(),
            location: ErrorLocation::from(Location::caller()),
        })?;

        fs::create_dir_all(dir).map_err(|e| RecorderError::StorageUnavailable {
            reason: format!("Failed to create {:?}: {}", dir, e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let metadata = fs::metadata(dir).map_err(|e| RecorderError::StorageUnavailable {
            reason: format!("Failed to inspect {:?}: {}", dir, e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        if !metadata.is_dir() {
            return Err(RecorderError::StorageUnavailable {
                reason: format!("{:?} is not a directory", dir),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        if metadata.permissions().readonly() {
            return Err(RecorderError::StorageUnavailable {
                reason: format!("{:?} is read-only", dir),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let stamp = chrono::Utc::now().timestamp_millis().max(self.last_stamp + 1);
        self.last_stamp = stamp;

        let path = dir.join(format!("recording_{}.{}", stamp, RECORDING_EXTENSION));

        debug!(file_path = ?path, "Output path allocated");

        Ok(path)
    }
}
