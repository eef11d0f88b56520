use crate::config::Config;

use std::path::PathBuf;

use directories::{ProjectDirs, UserDirs};
use serde::{Deserialize, Serialize};

/// Where recordings are written.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Output directory. Falls back to the platform audio directory, then
    /// to `recordings/` under the application data directory.
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
}

impl StorageConfig {
    /// The directory recordings go to, or `None` when the platform exposes
    /// no usable location.
    pub fn resolve_output_dir(&self) -> Option<PathBuf> {
        self.output_dir
            .clone()
            .or_else(|| UserDirs::new().and_then(|dirs| dirs.audio_dir().map(PathBuf::from)))
            .or_else(|| {
                ProjectDirs::from(Config::QUALIFIER, Config::ORGANIZATION, Config::APPLICATION)
                    .map(|dirs| dirs.data_dir().join("recordings"))
            })
    }
}
