use crate::config::{
    default_notify_time_limit_reached, default_notify_time_limit_secs, default_time_limit_secs,
};

use serde::{Deserialize, Serialize};

/// Session parameters used by a bare `start` on the console.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordingConfig {
    /// Recording time limit in seconds.
    #[serde(default = "default_time_limit_secs")]
    pub time_limit_secs: f64,
    /// Whether to warn before the limit is reached.
    #[serde(default = "default_notify_time_limit_reached")]
    pub notify_time_limit_reached: bool,
    /// Remaining seconds at which the warning is posted.
    #[serde(default = "default_notify_time_limit_secs")]
    pub notify_time_limit_secs: f64,
}

impl Default for RecordingConfig {
    fn default() -> Self {
        Self {
            time_limit_secs: default_time_limit_secs(),
            notify_time_limit_reached: default_notify_time_limit_reached(),
            notify_time_limit_secs: default_notify_time_limit_secs(),
        }
    }
}
