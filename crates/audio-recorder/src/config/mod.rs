mod audio_config;
#[allow(clippy::module_inception)]
mod config;
mod notification_config;
mod recording_config;
mod storage_config;

pub(crate) use {
    audio_config::AudioConfig, config::Config, notification_config::NotificationConfig,
    recording_config::RecordingConfig, storage_config::StorageConfig,
};

pub(crate) const DEFAULT_TIME_LIMIT_SECS: f64 = 300.0;
pub(crate) const DEFAULT_NOTIFY_TIME_LIMIT_REACHED: bool = true;
pub(crate) const DEFAULT_NOTIFY_TIME_LIMIT_SECS: f64 = 30.0;
pub(crate) const DEFAULT_NOTIFICATIONS_ENABLED: bool = true;

pub(crate) fn default_time_limit_secs() -> f64 {
    DEFAULT_TIME_LIMIT_SECS
}

pub(crate) fn default_notify_time_limit_reached() -> bool {
    DEFAULT_NOTIFY_TIME_LIMIT_REACHED
}

pub(crate) fn default_notify_time_limit_secs() -> f64 {
    DEFAULT_NOTIFY_TIME_LIMIT_SECS
}

pub(crate) fn default_notifications_enabled() -> bool {
    DEFAULT_NOTIFICATIONS_ENABLED
}
