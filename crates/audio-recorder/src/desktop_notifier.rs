use crate::config::NotificationConfig;

use audio_recorder_core::{
    CoreResult, Notification, NotificationId, NotificationPresenter, RecorderError,
};

use std::panic::Location;

use error_location::ErrorLocation;
use tracing::{debug, info, instrument};

const APP_NAME: &str = "Audio Recorder";

/// Posts recorder notices as desktop notifications.
///
/// Desktop notification servers expire notices on their own and offer no
/// portable retraction, so cancelling and leaving foreground mode are
/// logged only. When disabled in config, every notice is logged instead of
/// posted.
#[derive(Debug, Clone)]
pub struct DesktopNotifier {
    enabled: bool,
}

impl DesktopNotifier {
    pub fn new(config: &NotificationConfig) -> Self {
        Self {
            enabled: config.enabled,
        }
    }

    #[track_caller]
    fn post(&self, notification: &Notification) -> CoreResult<()> {
        if !self.enabled {
            info!(
                id = notification.id.as_u32(),
                title = %notification.title,
                body = %notification.body,
                "Notification (desktop notifications disabled)"
            );
            return Ok(());
        }

        notify_rust::Notification::new()
            .appname(APP_NAME)
            .summary(&notification.title)
            .body(&notification.body)
            .show()
            .map(|_| ())
            .map_err(|e| RecorderError::NotificationFailed {
                reason: format!("Failed to post desktop notification: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })
    }
}

impl NotificationPresenter for DesktopNotifier {
    #[instrument(skip(self))]
    fn enter_foreground(&mut self) -> CoreResult<()> {
        self.post(&Notification::recording())
    }

    #[instrument(skip(self))]
    fn exit_foreground(&mut self) -> CoreResult<()> {
        debug!("Left foreground mode");
        Ok(())
    }

    #[instrument(skip(self))]
    fn show(&mut self, notification: &Notification) -> CoreResult<()> {
        self.post(notification)
    }

    #[instrument(skip(self))]
    fn cancel(&mut self, id: NotificationId) -> CoreResult<()> {
        debug!(id = id.as_u32(), "Notification withdrawn");
        Ok(())
    }
}
