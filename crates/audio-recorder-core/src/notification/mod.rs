//! Notification presentation seam.
//!
//! Presentation is fire-and-forget for the controller: failures are logged
//! and never fail or roll back a recording command.

use crate::CoreResult;

use std::time::Duration;

/// Stable identities for the notifications the recorder posts.
///
/// Posting a notification with an id replaces any earlier one with the
/// same id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationId {
    /// Ongoing "recording in progress" notice tied to foreground mode.
    Foreground,
    /// Capture was paused by an audio interruption.
    InterruptionPaused,
    /// Capture resumed after an audio interruption.
    InterruptionResumed,
    /// The recording time limit is close.
    TimeLimit,
}

impl NotificationId {
    /// Numeric id for platforms that key notifications by integer.
    pub fn as_u32(&self) -> u32 {
        match self {
            NotificationId::Foreground => 1,
            NotificationId::InterruptionPaused => 2,
            NotificationId::InterruptionResumed => 3,
            NotificationId::TimeLimit => 4,
        }
    }

    /// Every id the recorder may post.
    pub const ALL: [NotificationId; 4] = [
        NotificationId::Foreground,
        NotificationId::InterruptionPaused,
        NotificationId::InterruptionResumed,
        NotificationId::TimeLimit,
    ];
}

/// A user-visible notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Identity used for replacement and cancellation.
    pub id: NotificationId,
    /// Title line.
    pub title: String,
    /// Body text.
    pub body: String,
}

impl Notification {
    /// The ongoing notice shown while in foreground mode.
    pub fn recording() -> Self {
        Self {
            id: NotificationId::Foreground,
            title: "Recording Audio".to_string(),
            body: "Recording in progress".to_string(),
        }
    }

    /// Shown when an interruption paused capture.
    pub fn interruption_paused() -> Self {
        Self {
            id: NotificationId::InterruptionPaused,
            title: "Recording Paused".to_string(),
            body: "Recording paused due to audio interruption".to_string(),
        }
    }

    /// Shown when capture resumed after an interruption.
    pub fn interruption_resumed() -> Self {
        Self {
            id: NotificationId::InterruptionResumed,
            title: "Recording Resumed".to_string(),
            body: "Recording has been resumed".to_string(),
        }
    }

    /// Shown once when the remaining recording time reaches the caller's
    /// threshold.
    pub fn time_limit_approaching(remaining: Duration) -> Self {
        Self {
            id: NotificationId::TimeLimit,
            title: "Recording Time Limit".to_string(),
            body: format!(
                "Recording will stop in {} seconds",
                remaining.as_secs_f64().round() as u64
            ),
        }
    }
}

/// Posts notifications and manages foreground mode.
pub trait NotificationPresenter: Send {
    /// Enter foreground mode and show the ongoing recording notice.
    fn enter_foreground(&mut self) -> CoreResult<()>;

    /// Leave foreground mode and remove the ongoing notice.
    fn exit_foreground(&mut self) -> CoreResult<()>;

    /// Post or replace a notification.
    fn show(&mut self, notification: &Notification) -> CoreResult<()>;

    /// Remove a notification if it is showing.
    fn cancel(&mut self, id: NotificationId) -> CoreResult<()>;
}
