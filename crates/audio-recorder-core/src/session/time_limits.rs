use crate::{CoreResult, RecorderError};

use std::{panic::Location, time::Duration};

use error_location::ErrorLocation;

/// Validated time limits for one recording session.
///
/// `recording` is the total recording time allowed (paused time does not
/// count). `warn_at_remaining` is set only when the caller asked to be
/// notified, and is always strictly shorter than `recording`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeLimits {
    recording: Duration,
    warn_at_remaining: Option<Duration>,
}

impl TimeLimits {
    /// Validates the raw start parameters.
    ///
    /// The notify threshold is checked against the limit even when the
    /// notification itself is disabled.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameters` if the limit is not a positive finite
    /// number of seconds, or if the notify threshold is not positive or not
    /// strictly below the limit.
    #[track_caller]
    pub fn new(
        recording_time_limit: f64,
        notify_time_limit_reached: Option<bool>,
        notify_time_limit: Option<f64>,
    ) -> CoreResult<Self> {
        if let Some(notify) = notify_time_limit
            && notify >= recording_time_limit
        {
            return Err(invalid(
                "notifyTimeLimit must be less than recordingTimeLimit",
            ));
        }

        if !recording_time_limit.is_finite() || recording_time_limit <= 0.0 {
            return Err(invalid("recordingTimeLimit must be a positive number of seconds"));
        }

        let recording = Duration::try_from_secs_f64(recording_time_limit)
            .map_err(|_| invalid("recordingTimeLimit is out of range"))?;

        let notify = match notify_time_limit {
            Some(secs) if !secs.is_finite() || secs <= 0.0 => {
                return Err(invalid("notifyTimeLimit must be a positive number of seconds"));
            }
            Some(secs) => Some(
                Duration::try_from_secs_f64(secs)
                    .map_err(|_| invalid("notifyTimeLimit is out of range"))?,
            ),
            None => None,
        };

        let warn_at_remaining = if notify_time_limit_reached.unwrap_or(false) {
            notify
        } else {
            None
        };

        Ok(Self {
            recording,
            warn_at_remaining,
        })
    }

    /// Total recording time allowed.
    pub fn recording(&self) -> Duration {
        self.recording
    }

    /// Remaining time at which the caller wants a warning, if any.
    pub fn warn_at_remaining(&self) -> Option<Duration> {
        self.warn_at_remaining
    }
}

#[track_caller]
fn invalid(reason: &str) -> RecorderError {
    RecorderError::InvalidParameters {
        reason: reason.to_string(),
        location: ErrorLocation::from(Location::caller()),
    }
}
