use crate::{FocusGrant, RecordingState, TimeLimits};

use std::{path::PathBuf, time::Duration};

use tokio::time::Instant;
use uuid::Uuid;

/// Where the session is in its lifecycle.
///
/// The interruption flag only exists on the paused phase: it is cleared by
/// any transition back to recording and disappears with the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionPhase {
    Recording { since: Instant },
    Paused { interrupted: bool },
}

/// Timer events the controller schedules for a recording session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Deadline {
    /// Remaining time reached the caller's notify threshold.
    Warn,
    /// Recording time limit reached.
    Limit,
}

/// The active capture context. Exists only while recording or paused.
#[derive(Debug)]
pub(crate) struct RecordingSession {
    id: Uuid,
    output_path: PathBuf,
    grant: FocusGrant,
    limits: TimeLimits,
    phase: SessionPhase,
    recorded: Duration,
    warned: bool,
}

impl RecordingSession {
    pub(crate) fn new(
        id: Uuid,
        output_path: PathBuf,
        limits: TimeLimits,
        grant: FocusGrant,
        now: Instant,
    ) -> Self {
        Self {
            id,
            output_path,
            grant,
            limits,
            phase: SessionPhase::Recording { since: now },
            recorded: Duration::ZERO,
            warned: false,
        }
    }

    pub(crate) fn id(&self) -> Uuid {
        self.id
    }

    pub(crate) fn state(&self) -> RecordingState {
        match self.phase {
            SessionPhase::Recording { .. } => RecordingState::Recording,
            SessionPhase::Paused { .. } => RecordingState::Paused,
        }
    }

    pub(crate) fn is_interrupted(&self) -> bool {
        matches!(self.phase, SessionPhase::Paused { interrupted: true })
    }

    /// Recording time so far, excluding paused spans.
    pub(crate) fn elapsed(&self, now: Instant) -> Duration {
        match self.phase {
            SessionPhase::Recording { since } => self.recorded + now.saturating_duration_since(since),
            SessionPhase::Paused { .. } => self.recorded,
        }
    }

    pub(crate) fn remaining(&self, now: Instant) -> Duration {
        self.limits.recording().saturating_sub(self.elapsed(now))
    }

    pub(crate) fn pause(&mut self, now: Instant, interrupted: bool) {
        if let SessionPhase::Recording { since } = self.phase {
            self.recorded += now.saturating_duration_since(since);
        }
        self.phase = SessionPhase::Paused { interrupted };
    }

    pub(crate) fn resume(&mut self, now: Instant) {
        self.phase = SessionPhase::Recording { since: now };
    }

    /// Drops the "resume on focus gain" intent without leaving the pause.
    pub(crate) fn clear_interruption(&mut self) {
        if let SessionPhase::Paused { interrupted } = &mut self.phase {
            *interrupted = false;
        }
    }

    pub(crate) fn mark_warned(&mut self) {
        self.warned = true;
    }

    /// The next timer the controller must wake up for. Paused sessions have
    /// no deadline since their recorded time does not advance, and neither
    /// does a target too far out to be represented as an `Instant`.
    pub(crate) fn next_deadline(&self) -> Option<(Instant, Deadline)> {
        let SessionPhase::Recording { since } = self.phase else {
            return None;
        };

        let at = |target: Duration| since.checked_add(target.saturating_sub(self.recorded));
        let limit = at(self.limits.recording()).map(|t| (t, Deadline::Limit));

        let warn = match self.limits.warn_at_remaining() {
            Some(threshold) if !self.warned => {
                let warn_elapsed = self.limits.recording().saturating_sub(threshold);
                at(warn_elapsed).map(|t| (t, Deadline::Warn))
            }
            _ => None,
        };

        match (warn, limit) {
            (Some(warn), Some(limit)) => Some(if warn.0 <= limit.0 { warn } else { limit }),
            (warn, limit) => warn.or(limit),
        }
    }

    /// Splits a finished session into the pieces teardown still needs.
    pub(crate) fn into_parts(self) -> (Uuid, PathBuf, FocusGrant) {
        (self.id, self.output_path, self.grant)
    }
}
