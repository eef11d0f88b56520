use crate::CoreResult;

use tokio::sync::mpsc;
use tracing::debug;
use uuid::Uuid;

/// Focus change delivered by the platform while a grant is held.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusChange {
    /// Focus returned after a loss.
    Gain,
    /// Another client took focus indefinitely.
    Loss,
    /// Another client took focus for a short time (a call, an alarm).
    LossTransient,
}

impl FocusChange {
    /// Whether this change takes focus away.
    pub fn is_loss(&self) -> bool {
        matches!(self, FocusChange::Loss | FocusChange::LossTransient)
    }
}

/// Content type the focus request is tagged with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusContent {
    /// Voice or speech.
    Speech,
}

/// Parameters of a focus request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusRequest {
    /// Other clients must stay silent while the grant is held.
    pub exclusive: bool,
    /// The grant is expected to be short-lived.
    pub transient: bool,
    /// Whether a grant may be delivered later instead of immediately.
    pub accepts_delayed_gain: bool,
    /// What the session is going to capture.
    pub content: FocusContent,
}

impl FocusRequest {
    /// The request a recording session makes: exclusive, transient,
    /// immediate, speech.
    pub fn recording() -> Self {
        Self {
            exclusive: true,
            transient: true,
            accepts_delayed_gain: false,
            content: FocusContent::Speech,
        }
    }
}

/// Proof that focus is held.
///
/// Not `Clone`: [`AudioFocusArbiter::abandon`] consumes it, so a grant can
/// be released at most once.
#[derive(Debug, PartialEq, Eq)]
pub struct FocusGrant {
    token: u64,
}

impl FocusGrant {
    /// Wraps an arbiter-specific token.
    pub fn new(token: u64) -> Self {
        Self { token }
    }

    /// The arbiter-specific token.
    pub fn token(&self) -> u64 {
        self.token
    }
}

/// A focus change tagged with the session that registered for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FocusSignal {
    pub(crate) session_id: Uuid,
    pub(crate) change: FocusChange,
}

/// Forwards focus changes into the controller.
///
/// Cheap to clone and callable from any thread, including platform
/// callback threads. Changes arriving after the session ended are dropped
/// by the controller.
#[derive(Debug, Clone)]
pub struct FocusListener {
    session_id: Uuid,
    tx: mpsc::UnboundedSender<FocusSignal>,
}

impl FocusListener {
    pub(crate) fn new(session_id: Uuid, tx: mpsc::UnboundedSender<FocusSignal>) -> Self {
        Self { session_id, tx }
    }

    /// Session this listener was registered for.
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Deliver a focus change. Never blocks.
    pub fn notify(&self, change: FocusChange) {
        let signal = FocusSignal {
            session_id: self.session_id,
            change,
        };
        if self.tx.send(signal).is_err() {
            debug!(session_id = %self.session_id, ?change, "Controller gone, focus change dropped");
        }
    }
}

/// Acquires and releases exclusive audio focus.
pub trait AudioFocusArbiter: Send {
    /// Request focus and register `listener` for changes until the grant is
    /// abandoned.
    ///
    /// # Errors
    ///
    /// Returns `AudioFocusDenied` when the platform refuses the request.
    fn request(&mut self, request: FocusRequest, listener: FocusListener)
    -> CoreResult<FocusGrant>;

    /// Release focus and unregister the listener.
    fn abandon(&mut self, grant: FocusGrant);
}
