use crate::{AudioFocusArbiter, CoreResult, FocusChange, FocusGrant, FocusListener, FocusRequest};

use std::sync::{Arc, Mutex};

use tracing::{debug, info, instrument, warn};

#[derive(Debug, Default)]
struct LocalFocusState {
    next_token: u64,
    held: Option<(u64, FocusListener)>,
}

/// Focus arbiter for hosts without a platform focus service.
///
/// Every request is granted immediately. Interruptions are injected by the
/// host through the paired [`InterruptionSource`].
#[derive(Debug)]
pub struct LocalFocusArbiter {
    state: Arc<Mutex<LocalFocusState>>,
}

/// Injects focus changes into whatever session holds local focus.
#[derive(Debug, Clone)]
pub struct InterruptionSource {
    state: Arc<Mutex<LocalFocusState>>,
}

impl LocalFocusArbiter {
    /// Creates the arbiter together with its interruption source.
    pub fn new() -> (Self, InterruptionSource) {
        let state = Arc::new(Mutex::new(LocalFocusState::default()));
        (
            Self {
                state: Arc::clone(&state),
            },
            InterruptionSource { state },
        )
    }
}

impl AudioFocusArbiter for LocalFocusArbiter {
    #[instrument(skip(self, listener), fields(session_id = %listener.session_id()))]
    fn request(
        &mut self,
        request: FocusRequest,
        listener: FocusListener,
    ) -> CoreResult<FocusGrant> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());

        state.next_token += 1;
        let token = state.next_token;

        if let Some((previous, _)) = state.held.replace((token, listener)) {
            warn!(previous_token = previous, "Replacing a focus grant that was never abandoned");
        }

        info!(token, ?request, "Local audio focus granted");

        Ok(FocusGrant::new(token))
    }

    #[instrument(skip(self))]
    fn abandon(&mut self, grant: FocusGrant) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());

        match &state.held {
            Some((token, _)) if *token == grant.token() => {
                state.held = None;
                info!(token = grant.token(), "Local audio focus abandoned");
            }
            _ => debug!(token = grant.token(), "Abandoned grant was not the held one"),
        }
    }
}

impl InterruptionSource {
    /// Deliver `change` to the current holder. Returns `false` when no
    /// session holds focus.
    pub fn signal(&self, change: FocusChange) -> bool {
        let listener = {
            let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
            state.held.as_ref().map(|(_, l)| l.clone())
        };

        match listener {
            Some(listener) => {
                listener.notify(change);
                true
            }
            None => {
                debug!(?change, "No focus holder, interruption ignored");
                false
            }
        }
    }
}
