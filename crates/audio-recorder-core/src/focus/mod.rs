//! Audio focus arbitration.
//!
//! The arbiter only acquires and releases focus and forwards platform focus
//! changes. Deciding what a loss or gain means for the recording is the
//! controller's job.

mod arbiter;
mod local;

pub(crate) use arbiter::FocusSignal;

pub use {
    arbiter::{
        AudioFocusArbiter, FocusChange, FocusContent, FocusGrant, FocusListener, FocusRequest,
    },
    local::{InterruptionSource, LocalFocusArbiter},
};
