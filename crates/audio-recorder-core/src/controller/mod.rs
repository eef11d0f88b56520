//! Recording controller.
//!
//! The controller is an actor: one task owns the session and every
//! collaborator, and application commands, focus changes and time-limit
//! timers are all processed by its single loop. Nothing else mutates
//! recording state.

mod actor;
mod handle;
mod message;

pub(crate) use message::ControllerMessage;

pub use {actor::RecorderController, handle::RecorderHandle};
