mod recorder_command;
mod recording_session;
mod recording_state;
mod time_limits;

pub(crate) use recording_session::{Deadline, RecordingSession};

pub use {
    recorder_command::RecorderCommand, recording_state::RecordingState, time_limits::TimeLimits,
};
