use std::fmt;

/// Application commands the controller accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecorderCommand {
    /// Begin a new session.
    Start,
    /// Finalize the current session.
    Stop,
    /// Suspend capture.
    Pause,
    /// Continue a suspended capture.
    Resume,
}

impl fmt::Display for RecorderCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RecorderCommand::Start => "start",
            RecorderCommand::Stop => "stop",
            RecorderCommand::Pause => "pause",
            RecorderCommand::Resume => "resume",
        };
        f.write_str(name)
    }
}
