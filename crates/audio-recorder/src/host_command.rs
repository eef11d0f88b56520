use crate::{AppError, AppResult};

use std::{fmt::Display, panic::Location, str::FromStr};

use error_location::ErrorLocation;

/// One line of console input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HostCommand {
    /// `start [limit] [notifyReached] [notifyLimit]`. A bare `start` takes
    /// all three from the `[recording]` config section.
    Start {
        /// Recording time limit in seconds.
        recording_time_limit: Option<f64>,
        /// Whether to warn before the limit.
        notify_time_limit_reached: Option<bool>,
        /// Remaining seconds at which to warn.
        notify_time_limit: Option<f64>,
    },
    /// `stop`
    Stop,
    /// `pause`
    Pause,
    /// `resume`
    Resume,
    /// `interrupt` or `interrupt-transient`: simulate another app taking
    /// audio focus.
    Interrupt {
        /// Transient loss (a call, an alarm) rather than a permanent one.
        transient: bool,
    },
    /// `regain`: focus returns after an interruption.
    Regain,
    /// `status`
    Status,
    /// `quit` or `exit`
    Quit,
}

impl HostCommand {
    /// Parse a trimmed, non-empty console line.
    #[track_caller]
    pub fn parse(line: &str) -> AppResult<Self> {
        let mut parts = line.split_whitespace();

        let Some(word) = parts.next() else {
            return Err(invalid("Empty command".to_string()));
        };

        let command = match word {
            "start" => HostCommand::Start {
                recording_time_limit: parse_arg(parts.next(), "recordingTimeLimit")?,
                notify_time_limit_reached: parse_arg(parts.next(), "notifyTimeLimitReached")?,
                notify_time_limit: parse_arg(parts.next(), "notifyTimeLimit")?,
            },
            "stop" => HostCommand::Stop,
            "pause" => HostCommand::Pause,
            "resume" => HostCommand::Resume,
            "interrupt" => HostCommand::Interrupt { transient: false },
            "interrupt-transient" => HostCommand::Interrupt { transient: true },
            "regain" => HostCommand::Regain,
            "status" => HostCommand::Status,
            "quit" | "exit" => HostCommand::Quit,
            other => return Err(invalid(format!("Unknown command: {}", other))),
        };

        if let Some(extra) = parts.next() {
            return Err(invalid(format!("Unexpected argument: {}", extra)));
        }

        Ok(command)
    }

    /// Name echoed back in responses.
    pub fn name(&self) -> &'static str {
        match self {
            HostCommand::Start { .. } => "start",
            HostCommand::Stop => "stop",
            HostCommand::Pause => "pause",
            HostCommand::Resume => "resume",
            HostCommand::Interrupt { transient: false } => "interrupt",
            HostCommand::Interrupt { transient: true } => "interrupt-transient",
            HostCommand::Regain => "regain",
            HostCommand::Status => "status",
            HostCommand::Quit => "quit",
        }
    }
}

#[track_caller]
fn parse_arg<T>(arg: Option<&str>, name: &str) -> AppResult<Option<T>>
where
    T: FromStr,
    T::Err: Display,
{
    arg.map(|raw| {
        raw.parse::<T>()
            .map_err(|e| invalid(format!("{} '{}': {}", name, raw, e)))
    })
    .transpose()
}

#[track_caller]
fn invalid(reason: String) -> AppError {
    AppError::InvalidCommand {
        reason,
        location: ErrorLocation::from(Location::caller()),
    }
}
