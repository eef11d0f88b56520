use crate::{AppError, AppResult, ConsoleLine, HostCommand, config::RecordingConfig};

use audio_recorder_core::{BridgeResult, FocusChange, InterruptionSource, RecorderBridge};
use serde::Serialize;
use serde_json::json;
use tokio::{
    io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite},
    sync::broadcast::error::RecvError,
};
use tracing::{info, instrument, warn};

/// Console host state.
///
/// Reads commands line by line and writes one JSON line per response and
/// per status event. Events are written as soon as they are broadcast, so
/// the output interleaves them with responses in the order they happened.
pub struct App {
    pub(crate) bridge: RecorderBridge,
    pub(crate) interruptions: InterruptionSource,
    pub(crate) recording: RecordingConfig,
}

impl App {
    /// Run until `quit` or end of input, then finalize any open session.
    #[instrument(skip_all)]
    pub(crate) async fn run<R, W>(self, input: R, mut output: W) -> AppResult<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        info!("Audio recorder console ready");

        let mut lines = input.lines();
        let mut events = self.bridge.on_recording_status_changed();

        loop {
            tokio::select! {
                biased;

                event = events.recv() => match event {
                    Ok(event) => ConsoleLine::Event(&event).write_to(&mut output).await?,
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Console fell behind, status events dropped");
                    }
                    Err(RecvError::Closed) => {
                        info!("Recorder controller closed its event stream");
                        break;
                    }
                },

                line = lines.next_line() => {
                    let Some(line) = line? else {
                        info!("Console input closed");
                        break;
                    };

                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }

                    match HostCommand::parse(line) {
                        Ok(HostCommand::Quit) => {
                            info!("Quit requested");
                            break;
                        }
                        Ok(command) => self.dispatch(command).await?.write_to(&mut output).await?,
                        Err(e) => {
                            warn!(line = %line, error = %e, "Unrecognised console input");
                            let message = match e {
                                AppError::InvalidCommand { reason, .. } => reason,
                                other => other.to_string(),
                            };
                            ConsoleLine::Error { message }.write_to(&mut output).await?;
                        }
                    }
                }
            }
        }

        if let Err(e) = self.bridge.handle().shutdown().await {
            warn!(error = ?e, "Recorder controller already stopped");
        }

        while let Ok(event) = events.try_recv() {
            ConsoleLine::Event(&event).write_to(&mut output).await?;
        }

        info!("Audio recorder console shut down");

        Ok(())
    }

    #[instrument(skip(self))]
    async fn dispatch(&self, command: HostCommand) -> AppResult<ConsoleLine<'static>> {
        let name = command.name();

        match command {
            HostCommand::Start {
                recording_time_limit: None,
                ..
            } => respond(
                name,
                self.bridge
                    .start_recording(
                        self.recording.time_limit_secs,
                        Some(self.recording.notify_time_limit_reached),
                        Some(self.recording.notify_time_limit_secs),
                    )
                    .await,
            ),
            HostCommand::Start {
                recording_time_limit: Some(limit),
                notify_time_limit_reached,
                notify_time_limit,
            } => respond(
                name,
                self.bridge
                    .start_recording(limit, notify_time_limit_reached, notify_time_limit)
                    .await,
            ),
            HostCommand::Stop => respond(name, self.bridge.stop_recording().await),
            HostCommand::Pause => respond(name, self.bridge.pause_recording().await),
            HostCommand::Resume => respond(name, self.bridge.resume_recording().await),
            HostCommand::Interrupt { transient } => {
                let change = if transient {
                    FocusChange::LossTransient
                } else {
                    FocusChange::Loss
                };
                Ok(self.signal(name, change))
            }
            HostCommand::Regain => Ok(self.signal(name, FocusChange::Gain)),
            HostCommand::Status => {
                let state = self.bridge.handle().state().await?;
                Ok(ConsoleLine::Response {
                    command: name,
                    result: json!({ "state": state }),
                })
            }
            HostCommand::Quit => Ok(ConsoleLine::Response {
                command: name,
                result: json!({}),
            }),
        }
    }

    fn signal(&self, command: &'static str, change: FocusChange) -> ConsoleLine<'static> {
        let delivered = self.interruptions.signal(change);
        if !delivered {
            info!(?change, "No session holds audio focus, change dropped");
        }
        ConsoleLine::Response {
            command,
            result: json!({ "delivered": delivered }),
        }
    }
}

fn respond<T: Serialize>(
    command: &'static str,
    result: BridgeResult<T>,
) -> AppResult<ConsoleLine<'static>> {
    Ok(match result {
        Ok(payload) => ConsoleLine::Response {
            command,
            result: serde_json::to_value(payload)?,
        },
        Err(rejection) => ConsoleLine::Rejection { command, rejection },
    })
}
