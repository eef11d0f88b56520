use crate::{
    AudioFocusArbiter, CaptureDevice, CoreResult, FocusGrant, FocusListener, FocusRequest,
    Notification, NotificationId, NotificationPresenter, OutputStorage, RecorderCommand,
    RecorderError, RecorderHandle, RecordingState, RecordingStatus, StatusEvent, TimeLimits,
    controller::ControllerMessage,
    focus::FocusSignal,
    session::{Deadline, RecordingSession},
};

use std::{
    any::Any,
    fs,
    ops::ControlFlow,
    panic::{self, AssertUnwindSafe, Location},
    path::{Path, PathBuf},
    time::Duration,
};

use error_location::ErrorLocation;
use tokio::{
    sync::{broadcast, mpsc, oneshot},
    time::{Instant, sleep_until},
};
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

/// Capacity of the command mailbox.
const COMMAND_CAPACITY: usize = 32;

/// Status events buffered per subscriber before the slowest one lags.
const EVENT_CAPACITY: usize = 64;

/// Owns the recording state machine and its collaborators.
///
/// Constructed with injected capture device, focus arbiter and notification
/// presenter, then moved onto a tokio task by [`RecorderController::spawn`].
/// All interaction afterwards goes through the returned [`RecorderHandle`].
pub struct RecorderController {
    device: Box<dyn CaptureDevice>,
    arbiter: Box<dyn AudioFocusArbiter>,
    presenter: Box<dyn NotificationPresenter>,
    storage: OutputStorage,
    session: Option<RecordingSession>,
    events: broadcast::Sender<StatusEvent>,
    focus_tx: mpsc::UnboundedSender<FocusSignal>,
}

impl RecorderController {
    /// Start the controller on the current tokio runtime.
    ///
    /// Must be called from within a runtime context.
    pub fn spawn(
        device: impl CaptureDevice + 'static,
        arbiter: impl AudioFocusArbiter + 'static,
        presenter: impl NotificationPresenter + 'static,
        storage: OutputStorage,
    ) -> RecorderHandle {
        let (command_tx, command_rx) = mpsc::channel(COMMAND_CAPACITY);
        let (focus_tx, focus_rx) = mpsc::unbounded_channel();
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        let controller = Self {
            device: Box::new(device),
            arbiter: Box::new(arbiter),
            presenter: Box::new(presenter),
            storage,
            session: None,
            events: events.clone(),
            focus_tx,
        };

        tokio::spawn(controller.run(command_rx, focus_rx));

        RecorderHandle {
            commands: command_tx,
            events,
        }
    }

    async fn run(
        mut self,
        mut commands: mpsc::Receiver<ControllerMessage>,
        mut focus: mpsc::UnboundedReceiver<FocusSignal>,
    ) {
        info!("Recorder controller started");

        loop {
            let deadline = self.session.as_ref().and_then(RecordingSession::next_deadline);

            // Focus changes are drained before commands, so a change the
            // platform delivered before a command is applied before it.
            tokio::select! {
                biased;

                Some(signal) = focus.recv() => self.handle_focus(signal),

                _ = wait_for(deadline) => {
                    if let Some((_, kind)) = deadline {
                        self.handle_deadline(kind);
                    }
                }

                message = commands.recv() => match message {
                    Some(message) => {
                        if let ControlFlow::Break(reply) = self.handle_message(message) {
                            self.shutdown_session();
                            let _ = reply.send(());
                            break;
                        }
                    }
                    None => {
                        info!("All recorder handles dropped");
                        self.shutdown_session();
                        break;
                    }
                },
            }
        }

        info!("Recorder controller stopped");
    }

    /// Answers a command. `Shutdown` is handed back to the run loop with its
    /// reply, since only the loop can stop itself.
    fn handle_message(&mut self, message: ControllerMessage) -> ControlFlow<oneshot::Sender<()>> {
        match message {
            ControllerMessage::Start { limits, reply } => {
                let _ = reply.send(self.start(limits));
            }
            ControllerMessage::Stop { reply } => {
                let _ = reply.send(self.stop());
            }
            ControllerMessage::Pause { reply } => {
                let _ = reply.send(self.pause());
            }
            ControllerMessage::Resume { reply } => {
                let _ = reply.send(self.resume());
            }
            ControllerMessage::State { reply } => {
                let _ = reply.send(self.state());
            }
            ControllerMessage::Shutdown { reply } => return ControlFlow::Break(reply),
        }

        ControlFlow::Continue(())
    }

    fn state(&self) -> RecordingState {
        self.session
            .as_ref()
            .map_or(RecordingState::Idle, RecordingSession::state)
    }

    #[track_caller]
    #[instrument(skip(self))]
    fn start(&mut self, limits: TimeLimits) -> CoreResult<PathBuf> {
        if let Some(session) = &self.session {
            return Err(RecorderError::AlreadyActive {
                state: session.state(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let session_id = Uuid::new_v4();
        let listener = FocusListener::new(session_id, self.focus_tx.clone());

        let grant = guarded("focus request", || {
            self.arbiter.request(FocusRequest::recording(), listener)
        })
        .map_err(|e| {
            warn!(session_id = %session_id, error = ?e, "Audio focus not granted");
            RecorderError::AudioFocusDenied {
                location: ErrorLocation::from(Location::caller()),
            }
        })?;

        let output_path = match self.storage.allocate() {
            Ok(path) => path,
            Err(e) => {
                warn!(session_id = %session_id, error = ?e, "No output location");
                self.abandon_focus(grant);
                return Err(e);
            }
        };

        let started = guarded("prepare", || self.device.prepare(&output_path))
            .and_then(|()| guarded("start", || self.device.start()));

        if let Err(e) = started {
            error!(session_id = %session_id, error = ?e, "Capture failed to start");
            self.release_device();
            self.abandon_focus(grant);
            discard_partial_file(&output_path);
            return Err(RecorderError::CaptureStartFailed {
                reason: e.message(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let session = RecordingSession::new(
            session_id,
            output_path.clone(),
            limits,
            grant,
            Instant::now(),
        );
        self.session = Some(session);

        self.emit(StatusEvent::new(RecordingStatus::Started, limits.recording()));
        self.present("enter foreground", |p| p.enter_foreground());

        info!(session_id = %session_id, file_path = ?output_path, "Recording started");

        Ok(output_path)
    }

    #[track_caller]
    #[instrument(skip(self))]
    fn stop(&mut self) -> CoreResult<PathBuf> {
        let Some(session) = self.session.take() else {
            return Err(RecorderError::NotActive {
                command: RecorderCommand::Stop,
                state: RecordingState::Idle,
                location: ErrorLocation::from(Location::caller()),
            });
        };

        let remaining = session.remaining(Instant::now());

        match self.end_session(session) {
            Ok(path) => {
                self.emit(StatusEvent::new(RecordingStatus::Stopped, remaining));
                Ok(path)
            }
            Err((path, e)) => {
                self.emit(StatusEvent::new(RecordingStatus::Interrupted, remaining).with_file(path));
                Err(RecorderError::CaptureStopFailed {
                    reason: e.message(),
                    location: ErrorLocation::from(Location::caller()),
                })
            }
        }
    }

    #[track_caller]
    #[instrument(skip(self))]
    fn pause(&mut self) -> CoreResult<()> {
        let state = self.state();
        if state != RecordingState::Recording {
            return Err(RecorderError::NotActive {
                command: RecorderCommand::Pause,
                state,
                location: ErrorLocation::from(Location::caller()),
            });
        }

        guarded("pause", || self.device.pause()).map_err(|e| RecorderError::PauseFailed {
            reason: e.message(),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let now = Instant::now();
        if let Some(session) = self.session.as_mut() {
            session.pause(now, false);
            let remaining = session.remaining(now);
            self.emit(StatusEvent::new(RecordingStatus::Paused, remaining));
        }

        Ok(())
    }

    #[track_caller]
    #[instrument(skip(self))]
    fn resume(&mut self) -> CoreResult<()> {
        let state = self.state();
        if state != RecordingState::Paused {
            return Err(RecorderError::NotActive {
                command: RecorderCommand::Resume,
                state,
                location: ErrorLocation::from(Location::caller()),
            });
        }

        guarded("resume", || self.device.resume()).map_err(|e| RecorderError::ResumeFailed {
            reason: e.message(),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let now = Instant::now();
        let mut was_interrupted = false;
        if let Some(session) = self.session.as_mut() {
            was_interrupted = session.is_interrupted();
            session.resume(now);
            let remaining = session.remaining(now);
            self.emit(StatusEvent::new(RecordingStatus::Resumed, remaining));
        }

        if was_interrupted {
            self.present("cancel paused notice", |p| {
                p.cancel(NotificationId::InterruptionPaused)
            });
        }

        Ok(())
    }

    #[instrument(skip(self))]
    fn handle_focus(&mut self, signal: FocusSignal) {
        let Some(session) = &self.session else {
            debug!(change = ?signal.change, "Focus change with no session, ignored");
            return;
        };

        if session.id() != signal.session_id {
            debug!(
                change = ?signal.change,
                stale_session = %signal.session_id,
                "Focus change for an ended session, ignored"
            );
            return;
        }

        match (signal.change.is_loss(), session.state(), session.is_interrupted()) {
            (true, RecordingState::Recording, _) => self.interrupt(),
            (false, RecordingState::Paused, true) => self.regain(),
            (_, state, _) => debug!(change = ?signal.change, ?state, "Focus change needs no action"),
        }
    }

    /// Focus lost while recording: pause and remember to resume on regain.
    fn interrupt(&mut self) {
        let now = Instant::now();

        if let Err(e) = guarded("pause", || self.device.pause()) {
            error!(error = ?e, "Capture failed to pause on focus loss, ending session");
            if let Some(session) = self.session.take() {
                let remaining = session.remaining(now);
                let path = match self.end_session(session) {
                    Ok(path) | Err((path, _)) => path,
                };
                self.emit(StatusEvent::new(RecordingStatus::Interrupted, remaining).with_file(path));
            }
            return;
        }

        if let Some(session) = self.session.as_mut() {
            session.pause(now, true);
            let remaining = session.remaining(now);
            self.emit(StatusEvent::new(
                RecordingStatus::PausedDueToExternalAction,
                remaining,
            ));
        }

        self.present("show paused notice", |p| {
            p.show(&Notification::interruption_paused())
        });
        self.present("cancel resumed notice", |p| {
            p.cancel(NotificationId::InterruptionResumed)
        });

        info!("Recording paused by audio interruption");
    }

    /// Focus returned after an interruption pause: resume.
    fn regain(&mut self) {
        if let Err(e) = guarded("resume", || self.device.resume()) {
            warn!(error = ?e, "Capture failed to resume on focus gain, staying paused");
            if let Some(session) = self.session.as_mut() {
                session.clear_interruption();
            }
            return;
        }

        let now = Instant::now();
        if let Some(session) = self.session.as_mut() {
            session.resume(now);
            let remaining = session.remaining(now);
            self.emit(StatusEvent::new(RecordingStatus::Resumed, remaining));
        }

        self.present("show resumed notice", |p| {
            p.show(&Notification::interruption_resumed())
        });
        self.present("cancel paused notice", |p| {
            p.cancel(NotificationId::InterruptionPaused)
        });

        info!("Recording resumed after audio interruption");
    }

    #[instrument(skip(self))]
    fn handle_deadline(&mut self, deadline: Deadline) {
        let now = Instant::now();

        match deadline {
            Deadline::Warn => {
                let Some(session) = self.session.as_mut() else {
                    return;
                };
                session.mark_warned();
                let remaining = session.remaining(now);
                info!(remaining_secs = remaining.as_secs_f64(), "Recording time limit approaching");
                self.present("show time limit notice", |p| {
                    p.show(&Notification::time_limit_approaching(remaining))
                });
            }
            Deadline::Limit => {
                let Some(session) = self.session.take() else {
                    return;
                };
                info!(session_id = %session.id(), "Recording time limit reached");
                match self.end_session(session) {
                    Ok(path) => self.emit(
                        StatusEvent::new(RecordingStatus::StoppedDueToTimeLimit, Duration::ZERO)
                            .with_file(path),
                    ),
                    Err((path, _)) => self.emit(
                        StatusEvent::new(RecordingStatus::Interrupted, Duration::ZERO)
                            .with_file(path),
                    ),
                }
            }
        }
    }

    /// Controller is going away: finalize whatever is running.
    fn shutdown_session(&mut self) {
        let Some(session) = self.session.take() else {
            return;
        };

        let remaining = session.remaining(Instant::now());
        info!(session_id = %session.id(), "Finalizing session on shutdown");

        match self.end_session(session) {
            Ok(path) => {
                self.emit(StatusEvent::new(RecordingStatus::Stopped, remaining).with_file(path))
            }
            Err((path, _)) => {
                self.emit(StatusEvent::new(RecordingStatus::Interrupted, remaining).with_file(path))
            }
        }
    }

    /// Releases everything a session holds: focus (exactly once, the grant
    /// is consumed here), the capture device, foreground mode and any
    /// session notices. The file path is returned on both paths so callers
    /// can report it.
    fn end_session(
        &mut self,
        session: RecordingSession,
    ) -> std::result::Result<PathBuf, (PathBuf, RecorderError)> {
        let (session_id, output_path, grant) = session.into_parts();

        self.abandon_focus(grant);

        let stopped = guarded("stop", || self.device.stop());
        self.release_device();

        self.present("exit foreground", |p| p.exit_foreground());
        for id in NotificationId::ALL {
            if id != NotificationId::Foreground {
                self.present("cancel notice", |p| p.cancel(id));
            }
        }

        match stopped {
            Ok(()) => {
                info!(session_id = %session_id, file_path = ?output_path, "Recording finalized");
                Ok(output_path)
            }
            Err(e) => {
                error!(session_id = %session_id, error = ?e, "Capture failed to stop");
                Err((output_path, e))
            }
        }
    }

    /// Hands the grant back. The grant is consumed either way, so a panicking
    /// arbiter still cannot be asked to release it twice.
    fn abandon_focus(&mut self, grant: FocusGrant) {
        let token = grant.token();
        let abandoned = guarded("focus abandon", || {
            self.arbiter.abandon(grant);
            Ok(())
        });
        if let Err(e) = abandoned {
            error!(token, error = ?e, "Focus arbiter failed to abandon grant");
        }
    }

    fn release_device(&mut self) {
        if let Err(e) = guarded("release", || self.device.release()) {
            warn!(error = ?e, "Capture device release failed");
        }
    }

    fn present(
        &mut self,
        what: &'static str,
        action: impl FnOnce(&mut dyn NotificationPresenter) -> CoreResult<()>,
    ) {
        let presenter = self.presenter.as_mut();
        if let Err(e) = guarded(what, || action(presenter)) {
            warn!(action = what, error = ?e, "Notification presenter failed, ignoring");
        }
    }

    fn emit(&self, event: StatusEvent) {
        info!(status = ?event.status, time_remaining = ?event.time_remaining, "Recording status changed");
        if self.events.send(event).is_err() {
            debug!("No status subscribers");
        }
    }
}

/// Runs a collaborator call, converting a panic into an error so that a
/// misbehaving collaborator cannot take the controller task down.
#[track_caller]
fn guarded<T>(what: &'static str, call: impl FnOnce() -> CoreResult<T>) -> CoreResult<T> {
    let location = Location::caller();
    match panic::catch_unwind(AssertUnwindSafe(call)) {
        Ok(result) => result,
        Err(payload) => Err(RecorderError::CaptureDevice {
            reason: format!("{} panicked: {}", what, panic_message(payload.as_ref())),
            location: ErrorLocation::from(location),
        }),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Removes whatever a failed start left at `path`.
fn discard_partial_file(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => debug!(file_path = ?path, "Removed partial recording"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!(file_path = ?path, error = %e, "Failed to remove partial recording"),
    }
}

async fn wait_for(deadline: Option<(Instant, Deadline)>) {
    match deadline {
        Some((at, _)) => sleep_until(at).await,
        None => std::future::pending::<()>().await,
    }
}
