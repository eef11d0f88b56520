use crate::{
    ErrorCode, NotificationId, OutputStorage, RecorderError, RecordingState, RecordingStatus,
    tests::fakes::{Harness, PresenterCall},
};

/// WHAT: Full start/pause/resume/stop cycle reports the same file and one event per step
/// WHY: This is the primary contract the application layer relies on
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_idle_when_running_full_cycle_then_each_step_transitions_and_emits_once() {
    // Given: An idle controller wired to fakes
    let mut h = Harness::spawn();

    // When: start(60, true, 10)
    let path = h
        .handle
        .start_recording(60.0, Some(true), Some(10.0))
        .await
        .unwrap();

    // Then: Recording, Started emitted, output inside the storage dir
    assert_eq!(h.handle.state().await.unwrap(), RecordingState::Recording);
    assert_eq!(h.drain_statuses(), vec![RecordingStatus::Started]);
    assert!(path.starts_with(h.dir.path()));
    assert_eq!(h.device.prepared_path(), Some(path.clone()));

    // When: pause, resume
    h.handle.pause_recording().await.unwrap();
    assert_eq!(h.handle.state().await.unwrap(), RecordingState::Paused);
    h.handle.resume_recording().await.unwrap();
    assert_eq!(h.handle.state().await.unwrap(), RecordingState::Recording);

    // Then: Paused and Resumed emitted once each
    assert_eq!(
        h.drain_statuses(),
        vec![RecordingStatus::Paused, RecordingStatus::Resumed]
    );

    // When: stop
    let stopped = h.handle.stop_recording().await.unwrap();

    // Then: Same path, Idle, Stopped emitted once, focus released
    assert_eq!(stopped, path);
    assert_eq!(h.handle.state().await.unwrap(), RecordingState::Idle);
    assert_eq!(h.drain_statuses(), vec![RecordingStatus::Stopped]);
    assert_eq!(h.arbiter.held(), 0);
    assert_eq!(h.arbiter.abandoned().len(), 1);
    assert_eq!(
        h.device.calls(),
        vec!["prepare", "start", "pause", "resume", "stop", "release"]
    );
}

/// WHAT: Foreground mode brackets the session
/// WHY: The ongoing notice must exist exactly while recording is active
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_session_when_started_and_stopped_then_foreground_entered_and_exited() {
    // Given: An idle controller
    let h = Harness::spawn();

    // When: A session is started and stopped
    h.handle.start_recording(30.0, None, None).await.unwrap();
    h.handle.stop_recording().await.unwrap();

    // Then: Foreground entered first, exited on stop with session notices cancelled
    let calls = h.presenter.calls();
    assert_eq!(calls.first(), Some(&PresenterCall::EnterForeground));
    assert!(calls.contains(&PresenterCall::ExitForeground));
    assert!(calls.contains(&PresenterCall::Cancel(NotificationId::InterruptionPaused)));
    assert!(calls.contains(&PresenterCall::Cancel(NotificationId::InterruptionResumed)));
    assert!(calls.contains(&PresenterCall::Cancel(NotificationId::TimeLimit)));
}

/// WHAT: Notify threshold not below the limit is rejected before any side effect
/// WHY: Parameter errors are the caller's fault and must not touch focus or storage
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_notify_limit_not_below_limit_when_starting_then_invalid_params_without_side_effects() {
    // Given: An idle controller
    let mut h = Harness::spawn();

    for notify in [10.0, 15.0] {
        // When: start(10, true, notify) with notify >= limit
        let result = h.handle.start_recording(10.0, Some(true), Some(notify)).await;

        // Then: InvalidParameters and nothing happened
        let err = result.unwrap_err();
        assert!(matches!(err, RecorderError::InvalidParameters { .. }));
        assert_eq!(err.code(), ErrorCode::InvalidParams);
    }

    assert!(h.arbiter.requests().is_empty());
    assert!(h.device.calls().is_empty());
    assert!(h.files().is_empty());
    assert!(h.drain().is_empty());
    assert_eq!(h.handle.state().await.unwrap(), RecordingState::Idle);
}

/// WHAT: Non-positive time limit is rejected
/// WHY: A session without recording time cannot be started
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_zero_time_limit_when_starting_then_invalid_params() {
    // Given: An idle controller
    let h = Harness::spawn();

    // When: start(0)
    let result = h.handle.start_recording(0.0, None, None).await;

    // Then: InvalidParameters
    assert!(matches!(result, Err(RecorderError::InvalidParameters { .. })));
    assert!(h.arbiter.requests().is_empty());
}

/// WHAT: Focus denial fails start with no session
/// WHY: Recording must not begin without exclusive focus
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_focus_denied_when_starting_then_audio_focus_error_and_idle() {
    // Given: An arbiter that denies every request
    let mut h = Harness::spawn();
    h.arbiter.deny();

    // When: Starting
    let err = h.handle.start_recording(60.0, None, None).await.unwrap_err();

    // Then: AUDIO_FOCUS_ERROR, device untouched, no events
    assert!(matches!(err, RecorderError::AudioFocusDenied { .. }));
    assert_eq!(err.code(), ErrorCode::AudioFocusError);
    assert!(h.device.calls().is_empty());
    assert!(h.drain().is_empty());
    assert_eq!(h.handle.state().await.unwrap(), RecordingState::Idle);
}

/// WHAT: Missing storage fails start and releases the focus it acquired
/// WHY: A grant may only be held while a session exists
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_no_storage_when_starting_then_file_error_and_focus_released() {
    // Given: Storage with no directory
    let dir = tempfile::tempdir().unwrap();
    let mut h = Harness::spawn_with_storage(dir, OutputStorage::new(None));

    // When: Starting
    let err = h.handle.start_recording(60.0, None, None).await.unwrap_err();

    // Then: FILE_ERROR, focus acquired then released, device untouched
    assert!(matches!(err, RecorderError::StorageUnavailable { .. }));
    assert_eq!(err.code(), ErrorCode::FileError);
    assert_eq!(h.arbiter.requests().len(), 1);
    assert_eq!(h.arbiter.held(), 0);
    assert!(h.device.calls().is_empty());
    assert!(h.drain().is_empty());
}

/// WHAT: Capture start failure leaves no partial session
/// WHY: Failed starts must roll back focus and device state completely
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_capture_start_failure_when_starting_then_start_error_and_fully_rolled_back() {
    // Given: A device whose start fails
    let mut h = Harness::spawn();
    h.device.fail_on("start");

    // When: Starting
    let err = h.handle.start_recording(60.0, None, None).await.unwrap_err();

    // Then: START_ERROR, device released, focus released, no file left, Idle, no events
    assert!(matches!(err, RecorderError::CaptureStartFailed { .. }));
    assert_eq!(err.code(), ErrorCode::StartError);
    assert_eq!(h.device.calls(), vec!["prepare", "start", "release"]);
    assert_eq!(h.arbiter.held(), 0);
    assert!(h.files().is_empty());
    assert!(h.drain().is_empty());
    assert_eq!(h.handle.state().await.unwrap(), RecordingState::Idle);
    assert!(
        !h.presenter
            .calls()
            .contains(&PresenterCall::EnterForeground)
    );

    // When: The device recovers and start is retried
    h.device.succeed_on("start");
    h.handle.start_recording(60.0, None, None).await.unwrap();

    // Then: A clean session starts
    assert_eq!(h.handle.state().await.unwrap(), RecordingState::Recording);
    assert_eq!(h.arbiter.held(), 1);
}

/// WHAT: A panicking capture device becomes a start error
/// WHY: Fatal device exceptions must be reported, not crash the controller
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_device_panics_on_prepare_when_starting_then_start_error_and_controller_alive() {
    // Given: A device that panics during prepare
    let h = Harness::spawn();
    h.device.panic_on("prepare");

    // When: Starting
    let err = h.handle.start_recording(60.0, None, None).await.unwrap_err();

    // Then: START_ERROR and the controller still answers
    assert!(matches!(err, RecorderError::CaptureStartFailed { .. }));
    assert_eq!(h.handle.state().await.unwrap(), RecordingState::Idle);
    assert_eq!(h.arbiter.held(), 0);
}

/// WHAT: Start while a session exists is a state conflict
/// WHY: A second session would leak the first one's focus and file
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_recording_when_starting_again_then_start_error_and_state_unchanged() {
    // Given: A running session
    let mut h = Harness::spawn();
    h.handle.start_recording(60.0, None, None).await.unwrap();
    h.drain();

    // When: Starting again
    let err = h.handle.start_recording(60.0, None, None).await.unwrap_err();

    // Then: START_ERROR, still Recording, no new focus request or event
    assert!(matches!(err, RecorderError::AlreadyActive { .. }));
    assert_eq!(err.code(), ErrorCode::StartError);
    assert_eq!(h.arbiter.requests().len(), 1);
    assert!(h.drain().is_empty());
    assert_eq!(h.handle.state().await.unwrap(), RecordingState::Recording);
}

/// WHAT: Stop while idle is rejected
/// WHY: There is no file to finalize
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_idle_when_stopping_then_stop_error() {
    // Given: An idle controller
    let mut h = Harness::spawn();

    // When: Stopping
    let err = h.handle.stop_recording().await.unwrap_err();

    // Then: NotActive mapped to STOP_ERROR, no events
    assert!(matches!(
        err,
        RecorderError::NotActive {
            state: RecordingState::Idle,
            ..
        }
    ));
    assert_eq!(err.code(), ErrorCode::StopError);
    assert!(h.drain().is_empty());
}

/// WHAT: Pausing twice succeeds once
/// WHY: Invalid commands never mutate state or duplicate events
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_recording_when_pausing_twice_then_second_is_rejected_without_duplicate_event() {
    // Given: A running session
    let mut h = Harness::spawn();
    h.handle.start_recording(60.0, None, None).await.unwrap();
    h.drain();

    // When: Pausing twice
    let first = h.handle.pause_recording().await;
    let second = h.handle.pause_recording().await;

    // Then: First succeeds, second is PAUSE_ERROR, one Paused event, one device pause
    assert!(first.is_ok());
    let err = second.unwrap_err();
    assert!(matches!(err, RecorderError::NotActive { .. }));
    assert_eq!(err.code(), ErrorCode::PauseError);
    assert_eq!(h.drain_statuses(), vec![RecordingStatus::Paused]);
    assert_eq!(h.device.count("pause"), 1);
    assert_eq!(h.handle.state().await.unwrap(), RecordingState::Paused);
}

/// WHAT: Resume while recording is rejected
/// WHY: Resume only applies to a paused session
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_recording_when_resuming_then_resume_error() {
    // Given: A running session
    let mut h = Harness::spawn();
    h.handle.start_recording(60.0, None, None).await.unwrap();
    h.drain();

    // When: Resuming
    let err = h.handle.resume_recording().await.unwrap_err();

    // Then: RESUME_ERROR, no device call, no event
    assert_eq!(err.code(), ErrorCode::ResumeError);
    assert_eq!(h.device.count("resume"), 0);
    assert!(h.drain().is_empty());
}

/// WHAT: Pause and resume while idle are rejected
/// WHY: State-conflict errors apply to every command
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_idle_when_pausing_or_resuming_then_not_active() {
    // Given: An idle controller
    let h = Harness::spawn();

    // When / Then: Both rejected with their own codes
    assert_eq!(
        h.handle.pause_recording().await.unwrap_err().code(),
        ErrorCode::PauseError
    );
    assert_eq!(
        h.handle.resume_recording().await.unwrap_err().code(),
        ErrorCode::ResumeError
    );
    assert_eq!(h.handle.state().await.unwrap(), RecordingState::Idle);
}

/// WHAT: Device pause failure leaves the session recording
/// WHY: A rejected pause must not claim a transition that did not happen
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_device_rejects_pause_when_pausing_then_pause_error_and_still_recording() {
    // Given: A running session on a device that fails pause
    let mut h = Harness::spawn();
    h.handle.start_recording(60.0, None, None).await.unwrap();
    h.drain();
    h.device.fail_on("pause");

    // When: Pausing
    let err = h.handle.pause_recording().await.unwrap_err();

    // Then: PAUSE_ERROR, state unchanged, no event
    assert!(matches!(err, RecorderError::PauseFailed { .. }));
    assert_eq!(h.handle.state().await.unwrap(), RecordingState::Recording);
    assert!(h.drain().is_empty());
}

/// WHAT: Device stop failure rolls back to idle
/// WHY: A broken session must still release focus and leave foreground
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_device_rejects_stop_when_stopping_then_stop_error_and_rolled_back_to_idle() {
    // Given: A running session on a device that fails stop
    let mut h = Harness::spawn();
    let path = h.handle.start_recording(60.0, None, None).await.unwrap();
    h.drain();
    h.device.fail_on("stop");

    // When: Stopping
    let err = h.handle.stop_recording().await.unwrap_err();

    // Then: STOP_ERROR, Idle, focus released, Interrupted carries the path
    assert!(matches!(err, RecorderError::CaptureStopFailed { .. }));
    assert_eq!(err.code(), ErrorCode::StopError);
    assert_eq!(h.handle.state().await.unwrap(), RecordingState::Idle);
    assert_eq!(h.arbiter.held(), 0);
    assert_eq!(h.device.count("release"), 1);

    let events = h.drain();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].status, RecordingStatus::Interrupted);
    assert_eq!(events[0].file_path, Some(path));
    assert!(h.presenter.calls().contains(&PresenterCall::ExitForeground));
}

/// WHAT: Presenter failures do not affect commands
/// WHY: Notifications are not part of the recording contract
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_failing_presenter_when_recording_then_commands_still_succeed() {
    // Given: A presenter that fails every call
    let mut h = Harness::spawn();
    h.presenter.fail_all();

    // When: Running a session
    h.handle.start_recording(60.0, None, None).await.unwrap();
    h.handle.stop_recording().await.unwrap();

    // Then: Both succeed and events were emitted
    assert_eq!(
        h.drain_statuses(),
        vec![RecordingStatus::Started, RecordingStatus::Stopped]
    );
    assert!(!h.presenter.calls().is_empty());
}

/// WHAT: A panicking presenter is contained
/// WHY: Presentation must never roll back or fail a command
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_panicking_presenter_when_starting_then_start_succeeds() {
    // Given: A presenter that panics on every call
    let h = Harness::spawn();
    h.presenter.panic_all();

    // When: Starting
    let result = h.handle.start_recording(60.0, None, None).await;

    // Then: Start succeeds and the controller keeps running
    assert!(result.is_ok());
    assert_eq!(h.handle.state().await.unwrap(), RecordingState::Recording);
}

/// WHAT: Started carries the full recording time as time remaining
/// WHY: The application shows the countdown from the first event
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_limit_when_starting_then_started_event_carries_time_remaining() {
    // Given: An idle controller
    let mut h = Harness::spawn();

    // When: start(45)
    h.handle.start_recording(45.0, None, None).await.unwrap();

    // Then: Started with timeRemaining 45
    let events = h.drain();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].status, RecordingStatus::Started);
    assert_eq!(events[0].time_remaining, Some(45.0));
    assert_eq!(events[0].file_path, None);
}

/// WHAT: Consecutive sessions get distinct files
/// WHY: Output names must never collide
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_back_to_back_sessions_when_starting_then_paths_differ() {
    // Given: An idle controller
    let h = Harness::spawn();

    // When: Two sessions run back to back
    let first = h.handle.start_recording(60.0, None, None).await.unwrap();
    h.handle.stop_recording().await.unwrap();
    let second = h.handle.start_recording(60.0, None, None).await.unwrap();

    // Then: Paths differ
    assert_ne!(first, second);
}

/// WHAT: Shutdown finalizes an active session
/// WHY: Focus and the file must not be leaked when the controller goes away
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_recording_when_shutting_down_then_session_finalized_and_handle_unavailable() {
    // Given: A running session
    let mut h = Harness::spawn();
    let path = h.handle.start_recording(60.0, None, None).await.unwrap();
    h.drain();

    // When: Shutting down
    h.handle.shutdown().await.unwrap();

    // Then: Stopped with the file, focus released, later calls fail
    let events = h.drain();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].status, RecordingStatus::Stopped);
    assert_eq!(events[0].file_path, Some(path));
    assert_eq!(h.arbiter.held(), 0);

    let err = h.handle.state().await.unwrap_err();
    assert!(matches!(err, RecorderError::ControllerUnavailable { .. }));
}

/// WHAT: A time limit beyond the clock's range starts a session without a timer
/// WHY: Any finite positive limit is valid input and must not take the controller down
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_huge_limit_when_starting_then_session_runs_and_controller_alive() {
    // Given: An idle controller
    let mut h = Harness::spawn();

    // When: Starting with a limit no Instant can reach
    let path = h
        .handle
        .start_recording(1.0e19, Some(true), Some(10.0))
        .await
        .unwrap();

    // Then: The session runs and every command still works
    assert_eq!(h.handle.state().await.unwrap(), RecordingState::Recording);
    h.handle.pause_recording().await.unwrap();
    h.handle.resume_recording().await.unwrap();
    assert_eq!(h.handle.stop_recording().await.unwrap(), path);
    assert_eq!(h.handle.state().await.unwrap(), RecordingState::Idle);
    assert_eq!(h.arbiter.held(), 0);
    assert_eq!(
        h.drain_statuses(),
        vec![
            RecordingStatus::Started,
            RecordingStatus::Paused,
            RecordingStatus::Resumed,
            RecordingStatus::Stopped
        ]
    );
}

/// WHAT: An arbiter that panics while releasing focus does not stop teardown
/// WHY: Focus release is a collaborator call like any other and must not crash the controller
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_arbiter_panics_on_abandon_when_stopping_then_idle_and_controller_alive() {
    // Given: A running session whose arbiter panics on abandon
    let mut h = Harness::spawn();
    let path = h.handle.start_recording(60.0, None, None).await.unwrap();
    h.drain();
    h.arbiter.panic_on_abandon();

    // When: Stopping
    let stopped = h.handle.stop_recording().await.unwrap();

    // Then: File finalized, device released, foreground exited, Idle with one Stopped
    assert_eq!(stopped, path);
    assert_eq!(h.device.count("stop"), 1);
    assert_eq!(h.device.count("release"), 1);
    assert!(h.presenter.calls().contains(&PresenterCall::ExitForeground));
    assert_eq!(h.drain_statuses(), vec![RecordingStatus::Stopped]);

    // Then: The controller keeps serving commands
    assert_eq!(h.handle.state().await.unwrap(), RecordingState::Idle);
    h.handle.start_recording(60.0, None, None).await.unwrap();
    assert_eq!(h.handle.state().await.unwrap(), RecordingState::Recording);
}

/// WHAT: An arbiter that panics while releasing focus during start rollback
/// WHY: The start error must still be reported and the controller must survive
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_arbiter_panics_on_abandon_when_start_fails_then_start_error_and_controller_alive() {
    // Given: A device whose start fails and an arbiter that panics on abandon
    let h = Harness::spawn();
    h.device.fail_on("start");
    h.arbiter.panic_on_abandon();

    // When: Starting
    let err = h.handle.start_recording(60.0, None, None).await.unwrap_err();

    // Then: START_ERROR, no file left, controller still answers
    assert!(matches!(err, RecorderError::CaptureStartFailed { .. }));
    assert!(h.files().is_empty());
    assert_eq!(h.handle.state().await.unwrap(), RecordingState::Idle);
}
