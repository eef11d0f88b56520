//! Audio Recorder: console host for the recorder controller.
//!
//! Reads commands from stdin and prints responses and status events as JSON
//! lines on stdout. Logs go to stderr.

mod app;
mod config;
mod console_line;
mod desktop_notifier;
mod error;
mod host_command;

pub(crate) use {
    app::App,
    console_line::ConsoleLine,
    desktop_notifier::DesktopNotifier,
    error::{AppError, Result as AppResult},
    host_command::HostCommand,
};

use crate::config::Config;

use audio_recorder_core::{
    CpalCaptureDevice, LocalFocusArbiter, OutputStorage, RecorderBridge, RecorderController,
};
use tokio::io::{BufReader, stdin, stdout};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "audio_recorder=debug,audio_recorder_core=debug";

/// Application entry point.
#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to load config: {:?}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = run(config).await {
        error!(error = ?e, "App error");
        std::process::exit(1);
    }
}

async fn run(config: Config) -> AppResult<()> {
    let output_dir = config.storage.resolve_output_dir();
    match &output_dir {
        Some(dir) => info!(output_dir = ?dir, "Recordings directory"),
        None => warn!("No recordings directory available, every start will fail"),
    }

    let (arbiter, interruptions) = LocalFocusArbiter::new();

    let handle = RecorderController::spawn(
        CpalCaptureDevice::new(config.audio.selected_device.clone()),
        arbiter,
        DesktopNotifier::new(&config.notifications),
        OutputStorage::new(output_dir),
    );

    let app = App {
        bridge: RecorderBridge::new(handle),
        interruptions,
        recording: config.recording,
    };

    app.run(BufReader::new(stdin()), stdout()).await
}
