use crate::{CaptureDevice, CoreResult, RecorderError};

use std::{
    fs::File,
    io::BufWriter,
    panic::Location,
    path::{Path, PathBuf},
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, Ordering},
        mpsc,
    },
    thread::JoinHandle,
};

use cpal::{
    Device, FromSample, Sample, SampleFormat, SizedSample, Stream, StreamConfig,
    traits::{DeviceTrait, HostTrait, StreamTrait},
};
use error_location::ErrorLocation;
use hound::{WavSpec, WavWriter};
use tracing::{debug, error, info, instrument, warn};

/// Every recording is written as 16-bit signed PCM.
pub(crate) const BITS_PER_SAMPLE: u16 = 16;

type SharedWriter = Arc<Mutex<Option<WavWriter<BufWriter<File>>>>>;

enum WorkerOp {
    Start,
    Pause,
    Resume,
    Stop,
    Release,
}

struct WorkerRequest {
    op: WorkerOp,
    reply: mpsc::Sender<Result<(), String>>,
}

/// Microphone capture through CPAL, encoded to WAV with hound.
///
/// The CPAL stream is created and dropped on a dedicated worker thread for
/// each session. `cpal::Stream` is not `Send` on every backend, so it never
/// leaves that thread; the device talks to it over a channel.
pub struct CpalCaptureDevice {
    selected_device: Option<String>,
    worker: Option<Worker>,
}

struct Worker {
    requests: mpsc::Sender<WorkerRequest>,
    handle: JoinHandle<()>,
    output_path: PathBuf,
}

impl CpalCaptureDevice {
    /// Creates a device bound to the named input, or the host default.
    ///
    /// The device is opened lazily in [`CaptureDevice::prepare`] so that a
    /// missing microphone surfaces as a start failure, not a construction
    /// failure.
    pub fn new(selected_device: Option<String>) -> Self {
        Self {
            selected_device,
            worker: None,
        }
    }

    #[track_caller]
    fn send(&self, op: WorkerOp) -> CoreResult<()> {
        let worker = self.worker.as_ref().ok_or_else(|| RecorderError::CaptureDevice {
            reason: "Capture device is not prepared".to_string(),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let (reply_tx, reply_rx) = mpsc::channel();
        worker
            .requests
            .send(WorkerRequest { op, reply: reply_tx })
            .map_err(|_| RecorderError::CaptureDevice {
                reason: "Capture worker has exited".to_string(),
                location: ErrorLocation::from(Location::caller()),
            })?;

        reply_rx
            .recv()
            .map_err(|_| RecorderError::CaptureDevice {
                reason: "Capture worker exited before replying".to_string(),
                location: ErrorLocation::from(Location::caller()),
            })?
            .map_err(|reason| RecorderError::CaptureDevice {
                reason,
                location: ErrorLocation::from(Location::caller()),
            })
    }
}

impl CaptureDevice for CpalCaptureDevice {
    #[track_caller]
    #[instrument(skip(self))]
    fn prepare(&mut self, output_path: &Path) -> CoreResult<()> {
        if self.worker.is_some() {
            return Err(RecorderError::CaptureDevice {
                reason: "Capture device is already prepared".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let (request_tx, request_rx) = mpsc::channel();
        let (ready_tx, ready_rx) = mpsc::channel();
        let path = output_path.to_path_buf();
        let selected = self.selected_device.clone();

        let handle = std::thread::Builder::new()
            .name("audio-capture".to_string())
            .spawn(move || run_worker(selected, path, request_rx, ready_tx))
            .map_err(|e| RecorderError::CaptureDevice {
                reason: format!("Failed to spawn capture thread: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        let ready = ready_rx.recv().unwrap_or_else(|_| {
            Err("Capture thread exited during preparation".to_string())
        });

        if let Err(reason) = ready {
            if handle.join().is_err() {
                error!("Capture thread panicked during preparation");
            }
            return Err(RecorderError::CaptureDevice {
                reason,
                location: ErrorLocation::from(Location::caller()),
            });
        }

        self.worker = Some(Worker {
            requests: request_tx,
            handle,
            output_path: output_path.to_path_buf(),
        });

        debug!(output_path = ?output_path, "Capture device prepared");

        Ok(())
    }

    #[track_caller]
    #[instrument(skip(self))]
    fn start(&mut self) -> CoreResult<()> {
        self.send(WorkerOp::Start)
    }

    #[track_caller]
    #[instrument(skip(self))]
    fn pause(&mut self) -> CoreResult<()> {
        self.send(WorkerOp::Pause)
    }

    #[track_caller]
    #[instrument(skip(self))]
    fn resume(&mut self) -> CoreResult<()> {
        self.send(WorkerOp::Resume)
    }

    #[track_caller]
    #[instrument(skip(self))]
    fn stop(&mut self) -> CoreResult<()> {
        self.send(WorkerOp::Stop)
    }

    #[track_caller]
    #[instrument(skip(self))]
    fn release(&mut self) -> CoreResult<()> {
        let Some(worker) = self.worker.take() else {
            return Ok(());
        };

        let (reply_tx, _reply_rx) = mpsc::channel();
        // The worker may already have exited after a stop; a closed channel
        // is the expected outcome then.
        let _ = worker.requests.send(WorkerRequest {
            op: WorkerOp::Release,
            reply: reply_tx,
        });
        drop(worker.requests);

        worker.handle.join().map_err(|_| RecorderError::CaptureDevice {
            reason: "Capture thread panicked".to_string(),
            location: ErrorLocation::from(Location::caller()),
        })?;

        info!(output_path = ?worker.output_path, "Capture device released");

        Ok(())
    }
}

impl Drop for CpalCaptureDevice {
    fn drop(&mut self) {
        if let Err(e) = self.release() {
            warn!(error = ?e, "Failed to release capture device on drop");
        }
    }
}

/// Body of the capture thread. Owns the stream and the WAV writer.
fn run_worker(
    selected_device: Option<String>,
    output_path: PathBuf,
    requests: mpsc::Receiver<WorkerRequest>,
    ready: mpsc::Sender<Result<(), String>>,
) {
    let paused = Arc::new(AtomicBool::new(false));
    let shutdown = Arc::new(AtomicBool::new(false));

    let opened = open_input(selected_device.as_deref()).and_then(|(device, config, format)| {
        let spec = WavSpec {
            channels: config.channels,
            sample_rate: config.sample_rate,
            bits_per_sample: BITS_PER_SAMPLE,
            sample_format: hound::SampleFormat::Int,
        };
        let writer = WavWriter::create(&output_path, spec)
            .map_err(|e| format!("Failed to create output file: {}", e))?;
        let writer: SharedWriter = Arc::new(Mutex::new(Some(writer)));

        let stream = build_stream(
            &device,
            &config,
            format,
            Arc::clone(&writer),
            Arc::clone(&paused),
            Arc::clone(&shutdown),
        )?;

        info!(
            output_path = ?output_path,
            sample_rate = config.sample_rate,
            channels = config.channels,
            "Capture stream built"
        );

        Ok((stream, writer))
    });

    let (stream, writer) = match opened {
        Ok(parts) => {
            let _ = ready.send(Ok(()));
            parts
        }
        Err(reason) => {
            let _ = ready.send(Err(reason));
            return;
        }
    };

    let mut stream = Some(stream);

    while let Ok(WorkerRequest { op, reply }) = requests.recv() {
        let result = match op {
            WorkerOp::Start => match &stream {
                Some(s) => s.play().map_err(|e| format!("Failed to start stream: {}", e)),
                None => Err("Capture already stopped".to_string()),
            },
            WorkerOp::Pause => match &stream {
                Some(s) => {
                    paused.store(true, Ordering::Release);
                    s.pause().map_err(|e| format!("Failed to pause stream: {}", e))
                }
                None => Err("Capture already stopped".to_string()),
            },
            WorkerOp::Resume => match &stream {
                Some(s) => {
                    paused.store(false, Ordering::Release);
                    s.play().map_err(|e| format!("Failed to resume stream: {}", e))
                }
                None => Err("Capture already stopped".to_string()),
            },
            WorkerOp::Stop => {
                shutdown.store(true, Ordering::Release);
                drop(stream.take());
                finalize(&writer)
            }
            WorkerOp::Release => {
                shutdown.store(true, Ordering::Release);
                drop(stream.take());
                // A session torn down without a successful stop still gets
                // a readable header.
                let result = finalize(&writer);
                let _ = reply.send(result);
                break;
            }
        };

        let _ = reply.send(result);
    }

    shutdown.store(true, Ordering::Release);
    drop(stream);
    if let Err(reason) = finalize(&writer) {
        warn!(reason = %reason, "Failed to finalize recording on capture thread exit");
    }
    debug!("Capture thread exiting");
}

fn open_input(selected: Option<&str>) -> Result<(Device, StreamConfig, SampleFormat), String> {
    let host = cpal::default_host();

    let device = match selected {
        Some(name) => find_device(&host, name)?,
        None => host
            .default_input_device()
            .ok_or_else(|| "No microphone found".to_string())?,
    };

    let supported = device
        .default_input_config()
        .map_err(|e| format!("Failed to get config: {}", e))?;

    Ok((device, supported.config(), supported.sample_format()))
}

#[allow(deprecated)]
fn find_device(host: &cpal::Host, name: &str) -> Result<Device, String> {
    let mut devices = host
        .input_devices()
        .map_err(|e| format!("Failed to enumerate input devices: {}", e))?;

    devices
        .find(|d| d.name().map(|n| n == name).unwrap_or(false))
        .ok_or_else(|| format!("Input device not found: {}", name))
}

fn build_stream(
    device: &Device,
    config: &StreamConfig,
    format: SampleFormat,
    writer: SharedWriter,
    paused: Arc<AtomicBool>,
    shutdown: Arc<AtomicBool>,
) -> Result<Stream, String> {
    match format {
        SampleFormat::I16 => build_typed::<i16>(device, config, writer, paused, shutdown),
        SampleFormat::U16 => build_typed::<u16>(device, config, writer, paused, shutdown),
        SampleFormat::I32 => build_typed::<i32>(device, config, writer, paused, shutdown),
        SampleFormat::F32 => build_typed::<f32>(device, config, writer, paused, shutdown),
        other => Err(format!("Unsupported sample format: {:?}", other)),
    }
}

fn build_typed<T>(
    device: &Device,
    config: &StreamConfig,
    writer: SharedWriter,
    paused: Arc<AtomicBool>,
    shutdown: Arc<AtomicBool>,
) -> Result<Stream, String>
where
    T: SizedSample + Send + 'static,
    i16: FromSample<T>,
{
    device
        .build_input_stream(
            config,
            move |data: &[T], _: &cpal::InputCallbackInfo| {
                if shutdown.load(Ordering::Acquire) || paused.load(Ordering::Acquire) {
                    return;
                }
                let mut guard = writer.lock().unwrap_or_else(|e| {
                    error!("WAV writer lock poisoned, recovering: {}", e);
                    e.into_inner()
                });
                if let Some(w) = guard.as_mut() {
                    for &sample in data {
                        if let Err(e) = w.write_sample(i16::from_sample(sample)) {
                            error!("Failed to write sample: {}", e);
                            break;
                        }
                    }
                }
            },
            |err| {
                error!("Audio stream error: {}", err);
            },
            None,
        )
        .map_err(|e| format!("Failed to build stream: {}", e))
}

fn finalize(writer: &SharedWriter) -> Result<(), String> {
    let taken = writer
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .take();

    match taken {
        Some(w) => w
            .finalize()
            .map_err(|e| format!("Failed to finalize recording: {}", e)),
        None => Ok(()),
    }
}
