use std::path::PathBuf;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use dataknow_logging::{dk_debug, dk_error, dk_info};
use tokio::runtime::Runtime;

use crate::filename::artifact_filename;
use crate::persist::AtomicFileWriter;
use crate::poller::{poll_job, PollSettings};
use crate::tasks::TaskSet;
use crate::timers::{fire_after, run_upload_ticker};
use crate::{
    AnalysisRequest, AnalysisService, ArtifactRef, ChannelEventSink, EngineEvent, EventSink,
    JobHandle, TimerKey,
};

pub struct EngineConfig {
    pub service: Arc<dyn AnalysisService>,
    pub output_dir: PathBuf,
}

enum EngineCommand {
    StartUploadTicker { document: u64, period: Duration },
    CancelUploadTicker { document: u64 },
    Schedule { key: TimerKey, delay: Duration },
    CancelDocument { document: u64 },
    SubmitAnalysis { submission: u64, request: AnalysisRequest },
    StartPolling { job: JobHandle, settings: PollSettings },
    GenerateCustom { request: u64, prompt: String },
    CancelCustom { request: u64 },
    DownloadArtifact { artifact: ArtifactRef },
    Teardown,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum TaskKey {
    Ticker(u64),
    Timer(TimerKey),
    Submission(u64),
    Poll(JobHandle),
    Custom(u64),
    Download(u64),
}

/// Command side of the engine. Dropping it stops the engine thread and every task.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
}

/// Event side of the engine, usually moved to a forwarding thread.
pub struct EngineEvents {
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    pub fn new(config: EngineConfig) -> (Self, EngineEvents) {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let sink: Arc<dyn EventSink> = Arc::new(ChannelEventSink::new(event_tx));

        thread::spawn(move || {
            let runtime = match tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()
            {
                Ok(runtime) => runtime,
                Err(err) => {
                    dk_error!("Could not start the engine runtime: {}", err);
                    return;
                }
            };
            let mut worker = Worker {
                runtime,
                tasks: TaskSet::new(),
                service: config.service,
                writer: AtomicFileWriter::new(config.output_dir),
                sink,
                downloads: 0,
            };
            while let Ok(command) = cmd_rx.recv() {
                worker.handle(command);
            }
            let cancelled = worker.tasks.cancel_all();
            dk_debug!("Engine stopped, {} task(s) cancelled", cancelled);
        });

        (Self { cmd_tx }, EngineEvents { event_rx })
    }

    pub fn start_upload_ticker(&self, document: u64, period: Duration) {
        self.send(EngineCommand::StartUploadTicker { document, period });
    }

    pub fn cancel_upload_ticker(&self, document: u64) {
        self.send(EngineCommand::CancelUploadTicker { document });
    }

    pub fn schedule(&self, key: TimerKey, delay: Duration) {
        self.send(EngineCommand::Schedule { key, delay });
    }

    /// Stops the ticker and any pending promotion for a document.
    pub fn cancel_document(&self, document: u64) {
        self.send(EngineCommand::CancelDocument { document });
    }

    pub fn submit_analysis(&self, submission: u64, request: AnalysisRequest) {
        self.send(EngineCommand::SubmitAnalysis {
            submission,
            request,
        });
    }

    pub fn start_polling(&self, job: JobHandle, settings: PollSettings) {
        self.send(EngineCommand::StartPolling { job, settings });
    }

    pub fn generate_custom(&self, request: u64, prompt: impl Into<String>) {
        self.send(EngineCommand::GenerateCustom {
            request,
            prompt: prompt.into(),
        });
    }

    pub fn cancel_custom(&self, request: u64) {
        self.send(EngineCommand::CancelCustom { request });
    }

    pub fn download_artifact(&self, artifact: ArtifactRef) {
        self.send(EngineCommand::DownloadArtifact { artifact });
    }

    /// Cancels every ticker, timer, poller, generation and download.
    pub fn teardown(&self) {
        self.send(EngineCommand::Teardown);
    }

    fn send(&self, command: EngineCommand) {
        let _ = self.cmd_tx.send(command);
    }
}

impl EngineEvents {
    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv(&self) -> Option<EngineEvent> {
        self.event_rx.recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }
}

struct Worker {
    runtime: Runtime,
    tasks: TaskSet<TaskKey>,
    service: Arc<dyn AnalysisService>,
    writer: AtomicFileWriter,
    sink: Arc<dyn EventSink>,
    downloads: u64,
}

impl Worker {
    fn handle(&mut self, command: EngineCommand) {
        match command {
            EngineCommand::StartUploadTicker { document, period } => {
                let sink = self.sink.clone();
                let handle = self.runtime.spawn(async move {
                    run_upload_ticker(document, period, sink.as_ref()).await;
                });
                self.tasks.insert(TaskKey::Ticker(document), handle);
            }
            EngineCommand::CancelUploadTicker { document } => {
                self.tasks.cancel(&TaskKey::Ticker(document));
            }
            EngineCommand::Schedule { key, delay } => {
                let sink = self.sink.clone();
                let handle = self.runtime.spawn(async move {
                    fire_after(key, delay, sink.as_ref()).await;
                });
                self.tasks.insert(TaskKey::Timer(key), handle);
            }
            EngineCommand::CancelDocument { document } => {
                let cancelled = self.tasks.cancel_where(|key| match key {
                    TaskKey::Ticker(id) => *id == document,
                    TaskKey::Timer(TimerKey::Promotion { document: id }) => *id == document,
                    _ => false,
                });
                dk_debug!("Cancelled {} task(s) for document {}", cancelled, document);
            }
            EngineCommand::SubmitAnalysis {
                submission,
                request,
            } => {
                let service = self.service.clone();
                let sink = self.sink.clone();
                let handle = self.runtime.spawn(async move {
                    let event = match service.start_analysis(&request).await {
                        Ok(job) => EngineEvent::AnalysisStarted { submission, job },
                        Err(error) => EngineEvent::SubmissionFailed { submission, error },
                    };
                    sink.emit(event);
                });
                self.tasks.insert(TaskKey::Submission(submission), handle);
            }
            EngineCommand::StartPolling { job, settings } => {
                let service = self.service.clone();
                let sink = self.sink.clone();
                let polled = job.clone();
                let handle = self.runtime.spawn(async move {
                    let outcome =
                        poll_job(service.as_ref(), &polled, settings, sink.as_ref()).await;
                    dk_info!("Polling for job {} ended: {:?}", polled, outcome);
                });
                self.tasks.insert(TaskKey::Poll(job), handle);
            }
            EngineCommand::GenerateCustom { request, prompt } => {
                let service = self.service.clone();
                let sink = self.sink.clone();
                let handle = self.runtime.spawn(async move {
                    let event = match service.generate_custom(&prompt).await {
                        Ok(artifact) => EngineEvent::CustomGenerated { request, artifact },
                        Err(error) => EngineEvent::CustomFailed { request, error },
                    };
                    sink.emit(event);
                });
                self.tasks.insert(TaskKey::Custom(request), handle);
            }
            EngineCommand::CancelCustom { request } => {
                self.tasks.cancel(&TaskKey::Custom(request));
            }
            EngineCommand::DownloadArtifact { artifact } => {
                self.downloads += 1;
                let service = self.service.clone();
                let sink = self.sink.clone();
                let writer = self.writer.clone();
                let handle = self.runtime.spawn(async move {
                    sink.emit(download(service.as_ref(), writer, artifact).await);
                });
                self.tasks.insert(TaskKey::Download(self.downloads), handle);
            }
            EngineCommand::Teardown => {
                let cancelled = self.tasks.cancel_all();
                dk_info!("Teardown cancelled {} task(s)", cancelled);
            }
        }
    }
}

/// Fetches an artifact and writes it under a deterministic name in the output directory.
async fn download(
    service: &dyn AnalysisService,
    writer: AtomicFileWriter,
    artifact: ArtifactRef,
) -> EngineEvent {
    let bytes = match service.fetch_artifact(&artifact).await {
        Ok(bytes) => bytes,
        Err(error) => {
            return EngineEvent::ArtifactFailed {
                artifact,
                message: error.to_string(),
            }
        }
    };
    let filename = artifact_filename(&artifact.0);
    let written = tokio::task::spawn_blocking(move || writer.write(&filename, &bytes)).await;
    match written {
        Ok(Ok(path)) => EngineEvent::ArtifactSaved { artifact, path },
        Ok(Err(err)) => EngineEvent::ArtifactFailed {
            artifact,
            message: err.to_string(),
        },
        Err(err) => EngineEvent::ArtifactFailed {
            artifact,
            message: err.to_string(),
        },
    }
}
