//! DataKnow engine: timers, remote analysis service and artifact downloads.
mod engine;
mod filename;
mod http;
mod persist;
mod poller;
mod service;
mod simulated;
mod tasks;
mod timers;
mod types;

pub use engine::{EngineConfig, EngineEvents, EngineHandle};
pub use filename::artifact_filename;
pub use http::{ReqwestAnalysisService, ServiceSettings};
pub use persist::{ensure_output_dir, AtomicFileWriter, PersistError};
pub use poller::{poll_job, PollOutcome, PollSettings};
pub use service::{AnalysisService, ChannelEventSink, EventSink};
pub use simulated::{SimulatedAnalysisService, SimulationSettings, CONSOLIDATED_ARTIFACT};
pub use tasks::TaskSet;
pub use timers::{fire_after, run_upload_ticker};
pub use types::{
    AnalysisRequest, ArtifactRef, DocumentPayload, EngineEvent, FailureKind, JobHandle,
    RemoteStatus, ServiceError, StatusReport, SummarizedDocument, TimerKey,
};
