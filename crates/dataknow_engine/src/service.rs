use std::sync::mpsc;

use bytes::Bytes;

use crate::{AnalysisRequest, ArtifactRef, EngineEvent, JobHandle, ServiceError, StatusReport};

/// Remote analysis backend: job submission, status, custom generation and artifacts.
#[async_trait::async_trait]
pub trait AnalysisService: Send + Sync {
    async fn start_analysis(&self, request: &AnalysisRequest) -> Result<JobHandle, ServiceError>;

    async fn job_status(&self, job: &JobHandle) -> Result<StatusReport, ServiceError>;

    async fn generate_custom(&self, prompt: &str) -> Result<ArtifactRef, ServiceError>;

    async fn fetch_artifact(&self, artifact: &ArtifactRef) -> Result<Bytes, ServiceError>;
}

/// Receives events produced by engine tasks.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

pub struct ChannelEventSink {
    tx: mpsc::Sender<EngineEvent>,
}

impl ChannelEventSink {
    pub fn new(tx: mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl EventSink for ChannelEventSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}
