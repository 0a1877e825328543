//! In-process stand-in for the analysis service.
//!
//! Jobs finish after a fixed processing delay with templated summaries, and the
//! consolidated artifact is a plain-text rendering of those summaries.

use std::collections::HashMap;
use std::fmt::Write as _;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use bytes::Bytes;
use dataknow_logging::dk_debug;
use tokio::time::Instant;

use crate::{
    AnalysisRequest, AnalysisService, ArtifactRef, DocumentPayload, FailureKind, JobHandle,
    RemoteStatus, ServiceError, StatusReport, SummarizedDocument,
};

/// Name of the consolidated artifact every simulated job produces.
pub const CONSOLIDATED_ARTIFACT: &str = "documento-consolidado.pdf";

#[derive(Debug, Clone, Copy)]
pub struct SimulationSettings {
    pub processing_delay: Duration,
    pub generation_delay: Duration,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            processing_delay: Duration::from_secs(4),
            generation_delay: Duration::from_secs(3),
        }
    }
}

#[derive(Debug)]
struct SimulatedJob {
    ready_at: Instant,
    request: AnalysisRequest,
}

#[derive(Debug, Default)]
pub struct SimulatedAnalysisService {
    settings: SimulationSettings,
    next_id: AtomicU64,
    jobs: Mutex<HashMap<JobHandle, SimulatedJob>>,
    artifacts: Mutex<HashMap<ArtifactRef, String>>,
}

impl SimulatedAnalysisService {
    pub fn new(settings: SimulationSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed) + 1
    }

    fn store_artifact(&self, artifact: &ArtifactRef, content: String) {
        if let Ok(mut artifacts) = self.artifacts.lock() {
            artifacts.insert(artifact.clone(), content);
        }
    }
}

#[async_trait::async_trait]
impl AnalysisService for SimulatedAnalysisService {
    async fn start_analysis(&self, request: &AnalysisRequest) -> Result<JobHandle, ServiceError> {
        let job = JobHandle(format!("sim-{}", self.next_id()));
        let entry = SimulatedJob {
            ready_at: Instant::now() + self.settings.processing_delay,
            request: request.clone(),
        };
        self.jobs
            .lock()
            .map_err(|_| ServiceError::new(FailureKind::Network, "simulator state poisoned"))?
            .insert(job.clone(), entry);
        dk_debug!("Simulated job {} accepted {} document(s)", job, request.documents.len());
        Ok(job)
    }

    async fn job_status(&self, job: &JobHandle) -> Result<StatusReport, ServiceError> {
        let request = {
            let mut jobs = self
                .jobs
                .lock()
                .map_err(|_| ServiceError::new(FailureKind::Network, "simulator state poisoned"))?;
            let entry = jobs
                .get(job)
                .ok_or_else(|| ServiceError::new(FailureKind::NotFound, format!("job {job}")))?;
            if Instant::now() < entry.ready_at {
                return Ok(StatusReport {
                    status: RemoteStatus::Processing,
                    ..StatusReport::default()
                });
            }
            // Completion is reported once; the artifact outlives the job.
            jobs.remove(job).map(|entry| entry.request)
        }
        .ok_or_else(|| ServiceError::new(FailureKind::NotFound, format!("job {job}")))?;

        let documents: Vec<SummarizedDocument> = request
            .documents
            .iter()
            .map(|doc| SummarizedDocument {
                id: doc.id,
                summary: summary_for(doc, &request.language),
            })
            .collect();
        let artifact = ArtifactRef(CONSOLIDATED_ARTIFACT.to_string());
        self.store_artifact(&artifact, consolidated_report(&request, &documents));
        Ok(StatusReport {
            status: RemoteStatus::Completed,
            documents,
            artifact_ref: Some(artifact),
            error: None,
        })
    }

    async fn generate_custom(&self, prompt: &str) -> Result<ArtifactRef, ServiceError> {
        tokio::time::sleep(self.settings.generation_delay).await;
        let artifact = ArtifactRef(format!("custom-analysis-{}.pdf", self.next_id()));
        self.store_artifact(&artifact, format!("Custom analysis\n\nPrompt: {prompt}\n"));
        Ok(artifact)
    }

    async fn fetch_artifact(&self, artifact: &ArtifactRef) -> Result<Bytes, ServiceError> {
        let artifacts = self
            .artifacts
            .lock()
            .map_err(|_| ServiceError::new(FailureKind::Network, "simulator state poisoned"))?;
        artifacts
            .get(artifact)
            .map(|content| Bytes::from(content.clone().into_bytes()))
            .ok_or_else(|| ServiceError::new(FailureKind::NotFound, format!("artifact {artifact}")))
    }
}

fn summary_for(doc: &DocumentPayload, language: &str) -> String {
    if language == "es" {
        let category = if doc.category == "scientific" {
            "científico"
        } else {
            "general"
        };
        format!(
            "Resumen generado por IA para {}. Este documento {} ha sido procesado mediante \
             algoritmos de IA avanzada, extrayendo insights clave y patrones relevantes.",
            doc.name, category
        )
    } else {
        format!(
            "AI-generated summary for {}. This {} document has been processed using advanced \
             AI algorithms, extracting key insights and relevant patterns.",
            doc.name, doc.category
        )
    }
}

fn consolidated_report(request: &AnalysisRequest, documents: &[SummarizedDocument]) -> String {
    let mut report = String::from("Consolidated analysis\n");
    for (payload, summarized) in request.documents.iter().zip(documents) {
        let _ = write!(
            report,
            "\n## {} ({}, {})\n{}\n",
            payload.name, payload.category, payload.size_label, summarized.summary
        );
    }
    report
}
