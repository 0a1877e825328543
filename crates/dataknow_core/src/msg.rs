use std::path::PathBuf;

use chrono::{DateTime, Utc};

use crate::{
    ActiveTab, ArtifactRef, CandidateFile, DocumentId, JobId, JobReport, NoticeId, RequestId,
    SubmissionId,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User dropped or picked files.
    FilesReceived {
        files: Vec<CandidateFile>,
        received_at: DateTime<Utc>,
    },
    /// User removed a document from the list.
    RemoveDocument(DocumentId),
    /// One simulated upload tick for a document.
    UploadTick(DocumentId),
    /// Progress callback from a real transfer.
    UploadProgressed { id: DocumentId, percent: u8 },
    /// Transport failure for an upload.
    UploadFailed { id: DocumentId, reason: String },
    /// The delay between processing and completed elapsed.
    PromotionDue(DocumentId),
    /// The rejection notice lifetime elapsed.
    NoticeExpired(NoticeId),
    /// User switched tabs.
    TabSelected(ActiveTab),
    /// User clicked "start analysis".
    AnalyzeClicked,
    /// The remote service accepted a submission.
    AnalysisStarted {
        submission: SubmissionId,
        job_id: JobId,
    },
    /// The start call failed.
    SubmissionFailed {
        submission: SubmissionId,
        message: String,
    },
    /// One status answer for a job.
    JobStatusReceived { job_id: JobId, report: JobReport },
    /// A status query failed at the transport level.
    PollingFailed { job_id: JobId, message: String },
    /// The poller gave up after its attempt budget.
    PollingExhausted { job_id: JobId, attempts: u32 },
    /// User asked for the consolidated artifact.
    DownloadConsolidatedClicked,
    /// User opened or closed the custom analysis panel.
    CustomPanelToggled,
    /// User edited the custom analysis prompt.
    CustomPromptChanged(String),
    /// User clicked "generate" on the custom analysis panel.
    GenerateClicked,
    /// User aborted the running generation.
    CancelGeneration,
    /// The custom generation produced an artifact.
    CustomGenerated {
        request: RequestId,
        artifact: ArtifactRef,
    },
    /// The custom generation failed.
    CustomGenerationFailed { request: RequestId, message: String },
    /// An artifact was written to disk.
    ArtifactSaved { artifact: ArtifactRef, path: PathBuf },
    /// An artifact could not be fetched or written.
    ArtifactDownloadFailed {
        artifact: ArtifactRef,
        message: String,
    },
    /// The consuming view is going away.
    Shutdown,
    /// UI/render tick to coalesce rendering.
    Tick,
    /// Fallback for placeholder wiring.
    NoOp,
}
