use std::time::Duration;

use crate::{ArtifactRef, Category, DocumentId, JobId, Language, NoticeId, RequestId, SubmissionId};

/// Side effects requested by `update`; executed outside the core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    StartUploadTicker {
        document: DocumentId,
        period: Duration,
    },
    CancelUploadTicker {
        document: DocumentId,
    },
    SchedulePromotion {
        document: DocumentId,
        delay: Duration,
    },
    /// Stops every timer still driving a removed or failed document.
    CancelDocumentTimers {
        document: DocumentId,
    },
    ScheduleNoticeExpiry {
        notice: NoticeId,
        delay: Duration,
    },
    SubmitAnalysis {
        submission: SubmissionId,
        documents: Vec<DocumentPayload>,
        language: Language,
    },
    StartPolling {
        job_id: JobId,
        interval: Duration,
        max_attempts: u32,
    },
    GenerateCustom {
        request: RequestId,
        prompt: String,
    },
    CancelCustomGeneration {
        request: RequestId,
    },
    DownloadArtifact {
        artifact: ArtifactRef,
    },
    /// Cancels every outstanding timer, poller and generation.
    Teardown,
}

/// What the analysis service receives for one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentPayload {
    pub id: DocumentId,
    pub name: String,
    pub category: Category,
    pub size_label: String,
}
