use std::fmt;

use crate::{Document, DocumentId};

/// Handle returned by the remote service when an analysis is started.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JobId(pub String);

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Local handle for one submission, issued before the remote call returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubmissionId(pub u64);

/// Local handle for one custom-analysis generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestId(pub u64);

/// Reference (URL or path) to a downloadable artifact.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArtifactRef(pub String);

impl fmt::Display for ArtifactRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JobStatus {
    #[default]
    Pending,
    Processing,
    Completed,
    Error,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Error)
    }
}

/// Summary text the service produced for one submitted document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentSummary {
    pub id: DocumentId,
    pub summary: String,
}

/// One status answer from the remote service.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct JobReport {
    pub status: JobStatus,
    pub documents: Vec<DocumentSummary>,
    pub artifact: Option<ArtifactRef>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisJob {
    pub(crate) submission: SubmissionId,
    pub(crate) job_id: Option<JobId>,
    pub(crate) status: JobStatus,
    pub(crate) result_documents: Vec<Document>,
    pub(crate) artifact: Option<ArtifactRef>,
    pub(crate) failure: Option<String>,
    pub(crate) polls: u32,
}

impl AnalysisJob {
    pub(crate) fn submitted(submission: SubmissionId) -> Self {
        Self {
            submission,
            job_id: None,
            status: JobStatus::Pending,
            result_documents: Vec::new(),
            artifact: None,
            failure: None,
            polls: 0,
        }
    }

    pub fn submission(&self) -> SubmissionId {
        self.submission
    }

    pub fn job_id(&self) -> Option<&JobId> {
        self.job_id.as_ref()
    }

    pub fn status(&self) -> JobStatus {
        self.status
    }

    pub fn result_documents(&self) -> &[Document] {
        &self.result_documents
    }

    pub fn artifact(&self) -> Option<&ArtifactRef> {
        self.artifact.as_ref()
    }

    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    pub fn polls(&self) -> u32 {
        self.polls
    }

    pub fn in_flight(&self) -> bool {
        !self.status.is_terminal()
    }

    /// True when `job_id` names this job and it still expects status reports.
    pub(crate) fn awaits_report(&self, job_id: &JobId) -> bool {
        self.in_flight() && self.job_id.as_ref() == Some(job_id)
    }

    pub(crate) fn fail(&mut self, message: impl Into<String>) {
        self.status = JobStatus::Error;
        self.failure = Some(message.into());
    }
}

/// State of the secondary, prompt-driven generation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CustomAnalysis {
    pub(crate) prompt: String,
    pub(crate) panel_visible: bool,
    pub(crate) request: Option<RequestId>,
    pub(crate) artifact: Option<ArtifactRef>,
    pub(crate) failure: Option<String>,
}

impl CustomAnalysis {
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn panel_visible(&self) -> bool {
        self.panel_visible
    }

    pub fn generating(&self) -> bool {
        self.request.is_some()
    }

    pub fn can_generate(&self) -> bool {
        !self.generating() && !self.prompt.trim().is_empty()
    }

    pub fn artifact(&self) -> Option<&ArtifactRef> {
        self.artifact.as_ref()
    }

    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }
}
