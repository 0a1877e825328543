use std::path::PathBuf;

use chrono::{DateTime, Utc};

use crate::limits::{Timings, PROCESSING_THRESHOLD};
use crate::validate::{validate, RejectionReason, ValidationReport};
use crate::view_model::AppViewModel;
use crate::{
    AnalysisJob, ArtifactRef, CandidateFile, CustomAnalysis, Document, DocumentId,
    DocumentRegistry, DocumentStatus, JobId, JobReport, JobStatus, RequestId, SubmissionId,
};

/// Language the remote service writes summaries in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Language {
    #[default]
    En,
    Es,
}

impl Language {
    pub fn code(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Es => "es",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActiveTab {
    #[default]
    Upload,
    Analysis,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NoticeId(pub u64);

/// Transient feedback for a rejected intake batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Notice {
    pub id: NoticeId,
    pub reason: RejectionReason,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadStatus {
    InProgress,
    Saved(PathBuf),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRecord {
    pub artifact: ArtifactRef,
    pub status: DownloadStatus,
}

/// Explicitly owned session state. Only `update` mutates it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    timings: Timings,
    language: Language,
    registry: DocumentRegistry,
    notice: Option<Notice>,
    job: Option<AnalysisJob>,
    custom: CustomAnalysis,
    active_tab: ActiveTab,
    downloads: Vec<DownloadRecord>,
    next_document: u64,
    next_submission: u64,
    next_request: u64,
    next_notice: u64,
    closed: bool,
    dirty: bool,
}

/// What the reducer needs to emit effects after a progress change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ProgressChange {
    Ignored,
    Advanced,
    ReachedProcessing,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(timings: Timings, language: Language) -> Self {
        Self {
            timings,
            language,
            ..Self::default()
        }
    }

    pub fn view(&self) -> AppViewModel {
        AppViewModel::from_state(self)
    }

    /// Returns whether anything changed since the last call, and resets the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn timings(&self) -> &Timings {
        &self.timings
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn registry(&self) -> &DocumentRegistry {
        &self.registry
    }

    pub fn notice(&self) -> Option<Notice> {
        self.notice
    }

    pub fn job(&self) -> Option<&AnalysisJob> {
        self.job.as_ref()
    }

    pub fn custom(&self) -> &CustomAnalysis {
        &self.custom
    }

    pub fn active_tab(&self) -> ActiveTab {
        self.active_tab
    }

    pub fn downloads(&self) -> &[DownloadRecord] {
        &self.downloads
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// A job has been submitted and has not reached a terminal status.
    pub fn is_analyzing(&self) -> bool {
        self.job.as_ref().is_some_and(AnalysisJob::in_flight)
    }

    pub fn can_analyze(&self) -> bool {
        !self.closed
            && !self.registry.is_empty()
            && !self.registry.any_uploading()
            && !self.is_analyzing()
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn close(&mut self) {
        self.closed = true;
        self.mark_dirty();
    }

    pub(crate) fn select_tab(&mut self, tab: ActiveTab) {
        if self.active_tab != tab {
            self.active_tab = tab;
            self.mark_dirty();
        }
    }

    /// Validates a batch and registers the accepted files.
    ///
    /// Returns the new ids paired with their batch position, plus the validation report.
    pub(crate) fn intake(
        &mut self,
        files: &[CandidateFile],
        received_at: DateTime<Utc>,
    ) -> (Vec<(DocumentId, usize)>, ValidationReport) {
        let report = validate(files, self.registry.count());
        let mut created = Vec::with_capacity(report.accepted.len());
        let mut docs = Vec::with_capacity(report.accepted.len());
        for (index, file) in report.accepted.iter().enumerate() {
            self.next_document += 1;
            let id = DocumentId(self.next_document);
            docs.push(Document::new(id, file, received_at));
            created.push((id, index));
        }
        if !docs.is_empty() {
            self.registry.add(docs);
            self.mark_dirty();
        }
        (created, report)
    }

    pub(crate) fn raise_notice(&mut self, reason: RejectionReason) -> NoticeId {
        self.next_notice += 1;
        let id = NoticeId(self.next_notice);
        self.notice = Some(Notice { id, reason });
        self.mark_dirty();
        id
    }

    pub(crate) fn clear_notice(&mut self) {
        if self.notice.take().is_some() {
            self.mark_dirty();
        }
    }

    /// Clears the notice only if it is still the one identified by `id`.
    pub(crate) fn expire_notice(&mut self, id: NoticeId) {
        if self.notice.is_some_and(|notice| notice.id == id) {
            self.clear_notice();
        }
    }

    pub(crate) fn remove_document(&mut self, id: DocumentId) -> bool {
        let removed = self.registry.remove(id).is_some();
        if removed {
            self.mark_dirty();
        }
        removed
    }

    /// Raises upload progress to `target` (never lowers it) on an uploading document.
    pub(crate) fn advance_upload(
        &mut self,
        id: DocumentId,
        target: impl FnOnce(u8) -> u8,
    ) -> ProgressChange {
        let mut change = ProgressChange::Ignored;
        self.registry.update(id, |doc| {
            if doc.status != DocumentStatus::Uploading {
                return;
            }
            let next = target(doc.progress).min(100).max(doc.progress);
            if next == doc.progress {
                return;
            }
            doc.progress = next;
            change = if next >= PROCESSING_THRESHOLD {
                doc.status = DocumentStatus::Processing;
                ProgressChange::ReachedProcessing
            } else {
                ProgressChange::Advanced
            };
        });
        if change != ProgressChange::Ignored {
            self.mark_dirty();
        }
        change
    }

    pub(crate) fn promote(&mut self, id: DocumentId) -> bool {
        let mut promoted = false;
        self.registry.update(id, |doc| {
            if doc.status == DocumentStatus::Processing {
                doc.status = DocumentStatus::Completed;
                promoted = true;
            }
        });
        if promoted {
            self.mark_dirty();
        }
        promoted
    }

    pub(crate) fn fail_upload(&mut self, id: DocumentId, reason: String) -> bool {
        let mut failed = false;
        self.registry.update(id, |doc| {
            if matches!(doc.status, DocumentStatus::Uploading | DocumentStatus::Processing) {
                doc.status = DocumentStatus::Error;
                doc.failure = Some(reason);
                failed = true;
            }
        });
        if failed {
            self.mark_dirty();
        }
        failed
    }

    /// Starts a new job, superseding a finished one. Callers check `can_analyze` first.
    pub(crate) fn begin_job(&mut self) -> SubmissionId {
        self.next_submission += 1;
        let submission = SubmissionId(self.next_submission);
        self.job = Some(AnalysisJob::submitted(submission));
        self.active_tab = ActiveTab::Analysis;
        self.mark_dirty();
        submission
    }

    /// Mutable access to the in-flight job created by `submission`.
    pub(crate) fn job_for_submission(
        &mut self,
        submission: SubmissionId,
    ) -> Option<&mut AnalysisJob> {
        self.job
            .as_mut()
            .filter(|job| job.submission == submission && job.in_flight())
    }

    pub(crate) fn job_awaiting(&mut self, job_id: &JobId) -> Option<&mut AnalysisJob> {
        self.job.as_mut().filter(|job| job.awaits_report(job_id))
    }

    /// Applies a status report to the current job. Returns the new status if it changed.
    pub(crate) fn apply_report(&mut self, job_id: &JobId, report: JobReport) -> Option<JobStatus> {
        let job = self.job.as_mut().filter(|job| job.awaits_report(job_id))?;
        job.polls += 1;
        let previous = job.status;
        match report.status {
            JobStatus::Pending | JobStatus::Processing => {
                job.status = report.status;
            }
            JobStatus::Error => {
                let message = report
                    .message
                    .unwrap_or_else(|| "analysis failed on the remote service".to_string());
                job.fail(message);
            }
            JobStatus::Completed => {
                for entry in &report.documents {
                    self.registry.update(entry.id, |doc| {
                        doc.summary = Some(entry.summary.clone());
                        // A failed upload stays failed even if the service summarized it.
                        if doc.status == DocumentStatus::Processing {
                            doc.status = DocumentStatus::Completed;
                        }
                    });
                }
                let summarized: Vec<DocumentId> =
                    report.documents.iter().map(|entry| entry.id).collect();
                let job = self.job.as_mut()?;
                job.result_documents = self
                    .registry
                    .list()
                    .filter(|doc| summarized.contains(&doc.id()))
                    .cloned()
                    .collect();
                job.artifact = report.artifact;
                job.status = JobStatus::Completed;
            }
        }
        let current = self.job.as_ref()?.status;
        self.mark_dirty();
        (current != previous).then_some(current)
    }

    pub(crate) fn set_prompt(&mut self, prompt: String) {
        if self.custom.prompt != prompt {
            self.custom.prompt = prompt;
            self.mark_dirty();
        }
    }

    pub(crate) fn toggle_custom_panel(&mut self) {
        self.custom.panel_visible = !self.custom.panel_visible;
        self.mark_dirty();
    }

    pub(crate) fn begin_generation(&mut self) -> RequestId {
        self.next_request += 1;
        let request = RequestId(self.next_request);
        self.custom.request = Some(request);
        self.custom.failure = None;
        self.mark_dirty();
        request
    }

    /// Clears the in-flight generation if it is `request`; returns whether it was.
    pub(crate) fn finish_generation(&mut self, request: RequestId) -> bool {
        if self.custom.request == Some(request) {
            self.custom.request = None;
            self.mark_dirty();
            true
        } else {
            false
        }
    }

    pub(crate) fn cancel_generation(&mut self) -> Option<RequestId> {
        let request = self.custom.request.take()?;
        self.mark_dirty();
        Some(request)
    }

    pub(crate) fn custom_mut(&mut self) -> &mut CustomAnalysis {
        &mut self.custom
    }

    pub(crate) fn track_download(&mut self, artifact: ArtifactRef) {
        self.downloads.push(DownloadRecord {
            artifact,
            status: DownloadStatus::InProgress,
        });
        self.mark_dirty();
    }

    pub(crate) fn settle_download(&mut self, artifact: &ArtifactRef, status: DownloadStatus) {
        let pending = self.downloads.iter_mut().find(|record| {
            &record.artifact == artifact && record.status == DownloadStatus::InProgress
        });
        if let Some(record) = pending {
            record.status = status;
            self.mark_dirty();
        }
    }
}
