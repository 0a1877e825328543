//! DataKnow core: pure document lifecycle and analysis-job state machine.
mod document;
mod effect;
mod job;
mod limits;
mod msg;
mod registry;
mod state;
mod update;
mod validate;
mod view_model;

pub use document::{size_label, CandidateFile, Category, Document, DocumentId, DocumentStatus};
pub use effect::{DocumentPayload, Effect};
pub use job::{
    AnalysisJob, ArtifactRef, CustomAnalysis, DocumentSummary, JobId, JobReport, JobStatus,
    RequestId, SubmissionId,
};
pub use limits::{
    Timings, MAX_FILES, MAX_FILE_SIZE, PROCESSING_THRESHOLD, PROGRESS_STEP, SUPPORTED_EXTENSIONS,
};
pub use msg::Msg;
pub use registry::DocumentRegistry;
pub use state::{
    ActiveTab, AppState, DownloadRecord, DownloadStatus, Language, Notice, NoticeId,
};
pub use update::update;
pub use validate::{
    check, validate, Rejection, RejectionReason, ValidationOutcome, ValidationReport,
};
pub use view_model::{AppViewModel, CustomPanelView, DocumentRowView, JobView};
