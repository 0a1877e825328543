use chrono::{DateTime, Utc};

use crate::limits::MAX_FILES;
use crate::{
    ActiveTab, AppState, ArtifactRef, Category, DocumentId, DocumentStatus, DownloadRecord,
    JobStatus, RejectionReason,
};

/// Everything a presenter needs to draw the current session.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub active_tab: ActiveTab,
    pub documents: Vec<DocumentRowView>,
    pub document_count: usize,
    pub max_files: usize,
    pub notice: Option<RejectionReason>,
    pub can_analyze: bool,
    pub analyzing: bool,
    pub job: Option<JobView>,
    pub custom: CustomPanelView,
    pub downloads: Vec<DownloadRecord>,
    pub closed: bool,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRowView {
    pub id: DocumentId,
    pub name: String,
    pub category: Category,
    pub status: DocumentStatus,
    pub progress: Option<u8>,
    pub size_label: String,
    pub received_at: DateTime<Utc>,
    pub summary: Option<String>,
    pub failure: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobView {
    pub job_id: Option<String>,
    pub status: JobStatus,
    pub result_count: usize,
    pub artifact: Option<ArtifactRef>,
    pub failure: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CustomPanelView {
    pub visible: bool,
    pub prompt: String,
    pub generating: bool,
    pub can_generate: bool,
    pub artifact: Option<ArtifactRef>,
    pub failure: Option<String>,
}

impl AppViewModel {
    pub(crate) fn from_state(state: &AppState) -> Self {
        let documents = state
            .registry()
            .list()
            .map(|doc| DocumentRowView {
                id: doc.id(),
                name: doc.name().to_string(),
                category: doc.category(),
                status: doc.status(),
                progress: doc.progress(),
                size_label: doc.size_label().to_string(),
                received_at: doc.received_at(),
                summary: doc.summary().map(ToOwned::to_owned),
                failure: doc.failure().map(ToOwned::to_owned),
            })
            .collect::<Vec<_>>();

        let job = state.job().map(|job| JobView {
            job_id: job.job_id().map(ToString::to_string),
            status: job.status(),
            result_count: job.result_documents().len(),
            artifact: job.artifact().cloned(),
            failure: job.failure().map(ToOwned::to_owned),
        });

        let custom = state.custom();
        Self {
            active_tab: state.active_tab(),
            document_count: documents.len(),
            documents,
            max_files: MAX_FILES,
            notice: state.notice().map(|notice| notice.reason),
            can_analyze: state.can_analyze(),
            analyzing: state.is_analyzing(),
            job,
            custom: CustomPanelView {
                visible: custom.panel_visible(),
                prompt: custom.prompt().to_string(),
                generating: custom.generating(),
                can_generate: custom.can_generate(),
                artifact: custom.artifact().cloned(),
                failure: custom.failure().map(ToOwned::to_owned),
            },
            downloads: state.downloads().to_vec(),
            closed: state.is_closed(),
            dirty: state.is_dirty(),
        }
    }

    /// Every document has left the upload pipeline (completed or failed).
    pub fn intake_settled(&self) -> bool {
        self.documents
            .iter()
            .all(|doc| matches!(doc.status, DocumentStatus::Completed | DocumentStatus::Error))
    }
}
