use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Remote handle for a running analysis job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobHandle(pub String);

impl fmt::Display for JobHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// URL or service-relative path of a generated artifact.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArtifactRef(pub String);

impl fmt::Display for ArtifactRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentPayload {
    pub id: u64,
    pub name: String,
    pub category: String,
    pub size_label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    pub documents: Vec<DocumentPayload>,
    pub language: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemoteStatus {
    #[default]
    Pending,
    Processing,
    Completed,
    Error,
}

impl RemoteStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, RemoteStatus::Completed | RemoteStatus::Error)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummarizedDocument {
    pub id: u64,
    pub summary: String,
}

/// Body of a job status answer.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusReport {
    pub status: RemoteStatus,
    #[serde(default)]
    pub documents: Vec<SummarizedDocument>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact_ref: Option<ArtifactRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Delayed, one-shot timers the engine can schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKey {
    Promotion { document: u64 },
    NoticeExpiry { notice: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    UploadTick {
        document: u64,
    },
    TimerFired(TimerKey),
    AnalysisStarted {
        submission: u64,
        job: JobHandle,
    },
    SubmissionFailed {
        submission: u64,
        error: ServiceError,
    },
    JobStatus {
        job: JobHandle,
        report: StatusReport,
    },
    PollingFailed {
        job: JobHandle,
        error: ServiceError,
    },
    PollingExhausted {
        job: JobHandle,
        attempts: u32,
    },
    CustomGenerated {
        request: u64,
        artifact: ArtifactRef,
    },
    CustomFailed {
        request: u64,
        error: ServiceError,
    },
    ArtifactSaved {
        artifact: ArtifactRef,
        path: PathBuf,
    },
    ArtifactFailed {
        artifact: ArtifactRef,
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct ServiceError {
    pub kind: FailureKind,
    pub message: String,
}

impl ServiceError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    Network,
    Decode,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    NotFound,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::Decode => write!(f, "malformed response"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "artifact too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::NotFound => write!(f, "not found"),
        }
    }
}
