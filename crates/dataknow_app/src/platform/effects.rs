use std::sync::mpsc;
use std::thread;

use dataknow_core::{
    ArtifactRef, DocumentId, DocumentPayload, DocumentSummary, Effect, JobId, JobReport, JobStatus,
    Language, Msg, NoticeId, RequestId, SubmissionId,
};
use dataknow_engine::{
    AnalysisRequest, EngineConfig, EngineEvent, EngineEvents, EngineHandle, JobHandle,
    PollSettings, RemoteStatus, StatusReport, TimerKey,
};
use dataknow_logging::{dk_debug, dk_info, dk_warn};

/// Executes reducer effects on the engine and feeds engine events back as messages.
pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    pub fn new(config: EngineConfig, msg_tx: mpsc::Sender<Msg>) -> Self {
        let (engine, events) = EngineHandle::new(config);
        spawn_event_loop(events, msg_tx);
        Self { engine }
    }

    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::StartUploadTicker { document, period } => {
                    self.engine.start_upload_ticker(document.0, period);
                }
                Effect::CancelUploadTicker { document } => {
                    self.engine.cancel_upload_ticker(document.0);
                }
                Effect::SchedulePromotion { document, delay } => {
                    self.engine.schedule(
                        TimerKey::Promotion {
                            document: document.0,
                        },
                        delay,
                    );
                }
                Effect::CancelDocumentTimers { document } => {
                    self.engine.cancel_document(document.0);
                }
                Effect::ScheduleNoticeExpiry { notice, delay } => {
                    self.engine
                        .schedule(TimerKey::NoticeExpiry { notice: notice.0 }, delay);
                }
                Effect::SubmitAnalysis {
                    submission,
                    documents,
                    language,
                } => {
                    dk_info!(
                        "SubmitAnalysis submission={} documents={}",
                        submission.0,
                        documents.len()
                    );
                    self.engine
                        .submit_analysis(submission.0, analysis_request(&documents, language));
                }
                Effect::StartPolling {
                    job_id,
                    interval,
                    max_attempts,
                } => {
                    self.engine.start_polling(
                        JobHandle(job_id.0),
                        PollSettings {
                            interval,
                            max_attempts,
                        },
                    );
                }
                Effect::GenerateCustom { request, prompt } => {
                    dk_info!("GenerateCustom request={} prompt_len={}", request.0, prompt.len());
                    self.engine.generate_custom(request.0, prompt);
                }
                Effect::CancelCustomGeneration { request } => {
                    self.engine.cancel_custom(request.0);
                }
                Effect::DownloadArtifact { artifact } => {
                    self.engine
                        .download_artifact(dataknow_engine::ArtifactRef(artifact.0));
                }
                Effect::Teardown => {
                    self.engine.teardown();
                }
            }
        }
    }
}

fn spawn_event_loop(events: EngineEvents, msg_tx: mpsc::Sender<Msg>) {
    thread::spawn(move || {
        while let Some(event) = events.recv() {
            if msg_tx.send(map_event(event)).is_err() {
                break;
            }
        }
        dk_debug!("Engine event loop finished");
    });
}

fn analysis_request(documents: &[DocumentPayload], language: Language) -> AnalysisRequest {
    AnalysisRequest {
        documents: documents
            .iter()
            .map(|doc| dataknow_engine::DocumentPayload {
                id: doc.id.0,
                name: doc.name.clone(),
                category: doc.category.as_str().to_string(),
                size_label: doc.size_label.clone(),
            })
            .collect(),
        language: language.code().to_string(),
    }
}

fn map_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::UploadTick { document } => Msg::UploadTick(DocumentId(document)),
        EngineEvent::TimerFired(TimerKey::Promotion { document }) => {
            Msg::PromotionDue(DocumentId(document))
        }
        EngineEvent::TimerFired(TimerKey::NoticeExpiry { notice }) => {
            Msg::NoticeExpired(NoticeId(notice))
        }
        EngineEvent::AnalysisStarted { submission, job } => Msg::AnalysisStarted {
            submission: SubmissionId(submission),
            job_id: JobId(job.0),
        },
        EngineEvent::SubmissionFailed { submission, error } => {
            dk_warn!("Submission {} failed: {}", submission, error);
            Msg::SubmissionFailed {
                submission: SubmissionId(submission),
                message: error.to_string(),
            }
        }
        EngineEvent::JobStatus { job, report } => Msg::JobStatusReceived {
            job_id: JobId(job.0),
            report: map_report(report),
        },
        EngineEvent::PollingFailed { job, error } => Msg::PollingFailed {
            job_id: JobId(job.0),
            message: error.to_string(),
        },
        EngineEvent::PollingExhausted { job, attempts } => Msg::PollingExhausted {
            job_id: JobId(job.0),
            attempts,
        },
        EngineEvent::CustomGenerated { request, artifact } => Msg::CustomGenerated {
            request: RequestId(request),
            artifact: ArtifactRef(artifact.0),
        },
        EngineEvent::CustomFailed { request, error } => Msg::CustomGenerationFailed {
            request: RequestId(request),
            message: error.to_string(),
        },
        EngineEvent::ArtifactSaved { artifact, path } => Msg::ArtifactSaved {
            artifact: ArtifactRef(artifact.0),
            path,
        },
        EngineEvent::ArtifactFailed { artifact, message } => Msg::ArtifactDownloadFailed {
            artifact: ArtifactRef(artifact.0),
            message,
        },
    }
}

fn map_report(report: StatusReport) -> JobReport {
    JobReport {
        status: map_status(report.status),
        documents: report
            .documents
            .into_iter()
            .map(|doc| DocumentSummary {
                id: DocumentId(doc.id),
                summary: doc.summary,
            })
            .collect(),
        artifact: report.artifact_ref.map(|artifact| ArtifactRef(artifact.0)),
        message: report.error,
    }
}

fn map_status(status: RemoteStatus) -> JobStatus {
    match status {
        RemoteStatus::Pending => JobStatus::Pending,
        RemoteStatus::Processing => JobStatus::Processing,
        RemoteStatus::Completed => JobStatus::Completed,
        RemoteStatus::Error => JobStatus::Error,
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use dataknow_core::Category;
    use dataknow_engine::{FailureKind, ServiceError, SummarizedDocument};
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn request_carries_category_names_and_language_code() {
        let request = analysis_request(
            &[DocumentPayload {
                id: DocumentId(3),
                name: "research-notes.docx".to_string(),
                category: Category::Scientific,
                size_label: "1.5 MB".to_string(),
            }],
            Language::Es,
        );

        assert_eq!(request.language, "es");
        assert_eq!(request.documents[0].id, 3);
        assert_eq!(request.documents[0].category, "scientific");
        assert_eq!(request.documents[0].size_label, "1.5 MB");
    }

    #[test]
    fn timers_map_back_to_their_messages() {
        assert_eq!(
            map_event(EngineEvent::TimerFired(TimerKey::Promotion { document: 4 })),
            Msg::PromotionDue(DocumentId(4))
        );
        assert_eq!(
            map_event(EngineEvent::TimerFired(TimerKey::NoticeExpiry { notice: 2 })),
            Msg::NoticeExpired(NoticeId(2))
        );
        assert_eq!(
            map_event(EngineEvent::UploadTick { document: 1 }),
            Msg::UploadTick(DocumentId(1))
        );
    }

    #[test]
    fn completed_report_keeps_summaries_artifact_and_error_text() {
        let msg = map_event(EngineEvent::JobStatus {
            job: JobHandle("job-9".to_string()),
            report: StatusReport {
                status: RemoteStatus::Completed,
                documents: vec![SummarizedDocument {
                    id: 1,
                    summary: "Summary".to_string(),
                }],
                artifact_ref: Some(dataknow_engine::ArtifactRef("report.pdf".to_string())),
                error: None,
            },
        });

        assert_eq!(
            msg,
            Msg::JobStatusReceived {
                job_id: JobId("job-9".to_string()),
                report: JobReport {
                    status: JobStatus::Completed,
                    documents: vec![DocumentSummary {
                        id: DocumentId(1),
                        summary: "Summary".to_string(),
                    }],
                    artifact: Some(ArtifactRef("report.pdf".to_string())),
                    message: None,
                },
            }
        );
    }

    #[test]
    fn service_errors_become_display_text() {
        let msg = map_event(EngineEvent::CustomFailed {
            request: 5,
            error: ServiceError::new(FailureKind::HttpStatus(503), "unavailable"),
        });
        assert_eq!(
            msg,
            Msg::CustomGenerationFailed {
                request: RequestId(5),
                message: "http status 503: unavailable".to_string(),
            }
        );

        let msg = map_event(EngineEvent::ArtifactSaved {
            artifact: dataknow_engine::ArtifactRef("a.pdf".to_string()),
            path: PathBuf::from("out/a.pdf"),
        });
        assert_eq!(
            msg,
            Msg::ArtifactSaved {
                artifact: ArtifactRef("a.pdf".to_string()),
                path: PathBuf::from("out/a.pdf"),
            }
        );
    }
}
