use chrono::{DateTime, Utc};
use dataknow_logging::{dk_debug, dk_info, dk_warn};

use crate::limits::PROGRESS_STEP;
use crate::state::ProgressChange;
use crate::{
    AppState, CandidateFile, DocumentId, DocumentPayload, DownloadStatus, Effect, JobStatus, Msg,
};

/// Pure update function: applies a message to state and returns any effects.
///
/// Every writer (upload ticks, job results, user removal) goes through here, so each
/// message acts on the latest state and never on a snapshot captured earlier.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    if state.is_closed() {
        return (state, Vec::new());
    }

    let effects = match msg {
        Msg::FilesReceived { files, received_at } => {
            on_files_received(&mut state, &files, received_at)
        }
        Msg::RemoveDocument(id) => {
            if state.remove_document(id) {
                dk_info!("Removed {}", id);
                vec![Effect::CancelDocumentTimers { document: id }]
            } else {
                Vec::new()
            }
        }
        Msg::UploadTick(id) => {
            let change =
                state.advance_upload(id, |progress| progress.saturating_add(PROGRESS_STEP));
            upload_effects(&state, id, change)
        }
        Msg::UploadProgressed { id, percent } => {
            let change = state.advance_upload(id, |_| percent);
            upload_effects(&state, id, change)
        }
        Msg::UploadFailed { id, reason } => {
            dk_warn!("Upload of {} failed: {}", id, reason);
            if state.fail_upload(id, reason) {
                vec![Effect::CancelDocumentTimers { document: id }]
            } else {
                Vec::new()
            }
        }
        Msg::PromotionDue(id) => {
            state.promote(id);
            Vec::new()
        }
        Msg::NoticeExpired(notice) => {
            state.expire_notice(notice);
            Vec::new()
        }
        Msg::TabSelected(tab) => {
            state.select_tab(tab);
            Vec::new()
        }
        Msg::AnalyzeClicked => on_analyze_clicked(&mut state),
        Msg::AnalysisStarted { submission, job_id } => {
            let interval = state.timings().poll_interval;
            let max_attempts = state.timings().max_poll_attempts;
            match state.job_for_submission(submission) {
                Some(job) if job.job_id.is_none() => {
                    dk_info!("Analysis job {} started", job_id);
                    job.job_id = Some(job_id.clone());
                    state.mark_dirty();
                    vec![Effect::StartPolling {
                        job_id,
                        interval,
                        max_attempts,
                    }]
                }
                _ => {
                    dk_debug!("Ignoring start of job {} for a stale submission", job_id);
                    Vec::new()
                }
            }
        }
        Msg::SubmissionFailed {
            submission,
            message,
        } => {
            if let Some(job) = state.job_for_submission(submission) {
                dk_warn!("Analysis submission failed: {}", message);
                job.fail(message);
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::JobStatusReceived { job_id, report } => {
            match state.apply_report(&job_id, report) {
                Some(JobStatus::Completed) => dk_info!("Analysis job {} completed", job_id),
                Some(JobStatus::Error) => dk_warn!("Analysis job {} reported an error", job_id),
                Some(status) => dk_debug!("Analysis job {} is now {:?}", job_id, status),
                None => {}
            }
            Vec::new()
        }
        Msg::PollingFailed { job_id, message } => {
            if let Some(job) = state.job_awaiting(&job_id) {
                dk_warn!("Polling job {} failed: {}", job_id, message);
                job.fail(message);
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::PollingExhausted { job_id, attempts } => {
            if let Some(job) = state.job_awaiting(&job_id) {
                dk_warn!("Job {} still running after {} status checks", job_id, attempts);
                job.fail(format!("analysis timed out after {attempts} status checks"));
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::DownloadConsolidatedClicked => {
            let artifact = state
                .job()
                .filter(|job| job.status() == JobStatus::Completed)
                .and_then(|job| job.artifact().cloned());
            match artifact {
                Some(artifact) => {
                    state.track_download(artifact.clone());
                    vec![Effect::DownloadArtifact { artifact }]
                }
                None => Vec::new(),
            }
        }
        Msg::CustomPanelToggled => {
            state.toggle_custom_panel();
            Vec::new()
        }
        Msg::CustomPromptChanged(prompt) => {
            state.set_prompt(prompt);
            Vec::new()
        }
        Msg::GenerateClicked => {
            if !state.custom().can_generate() {
                return (state, Vec::new());
            }
            let prompt = state.custom().prompt().trim().to_string();
            let request = state.begin_generation();
            vec![Effect::GenerateCustom { request, prompt }]
        }
        Msg::CancelGeneration => match state.cancel_generation() {
            Some(request) => vec![Effect::CancelCustomGeneration { request }],
            None => Vec::new(),
        },
        Msg::CustomGenerated { request, artifact } => {
            if !state.finish_generation(request) {
                return (state, Vec::new());
            }
            let custom = state.custom_mut();
            custom.artifact = Some(artifact.clone());
            custom.prompt.clear();
            custom.panel_visible = false;
            state.track_download(artifact.clone());
            vec![Effect::DownloadArtifact { artifact }]
        }
        Msg::CustomGenerationFailed { request, message } => {
            if state.finish_generation(request) {
                dk_warn!("Custom analysis failed: {}", message);
                state.custom_mut().failure = Some(message);
            }
            Vec::new()
        }
        Msg::ArtifactSaved { artifact, path } => {
            dk_info!("Saved {} to {:?}", artifact, path);
            state.settle_download(&artifact, DownloadStatus::Saved(path));
            Vec::new()
        }
        Msg::ArtifactDownloadFailed { artifact, message } => {
            dk_warn!("Download of {} failed: {}", artifact, message);
            state.settle_download(&artifact, DownloadStatus::Failed(message));
            Vec::new()
        }
        Msg::Shutdown => {
            state.cancel_generation();
            state.close();
            vec![Effect::Teardown]
        }
        Msg::Tick | Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn on_files_received(
    state: &mut AppState,
    files: &[CandidateFile],
    received_at: DateTime<Utc>,
) -> Vec<Effect> {
    if files.is_empty() {
        return Vec::new();
    }
    let (created, report) = state.intake(files, received_at);
    let timings = *state.timings();

    let mut effects = Vec::with_capacity(created.len() + 1);
    for (document, index) in created {
        effects.push(Effect::StartUploadTicker {
            document,
            period: timings.tick_period(index),
        });
    }

    match report.first_reason() {
        Some(reason) => {
            dk_info!(
                "Intake accepted {} file(s), rejected {} ({})",
                report.accepted.len(),
                report.rejections.len(),
                reason
            );
            let notice = state.raise_notice(reason);
            effects.push(Effect::ScheduleNoticeExpiry {
                notice,
                delay: timings.notice_ttl,
            });
        }
        None => {
            dk_info!("Intake accepted {} file(s)", report.accepted.len());
            state.clear_notice();
        }
    }
    effects
}

fn upload_effects(state: &AppState, document: DocumentId, change: ProgressChange) -> Vec<Effect> {
    match change {
        ProgressChange::ReachedProcessing => {
            dk_debug!("{} uploaded, processing", document);
            vec![
                Effect::CancelUploadTicker { document },
                Effect::SchedulePromotion {
                    document,
                    delay: state.timings().promotion_delay,
                },
            ]
        }
        ProgressChange::Advanced | ProgressChange::Ignored => Vec::new(),
    }
}

fn on_analyze_clicked(state: &mut AppState) -> Vec<Effect> {
    if !state.can_analyze() {
        dk_info!(
            "Analysis refused: {} document(s), uploading={}, analyzing={}",
            state.registry().count(),
            state.registry().any_uploading(),
            state.is_analyzing()
        );
        return Vec::new();
    }

    let documents = state
        .registry()
        .list()
        .map(|doc| DocumentPayload {
            id: doc.id(),
            name: doc.name().to_string(),
            category: doc.category(),
            size_label: doc.size_label().to_string(),
        })
        .collect::<Vec<_>>();
    let language = state.language();
    let submission = state.begin_job();
    dk_info!("Submitting {} document(s) for analysis", documents.len());
    vec![Effect::SubmitAnalysis {
        submission,
        documents,
        language,
    }]
}
