//! Plays the user's part for a terminal session: analyze once uploads settle, fetch the
//! consolidated report, optionally run one custom prompt, then quit.

use dataknow_core::{AppViewModel, DownloadStatus, JobStatus, Msg};
use dataknow_logging::dk_debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    AwaitIntake,
    AwaitJob,
    AwaitReport,
    AwaitCustom,
    AwaitGeneration,
    Done,
}

pub struct Autopilot {
    step: Step,
    prompt: Option<String>,
}

impl Autopilot {
    pub fn new(prompt: Option<String>) -> Self {
        Self {
            step: Step::AwaitIntake,
            prompt: prompt.filter(|prompt| !prompt.trim().is_empty()),
        }
    }

    pub fn is_done(&self) -> bool {
        self.step == Step::Done
    }

    /// Messages a user would send after seeing `view`.
    pub fn next(&mut self, view: &AppViewModel) -> Vec<Msg> {
        if view.closed {
            self.step = Step::Done;
            return Vec::new();
        }
        let before = self.step;
        let msgs = match self.step {
            Step::AwaitIntake => self.after_intake(view),
            Step::AwaitJob => self.after_job(view),
            Step::AwaitReport if downloads_settled(view) => self.start_custom(),
            // Views from the panel toggle and prompt edit arrive before generation starts.
            Step::AwaitCustom if view.custom.generating => {
                self.step = Step::AwaitGeneration;
                Vec::new()
            }
            Step::AwaitGeneration if !view.custom.generating && downloads_settled(view) => {
                self.finish()
            }
            Step::AwaitReport | Step::AwaitCustom | Step::AwaitGeneration | Step::Done => {
                Vec::new()
            }
        };
        if self.step != before {
            dk_debug!("Autopilot {:?} -> {:?}", before, self.step);
        }
        msgs
    }

    fn after_intake(&mut self, view: &AppViewModel) -> Vec<Msg> {
        if !view.intake_settled() {
            return Vec::new();
        }
        if view.can_analyze {
            self.step = Step::AwaitJob;
            vec![Msg::AnalyzeClicked]
        } else {
            self.finish()
        }
    }

    fn after_job(&mut self, view: &AppViewModel) -> Vec<Msg> {
        match &view.job {
            Some(job) if job.status == JobStatus::Completed => {
                if job.artifact.is_some() {
                    self.step = Step::AwaitReport;
                    vec![Msg::DownloadConsolidatedClicked]
                } else {
                    self.start_custom()
                }
            }
            Some(job) if job.status == JobStatus::Error => self.finish(),
            _ => Vec::new(),
        }
    }

    fn start_custom(&mut self) -> Vec<Msg> {
        match self.prompt.take() {
            Some(prompt) => {
                self.step = Step::AwaitCustom;
                vec![
                    Msg::CustomPanelToggled,
                    Msg::CustomPromptChanged(prompt),
                    Msg::GenerateClicked,
                ]
            }
            None => self.finish(),
        }
    }

    fn finish(&mut self) -> Vec<Msg> {
        self.step = Step::Done;
        vec![Msg::Shutdown]
    }
}

fn downloads_settled(view: &AppViewModel) -> bool {
    view.downloads
        .iter()
        .all(|record| record.status != DownloadStatus::InProgress)
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::path::PathBuf;

    use chrono::Utc;
    use dataknow_core::{
        update, AppState, ArtifactRef, CandidateFile, Category, DocumentId, DocumentRowView,
        DocumentStatus, DocumentSummary, DownloadRecord, Effect, JobId, JobReport, JobView,
        RequestId,
    };
    use pretty_assertions::assert_eq;

    use super::*;

    fn with_documents(statuses: &[DocumentStatus]) -> AppViewModel {
        let documents: Vec<DocumentRowView> = statuses
            .iter()
            .enumerate()
            .map(|(index, status)| DocumentRowView {
                id: DocumentId(index as u64 + 1),
                name: "notes.txt".to_string(),
                category: Category::General,
                status: *status,
                progress: None,
                size_label: "0.0 MB".to_string(),
                received_at: Utc::now(),
                summary: None,
                failure: None,
            })
            .collect();
        AppViewModel {
            document_count: documents.len(),
            can_analyze: !documents.is_empty()
                && documents
                    .iter()
                    .all(|doc| doc.status != DocumentStatus::Uploading),
            documents,
            max_files: 10,
            ..AppViewModel::default()
        }
    }

    fn with_job(mut view: AppViewModel, status: JobStatus, artifact: Option<&str>) -> AppViewModel {
        view.can_analyze = false;
        view.job = Some(JobView {
            job_id: Some("sim-1".to_string()),
            status,
            result_count: 1,
            artifact: artifact.map(|name| ArtifactRef(name.to_string())),
            failure: None,
        });
        view
    }

    fn download(view: &mut AppViewModel, name: &str, status: DownloadStatus) {
        view.downloads.push(DownloadRecord {
            artifact: ArtifactRef(name.to_string()),
            status,
        });
    }

    #[test]
    fn waits_for_uploads_then_analyzes_once() {
        let mut pilot = Autopilot::new(None);
        let uploading = with_documents(&[DocumentStatus::Completed, DocumentStatus::Uploading]);
        assert!(pilot.next(&uploading).is_empty());

        let settled = with_documents(&[DocumentStatus::Completed, DocumentStatus::Completed]);
        assert_eq!(pilot.next(&settled), vec![Msg::AnalyzeClicked]);

        let pending = with_job(settled, JobStatus::Processing, None);
        assert!(pilot.next(&pending).is_empty());
    }

    #[test]
    fn nothing_accepted_means_quit() {
        let mut pilot = Autopilot::new(Some("prompt".to_string()));
        assert_eq!(pilot.next(&with_documents(&[])), vec![Msg::Shutdown]);
        assert!(pilot.is_done());
    }

    #[test]
    fn full_session_with_custom_prompt() {
        let mut pilot = Autopilot::new(Some("Compare methods".to_string()));
        let settled = with_documents(&[DocumentStatus::Completed]);
        assert_eq!(pilot.next(&settled), vec![Msg::AnalyzeClicked]);

        let mut done = with_job(settled, JobStatus::Completed, Some("documento-consolidado.pdf"));
        assert_eq!(pilot.next(&done), vec![Msg::DownloadConsolidatedClicked]);

        download(&mut done, "documento-consolidado.pdf", DownloadStatus::InProgress);
        assert!(pilot.next(&done).is_empty());

        done.downloads[0].status = DownloadStatus::Saved(PathBuf::from("output/report.pdf"));
        assert_eq!(
            pilot.next(&done),
            vec![
                Msg::CustomPanelToggled,
                Msg::CustomPromptChanged("Compare methods".to_string()),
                Msg::GenerateClicked,
            ]
        );

        done.custom.visible = true;
        assert!(pilot.next(&done).is_empty());

        done.custom.generating = true;
        assert!(pilot.next(&done).is_empty());

        done.custom.generating = false;
        download(&mut done, "custom-analysis-2.pdf", DownloadStatus::InProgress);
        assert!(pilot.next(&done).is_empty());

        done.downloads[1].status = DownloadStatus::Failed("not found".to_string());
        assert_eq!(pilot.next(&done), vec![Msg::Shutdown]);
        assert!(pilot.is_done());
    }

    #[test]
    fn failed_job_quits_without_downloading() {
        let mut pilot = Autopilot::new(Some("ignored".to_string()));
        let settled = with_documents(&[DocumentStatus::Completed]);
        pilot.next(&settled);

        let failed = with_job(settled, JobStatus::Error, None);
        assert_eq!(pilot.next(&failed), vec![Msg::Shutdown]);
    }

    #[test]
    fn closed_view_stops_the_pilot() {
        let mut pilot = Autopilot::new(None);
        let view = AppViewModel {
            closed: true,
            ..AppViewModel::default()
        };
        assert!(pilot.next(&view).is_empty());
        assert!(pilot.is_done());
    }

    /// Feeds messages through the reducer and the pilot the way the session loop does.
    struct Harness {
        state: AppState,
        pilot: Autopilot,
        actions: Vec<Msg>,
        effects: Vec<Effect>,
    }

    impl Harness {
        fn new(prompt: &str) -> Self {
            Self {
                state: AppState::new(),
                pilot: Autopilot::new(Some(prompt.to_string())),
                actions: Vec::new(),
                effects: Vec::new(),
            }
        }

        fn deliver(&mut self, msg: Msg) {
            let mut inbox = VecDeque::from([msg]);
            while let Some(msg) = inbox.pop_front() {
                let (mut state, effects) = update(std::mem::take(&mut self.state), msg);
                self.effects.extend(effects);
                let view = state.consume_dirty().then(|| state.view());
                self.state = state;
                if let Some(view) = view {
                    let actions = self.pilot.next(&view);
                    self.actions.extend(actions.iter().cloned());
                    inbox.extend(actions);
                }
            }
        }

        fn quit_requested(&self) -> bool {
            self.actions.contains(&Msg::Shutdown)
        }

        /// Drives one document through intake, analysis and the consolidated download.
        fn reach_custom_generation(&mut self) -> RequestId {
            self.deliver(Msg::FilesReceived {
                files: vec![CandidateFile::new("study.pdf", 1024)],
                received_at: Utc::now(),
            });
            let id = DocumentId(1);
            self.deliver(Msg::UploadProgressed { id, percent: 100 });
            self.deliver(Msg::PromotionDue(id));
            assert_eq!(self.actions, vec![Msg::AnalyzeClicked]);

            let submission = self
                .effects
                .iter()
                .find_map(|effect| match effect {
                    Effect::SubmitAnalysis { submission, .. } => Some(*submission),
                    _ => None,
                })
                .expect("submit effect");
            let job_id = JobId("sim-1".to_string());
            self.deliver(Msg::AnalysisStarted {
                submission,
                job_id: job_id.clone(),
            });
            let consolidated = ArtifactRef("documento-consolidado.pdf".to_string());
            self.deliver(Msg::JobStatusReceived {
                job_id,
                report: JobReport {
                    status: JobStatus::Completed,
                    documents: vec![DocumentSummary {
                        id,
                        summary: "Summary of study.pdf".to_string(),
                    }],
                    artifact: Some(consolidated.clone()),
                    message: None,
                },
            });
            self.deliver(Msg::ArtifactSaved {
                artifact: consolidated,
                path: PathBuf::from("output/documento-consolidado.pdf"),
            });

            self.effects
                .iter()
                .find_map(|effect| match effect {
                    Effect::GenerateCustom { request, .. } => Some(*request),
                    _ => None,
                })
                .expect("generate effect")
        }
    }

    #[test]
    fn custom_generation_is_not_abandoned_before_it_starts() {
        let mut harness = Harness::new("Compare methods");
        let request = harness.reach_custom_generation();

        assert!(!harness.quit_requested());
        assert!(!harness.state.is_closed());
        assert!(harness.state.custom().generating());

        let artifact = ArtifactRef("custom-analysis-2.pdf".to_string());
        harness.deliver(Msg::CustomGenerated {
            request,
            artifact: artifact.clone(),
        });
        assert!(!harness.quit_requested());

        harness.deliver(Msg::ArtifactSaved {
            artifact,
            path: PathBuf::from("output/custom-analysis-2.pdf"),
        });
        assert!(harness.quit_requested());
        assert!(harness.state.is_closed());
        let saved = harness
            .state
            .downloads()
            .iter()
            .filter(|record| matches!(record.status, DownloadStatus::Saved(_)))
            .count();
        assert_eq!(saved, 2);
    }

    #[test]
    fn failed_custom_generation_still_ends_the_session() {
        let mut harness = Harness::new("Compare methods");
        let request = harness.reach_custom_generation();
        assert!(!harness.quit_requested());

        harness.deliver(Msg::CustomGenerationFailed {
            request,
            message: "service unavailable".to_string(),
        });
        assert!(harness.quit_requested());
        assert!(harness.pilot.is_done());
    }

    #[test]
    fn blank_prompt_skips_the_custom_step() {
        let mut pilot = Autopilot::new(Some("   ".to_string()));
        let settled = with_documents(&[DocumentStatus::Completed]);
        pilot.next(&settled);

        let done = with_job(settled, JobStatus::Completed, None);
        assert_eq!(pilot.next(&done), vec![Msg::Shutdown]);
    }
}
