use dataknow_core::{
    ActiveTab, AppViewModel, DocumentRowView, DocumentStatus, DownloadStatus, JobStatus, JobView,
};

/// Prints a frame only when its text differs from the previous one.
#[derive(Default)]
pub struct Renderer {
    last: Vec<String>,
}

impl Renderer {
    pub fn frame(&mut self, view: &AppViewModel) -> Option<&[String]> {
        let lines = render(view);
        if lines == self.last {
            return None;
        }
        self.last = lines;
        Some(&self.last)
    }
}

pub fn render(view: &AppViewModel) -> Vec<String> {
    let tab = match view.active_tab {
        ActiveTab::Upload => "Upload",
        ActiveTab::Analysis => "Analysis",
    };
    let mut lines = vec![format!(
        "[{}] Documents: {}/{}",
        tab, view.document_count, view.max_files
    )];

    if let Some(reason) = view.notice {
        lines.push(format!("  ! {reason}"));
    }
    lines.extend(view.documents.iter().map(document_line));

    if let Some(job) = &view.job {
        lines.push(job_line(job));
        if job.status == JobStatus::Completed {
            for doc in &view.documents {
                if let Some(summary) = &doc.summary {
                    lines.push(format!("    {}: {}", doc.name, summary));
                }
            }
        }
    }

    let custom = &view.custom;
    if custom.generating {
        lines.push("Custom analysis: generating...".to_string());
    } else if let Some(failure) = &custom.failure {
        lines.push(format!("Custom analysis failed: {failure}"));
    } else if let Some(artifact) = &custom.artifact {
        lines.push(format!("Custom analysis ready: {artifact}"));
    }

    for record in &view.downloads {
        lines.push(match &record.status {
            DownloadStatus::InProgress => format!("Downloading {}...", record.artifact),
            DownloadStatus::Saved(path) => {
                format!("Saved {} to {}", record.artifact, path.display())
            }
            DownloadStatus::Failed(message) => {
                format!("Download of {} failed: {}", record.artifact, message)
            }
        });
    }
    lines
}

fn document_line(doc: &DocumentRowView) -> String {
    let status = match doc.status {
        DocumentStatus::Uploading => format!("uploading {}%", doc.progress.unwrap_or(0)),
        DocumentStatus::Processing => "processing".to_string(),
        DocumentStatus::Completed => "completed".to_string(),
        DocumentStatus::Error => match &doc.failure {
            Some(reason) => format!("error: {reason}"),
            None => "error".to_string(),
        },
    };
    format!(
        "  {} {} ({}, {}) {}",
        doc.id,
        doc.name,
        doc.category.as_str(),
        doc.size_label,
        status
    )
}

fn job_line(job: &JobView) -> String {
    let handle = job.job_id.as_deref().unwrap_or("submitting");
    match job.status {
        JobStatus::Pending => format!("Analysis pending ({handle})"),
        JobStatus::Processing => format!("Analysis processing ({handle})"),
        JobStatus::Completed => match &job.artifact {
            Some(artifact) => format!(
                "Analysis completed: {} summaries, report {}",
                job.result_count, artifact
            ),
            None => format!("Analysis completed: {} summaries", job.result_count),
        },
        JobStatus::Error => format!(
            "Analysis failed: {}",
            job.failure.as_deref().unwrap_or("unknown error")
        ),
    }
}
