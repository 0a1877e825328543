use std::time::Duration;

use dataknow_engine::{
    AnalysisRequest, AnalysisService, ArtifactRef, DocumentPayload, FailureKind, JobHandle,
    RemoteStatus, SimulatedAnalysisService, SimulationSettings, CONSOLIDATED_ARTIFACT,
};
use pretty_assertions::assert_eq;

fn request(language: &str) -> AnalysisRequest {
    AnalysisRequest {
        documents: vec![
            DocumentPayload {
                id: 1,
                name: "study.pdf".to_string(),
                category: "scientific".to_string(),
                size_label: "2.0 MB".to_string(),
            },
            DocumentPayload {
                id: 2,
                name: "notes.txt".to_string(),
                category: "general".to_string(),
                size_label: "0.0 MB".to_string(),
            },
        ],
        language: language.to_string(),
    }
}

#[tokio::test(start_paused = true)]
async fn job_completes_after_the_processing_delay() {
    let service = SimulatedAnalysisService::new(SimulationSettings::default());
    let job = service.start_analysis(&request("en")).await.unwrap();
    assert_eq!(job, JobHandle("sim-1".to_string()));

    let early = service.job_status(&job).await.unwrap();
    assert_eq!(early.status, RemoteStatus::Processing);
    assert!(early.documents.is_empty());

    tokio::time::sleep(Duration::from_secs(4)).await;
    let done = service.job_status(&job).await.unwrap();
    assert_eq!(done.status, RemoteStatus::Completed);
    let ids: Vec<u64> = done.documents.iter().map(|doc| doc.id).collect();
    assert_eq!(ids, vec![1, 2]);
    assert_eq!(
        done.artifact_ref,
        Some(ArtifactRef(CONSOLIDATED_ARTIFACT.to_string()))
    );

    let bytes = service
        .fetch_artifact(&ArtifactRef(CONSOLIDATED_ARTIFACT.to_string()))
        .await
        .unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.contains("study.pdf"));
    assert!(text.contains("notes.txt"));
}

#[tokio::test(start_paused = true)]
async fn completed_jobs_are_forgotten_but_their_artifact_stays() {
    let service = SimulatedAnalysisService::new(SimulationSettings {
        processing_delay: Duration::ZERO,
        ..SimulationSettings::default()
    });
    let job = service.start_analysis(&request("en")).await.unwrap();
    let done = service.job_status(&job).await.unwrap();
    assert_eq!(done.status, RemoteStatus::Completed);

    let err = service.job_status(&job).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::NotFound);

    let bytes = service
        .fetch_artifact(&ArtifactRef(CONSOLIDATED_ARTIFACT.to_string()))
        .await
        .unwrap();
    assert!(String::from_utf8_lossy(&bytes).contains("study.pdf"));
}

#[tokio::test(start_paused = true)]
async fn spanish_summaries_when_requested() {
    let service = SimulatedAnalysisService::new(SimulationSettings {
        processing_delay: Duration::ZERO,
        ..SimulationSettings::default()
    });
    let job = service.start_analysis(&request("es")).await.unwrap();
    let done = service.job_status(&job).await.unwrap();
    assert!(done.documents[0].summary.starts_with("Resumen generado por IA"));
}

#[tokio::test(start_paused = true)]
async fn custom_generation_produces_a_fetchable_artifact() {
    let service = SimulatedAnalysisService::new(SimulationSettings::default());
    let artifact = service.generate_custom("Compare methods").await.unwrap();
    assert_eq!(artifact, ArtifactRef("custom-analysis-1.pdf".to_string()));

    let bytes = service.fetch_artifact(&artifact).await.unwrap();
    assert!(String::from_utf8_lossy(&bytes).contains("Compare methods"));
}

#[tokio::test]
async fn unknown_job_and_artifact_are_not_found() {
    let service = SimulatedAnalysisService::default();
    let err = service
        .job_status(&JobHandle("sim-99".to_string()))
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::NotFound);

    let err = service
        .fetch_artifact(&ArtifactRef("nothing.pdf".to_string()))
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::NotFound);
}
