use std::time::Duration;

use dataknow_engine::{
    AnalysisRequest, AnalysisService, ArtifactRef, DocumentPayload, FailureKind, JobHandle,
    RemoteStatus, ReqwestAnalysisService, ServiceSettings,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn service_for(server: &MockServer) -> ReqwestAnalysisService {
    ReqwestAnalysisService::new(ServiceSettings {
        base_url: server.uri(),
        ..ServiceSettings::default()
    })
    .expect("valid settings")
}

fn request() -> AnalysisRequest {
    AnalysisRequest {
        documents: vec![DocumentPayload {
            id: 1,
            name: "study.pdf".to_string(),
            category: "scientific".to_string(),
            size_label: "2.0 MB".to_string(),
        }],
        language: "es".to_string(),
    }
}

#[tokio::test]
async fn start_analysis_posts_documents_and_returns_the_job_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/analysis"))
        .and(body_partial_json(json!({
            "language": "es",
            "documents": [{ "id": 1, "name": "study.pdf", "sizeLabel": "2.0 MB" }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "jobId": "job-7" })))
        .expect(1)
        .mount(&server)
        .await;

    let job = service_for(&server).start_analysis(&request()).await.unwrap();
    assert_eq!(job, JobHandle("job-7".to_string()));
}

#[tokio::test]
async fn job_status_decodes_a_completed_report() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/analysis/job-7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "completed",
            "documents": [{ "id": 1, "summary": "Short summary" }],
            "artifactRef": "artifacts/documento-consolidado.pdf"
        })))
        .mount(&server)
        .await;

    let report = service_for(&server)
        .job_status(&JobHandle("job-7".to_string()))
        .await
        .unwrap();
    assert_eq!(report.status, RemoteStatus::Completed);
    assert_eq!(report.documents.len(), 1);
    assert_eq!(report.documents[0].summary, "Short summary");
    assert_eq!(
        report.artifact_ref,
        Some(ArtifactRef("artifacts/documento-consolidado.pdf".to_string()))
    );
    assert_eq!(report.error, None);
}

#[tokio::test]
async fn job_status_without_documents_is_still_valid() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/analysis/job-7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "processing" })))
        .mount(&server)
        .await;

    let report = service_for(&server)
        .job_status(&JobHandle("job-7".to_string()))
        .await
        .unwrap();
    assert_eq!(report.status, RemoteStatus::Processing);
    assert!(report.documents.is_empty());
}

#[tokio::test]
async fn server_errors_map_to_http_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/analysis"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = service_for(&server)
        .start_analysis(&request())
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(500));
}

#[tokio::test]
async fn unknown_job_maps_to_not_found() {
    let server = MockServer::start().await;

    let err = service_for(&server)
        .job_status(&JobHandle("missing".to_string()))
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::NotFound);
}

#[tokio::test]
async fn malformed_body_maps_to_decode() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/analysis/job-7"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = service_for(&server)
        .job_status(&JobHandle("job-7".to_string()))
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::Decode);
}

#[tokio::test]
async fn generate_custom_sends_the_prompt() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/custom-analysis"))
        .and(body_partial_json(json!({ "prompt": "Compare methods" })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "artifactRef": "custom-1.pdf" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let artifact = service_for(&server)
        .generate_custom("Compare methods")
        .await
        .unwrap();
    assert_eq!(artifact, ArtifactRef("custom-1.pdf".to_string()));
}

#[tokio::test]
async fn fetch_artifact_resolves_relative_and_absolute_references() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/artifacts/report.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"%PDF-1.7".to_vec()))
        .expect(2)
        .mount(&server)
        .await;
    let service = service_for(&server);

    let relative = service
        .fetch_artifact(&ArtifactRef("artifacts/report.pdf".to_string()))
        .await
        .unwrap();
    let absolute = service
        .fetch_artifact(&ArtifactRef(format!("{}/artifacts/report.pdf", server.uri())))
        .await
        .unwrap();
    assert_eq!(&relative[..], b"%PDF-1.7");
    assert_eq!(relative, absolute);
}

#[tokio::test]
async fn fetch_artifact_enforces_the_size_cap() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/big.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0_u8; 64]))
        .mount(&server)
        .await;
    let service = ReqwestAnalysisService::new(ServiceSettings {
        base_url: server.uri(),
        max_artifact_bytes: 16,
        ..ServiceSettings::default()
    })
    .unwrap();

    let err = service
        .fetch_artifact(&ArtifactRef("big.pdf".to_string()))
        .await
        .unwrap_err();
    assert!(matches!(err.kind, FailureKind::TooLarge { max_bytes: 16, .. }));
}

#[tokio::test]
async fn slow_responses_map_to_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/analysis/job-7"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "status": "processing" }))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;
    let service = ReqwestAnalysisService::new(ServiceSettings {
        base_url: server.uri(),
        request_timeout: Duration::from_millis(100),
        ..ServiceSettings::default()
    })
    .unwrap();

    let err = service
        .job_status(&JobHandle("job-7".to_string()))
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::Timeout);
}

#[test]
fn invalid_base_url_is_rejected() {
    let err = ReqwestAnalysisService::new(ServiceSettings {
        base_url: "not a url".to_string(),
        ..ServiceSettings::default()
    })
    .unwrap_err();
    assert_eq!(err.kind, FailureKind::InvalidUrl);
}
