use std::time::Duration;

use bytes::Bytes;
use futures_util::StreamExt;
use reqwest::header::CONTENT_TYPE;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::{
    AnalysisRequest, AnalysisService, ArtifactRef, FailureKind, JobHandle, ServiceError,
    StatusReport,
};

#[derive(Debug, Clone)]
pub struct ServiceSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub max_artifact_bytes: u64,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:3000/".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            max_artifact_bytes: 200 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StartResponse {
    job_id: JobHandle,
}

#[derive(Debug, Serialize)]
struct CustomRequest<'a> {
    prompt: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CustomResponse {
    artifact_ref: ArtifactRef,
}

/// HTTP client for the analysis service.
#[derive(Debug, Clone)]
pub struct ReqwestAnalysisService {
    base: Url,
    client: reqwest::Client,
    max_artifact_bytes: u64,
}

impl ReqwestAnalysisService {
    pub fn new(settings: ServiceSettings) -> Result<Self, ServiceError> {
        let mut raw = settings.base_url.trim().to_string();
        if !raw.ends_with('/') {
            raw.push('/');
        }
        let base = Url::parse(&raw)
            .map_err(|err| ServiceError::new(FailureKind::InvalidUrl, err.to_string()))?;
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| ServiceError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self {
            base,
            client,
            max_artifact_bytes: settings.max_artifact_bytes,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, ServiceError> {
        self.base
            .join(path)
            .map_err(|err| ServiceError::new(FailureKind::InvalidUrl, err.to_string()))
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        url: Url,
        body: &B,
    ) -> Result<T, ServiceError> {
        let payload = serde_json::to_vec(body)
            .map_err(|err| ServiceError::new(FailureKind::Decode, err.to_string()))?;
        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .body(payload)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        read_json(response).await
    }
}

#[async_trait::async_trait]
impl AnalysisService for ReqwestAnalysisService {
    async fn start_analysis(&self, request: &AnalysisRequest) -> Result<JobHandle, ServiceError> {
        let url = self.endpoint("api/analysis")?;
        let started: StartResponse = self.post_json(url, request).await?;
        Ok(started.job_id)
    }

    async fn job_status(&self, job: &JobHandle) -> Result<StatusReport, ServiceError> {
        let mut url = self.endpoint("api/analysis")?;
        url.path_segments_mut()
            .map_err(|()| ServiceError::new(FailureKind::InvalidUrl, "base url cannot hold a path"))?
            .push(&job.0);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        read_json(response).await
    }

    async fn generate_custom(&self, prompt: &str) -> Result<ArtifactRef, ServiceError> {
        let url = self.endpoint("api/custom-analysis")?;
        let generated: CustomResponse = self.post_json(url, &CustomRequest { prompt }).await?;
        Ok(generated.artifact_ref)
    }

    async fn fetch_artifact(&self, artifact: &ArtifactRef) -> Result<Bytes, ServiceError> {
        // Absolute references replace the base entirely.
        let url = self.endpoint(&artifact.0)?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let response = check_status(response)?;

        let max_bytes = self.max_artifact_bytes;
        if let Some(content_len) = response.content_length() {
            if content_len > max_bytes {
                return Err(ServiceError::new(
                    FailureKind::TooLarge {
                        max_bytes,
                        actual: Some(content_len),
                    },
                    "artifact too large",
                ));
            }
        }

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = bytes.len() as u64 + chunk.len() as u64;
            if next_len > max_bytes {
                return Err(ServiceError::new(
                    FailureKind::TooLarge {
                        max_bytes,
                        actual: Some(next_len),
                    },
                    "artifact too large",
                ));
            }
            bytes.extend_from_slice(&chunk);
        }
        Ok(Bytes::from(bytes))
    }
}

fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ServiceError> {
    let status = response.status();
    if status == reqwest::StatusCode::NOT_FOUND {
        return Err(ServiceError::new(FailureKind::NotFound, status.to_string()));
    }
    if !status.is_success() {
        return Err(ServiceError::new(
            FailureKind::HttpStatus(status.as_u16()),
            status.to_string(),
        ));
    }
    Ok(response)
}

async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ServiceError> {
    let response = check_status(response)?;
    let body = response.bytes().await.map_err(map_reqwest_error)?;
    serde_json::from_slice(&body)
        .map_err(|err| ServiceError::new(FailureKind::Decode, err.to_string()))
}

fn map_reqwest_error(err: reqwest::Error) -> ServiceError {
    if err.is_timeout() {
        return ServiceError::new(FailureKind::Timeout, err.to_string());
    }
    ServiceError::new(FailureKind::Network, err.to_string())
}
