use async_trait::async_trait;
use base64::Engine;
use garde::Validate;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::models::face::{DetectorBackend, DistanceMetric, FaceModel};
use crate::models::verification::{FaceMatch, VerifyOptions};

/// External capability that decides whether two staged images show the same face.
#[async_trait]
pub trait FaceComparer: Send + Sync {
    async fn verify(
        &self,
        img1: &Path,
        img2: &Path,
        options: &VerifyOptions,
    ) -> Result<FaceMatch, ComparisonError>;

    /// Check the capability is reachable (for health checks).
    async fn health_check(&self) -> Result<(), ComparisonError> {
        Ok(())
    }
}

/// Client for a DeepFace REST server.
pub struct DeepFaceClient {
    http: Client,
    base_url: String,
    shared_paths: bool,
}

#[derive(Serialize)]
struct DeepFaceVerifyRequest {
    img1: String,
    img2: String,
    model_name: FaceModel,
    detector_backend: DetectorBackend,
    distance_metric: DistanceMetric,
    enforce_detection: bool,
}

#[derive(Deserialize)]
struct DeepFaceErrorBody {
    error: String,
}

impl DeepFaceClient {
    /// `shared_paths` sends staged paths as-is instead of inlining the image
    /// bytes; only valid when the server can read this process's scratch dir.
    pub fn new(base_url: &str, shared_paths: bool) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            shared_paths,
        }
    }

    async fn image_reference(&self, path: &Path) -> Result<String, ComparisonError> {
        if self.shared_paths {
            return Ok(path.display().to_string());
        }
        let bytes = tokio::fs::read(path).await?;
        Ok(jpeg_data_uri(&bytes))
    }
}

#[async_trait]
impl FaceComparer for DeepFaceClient {
    async fn verify(
        &self,
        img1: &Path,
        img2: &Path,
        options: &VerifyOptions,
    ) -> Result<FaceMatch, ComparisonError> {
        let request = DeepFaceVerifyRequest {
            img1: self.image_reference(img1).await?,
            img2: self.image_reference(img2).await?,
            model_name: options.model,
            detector_backend: options.detector_backend,
            distance_metric: options.distance_metric,
            enforce_detection: options.enforce_detection,
        };

        let response = self
            .http
            .post(format!("{}/verify", self.base_url))
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        parse_verify_response(status, &body)
    }

    async fn health_check(&self) -> Result<(), ComparisonError> {
        self.http
            .get(format!("{}/", self.base_url))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

fn jpeg_data_uri(bytes: &[u8]) -> String {
    format!(
        "data:image/jpeg;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(bytes)
    )
}

/// Map a DeepFace `/verify` response to a decision or a classified error.
fn parse_verify_response(status: StatusCode, body: &str) -> Result<FaceMatch, ComparisonError> {
    if !status.is_success() {
        let message = serde_json::from_str::<DeepFaceErrorBody>(body)
            .map(|b| b.error)
            .unwrap_or_else(|_| format!("face service returned {status}: {body}"));
        return Err(classify_error(message));
    }

    let result: FaceMatch = serde_json::from_str(body)?;
    result.validate()?;
    Ok(result)
}

fn classify_error(message: String) -> ComparisonError {
    if message.to_lowercase().contains("could not be detected") {
        ComparisonError::NoFaceDetected(message)
    } else {
        ComparisonError::Rejected(message)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ComparisonError {
    #[error("{0}")]
    NoFaceDetected(String),

    #[error("{0}")]
    Rejected(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to read staged image: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse face service response: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Face service returned an invalid result: {0}")]
    Invalid(#[from] garde::Report),
}
