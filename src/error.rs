use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::models::verification::ErrorResponse;
use crate::services::face::ComparisonError;
use crate::services::staging::StageError;

pub const MISSING_INPUT_MESSAGE: &str =
    "Both 'image1' and 'image2' files are required in the request.";

/// Every way a verification request can fail.
#[derive(Debug, thiserror::Error)]
pub enum VerifyError {
    #[error("{}", MISSING_INPUT_MESSAGE)]
    MissingInput,

    #[error("invalid upload: {0}")]
    Upload(#[from] MultipartError),

    #[error("could not decode {field}: {source}")]
    Decode {
        field: &'static str,
        #[source]
        source: image::ImageError,
    },

    #[error("{0}")]
    NoFaceDetected(String),

    #[error("{0}")]
    Staging(String),

    #[error("{0}")]
    Comparison(ComparisonError),
}

impl VerifyError {
    pub fn staging(field: &'static str, err: StageError) -> Self {
        match err {
            StageError::Decode(source) => Self::Decode { field, source },
            other => Self::Staging(other.to_string()),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::MissingInput => StatusCode::BAD_REQUEST,
            Self::Upload(err) => err.status(),
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short label used for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingInput => "missing_input",
            Self::Upload(_) => "invalid_upload",
            Self::Decode { .. } => "decode_failure",
            Self::NoFaceDetected(_) => "no_face_detected",
            Self::Staging(_) | Self::Comparison(_) => "internal_failure",
        }
    }

    pub fn message(&self) -> String {
        match self {
            Self::MissingInput => self.to_string(),
            Self::Upload(err) => err.body_text(),
            _ => format!("Error during face verification: {self}"),
        }
    }
}

impl From<ComparisonError> for VerifyError {
    fn from(err: ComparisonError) -> Self {
        match err {
            ComparisonError::NoFaceDetected(message) => Self::NoFaceDetected(message),
            other => Self::Comparison(other),
        }
    }
}

impl From<tokio::task::JoinError> for VerifyError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Staging(format!("staging task failed: {err}"))
    }
}

impl IntoResponse for VerifyError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(kind = self.kind(), error = %self, "Face verification failed");
        } else {
            tracing::warn!(kind = self.kind(), error = %self, "Rejected verification request");
        }

        (
            status,
            Json(ErrorResponse {
                error: self.message(),
            }),
        )
            .into_response()
    }
}
