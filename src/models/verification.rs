use garde::Validate;
use serde::{Deserialize, Serialize};

use crate::models::face::{DetectorBackend, DistanceMetric, FaceModel};

/// Fixed comparison parameters, read once from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerifyOptions {
    pub model: FaceModel,
    pub detector_backend: DetectorBackend,
    pub distance_metric: DistanceMetric,
    /// Fail the comparison when no face is found in either image.
    pub enforce_detection: bool,
}

impl Default for VerifyOptions {
    fn default() -> Self {
        Self {
            model: FaceModel::default(),
            detector_backend: DetectorBackend::default(),
            distance_metric: DistanceMetric::default(),
            enforce_detection: true,
        }
    }
}

/// Decision returned by the face comparison service.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
pub struct FaceMatch {
    #[garde(skip)]
    pub verified: bool,

    #[garde(range(min = 0.0))]
    pub distance: f64,

    #[garde(range(min = 0.0))]
    pub threshold: f64,
}

/// Response body for a successful verification.
#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    pub verified: bool,
    pub distance: f64,
    pub threshold: f64,
    pub model: FaceModel,
    pub detector_backend: DetectorBackend,
}

impl VerifyResponse {
    pub fn new(result: FaceMatch, options: &VerifyOptions) -> Self {
        Self {
            verified: result.verified,
            distance: result.distance,
            threshold: result.threshold,
            model: options.model,
            detector_backend: options.detector_backend,
        }
    }
}

/// Response body for every failed request.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
