use serde::Deserialize;
use std::path::PathBuf;

use crate::models::face::{DetectorBackend, DistanceMetric, FaceModel};
use crate::models::verification::VerifyOptions;

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    /// Server bind address (e.g., "0.0.0.0:8000")
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Root for staged uploads; each process works in its own subdirectory
    #[serde(default = "default_scratch_dir")]
    pub scratch_dir: PathBuf,

    /// Base URL of the DeepFace REST server
    #[serde(default = "default_deepface_url")]
    pub deepface_url: String,

    /// Send staged file paths instead of inline images (server shares our filesystem)
    #[serde(default)]
    pub deepface_shared_paths: bool,

    #[serde(default)]
    pub face_model: FaceModel,

    #[serde(default)]
    pub detector_backend: DetectorBackend,

    #[serde(default)]
    pub distance_metric: DistanceMetric,

    /// Fail when no face can be located in either image
    #[serde(default = "default_enforce_detection")]
    pub enforce_detection: bool,

    /// Maximum accepted request body size in bytes
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

fn default_bind_addr() -> String {
    "0.0.0.0:8000".to_string()
}

fn default_scratch_dir() -> PathBuf {
    PathBuf::from("media").join("temp")
}

fn default_deepface_url() -> String {
    "http://127.0.0.1:5005".to_string()
}

fn default_enforce_detection() -> bool {
    true
}

fn default_max_upload_bytes() -> usize {
    10 * 1024 * 1024
}

impl AppConfig {
    pub fn from_env() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }

    pub fn verify_options(&self) -> VerifyOptions {
        VerifyOptions {
            model: self.face_model,
            detector_backend: self.detector_backend,
            distance_metric: self.distance_metric,
            enforce_detection: self.enforce_detection,
        }
    }
}
