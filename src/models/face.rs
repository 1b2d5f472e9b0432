use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Embedding models understood by the DeepFace service.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, EnumString, Display, PartialEq, Eq, Default)]
pub enum FaceModel {
    #[serde(rename = "VGG-Face")]
    #[strum(serialize = "VGG-Face")]
    VggFace,
    #[default]
    Facenet,
    Facenet512,
    OpenFace,
    DeepFace,
    #[serde(rename = "DeepID")]
    #[strum(serialize = "DeepID")]
    DeepId,
    ArcFace,
    Dlib,
    SFace,
    GhostFaceNet,
}

/// Face detection backends understood by the DeepFace service.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, EnumString, Display, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DetectorBackend {
    #[default]
    Opencv,
    Ssd,
    Dlib,
    Mtcnn,
    Fastmtcnn,
    Retinaface,
    Mediapipe,
    Yolov8,
    Yunet,
    Centerface,
    Skip,
}

/// Distance metric used to compare two embeddings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, EnumString, Display, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DistanceMetric {
    #[default]
    Cosine,
    Euclidean,
    #[serde(rename = "euclidean_l2")]
    #[strum(serialize = "euclidean_l2")]
    EuclideanL2,
}
