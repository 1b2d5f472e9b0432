//! Test helper utilities for endpoint tests

use async_trait::async_trait;
use face_verify_hw::{
    app_state::AppState,
    models::verification::{FaceMatch, VerifyOptions},
    routes,
    services::{
        face::{ComparisonError, FaceComparer},
        staging::ScratchDir,
    },
};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use reqwest::multipart;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// Mean-colour "faces": images whose average colours are close are the same person.
pub const PERSON_X_A: [u8; 3] = [200, 60, 50];
pub const PERSON_X_B: [u8; 3] = [205, 55, 52];
pub const PERSON_Y: [u8; 3] = [40, 70, 210];
pub const NO_FACE: [u8; 3] = [0, 0, 0];

const STUB_THRESHOLD: f64 = 0.3;
const MAX_RGB_DISTANCE: f64 = 441.672_955_930_063_7; // sqrt(3 * 255^2)

/// Stand-in for the face service. Compares mean colours of the staged files
/// and remembers every path it was handed.
#[derive(Default)]
pub struct StubComparer {
    seen: Mutex<Vec<PathBuf>>,
}

impl StubComparer {
    pub fn seen_paths(&self) -> Vec<PathBuf> {
        self.seen.lock().unwrap().clone()
    }
}

fn mean_rgb(path: &Path) -> Result<[f64; 3], ComparisonError> {
    let img = image::open(path)
        .map_err(|e| ComparisonError::Rejected(format!("unreadable staged file: {e}")))?;
    let rgb = img.to_rgb8();
    let mut sum = [0f64; 3];
    for pixel in rgb.pixels() {
        for (acc, channel) in sum.iter_mut().zip(pixel.0) {
            *acc += channel as f64;
        }
    }
    let n = (rgb.width() * rgb.height()) as f64;
    Ok(sum.map(|s| s / n))
}

#[async_trait]
impl FaceComparer for StubComparer {
    async fn verify(
        &self,
        img1: &Path,
        img2: &Path,
        options: &VerifyOptions,
    ) -> Result<FaceMatch, ComparisonError> {
        {
            let mut seen = self.seen.lock().unwrap();
            seen.push(img1.to_path_buf());
            seen.push(img2.to_path_buf());
        }

        let mut means = Vec::with_capacity(2);
        for (label, path) in [("img1_path", img1), ("img2_path", img2)] {
            let mean = mean_rgb(path)?;
            if options.enforce_detection && mean.iter().sum::<f64>() / 3.0 < 16.0 {
                return Err(ComparisonError::NoFaceDetected(format!(
                    "Face could not be detected in {label}. Please confirm that the picture is a face photo."
                )));
            }
            means.push(mean);
        }

        let distance = means[0]
            .iter()
            .zip(means[1].iter())
            .map(|(a, b)| (a - b).powi(2))
            .sum::<f64>()
            .sqrt()
            / MAX_RGB_DISTANCE;

        Ok(FaceMatch {
            verified: distance <= STUB_THRESHOLD,
            distance,
            threshold: STUB_THRESHOLD,
        })
    }
}

/// A running server bound to an ephemeral port.
pub struct TestServer {
    pub base_url: String,
    pub scratch: Arc<ScratchDir>,
    pub comparer: Arc<StubComparer>,
    _root: TempDir,
}

impl TestServer {
    /// Files currently left in this server's scratch directory.
    pub fn staged_files(&self) -> Vec<PathBuf> {
        match std::fs::read_dir(self.scratch.path()) {
            Ok(entries) => entries.map(|e| e.unwrap().path()).collect(),
            Err(_) => Vec::new(),
        }
    }

    pub fn verify_url(&self) -> String {
        format!("{}/verify/", self.base_url)
    }
}

pub async fn spawn_server() -> TestServer {
    let root = tempfile::tempdir().expect("Failed to create temp dir");
    let scratch = Arc::new(ScratchDir::create(root.path()).expect("Failed to create scratch dir"));
    let comparer = Arc::new(StubComparer::default());

    let state = AppState {
        comparer: comparer.clone(),
        scratch: scratch.clone(),
        options: VerifyOptions::default(),
    };

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, routes::router(state))
            .await
            .expect("Test server error");
    });

    TestServer {
        base_url: format!("http://{addr}"),
        scratch,
        comparer,
        _root: root,
    }
}

pub fn solid_png(rgb: [u8; 3]) -> Vec<u8> {
    encode(DynamicImage::ImageRgb8(RgbImage::from_pixel(32, 32, Rgb(rgb))), ImageFormat::Png)
}

/// Same colour, but with an alpha channel so staging has to convert it.
pub fn solid_rgba_png(rgb: [u8; 3]) -> Vec<u8> {
    let [r, g, b] = rgb;
    encode(
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(32, 32, Rgba([r, g, b, 255]))),
        ImageFormat::Png,
    )
}

pub fn solid_jpeg(rgb: [u8; 3]) -> Vec<u8> {
    encode(DynamicImage::ImageRgb8(RgbImage::from_pixel(32, 32, Rgb(rgb))), ImageFormat::Jpeg)
}

fn encode(img: DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, format).expect("Failed to encode test image");
    out.into_inner()
}

fn file_part(name: &str, bytes: Vec<u8>) -> multipart::Part {
    multipart::Part::bytes(bytes)
        .file_name(format!("{name}.png"))
        .mime_str("image/png")
        .unwrap()
}

/// POST the given uploads to /verify/ and return status plus JSON body.
pub async fn post_verify(
    client: &reqwest::Client,
    server: &TestServer,
    image1: Option<Vec<u8>>,
    image2: Option<Vec<u8>>,
) -> (reqwest::StatusCode, serde_json::Value) {
    let mut form = multipart::Form::new();
    if let Some(bytes) = image1 {
        form = form.part("image1", file_part("image1", bytes));
    }
    if let Some(bytes) = image2 {
        form = form.part("image2", file_part("image2", bytes));
    }

    let response = client
        .post(server.verify_url())
        .multipart(form)
        .send()
        .await
        .expect("Verify request failed");

    let status = response.status();
    let body = response.json().await.expect("Response was not JSON");
    (status, body)
}
