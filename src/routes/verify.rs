use axum::body::Bytes;
use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::Json;
use std::sync::Arc;
use std::time::Instant;

use crate::app_state::AppState;
use crate::error::VerifyError;
use crate::models::verification::VerifyResponse;
use crate::services::staging::{ScratchDir, StagedImage};

/// POST /verify/ — Compare the faces in two uploaded images.
///
/// Expects multipart file fields `image1` and `image2`. Staged copies of both
/// uploads are removed before the response is sent, whatever the outcome.
pub async fn verify_faces(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<VerifyResponse>, VerifyError> {
    let start = Instant::now();
    let result = run_verification(&state, multipart).await;

    let outcome = match &result {
        Ok(response) if response.verified => "verified",
        Ok(_) => "not_verified",
        Err(e) => e.kind(),
    };
    metrics::counter!("face_verifications_total", "outcome" => outcome).increment(1);
    metrics::histogram!("face_verification_seconds").record(start.elapsed().as_secs_f64());

    result.map(Json)
}

async fn run_verification(
    state: &AppState,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<VerifyResponse, VerifyError> {
    let Ok(mut multipart) = multipart else {
        return Err(VerifyError::MissingInput);
    };

    let mut image1: Option<Bytes> = None;
    let mut image2: Option<Bytes> = None;

    while let Some(field) = multipart.next_field().await? {
        // Only file parts count; browsers send an unselected file input with an empty filename.
        if matches!(field.file_name(), None | Some("")) {
            continue;
        }
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("image1") => image1 = Some(field.bytes().await?),
            Some("image2") => image2 = Some(field.bytes().await?),
            _ => {}
        }
    }

    let (Some(image1), Some(image2)) = (image1, image2) else {
        return Err(VerifyError::MissingInput);
    };

    let staged1 = stage(&state.scratch, "image1", image1).await?;
    let staged2 = stage(&state.scratch, "image2", image2).await?;

    tracing::debug!(
        image1 = %staged1.path().display(),
        image2 = %staged2.path().display(),
        "Staged uploads for comparison"
    );

    let result = state
        .comparer
        .verify(staged1.path(), staged2.path(), &state.options)
        .await?;

    tracing::info!(
        verified = result.verified,
        distance = result.distance,
        threshold = result.threshold,
        model = %state.options.model,
        detector_backend = %state.options.detector_backend,
        "Face verification completed"
    );

    Ok(VerifyResponse::new(result, &state.options))
}

/// Decode and write one upload on the blocking pool.
async fn stage(
    scratch: &Arc<ScratchDir>,
    field: &'static str,
    bytes: Bytes,
) -> Result<StagedImage, VerifyError> {
    let scratch = Arc::clone(scratch);
    tokio::task::spawn_blocking(move || scratch.stage(&bytes))
        .await?
        .map_err(|e| VerifyError::staging(field, e))
}
