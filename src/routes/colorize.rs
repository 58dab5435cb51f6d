use axum::extract::{Multipart, Path, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use uuid::Uuid;

use crate::app_state::AppState;
use crate::models::colorize::{StatusResponse, UploadResponse};
use crate::routes::error::{ApiError, ApiResult};

/// POST /api/upload — accept a grayscale SAR image and start a
/// colorization job. Replies with the job id to poll.
pub async fn upload_image(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<Json<UploadResponse>> {
    let mut image_data: Option<Vec<u8>> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| ApiError::InvalidInput("Invalid multipart request body".to_string()))?
    {
        // Both front ends are in circulation: one posts the file as
        // `image`, the other as `file`.
        if !matches!(field.name(), Some("image") | Some("file")) {
            continue;
        }
        if field.file_name().is_none_or(str::is_empty) {
            return Err(ApiError::InvalidInput("No selected file".to_string()));
        }
        let data = field
            .bytes()
            .await
            .map_err(|_| ApiError::InvalidInput("Failed to read uploaded file".to_string()))?;
        image_data = Some(data.to_vec());
    }

    let image =
        image_data.ok_or_else(|| ApiError::InvalidInput("No image file provided".to_string()))?;

    // Reject undecodable uploads before any job record exists.
    image::guess_format(&image)
        .map_err(|_| ApiError::InvalidInput("Uploaded file is not a supported image".to_string()))?;

    let job_id = state.tracker.submit(image);

    Ok(Json(UploadResponse {
        job_id,
        message: "Image uploaded successfully".to_string(),
    }))
}

/// GET /api/status/{job_id} — poll the state of a colorization job.
pub async fn get_status(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> ApiResult<Json<StatusResponse>> {
    let id = parse_job_id(&job_id)?;
    let job = state.tracker.status(id)?;
    Ok(Json(StatusResponse::from_job(&job)))
}

/// GET /api/processed/{job_id} — download the colorized result image.
pub async fn get_processed_image(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let id = parse_job_id(&job_id)?;
    let bytes = state.tracker.result(id).await?;
    let content_type = image::guess_format(&bytes)
        .map(|f| f.to_mime_type())
        .unwrap_or("application/octet-stream");
    Ok(([(header::CONTENT_TYPE, content_type)], bytes))
}

/// Job ids are opaque handles; anything that does not parse as one is an
/// unknown job, not a malformed request.
fn parse_job_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::NotFound)
}
