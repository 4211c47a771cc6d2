//! Image upload handler

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::extract::AppMultipart;
use crate::services::UploadService;
use crate::AppState;
use shared::ApiResponse;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub image_url: String,
}

/// Accept a single image in the `image` (or `file`) multipart field
pub async fn upload_image(
    State(state): State<AppState>,
    AppMultipart(mut multipart): AppMultipart,
) -> AppResult<impl IntoResponse> {
    let mut upload: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Multipart error: {}", e)))?
    {
        match field.name() {
            Some("image") | Some("file") => {
                let content_type = field.content_type().unwrap_or_default().to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Failed to read file: {}", e)))?;
                upload = Some((content_type, bytes.to_vec()));
            }
            _ => {}
        }
    }

    let (content_type, bytes) =
        upload.ok_or_else(|| AppError::BadRequest("No image file provided".to_string()))?;

    let service = UploadService::new(&state.config);
    let image_url = service.save_image(&content_type, &bytes).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(UploadResponse { image_url }).with_message("Image uploaded successfully")),
    ))
}
