use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};

use crate::error::AppError;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/media/{path}",
    params(("path" = String, Path, description = "Storage path relative to the media root")),
    responses(
        (status = 200, description = "Stored file", content_type = "application/octet-stream"),
        (status = 400, description = "Invalid path"),
        (status = 404, description = "File not found")
    ),
    tag = "Media"
)]
pub async fn serve_media(
    State(state): State<AppState>,
    Path(path): Path<String>,
) -> Result<Response, AppError> {
    let data = state
        .storage
        .read(&path)
        .await?
        .ok_or_else(|| AppError::NotFound("File not found".into()))?;
    let content_type = mime_guess::from_path(&path)
        .first_or_octet_stream()
        .to_string();

    Ok((
        [
            (header::CONTENT_TYPE, content_type),
            (header::CACHE_CONTROL, "private, max-age=3600".to_string()),
        ],
        data,
    )
        .into_response())
}
