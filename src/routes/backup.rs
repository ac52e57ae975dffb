use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
};

use crate::error::AppError;
use crate::services::export::ArchiveExport;
use crate::services::filter::{FilterParams, RecordFilter};
use crate::state::AppState;

/// Quoted `attachment` disposition. Archive names only carry ASCII letters,
/// digits, '-' and '_', anything else is dropped.
fn attachment_disposition(filename: &str) -> String {
    let safe: String = filename
        .chars()
        .filter(|c| c.is_ascii_graphic() && !matches!(c, '"' | ';' | '\\' | '/'))
        .collect();
    let safe = if safe.is_empty() {
        "backup.zip".to_string()
    } else {
        safe
    };
    format!("attachment; filename=\"{}\"", safe)
}

fn archive_response(export: ArchiveExport) -> Response {
    (
        [
            (header::CONTENT_TYPE, "application/zip".to_string()),
            (
                header::CONTENT_DISPOSITION,
                attachment_disposition(&export.filename),
            ),
        ],
        export.bytes,
    )
        .into_response()
}

#[utoipa::path(
    get,
    path = "/backup/cycles",
    params(FilterParams),
    responses(
        (status = 200, description = "Zip of `cycles.json` plus attachment files", content_type = "application/zip")
    ),
    tag = "Backup"
)]
pub async fn backup_cycles(
    State(state): State<AppState>,
    Query(params): Query<FilterParams>,
) -> Result<Response, AppError> {
    let filter = RecordFilter::from_params(&params);
    let export = state.exporter.export_cycles(&filter).await?;
    Ok(archive_response(export))
}

#[utoipa::path(
    get,
    path = "/backup",
    params(FilterParams),
    responses(
        (status = 200, description = "Zip of `vehicles.json` plus every vehicle file", content_type = "application/zip")
    ),
    tag = "Backup"
)]
pub async fn backup_vehicles(
    State(state): State<AppState>,
    Query(params): Query<FilterParams>,
) -> Result<Response, AppError> {
    let filter = RecordFilter::from_params(&params);
    let export = state.exporter.export_vehicles(&filter).await?;
    Ok(archive_response(export))
}
