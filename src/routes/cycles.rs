use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::config::Config;
use crate::entities::cycle::ControlType;
use crate::entities::cycle_attachment::{self, FileType};
use crate::error::{AppError, FieldErrors};
use crate::models::forms::{CycleForm, CycleUpdate};
use crate::pagination::{PaginatedResponse, Pagination};
use crate::routes::form::FormData;
use crate::services::filter::{FilterParams, RecordFilter};
use crate::services::records::{CycleDetail, DeleteSummary};
use crate::state::AppState;

#[derive(Serialize, utoipa::ToSchema)]
pub struct AttachmentResponse {
    pub id: i32,
    /// Storage path relative to the media root.
    pub file: String,
    pub url: String,
    pub file_type: FileType,
    pub created_at: NaiveDateTime,
}

impl AttachmentResponse {
    pub fn new(model: cycle_attachment::Model, config: &Config) -> Self {
        Self {
            id: model.id,
            url: config.media_url_for(&model.file),
            file: model.file,
            file_type: model.file_type,
            created_at: model.created_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct CycleResponse {
    pub id: i32,
    pub control_type: ControlType,
    pub date: NaiveDate,
    pub cycle_id: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub attachments: Vec<AttachmentResponse>,
}

impl CycleResponse {
    fn new(detail: CycleDetail, config: &Config) -> Self {
        let cycle = detail.cycle;
        Self {
            id: cycle.id,
            control_type: cycle.control_type,
            date: cycle.date,
            cycle_id: cycle.cycle_id,
            created_at: cycle.created_at,
            updated_at: cycle.updated_at,
            attachments: detail
                .attachments
                .into_iter()
                .map(|a| AttachmentResponse::new(a, config))
                .collect(),
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct CycleImage {
    pub url: String,
    pub file_type: FileType,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct CycleImagesResponse {
    pub cycle_id: String,
    pub images: Vec<CycleImage>,
}

/// Absent or blank means photo.
fn file_type_field(form: &FormData) -> Result<FileType, AppError> {
    match form.text("file_type").as_deref().map(str::trim) {
        None | Some("") => Ok(FileType::default()),
        Some(value) => FileType::parse(value).ok_or_else(|| {
            AppError::Validation(FieldErrors::single(
                "file_type",
                format!("Select a valid choice. {value} is not one of the available choices."),
            ))
        }),
    }
}

#[utoipa::path(
    post,
    path = "/cycles",
    request_body(content = Vec<u8>, content_type = "multipart/form-data",
        description = "Fields `control_type`, `date`, `cycle_id`, optional `file_type`, repeated `files`"),
    responses(
        (status = 201, description = "Cycle created", body = CycleResponse),
        (status = 400, description = "Validation failed"),
        (status = 413, description = "Upload too large")
    ),
    tag = "Cycles"
)]
pub async fn create_cycle(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<CycleResponse>), AppError> {
    let mut form = FormData::from_multipart(multipart).await?;
    let new = CycleForm {
        control_type: form.text("control_type"),
        date: form.text("date"),
        cycle_id: form.text("cycle_id"),
    }
    .validate()?;
    let file_type = file_type_field(&form)?;
    let uploads = form.take_files("files");

    let detail = state.records.create_cycle(new, file_type, uploads).await?;
    Ok((
        StatusCode::CREATED,
        Json(CycleResponse::new(detail, &state.config)),
    ))
}

#[utoipa::path(
    get,
    path = "/cycles",
    params(Pagination),
    responses(
        (status = 200, description = "Cycles, newest date first", body = PaginatedResponse<CycleResponse>)
    ),
    tag = "Cycles"
)]
pub async fn list_cycles(
    State(state): State<AppState>,
    Query(pagination): Query<Pagination>,
) -> Result<Json<PaginatedResponse<CycleResponse>>, AppError> {
    let page = state.records.list_cycles(pagination).await?;
    Ok(Json(page.map(|d| CycleResponse::new(d, &state.config))))
}

#[utoipa::path(
    get,
    path = "/cycles/search",
    params(FilterParams, Pagination),
    responses(
        (status = 200, description = "Matching cycles", body = PaginatedResponse<CycleResponse>)
    ),
    tag = "Cycles"
)]
pub async fn search_cycles(
    State(state): State<AppState>,
    Query(params): Query<FilterParams>,
    Query(pagination): Query<Pagination>,
) -> Result<Json<PaginatedResponse<CycleResponse>>, AppError> {
    let filter = RecordFilter::from_params(&params);
    let page = state.records.search_cycles(&filter, pagination).await?;
    Ok(Json(page.map(|d| CycleResponse::new(d, &state.config))))
}

#[utoipa::path(
    get,
    path = "/cycles/{cycle_id}",
    params(("cycle_id" = String, Path, description = "Cycle identifier")),
    responses(
        (status = 200, description = "Cycle with attachments", body = CycleResponse),
        (status = 404, description = "Cycle not found")
    ),
    tag = "Cycles"
)]
pub async fn get_cycle(
    State(state): State<AppState>,
    Path(cycle_id): Path<String>,
) -> Result<Json<CycleResponse>, AppError> {
    let detail = state.records.cycle_detail(&cycle_id).await?;
    Ok(Json(CycleResponse::new(detail, &state.config)))
}

#[utoipa::path(
    put,
    path = "/cycles/{cycle_id}",
    params(("cycle_id" = String, Path, description = "Cycle identifier")),
    request_body = CycleUpdate,
    responses(
        (status = 200, description = "Cycle updated; attachments keep their paths", body = CycleResponse),
        (status = 400, description = "Validation failed"),
        (status = 404, description = "Cycle not found")
    ),
    tag = "Cycles"
)]
pub async fn update_cycle(
    State(state): State<AppState>,
    Path(cycle_id): Path<String>,
    Json(payload): Json<CycleUpdate>,
) -> Result<Json<CycleResponse>, AppError> {
    let patch = payload.validate()?;
    let updated = state.records.update_cycle(&cycle_id, patch).await?;
    let detail = state.records.cycle_detail(&updated.cycle_id).await?;
    Ok(Json(CycleResponse::new(detail, &state.config)))
}

#[utoipa::path(
    delete,
    path = "/cycles/{cycle_id}",
    params(("cycle_id" = String, Path, description = "Cycle identifier")),
    responses(
        (status = 200, description = "Cycle and attachments deleted", body = DeleteSummary),
        (status = 404, description = "Cycle not found")
    ),
    tag = "Cycles"
)]
pub async fn delete_cycle(
    State(state): State<AppState>,
    Path(cycle_id): Path<String>,
) -> Result<Json<DeleteSummary>, AppError> {
    Ok(Json(state.records.delete_cycle(&cycle_id).await?))
}

#[utoipa::path(
    post,
    path = "/cycles/{cycle_id}/attachments",
    params(("cycle_id" = String, Path, description = "Cycle identifier")),
    request_body(content = Vec<u8>, content_type = "multipart/form-data",
        description = "Optional `file_type`, repeated `files`"),
    responses(
        (status = 201, description = "Attachments added", body = Vec<AttachmentResponse>),
        (status = 400, description = "Validation failed"),
        (status = 404, description = "Cycle not found")
    ),
    tag = "Cycles"
)]
pub async fn add_attachments(
    State(state): State<AppState>,
    Path(cycle_id): Path<String>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<Vec<AttachmentResponse>>), AppError> {
    let mut form = FormData::from_multipart(multipart).await?;
    let file_type = file_type_field(&form)?;
    let uploads = form.take_files("files");

    let attachments = state
        .records
        .add_cycle_attachments(&cycle_id, file_type, uploads)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(
            attachments
                .into_iter()
                .map(|a| AttachmentResponse::new(a, &state.config))
                .collect(),
        ),
    ))
}

#[utoipa::path(
    get,
    path = "/api/cycle-images/{cycle_id}",
    params(("cycle_id" = String, Path, description = "Cycle identifier")),
    responses(
        (status = 200, description = "Attachment URLs", body = CycleImagesResponse),
        (status = 404, description = "Cycle not found")
    ),
    tag = "Cycles"
)]
pub async fn cycle_images(
    State(state): State<AppState>,
    Path(cycle_id): Path<String>,
) -> Result<Json<CycleImagesResponse>, AppError> {
    let detail = state.records.cycle_detail(&cycle_id).await?;
    Ok(Json(CycleImagesResponse {
        cycle_id: detail.cycle.cycle_id,
        images: detail
            .attachments
            .iter()
            .map(|a| CycleImage {
                url: state.config.media_url_for(&a.file),
                file_type: a.file_type,
            })
            .collect(),
    }))
}

#[utoipa::path(
    put,
    path = "/attachments/{id}/file",
    params(("id" = i32, Path, description = "Attachment ID")),
    request_body(content = Vec<u8>, content_type = "multipart/form-data",
        description = "One `file`, optional `file_type`"),
    responses(
        (status = 200, description = "File replaced; the previous file is removed when unused", body = AttachmentResponse),
        (status = 400, description = "Validation failed"),
        (status = 404, description = "Attachment not found")
    ),
    tag = "Cycles"
)]
pub async fn replace_attachment_file(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    multipart: Multipart,
) -> Result<Json<AttachmentResponse>, AppError> {
    let mut form = FormData::from_multipart(multipart).await?;
    let file_type = match form.text("file_type") {
        Some(_) => Some(file_type_field(&form)?),
        None => None,
    };
    let upload = form.take_files("file").into_iter().next().ok_or_else(|| {
        AppError::Validation(FieldErrors::single("file", "No file was submitted."))
    })?;

    let attachment = state
        .records
        .replace_attachment_file(id, upload, file_type)
        .await?;
    Ok(Json(AttachmentResponse::new(attachment, &state.config)))
}

#[utoipa::path(
    delete,
    path = "/attachments/{id}",
    params(("id" = i32, Path, description = "Attachment ID")),
    responses(
        (status = 200, description = "Attachment deleted", body = DeleteSummary),
        (status = 404, description = "Attachment not found")
    ),
    tag = "Cycles"
)]
pub async fn delete_attachment(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<DeleteSummary>, AppError> {
    Ok(Json(state.records.delete_attachment(id).await?))
}
