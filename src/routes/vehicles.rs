use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{NaiveDate, NaiveDateTime, Utc};
use serde::Serialize;

use crate::config::Config;
use crate::entities::{faulty_part_image, vehicle};
use crate::error::{AppError, FieldErrors};
use crate::models::forms::{FaultyPartForm, VehicleForm, VehicleUpdate};
use crate::models::kinds::VehicleFileKind;
use crate::pagination::{PaginatedResponse, Pagination};
use crate::routes::form::FormData;
use crate::services::filter::{FilterParams, RecordFilter};
use crate::services::records::{
    DeleteSummary, FaultyPartDetail, Upload, VehicleDetail, VehicleFile,
};
use crate::state::AppState;

#[derive(Serialize, utoipa::ToSchema)]
pub struct VehicleResponse {
    pub id: i32,
    pub car_number: String,
    pub brand: String,
    pub kilometers: i32,
    pub cylinder_count: i32,
    pub mesures: String,
    pub ligne: String,
    pub entry_date: NaiveDate,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<vehicle::Model> for VehicleResponse {
    fn from(model: vehicle::Model) -> Self {
        Self {
            id: model.id,
            car_number: model.car_number,
            brand: model.brand,
            kilometers: model.kilometers,
            cylinder_count: model.cylinder_count,
            mesures: model.mesures,
            ligne: model.ligne,
            entry_date: model.entry_date,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct VehicleFileResponse {
    pub id: i32,
    pub kind: VehicleFileKind,
    /// Storage path relative to the media root.
    pub path: String,
    pub url: String,
}

impl VehicleFileResponse {
    fn new(file: VehicleFile, config: &Config) -> Self {
        Self {
            id: file.id,
            kind: file.kind,
            url: config.media_url_for(&file.path),
            path: file.path,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct FaultyPartImageResponse {
    pub id: i32,
    pub path: String,
    pub url: String,
}

impl FaultyPartImageResponse {
    fn new(image: faulty_part_image::Model, config: &Config) -> Self {
        Self {
            id: image.id,
            url: config.media_url_for(&image.image),
            path: image.image,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct FaultyPartResponse {
    pub id: i32,
    pub part_name: String,
    pub description: String,
    pub created_at: NaiveDateTime,
    pub images: Vec<FaultyPartImageResponse>,
}

impl FaultyPartResponse {
    fn new(detail: FaultyPartDetail, config: &Config) -> Self {
        Self {
            id: detail.part.id,
            part_name: detail.part.part_name,
            description: detail.part.description,
            created_at: detail.part.created_at,
            images: detail
                .images
                .into_iter()
                .map(|i| FaultyPartImageResponse::new(i, config))
                .collect(),
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct VehicleDetailResponse {
    #[serde(flatten)]
    pub vehicle: VehicleResponse,
    pub faulty_parts: Vec<FaultyPartResponse>,
    pub images: Vec<VehicleFileResponse>,
    pub wheel_images: Vec<VehicleFileResponse>,
    pub documents: Vec<VehicleFileResponse>,
}

impl VehicleDetailResponse {
    fn new(detail: VehicleDetail, config: &Config) -> Self {
        let files = |files: Vec<VehicleFile>| -> Vec<VehicleFileResponse> {
            files
                .into_iter()
                .map(|f| VehicleFileResponse::new(f, config))
                .collect()
        };
        Self {
            vehicle: detail.vehicle.into(),
            faulty_parts: detail
                .faulty_parts
                .into_iter()
                .map(|p| FaultyPartResponse::new(p, config))
                .collect(),
            images: files(detail.images.into_iter().map(Into::into).collect()),
            wheel_images: files(detail.wheel_images.into_iter().map(Into::into).collect()),
            documents: files(detail.documents.into_iter().map(Into::into).collect()),
        }
    }
}

/// Pairs every upload with the vehicle file table its field names.
fn vehicle_uploads(form: &mut FormData) -> Result<Vec<(VehicleFileKind, Upload)>, AppError> {
    let mut errors = FieldErrors::new();
    let mut files = Vec::new();
    for (field, upload) in form.take_all_files() {
        match VehicleFileKind::from_form_field(&field) {
            Some(kind) => files.push((kind, upload)),
            None => errors.add(&field, "Unexpected file field."),
        }
    }
    errors.into_result()?;
    Ok(files)
}

#[utoipa::path(
    post,
    path = "/vehicles",
    request_body(content = Vec<u8>, content_type = "multipart/form-data",
        description = "Vehicle fields plus repeated `vehicle_images`, `wheel_images` and `documents`"),
    responses(
        (status = 201, description = "Vehicle created", body = VehicleDetailResponse),
        (status = 400, description = "Validation failed"),
        (status = 413, description = "Upload too large")
    ),
    tag = "Vehicles"
)]
pub async fn create_vehicle(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<VehicleDetailResponse>), AppError> {
    let mut form = FormData::from_multipart(multipart).await?;
    let new = VehicleForm {
        car_number: form.text("car_number"),
        brand: form.text("brand"),
        kilometers: form.text("kilometers"),
        cylinder_count: form.text("cylinder_count"),
        mesures: form.text("mesures"),
        ligne: form.text("ligne"),
        entry_date: form.text("entry_date"),
    }
    .validate(Utc::now().date_naive())?;
    let files = vehicle_uploads(&mut form)?;

    let detail = state.records.create_vehicle(new, files).await?;
    Ok((
        StatusCode::CREATED,
        Json(VehicleDetailResponse::new(detail, &state.config)),
    ))
}

#[utoipa::path(
    get,
    path = "/vehicles",
    params(FilterParams, Pagination),
    responses(
        (status = 200, description = "Vehicles, latest entry first", body = PaginatedResponse<VehicleResponse>)
    ),
    tag = "Vehicles"
)]
pub async fn list_vehicles(
    State(state): State<AppState>,
    Query(params): Query<FilterParams>,
    Query(pagination): Query<Pagination>,
) -> Result<Json<PaginatedResponse<VehicleResponse>>, AppError> {
    let filter = RecordFilter::from_params(&params);
    let page = state.records.list_vehicles(&filter, pagination).await?;
    Ok(Json(page.map(VehicleResponse::from)))
}

#[utoipa::path(
    get,
    path = "/vehicles/{id}",
    params(("id" = i32, Path, description = "Vehicle ID")),
    responses(
        (status = 200, description = "Vehicle with faulty parts and files", body = VehicleDetailResponse),
        (status = 404, description = "Vehicle not found")
    ),
    tag = "Vehicles"
)]
pub async fn get_vehicle(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<VehicleDetailResponse>, AppError> {
    let detail = state.records.vehicle_detail(id).await?;
    Ok(Json(VehicleDetailResponse::new(detail, &state.config)))
}

#[utoipa::path(
    put,
    path = "/vehicles/{id}",
    params(("id" = i32, Path, description = "Vehicle ID")),
    request_body = VehicleUpdate,
    responses(
        (status = 200, description = "Vehicle updated; files keep their paths", body = VehicleResponse),
        (status = 400, description = "Validation failed"),
        (status = 404, description = "Vehicle not found")
    ),
    tag = "Vehicles"
)]
pub async fn update_vehicle(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<VehicleUpdate>,
) -> Result<Json<VehicleResponse>, AppError> {
    let patch = payload.validate()?;
    let updated = state.records.update_vehicle(id, patch).await?;
    Ok(Json(updated.into()))
}

#[utoipa::path(
    delete,
    path = "/vehicles/{id}",
    params(("id" = i32, Path, description = "Vehicle ID")),
    responses(
        (status = 200, description = "Vehicle, faulty parts and files deleted", body = DeleteSummary),
        (status = 404, description = "Vehicle not found")
    ),
    tag = "Vehicles"
)]
pub async fn delete_vehicle(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<DeleteSummary>, AppError> {
    Ok(Json(state.records.delete_vehicle(id).await?))
}

#[utoipa::path(
    post,
    path = "/vehicles/{id}/files",
    params(("id" = i32, Path, description = "Vehicle ID")),
    request_body(content = Vec<u8>, content_type = "multipart/form-data",
        description = "Repeated `vehicle_images`, `wheel_images` and `documents`"),
    responses(
        (status = 201, description = "Files added", body = Vec<VehicleFileResponse>),
        (status = 400, description = "Validation failed"),
        (status = 404, description = "Vehicle not found")
    ),
    tag = "Vehicles"
)]
pub async fn add_vehicle_files(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<Vec<VehicleFileResponse>>), AppError> {
    let mut form = FormData::from_multipart(multipart).await?;
    let files = vehicle_uploads(&mut form)?;

    let added = state.records.add_vehicle_files(id, files).await?;
    Ok((
        StatusCode::CREATED,
        Json(
            added
                .into_iter()
                .map(|f| VehicleFileResponse::new(f, &state.config))
                .collect(),
        ),
    ))
}

#[utoipa::path(
    put,
    path = "/vehicles/files/{kind}/{file_id}",
    params(
        ("kind" = VehicleFileKind, Path, description = "images, wheels or documents"),
        ("file_id" = i32, Path, description = "File row ID")
    ),
    request_body(content = Vec<u8>, content_type = "multipart/form-data", description = "One `file`"),
    responses(
        (status = 200, description = "File replaced; the previous file is removed when unused", body = VehicleFileResponse),
        (status = 400, description = "Validation failed"),
        (status = 404, description = "File not found")
    ),
    tag = "Vehicles"
)]
pub async fn replace_vehicle_file(
    State(state): State<AppState>,
    Path((kind, file_id)): Path<(VehicleFileKind, i32)>,
    multipart: Multipart,
) -> Result<Json<VehicleFileResponse>, AppError> {
    let mut form = FormData::from_multipart(multipart).await?;
    let upload = form.take_files("file").into_iter().next().ok_or_else(|| {
        AppError::Validation(FieldErrors::single("file", "No file was submitted."))
    })?;

    let file = state
        .records
        .replace_vehicle_file(kind, file_id, upload)
        .await?;
    Ok(Json(VehicleFileResponse::new(file, &state.config)))
}

#[utoipa::path(
    delete,
    path = "/vehicles/files/{kind}/{file_id}",
    params(
        ("kind" = VehicleFileKind, Path, description = "images, wheels or documents"),
        ("file_id" = i32, Path, description = "File row ID")
    ),
    responses(
        (status = 200, description = "File deleted", body = DeleteSummary),
        (status = 404, description = "File not found")
    ),
    tag = "Vehicles"
)]
pub async fn delete_vehicle_file(
    State(state): State<AppState>,
    Path((kind, file_id)): Path<(VehicleFileKind, i32)>,
) -> Result<Json<DeleteSummary>, AppError> {
    Ok(Json(state.records.delete_vehicle_file(kind, file_id).await?))
}

#[utoipa::path(
    post,
    path = "/vehicles/{id}/faulty-parts",
    params(("id" = i32, Path, description = "Vehicle ID")),
    request_body(content = Vec<u8>, content_type = "multipart/form-data",
        description = "Fields `part_name`, `description`, repeated `images`"),
    responses(
        (status = 201, description = "Faulty part added", body = FaultyPartResponse),
        (status = 400, description = "Validation failed"),
        (status = 404, description = "Vehicle not found")
    ),
    tag = "Vehicles"
)]
pub async fn add_faulty_part(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<FaultyPartResponse>), AppError> {
    let mut form = FormData::from_multipart(multipart).await?;
    let new = FaultyPartForm {
        part_name: form.text("part_name"),
        description: form.text("description"),
    }
    .validate()?;
    let images = form.take_files("images");

    let part = state.records.add_faulty_part(id, new, images).await?;
    Ok((
        StatusCode::CREATED,
        Json(FaultyPartResponse::new(part, &state.config)),
    ))
}

#[utoipa::path(
    delete,
    path = "/faulty-parts/{id}",
    params(("id" = i32, Path, description = "Faulty part ID")),
    responses(
        (status = 200, description = "Faulty part and its images deleted", body = DeleteSummary),
        (status = 404, description = "Faulty part not found")
    ),
    tag = "Vehicles"
)]
pub async fn delete_faulty_part(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<DeleteSummary>, AppError> {
    Ok(Json(state.records.delete_faulty_part(id).await?))
}
