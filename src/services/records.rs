//! Record store: persistence for assets, their sub-records and their files.
//!
//! Storage paths are derived once, when a file row is created, from the
//! owner's attributes at that moment. Renaming an owner or moving its date
//! never moves files. Backing files are released through the
//! [`FileReaper`] after rows are deleted or a file value is replaced.

use std::sync::Arc;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    LoaderTrait, ModelTrait, PaginatorTrait, QueryFilter, QueryOrder, Select, Set, SqlErr,
    TransactionTrait,
};

use crate::entities::cycle_attachment::FileType;
use crate::entities::{
    cycle, cycle_attachment, faulty_part, faulty_part_image, vehicle, vehicle_document,
    vehicle_image, wheel_image,
};
use crate::error::{AppError, FieldErrors};
use crate::models::forms::{CyclePatch, NewCycle, NewFaultyPart, NewVehicle, VehiclePatch};
use crate::models::kinds::VehicleFileKind;
use crate::pagination::{PaginatedResponse, Pagination};
use crate::services::file_records::FileRecord;
use crate::services::filter::RecordFilter;
use crate::services::reaper::FileReaper;
use crate::services::storage::FileStorage;
use crate::utils::filename::sanitize_upload_name;
use crate::utils::paths::{derive_path, normalize_identifier, FAULTY_PART_IMAGES_PREFIX};

const CYCLE_ID_TAKEN: &str = "Cycle with this Cycle id already exists.";
const CAR_NUMBER_TAKEN: &str = "Vehicle with this Car number already exists.";
const NO_FILES: &str = "No file was submitted.";

/// An uploaded file whose name has been reduced to a safe basename.
#[derive(Debug, Clone)]
pub struct Upload {
    pub filename: String,
    pub data: Vec<u8>,
}

impl Upload {
    /// Sanitizes `raw_name`; failures are reported against `field`.
    pub fn new(field: &str, raw_name: &str, data: Vec<u8>) -> Result<Self, AppError> {
        let filename = sanitize_upload_name(raw_name)
            .map_err(|e| AppError::Validation(FieldErrors::single(field, e.message())))?;
        Ok(Self { filename, data })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CycleDetail {
    pub cycle: cycle::Model,
    pub attachments: Vec<cycle_attachment::Model>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FaultyPartDetail {
    pub part: faulty_part::Model,
    pub images: Vec<faulty_part_image::Model>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VehicleDetail {
    pub vehicle: vehicle::Model,
    pub faulty_parts: Vec<FaultyPartDetail>,
    pub images: Vec<vehicle_image::Model>,
    pub wheel_images: Vec<wheel_image::Model>,
    pub documents: Vec<vehicle_document::Model>,
}

/// A row of one of the three vehicle file tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VehicleFile {
    pub id: i32,
    pub vehicle_id: i32,
    pub kind: VehicleFileKind,
    pub path: String,
}

impl From<vehicle_image::Model> for VehicleFile {
    fn from(model: vehicle_image::Model) -> Self {
        Self {
            id: model.id,
            vehicle_id: model.vehicle_id,
            kind: VehicleFileKind::Image,
            path: model.image,
        }
    }
}

impl From<wheel_image::Model> for VehicleFile {
    fn from(model: wheel_image::Model) -> Self {
        Self {
            id: model.id,
            vehicle_id: model.vehicle_id,
            kind: VehicleFileKind::Wheel,
            path: model.image,
        }
    }
}

impl From<vehicle_document::Model> for VehicleFile {
    fn from(model: vehicle_document::Model) -> Self {
        Self {
            id: model.id,
            vehicle_id: model.vehicle_id,
            kind: VehicleFileKind::Document,
            path: model.document,
        }
    }
}

/// Outcome of a delete: rows removed (owner and children) and backing files
/// the reaper actually deleted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, utoipa::ToSchema)]
pub struct DeleteSummary {
    pub rows: u64,
    pub files_removed: u64,
}

fn unique_violation(err: DbErr, field: &str, message: &str) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            AppError::Validation(FieldErrors::single(field, message))
        }
        _ => AppError::DatabaseError(err),
    }
}

fn require_files<T>(field: &str, files: &[T]) -> Result<(), AppError> {
    if files.is_empty() {
        return Err(AppError::Validation(FieldErrors::single(field, NO_FILES)));
    }
    Ok(())
}

async fn insert_vehicle_file<C: ConnectionTrait>(
    conn: &C,
    kind: VehicleFileKind,
    vehicle_id: i32,
    path: String,
) -> Result<VehicleFile, DbErr> {
    let now = Utc::now().naive_utc();
    let file: VehicleFile = match kind {
        VehicleFileKind::Image => vehicle_image::ActiveModel {
            vehicle_id: Set(vehicle_id),
            image: Set(path),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(conn)
        .await?
        .into(),
        VehicleFileKind::Wheel => wheel_image::ActiveModel {
            vehicle_id: Set(vehicle_id),
            image: Set(path),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(conn)
        .await?
        .into(),
        VehicleFileKind::Document => vehicle_document::ActiveModel {
            vehicle_id: Set(vehicle_id),
            document: Set(path),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(conn)
        .await?
        .into(),
    };
    Ok(file)
}

#[derive(Clone)]
pub struct RecordStore {
    db: DatabaseConnection,
    storage: Arc<dyn FileStorage>,
    reaper: FileReaper,
}

impl RecordStore {
    pub fn new(db: DatabaseConnection, storage: Arc<dyn FileStorage>) -> Self {
        let reaper = FileReaper::new(db.clone(), storage.clone());
        Self {
            db,
            storage,
            reaper,
        }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    pub fn storage(&self) -> &Arc<dyn FileStorage> {
        &self.storage
    }

    /// Writes `data` at `path` (or a free variant of it) and remembers the
    /// stored path so a failed request can discard it.
    async fn store(
        &self,
        path: &str,
        data: &[u8],
        written: &mut Vec<String>,
    ) -> Result<String, AppError> {
        let stored = self.storage.save(path, data).await?;
        tracing::debug!(path = %stored, bytes = data.len(), "Store | wrote file");
        written.push(stored.clone());
        Ok(stored)
    }

    /// Removes files written by a request that did not commit.
    async fn discard(&self, written: &[String]) {
        for path in written {
            if let Err(e) = self.storage.delete(path).await {
                tracing::warn!(path = %path, "Store | failed to discard file: {}", e);
            }
        }
    }

    async fn reap_all<R: FileRecord>(&self, records: &[R]) -> u64 {
        let mut removed = 0;
        for record in records {
            if self.reaper.reap_deleted(record).await {
                removed += 1;
            }
        }
        removed
    }

    /// Stores `data` as the new file of row `id`, releasing the previous
    /// file when nothing else references it.
    async fn replace_file<R: FileRecord>(
        &self,
        id: i32,
        path: &str,
        data: &[u8],
    ) -> Result<R, AppError> {
        let mut written = Vec::new();
        let stored = self.store(path, data, &mut written).await?;
        self.reaper.reap_replaced::<R>(id, &stored).await;

        match R::update_stored_path(&self.db, id, &stored).await {
            Ok(record) => {
                tracing::info!(kind = R::KIND, id, path = %stored, "Store | replaced file");
                Ok(record)
            }
            Err(e) => {
                self.discard(&written).await;
                Err(e.into())
            }
        }
    }

    async fn paginate<E>(
        &self,
        select: Select<E>,
        pagination: Pagination,
    ) -> Result<PaginatedResponse<E::Model>, DbErr>
    where
        E: EntityTrait,
        E::Model: Sync,
    {
        let page = pagination.page();
        let limit = pagination.limit();
        let paginator = select.paginate(&self.db, limit);
        let total_items = paginator.num_items().await?;
        let items = paginator.fetch_page(page - 1).await?;
        Ok(PaginatedResponse::new(items, total_items, page, limit))
    }

    // ---- cycles ----

    async fn ensure_cycle_id_free(&self, cycle_id: &str, exclude: Option<i32>) -> Result<(), AppError> {
        let mut select = cycle::Entity::find().filter(cycle::Column::CycleId.eq(cycle_id));
        if let Some(id) = exclude {
            select = select.filter(cycle::Column::Id.ne(id));
        }
        if select.count(&self.db).await? > 0 {
            return Err(AppError::Validation(FieldErrors::single(
                "cycle_id",
                CYCLE_ID_TAKEN,
            )));
        }
        Ok(())
    }

    async fn insert_attachments<C: ConnectionTrait>(
        &self,
        conn: &C,
        cycle: &cycle::Model,
        file_type: FileType,
        uploads: &[Upload],
        written: &mut Vec<String>,
    ) -> Result<Vec<cycle_attachment::Model>, AppError> {
        let mut attachments = Vec::with_capacity(uploads.len());
        for upload in uploads {
            let path = derive_path(
                cycle.control_type.as_str(),
                cycle.date,
                &cycle.cycle_id,
                &upload.filename,
            );
            let stored = self.store(&path, &upload.data, written).await?;
            let attachment = cycle_attachment::ActiveModel {
                cycle_id: Set(cycle.id),
                file: Set(stored),
                file_type: Set(file_type),
                created_at: Set(Utc::now().naive_utc()),
                ..Default::default()
            }
            .insert(conn)
            .await?;
            attachments.push(attachment);
        }
        Ok(attachments)
    }

    /// Creates a cycle together with its initial attachments. Nothing is
    /// kept, rows or files, when any step fails.
    pub async fn create_cycle(
        &self,
        new: NewCycle,
        file_type: FileType,
        uploads: Vec<Upload>,
    ) -> Result<CycleDetail, AppError> {
        self.ensure_cycle_id_free(&new.cycle_id, None).await?;

        let txn = self.db.begin().await?;
        let mut written = Vec::new();
        let outcome = async {
            let now = Utc::now().naive_utc();
            let cycle = cycle::ActiveModel {
                control_type: Set(new.control_type),
                date: Set(new.date),
                cycle_id: Set(new.cycle_id.clone()),
                created_at: Set(now),
                updated_at: Set(now),
                ..Default::default()
            }
            .insert(&txn)
            .await
            .map_err(|e| unique_violation(e, "cycle_id", CYCLE_ID_TAKEN))?;

            let attachments = self
                .insert_attachments(&txn, &cycle, file_type, &uploads, &mut written)
                .await?;
            txn.commit().await?;
            Ok::<_, AppError>(CycleDetail { cycle, attachments })
        }
        .await;

        match outcome {
            Ok(detail) => {
                tracing::info!(
                    cycle_id = %detail.cycle.cycle_id,
                    attachments = detail.attachments.len(),
                    "Store | created cycle"
                );
                Ok(detail)
            }
            Err(e) => {
                self.discard(&written).await;
                Err(e)
            }
        }
    }

    /// Looks a cycle up by its identifier. Whitespace in `cycle_id` is
    /// normalized the same way it is on save.
    pub async fn find_cycle(&self, cycle_id: &str) -> Result<cycle::Model, AppError> {
        cycle::Entity::find()
            .filter(cycle::Column::CycleId.eq(normalize_identifier(cycle_id)))
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Cycle not found".into()))
    }

    pub async fn cycle_detail(&self, cycle_id: &str) -> Result<CycleDetail, AppError> {
        let cycle = self.find_cycle(cycle_id).await?;
        let attachments = cycle
            .find_related(cycle_attachment::Entity)
            .order_by_asc(cycle_attachment::Column::Id)
            .all(&self.db)
            .await?;
        Ok(CycleDetail { cycle, attachments })
    }

    pub async fn load_cycle_details(
        &self,
        cycles: Vec<cycle::Model>,
    ) -> Result<Vec<CycleDetail>, DbErr> {
        let attachments = cycles.load_many(cycle_attachment::Entity, &self.db).await?;
        Ok(cycles
            .into_iter()
            .zip(attachments)
            .map(|(cycle, attachments)| CycleDetail { cycle, attachments })
            .collect())
    }

    /// Newest date first.
    pub async fn list_cycles(
        &self,
        pagination: Pagination,
    ) -> Result<PaginatedResponse<CycleDetail>, AppError> {
        self.search_cycles(&RecordFilter::default(), pagination).await
    }

    pub async fn search_cycles(
        &self,
        filter: &RecordFilter,
        pagination: Pagination,
    ) -> Result<PaginatedResponse<CycleDetail>, AppError> {
        let select = filter
            .cycles()
            .order_by_desc(cycle::Column::Date)
            .order_by_desc(cycle::Column::Id);
        let page = self.paginate(select, pagination).await?;
        let details = self.load_cycle_details(page.data).await?;
        Ok(PaginatedResponse {
            data: details,
            total_items: page.total_items,
            total_pages: page.total_pages,
            current_page: page.current_page,
            page_size: page.page_size,
        })
    }

    /// Every cycle matching `filter`, oldest first.
    pub async fn select_cycles(&self, filter: &RecordFilter) -> Result<Vec<CycleDetail>, DbErr> {
        let cycles = filter
            .cycles()
            .order_by_asc(cycle::Column::Date)
            .order_by_asc(cycle::Column::Id)
            .all(&self.db)
            .await?;
        self.load_cycle_details(cycles).await
    }

    /// Changes cycle fields. Existing attachments keep their stored paths.
    pub async fn update_cycle(
        &self,
        cycle_id: &str,
        patch: CyclePatch,
    ) -> Result<cycle::Model, AppError> {
        let cycle = self.find_cycle(cycle_id).await?;
        if let Some(new_id) = &patch.cycle_id {
            if *new_id != cycle.cycle_id {
                self.ensure_cycle_id_free(new_id, Some(cycle.id)).await?;
            }
        }

        let mut active: cycle::ActiveModel = cycle.into();
        if let Some(control_type) = patch.control_type {
            active.control_type = Set(control_type);
        }
        if let Some(date) = patch.date {
            active.date = Set(date);
        }
        if let Some(new_id) = patch.cycle_id {
            active.cycle_id = Set(new_id);
        }
        active.updated_at = Set(Utc::now().naive_utc());

        let updated = active
            .update(&self.db)
            .await
            .map_err(|e| unique_violation(e, "cycle_id", CYCLE_ID_TAKEN))?;
        tracing::info!(cycle_id = %updated.cycle_id, "Store | updated cycle");
        Ok(updated)
    }

    pub async fn delete_cycle(&self, cycle_id: &str) -> Result<DeleteSummary, AppError> {
        let cycle = self.find_cycle(cycle_id).await?;
        let attachments = cycle
            .find_related(cycle_attachment::Entity)
            .all(&self.db)
            .await?;

        let txn = self.db.begin().await?;
        let children = cycle_attachment::Entity::delete_many()
            .filter(cycle_attachment::Column::CycleId.eq(cycle.id))
            .exec(&txn)
            .await?
            .rows_affected;
        let owner = cycle::Entity::delete_by_id(cycle.id)
            .exec(&txn)
            .await?
            .rows_affected;
        txn.commit().await?;

        let files_removed = self.reap_all(&attachments).await;
        tracing::info!(
            cycle_id = %cycle.cycle_id,
            attachments = children,
            files_removed,
            "Store | deleted cycle"
        );
        Ok(DeleteSummary {
            rows: owner + children,
            files_removed,
        })
    }

    pub async fn add_cycle_attachments(
        &self,
        cycle_id: &str,
        file_type: FileType,
        uploads: Vec<Upload>,
    ) -> Result<Vec<cycle_attachment::Model>, AppError> {
        require_files("files", &uploads)?;
        let cycle = self.find_cycle(cycle_id).await?;

        let txn = self.db.begin().await?;
        let mut written = Vec::new();
        let outcome = async {
            let attachments = self
                .insert_attachments(&txn, &cycle, file_type, &uploads, &mut written)
                .await?;
            txn.commit().await?;
            Ok::<_, AppError>(attachments)
        }
        .await;

        if outcome.is_err() {
            self.discard(&written).await;
        }
        outcome
    }

    /// Replaces an attachment's file, stored under the cycle's current
    /// control type, date and identifier.
    pub async fn replace_attachment_file(
        &self,
        id: i32,
        upload: Upload,
        file_type: Option<FileType>,
    ) -> Result<cycle_attachment::Model, AppError> {
        let attachment = cycle_attachment::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Attachment not found".into()))?;
        let cycle = cycle::Entity::find_by_id(attachment.owner_id())
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Cycle not found".into()))?;

        let path = derive_path(
            cycle.control_type.as_str(),
            cycle.date,
            &cycle.cycle_id,
            &upload.filename,
        );
        let replaced: cycle_attachment::Model =
            self.replace_file(id, &path, &upload.data).await?;

        match file_type {
            Some(file_type) if file_type != replaced.file_type => {
                let mut active: cycle_attachment::ActiveModel = replaced.into();
                active.file_type = Set(file_type);
                Ok(active.update(&self.db).await?)
            }
            _ => Ok(replaced),
        }
    }

    pub async fn delete_attachment(&self, id: i32) -> Result<DeleteSummary, AppError> {
        self.delete_file_record::<cycle_attachment::Model>(id, "Attachment not found")
            .await
    }

    async fn delete_file_record<R: FileRecord>(
        &self,
        id: i32,
        not_found: &str,
    ) -> Result<DeleteSummary, AppError> {
        let record = R::find_persisted(&self.db, id)
            .await?
            .ok_or_else(|| AppError::NotFound(not_found.to_string()))?;
        let rows = R::delete_persisted(&self.db, id).await?;
        let removed = self.reaper.reap_deleted(&record).await;
        tracing::info!(kind = R::KIND, id, "Store | deleted file row");
        Ok(DeleteSummary {
            rows,
            files_removed: u64::from(removed),
        })
    }

    // ---- vehicles ----

    async fn ensure_car_number_free(
        &self,
        car_number: &str,
        exclude: Option<i32>,
    ) -> Result<(), AppError> {
        let mut select =
            vehicle::Entity::find().filter(vehicle::Column::CarNumber.eq(car_number));
        if let Some(id) = exclude {
            select = select.filter(vehicle::Column::Id.ne(id));
        }
        if select.count(&self.db).await? > 0 {
            return Err(AppError::Validation(FieldErrors::single(
                "car_number",
                CAR_NUMBER_TAKEN,
            )));
        }
        Ok(())
    }

    async fn insert_vehicle_files<C: ConnectionTrait>(
        &self,
        conn: &C,
        vehicle: &vehicle::Model,
        files: &[(VehicleFileKind, Upload)],
        written: &mut Vec<String>,
    ) -> Result<Vec<VehicleFile>, AppError> {
        let mut inserted = Vec::with_capacity(files.len());
        for (kind, upload) in files {
            let path = derive_path(
                kind.prefix(),
                vehicle.entry_date,
                &vehicle.car_number,
                &upload.filename,
            );
            let stored = self.store(&path, &upload.data, written).await?;
            inserted.push(insert_vehicle_file(conn, *kind, vehicle.id, stored).await?);
        }
        Ok(inserted)
    }

    pub async fn create_vehicle(
        &self,
        new: NewVehicle,
        files: Vec<(VehicleFileKind, Upload)>,
    ) -> Result<VehicleDetail, AppError> {
        self.ensure_car_number_free(&new.car_number, None).await?;

        let txn = self.db.begin().await?;
        let mut written = Vec::new();
        let outcome = async {
            let now = Utc::now().naive_utc();
            let vehicle = vehicle::ActiveModel {
                car_number: Set(new.car_number.clone()),
                brand: Set(new.brand.clone()),
                kilometers: Set(new.kilometers),
                cylinder_count: Set(new.cylinder_count),
                mesures: Set(new.mesures.clone()),
                ligne: Set(new.ligne.clone()),
                entry_date: Set(new.entry_date),
                created_at: Set(now),
                updated_at: Set(now),
                ..Default::default()
            }
            .insert(&txn)
            .await
            .map_err(|e| unique_violation(e, "car_number", CAR_NUMBER_TAKEN))?;

            self.insert_vehicle_files(&txn, &vehicle, &files, &mut written)
                .await?;
            txn.commit().await?;
            Ok::<_, AppError>(vehicle)
        }
        .await;

        match outcome {
            Ok(vehicle) => {
                tracing::info!(
                    car_number = %vehicle.car_number,
                    files = written.len(),
                    "Store | created vehicle"
                );
                self.vehicle_detail(vehicle.id).await
            }
            Err(e) => {
                self.discard(&written).await;
                Err(e)
            }
        }
    }

    pub async fn get_vehicle(&self, id: i32) -> Result<vehicle::Model, AppError> {
        vehicle::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Vehicle not found".into()))
    }

    pub async fn vehicle_detail(&self, id: i32) -> Result<VehicleDetail, AppError> {
        let vehicle = self.get_vehicle(id).await?;
        let mut details = self.load_vehicle_details(vec![vehicle]).await?;
        details
            .pop()
            .ok_or_else(|| AppError::NotFound("Vehicle not found".into()))
    }

    pub async fn load_vehicle_details(
        &self,
        vehicles: Vec<vehicle::Model>,
    ) -> Result<Vec<VehicleDetail>, DbErr> {
        let parts = vehicles.load_many(faulty_part::Entity, &self.db).await?;
        let images = vehicles.load_many(vehicle_image::Entity, &self.db).await?;
        let wheels = vehicles.load_many(wheel_image::Entity, &self.db).await?;
        let documents = vehicles.load_many(vehicle_document::Entity, &self.db).await?;

        let mut details = Vec::with_capacity(vehicles.len());
        for ((((vehicle, parts), images), wheel_images), documents) in vehicles
            .into_iter()
            .zip(parts)
            .zip(images)
            .zip(wheels)
            .zip(documents)
        {
            let part_images = parts.load_many(faulty_part_image::Entity, &self.db).await?;
            let faulty_parts = parts
                .into_iter()
                .zip(part_images)
                .map(|(part, images)| FaultyPartDetail { part, images })
                .collect();
            details.push(VehicleDetail {
                vehicle,
                faulty_parts,
                images,
                wheel_images,
                documents,
            });
        }
        Ok(details)
    }

    /// Most recent entry date first.
    pub async fn list_vehicles(
        &self,
        filter: &RecordFilter,
        pagination: Pagination,
    ) -> Result<PaginatedResponse<vehicle::Model>, AppError> {
        let select = filter
            .vehicles()
            .order_by_desc(vehicle::Column::EntryDate)
            .order_by_desc(vehicle::Column::Id);
        Ok(self.paginate(select, pagination).await?)
    }

    /// Every vehicle matching `filter`, oldest entry first.
    pub async fn select_vehicles(
        &self,
        filter: &RecordFilter,
    ) -> Result<Vec<VehicleDetail>, DbErr> {
        let vehicles = filter
            .vehicles()
            .order_by_asc(vehicle::Column::EntryDate)
            .order_by_asc(vehicle::Column::Id)
            .all(&self.db)
            .await?;
        self.load_vehicle_details(vehicles).await
    }

    /// Changes vehicle fields. Existing files keep their stored paths.
    pub async fn update_vehicle(
        &self,
        id: i32,
        patch: VehiclePatch,
    ) -> Result<vehicle::Model, AppError> {
        let vehicle = self.get_vehicle(id).await?;
        if let Some(car_number) = &patch.car_number {
            if *car_number != vehicle.car_number {
                self.ensure_car_number_free(car_number, Some(vehicle.id))
                    .await?;
            }
        }

        let mut active: vehicle::ActiveModel = vehicle.into();
        if let Some(car_number) = patch.car_number {
            active.car_number = Set(car_number);
        }
        if let Some(brand) = patch.brand {
            active.brand = Set(brand);
        }
        if let Some(kilometers) = patch.kilometers {
            active.kilometers = Set(kilometers);
        }
        if let Some(cylinder_count) = patch.cylinder_count {
            active.cylinder_count = Set(cylinder_count);
        }
        if let Some(mesures) = patch.mesures {
            active.mesures = Set(mesures);
        }
        if let Some(ligne) = patch.ligne {
            active.ligne = Set(ligne);
        }
        if let Some(entry_date) = patch.entry_date {
            active.entry_date = Set(entry_date);
        }
        active.updated_at = Set(Utc::now().naive_utc());

        let updated = active
            .update(&self.db)
            .await
            .map_err(|e| unique_violation(e, "car_number", CAR_NUMBER_TAKEN))?;
        tracing::info!(car_number = %updated.car_number, "Store | updated vehicle");
        Ok(updated)
    }

    /// Deletes the vehicle, its faulty parts and every file row below it,
    /// then reaps the backing files.
    pub async fn delete_vehicle(&self, id: i32) -> Result<DeleteSummary, AppError> {
        let detail = self.vehicle_detail(id).await?;
        let part_ids: Vec<i32> = detail.faulty_parts.iter().map(|p| p.part.id).collect();
        let part_images: Vec<faulty_part_image::Model> = detail
            .faulty_parts
            .iter()
            .flat_map(|p| p.images.iter().cloned())
            .collect();

        let txn = self.db.begin().await?;
        let mut rows = 0;
        if !part_ids.is_empty() {
            rows += faulty_part_image::Entity::delete_many()
                .filter(faulty_part_image::Column::FaultyPartId.is_in(part_ids))
                .exec(&txn)
                .await?
                .rows_affected;
        }
        rows += faulty_part::Entity::delete_many()
            .filter(faulty_part::Column::VehicleId.eq(id))
            .exec(&txn)
            .await?
            .rows_affected;
        rows += vehicle_image::Entity::delete_many()
            .filter(vehicle_image::Column::VehicleId.eq(id))
            .exec(&txn)
            .await?
            .rows_affected;
        rows += wheel_image::Entity::delete_many()
            .filter(wheel_image::Column::VehicleId.eq(id))
            .exec(&txn)
            .await?
            .rows_affected;
        rows += vehicle_document::Entity::delete_many()
            .filter(vehicle_document::Column::VehicleId.eq(id))
            .exec(&txn)
            .await?
            .rows_affected;
        rows += vehicle::Entity::delete_by_id(id)
            .exec(&txn)
            .await?
            .rows_affected;
        txn.commit().await?;

        let files_removed = self.reap_all(&detail.images).await
            + self.reap_all(&detail.wheel_images).await
            + self.reap_all(&detail.documents).await
            + self.reap_all(&part_images).await;
        tracing::info!(
            car_number = %detail.vehicle.car_number,
            rows,
            files_removed,
            "Store | deleted vehicle"
        );
        Ok(DeleteSummary {
            rows,
            files_removed,
        })
    }

    pub async fn add_vehicle_files(
        &self,
        vehicle_id: i32,
        files: Vec<(VehicleFileKind, Upload)>,
    ) -> Result<Vec<VehicleFile>, AppError> {
        require_files("files", &files)?;
        let vehicle = self.get_vehicle(vehicle_id).await?;

        let txn = self.db.begin().await?;
        let mut written = Vec::new();
        let outcome = async {
            let inserted = self
                .insert_vehicle_files(&txn, &vehicle, &files, &mut written)
                .await?;
            txn.commit().await?;
            Ok::<_, AppError>(inserted)
        }
        .await;

        if outcome.is_err() {
            self.discard(&written).await;
        }
        outcome
    }

    async fn find_vehicle_file(
        &self,
        kind: VehicleFileKind,
        id: i32,
    ) -> Result<VehicleFile, AppError> {
        let file: Option<VehicleFile> = match kind {
            VehicleFileKind::Image => vehicle_image::Model::find_persisted(&self.db, id)
                .await?
                .map(Into::into),
            VehicleFileKind::Wheel => wheel_image::Model::find_persisted(&self.db, id)
                .await?
                .map(Into::into),
            VehicleFileKind::Document => vehicle_document::Model::find_persisted(&self.db, id)
                .await?
                .map(Into::into),
        };
        file.ok_or_else(|| AppError::NotFound("File not found".into()))
    }

    /// Replaces a vehicle file, stored under the vehicle's current entry
    /// date and car number.
    pub async fn replace_vehicle_file(
        &self,
        kind: VehicleFileKind,
        id: i32,
        upload: Upload,
    ) -> Result<VehicleFile, AppError> {
        let file = self.find_vehicle_file(kind, id).await?;
        let vehicle = self.get_vehicle(file.vehicle_id).await?;
        let path = derive_path(
            kind.prefix(),
            vehicle.entry_date,
            &vehicle.car_number,
            &upload.filename,
        );

        let replaced: VehicleFile = match kind {
            VehicleFileKind::Image => self
                .replace_file::<vehicle_image::Model>(id, &path, &upload.data)
                .await?
                .into(),
            VehicleFileKind::Wheel => self
                .replace_file::<wheel_image::Model>(id, &path, &upload.data)
                .await?
                .into(),
            VehicleFileKind::Document => self
                .replace_file::<vehicle_document::Model>(id, &path, &upload.data)
                .await?
                .into(),
        };
        Ok(replaced)
    }

    pub async fn delete_vehicle_file(
        &self,
        kind: VehicleFileKind,
        id: i32,
    ) -> Result<DeleteSummary, AppError> {
        match kind {
            VehicleFileKind::Image => {
                self.delete_file_record::<vehicle_image::Model>(id, "File not found")
                    .await
            }
            VehicleFileKind::Wheel => {
                self.delete_file_record::<wheel_image::Model>(id, "File not found")
                    .await
            }
            VehicleFileKind::Document => {
                self.delete_file_record::<vehicle_document::Model>(id, "File not found")
                    .await
            }
        }
    }

    // ---- faulty parts ----

    /// Images are stored under the owning vehicle's entry date and car
    /// number.
    pub async fn add_faulty_part(
        &self,
        vehicle_id: i32,
        new: NewFaultyPart,
        images: Vec<Upload>,
    ) -> Result<FaultyPartDetail, AppError> {
        let vehicle = self.get_vehicle(vehicle_id).await?;

        let txn = self.db.begin().await?;
        let mut written = Vec::new();
        let outcome = async {
            let part = faulty_part::ActiveModel {
                vehicle_id: Set(vehicle.id),
                part_name: Set(new.part_name.clone()),
                description: Set(new.description.clone()),
                created_at: Set(Utc::now().naive_utc()),
                ..Default::default()
            }
            .insert(&txn)
            .await?;

            let mut stored_images = Vec::with_capacity(images.len());
            for upload in &images {
                let path = derive_path(
                    FAULTY_PART_IMAGES_PREFIX,
                    vehicle.entry_date,
                    &vehicle.car_number,
                    &upload.filename,
                );
                let stored = self.store(&path, &upload.data, &mut written).await?;
                let image = faulty_part_image::ActiveModel {
                    faulty_part_id: Set(part.id),
                    image: Set(stored),
                    created_at: Set(Utc::now().naive_utc()),
                    ..Default::default()
                }
                .insert(&txn)
                .await?;
                stored_images.push(image);
            }

            txn.commit().await?;
            Ok::<_, AppError>(FaultyPartDetail {
                part,
                images: stored_images,
            })
        }
        .await;

        match outcome {
            Ok(detail) => {
                tracing::info!(
                    car_number = %vehicle.car_number,
                    part = %detail.part.part_name,
                    images = detail.images.len(),
                    "Store | added faulty part"
                );
                Ok(detail)
            }
            Err(e) => {
                self.discard(&written).await;
                Err(e)
            }
        }
    }

    pub async fn delete_faulty_part(&self, id: i32) -> Result<DeleteSummary, AppError> {
        let part = faulty_part::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Faulty part not found".into()))?;
        let images = part
            .find_related(faulty_part_image::Entity)
            .all(&self.db)
            .await?;

        let txn = self.db.begin().await?;
        let children = faulty_part_image::Entity::delete_many()
            .filter(faulty_part_image::Column::FaultyPartId.eq(part.id))
            .exec(&txn)
            .await?
            .rows_affected;
        let owner = faulty_part::Entity::delete_by_id(part.id)
            .exec(&txn)
            .await?
            .rows_affected;
        txn.commit().await?;

        let files_removed = self.reap_all(&images).await;
        Ok(DeleteSummary {
            rows: owner + children,
            files_removed,
        })
    }
}
