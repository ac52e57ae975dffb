//! Per-table access to file-bearing rows.
//!
//! Each file table gets its own concrete queries keyed on its path column;
//! nothing here looks columns up dynamically.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, Set,
};

use crate::entities::{
    cycle_attachment, faulty_part_image, vehicle_document, vehicle_image, wheel_image,
};

/// A persisted row holding a file-valued field.
#[async_trait]
pub trait FileRecord: Sized + Send + Sync {
    /// Table name, for logging.
    const KIND: &'static str;

    fn record_id(&self) -> i32;

    /// Primary key of the owning cycle, vehicle or faulty part.
    fn owner_id(&self) -> i32;

    fn stored_path(&self) -> &str;

    async fn find_persisted(db: &DatabaseConnection, id: i32) -> Result<Option<Self>, DbErr>;

    /// Whether a row other than `exclude_id` stores exactly `path`. Scans the
    /// whole table, not only rows sharing an owner.
    async fn path_referenced_elsewhere(
        db: &DatabaseConnection,
        path: &str,
        exclude_id: i32,
    ) -> Result<bool, DbErr>;

    async fn update_stored_path(db: &DatabaseConnection, id: i32, path: &str)
        -> Result<Self, DbErr>;

    /// Returns the number of rows removed.
    async fn delete_persisted(db: &DatabaseConnection, id: i32) -> Result<u64, DbErr>;
}

#[async_trait]
impl FileRecord for cycle_attachment::Model {
    const KIND: &'static str = "cycle_attachments";

    fn record_id(&self) -> i32 {
        self.id
    }

    fn owner_id(&self) -> i32 {
        self.cycle_id
    }

    fn stored_path(&self) -> &str {
        &self.file
    }

    async fn find_persisted(db: &DatabaseConnection, id: i32) -> Result<Option<Self>, DbErr> {
        cycle_attachment::Entity::find_by_id(id).one(db).await
    }

    async fn path_referenced_elsewhere(
        db: &DatabaseConnection,
        path: &str,
        exclude_id: i32,
    ) -> Result<bool, DbErr> {
        let count = cycle_attachment::Entity::find()
            .filter(cycle_attachment::Column::File.eq(path))
            .filter(cycle_attachment::Column::Id.ne(exclude_id))
            .count(db)
            .await?;
        Ok(count > 0)
    }

    async fn update_stored_path(
        db: &DatabaseConnection,
        id: i32,
        path: &str,
    ) -> Result<Self, DbErr> {
        cycle_attachment::ActiveModel {
            id: Set(id),
            file: Set(path.to_string()),
            ..Default::default()
        }
        .update(db)
        .await
    }

    async fn delete_persisted(db: &DatabaseConnection, id: i32) -> Result<u64, DbErr> {
        let res = cycle_attachment::Entity::delete_by_id(id).exec(db).await?;
        Ok(res.rows_affected)
    }
}

#[async_trait]
impl FileRecord for vehicle_image::Model {
    const KIND: &'static str = "vehicle_images";

    fn record_id(&self) -> i32 {
        self.id
    }

    fn owner_id(&self) -> i32 {
        self.vehicle_id
    }

    fn stored_path(&self) -> &str {
        &self.image
    }

    async fn find_persisted(db: &DatabaseConnection, id: i32) -> Result<Option<Self>, DbErr> {
        vehicle_image::Entity::find_by_id(id).one(db).await
    }

    async fn path_referenced_elsewhere(
        db: &DatabaseConnection,
        path: &str,
        exclude_id: i32,
    ) -> Result<bool, DbErr> {
        let count = vehicle_image::Entity::find()
            .filter(vehicle_image::Column::Image.eq(path))
            .filter(vehicle_image::Column::Id.ne(exclude_id))
            .count(db)
            .await?;
        Ok(count > 0)
    }

    async fn update_stored_path(
        db: &DatabaseConnection,
        id: i32,
        path: &str,
    ) -> Result<Self, DbErr> {
        vehicle_image::ActiveModel {
            id: Set(id),
            image: Set(path.to_string()),
            ..Default::default()
        }
        .update(db)
        .await
    }

    async fn delete_persisted(db: &DatabaseConnection, id: i32) -> Result<u64, DbErr> {
        let res = vehicle_image::Entity::delete_by_id(id).exec(db).await?;
        Ok(res.rows_affected)
    }
}

#[async_trait]
impl FileRecord for wheel_image::Model {
    const KIND: &'static str = "wheel_images";

    fn record_id(&self) -> i32 {
        self.id
    }

    fn owner_id(&self) -> i32 {
        self.vehicle_id
    }

    fn stored_path(&self) -> &str {
        &self.image
    }

    async fn find_persisted(db: &DatabaseConnection, id: i32) -> Result<Option<Self>, DbErr> {
        wheel_image::Entity::find_by_id(id).one(db).await
    }

    async fn path_referenced_elsewhere(
        db: &DatabaseConnection,
        path: &str,
        exclude_id: i32,
    ) -> Result<bool, DbErr> {
        let count = wheel_image::Entity::find()
            .filter(wheel_image::Column::Image.eq(path))
            .filter(wheel_image::Column::Id.ne(exclude_id))
            .count(db)
            .await?;
        Ok(count > 0)
    }

    async fn update_stored_path(
        db: &DatabaseConnection,
        id: i32,
        path: &str,
    ) -> Result<Self, DbErr> {
        wheel_image::ActiveModel {
            id: Set(id),
            image: Set(path.to_string()),
            ..Default::default()
        }
        .update(db)
        .await
    }

    async fn delete_persisted(db: &DatabaseConnection, id: i32) -> Result<u64, DbErr> {
        let res = wheel_image::Entity::delete_by_id(id).exec(db).await?;
        Ok(res.rows_affected)
    }
}

#[async_trait]
impl FileRecord for vehicle_document::Model {
    const KIND: &'static str = "vehicle_documents";

    fn record_id(&self) -> i32 {
        self.id
    }

    fn owner_id(&self) -> i32 {
        self.vehicle_id
    }

    fn stored_path(&self) -> &str {
        &self.document
    }

    async fn find_persisted(db: &DatabaseConnection, id: i32) -> Result<Option<Self>, DbErr> {
        vehicle_document::Entity::find_by_id(id).one(db).await
    }

    async fn path_referenced_elsewhere(
        db: &DatabaseConnection,
        path: &str,
        exclude_id: i32,
    ) -> Result<bool, DbErr> {
        let count = vehicle_document::Entity::find()
            .filter(vehicle_document::Column::Document.eq(path))
            .filter(vehicle_document::Column::Id.ne(exclude_id))
            .count(db)
            .await?;
        Ok(count > 0)
    }

    async fn update_stored_path(
        db: &DatabaseConnection,
        id: i32,
        path: &str,
    ) -> Result<Self, DbErr> {
        vehicle_document::ActiveModel {
            id: Set(id),
            document: Set(path.to_string()),
            ..Default::default()
        }
        .update(db)
        .await
    }

    async fn delete_persisted(db: &DatabaseConnection, id: i32) -> Result<u64, DbErr> {
        let res = vehicle_document::Entity::delete_by_id(id).exec(db).await?;
        Ok(res.rows_affected)
    }
}

#[async_trait]
impl FileRecord for faulty_part_image::Model {
    const KIND: &'static str = "faulty_part_images";

    fn record_id(&self) -> i32 {
        self.id
    }

    fn owner_id(&self) -> i32 {
        self.faulty_part_id
    }

    fn stored_path(&self) -> &str {
        &self.image
    }

    async fn find_persisted(db: &DatabaseConnection, id: i32) -> Result<Option<Self>, DbErr> {
        faulty_part_image::Entity::find_by_id(id).one(db).await
    }

    async fn path_referenced_elsewhere(
        db: &DatabaseConnection,
        path: &str,
        exclude_id: i32,
    ) -> Result<bool, DbErr> {
        let count = faulty_part_image::Entity::find()
            .filter(faulty_part_image::Column::Image.eq(path))
            .filter(faulty_part_image::Column::Id.ne(exclude_id))
            .count(db)
            .await?;
        Ok(count > 0)
    }

    async fn update_stored_path(
        db: &DatabaseConnection,
        id: i32,
        path: &str,
    ) -> Result<Self, DbErr> {
        faulty_part_image::ActiveModel {
            id: Set(id),
            image: Set(path.to_string()),
            ..Default::default()
        }
        .update(db)
        .await
    }

    async fn delete_persisted(db: &DatabaseConnection, id: i32) -> Result<u64, DbErr> {
        let res = faulty_part_image::Entity::delete_by_id(id).exec(db).await?;
        Ok(res.rows_affected)
    }
}
