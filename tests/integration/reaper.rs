use asset_vault::entities::cycle::ControlType;
use asset_vault::entities::cycle_attachment::{self, FileType};
use asset_vault::entities::vehicle_image;
use asset_vault::models::kinds::VehicleFileKind;
use asset_vault::services::reaper::FileReaper;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, Set};

use crate::common::{date, upload, TestApp};

async fn share_vehicle_image(app: &TestApp, vehicle_id: i32, path: &str) -> vehicle_image::Model {
    vehicle_image::ActiveModel {
        vehicle_id: Set(vehicle_id),
        image: Set(path.to_string()),
        created_at: Set(Utc::now().naive_utc()),
        ..Default::default()
    }
    .insert(app.records().db())
    .await
    .unwrap()
}

#[tokio::test]
async fn last_reference_delete_removes_the_file() {
    let app = TestApp::spawn().await;
    let detail = app
        .vehicle("car-1", date(2024, 1, 1), &[(VehicleFileKind::Image, "a.png", b"a")])
        .await;
    let image = &detail.images[0];
    assert!(app.media_exists(&image.image));

    let summary = app
        .records()
        .delete_vehicle_file(VehicleFileKind::Image, image.id)
        .await
        .unwrap();
    assert_eq!(summary.rows, 1);
    assert_eq!(summary.files_removed, 1);
    assert!(!app.media_exists(&image.image));
}

#[tokio::test]
async fn shared_path_survives_until_last_row_goes() {
    let app = TestApp::spawn().await;
    let detail = app
        .vehicle("car-1", date(2024, 1, 1), &[(VehicleFileKind::Image, "a.png", b"a")])
        .await;
    let original = detail.images[0].clone();
    let other = app.vehicle("car-2", date(2024, 1, 1), &[]).await;
    let shared = share_vehicle_image(&app, other.vehicle.id, &original.image).await;

    let first = app
        .records()
        .delete_vehicle_file(VehicleFileKind::Image, original.id)
        .await
        .unwrap();
    assert_eq!(first.files_removed, 0);
    assert!(app.media_exists(&original.image));

    let second = app
        .records()
        .delete_vehicle_file(VehicleFileKind::Image, shared.id)
        .await
        .unwrap();
    assert_eq!(second.files_removed, 1);
    assert!(!app.media_exists(&original.image));
}

#[tokio::test]
async fn deleting_one_vehicle_keeps_a_path_another_still_uses() {
    let app = TestApp::spawn().await;
    let first = app
        .vehicle("car-1", date(2024, 1, 1), &[(VehicleFileKind::Image, "a.png", b"a")])
        .await;
    let path = first.images[0].image.clone();
    let second = app.vehicle("car-2", date(2024, 1, 1), &[]).await;
    share_vehicle_image(&app, second.vehicle.id, &path).await;

    let summary = app.records().delete_vehicle(first.vehicle.id).await.unwrap();
    assert_eq!(summary.files_removed, 0);
    assert!(app.media_exists(&path));

    let remaining = app.records().vehicle_detail(second.vehicle.id).await.unwrap();
    assert_eq!(remaining.images[0].image, path);
}

#[tokio::test]
async fn replacing_a_file_releases_the_old_path() {
    let app = TestApp::spawn().await;
    let detail = app
        .cycle(ControlType::Mutation, date(2024, 4, 1), "R-1", &[("old.jpg", b"old")])
        .await;
    let old = detail.attachments[0].clone();

    let replaced = app
        .records()
        .replace_attachment_file(old.id, upload("new.jpg", b"new"), Some(FileType::Video))
        .await
        .unwrap();

    assert_eq!(replaced.id, old.id);
    assert_eq!(replaced.file, "mutation/2024/04/01/R-1/new.jpg");
    assert_eq!(replaced.file_type, FileType::Video);
    assert!(!app.media_exists(&old.file));
    assert_eq!(std::fs::read(app.media_path(&replaced.file)).unwrap(), b"new");
}

#[tokio::test]
async fn replacing_a_shared_file_keeps_the_old_path() {
    let app = TestApp::spawn().await;
    let detail = app
        .cycle(ControlType::Mutation, date(2024, 4, 1), "R-1", &[("old.jpg", b"old")])
        .await;
    let old = detail.attachments[0].clone();
    let other = app
        .cycle(ControlType::Duplicata, date(2024, 4, 2), "R-2", &[])
        .await;
    cycle_attachment::ActiveModel {
        cycle_id: Set(other.cycle.id),
        file: Set(old.file.clone()),
        file_type: Set(FileType::Photo),
        created_at: Set(Utc::now().naive_utc()),
        ..Default::default()
    }
    .insert(app.records().db())
    .await
    .unwrap();

    app.records()
        .replace_attachment_file(old.id, upload("new.jpg", b"new"), None)
        .await
        .unwrap();
    assert!(app.media_exists(&old.file));
}

#[tokio::test]
async fn replacing_with_an_identical_name_keeps_both_files_distinct() {
    let app = TestApp::spawn().await;
    let detail = app
        .vehicle("car-1", date(2024, 1, 1), &[(VehicleFileKind::Document, "p.pdf", b"v1")])
        .await;
    let old = detail.documents[0].clone();

    let replaced = app
        .records()
        .replace_vehicle_file(VehicleFileKind::Document, old.id, upload("p.pdf", b"v2"))
        .await
        .unwrap();

    assert_ne!(replaced.path, old.document);
    assert!(!app.media_exists(&old.document));
    assert_eq!(std::fs::read(app.media_path(&replaced.path)).unwrap(), b"v2");
}

#[tokio::test]
async fn reaping_an_already_missing_file_reports_nothing_removed() {
    let app = TestApp::spawn().await;
    let detail = app
        .vehicle("car-1", date(2024, 1, 1), &[(VehicleFileKind::Wheel, "w.jpg", b"w")])
        .await;
    let wheel = detail.wheel_images[0].clone();
    std::fs::remove_file(app.media_path(&wheel.image)).unwrap();

    let reaper = FileReaper::new(app.records().db().clone(), app.records().storage().clone());
    assert!(!reaper.reap_deleted(&wheel).await);
}
