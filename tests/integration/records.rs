use asset_vault::entities::cycle::ControlType;
use asset_vault::entities::cycle_attachment::FileType;
use asset_vault::entities::{faulty_part, faulty_part_image, vehicle_image};
use asset_vault::error::AppError;
use asset_vault::models::forms::{CyclePatch, NewCycle, NewFaultyPart, VehiclePatch};
use asset_vault::models::kinds::VehicleFileKind;
use asset_vault::pagination::Pagination;
use asset_vault::services::filter::{FilterParams, RecordFilter};
use sea_orm::{EntityTrait, PaginatorTrait};

use crate::common::{date, upload, TestApp};

#[tokio::test]
async fn create_cycle_stores_files_under_derived_paths() {
    let app = TestApp::spawn().await;

    let detail = app
        .cycle(
            ControlType::Mutation,
            date(2024, 3, 7),
            "AB-12",
            &[("front.jpg", b"front"), ("back.jpg", b"back")],
        )
        .await;

    assert_eq!(detail.attachments.len(), 2);
    assert_eq!(detail.attachments[0].file, "mutation/2024/03/07/AB-12/front.jpg");
    assert_eq!(detail.attachments[1].file, "mutation/2024/03/07/AB-12/back.jpg");
    assert_eq!(
        std::fs::read(app.media_path(&detail.attachments[0].file)).unwrap(),
        b"front"
    );
}

#[tokio::test]
async fn same_filename_twice_gets_a_fresh_name() {
    let app = TestApp::spawn().await;

    let detail = app
        .cycle(
            ControlType::ParcNeuf,
            date(2024, 1, 2),
            "C-1",
            &[("a.jpg", b"one"), ("a.jpg", b"two")],
        )
        .await;

    let first = &detail.attachments[0].file;
    let second = &detail.attachments[1].file;
    assert_eq!(first, "parc_neuf/2024/01/02/C-1/a.jpg");
    assert_ne!(first, second);
    assert!(second.starts_with("parc_neuf/2024/01/02/C-1/a_"));
    assert!(second.ends_with(".jpg"));
    assert_eq!(std::fs::read(app.media_path(second)).unwrap(), b"two");
}

#[tokio::test]
async fn duplicate_cycle_id_is_a_field_error() {
    let app = TestApp::spawn().await;
    app.cycle(ControlType::Mutation, date(2024, 1, 1), "DUP-1", &[("a.jpg", b"a")])
        .await;

    let err = app
        .records()
        .create_cycle(
            NewCycle {
                control_type: ControlType::Duplicata,
                date: date(2024, 2, 1),
                cycle_id: "DUP-1".into(),
            },
            FileType::Photo,
            vec![upload("b.jpg", b"b")],
        )
        .await
        .unwrap_err();

    match err {
        AppError::Validation(fields) => assert!(fields.get("cycle_id").is_some()),
        other => panic!("expected validation error, got {:?}", other),
    }
    assert!(!app.media_exists("duplicata/2024/02/01/DUP-1/b.jpg"));
}

#[tokio::test]
async fn find_cycle_normalizes_whitespace() {
    let app = TestApp::spawn().await;
    app.cycle(ControlType::Mutation, date(2024, 1, 1), "AB-12", &[("a.jpg", b"a")])
        .await;

    let found = app.records().find_cycle("  AB 12 ").await.unwrap();
    assert_eq!(found.cycle_id, "AB-12");

    let missing = app.records().find_cycle("ZZ-99").await;
    assert!(matches!(missing, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn update_cycle_keeps_attachment_paths() {
    let app = TestApp::spawn().await;
    let detail = app
        .cycle(ControlType::Mutation, date(2024, 1, 1), "OLD-1", &[("a.jpg", b"a")])
        .await;
    let stored = detail.attachments[0].file.clone();

    let updated = app
        .records()
        .update_cycle(
            "OLD-1",
            CyclePatch {
                cycle_id: Some("NEW-1".into()),
                date: Some(date(2024, 5, 5)),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.cycle_id, "NEW-1");
    assert_eq!(updated.date, date(2024, 5, 5));

    let reloaded = app.records().cycle_detail("NEW-1").await.unwrap();
    assert_eq!(reloaded.attachments[0].file, stored);
    assert!(app.media_exists(&stored));
}

#[tokio::test]
async fn update_cycle_rejects_taken_identifier() {
    let app = TestApp::spawn().await;
    app.cycle(ControlType::Mutation, date(2024, 1, 1), "A-1", &[("a.jpg", b"a")])
        .await;
    app.cycle(ControlType::Mutation, date(2024, 1, 1), "B-1", &[("b.jpg", b"b")])
        .await;

    let err = app
        .records()
        .update_cycle(
            "B-1",
            CyclePatch {
                cycle_id: Some("A-1".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn search_swaps_reversed_bounds() {
    let app = TestApp::spawn().await;
    for (day, id) in [(1, "D-1"), (10, "D-10"), (20, "D-20")] {
        app.cycle(ControlType::Mutation, date(2024, 6, day), id, &[("a.jpg", b"a")])
            .await;
    }

    let forward = RecordFilter::new(Some(date(2024, 6, 5)), Some(date(2024, 6, 25)), None);
    let reversed = RecordFilter::new(Some(date(2024, 6, 25)), Some(date(2024, 6, 5)), None);
    assert_eq!(forward, reversed);

    let found = app.records().select_cycles(&reversed).await.unwrap();
    let ids: Vec<_> = found.iter().map(|d| d.cycle.cycle_id.as_str()).collect();
    assert_eq!(ids, vec!["D-10", "D-20"]);
}

#[tokio::test]
async fn search_query_matches_normalized_substring() {
    let app = TestApp::spawn().await;
    app.cycle(ControlType::Mutation, date(2024, 1, 1), "AB-12", &[("a.jpg", b"a")])
        .await;
    app.cycle(ControlType::Mutation, date(2024, 1, 2), "CD-34", &[("a.jpg", b"a")])
        .await;

    let filter = RecordFilter::new(None, None, Some("ab 12"));
    let page = app
        .records()
        .search_cycles(&filter, Pagination::default())
        .await
        .unwrap();
    assert_eq!(page.total_items, 1);
    assert_eq!(page.data[0].cycle.cycle_id, "AB-12");
}

#[tokio::test]
async fn like_wildcards_in_query_are_literal() {
    let app = TestApp::spawn().await;
    app.cycle(ControlType::Mutation, date(2024, 1, 1), "AB-12", &[("a.jpg", b"a")])
        .await;

    let filter = RecordFilter::new(None, None, Some("%"));
    let found = app.records().select_cycles(&filter).await.unwrap();
    assert!(found.is_empty());
}

#[tokio::test]
async fn unparsable_date_selects_nothing() {
    let app = TestApp::spawn().await;
    app.cycle(ControlType::Mutation, date(2024, 1, 1), "AB-12", &[("a.jpg", b"a")])
        .await;

    let filter = RecordFilter::from_params(&FilterParams {
        start_date: Some("not-a-date".into()),
        end_date: None,
        q: None,
    });
    let found = app.records().select_cycles(&filter).await.unwrap();
    assert!(found.is_empty());
}

#[tokio::test]
async fn list_cycles_is_newest_first_and_paginated() {
    let app = TestApp::spawn().await;
    for day in 1..=3 {
        app.cycle(
            ControlType::Mutation,
            date(2024, 2, day),
            &format!("P-{day}"),
            &[("a.jpg", b"a")],
        )
        .await;
    }

    let page = app
        .records()
        .list_cycles(Pagination {
            page: Some(1),
            limit: Some(2),
        })
        .await
        .unwrap();
    assert_eq!(page.total_items, 3);
    assert_eq!(page.total_pages, 2);
    let ids: Vec<_> = page.data.iter().map(|d| d.cycle.cycle_id.as_str()).collect();
    assert_eq!(ids, vec!["P-3", "P-2"]);
}

#[tokio::test]
async fn delete_vehicle_removes_rows_files_and_sub_records() {
    let app = TestApp::spawn().await;
    let detail = app
        .vehicle(
            "car-1",
            date(2023, 11, 30),
            &[
                (VehicleFileKind::Image, "a.png", b"a"),
                (VehicleFileKind::Image, "b.png", b"b"),
            ],
        )
        .await;
    let part = app
        .records()
        .add_faulty_part(
            detail.vehicle.id,
            NewFaultyPart {
                part_name: "Bumper".into(),
                description: "Cracked".into(),
            },
            vec![upload("crack.jpg", b"crack")],
        )
        .await
        .unwrap();

    let paths: Vec<String> = detail
        .images
        .iter()
        .map(|i| i.image.clone())
        .chain(part.images.iter().map(|i| i.image.clone()))
        .collect();
    assert_eq!(paths[0], "images/2023/11/30/car-1/a.png");
    assert_eq!(paths[2], "faulty-parts/2023/11/30/car-1/crack.jpg");
    assert!(paths.iter().all(|p| app.media_exists(p)));

    let summary = app.records().delete_vehicle(detail.vehicle.id).await.unwrap();
    assert_eq!(summary.files_removed, 3);
    // vehicle, two images, one part, one part image
    assert_eq!(summary.rows, 5);

    let db = app.records().db();
    assert_eq!(vehicle_image::Entity::find().count(db).await.unwrap(), 0);
    assert_eq!(faulty_part::Entity::find().count(db).await.unwrap(), 0);
    assert_eq!(faulty_part_image::Entity::find().count(db).await.unwrap(), 0);
    assert!(paths.iter().all(|p| !app.media_exists(p)));
    assert!(matches!(
        app.records().get_vehicle(detail.vehicle.id).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn update_vehicle_rejects_taken_car_number() {
    let app = TestApp::spawn().await;
    app.vehicle("car-1", date(2024, 1, 1), &[]).await;
    let second = app.vehicle("car-2", date(2024, 1, 1), &[]).await;

    let err = app
        .records()
        .update_vehicle(
            second.vehicle.id,
            VehiclePatch {
                car_number: Some("car-1".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    match err {
        AppError::Validation(fields) => assert!(fields.get("car_number").is_some()),
        other => panic!("expected validation error, got {:?}", other),
    }
}

#[tokio::test]
async fn list_vehicles_filters_by_entry_date_and_car_number() {
    let app = TestApp::spawn().await;
    app.vehicle("AB-12", date(2024, 1, 5), &[]).await;
    app.vehicle("AB-99", date(2024, 3, 5), &[]).await;
    app.vehicle("XY-1", date(2024, 1, 6), &[]).await;

    let filter = RecordFilter::new(Some(date(2024, 1, 1)), Some(date(2024, 1, 31)), Some("ab"));
    let page = app
        .records()
        .list_vehicles(&filter, Pagination::default())
        .await
        .unwrap();
    assert_eq!(page.total_items, 1);
    assert_eq!(page.data[0].car_number, "AB-12");
}

#[tokio::test]
async fn add_vehicle_files_requires_at_least_one_file() {
    let app = TestApp::spawn().await;
    let detail = app.vehicle("car-1", date(2024, 1, 1), &[]).await;

    let err = app
        .records()
        .add_vehicle_files(detail.vehicle.id, Vec::new())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let added = app
        .records()
        .add_vehicle_files(
            detail.vehicle.id,
            vec![
                (VehicleFileKind::Document, upload("papers.pdf", b"pdf")),
                (VehicleFileKind::Wheel, upload("front-left.jpg", b"wheel")),
            ],
        )
        .await
        .unwrap();
    assert_eq!(added[0].path, "documents/2024/01/01/car-1/papers.pdf");
    assert_eq!(added[1].path, "wheels/2024/01/01/car-1/front-left.jpg");

    let reloaded = app.records().vehicle_detail(detail.vehicle.id).await.unwrap();
    assert_eq!(reloaded.documents.len(), 1);
    assert_eq!(reloaded.wheel_images.len(), 1);
}

#[tokio::test]
async fn delete_faulty_part_releases_its_images() {
    let app = TestApp::spawn().await;
    let detail = app.vehicle("car-1", date(2024, 1, 1), &[]).await;
    let part = app
        .records()
        .add_faulty_part(
            detail.vehicle.id,
            NewFaultyPart {
                part_name: "Mirror".into(),
                description: "Missing".into(),
            },
            vec![upload("m1.jpg", b"1"), upload("m2.jpg", b"2")],
        )
        .await
        .unwrap();

    let summary = app.records().delete_faulty_part(part.part.id).await.unwrap();
    assert_eq!(summary.rows, 3);
    assert_eq!(summary.files_removed, 2);
    assert!(part.images.iter().all(|i| !app.media_exists(&i.image)));
    assert!(app.records().get_vehicle(detail.vehicle.id).await.is_ok());
}
