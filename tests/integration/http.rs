use axum::http::{header, Method, StatusCode};
use serde_json::json;

use asset_vault::entities::cycle::ControlType;
use asset_vault::models::kinds::VehicleFileKind;

use crate::common::{date, TestApp};

const CYCLE_FIELDS: [(&str, &str); 3] = [
    ("control_type", "mutation"),
    ("date", "2024-03-07"),
    ("cycle_id", "AB 12"),
];

#[tokio::test]
async fn health_reports_database_up() {
    let app = TestApp::spawn().await;
    let res = app.get("/health").await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json()["database"], "ok");
}

#[tokio::test]
async fn create_cycle_over_multipart() {
    let app = TestApp::spawn().await;

    let res = app
        .send_multipart(
            Method::POST,
            "/cycles",
            &CYCLE_FIELDS,
            &[("files", "front photo.jpg", b"front")],
        )
        .await;

    assert_eq!(res.status, StatusCode::CREATED);
    let body = res.json();
    assert_eq!(body["cycle_id"], "AB-12");
    assert_eq!(body["control_type"], "mutation");
    assert_eq!(
        body["attachments"][0]["file"],
        "mutation/2024/03/07/AB-12/front_photo.jpg"
    );
    assert_eq!(
        body["attachments"][0]["url"],
        "/media/mutation/2024/03/07/AB-12/front_photo.jpg"
    );
    assert_eq!(body["attachments"][0]["file_type"], "photo");
}

#[tokio::test]
async fn create_cycle_reports_every_invalid_field() {
    let app = TestApp::spawn().await;

    let res = app
        .send_multipart(
            Method::POST,
            "/cycles",
            &[("control_type", "inspection"), ("date", "07/03/2024")],
            &[],
        )
        .await;

    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    let fields = &res.json()["fields"];
    assert!(fields["control_type"].is_string());
    assert!(fields["date"].is_string());
    assert!(fields["cycle_id"].is_string());
}

#[tokio::test]
async fn duplicate_cycle_id_over_http_is_400() {
    let app = TestApp::spawn().await;
    app.cycle(ControlType::Mutation, date(2024, 1, 1), "AB-12", &[("a.jpg", b"a")])
        .await;

    let res = app
        .send_multipart(Method::POST, "/cycles", &CYCLE_FIELDS, &[("files", "b.jpg", b"b")])
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert!(res.json()["fields"]["cycle_id"].is_string());
    assert!(!app.media_exists("mutation/2024/03/07/AB-12/b.jpg"));
}

#[tokio::test]
async fn unknown_records_are_404() {
    let app = TestApp::spawn().await;

    assert_eq!(app.get("/cycles/NOPE").await.status, StatusCode::NOT_FOUND);
    assert_eq!(app.get("/vehicles/999").await.status, StatusCode::NOT_FOUND);
    assert_eq!(app.delete("/attachments/999").await.status, StatusCode::NOT_FOUND);
    assert_eq!(
        app.get("/api/cycle-images/NOPE").await.status,
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        app.delete("/vehicles/files/images/999").await.status,
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
async fn huge_page_number_returns_an_empty_page() {
    let app = TestApp::spawn().await;
    app.cycle(ControlType::Mutation, date(2024, 1, 1), "AB-12", &[("a.jpg", b"a")])
        .await;

    for uri in [
        "/cycles?page=18446744073709551615&limit=100",
        "/cycles/search?page=18446744073709551615&q=AB",
        "/vehicles?page=18446744073709551615",
    ] {
        let res = app.get(uri).await;
        assert_eq!(res.status, StatusCode::OK, "{uri}");
        let body = res.json();
        assert!(body["data"].as_array().unwrap().is_empty(), "{uri}");
    }
    let body = app.get("/cycles?page=18446744073709551615&limit=100").await.json();
    assert_eq!(body["total_items"], 1);
}

#[tokio::test]
async fn update_cycle_over_json() {
    let app = TestApp::spawn().await;
    app.cycle(ControlType::Mutation, date(2024, 1, 1), "AB-12", &[("a.jpg", b"a")])
        .await;

    let res = app
        .put_json("/cycles/AB-12", &json!({ "control_type": "duplicata" }))
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json()["control_type"], "duplicata");

    let bad = app.put_json("/cycles/AB-12", &json!({ "date": "soon" })).await;
    assert_eq!(bad.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn cycle_images_lists_media_urls() {
    let app = TestApp::spawn().await;
    app.cycle(ControlType::ParcNeuf, date(2024, 2, 2), "PN-1", &[("a.jpg", b"a")])
        .await;

    let res = app.get("/api/cycle-images/PN-1").await;
    assert_eq!(res.status, StatusCode::OK);
    let body = res.json();
    assert_eq!(body["cycle_id"], "PN-1");
    assert_eq!(body["images"][0]["url"], "/media/parc_neuf/2024/02/02/PN-1/a.jpg");
}

#[tokio::test]
async fn media_is_served_with_guessed_content_type() {
    let app = TestApp::spawn().await;
    let detail = app
        .cycle(ControlType::Mutation, date(2024, 1, 1), "M-1", &[("pic.png", b"png-bytes")])
        .await;

    let res = app
        .get(&format!("/media/{}", detail.attachments[0].file))
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.header(header::CONTENT_TYPE), "image/png");
    assert_eq!(res.bytes, b"png-bytes");

    let missing = app.get("/media/mutation/2024/01/01/M-1/none.png").await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn create_vehicle_rejects_unknown_file_field() {
    let app = TestApp::spawn().await;

    let res = app
        .send_multipart(
            Method::POST,
            "/vehicles",
            &[
                ("car_number", "car-1"),
                ("brand", "Peugeot"),
                ("kilometers", "1000"),
                ("cylinder_count", "4"),
                ("mesures", "OK"),
                ("ligne", "L2"),
            ],
            &[("photos", "a.jpg", b"a")],
        )
        .await;

    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert!(res.json()["fields"]["photos"].is_string());
}

#[tokio::test]
async fn vehicle_lifecycle_over_http() {
    let app = TestApp::spawn().await;

    let created = app
        .send_multipart(
            Method::POST,
            "/vehicles",
            &[
                ("car_number", "car 1"),
                ("brand", "Peugeot"),
                ("kilometers", "1000"),
                ("cylinder_count", "4"),
                ("mesures", "OK"),
                ("ligne", "L2"),
                ("entry_date", "2024-05-01"),
            ],
            &[
                ("vehicle_images", "side.jpg", b"side"),
                ("documents", "card.pdf", b"card"),
            ],
        )
        .await;
    assert_eq!(created.status, StatusCode::CREATED);
    let body = created.json();
    let id = body["id"].as_i64().unwrap();
    assert_eq!(body["car_number"], "car-1");
    assert_eq!(body["images"][0]["path"], "images/2024/05/01/car-1/side.jpg");
    let image_path = "images/2024/05/01/car-1/side.jpg";

    let part = app
        .send_multipart(
            Method::POST,
            &format!("/vehicles/{id}/faulty-parts"),
            &[("part_name", "Door"), ("description", "Scratched")],
            &[("images", "door.jpg", b"door")],
        )
        .await;
    assert_eq!(part.status, StatusCode::CREATED);

    let listed = app.get("/vehicles?q=CAR&start_date=2024-05-01").await;
    assert_eq!(listed.status, StatusCode::OK);
    assert_eq!(listed.json()["total_items"], 1);

    let deleted = app.delete(&format!("/vehicles/{id}")).await;
    assert_eq!(deleted.status, StatusCode::OK);
    assert_eq!(deleted.json()["files_removed"], 3);
    assert!(!app.media_exists(image_path));
    assert_eq!(
        app.get(&format!("/vehicles/{id}")).await.status,
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
async fn replace_vehicle_file_over_http() {
    let app = TestApp::spawn().await;
    let detail = app
        .vehicle("car-1", date(2024, 1, 1), &[(VehicleFileKind::Wheel, "old.jpg", b"old")])
        .await;
    let wheel = &detail.wheel_images[0];

    let res = app
        .send_multipart(
            Method::PUT,
            &format!("/vehicles/files/wheels/{}", wheel.id),
            &[],
            &[("file", "new.jpg", b"new")],
        )
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json()["path"], "wheels/2024/01/01/car-1/new.jpg");
    assert!(!app.media_exists(&wheel.image));
}

#[tokio::test]
async fn backup_download_is_a_named_zip() {
    let app = TestApp::spawn().await;
    app.cycle(ControlType::Mutation, date(2024, 1, 15), "AB-12", &[("a.jpg", b"a")])
        .await;

    let res = app
        .get("/backup/cycles?start_date=2024-01-01&end_date=2024-01-31")
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.header(header::CONTENT_TYPE), "application/zip");
    assert_eq!(
        res.header(header::CONTENT_DISPOSITION),
        "attachment; filename=\"cycles_backup_2024-01-01_to_2024-01-31.zip\""
    );
    assert_eq!(&res.bytes[..2], b"PK");

    let vehicles = app.get("/backup").await;
    assert_eq!(vehicles.status, StatusCode::OK);
    assert_eq!(
        vehicles.header(header::CONTENT_DISPOSITION),
        "attachment; filename=\"vehicle_backup.zip\""
    );
}

#[tokio::test]
async fn oversized_upload_is_rejected() {
    let app = TestApp::spawn().await;
    let big = vec![b'x'; 2 * 1024 * 1024];

    let res = app
        .send_multipart(Method::POST, "/cycles", &CYCLE_FIELDS, &[("files", "big.bin", &big)])
        .await;
    assert_eq!(res.status, StatusCode::PAYLOAD_TOO_LARGE);
}
