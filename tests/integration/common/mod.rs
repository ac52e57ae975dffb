use std::path::PathBuf;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, HeaderMap, Method, Request, StatusCode};
use chrono::NaiveDate;
use migration::{Migrator, MigratorTrait};
use sea_orm::Database;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use asset_vault::config::Config;
use asset_vault::entities::cycle::ControlType;
use asset_vault::entities::cycle_attachment::FileType;
use asset_vault::models::forms::{NewCycle, NewVehicle};
use asset_vault::models::kinds::VehicleFileKind;
use asset_vault::services::records::{CycleDetail, RecordStore, Upload, VehicleDetail};
use asset_vault::services::storage::LocalStorage;
use asset_vault::state::AppState;

const BOUNDARY: &str = "asset-vault-test-boundary";

/// An application wired to a file-backed SQLite database and a temporary
/// media root.
pub struct TestApp {
    pub state: AppState,
    pub media: TempDir,
    _db_dir: TempDir,
}

/// Parsed HTTP response for test assertions.
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub bytes: Vec<u8>,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.bytes).unwrap_or(Value::Null)
    }

    pub fn header(&self, name: header::HeaderName) -> &str {
        self.headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn upload(name: &str, data: &[u8]) -> Upload {
    Upload::new("files", name, data.to_vec()).unwrap()
}

/// `multipart/form-data` body with text fields followed by file parts.
pub fn multipart(fields: &[(&str, &str)], files: &[(&str, &str, &[u8])]) -> (String, Vec<u8>) {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    for (field, filename, data) in files {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    (format!("multipart/form-data; boundary={BOUNDARY}"), body)
}

impl TestApp {
    pub async fn spawn() -> Self {
        let db_dir = tempfile::tempdir().expect("Failed to create database dir");
        let db_url = format!("sqlite://{}?mode=rwc", db_dir.path().join("test.db").display());
        let db = Database::connect(&db_url)
            .await
            .expect("Failed to connect to test database");
        Migrator::up(&db, None)
            .await
            .expect("Failed to run migrations");

        let media = tempfile::tempdir().expect("Failed to create media dir");
        let storage = Arc::new(
            LocalStorage::new(media.path())
                .await
                .expect("Failed to create media root"),
        );

        let config = Config {
            database_url: db_url,
            media_root: media.path().to_path_buf(),
            media_url: "/media".to_string(),
            bind_addr: "127.0.0.1:0".parse().unwrap(),
            max_upload_bytes: 1024 * 1024,
            run_migrations: false,
        };

        Self {
            state: AppState::new(db, config, storage),
            media,
            _db_dir: db_dir,
        }
    }

    pub fn records(&self) -> &RecordStore {
        &self.state.records
    }

    pub fn media_path(&self, stored: &str) -> PathBuf {
        self.media.path().join(stored)
    }

    pub fn media_exists(&self, stored: &str) -> bool {
        self.media_path(stored).exists()
    }

    pub async fn cycle(
        &self,
        control_type: ControlType,
        date: NaiveDate,
        cycle_id: &str,
        files: &[(&str, &[u8])],
    ) -> CycleDetail {
        self.records()
            .create_cycle(
                NewCycle {
                    control_type,
                    date,
                    cycle_id: cycle_id.to_string(),
                },
                FileType::Photo,
                files.iter().map(|(name, data)| upload(name, data)).collect(),
            )
            .await
            .expect("Failed to create cycle")
    }

    pub async fn vehicle(
        &self,
        car_number: &str,
        entry_date: NaiveDate,
        files: &[(VehicleFileKind, &str, &[u8])],
    ) -> VehicleDetail {
        self.records()
            .create_vehicle(
                NewVehicle {
                    car_number: car_number.to_string(),
                    brand: "Renault".to_string(),
                    kilometers: 120_000,
                    cylinder_count: 4,
                    mesures: "OK".to_string(),
                    ligne: "L1".to_string(),
                    entry_date,
                },
                files
                    .iter()
                    .map(|(kind, name, data)| (*kind, upload(name, data)))
                    .collect(),
            )
            .await
            .expect("Failed to create vehicle")
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = asset_vault::build_app(self.state.clone())
            .oneshot(request)
            .await
            .expect("Router failed");
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read body")
            .to_vec();
        TestResponse {
            status,
            headers,
            bytes,
        }
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.send(Request::get(uri).body(Body::empty()).unwrap())
            .await
    }

    pub async fn delete(&self, uri: &str) -> TestResponse {
        self.send(
            Request::builder()
                .method(Method::DELETE)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    pub async fn put_json(&self, uri: &str, body: &Value) -> TestResponse {
        self.send(
            Request::builder()
                .method(Method::PUT)
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    pub async fn send_multipart(
        &self,
        method: Method,
        uri: &str,
        fields: &[(&str, &str)],
        files: &[(&str, &str, &[u8])],
    ) -> TestResponse {
        let (content_type, body) = multipart(fields, files);
        self.send(
            Request::builder()
                .method(method)
                .uri(uri)
                .header(header::CONTENT_TYPE, content_type)
                .body(Body::from(body))
                .unwrap(),
        )
        .await
    }
}
