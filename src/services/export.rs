//! Archive export: a manifest of the selected records plus every file they
//! reference, laid out like the storage tree, in one deflated zip.

use std::collections::HashSet;
use std::io::{Cursor, Write};

use chrono::NaiveDate;
use serde::Serialize;
use zip::write::SimpleFileOptions;
use zip::CompressionMethod;

use crate::entities::cycle::ControlType;
use crate::entities::cycle_attachment::FileType;
use crate::error::AppError;
use crate::services::filter::RecordFilter;
use crate::services::records::{CycleDetail, RecordStore, VehicleDetail};
use crate::utils::filename::split_extension;
use crate::utils::paths::{
    basename, owner_dir, DOCUMENTS_PREFIX, FAULTY_PART_IMAGES_PREFIX, VEHICLE_IMAGES_PREFIX,
    WHEEL_IMAGES_PREFIX,
};

pub const CYCLES_ARCHIVE_BASE: &str = "cycles_backup";
pub const VEHICLES_ARCHIVE_BASE: &str = "vehicle_backup";

const CYCLES_MANIFEST: &str = "cycles.json";
const VEHICLES_MANIFEST: &str = "vehicles.json";

#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("archive IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("manifest encoding failed: {0}")]
    Manifest(#[from] serde_json::Error),
    #[error("archive task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// A finished archive and what went into it.
#[derive(Debug)]
pub struct ArchiveExport {
    /// Suggested download name, encoding the date range.
    pub filename: String,
    pub bytes: Vec<u8>,
    pub records: usize,
    pub files: usize,
    /// Attachments whose backing file could not be read.
    pub skipped: usize,
}

#[derive(Serialize)]
struct AttachmentEntry<'a> {
    file: &'a str,
    file_type: FileType,
}

#[derive(Serialize)]
struct CycleEntry<'a> {
    id: i32,
    control_type: ControlType,
    date: NaiveDate,
    cycle_id: &'a str,
    folder: String,
    attachments: Vec<AttachmentEntry<'a>>,
}

#[derive(Serialize)]
struct FaultyPartEntry<'a> {
    part_name: &'a str,
    description: &'a str,
    images: Vec<&'a str>,
}

#[derive(Serialize)]
struct VehicleEntry<'a> {
    id: i32,
    car_number: &'a str,
    brand: &'a str,
    kilometers: i32,
    cylinder_count: i32,
    mesures: &'a str,
    ligne: &'a str,
    entry_date: NaiveDate,
    faulty_parts: Vec<FaultyPartEntry<'a>>,
    images: Vec<&'a str>,
    wheel_images: Vec<&'a str>,
    documents: Vec<&'a str>,
}

struct ArchiveEntry {
    name: String,
    data: Vec<u8>,
}

/// Files collected for an archive, keyed by member name.
#[derive(Default)]
struct ArchivePlan {
    entries: Vec<ArchiveEntry>,
    taken: HashSet<String>,
    /// `(wanted name, stored path)` pairs already handled.
    seen: HashSet<(String, String)>,
    skipped: usize,
}

/// `a/photo.jpg`, 2 -> `a/photo-2.jpg`
fn numbered(name: &str, n: usize) -> String {
    let (dir, file) = match name.rfind('/') {
        Some(idx) => (&name[..=idx], &name[idx + 1..]),
        None => ("", name),
    };
    let (stem, ext) = split_extension(file);
    format!("{dir}{stem}-{n}{ext}")
}

impl ArchivePlan {
    /// Returns `false` when this stored path was already placed under
    /// `wanted`.
    fn claim(&mut self, wanted: &str, stored: &str) -> bool {
        self.seen.insert((wanted.to_string(), stored.to_string()))
    }

    fn push(&mut self, wanted: String, data: Vec<u8>) {
        let mut name = wanted.clone();
        let mut n = 1;
        while self.taken.contains(&name) {
            name = numbered(&wanted, n);
            n += 1;
        }
        self.taken.insert(name.clone());
        self.entries.push(ArchiveEntry { name, data });
    }
}

fn write_archive(
    manifest_name: &str,
    manifest: &[u8],
    entries: &[ArchiveEntry],
) -> Result<Vec<u8>, ArchiveError> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    writer.start_file(manifest_name, options)?;
    writer.write_all(manifest)?;
    for entry in entries {
        writer.start_file(entry.name.as_str(), options)?;
        writer.write_all(&entry.data)?;
    }

    Ok(writer.finish()?.into_inner())
}

#[derive(Clone)]
pub struct ArchiveExporter {
    records: RecordStore,
}

impl ArchiveExporter {
    pub fn new(records: RecordStore) -> Self {
        Self { records }
    }

    /// Adds the file at `stored` as `{dir}/{basename}`. Missing or
    /// unreadable files are skipped.
    async fn add_file(&self, plan: &mut ArchivePlan, dir: &str, stored: &str) {
        let wanted = format!("{}/{}", dir, basename(stored));
        if !plan.claim(&wanted, stored) {
            return;
        }

        match self.records.storage().read(stored).await {
            Ok(Some(data)) => plan.push(wanted, data),
            Ok(None) => {
                tracing::debug!(path = stored, "Export | file missing, skipping");
                plan.skipped += 1;
            }
            Err(e) => {
                tracing::warn!(path = stored, "Export | failed to read file: {}", e);
                plan.skipped += 1;
            }
        }
    }

    async fn finish(
        &self,
        filename: String,
        manifest_name: &'static str,
        manifest: Vec<u8>,
        records: usize,
        plan: ArchivePlan,
    ) -> Result<ArchiveExport, AppError> {
        let files = plan.entries.len();
        let skipped = plan.skipped;
        let entries = plan.entries;

        let bytes = tokio::task::spawn_blocking(move || {
            write_archive(manifest_name, &manifest, &entries)
        })
        .await
        .map_err(ArchiveError::from)??;

        tracing::info!(
            filename = %filename,
            records,
            files,
            skipped,
            size = bytes.len(),
            "Export | archive built"
        );

        Ok(ArchiveExport {
            filename,
            bytes,
            records,
            files,
            skipped,
        })
    }

    /// Cycles matching `filter`, each attachment filed under its cycle's
    /// current control type, date and identifier.
    pub async fn export_cycles(&self, filter: &RecordFilter) -> Result<ArchiveExport, AppError> {
        let cycles: Vec<CycleDetail> = self.records.select_cycles(filter).await?;
        let mut plan = ArchivePlan::default();
        let mut manifest = Vec::with_capacity(cycles.len());

        for detail in &cycles {
            let cycle = &detail.cycle;
            let folder = owner_dir(cycle.control_type.as_str(), cycle.date, &cycle.cycle_id);
            for attachment in &detail.attachments {
                self.add_file(&mut plan, &folder, &attachment.file).await;
            }
            manifest.push(CycleEntry {
                id: cycle.id,
                control_type: cycle.control_type,
                date: cycle.date,
                cycle_id: &cycle.cycle_id,
                folder,
                attachments: detail
                    .attachments
                    .iter()
                    .map(|a| AttachmentEntry {
                        file: &a.file,
                        file_type: a.file_type,
                    })
                    .collect(),
            });
        }

        let manifest = serde_json::to_vec_pretty(&manifest).map_err(ArchiveError::from)?;
        self.finish(
            filter.archive_name(CYCLES_ARCHIVE_BASE),
            CYCLES_MANIFEST,
            manifest,
            cycles.len(),
            plan,
        )
        .await
    }

    /// Vehicles matching `filter` with their faulty parts and every file
    /// table, filed under the vehicle's current entry date and car number.
    pub async fn export_vehicles(
        &self,
        filter: &RecordFilter,
    ) -> Result<ArchiveExport, AppError> {
        let vehicles: Vec<VehicleDetail> = self.records.select_vehicles(filter).await?;
        let mut plan = ArchivePlan::default();
        let mut manifest = Vec::with_capacity(vehicles.len());

        for detail in &vehicles {
            let vehicle = &detail.vehicle;
            let dir = |prefix: &str| owner_dir(prefix, vehicle.entry_date, &vehicle.car_number);

            let images_dir = dir(VEHICLE_IMAGES_PREFIX);
            for image in &detail.images {
                self.add_file(&mut plan, &images_dir, &image.image).await;
            }
            let wheels_dir = dir(WHEEL_IMAGES_PREFIX);
            for image in &detail.wheel_images {
                self.add_file(&mut plan, &wheels_dir, &image.image).await;
            }
            let documents_dir = dir(DOCUMENTS_PREFIX);
            for document in &detail.documents {
                self.add_file(&mut plan, &documents_dir, &document.document)
                    .await;
            }
            let parts_dir = dir(FAULTY_PART_IMAGES_PREFIX);
            for part in &detail.faulty_parts {
                for image in &part.images {
                    self.add_file(&mut plan, &parts_dir, &image.image).await;
                }
            }

            manifest.push(VehicleEntry {
                id: vehicle.id,
                car_number: &vehicle.car_number,
                brand: &vehicle.brand,
                kilometers: vehicle.kilometers,
                cylinder_count: vehicle.cylinder_count,
                mesures: &vehicle.mesures,
                ligne: &vehicle.ligne,
                entry_date: vehicle.entry_date,
                faulty_parts: detail
                    .faulty_parts
                    .iter()
                    .map(|p| FaultyPartEntry {
                        part_name: &p.part.part_name,
                        description: &p.part.description,
                        images: p.images.iter().map(|i| i.image.as_str()).collect(),
                    })
                    .collect(),
                images: detail.images.iter().map(|i| i.image.as_str()).collect(),
                wheel_images: detail.wheel_images.iter().map(|i| i.image.as_str()).collect(),
                documents: detail
                    .documents
                    .iter()
                    .map(|d| d.document.as_str())
                    .collect(),
            });
        }

        let manifest = serde_json::to_vec_pretty(&manifest).map_err(ArchiveError::from)?;
        self.finish(
            filter.archive_name(VEHICLES_ARCHIVE_BASE),
            VEHICLES_MANIFEST,
            manifest,
            vehicles.len(),
            plan,
        )
        .await
    }
}
