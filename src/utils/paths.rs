//! Storage path derivation.
//!
//! Every stored file lives under
//! `{prefix}/{year}/{month:02}/{day:02}/{identifier}/{filename}`, where the
//! prefix is the cycle's control type for cycle attachments and a fixed
//! per-kind segment for vehicle files. The fixed prefixes never collide with
//! a control type, so two different file tables can never derive the same
//! path.

use chrono::{Datelike, NaiveDate};

pub const VEHICLE_IMAGES_PREFIX: &str = "images";
pub const WHEEL_IMAGES_PREFIX: &str = "wheels";
pub const DOCUMENTS_PREFIX: &str = "documents";
pub const FAULTY_PART_IMAGES_PREFIX: &str = "faulty-parts";

/// Trims and replaces every whitespace character with a hyphen.
pub fn normalize_identifier(raw: &str) -> String {
    raw.trim()
        .chars()
        .map(|c| if c.is_whitespace() { '-' } else { c })
        .collect()
}

/// Directory holding an owner's files, without a trailing separator.
pub fn owner_dir(prefix: &str, date: NaiveDate, identifier: &str) -> String {
    format!(
        "{}/{}/{:02}/{:02}/{}",
        prefix,
        date.year(),
        date.month(),
        date.day(),
        identifier
    )
}

pub fn derive_path(prefix: &str, date: NaiveDate, identifier: &str, filename: &str) -> String {
    format!("{}/{}", owner_dir(prefix, date, identifier), filename)
}

/// Last segment of a stored path.
pub fn basename(stored: &str) -> &str {
    match stored.rfind('/') {
        Some(idx) => &stored[idx + 1..],
        None => stored,
    }
}
