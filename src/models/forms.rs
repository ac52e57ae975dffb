//! Validation of submitted record fields.
//!
//! Forms carry raw values as submitted; `validate` turns them into typed
//! records or a [`FieldErrors`] map naming every offending field.

use chrono::NaiveDate;
use serde::Deserialize;

use crate::entities::cycle::ControlType;
use crate::error::{AppError, FieldErrors};
use crate::utils::filename::is_safe_identifier;
use crate::utils::paths::normalize_identifier;

pub const IDENTIFIER_MAX_LEN: usize = 20;
pub const TEXT_MAX_LEN: usize = 100;
pub const KILOMETERS_MAX: i64 = 10_000_000;
pub const CYLINDERS_MIN: i64 = 1;
pub const CYLINDERS_MAX: i64 = 16;

const REQUIRED: &str = "This field is required.";

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn required<'a>(errors: &mut FieldErrors, field: &str, value: Option<&'a str>) -> Option<&'a str> {
    let value = non_blank(value);
    if value.is_none() {
        errors.add(field, REQUIRED);
    }
    value
}

fn max_len(errors: &mut FieldErrors, field: &str, value: &str, max: usize) -> bool {
    let len = value.chars().count();
    if len > max {
        errors.add(
            field,
            format!("Ensure this value has at most {max} characters (it has {len})."),
        );
        return false;
    }
    true
}

fn text(errors: &mut FieldErrors, field: &str, value: &str) -> Option<String> {
    max_len(errors, field, value, TEXT_MAX_LEN).then(|| value.to_string())
}

/// Normalizes whitespace to hyphens, then checks length and charset.
fn identifier(errors: &mut FieldErrors, field: &str, value: &str) -> Option<String> {
    let normalized = normalize_identifier(value);
    if !max_len(errors, field, &normalized, IDENTIFIER_MAX_LEN) {
        return None;
    }
    if !is_safe_identifier(&normalized) {
        errors.add(
            field,
            "Enter a valid identifier: letters, numbers, '-', '_' and '.' only.",
        );
        return None;
    }
    Some(normalized)
}

pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}

fn date(errors: &mut FieldErrors, field: &str, value: &str) -> Option<NaiveDate> {
    let parsed = parse_date(value);
    if parsed.is_none() {
        errors.add(field, "Enter a valid date.");
    }
    parsed
}

fn control_type(errors: &mut FieldErrors, field: &str, value: &str) -> Option<ControlType> {
    let parsed = ControlType::parse(value);
    if parsed.is_none() {
        errors.add(
            field,
            format!("Select a valid choice. {value} is not one of the available choices."),
        );
    }
    parsed
}

fn bounded(errors: &mut FieldErrors, field: &str, value: i64, min: i64, max: i64) -> Option<i32> {
    if value < min {
        errors.add(field, format!("Ensure this value is greater than or equal to {min}."));
        return None;
    }
    if value > max {
        errors.add(field, format!("Ensure this value is less than or equal to {max}."));
        return None;
    }
    i32::try_from(value).ok()
}

fn whole_number(errors: &mut FieldErrors, field: &str, value: &str) -> Option<i64> {
    let parsed = value.trim().parse::<i64>().ok();
    if parsed.is_none() {
        errors.add(field, "Enter a whole number.");
    }
    parsed
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewCycle {
    pub control_type: ControlType,
    pub date: NaiveDate,
    pub cycle_id: String,
}

/// Cycle fields as submitted in a multipart form.
#[derive(Debug, Default, Clone)]
pub struct CycleForm {
    pub control_type: Option<String>,
    pub date: Option<String>,
    pub cycle_id: Option<String>,
}

impl CycleForm {
    pub fn validate(&self) -> Result<NewCycle, AppError> {
        let mut errors = FieldErrors::new();

        let control_type = required(&mut errors, "control_type", self.control_type.as_deref())
            .and_then(|v| control_type(&mut errors, "control_type", v));
        let date = required(&mut errors, "date", self.date.as_deref())
            .and_then(|v| date(&mut errors, "date", v));
        let cycle_id = required(&mut errors, "cycle_id", self.cycle_id.as_deref())
            .and_then(|v| identifier(&mut errors, "cycle_id", v));

        match (control_type, date, cycle_id) {
            (Some(control_type), Some(date), Some(cycle_id)) if errors.is_empty() => Ok(NewCycle {
                control_type,
                date,
                cycle_id,
            }),
            _ => Err(AppError::Validation(errors)),
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct CyclePatch {
    pub control_type: Option<ControlType>,
    pub date: Option<NaiveDate>,
    pub cycle_id: Option<String>,
}

/// Partial cycle modification. Absent fields are left unchanged.
#[derive(Debug, Default, Clone, Deserialize, utoipa::ToSchema)]
pub struct CycleUpdate {
    pub control_type: Option<String>,
    /// `YYYY-MM-DD`
    pub date: Option<String>,
    pub cycle_id: Option<String>,
}

impl CycleUpdate {
    pub fn validate(&self) -> Result<CyclePatch, AppError> {
        let mut errors = FieldErrors::new();
        let mut patch = CyclePatch::default();

        if let Some(value) = self.control_type.as_deref() {
            patch.control_type = required(&mut errors, "control_type", Some(value))
                .and_then(|v| control_type(&mut errors, "control_type", v));
        }
        if let Some(value) = self.date.as_deref() {
            patch.date =
                required(&mut errors, "date", Some(value)).and_then(|v| date(&mut errors, "date", v));
        }
        if let Some(value) = self.cycle_id.as_deref() {
            patch.cycle_id = required(&mut errors, "cycle_id", Some(value))
                .and_then(|v| identifier(&mut errors, "cycle_id", v));
        }

        errors.into_result()?;
        Ok(patch)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewVehicle {
    pub car_number: String,
    pub brand: String,
    pub kilometers: i32,
    pub cylinder_count: i32,
    pub mesures: String,
    pub ligne: String,
    pub entry_date: NaiveDate,
}

/// Vehicle fields as submitted in a multipart form.
#[derive(Debug, Default, Clone)]
pub struct VehicleForm {
    pub car_number: Option<String>,
    pub brand: Option<String>,
    pub kilometers: Option<String>,
    pub cylinder_count: Option<String>,
    pub mesures: Option<String>,
    pub ligne: Option<String>,
    pub entry_date: Option<String>,
}

impl VehicleForm {
    /// `today` is used when no entry date was submitted.
    pub fn validate(&self, today: NaiveDate) -> Result<NewVehicle, AppError> {
        let mut errors = FieldErrors::new();

        let car_number = required(&mut errors, "car_number", self.car_number.as_deref())
            .and_then(|v| identifier(&mut errors, "car_number", v));
        let brand = required(&mut errors, "brand", self.brand.as_deref())
            .and_then(|v| text(&mut errors, "brand", v));
        let kilometers = required(&mut errors, "kilometers", self.kilometers.as_deref())
            .and_then(|v| whole_number(&mut errors, "kilometers", v))
            .and_then(|v| bounded(&mut errors, "kilometers", v, 0, KILOMETERS_MAX));
        let cylinder_count =
            required(&mut errors, "cylinder_count", self.cylinder_count.as_deref())
                .and_then(|v| whole_number(&mut errors, "cylinder_count", v))
                .and_then(|v| {
                    bounded(&mut errors, "cylinder_count", v, CYLINDERS_MIN, CYLINDERS_MAX)
                });
        let mesures = required(&mut errors, "mesures", self.mesures.as_deref())
            .and_then(|v| text(&mut errors, "mesures", v));
        let ligne = required(&mut errors, "ligne", self.ligne.as_deref())
            .and_then(|v| text(&mut errors, "ligne", v));
        let entry_date = match non_blank(self.entry_date.as_deref()) {
            Some(v) => date(&mut errors, "entry_date", v),
            None => Some(today),
        };

        match (car_number, brand, kilometers, cylinder_count, mesures, ligne, entry_date) {
            (
                Some(car_number),
                Some(brand),
                Some(kilometers),
                Some(cylinder_count),
                Some(mesures),
                Some(ligne),
                Some(entry_date),
            ) if errors.is_empty() => Ok(NewVehicle {
                car_number,
                brand,
                kilometers,
                cylinder_count,
                mesures,
                ligne,
                entry_date,
            }),
            _ => Err(AppError::Validation(errors)),
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct VehiclePatch {
    pub car_number: Option<String>,
    pub brand: Option<String>,
    pub kilometers: Option<i32>,
    pub cylinder_count: Option<i32>,
    pub mesures: Option<String>,
    pub ligne: Option<String>,
    pub entry_date: Option<NaiveDate>,
}

#[derive(Debug, Default, Clone, Deserialize, utoipa::ToSchema)]
pub struct VehicleUpdate {
    pub car_number: Option<String>,
    pub brand: Option<String>,
    pub kilometers: Option<i64>,
    pub cylinder_count: Option<i64>,
    pub mesures: Option<String>,
    pub ligne: Option<String>,
    /// `YYYY-MM-DD`
    pub entry_date: Option<String>,
}

impl VehicleUpdate {
    pub fn validate(&self) -> Result<VehiclePatch, AppError> {
        let mut errors = FieldErrors::new();
        let mut patch = VehiclePatch::default();

        if let Some(value) = self.car_number.as_deref() {
            patch.car_number = required(&mut errors, "car_number", Some(value))
                .and_then(|v| identifier(&mut errors, "car_number", v));
        }
        if let Some(value) = self.brand.as_deref() {
            patch.brand = required(&mut errors, "brand", Some(value))
                .and_then(|v| text(&mut errors, "brand", v));
        }
        if let Some(value) = self.kilometers {
            patch.kilometers = bounded(&mut errors, "kilometers", value, 0, KILOMETERS_MAX);
        }
        if let Some(value) = self.cylinder_count {
            patch.cylinder_count =
                bounded(&mut errors, "cylinder_count", value, CYLINDERS_MIN, CYLINDERS_MAX);
        }
        if let Some(value) = self.mesures.as_deref() {
            patch.mesures = required(&mut errors, "mesures", Some(value))
                .and_then(|v| text(&mut errors, "mesures", v));
        }
        if let Some(value) = self.ligne.as_deref() {
            patch.ligne = required(&mut errors, "ligne", Some(value))
                .and_then(|v| text(&mut errors, "ligne", v));
        }
        if let Some(value) = self.entry_date.as_deref() {
            patch.entry_date = required(&mut errors, "entry_date", Some(value))
                .and_then(|v| date(&mut errors, "entry_date", v));
        }

        errors.into_result()?;
        Ok(patch)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewFaultyPart {
    pub part_name: String,
    pub description: String,
}

#[derive(Debug, Default, Clone)]
pub struct FaultyPartForm {
    pub part_name: Option<String>,
    pub description: Option<String>,
}

impl FaultyPartForm {
    pub fn validate(&self) -> Result<NewFaultyPart, AppError> {
        let mut errors = FieldErrors::new();

        let part_name = required(&mut errors, "part_name", self.part_name.as_deref())
            .and_then(|v| text(&mut errors, "part_name", v));
        let description = self.description.as_deref().unwrap_or("").trim().to_string();

        match part_name {
            Some(part_name) if errors.is_empty() => Ok(NewFaultyPart {
                part_name,
                description,
            }),
            _ => Err(AppError::Validation(errors)),
        }
    }
}
