//! Multipart decoding into text fields and uploaded files.

use std::collections::HashMap;

use axum::extract::multipart::MultipartError;
use axum::extract::Multipart;
use axum::http::StatusCode;

use crate::error::AppError;
use crate::services::records::Upload;

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge("Upload exceeds the configured size limit".into())
    } else {
        AppError::BadRequest(format!("Invalid multipart data: {}", err.body_text()))
    }
}

/// A decoded multipart form. Text fields keep their last value; file fields
/// keep every upload in submission order.
#[derive(Debug, Default)]
pub struct FormData {
    fields: HashMap<String, String>,
    files: Vec<(String, Upload)>,
}

impl FormData {
    pub async fn from_multipart(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut form = FormData::default();

        while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };

            match field.file_name().map(str::to_string) {
                Some(file_name) => {
                    let data = field.bytes().await.map_err(multipart_error)?;
                    // Browsers submit an empty part for an untouched file input.
                    if file_name.is_empty() && data.is_empty() {
                        continue;
                    }
                    let upload = Upload::new(&name, &file_name, data.to_vec())?;
                    form.files.push((name, upload));
                }
                None => {
                    let value = field.text().await.map_err(multipart_error)?;
                    form.fields.insert(name, value);
                }
            }
        }

        tracing::debug!(
            fields = form.fields.len(),
            files = form.files.len(),
            "Form | decoded multipart body"
        );
        Ok(form)
    }

    pub fn text(&self, name: &str) -> Option<String> {
        self.fields.get(name).cloned()
    }

    /// Removes and returns the uploads submitted under `name`.
    pub fn take_files(&mut self, name: &str) -> Vec<Upload> {
        let (taken, rest) = std::mem::take(&mut self.files)
            .into_iter()
            .partition::<Vec<_>, _>(|(field, _)| field == name);
        self.files = rest;
        taken.into_iter().map(|(_, upload)| upload).collect()
    }

    /// Removes and returns every remaining upload with its field name.
    pub fn take_all_files(&mut self) -> Vec<(String, Upload)> {
        std::mem::take(&mut self.files)
    }
}
