pub mod auth;
pub mod bookings;
pub mod clients;
pub mod dashboard;
pub mod gallery;
pub mod portal;
pub mod website;

use std::collections::HashMap;

use axum::extract::Multipart;
use studio_core::{errors::StudioError, naming::base_file_name};

use crate::jobs::UploadFile;
use crate::middleware::error_handling::AppError;

/// A multipart form split into its file parts and its text fields.
#[derive(Debug, Default)]
pub(crate) struct MultipartForm {
    pub files: Vec<UploadFile>,
    pub fields: HashMap<String, String>,
}

impl MultipartForm {
    pub fn flag(&self, name: &str) -> bool {
        self.fields
            .get(name)
            .is_some_and(|value| matches!(value.trim(), "true" | "on" | "1" | "yes"))
    }

    /// Parses an optional numeric field. An empty value counts as absent.
    pub fn number<T: std::str::FromStr>(&self, name: &str) -> Result<Option<T>, AppError> {
        match self.fields.get(name).map(|v| v.trim()).filter(|v| !v.is_empty()) {
            None => Ok(None),
            Some(value) => value.parse().map(Some).map_err(|_| {
                AppError(StudioError::Validation(format!(
                    "Invalid value '{}' for {}",
                    value, name
                )))
            }),
        }
    }
}

/// Reads every part of a multipart body. Parts with a file name are files,
/// the rest are text fields.
pub(crate) async fn read_multipart(mut multipart: Multipart) -> Result<MultipartForm, AppError> {
    let mut form = MultipartForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError(StudioError::Validation(e.to_string())))?
    {
        let name = field.name().unwrap_or_default().to_string();

        match field.file_name().map(|f| f.to_string()) {
            Some(file_name) => {
                let file_name = base_file_name(&file_name).to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError(StudioError::Validation(e.to_string())))?;
                if file_name.is_empty() {
                    continue;
                }
                form.files.push(UploadFile {
                    file_name,
                    data: data.to_vec(),
                });
            }
            None => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError(StudioError::Validation(e.to_string())))?;
                form.fields.insert(name, value);
            }
        }
    }

    Ok(form)
}
