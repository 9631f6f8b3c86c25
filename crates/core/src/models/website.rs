use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{StudioError, StudioResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebsiteCategory {
    pub id: Uuid,
    pub name: String,
    /// System categories cannot be renamed or deleted.
    pub is_default: bool,
    pub sort_order: i32,
    pub cover_image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategorySummary {
    #[serde(flatten)]
    pub category: WebsiteCategory,
    pub image_count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryImage {
    pub id: Uuid,
    pub category_id: Uuid,
    pub image_url: String,
    pub alt_text: String,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryNameRequest {
    pub name: String,
}

impl CategoryNameRequest {
    pub fn validated_name(&self) -> StudioResult<&str> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(StudioError::Validation(
                "Category name is required".to_string(),
            ));
        }
        Ok(name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateAltTextRequest {
    pub alt_text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadFailure {
    pub file_name: String,
    pub error: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryUploadResponse {
    pub uploaded: Vec<CategoryImage>,
    pub failures: Vec<UploadFailure>,
}

/// Rejects edits to protected categories and deletion of non-empty ones.
pub fn ensure_category_deletable(category: &WebsiteCategory, image_count: i64) -> StudioResult<()> {
    ensure_category_editable(category)?;
    if image_count > 0 {
        return Err(StudioError::Conflict(format!(
            "Cannot delete \"{}\" - it contains {} image{}. Please remove all images first.",
            category.name,
            image_count,
            if image_count > 1 { "s" } else { "" }
        )));
    }
    Ok(())
}

pub fn ensure_category_editable(category: &WebsiteCategory) -> StudioResult<()> {
    if category.is_default {
        return Err(StudioError::Authorization(format!(
            "\"{}\" is a system category",
            category.name
        )));
    }
    Ok(())
}
