use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::StudioError;
use crate::models::booking::Booking;

/// A client's per-photo choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionStatus {
    #[default]
    None,
    Pending,
    Selected,
}

impl SelectionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SelectionStatus::None => "none",
            SelectionStatus::Pending => "pending",
            SelectionStatus::Selected => "selected",
        }
    }

    /// Choosing the status an image already has clears it back to `None`.
    pub fn toggled(current: SelectionStatus, requested: SelectionStatus) -> SelectionStatus {
        if current == requested {
            SelectionStatus::None
        } else {
            requested
        }
    }
}

impl fmt::Display for SelectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SelectionStatus {
    type Err = StudioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" | "none" => Ok(SelectionStatus::None),
            "pending" => Ok(SelectionStatus::Pending),
            "selected" => Ok(SelectionStatus::Selected),
            other => Err(StudioError::Validation(format!(
                "Unknown selection status '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventImage {
    pub id: Uuid,
    pub event_id: Uuid,
    pub image_url: String,
    pub status: SelectionStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionCounts {
    pub selected: usize,
    pub pending: usize,
    pub none: usize,
}

impl SelectionCounts {
    pub fn tally(images: &[EventImage]) -> Self {
        images
            .iter()
            .fold(SelectionCounts::default(), |mut counts, image| {
                match image.status {
                    SelectionStatus::Selected => counts.selected += 1,
                    SelectionStatus::Pending => counts.pending += 1,
                    SelectionStatus::None => counts.none += 1,
                }
                counts
            })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GalleryResponse {
    pub event: Booking,
    pub images: Vec<EventImage>,
    pub counts: SelectionCounts,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImageListQuery {
    pub status: Option<SelectionStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateSelectionRequest {
    pub status: SelectionStatus,
}

/// Sets every image of an event to `status`, or only those currently in
/// `only_status` when given.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkSelectionRequest {
    pub status: SelectionStatus,
    pub only_status: Option<SelectionStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkSelectionResponse {
    pub updated: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteImagesRequest {
    pub ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteImagesResponse {
    pub deleted: u64,
    /// Storage objects still waiting to be removed after this request.
    pub pending_cleanup: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadState {
    Running,
    Completed,
    Cancelled,
    Failed,
}

impl UploadState {
    pub fn is_finished(&self) -> bool {
        !matches!(self, UploadState::Running)
    }
}

/// Progress of a background upload batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadProgress {
    pub id: Uuid,
    pub event_id: Uuid,
    pub state: UploadState,
    pub completed: usize,
    pub total: usize,
    /// Files dropped before the batch started because they are not photos.
    pub skipped: usize,
    pub current_file: Option<String>,
    pub message: Option<String>,
}

impl UploadProgress {
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 100;
        }
        ((self.completed * 100) / self.total) as u8
    }
}
