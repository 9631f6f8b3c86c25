use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{StudioError, StudioResult};

/// A client-portal account. Credentials never leave the service, so this
/// type carries no password material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientUser {
    pub id: Uuid,
    pub username: String,
    pub display_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ClientUser {
    /// Label shown in lists: the display name, falling back to the username.
    pub fn label(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(&self.username)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientSummary {
    #[serde(flatten)]
    pub client: ClientUser,
    pub event_count: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientListQuery {
    pub search: Option<String>,
}

impl ClientListQuery {
    pub fn matches(&self, client: &ClientUser) -> bool {
        match self.search.as_deref().filter(|s| !s.is_empty()) {
            None => true,
            Some(search) => {
                let needle = search.to_lowercase();
                client.label().to_lowercase().contains(&needle)
                    || client.username.to_lowercase().contains(&needle)
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateClientRequest {
    pub username: String,
    pub password: String,
    pub display_name: Option<String>,
    #[serde(default)]
    pub event_ids: Vec<Uuid>,
}

impl CreateClientRequest {
    pub fn validate(&self) -> StudioResult<()> {
        require_credentials(&self.username, Some(&self.password))
    }
}

/// Replaces a client's credentials. A missing password keeps the current one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateClientRequest {
    pub username: String,
    pub password: Option<String>,
    pub display_name: Option<String>,
}

impl UpdateClientRequest {
    pub fn validate(&self) -> StudioResult<()> {
        require_credentials(&self.username, self.password.as_deref())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientDetailResponse {
    pub client: ClientUser,
    pub event_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessGrantRequest {
    pub event_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessGrantResponse {
    pub client_id: Uuid,
    pub event_id: Uuid,
    pub granted: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client: Option<ClientUser>,
}

fn require_credentials(username: &str, password: Option<&str>) -> StudioResult<()> {
    if username.trim().is_empty() || password.is_some_and(|p| p.trim().is_empty()) {
        return Err(StudioError::Validation(
            "Username and password are required.".to_string(),
        ));
    }
    Ok(())
}
