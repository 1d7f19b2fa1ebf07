//! Saved connection profiles

use chrono::serde::{ts_milliseconds, ts_milliseconds_option};
use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A saved backend target
///
/// Timestamps are stored as milliseconds since the Unix epoch.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionProfile {
    /// Unique identifier, never changes after creation
    pub id: String,

    /// Display name
    pub name: String,

    /// Base address of the backend, unique among profiles
    pub url: String,

    /// Optional bearer token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Optional free text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub is_favorite: bool,

    /// Set when the profile becomes the active connection
    #[serde(
        default,
        with = "ts_milliseconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_connected: Option<DateTime<Utc>>,

    /// Creation timestamp, never changes after creation
    #[serde(with = "ts_milliseconds")]
    pub created_at: DateTime<Utc>,
}

impl ConnectionProfile {
    /// Create a new profile from a draft with a fresh id and creation time.
    pub fn from_draft(draft: ConnectionDraft) -> Self {
        tracing::debug!(name = %draft.name, url = %draft.url, "creating new connection profile");
        Self {
            id: generate_id(),
            name: draft.name,
            url: draft.url,
            api_key: draft.api_key,
            description: draft.description,
            is_favorite: draft.is_favorite,
            last_connected: draft.last_connected,
            created_at: now(),
        }
    }
}

/// Everything a caller supplies when saving a profile; `id` and `created_at`
/// are assigned by the store.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ConnectionDraft {
    pub name: String,
    pub url: String,
    pub api_key: Option<String>,
    pub description: Option<String>,
    pub is_favorite: bool,
    pub last_connected: Option<DateTime<Utc>>,
}

impl ConnectionDraft {
    /// Create a draft with a name and base address.
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            ..Default::default()
        }
    }

    /// Set the bearer token.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Mark as favorite.
    pub fn favorite(mut self, is_favorite: bool) -> Self {
        self.is_favorite = is_favorite;
        self
    }

    /// Patch that merges this draft into an existing profile. Optional fields
    /// left as `None` keep the existing value.
    pub(crate) fn to_patch(&self) -> ConnectionPatch {
        ConnectionPatch {
            name: Some(self.name.clone()),
            url: Some(self.url.clone()),
            api_key: self.api_key.clone().map(Some),
            description: self.description.clone().map(Some),
            is_favorite: Some(self.is_favorite),
            last_connected: self.last_connected.map(Some),
        }
    }
}

/// Typed partial update of a profile
///
/// Every mutable field has its own slot; `None` leaves the field unchanged.
/// Optional profile fields use a nested option so that `Some(None)` clears
/// them.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ConnectionPatch {
    pub name: Option<String>,
    pub url: Option<String>,
    pub api_key: Option<Option<String>>,
    pub description: Option<Option<String>>,
    pub is_favorite: Option<bool>,
    pub last_connected: Option<Option<DateTime<Utc>>>,
}

impl ConnectionPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = Some(api_key);
        self
    }

    pub fn description(mut self, description: Option<String>) -> Self {
        self.description = Some(description);
        self
    }

    pub fn favorite(mut self, is_favorite: bool) -> Self {
        self.is_favorite = Some(is_favorite);
        self
    }

    pub fn last_connected(mut self, at: Option<DateTime<Utc>>) -> Self {
        self.last_connected = Some(at);
        self
    }

    /// Whether the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Shallow-merge the patch into a profile. `id` and `created_at` are
    /// not reachable from a patch.
    pub fn apply_to(&self, profile: &mut ConnectionProfile) {
        if let Some(name) = &self.name {
            profile.name = name.clone();
        }
        if let Some(url) = &self.url {
            profile.url = url.clone();
        }
        if let Some(api_key) = &self.api_key {
            profile.api_key = api_key.clone();
        }
        if let Some(description) = &self.description {
            profile.description = description.clone();
        }
        if let Some(is_favorite) = self.is_favorite {
            profile.is_favorite = is_favorite;
        }
        if let Some(last_connected) = self.last_connected {
            profile.last_connected = last_connected;
        }
    }
}

/// Current time truncated to the millisecond precision used on disk.
pub(crate) fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

pub(crate) fn generate_id() -> String {
    format!("conn_{}", Uuid::new_v4().simple())
}
