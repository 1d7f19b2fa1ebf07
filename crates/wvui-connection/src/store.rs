//! Connection store
//!
//! CRUD over saved profiles plus the active-connection pointer, persisted
//! through an injected `KeyValueStore`. Reads never fail: a missing or
//! corrupt value is logged and treated as empty.

use parking_lot::Mutex;
use std::sync::Arc;
use wvui_core::{Result, WvError};

use crate::config::{self, ConnectionDraft, ConnectionPatch, ConnectionProfile};
use crate::persistence::{KeyValueStore, StorageKeys};
use crate::transfer;


/// Default number of entries returned by `get_recent_connections`
pub const DEFAULT_RECENT_LIMIT: usize = 5;

const DEFAULT_NAME: &str = "Local Weaviate";
const DEFAULT_URL: &str = "http://localhost:8080";
const DEFAULT_DESCRIPTION: &str = "Default local Weaviate instance";

/// Saved connection profiles and the active pointer
pub struct ConnectionStore {
    storage: Arc<dyn KeyValueStore>,
    /// Serializes read-modify-write cycles within this process
    write_lock: Mutex<()>,
}

impl ConnectionStore {
    /// Create a store over the given persistence adapter.
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self {
            storage,
            write_lock: Mutex::new(()),
        }
    }

    /// All saved profiles in store order.
    pub fn list_connections(&self) -> Vec<ConnectionProfile> {
        let Some(stored) = self.storage.get(StorageKeys::CONNECTIONS) else {
            return Vec::new();
        };
        match serde_json::from_str(&stored) {
            Ok(connections) => connections,
            Err(e) => {
                tracing::warn!("Failed to load connections, treating as empty: {}", e);
                Vec::new()
            }
        }
    }

    /// Look up a profile by id.
    pub fn get_connection(&self, id: &str) -> Option<ConnectionProfile> {
        self.list_connections().into_iter().find(|c| c.id == id)
    }

    /// Save a profile. A profile with the same url is updated in place,
    /// keeping its id and creation time; otherwise a new profile is appended.
    #[tracing::instrument(skip(self, draft), fields(url = %draft.url))]
    pub fn save_connection(&self, draft: ConnectionDraft) -> Result<ConnectionProfile> {
        require_non_empty("name", &draft.name)?;
        require_non_empty("url", &draft.url)?;

        let _guard = self.write_lock.lock();
        let mut connections = self.list_connections();

        if let Some(existing) = connections.iter_mut().find(|c| c.url == draft.url) {
            draft.to_patch().apply_to(existing);
            let saved = existing.clone();
            self.write_connections(&connections)?;
            tracing::info!(connection_id = %saved.id, "updated existing connection with same url");
            return Ok(saved);
        }

        let profile = ConnectionProfile::from_draft(draft);
        connections.push(profile.clone());
        self.write_connections(&connections)?;
        tracing::info!(connection_id = %profile.id, "saved new connection");
        Ok(profile)
    }

    /// Shallow-merge `patch` into the profile with `id`.
    ///
    /// Returns false, leaving the store unchanged, if the id is unknown, the
    /// patch would blank `name` or `url`, or the new url belongs to another
    /// profile.
    pub fn update_connection(&self, id: &str, patch: ConnectionPatch) -> bool {
        let _guard = self.write_lock.lock();
        self.update_locked(id, &patch)
    }

    fn update_locked(&self, id: &str, patch: &ConnectionPatch) -> bool {
        let mut connections = self.list_connections();

        if let Some(url) = &patch.url
            && connections.iter().any(|c| c.id != id && &c.url == url)
        {
            tracing::warn!(connection_id = %id, url = %url, "rejecting update: url already used by another connection");
            return false;
        }

        let Some(profile) = connections.iter_mut().find(|c| c.id == id) else {
            tracing::debug!(connection_id = %id, "update ignored, connection not found");
            return false;
        };

        patch.apply_to(profile);
        if profile.name.trim().is_empty() || profile.url.trim().is_empty() {
            tracing::warn!(connection_id = %id, "rejecting update: name and url are required");
            return false;
        }

        self.persist(&connections)
    }

    /// Remove a profile. Clears the active pointer if it pointed here.
    pub fn delete_connection(&self, id: &str) -> bool {
        let _guard = self.write_lock.lock();
        let connections = self.list_connections();
        let before = connections.len();
        let remaining: Vec<_> = connections.into_iter().filter(|c| c.id != id).collect();

        if remaining.len() == before {
            return false;
        }
        if !self.persist(&remaining) {
            return false;
        }

        if self.get_active_connection_id().as_deref() == Some(id) {
            if let Err(e) = self.storage.set(StorageKeys::ACTIVE_CONNECTION, "") {
                tracing::warn!(connection_id = %id, "Failed to clear active connection: {}", e);
            }
            tracing::info!(connection_id = %id, "deleted active connection, cleared active pointer");
        } else {
            tracing::info!(connection_id = %id, "deleted connection");
        }
        true
    }

    /// Flip the favorite flag. Returns the new value, or false if not found.
    pub fn toggle_favorite(&self, id: &str) -> bool {
        let _guard = self.write_lock.lock();
        let mut connections = self.list_connections();
        let Some(profile) = connections.iter_mut().find(|c| c.id == id) else {
            return false;
        };

        profile.is_favorite = !profile.is_favorite;
        let is_favorite = profile.is_favorite;
        self.persist(&connections) && is_favorite
    }

    /// Id stored in the active pointer, if any.
    pub fn get_active_connection_id(&self) -> Option<String> {
        self.storage
            .get(StorageKeys::ACTIVE_CONNECTION)
            .filter(|id| !id.is_empty())
    }

    /// The active profile. A pointer to a profile that no longer exists
    /// reads as no active connection.
    pub fn get_active_connection(&self) -> Option<ConnectionProfile> {
        let id = self.get_active_connection_id()?;
        self.get_connection(&id)
    }

    /// Make `connection` active and stamp its `last_connected`, or clear the
    /// pointer when `None`.
    pub fn set_active_connection(&self, connection: Option<&ConnectionProfile>) -> Result<()> {
        let _guard = self.write_lock.lock();
        let Some(connection) = connection else {
            self.storage.set(StorageKeys::ACTIVE_CONNECTION, "")?;
            tracing::info!("cleared active connection");
            return Ok(());
        };

        if !self.list_connections().iter().any(|c| c.id == connection.id) {
            return Err(WvError::NotFound(format!(
                "connection {} is not saved",
                connection.id
            )));
        }

        self.storage
            .set(StorageKeys::ACTIVE_CONNECTION, &connection.id)?;
        let stamp = ConnectionPatch::new().last_connected(Some(config::now()));
        if !self.update_locked(&connection.id, &stamp) {
            tracing::warn!(connection_id = %connection.id, "Failed to record last connected time");
        }
        tracing::info!(connection_id = %connection.id, url = %connection.url, "active connection changed");
        Ok(())
    }

    /// Profiles that have been active, most recent first, at most `limit`.
    pub fn get_recent_connections(&self, limit: usize) -> Vec<ConnectionProfile> {
        let mut recent: Vec<_> = self
            .list_connections()
            .into_iter()
            .filter(|c| c.last_connected.is_some())
            .collect();
        recent.sort_by(|a, b| b.last_connected.cmp(&a.last_connected));
        recent.truncate(limit);
        recent
    }

    /// Favorite profiles in store order.
    pub fn get_favorite_connections(&self) -> Vec<ConnectionProfile> {
        self.list_connections()
            .into_iter()
            .filter(|c| c.is_favorite)
            .collect()
    }

    /// All profiles as pretty-printed JSON.
    pub fn export_connections(&self) -> Result<String> {
        transfer::export(&self.list_connections())
    }

    /// Merge profiles from an exported JSON payload.
    ///
    /// Entries are matched to existing profiles by url; matches are updated
    /// in place, the rest appended with a fresh id. Returns false, leaving
    /// the store untouched, if any entry fails validation.
    #[tracing::instrument(skip(self, json))]
    pub fn import_connections(&self, json: &str) -> bool {
        let imported = match transfer::parse_import(json) {
            Ok(imported) => imported,
            Err(e) => {
                tracing::warn!("Failed to import connections: {}", e);
                return false;
            }
        };

        let _guard = self.write_lock.lock();
        let mut merged = self.list_connections();
        let count = imported.len();

        for entry in imported {
            match merged.iter_mut().find(|c| c.url == entry.url) {
                Some(existing) => entry.to_patch().apply_to(existing),
                None => merged.push(entry.into_profile()),
            }
        }

        let persisted = self.persist(&merged);
        if persisted {
            tracing::info!(count, total = merged.len(), "imported connections");
        }
        persisted
    }

    /// Seed an empty store with a favorite local profile and make it active.
    /// Returns the created profile; a non-empty store is left untouched.
    pub fn initialize_defaults(&self) -> Result<Option<ConnectionProfile>> {
        if !self.list_connections().is_empty() {
            return Ok(None);
        }

        let profile = self.save_connection(
            ConnectionDraft::new(DEFAULT_NAME, DEFAULT_URL)
                .with_description(DEFAULT_DESCRIPTION)
                .favorite(true),
        )?;
        self.set_active_connection(Some(&profile))?;
        tracing::info!(connection_id = %profile.id, "initialized default connection");
        Ok(self.get_connection(&profile.id))
    }

    fn write_connections(&self, connections: &[ConnectionProfile]) -> Result<()> {
        let content = serde_json::to_string(connections)?;
        self.storage.set(StorageKeys::CONNECTIONS, &content)
    }

    fn persist(&self, connections: &[ConnectionProfile]) -> bool {
        match self.write_connections(connections) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Failed to persist connections: {}", e);
                false
            }
        }
    }
}

fn require_non_empty(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(WvError::Validation(format!("{} is required", field)));
    }
    Ok(())
}
