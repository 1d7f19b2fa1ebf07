//! Connection status snapshots
//!
//! A `ConnectionStatus` is recomputed by every health probe and never
//! persisted.

use serde::{Deserialize, Serialize};

use crate::ServerMeta;

/// Result of probing the configured backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionStatus {
    /// Whether both the reachability check and the metadata fetch succeeded
    pub connected: bool,
    /// Base address the probe was issued against
    pub url: String,
    /// Failure description when `connected` is false
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Server metadata when `connected` is true
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<ServerMeta>,
}

impl ConnectionStatus {
    /// Create a successful status.
    pub fn connected(url: impl Into<String>, meta: ServerMeta) -> Self {
        Self {
            connected: true,
            url: url.into(),
            error: None,
            meta: Some(meta),
        }
    }

    /// Create a failed status. An empty message is replaced with a generic one.
    pub fn failed(url: impl Into<String>, error: impl Into<String>) -> Self {
        let error = error.into();
        let error = if error.trim().is_empty() {
            "Connection failed".to_string()
        } else {
            error
        };
        Self {
            connected: false,
            url: url.into(),
            error: Some(error),
            meta: None,
        }
    }

    /// Server version reported by the backend, when connected.
    pub fn version(&self) -> Option<&str> {
        self.meta.as_ref().map(|m| m.version.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_failed_status_never_has_empty_error() {
        let status = ConnectionStatus::failed("http://x", "  ");
        assert!(!status.connected);
        assert_eq!(status.error.as_deref(), Some("Connection failed"));
        assert!(status.meta.is_none());
    }

    #[test]
    fn test_status_serialization_omits_absent_fields() {
        let status = ConnectionStatus::failed("http://x", "refused");
        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"connected": false, "url": "http://x", "error": "refused"})
        );
    }

    #[test]
    fn test_connected_status_exposes_version() {
        let meta = ServerMeta {
            hostname: "http://[::]:8080".into(),
            version: "1.24.1".into(),
            modules: Default::default(),
        };
        let status = ConnectionStatus::connected("http://x", meta);
        assert!(status.connected);
        assert_eq!(status.version(), Some("1.24.1"));
    }
}
