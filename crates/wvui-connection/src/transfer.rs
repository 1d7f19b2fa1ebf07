//! Import/export of connection profiles
//!
//! Export is the full profile list as pretty JSON. Import is validated as a
//! whole before anything is merged: one bad element rejects the payload.

use chrono::serde::ts_milliseconds_option;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use wvui_core::{Result, WvError};

use crate::config::{self, ConnectionPatch, ConnectionProfile};

/// One element of an import payload
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ImportedConnection {
    pub name: String,
    pub url: String,
    pub is_favorite: bool,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, with = "ts_milliseconds_option")]
    pub last_connected: Option<DateTime<Utc>>,
    #[serde(default, with = "ts_milliseconds_option")]
    pub created_at: Option<DateTime<Utc>>,
}

impl ImportedConnection {
    /// Fields that overwrite an existing profile with the same url.
    pub fn to_patch(&self) -> ConnectionPatch {
        ConnectionPatch {
            name: Some(self.name.clone()),
            url: Some(self.url.clone()),
            api_key: self.api_key.clone().map(Some),
            description: self.description.clone().map(Some),
            is_favorite: Some(self.is_favorite),
            last_connected: self.last_connected.map(Some),
        }
    }

    /// A new profile. The id is always freshly generated so it cannot collide
    /// with one already in the store; a supplied creation time is kept.
    pub fn into_profile(self) -> ConnectionProfile {
        ConnectionProfile {
            id: config::generate_id(),
            name: self.name,
            url: self.url,
            api_key: self.api_key,
            description: self.description,
            is_favorite: self.is_favorite,
            last_connected: self.last_connected,
            created_at: self.created_at.unwrap_or_else(config::now),
        }
    }
}

/// Parse and validate an import payload.
///
/// The payload must be a JSON array whose every element has a non-empty
/// string `name`, a non-empty string `url` and a boolean `isFavorite`. The
/// remaining fields are optional but must have the right type.
pub(crate) fn parse_import(json: &str) -> Result<Vec<ImportedConnection>> {
    let value: Value = serde_json::from_str(json)?;
    let items = value
        .as_array()
        .ok_or_else(|| WvError::Validation("import payload must be a JSON array".into()))?;

    for (index, item) in items.iter().enumerate() {
        validate_item(item)
            .map_err(|reason| WvError::Validation(format!("entry {}: {}", index, reason)))?;
    }

    serde_json::from_value(value).map_err(|e| WvError::Validation(e.to_string()))
}

fn validate_item(item: &Value) -> std::result::Result<(), &'static str> {
    if !non_empty_str(item.get("name")) {
        return Err("missing or empty `name`");
    }
    if !non_empty_str(item.get("url")) {
        return Err("missing or empty `url`");
    }
    if !item.get("isFavorite").is_some_and(Value::is_boolean) {
        return Err("`isFavorite` must be a boolean");
    }
    Ok(())
}

fn non_empty_str(value: Option<&Value>) -> bool {
    value
        .and_then(Value::as_str)
        .is_some_and(|s| !s.trim().is_empty())
}

/// Serialize profiles with a two-space indent.
pub(crate) fn export(profiles: &[ConnectionProfile]) -> Result<String> {
    Ok(serde_json::to_string_pretty(profiles)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_import_accepts_minimal_entries() {
        let parsed = parse_import(r#"[{"name": "A", "url": "http://a", "isFavorite": false}]"#)
            .unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].name, "A");
        assert!(parsed[0].created_at.is_none());
    }

    #[test]
    fn test_parse_import_rejects_non_array() {
        let err = parse_import(r#"{"name": "A"}"#).unwrap_err();
        assert!(matches!(err, WvError::Validation(_)));
    }

    #[test]
    fn test_parse_import_rejects_bad_entries() {
        for payload in [
            r#"[{"url": "http://a", "isFavorite": false}]"#,
            r#"[{"name": "", "url": "http://a", "isFavorite": false}]"#,
            r#"[{"name": "A", "isFavorite": false}]"#,
            r#"[{"name": "A", "url": "http://a", "isFavorite": "yes"}]"#,
            r#"[{"name": "A", "url": "http://a"}]"#,
            r#"[{"name": "A", "url": "http://a", "isFavorite": true, "apiKey": 42}]"#,
        ] {
            assert!(parse_import(payload).is_err(), "accepted {}", payload);
        }
    }

    #[test]
    fn test_parse_import_rejects_malformed_json() {
        assert!(matches!(
            parse_import("[{").unwrap_err(),
            WvError::Serialization(_)
        ));
    }

    #[test]
    fn test_export_uses_two_space_indent() {
        let profile = ImportedConnection {
            name: "A".into(),
            url: "http://a".into(),
            is_favorite: false,
            api_key: None,
            description: None,
            last_connected: None,
            created_at: None,
        }
        .into_profile();
        let json = export(&[profile]).unwrap();
        assert!(json.starts_with("[\n  {\n    \"id\""));
    }
}
