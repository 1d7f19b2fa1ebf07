//! Terminal rendering helpers

use chrono::{DateTime, Local, Utc};
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{ContentArrangement, Table};
use serde::Serialize;
use serde_json::Value;
use wvui_connection::ConnectionProfile;
use wvui_core::{ConnectionStatus, DataObject, Schema};

const MAX_CELL_WIDTH: usize = 60;

fn table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

pub fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn format_timestamp(at: Option<DateTime<Utc>>) -> String {
    match at {
        Some(at) => at.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string(),
        None => "never".to_string(),
    }
}

/// Shorten `text` to at most `max` characters, marking the cut with `…`.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut shortened: String = text.chars().take(max.saturating_sub(1)).collect();
    shortened.push('…');
    shortened
}

pub fn connections_table(profiles: &[ConnectionProfile], active_id: Option<&str>) -> Table {
    let mut table = table(vec!["", "Name", "URL", "Auth", "Favorite", "Last connected", "ID"]);
    for profile in profiles {
        let active = if Some(profile.id.as_str()) == active_id { "*" } else { "" };
        table.add_row(vec![
            active.to_string(),
            profile.name.clone(),
            profile.url.clone(),
            if profile.api_key.is_some() { "key" } else { "none" }.to_string(),
            if profile.is_favorite { "★" } else { "" }.to_string(),
            format_timestamp(profile.last_connected),
            profile.id.clone(),
        ]);
    }
    table
}

pub fn status_line(status: &ConnectionStatus) -> String {
    if status.connected {
        match status.version() {
            Some(version) if !version.is_empty() => {
                format!("connected to {} (version {})", status.url, version)
            }
            _ => format!("connected to {}", status.url),
        }
    } else {
        format!(
            "cannot reach {}: {}",
            status.url,
            status.error.as_deref().unwrap_or("Connection failed")
        )
    }
}

pub fn schema_table(schema: &Schema) -> Table {
    let mut table = table(vec!["Class", "Properties", "Vectorizer", "Description"]);
    for class in &schema.classes {
        let properties = class
            .properties
            .as_ref()
            .map(|props| {
                props
                    .iter()
                    .map(|p| format!("{}: {}", p.name, p.data_type.join("|")))
                    .collect::<Vec<_>>()
                    .join(", ")
            })
            .unwrap_or_default();
        let vectorizer = class
            .extra
            .get("vectorizer")
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string();
        table.add_row(vec![
            class.class.clone(),
            truncate(&properties, MAX_CELL_WIDTH),
            vectorizer,
            class.description.clone().unwrap_or_default(),
        ]);
    }
    table
}

pub fn objects_table(objects: &[DataObject]) -> Table {
    let mut table = table(vec!["ID", "Class", "Properties"]);
    for object in objects {
        let properties = Value::Object(object.properties.clone()).to_string();
        table.add_row(vec![
            object.id.clone().unwrap_or_default(),
            object.class_name.clone(),
            truncate(&properties, MAX_CELL_WIDTH),
        ]);
    }
    table
}
