//! Subcommand implementations

pub mod connections;
pub mod objects;
pub mod query;
pub mod schema;
pub mod settings;
pub mod status;

pub use connections::ConnectionsCommand;
pub use objects::ObjectsCommand;
pub use schema::SchemaCommand;
pub use settings::SettingsCommand;

use std::io::Read;
use std::path::Path;

use anyhow::Context;

/// Read a file, or stdin when the path is `-`.
pub(crate) fn read_input(path: &Path) -> anyhow::Result<String> {
    if path == Path::new("-") {
        let mut content = String::new();
        std::io::stdin()
            .read_to_string(&mut content)
            .context("failed to read stdin")?;
        return Ok(content);
    }
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

/// Parse a JSON object argument.
pub(crate) fn parse_object(text: &str, what: &str) -> anyhow::Result<serde_json::Map<String, serde_json::Value>> {
    match serde_json::from_str(text).with_context(|| format!("{what} must be valid JSON"))? {
        serde_json::Value::Object(map) => Ok(map),
        _ => anyhow::bail!("{what} must be a JSON object"),
    }
}
