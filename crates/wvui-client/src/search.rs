//! Free-text search query construction

use wvui_core::{Result, WvError};

/// Result count used when the caller does not choose one
pub const DEFAULT_SEARCH_LIMIT: u32 = 10;

/// Build a `Get` query matching `text` against every property of `class_name`.
///
/// The text is emitted as an escaped string literal. Class names must be
/// valid GraphQL identifiers starting with an uppercase letter, as the backend
/// requires.
pub fn build_search_query(text: &str, class_name: &str, limit: u32) -> Result<String> {
    if !is_class_name(class_name) {
        return Err(WvError::Validation(format!(
            "'{class_name}' is not a valid class name"
        )));
    }
    let value = serde_json::to_string(text)?;

    Ok(format!(
        r#"{{
  Get {{
    {class_name}(
      limit: {limit}
      where: {{
        operator: Like
        path: ["*"]
        valueText: {value}
      }}
    ) {{
      _additional {{
        id
        score
      }}
    }}
  }}
}}"#
    ))
}

fn is_class_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().is_some_and(|c| c.is_ascii_uppercase())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
