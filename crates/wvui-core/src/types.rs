//! Wire types exchanged with the vector-database backend
//!
//! Field names follow the backend's camelCase JSON. Unknown fields on
//! classes and objects are preserved in `extra` so that a read-modify-write
//! round trip does not drop server-side settings.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Server metadata returned by `GET /v1/meta`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerMeta {
    #[serde(default)]
    pub hostname: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub modules: Map<String, Value>,
}

/// Full schema returned by `GET /v1/schema`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    #[serde(default)]
    pub classes: Vec<ClassDefinition>,
}

impl Schema {
    /// Find a class by name.
    pub fn class(&self, name: &str) -> Option<&ClassDefinition> {
        self.classes.iter().find(|c| c.class == name)
    }
}

/// A collection (class) definition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassDefinition {
    pub class: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vector_index_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vector_index_config: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<Vec<PropertyDefinition>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multi_tenancy_config: Option<MultiTenancyConfig>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ClassDefinition {
    /// Create a class definition with only a name.
    pub fn new(class: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            ..Default::default()
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Add a property.
    pub fn with_property(mut self, property: PropertyDefinition) -> Self {
        self.properties.get_or_insert_with(Vec::new).push(property);
        self
    }
}

/// A property of a class
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyDefinition {
    pub name: String,
    #[serde(default)]
    pub data_type: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokenization: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index_filterable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index_searchable: Option<bool>,
}

impl PropertyDefinition {
    /// Create a property with a single data type (e.g. `text`, `int`).
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: vec![data_type.into()],
            ..Default::default()
        }
    }
}

/// Multi-tenancy switch on a class
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiTenancyConfig {
    pub enabled: bool,
}

/// A stored data object
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataObject {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "class")]
    pub class_name: String,
    #[serde(default)]
    pub properties: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vector: Option<Vec<f32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_time_unix: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_update_time_unix: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DataObject {
    /// Create an object of the given class with no properties.
    pub fn new(class_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            ..Default::default()
        }
    }

    /// Set a property value.
    pub fn with_property(mut self, key: impl Into<String>, value: Value) -> Self {
        self.properties.insert(key.into(), value);
        self
    }

    /// Set an explicit id.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

/// Parameters for listing objects. `offset` is zero-based.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectQuery {
    pub class_name: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl ObjectQuery {
    /// List objects of one class.
    pub fn for_class(class_name: impl Into<String>) -> Self {
        Self {
            class_name: Some(class_name.into()),
            ..Default::default()
        }
    }

    /// Select the zero-based page `page` of size `page_size`.
    pub fn page(mut self, page: u32, page_size: u32) -> Self {
        self.limit = Some(page_size);
        self.offset = Some(page.saturating_mul(page_size));
        self
    }

    /// Query-string pairs in the order the backend documents them.
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(class_name) = &self.class_name {
            pairs.push(("class", class_name.clone()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        if let Some(offset) = self.offset {
            pairs.push(("offset", offset.to_string()));
        }
        pairs
    }
}

/// One page of objects plus the server's total-count hint, when it sends one
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectPage {
    #[serde(default)]
    pub objects: Vec<DataObject>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_results: Option<u64>,
}

/// Per-object envelope returned by `POST /v1/batch/objects`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchObjectResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, rename = "class", skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl BatchObjectResult {
    /// Error messages reported for this object (`result.errors.error[].message`).
    pub fn errors(&self) -> Vec<String> {
        self.result
            .as_ref()
            .and_then(|r| r.pointer("/errors/error"))
            .and_then(Value::as_array)
            .map(|errors| {
                errors
                    .iter()
                    .filter_map(|e| e.get("message").and_then(Value::as_str))
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Whether the object was stored without errors.
    pub fn is_success(&self) -> bool {
        self.errors().is_empty()
    }
}

/// Body posted to the GraphQL endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphQlRequest {
    pub query: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variables: Option<Map<String, Value>>,
}

/// Uniform `{data?, errors?}` envelope returned by query execution
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphQlResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<GraphQlError>>,
}

impl GraphQlResponse {
    /// A response carrying a single error message and no data.
    pub fn from_error(message: impl Into<String>) -> Self {
        Self {
            data: None,
            errors: Some(vec![GraphQlError::new(message)]),
        }
    }

    /// Whether any errors were reported.
    pub fn has_errors(&self) -> bool {
        self.errors.as_ref().is_some_and(|e| !e.is_empty())
    }

    /// Whether the envelope carries neither data nor errors.
    pub fn is_empty(&self) -> bool {
        self.data.is_none() && self.errors.is_none()
    }
}

/// A single GraphQL error
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphQlError {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locations: Option<Vec<ErrorLocation>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<Vec<Value>>,
}

impl GraphQlError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            locations: None,
            path: None,
        }
    }
}

/// Source position of a GraphQL error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorLocation {
    pub line: u32,
    pub column: u32,
}
