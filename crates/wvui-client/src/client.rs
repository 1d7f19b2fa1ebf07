//! The API client

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Client, Method, Url};
use serde_json::{Map, Value, json};
use wvui_core::{
    BatchObjectResult, ClassDefinition, ConnectionStatus, DataObject, GraphQlResponse,
    HealthProbe, ObjectPage, ObjectQuery, Result, Schema, ServerMeta, WvError,
};

use crate::config::{ClientConfig, normalize_api_key, normalize_base_url};
use crate::graphql::GraphQlClient;
use crate::rest::RestClient;
use crate::search::build_search_query;

/// Immutable snapshot of everything derived from one configuration.
struct ClientState {
    config: ClientConfig,
    generation: u64,
    rest: RestClient,
    graphql: GraphQlClient,
}

impl ClientState {
    fn build(config: ClientConfig, generation: u64) -> Result<Self> {
        let base = Url::parse(&config.base_url).map_err(|e| {
            WvError::Configuration(format!("invalid base URL '{}': {}", config.base_url, e))
        })?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(WvError::Configuration(format!(
                "unsupported URL scheme '{}' in '{}'",
                base.scheme(),
                config.base_url
            )));
        }

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(api_key) = &config.api_key {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", api_key)).map_err(|_| {
                WvError::Configuration("API key contains characters not allowed in a header".into())
            })?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let http = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| WvError::Configuration(format!("failed to build HTTP client: {}", e)))?;

        let root = join(&base, &["v1"])?;
        let graphql = join(&base, &["v1", "graphql"])?;

        Ok(Self {
            rest: RestClient::new(http.clone(), root),
            graphql: GraphQlClient::new(http, graphql),
            config,
            generation,
        })
    }
}

fn join(base: &Url, segments: &[&str]) -> Result<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| WvError::Configuration(format!("{} cannot be a base URL", base)))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Client for one Weaviate backend at a time.
///
/// Reconfiguration builds a complete new state and swaps it in, so a request
/// always sees a matching REST/GraphQL pair and credentials. Requests already
/// in flight keep the state they started with.
pub struct ApiClient {
    state: RwLock<Arc<ClientState>>,
}

impl ApiClient {
    /// Create a client at generation 0.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let state = ClientState::build(config, 0)?;
        Ok(Self {
            state: RwLock::new(Arc::new(state)),
        })
    }

    fn snapshot(&self) -> Arc<ClientState> {
        self.state.read().clone()
    }

    /// Point the client at a new backend. On success the generation increases
    /// by one; on failure the previous configuration stays in place.
    pub fn update_connection(&self, url: &str, api_key: Option<String>) -> Result<()> {
        let mut state = self.state.write();
        let config = ClientConfig {
            base_url: normalize_base_url(url.to_string()),
            api_key: normalize_api_key(api_key),
            timeout: state.config.timeout,
        };
        let next = ClientState::build(config, state.generation + 1)?;
        tracing::info!(
            url = %next.config.base_url,
            authenticated = next.config.api_key.is_some(),
            generation = next.generation,
            "API client reconfigured"
        );
        *state = Arc::new(next);
        Ok(())
    }

    /// Change the backend address, keeping the API key.
    pub fn set_base_url(&self, url: &str) -> Result<()> {
        let api_key = self.api_key();
        self.update_connection(url, api_key)
    }

    /// Change the API key, keeping the backend address.
    pub fn set_api_key(&self, api_key: Option<String>) -> Result<()> {
        let url = self.base_url();
        self.update_connection(&url, api_key)
    }

    pub fn base_url(&self) -> String {
        self.state.read().config.base_url.clone()
    }

    pub fn api_key(&self) -> Option<String> {
        self.state.read().config.api_key.clone()
    }

    /// Number of times the configuration has been replaced.
    pub fn generation(&self) -> u64 {
        self.state.read().generation
    }

    /// Probe the backend root and read its metadata. Failures are reported in
    /// the returned status.
    #[tracing::instrument(skip(self))]
    pub async fn check_connection(&self) -> ConnectionStatus {
        let state = self.snapshot();
        let url = state.config.base_url.clone();

        let probe = async {
            let rest = &state.rest;
            rest.execute(rest.request(Method::GET, &[""])?).await?;
            rest.json::<ServerMeta>(rest.request(Method::GET, &["meta"])?)
                .await
        };

        match probe.await {
            Ok(meta) => ConnectionStatus::connected(url, meta),
            Err(err) => {
                tracing::debug!(url = %url, error = %err, "connection check failed");
                ConnectionStatus::failed(url, err.to_string())
            }
        }
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_meta(&self) -> Result<ServerMeta> {
        let state = self.snapshot();
        state.rest.json(state.rest.request(Method::GET, &["meta"])?).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_schema(&self) -> Result<Schema> {
        let state = self.snapshot();
        state.rest.json(state.rest.request(Method::GET, &["schema"])?).await
    }

    #[tracing::instrument(skip(self, class), fields(class = %class.class))]
    pub async fn create_class(&self, class: &ClassDefinition) -> Result<()> {
        let state = self.snapshot();
        let request = state.rest.request(Method::POST, &["schema"])?.json(class);
        state.rest.execute(request).await?;
        tracing::info!(class = %class.class, "class created");
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete_class(&self, class_name: &str) -> Result<()> {
        let state = self.snapshot();
        let request = state.rest.request(Method::DELETE, &["schema", class_name])?;
        state.rest.execute(request).await?;
        tracing::info!(class = class_name, "class deleted");
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_objects(&self, query: &ObjectQuery) -> Result<ObjectPage> {
        let state = self.snapshot();
        let request = state
            .rest
            .request(Method::GET, &["objects"])?
            .query(&query.to_query_pairs());
        state.rest.json(request).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_object(&self, id: &str, class_name: Option<&str>) -> Result<DataObject> {
        let state = self.snapshot();
        let request = state.rest.request(Method::GET, &object_path(id, class_name))?;
        state.rest.json(request).await
    }

    #[tracing::instrument(skip(self, object), fields(class = %object.class_name))]
    pub async fn create_object(&self, object: &DataObject) -> Result<DataObject> {
        let state = self.snapshot();
        let request = state.rest.request(Method::POST, &["objects"])?.json(object);
        state.rest.json(request).await
    }

    #[tracing::instrument(skip(self, object), fields(class = %object.class_name))]
    pub async fn update_object(&self, id: &str, object: &DataObject) -> Result<DataObject> {
        let state = self.snapshot();
        let request = state
            .rest
            .request(Method::PUT, &["objects", id])?
            .json(object);
        state.rest.json(request).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete_object(&self, id: &str, class_name: Option<&str>) -> Result<()> {
        let state = self.snapshot();
        let request = state
            .rest
            .request(Method::DELETE, &object_path(id, class_name))?;
        state.rest.execute(request).await?;
        Ok(())
    }

    /// Create many objects in one request. The backend answers with one
    /// envelope per object; per-object failures are inside the envelopes.
    #[tracing::instrument(skip(self, objects), fields(count = objects.len()))]
    pub async fn batch_create(&self, objects: &[DataObject]) -> Result<Vec<BatchObjectResult>> {
        let state = self.snapshot();
        let request = state
            .rest
            .request(Method::POST, &["batch", "objects"])?
            .json(&json!({ "objects": objects }));
        let results: Vec<BatchObjectResult> = state.rest.json(request).await?;

        let failed = results.iter().filter(|r| !r.is_success()).count();
        if failed > 0 {
            tracing::warn!(failed, total = results.len(), "batch finished with failures");
        }
        Ok(results)
    }

    /// Run a GraphQL query. Transport and decoding failures are folded into
    /// `errors`, so this never fails.
    #[tracing::instrument(skip(self, query, variables))]
    pub async fn graphql_query(
        &self,
        query: &str,
        variables: Option<Map<String, Value>>,
    ) -> GraphQlResponse {
        let state = self.snapshot();
        let response = state.graphql.request(query, variables).await;
        if response.has_errors() {
            tracing::debug!(
                errors = response.errors.as_ref().map_or(0, Vec::len),
                "GraphQL query returned errors"
            );
        }
        response
    }

    /// Free-text search over every property of one class.
    pub async fn search_objects(&self, text: &str, class_name: &str, limit: u32) -> GraphQlResponse {
        match build_search_query(text, class_name, limit) {
            Ok(query) => self.graphql_query(&query, None).await,
            Err(err) => GraphQlResponse::from_error(err.to_string()),
        }
    }
}

fn object_path<'a>(id: &'a str, class_name: Option<&'a str>) -> Vec<&'a str> {
    match class_name {
        Some(class_name) => vec!["objects", class_name, id],
        None => vec!["objects", id],
    }
}

#[async_trait]
impl HealthProbe for ApiClient {
    fn generation(&self) -> u64 {
        ApiClient::generation(self)
    }

    async fn check_connection(&self) -> ConnectionStatus {
        ApiClient::check_connection(self).await
    }
}
