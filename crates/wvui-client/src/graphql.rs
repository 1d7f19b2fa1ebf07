//! GraphQL transport for `<base>/v1/graphql`

use reqwest::{Client, Url};
use serde_json::{Map, Value};
use wvui_core::{GraphQlRequest, GraphQlResponse};

use crate::rest::{describe, error_message};

#[derive(Clone)]
pub(crate) struct GraphQlClient {
    http: Client,
    endpoint: Url,
}

impl GraphQlClient {
    pub(crate) fn new(http: Client, endpoint: Url) -> Self {
        Self { http, endpoint }
    }

    /// Run a query. Every failure is reported in `errors`; this never fails.
    pub(crate) async fn request(
        &self,
        query: &str,
        variables: Option<Map<String, Value>>,
    ) -> GraphQlResponse {
        let body = GraphQlRequest {
            query: query.to_string(),
            variables,
        };

        let response = match self.http.post(self.endpoint.clone()).json(&body).send().await {
            Ok(response) => response,
            Err(err) => return GraphQlResponse::from_error(describe(&err)),
        };

        let status = response.status();
        let text = match response.text().await {
            Ok(text) => text,
            Err(err) => return GraphQlResponse::from_error(describe(&err)),
        };

        // Error statuses usually still carry a GraphQL envelope; prefer it.
        match serde_json::from_str::<GraphQlResponse>(&text) {
            Ok(parsed) if !parsed.is_empty() => parsed,
            _ if !status.is_success() => GraphQlResponse::from_error(format!(
                "GraphQL request failed with status {}: {}",
                status.as_u16(),
                error_message(status, &text)
            )),
            Ok(_) => GraphQlResponse::from_error("GraphQL response carried neither data nor errors"),
            Err(err) => GraphQlResponse::from_error(format!("Invalid GraphQL response: {err}")),
        }
    }
}
