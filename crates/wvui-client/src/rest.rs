//! REST transport rooted at `<base>/v1`

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use wvui_core::{Result, WvError};

#[derive(Clone)]
pub(crate) struct RestClient {
    http: Client,
    root: Url,
}

impl RestClient {
    pub(crate) fn new(http: Client, root: Url) -> Self {
        Self { http, root }
    }

    /// Address of `<root>/<segments...>`. Segments are percent-encoded.
    pub(crate) fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.root.clone();
        url.path_segments_mut()
            .map_err(|_| WvError::Configuration(format!("{} cannot be a base URL", self.root)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    pub(crate) fn request(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder> {
        Ok(self.http.request(method, self.endpoint(segments)?))
    }

    /// Send a request and turn non-success statuses into `WvError::Http`.
    pub(crate) async fn execute(&self, request: RequestBuilder) -> Result<Response> {
        let response = request.send().await.map_err(transport_error)?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(WvError::Http {
            status: status.as_u16(),
            message: error_message(status, &body),
        })
    }

    /// Send a request and decode the JSON body.
    pub(crate) async fn json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        self.execute(request)
            .await?
            .json::<T>()
            .await
            .map_err(transport_error)
    }
}

/// Map a reqwest failure onto the error taxonomy.
pub(crate) fn transport_error(err: reqwest::Error) -> WvError {
    let message = describe(&err);
    if err.is_timeout() {
        WvError::Timeout(message)
    } else if err.is_decode() {
        WvError::Decode(message)
    } else if let Some(status) = err.status() {
        WvError::Http {
            status: status.as_u16(),
            message,
        }
    } else {
        WvError::Connection(message)
    }
}

/// Error text including the source chain, which is where "connection refused"
/// and similar details live.
pub(crate) fn describe(err: &reqwest::Error) -> String {
    let mut message = err.to_string();
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        let cause_text = cause.to_string();
        if !message.contains(&cause_text) {
            message.push_str(": ");
            message.push_str(&cause_text);
        }
        source = cause.source();
    }
    message
}

/// Pull a readable message out of an error body.
///
/// The backend answers with `{"error": [{"message": ...}]}`; anything else is
/// passed through as text.
pub(crate) fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        let messages: Vec<&str> = value
            .get("error")
            .and_then(Value::as_array)
            .map(|errors| {
                errors
                    .iter()
                    .filter_map(|e| e.get("message").and_then(Value::as_str))
                    .collect()
            })
            .unwrap_or_default();
        if !messages.is_empty() {
            return messages.join("; ");
        }
        if let Some(message) = value.get("message").and_then(Value::as_str) {
            return message.to_string();
        }
    }

    let body = body.trim();
    if !body.is_empty() {
        return body.to_string();
    }
    status
        .canonical_reason()
        .map(str::to_string)
        .unwrap_or_else(|| status.to_string())
}
