//! WVUI Client - HTTP access to a Weaviate backend
//!
//! `ApiClient` wraps a REST client rooted at `<base>/v1` and a GraphQL client
//! for `<base>/v1/graphql`. Both are rebuilt together whenever the target
//! changes, and each change bumps the client's generation so health probes
//! issued against an older target can be recognised as stale.

mod client;
mod config;
mod graphql;
mod rest;
mod search;

pub use client::ApiClient;
pub use config::{ClientConfig, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
pub use search::{DEFAULT_SEARCH_LIMIT, build_search_query};
