//! WVUI Core - Shared types for the vector-database console
//!
//! This crate provides the types that every other WVUI crate depends on:
//!
//! - `WvError` / `Result` - the common error type
//! - `HealthProbe` - the seam between the status monitor and the API client
//! - `ConnectionStatus` - snapshot produced by each health probe
//! - Wire types for server metadata, schema classes, objects and GraphQL

mod error;
mod probe;
mod status;
mod types;

pub use error::*;
pub use probe::*;
pub use status::*;
pub use types::*;
