//! WVUI Connection - Saved connection profiles and connection health
//!
//! This crate owns the persisted set of backend profiles, the active-profile
//! pointer, and the status monitor that polls the API client.

mod config;
pub mod health;
pub mod persistence;
mod store;
mod transfer;

pub use config::{ConnectionDraft, ConnectionPatch, ConnectionProfile};
pub use health::{MonitorConfig, ProbeOutcome, StatusMonitor};
pub use persistence::{FileStore, KeyValueStore, MemoryStore, StorageKeys};
pub use store::{ConnectionStore, DEFAULT_RECENT_LIMIT};
