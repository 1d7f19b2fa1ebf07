//! Connection status monitoring
//!
//! The monitor polls a `HealthProbe` (normally the API client) on a fixed
//! interval and on demand, and publishes the resulting `ConnectionStatus`.
//! A probe result is only published if the probe's configuration generation
//! is unchanged since the probe was issued, so a status describing a previous
//! connection never overwrites the current one.
//!
//! # Example
//!
//! ```ignore
//! use wvui_connection::health::{MonitorConfig, StatusMonitor};
//!
//! let monitor = StatusMonitor::new(client.clone(), MonitorConfig::default());
//! monitor.start();
//!
//! // After switching connections, probe right away.
//! client.update_connection(&profile.url, profile.api_key.clone())?;
//! monitor.probe_now().await;
//!
//! let mut updates = monitor.subscribe();
//! while updates.changed().await.is_ok() {
//!     println!("{:?}", *updates.borrow());
//! }
//! ```

mod monitor;


pub use monitor::{MonitorConfig, ProbeOutcome, StatusMonitor};
