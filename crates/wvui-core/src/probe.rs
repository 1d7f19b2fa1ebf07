//! Health probe trait

use std::sync::Arc;

use async_trait::async_trait;

use crate::ConnectionStatus;

/// Something that can report the health of the currently configured backend.
///
/// `generation` identifies the configuration a probe runs against. It must
/// increase every time the configuration is replaced, so callers can tell
/// whether a finished probe still describes the current target.
#[async_trait]
pub trait HealthProbe: Send + Sync + 'static {
    /// Current configuration generation.
    fn generation(&self) -> u64;

    /// Probe the backend. Failures are reported inside the status, never raised.
    async fn check_connection(&self) -> ConnectionStatus;
}

#[async_trait]
impl<T: HealthProbe> HealthProbe for Arc<T> {
    fn generation(&self) -> u64 {
        (**self).generation()
    }

    async fn check_connection(&self) -> ConnectionStatus {
        (**self).check_connection().await
    }
}
