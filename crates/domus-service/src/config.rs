//! Domain service configuration.

use uuid::Uuid;

/// Configuration shared by the domain services.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Sender identity stamped on workflow notifications (request
    /// resolutions). Not a real user account.
    pub system_sender: Uuid,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            system_sender: Uuid::nil(),
        }
    }
}
