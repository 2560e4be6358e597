//! Integrations hook the SDK into the host environment

pub mod shutdown;

use std::sync::Arc;

use crate::config::ClientOptions;
use crate::hub::Hub;

pub use shutdown::{IntegrationState, ShutdownHookIntegration, SHUTDOWN_HOOK_NAME};

/// Extension that wires the SDK into something outside it
pub trait Integration: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Attach to the host; called once per hub by `init`
    fn register(&self, hub: Arc<dyn Hub>, options: &ClientOptions);

    /// Detach from the host
    fn close(&self) {}
}
