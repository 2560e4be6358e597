//! SDK initialization

use beacon_core::Result;
use std::sync::Arc;

use crate::client::Client;
use crate::config::ClientOptions;
use crate::hub::{ClientHub, Hub};
use crate::integrations::{Integration, ShutdownHookIntegration};
use crate::runtime::ProcessRuntime;
use crate::transport::Transport;

/// Keeps the SDK alive; dropping it shuts the SDK down
///
/// On drop every integration is closed, then the client is closed, bounded
/// by `shutdown_timeout_millis`.
#[must_use = "dropping the guard shuts the SDK down immediately"]
pub struct ClientInitGuard {
    hub: Arc<ClientHub>,
    integrations: Vec<Arc<dyn Integration>>,
    options: ClientOptions,
}

impl std::fmt::Debug for ClientInitGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<_> = self.integrations.iter().map(|i| i.name()).collect();
        f.debug_struct("ClientInitGuard")
            .field("hub", &self.hub)
            .field("integrations", &names)
            .finish_non_exhaustive()
    }
}

impl ClientInitGuard {
    /// Hub built by `init`
    pub fn hub(&self) -> &Arc<ClientHub> {
        &self.hub
    }

    /// Whether a client is still bound
    pub fn is_enabled(&self) -> bool {
        self.hub.client().is_some()
    }

    /// Flush the hub, bounded by `timeout`
    pub fn flush(&self, timeout: std::time::Duration) -> bool {
        match self.hub.client() {
            Some(client) => client.flush(timeout),
            None => true,
        }
    }
}

impl Drop for ClientInitGuard {
    fn drop(&mut self) {
        for integration in &self.integrations {
            integration.close();
        }
        if !self.hub.close(self.options.shutdown_timeout()) {
            tracing::warn!(
                timeout_ms = self.options.shutdown_timeout_millis,
                "client did not shut down cleanly"
            );
        }
        tracing::debug!("beacon shut down");
    }
}

/// Initialize the SDK with the default integrations
///
/// The default set is a [`ShutdownHookIntegration`] on the
/// [global](ProcessRuntime::global) runtime. When `install_signal_handler` is
/// set, SIGINT, SIGTERM and SIGHUP run the global runtime's hooks before
/// exiting with [`SIGNAL_EXIT_CODE`](crate::runtime::SIGNAL_EXIT_CODE).
pub fn init(options: ClientOptions, transport: Arc<dyn Transport>) -> Result<ClientInitGuard> {
    if options.enable_shutdown_hook && options.install_signal_handler {
        if let Err(err) = ProcessRuntime::global().install_signal_handler() {
            tracing::warn!(error = %err, "shutdown flush will not run on signals");
        }
    }
    let integrations: Vec<Arc<dyn Integration>> = vec![Arc::new(ShutdownHookIntegration::new())];
    init_with_integrations(options, transport, integrations)
}

/// Initialize the SDK with an explicit set of integrations
pub fn init_with_integrations(
    options: ClientOptions,
    transport: Arc<dyn Transport>,
    integrations: Vec<Arc<dyn Integration>>,
) -> Result<ClientInitGuard> {
    let client = Client::new(options.clone(), transport)?;
    let hub = Arc::new(ClientHub::new(Arc::new(client)));

    for integration in &integrations {
        let shared: Arc<dyn Hub> = Arc::clone(&hub) as Arc<dyn Hub>;
        integration.register(shared, &options);
        tracing::debug!(integration = integration.name(), "integration registered");
    }

    tracing::info!(
        release = options.release.as_deref().unwrap_or("<unset>"),
        environment = options.environment.as_deref().unwrap_or("<unset>"),
        integrations = integrations.len(),
        "beacon initialized"
    );

    Ok(ClientInitGuard {
        hub,
        integrations,
        options,
    })
}
