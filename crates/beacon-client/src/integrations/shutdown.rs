//! Flush the hub when the host process shuts down
//!
//! [`ShutdownHookIntegration`] holds at most one [`ShutdownHook`]. The slot is
//! swapped under a single lock, so concurrent `register` and `close` calls
//! attach or detach exactly one hook.

use parking_lot::Mutex;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use super::Integration;
use crate::config::ClientOptions;
use crate::hub::Hub;
use crate::runtime::{HookState, ProcessRuntime, ShutdownHook, ShutdownRuntime};

/// Name of the hook attached by [`ShutdownHookIntegration`]
pub const SHUTDOWN_HOOK_NAME: &str = "beacon-shutdown-flush";

/// Where a [`ShutdownHookIntegration`] is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegrationState {
    /// No hook is attached
    Unregistered,
    /// A hook is attached and has not fired
    Registered,
    /// The attached hook is flushing the hub
    Flushing,
}

/// Attaches a hook that flushes the hub when the host shuts down
pub struct ShutdownHookIntegration<R: ShutdownRuntime = ProcessRuntime> {
    runtime: Arc<R>,
    hook: Mutex<Option<Arc<ShutdownHook>>>,
}

impl<R: ShutdownRuntime> std::fmt::Debug for ShutdownHookIntegration<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShutdownHookIntegration")
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl ShutdownHookIntegration<ProcessRuntime> {
    /// Integration bound to the process-wide runtime
    pub fn new() -> Self {
        Self::with_runtime(ProcessRuntime::global())
    }
}

impl Default for ShutdownHookIntegration<ProcessRuntime> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: ShutdownRuntime> ShutdownHookIntegration<R> {
    /// Integration bound to an explicit runtime
    pub fn with_runtime(runtime: Arc<R>) -> Self {
        Self {
            runtime,
            hook: Mutex::new(None),
        }
    }

    /// Runtime hooks are attached to
    pub fn runtime(&self) -> &Arc<R> {
        &self.runtime
    }

    /// Currently attached hook
    pub fn hook(&self) -> Option<Arc<ShutdownHook>> {
        self.hook.lock().clone()
    }

    /// Current lifecycle state
    ///
    /// A hook that already finished flushing reports `Unregistered`: the
    /// runtime will not fire it again.
    pub fn state(&self) -> IntegrationState {
        match self.hook.lock().as_ref().map(|hook| hook.state()) {
            None | Some(HookState::Finished) => IntegrationState::Unregistered,
            Some(HookState::Idle) => IntegrationState::Registered,
            Some(HookState::Running) => IntegrationState::Flushing,
        }
    }

    /// Attach the flush hook unless disabled or already attached
    pub fn register(&self, hub: Arc<dyn Hub>, options: &ClientOptions) {
        if !options.enable_shutdown_hook {
            tracing::debug!("shutdown hook disabled");
            return;
        }

        let mut slot = self.hook.lock();
        if let Some(existing) = slot.take() {
            if existing.state() != HookState::Finished {
                tracing::debug!("shutdown hook already attached");
                *slot = Some(existing);
                return;
            }
            // A finished hook never fires again; replace it.
            self.runtime.remove_shutdown_hook(&existing);
        }

        let hook = Arc::new(flush_hook(hub, options));
        match self.runtime.add_shutdown_hook(Arc::clone(&hook)) {
            Ok(()) => {
                tracing::debug!(
                    hook_id = hook.id(),
                    flush_timeout_ms = options.flush_timeout_millis,
                    "shutdown hook attached"
                );
                *slot = Some(hook);
            }
            Err(err) => {
                tracing::warn!(error = %err, "could not attach shutdown hook");
            }
        }
    }

    /// Detach the hook if one is attached
    ///
    /// An in-flight flush is not cancelled.
    pub fn close(&self) {
        let Some(hook) = self.hook.lock().take() else {
            return;
        };
        if !self.runtime.remove_shutdown_hook(&hook) {
            tracing::debug!(
                hook_id = hook.id(),
                "shutdown hook was no longer registered with the runtime"
            );
        }
    }
}

fn flush_hook(hub: Arc<dyn Hub>, options: &ClientOptions) -> ShutdownHook {
    let timeout = options.flush_timeout();
    ShutdownHook::new(SHUTDOWN_HOOK_NAME, move || {
        tracing::debug!(timeout_ms = timeout.as_millis() as u64, "flushing on shutdown");
        if catch_unwind(AssertUnwindSafe(|| hub.flush(timeout))).is_err() {
            tracing::error!("hub flush panicked during shutdown");
        }
    })
}

impl<R: ShutdownRuntime> Integration for ShutdownHookIntegration<R> {
    fn name(&self) -> &'static str {
        "shutdown-hook"
    }

    fn register(&self, hub: Arc<dyn Hub>, options: &ClientOptions) {
        ShutdownHookIntegration::register(self, hub, options);
    }

    fn close(&self) {
        ShutdownHookIntegration::close(self);
    }
}
