//! Recording shutdown runtime

use beacon_client::{ShutdownHook, ShutdownRuntime};
use beacon_core::{BeaconError, Result};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

/// [`ShutdownRuntime`] that counts attach and detach calls
///
/// Hooks only run when the test calls [`RecordingRuntime::fire_all`].
#[derive(Debug, Default)]
pub struct RecordingRuntime {
    hooks: Mutex<Vec<Arc<ShutdownHook>>>,
    adds: AtomicUsize,
    removes: AtomicUsize,
    reject_adds: AtomicBool,
}

impl RecordingRuntime {
    /// Create a runtime that accepts hooks
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a runtime that refuses every hook, like a host already exiting
    pub fn rejecting() -> Self {
        let runtime = Self::default();
        runtime.reject_adds.store(true, Ordering::SeqCst);
        runtime
    }

    /// Number of `add_shutdown_hook` calls, including rejected ones
    pub fn add_calls(&self) -> usize {
        self.adds.load(Ordering::SeqCst)
    }

    /// Number of `remove_shutdown_hook` calls
    pub fn remove_calls(&self) -> usize {
        self.removes.load(Ordering::SeqCst)
    }

    /// Hooks currently attached
    pub fn hooks(&self) -> Vec<Arc<ShutdownHook>> {
        self.hooks.lock().clone()
    }

    /// Run every attached hook on its own thread and wait for all of them
    ///
    /// Hooks stay attached, mirroring a host that fires without detaching.
    /// Returns how many hooks executed their body.
    pub fn fire_all(&self) -> usize {
        let handles: Vec<_> = self
            .hooks()
            .iter()
            .map(|hook| hook.spawn().expect("spawn shutdown hook"))
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().expect("join shutdown hook"))
            .filter(|ran| *ran)
            .count()
    }
}

impl ShutdownRuntime for RecordingRuntime {
    fn add_shutdown_hook(&self, hook: Arc<ShutdownHook>) -> Result<()> {
        self.adds.fetch_add(1, Ordering::SeqCst);
        if self.reject_adds.load(Ordering::SeqCst) {
            return Err(BeaconError::runtime("shutdown in progress"));
        }
        self.hooks.lock().push(hook);
        Ok(())
    }

    fn remove_shutdown_hook(&self, hook: &Arc<ShutdownHook>) -> bool {
        self.removes.fetch_add(1, Ordering::SeqCst);
        let mut hooks = self.hooks.lock();
        let before = hooks.len();
        hooks.retain(|existing| !Arc::ptr_eq(existing, hook));
        hooks.len() != before
    }
}
