//! Host shutdown runtime
//!
//! A [`ShutdownHook`] is a named unit of work that runs at most once when the
//! process is going down. Hooks are registered with a [`ShutdownRuntime`];
//! [`ProcessRuntime`] is the in-process implementation that runs every
//! registered hook concurrently and waits for all of them.

use beacon_core::{BeaconError, Result};
use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

/// Exit status used after a termination signal ran the hooks
///
/// `ctrlc` reports SIGINT, SIGTERM and SIGHUP through one callback without
/// saying which arrived, so every signal exits with the SIGINT status.
pub const SIGNAL_EXIT_CODE: i32 = 130;

static NEXT_HOOK_ID: AtomicU64 = AtomicU64::new(1);

/// Lifecycle of a [`ShutdownHook`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookState {
    /// Not started
    Idle,
    /// Body is executing
    Running,
    /// Body completed or panicked; the hook never runs again
    Finished,
}

const IDLE: u8 = 0;
const RUNNING: u8 = 1;
const FINISHED: u8 = 2;

type HookBody = Box<dyn Fn() + Send + Sync>;

/// Work executed once when the host shuts down
pub struct ShutdownHook {
    id: u64,
    name: String,
    body: HookBody,
    state: AtomicU8,
}

impl fmt::Debug for ShutdownHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShutdownHook")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl ShutdownHook {
    /// Create a hook around `body`
    pub fn new(name: impl Into<String>, body: impl Fn() + Send + Sync + 'static) -> Self {
        Self {
            id: NEXT_HOOK_ID.fetch_add(1, Ordering::Relaxed),
            name: name.into(),
            body: Box::new(body),
            state: AtomicU8::new(IDLE),
        }
    }

    /// Process-unique hook id
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Hook name, used in logs and as the thread name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current lifecycle state
    pub fn state(&self) -> HookState {
        match self.state.load(Ordering::Acquire) {
            IDLE => HookState::Idle,
            RUNNING => HookState::Running,
            _ => HookState::Finished,
        }
    }

    /// Run the body on the current thread
    ///
    /// Only the first call executes the body; later calls return `false`
    /// immediately. A panicking body is logged and counts as finished.
    pub fn run(&self) -> bool {
        if self
            .state
            .compare_exchange(IDLE, RUNNING, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::debug!(hook = %self.name, "shutdown hook already ran");
            return false;
        }

        tracing::debug!(hook = %self.name, "running shutdown hook");
        if catch_unwind(AssertUnwindSafe(|| (self.body)())).is_err() {
            tracing::error!(hook = %self.name, "shutdown hook panicked");
        }
        self.state.store(FINISHED, Ordering::Release);
        true
    }

    /// Run the body on a new thread named after the hook
    pub fn spawn(self: &Arc<Self>) -> Result<JoinHandle<bool>> {
        let hook = Arc::clone(self);
        std::thread::Builder::new()
            .name(self.name.clone())
            .spawn(move || hook.run())
            .map_err(|e| {
                BeaconError::runtime(format!("failed to spawn shutdown hook {}: {e}", self.name))
            })
    }
}

/// A host that runs hooks when it shuts down
pub trait ShutdownRuntime: Send + Sync {
    /// Register a hook
    ///
    /// Fails if the hook is already registered or shutdown has begun.
    fn add_shutdown_hook(&self, hook: Arc<ShutdownHook>) -> Result<()>;

    /// Unregister a hook; returns whether it was registered
    fn remove_shutdown_hook(&self, hook: &Arc<ShutdownHook>) -> bool;
}

/// In-process shutdown runtime
#[derive(Debug, Default)]
pub struct ProcessRuntime {
    hooks: Mutex<Vec<Arc<ShutdownHook>>>,
    shutting_down: AtomicBool,
    signal_handler_installed: AtomicBool,
}

static GLOBAL_RUNTIME: OnceCell<Arc<ProcessRuntime>> = OnceCell::new();

impl ProcessRuntime {
    /// Create an empty runtime
    pub fn new() -> Self {
        Self::default()
    }

    /// The runtime shared by the whole process
    pub fn global() -> Arc<ProcessRuntime> {
        Arc::clone(GLOBAL_RUNTIME.get_or_init(|| Arc::new(ProcessRuntime::new())))
    }

    /// Number of registered hooks
    pub fn hook_count(&self) -> usize {
        self.hooks.lock().len()
    }

    /// Whether [`ProcessRuntime::run_shutdown_hooks`] has been called
    pub fn is_shutting_down(&self) -> bool {
        self.shutting_down.load(Ordering::Acquire)
    }

    /// Run every registered hook, each on its own thread, and wait for all
    ///
    /// Only the first call runs anything. Returns the number of hooks that
    /// ran to completion.
    pub fn run_shutdown_hooks(&self) -> usize {
        if self.shutting_down.swap(true, Ordering::AcqRel) {
            tracing::debug!("shutdown hooks already started");
            return 0;
        }

        let hooks = std::mem::take(&mut *self.hooks.lock());
        tracing::info!(count = hooks.len(), "running shutdown hooks");

        let handles: Vec<_> = hooks
            .iter()
            .filter_map(|hook| match hook.spawn() {
                Ok(handle) => Some(handle),
                Err(err) => {
                    tracing::warn!(hook = hook.name(), error = %err, "running shutdown hook inline");
                    hook.run();
                    None
                }
            })
            .collect();
        for handle in handles {
            if handle.join().is_err() {
                tracing::error!("shutdown hook thread panicked");
            }
        }

        hooks
            .iter()
            .filter(|hook| hook.state() == HookState::Finished)
            .count()
    }

    /// Run the hooks and exit when the process receives SIGINT, SIGTERM or SIGHUP
    ///
    /// The process exits with [`SIGNAL_EXIT_CODE`] whichever signal arrived.
    ///
    /// Only one handler can exist per process, so this is meant for the
    /// [global](ProcessRuntime::global) runtime.
    pub fn install_signal_handler(self: &Arc<Self>) -> Result<()> {
        if self.signal_handler_installed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }

        let runtime = Arc::clone(self);
        let installed = ctrlc::set_handler(move || {
            tracing::info!("termination signal received");
            runtime.run_shutdown_hooks();
            std::process::exit(SIGNAL_EXIT_CODE);
        });
        if let Err(err) = installed {
            self.signal_handler_installed.store(false, Ordering::Release);
            return Err(BeaconError::runtime(format!(
                "failed to install signal handler: {err}"
            )));
        }
        tracing::debug!("signal handler installed");
        Ok(())
    }
}

impl ShutdownRuntime for ProcessRuntime {
    fn add_shutdown_hook(&self, hook: Arc<ShutdownHook>) -> Result<()> {
        let mut hooks = self.hooks.lock();
        if self.is_shutting_down() {
            return Err(BeaconError::runtime(format!(
                "cannot register {}: shutdown in progress",
                hook.name()
            )));
        }
        if hooks.iter().any(|existing| Arc::ptr_eq(existing, &hook)) {
            return Err(BeaconError::runtime(format!(
                "shutdown hook {} already registered",
                hook.name()
            )));
        }
        hooks.push(hook);
        Ok(())
    }

    fn remove_shutdown_hook(&self, hook: &Arc<ShutdownHook>) -> bool {
        let mut hooks = self.hooks.lock();
        let before = hooks.len();
        hooks.retain(|existing| !Arc::ptr_eq(existing, hook));
        hooks.len() != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn counting_hook(name: &str) -> (Arc<ShutdownHook>, Arc<AtomicUsize>) {
        let count = Arc::new(AtomicUsize::new(0));
        let body_count = Arc::clone(&count);
        let hook = ShutdownHook::new(name, move || {
            body_count.fetch_add(1, Ordering::SeqCst);
        });
        (Arc::new(hook), count)
    }

    #[test]
    fn signal_exit_uses_the_interrupt_status() {
        assert_eq!(SIGNAL_EXIT_CODE, 128 + 2);
    }

    #[test]
    fn hook_runs_once() {
        let (hook, count) = counting_hook("once");
        assert_eq!(hook.state(), HookState::Idle);
        assert!(hook.run());
        assert!(!hook.run());
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(hook.state(), HookState::Finished);
    }

    #[test]
    fn panicking_hook_finishes() {
        let hook = Arc::new(ShutdownHook::new("boom", || panic!("boom")));
        assert!(hook.spawn().unwrap().join().unwrap());
        assert_eq!(hook.state(), HookState::Finished);
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let runtime = ProcessRuntime::new();
        let (hook, _) = counting_hook("dup");
        runtime.add_shutdown_hook(Arc::clone(&hook)).unwrap();
        assert!(runtime.add_shutdown_hook(Arc::clone(&hook)).is_err());
        assert_eq!(runtime.hook_count(), 1);
        assert!(runtime.remove_shutdown_hook(&hook));
        assert!(!runtime.remove_shutdown_hook(&hook));
    }
}
