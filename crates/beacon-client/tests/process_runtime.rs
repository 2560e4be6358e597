//! In-process shutdown runtime.

use assert_matches::assert_matches;
use beacon_client::{
    ClientOptions, HookState, IntegrationState, ProcessRuntime, ShutdownHook,
    ShutdownHookIntegration, ShutdownRuntime,
};
use beacon_core::BeaconError;
use beacon_testkit::{init_test_tracing, RecordingHub};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::time::Duration;

#[test]
fn hooks_run_concurrently_on_their_own_threads() {
    init_test_tracing();
    let runtime = ProcessRuntime::new();
    // Each hook waits for the others, so this only finishes if they overlap.
    let barrier = Arc::new(Barrier::new(3));
    let names = Arc::new(parking_lot::Mutex::new(Vec::new()));

    for index in 0..3 {
        let barrier = Arc::clone(&barrier);
        let names = Arc::clone(&names);
        let hook = ShutdownHook::new(format!("hook-{index}"), move || {
            barrier.wait();
            let name = std::thread::current().name().map(str::to_string);
            names.lock().push(name);
        });
        runtime.add_shutdown_hook(Arc::new(hook)).unwrap();
    }

    assert_eq!(runtime.run_shutdown_hooks(), 3);

    let mut names: Vec<_> = names.lock().iter().flatten().cloned().collect();
    names.sort();
    assert_eq!(names, vec!["hook-0", "hook-1", "hook-2"]);
}

#[test]
fn shutdown_runs_once_and_closes_registration() {
    let runtime = ProcessRuntime::new();
    let runs = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&runs);
    runtime
        .add_shutdown_hook(Arc::new(ShutdownHook::new("count", move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })))
        .unwrap();

    assert_eq!(runtime.run_shutdown_hooks(), 1);
    assert_eq!(runtime.run_shutdown_hooks(), 0);
    assert_eq!(runs.load(Ordering::SeqCst), 1);
    assert!(runtime.is_shutting_down());

    let late = runtime.add_shutdown_hook(Arc::new(ShutdownHook::new("late", || {})));
    assert_matches!(late, Err(BeaconError::Runtime { .. }));
}

#[test]
fn panicking_hook_does_not_stop_the_others() {
    init_test_tracing();
    let runtime = ProcessRuntime::new();
    let ok = Arc::new(ShutdownHook::new("ok", || {}));
    runtime
        .add_shutdown_hook(Arc::new(ShutdownHook::new("panics", || panic!("boom"))))
        .unwrap();
    runtime.add_shutdown_hook(Arc::clone(&ok)).unwrap();

    assert_eq!(runtime.run_shutdown_hooks(), 2);
    assert_eq!(ok.state(), HookState::Finished);
}

#[test]
fn integration_against_process_runtime() {
    init_test_tracing();
    let runtime = Arc::new(ProcessRuntime::new());
    let hub = Arc::new(RecordingHub::new());
    let integration = ShutdownHookIntegration::with_runtime(Arc::clone(&runtime));
    let options = ClientOptions {
        flush_timeout_millis: 250,
        ..ClientOptions::default()
    };

    integration.register(Arc::clone(&hub) as Arc<dyn beacon_client::Hub>, &options);
    assert_eq!(runtime.hook_count(), 1);

    assert_eq!(runtime.run_shutdown_hooks(), 1);
    assert_eq!(hub.flush_calls(), vec![Duration::from_millis(250)]);
    assert_eq!(integration.state(), IntegrationState::Unregistered);

    // The runtime already dropped the hook; closing must still succeed.
    integration.close();
    assert_eq!(runtime.hook_count(), 0);
}

#[test]
fn registration_after_shutdown_degrades() {
    let runtime = Arc::new(ProcessRuntime::new());
    runtime.run_shutdown_hooks();

    let integration = ShutdownHookIntegration::with_runtime(Arc::clone(&runtime));
    integration.register(
        Arc::new(RecordingHub::new()) as Arc<dyn beacon_client::Hub>,
        &ClientOptions::default(),
    );

    assert_eq!(integration.state(), IntegrationState::Unregistered);
    assert!(integration.hook().is_none());
}
