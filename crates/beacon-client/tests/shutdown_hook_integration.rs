//! Shutdown hook lifecycle against a recording runtime and hub.

use beacon_client::{
    ClientOptions, Hub, IntegrationState, ShutdownHookIntegration, ShutdownRuntime,
};
use beacon_testkit::{init_test_tracing, RecordingHub, RecordingRuntime};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

fn setup() -> (
    Arc<RecordingRuntime>,
    Arc<RecordingHub>,
    ShutdownHookIntegration<RecordingRuntime>,
) {
    init_test_tracing();
    let runtime = Arc::new(RecordingRuntime::new());
    let hub = Arc::new(RecordingHub::new());
    let integration = ShutdownHookIntegration::with_runtime(Arc::clone(&runtime));
    (runtime, hub, integration)
}

fn as_hub(hub: &Arc<RecordingHub>) -> Arc<dyn Hub> {
    Arc::clone(hub) as Arc<dyn Hub>
}

#[test]
fn registering_twice_attaches_one_hook() {
    let (runtime, hub, integration) = setup();
    let options = ClientOptions::default();

    integration.register(as_hub(&hub), &options);
    integration.register(as_hub(&hub), &options);

    assert_eq!(runtime.add_calls(), 1);
    assert_eq!(runtime.hooks().len(), 1);
    assert_eq!(integration.state(), IntegrationState::Registered);
}

#[test]
fn disabled_option_attaches_nothing() {
    let (runtime, hub, integration) = setup();
    let options = ClientOptions {
        enable_shutdown_hook: false,
        ..ClientOptions::default()
    };

    integration.register(as_hub(&hub), &options);

    assert_eq!(runtime.add_calls(), 0);
    assert_eq!(integration.state(), IntegrationState::Unregistered);
    assert!(integration.hook().is_none());
}

#[test]
fn close_detaches_exactly_once() {
    let (runtime, hub, integration) = setup();
    integration.register(as_hub(&hub), &ClientOptions::default());

    integration.close();
    integration.close();

    assert_eq!(runtime.remove_calls(), 1);
    assert!(runtime.hooks().is_empty());
    assert_eq!(integration.state(), IntegrationState::Unregistered);
}

#[test]
fn close_without_register_makes_no_detach_call() {
    let (runtime, _hub, integration) = setup();

    integration.close();

    assert_eq!(runtime.remove_calls(), 0);
}

#[test]
fn fired_hook_flushes_once_with_default_timeout() {
    let (runtime, hub, integration) = setup();
    integration.register(as_hub(&hub), &ClientOptions::default());

    assert_eq!(runtime.fire_all(), 1);

    assert_eq!(hub.flush_calls(), vec![Duration::from_millis(15_000)]);
    assert!(hub.envelopes().is_empty());
}

#[test]
fn configured_timeout_reaches_flush() {
    let (runtime, hub, integration) = setup();
    let options = ClientOptions {
        flush_timeout_millis: 10_000,
        ..ClientOptions::default()
    };
    integration.register(as_hub(&hub), &options);

    runtime.fire_all();

    assert_eq!(hub.flush_calls(), vec![Duration::from_millis(10_000)]);
}

#[test]
fn hook_fires_at_most_once() {
    let (runtime, hub, integration) = setup();
    integration.register(as_hub(&hub), &ClientOptions::default());

    assert_eq!(runtime.fire_all(), 1);
    assert_eq!(runtime.fire_all(), 0);

    assert_eq!(hub.flush_calls().len(), 1);
    assert_eq!(integration.state(), IntegrationState::Unregistered);
}

#[test]
fn close_tolerates_a_fired_hook() {
    let (runtime, hub, integration) = setup();
    integration.register(as_hub(&hub), &ClientOptions::default());
    runtime.fire_all();

    integration.close();

    assert_eq!(runtime.remove_calls(), 1);
    assert!(runtime.hooks().is_empty());
    assert_eq!(hub.flush_calls().len(), 1);
}

#[test]
fn close_during_flush_does_not_cancel_it() {
    let (runtime, _, integration) = setup();
    let hub = Arc::new(RecordingHub::with_flush_delay(Duration::from_millis(200)));
    integration.register(as_hub(&hub), &ClientOptions::default());

    let hook = integration.hook().unwrap();
    let handle = hook.spawn().unwrap();
    while hub.flush_calls().is_empty() {
        thread::yield_now();
    }
    assert_eq!(integration.state(), IntegrationState::Flushing);

    integration.close();
    assert!(handle.join().unwrap());

    assert_eq!(runtime.remove_calls(), 1);
    assert_eq!(hub.flush_calls().len(), 1);
}

#[test]
fn concurrent_registers_attach_one_hook() {
    let (runtime, hub, integration) = setup();
    let integration = Arc::new(integration);
    let options = ClientOptions::default();
    let barrier = Arc::new(Barrier::new(8));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let integration = Arc::clone(&integration);
            let hub = as_hub(&hub);
            let options = options.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                integration.register(hub, &options);
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(runtime.add_calls(), 1);
    assert_eq!(runtime.hooks().len(), 1);
}

#[test]
fn rejected_attach_degrades_to_unregistered() {
    init_test_tracing();
    let runtime = Arc::new(RecordingRuntime::rejecting());
    let hub = Arc::new(RecordingHub::new());
    let integration = ShutdownHookIntegration::with_runtime(Arc::clone(&runtime));

    integration.register(as_hub(&hub), &ClientOptions::default());

    assert_eq!(runtime.add_calls(), 1);
    assert_eq!(integration.state(), IntegrationState::Unregistered);
    assert!(integration.hook().is_none());

    integration.close();
    assert_eq!(runtime.remove_calls(), 0);
}

#[test]
fn register_after_close_attaches_a_fresh_hook() {
    let (runtime, hub, integration) = setup();
    integration.register(as_hub(&hub), &ClientOptions::default());
    let first = integration.hook().unwrap();
    integration.close();

    integration.register(as_hub(&hub), &ClientOptions::default());
    let second = integration.hook().unwrap();

    assert_eq!(runtime.add_calls(), 2);
    assert_ne!(first.id(), second.id());
    assert!(!runtime.remove_shutdown_hook(&first));
}

#[test]
fn register_after_hook_fired_attaches_a_fresh_hook() {
    let (runtime, hub, integration) = setup();
    integration.register(as_hub(&hub), &ClientOptions::default());
    let fired = integration.hook().unwrap();
    runtime.fire_all();
    assert_eq!(integration.state(), IntegrationState::Unregistered);

    integration.register(as_hub(&hub), &ClientOptions::default());

    assert_eq!(integration.state(), IntegrationState::Registered);
    assert_eq!(runtime.add_calls(), 2);
    assert_eq!(runtime.remove_calls(), 1);
    let fresh = integration.hook().unwrap();
    assert_ne!(fresh.id(), fired.id());
    assert_eq!(runtime.hooks().len(), 1);

    assert_eq!(runtime.fire_all(), 1);
    assert_eq!(hub.flush_calls().len(), 2);
}
