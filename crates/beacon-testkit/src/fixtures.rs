//! Ready-made payloads and options

use beacon_client::ClientOptions;
use beacon_core::{Event, Level, SpanStatus, Transaction};

/// An error event with a message, logger and a couple of tags
pub fn sample_event() -> Event {
    Event::new()
        .with_message("payment declined")
        .with_level(Level::Error)
        .with_logger("checkout")
        .with_tag("region", "eu-west-1")
        .with_tag("customer_tier", "gold")
}

/// A finished `GET /checkout` transaction with one finished child span
pub fn sample_transaction() -> Transaction {
    let mut transaction = Transaction::new("GET /checkout", "http.server");
    let mut span = transaction.start_child("db.query", "SELECT * FROM carts WHERE id = $1");
    span.status = Some(SpanStatus::Ok);
    transaction.finish_span(span);
    transaction.set_status(SpanStatus::Ok);
    transaction.finish();
    transaction
}

/// Options suited to tests: small queue, short timeouts, no signal handler
pub fn test_options() -> ClientOptions {
    ClientOptions {
        release: Some("beacon-tests@0.1.0".to_string()),
        environment: Some("test".to_string()),
        max_queue_size: 8,
        flush_timeout_millis: 1_000,
        shutdown_timeout_millis: 1_000,
        install_signal_handler: false,
        ..ClientOptions::default()
    }
}
