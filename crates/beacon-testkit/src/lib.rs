//! Beacon Testing Infrastructure
//!
//! Shared fixtures, fakes and assertions for the Beacon crates. The fakes
//! record what they are asked to do instead of mocking: tests drive the real
//! code against them and inspect the record afterwards.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
//!
//! # Usage
//!
//! Add this to your crate's `Cargo.toml` dev-dependencies:
//! ```toml
//! [dev-dependencies]
//! beacon-testkit = { workspace = true }
//! ```
//!
//! Then in your tests:
//! ```rust,no_run
//! use beacon_testkit::*;
//! use std::sync::Arc;
//!
//! let hub = Arc::new(RecordingHub::new());
//! let runtime = Arc::new(RecordingRuntime::new());
//! // ... register an integration, fire the runtime, inspect the hub
//! runtime.fire_all();
//! assert!(hub.flush_calls().is_empty());
//! ```

pub mod assertions;
pub mod fixtures;
pub mod hub;
pub mod logging;
pub mod runtime;
pub mod transport;

pub use assertions::*;
pub use fixtures::*;
pub use hub::RecordingHub;
pub use logging::init_test_tracing;
pub use runtime::RecordingRuntime;
pub use transport::{BlockingTransport, FailingTransport, RecordingTransport};
