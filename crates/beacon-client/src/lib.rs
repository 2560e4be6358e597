//! Beacon Client - buffering, flushing and shutdown integration
//!
//! Envelopes built with `beacon-core` flow through this crate on their way
//! to a [`Transport`]:
//!
//! - [`Client`] buffers envelopes in a bounded queue drained by a background
//!   worker, and exposes a timeout-bounded [`Client::flush`]
//! - [`Hub`] is the narrow interface integrations use; [`ClientHub`] is the
//!   implementation backed by a rebindable client
//! - [`ShutdownHookIntegration`] attaches a [`ShutdownHook`] to a
//!   [`ShutdownRuntime`] that flushes the hub when the process goes down
//! - [`init`] wires all of it together and returns a [`ClientInitGuard`]
//!
//! ```no_run
//! use beacon_client::{init, ClientOptions, NoopTransport};
//! use std::sync::Arc;
//!
//! let guard = init(ClientOptions::default(), Arc::new(NoopTransport))?;
//! guard.hub().capture_event(beacon_core::Event::new().with_message("started"));
//! # Ok::<(), beacon_core::BeaconError>(())
//! ```

#![forbid(unsafe_code)]

/// Background-queue client
pub mod client;

/// Client options
pub mod config;

/// Hub trait and client-backed hub
pub mod hub;

/// SDK initialization
pub mod init;

/// Host integrations
pub mod integrations;

/// Shutdown hooks and the process runtime
pub mod runtime;

/// Transport seam
pub mod transport;

pub use client::Client;
pub use config::ClientOptions;
pub use hub::{ClientHub, Hub};
pub use init::{init, init_with_integrations, ClientInitGuard};
pub use integrations::{Integration, IntegrationState, ShutdownHookIntegration};
pub use runtime::{HookState, ProcessRuntime, ShutdownHook, ShutdownRuntime};
pub use transport::{NoopTransport, Transport};
