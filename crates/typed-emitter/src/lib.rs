//! # Typed Emitter - In-Process Events With Namespace Revocation
//!
//! Register listeners for named events carrying typed payloads, dispatch
//! events synchronously, and revoke whole groups of listeners by namespace.
//!
//! ## Model
//!
//! ```text
//!   EventEmitter ──────────────┬──► listeners: name → [callback, ...]
//!        ▲                     └──► namespaces: name → CancellationToken
//!        │ forwards
//!   EventEmitterNamespace ("feature-x")
//!        │ after each dispatch
//!        └──► subscriber (optional)
//! ```
//!
//! - Event names and payloads are tied together at compile time by
//!   [`EventMap`].
//! - Every delivered [`Detail`] carries the dispatched `eventName`.
//! - Listeners registered without a namespace belong to `"global"`.
//! - `remove_all_listeners(ns)` revokes everything under `ns` at once; the
//!   next registration under `ns` starts a fresh scope.
//!
//! ## Example
//!
//! ```ignore
//! use typed_emitter::{Callback, Dispatch, Emitter, EventEmitter};
//!
//! let emitter = EventEmitter::<AppEvent>::new();
//! let panel = emitter.namespace("panel");
//!
//! panel.add_event_listener(
//!     AppEventName::Tick,
//!     Callback::new(|detail| println!("{:?}", detail.payload())),
//!     None,
//! )?;
//!
//! emitter.dispatch_event(AppEvent::Tick { n: 1 });
//! emitter.remove_all_listeners(Some("panel"));
//! ```

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

mod cancellation;
pub mod config;
pub mod emitter;
pub mod error;
pub mod events;
pub mod listener;
pub mod namespace;

// Re-export main types
pub use config::{EmitterConfig, FailurePolicy};
pub use emitter::{Emitter, EventEmitter};
pub use error::{ConfigError, EmitterError, Result};
pub use events::{Detail, Dispatch, EventMap, EventName};
pub use listener::{Callback, Listener};
pub use namespace::{EventEmitterNamespace, Subscriber};

/// The default namespace, present from emitter construction.
pub const GLOBAL_NAMESPACE: &str = "global";

/// Key under which the dispatched event name appears in a serialized detail.
pub const EVENT_NAME_FIELD: &str = "eventName";
