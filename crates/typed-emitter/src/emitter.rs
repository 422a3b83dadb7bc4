//! # Event Emitter
//!
//! Typed registration, dispatch and namespace revocation of listeners.
//!
//! Listeners live in a table keyed by event name, each entry an ordered list
//! of callback handles. Every registration carries the cancellation token of
//! its namespace; revoking the namespace cancels that token and drops its
//! entries in one step.

use crate::cancellation::CancellationRegistry;
use crate::config::{EmitterConfig, FailurePolicy};
use crate::error::Result;
use crate::events::{Detail, Dispatch, EventMap, EventName};
use crate::listener::{Callback, Listener};
use crate::namespace::{EventEmitterNamespace, Subscriber};
use crate::GLOBAL_NAMESPACE;
use parking_lot::Mutex;
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, trace, warn};

/// Operations shared by [`EventEmitter`] and [`EventEmitterNamespace`].
pub trait Emitter<M: EventMap> {
    /// Register `callback` for `name`.
    ///
    /// `namespace` defaults to `"global"`.
    ///
    /// # Errors
    ///
    /// [`EmitterError::InvalidNamespace`](crate::EmitterError::InvalidNamespace)
    /// if `namespace` is empty. Nothing is registered in that case.
    fn add_event_listener(
        &self,
        name: M::Name,
        callback: Callback<M>,
        namespace: Option<&str>,
    ) -> Result<Listener<M>>;

    /// Register the same callback under every name in `names`.
    ///
    /// # Errors
    ///
    /// Same as [`add_event_listener`](Self::add_event_listener).
    fn add_events_listener<I>(
        &self,
        names: I,
        callback: Callback<M>,
        namespace: Option<&str>,
    ) -> Result<Vec<Listener<M>>>
    where
        I: IntoIterator<Item = M::Name>;

    /// Deliver an event to every live listener for its name.
    fn dispatch_event(&self, dispatch: impl Into<Dispatch<M>>);

    /// Unregister one listener. No-op if it is not registered.
    fn remove_event_listener(&self, listener: &Listener<M>);

    /// Unregister each listener in turn.
    fn remove_event_listeners(&self, listeners: &[Listener<M>]) {
        for listener in listeners {
            self.remove_event_listener(listener);
        }
    }

    /// Revoke every listener registered under `namespace` (default `"global"`).
    fn remove_all_listeners(&self, namespace: Option<&str>);
}

/// One callback registered for one event name.
struct Registration<M: EventMap> {
    callback: Callback<M>,
    namespace: String,
    scope: CancellationToken,
    removed: AtomicBool,
}

impl<M: EventMap> Registration<M> {
    fn is_live(&self) -> bool {
        !self.removed.load(Ordering::Acquire) && !self.scope.is_cancelled()
    }
}

struct State<M: EventMap> {
    registry: CancellationRegistry,
    listeners: HashMap<M::Name, Vec<Arc<Registration<M>>>>,
}

/// Typed event emitter.
///
/// Cloning is cheap; clones and namespace views share one listener table.
pub struct EventEmitter<M: EventMap> {
    config: EmitterConfig,
    state: Arc<Mutex<State<M>>>,
}

impl<M: EventMap> EventEmitter<M> {
    /// Create an emitter with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(EmitterConfig::default())
    }

    /// Create an emitter with the given configuration.
    #[must_use]
    pub fn with_config(config: EmitterConfig) -> Self {
        Self {
            config,
            state: Arc::new(Mutex::new(State {
                registry: CancellationRegistry::new(),
                listeners: HashMap::new(),
            })),
        }
    }

    /// The configuration this emitter was built with.
    #[must_use]
    pub fn config(&self) -> &EmitterConfig {
        &self.config
    }

    /// A view bound to `namespace`.
    #[must_use]
    pub fn namespace(&self, namespace: impl Into<String>) -> EventEmitterNamespace<M> {
        EventEmitterNamespace::new(namespace.into(), self.clone(), None)
    }

    /// A view bound to `namespace` that reports every dispatch made through
    /// it to `subscriber`, after delivery.
    #[must_use]
    pub fn namespace_with_subscriber<F>(
        &self,
        namespace: impl Into<String>,
        subscriber: F,
    ) -> EventEmitterNamespace<M>
    where
        F: Fn(&Dispatch<M>) + Send + Sync + 'static,
    {
        let subscriber: Subscriber<M> = Arc::new(subscriber);
        EventEmitterNamespace::new(namespace.into(), self.clone(), Some(subscriber))
    }

    /// Number of live listeners for `name`.
    #[must_use]
    pub fn listener_count(&self, name: M::Name) -> usize {
        let state = self.state.lock();
        state
            .listeners
            .get(&name)
            .map_or(0, |entries| entries.iter().filter(|r| r.is_live()).count())
    }

    /// Namespaces that currently hold a cancellation scope, sorted.
    #[must_use]
    pub fn namespaces(&self) -> Vec<String> {
        self.state.lock().registry.namespaces()
    }

    /// `true` if `namespace` currently holds a cancellation scope.
    #[must_use]
    pub fn has_namespace(&self, namespace: &str) -> bool {
        self.state.lock().registry.contains(namespace)
    }

    /// Deliver `dispatch` without consuming it.
    pub(crate) fn deliver(&self, dispatch: &Dispatch<M>) {
        let name = dispatch.name();

        // Snapshot so callbacks can re-enter the emitter.
        let snapshot: Vec<Arc<Registration<M>>> = {
            let state = self.state.lock();
            match state.listeners.get(&name) {
                Some(entries) => entries.clone(),
                None => Vec::new(),
            }
        };

        if snapshot.is_empty() {
            trace!(event = name.as_str(), "No listeners for event");
            return;
        }

        trace!(
            event = name.as_str(),
            listeners = snapshot.len(),
            "Dispatching event"
        );

        let detail = dispatch.detail();
        for registration in &snapshot {
            // Removed or revoked by an earlier callback in this dispatch.
            if !registration.is_live() {
                continue;
            }
            self.invoke(registration, &detail);
        }
    }

    fn invoke(&self, registration: &Registration<M>, detail: &Detail<M>) {
        match self.config.failure_policy {
            FailurePolicy::Propagate => registration.callback.call(detail),
            FailurePolicy::Isolate => {
                let outcome =
                    panic::catch_unwind(AssertUnwindSafe(|| registration.callback.call(detail)));
                if let Err(payload) = outcome {
                    error!(
                        event = detail.event_name().as_str(),
                        namespace = %registration.namespace,
                        panic = panic_message(payload.as_ref()),
                        "Listener panicked during dispatch"
                    );
                }
            }
        }
    }
}

impl<M: EventMap> Emitter<M> for EventEmitter<M> {
    fn add_event_listener(
        &self,
        name: M::Name,
        callback: Callback<M>,
        namespace: Option<&str>,
    ) -> Result<Listener<M>> {
        let namespace = namespace.unwrap_or(GLOBAL_NAMESPACE);
        let mut state = self.state.lock();
        let scope = state.registry.ensure(namespace)?;

        let entries = state.listeners.entry(name).or_default();
        if let Some(existing) = entries.iter().find(|r| r.callback.same_as(&callback)) {
            warn!(
                event = name.as_str(),
                namespace = %existing.namespace,
                "Callback already registered for event, ignoring duplicate"
            );
            return Ok(Listener::new(
                name,
                existing.namespace.clone(),
                callback,
                existing.scope.child_token(),
            ));
        }

        entries.push(Arc::new(Registration {
            callback: callback.clone(),
            namespace: namespace.to_string(),
            scope: scope.clone(),
            removed: AtomicBool::new(false),
        }));

        debug!(
            event = name.as_str(),
            namespace = namespace,
            listeners = entries.len(),
            "Listener registered"
        );

        Ok(Listener::new(
            name,
            namespace.to_string(),
            callback,
            scope.child_token(),
        ))
    }

    fn add_events_listener<I>(
        &self,
        names: I,
        callback: Callback<M>,
        namespace: Option<&str>,
    ) -> Result<Vec<Listener<M>>>
    where
        I: IntoIterator<Item = M::Name>,
    {
        names
            .into_iter()
            .map(|name| self.add_event_listener(name, callback.clone(), namespace))
            .collect()
    }

    fn dispatch_event(&self, dispatch: impl Into<Dispatch<M>>) {
        self.deliver(&dispatch.into());
    }

    fn remove_event_listener(&self, listener: &Listener<M>) {
        let name = listener.name();
        let mut state = self.state.lock();
        let Some(entries) = state.listeners.get_mut(&name) else {
            return;
        };
        let Some(position) = entries
            .iter()
            .position(|r| r.callback.same_as(listener.callback()))
        else {
            return;
        };

        let registration = entries.remove(position);
        registration.removed.store(true, Ordering::Release);
        if entries.is_empty() {
            state.listeners.remove(&name);
        }

        debug!(
            event = name.as_str(),
            namespace = %registration.namespace,
            "Listener removed"
        );
    }

    fn remove_all_listeners(&self, namespace: Option<&str>) {
        let namespace = namespace.unwrap_or(GLOBAL_NAMESPACE);
        let mut state = self.state.lock();
        if state.registry.revoke(namespace).is_none() {
            debug!(namespace = namespace, "No live scope for namespace");
            return;
        }

        let mut released = 0usize;
        state.listeners.retain(|_, entries| {
            entries.retain(|r| {
                let keep = r.namespace != namespace;
                if !keep {
                    released += 1;
                }
                keep
            });
            !entries.is_empty()
        });

        debug!(
            namespace = namespace,
            released = released,
            "Namespace revoked"
        );
    }
}

impl<M: EventMap> Clone for EventEmitter<M> {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            state: Arc::clone(&self.state),
        }
    }
}

impl<M: EventMap> Default for EventEmitter<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: EventMap> fmt::Debug for EventEmitter<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        let listeners: usize = state.listeners.values().map(Vec::len).sum();
        f.debug_struct("EventEmitter")
            .field("config", &self.config)
            .field("namespaces", &state.registry.namespaces())
            .field("listeners", &listeners)
            .finish()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "non-string panic payload"
    }
}
