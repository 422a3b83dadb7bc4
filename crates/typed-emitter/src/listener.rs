//! # Listeners
//!
//! Callback handles and the descriptors returned by registration.

use crate::events::{Detail, EventMap};
use std::fmt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// A shareable listener callback.
///
/// Identity is the allocation: clones of one `Callback` are the same
/// listener, two callbacks built from identical closures are not.
pub struct Callback<M: EventMap> {
    inner: Arc<dyn Fn(&Detail<M>) + Send + Sync>,
}

impl<M: EventMap> Callback<M> {
    /// Wrap a closure as a callback.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Detail<M>) + Send + Sync + 'static,
    {
        Self { inner: Arc::new(f) }
    }

    /// Invoke the callback.
    pub fn call(&self, detail: &Detail<M>) {
        (self.inner)(detail);
    }

    /// `true` if both handles refer to the same callback.
    #[must_use]
    pub fn same_as(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<M: EventMap> Clone for Callback<M> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<M: EventMap> fmt::Debug for Callback<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callback")
            .field("ptr", &Arc::as_ptr(&self.inner).cast::<()>())
            .finish()
    }
}

impl<M, F> From<F> for Callback<M>
where
    M: EventMap,
    F: Fn(&Detail<M>) + Send + Sync + 'static,
{
    fn from(f: F) -> Self {
        Self::new(f)
    }
}

/// A registered listener, as returned by the emitter.
///
/// Pass it back to `remove_event_listener` to unregister it.
#[derive(Debug, Clone)]
pub struct Listener<M: EventMap> {
    name: M::Name,
    namespace: String,
    callback: Callback<M>,
    signal: CancellationToken,
}

impl<M: EventMap> Listener<M> {
    pub(crate) fn new(
        name: M::Name,
        namespace: String,
        callback: Callback<M>,
        signal: CancellationToken,
    ) -> Self {
        Self {
            name,
            namespace,
            callback,
            signal,
        }
    }

    /// The event name this listener was registered for.
    #[must_use]
    pub fn name(&self) -> M::Name {
        self.name
    }

    /// The resolved namespace.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// The registered callback.
    #[must_use]
    pub fn callback(&self) -> &Callback<M> {
        &self.callback
    }

    /// Token cancelled when this listener's namespace is revoked.
    ///
    /// Lets asynchronous work started by the callback stop with its scope.
    #[must_use]
    pub fn signal(&self) -> &CancellationToken {
        &self.signal
    }
}
