//! # Namespace Views
//!
//! A view binds an [`EventEmitter`] to one namespace. Everything registered
//! through the view lands in that namespace, so a component can drop all of
//! its listeners with a single `remove_all_listeners` call when it shuts down.

use crate::emitter::{Emitter, EventEmitter};
use crate::error::Result;
use crate::events::{Dispatch, EventMap};
use crate::listener::{Callback, Listener};
use std::fmt;
use std::sync::Arc;

/// Observer notified of every dispatch made through a view.
pub type Subscriber<M> = Arc<dyn Fn(&Dispatch<M>) + Send + Sync>;

/// An [`EventEmitter`] pre-bound to one namespace.
#[derive(Clone)]
pub struct EventEmitterNamespace<M: EventMap> {
    namespace: String,
    emitter: EventEmitter<M>,
    subscriber: Option<Subscriber<M>>,
}

impl<M: EventMap> EventEmitterNamespace<M> {
    pub(crate) fn new(
        namespace: String,
        emitter: EventEmitter<M>,
        subscriber: Option<Subscriber<M>>,
    ) -> Self {
        Self {
            namespace,
            emitter,
            subscriber,
        }
    }

    /// The namespace this view is bound to.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.namespace
    }

    /// The emitter behind this view.
    #[must_use]
    pub fn emitter(&self) -> &EventEmitter<M> {
        &self.emitter
    }
}

impl<M: EventMap> Emitter<M> for EventEmitterNamespace<M> {
    /// Registers under the view's namespace; `_namespace` is ignored.
    fn add_event_listener(
        &self,
        name: M::Name,
        callback: Callback<M>,
        _namespace: Option<&str>,
    ) -> Result<Listener<M>> {
        self.emitter
            .add_event_listener(name, callback, Some(self.namespace.as_str()))
    }

    fn add_events_listener<I>(
        &self,
        names: I,
        callback: Callback<M>,
        _namespace: Option<&str>,
    ) -> Result<Vec<Listener<M>>>
    where
        I: IntoIterator<Item = M::Name>,
    {
        self.emitter
            .add_events_listener(names, callback, Some(self.namespace.as_str()))
    }

    /// Delivers through the emitter, then reports to the subscriber.
    fn dispatch_event(&self, dispatch: impl Into<Dispatch<M>>) {
        let dispatch = dispatch.into();
        self.emitter.deliver(&dispatch);
        if let Some(subscriber) = &self.subscriber {
            subscriber(&dispatch);
        }
    }

    fn remove_event_listener(&self, listener: &Listener<M>) {
        self.emitter.remove_event_listener(listener);
    }

    fn remove_event_listeners(&self, listeners: &[Listener<M>]) {
        self.emitter.remove_event_listeners(listeners);
    }

    /// Revokes the view's namespace; `_namespace` is ignored.
    fn remove_all_listeners(&self, _namespace: Option<&str>) {
        self.emitter.remove_all_listeners(Some(self.namespace.as_str()));
    }
}

impl<M: EventMap> fmt::Debug for EventEmitterNamespace<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventEmitterNamespace")
            .field("namespace", &self.namespace)
            .field("subscriber", &self.subscriber.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{Detail, EventName};
    use crate::{EmitterError, GLOBAL_NAMESPACE};
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum Name {
        Opened,
        Closed,
    }

    impl EventName for Name {
        fn as_str(&self) -> &'static str {
            match self {
                Self::Opened => "opened",
                Self::Closed => "closed",
            }
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    enum Event {
        Opened { id: u64 },
        Closed { id: u64 },
    }

    impl EventMap for Event {
        type Name = Name;

        fn event_name(&self) -> Name {
            match self {
                Self::Opened { .. } => Name::Opened,
                Self::Closed { .. } => Name::Closed,
            }
        }
    }

    fn counter() -> (Arc<AtomicUsize>, Callback<Event>) {
        let hits = Arc::new(AtomicUsize::new(0));
        let inner = hits.clone();
        let cb = Callback::new(move |_: &Detail<Event>| {
            inner.fetch_add(1, Ordering::SeqCst);
        });
        (hits, cb)
    }

    #[test]
    fn test_view_overrides_namespace() {
        let emitter = EventEmitter::<Event>::new();
        let view = emitter.namespace("panel");
        let (_, cb) = counter();

        let listener = view
            .add_event_listener(Name::Opened, cb, Some("ignored"))
            .unwrap();

        assert_eq!(view.name(), "panel");
        assert_eq!(listener.namespace(), "panel");
        assert_eq!(view.emitter().listener_count(Name::Opened), 1);
        assert!(emitter.has_namespace("panel"));
        assert!(!emitter.has_namespace("ignored"));
    }

    #[test]
    fn test_view_add_events_listener_uses_view_namespace() {
        let emitter = EventEmitter::<Event>::new();
        let view = emitter.namespace("panel");
        let (_, cb) = counter();

        let listeners = view
            .add_events_listener([Name::Opened, Name::Closed], cb, None)
            .unwrap();

        assert_eq!(listeners.len(), 2);
        assert!(listeners.iter().all(|l| l.namespace() == "panel"));
    }

    #[test]
    fn test_view_remove_all_ignores_argument() {
        let emitter = EventEmitter::<Event>::new();
        let view = emitter.namespace("panel");
        let (global_hits, global_cb) = counter();
        let (panel_hits, panel_cb) = counter();
        emitter
            .add_event_listener(Name::Opened, global_cb, None)
            .unwrap();
        view.add_event_listener(Name::Opened, panel_cb, None).unwrap();

        view.remove_all_listeners(Some(GLOBAL_NAMESPACE));
        emitter.dispatch_event(Event::Opened { id: 1 });

        assert_eq!(global_hits.load(Ordering::SeqCst), 1);
        assert_eq!(panel_hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_subscriber_runs_after_delivery() {
        let emitter = EventEmitter::<Event>::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        let sink = log.clone();
        let view = emitter.namespace_with_subscriber("panel", move |dispatch: &Dispatch<Event>| {
            sink.lock().push(format!("subscriber:{}", dispatch.name().as_str()));
        });

        let sink = log.clone();
        view.add_event_listener(
            Name::Closed,
            Callback::new(move |detail: &Detail<Event>| {
                sink.lock().push(format!("listener:{}", detail.event_name().as_str()));
            }),
            None,
        )
        .unwrap();

        view.dispatch_event(Event::Closed { id: 9 });

        assert_eq!(
            *log.lock(),
            vec!["listener:closed".to_string(), "subscriber:closed".to_string()]
        );
    }

    #[test]
    fn test_subscriber_not_called_for_emitter_dispatch() {
        let emitter = EventEmitter::<Event>::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let inner = calls.clone();
        let _view = emitter.namespace_with_subscriber("panel", move |_: &Dispatch<Event>| {
            inner.fetch_add(1, Ordering::SeqCst);
        });

        emitter.dispatch_event(Event::Opened { id: 1 });
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_empty_view_namespace_fails_at_registration() {
        let emitter = EventEmitter::<Event>::new();
        let view = emitter.namespace("");
        let (_, cb) = counter();

        let result = view.add_event_listener(Name::Opened, cb, Some("valid"));
        assert!(matches!(result, Err(EmitterError::InvalidNamespace)));
    }

    #[test]
    fn test_view_removes_listener() {
        let emitter = EventEmitter::<Event>::new();
        let view = emitter.namespace("panel");
        let (hits, cb) = counter();
        let listeners = view
            .add_events_listener([Name::Opened, Name::Closed], cb, None)
            .unwrap();

        view.remove_event_listeners(&listeners);
        view.dispatch_event(Event::Opened { id: 1 });
        view.dispatch_event(Event::Closed { id: 1 });

        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }
}
