//! # Event Contract
//!
//! Defines how an application describes its events to the emitter.
//!
//! An event map is a payload enum: each variant is one event, and
//! [`EventMap::event_name`] ties every payload to exactly one name. Listeners
//! subscribe by name, dispatches carry an optional payload, and callbacks
//! receive a [`Detail`] holding both.
//!
//! ```ignore
//! #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
//! enum AppEventName { Tick, Quit }
//!
//! impl EventName for AppEventName {
//!     fn as_str(&self) -> &'static str {
//!         match self {
//!             Self::Tick => "tick",
//!             Self::Quit => "quit",
//!         }
//!     }
//! }
//!
//! // `untagged` keeps each variant's fields at the top level, which is what
//! // gives a serialized detail its `{ ...payload, "eventName": name }` shape.
//! #[derive(Debug, Clone, Serialize)]
//! #[serde(untagged)]
//! enum AppEvent { Tick { n: u32 }, Quit }
//!
//! impl EventMap for AppEvent {
//!     type Name = AppEventName;
//!     fn event_name(&self) -> AppEventName {
//!         match self {
//!             Self::Tick { .. } => AppEventName::Tick,
//!             Self::Quit => AppEventName::Quit,
//!         }
//!     }
//! }
//! ```

use crate::EVENT_NAME_FIELD;
use serde::ser::{Error as _, SerializeMap};
use serde::{Serialize, Serializer};
use serde_json::{Map as JsonMap, Value};
use std::fmt::Debug;
use std::hash::Hash;

/// The closed set of event names belonging to one [`EventMap`].
pub trait EventName: Copy + Eq + Hash + Debug + Send + Sync + 'static {
    /// The wire name of this event, injected into every delivered detail.
    fn as_str(&self) -> &'static str;
}

/// A payload type whose variants correspond one-to-one with event names.
pub trait EventMap: Clone + Debug + Send + Sync + 'static {
    /// The event names of this map.
    type Name: EventName;

    /// The event name this payload belongs to.
    fn event_name(&self) -> Self::Name;
}

/// A request to deliver one event.
///
/// Constructed either from a bare name ([`Dispatch::named`]) or from a
/// payload, in which case the name is taken from the payload itself.
#[derive(Debug, Clone, PartialEq)]
pub struct Dispatch<M: EventMap> {
    name: M::Name,
    payload: Option<M>,
}

impl<M: EventMap> Dispatch<M> {
    /// A dispatch carrying no payload.
    #[must_use]
    pub fn named(name: M::Name) -> Self {
        Self {
            name,
            payload: None,
        }
    }

    /// A dispatch carrying `payload` under its own event name.
    #[must_use]
    pub fn with_payload(payload: M) -> Self {
        Self {
            name: payload.event_name(),
            payload: Some(payload),
        }
    }

    /// The event name to deliver.
    #[must_use]
    pub fn name(&self) -> M::Name {
        self.name
    }

    /// The payload, if any.
    #[must_use]
    pub fn payload(&self) -> Option<&M> {
        self.payload.as_ref()
    }

    /// The detail handed to listeners for this dispatch.
    pub(crate) fn detail(&self) -> Detail<M> {
        Detail {
            event_name: self.name,
            payload: self.payload.clone(),
        }
    }
}

impl<M: EventMap> From<M> for Dispatch<M> {
    fn from(payload: M) -> Self {
        Self::with_payload(payload)
    }
}

/// What a listener receives: the dispatched payload plus its event name.
///
/// Serializes as the payload's fields merged with an `eventName` field, so
/// `{ "n": 1 }` dispatched as `tick` becomes `{ "n": 1, "eventName": "tick" }`.
/// The injected name always wins over a payload field of the same key.
///
/// Only payloads that serialize to a map contribute fields. For an enum map
/// that means `#[serde(untagged)]`; with serde's default external tagging the
/// variant name becomes the single key (`{ "Tick": { "n": 1 }, "eventName": "tick" }`).
/// Payloads that serialize to anything other than a map contribute nothing.
#[derive(Debug, Clone, PartialEq)]
pub struct Detail<M: EventMap> {
    event_name: M::Name,
    payload: Option<M>,
}

impl<M: EventMap> Detail<M> {
    /// The name this detail was dispatched under.
    #[must_use]
    pub fn event_name(&self) -> M::Name {
        self.event_name
    }

    /// The dispatched payload, if any.
    #[must_use]
    pub fn payload(&self) -> Option<&M> {
        self.payload.as_ref()
    }

    /// Consume the detail, keeping the payload.
    #[must_use]
    pub fn into_payload(self) -> Option<M> {
        self.payload
    }
}

impl<M: EventMap + Serialize> Serialize for Detail<M> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut fields = match &self.payload {
            Some(payload) => match serde_json::to_value(payload).map_err(S::Error::custom)? {
                Value::Object(fields) => fields,
                _ => JsonMap::new(),
            },
            None => JsonMap::new(),
        };
        fields.remove(EVENT_NAME_FIELD);

        let mut map = serializer.serialize_map(Some(fields.len() + 1))?;
        for (key, value) in &fields {
            map.serialize_entry(key, value)?;
        }
        map.serialize_entry(EVENT_NAME_FIELD, self.event_name.as_str())?;
        map.end()
    }
}
