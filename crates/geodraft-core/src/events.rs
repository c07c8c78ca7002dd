//! Lifecycle events and the per-surface subscription channel.
//!
//! Each surface has one [`EventChannel`] holding at most one subscriber per
//! [`EventTopic`]. Registering a subscriber for a topic replaces the previous
//! one. Subscribers answer with a [`Reply`], which lets them veto
//! `finishEdit`, `cancelDraw` and `startEdit`, either right away or later
//! through a future.

use crate::geometry::GeometryKind;
use crate::scene::EntityId;
use glam::DVec3;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;

/// Boxed future for asynchronous subscriber replies.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Event topics a subscriber can register for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventTopic {
    StartDraw,
    Drawing,
    FinishDraw,
    StartEdit,
    Editing,
    FinishEdit,
    Delete,
    CancelDraw,
    /// A view-mode click on an entity the overlay does not own.
    Click,
    /// The entity under the pointer changed.
    MouseOver,
}

impl EventTopic {
    pub const ALL: [EventTopic; 10] = [
        EventTopic::StartDraw,
        EventTopic::Drawing,
        EventTopic::FinishDraw,
        EventTopic::StartEdit,
        EventTopic::Editing,
        EventTopic::FinishEdit,
        EventTopic::Delete,
        EventTopic::CancelDraw,
        EventTopic::Click,
        EventTopic::MouseOver,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventTopic::StartDraw => "startDraw",
            EventTopic::Drawing => "drawing",
            EventTopic::FinishDraw => "finishDraw",
            EventTopic::StartEdit => "startEdit",
            EventTopic::Editing => "editing",
            EventTopic::FinishEdit => "finishEdit",
            EventTopic::Delete => "delete",
            EventTopic::CancelDraw => "cancelDraw",
            EventTopic::Click => "click",
            EventTopic::MouseOver => "mouseOver",
        }
    }
}

impl fmt::Display for EventTopic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A lifecycle notification delivered to subscribers.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawEvent {
    StartDraw {
        geometry: EntityId,
        kind: GeometryKind,
    },
    Drawing {
        geometry: EntityId,
        kind: GeometryKind,
        positions: Vec<DVec3>,
    },
    FinishDraw {
        geometry: EntityId,
        kind: GeometryKind,
        positions: Vec<DVec3>,
    },
    StartEdit {
        geometry: EntityId,
        kind: GeometryKind,
    },
    Editing {
        geometry: EntityId,
        kind: GeometryKind,
        positions: Vec<DVec3>,
    },
    FinishEdit {
        geometry: EntityId,
        kind: GeometryKind,
        positions: Vec<DVec3>,
    },
    Delete {
        geometry: EntityId,
        kind: GeometryKind,
    },
    CancelDraw {
        geometry: EntityId,
        kind: GeometryKind,
    },
    Click {
        entity: EntityId,
    },
    MouseOver {
        entity: Option<EntityId>,
    },
}

impl DrawEvent {
    pub fn topic(&self) -> EventTopic {
        match self {
            DrawEvent::StartDraw { .. } => EventTopic::StartDraw,
            DrawEvent::Drawing { .. } => EventTopic::Drawing,
            DrawEvent::FinishDraw { .. } => EventTopic::FinishDraw,
            DrawEvent::StartEdit { .. } => EventTopic::StartEdit,
            DrawEvent::Editing { .. } => EventTopic::Editing,
            DrawEvent::FinishEdit { .. } => EventTopic::FinishEdit,
            DrawEvent::Delete { .. } => EventTopic::Delete,
            DrawEvent::CancelDraw { .. } => EventTopic::CancelDraw,
            DrawEvent::Click { .. } => EventTopic::Click,
            DrawEvent::MouseOver { .. } => EventTopic::MouseOver,
        }
    }

    /// Geometry the event is about, for geometry lifecycle events.
    pub fn geometry(&self) -> Option<EntityId> {
        match self {
            DrawEvent::StartDraw { geometry, .. }
            | DrawEvent::Drawing { geometry, .. }
            | DrawEvent::FinishDraw { geometry, .. }
            | DrawEvent::StartEdit { geometry, .. }
            | DrawEvent::Editing { geometry, .. }
            | DrawEvent::FinishEdit { geometry, .. }
            | DrawEvent::Delete { geometry, .. }
            | DrawEvent::CancelDraw { geometry, .. } => Some(*geometry),
            DrawEvent::Click { .. } | DrawEvent::MouseOver { .. } => None,
        }
    }

    /// Positions carried by the event, if any.
    pub fn positions(&self) -> Option<&[DVec3]> {
        match self {
            DrawEvent::Drawing { positions, .. }
            | DrawEvent::FinishDraw { positions, .. }
            | DrawEvent::Editing { positions, .. }
            | DrawEvent::FinishEdit { positions, .. } => Some(positions),
            _ => None,
        }
    }
}

/// A subscriber's decision on a vetoable transition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Verdict {
    #[default]
    Proceed,
    Abort,
}

impl Verdict {
    pub fn proceeds(self) -> bool {
        self == Verdict::Proceed
    }
}

impl From<bool> for Verdict {
    fn from(proceed: bool) -> Self {
        if proceed { Verdict::Proceed } else { Verdict::Abort }
    }
}

/// A subscriber's answer to an event.
pub enum Reply {
    /// The verdict is known now.
    Ready(Verdict),
    /// The verdict arrives when the future resolves.
    Pending(BoxFuture<'static, Verdict>),
}

impl Reply {
    /// Answer later with the output of `future`.
    pub fn later(future: impl Future<Output = Verdict> + 'static) -> Self {
        Reply::Pending(Box::pin(future))
    }
}

impl fmt::Debug for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Ready(verdict) => f.debug_tuple("Ready").field(verdict).finish(),
            Reply::Pending(_) => f.write_str("Pending"),
        }
    }
}

impl From<Verdict> for Reply {
    fn from(verdict: Verdict) -> Self {
        Reply::Ready(verdict)
    }
}

impl From<bool> for Reply {
    fn from(proceed: bool) -> Self {
        Reply::Ready(proceed.into())
    }
}

impl From<()> for Reply {
    fn from(_: ()) -> Self {
        Reply::Ready(Verdict::Proceed)
    }
}

type Subscriber = Box<dyn FnMut(&DrawEvent) -> Reply>;

/// Topic to subscriber table for one surface.
#[derive(Default)]
pub struct EventChannel {
    subscribers: HashMap<EventTopic, Subscriber>,
}

impl fmt::Debug for EventChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventChannel")
            .field("topics", &self.subscribers.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl EventChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to a topic, replacing any previous subscriber.
    pub fn on<F, R>(&mut self, topic: EventTopic, mut callback: F)
    where
        F: FnMut(&DrawEvent) -> R + 'static,
        R: Into<Reply>,
    {
        self.subscribers
            .insert(topic, Box::new(move |event| callback(event).into()));
    }

    /// Remove the subscriber of a topic. Returns whether one was registered.
    pub fn off(&mut self, topic: EventTopic) -> bool {
        self.subscribers.remove(&topic).is_some()
    }

    pub fn is_subscribed(&self, topic: EventTopic) -> bool {
        self.subscribers.contains_key(&topic)
    }

    /// Deliver an event to its topic's subscriber.
    ///
    /// Without a subscriber the reply is [`Verdict::Proceed`].
    pub fn emit(&mut self, event: &DrawEvent) -> Reply {
        match self.subscribers.get_mut(&event.topic()) {
            Some(subscriber) => subscriber(event),
            None => Reply::Ready(Verdict::Proceed),
        }
    }
}
