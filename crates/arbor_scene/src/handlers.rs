//! Event handler tables attached to scene objects

use crate::math::Vec2;
use crate::object::ObjectId;
use crate::raycast::Intersection;
use crate::value::Callback;
use rustc_hash::FxHashMap;
use std::fmt;

/// Kinds of events an object can handle
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HandlerKind {
    /// Pointer entered the object
    Hover,
    /// Pointer left the object
    Unhover,
    /// Object was clicked
    Click,
    /// Handlers were (re)wired; fired with the object itself
    Update,
}

impl HandlerKind {
    pub const ALL: [HandlerKind; 4] = [
        HandlerKind::Hover,
        HandlerKind::Unhover,
        HandlerKind::Click,
        HandlerKind::Update,
    ];

    /// Prop key that binds this handler
    pub const fn prop_key(self) -> &'static str {
        match self {
            HandlerKind::Hover => "onHover",
            HandlerKind::Unhover => "onUnhover",
            HandlerKind::Click => "onClick",
            HandlerKind::Update => "onUpdate",
        }
    }

    /// Inverse of [`HandlerKind::prop_key`]
    pub fn from_prop_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.prop_key() == key)
    }
}

impl fmt::Display for HandlerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HandlerKind::Hover => "hover",
            HandlerKind::Unhover => "unhover",
            HandlerKind::Click => "click",
            HandlerKind::Update => "update",
        };
        f.write_str(name)
    }
}

/// Mapping from handler kind to callback
#[derive(Clone, Default)]
pub struct HandlerTable {
    handlers: FxHashMap<HandlerKind, Callback>,
}

impl HandlerTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback, replacing any existing one of the same kind
    pub fn insert(&mut self, kind: HandlerKind, callback: Callback) {
        self.handlers.insert(kind, callback);
    }

    pub fn get(&self, kind: HandlerKind) -> Option<&Callback> {
        self.handlers.get(&kind)
    }

    pub fn contains(&self, kind: HandlerKind) -> bool {
        self.handlers.contains_key(&kind)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Registered kinds in declaration order
    pub fn kinds(&self) -> Vec<HandlerKind> {
        let mut kinds: Vec<_> = self.handlers.keys().copied().collect();
        kinds.sort();
        kinds
    }
}

impl fmt::Debug for HandlerTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerTable")
            .field("kinds", &self.kinds())
            .finish()
    }
}

/// Payload delivered to a handler callback
#[derive(Clone, Debug)]
pub struct HandlerEvent {
    pub kind: HandlerKind,
    /// Object whose handler fired
    pub target: ObjectId,
    /// Intersection that triggered a pointer event
    pub intersection: Option<Intersection>,
    /// Pointer position in normalized device coordinates
    pub pointer: Option<Vec2>,
}

impl HandlerEvent {
    /// Event without pointer information (e.g. `Update`, `Unhover`)
    pub fn new(kind: HandlerKind, target: ObjectId) -> Self {
        Self {
            kind,
            target,
            intersection: None,
            pointer: None,
        }
    }

    /// Event caused by a ray hit
    pub fn from_hit(kind: HandlerKind, hit: Intersection, pointer: Vec2) -> Self {
        Self {
            kind,
            target: hit.object,
            intersection: Some(hit),
            pointer: Some(pointer),
        }
    }
}
