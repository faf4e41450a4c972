//! Subscription handles for host notifications.
//!
//! The host delivers pointer and geometry notifications by calling into the
//! session controller. Listening is still modelled as explicit subscriptions so
//! that every listener is released exactly once, on finish or on teardown.

use std::collections::HashSet;
use std::fmt;

/// Notification stream a listener can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    /// Pointer moved over the viewport.
    PointerMove,
    /// The in-progress sketch geometry changed.
    GeometryChange,
}

impl Topic {
    /// Event type name used by the host's mapping library.
    pub fn name(&self) -> &'static str {
        match self {
            Topic::PointerMove => "pointermove",
            Topic::GeometryChange => "change",
        }
    }
}

/// Handle returned by [`EventSource::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerKey {
    id: u64,
    topic: Topic,
}

impl ListenerKey {
    /// Key for a listener registered by an external event source.
    pub fn new(id: u64, topic: Topic) -> Self {
        Self { id, topic }
    }

    /// Source-assigned listener id.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Topic this key listens to.
    pub fn topic(&self) -> Topic {
        self.topic
    }
}

impl fmt::Display for ListenerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}#{}", self.topic, self.id)
    }
}

/// Source of host notifications.
pub trait EventSource {
    /// Start listening to a topic.
    fn subscribe(&mut self, topic: Topic) -> ListenerKey;

    /// Stop listening. Returns false if the key was unknown or already released.
    fn unsubscribe(&mut self, key: ListenerKey) -> bool;
}

/// Bookkeeping event source.
#[derive(Debug, Default)]
pub struct ListenerRegistry {
    next_id: u64,
    active: HashSet<ListenerKey>,
    released: u64,
}

impl ListenerRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check whether a key is still subscribed.
    pub fn is_active(&self, key: ListenerKey) -> bool {
        self.active.contains(&key)
    }

    /// Check whether anything listens to a topic.
    pub fn has_listener(&self, topic: Topic) -> bool {
        self.active.iter().any(|key| key.topic == topic)
    }

    /// Number of live subscriptions.
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Number of successful unsubscribes so far.
    pub fn release_count(&self) -> u64 {
        self.released
    }
}

impl EventSource for ListenerRegistry {
    fn subscribe(&mut self, topic: Topic) -> ListenerKey {
        self.next_id += 1;
        let key = ListenerKey { id: self.next_id, topic };
        self.active.insert(key);
        key
    }

    fn unsubscribe(&mut self, key: ListenerKey) -> bool {
        if self.active.remove(&key) {
            self.released += 1;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscribe_and_release() {
        let mut registry = ListenerRegistry::new();
        let key = registry.subscribe(Topic::GeometryChange);
        assert!(registry.is_active(key));
        assert!(registry.has_listener(Topic::GeometryChange));
        assert!(!registry.has_listener(Topic::PointerMove));

        assert!(registry.unsubscribe(key));
        assert!(!registry.is_active(key));
        assert_eq!(registry.active_count(), 0);
        assert_eq!(registry.release_count(), 1);
    }

    #[test]
    fn test_double_unsubscribe_is_rejected() {
        let mut registry = ListenerRegistry::new();
        let key = registry.subscribe(Topic::PointerMove);
        assert!(registry.unsubscribe(key));
        assert!(!registry.unsubscribe(key));
        assert_eq!(registry.release_count(), 1);
    }

    #[test]
    fn test_keys_are_unique() {
        let mut registry = ListenerRegistry::new();
        let a = registry.subscribe(Topic::GeometryChange);
        let b = registry.subscribe(Topic::GeometryChange);
        assert_ne!(a, b);
        assert_eq!(registry.active_count(), 2);
        assert_eq!(a.topic(), Topic::GeometryChange);
    }

    #[test]
    fn test_topic_names() {
        assert_eq!(Topic::PointerMove.name(), "pointermove");
        assert_eq!(Topic::GeometryChange.name(), "change");
    }

    #[test]
    fn test_foreign_key_is_unknown_to_registry() {
        let mut registry = ListenerRegistry::new();
        let own = registry.subscribe(Topic::PointerMove);
        let foreign = ListenerKey::new(own.id() + 100, Topic::PointerMove);
        assert_eq!(ListenerKey::new(own.id(), own.topic()), own);
        assert!(!registry.unsubscribe(foreign));
        assert!(registry.is_active(own));
    }
}
