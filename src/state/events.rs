//! Event Registry - named-channel publish/subscribe.
//!
//! Channels are arbitrary strings and are not tied to nodes. Handlers are
//! issued by the registry so that each one has an id; adding the same
//! handler twice to a channel is a no-op.
//!
//! # Example
//!
//! ```ignore
//! let mut events = EventRegistry::new();
//! let log = events.handler(|payload: &String| {
//!     println!("{payload}");
//!     Ok(())
//! });
//! events.add_event_listener("saved", &log);
//! events.trigger("saved", &"draft.html".to_string());
//! ```

use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::dispatch::{DispatchReport, call_isolated};
use crate::error::BehaviorError;

/// Callback type for channel handlers.
pub type HandlerFn<T> = Rc<dyn Fn(&T) -> Result<(), BehaviorError>>;

/// Identity of a handler issued by an [`EventRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(usize);

/// A channel handler. Cloning keeps the identity.
pub struct Handler<T> {
    id: HandlerId,
    callback: HandlerFn<T>,
}

impl<T> Handler<T> {
    pub fn id(&self) -> HandlerId {
        self.id
    }
}

impl<T> Clone for Handler<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            callback: self.callback.clone(),
        }
    }
}

impl<T> fmt::Debug for Handler<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Handler").field(&self.id).finish()
    }
}

/// Channel name → handlers, both in insertion order.
pub struct EventRegistry<T> {
    channels: IndexMap<String, Vec<Handler<T>>>,
    next_id: usize,
}

impl<T> Default for EventRegistry<T> {
    fn default() -> Self {
        Self {
            channels: IndexMap::new(),
            next_id: 0,
        }
    }
}

impl<T> EventRegistry<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a callback into a handler with a fresh id.
    pub fn handler<F>(&mut self, callback: F) -> Handler<T>
    where
        F: Fn(&T) -> Result<(), BehaviorError> + 'static,
    {
        let id = HandlerId(self.next_id);
        self.next_id += 1;
        Handler {
            id,
            callback: Rc::new(callback),
        }
    }

    /// Create a channel if it does not exist yet.
    pub fn add_event(&mut self, channel: &str) {
        if !self.channels.contains_key(channel) {
            self.channels.insert(channel.to_string(), Vec::new());
        }
    }

    /// Drop a channel and all of its handlers.
    pub fn remove_event(&mut self, channel: &str) -> bool {
        self.channels.shift_remove(channel).is_some()
    }

    /// Subscribe `handler` to `channel`, creating the channel lazily.
    pub fn add_event_listener(&mut self, channel: &str, handler: &Handler<T>) -> bool {
        self.add_event(channel);
        if let Some(handlers) = self.channels.get_mut(channel) {
            if !handlers.iter().any(|h| h.id == handler.id) {
                handlers.push(handler.clone());
            }
        }
        true
    }

    /// Unsubscribe `handler`. Returns whether the channel existed.
    pub fn remove_event_listener(&mut self, channel: &str, handler: &Handler<T>) -> bool {
        match self.channels.get_mut(channel) {
            Some(handlers) => {
                handlers.retain(|h| h.id != handler.id);
                true
            }
            None => false,
        }
    }

    /// Deliver `payload` to every handler of `channel`, in insertion order.
    ///
    /// Failures are logged and collected; they never stop delivery.
    pub fn trigger(&self, channel: &str, payload: &T) -> DispatchReport {
        let mut report = DispatchReport::default();
        let Some(handlers) = self.channels.get(channel) else {
            return report;
        };
        for handler in handlers {
            call_isolated(&mut report, channel, || (handler.callback)(payload));
        }
        report
    }

    /// Channel names in creation order.
    pub fn channels(&self) -> impl Iterator<Item = &str> {
        self.channels.keys().map(String::as_str)
    }

    pub fn has_channel(&self, channel: &str) -> bool {
        self.channels.contains_key(channel)
    }

    /// Number of handlers on `channel`.
    pub fn listener_count(&self, channel: &str) -> usize {
        self.channels.get(channel).map_or(0, Vec::len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    fn recorder(events: &mut EventRegistry<i32>, log: &Rc<RefCell<Vec<String>>>, tag: &'static str) -> Handler<i32> {
        let log = log.clone();
        events.handler(move |v| {
            log.borrow_mut().push(format!("{tag}:{v}"));
            Ok(())
        })
    }

    #[test]
    fn test_trigger_in_insertion_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut events = EventRegistry::new();
        let a = recorder(&mut events, &log, "a");
        let b = recorder(&mut events, &log, "b");

        assert!(events.add_event_listener("tick", &a));
        assert!(events.add_event_listener("tick", &b));
        let report = events.trigger("tick", &3);

        assert_eq!(*log.borrow(), vec!["a:3", "b:3"]);
        assert_eq!(report.delivered, 2);
    }

    #[test]
    fn test_duplicate_handler_ignored() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut events = EventRegistry::new();
        let a = recorder(&mut events, &log, "a");

        events.add_event_listener("tick", &a);
        events.add_event_listener("tick", &a.clone());
        events.trigger("tick", &1);

        assert_eq!(log.borrow().len(), 1);
        assert_eq!(events.listener_count("tick"), 1);
    }

    #[test]
    fn test_remove_reports_channel_existence() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut events = EventRegistry::new();
        let a = recorder(&mut events, &log, "a");

        assert!(!events.remove_event_listener("missing", &a));

        events.add_event_listener("tick", &a);
        assert!(events.remove_event_listener("tick", &a));
        assert!(events.has_channel("tick"));
        assert_eq!(events.trigger("tick", &1).invoked(), 0);
    }

    #[test]
    fn test_failure_isolation() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut events = EventRegistry::new();
        let failing = events.handler(|_: &i32| Err(BehaviorError::new("bad handler")));
        let ok = recorder(&mut events, &log, "ok");

        events.add_event_listener("tick", &failing);
        events.add_event_listener("tick", &ok);
        let report = events.trigger("tick", &9);

        assert_eq!(*log.borrow(), vec!["ok:9"]);
        assert_eq!(report.failures.len(), 1);
    }

    #[test]
    fn test_unknown_channel_is_empty_report() {
        let events: EventRegistry<i32> = EventRegistry::new();
        let report = events.trigger("nothing", &0);
        assert_eq!(report, DispatchReport::default());
    }

    #[test]
    fn test_channel_management() {
        let mut events: EventRegistry<i32> = EventRegistry::new();
        events.add_event("b");
        events.add_event("a");
        events.add_event("b");
        assert_eq!(events.channels().collect::<Vec<_>>(), vec!["b", "a"]);
        assert!(events.remove_event("b"));
        assert!(!events.remove_event("b"));
    }
}
