/// file: src/message_socket.rs
/// description: named-event handler registry fed by the push channel
use crate::types::Packet;
use serde_json::Value;
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use tracing::{debug, trace, warn};

type Handler = Rc<RefCell<dyn FnMut(&Value)>>;

struct Entry {
    id: u64,
    event: String,
    handler: Handler,
}

#[derive(Default)]
struct Registry {
    next_id: u64,
    entries: Vec<Entry>,
}

impl Registry {
    fn contains(&self, id: u64) -> bool {
        self.entries.iter().any(|entry| entry.id == id)
    }

    fn remove(&mut self, id: u64) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.id != id);
        self.entries.len() != before
    }
}

/// Client side of the push channel.
///
/// Handlers are registered per event name and invoked, in registration
/// order, for every packet carrying that name. Registration is additive:
/// registering the same closure twice delivers each packet twice.
#[derive(Default)]
pub struct MessageSocket {
    registry: Rc<RefCell<Registry>>,
}

impl MessageSocket {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_evt_handler<F>(&self, event: &str, handler: F) -> Subscription
    where
        F: FnMut(&Value) + 'static,
    {
        let mut registry = self.registry.borrow_mut();
        registry.next_id += 1;
        let id = registry.next_id;
        registry.entries.push(Entry {
            id,
            event: event.to_string(),
            handler: Rc::new(RefCell::new(handler)),
        });
        debug!(event, id, "Registered event handler");

        Subscription {
            id,
            event: event.to_string(),
            registry: Rc::downgrade(&self.registry),
        }
    }

    /// Delivers the packet's message to every handler registered for its
    /// event. Returns how many handlers ran.
    pub fn dispatch(&self, packet: &Packet) -> usize {
        let handlers: Vec<(u64, Handler)> = self
            .registry
            .borrow()
            .entries
            .iter()
            .filter(|entry| entry.event == packet.event)
            .map(|entry| (entry.id, Rc::clone(&entry.handler)))
            .collect();

        if handlers.is_empty() {
            debug!(event = %packet.event, "No handler registered for event");
            return 0;
        }

        let mut invoked = 0;
        for (id, handler) in handlers {
            // an earlier handler may have released this one
            if !self.registry.borrow().contains(id) {
                continue;
            }
            match handler.try_borrow_mut() {
                Ok(mut handler) => {
                    (&mut *handler)(&packet.message);
                    invoked += 1;
                }
                Err(_) => {
                    warn!(event = %packet.event, id, "Skipping re-entrant handler invocation");
                }
            }
        }

        crate::monitoring::PACKETS_DISPATCHED_COUNTER.increment(1);
        trace!(event = %packet.event, invoked, "Dispatched packet");
        invoked
    }

    pub fn handler_count(&self, event: &str) -> usize {
        self.registry
            .borrow()
            .entries
            .iter()
            .filter(|entry| entry.event == event)
            .count()
    }
}

/// Registration handle returned by [`MessageSocket::register_evt_handler`].
///
/// The handler stays registered until the handle is dropped or
/// [`Subscription::unsubscribe`] is called. The handle does not keep the
/// socket alive.
#[must_use = "dropping a Subscription unregisters its handler"]
pub struct Subscription {
    id: u64,
    event: String,
    registry: Weak<RefCell<Registry>>,
}

impl Subscription {
    pub fn event(&self) -> &str {
        &self.event
    }

    pub fn unsubscribe(self) {
        drop(self);
    }

    fn release(&self) {
        let Some(registry) = self.registry.upgrade() else {
            return;
        };
        if registry.borrow_mut().remove(self.id) {
            debug!(event = %self.event, id = self.id, "Released event handler");
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("event", &self.event)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn recorder(socket: &MessageSocket, event: &str) -> (Rc<RefCell<Vec<Value>>>, Subscription) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let subscription =
            socket.register_evt_handler(event, move |payload| sink.borrow_mut().push(payload.clone()));
        (seen, subscription)
    }

    #[test]
    fn test_dispatch_reaches_matching_handlers_only() {
        let socket = MessageSocket::new();
        let (balances, _balance_sub) = recorder(&socket, "updateBalance");
        let (infos, _info_sub) = recorder(&socket, "updateConnInfo");

        let invoked = socket.dispatch(&Packet::new("updateBalance", json!("12 DCR")));

        assert_eq!(invoked, 1);
        assert_eq!(*balances.borrow(), vec![json!("12 DCR")]);
        assert!(infos.borrow().is_empty());
    }

    #[test]
    fn test_dispatch_preserves_arrival_order() {
        let socket = MessageSocket::new();
        let (seen, _sub) = recorder(&socket, "updateBalance");

        for n in 0..3 {
            socket.dispatch(&Packet::new("updateBalance", json!(n)));
        }

        assert_eq!(*seen.borrow(), vec![json!(0), json!(1), json!(2)]);
    }

    #[test]
    fn test_registration_is_additive() {
        let socket = MessageSocket::new();
        let (first, _a) = recorder(&socket, "updateBalance");
        let (second, _b) = recorder(&socket, "updateBalance");

        assert_eq!(socket.handler_count("updateBalance"), 2);
        assert_eq!(socket.dispatch(&Packet::new("updateBalance", json!(1))), 2);
        assert_eq!(first.borrow().len(), 1);
        assert_eq!(second.borrow().len(), 1);
    }

    #[test]
    fn test_unknown_event_is_ignored() {
        let socket = MessageSocket::new();
        let (_seen, _sub) = recorder(&socket, "updateBalance");

        assert_eq!(socket.dispatch(&Packet::new("somethingElse", json!(null))), 0);
    }

    #[test]
    fn test_dropping_subscription_stops_delivery() {
        let socket = MessageSocket::new();
        let (seen, sub) = recorder(&socket, "updateBalance");

        socket.dispatch(&Packet::new("updateBalance", json!(1)));
        sub.unsubscribe();
        socket.dispatch(&Packet::new("updateBalance", json!(2)));

        assert_eq!(*seen.borrow(), vec![json!(1)]);
        assert_eq!(socket.handler_count("updateBalance"), 0);
    }

    #[test]
    fn test_subscription_outliving_socket_is_harmless() {
        let socket = MessageSocket::new();
        let (_seen, sub) = recorder(&socket, "updateBalance");
        drop(socket);
        drop(sub);
    }

    #[test]
    fn test_handler_may_release_later_handler_during_dispatch() {
        let socket = MessageSocket::new();
        let victim_slot: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));

        let slot = Rc::clone(&victim_slot);
        let _killer = socket.register_evt_handler("updateBalance", move |_| {
            slot.borrow_mut().take();
        });
        let (victim_seen, victim) = recorder(&socket, "updateBalance");
        *victim_slot.borrow_mut() = Some(victim);

        let invoked = socket.dispatch(&Packet::new("updateBalance", json!(1)));

        assert_eq!(invoked, 1);
        assert!(victim_seen.borrow().is_empty());
    }
}
