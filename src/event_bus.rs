// Copyright 2024 Saptak Santra
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Double-buffered pub/sub event bus.
//!
//! `publish_sync` dispatches to subscribers immediately, in subscription
//! order. `publish_async` queues the event into the bus's "next" buffer;
//! `drain_once` swaps "next" into "current" and dispatches everything that
//! was queued before the swap, so an async handler publishing another async
//! event during dispatch does not get processed in the same drain (it lands
//! in the new "next" buffer instead) - this bounds one `drain_once` call to
//! one generation of events, mirroring the reference bus's
//! `current, next = next, []` swap.

use std::any::{Any, TypeId};

use rustc_hash::FxHashMap;

use crate::error::{EcsError, Result};

/// Marker trait for event payload types. Not blanket-implemented: each
/// event type opts in explicitly, which is the compile-time replacement for
/// the reference bus's runtime `isinstance(event, Event)` check.
pub trait Event: 'static {}

/// Opaque handle returned by `subscribe`, used to `unsubscribe` later.
/// Handlers are closures and closures are not comparable for equality, so
/// identifying one to remove requires a token rather than the handler value
/// itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(u64);

trait HandlerList: Any {
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

struct TypedHandlers<E: Event> {
    handlers: Vec<(u64, Box<dyn FnMut(&E)>)>,
}

impl<E: Event> Default for TypedHandlers<E> {
    fn default() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }
}

impl<E: Event> TypedHandlers<E> {
    fn dispatch(&mut self, event: &E) {
        for (_, handler) in &mut self.handlers {
            handler(event);
        }
    }
}

impl<E: Event> HandlerList for TypedHandlers<E> {
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// A queued event, type-erased until it reaches its own `TypedHandlers<E>`.
trait DynEvent: Any {
    fn dispatch_to(&self, handlers: &mut dyn HandlerList);
}

impl<E: Event> DynEvent for E {
    fn dispatch_to(&self, handlers: &mut dyn HandlerList) {
        if let Some(typed) = handlers.as_any_mut().downcast_mut::<TypedHandlers<E>>() {
            typed.dispatch(self);
        }
    }
}

/// Central pub/sub bus: synchronous immediate dispatch plus a
/// double-buffered asynchronous queue drained once per `World::update`.
#[derive(Default)]
pub struct EventBus {
    subscribers: FxHashMap<TypeId, Box<dyn HandlerList>>,
    current: Vec<Box<dyn DynEvent>>,
    next: Vec<Box<dyn DynEvent>>,
    next_subscription_id: u64,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            subscribers: FxHashMap::default(),
            current: Vec::new(),
            next: Vec::new(),
            next_subscription_id: 0,
        }
    }

    /// Register `handler` for every `E` published from now on. Returns a
    /// token that can later be passed to `unsubscribe::<E>`.
    pub fn subscribe<E: Event>(&mut self, handler: impl FnMut(&E) + 'static) -> SubscriptionId {
        let id = self.next_subscription_id;
        self.next_subscription_id += 1;

        let list = self
            .subscribers
            .entry(TypeId::of::<E>())
            .or_insert_with(|| Box::new(TypedHandlers::<E>::default()));
        let typed = list
            .as_any_mut()
            .downcast_mut::<TypedHandlers<E>>()
            .expect("type-erased handler list held the wrong concrete type");
        typed.handlers.push((id, Box::new(handler)));

        SubscriptionId(id)
    }

    /// Remove a previously subscribed handler. Errors with `NotFound` if
    /// `id` does not (or no longer) identifies a subscription to `E`.
    pub fn unsubscribe<E: Event>(&mut self, id: SubscriptionId) -> Result<()> {
        let list = self
            .subscribers
            .get_mut(&TypeId::of::<E>())
            .ok_or(EcsError::NotFound)?;
        let typed = list
            .as_any_mut()
            .downcast_mut::<TypedHandlers<E>>()
            .ok_or(EcsError::NotFound)?;

        let before = typed.handlers.len();
        typed.handlers.retain(|(hid, _)| *hid != id.0);
        if typed.handlers.len() == before {
            return Err(EcsError::NotFound);
        }
        Ok(())
    }

    /// Dispatch `event` to every current subscriber of `E` immediately, in
    /// subscription order, before returning.
    pub fn publish_sync<E: Event>(&mut self, event: &E) {
        if let Some(list) = self.subscribers.get_mut(&TypeId::of::<E>()) {
            if let Some(typed) = list.as_any_mut().downcast_mut::<TypedHandlers<E>>() {
                typed.dispatch(event);
            }
        }
    }

    /// Queue `event` for delivery on the next `drain_once` call.
    pub fn publish_async<E: Event>(&mut self, event: E) {
        self.next.push(Box::new(event));
    }

    /// Swap the async queue and dispatch everything that was queued before
    /// the swap. Events published async *during* this call land in the new
    /// `next` buffer and are not delivered until the following drain.
    pub fn drain_once(&mut self) {
        std::mem::swap(&mut self.current, &mut self.next);
        let mut draining = std::mem::take(&mut self.current);
        for event in draining.drain(..) {
            let type_id = (*event).type_id();
            if let Some(list) = self.subscribers.get_mut(&type_id) {
                event.dispatch_to(list.as_mut());
            }
        }
    }

    pub fn pending_count(&self) -> usize {
        self.next.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Damage {
        amount: f64,
    }
    impl Event for Damage {}

    #[test]
    fn publish_sync_dispatches_immediately() {
        let mut bus = EventBus::new();
        let total = Rc::new(RefCell::new(0.0));
        let total_handle = total.clone();
        bus.subscribe::<Damage>(move |e: &Damage| *total_handle.borrow_mut() += e.amount);

        bus.publish_sync(&Damage { amount: 5.0 });
        assert_eq!(*total.borrow(), 5.0);
    }

    #[test]
    fn publish_async_waits_for_drain() {
        let mut bus = EventBus::new();
        let total = Rc::new(RefCell::new(0.0));
        let total_handle = total.clone();
        bus.subscribe::<Damage>(move |e: &Damage| *total_handle.borrow_mut() += e.amount);

        bus.publish_async(Damage { amount: 3.0 });
        assert_eq!(*total.borrow(), 0.0);
        bus.drain_once();
        assert_eq!(*total.borrow(), 3.0);
    }

    #[test]
    fn async_events_published_during_drain_wait_a_generation() {
        let mut bus = EventBus::new();
        let seen = Rc::new(RefCell::new(Vec::new()));

        bus.publish_async(Damage { amount: 1.0 });
        bus.drain_once();

        let seen_handle = seen.clone();
        bus.subscribe::<Damage>(move |e: &Damage| seen_handle.borrow_mut().push(e.amount));
        bus.publish_async(Damage { amount: 2.0 });
        bus.drain_once();
        assert_eq!(*seen.borrow(), vec![2.0]);
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let mut bus = EventBus::new();
        let count = Rc::new(RefCell::new(0));
        let count_handle = count.clone();
        let id = bus.subscribe::<Damage>(move |_: &Damage| *count_handle.borrow_mut() += 1);

        bus.publish_sync(&Damage { amount: 1.0 });
        bus.unsubscribe::<Damage>(id).unwrap();
        bus.publish_sync(&Damage { amount: 1.0 });

        assert_eq!(*count.borrow(), 1);
    }

    #[test]
    fn unsubscribe_unknown_id_errors() {
        let mut bus = EventBus::new();
        bus.subscribe::<Damage>(|_: &Damage| {});
        assert_eq!(
            bus.unsubscribe::<Damage>(SubscriptionId(9999)),
            Err(EcsError::NotFound)
        );
    }

    #[test]
    fn multiple_subscribers_all_receive_in_order() {
        let mut bus = EventBus::new();
        let order = Rc::new(RefCell::new(Vec::new()));

        let o1 = order.clone();
        bus.subscribe::<Damage>(move |_: &Damage| o1.borrow_mut().push(1));
        let o2 = order.clone();
        bus.subscribe::<Damage>(move |_: &Damage| o2.borrow_mut().push(2));

        bus.publish_sync(&Damage { amount: 0.0 });
        assert_eq!(*order.borrow(), vec![1, 2]);
    }
}
