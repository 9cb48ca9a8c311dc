//! # Cross-Context Change Notifications
//!
//! Several repositories can share one store, the way browser tabs share local storage.
//! When one of them writes, the others need to reload. [`ChangeHub`] is the channel for
//! that: an in-process publish/subscribe hub keyed by storage key.
//!
//! ## Delivery Model
//!
//! Events are **queued**, not pushed. A [`Subscription`] collects events until its owner
//! drains it, so a notification can never interrupt a mutation halfway through: the
//! repository finishes what it is doing, then applies the queued reload.
//!
//! - A publisher never receives its own events.
//! - Only subscribers registered for the same key receive an event.
//! - Cancelling or dropping a [`Subscription`] deregisters it; nothing is delivered to a
//!   torn-down context.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::{Rc, Weak};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub key: String,
    /// The subscriber that caused the change, if it was one of ours.
    pub origin: Option<SubscriberId>,
}

type Queue = Rc<RefCell<VecDeque<ChangeEvent>>>;

struct Slot {
    id: SubscriberId,
    key: String,
    queue: Queue,
}

#[derive(Default)]
struct HubInner {
    next_id: u64,
    slots: Vec<Slot>,
}

/// Cheap to clone; clones share the same subscriber list.
#[derive(Clone, Default)]
pub struct ChangeHub {
    inner: Rc<RefCell<HubInner>>,
}

impl ChangeHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, key: &str) -> Subscription {
        let mut inner = self.inner.borrow_mut();
        inner.next_id += 1;
        let id = SubscriberId(inner.next_id);
        let queue: Queue = Rc::new(RefCell::new(VecDeque::new()));
        inner.slots.push(Slot {
            id,
            key: key.to_string(),
            queue: Rc::clone(&queue),
        });
        debug!("subscriber {:?} registered for '{}'", id, key);

        Subscription {
            id,
            key: key.to_string(),
            queue,
            hub: Rc::downgrade(&self.inner),
            active: true,
        }
    }

    /// Notify every other subscriber of `key`. Returns how many were notified.
    pub fn publish(&self, key: &str, origin: Option<SubscriberId>) -> usize {
        let inner = self.inner.borrow();
        let mut delivered = 0;
        for slot in inner.slots.iter() {
            if slot.key != key || Some(slot.id) == origin {
                continue;
            }
            slot.queue.borrow_mut().push_back(ChangeEvent {
                key: key.to_string(),
                origin,
            });
            delivered += 1;
        }
        delivered
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().slots.len()
    }
}

fn unsubscribe(hub: &Weak<RefCell<HubInner>>, id: SubscriberId) {
    if let Some(inner) = hub.upgrade() {
        inner.borrow_mut().slots.retain(|slot| slot.id != id);
        debug!("subscriber {:?} deregistered", id);
    }
}

/// A registration with a [`ChangeHub`]. Deregisters on drop.
pub struct Subscription {
    id: SubscriberId,
    key: String,
    queue: Queue,
    hub: Weak<RefCell<HubInner>>,
    active: bool,
}

impl Subscription {
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn has_pending(&self) -> bool {
        !self.queue.borrow().is_empty()
    }

    /// Take every queued event, oldest first.
    pub fn drain(&self) -> Vec<ChangeEvent> {
        self.queue.borrow_mut().drain(..).collect()
    }

    /// Stop receiving events and discard anything still queued.
    pub fn cancel(&mut self) {
        if self.active {
            unsubscribe(&self.hub, self.id);
            self.queue.borrow_mut().clear();
            self.active = false;
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel();
    }
}
