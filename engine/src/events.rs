//! Listener registry with explicit disposal.
//!
//! Components subscribe to an event source and receive a [`Disposer`] back;
//! teardown calls the disposers (or [`Listeners::clear`]) deterministically,
//! so no callback can outlive the component that registered it.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

type Callback<E> = Box<dyn FnMut(&E)>;

struct Registry<E> {
    next_id: u64,
    entries: Vec<(u64, Callback<E>)>,
    /// Ids disposed while their callback was checked out by `emit`.
    dead: Vec<u64>,
}

/// A single-threaded set of event callbacks.
pub struct Listeners<E> {
    registry: Rc<RefCell<Registry<E>>>,
}

impl<E> Listeners<E> {
    pub fn new() -> Listeners<E> {
        Listeners {
            registry: Rc::new(RefCell::new(Registry {
                next_id: 0,
                entries: Vec::new(),
                dead: Vec::new(),
            })),
        }
    }

    /// Register a callback. The returned disposer removes it again;
    /// dropping the disposer without calling it leaves the callback live.
    pub fn subscribe(&self, callback: impl FnMut(&E) + 'static) -> Disposer<E> {
        let mut registry = self.registry.borrow_mut();
        let id = registry.next_id;
        registry.next_id += 1;
        registry.entries.push((id, Box::new(callback)));
        Disposer {
            registry: Rc::downgrade(&self.registry),
            id,
        }
    }

    /// Deliver `event` to every live callback, in subscription order.
    /// Callbacks registered during delivery see only later events;
    /// callbacks disposed during delivery are gone by the next emit.
    pub fn emit(&self, event: &E) {
        let mut entries = std::mem::take(&mut self.registry.borrow_mut().entries);
        for (_, callback) in entries.iter_mut() {
            callback(event);
        }
        let mut registry = self.registry.borrow_mut();
        // Put the delivered set back in front of anything added mid-emit,
        // dropping entries disposed while they were checked out.
        let added = std::mem::replace(&mut registry.entries, entries);
        registry.entries.extend(added);
        let dead = std::mem::take(&mut registry.dead);
        registry.entries.retain(|(id, _)| !dead.contains(id));
    }

    /// Drop every callback at once.
    pub fn clear(&self) {
        self.registry.borrow_mut().entries.clear();
    }

    pub fn len(&self) -> usize {
        self.registry.borrow().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<E> Default for Listeners<E> {
    fn default() -> Self {
        Listeners::new()
    }
}

/// Handle that removes one subscription. Safe to call after the source is
/// gone or the callback was already removed.
pub struct Disposer<E> {
    registry: Weak<RefCell<Registry<E>>>,
    id: u64,
}

impl<E> Disposer<E> {
    pub fn dispose(self) {
        if let Some(registry) = self.registry.upgrade() {
            let mut registry = registry.borrow_mut();
            registry.entries.retain(|(id, _)| *id != self.id);
            registry.dead.push(self.id);
        }
    }
}
