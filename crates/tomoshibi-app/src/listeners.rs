// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};
use std::sync::mpsc::{self, Receiver, Sender};

type Registry<E> = RefCell<BTreeMap<u64, Sender<E>>>;

/// Fan-out point for UI events. Listeners exist only while their
/// [`Subscription`] guard is alive.
#[derive(Debug)]
pub struct ListenerSet<E> {
    registry: Rc<Registry<E>>,
    next_id: Cell<u64>,
}

impl<E> Default for ListenerSet<E> {
    fn default() -> Self {
        Self {
            registry: Rc::new(RefCell::new(BTreeMap::new())),
            next_id: Cell::new(0),
        }
    }
}

impl<E: Clone + 'static> ListenerSet<E> {
    pub fn subscribe(&self) -> (Subscription, Receiver<E>) {
        let (tx, rx) = mpsc::channel();
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        self.registry.borrow_mut().insert(id, tx);

        let weak: Weak<Registry<E>> = Rc::downgrade(&self.registry);
        let release = Box::new(move || {
            if let Some(registry) = weak.upgrade() {
                registry.borrow_mut().remove(&id);
            }
        });
        (
            Subscription {
                release: Some(release),
            },
            rx,
        )
    }

    /// Returns how many listeners received the event.
    pub fn emit(&self, event: &E) -> usize {
        let mut registry = self.registry.borrow_mut();
        registry.retain(|_, tx| tx.send(event.clone()).is_ok());
        registry.len()
    }

    pub fn len(&self) -> usize {
        self.registry.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.borrow().is_empty()
    }
}

/// Deregisters its listener when dropped.
pub struct Subscription {
    release: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub fn cancel(mut self) {
        self.release_now();
    }

    fn release_now(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release_now();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.release.is_some())
            .finish()
    }
}
