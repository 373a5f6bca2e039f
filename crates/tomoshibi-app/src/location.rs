// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::sync::mpsc::Receiver;

use crate::ids::ItemId;
use crate::listeners::{ListenerSet, Subscription};

pub const CARD_FRAGMENT_PREFIX: &str = "card-";

pub fn card_fragment(id: &ItemId) -> String {
    format!("{CARD_FRAGMENT_PREFIX}{id}")
}

/// Accepts the fragment with or without the leading `#`. Anything that is
/// not `card-<non-empty id>` means nothing is open.
pub fn parse_card_fragment(fragment: &str) -> Option<ItemId> {
    let fragment = fragment.strip_prefix('#').unwrap_or(fragment);
    let id = fragment.strip_prefix(CARD_FRAGMENT_PREFIX)?;
    if id.is_empty() {
        return None;
    }
    Some(ItemId::new(id))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentChanged {
    pub fragment: String,
}

/// In-process stand-in for the browser location: a fragment history with
/// back/forward and change notifications.
#[derive(Debug)]
pub struct Location {
    entries: Vec<String>,
    cursor: usize,
    listeners: ListenerSet<FragmentChanged>,
}

impl Default for Location {
    fn default() -> Self {
        Self::new("")
    }
}

impl Location {
    pub fn new(initial: &str) -> Self {
        Self {
            entries: vec![normalize(initial)],
            cursor: 0,
            listeners: ListenerSet::default(),
        }
    }

    pub fn fragment(&self) -> &str {
        &self.entries[self.cursor]
    }

    /// Pushes a history entry and notifies listeners. Assigning the current
    /// fragment is a no-op.
    pub fn assign(&mut self, fragment: &str) -> bool {
        let fragment = normalize(fragment);
        if fragment == self.fragment() {
            return false;
        }
        self.entries.truncate(self.cursor + 1);
        self.entries.push(fragment);
        self.cursor += 1;
        self.notify();
        true
    }

    /// Rewrites the current entry without notifying anyone.
    pub fn replace(&mut self, fragment: &str) {
        self.entries[self.cursor] = normalize(fragment);
    }

    pub fn back(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        self.notify();
        true
    }

    pub fn forward(&mut self) -> bool {
        if self.cursor + 1 >= self.entries.len() {
            return false;
        }
        self.cursor += 1;
        self.notify();
        true
    }

    pub fn subscribe(&self) -> (Subscription, Receiver<FragmentChanged>) {
        self.listeners.subscribe()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn history_len(&self) -> usize {
        self.entries.len()
    }

    fn notify(&self) {
        self.listeners.emit(&FragmentChanged {
            fragment: self.fragment().to_owned(),
        });
    }
}

fn normalize(fragment: &str) -> String {
    fragment
        .trim()
        .strip_prefix('#')
        .unwrap_or(fragment.trim())
        .to_owned()
}
