//! Change notifications for the food log.
//!
//! Observers are plain closures registered on a [`FoodLog`](crate::FoodLog).
//! They run synchronously, after the change has been applied and saved, and
//! receive the current entries and totals alongside the event so that a
//! display layer never has to re-query the log.

use std::collections::BTreeMap;
use std::fmt;

use crate::models::{FoodEntry, Totals};

/// Identifies a registered observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// A mutation applied to the log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogEvent {
    /// An entry was appended at `index`.
    Added { index: usize, entry: FoodEntry },
    /// Entries were removed, in ascending order of their former positions.
    /// Empty when the delete request matched nothing.
    Deleted { entries: Vec<FoodEntry> },
    /// The collection was replaced wholesale from the store.
    Loaded { count: usize },
}

/// What an observer sees after each mutation.
#[derive(Debug)]
pub struct LogChange<'a> {
    pub event: &'a LogEvent,
    pub entries: &'a [FoodEntry],
    pub totals: Totals,
}

type Observer = Box<dyn FnMut(&LogChange<'_>)>;

/// Registered observers, notified in subscription order.
pub(crate) struct Observers {
    observers: BTreeMap<SubscriptionId, Observer>,
    next_id: u64,
}

impl Observers {
    pub(crate) fn new() -> Self {
        Self {
            observers: BTreeMap::new(),
            next_id: 1,
        }
    }

    pub(crate) fn subscribe<F>(&mut self, observer: F) -> SubscriptionId
    where
        F: FnMut(&LogChange<'_>) + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.observers.insert(id, Box::new(observer));
        id
    }

    pub(crate) fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers.remove(&id).is_some()
    }

    pub(crate) fn len(&self) -> usize {
        self.observers.len()
    }

    pub(crate) fn notify(&mut self, event: &LogEvent, entries: &[FoodEntry]) {
        if self.observers.is_empty() {
            return;
        }

        let change = LogChange {
            event,
            entries,
            totals: Totals::from_entries(entries),
        };
        for observer in self.observers.values_mut() {
            observer(&change);
        }
    }
}
