// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipeflow contributors

//! Graph change notifications and change recording
//!
//! Observers are plain closures registered on the graph and called
//! synchronously, in subscription order, as mutations happen. Guards are
//! consulted before a removal and can veto it by returning
//! [`ControlFlow::Break`]; creation cannot be vetoed.

use std::collections::HashSet;
use std::fmt;
use std::ops::ControlFlow;

use crate::graph::{PipelineConnection, PipelineNodeId};

/// A topology change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GraphEvent {
    /// A node was added
    NodeCreated(PipelineNodeId),
    /// A node is about to be removed; its connections are still present
    NodeRemoving(PipelineNodeId),
    /// A connection was added
    ConnectionCreated(PipelineConnection),
    /// A connection is about to be removed
    ConnectionRemoving(PipelineConnection),
}

/// Handle returned by subscription, used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObserverId(u64);

type Observer = Box<dyn FnMut(&GraphEvent)>;
type Guard = Box<dyn FnMut(&GraphEvent) -> ControlFlow<()>>;

enum Entry {
    Observer(Observer),
    Guard(Guard),
}

/// Ordered list of observer and guard callbacks
#[derive(Default)]
pub(crate) struct Observers {
    next_id: u64,
    entries: Vec<(ObserverId, Entry)>,
}

impl Observers {
    pub(crate) fn subscribe(&mut self, observer: Observer) -> ObserverId {
        self.push(Entry::Observer(observer))
    }

    pub(crate) fn guard(&mut self, guard: Guard) -> ObserverId {
        self.push(Entry::Guard(guard))
    }

    fn push(&mut self, entry: Entry) -> ObserverId {
        let id = ObserverId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, entry));
        id
    }

    pub(crate) fn unsubscribe(&mut self, id: ObserverId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry, _)| *entry != id);
        self.entries.len() != before
    }

    /// Ask every guard, in order, whether `event` may happen
    ///
    /// Stops at the first veto. Observers are not called.
    pub(crate) fn permits(&mut self, event: &GraphEvent) -> bool {
        for (id, entry) in self.entries.iter_mut() {
            if let Entry::Guard(guard) = entry {
                if guard(event).is_break() {
                    tracing::debug!(?event, guard = id.0, "graph change vetoed");
                    return false;
                }
            }
        }
        true
    }

    /// Notify every observer of `event`
    pub(crate) fn emit(&mut self, event: &GraphEvent) {
        tracing::trace!(?event, entries = self.entries.len(), "graph event");
        for (_, entry) in self.entries.iter_mut() {
            if let Entry::Observer(observer) = entry {
                observer(event);
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

impl fmt::Debug for Observers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observers")
            .field("count", &self.entries.len())
            .finish()
    }
}

/// Net topology changes over a recorded scope
///
/// Entities created and removed within the same scope cancel out and
/// appear in none of the sets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    pub nodes_created: HashSet<PipelineNodeId>,
    pub nodes_removed: HashSet<PipelineNodeId>,
    pub connections_created: HashSet<PipelineConnection>,
    pub connections_removed: HashSet<PipelineConnection>,
}

impl ChangeSet {
    /// Fold a raw event log into net changes
    pub fn from_events<'a, I>(events: I) -> Self
    where
        I: IntoIterator<Item = &'a GraphEvent>,
    {
        let mut changes = Self::default();
        for event in events {
            match *event {
                GraphEvent::NodeCreated(id) => {
                    flatten_add(&mut changes.nodes_created, &mut changes.nodes_removed, id)
                }
                GraphEvent::NodeRemoving(id) => {
                    flatten_add(&mut changes.nodes_removed, &mut changes.nodes_created, id)
                }
                GraphEvent::ConnectionCreated(conn) => flatten_add(
                    &mut changes.connections_created,
                    &mut changes.connections_removed,
                    conn,
                ),
                GraphEvent::ConnectionRemoving(conn) => flatten_add(
                    &mut changes.connections_removed,
                    &mut changes.connections_created,
                    conn,
                ),
            }
        }
        changes
    }

    pub fn is_empty(&self) -> bool {
        self.nodes_created.is_empty()
            && self.nodes_removed.is_empty()
            && self.connections_created.is_empty()
            && self.connections_removed.is_empty()
    }
}

/// Record `item` in `into` unless it cancels a pending opposite entry
fn flatten_add<T: Eq + std::hash::Hash>(into: &mut HashSet<T>, opposite: &mut HashSet<T>, item: T) {
    if !opposite.remove(&item) {
        into.insert(item);
    }
}
