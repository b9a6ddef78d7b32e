//! Notifications emitted after every mutating conflict operation

use serde::Serialize;

use crate::models::{AutoResolveStrategy, ConflictRecord, Record, Resolution};

/// Event emitted by the conflict service
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(
    tag = "event",
    content = "detail",
    rename_all = "kebab-case",
    rename_all_fields = "camelCase"
)]
pub enum ConflictEvent {
    /// A conflict was queued or its pending entry refreshed
    ConflictAdded { conflict: ConflictRecord },
    /// A single conflict was settled
    ConflictResolved {
        conflict: ConflictRecord,
        resolved_record: Record,
    },
    /// A batch run finished; `count` is the number of successful items
    ConflictsBatchResolved { count: usize, strategy: Resolution },
    /// The auto-resolve strategy changed
    ConflictSettingsChanged { strategy: AutoResolveStrategy },
}

impl ConflictEvent {
    /// Wire name of the event
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::ConflictAdded { .. } => "conflict-added",
            Self::ConflictResolved { .. } => "conflict-resolved",
            Self::ConflictsBatchResolved { .. } => "conflicts-batch-resolved",
            Self::ConflictSettingsChanged { .. } => "conflict-settings-changed",
        }
    }
}

/// Handle returned by [`EventBus::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&ConflictEvent)>;

/// Subscriber list owned by a single service instance
#[derive(Default)]
pub struct EventBus {
    listeners: Vec<(SubscriptionId, Listener)>,
    next_id: u64,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener; it sees every event emitted after this call.
    pub fn subscribe(&mut self, listener: impl FnMut(&ConflictEvent) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener. Returns whether it was registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    /// Deliver `event` to every listener in subscription order.
    pub fn emit(&mut self, event: &ConflictEvent) {
        tracing::trace!(event = event.name(), listeners = self.listeners.len(), "Emitting");
        for (_, listener) in &mut self.listeners {
            listener(event);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("EventBus")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
