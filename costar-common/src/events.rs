//! Event types for the Costar event system
//!
//! Selection and comparison lifecycle events, broadcast via [`EventBus`] so that
//! any number of observers (CLI output, logging, future UIs) can follow along.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Which persisted selection an event refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionKind {
    Titles,
    People,
}

impl SelectionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SelectionKind::Titles => "titles",
            SelectionKind::People => "people",
        }
    }
}

/// Comparison mode, derived from selection length (0, 1, 2+)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonMode {
    Empty,
    Single,
    Comparison,
}

impl ComparisonMode {
    /// Mode for a selection of `len` entries
    pub fn for_len(len: usize) -> Self {
        match len {
            0 => ComparisonMode::Empty,
            1 => ComparisonMode::Single,
            _ => ComparisonMode::Comparison,
        }
    }
}

/// Costar event types
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CostarEvent {
    /// A selection mutation was persisted
    SelectionChanged {
        kind: SelectionKind,
        /// Entry count after the mutation
        len: usize,
        timestamp: DateTime<Utc>,
    },

    /// A legacy slot layout was converted to the current array layout
    SelectionMigrated {
        kind: SelectionKind,
        /// Entries recovered from the legacy slots
        migrated: usize,
        timestamp: DateTime<Utc>,
    },

    /// A comparison cycle began fetching
    ComparisonStarted {
        kind: SelectionKind,
        cycle: u64,
        mode: ComparisonMode,
        sources: usize,
        timestamp: DateTime<Utc>,
    },

    /// A comparison cycle published its outcome
    ComparisonPublished {
        kind: SelectionKind,
        cycle: u64,
        /// Number of common entities (0 for empty-source / no-common outcomes)
        common: usize,
        timestamp: DateTime<Utc>,
    },

    /// A comparison cycle aborted because a source was unavailable
    ComparisonFailed {
        kind: SelectionKind,
        cycle: u64,
        message: String,
        timestamp: DateTime<Utc>,
    },

    /// A superseded cycle finished after a newer one started; its result was dropped
    ComparisonDiscarded {
        kind: SelectionKind,
        cycle: u64,
        latest_cycle: u64,
        timestamp: DateTime<Utc>,
    },
}

impl CostarEvent {
    /// Get event type as string for filtering
    pub fn event_type(&self) -> &str {
        match self {
            CostarEvent::SelectionChanged { .. } => "SelectionChanged",
            CostarEvent::SelectionMigrated { .. } => "SelectionMigrated",
            CostarEvent::ComparisonStarted { .. } => "ComparisonStarted",
            CostarEvent::ComparisonPublished { .. } => "ComparisonPublished",
            CostarEvent::ComparisonFailed { .. } => "ComparisonFailed",
            CostarEvent::ComparisonDiscarded { .. } => "ComparisonDiscarded",
        }
    }
}

/// Broadcast bus for [`CostarEvent`]s
///
/// Cheap to clone; all clones share one channel.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<CostarEvent>,
}

impl EventBus {
    /// Creates a new EventBus with specified channel capacity
    ///
    /// `capacity` is the number of events buffered per subscriber before the
    /// oldest are dropped for slow receivers.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Subscribe to all future events
    pub fn subscribe(&self) -> broadcast::Receiver<CostarEvent> {
        self.tx.subscribe()
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: CostarEvent) {
        let _ = self.tx.send(event);
    }
}
