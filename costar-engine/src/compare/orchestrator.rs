//! Comparison orchestrator
//!
//! Watches a selection and keeps a [`ComparisonState`] current:
//!
//! | Selection length | Mode         | Action                                   |
//! |------------------|--------------|------------------------------------------|
//! | 0                | `Empty`      | clear results, no fetch                  |
//! | 1                | `Single`     | fetch one source, self-paired entities   |
//! | ≥ 2              | `Comparison` | fetch all sources concurrently, intersect |
//!
//! A cycle starts only when the ordered list of identities changes. Each cycle
//! takes the next cycle number; a result is published only while its cycle is
//! still the latest, so a slow superseded fetch is dropped when it lands.
//! In-flight fetches are never cancelled.

use super::{compare, ComparisonDomain, ComparisonError, ComparisonOutcome, ComparisonState, ComparisonStatus};
use crate::provider::MetadataProvider;
use crate::selection::SelectionEntry;
use chrono::Utc;
use costar_common::events::{ComparisonMode, CostarEvent, EventBus, SelectionKind};
use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

type EntryKey<D> = <<D as ComparisonDomain>::Entry as SelectionEntry>::Key;

/// Cycle bookkeeping, guarded so that cycle numbers follow selection order
struct CycleTracker<K> {
    latest_cycle: u64,
    last_keys: Option<Vec<K>>,
}

struct Inner<D: ComparisonDomain> {
    domain: D,
    provider: Arc<dyn MetadataProvider>,
    events: EventBus,
    tracker: Mutex<CycleTracker<EntryKey<D>>>,
    tx: watch::Sender<ComparisonState<D::Record>>,
}

/// Drives comparisons for one selection kind
pub struct ComparisonOrchestrator<D: ComparisonDomain> {
    inner: Arc<Inner<D>>,
}

impl<D: ComparisonDomain> Clone for ComparisonOrchestrator<D> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<D: ComparisonDomain> ComparisonOrchestrator<D> {
    pub fn new(domain: D, provider: Arc<dyn MetadataProvider>, events: EventBus) -> Self {
        let (tx, _) = watch::channel(ComparisonState::default());
        Self {
            inner: Arc::new(Inner {
                domain,
                provider,
                events,
                tracker: Mutex::new(CycleTracker {
                    latest_cycle: 0,
                    last_keys: None,
                }),
                tx,
            }),
        }
    }

    /// Receiver for published states
    pub fn subscribe(&self) -> watch::Receiver<ComparisonState<D::Record>> {
        self.inner.tx.subscribe()
    }

    /// Latest published state
    pub fn state(&self) -> ComparisonState<D::Record> {
        self.inner.tx.borrow().clone()
    }

    /// React to a selection snapshot
    ///
    /// Returns the handle of the spawned fetch task when a fetching cycle
    /// started, `None` when the identities are unchanged or the selection is empty.
    pub async fn on_selection(&self, entries: &[D::Entry]) -> Option<JoinHandle<()>> {
        let kind = kind::<D>();
        let keys: Vec<EntryKey<D>> = entries.iter().map(|entry| entry.key()).collect();

        let mut tracker = self.inner.tracker.lock().await;
        if tracker.last_keys.as_ref() == Some(&keys) {
            debug!(kind = kind.as_str(), "Selection identities unchanged, no refetch");
            return None;
        }

        tracker.latest_cycle += 1;
        tracker.last_keys = Some(keys);
        let cycle = tracker.latest_cycle;
        let mode = ComparisonMode::for_len(entries.len());

        if mode == ComparisonMode::Empty {
            self.inner.tx.send_replace(ComparisonState {
                cycle,
                mode,
                status: ComparisonStatus::Idle,
            });
            info!(kind = kind.as_str(), cycle, "Selection empty, comparison cleared");
            return None;
        }

        self.inner.tx.send_replace(ComparisonState {
            cycle,
            mode,
            status: ComparisonStatus::Loading,
        });
        drop(tracker);

        info!(kind = kind.as_str(), cycle, ?mode, sources = entries.len(), "Comparison cycle started");
        self.inner.events.emit_lossy(CostarEvent::ComparisonStarted {
            kind,
            cycle,
            mode,
            sources: entries.len(),
            timestamp: Utc::now(),
        });

        let inner = Arc::clone(&self.inner);
        let entries = entries.to_vec();
        Some(tokio::spawn(async move {
            let result = compare(&inner.domain, inner.provider.as_ref(), &entries).await;
            inner.publish(cycle, result);
        }))
    }

    /// Follow a selection until its sender is dropped
    pub fn watch_selection(&self, mut selection: watch::Receiver<Vec<D::Entry>>) -> JoinHandle<()> {
        let orchestrator = self.clone();
        tokio::spawn(async move {
            loop {
                let entries = selection.borrow_and_update().clone();
                orchestrator.on_selection(&entries).await;
                if selection.changed().await.is_err() {
                    debug!(kind = kind::<D>().as_str(), "Selection closed, orchestrator stopping");
                    break;
                }
            }
        })
    }
}

impl<D: ComparisonDomain> Inner<D> {
    /// Publish a finished cycle unless a newer one has started
    fn publish(&self, cycle: u64, result: Result<ComparisonOutcome<D::Record>, ComparisonError>) {
        let kind = kind::<D>();
        let event = match &result {
            Ok(outcome) => CostarEvent::ComparisonPublished {
                kind,
                cycle,
                common: outcome.entities().len(),
                timestamp: Utc::now(),
            },
            Err(e) => CostarEvent::ComparisonFailed {
                kind,
                cycle,
                message: e.to_string(),
                timestamp: Utc::now(),
            },
        };

        let mut latest_cycle = cycle;
        let published = self.tx.send_if_modified(|state| {
            if state.cycle != cycle {
                latest_cycle = state.cycle;
                return false;
            }
            state.status = match result {
                Ok(outcome) => ComparisonStatus::Ready(outcome),
                Err(e) => ComparisonStatus::Failed(e),
            };
            true
        });

        if !published {
            warn!(kind = kind.as_str(), cycle, latest_cycle, "Discarding stale comparison result");
            self.events.emit_lossy(CostarEvent::ComparisonDiscarded {
                kind,
                cycle,
                latest_cycle,
                timestamp: Utc::now(),
            });
            return;
        }

        info!(kind = kind.as_str(), cycle, event = event.event_type(), "Comparison cycle finished");
        self.events.emit_lossy(event);
    }
}

fn kind<D: ComparisonDomain>() -> SelectionKind {
    <D::Entry as SelectionEntry>::KIND
}
