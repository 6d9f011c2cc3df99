//! Observable, persisted selection store

use super::{load_and_migrate, LoadSource, SelectionEntry};
use chrono::Utc;
use costar_common::events::{CostarEvent, EventBus};
use costar_common::{KeyValueStore, Result};
use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tracing::{debug, info};

/// Ordered, identity-deduplicated selection of `E`
///
/// Every mutation that changes the list is written to the key-value store
/// before it becomes visible; observers get the new list through
/// [`subscribe`](Self::subscribe). Mutations are serialized by an async mutex
/// held across compute, write and publish. Share it as `Arc<SelectionStore<E>>`.
pub struct SelectionStore<E: SelectionEntry> {
    kv: Arc<dyn KeyValueStore>,
    entries: Mutex<Vec<E>>,
    tx: watch::Sender<Vec<E>>,
    events: EventBus,
}

impl<E: SelectionEntry> SelectionStore<E> {
    /// Load the persisted selection, migrating older layouts first
    pub async fn load(kv: Arc<dyn KeyValueStore>, seed_defaults: bool, events: EventBus) -> Result<Self> {
        let (entries, report) = load_and_migrate::<E>(kv.as_ref(), seed_defaults).await?;

        if report.source == LoadSource::Legacy {
            events.emit_lossy(CostarEvent::SelectionMigrated {
                kind: E::KIND,
                migrated: report.loaded,
                timestamp: Utc::now(),
            });
        }

        info!(
            kind = E::KIND.as_str(),
            source = ?report.source,
            len = entries.len(),
            "Selection loaded"
        );

        let (tx, _) = watch::channel(entries.clone());
        Ok(Self {
            kv,
            entries: Mutex::new(entries),
            tx,
            events,
        })
    }

    /// Receiver that always holds the latest persisted list
    pub fn subscribe(&self) -> watch::Receiver<Vec<E>> {
        self.tx.subscribe()
    }

    /// Current list
    pub fn snapshot(&self) -> Vec<E> {
        self.tx.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.tx.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Replace the entry with the same identity in place, or append
    pub async fn add(&self, entry: E) -> Result<()> {
        let mut guard = self.entries.lock().await;
        let mut next = guard.clone();

        let key = entry.key();
        match next.iter().position(|existing| existing.key() == key) {
            Some(index) => next[index] = entry,
            None => next.push(entry),
        }

        self.commit(&mut guard, next, "add").await
    }

    /// Remove the entry with this identity; `false` if there was none
    pub async fn remove(&self, key: &E::Key) -> Result<bool> {
        let mut guard = self.entries.lock().await;
        if !guard.iter().any(|entry| &entry.key() == key) {
            return Ok(false);
        }

        let next: Vec<E> = guard
            .iter()
            .filter(|entry| &entry.key() != key)
            .cloned()
            .collect();

        self.commit(&mut guard, next, "remove").await?;
        Ok(true)
    }

    /// Replace the entry at `index`; `false` if out of range
    ///
    /// Another entry already holding the replacement's identity is dropped.
    pub async fn update(&self, index: usize, entry: E) -> Result<bool> {
        let mut guard = self.entries.lock().await;
        if index >= guard.len() {
            return Ok(false);
        }

        let key = entry.key();
        let next: Vec<E> = guard
            .iter()
            .enumerate()
            .filter_map(|(i, existing)| {
                if i == index {
                    Some(entry.clone())
                } else if existing.key() == key {
                    None
                } else {
                    Some(existing.clone())
                }
            })
            .collect();

        self.commit(&mut guard, next, "update").await?;
        Ok(true)
    }

    /// Move the entry at `from` to position `to`; `false` if either is out of range
    pub async fn reorder(&self, from: usize, to: usize) -> Result<bool> {
        let mut guard = self.entries.lock().await;
        if from >= guard.len() || to >= guard.len() {
            return Ok(false);
        }

        let mut next = guard.clone();
        let moved = next.remove(from);
        next.insert(to, moved);

        self.commit(&mut guard, next, "reorder").await?;
        Ok(true)
    }

    pub async fn clear(&self) -> Result<()> {
        let mut guard = self.entries.lock().await;
        self.commit(&mut guard, Vec::new(), "clear").await
    }

    /// Persist, then publish. Unchanged lists are neither written nor published.
    async fn commit(&self, current: &mut Vec<E>, next: Vec<E>, operation: &'static str) -> Result<()> {
        if *current == next {
            debug!(kind = E::KIND.as_str(), operation, "Selection unchanged, skipping write");
            return Ok(());
        }

        let json = serde_json::to_string(&next)?;
        self.kv.set(E::CURRENT_KEY, &json).await?;

        *current = next.clone();
        let len = next.len();
        self.tx.send_replace(next);

        debug!(kind = E::KIND.as_str(), operation, len, "Selection persisted");
        self.events.emit_lossy(CostarEvent::SelectionChanged {
            kind: E::KIND,
            len,
            timestamp: Utc::now(),
        });

        Ok(())
    }
}
