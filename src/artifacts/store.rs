//! Time-bounded in-memory record store.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use dashmap::DashMap;

use crate::clock::SharedClock;

/// A stored value and the instant it was written.
#[derive(Debug, Clone)]
struct Entry<V> {
    value: V,
    created_at_ms: u64,
}

/// Records retrievable by id until a sweep finds them older than the
/// retention period.
///
/// Reads never check age. A record can therefore be served for up to
/// `retention + sweep_interval` after it was written; the periodic sweep is
/// the only thing that expires records.
pub struct ExpiringRecordStore<V> {
    records: DashMap<String, Entry<V>>,
    retention_ms: AtomicU64,
    clock: SharedClock,
}

impl<V: Clone> ExpiringRecordStore<V> {
    pub fn new(retention: Duration, clock: SharedClock) -> Self {
        Self {
            records: DashMap::new(),
            retention_ms: AtomicU64::new(retention.as_millis() as u64),
            clock,
        }
    }

    /// Store `value` under `id`, replacing any previous record and its age.
    pub fn put(&self, id: impl Into<String>, value: V) {
        let entry = Entry {
            value,
            created_at_ms: self.clock.now_ms(),
        };
        self.records.insert(id.into(), entry);
    }

    pub fn get(&self, id: &str) -> Option<V> {
        self.records.get(id).map(|entry| entry.value.clone())
    }

    /// Remove every record strictly older than the retention period.
    /// Returns how many were removed.
    pub fn sweep(&self) -> usize {
        let retention_ms = self.retention_ms.load(Ordering::Relaxed);
        let now = self.clock.now_ms();
        let mut removed = 0;

        self.records.retain(|_, entry| {
            let expired = now.saturating_sub(entry.created_at_ms) > retention_ms;
            if expired {
                removed += 1;
            }
            !expired
        });

        removed
    }

    pub fn retention(&self) -> Duration {
        Duration::from_millis(self.retention_ms.load(Ordering::Relaxed))
    }

    /// Takes effect on the next sweep; existing records keep their creation time.
    pub fn set_retention(&self, retention: Duration) {
        self.retention_ms
            .store(retention.as_millis() as u64, Ordering::Relaxed);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use std::sync::Arc;

    const DAY: Duration = Duration::from_secs(24 * 60 * 60);
    const SWEEP_INTERVAL: Duration = Duration::from_secs(30 * 60);

    fn store() -> (ExpiringRecordStore<String>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(1_700_000_000_000));
        (ExpiringRecordStore::new(DAY, clock.clone()), clock)
    }

    #[test]
    fn test_put_then_get() {
        let (store, _clock) = store();
        store.put("a", "first".to_string());
        assert_eq!(store.get("a").as_deref(), Some("first"));
        assert_eq!(store.get("missing"), None);
    }

    #[test]
    fn test_put_overwrites_and_resets_age() {
        let (store, clock) = store();
        store.put("a", "old".to_string());
        clock.advance(DAY);
        store.put("a", "new".to_string());
        clock.advance(Duration::from_secs(60));

        assert_eq!(store.sweep(), 0);
        assert_eq!(store.get("a").as_deref(), Some("new"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_record_exactly_at_retention_survives() {
        let (store, clock) = store();
        store.put("a", "v".to_string());
        clock.advance(DAY);
        assert_eq!(store.sweep(), 0);
        clock.advance(Duration::from_millis(1));
        assert_eq!(store.sweep(), 1);
        assert!(store.is_empty());
    }

    #[test]
    fn test_reads_do_not_expire_between_sweeps() {
        let (store, clock) = store();
        store.put("a", "v".to_string());

        // past retention, but no sweep has run yet
        clock.advance(DAY + SWEEP_INTERVAL - Duration::from_secs(1));
        assert_eq!(store.get("a").as_deref(), Some("v"));

        // the next sweep, at most one interval later, removes it
        clock.advance(Duration::from_secs(1));
        assert_eq!(store.sweep(), 1);
        assert_eq!(store.get("a"), None);
    }

    #[test]
    fn test_sweep_keeps_fresh_records() {
        let (store, clock) = store();
        store.put("old", "1".to_string());
        clock.advance(DAY / 2);
        store.put("young", "2".to_string());
        clock.advance(DAY / 2 + Duration::from_secs(1));

        assert_eq!(store.sweep(), 1);
        assert_eq!(store.get("old"), None);
        assert!(store.get("young").is_some());
    }

    #[test]
    fn test_retention_change_applies_on_next_sweep() {
        let (store, clock) = store();
        store.put("a", "v".to_string());
        clock.advance(Duration::from_secs(120));
        assert_eq!(store.sweep(), 0);

        store.set_retention(Duration::from_secs(60));
        assert_eq!(store.retention(), Duration::from_secs(60));
        assert_eq!(store.sweep(), 1);
    }
}
