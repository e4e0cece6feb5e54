//! Shared record store adding hydration, write-through persistence and
//! change notification on top of [`RecordCache`].

use color_eyre::{eyre::eyre, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::watch;

use super::persist::PersistenceAdapter;
use super::state::{CollectionState, RecordCache};
use super::storage::SlotStorage;
use super::traits::Record;

/// Session-wide store for one record kind.
///
/// Cheap to clone; every clone shares the same cache, so the table, the
/// detail lookup and the search all see the same state. Every successful
/// change is persisted before the call returns, then published to
/// subscribers. Changes are refused until [`hydrate`](Self::hydrate) has run,
/// since writing an unrestored cache would overwrite the persisted slot.
pub struct RecordStore<R: Record, S: SlotStorage> {
  inner: Arc<Inner<R, S>>,
}

struct Inner<R: Record, S: SlotStorage> {
  cache: Mutex<RecordCache<R>>,
  persistence: PersistenceAdapter<S>,
  hydrated: AtomicBool,
  changes: watch::Sender<Arc<CollectionState<R>>>,
}

impl<R: Record, S: SlotStorage> RecordStore<R, S> {
  /// Create an unhydrated store persisting under the kind's namespace.
  pub fn new(storage: Arc<S>) -> Self {
    Self::with_cache(RecordCache::new(), PersistenceAdapter::for_kind::<R>(storage))
  }

  pub fn with_cache(cache: RecordCache<R>, persistence: PersistenceAdapter<S>) -> Self {
    let (changes, _) = watch::channel(Arc::new(cache.state().clone()));
    Self {
      inner: Arc::new(Inner {
        cache: Mutex::new(cache),
        persistence,
        hydrated: AtomicBool::new(false),
        changes,
      }),
    }
  }

  fn lock(&self) -> Result<MutexGuard<'_, RecordCache<R>>> {
    self
      .inner
      .cache
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))
  }

  /// Restore persisted state, once per store.
  ///
  /// A missing or unreadable slot leaves the cache empty. Either way the
  /// store is hydrated afterwards. Later calls are no-ops.
  pub fn hydrate(&self) -> Result<()> {
    let mut cache = self.lock()?;
    if self.inner.hydrated.load(Ordering::Acquire) {
      return Ok(());
    }

    match self.inner.persistence.restore::<R>() {
      Some(state) => {
        tracing::info!(
          kind = R::namespace(),
          records = state.records.len(),
          total = state.total,
          "restored persisted state"
        );
        cache.replace_state(state);
      }
      None => tracing::info!(kind = R::namespace(), "no persisted state, starting fresh"),
    }

    self.inner.hydrated.store(true, Ordering::Release);
    self.publish(&cache);
    Ok(())
  }

  /// Whether the restore attempt has completed.
  pub fn has_hydrated(&self) -> bool {
    self.inner.hydrated.load(Ordering::Acquire)
  }

  /// Watch the collection; the receiver always holds the latest state.
  pub fn subscribe(&self) -> watch::Receiver<Arc<CollectionState<R>>> {
    self.inner.changes.subscribe()
  }

  /// Latest state without locking.
  pub fn snapshot(&self) -> Arc<CollectionState<R>> {
    self.inner.changes.borrow().clone()
  }

  pub fn get_by_id(&self, id: &str) -> Result<Option<R>> {
    Ok(self.lock()?.get_by_id(id).cloned())
  }

  pub fn merge(&self, incoming: Vec<R>, incoming_total: u64) -> Result<()> {
    self.mutate(|cache| {
      cache.merge(incoming, incoming_total);
      ((), true)
    })
  }

  pub fn add(&self, record: R) -> Result<bool> {
    self.mutate(|cache| {
      let added = cache.add(record);
      (added, added)
    })
  }

  pub fn create(&self, input: R::Input) -> Result<R> {
    self.mutate(|cache| {
      let record = cache.create(input);
      tracing::debug!(kind = R::namespace(), id = record.id(), "created local record");
      (record, true)
    })
  }

  pub fn update(&self, id: &str, patch: R::Patch) -> Result<bool> {
    self.mutate(|cache| {
      let updated = cache.update(id, patch);
      tracing::debug!(kind = R::namespace(), id, updated, "update");
      (updated, updated)
    })
  }

  pub fn delete(&self, id: &str) -> Result<bool> {
    self.mutate(|cache| {
      let deleted = cache.delete(id);
      tracing::debug!(kind = R::namespace(), id, deleted, "delete");
      (deleted, deleted)
    })
  }

  pub fn reset(&self) -> Result<()> {
    self.mutate(|cache| {
      cache.reset();
      ((), true)
    })
  }

  /// Run a cache operation; if it reports a change, persist and publish.
  fn mutate<T>(&self, op: impl FnOnce(&mut RecordCache<R>) -> (T, bool)) -> Result<T> {
    let mut cache = self.lock()?;
    if !self.inner.hydrated.load(Ordering::Acquire) {
      return Err(eyre!(
        "{} has not been restored yet; refusing to change it",
        R::namespace()
      ));
    }
    let (out, changed) = op(&mut cache);
    if changed {
      self.inner.persistence.persist(cache.state())?;
      self.publish(&cache);
    }
    Ok(out)
  }

  fn publish(&self, cache: &RecordCache<R>) {
    self.inner.changes.send_replace(Arc::new(cache.state().clone()));
  }
}

impl<R: Record, S: SlotStorage> Clone for RecordStore<R, S> {
  fn clone(&self) -> Self {
    Self {
      inner: Arc::clone(&self.inner),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::cache::storage::{NoopStorage, SqliteSlotStorage};
  use crate::cache::testing::{note, Note, NoteInput, NotePatch};

  fn sqlite() -> Arc<SqliteSlotStorage> {
    Arc::new(SqliteSlotStorage::open_in_memory().unwrap())
  }

  /// Storage whose every call fails, like a full or read-only disk.
  struct BrokenStorage;

  impl SlotStorage for BrokenStorage {
    fn read_slot(&self, _key: &str) -> Result<Option<Vec<u8>>> {
      Err(eyre!("disk unavailable"))
    }

    fn write_slot(&self, _key: &str, _value: &[u8]) -> Result<()> {
      Err(eyre!("quota exceeded"))
    }

    fn remove_slot(&self, _key: &str) -> Result<()> {
      Err(eyre!("disk unavailable"))
    }
  }

  #[test]
  fn test_hydrate_on_empty_storage() {
    let store: RecordStore<Note, _> = RecordStore::new(sqlite());
    assert!(!store.has_hydrated());

    store.hydrate().unwrap();

    assert!(store.has_hydrated());
    assert!(store.snapshot().records.is_empty());
    assert!(!store.snapshot().is_loaded);
  }

  #[test]
  fn test_mutations_survive_reload() {
    let storage = sqlite();

    let store: RecordStore<Note, _> = RecordStore::new(Arc::clone(&storage));
    store.hydrate().unwrap();
    store.merge(vec![note("1", "A"), note("2", "B")], 2).unwrap();
    assert!(store.update("1", NotePatch::titled("edited")).unwrap());
    let created = store.create(NoteInput::titled("mine")).unwrap();
    assert!(store.delete("2").unwrap());

    let reloaded: RecordStore<Note, _> = RecordStore::new(storage);
    reloaded.hydrate().unwrap();

    let state = reloaded.snapshot();
    assert_eq!(state.records.len(), 2);
    assert_eq!(state.records[0], created);
    assert_eq!(state.records[1].title, "edited");
    assert!(state.records[1].is_modified);
    assert_eq!(state.total, 2);
    assert!(state.is_loaded);
  }

  #[test]
  fn test_writes_refused_before_hydration() {
    let storage = sqlite();

    let store: RecordStore<Note, _> = RecordStore::new(Arc::clone(&storage));
    store.hydrate().unwrap();
    store.merge(vec![note("1", "A")], 1).unwrap();
    assert!(store.update("1", NotePatch::titled("edited")).unwrap());

    let early: RecordStore<Note, _> = RecordStore::new(Arc::clone(&storage));
    assert!(early.create(NoteInput::titled("early")).is_err());
    assert!(early.merge(vec![note("2", "B")], 1).is_err());
    assert!(early.reset().is_err());

    early.hydrate().unwrap();
    let state = early.snapshot();
    assert_eq!(state.records.len(), 1);
    assert_eq!(state.records[0].title, "edited");
    assert!(state.records[0].is_modified);

    assert!(early.create(NoteInput::titled("late")).is_ok());
  }

  #[test]
  fn test_write_failure_does_not_fail_mutation() {
    let store: RecordStore<Note, _> = RecordStore::new(Arc::new(BrokenStorage));
    store.hydrate().unwrap();

    store.merge(vec![note("1", "A")], 1).unwrap();
    assert!(store.update("1", NotePatch::titled("B")).unwrap());

    let record = store.get_by_id("1").unwrap().unwrap();
    assert_eq!(record.title, "B");
    assert!(record.is_modified);
    assert_eq!(store.snapshot().records, vec![record]);
  }

  #[test]
  fn test_read_failure_hydrates_empty() {
    let store: RecordStore<Note, _> = RecordStore::new(Arc::new(BrokenStorage));

    store.hydrate().unwrap();

    assert!(store.has_hydrated());
    assert!(store.snapshot().records.is_empty());
    assert!(store.create(NoteInput::titled("mine")).is_ok());
  }

  #[test]
  fn test_hydrate_runs_once() {
    let storage = sqlite();
    let store: RecordStore<Note, _> = RecordStore::new(Arc::clone(&storage));
    store.hydrate().unwrap();
    store.merge(vec![note("1", "A")], 1).unwrap();

    // Another session writes a different state; a second hydrate must not
    // clobber what this session already holds.
    let other: RecordStore<Note, _> = RecordStore::new(storage);
    other.hydrate().unwrap();
    other.reset().unwrap();

    store.hydrate().unwrap();
    assert_eq!(store.snapshot().records, vec![note("1", "A")]);
  }

  #[test]
  fn test_not_found_leaves_state_unpublished() {
    let store: RecordStore<Note, _> = RecordStore::new(Arc::new(NoopStorage));
    store.hydrate().unwrap();
    let mut rx = store.subscribe();
    rx.mark_unchanged();

    assert!(!store.update("ghost", NotePatch::titled("x")).unwrap());
    assert!(!store.delete("ghost").unwrap());
    assert!(!rx.has_changed().unwrap());
  }

  #[test]
  fn test_subscribers_see_latest_state() {
    let store: RecordStore<Note, _> = RecordStore::new(Arc::new(NoopStorage));
    store.hydrate().unwrap();
    let mut rx = store.subscribe();

    store.merge(vec![note("1", "A")], 1).unwrap();
    assert!(rx.has_changed().unwrap());
    assert_eq!(rx.borrow_and_update().records, vec![note("1", "A")]);

    // Clones share the same cache
    let view = store.clone();
    assert!(view.add(note("2", "B")).unwrap());
    assert_eq!(rx.borrow_and_update().records.len(), 2);
    assert_eq!(store.get_by_id("2").unwrap(), Some(note("2", "B")));
    assert_eq!(store.snapshot().total, 1);
  }

  #[tokio::test]
  async fn test_subscriber_wakes_on_change() {
    let store: RecordStore<Note, _> = RecordStore::new(Arc::new(NoopStorage));
    store.hydrate().unwrap();
    let mut rx = store.subscribe();
    rx.mark_unchanged();

    let writer = store.clone();
    tokio::spawn(async move {
      writer.create(NoteInput::titled("from task")).unwrap();
    });

    rx.changed().await.unwrap();
    assert_eq!(rx.borrow().records[0].title, "from task");
  }
}
