//! In-memory collection state and the merge/mutation rules around it.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use super::id::{is_local_id, IdGenerator, LocalIdGenerator};
use super::traits::Record;

/// Locally visible state for one record kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionState<R> {
  /// Local records first (newest first), then canonical records in source order
  pub records: Vec<R>,
  /// Upstream total plus the number of local-origin records
  pub total: u64,
  pub is_loaded: bool,
}

impl<R> Default for CollectionState<R> {
  fn default() -> Self {
    Self {
      records: Vec::new(),
      total: 0,
      is_loaded: false,
    }
  }
}

/// Record cache for one kind.
///
/// Holds no I/O: persistence and change notification are layered on top by
/// [`RecordStore`](super::RecordStore).
pub struct RecordCache<R: Record> {
  state: CollectionState<R>,
  ids: Arc<dyn IdGenerator>,
}

impl<R: Record> RecordCache<R> {
  pub fn new() -> Self {
    Self::with_id_generator(Arc::new(LocalIdGenerator))
  }

  pub fn with_id_generator(ids: Arc<dyn IdGenerator>) -> Self {
    Self {
      state: CollectionState::default(),
      ids,
    }
  }

  pub fn state(&self) -> &CollectionState<R> {
    &self.state
  }

  /// Replace the whole state, used when restoring from storage.
  pub fn replace_state(&mut self, state: CollectionState<R>) {
    self.state = state;
  }

  /// Merge a freshly fetched page of canonical records.
  ///
  /// Local-origin records are kept ahead of the page, and locally modified
  /// canonical records replace their incoming copies. Everything else in the
  /// incoming page wins.
  pub fn merge(&mut self, incoming: Vec<R>, incoming_total: u64) {
    let (local_only, canonical): (Vec<R>, Vec<R>) = std::mem::take(&mut self.state.records)
      .into_iter()
      .partition(|r| is_local_id(r.id()));

    let mut modified: HashMap<String, R> = canonical
      .into_iter()
      .filter(|r| r.is_modified())
      .map(|r| (r.id().to_string(), r))
      .collect();

    let local_count = local_only.len() as u64;
    let mut records = local_only;
    records.extend(
      incoming
        .into_iter()
        .map(|r| modified.remove(r.id()).unwrap_or(r)),
    );

    tracing::debug!(
      kind = R::namespace(),
      records = records.len(),
      local = local_count,
      "merged upstream page"
    );

    self.state.records = records;
    self.state.total = incoming_total + local_count;
    self.state.is_loaded = true;
  }

  pub fn get_by_id(&self, id: &str) -> Option<&R> {
    self.state.records.iter().find(|r| r.id() == id)
  }

  /// Insert a record fetched by other means if its id is not cached yet.
  ///
  /// Does not touch `total`, which tracks paginated list counts only.
  /// Returns true if the record was inserted.
  pub fn add(&mut self, record: R) -> bool {
    if self.get_by_id(record.id()).is_some() {
      return false;
    }
    self.state.records.push(record);
    true
  }

  /// Create a local-origin record and prepend it.
  pub fn create(&mut self, input: R::Input) -> R {
    let record = R::from_input(self.ids.next_id(), input);
    self.state.records.insert(0, record.clone());
    self.state.total += 1;
    self.state.is_loaded = true;
    record
  }

  /// Apply a patch and mark the record modified. Returns false if the id is unknown.
  pub fn update(&mut self, id: &str, patch: R::Patch) -> bool {
    match self.state.records.iter_mut().find(|r| r.id() == id) {
      Some(record) => {
        record.apply(patch);
        record.mark_modified();
        true
      }
      None => false,
    }
  }

  /// Remove a record. Returns false if the id is unknown.
  pub fn delete(&mut self, id: &str) -> bool {
    let Some(pos) = self.state.records.iter().position(|r| r.id() == id) else {
      return false;
    };
    self.state.records.remove(pos);
    self.state.total = self.state.total.saturating_sub(1);
    true
  }

  /// Clear records and the loaded flag. `total` is left as is.
  pub fn reset(&mut self) {
    self.state.records.clear();
    self.state.is_loaded = false;
  }
}

impl<R: Record> Default for RecordCache<R> {
  fn default() -> Self {
    Self::new()
  }
}
