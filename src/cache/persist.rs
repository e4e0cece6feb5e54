//! Serialization of collection state into a namespaced storage slot.

use color_eyre::{eyre::eyre, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::state::CollectionState;
use super::storage::SlotStorage;
use super::traits::Record;

/// Layout version of the persisted envelope.
pub const STATE_VERSION: u32 = 0;

/// On-disk envelope: `{ "state": {...}, "version": 0 }`
#[derive(Serialize)]
struct EnvelopeRef<'a, R> {
  state: &'a CollectionState<R>,
  version: u32,
}

#[derive(Deserialize)]
struct Envelope<R> {
  state: CollectionState<R>,
  version: u32,
}

/// Best-effort persistence for one record kind.
///
/// Storage problems never fail the caller: a broken slot restores as
/// nothing, and a failed write is logged and dropped.
pub struct PersistenceAdapter<S: SlotStorage> {
  storage: Arc<S>,
  key: String,
}

impl<S: SlotStorage> PersistenceAdapter<S> {
  pub fn new(storage: Arc<S>, key: impl Into<String>) -> Self {
    Self {
      storage,
      key: key.into(),
    }
  }

  /// Adapter using the record kind's own namespace.
  pub fn for_kind<R: Record>(storage: Arc<S>) -> Self {
    Self::new(storage, R::namespace())
  }

  /// Load the persisted state, or `None` if the slot is missing or unusable.
  pub fn restore<R: Record>(&self) -> Option<CollectionState<R>> {
    match self.try_restore() {
      Ok(state) => state,
      Err(e) => {
        tracing::warn!(key = %self.key, error = %e, "discarding unreadable persisted state");
        if let Err(e) = self.storage.remove_slot(&self.key) {
          tracing::warn!(key = %self.key, error = %e, "failed to remove persisted state");
        }
        None
      }
    }
  }

  fn try_restore<R: Record>(&self) -> Result<Option<CollectionState<R>>> {
    let Some(bytes) = self.storage.read_slot(&self.key)? else {
      return Ok(None);
    };

    let envelope: Envelope<R> = serde_json::from_slice(&bytes)
      .map_err(|e| eyre!("Failed to parse persisted state: {}", e))?;

    if envelope.version != STATE_VERSION {
      return Err(eyre!(
        "Persisted state version {} does not match {}",
        envelope.version,
        STATE_VERSION
      ));
    }

    Ok(Some(envelope.state))
  }

  /// Write the state to storage.
  ///
  /// Storage failures are logged and swallowed. Only a serialization error is
  /// returned, since it points at a broken record type rather than the disk.
  pub fn persist<R: Record>(&self, state: &CollectionState<R>) -> Result<()> {
    let envelope = EnvelopeRef {
      state,
      version: STATE_VERSION,
    };
    let bytes = serde_json::to_vec(&envelope)
      .map_err(|e| eyre!("Failed to serialize {} state: {}", R::namespace(), e))?;

    if let Err(e) = self.storage.write_slot(&self.key, &bytes) {
      tracing::warn!(key = %self.key, error = %e, "failed to persist state");
    }
    Ok(())
  }
}
